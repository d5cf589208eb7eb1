//! Helper operations lent to a [`GenerationProducer`](super::GenerationProducer).

use crate::entity::{Entity, Genome};
use crate::error::{Error, Result};
use crate::fitness::{EvaluationMode, FitnessType, Ranking};
use crate::operators::{CrossoverOperator, ElitismStrategy, MutationOperator, SelectionOperator};
use crate::population::Population;
use rand::RngCore;

/// The configured operators of an algorithm, bound to its random source for
/// the production of one generation.
///
/// Every `apply_*` operation degrades to a pass-through when the
/// corresponding operator is not configured.
pub struct GeneticOperations<'a, G: Genome> {
    selection: &'a dyn SelectionOperator<G>,
    elitism: Option<&'a dyn ElitismStrategy<G>>,
    crossover: Option<&'a dyn CrossoverOperator<G>>,
    mutation: Option<&'a dyn MutationOperator<G>>,
    mode: EvaluationMode,
    population_size: usize,
    rng: &'a mut dyn RngCore,
}

impl<'a, G: Genome> GeneticOperations<'a, G> {
    pub fn new(
        selection: &'a dyn SelectionOperator<G>,
        mode: EvaluationMode,
        population_size: usize,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            selection,
            elitism: None,
            crossover: None,
            mutation: None,
            mode,
            population_size,
            rng,
        }
    }

    pub fn with_elitism(mut self, elitism: Option<&'a dyn ElitismStrategy<G>>) -> Self {
        self.elitism = elitism;
        self
    }

    pub fn with_crossover(mut self, crossover: Option<&'a dyn CrossoverOperator<G>>) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_mutation(mut self, mutation: Option<&'a dyn MutationOperator<G>>) -> Self {
        self.mutation = mutation;
        self
    }

    /// Number of entities a produced generation should contain.
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    /// Optimization direction of the fitness evaluator.
    pub fn evaluation_mode(&self) -> EvaluationMode {
        self.mode
    }

    /// Parents consumed per crossover; 2 without a crossover operator.
    pub fn parent_count(&self) -> usize {
        self.crossover.map_or(2, |c| c.required_parent_count())
    }

    /// The algorithm's random source.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }

    /// Returns the entities to carry over unmodified, best first.
    ///
    /// Empty without an elitism strategy. Elites are ranked by scaled fitness.
    pub fn apply_elitism(&self, population: &Population<G>) -> Result<Vec<Entity<G>>> {
        match self.elitism {
            Some(elitism) => {
                elitism.get_elite_entities(population, Ranking::new(FitnessType::Scaled, self.mode))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Selects `count` parents from `population`.
    pub fn select_parents(&mut self, population: &Population<G>, count: usize) -> Result<Vec<Entity<G>>> {
        let ranking = Ranking::new(self.selection.selection_based_on_fitness_type(), self.mode);
        let parents = self
            .selection
            .select_entities(count, population, ranking, &mut *self.rng)?;
        if parents.len() != count {
            return Err(Error::contract(
                self.selection.name(),
                format!("selected {} entities, {count} requested", parents.len()),
            ));
        }
        Ok(parents)
    }

    /// Recombines `parents` drawn from `population`.
    ///
    /// Returns `parents` unchanged without a crossover operator.
    pub fn apply_crossover(
        &mut self,
        population: &Population<G>,
        parents: Vec<Entity<G>>,
    ) -> Result<Vec<Entity<G>>> {
        match self.crossover {
            Some(crossover) => {
                tracing::trace!(
                    population = population.index(),
                    parents = parents.len(),
                    "applying crossover"
                );
                crossover.crossover(parents, &mut *self.rng)
            }
            None => Ok(parents),
        }
    }

    /// Mutates each entity independently.
    ///
    /// Returns `entities` unchanged without a mutation operator. Fails on an
    /// empty input.
    pub fn apply_mutation(&mut self, entities: Vec<Entity<G>>) -> Result<Vec<Entity<G>>> {
        if entities.is_empty() {
            return Err(Error::invalid_argument("entities", "nothing to mutate"));
        }
        match self.mutation {
            Some(mutation) => Ok(entities
                .into_iter()
                .map(|entity| mutation.mutate(entity, &mut *self.rng))
                .collect()),
            None => Ok(entities),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        bits_population, Bits, CountingCrossover, CountingMutation, RatioElitism, Tournament,
    };
    use crate::validation::Component;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn operations(rng: &mut StdRng, mode: EvaluationMode, size: usize) -> GeneticOperations<'_, Bits> {
        GeneticOperations::new(&Tournament(2), mode, size, rng)
    }

    fn population() -> Population<Bits> {
        bits_population(0, &[4.0, 1.0, 3.0], 4).aged()
    }

    #[test]
    fn test_without_operators_everything_passes_through() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ops = operations(&mut rng, EvaluationMode::Maximize, 3);
        let pop = population();

        assert!(ops.apply_elitism(&pop).unwrap().is_empty());
        assert_eq!(ops.parent_count(), 2);

        let parents = pop.entities()[..2].to_vec();
        assert_eq!(ops.apply_crossover(&pop, parents.clone()).unwrap(), parents);
        let mutated = ops.apply_mutation(parents.clone()).unwrap();
        assert_eq!(mutated, parents);
        assert!(mutated.iter().all(|e| e.age() == 1));
    }

    #[test]
    fn test_apply_mutation_rejects_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let mutation = CountingMutation::new(1.0);
        let mut ops = operations(&mut rng, EvaluationMode::Maximize, 3)
            .with_mutation(Some(&mutation));
        let err = ops.apply_mutation(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { argument: "entities", .. }));
    }

    #[test]
    fn test_mutation_rate_zero_never_invokes_operator() {
        let mut rng = StdRng::seed_from_u64(3);
        let mutation = CountingMutation::new(0.0);
        let mut ops = operations(&mut rng, EvaluationMode::Maximize, 3)
            .with_mutation(Some(&mutation));
        let entities = population().entities().to_vec();
        assert_eq!(ops.apply_mutation(entities).unwrap().len(), 3);
        assert_eq!(mutation.calls(), 0);
    }

    #[test]
    fn test_mutation_invocations_bounded_and_age_preserved() {
        let mut rng = StdRng::seed_from_u64(5);
        let mutation = CountingMutation::new(0.5);
        let mut ops = operations(&mut rng, EvaluationMode::Maximize, 3)
            .with_mutation(Some(&mutation));
        for _ in 0..20 {
            let before = mutation.calls();
            let out = ops.apply_mutation(population().entities().to_vec()).unwrap();
            assert!(mutation.calls() - before <= 3);
            assert!(out.iter().all(|e| e.age() == 1));
        }
    }

    #[test]
    fn test_crossover_uses_operator() {
        let mut rng = StdRng::seed_from_u64(9);
        let crossover = CountingCrossover::new(1.0);
        let mut ops = operations(&mut rng, EvaluationMode::Maximize, 3)
            .with_crossover(Some(&crossover));
        let pop = population();
        let parents = ops.select_parents(&pop, ops.parent_count()).unwrap();
        let children = ops.apply_crossover(&pop, parents).unwrap();
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|c| c.age() == 0));
        assert_eq!(crossover.calls(), 1);
    }

    #[test]
    fn test_elitism_uses_evaluation_mode() {
        let mut rng = StdRng::seed_from_u64(1);
        let elitism = RatioElitism(0.34);
        let pop = population();

        let ops = operations(&mut rng, EvaluationMode::Maximize, 3)
            .with_elitism(Some(&elitism));
        let elites = ops.apply_elitism(&pop).unwrap();
        assert_eq!(elites.len(), 1);
        assert_eq!(elites[0].raw_fitness(), 4.0);
        assert_eq!(elites[0].age(), 1);

        let mut rng = StdRng::seed_from_u64(1);
        let ops = operations(&mut rng, EvaluationMode::Minimize, 3)
            .with_elitism(Some(&elitism));
        assert_eq!(ops.apply_elitism(&pop).unwrap()[0].raw_fitness(), 1.0);
    }

    /// Returns the best entity under the ranking it is handed.
    struct RawBest;

    impl Component for RawBest {}

    impl SelectionOperator<Bits> for RawBest {
        fn selection_based_on_fitness_type(&self) -> FitnessType {
            FitnessType::Raw
        }

        fn select_entities(
            &self,
            count: usize,
            population: &Population<Bits>,
            ranking: Ranking,
            _rng: &mut dyn RngCore,
        ) -> Result<Vec<Entity<Bits>>> {
            let best = population
                .entities()
                .iter()
                .max_by(|a, b| ranking.compare(a, b))
                .cloned()
                .into_iter()
                .collect::<Vec<_>>();
            Ok(best.into_iter().cycle().take(count).collect())
        }
    }

    #[test]
    fn test_select_parents_ranks_by_operator_fitness_type() {
        let mut pop = bits_population(0, &[4.0, 1.0, 3.0], 4);
        let inverted = pop.entities().len() as f64;
        for (i, entity) in pop.entities_mut().iter_mut().enumerate() {
            entity.set_scaled_fitness(inverted - i as f64).unwrap();
        }

        let mut rng = StdRng::seed_from_u64(1);
        let mut ops = GeneticOperations::new(&RawBest, EvaluationMode::Minimize, 3, &mut rng);
        let parents = ops.select_parents(&pop, 2).unwrap();
        assert!(parents.iter().all(|p| p.raw_fitness() == 1.0));
    }

    proptest! {
        #[test]
        fn prop_apply_elitism_count(n in 1usize..50, ratio in 0.0f64..=1.0) {
            let fitness: Vec<f64> = (0..n).map(|i| i as f64).collect();
            let pop = bits_population(0, &fitness, 6);
            let elitism = RatioElitism(ratio);
            let mut rng = StdRng::seed_from_u64(0);
            let ops = operations(&mut rng, EvaluationMode::Maximize, n)
                .with_elitism(Some(&elitism));
            prop_assert_eq!(ops.apply_elitism(&pop).unwrap().len(), (ratio * n as f64).round() as usize);
        }
    }
}
