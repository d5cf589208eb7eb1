//! Selection, crossover, mutation, elitism and scaling contracts.

use crate::entity::{Entity, Genome};
use crate::error::{Error, Result};
use crate::fitness::{sorted_by_fitness, FitnessType, Ranking};
use crate::population::Population;
use crate::validation::Component;
use rand::{Rng, RngCore};

/// Chooses parents from a population.
pub trait SelectionOperator<G: Genome>: Component {
    /// Fitness kind this operator ranks by.
    fn selection_based_on_fitness_type(&self) -> FitnessType {
        FitnessType::Scaled
    }

    /// Selects `count` entities from `population`.
    ///
    /// `ranking` pairs [`selection_based_on_fitness_type`](Self::selection_based_on_fitness_type)
    /// with the fitness evaluator's optimization direction.
    fn select_entities(
        &self,
        count: usize,
        population: &Population<G>,
        ranking: Ranking,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Entity<G>>>;
}

/// Recombines parents into offspring.
///
/// Implementors provide [`generate_crossover`](Self::generate_crossover);
/// the engine calls [`crossover`](Self::crossover), which enforces the
/// parent count and the crossover rate.
pub trait CrossoverOperator<G: Genome>: Component {
    /// Number of parents consumed per crossover. At least 2.
    fn required_parent_count(&self) -> usize {
        2
    }

    /// Probability in `[0, 1]` that parents are recombined.
    fn crossover_rate(&self) -> f64;

    /// Produces offspring genomes from `parents`.
    ///
    /// Returning `None` is a contract violation and aborts the generation.
    fn generate_crossover(&self, parents: &[Entity<G>], rng: &mut dyn RngCore) -> Option<Vec<G>>;

    /// Recombines `parents` with probability [`crossover_rate`](Self::crossover_rate).
    ///
    /// Offspring start at age 0. When crossover does not happen the parents
    /// are returned unchanged.
    fn crossover(&self, parents: Vec<Entity<G>>, rng: &mut dyn RngCore) -> Result<Vec<Entity<G>>> {
        let required = self.required_parent_count();
        if parents.len() < required {
            return Err(Error::invalid_argument(
                "parents",
                format!(
                    "{} requires {required} parents, got {}",
                    self.name(),
                    parents.len()
                ),
            ));
        }

        if rng.random_range(0.0..1.0) >= self.crossover_rate() {
            return Ok(parents);
        }

        let offspring = self
            .generate_crossover(&parents, rng)
            .ok_or_else(|| Error::contract(self.name(), "generate_crossover returned no offspring"))?;
        Ok(offspring.into_iter().map(Entity::new).collect())
    }
}

/// Perturbs entities.
pub trait MutationOperator<G: Genome>: Component {
    /// Per-entity probability in `[0, 1]` of mutation.
    fn mutation_rate(&self) -> f64;

    /// Produces the mutated genome of `entity`.
    fn generate_mutation(&self, entity: &Entity<G>, rng: &mut dyn RngCore) -> G;

    /// Mutates `entity` with probability [`mutation_rate`](Self::mutation_rate).
    ///
    /// A mutated entity keeps the age of its source and awaits evaluation.
    fn mutate(&self, entity: Entity<G>, rng: &mut dyn RngCore) -> Entity<G> {
        if rng.random_range(0.0..1.0) < self.mutation_rate() {
            let genome = self.generate_mutation(&entity, rng);
            entity.mutated(genome)
        } else {
            entity
        }
    }
}

/// Picks entities to carry into the next generation unmodified.
pub trait ElitismStrategy<G: Genome>: Component {
    /// Fraction in `[0, 1]` of the population preserved.
    fn elitist_ratio(&self) -> f64;

    /// Returns the `round(ratio × N)` best entities, best first.
    fn get_elite_entities(&self, population: &Population<G>, ranking: Ranking) -> Result<Vec<Entity<G>>> {
        if population.is_empty() {
            return Err(Error::invalid_argument(
                "population",
                format!("population {} is empty", population.index()),
            ));
        }
        let count = elite_count(self.elitist_ratio(), population.len());
        Ok(sorted_by_fitness(population, ranking.kind, ranking.mode)
            .into_iter()
            .rev()
            .take(count)
            .cloned()
            .collect())
    }
}

/// Number of elites for `ratio` of a population of `size`, rounded to nearest.
pub fn elite_count(ratio: f64, size: usize) -> usize {
    let count = (ratio.clamp(0.0, 1.0) * size as f64).round() as usize;
    count.min(size)
}

/// Derives scaled fitness from raw fitness for a whole population.
pub trait FitnessScalingStrategy<G: Genome>: Component {
    /// Writes the scaled fitness of every entity.
    ///
    /// Entities may be visited in any order; raw fitness is already recorded.
    fn scale(&self, entities: &mut [Entity<G>]) -> Result<()>;

    /// Scales every entity of `population`. Fails if the population is empty.
    fn update_scaled_fitness_values(&self, population: &mut Population<G>) -> Result<()> {
        if population.is_empty() {
            return Err(Error::invalid_argument(
                "population",
                format!("cannot scale empty population {}", population.index()),
            ));
        }
        self.scale(population.entities_mut())
    }
}
