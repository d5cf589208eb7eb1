//! Next-generation production.

use super::operations::GeneticOperations;
use crate::entity::{Entity, Genome};
use crate::error::{Error, Result};
use crate::population::Population;
use crate::validation::Component;

/// Produces the entities of a population's next generation.
///
/// The population handed in is a staged copy whose entities have already
/// been aged by one generation; it is discarded afterwards. The returned
/// entities replace the population once the whole generation has been
/// evaluated.
pub trait GenerationProducer<G: Genome>: Component {
    fn create_next_generation(
        &self,
        population: &Population<G>,
        operations: &mut GeneticOperations<'_, G>,
    ) -> Result<Vec<Entity<G>>>;
}

/// Classic generational replacement.
///
/// Elites are carried over first; the rest of the population is filled with
/// the mutated offspring of selected parents until it reaches the configured
/// population size.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleGeneration;

impl Component for SimpleGeneration {}

impl<G: Genome> GenerationProducer<G> for SimpleGeneration {
    fn create_next_generation(
        &self,
        population: &Population<G>,
        operations: &mut GeneticOperations<'_, G>,
    ) -> Result<Vec<Entity<G>>> {
        let target = operations.population_size();
        let mut next = operations.apply_elitism(population)?;
        next.truncate(target);

        while next.len() < target {
            let parents = operations.select_parents(population, operations.parent_count())?;
            let offspring = operations.apply_crossover(population, parents)?;
            let offspring = operations.apply_mutation(offspring)?;
            if offspring.is_empty() {
                return Err(Error::contract(
                    <Self as Component>::name(self),
                    "generation stalled without offspring",
                ));
            }
            let room = target - next.len();
            next.extend(offspring.into_iter().take(room));
        }
        Ok(next)
    }
}
