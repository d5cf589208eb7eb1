//! Initial population creation.

use crate::entity::{Entity, Genome};
use crate::error::{Error, Result};
use crate::validation::Component;
use rand::RngCore;

/// Factory for new genomes.
pub trait EntitySeed<G: Genome>: Component {
    /// Creates a random genome. Need not be good, only valid.
    fn create_genome(&self, rng: &mut dyn RngCore) -> G;
}

/// Fills a freshly created population.
pub trait PopulationSeed<G: Genome>: Component {
    /// Returns the initial entities of population `population_index`.
    ///
    /// Must return at least `size` entities.
    fn seed_population(
        &self,
        population_index: usize,
        size: usize,
        entity_seed: &dyn EntitySeed<G>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Entity<G>>>;
}

/// Seeds every population with `size` entities from the entity seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPopulationSeed;

impl Component for DefaultPopulationSeed {}

impl<G: Genome> PopulationSeed<G> for DefaultPopulationSeed {
    fn seed_population(
        &self,
        _population_index: usize,
        size: usize,
        entity_seed: &dyn EntitySeed<G>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Entity<G>>> {
        if size == 0 {
            return Err(Error::invalid_argument(
                "size",
                "cannot seed an empty population",
            ));
        }
        Ok((0..size)
            .map(|_| Entity::new(entity_seed.create_genome(rng)))
            .collect())
    }
}
