//! Contracts for the pluggable genetic operators.
//!
//! The engine never implements a concrete selection, crossover, mutation,
//! elitism or scaling algorithm. It only drives these traits:
//!
//! - [`EntitySeed`] / [`PopulationSeed`]: create the initial entities
//! - [`SelectionOperator`]: pick parents
//! - [`CrossoverOperator`]: recombine parents, gated by the crossover rate
//! - [`MutationOperator`]: perturb entities, gated by the mutation rate
//! - [`ElitismStrategy`]: carry the best entities over unchanged
//! - [`FitnessScalingStrategy`]: derive scaled fitness from raw fitness
//!
//! Stochastic operators receive the algorithm's seeded RNG as
//! `&mut dyn RngCore`, so runs are reproducible for a fixed seed.

mod seed;
mod types;

pub use seed::{DefaultPopulationSeed, EntitySeed, PopulationSeed};
pub use types::{
    elite_count, CrossoverOperator, ElitismStrategy, FitnessScalingStrategy, MutationOperator,
    SelectionOperator,
};
