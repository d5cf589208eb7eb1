//! Generational execution engine for genetic algorithms.
//!
//! Drives one or more populations of candidate solutions through repeated
//! generations of production, fitness evaluation, scaling, metric collection
//! and termination testing. Every problem-specific piece is a trait object
//! supplied by the caller:
//!
//! - **Genome & fitness**: [`Genome`] is the solution payload,
//!   [`FitnessEvaluator`] scores it asynchronously.
//! - **Operators**: seeds, selection, crossover, mutation, elitism and
//!   fitness scaling, see [`operators`].
//! - **Generation producer**: [`GenerationProducer`] builds each new
//!   generation from the helper [`GeneticOperations`]; [`SimpleGeneration`]
//!   covers the classic scheme.
//! - **Metrics**: per-generation statistics evaluated in dependency order by
//!   a [`MetricPipeline`].
//! - **Control**: [`Terminator`]s end a run, [`Plugin`]s observe it, and an
//!   `AtomicBool` flag cancels it cooperatively between generations.
//!
//! # Architecture
//!
//! The engine is executor-agnostic: fitness evaluation is the only
//! suspension point, and evaluations of one population may run concurrently.
//! A generation is staged, evaluated and measured completely before it
//! replaces the previous one, so a failure never leaves a partial generation
//! behind.
//!
//! Logging goes through `tracing`; installing a subscriber is up to the
//! caller.

pub mod algorithm;
pub mod entity;
pub mod error;
pub mod fitness;
pub mod metrics;
pub mod operators;
pub mod plugin;
pub mod population;
pub mod terminators;
pub mod validation;

#[cfg(test)]
mod testing;

pub use algorithm::{
    Algorithm, AlgorithmConfig, GenerationProducer, GeneticOperations, RunState, SimpleGeneration,
};
pub use entity::{Entity, Genome};
pub use error::{Error, Result};
pub use fitness::{
    sort_by_fitness, sorted_by_fitness, EvaluationMode, FitnessEvaluator, FitnessStatistics,
    FitnessType, Ranking,
};
pub use metrics::{
    FitnessStandardDeviation, MaximumFitness, MeanFitness, MeanFitnessImprovement, Metric,
    MetricContext, MetricKind, MetricPipeline, MetricResult, MinimumFitness,
};
pub use operators::{
    CrossoverOperator, DefaultPopulationSeed, ElitismStrategy, EntitySeed, FitnessScalingStrategy,
    MutationOperator, PopulationSeed, SelectionOperator,
};
pub use plugin::{FitnessEvaluatedEvent, Plugin};
pub use population::{Environment, EvaluationConcurrency, Population};
pub use terminators::{GenerationTerminator, TerminationContext, TimeLimitTerminator, Terminator};
pub use validation::{Component, ConfiguredComponents, ValidationContext};
