//! Per-generation metrics.
//!
//! Metrics are stateless calculators evaluated once per generation per
//! population after fitness evaluation. Each declares the kinds it depends
//! on; [`MetricPipeline`] orders them by dependency depth and stores their
//! results per population.

mod builtin;
mod pipeline;
mod types;

pub use builtin::{
    FitnessStandardDeviation, MaximumFitness, MeanFitness, MeanFitnessImprovement, MinimumFitness,
};
pub use pipeline::{resolve_evaluation_order, MetricPipeline};
pub use types::{Metric, MetricContext, MetricKind, MetricResult};
