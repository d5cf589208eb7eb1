//! Fitness statistic metrics.

use super::types::{Metric, MetricContext, MetricKind};
use crate::entity::Genome;
use crate::error::{Error, Result};
use crate::fitness::{FitnessStatistics, FitnessType};
use crate::population::Population;
use crate::validation::Component;

fn statistics<G: Genome>(population: &Population<G>) -> Result<FitnessStatistics> {
    population
        .statistics()
        .copied()
        .or_else(|| FitnessStatistics::from_entities(population.entities()))
        .ok_or_else(|| {
            Error::invalid_argument(
                "population",
                format!("population {} has no entities", population.index()),
            )
        })
}

macro_rules! statistic_metric {
    ($(#[$doc:meta])* $name:ident, $raw:literal, $scaled:literal, $stat:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            fitness_type: FitnessType,
        }

        impl $name {
            pub const RAW: MetricKind = MetricKind::new($raw);
            pub const SCALED: MetricKind = MetricKind::new($scaled);

            pub fn new(fitness_type: FitnessType) -> Self {
                Self { fitness_type }
            }

            /// Kind registered for `fitness_type`.
            pub fn kind_for(fitness_type: FitnessType) -> MetricKind {
                match fitness_type {
                    FitnessType::Raw => Self::RAW,
                    FitnessType::Scaled => Self::SCALED,
                }
            }

            pub fn fitness_type(&self) -> FitnessType {
                self.fitness_type
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(FitnessType::default())
            }
        }

        impl Component for $name {}

        impl<G: Genome> Metric<G> for $name {
            fn kind(&self) -> MetricKind {
                Self::kind_for(self.fitness_type)
            }

            fn calculate(&self, population: &Population<G>, _context: &MetricContext<'_>) -> Result<f64> {
                Ok(statistics(population)?.$stat(self.fitness_type))
            }
        }
    };
}

statistic_metric!(
    /// Highest fitness in the population.
    MaximumFitness,
    "maximum_raw_fitness",
    "maximum_scaled_fitness",
    max
);

statistic_metric!(
    /// Lowest fitness in the population.
    MinimumFitness,
    "minimum_raw_fitness",
    "minimum_scaled_fitness",
    min
);

statistic_metric!(
    /// Arithmetic mean of the population's fitness.
    MeanFitness,
    "mean_raw_fitness",
    "mean_scaled_fitness",
    mean
);

statistic_metric!(
    /// Population standard deviation of fitness.
    FitnessStandardDeviation,
    "raw_fitness_std_dev",
    "scaled_fitness_std_dev",
    std_dev
);

/// Change of [`MeanFitness`] since the previous generation; 0 for generation 0.
///
/// Requires a `MeanFitness` metric of the same fitness type.
#[derive(Debug, Clone)]
pub struct MeanFitnessImprovement {
    fitness_type: FitnessType,
    mean: [MetricKind; 1],
}

impl MeanFitnessImprovement {
    pub const RAW: MetricKind = MetricKind::new("mean_raw_fitness_improvement");
    pub const SCALED: MetricKind = MetricKind::new("mean_scaled_fitness_improvement");

    pub fn new(fitness_type: FitnessType) -> Self {
        Self {
            fitness_type,
            mean: [MeanFitness::kind_for(fitness_type)],
        }
    }

    pub fn kind_for(fitness_type: FitnessType) -> MetricKind {
        match fitness_type {
            FitnessType::Raw => Self::RAW,
            FitnessType::Scaled => Self::SCALED,
        }
    }
}

impl Default for MeanFitnessImprovement {
    fn default() -> Self {
        Self::new(FitnessType::default())
    }
}

impl Component for MeanFitnessImprovement {
    fn required_metrics(&self) -> &[MetricKind] {
        &self.mean
    }
}

impl<G: Genome> Metric<G> for MeanFitnessImprovement {
    fn kind(&self) -> MetricKind {
        Self::kind_for(self.fitness_type)
    }

    fn dependencies(&self) -> &[MetricKind] {
        &self.mean
    }

    fn calculate(&self, _population: &Population<G>, context: &MetricContext<'_>) -> Result<f64> {
        let mean_kind = self.mean[0];
        let current = context.current(mean_kind).ok_or_else(|| {
            Error::contract(
                Component::name(self),
                format!("{mean_kind} was not computed for this generation"),
            )
        })?;
        Ok(match context.previous(mean_kind) {
            Some(previous) => current - previous.value(),
            None => 0.0,
        })
    }
}
