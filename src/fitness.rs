//! Fitness kinds, evaluation contract, statistics and fitness ordering.

use crate::entity::{Entity, Genome};
use crate::error::{Error, Result};
use crate::validation::Component;
use futures::future::BoxFuture;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Which of an entity's two fitness values to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessType {
    /// Fitness as returned by the evaluator.
    Raw,
    /// Fitness after the optional scaling transform.
    #[default]
    Scaled,
}

impl fmt::Display for FitnessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitnessType::Raw => f.write_str("raw"),
            FitnessType::Scaled => f.write_str("scaled"),
        }
    }
}

impl FromStr for FitnessType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(FitnessType::Raw),
            "scaled" => Ok(FitnessType::Scaled),
            other => Err(Error::invalid_argument(
                "fitness_type",
                format!("unknown fitness type `{other}`, expected `raw` or `scaled`"),
            )),
        }
    }
}

/// Direction of optimization declared by a fitness evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvaluationMode {
    /// Higher fitness is better.
    #[default]
    Maximize,
    /// Lower fitness is better.
    Minimize,
}

impl fmt::Display for EvaluationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationMode::Maximize => f.write_str("maximize"),
            EvaluationMode::Minimize => f.write_str("minimize"),
        }
    }
}

impl FromStr for EvaluationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maximize" | "max" => Ok(EvaluationMode::Maximize),
            "minimize" | "min" => Ok(EvaluationMode::Minimize),
            other => Err(Error::invalid_argument(
                "evaluation_mode",
                format!("unknown evaluation mode `{other}`, expected `maximize` or `minimize`"),
            )),
        }
    }
}

/// A fitness kind paired with an evaluation mode.
///
/// Orders entities from worst to best: ascending fitness when maximizing,
/// descending fitness when minimizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ranking {
    pub kind: FitnessType,
    pub mode: EvaluationMode,
}

impl Ranking {
    pub fn new(kind: FitnessType, mode: EvaluationMode) -> Self {
        Self { kind, mode }
    }

    /// Worst-to-best ordering of two entities.
    pub fn compare<G: Genome>(&self, a: &Entity<G>, b: &Entity<G>) -> Ordering {
        let ord = a.fitness(self.kind).total_cmp(&b.fitness(self.kind));
        match self.mode {
            EvaluationMode::Maximize => ord,
            EvaluationMode::Minimize => ord.reverse(),
        }
    }

    /// Returns `true` if `a` ranks strictly better than `b`.
    pub fn is_better<G: Genome>(&self, a: &Entity<G>, b: &Entity<G>) -> bool {
        self.compare(a, b) == Ordering::Greater
    }
}

/// Computes fitness values for entities.
///
/// Evaluations of distinct entities are independent; the engine may have
/// many of them in flight at once and records the results only after all
/// of them have completed.
///
/// # Implementing
///
/// ```ignore
/// struct SumOfGenes;
///
/// impl Component for SumOfGenes {}
///
/// impl FitnessEvaluator<Genes> for SumOfGenes {
///     fn evaluation_mode(&self) -> EvaluationMode {
///         EvaluationMode::Maximize
///     }
///
///     fn evaluate_fitness<'a>(&'a self, entity: &'a Entity<Genes>) -> BoxFuture<'a, anyhow::Result<f64>> {
///         Box::pin(async move { Ok(entity.genome().0.iter().sum()) })
///     }
/// }
/// ```
pub trait FitnessEvaluator<G: Genome>: Component {
    /// Whether higher or lower fitness is better.
    fn evaluation_mode(&self) -> EvaluationMode;

    /// Evaluates one entity and returns its raw fitness.
    fn evaluate_fitness<'a>(&'a self, entity: &'a Entity<G>) -> BoxFuture<'a, anyhow::Result<f64>>;
}

/// Aggregate fitness statistics of a population.
///
/// Standard deviations use the population formula (divide by N).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitnessStatistics {
    pub raw_mean: f64,
    pub raw_std_dev: f64,
    pub raw_max: f64,
    pub raw_min: f64,
    pub scaled_mean: f64,
    pub scaled_std_dev: f64,
    pub scaled_max: f64,
    pub scaled_min: f64,
}

impl FitnessStatistics {
    /// Computes statistics over `entities`. Returns `None` if empty.
    pub fn from_entities<G: Genome>(entities: &[Entity<G>]) -> Option<Self> {
        if entities.is_empty() {
            return None;
        }
        let raw = Summary::of(entities.iter().map(|e| e.raw_fitness()));
        let scaled = Summary::of(entities.iter().map(|e| e.scaled_fitness()));
        Some(Self {
            raw_mean: raw.mean,
            raw_std_dev: raw.std_dev,
            raw_max: raw.max,
            raw_min: raw.min,
            scaled_mean: scaled.mean,
            scaled_std_dev: scaled.std_dev,
            scaled_max: scaled.max,
            scaled_min: scaled.min,
        })
    }

    pub fn mean(&self, kind: FitnessType) -> f64 {
        match kind {
            FitnessType::Raw => self.raw_mean,
            FitnessType::Scaled => self.scaled_mean,
        }
    }

    pub fn std_dev(&self, kind: FitnessType) -> f64 {
        match kind {
            FitnessType::Raw => self.raw_std_dev,
            FitnessType::Scaled => self.scaled_std_dev,
        }
    }

    pub fn max(&self, kind: FitnessType) -> f64 {
        match kind {
            FitnessType::Raw => self.raw_max,
            FitnessType::Scaled => self.scaled_max,
        }
    }

    pub fn min(&self, kind: FitnessType) -> f64 {
        match kind {
            FitnessType::Raw => self.raw_min,
            FitnessType::Scaled => self.scaled_min,
        }
    }
}

struct Summary {
    mean: f64,
    std_dev: f64,
    max: f64,
    min: f64,
}

impl Summary {
    fn of(values: impl Iterator<Item = f64> + Clone) -> Self {
        let mut n = 0usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for v in values.clone() {
            n += 1;
            sum += v;
            max = max.max(v);
            min = min.min(v);
        }
        let mean = sum / n as f64;
        let variance = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
        Self {
            mean,
            std_dev: variance.sqrt(),
            max,
            min,
        }
    }
}

/// Below this size a sequential sort beats rayon's overhead.
#[cfg(feature = "parallel")]
const PARALLEL_SORT_THRESHOLD: usize = 100;

/// Sorts entities in place from worst to best.
///
/// `Maximize` yields ascending fitness, `Minimize` descending. The sort is
/// stable: entities with equal fitness keep their relative order.
pub fn sort_by_fitness<G: Genome>(entities: &mut [Entity<G>], kind: FitnessType, mode: EvaluationMode) {
    let ranking = Ranking::new(kind, mode);

    #[cfg(feature = "parallel")]
    {
        if entities.len() > PARALLEL_SORT_THRESHOLD {
            use rayon::prelude::*;
            entities.par_sort_by(|a, b| ranking.compare(a, b));
            return;
        }
    }

    entities.sort_by(|a, b| ranking.compare(a, b));
}

/// Returns references to `entities` ordered from worst to best.
///
/// See [`sort_by_fitness`] for the direction rules.
pub fn sorted_by_fitness<'a, G, I>(entities: I, kind: FitnessType, mode: EvaluationMode) -> Vec<&'a Entity<G>>
where
    G: Genome,
    I: IntoIterator<Item = &'a Entity<G>>,
{
    let ranking = Ranking::new(kind, mode);
    let mut sorted: Vec<&Entity<G>> = entities.into_iter().collect();
    sorted.sort_by(|a, b| ranking.compare(a, b));
    sorted
}
