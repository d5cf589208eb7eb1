//! Algorithm configuration.
//!
//! [`AlgorithmConfig`] holds the sizing, seeding and evaluation parameters of
//! an [`Algorithm`](super::Algorithm). Operators are configured on the
//! algorithm itself.

use crate::population::EvaluationConcurrency;

/// Configuration for an [`Algorithm`](super::Algorithm).
///
/// # Defaults
///
/// ```
/// use u_evolve::AlgorithmConfig;
///
/// let config = AlgorithmConfig::default();
/// assert_eq!(config.minimum_environment_size, 1);
/// assert_eq!(config.minimum_population_size, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::AlgorithmConfig;
///
/// let config = AlgorithmConfig::default()
///     .with_minimum_environment_size(4)
///     .with_minimum_population_size(50)
///     .with_max_concurrent_evaluations(8)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlgorithmConfig {
    /// Number of populations created by `initialize`.
    pub minimum_environment_size: usize,

    /// Number of entities each population is seeded with, and the size the
    /// built-in generation producer refills to.
    pub minimum_population_size: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` uses a random seed.
    pub seed: Option<u64>,

    /// Whether the entities of a population are evaluated concurrently.
    pub concurrent_evaluation: bool,

    /// Upper bound on in-flight evaluations when evaluating concurrently.
    ///
    /// `None` evaluates the whole population at once.
    pub max_concurrent_evaluations: Option<usize>,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            minimum_environment_size: 1,
            minimum_population_size: 100,
            seed: None,
            concurrent_evaluation: true,
            max_concurrent_evaluations: None,
        }
    }
}

impl AlgorithmConfig {
    /// Sets the number of populations.
    pub fn with_minimum_environment_size(mut self, n: usize) -> Self {
        self.minimum_environment_size = n;
        self
    }

    /// Sets the number of entities per population.
    pub fn with_minimum_population_size(mut self, n: usize) -> Self {
        self.minimum_population_size = n;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables concurrent evaluation.
    pub fn with_concurrent_evaluation(mut self, concurrent: bool) -> Self {
        self.concurrent_evaluation = concurrent;
        self
    }

    /// Bounds the number of concurrent evaluations.
    pub fn with_max_concurrent_evaluations(mut self, n: usize) -> Self {
        self.max_concurrent_evaluations = Some(n);
        self
    }

    /// Concurrency used when evaluating a population.
    pub fn evaluation_concurrency(&self) -> EvaluationConcurrency {
        match (self.concurrent_evaluation, self.max_concurrent_evaluations) {
            (false, _) => EvaluationConcurrency::Sequential,
            (true, None) => EvaluationConcurrency::Unbounded,
            (true, Some(n)) => EvaluationConcurrency::Bounded(n),
        }
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.minimum_environment_size == 0 {
            return Err("minimum_environment_size must be at least 1".into());
        }
        if self.minimum_population_size == 0 {
            return Err("minimum_population_size must be at least 1".into());
        }
        if self.max_concurrent_evaluations == Some(0) {
            return Err("max_concurrent_evaluations must be positive or None".into());
        }
        Ok(())
    }
}
