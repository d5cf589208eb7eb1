//! Component validation.
//!
//! Every pluggable piece of an algorithm is a [`Component`]. During
//! initialization the engine asks each configured component whether it
//! accepts the configuration it was placed in, checks the metrics it
//! requires, and applies the built-in range checks for operator rates.

use crate::algorithm::AlgorithmConfig;
use crate::metrics::MetricKind;

/// Validation contract shared by every pluggable component.
///
/// All methods have defaults, so `impl Component for MyOperator {}` is enough
/// for components with no configuration constraints.
pub trait Component: Send + Sync {
    /// Human-readable name used in error messages and logs.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Checks this component against the rest of the configuration.
    ///
    /// Returns a description of the problem on failure.
    fn is_valid(&self, _context: &ValidationContext<'_>) -> Result<(), String> {
        Ok(())
    }

    /// Metric kinds that must be configured for this component to work.
    fn required_metrics(&self) -> &[MetricKind] {
        &[]
    }
}

/// Which optional components are configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfiguredComponents {
    pub elitism: bool,
    pub crossover: bool,
    pub mutation: bool,
    pub fitness_scaling: bool,
    pub terminator: bool,
    pub plugins: usize,
}

/// Read-only view of an algorithm configuration, handed to
/// [`Component::is_valid`].
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    config: &'a AlgorithmConfig,
    components: ConfiguredComponents,
    metric_kinds: Vec<MetricKind>,
}

impl<'a> ValidationContext<'a> {
    /// `metric_kinds` lists every kind satisfied by some configured metric.
    pub fn new(
        config: &'a AlgorithmConfig,
        components: ConfiguredComponents,
        metric_kinds: Vec<MetricKind>,
    ) -> Self {
        Self {
            config,
            components,
            metric_kinds,
        }
    }

    pub fn config(&self) -> &AlgorithmConfig {
        self.config
    }

    pub fn components(&self) -> ConfiguredComponents {
        self.components
    }

    /// Returns `true` if a configured metric satisfies `kind`.
    pub fn has_metric(&self, kind: MetricKind) -> bool {
        self.metric_kinds.contains(&kind)
    }

    /// Returns the first of `component`'s required metrics that is missing.
    pub(crate) fn missing_metric(&self, required: &[MetricKind]) -> Option<MetricKind> {
        required.iter().copied().find(|&kind| !self.has_metric(kind))
    }
}

/// Checks that a probability-like property lies in `[0, 1]`.
pub fn check_unit_interval(property: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{property} must be within [0, 1], got {value}"))
    }
}

/// Strips module paths from a type name, keeping generic arguments.
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
