//! Metric contract, identifiers and results.

use crate::entity::Genome;
use crate::error::Result;
use crate::population::Population;
use crate::validation::Component;
use std::collections::HashMap;
use std::fmt;

/// Stable identifier of a metric type.
///
/// Dependencies are declared between kinds, never between instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MetricKind(&'static str);

impl MetricKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// One metric value for one population in one generation. Immutable.
///
/// Serializable for export under the `serde` feature; not deserializable,
/// since kinds are static identifiers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MetricResult {
    generation_index: usize,
    population_index: usize,
    value: f64,
    metric: MetricKind,
}

impl MetricResult {
    pub(crate) fn new(
        generation_index: usize,
        population_index: usize,
        value: f64,
        metric: MetricKind,
    ) -> Self {
        Self {
            generation_index,
            population_index,
            value,
            metric,
        }
    }

    pub fn generation_index(&self) -> usize {
        self.generation_index
    }

    pub fn population_index(&self) -> usize {
        self.population_index
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Kind of the metric that produced this result.
    pub fn metric(&self) -> MetricKind {
        self.metric
    }
}

/// A stateless calculator evaluated once per generation per population.
///
/// # Dependencies
///
/// A metric lists the kinds it reads in [`dependencies`](Self::dependencies).
/// The pipeline computes every configured metric satisfying one of those
/// kinds first. A declared dependency with no configured provider is
/// ignored; use [`Component::required_metrics`] to make it mandatory.
pub trait Metric<G: Genome>: Component {
    /// The kind this metric is registered under.
    fn kind(&self) -> MetricKind;

    /// Additional kinds this metric can stand in for.
    fn implements(&self) -> &[MetricKind] {
        &[]
    }

    /// Returns `true` if this metric can satisfy a dependency on `kind`.
    fn satisfies(&self, kind: MetricKind) -> bool {
        self.kind() == kind || self.implements().contains(&kind)
    }

    /// Kinds whose results this metric reads.
    fn dependencies(&self) -> &[MetricKind] {
        &[]
    }

    /// Computes this metric for `population` in the current generation.
    fn calculate(&self, population: &Population<G>, context: &MetricContext<'_>) -> Result<f64>;
}

/// Stored results of one configured metric.
#[derive(Debug, Clone)]
pub(crate) struct MetricSlot {
    pub(crate) kind: MetricKind,
    pub(crate) satisfies: Vec<MetricKind>,
    pub(crate) results: HashMap<usize, Vec<MetricResult>>,
}

impl MetricSlot {
    pub(crate) fn history(&self, population_index: usize) -> &[MetricResult] {
        self.results
            .get(&population_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// What a metric can see while it is being calculated.
///
/// Results of the current generation are visible only for metrics that
/// were calculated earlier in evaluation order, which the dependency
/// ordering guarantees for every declared dependency.
#[derive(Debug)]
pub struct MetricContext<'a> {
    generation_index: usize,
    population_index: usize,
    slots: &'a [MetricSlot],
    pending: &'a [Vec<MetricResult>],
}

impl<'a> MetricContext<'a> {
    pub(crate) fn new(
        generation_index: usize,
        population_index: usize,
        slots: &'a [MetricSlot],
        pending: &'a [Vec<MetricResult>],
    ) -> Self {
        Self {
            generation_index,
            population_index,
            slots,
            pending,
        }
    }

    pub fn generation_index(&self) -> usize {
        self.generation_index
    }

    pub fn population_index(&self) -> usize {
        self.population_index
    }

    fn slot_for(&self, kind: MetricKind) -> Option<usize> {
        self.slots.iter().position(|s| s.satisfies.contains(&kind))
    }

    /// Value of `kind` for this population in the current generation.
    pub fn current(&self, kind: MetricKind) -> Option<f64> {
        let slot = self.slot_for(kind)?;
        self.pending
            .get(slot)?
            .iter()
            .rev()
            .find(|r| r.population_index == self.population_index)
            .map(|r| r.value)
    }

    /// Results of `kind` for this population in earlier generations, oldest first.
    pub fn history(&self, kind: MetricKind) -> &'a [MetricResult] {
        match self.slot_for(kind) {
            Some(slot) => self.slots[slot].history(self.population_index),
            None => &[],
        }
    }

    /// Most recent result of `kind` before the current generation.
    pub fn previous(&self, kind: MetricKind) -> Option<&'a MetricResult> {
        self.history(kind).last()
    }
}
