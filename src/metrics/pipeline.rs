//! Dependency-ordered metric evaluation.
//!
//! Before generation 0 the pipeline assigns each configured metric a
//! dependency depth: 0 without resolvable dependencies, otherwise one more
//! than the deepest dependency. Metrics are then evaluated in a stable sort
//! by ascending depth, so prerequisites always come first and metrics of
//! equal depth keep their configured order.

use super::types::{Metric, MetricContext, MetricKind, MetricResult, MetricSlot};
use crate::entity::Genome;
use crate::error::{Error, Result};
use crate::population::Population;
use std::collections::HashMap;

/// Computes the evaluation order of `metrics` as indices into the slice.
///
/// A dependency resolves to the first configured metric that
/// [`satisfies`](Metric::satisfies) it; unresolvable dependencies are
/// ignored. Fails with [`Error::Configuration`] when two metrics share a
/// kind or on a dependency cycle.
pub fn resolve_evaluation_order<G: Genome>(metrics: &[Box<dyn Metric<G>>]) -> Result<Vec<usize>> {
    for (i, metric) in metrics.iter().enumerate() {
        let kind = metric.kind();
        if metrics[..i].iter().any(|m| m.kind() == kind) {
            return Err(Error::Configuration(format!("metric {kind} configured more than once")));
        }
    }

    let mut depths: Vec<Option<usize>> = vec![None; metrics.len()];
    let mut stack = Vec::new();
    for i in 0..metrics.len() {
        dependency_depth(i, metrics, &mut depths, &mut stack)?;
    }

    let mut order: Vec<usize> = (0..metrics.len()).collect();
    // Stable: equal depths keep configured order.
    order.sort_by_key(|&i| depths[i].unwrap_or(0));
    Ok(order)
}

fn dependency_depth<G: Genome>(
    index: usize,
    metrics: &[Box<dyn Metric<G>>],
    depths: &mut [Option<usize>],
    stack: &mut Vec<usize>,
) -> Result<usize> {
    if let Some(depth) = depths[index] {
        return Ok(depth);
    }
    if let Some(pos) = stack.iter().position(|&i| i == index) {
        let cycle: Vec<String> = stack[pos..]
            .iter()
            .chain(std::iter::once(&index))
            .map(|&i| metrics[i].kind().to_string())
            .collect();
        return Err(Error::Configuration(format!(
            "metric dependency cycle: {}",
            cycle.join(" -> ")
        )));
    }

    stack.push(index);
    let mut depth = 0;
    for &dependency in metrics[index].dependencies() {
        if let Some(provider) = metrics.iter().position(|m| m.satisfies(dependency)) {
            depth = depth.max(dependency_depth(provider, metrics, depths, stack)? + 1);
        }
    }
    stack.pop();

    depths[index] = Some(depth);
    Ok(depth)
}

fn slot_for<G: Genome>(metric: &dyn Metric<G>) -> MetricSlot {
    let kind = metric.kind();
    let mut satisfies = vec![kind];
    satisfies.extend(metric.implements().iter().copied().filter(|&k| k != kind));
    MetricSlot {
        kind,
        satisfies,
        results: HashMap::new(),
    }
}

/// Results computed for one generation, not yet visible in the history.
#[derive(Debug)]
pub(crate) struct PendingResults {
    by_slot: Vec<Vec<MetricResult>>,
}

/// Owns the configured metrics, their evaluation order and their results.
pub struct MetricPipeline<G: Genome> {
    metrics: Vec<Box<dyn Metric<G>>>,
    order: Vec<usize>,
    slots: Vec<MetricSlot>,
}

impl<G: Genome> MetricPipeline<G> {
    /// Creates a pipeline evaluating metrics in configured order until
    /// [`resolve`](Self::resolve) is called.
    pub fn new(metrics: Vec<Box<dyn Metric<G>>>) -> Self {
        let slots = metrics.iter().map(|m| slot_for(&**m)).collect();
        Self {
            order: (0..metrics.len()).collect(),
            metrics,
            slots,
        }
    }

    /// Appends a metric, evaluated last until the order is resolved again.
    pub fn push(&mut self, metric: Box<dyn Metric<G>>) {
        self.slots.push(slot_for(&*metric));
        self.order.push(self.metrics.len());
        self.metrics.push(metric);
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Metrics in configured order.
    pub fn metrics(&self) -> impl Iterator<Item = &dyn Metric<G>> {
        self.metrics.iter().map(|m| &**m)
    }

    /// Every kind satisfied by some configured metric.
    pub fn provided_kinds(&self) -> Vec<MetricKind> {
        self.slots
            .iter()
            .flat_map(|s| s.satisfies.iter().copied())
            .collect()
    }

    /// Resolves the evaluation order and discards all stored results.
    pub fn resolve(&mut self) -> Result<()> {
        self.order = resolve_evaluation_order(&self.metrics)?;
        self.clear_results();
        tracing::debug!(order = ?self.sorted_kinds(), "metric evaluation order resolved");
        Ok(())
    }

    /// Kinds in evaluation order.
    pub fn sorted_kinds(&self) -> Vec<MetricKind> {
        self.order.iter().map(|&i| self.metrics[i].kind()).collect()
    }

    /// Results of the metric registered under `kind` for one population, oldest first.
    pub fn results(&self, kind: MetricKind, population_index: usize) -> &[MetricResult] {
        self.slots
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.history(population_index))
            .unwrap_or(&[])
    }

    pub fn clear_results(&mut self) {
        for slot in &mut self.slots {
            slot.results.clear();
        }
    }

    /// Calculates every metric for every population without storing anything.
    pub(crate) fn calculate(
        &self,
        generation_index: usize,
        populations: &[Population<G>],
    ) -> Result<PendingResults> {
        let mut by_slot: Vec<Vec<MetricResult>> = vec![Vec::new(); self.metrics.len()];
        for population in populations {
            for &slot in &self.order {
                let metric = &self.metrics[slot];
                let context =
                    MetricContext::new(generation_index, population.index(), &self.slots, &by_slot);
                let value = metric.calculate(population, &context)?;
                if value.is_nan() {
                    return Err(Error::contract(metric.name(), "metric produced NaN"));
                }
                by_slot[slot].push(MetricResult::new(
                    generation_index,
                    population.index(),
                    value,
                    metric.kind(),
                ));
            }
        }
        Ok(PendingResults { by_slot })
    }

    /// Appends calculated results to the history.
    pub(crate) fn commit(&mut self, pending: PendingResults) {
        for (slot, results) in self.slots.iter_mut().zip(pending.by_slot) {
            for result in results {
                slot.results
                    .entry(result.population_index())
                    .or_default()
                    .push(result);
            }
        }
    }

    /// Calculates and stores the metrics of one generation.
    pub fn compute(&mut self, generation_index: usize, populations: &[Population<G>]) -> Result<()> {
        let pending = self.calculate(generation_index, populations)?;
        self.commit(pending);
        Ok(())
    }
}
