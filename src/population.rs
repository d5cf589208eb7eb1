//! Populations, environments and the population fitness pipeline.
//!
//! [`Population::evaluate_fitness`] is the fan-out/fan-in point of a
//! generation: every entity is evaluated (concurrently if allowed), all
//! results are awaited, and only then are raw values recorded, scaling
//! applied and statistics recomputed.

use crate::entity::{Entity, Genome};
use crate::error::{Error, Result};
use crate::fitness::{FitnessEvaluator, FitnessStatistics};
use crate::operators::FitnessScalingStrategy;
use futures::future::try_join_all;
use futures::{stream, StreamExt, TryStreamExt};

/// How many fitness evaluations may be in flight at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationConcurrency {
    /// One entity at a time, in order.
    Sequential,
    /// Every entity of the population at once.
    #[default]
    Unbounded,
    /// At most this many at once.
    Bounded(usize),
}

/// An ordered collection of entities evolved together.
#[derive(Debug, Clone)]
pub struct Population<G> {
    index: usize,
    entities: Vec<Entity<G>>,
    statistics: Option<FitnessStatistics>,
}

impl<G: Genome> Population<G> {
    /// Creates an empty population with the given environment index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            entities: Vec::new(),
            statistics: None,
        }
    }

    pub fn from_entities(index: usize, entities: Vec<Entity<G>>) -> Self {
        Self {
            index,
            entities,
            statistics: None,
        }
    }

    /// Position of this population within its environment.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entities(&self) -> &[Entity<G>] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity<G>> {
        self.entities.iter()
    }

    /// Aggregate statistics of the last fitness evaluation.
    ///
    /// `None` until [`evaluate_fitness`](Self::evaluate_fitness) has succeeded,
    /// and again after the entity set is replaced.
    pub fn statistics(&self) -> Option<&FitnessStatistics> {
        self.statistics.as_ref()
    }

    pub(crate) fn entities_mut(&mut self) -> &mut [Entity<G>] {
        &mut self.entities
    }

    /// Copy of this population with every entity one generation older.
    pub(crate) fn aged(&self) -> Self {
        let mut aged = self.clone();
        for entity in aged.entities.iter_mut() {
            entity.increment_age();
        }
        aged
    }

    /// Evaluates every entity, applies scaling and recomputes statistics.
    ///
    /// Equivalent to [`evaluate_fitness_with`](Self::evaluate_fitness_with)
    /// using [`EvaluationConcurrency::Unbounded`].
    pub async fn evaluate_fitness(
        &mut self,
        evaluator: &dyn FitnessEvaluator<G>,
        scaling: Option<&dyn FitnessScalingStrategy<G>>,
    ) -> Result<()> {
        self.evaluate_fitness_with(evaluator, scaling, EvaluationConcurrency::Unbounded)
            .await
    }

    /// Evaluates every entity with the given concurrency.
    ///
    /// Raw fitness is recorded only after every evaluation has returned; an
    /// evaluator error or a non-finite value leaves all entities untouched.
    /// Without a scaling strategy, scaled fitness equals raw fitness.
    pub async fn evaluate_fitness_with(
        &mut self,
        evaluator: &dyn FitnessEvaluator<G>,
        scaling: Option<&dyn FitnessScalingStrategy<G>>,
        concurrency: EvaluationConcurrency,
    ) -> Result<()> {
        if self.entities.is_empty() {
            return Err(Error::invalid_argument(
                "population",
                format!("population {} has no entities to evaluate", self.index),
            ));
        }

        let values: Vec<f64> = match concurrency {
            EvaluationConcurrency::Sequential => {
                let mut values = Vec::with_capacity(self.entities.len());
                for entity in &self.entities {
                    values.push(evaluator.evaluate_fitness(entity).await?);
                }
                values
            }
            EvaluationConcurrency::Unbounded => {
                try_join_all(self.entities.iter().map(|e| evaluator.evaluate_fitness(e))).await?
            }
            EvaluationConcurrency::Bounded(limit) => {
                stream::iter(self.entities.iter().map(|e| evaluator.evaluate_fitness(e)))
                    .buffered(limit.max(1))
                    .try_collect()
                    .await?
            }
        };

        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::invalid_argument(
                "raw_fitness",
                format!("{} returned a non-finite value: {bad}", evaluator.name()),
            ));
        }
        for (entity, value) in self.entities.iter_mut().zip(values) {
            entity.record_raw_fitness(value)?;
        }

        if let Some(scaling) = scaling {
            scaling.update_scaled_fitness_values(self)?;
        }

        self.statistics = FitnessStatistics::from_entities(&self.entities);
        if let Some(stats) = &self.statistics {
            tracing::debug!(
                population = self.index,
                entities = self.entities.len(),
                raw_mean = stats.raw_mean,
                raw_max = stats.raw_max,
                raw_min = stats.raw_min,
                "population fitness evaluated"
            );
        }
        Ok(())
    }
}

impl<'a, G: Genome> IntoIterator for &'a Population<G> {
    type Item = &'a Entity<G>;
    type IntoIter = std::slice::Iter<'a, Entity<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

/// All populations of one algorithm run, indexed from 0.
#[derive(Debug, Clone)]
pub struct Environment<G> {
    populations: Vec<Population<G>>,
}

impl<G: Genome> Environment<G> {
    /// Builds an environment; population indices must be `0..n` in order.
    pub(crate) fn from_populations(populations: Vec<Population<G>>) -> Self {
        debug_assert!(
            populations.iter().enumerate().all(|(i, p)| p.index() == i),
            "population indices must be contiguous and ordered"
        );
        Self { populations }
    }

    pub fn populations(&self) -> &[Population<G>] {
        &self.populations
    }

    pub fn population(&self, index: usize) -> Option<&Population<G>> {
        self.populations.get(index)
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Population<G>> {
        self.populations.iter()
    }

    pub(crate) fn replace_populations(&mut self, populations: Vec<Population<G>>) {
        debug_assert_eq!(populations.len(), self.populations.len());
        self.populations = populations;
    }
}
