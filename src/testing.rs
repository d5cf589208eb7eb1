//! Shared fixtures for unit tests.

use crate::entity::{Entity, Genome};
use crate::error::Result;
use crate::fitness::{EvaluationMode, FitnessEvaluator, Ranking};
use crate::operators::{
    CrossoverOperator, ElitismStrategy, EntitySeed, FitnessScalingStrategy, MutationOperator,
    SelectionOperator,
};
use crate::population::Population;
use crate::validation::Component;
use futures::future::BoxFuture;
use rand::{Rng, RngCore};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

// ---- Genomes ----

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bits(pub Vec<bool>);

impl Bits {
    pub fn parse(s: &str) -> Self {
        Bits(s.chars().map(|c| c == '1').collect())
    }

    /// `len` bits encoding `n`, most significant first.
    pub fn encode(n: usize, len: usize) -> Self {
        Bits((0..len).rev().map(|i| (n >> i) & 1 == 1).collect())
    }

    pub fn ones(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }
}

impl Genome for Bits {
    fn compare(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Value(pub f64);

impl Genome for Value {
    fn compare(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Entities `0..fitness.len()` with distinct genomes and the given raw fitness.
pub fn bits_population(index: usize, fitness: &[f64], len: usize) -> Population<Bits> {
    Population::from_entities(
        index,
        fitness
            .iter()
            .enumerate()
            .map(|(i, &f)| Entity::with_raw_fitness(Bits::encode(i, len), f))
            .collect(),
    )
}

// ---- Evaluators ----

/// OneMax: fitness is the number of set bits.
#[derive(Debug, Default)]
pub struct CountingEvaluator {
    calls: AtomicUsize,
}

impl CountingEvaluator {
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

impl Component for CountingEvaluator {}

impl FitnessEvaluator<Bits> for CountingEvaluator {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Maximize
    }

    fn evaluate_fitness<'a>(&'a self, entity: &'a Entity<Bits>) -> BoxFuture<'a, anyhow::Result<f64>> {
        Box::pin(async move {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(entity.genome().ones() as f64)
        })
    }
}

#[derive(Debug)]
pub struct FixedEvaluator(f64);

impl FixedEvaluator {
    pub fn new(value: f64) -> Self {
        Self(value)
    }
}

impl Component for FixedEvaluator {}

impl FitnessEvaluator<Bits> for FixedEvaluator {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Maximize
    }

    fn evaluate_fitness<'a>(&'a self, _entity: &'a Entity<Bits>) -> BoxFuture<'a, anyhow::Result<f64>> {
        let value = self.0;
        Box::pin(async move { Ok(value) })
    }
}

/// Fitness is the genome's value.
#[derive(Debug, Default)]
pub struct ValueEvaluator {
    calls: AtomicUsize,
}

impl ValueEvaluator {
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

impl Component for ValueEvaluator {}

impl FitnessEvaluator<Value> for ValueEvaluator {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Maximize
    }

    fn evaluate_fitness<'a>(&'a self, entity: &'a Entity<Value>) -> BoxFuture<'a, anyhow::Result<f64>> {
        Box::pin(async move {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(entity.genome().0)
        })
    }
}

/// Succeeds for the first `limit` evaluations, then fails.
#[derive(Debug)]
pub struct FailAfterEvaluator {
    limit: usize,
    calls: AtomicUsize,
}

impl FailAfterEvaluator {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Component for FailAfterEvaluator {}

impl FitnessEvaluator<Value> for FailAfterEvaluator {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Maximize
    }

    fn evaluate_fitness<'a>(&'a self, entity: &'a Entity<Value>) -> BoxFuture<'a, anyhow::Result<f64>> {
        Box::pin(async move {
            let n = self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            if n >= self.limit {
                anyhow::bail!("evaluation limit of {} reached", self.limit);
            }
            Ok(entity.genome().0)
        })
    }
}

impl FitnessEvaluator<Bits> for FailAfterEvaluator {
    fn evaluation_mode(&self) -> EvaluationMode {
        EvaluationMode::Maximize
    }

    fn evaluate_fitness<'a>(&'a self, entity: &'a Entity<Bits>) -> BoxFuture<'a, anyhow::Result<f64>> {
        Box::pin(async move {
            let n = self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            if n >= self.limit {
                anyhow::bail!("evaluation limit of {} reached", self.limit);
            }
            Ok(entity.genome().ones() as f64)
        })
    }
}

// ---- Operators ----

/// Subtracts a constant from raw fitness.
#[derive(Debug)]
pub struct ShiftScaler(pub f64);

impl Component for ShiftScaler {}

impl<G: Genome> FitnessScalingStrategy<G> for ShiftScaler {
    fn scale(&self, entities: &mut [Entity<G>]) -> Result<()> {
        for entity in entities.iter_mut() {
            let scaled = entity.raw_fitness() - self.0;
            entity.set_scaled_fitness(scaled)?;
        }
        Ok(())
    }
}

/// Random bit strings of a fixed length.
#[derive(Debug)]
pub struct RandomBits(pub usize);

impl Component for RandomBits {}

impl EntitySeed<Bits> for RandomBits {
    fn create_genome(&self, rng: &mut dyn RngCore) -> Bits {
        Bits((0..self.0).map(|_| rng.random_bool(0.5)).collect())
    }
}

/// Tournament selection over the evaluator's direction.
#[derive(Debug)]
pub struct Tournament(pub usize);

impl Component for Tournament {}

impl<G: Genome> SelectionOperator<G> for Tournament {
    fn select_entities(
        &self,
        count: usize,
        population: &Population<G>,
        ranking: Ranking,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Entity<G>>> {
        let entities = population.entities();
        let n = entities.len();
        Ok((0..count)
            .map(|_| {
                let mut best = &entities[rng.random_range(0..n)];
                for _ in 1..self.0.max(1) {
                    let candidate = &entities[rng.random_range(0..n)];
                    if ranking.is_better(candidate, best) {
                        best = candidate;
                    }
                }
                best.clone()
            })
            .collect())
    }
}

/// Single-point crossover that counts its invocations.
#[derive(Debug)]
pub struct CountingCrossover {
    rate: f64,
    calls: AtomicUsize,
}

impl CountingCrossover {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

impl Component for CountingCrossover {}

impl CrossoverOperator<Bits> for CountingCrossover {
    fn crossover_rate(&self) -> f64 {
        self.rate
    }

    fn generate_crossover(&self, parents: &[Entity<Bits>], rng: &mut dyn RngCore) -> Option<Vec<Bits>> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        let (a, b) = (&parents[0].genome().0, &parents[1].genome().0);
        let point = rng.random_range(0..=a.len());
        let mut c1 = a[..point].to_vec();
        c1.extend_from_slice(&b[point..]);
        let mut c2 = b[..point].to_vec();
        c2.extend_from_slice(&a[point..]);
        Some(vec![Bits(c1), Bits(c2)])
    }
}

/// Breaks the crossover contract.
#[derive(Debug)]
pub struct NullCrossover;

impl Component for NullCrossover {}

impl CrossoverOperator<Bits> for NullCrossover {
    fn crossover_rate(&self) -> f64 {
        1.0
    }

    fn generate_crossover(&self, _parents: &[Entity<Bits>], _rng: &mut dyn RngCore) -> Option<Vec<Bits>> {
        None
    }
}

/// Flips the first bit and counts invocations.
#[derive(Debug)]
pub struct CountingMutation {
    rate: f64,
    calls: AtomicUsize,
}

impl CountingMutation {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

impl Component for CountingMutation {}

impl MutationOperator<Bits> for CountingMutation {
    fn mutation_rate(&self) -> f64 {
        self.rate
    }

    fn generate_mutation(&self, entity: &Entity<Bits>, _rng: &mut dyn RngCore) -> Bits {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        let mut bits = entity.genome().clone();
        if let Some(first) = bits.0.first_mut() {
            *first = !*first;
        }
        bits
    }
}

/// Keeps a fixed fraction of the population.
#[derive(Debug)]
pub struct RatioElitism(pub f64);

impl Component for RatioElitism {}

impl<G: Genome> ElitismStrategy<G> for RatioElitism {
    fn elitist_ratio(&self) -> f64 {
        self.0
    }
}
