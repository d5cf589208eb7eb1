//! Candidate solutions.
//!
//! An [`Entity`] wraps a user-defined [`Genome`] together with the state the
//! engine tracks for it: raw fitness, scaled fitness and age.

use crate::error::{Error, Result};
use crate::fitness::{FitnessEvaluator, FitnessType};
use std::cmp::Ordering;
use std::fmt;

/// The problem-specific payload of a candidate solution.
///
/// Ordering and equality of entities delegate to [`compare`](Genome::compare):
/// two entities are equal exactly when their genomes compare as `Equal`,
/// regardless of fitness or age.
///
/// # Implementing
///
/// ```
/// use std::cmp::Ordering;
/// use u_evolve::entity::Genome;
///
/// #[derive(Clone, Debug)]
/// struct Bits(Vec<bool>);
///
/// impl Genome for Bits {
///     fn compare(&self, other: &Self) -> Ordering {
///         self.0.cmp(&other.0)
///     }
/// }
/// ```
pub trait Genome: Clone + Send + Sync + fmt::Debug + 'static {
    /// Total order over genomes.
    fn compare(&self, other: &Self) -> Ordering;
}

/// A candidate solution owned by exactly one population at a time.
///
/// Cloning produces an independent entity carrying the same genome, fitness
/// values and age.
#[derive(Debug, Clone)]
pub struct Entity<G> {
    genome: G,
    raw_fitness: f64,
    scaled_fitness: f64,
    age: usize,
}

impl<G: Genome> Entity<G> {
    /// Creates an unevaluated entity of age 0.
    pub fn new(genome: G) -> Self {
        Self {
            genome,
            raw_fitness: 0.0,
            scaled_fitness: 0.0,
            age: 0,
        }
    }

    /// Creates an entity with a known raw fitness (scaled fitness defaults to it).
    ///
    /// # Panics
    /// Panics if `fitness` is not finite.
    pub fn with_raw_fitness(genome: G, fitness: f64) -> Self {
        assert!(fitness.is_finite(), "fitness must be finite, got {fitness}");
        Self {
            genome,
            raw_fitness: fitness,
            scaled_fitness: fitness,
            age: 0,
        }
    }

    pub fn genome(&self) -> &G {
        &self.genome
    }

    pub fn into_genome(self) -> G {
        self.genome
    }

    pub fn raw_fitness(&self) -> f64 {
        self.raw_fitness
    }

    pub fn scaled_fitness(&self) -> f64 {
        self.scaled_fitness
    }

    /// Number of generations this entity has survived.
    pub fn age(&self) -> usize {
        self.age
    }

    /// Returns the fitness value of the requested kind.
    pub fn fitness(&self, kind: FitnessType) -> f64 {
        match kind {
            FitnessType::Raw => self.raw_fitness,
            FitnessType::Scaled => self.scaled_fitness,
        }
    }

    /// Overwrites the scaled fitness. Used by fitness-scaling strategies.
    pub fn set_scaled_fitness(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::invalid_argument(
                "scaled_fitness",
                format!("fitness must be finite, got {value}"),
            ));
        }
        self.scaled_fitness = value;
        Ok(())
    }

    /// Records a freshly evaluated raw fitness and resets scaled fitness to it.
    pub(crate) fn record_raw_fitness(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::invalid_argument(
                "raw_fitness",
                format!("fitness evaluator returned a non-finite value: {value}"),
            ));
        }
        self.raw_fitness = value;
        self.scaled_fitness = value;
        Ok(())
    }

    /// Builds a mutated copy: new genome, same age, fitness not yet evaluated.
    pub(crate) fn mutated(&self, genome: G) -> Self {
        Self {
            age: self.age,
            ..Self::new(genome)
        }
    }

    pub(crate) fn increment_age(&mut self) {
        self.age += 1;
    }

    /// Evaluates this entity alone and stores the raw fitness.
    ///
    /// Scaled fitness is reset to the raw value; population-level scaling
    /// only happens in [`Population::evaluate_fitness`](crate::population::Population::evaluate_fitness).
    pub async fn evaluate_fitness(&mut self, evaluator: &dyn FitnessEvaluator<G>) -> Result<f64> {
        let value = evaluator.evaluate_fitness(self).await?;
        self.record_raw_fitness(value)?;
        Ok(value)
    }
}

impl<G: Genome> PartialEq for Entity<G> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<G: Genome> Eq for Entity<G> {}

impl<G: Genome> PartialOrd for Entity<G> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Option<&Entity<G>>` inherits the absent-is-least rule from `Option`'s
/// ordering: `None < Some(_)` and `None == None`.
impl<G: Genome> Ord for Entity<G> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.genome.compare(&other.genome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bits, CountingEvaluator, FixedEvaluator};

    #[test]
    fn test_new_entity_defaults() {
        let e = Entity::new(Bits::parse("101"));
        assert_eq!(e.age(), 0);
        assert_eq!(e.raw_fitness(), 0.0);
        assert_eq!(e.scaled_fitness(), 0.0);
    }

    #[test]
    fn test_fitness_by_kind() {
        let mut e = Entity::with_raw_fitness(Bits::parse("1"), 10.0);
        e.set_scaled_fitness(3.0).unwrap();
        assert_eq!(e.fitness(FitnessType::Raw), 10.0);
        assert_eq!(e.fitness(FitnessType::Scaled), 3.0);
    }

    #[test]
    fn test_rejects_non_finite_fitness() {
        let mut e = Entity::new(Bits::parse("1"));
        assert!(e.set_scaled_fitness(f64::NAN).is_err());
        assert!(e.record_raw_fitness(f64::INFINITY).is_err());
        assert_eq!(e.raw_fitness(), 0.0);
    }

    #[test]
    fn test_equality_delegates_to_genome() {
        let a = Entity::with_raw_fitness(Bits::parse("110"), 1.0);
        let b = Entity::with_raw_fitness(Bits::parse("110"), 99.0);
        let c = Entity::with_raw_fitness(Bits::parse("111"), 1.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn test_absent_entity_is_least() {
        let a = Entity::new(Bits::parse("0"));
        let none: Option<&Entity<Bits>> = None;
        assert!(none < Some(&a));
        assert!(Some(&a) > none);
        assert_eq!(none, None);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut a = Entity::with_raw_fitness(Bits::parse("01"), 5.0);
        a.increment_age();
        let mut b = a.clone();
        assert_eq!(b.age(), 1);
        assert_eq!(b.raw_fitness(), 5.0);
        b.set_scaled_fitness(7.0).unwrap();
        b.increment_age();
        assert_eq!(a.scaled_fitness(), 5.0);
        assert_eq!(a.age(), 1);
    }

    #[test]
    fn test_mutated_preserves_age_only() {
        let mut a = Entity::with_raw_fitness(Bits::parse("01"), 5.0);
        a.increment_age();
        a.increment_age();
        let m = a.mutated(Bits::parse("11"));
        assert_eq!(m.age(), 2);
        assert_eq!(m.raw_fitness(), 0.0);
        assert_eq!(m.genome(), &Bits::parse("11"));
    }

    #[tokio::test]
    async fn test_evaluate_single_entity() {
        let evaluator = CountingEvaluator::default();
        let mut e = Entity::new(Bits::parse("1101"));
        let value = e.evaluate_fitness(&evaluator).await.unwrap();
        assert_eq!(value, 3.0);
        assert_eq!(e.raw_fitness(), 3.0);
        assert_eq!(e.scaled_fitness(), 3.0);
        assert_eq!(evaluator.calls(), 1);
    }

    #[tokio::test]
    async fn test_evaluate_single_entity_rejects_nan() {
        let evaluator = FixedEvaluator::new(f64::NAN);
        let mut e = Entity::new(Bits::parse("1"));
        let err = e.evaluate_fitness(&evaluator).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
