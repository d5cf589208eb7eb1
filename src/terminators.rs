//! Termination conditions.
//!
//! The algorithm consults its terminator once after every generation, after
//! metrics for that generation are stored.

use crate::entity::Genome;
use crate::population::Environment;
use crate::validation::Component;
use std::time::{Duration, Instant};

/// State visible to a terminator.
#[derive(Debug)]
pub struct TerminationContext<'a, G> {
    generation: usize,
    environment: &'a Environment<G>,
}

impl<'a, G: Genome> TerminationContext<'a, G> {
    pub(crate) fn new(generation: usize, environment: &'a Environment<G>) -> Self {
        Self {
            generation,
            environment,
        }
    }

    /// The generation that was just completed.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn environment(&self) -> &'a Environment<G> {
        self.environment
    }
}

/// Decides when a run is complete.
pub trait Terminator<G: Genome>: Component {
    /// Called at the end of every successful `initialize`.
    fn reset(&mut self) {}

    /// Returns `true` once the algorithm should stop.
    fn is_complete(&mut self, context: &TerminationContext<'_, G>) -> bool;
}

/// Completes once a given generation has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTerminator {
    final_generation: usize,
}

impl GenerationTerminator {
    pub fn new(final_generation: usize) -> Self {
        Self { final_generation }
    }

    pub fn final_generation(&self) -> usize {
        self.final_generation
    }
}

impl Component for GenerationTerminator {
    fn is_valid(&self, _context: &crate::validation::ValidationContext<'_>) -> Result<(), String> {
        if self.final_generation == 0 {
            return Err("final_generation must be at least 1".into());
        }
        Ok(())
    }
}

impl<G: Genome> Terminator<G> for GenerationTerminator {
    fn is_complete(&mut self, context: &TerminationContext<'_, G>) -> bool {
        context.generation() >= self.final_generation
    }
}

/// Completes once the wall-clock limit, measured from `initialize`, has elapsed.
#[derive(Debug, Clone)]
pub struct TimeLimitTerminator {
    limit: Duration,
    started: Option<Instant>,
}

impl TimeLimitTerminator {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: None,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl Component for TimeLimitTerminator {}

impl<G: Genome> Terminator<G> for TimeLimitTerminator {
    fn reset(&mut self) {
        self.started = Some(Instant::now());
    }

    fn is_complete(&mut self, _context: &TerminationContext<'_, G>) -> bool {
        let started = *self.started.get_or_insert_with(Instant::now);
        started.elapsed() >= self.limit
    }
}
