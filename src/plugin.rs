//! Algorithm observers.

use crate::entity::Genome;
use crate::population::Environment;
use crate::validation::Component;

/// Raised once per generation after fitness and metrics are computed.
#[derive(Debug)]
pub struct FitnessEvaluatedEvent<'a, G> {
    environment: &'a Environment<G>,
    generation: usize,
    cancelable: bool,
}

impl<'a, G: Genome> FitnessEvaluatedEvent<'a, G> {
    pub(crate) fn new(environment: &'a Environment<G>, generation: usize, cancelable: bool) -> Self {
        Self {
            environment,
            generation,
            cancelable,
        }
    }

    pub fn environment(&self) -> &'a Environment<G> {
        self.environment
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// `false` for generation 0, which always completes.
    pub fn cancelable(&self) -> bool {
        self.cancelable
    }
}

/// Observes an algorithm's lifecycle.
///
/// Plugins are called in registration order on the algorithm's control
/// thread. Cancellation is requested through the flag passed to
/// `step_with_cancel` or `run_with_cancel`, which is checked right after
/// the fitness-evaluated notification.
pub trait Plugin<G: Genome>: Component {
    /// Called when `run` starts.
    fn on_algorithm_starting(&mut self) {}

    fn on_fitness_evaluated(&mut self, _event: &FitnessEvaluatedEvent<'_, G>) {}

    /// Called when the terminator reports completion.
    fn on_algorithm_completed(&mut self, _environment: &Environment<G>) {}
}
