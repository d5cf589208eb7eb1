//! Generational lifecycle.
//!
//! [`Algorithm`] owns the environment and drives it through
//! initialize → (produce → evaluate → metrics → notify → terminate?)*.
//! A generation is staged completely before it replaces the previous one.

use super::config::AlgorithmConfig;
use super::operations::GeneticOperations;
use super::producer::GenerationProducer;
use crate::entity::Genome;
use crate::error::{Error, Result};
use crate::fitness::FitnessEvaluator;
use crate::metrics::{Metric, MetricKind, MetricPipeline, MetricResult};
use crate::operators::{
    CrossoverOperator, ElitismStrategy, EntitySeed, FitnessScalingStrategy, MutationOperator,
    PopulationSeed, SelectionOperator,
};
use crate::plugin::{FitnessEvaluatedEvent, Plugin};
use crate::population::{Environment, Population};
use crate::terminators::{TerminationContext, Terminator};
use crate::validation::{check_unit_interval, Component, ConfiguredComponents, ValidationContext};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Lifecycle state of an [`Algorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Never initialized, or the last `initialize` failed.
    Uninitialized,
    /// Initialized and able to step.
    Ready,
    /// Stopped through the cancellation flag; re-initialize to continue.
    Cancelled,
    /// The terminator reported completion or `complete` was called.
    Completed,
}

/// Generational genetic algorithm engine.
///
/// # Usage
///
/// ```ignore
/// let mut algorithm = Algorithm::new(AlgorithmConfig::default().with_seed(42), SimpleGeneration)
///     .with_fitness_evaluator(MyEvaluator)
///     .with_population_seed(DefaultPopulationSeed)
///     .with_entity_seed(MySeed)
///     .with_selection_operator(MyTournament)
///     .with_crossover(MyCrossover)
///     .with_terminator(GenerationTerminator::new(100));
///
/// algorithm.initialize().await?;
/// algorithm.run().await?;
/// ```
pub struct Algorithm<G: Genome> {
    config: AlgorithmConfig,
    producer: Box<dyn GenerationProducer<G>>,
    fitness_evaluator: Option<Box<dyn FitnessEvaluator<G>>>,
    population_seed: Option<Box<dyn PopulationSeed<G>>>,
    entity_seed: Option<Box<dyn EntitySeed<G>>>,
    selection: Option<Box<dyn SelectionOperator<G>>>,
    elitism: Option<Box<dyn ElitismStrategy<G>>>,
    crossover: Option<Box<dyn CrossoverOperator<G>>>,
    mutation: Option<Box<dyn MutationOperator<G>>>,
    fitness_scaling: Option<Box<dyn FitnessScalingStrategy<G>>>,
    terminator: Option<Box<dyn Terminator<G>>>,
    metrics: MetricPipeline<G>,
    plugins: Vec<Box<dyn Plugin<G>>>,
    rng: StdRng,
    environment: Option<Environment<G>>,
    current_generation: usize,
    state: RunState,
}

impl<G: Genome> Algorithm<G> {
    /// Creates an algorithm producing generations with `producer`.
    pub fn new(config: AlgorithmConfig, producer: impl GenerationProducer<G> + 'static) -> Self {
        Self {
            config,
            producer: Box::new(producer),
            fitness_evaluator: None,
            population_seed: None,
            entity_seed: None,
            selection: None,
            elitism: None,
            crossover: None,
            mutation: None,
            fitness_scaling: None,
            terminator: None,
            metrics: MetricPipeline::new(Vec::new()),
            plugins: Vec::new(),
            rng: StdRng::seed_from_u64(0),
            environment: None,
            current_generation: 0,
            state: RunState::Uninitialized,
        }
    }

    /// Sets the fitness evaluator (required).
    pub fn with_fitness_evaluator(mut self, evaluator: impl FitnessEvaluator<G> + 'static) -> Self {
        self.fitness_evaluator = Some(Box::new(evaluator));
        self
    }

    /// Sets the population seed (required).
    pub fn with_population_seed(mut self, seed: impl PopulationSeed<G> + 'static) -> Self {
        self.population_seed = Some(Box::new(seed));
        self
    }

    /// Sets the entity seed (required).
    pub fn with_entity_seed(mut self, seed: impl EntitySeed<G> + 'static) -> Self {
        self.entity_seed = Some(Box::new(seed));
        self
    }

    /// Sets the selection operator (required).
    pub fn with_selection_operator(mut self, selection: impl SelectionOperator<G> + 'static) -> Self {
        self.selection = Some(Box::new(selection));
        self
    }

    /// Sets the elitism strategy. Without one, no entity survives unchanged.
    pub fn with_elitism(mut self, elitism: impl ElitismStrategy<G> + 'static) -> Self {
        self.elitism = Some(Box::new(elitism));
        self
    }

    /// Sets the crossover operator. Without one, parents pass through.
    pub fn with_crossover(mut self, crossover: impl CrossoverOperator<G> + 'static) -> Self {
        self.crossover = Some(Box::new(crossover));
        self
    }

    /// Sets the mutation operator. Without one, offspring are not mutated.
    pub fn with_mutation(mut self, mutation: impl MutationOperator<G> + 'static) -> Self {
        self.mutation = Some(Box::new(mutation));
        self
    }

    /// Sets the fitness scaling strategy. Without one, scaled fitness mirrors raw fitness.
    pub fn with_fitness_scaling(mut self, scaling: impl FitnessScalingStrategy<G> + 'static) -> Self {
        self.fitness_scaling = Some(Box::new(scaling));
        self
    }

    /// Sets the terminator. Without one, `step` never reports completion.
    pub fn with_terminator(mut self, terminator: impl Terminator<G> + 'static) -> Self {
        self.terminator = Some(Box::new(terminator));
        self
    }

    /// Adds a metric. Evaluation order is resolved at `initialize`.
    pub fn with_metric(mut self, metric: impl Metric<G> + 'static) -> Self {
        self.metrics.push(Box::new(metric));
        self
    }

    /// Adds a plugin. Plugins are notified in registration order.
    pub fn with_plugin(mut self, plugin: impl Plugin<G> + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// The configuration this algorithm was built with.
    pub fn config(&self) -> &AlgorithmConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns `true` once `initialize` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.state != RunState::Uninitialized
    }

    /// Index of the last completed generation; 0 right after `initialize`.
    pub fn current_generation(&self) -> usize {
        self.current_generation
    }

    /// The environment built by the last successful `initialize`.
    pub fn environment(&self) -> Option<&Environment<G>> {
        self.environment.as_ref()
    }

    /// Metric kinds in evaluation order.
    pub fn sorted_metrics(&self) -> Vec<MetricKind> {
        self.metrics.sorted_kinds()
    }

    /// Stored results of metric `kind` for one population, oldest first.
    pub fn metric_results(&self, kind: MetricKind, population_index: usize) -> &[MetricResult] {
        self.metrics.results(kind, population_index)
    }

    /// Validates the configuration, seeds a fresh environment and evaluates
    /// generation 0.
    ///
    /// On failure the algorithm is left uninitialized with no environment.
    #[tracing::instrument(
        skip_all,
        fields(
            environment_size = self.config.minimum_environment_size,
            population_size = self.config.minimum_population_size,
        )
    )]
    pub async fn initialize(&mut self) -> Result<()> {
        self.state = RunState::Uninitialized;
        self.environment = None;
        self.current_generation = 0;

        if let Err(err) = self.validate() {
            tracing::warn!(error = %err, "configuration rejected");
            return Err(err);
        }
        self.metrics.resolve()?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        self.rng = StdRng::seed_from_u64(seed);

        let (Some(evaluator), Some(population_seed), Some(entity_seed)) = (
            self.fitness_evaluator.as_deref(),
            self.population_seed.as_deref(),
            self.entity_seed.as_deref(),
        ) else {
            return Err(Error::Configuration("required component missing".into()));
        };

        let size = self.config.minimum_population_size;
        let concurrency = self.config.evaluation_concurrency();
        let mut populations = Vec::with_capacity(self.config.minimum_environment_size);
        for index in 0..self.config.minimum_environment_size {
            let entities = population_seed.seed_population(index, size, entity_seed, &mut self.rng)?;
            if entities.len() < size {
                return Err(Error::contract(
                    population_seed.name(),
                    format!("seeded {} entities, {size} required", entities.len()),
                ));
            }
            let mut population = Population::from_entities(index, entities);
            population
                .evaluate_fitness_with(evaluator, self.fitness_scaling.as_deref(), concurrency)
                .await?;
            populations.push(population);
        }

        self.metrics.compute(0, &populations)?;

        let environment = self.environment.insert(Environment::from_populations(populations));
        self.state = RunState::Ready;
        if let Some(terminator) = self.terminator.as_mut() {
            terminator.reset();
        }

        let event = FitnessEvaluatedEvent::new(environment, 0, false);
        for plugin in &mut self.plugins {
            plugin.on_fitness_evaluated(&event);
        }
        tracing::info!(seed, "algorithm initialized");
        Ok(())
    }

    /// Produces, evaluates and commits one generation.
    ///
    /// Returns `true` once the terminator reports completion.
    pub async fn step(&mut self) -> Result<bool> {
        self.step_with_cancel(None).await
    }

    /// Like [`step`](Self::step), checking `cancel` once after plugins were
    /// notified of the new generation.
    ///
    /// A set flag still lets this generation complete. Unless the terminator
    /// reports completion for it, the algorithm then moves to
    /// [`RunState::Cancelled`].
    #[tracing::instrument(skip_all, fields(generation = self.current_generation + 1))]
    pub async fn step_with_cancel(&mut self, cancel: Option<&AtomicBool>) -> Result<bool> {
        self.ensure_ready()?;

        let (Some(evaluator), Some(selection), Some(environment)) = (
            self.fitness_evaluator.as_deref(),
            self.selection.as_deref(),
            self.environment.as_ref(),
        ) else {
            return Err(Error::InvalidState("algorithm is not initialized".into()));
        };

        let generation = self.current_generation + 1;
        let mode = evaluator.evaluation_mode();
        let concurrency = self.config.evaluation_concurrency();

        let mut staged = Vec::with_capacity(environment.len());
        for population in environment.iter() {
            let aged = population.aged();
            let entities = {
                let mut operations = GeneticOperations::new(
                    selection,
                    mode,
                    self.config.minimum_population_size,
                    &mut self.rng,
                )
                .with_elitism(self.elitism.as_deref())
                .with_crossover(self.crossover.as_deref())
                .with_mutation(self.mutation.as_deref());
                self.producer.create_next_generation(&aged, &mut operations)?
            };
            if entities.is_empty() {
                return Err(Error::contract(
                    self.producer.name(),
                    format!("produced no entities for population {}", population.index()),
                ));
            }

            let mut next = Population::from_entities(population.index(), entities);
            next.evaluate_fitness_with(evaluator, self.fitness_scaling.as_deref(), concurrency)
                .await?;
            staged.push(next);
        }
        let pending = self.metrics.calculate(generation, &staged)?;

        self.metrics.commit(pending);
        let Some(environment) = self.environment.as_mut() else {
            return Err(Error::InvalidState("algorithm is not initialized".into()));
        };
        environment.replace_populations(staged);
        self.current_generation = generation;
        tracing::info!(generation, "generation completed");

        let event = FitnessEvaluatedEvent::new(&*environment, generation, true);
        for plugin in &mut self.plugins {
            plugin.on_fitness_evaluated(&event);
        }

        let complete = match self.terminator.as_mut() {
            Some(terminator) => terminator.is_complete(&TerminationContext::new(generation, environment)),
            None => false,
        };
        if complete {
            self.finish();
            return Ok(true);
        }

        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            self.state = RunState::Cancelled;
            tracing::info!(generation, "algorithm cancelled");
        }
        Ok(false)
    }

    /// Steps until the terminator reports completion.
    pub async fn run(&mut self) -> Result<()> {
        self.run_with_cancel(None).await
    }

    /// Steps until completion or until `cancel` is set.
    ///
    /// The flag is checked once per generation, after the generation has been
    /// committed, so a cancelled run never leaves a partial generation.
    /// Fails with [`Error::Configuration`] when neither a terminator nor a
    /// cancellation flag could ever stop the run.
    #[tracing::instrument(skip_all, fields(from_generation = self.current_generation))]
    pub async fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> Result<()> {
        self.ensure_ready()?;
        if self.terminator.is_none() && cancel.is_none() {
            return Err(Error::Configuration(
                "run requires a terminator or a cancellation flag".into(),
            ));
        }

        for plugin in &mut self.plugins {
            plugin.on_algorithm_starting();
        }
        tracing::info!("algorithm starting");

        while self.state == RunState::Ready {
            if self.step_with_cancel(cancel.as_deref()).await? {
                break;
            }
        }
        Ok(())
    }

    /// Completes the algorithm without running further generations.
    pub fn complete(&mut self) -> Result<()> {
        match self.state {
            RunState::Uninitialized => {
                Err(Error::InvalidState("algorithm is not initialized".into()))
            }
            RunState::Completed => Err(Error::InvalidState("algorithm already completed".into())),
            RunState::Ready | RunState::Cancelled => {
                self.finish();
                Ok(())
            }
        }
    }

    fn finish(&mut self) {
        self.state = RunState::Completed;
        tracing::info!(generation = self.current_generation, "algorithm completed");
        if let Some(environment) = self.environment.as_ref() {
            for plugin in &mut self.plugins {
                plugin.on_algorithm_completed(environment);
            }
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            RunState::Ready => Ok(()),
            RunState::Uninitialized => {
                Err(Error::InvalidState("algorithm is not initialized".into()))
            }
            RunState::Cancelled => Err(Error::InvalidState(
                "algorithm was cancelled; initialize again to continue".into(),
            )),
            RunState::Completed => Err(Error::InvalidState(
                "algorithm already completed; initialize again to continue".into(),
            )),
        }
    }

    fn configured_components(&self) -> ConfiguredComponents {
        ConfiguredComponents {
            elitism: self.elitism.is_some(),
            crossover: self.crossover.is_some(),
            mutation: self.mutation.is_some(),
            fitness_scaling: self.fitness_scaling.is_some(),
            terminator: self.terminator.is_some(),
            plugins: self.plugins.len(),
        }
    }

    /// Checks required components, built-in ranges and every component's
    /// own validation.
    fn validate(&self) -> Result<()> {
        self.config.validate().map_err(Error::Configuration)?;

        let missing = [
            ("fitness evaluator", self.fitness_evaluator.is_none()),
            ("population seed", self.population_seed.is_none()),
            ("entity seed", self.entity_seed.is_none()),
            ("selection operator", self.selection.is_none()),
        ];
        if let Some((component, _)) = missing.iter().find(|(_, absent)| *absent) {
            return Err(Error::Configuration(format!("no {component} configured")));
        }

        if let Some(elitism) = self.elitism.as_deref() {
            check_range(elitism, check_unit_interval("elitist_ratio", elitism.elitist_ratio()))?;
        }
        if let Some(crossover) = self.crossover.as_deref() {
            check_range(crossover, check_unit_interval("crossover_rate", crossover.crossover_rate()))?;
            let parents = crossover.required_parent_count();
            if parents < 2 {
                return Err(Error::Configuration(format!(
                    "{}: required_parent_count must be at least 2, got {parents}",
                    crossover.name()
                )));
            }
        }
        if let Some(mutation) = self.mutation.as_deref() {
            check_range(mutation, check_unit_interval("mutation_rate", mutation.mutation_rate()))?;
        }

        let context = ValidationContext::new(
            &self.config,
            self.configured_components(),
            self.metrics.provided_kinds(),
        );
        validate_component(&*self.producer, &context)?;
        validate_optional(self.fitness_evaluator.as_deref(), &context)?;
        validate_optional(self.population_seed.as_deref(), &context)?;
        validate_optional(self.entity_seed.as_deref(), &context)?;
        validate_optional(self.selection.as_deref(), &context)?;
        validate_optional(self.elitism.as_deref(), &context)?;
        validate_optional(self.crossover.as_deref(), &context)?;
        validate_optional(self.mutation.as_deref(), &context)?;
        validate_optional(self.fitness_scaling.as_deref(), &context)?;
        validate_optional(self.terminator.as_deref(), &context)?;
        for metric in self.metrics.metrics() {
            validate_component(metric, &context)?;
        }
        for plugin in &self.plugins {
            validate_component(&**plugin, &context)?;
        }
        Ok(())
    }
}

fn check_range<C: Component + ?Sized>(component: &C, check: Result<(), String>) -> Result<()> {
    check.map_err(|message| Error::Configuration(format!("{}: {message}", component.name())))
}

fn validate_optional<C: Component + ?Sized>(
    component: Option<&C>,
    context: &ValidationContext<'_>,
) -> Result<()> {
    match component {
        Some(component) => validate_component(component, context),
        None => Ok(()),
    }
}

fn validate_component<C: Component + ?Sized>(
    component: &C,
    context: &ValidationContext<'_>,
) -> Result<()> {
    component
        .is_valid(context)
        .map_err(|message| Error::Validation {
            component: component.name().to_string(),
            message,
        })?;
    if let Some(kind) = context.missing_metric(component.required_metrics()) {
        return Err(Error::Validation {
            component: component.name().to_string(),
            message: format!("requires metric `{kind}`, which is not configured"),
        });
    }
    Ok(())
}
