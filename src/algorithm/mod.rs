//! Generational algorithm orchestration.
//!
//! # Components
//!
//! - [`AlgorithmConfig`]: sizing, seeding and evaluation concurrency
//! - [`Algorithm`]: lifecycle (`initialize`, `step`, `run`, `complete`)
//! - [`GeneticOperations`]: elitism, selection, crossover and mutation helpers
//!   lent to a producer
//! - [`GenerationProducer`]: builds the next generation of a population;
//!   [`SimpleGeneration`] is the classic elitism + offspring scheme
//!
//! # Example
//!
//! ```
//! use u_evolve::{
//!     Algorithm, AlgorithmConfig, Component, DefaultPopulationSeed, Entity, EntitySeed,
//!     EvaluationMode, FitnessEvaluator, GenerationTerminator, Genome, Population, Ranking,
//!     SelectionOperator, SimpleGeneration,
//! };
//! use futures::future::BoxFuture;
//! use rand::{Rng, RngCore};
//! use std::cmp::Ordering;
//!
//! #[derive(Debug, Clone)]
//! struct Point(f64);
//!
//! impl Genome for Point {
//!     fn compare(&self, other: &Self) -> Ordering {
//!         self.0.total_cmp(&other.0)
//!     }
//! }
//!
//! struct Sphere;
//! impl Component for Sphere {}
//! impl FitnessEvaluator<Point> for Sphere {
//!     fn evaluation_mode(&self) -> EvaluationMode {
//!         EvaluationMode::Minimize
//!     }
//!     fn evaluate_fitness<'a>(&'a self, entity: &'a Entity<Point>) -> BoxFuture<'a, anyhow::Result<f64>> {
//!         let x = entity.genome().0;
//!         Box::pin(async move { Ok(x * x) })
//!     }
//! }
//!
//! struct Uniform;
//! impl Component for Uniform {}
//! impl EntitySeed<Point> for Uniform {
//!     fn create_genome(&self, rng: &mut dyn RngCore) -> Point {
//!         Point(rng.random_range(-10.0..10.0))
//!     }
//! }
//!
//! struct Random;
//! impl Component for Random {}
//! impl SelectionOperator<Point> for Random {
//!     fn select_entities(
//!         &self,
//!         count: usize,
//!         population: &Population<Point>,
//!         _ranking: Ranking,
//!         rng: &mut dyn RngCore,
//!     ) -> u_evolve::Result<Vec<Entity<Point>>> {
//!         let entities = population.entities();
//!         Ok((0..count)
//!             .map(|_| entities[rng.random_range(0..entities.len())].clone())
//!             .collect())
//!     }
//! }
//!
//! let mut algorithm: Algorithm<Point> = Algorithm::new(
//!     AlgorithmConfig::default().with_minimum_population_size(20).with_seed(1),
//!     SimpleGeneration,
//! )
//! .with_fitness_evaluator(Sphere)
//! .with_population_seed(DefaultPopulationSeed)
//! .with_entity_seed(Uniform)
//! .with_selection_operator(Random)
//! .with_terminator(GenerationTerminator::new(5));
//!
//! futures::executor::block_on(async {
//!     algorithm.initialize().await?;
//!     algorithm.run().await
//! })
//! .unwrap();
//! assert_eq!(algorithm.current_generation(), 5);
//! ```

mod config;
mod operations;
mod producer;
mod runner;

pub use config::AlgorithmConfig;
pub use operations::GeneticOperations;
pub use producer::{GenerationProducer, SimpleGeneration};
pub use runner::{Algorithm, RunState};
