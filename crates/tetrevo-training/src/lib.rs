//! Evolving evaluation weights through self-play.
//!
//! This crate tunes the nine [`WeightSet`] weights of the move-search evaluator
//! with a generational genetic algorithm. Every individual is scored by letting
//! an [`AiAgent`] driven by its weights play simulated games, either alone or
//! against the previous generation's champion.
//!
//! # How Training Works
//!
//! 1. **Population** - Individuals start from weights drawn uniformly from
//!    each weight's valid range
//! 2. **Evaluation** - Each individual plays the same seeded games in parallel
//!    ([`fitness`], [`simulation`], [`versus`])
//! 3. **Fitness** - Game results fold into a single score ([`individual`])
//! 4. **Selection** - Elites survive unchanged; the rest come from tournament
//!    selection
//! 5. **Reproduction** - Uniform crossover and Gaussian mutation ([`weights`])
//! 6. **Repeat** - The mutation rate decays geometrically each generation
//!
//! # Architecture
//!
//! ```text
//! HybridGeneticAlgorithm (phase 1 survival, phase 2 attack)
//!     ↓ runs
//! GeneticAlgorithm (population, elitism, opponent tracking)
//!     ↓ scores with
//! FitnessEvaluator (solo or versus games)
//!     ↓ drives
//! SimulatedPlayer (GameField + AiAgent, one tick at a time)
//! ```
//!
//! # Reproducibility
//!
//! A run owns a single [`Pcg64`](rand_pcg::Pcg64) seeded from
//! [`GeneticParams::seed`](genetic::GeneticParams::seed). Game seeds for a
//! generation are drawn from it before the parallel evaluation starts, and all
//! individuals of a generation play the same games, so results never depend on
//! thread scheduling.
//!
//! # Example
//!
//! ```no_run
//! use tetrevo_training::{
//!     fitness::{FitnessEvaluator, FitnessMode, FitnessParams},
//!     genetic::{GeneticAlgorithm, GeneticParams},
//! };
//!
//! let evaluator = FitnessEvaluator::new(FitnessParams::default(), FitnessMode::Solo);
//! let mut ga = GeneticAlgorithm::new(GeneticParams::default(), evaluator)?;
//! let outcome = ga.run()?;
//! println!("best fitness: {:.1}", outcome.best.fitness());
//! # Ok::<(), tetrevo_training::TrainingError>(())
//! ```
//!
//! [`WeightSet`]: tetrevo_evaluator::weights::WeightSet
//! [`AiAgent`]: tetrevo_evaluator::agent::AiAgent

pub mod fitness;
pub mod genetic;
pub mod hybrid;
pub mod individual;
pub mod simulation;
pub mod versus;
pub mod weights;

/// Errors that stop a training run.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TrainingError {
    /// A [`CancelToken`](fitness::CancelToken) was raised during evaluation.
    /// The population is left as it was before the generation started.
    #[display("training was cancelled")]
    Cancelled,
    #[display("invalid training parameters: {_0}")]
    InvalidParams(#[error(not(source))] String),
}
