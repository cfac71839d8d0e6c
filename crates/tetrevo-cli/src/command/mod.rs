use std::{io, path::PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::model::training_config::TrainingConfig;

use self::{
    hybrid_train::HybridTrainArg, play::PlayArg, train::TrainArg, versus::VersusArg,
};

mod hybrid_train;
mod play;
mod train;
mod versus;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log more detail (-v debug, -vv trace). Overrides RUST_LOG
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Evolve weights with the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Evolve survival weights solo, then attack weights in versus games
    HybridTrain(#[clap(flatten)] HybridTrainArg),
    /// Play one headless solo game and print the result
    Play(#[clap(flatten)] PlayArg),
    /// Play two weight models against each other
    Versus(#[clap(flatten)] VersusArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_logging(args.verbose);
    match args.mode {
        Mode::Train(arg) => train::run(&arg)?,
        Mode::HybridTrain(arg) => hybrid_train::run(&arg)?,
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Versus(arg) => versus::run(&arg)?,
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy(),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Options shared by the training commands.
#[derive(Default, Debug, Clone, clap::Args)]
struct TrainingConfigArg {
    /// JSON training config; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations
    #[arg(long)]
    generations: Option<usize>,
    /// Population size
    #[arg(long)]
    population: Option<usize>,
    /// Games played per individual and generation
    #[arg(long)]
    games: Option<usize>,
    /// Seed of the run
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path for the trained model (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Name stored in the saved model
    #[arg(long)]
    name: Option<String>,
}

impl TrainingConfigArg {
    fn load(&self) -> anyhow::Result<TrainingConfig> {
        let mut config = TrainingConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    fn apply(&self, config: &mut TrainingConfig) {
        if let Some(generations) = self.generations {
            config.genetic.generations = generations;
        }
        if let Some(population) = self.population {
            config.genetic.population_size = population;
        }
        if let Some(games) = self.games {
            config.fitness.games_per_individual = games;
        }
        if let Some(seed) = self.seed {
            config.genetic.seed = seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let arg = TrainingConfigArg {
            population: Some(6),
            seed: Some(99),
            ..TrainingConfigArg::default()
        };
        let mut config = TrainingConfig::default();
        arg.apply(&mut config);
        assert_eq!(config.genetic.population_size, 6);
        assert_eq!(config.genetic.seed, 99);
        assert_eq!(config.genetic.generations, 10);
        assert_eq!(config.fitness.games_per_individual, 5);
    }

    #[test]
    fn test_parse_subcommands() {
        let args = CommandArgs::try_parse_from([
            "tetrevo", "-vv", "train", "--mode", "versus", "--generations", "3",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.mode, Mode::Train(_)));

        let args =
            CommandArgs::try_parse_from(["tetrevo", "play", "--difficulty", "hard"]).unwrap();
        assert!(matches!(args.mode, Mode::Play(_)));
        assert!(CommandArgs::try_parse_from(["tetrevo", "play", "--difficulty", "insane"]).is_err());
    }
}
