use clap::ValueEnum;
use tetrevo_training::{
    fitness::{FitnessEvaluator, FitnessMode},
    genetic::{GenerationResult, GeneticAlgorithm},
};

use crate::{model::weight_model::WeightModel, util};

use super::TrainingConfigArg;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// Score by surviving alone
    #[default]
    Solo,
    /// Score against the previous generation's champion
    Versus,
}

impl From<ModeArg> for FitnessMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Solo => FitnessMode::Solo,
            ModeArg::Versus => FitnessMode::Versus,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Fitness mode
    #[arg(long, value_enum, default_value_t)]
    mode: ModeArg,
    #[clap(flatten)]
    config: TrainingConfigArg,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.config.load()?;
    let mode = FitnessMode::from(arg.mode);
    let evaluator = FitnessEvaluator::new(config.fitness, mode);
    let mut ga = GeneticAlgorithm::new(config.genetic, evaluator)?;

    eprintln!(
        "Training {mode} weights: {} generations, population {}, seed {}",
        config.genetic.generations, config.genetic.population_size, config.genetic.seed
    );
    let outcome = ga.run()?;

    eprintln!();
    eprintln!("Fitness by generation:");
    for generation in &outcome.history {
        print_generation(generation);
    }
    eprintln!("Best individual:");
    print_individual_weights(&outcome.best.weights().iter().collect::<Vec<_>>());
    eprintln!("  => {:.3}", outcome.best.fitness());

    let name = arg.config.name.clone().unwrap_or_else(|| mode.to_string());
    let model = WeightModel::new(name, outcome.best.fitness(), *outcome.best.weights());
    save_model(&model, &arg.config)
}

pub(super) fn print_generation(result: &GenerationResult) {
    eprintln!(
        "  #{:<3} best {:>10.3}  avg {:>10.3}  worst {:>10.3}  mutation {:.4}  ({:.1?})",
        result.generation,
        result.best_fitness,
        result.average_fitness,
        result.worst_fitness,
        result.mutation_rate,
        result.elapsed,
    );
}

pub(super) fn print_individual_weights<I>(weights: &[(I, f64)])
where
    I: std::fmt::Display,
{
    for (id, value) in weights {
        eprintln!("  {id:<20} {value:>8.3}");
    }
}

pub(super) fn save_model(model: &WeightModel, arg: &TrainingConfigArg) -> anyhow::Result<()> {
    util::write_json(model, arg.output.as_deref())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &arg.output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Final fitness: {:.3}", model.final_fitness);
    Ok(())
}
