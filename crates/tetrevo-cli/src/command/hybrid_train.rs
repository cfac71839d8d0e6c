use tetrevo_training::hybrid::HybridGeneticAlgorithm;

use crate::model::weight_model::WeightModel;

use super::{
    TrainingConfigArg,
    train::{print_generation, print_individual_weights, save_model},
};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct HybridTrainArg {
    /// Generations of the solo survival phase
    #[arg(long)]
    phase1_generations: Option<usize>,
    /// Generations of the versus attack phase
    #[arg(long)]
    phase2_generations: Option<usize>,
    #[clap(flatten)]
    config: TrainingConfigArg,
}

pub(crate) fn run(arg: &HybridTrainArg) -> anyhow::Result<()> {
    let mut config = arg.config.load()?;
    if let Some(generations) = arg.phase1_generations {
        config.hybrid.phase1_generations = generations;
    }
    if let Some(generations) = arg.phase2_generations {
        config.hybrid.phase2_generations = generations;
    }

    eprintln!(
        "Hybrid training: {} survival + {} attack generations, population {}, seed {}",
        config.hybrid.phase1_generations,
        config.hybrid.phase2_generations,
        config.genetic.population_size,
        config.genetic.seed
    );
    let outcome =
        HybridGeneticAlgorithm::new(config.genetic, config.fitness, config.hybrid).run()?;

    let phases = [
        ("Phase 1 (solo)", &outcome.phase1),
        ("Phase 2 (versus)", &outcome.phase2),
    ];
    for (label, phase) in phases {
        eprintln!();
        eprintln!("{label}:");
        for generation in &phase.history {
            print_generation(generation);
        }
    }
    eprintln!("Combined weights:");
    print_individual_weights(&outcome.weights.iter().collect::<Vec<_>>());

    let name = arg.config.name.clone().unwrap_or_else(|| "hybrid".to_owned());
    let model = WeightModel::new(name, outcome.phase2.best.fitness(), outcome.weights);
    save_model(&model, &arg.config)
}
