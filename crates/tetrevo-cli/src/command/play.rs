use std::path::PathBuf;

use clap::ValueEnum;
use tetrevo_engine::{GameControl, PieceSeed};
use tetrevo_evaluator::agent::Difficulty;
use tetrevo_training::{fitness::FitnessParams, simulation::SimulatedPlayer};

use crate::model::weight_model::WeightModel;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DifficultyArg {
    Easy,
    #[default]
    Normal,
    Hard,
    Instant,
}

impl From<DifficultyArg> for Difficulty {
    fn from(difficulty: DifficultyArg) -> Self {
        match difficulty {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
            DifficultyArg::Instant => Difficulty::Instant,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Weight model to play with (default weights if omitted)
    #[arg(long)]
    model: Option<PathBuf>,
    /// Ticks the agent waits between actions
    #[arg(long, value_enum, default_value_t)]
    difficulty: DifficultyArg,
    /// Seed of the piece sequence
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Stop after this many pieces
    #[arg(long, default_value_t = 1000)]
    max_moves: usize,
    /// Stop after this much simulated time
    #[arg(long, default_value_t = 600_000)]
    max_time_ms: u64,
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let weights = WeightModel::weights_or_default(arg.model.as_deref())?;
    let difficulty = Difficulty::from(arg.difficulty);
    let params = FitnessParams {
        max_moves: arg.max_moves,
        max_time_ms: arg.max_time_ms,
        think_delay: difficulty.think_delay(),
        ..FitnessParams::default()
    };

    let mut player = SimulatedPlayer::new(&weights, PieceSeed::from_u64(arg.seed), &params);
    let mut tick = 0;
    while !player.is_game_over() && !params.limits_reached(tick, player.moves()) {
        player.tick(tick, params.gravity_interval);
        tick += 1;
    }

    let stats = player.field().stats();
    eprintln!("Game finished ({difficulty}, seed {})", arg.seed);
    eprintln!("  Topped out:    {}", player.is_game_over());
    eprintln!("  Ticks:         {tick}");
    eprintln!("  Time:          {:.1} s", tick as f64 * params.tick_ms as f64 / 1000.0);
    eprintln!("  Pieces:        {}", stats.completed_pieces());
    eprintln!("  Lines:         {}", stats.total_cleared_lines());
    eprintln!("  Score:         {}", stats.score());
    eprintln!("  Line clears:   {:?}", stats.clears_by_size());
    eprintln!("  Mean holes:    {:.2}", player.samples().mean_holes());
    eprintln!("  Mean height:   {:.2}", player.samples().mean_max_height());
    eprintln!();
    eprint!("{}", player.field().board());
    Ok(())
}
