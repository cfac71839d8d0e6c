use std::path::PathBuf;

use tetrevo_engine::PieceSeed;
use tetrevo_training::{
    fitness::{CancelToken, FitnessParams},
    individual::GameOutcome,
    versus::{self, PlayerSummary},
};

use crate::model::weight_model::WeightModel;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct VersusArg {
    /// Weight model of the first player (default weights if omitted)
    #[arg(long)]
    first: Option<PathBuf>,
    /// Weight model of the second player (default weights if omitted)
    #[arg(long)]
    second: Option<PathBuf>,
    /// Number of matches; match `i` uses seed `seed + i`
    #[arg(long, default_value_t = 1)]
    games: u64,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Stop a match after this many pieces
    #[arg(long, default_value_t = 500)]
    max_moves: usize,
}

pub(crate) fn run(arg: &VersusArg) -> anyhow::Result<()> {
    let first = WeightModel::weights_or_default(arg.first.as_deref())?;
    let second = WeightModel::weights_or_default(arg.second.as_deref())?;
    let params = FitnessParams {
        max_moves: arg.max_moves,
        ..FitnessParams::default()
    };
    let cancel = CancelToken::new();

    let (mut wins, mut losses, mut draws) = (0, 0, 0);
    for i in 0..arg.games {
        let seed = arg.seed.wrapping_add(i);
        let result = versus::run_versus(
            &first,
            &second,
            PieceSeed::from_u64(seed),
            &params,
            &cancel,
        )?;
        let outcome = result.outcome_for(0);
        match outcome {
            GameOutcome::Win => wins += 1,
            GameOutcome::Loss => losses += 1,
            GameOutcome::Draw | GameOutcome::Solo => draws += 1,
        }
        eprintln!("Match #{i} (seed {seed}): first player {outcome} after {} ticks", result.ticks);
        print_player("first", &result.players[0]);
        print_player("second", &result.players[1]);
    }

    eprintln!();
    eprintln!("First player: {wins} wins, {losses} losses, {draws} draws");
    Ok(())
}

fn print_player(label: &str, player: &PlayerSummary) {
    eprintln!(
        "  {label:<6} lines {:>4}  score {:>6}  pieces {:>4}  sent {:>3}  received {:>3}{}",
        player.lines_cleared,
        player.score,
        player.pieces,
        player.garbage_sent,
        player.garbage_received,
        if player.topped_out { "  topped out" } else { "" },
    );
}
