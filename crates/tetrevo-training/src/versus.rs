//! Two players in lockstep, exchanging garbage rows.
//!
//! Both boards are advanced by one tick each, then the [`AttackAdjudicator`]
//! drains the lock events each board produced during that tick and turns every
//! multi-line clear into garbage rows for the other board. This hand-off is the
//! only point where the two games interact.
//!
//! A match ends as soon as either board tops out. If both top out on the same
//! tick, or the move or time limit is reached first, it is a draw.

use serde::{Deserialize, Serialize};
use tetrevo_engine::{BoardRow, ClearedRow, GameField, PieceSeed};
use tetrevo_evaluator::weights::WeightSet;
use tracing::debug;

use crate::{
    TrainingError,
    fitness::{CancelToken, FitnessParams},
    individual::{GameOutcome, GameResult},
    simulation::SimulatedPlayer,
};

/// Fewest lines a single placement must clear to send garbage.
pub const MIN_ATTACK_LINES: usize = 2;
pub const WIN_SCORE_BONUS: f64 = 1000.0;
/// Lines credited to the winner on top of those actually cleared.
pub const WIN_LINES_BONUS: u32 = 10;
pub const LOSS_SCORE_PENALTY: f64 = 500.0;

/// Moves garbage between two boards at the end of each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackAdjudicator;

impl AttackAdjudicator {
    /// Sends the attacks `attacker` produced since the last call to `defender`.
    ///
    /// Returns the number of garbage rows sent. A defender that cannot take the
    /// rows without pushing blocks out of the top is declared game over.
    pub fn transfer(&self, attacker: &mut GameField, defender: &mut GameField) -> usize {
        let mut sent = 0;
        for event in attacker.consume_lock_events() {
            if event.lines_cleared() < MIN_ATTACK_LINES {
                continue;
            }
            // the lowest cleared row goes in at the bottom
            let rows: Vec<BoardRow> = event
                .cleared_rows
                .iter()
                .rev()
                .map(ClearedRow::to_garbage)
                .collect();
            attacker.record_garbage_sent(rows.len());
            sent += rows.len();
            if !defender.add_attack_blocks_to_bottom(&rows) {
                debug!(rows = rows.len(), "garbage overflowed the receiving board");
                defender.declare_game_over();
            }
        }
        sent
    }

    /// Runs [`transfer`](Self::transfer) in both directions.
    pub fn exchange(&self, first: &mut GameField, second: &mut GameField) {
        self.transfer(first, second);
        self.transfer(second, first);
    }
}

/// One player's side of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub lines_cleared: u32,
    pub score: usize,
    pub pieces: usize,
    pub garbage_sent: usize,
    pub garbage_received: usize,
    pub topped_out: bool,
}

impl PlayerSummary {
    fn of(player: &SimulatedPlayer) -> Self {
        let stats = player.field().stats();
        Self {
            lines_cleared: player.lines_cleared(),
            score: stats.score(),
            pieces: stats.completed_pieces(),
            garbage_sent: stats.garbage_sent(),
            garbage_received: stats.garbage_received(),
            topped_out: player.is_game_over(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersusResult {
    pub players: [PlayerSummary; 2],
    pub ticks: u64,
    pub game_time_ms: u64,
}

impl VersusResult {
    /// Outcome from the point of view of player `index` (0 or 1).
    #[must_use]
    pub fn outcome_for(&self, index: usize) -> GameOutcome {
        let me = self.players[index].topped_out;
        let other = self.players[1 - index].topped_out;
        match (me, other) {
            (true, false) => GameOutcome::Loss,
            (false, true) => GameOutcome::Win,
            _ => GameOutcome::Draw,
        }
    }

    /// Game result of player `index`, with win bonuses or the loss penalty applied.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn result_for(&self, index: usize) -> GameResult {
        let player = &self.players[index];
        let outcome = self.outcome_for(index);
        let mut score = player.score as f64;
        let mut lines_cleared = player.lines_cleared;
        match outcome {
            GameOutcome::Win => {
                score += WIN_SCORE_BONUS;
                lines_cleared += WIN_LINES_BONUS;
            }
            GameOutcome::Loss => score = (score - LOSS_SCORE_PENALTY).max(0.0),
            GameOutcome::Draw | GameOutcome::Solo => {}
        }
        GameResult {
            lines_cleared,
            score,
            outcome,
            game_time_ms: self.game_time_ms,
            topped_out: player.topped_out,
        }
    }
}

/// Plays `first` against `second`, both on the piece sequence of `seed`.
pub fn run_versus(
    first: &WeightSet,
    second: &WeightSet,
    seed: PieceSeed,
    params: &FitnessParams,
    cancel: &CancelToken,
) -> Result<VersusResult, TrainingError> {
    let mut players = [
        SimulatedPlayer::new(first, seed, params),
        SimulatedPlayer::new(second, seed, params),
    ];
    let adjudicator = AttackAdjudicator;
    let mut tick = 0;
    loop {
        let moves = players.iter().map(SimulatedPlayer::moves).max().unwrap_or(0);
        if players.iter().any(SimulatedPlayer::is_game_over) || params.limits_reached(tick, moves)
        {
            break;
        }
        cancel.check()?;
        let [a, b] = &mut players;
        a.tick(tick, params.gravity_interval);
        b.tick(tick, params.gravity_interval);
        adjudicator.exchange(a.field_mut(), b.field_mut());
        tick += 1;
    }
    Ok(VersusResult {
        players: [PlayerSummary::of(&players[0]), PlayerSummary::of(&players[1])],
        ticks: tick,
        game_time_ms: tick * params.tick_ms,
    })
}

#[cfg(test)]
mod tests {
    use tetrevo_engine::{Block, Board, GameControl, PieceKind};

    use super::*;

    fn summary(topped_out: bool) -> PlayerSummary {
        PlayerSummary {
            lines_cleared: 4,
            score: 800,
            pieces: 30,
            garbage_sent: 0,
            garbage_received: 0,
            topped_out,
        }
    }

    #[test]
    fn test_outcomes() {
        let result = VersusResult {
            players: [summary(false), summary(true)],
            ticks: 10,
            game_time_ms: 500,
        };
        assert_eq!(result.outcome_for(0), GameOutcome::Win);
        assert_eq!(result.outcome_for(1), GameOutcome::Loss);

        let win = result.result_for(0);
        assert_eq!(win.lines_cleared, 4 + WIN_LINES_BONUS);
        assert!((win.score - (800.0 + WIN_SCORE_BONUS)).abs() < 1e-9);
        let loss = result.result_for(1);
        assert!((loss.score - 300.0).abs() < 1e-9);
        assert!(loss.topped_out);

        let draw = VersusResult {
            players: [summary(true), summary(true)],
            ..result
        };
        assert_eq!(draw.outcome_for(0), GameOutcome::Draw);
        assert!((draw.result_for(1).score - 800.0).abs() < 1e-9);
    }

    /// Field whose first piece is an I, above two rows open only in column 9.
    fn attacker() -> GameField {
        let seed = (0..)
            .map(PieceSeed::from_u64)
            .find(|&seed| GameField::with_seed(seed).current_piece().kind() == PieceKind::I)
            .unwrap();
        let board = Board::from_ascii(
            "
            #########.
            #########.
            ",
        );
        GameField::with_seed(seed).with_board(board)
    }

    #[test]
    fn test_double_clear_sends_two_garbage_rows() {
        let mut a = attacker();
        let mut b = GameField::with_seed(PieceSeed::from_u64(9));
        // vertical I into the right column
        a.rotate().unwrap();
        while a.move_right().is_ok() {}
        let locked = a.hard_drop().unwrap();
        assert_eq!(locked.lines_cleared(), 2);

        let sent = AttackAdjudicator.transfer(&mut a, &mut b);
        assert_eq!(sent, 2);
        assert_eq!(a.stats().garbage_sent(), 2);
        assert_eq!(b.stats().garbage_received(), 2);
        // the I cells become the gaps; everything else is garbage
        for y in [18, 19] {
            let row = b.board().row(y);
            assert_eq!(row.count(), 9);
            assert!(!row.is_occupied(9));
            assert_eq!(row.block(0), Some(Block::Garbage));
        }
        // events are consumed once
        assert_eq!(AttackAdjudicator.transfer(&mut a, &mut b), 0);
    }

    #[test]
    fn test_single_clear_sends_nothing() {
        let mut a = attacker().with_board(Board::from_ascii("#########.\n"));
        let mut b = GameField::with_seed(PieceSeed::from_u64(9));
        a.rotate().unwrap();
        while a.move_right().is_ok() {}
        assert_eq!(a.hard_drop().unwrap().lines_cleared(), 1);
        assert_eq!(AttackAdjudicator.transfer(&mut a, &mut b), 0);
        assert_eq!(b.board(), &Board::EMPTY);
    }

    #[test]
    fn test_overflowing_attack_ends_defender() {
        let mut a = attacker();
        let mut b = GameField::with_seed(PieceSeed::from_u64(9))
            .with_board(Board::from_ascii(&"#.########\n".repeat(19)));
        a.rotate().unwrap();
        while a.move_right().is_ok() {}
        a.hard_drop().unwrap();
        AttackAdjudicator.transfer(&mut a, &mut b);
        assert!(b.is_game_over());
        assert_eq!(b.stats().garbage_received(), 0);
    }

    #[test]
    fn test_match_is_deterministic() {
        let params = FitnessParams {
            max_moves: 25,
            ..FitnessParams::default()
        };
        let cancel = CancelToken::new();
        let seed = PieceSeed::from_u64(21);
        let mut aggressive = WeightSet::default();
        aggressive.attack_tetris = 20.0;
        let a = run_versus(&aggressive, &WeightSet::default(), seed, &params, &cancel).unwrap();
        let b = run_versus(&aggressive, &WeightSet::default(), seed, &params, &cancel).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.game_time_ms, a.ticks * params.tick_ms);
        assert_eq!(a.result_for(0).outcome, a.outcome_for(0));
    }

    #[test]
    fn test_identical_players_draw() {
        let params = FitnessParams {
            max_moves: 20,
            ..FitnessParams::default()
        };
        let weights = WeightSet::default();
        let result = run_versus(
            &weights,
            &weights,
            PieceSeed::from_u64(4),
            &params,
            &CancelToken::new(),
        )
        .unwrap();
        // same weights and pieces: both boards evolve identically
        assert_eq!(result.players[0], result.players[1]);
        assert_eq!(result.outcome_for(0), GameOutcome::Draw);
    }
}
