//! Two-piece lookahead with a bounded beam.
//!
//! # How It Works
//!
//! 1. **Expansion** - every legal move of the current piece is simulated and
//!    scored by the placement evaluator
//! 2. **Pruning** - candidates are ranked and only the best `beam_width` kept
//! 3. **Lookahead** - for each kept board, every move of the next piece is
//!    scored; the best one contributes half its score:
//!    `total = current + 0.5 × best_next`
//! 4. **Selection** - the current move with the highest total wins
//!
//! Ranking is deterministic: higher score first, then lower `x`, then lower
//! rotation. A kept candidate whose board has no legal next move gets a total
//! of `-∞`. When no candidate survives lookahead the planner degrades to the
//! greedy best current move, and when there is no legal move at all it
//! returns `None`, which the caller treats as game over.

use std::cmp::Ordering;

use tetrevo_engine::{Board, PieceKind};
use tracing::trace;

use crate::{
    board_simulator::{SimulationResult, simulate_move},
    move_generator::{Move, generate_moves},
    placement_evaluator::{LinearEvaluator, PlacementEvaluator},
    weights::WeightSet,
};

/// Default number of candidates kept for lookahead.
pub const DEFAULT_BEAM_WIDTH: usize = 3;
/// Weight of the best next-piece score in the combined total.
pub const LOOKAHEAD_DISCOUNT: f64 = 0.5;

/// A scored placement of the current piece.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub mv: Move,
    pub score: f64,
    pub result: SimulationResult,
}

/// The placement chosen by the planner.
#[derive(Debug, Clone)]
pub struct Plan {
    pub mv: Move,
    /// Score of the current placement alone.
    pub score: f64,
    /// `score + 0.5 × best_next`, or `score` when no lookahead was used.
    pub total: f64,
    pub result: SimulationResult,
    /// Whether the plan came from the greedy fallback.
    pub greedy: bool,
}

#[derive(Debug, Clone)]
pub struct BeamSearchPlanner<E = LinearEvaluator> {
    evaluator: E,
    beam_width: usize,
}

impl BeamSearchPlanner {
    /// Creates a planner scoring with a linear evaluator over `weights`.
    #[must_use]
    pub fn with_weights(weights: WeightSet) -> Self {
        Self::new(LinearEvaluator::new(weights))
    }
}

impl<E> BeamSearchPlanner<E>
where
    E: PlacementEvaluator,
{
    #[must_use]
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            beam_width: DEFAULT_BEAM_WIDTH,
        }
    }

    /// Sets the beam width (at least 1).
    #[must_use]
    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width.max(1);
        self
    }

    #[must_use]
    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Scores every legal move of `kind`, best first.
    #[must_use]
    pub fn expand(&self, board: &Board, kind: PieceKind) -> Vec<Candidate> {
        let mut candidates: Vec<_> = generate_moves(board, kind)
            .into_iter()
            .filter_map(|mv| {
                let result = simulate_move(board, kind, mv)?;
                let score = self.evaluator.evaluate_placement(&result);
                Some(Candidate { mv, score, result })
            })
            .collect();
        candidates.sort_by(|a, b| rank(a.score, a.mv, b.score, b.mv));
        candidates
    }

    /// Best single-piece placement, without lookahead.
    #[must_use]
    pub fn plan_greedy(&self, board: &Board, kind: PieceKind) -> Option<Plan> {
        self.expand(board, kind)
            .into_iter()
            .next()
            .map(Plan::greedy)
    }

    /// Chooses a placement for `current`, looking ahead at `next` when known.
    #[must_use]
    pub fn plan(&self, board: &Board, current: PieceKind, next: Option<PieceKind>) -> Option<Plan> {
        let mut candidates = self.expand(board, current);
        if candidates.is_empty() {
            trace!(?current, "no legal placement");
            return None;
        }
        let Some(next) = next else {
            return candidates.into_iter().next().map(Plan::greedy);
        };

        candidates.truncate(self.beam_width);
        let mut best: Option<Plan> = None;
        for candidate in &candidates {
            let best_next = self
                .expand(&candidate.result.board, next)
                .first()
                .map(|c| c.score);
            let total = best_next.map_or(f64::NEG_INFINITY, |s| {
                candidate.score + LOOKAHEAD_DISCOUNT * s
            });
            if total == f64::NEG_INFINITY {
                continue;
            }
            let better = best.as_ref().is_none_or(|b| {
                rank(total, candidate.mv, b.total, b.mv) == Ordering::Less
            });
            if better {
                best = Some(Plan {
                    mv: candidate.mv,
                    score: candidate.score,
                    total,
                    result: candidate.result.clone(),
                    greedy: false,
                });
            }
        }

        if best.is_none() {
            trace!(?current, ?next, "lookahead found nothing, falling back to greedy");
        }
        best.or_else(|| candidates.into_iter().next().map(Plan::greedy))
    }
}

impl Plan {
    fn greedy(candidate: Candidate) -> Self {
        Self {
            mv: candidate.mv,
            score: candidate.score,
            total: candidate.score,
            result: candidate.result,
            greedy: true,
        }
    }
}

/// Orders `(score, move)` pairs best first: higher score, then lower `x`,
/// then lower rotation.
fn rank(score_a: f64, mv_a: Move, score_b: f64, mv_b: Move) -> Ordering {
    score_b
        .total_cmp(&score_a)
        .then(mv_a.x.cmp(&mv_b.x))
        .then(mv_a.rotation.cmp(&mv_b.rotation))
}

#[cfg(test)]
mod tests {
    use tetrevo_engine::PieceRotation;

    use super::*;
    use crate::board_analysis::BoardAnalysis;

    fn planner() -> BeamSearchPlanner {
        BeamSearchPlanner::with_weights(WeightSet::default())
    }

    #[test]
    fn test_vertical_i_on_empty_board_lands_flat_without_holes() {
        let board = Board::EMPTY;
        let plan = planner().plan(&board, PieceKind::I, Some(PieceKind::I)).unwrap();
        assert!(!plan.greedy);
        let holes = BoardAnalysis::new(&plan.result.board).num_holes();
        assert_eq!(holes, 0);
        // lowest possible landing height for any I placement
        let min_landing = planner()
            .expand(&board, PieceKind::I)
            .iter()
            .map(|c| c.result.landing_height)
            .min()
            .unwrap();
        assert_eq!(plan.result.landing_height, min_landing);
    }

    #[test]
    fn test_chooses_line_clear_over_overhang() {
        let board = Board::from_ascii(
            "
            #####.####
            #####.####
            ",
        );
        let plan = planner().plan(&board, PieceKind::I, Some(PieceKind::O)).unwrap();
        assert_eq!(plan.mv, Move::new(3, PieceRotation::new(1)));
        assert_eq!(plan.result.lines_cleared, 2);
        assert_eq!(BoardAnalysis::new(&plan.result.board).num_holes(), 0);
    }

    #[test]
    fn test_expand_is_sorted_with_tie_break() {
        let candidates = planner().expand(&Board::EMPTY, PieceKind::O);
        for pair in candidates.windows(2) {
            let order = rank(pair[0].score, pair[0].mv, pair[1].score, pair[1].mv);
            assert_ne!(order, Ordering::Greater);
        }
        // placements at either wall mirror each other; the left one ranks first
        let first = &candidates[0];
        assert_eq!(first.mv.x, 0);
    }

    #[test]
    fn test_no_move_when_board_is_full() {
        let board = Board::from_ascii(&"#########.\n".repeat(19));
        // only column 9 is open and every piece but I is too wide for it
        assert!(planner().plan(&board, PieceKind::O, Some(PieceKind::T)).is_none());
        assert!(planner().plan_greedy(&board, PieceKind::O).is_none());
    }

    #[test]
    fn test_greedy_fallback_when_next_piece_has_no_room() {
        // a 2-wide, 4-deep shaft at the right; everything below is sealed
        let mut art = "########..\n".repeat(4);
        art.push_str(&".#########\n".repeat(15));
        let board = Board::from_ascii(&art);
        // any vertical I leaves a 1-wide shaft, where no O fits
        let plan = planner().plan(&board, PieceKind::I, Some(PieceKind::O)).unwrap();
        assert!(plan.greedy);
        assert_eq!(plan.result.lines_cleared, 0);
        assert_eq!(plan.mv, Move::new(6, PieceRotation::new(1)));
    }

    #[test]
    fn test_without_next_piece_plan_is_greedy() {
        let plan = planner().plan(&Board::EMPTY, PieceKind::T, None).unwrap();
        assert!(plan.greedy);
        let greedy = planner().plan_greedy(&Board::EMPTY, PieceKind::T).unwrap();
        assert_eq!(plan.mv, greedy.mv);
    }

    #[test]
    fn test_beam_width_is_at_least_one() {
        assert_eq!(planner().with_beam_width(0).beam_width(), 1);
    }
}
