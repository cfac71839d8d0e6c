//! Placement evaluation: scoring a simulated placement.
//!
//! The score is a weighted linear combination of nine features:
//!
//! ```text
//! score = w₁·landing_height + w₂·eroded_cells + w₃·row_transitions
//!       + w₄·column_transitions + w₅·holes + w₆·well_sums
//!       + w₇·[lines = 2] + w₈·[lines = 3] + w₉·[lines = 4]
//! ```
//!
//! The first six come from Pierre Dellacherie's hand-crafted evaluator. The
//! last three are flat bonuses for multi-line clears, which send garbage to an
//! opponent in versus play. Structural features are computed on the board after
//! line clears; landing height and eroded cells describe the placement itself.

use std::fmt;

use crate::{
    board_analysis::BoardAnalysis,
    board_simulator::SimulationResult,
    weights::{WEIGHT_COUNT, WeightSet},
};

/// Scores simulated placements (higher is better).
pub trait PlacementEvaluator: fmt::Debug + Send + Sync {
    fn evaluate_placement(&self, result: &SimulationResult) -> f64;
}

/// Feature values of a placement, laid out in [`WeightId::ALL`] order.
///
/// [`WeightId::ALL`]: crate::weights::WeightId::ALL
#[must_use]
pub fn placement_features(result: &SimulationResult) -> [f64; WEIGHT_COUNT] {
    let analysis = BoardAnalysis::new(&result.board);
    let attack = |lines: u32| if result.lines_cleared == lines { 1.0 } else { 0.0 };
    [
        f64::from(result.landing_height),
        f64::from(result.eroded_cells()),
        f64::from(analysis.row_transitions()),
        f64::from(analysis.column_transitions()),
        f64::from(analysis.num_holes()),
        f64::from(analysis.well_sums()),
        attack(2),
        attack(3),
        attack(4),
    ]
}

/// Linear evaluator over a [`WeightSet`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearEvaluator {
    weights: WeightSet,
}

impl LinearEvaluator {
    #[must_use]
    pub fn new(weights: WeightSet) -> Self {
        Self { weights }
    }

    #[must_use]
    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }
}

impl Default for LinearEvaluator {
    fn default() -> Self {
        Self::new(WeightSet::default())
    }
}

impl PlacementEvaluator for LinearEvaluator {
    fn evaluate_placement(&self, result: &SimulationResult) -> f64 {
        self.weights.dot(&placement_features(result))
    }
}
