//! The nine evaluation weights and their valid ranges.
//!
//! Six *survival* weights score the board's shape; three *attack* weights
//! reward clearing 2, 3 or 4 lines at once. Each weight has a fixed range that
//! encodes its expected sign, and values outside it are clamped silently.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Number of weights in a [`WeightSet`].
pub const WEIGHT_COUNT: usize = 9;

/// Identifies one weight of a [`WeightSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WeightId {
    #[display("landing_height")]
    LandingHeight,
    #[display("eroded_cells")]
    ErodedCells,
    #[display("row_transitions")]
    RowTransitions,
    #[display("column_transitions")]
    ColumnTransitions,
    #[display("holes")]
    Holes,
    #[display("well_sums")]
    WellSums,
    #[display("attack_double")]
    AttackDouble,
    #[display("attack_triple")]
    AttackTriple,
    #[display("attack_tetris")]
    AttackTetris,
}

impl WeightId {
    pub const ALL: [WeightId; WEIGHT_COUNT] = [
        WeightId::LandingHeight,
        WeightId::ErodedCells,
        WeightId::RowTransitions,
        WeightId::ColumnTransitions,
        WeightId::Holes,
        WeightId::WellSums,
        WeightId::AttackDouble,
        WeightId::AttackTriple,
        WeightId::AttackTetris,
    ];

    /// Valid range of this weight.
    #[must_use]
    pub fn range(self) -> RangeInclusive<f64> {
        match self {
            WeightId::LandingHeight | WeightId::RowTransitions | WeightId::WellSums => -10.0..=0.0,
            WeightId::ErodedCells => 0.0..=10.0,
            WeightId::ColumnTransitions | WeightId::Holes => -15.0..=0.0,
            WeightId::AttackDouble | WeightId::AttackTriple | WeightId::AttackTetris => 0.0..=20.0,
        }
    }

    #[must_use]
    pub fn group(self) -> WeightGroup {
        match self {
            WeightId::AttackDouble | WeightId::AttackTriple | WeightId::AttackTetris => {
                WeightGroup::Attack
            }
            _ => WeightGroup::Survival,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Partition of the weights used by two-phase training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, derive_more::IsVariant)]
pub enum WeightGroup {
    /// Landing height, eroded cells, transitions, holes and wells.
    #[display("survival")]
    Survival,
    /// Bonuses for multi-line clears.
    #[display("attack")]
    Attack,
}

impl WeightGroup {
    pub fn ids(self) -> impl Iterator<Item = WeightId> {
        WeightId::ALL.into_iter().filter(move |id| id.group() == self)
    }
}

/// Weights of the linear evaluation function.
///
/// # Example
///
/// ```
/// use tetrevo_evaluator::weights::{WeightId, WeightSet};
///
/// let mut weights = WeightSet::default();
/// weights.set(WeightId::Holes, 3.0);
/// assert_eq!(weights.get(WeightId::Holes), 0.0); // clamped to [-15, 0]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightSet {
    pub landing_height: f64,
    pub eroded_cells: f64,
    pub row_transitions: f64,
    pub column_transitions: f64,
    pub holes: f64,
    pub well_sums: f64,
    pub attack_double: f64,
    pub attack_triple: f64,
    pub attack_tetris: f64,
}

impl Default for WeightSet {
    /// Pierre Dellacherie's features with El-Tetris tuned coefficients, plus
    /// moderate attack bonuses.
    fn default() -> Self {
        Self {
            landing_height: -4.500_158_825_082_766,
            eroded_cells: 3.418_126_810_139_269_4,
            row_transitions: -3.217_888_286_848_775_3,
            column_transitions: -9.348_695_305_445_199,
            holes: -7.899_265_427_351_652,
            well_sums: -3.385_597_224_726_362_6,
            attack_double: 2.0,
            attack_triple: 4.0,
            attack_tetris: 8.0,
        }
    }
}

impl WeightSet {
    #[must_use]
    pub fn from_array(values: [f64; WEIGHT_COUNT]) -> Self {
        let [
            landing_height,
            eroded_cells,
            row_transitions,
            column_transitions,
            holes,
            well_sums,
            attack_double,
            attack_triple,
            attack_tetris,
        ] = values;
        Self {
            landing_height,
            eroded_cells,
            row_transitions,
            column_transitions,
            holes,
            well_sums,
            attack_double,
            attack_triple,
            attack_tetris,
        }
    }

    #[must_use]
    pub fn to_array(&self) -> [f64; WEIGHT_COUNT] {
        [
            self.landing_height,
            self.eroded_cells,
            self.row_transitions,
            self.column_transitions,
            self.holes,
            self.well_sums,
            self.attack_double,
            self.attack_triple,
            self.attack_tetris,
        ]
    }

    #[must_use]
    pub fn get(&self, id: WeightId) -> f64 {
        self.to_array()[id.index()]
    }

    /// Sets a weight, clamping it to its valid range.
    pub fn set(&mut self, id: WeightId, value: f64) {
        let mut values = self.to_array();
        values[id.index()] = clamp_to(id, value);
        *self = Self::from_array(values);
    }

    /// Clamps every weight into its valid range. NaN becomes the range midpoint.
    #[must_use]
    pub fn clamped(&self) -> Self {
        let mut values = self.to_array();
        for (id, value) in WeightId::ALL.into_iter().zip(&mut values) {
            *value = clamp_to(id, *value);
        }
        Self::from_array(values)
    }

    /// Copies the weights of `group` from `source`.
    pub fn copy_group_from(&mut self, source: &WeightSet, group: WeightGroup) {
        let mut values = self.to_array();
        for id in group.ids() {
            values[id.index()] = source.get(id);
        }
        *self = Self::from_array(values);
    }

    /// Dot product with a feature vector laid out in [`WeightId::ALL`] order.
    #[must_use]
    pub fn dot(&self, features: &[f64; WEIGHT_COUNT]) -> f64 {
        self.to_array()
            .iter()
            .zip(features)
            .map(|(w, f)| w * f)
            .sum()
    }

    /// Iterates `(id, value)` pairs in [`WeightId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (WeightId, f64)> {
        WeightId::ALL.into_iter().zip(self.to_array())
    }
}

fn clamp_to(id: WeightId, value: f64) -> f64 {
    let range = id.range();
    if value.is_nan() {
        return f64::midpoint(*range.start(), *range.end());
    }
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_within_ranges() {
        let weights = WeightSet::default();
        for (id, value) in weights.iter() {
            assert!(id.range().contains(&value), "{id} = {value}");
        }
        assert_eq!(weights.clamped(), weights);
    }

    #[test]
    fn test_clamped_handles_out_of_range_and_nan() {
        let weights = WeightSet::from_array([
            5.0,
            -1.0,
            -100.0,
            f64::NAN,
            0.0,
            -3.0,
            25.0,
            10.0,
            -0.5,
        ])
        .clamped();
        assert_eq!(weights.landing_height, 0.0);
        assert_eq!(weights.eroded_cells, 0.0);
        assert_eq!(weights.row_transitions, -10.0);
        assert_eq!(weights.column_transitions, -7.5);
        assert_eq!(weights.holes, 0.0);
        assert_eq!(weights.well_sums, -3.0);
        assert_eq!(weights.attack_double, 20.0);
        assert_eq!(weights.attack_triple, 10.0);
        assert_eq!(weights.attack_tetris, 0.0);
    }

    #[test]
    fn test_groups_partition_weights() {
        let survival: Vec<_> = WeightGroup::Survival.ids().collect();
        let attack: Vec<_> = WeightGroup::Attack.ids().collect();
        assert_eq!(survival.len(), 6);
        assert_eq!(
            attack,
            vec![WeightId::AttackDouble, WeightId::AttackTriple, WeightId::AttackTetris]
        );
    }

    #[test]
    fn test_copy_group_from() {
        let mut weights = WeightSet::from_array([-1.0, 1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0]);
        weights.copy_group_from(&WeightSet::default(), WeightGroup::Attack);
        assert_eq!(weights.attack_double, 2.0);
        assert_eq!(weights.attack_tetris, 8.0);
        assert_eq!(weights.holes, -1.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let weights: WeightSet = serde_json::from_str(r#"{"holes": -1.5}"#).unwrap();
        assert_eq!(weights.holes, -1.5);
        assert_eq!(weights.attack_tetris, WeightSet::default().attack_tetris);
    }
}
