use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tetrevo_evaluator::weights::WeightSet;

use crate::util;

/// Trained weights as saved by `train` and `hybrid-train`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WeightModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub final_fitness: f64,
    pub weights: WeightSet,
}

impl WeightModel {
    #[must_use]
    pub fn new(name: impl Into<String>, final_fitness: f64, weights: WeightSet) -> Self {
        Self {
            name: name.into(),
            trained_at: Utc::now(),
            final_fitness,
            weights,
        }
    }

    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("weight model", path)
    }

    /// Weights of the model at `path`, or the defaults when no path is given.
    pub fn weights_or_default(path: Option<&Path>) -> anyhow::Result<WeightSet> {
        match path {
            Some(path) => Ok(Self::open(path)?.weights.clamped()),
            None => Ok(WeightSet::default()),
        }
    }
}
