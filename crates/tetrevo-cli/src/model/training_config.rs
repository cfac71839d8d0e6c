use std::path::Path;

use serde::{Deserialize, Serialize};
use tetrevo_training::{fitness::FitnessParams, genetic::GeneticParams, hybrid::HybridParams};

use crate::util;

/// Everything a training run can be configured with, as read from `--config`.
///
/// Missing sections and fields take their defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub genetic: GeneticParams,
    pub fitness: FitnessParams,
    pub hybrid: HybridParams,
}

impl TrainingConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => util::read_json_file("training config", path),
            None => Ok(Self::default()),
        }
    }
}
