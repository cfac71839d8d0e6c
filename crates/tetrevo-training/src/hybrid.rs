//! Two-phase training: survival first, then attack.
//!
//! Phase 1 plays solo games with the attack weights frozen at their defaults,
//! so only the survival weights evolve. Phase 2 freezes the survival weights
//! found in phase 1 and evolves the attack weights in versus games against the
//! phase-1 champion.

use serde::{Deserialize, Serialize};
use tetrevo_evaluator::weights::{WeightGroup, WeightSet};
use tracing::info;

use crate::{
    TrainingError,
    fitness::{CancelToken, FitnessEvaluator, FitnessMode, FitnessParams},
    genetic::{FrozenWeights, GeneticAlgorithm, GeneticParams, TrainingOutcome},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridParams {
    pub phase1_generations: usize,
    pub phase2_generations: usize,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            phase1_generations: 10,
            phase2_generations: 10,
        }
    }
}

/// Result of both phases.
#[derive(Debug, Clone)]
pub struct HybridOutcome {
    pub phase1: TrainingOutcome,
    pub phase2: TrainingOutcome,
    /// Survival weights from phase 1 combined with attack weights from phase 2.
    pub weights: WeightSet,
}

#[derive(Debug, Clone)]
pub struct HybridGeneticAlgorithm {
    genetic: GeneticParams,
    fitness: FitnessParams,
    hybrid: HybridParams,
    cancel: CancelToken,
}

impl HybridGeneticAlgorithm {
    /// `genetic.generations` is ignored; each phase uses its own count.
    #[must_use]
    pub fn new(genetic: GeneticParams, fitness: FitnessParams, hybrid: HybridParams) -> Self {
        Self {
            genetic,
            fitness,
            hybrid,
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Algorithm of phase 1, before any generation has run.
    pub fn phase1_algorithm(&self) -> Result<GeneticAlgorithm, TrainingError> {
        let params = GeneticParams {
            generations: self.hybrid.phase1_generations,
            ..self.genetic
        };
        let evaluator = FitnessEvaluator::new(self.fitness, FitnessMode::Solo)
            .with_cancel_token(self.cancel.clone());
        Ok(GeneticAlgorithm::new(params, evaluator)?.with_frozen(FrozenWeights::new(
            WeightGroup::Attack,
            WeightSet::default(),
        )))
    }

    /// Evolves the survival weights in solo games.
    pub fn phase1(&self) -> Result<TrainingOutcome, TrainingError> {
        info!(
            generations = self.hybrid.phase1_generations,
            "phase 1: survival weights, solo games"
        );
        self.phase1_algorithm()?.run()
    }

    /// Algorithm of phase 2, with `survival`'s survival weights frozen and
    /// `survival` itself as the first opponent.
    pub fn phase2_algorithm(
        &self,
        survival: &WeightSet,
    ) -> Result<GeneticAlgorithm, TrainingError> {
        let params = GeneticParams {
            generations: self.hybrid.phase2_generations,
            seed: self.genetic.seed.wrapping_add(1),
            ..self.genetic
        };
        let evaluator = FitnessEvaluator::new(self.fitness, FitnessMode::Versus)
            .with_opponent(*survival)
            .with_cancel_token(self.cancel.clone());
        Ok(GeneticAlgorithm::new(params, evaluator)?
            .with_frozen(FrozenWeights::new(WeightGroup::Survival, *survival)))
    }

    /// Evolves the attack weights in versus games.
    pub fn phase2(&self, survival: &WeightSet) -> Result<TrainingOutcome, TrainingError> {
        info!(
            generations = self.hybrid.phase2_generations,
            "phase 2: attack weights, versus games"
        );
        self.phase2_algorithm(survival)?.run()
    }

    pub fn run(&self) -> Result<HybridOutcome, TrainingError> {
        let phase1 = self.phase1()?;
        let phase2 = self.phase2(phase1.best.weights())?;
        let mut weights = *phase2.best.weights();
        weights.copy_group_from(phase1.best.weights(), WeightGroup::Survival);
        info!(
            phase1_fitness = phase1.best.fitness(),
            phase2_fitness = phase2.best.fitness(),
            "hybrid training finished"
        );
        Ok(HybridOutcome {
            phase1,
            phase2,
            weights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> HybridGeneticAlgorithm {
        let genetic = GeneticParams {
            population_size: 3,
            elite_size: 1,
            tournament_size: 2,
            ..GeneticParams::default()
        };
        let fitness = FitnessParams {
            games_per_individual: 1,
            max_moves: 8,
            ..FitnessParams::default()
        };
        let hybrid = HybridParams {
            phase1_generations: 1,
            phase2_generations: 1,
        };
        HybridGeneticAlgorithm::new(genetic, fitness, hybrid)
    }

    #[test]
    fn test_phase1_keeps_attack_defaults() {
        let outcome = tiny().phase1().unwrap();
        assert_eq!(outcome.history.len(), 1);
        let best = outcome.best.weights();
        for id in WeightGroup::Attack.ids() {
            assert_eq!(best.get(id), WeightSet::default().get(id));
        }
    }

    #[test]
    fn test_run_combines_phases() {
        let outcome = tiny().run().unwrap();
        let survival = outcome.phase1.best.weights();
        for id in WeightGroup::Survival.ids() {
            assert_eq!(outcome.weights.get(id), survival.get(id));
            assert_eq!(outcome.phase2.best.weights().get(id), survival.get(id));
        }
        for id in WeightGroup::Attack.ids() {
            assert_eq!(outcome.weights.get(id), outcome.phase2.best.weights().get(id));
        }
    }

    #[test]
    fn test_cancelled_run() {
        let algorithm = tiny();
        algorithm.cancel_token().cancel();
        assert_eq!(algorithm.run().unwrap_err(), TrainingError::Cancelled);
    }

    #[test]
    fn test_zero_generations_is_rejected() {
        let mut algorithm = tiny();
        algorithm.hybrid.phase1_generations = 0;
        assert!(matches!(
            algorithm.phase1(),
            Err(TrainingError::InvalidParams(_))
        ));
    }
}
