//! Genetic operators on [`WeightSet`]s.
//!
//! These are the building blocks [`GeneticAlgorithm`](crate::genetic::GeneticAlgorithm)
//! uses for initialization, crossover and mutation. All of them take the random
//! number generator explicitly, so a run seeded once is reproducible end to end.
//!
//! # Operations
//!
//! - **Initialization**: [`random`] draws each weight uniformly from its range
//! - **Crossover**: [`uniform_crossover`] inherits each weight from either parent
//!   with equal probability
//! - **Mutation**: [`mutate`] adds Gaussian noise scaled to each weight's range
//!
//! Every operator returns weights inside their valid ranges. Groups that must
//! not evolve are restored afterwards with [`WeightSet::copy_group_from`].

use rand::Rng;
use rand_distr::Normal;
use tetrevo_evaluator::weights::{WEIGHT_COUNT, WeightId, WeightSet};

/// Draws every weight uniformly from its valid range.
pub fn random<R>(rng: &mut R) -> WeightSet
where
    R: Rng + ?Sized,
{
    let mut values = [0.0; WEIGHT_COUNT];
    for (id, value) in WeightId::ALL.into_iter().zip(&mut values) {
        *value = rng.random_range(id.range());
    }
    WeightSet::from_array(values)
}

/// Uniform crossover: each weight comes from `p1` or `p2` with probability 1/2.
pub fn uniform_crossover<R>(p1: &WeightSet, p2: &WeightSet, rng: &mut R) -> WeightSet
where
    R: Rng + ?Sized,
{
    let mut child = *p1;
    for id in WeightId::ALL {
        if rng.random_bool(0.5) {
            child.set(id, p2.get(id));
        }
    }
    child
}

/// Applies Gaussian mutation in place.
///
/// Each weight is perturbed with probability `rate` by noise drawn from
/// `N(0, strength × range width)`, then clamped back into its range.
///
/// `rate` is clamped to `[0, 1]`. A non-finite or negative `strength` leaves
/// the weights unchanged.
pub fn mutate<R>(weights: &mut WeightSet, rate: f64, strength: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
    for id in WeightId::ALL {
        let range = id.range();
        let Ok(noise) = Normal::new(0.0, strength * (range.end() - range.start())) else {
            continue;
        };
        if rng.random_bool(rate) {
            let value = weights.get(id) + rng.sample(noise);
            weights.set(id, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use tetrevo_evaluator::weights::WeightGroup;

    use super::*;

    fn in_range(weights: &WeightSet) -> bool {
        weights.iter().all(|(id, value)| id.range().contains(&value))
    }

    #[test]
    fn test_random_respects_sign_priors() {
        let mut rng = Pcg64::seed_from_u64(1);
        for _ in 0..100 {
            let weights = random(&mut rng);
            assert!(in_range(&weights));
            assert!(weights.holes <= 0.0);
            assert!(weights.eroded_cells >= 0.0);
        }
    }

    #[test]
    fn test_crossover_takes_each_gene_from_a_parent() {
        let mut rng = Pcg64::seed_from_u64(2);
        let p1 = WeightSet::default();
        let p2 = random(&mut rng);
        for _ in 0..20 {
            let child = uniform_crossover(&p1, &p2, &mut rng);
            for id in WeightId::ALL {
                let value = child.get(id);
                assert!(value == p1.get(id) || value == p2.get(id), "{id}");
            }
        }
    }

    #[test]
    fn test_zero_rate_leaves_weights_untouched() {
        let mut rng = Pcg64::seed_from_u64(3);
        let mut weights = WeightSet::default();
        mutate(&mut weights, 0.0, 1.0, &mut rng);
        assert_eq!(weights, WeightSet::default());
    }

    #[test]
    fn test_mutation_changes_something_at_full_rate() {
        let mut rng = Pcg64::seed_from_u64(4);
        let mut weights = WeightSet::default();
        mutate(&mut weights, 1.0, 0.2, &mut rng);
        assert_ne!(weights, WeightSet::default());
    }

    #[test]
    fn test_frozen_group_survives_operators_after_restore() {
        let mut rng = Pcg64::seed_from_u64(5);
        let frozen = WeightSet::default();
        let mut child = uniform_crossover(&random(&mut rng), &random(&mut rng), &mut rng);
        mutate(&mut child, 1.0, 0.5, &mut rng);
        child.copy_group_from(&frozen, WeightGroup::Attack);
        for id in WeightGroup::Attack.ids() {
            assert_eq!(child.get(id), frozen.get(id));
        }
    }

    proptest! {
        #[test]
        fn prop_full_rate_mutation_stays_in_range(seed in any::<u64>(), strength in 0.0..5.0f64) {
            let mut rng = Pcg64::seed_from_u64(seed);
            let mut weights = random(&mut rng);
            for _ in 0..10 {
                mutate(&mut weights, 1.0, strength, &mut rng);
                prop_assert!(in_range(&weights));
            }
        }
    }
}
