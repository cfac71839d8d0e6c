//! Generational genetic algorithm over [`WeightSet`]s.
//!
//! # Algorithm Overview
//!
//! Each generation goes through the same cycle:
//!
//! 1. **Evaluate Fitness** - every individual plays the same freshly seeded
//!    games, in parallel
//! 2. **Elite Selection** - the top `elite_size` weight sets are copied
//!    unchanged into the next generation
//! 3. **Tournament Selection** - each parent is the fittest of
//!    `tournament_size` individuals drawn at random
//! 4. **Crossover** - with probability `crossover_rate` the child mixes both
//!    parents gene by gene, otherwise it copies one of them
//! 5. **Mutation** - Gaussian noise with a rate of
//!    `mutation_rate × mutation_decay^generation`
//! 6. **Freezing** - a frozen weight group is restored after crossover and
//!    after mutation
//!
//! The best individual of each generation becomes the fixed opponent for the
//! next generation's versus games.
//!
//! # Key Components
//!
//! - [`Population`] - Individuals evaluated together, kept sorted best first
//! - [`PopulationEvolver`] - Operator settings for one generation step
//! - [`GeneticAlgorithm`] - The seeded run: RNG, history, opponent tracking
//!
//! # Failure Handling
//!
//! Evaluation is transactional. Game results are gathered for the whole
//! population first and only then written into the individuals; a cancelled
//! generation returns [`TrainingError::Cancelled`] and leaves the population
//! exactly as it was.

use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng, seq::IndexedRandom};
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tetrevo_engine::PieceSeed;
use tetrevo_evaluator::weights::{WeightGroup, WeightId, WeightSet};
use tracing::{debug, info, warn};

use crate::{
    TrainingError,
    fitness::{CancelToken, FitnessEvaluator},
    individual::{GameResult, Individual},
    weights,
};

/// Parameters of a genetic algorithm run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    pub population_size: usize,
    /// Individuals copied unchanged into the next generation.
    pub elite_size: usize,
    pub tournament_size: usize,
    /// Probability that a child mixes both parents instead of copying one.
    pub crossover_rate: f64,
    /// Per-weight mutation probability in generation 0.
    pub mutation_rate: f64,
    /// Factor applied to the mutation rate once per generation.
    pub mutation_decay: f64,
    /// Mutation noise standard deviation, as a fraction of each weight's range.
    pub mutation_strength: f64,
    pub generations: usize,
    pub seed: u64,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            elite_size: 2,
            tournament_size: 3,
            crossover_rate: 0.7,
            mutation_rate: 0.2,
            mutation_decay: 0.95,
            mutation_strength: 0.2,
            generations: 10,
            seed: 42,
        }
    }
}

impl GeneticParams {
    pub fn validate(&self) -> Result<(), TrainingError> {
        let invalid = |message: &str| Err(TrainingError::InvalidParams(message.to_owned()));
        let unit = 0.0..=1.0;
        if self.population_size == 0 {
            return invalid("population_size must be at least 1");
        }
        if self.elite_size >= self.population_size {
            return invalid("elite_size must be smaller than population_size");
        }
        if self.tournament_size == 0 {
            return invalid("tournament_size must be at least 1");
        }
        if !unit.contains(&self.crossover_rate) {
            return invalid("crossover_rate must be within [0, 1]");
        }
        if !unit.contains(&self.mutation_rate) {
            return invalid("mutation_rate must be within [0, 1]");
        }
        if !unit.contains(&self.mutation_decay) {
            return invalid("mutation_decay must be within [0, 1]");
        }
        if !(self.mutation_strength.is_finite() && self.mutation_strength >= 0.0) {
            return invalid("mutation_strength must be a non-negative number");
        }
        Ok(())
    }

    /// Mutation rate used when breeding generation `generation + 1`.
    #[must_use]
    pub fn mutation_rate_at(&self, generation: usize) -> f64 {
        let exponent = i32::try_from(generation).unwrap_or(i32::MAX);
        self.mutation_rate * self.mutation_decay.powi(exponent)
    }
}

/// A weight group pinned to fixed values during evolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrozenWeights {
    pub group: WeightGroup,
    pub values: WeightSet,
}

impl FrozenWeights {
    #[must_use]
    pub fn new(group: WeightGroup, values: WeightSet) -> Self {
        Self { group, values }
    }

    pub fn apply(&self, weights: &mut WeightSet) {
        weights.copy_group_from(&self.values, self.group);
    }
}

/// Spread of one weight across a population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightStats {
    pub id: WeightId,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl WeightStats {
    #[expect(clippy::cast_precision_loss)]
    fn new(id: WeightId, values: &[f64]) -> Self {
        let n = values.len().max(1) as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            id,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` individuals with weights drawn uniformly from their ranges.
    #[must_use]
    pub fn random<R>(count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count)
            .map(|_| Individual::new(weights::random(rng)))
            .collect();
        Self { individuals }
    }

    #[must_use]
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self { individuals }
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Best individual, once the population has been evaluated.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Re-applies a frozen group to every individual.
    pub fn apply_frozen(&mut self, frozen: &FrozenWeights) {
        for individual in &mut self.individuals {
            let mut weights = *individual.weights();
            frozen.apply(&mut weights);
            *individual = Individual::new(weights);
        }
    }

    /// Plays every individual on `seeds` in parallel, then sorts best first.
    ///
    /// Previous statistics are discarded. On error nothing is modified.
    pub fn evaluate_fitness(
        &mut self,
        evaluator: &FitnessEvaluator,
        seeds: &[PieceSeed],
    ) -> Result<(), TrainingError> {
        let results: Vec<Vec<GameResult>> = self
            .individuals
            .par_iter()
            .map(|individual| evaluator.evaluate(individual.weights(), seeds))
            .collect::<Result<_, _>>()?;

        for (individual, games) in self.individuals.iter_mut().zip(&results) {
            individual.reset_stats();
            for game in games {
                individual.add_game_result(game);
            }
            debug!(
                fitness = individual.fitness(),
                games = individual.stats().games,
                "individual evaluated"
            );
        }
        // stable: equal fitness keeps the previous order
        self.individuals.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
        Ok(())
    }

    /// Per-weight spread, in [`WeightId::ALL`] order.
    #[must_use]
    pub fn compute_weight_stats(&self) -> Vec<WeightStats> {
        WeightId::ALL
            .into_iter()
            .map(|id| {
                let values: Vec<f64> = self
                    .individuals
                    .iter()
                    .map(|individual| individual.weights().get(id))
                    .collect();
                WeightStats::new(id, &values)
            })
            .collect()
    }
}

/// Operator settings for producing one generation from the previous one.
#[derive(Debug, Clone, Copy)]
pub struct PopulationEvolver {
    pub elite_count: usize,
    pub tournament_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub mutation_strength: f64,
    pub frozen: Option<FrozenWeights>,
}

impl PopulationEvolver {
    /// Breeds the next generation from an evaluated `population`.
    ///
    /// # Panics
    ///
    /// Panics if `population` is empty or not sorted by fitness, best first.
    #[must_use]
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let parents = &population.individuals;
        assert!(!parents.is_empty());
        assert!(parents.is_sorted_by(|a, b| a.fitness() >= b.fitness()));

        let mut next: Vec<Individual> = parents
            .iter()
            .take(self.elite_count)
            .map(|elite| Individual::new(*elite.weights()))
            .collect();

        while next.len() < parents.len() {
            let p1 = tournament_select(parents, self.tournament_size, rng);
            let p2 = tournament_select(parents, self.tournament_size, rng);

            let mut child = if rng.random_bool(self.crossover_rate) {
                weights::uniform_crossover(p1.weights(), p2.weights(), rng)
            } else if rng.random_bool(0.5) {
                *p1.weights()
            } else {
                *p2.weights()
            };
            self.restore_frozen(&mut child);
            weights::mutate(&mut child, self.mutation_rate, self.mutation_strength, rng);
            self.restore_frozen(&mut child);

            next.push(Individual::new(child));
        }

        Population { individuals: next }
    }

    fn restore_frozen(&self, weights: &mut WeightSet) {
        if let Some(frozen) = &self.frozen {
            frozen.apply(weights);
        }
    }
}

/// Returns the fittest of `tournament_size` individuals drawn without replacement.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Individual
where
    R: Rng + ?Sized,
{
    population
        .choose_multiple(rng, tournament_size.max(1))
        .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
        .expect("population is never empty")
}

/// Summary of one evaluated generation.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub generation: usize,
    pub best: Individual,
    pub best_fitness: f64,
    pub average_fitness: f64,
    pub worst_fitness: f64,
    /// Mutation rate that will breed the next generation.
    pub mutation_rate: f64,
    pub weight_stats: Vec<WeightStats>,
    pub elapsed: Duration,
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Fittest individual seen in any generation.
    pub best: Individual,
    pub history: Vec<GenerationResult>,
}

/// A seeded genetic algorithm run.
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm {
    params: GeneticParams,
    evaluator: FitnessEvaluator,
    frozen: Option<FrozenWeights>,
    rng: Pcg64,
    population: Population,
    generation: usize,
    best: Option<Individual>,
    history: Vec<GenerationResult>,
}

impl GeneticAlgorithm {
    /// Validates the parameters and draws the initial population.
    pub fn new(params: GeneticParams, evaluator: FitnessEvaluator) -> Result<Self, TrainingError> {
        params.validate()?;
        evaluator.params().validate()?;
        let mut rng = Pcg64::seed_from_u64(params.seed);
        let population = Population::random(params.population_size, &mut rng);
        Ok(Self {
            params,
            evaluator,
            frozen: None,
            rng,
            population,
            generation: 0,
            best: None,
            history: Vec::new(),
        })
    }

    /// Pins `frozen.group` to `frozen.values` for the whole run.
    #[must_use]
    pub fn with_frozen(mut self, frozen: FrozenWeights) -> Self {
        self.population.apply_frozen(&frozen);
        self.frozen = Some(frozen);
        self
    }

    #[must_use]
    pub fn params(&self) -> &GeneticParams {
        &self.params
    }

    #[must_use]
    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        self.evaluator.cancel_token()
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Index of the generation about to be evaluated.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Fittest individual seen so far.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.best.as_ref()
    }

    #[must_use]
    pub fn history(&self) -> &[GenerationResult] {
        &self.history
    }

    /// Opponent used for the current generation's versus games.
    #[must_use]
    pub fn opponent(&self) -> &WeightSet {
        self.evaluator.opponent()
    }

    /// Evaluates the current population and records the generation.
    ///
    /// Afterwards the population is sorted best first and its champion is the
    /// opponent for the next generation.
    pub fn evaluate(&mut self) -> Result<GenerationResult, TrainingError> {
        let started = Instant::now();
        let seeds: Vec<PieceSeed> = (0..self.evaluator.params().games_per_individual)
            .map(|_| self.rng.random())
            .collect();

        if let Err(err) = self.population.evaluate_fitness(&self.evaluator, &seeds) {
            warn!(generation = self.generation, %err, "generation aborted");
            return Err(err);
        }

        let individuals = self.population.individuals();
        let best = individuals[0].clone();
        let worst_fitness = individuals[individuals.len() - 1].fitness();
        #[expect(clippy::cast_precision_loss)]
        let average_fitness =
            individuals.iter().map(Individual::fitness).sum::<f64>() / individuals.len() as f64;
        let result = GenerationResult {
            generation: self.generation,
            best_fitness: best.fitness(),
            average_fitness,
            worst_fitness,
            mutation_rate: self.params.mutation_rate_at(self.generation),
            weight_stats: self.population.compute_weight_stats(),
            elapsed: started.elapsed(),
            best,
        };

        info!(
            generation = result.generation,
            mode = %self.evaluator.mode(),
            best = result.best_fitness,
            average = result.average_fitness,
            worst = result.worst_fitness,
            mutation_rate = result.mutation_rate,
            elapsed = ?result.elapsed,
            "generation evaluated"
        );
        for stats in &result.weight_stats {
            debug!(
                weight = %stats.id,
                min = stats.min,
                max = stats.max,
                mean = stats.mean,
                std_dev = stats.std_dev,
                "weight spread"
            );
        }

        if self
            .best
            .as_ref()
            .is_none_or(|best| result.best_fitness > best.fitness())
        {
            self.best = Some(result.best.clone());
        }
        self.evaluator.set_opponent(*result.best.weights());
        self.history.push(result.clone());
        Ok(result)
    }

    /// Replaces the evaluated population with the next generation.
    pub fn evolve(&mut self) {
        let evolver = PopulationEvolver {
            elite_count: self.params.elite_size,
            tournament_size: self.params.tournament_size,
            crossover_rate: self.params.crossover_rate,
            mutation_rate: self.params.mutation_rate_at(self.generation),
            mutation_strength: self.params.mutation_strength,
            frozen: self.frozen,
        };
        self.population = evolver.evolve(&self.population, &mut self.rng);
        self.generation += 1;
    }

    /// Evaluates the current generation and breeds the next one.
    pub fn step(&mut self) -> Result<GenerationResult, TrainingError> {
        let result = self.evaluate()?;
        self.evolve();
        Ok(result)
    }

    /// Runs `params.generations` steps.
    pub fn run(&mut self) -> Result<TrainingOutcome, TrainingError> {
        for _ in 0..self.params.generations {
            self.step()?;
        }
        let best = self.best.clone().ok_or_else(|| {
            TrainingError::InvalidParams("generations must be at least 1".to_owned())
        })?;
        Ok(TrainingOutcome {
            best,
            history: self.history.clone(),
        })
    }
}
