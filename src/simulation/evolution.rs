//! Evolution engine.
//!
//! Owns the population of genomes between generations: ranks them by the
//! fitness the evaluator wrote back, keeps the elite, breeds the rest from
//! the top fraction and tracks the champion across generations.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::brain::{Brain, NeuralController};
use super::generation::{Candidate, GenerationSummary};
use super::params::{EvolutionParams, NetworkParams};
use super::stats::{FitnessHistory, GenerationReport};

/// Errors raised while saving or loading a genome.
#[derive(Debug, Error)]
pub enum GenomeError {
    /// The genome file could not be read or written.
    #[error("genome file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The genome file is not valid JSON for [`Genome`].
    #[error("failed to parse genome: {0}")]
    Parse(#[from] serde_json::Error),
    /// The genome's network does not fit the configured topology.
    #[error("genome network has layers {found:?}, config expects {expected:?}")]
    Shape {
        /// Layer sizes from the configuration.
        expected: Vec<usize>,
        /// Layer sizes of the stored brain.
        found: Vec<usize>,
    },
}

/// A heritable brain plus the fitness it earned in its last generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    /// Unique within a population.
    pub id: u64,
    /// The network that pilots the agent.
    pub brain: Brain,
    /// Fitness written by the evaluator.
    pub fitness: f64,
}

impl Genome {
    /// Creates a genome around `brain` with zero fitness.
    pub fn new(id: u64, brain: Brain) -> Self {
        Self {
            id,
            brain,
            fitness: 0.0,
        }
    }

    /// Creates a genome with a random brain shaped by `network`.
    pub fn new_random<R: Rng>(id: u64, network: &NetworkParams, rng: &mut R) -> Self {
        Self::new(
            id,
            Brain::new_random(&network.layer_sizes(), network.weight_scale, rng),
        )
    }

    /// Layer sizes of the brain, input first.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.brain.layers.len() + 1);
        if let Some(first) = self.brain.layers.first() {
            sizes.push(first.input_size());
        }
        sizes.extend(self.brain.layers.iter().map(|layer| layer.biases.len()));
        sizes
    }

    /// Checks that the brain matches the configured topology.
    pub fn check_shape(&self, network: &NetworkParams) -> Result<(), GenomeError> {
        let expected = network.layer_sizes();
        let found = self.layer_sizes();
        if expected == found {
            Ok(())
        } else {
            Err(GenomeError::Shape { expected, found })
        }
    }

    /// Saves the genome as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), GenomeError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a genome from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, GenomeError> {
        let json = std::fs::read_to_string(path)?;
        let genome = serde_json::from_str(&json)?;
        Ok(genome)
    }
}

impl Candidate for Genome {
    type Controller = NeuralController;

    fn controller(&self, network: &NetworkParams) -> NeuralController {
        NeuralController::new(&self.brain, network)
    }

    fn fitness_mut(&mut self) -> &mut f64 {
        &mut self.fitness
    }
}

/// The evolving population.
#[derive(Debug, Clone)]
pub struct Population {
    params: EvolutionParams,
    genomes: Vec<Genome>,
    generation: u32,
    next_id: u64,
    champion: Option<Genome>,
    stagnation: u32,
    history: FitnessHistory,
}

impl Population {
    /// Creates `population_size` random genomes.
    pub fn new<R: Rng>(params: &EvolutionParams, rng: &mut R) -> Self {
        let mut population = Self {
            params: params.clone(),
            genomes: Vec::with_capacity(params.population_size),
            generation: 0,
            next_id: 0,
            champion: None,
            stagnation: 0,
            history: FitnessHistory::default(),
        };
        for _ in 0..params.population_size {
            let genome = population.fresh_genome(rng);
            population.genomes.push(genome);
        }
        population
    }

    /// Starts the next generation and returns its number (1-based).
    pub fn begin_generation(&mut self) -> u32 {
        self.generation += 1;
        self.generation
    }

    /// Current generation number, 0 before the first one began.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Genomes of the current generation.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Genomes of the current generation, for evaluation.
    pub fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    /// Best genome seen so far, with the fitness it earned.
    pub fn champion(&self) -> Option<&Genome> {
        self.champion.as_ref()
    }

    /// Generations since the champion last improved.
    pub fn stagnation(&self) -> u32 {
        self.stagnation
    }

    /// Reports of past generations.
    pub fn history(&self) -> &FitnessHistory {
        &self.history
    }

    /// The parameters this population evolves with.
    pub fn params(&self) -> &EvolutionParams {
        &self.params
    }

    /// Ranks the evaluated genomes, records the report and breeds the next
    /// population.
    pub fn evolve<R: Rng>(&mut self, summary: &GenerationSummary, rng: &mut R) -> GenerationReport {
        let mut ranked = std::mem::take(&mut self.genomes);
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        if let Some(best) = ranked.first() {
            let improved = self
                .champion
                .as_ref()
                .is_none_or(|champion| best.fitness > champion.fitness);
            if improved {
                debug!(id = best.id, fitness = best.fitness, "new champion");
                self.champion = Some(best.clone());
                self.stagnation = 0;
            } else {
                self.stagnation += 1;
            }
        }

        let fitness: Vec<f64> = ranked.iter().map(|g| g.fitness).collect();
        let report = GenerationReport::from_fitness(self.generation, &fitness, self.stagnation)
            .with_summary(summary);
        info!(
            generation = report.generation,
            best = report.best,
            mean = report.mean,
            stdev = report.stdev,
            score = report.score,
            ticks = report.ticks,
            stagnation = report.stagnation,
            "generation evaluated"
        );
        self.history.record(report);

        let reseed = self.params.max_stagnation > 0 && self.stagnation >= self.params.max_stagnation;
        if reseed {
            warn!(
                generation = self.generation,
                stagnation = self.stagnation,
                "population stagnated, reseeding non-elite genomes"
            );
            self.stagnation = 0;
        }

        self.genomes = self.breed(&ranked, reseed, rng);
        report
    }

    /// Runs generations until the fitness threshold or the generation limit
    /// is reached and returns the champion.
    ///
    /// `evaluate` must write each genome's fitness and return the summary of
    /// the generation it ran.
    pub fn run<R, F>(&mut self, rng: &mut R, mut evaluate: F) -> Option<Genome>
    where
        R: Rng,
        F: FnMut(&mut [Genome], u32, &mut R) -> GenerationSummary,
    {
        while self.generation < self.params.max_generations {
            let number = self.begin_generation();
            let summary = evaluate(self.genomes.as_mut_slice(), number, rng);
            let report = self.evolve(&summary, rng);

            if report.best >= self.params.fitness_threshold {
                info!(
                    generation = number,
                    best = report.best,
                    threshold = self.params.fitness_threshold,
                    "fitness threshold reached"
                );
                break;
            }
        }
        self.champion.clone()
    }

    fn breed<R: Rng>(&mut self, ranked: &[Genome], reseed: bool, rng: &mut R) -> Vec<Genome> {
        let size = self.params.population_size;
        let mut next = Vec::with_capacity(size);

        // Elites keep their id and brain
        let elite = self.params.elitism.min(ranked.len()).min(size);
        next.extend(ranked.iter().take(elite).map(|g| Genome::new(g.id, g.brain.clone())));

        let parent_count = ((ranked.len() as f64 * self.params.survival_threshold).ceil() as usize)
            .clamp(1, ranked.len().max(1));
        let parents = &ranked[..parent_count.min(ranked.len())];

        while next.len() < size {
            let child = if reseed || parents.is_empty() {
                self.fresh_genome(rng)
            } else {
                self.offspring(parents, rng)
            };
            next.push(child);
        }
        next
    }

    fn offspring<R: Rng>(&mut self, parents: &[Genome], rng: &mut R) -> Genome {
        let mutation_power =
            sample_mutation_power(self.params.mutation_power_min, self.params.mutation_power_max, rng);

        let parent_1_idx = rng.random_range(0..parents.len());
        let parent_1 = &parents[parent_1_idx];

        let mut brain = if parents.len() >= 2 && rng.random_bool(self.params.crossover_rate) {
            let mut parent_2_idx = rng.random_range(0..parents.len());
            while parent_2_idx == parent_1_idx {
                parent_2_idx = rng.random_range(0..parents.len());
            }
            let weight = rng.random::<f32>();
            Brain::crossover_weighted(&parent_1.brain, &parents[parent_2_idx].brain, weight)
        } else {
            parent_1.brain.clone()
        };
        brain.mutate(self.params.weight_mutate_rate, mutation_power, rng);

        let id = self.take_id();
        Genome::new(id, brain)
    }

    fn fresh_genome<R: Rng>(&mut self, rng: &mut R) -> Genome {
        let id = self.take_id();
        Genome::new_random(id, &self.params.network, rng)
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Samples a mutation power log-uniformly between `min` and `max`.
fn sample_mutation_power<R: Rng>(min: f32, max: f32, rng: &mut R) -> f32 {
    if min >= max {
        return min;
    }
    let log_min = min.ln();
    let log_max = max.ln();
    rng.random_range(log_min..log_max).exp().clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn mutation_power_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let power = sample_mutation_power(0.002, 0.5, &mut rng);
            assert!((0.002..=0.5).contains(&power));
        }
        assert_eq!(sample_mutation_power(0.1, 0.1, &mut rng), 0.1);
    }

    #[test]
    fn genome_shape_check() {
        let mut rng = StdRng::seed_from_u64(12);
        let network = NetworkParams {
            hidden_layers: vec![4],
            ..NetworkParams::default()
        };
        let genome = Genome::new_random(0, &network, &mut rng);

        assert_eq!(genome.layer_sizes(), vec![3, 4, 1]);
        assert!(genome.check_shape(&network).is_ok());
        assert!(matches!(
            genome.check_shape(&NetworkParams::default()),
            Err(GenomeError::Shape { .. })
        ));
    }
}
