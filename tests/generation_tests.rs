#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

use flappy_evo::simulation::agent::Agent;
use flappy_evo::simulation::evolution::Genome;
use flappy_evo::simulation::generation::{
    self, Candidate, Controller, Generation, GenerationState, Observation,
};
use flappy_evo::simulation::obstacle::Obstacle;
use flappy_evo::simulation::params::{Config, NetworkParams};
use rand::SeedableRng;
use rand::rngs::StdRng;

type Policy = fn(&Observation) -> f64;

fn never_jump(_: &Observation) -> f64 {
    0.0
}

fn always_jump(_: &Observation) -> f64 {
    1.0
}

/// Jumps whenever the agent sank below its start height.
fn hover(observation: &Observation) -> f64 {
    if observation.height > 350.0 { 1.0 } else { 0.0 }
}

/// A scripted genome that counts how often its controller is consulted.
struct Probe {
    policy: Policy,
    calls: Rc<Cell<u32>>,
    fitness: f64,
}

impl Probe {
    fn new(policy: Policy) -> Self {
        Self {
            policy,
            calls: Rc::new(Cell::new(0)),
            fitness: 0.0,
        }
    }
}

struct ProbeController {
    policy: Policy,
    calls: Rc<Cell<u32>>,
}

impl Controller for ProbeController {
    fn activate(&self, observation: &Observation) -> f64 {
        self.calls.set(self.calls.get() + 1);
        (self.policy)(observation)
    }
}

impl Candidate for Probe {
    type Controller = ProbeController;

    fn controller(&self, _network: &NetworkParams) -> ProbeController {
        ProbeController {
            policy: self.policy,
            calls: Rc::clone(&self.calls),
        }
    }

    fn fitness_mut(&mut self) -> &mut f64 {
        &mut self.fitness
    }
}

/// One fixed, very wide gap so hovering agents never touch a pipe.
fn wide_gap_config() -> Config {
    let mut config = Config::default();
    config.simulation.pipe_gap = 600.0;
    config.simulation.gap_min = 50;
    config.simulation.gap_max = 51;
    config.simulation.score_limit = None;
    config
}

/// A pipe right in front of the agents whose bottom piece starts at y = 390,
/// which a falling agent reaches on the third tick, the same tick the pipe
/// is passed.
fn ambush_config() -> Config {
    let mut config = Config::default();
    config.simulation.spawn_x = 240.0;
    config.simulation.spawn_threshold = 0.0;
    config.simulation.gap_min = 220;
    config.simulation.gap_max = 221;
    config.simulation.pipe_gap = 170.0;
    config
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn observation_measures_distance_to_gap_edges() {
    let agent = Agent::new(230.0, 350.0);
    let obstacle = Obstacle {
        x: 500.0,
        height: 400.0,
        gap: 170.0,
        pipe_height: 320.0,
        passed: false,
    };

    let observation = Observation::new(&agent, &obstacle);
    assert_eq!(observation.to_array(), [350.0, 50.0, 220.0]);
}

#[test]
fn never_jumping_agents_fall_to_the_floor() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut genomes = vec![Probe::new(never_jump)];

    let summary = generation::evaluate(&mut genomes, &config, 1, &mut rng);

    // 350 + 1.5 + 6 + 13.5 + 16 * 21 = 707, and 707 + 24 >= 730
    assert_eq!(summary.ticks, 24);
    assert_eq!(summary.score, 0);
    assert_eq!(genomes[0].calls.get(), 24);
    assert_close(genomes[0].fitness, 2.4);
}

#[test]
fn always_jumping_agents_leave_through_the_top() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(2);
    let mut genomes = vec![Probe::new(always_jump)];

    let summary = generation::evaluate(&mut genomes, &config, 1, &mut rng);

    // 351.5 after the first tick, then 11 up per tick until y < 0
    assert_eq!(summary.ticks, 33);
    assert_close(genomes[0].fitness, 3.3);
}

#[test]
fn fitness_stays_aligned_with_genomes_after_removals() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(3);
    let policies: [Policy; 5] = [never_jump, always_jump, never_jump, always_jump, never_jump];
    let mut genomes: Vec<Probe> = policies.into_iter().map(Probe::new).collect();
    for genome in &mut genomes {
        genome.fitness = 99.0;
    }

    let summary = generation::evaluate(&mut genomes, &config, 1, &mut rng);

    assert_eq!(summary.population, 5);
    assert_eq!(summary.ticks, 33);
    for (i, genome) in genomes.iter().enumerate() {
        let (fitness, calls) = if i % 2 == 0 { (2.4, 24) } else { (3.3, 33) };
        assert_close(genome.fitness, fitness);
        assert_eq!(genome.calls.get(), calls, "genome {i}");
    }
}

#[test]
fn colliding_agent_is_penalised_once_and_misses_the_bonus() {
    let config = ambush_config();
    let mut rng = StdRng::seed_from_u64(4);
    let mut genomes = vec![Probe::new(never_jump), Probe::new(always_jump)];

    let mut generation = Generation::new(&mut genomes, &config, 1, &mut rng);
    assert_eq!(generation.obstacles()[0].bottom(), 390.0);

    generation.step(&mut rng);
    generation.step(&mut rng);
    assert_eq!(generation.alive(), 2);
    assert_eq!(generation.score(), 0);

    generation.step(&mut rng);
    assert_eq!(generation.alive(), 1);
    assert_eq!(generation.died(), 1);
    assert_eq!(generation.score(), 1);
    assert!(generation.obstacles()[0].passed);

    while generation.step(&mut rng) == GenerationState::Running {}

    // three survival rewards, one penalty, no pass bonus, no further queries
    assert_close(genomes[0].fitness, 0.3 - 1.0);
    assert_eq!(genomes[0].calls.get(), 3);
    assert!(genomes[1].fitness > 5.3 - 1e-9);
    assert!(genomes[1].calls.get() > 3);
}

fn run_until_first_pass(population: usize) {
    let config = wide_gap_config();
    let mut rng = StdRng::seed_from_u64(5);
    let mut genomes: Vec<Probe> = (0..population).map(|_| Probe::new(hover)).collect();

    let mut generation = Generation::new(&mut genomes, &config, 1, &mut rng);
    let mut pass_ticks = Vec::new();
    while generation.tick() < 150 {
        let before = generation.score();
        assert_eq!(generation.step(&mut rng), GenerationState::Running);
        let delta = generation.score() - before;
        assert!(delta <= 1);
        if delta == 1 {
            pass_ticks.push(generation.tick());
        }
    }

    // the first pipe starts at 700 and moves 5 per tick past x = 230
    assert_eq!(pass_ticks, vec![95]);
    assert_eq!(generation.score(), 1);
    assert_eq!(generation.alive(), population);
    assert!(generation.agents().all(|agent| agent.is_alive() && agent.x == 230.0));

    for genome in &genomes {
        assert_close(genome.fitness, 150.0 * 0.1 + 5.0);
    }
}

#[test]
fn single_agent_scores_one_per_pass() {
    run_until_first_pass(1);
}

#[test]
fn many_agents_score_one_per_pass() {
    run_until_first_pass(5);
}

#[test]
fn score_limit_stops_a_perfect_population() {
    let mut config = wide_gap_config();
    config.simulation.score_limit = Some(2);
    let mut rng = StdRng::seed_from_u64(6);
    let mut genomes = vec![Probe::new(hover), Probe::new(hover)];

    let summary = generation::evaluate(&mut genomes, &config, 7, &mut rng);

    // second pipe spawns after tick 61 and passes the agents on tick 156
    assert_eq!(summary.number, 7);
    assert_eq!(summary.score, 2);
    assert_eq!(summary.ticks, 156);
}

#[test]
fn target_switches_once_the_first_pipe_is_cleared() {
    let config = wide_gap_config();
    let mut rng = StdRng::seed_from_u64(7);
    let mut genomes = vec![Probe::new(hover)];

    let mut generation = Generation::new(&mut genomes, &config, 1, &mut rng);
    while generation.tick() < 105 {
        generation.step(&mut rng);
    }
    // first pipe at 175: 230 > 175 + 52
    assert_eq!(generation.obstacles().len(), 2);
    let target = generation.target_obstacle().map(|o| o.x);
    assert_eq!(target, Some(generation.obstacles()[1].x));
}

#[test]
fn callback_can_stop_a_generation() {
    let config = wide_gap_config();
    let mut rng = StdRng::seed_from_u64(8);
    let mut genomes = vec![Probe::new(hover)];

    let summary = generation::evaluate_with(&mut genomes, &config, 1, &mut rng, |generation| {
        if generation.tick() >= 10 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    assert_eq!(summary.ticks, 10);
    assert_close(genomes[0].fitness, 1.0);
}

#[test]
fn empty_population_terminates_immediately() {
    let config = Config::default();
    let mut rng = StdRng::seed_from_u64(9);
    let mut genomes: Vec<Probe> = Vec::new();

    let summary = generation::evaluate(&mut genomes, &config, 1, &mut rng);
    assert_eq!(summary.ticks, 0);
    assert_eq!(summary.population, 0);
}

fn random_genomes(seed: u64, count: usize, config: &Config) -> Vec<Genome> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count as u64)
        .map(|id| Genome::new_random(id, &config.evolution.network, &mut rng))
        .collect()
}

fn fitness_of(genomes: &[Genome]) -> Vec<f64> {
    genomes.iter().map(|g| g.fitness).collect()
}

#[test]
fn equal_seeds_reproduce_equal_fitness() {
    let config = Config::default();

    let mut first = random_genomes(10, 20, &config);
    let mut second = first.clone();

    let a = generation::evaluate(&mut first, &config, 1, &mut StdRng::seed_from_u64(42));
    let b = generation::evaluate(&mut second, &config, 1, &mut StdRng::seed_from_u64(42));

    assert_eq!(a, b);
    assert_eq!(fitness_of(&first), fitness_of(&second));
}

#[test]
fn evaluations_with_disjoint_genomes_are_independent() {
    let config = Config::default();

    let mut alone = random_genomes(11, 10, &config);
    generation::evaluate(&mut alone, &config, 1, &mut StdRng::seed_from_u64(1));

    let mut paired = random_genomes(11, 10, &config);
    let mut other = random_genomes(12, 10, &config);
    let mut rng_a = StdRng::seed_from_u64(1);
    let mut rng_b = StdRng::seed_from_u64(2);
    generation::evaluate(&mut other, &config, 1, &mut rng_b);
    generation::evaluate(&mut paired, &config, 1, &mut rng_a);

    assert_eq!(fitness_of(&alone), fitness_of(&paired));
}
