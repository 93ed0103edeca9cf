#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use flappy_evo::simulation::brain::Brain;
use flappy_evo::simulation::evolution::Population;
use flappy_evo::simulation::generation::{self, GenerationSummary};
use flappy_evo::simulation::params::{Config, EvolutionParams};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn summary(number: u32) -> GenerationSummary {
    GenerationSummary {
        number,
        ticks: 100,
        score: 3,
        population: 20,
    }
}

fn rank_by_index(population: &mut Population) {
    for (i, genome) in population.genomes_mut().iter_mut().enumerate() {
        genome.fitness = i as f64;
    }
}

#[test]
fn new_population_has_unique_ids() {
    let params = EvolutionParams::default();
    let mut rng = StdRng::seed_from_u64(1);
    let population = Population::new(&params, &mut rng);

    assert_eq!(population.genomes().len(), params.population_size);
    assert_eq!(population.generation(), 0);
    let ids: HashSet<u64> = population.genomes().iter().map(|g| g.id).collect();
    assert_eq!(ids.len(), params.population_size);
}

#[test]
fn evolve_keeps_elites_and_population_size() {
    let params = EvolutionParams::default();
    let mut rng = StdRng::seed_from_u64(2);
    let mut population = Population::new(&params, &mut rng);

    let number = population.begin_generation();
    rank_by_index(&mut population);
    let best = population.genomes()[19].clone();
    let runner_up = population.genomes()[18].clone();

    let report = population.evolve(&summary(number), &mut rng);

    assert_eq!(report.generation, 1);
    assert_eq!(report.best, 19.0);
    assert!((report.mean - 9.5).abs() < 1e-12);
    assert_eq!(report.score, 3);
    assert_eq!(report.ticks, 100);
    assert_eq!(report.stagnation, 0);

    let next = population.genomes();
    assert_eq!(next.len(), params.population_size);
    assert_eq!(next[0].id, best.id);
    assert_eq!(next[1].id, runner_up.id);
    assert!(Brain::distance(&next[0].brain, &best.brain) < 1e-9);
    assert!(next.iter().all(|g| g.fitness == 0.0));

    let ids: HashSet<u64> = next.iter().map(|g| g.id).collect();
    assert_eq!(ids.len(), params.population_size);

    let champion = population.champion().map(|g| (g.id, g.fitness));
    assert_eq!(champion, Some((best.id, 19.0)));
    assert_eq!(population.history().len(), 1);
}

#[test]
fn stagnation_counts_and_reseeds() {
    let params = EvolutionParams {
        max_stagnation: 2,
        ..EvolutionParams::default()
    };
    let mut rng = StdRng::seed_from_u64(3);
    let mut population = Population::new(&params, &mut rng);

    let mut stagnation = Vec::new();
    for _ in 0..4 {
        let number = population.begin_generation();
        rank_by_index(&mut population);
        let report = population.evolve(&summary(number), &mut rng);
        stagnation.push(report.stagnation);
    }

    // the best fitness never improves after the first generation
    assert_eq!(stagnation, vec![0, 1, 2, 1]);
    assert_eq!(population.stagnation(), 1);
}

#[test]
fn run_stops_at_fitness_threshold() {
    let params = EvolutionParams {
        max_generations: 10,
        fitness_threshold: 50.0,
        ..EvolutionParams::default()
    };
    let mut rng = StdRng::seed_from_u64(4);
    let mut population = Population::new(&params, &mut rng);

    let champion = population.run(&mut rng, |genomes, number, _rng| {
        for genome in genomes.iter_mut() {
            genome.fitness = f64::from(number) * 20.0;
        }
        summary(number)
    });

    // 20, 40, then 60 >= 50
    assert_eq!(population.generation(), 3);
    assert_eq!(champion.map(|g| g.fitness), Some(60.0));
}

#[test]
fn run_respects_generation_limit() {
    let params = EvolutionParams {
        max_generations: 4,
        ..EvolutionParams::default()
    };
    let mut rng = StdRng::seed_from_u64(5);
    let mut population = Population::new(&params, &mut rng);

    let mut seen = Vec::new();
    let champion = population.run(&mut rng, |_genomes, number, _rng| {
        seen.push(number);
        summary(number)
    });

    assert_eq!(seen, vec![1, 2, 3, 4]);
    assert!(champion.is_some());
    assert_eq!(population.history().len(), 4);
}

#[test]
fn training_with_the_real_evaluator_is_reproducible() {
    let mut config = Config::default();
    config.evolution.max_generations = 3;
    config.evolution.population_size = 10;

    let train = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut population = Population::new(&config.evolution, &mut rng);
        let champion = population.run(&mut rng, |genomes, number, rng| {
            generation::evaluate(genomes, &config, number, rng)
        });
        let bests: Vec<f64> = population.history().reports.iter().map(|r| r.best).collect();
        (champion.map(|g| g.fitness), bests)
    };

    let (champion, bests) = train(9);
    assert!(champion.is_some());
    assert!(!bests.is_empty() && bests.len() <= 3);
    assert_eq!(train(9), (champion, bests));
}
