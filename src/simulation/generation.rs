//! The generation evaluator.
//!
//! One [`Generation`] runs a population of agents through a shared field of
//! pipes until every agent has failed. Each agent is bundled with its
//! decision collaborator and its genome's fitness accessor in a
//! [`Contestant`], so the three always move together.
//!
//! The per-tick order is part of the contract (see [`Generation::step`]):
//! removals are deferred to the end of each pass (mark, then compact), so an
//! iteration never skips or repeats an agent.

use std::ops::ControlFlow;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::agent::Agent;
use super::floor::Floor;
use super::obstacle::Obstacle;
use super::params::{Config, NetworkParams, SimulationParams};
use super::shape::Shapes;

/// What an agent's controller sees each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// The agent's vertical position.
    pub height: f64,
    /// Distance to the upper edge of the target pipe's gap.
    pub to_gap_top: f64,
    /// Distance to the lower edge of the target pipe's gap.
    pub to_gap_bottom: f64,
}

impl Observation {
    /// Observes `obstacle` from `agent`.
    pub fn new(agent: &Agent, obstacle: &Obstacle) -> Self {
        Self {
            height: agent.y,
            to_gap_top: (agent.y - obstacle.height).abs(),
            to_gap_bottom: (agent.y - obstacle.bottom()).abs(),
        }
    }

    /// The observation as network inputs.
    pub fn to_array(&self) -> [f64; 3] {
        [self.height, self.to_gap_top, self.to_gap_bottom]
    }
}

/// Decision collaborator: maps an observation to a scalar.
///
/// Outputs above [`SimulationParams::jump_threshold`] make the agent jump.
/// Implementations must be pure functions of the observation.
pub trait Controller {
    /// Evaluates the policy.
    fn activate(&self, observation: &Observation) -> f64;
}

impl<F> Controller for F
where
    F: Fn(&Observation) -> f64,
{
    fn activate(&self, observation: &Observation) -> f64 {
        self(observation)
    }
}

/// A genome as seen by the evaluator.
pub trait Candidate {
    /// Decision collaborator built from this genome.
    type Controller: Controller;

    /// Builds the controller. The network parameters are forwarded untouched.
    fn controller(&self, network: &NetworkParams) -> Self::Controller;

    /// The fitness field the evolution engine reads after evaluation.
    fn fitness_mut(&mut self) -> &mut f64;
}

/// A live agent together with its controller and fitness accessor.
pub struct Contestant<'a, C> {
    /// The simulated bird.
    pub agent: Agent,
    controller: C,
    fitness: &'a mut f64,
}

impl<C> Contestant<'_, C> {
    /// The decision collaborator driving this agent.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Fitness accumulated so far this generation.
    pub fn fitness(&self) -> f64 {
        *self.fitness
    }
}

/// Lifecycle of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationState {
    /// At least one agent is alive.
    Running,
    /// No agent is alive, or a shutdown was requested.
    Terminated,
}

/// Informational result of a finished generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generation number assigned by the evolution engine.
    pub number: u32,
    /// Ticks simulated.
    pub ticks: u64,
    /// Pipes passed.
    pub score: u32,
    /// Agents at the start of the generation.
    pub population: usize,
}

/// State of one generation run.
pub struct Generation<'a, C> {
    params: &'a SimulationParams,
    shapes: Shapes,
    contestants: Vec<Contestant<'a, C>>,
    obstacles: Vec<Obstacle>,
    floor: Floor,
    score: u32,
    number: u32,
    tick: u64,
    population: usize,
    state: GenerationState,
}

impl<'a, C: Controller> Generation<'a, C> {
    /// Sets up a generation: resets each genome's fitness to zero and builds
    /// one contestant per genome, the first pipe and the floor.
    pub fn new<G, R>(genomes: &'a mut [G], config: &'a Config, number: u32, rng: &mut R) -> Self
    where
        G: Candidate<Controller = C>,
        R: Rng,
    {
        let params = &config.simulation;

        let contestants: Vec<_> = genomes
            .iter_mut()
            .map(|genome| {
                let controller = genome.controller(&config.evolution.network);
                let fitness = genome.fitness_mut();
                *fitness = 0.0;
                Contestant {
                    agent: Agent::new(params.agent_x, params.agent_y),
                    controller,
                    fitness,
                }
            })
            .collect();

        let population = contestants.len();
        let state = if contestants.is_empty() {
            GenerationState::Terminated
        } else {
            GenerationState::Running
        };

        Self {
            params,
            shapes: Shapes::from_params(params),
            contestants,
            obstacles: vec![spawn_obstacle(params, rng)],
            floor: Floor::new(params.floor_y, params.floor_tile_width),
            score: 0,
            number,
            tick: 0,
            population,
            state,
        }
    }

    /// Advances the simulation by one tick.
    ///
    /// Order within a tick:
    /// 1. pick the target pipe (the second one once the lead agent cleared the first);
    /// 2. terminate if no agent is alive;
    /// 3. per agent: advance physics, reward survival, observe, decide, maybe jump;
    /// 4. advance the floor;
    /// 5. per pipe: advance, penalise and mark colliding agents, mark the pipe
    ///    passed once an agent is past it; marked agents are removed after the pass;
    /// 6. on a newly passed pipe, score once and reward every survivor;
    /// 7. spawn a pipe when the last one is far enough left;
    /// 8. drop offscreen pipes;
    /// 9. remove agents that left the playfield.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> GenerationState {
        if self.state == GenerationState::Terminated {
            return self.state;
        }

        let target = self.target_index();
        if self.contestants.is_empty() {
            self.state = GenerationState::Terminated;
            return self.state;
        }

        let params = self.params;

        for contestant in &mut self.contestants {
            contestant.agent.advance(params);
            *contestant.fitness += params.survival_reward;

            if let Some(obstacle) = target.and_then(|i| self.obstacles.get(i)) {
                let observation = Observation::new(&contestant.agent, obstacle);
                if contestant.controller.activate(&observation) > params.jump_threshold {
                    contestant.agent.jump(params);
                }
            }
        }

        self.floor.advance(params.scroll_speed);

        let mut passed = false;
        let shapes = &self.shapes;
        for obstacle in &mut self.obstacles {
            obstacle.advance(params.scroll_speed);

            for contestant in &mut self.contestants {
                if contestant.agent.is_alive() && obstacle.collides(&contestant.agent, shapes) {
                    *contestant.fitness -= params.collision_penalty;
                    contestant.agent.kill();
                    trace!(tick = self.tick, y = contestant.agent.y, "agent hit a pipe");
                }

                if !obstacle.passed && obstacle.x < contestant.agent.x {
                    obstacle.passed = true;
                    passed = true;
                }
            }
        }
        self.contestants.retain(|c| c.agent.is_alive());

        if passed {
            self.score += 1;
            for contestant in &mut self.contestants {
                *contestant.fitness += params.pass_bonus;
            }
            debug!(
                generation = self.number,
                score = self.score,
                alive = self.contestants.len(),
                "pipe passed"
            );
        }

        if self
            .obstacles
            .last()
            .is_none_or(|last| last.x < params.spawn_threshold)
        {
            self.obstacles.push(spawn_obstacle(params, rng));
            trace!(tick = self.tick, count = self.obstacles.len(), "pipe spawned");
        }

        self.obstacles.retain(|o| !o.is_offscreen(params.pipe_width));

        for contestant in &mut self.contestants {
            if contestant
                .agent
                .out_of_bounds(params.floor_y, params.agent_height)
            {
                contestant.agent.kill();
                trace!(tick = self.tick, y = contestant.agent.y, "agent left the playfield");
            }
        }
        self.contestants.retain(|c| c.agent.is_alive());

        self.tick += 1;

        if self.contestants.is_empty() {
            self.state = GenerationState::Terminated;
        } else if params.score_limit.is_some_and(|limit| self.score >= limit) {
            debug!(generation = self.number, score = self.score, "score limit reached");
            self.state = GenerationState::Terminated;
        }

        self.state
    }
}

impl<'a, C> Generation<'a, C> {
    /// The pipe agents currently observe, if any agent and pipe exist.
    pub fn target_obstacle(&self) -> Option<&Obstacle> {
        self.target_index().and_then(|i| self.obstacles.get(i))
    }

    fn target_index(&self) -> Option<usize> {
        let lead = self.contestants.first()?;
        let first = self.obstacles.first()?;
        if self.obstacles.len() > 1 && lead.agent.x > first.x + self.params.pipe_width {
            Some(1)
        } else {
            Some(0)
        }
    }

    /// Stops the generation between ticks.
    pub fn request_shutdown(&mut self) {
        self.state = GenerationState::Terminated;
    }

    /// True while the generation still runs.
    pub fn is_running(&self) -> bool {
        self.state == GenerationState::Running
    }

    /// Live contestants, in evaluation order.
    pub fn contestants(&self) -> &[Contestant<'a, C>] {
        &self.contestants
    }

    /// Live agents, in evaluation order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.contestants.iter().map(|c| &c.agent)
    }

    /// Live pipes, oldest first.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// The ground strip.
    pub fn floor(&self) -> &Floor {
        &self.floor
    }

    /// Pipes passed so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Generation number assigned by the evolution engine.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Agents at the start of the generation.
    pub fn population(&self) -> usize {
        self.population
    }

    /// Agents still alive.
    pub fn alive(&self) -> usize {
        self.contestants.len()
    }

    /// Agents removed so far.
    pub fn died(&self) -> usize {
        self.population - self.contestants.len()
    }

    /// World constants this generation runs with.
    pub fn params(&self) -> &SimulationParams {
        self.params
    }

    /// Snapshot of the generation's progress.
    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary {
            number: self.number,
            ticks: self.tick,
            score: self.score,
            population: self.population,
        }
    }
}

/// Runs one generation to completion.
///
/// Fitness is reported only through each genome's fitness accessor; the
/// returned summary is informational.
pub fn evaluate<G, R>(genomes: &mut [G], config: &Config, number: u32, rng: &mut R) -> GenerationSummary
where
    G: Candidate,
    R: Rng,
{
    evaluate_with(genomes, config, number, rng, |_| ControlFlow::Continue(()))
}

/// Runs one generation, handing the state to `on_tick` after every tick.
///
/// `on_tick` gets read-only access (rendering, progress reporting) and may
/// stop the generation by returning [`ControlFlow::Break`].
pub fn evaluate_with<G, R, F>(
    genomes: &mut [G],
    config: &Config,
    number: u32,
    rng: &mut R,
    mut on_tick: F,
) -> GenerationSummary
where
    G: Candidate,
    R: Rng,
    F: FnMut(&Generation<'_, G::Controller>) -> ControlFlow<()>,
{
    let mut generation = Generation::new(genomes, config, number, rng);
    info!(
        generation = number,
        population = generation.population(),
        "generation started"
    );

    while generation.is_running() {
        generation.step(rng);
        if on_tick(&generation).is_break() {
            info!(generation = number, tick = generation.tick(), "generation stopped");
            generation.request_shutdown();
        }
    }

    let summary = generation.summary();
    info!(
        generation = summary.number,
        ticks = summary.ticks,
        score = summary.score,
        "generation finished"
    );
    summary
}

fn spawn_obstacle<R: Rng>(params: &SimulationParams, rng: &mut R) -> Obstacle {
    Obstacle::spawn(
        params.spawn_x,
        params.pipe_gap,
        params.pipe_height,
        params.gap_min,
        params.gap_max,
        rng,
    )
}
