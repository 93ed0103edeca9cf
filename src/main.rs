use std::path::Path;

use anyhow::Context;
use flappy_evo::simulation::evolution::Population;
use flappy_evo::simulation::generation::Generation;
use flappy_evo::simulation::human::{HumanGame, Phase};
use flappy_evo::simulation::params::Config;
use macroquad::prelude::*;
use ::rand::SeedableRng;
use ::rand::rngs::StdRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod graphics;
mod ui;

use graphics::Viewport;
use ui::{MenuChoice, Overview, UIState};

const CONFIG_PATH: &str = "config/flappy.json";
const CHAMPION_PATH: &str = "champion.json";

/// Longest frame time fed into the tick accumulator, in seconds.
const MAX_FRAME_TIME: f64 = 0.25;
/// Tick cap per frame while rendering is off.
const HEADLESS_TICKS_PER_FRAME: u32 = 2_000;

fn window_conf() -> Conf {
    Conf {
        window_title: "Flappy Evo".to_owned(),
        window_width: 1100,
        window_height: 836,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = match load_config(CONFIG_PATH) {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            return;
        }
    };

    let mut rng = match config.evolution.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut ui_state = UIState::new();

    info!("Starting flappy evolution");

    loop {
        match ui::draw_genesis_screen(&mut config) {
            Some(MenuChoice::Play) => run_human(&config, &mut rng).await,
            Some(MenuChoice::Train) => {
                if let Err(err) = config.validate() {
                    error!("{err}");
                } else {
                    run_training(&config, &mut ui_state, &mut rng).await;
                }
            }
            Some(MenuChoice::Quit) => break,
            None => {}
        }
        next_frame().await;
    }
}

fn load_config(path: &str) -> anyhow::Result<Config> {
    if !Path::new(path).exists() {
        warn!(path, "config file not found, using defaults");
        return Ok(Config::default());
    }
    let config = Config::load_from_file(path).with_context(|| format!("loading {path}"))?;
    info!(path, "config loaded");
    Ok(config)
}

fn now_ms() -> u64 {
    (get_time() * 1000.0) as u64
}

async fn run_human(config: &Config, rng: &mut StdRng) {
    let mut game = HumanGame::new(config, now_ms());
    let tick = 1.0 / f64::from(config.human.tick_rate);
    let mut accumulator = 0.0;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        if game.phase() == Phase::GameOver && is_key_pressed(KeyCode::R) {
            game.restart(now_ms());
        }

        let pressed = is_key_down(KeyCode::Space) || is_mouse_button_down(MouseButton::Left);

        accumulator += f64::from(get_frame_time()).min(MAX_FRAME_TIME);
        while accumulator >= tick {
            game.input(pressed);
            game.update(now_ms(), rng);
            accumulator -= tick;
        }

        let view = Viewport::fit(game.world(), 0.0);
        graphics::draw_human(&view, &game);

        next_frame().await;
    }
}

async fn run_training(config: &Config, ui_state: &mut UIState, rng: &mut StdRng) {
    ui_state.reset_requests();
    let mut population = Population::new(&config.evolution, rng);
    let tick = 1.0 / f64::from(config.simulation.tick_rate);

    while population.generation() < config.evolution.max_generations {
        let overview = Overview::capture(&population);
        let number = population.begin_generation();

        let summary = {
            let mut generation = Generation::new(population.genomes_mut(), config, number, rng);
            let mut accumulator = 0.0;

            while generation.is_running() {
                let frame_start = get_time();
                let mut ticks = 0;

                if ui_state.rendering_enabled {
                    accumulator += f64::from(get_frame_time()).min(MAX_FRAME_TIME)
                        * f64::from(ui_state.simulation_speed);
                    while accumulator >= tick && generation.is_running() {
                        generation.step(rng);
                        accumulator -= tick;
                        ticks += 1;
                    }
                } else {
                    while ticks < HEADLESS_TICKS_PER_FRAME && generation.is_running() {
                        generation.step(rng);
                        ticks += 1;
                    }
                }

                let elapsed = (get_time() - frame_start).max(1e-6);
                ui_state.actual_ticks_per_sec = (f64::from(ticks) / elapsed) as f32;

                let view = Viewport::fit(generation.params(), ui_state.stats_panel_width);
                if ui_state.rendering_enabled {
                    graphics::draw_generation(&view, &generation, ui_state.show_target);
                } else {
                    clear_background(DARKGRAY);
                }

                ui::draw_ui(ui_state, &generation, &overview);
                ui::process_egui();

                if std::mem::take(&mut ui_state.save_requested) {
                    ui_state.status_message = Some(save_champion(&overview));
                }
                if is_key_pressed(KeyCode::Escape) {
                    ui_state.stop_requested = true;
                }
                if ui_state.stop_requested {
                    generation.request_shutdown();
                }

                next_frame().await;
            }

            generation.summary()
        };

        let report = population.evolve(&summary, rng);

        if ui_state.stop_requested {
            info!(generation = number, "training stopped");
            break;
        }
        if report.best >= config.evolution.fitness_threshold {
            info!(generation = number, best = report.best, "fitness threshold reached");
            break;
        }
    }

    if let Some(champion) = population.champion() {
        info!(id = champion.id, fitness = champion.fitness, "training finished");
    }
}

fn save_champion(overview: &Overview) -> String {
    let Some(ref champion) = overview.champion else {
        return "No champion yet".to_owned();
    };
    match champion.save_to_file(CHAMPION_PATH) {
        Ok(()) => {
            info!(path = CHAMPION_PATH, fitness = champion.fitness, "champion saved");
            format!("Saved champion to {CHAMPION_PATH}")
        }
        Err(err) => {
            error!("{err}");
            format!("Save failed: {err}")
        }
    }
}
