use egui_macroquad::egui;
use flappy_evo::simulation::brain::Activation;
use flappy_evo::simulation::params::Config;
use macroquad::prelude::*;

/// What the player picked on the start screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Play,
    Train,
    Quit,
}

pub fn draw_genesis_screen(config: &mut Config) -> Option<MenuChoice> {
    clear_background(LIGHTGRAY);

    let mut choice = None;

    egui_macroquad::ui(|egui_ctx| {
        egui::CentralPanel::default().show(egui_ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Flappy Evo");
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    if ui.button("▶ Play").clicked() {
                        choice = Some(MenuChoice::Play);
                    }
                    if ui.button("🧬 Train AI").clicked() {
                        choice = Some(MenuChoice::Train);
                    }
                    if ui.button("Quit").clicked() {
                        choice = Some(MenuChoice::Quit);
                    }
                });
                ui.label("Space or left click flaps, Esc returns here");

                ui.add_space(20.0);
                ui.separator();

                let evolution = &mut config.evolution;
                ui.collapsing("Evolution Parameters", |ui| {
                    ui.add(
                        egui::Slider::new(&mut evolution.population_size, 2..=200)
                            .text("Population Size"),
                    );
                    let max_elite = evolution.population_size;
                    evolution.elitism = evolution.elitism.min(max_elite);
                    ui.add(egui::Slider::new(&mut evolution.elitism, 0..=max_elite).text("Elitism"));
                    ui.add(
                        egui::Slider::new(&mut evolution.max_generations, 1..=1000)
                            .text("Max Generations"),
                    );
                    ui.add(
                        egui::Slider::new(&mut evolution.fitness_threshold, 10.0..=10_000.0)
                            .logarithmic(true)
                            .text("Fitness Threshold"),
                    );
                    ui.add(
                        egui::Slider::new(&mut evolution.survival_threshold, 0.05..=1.0)
                            .text("Survival Threshold"),
                    );
                    ui.add(
                        egui::Slider::new(&mut evolution.crossover_rate, 0.0..=1.0)
                            .text("Crossover Rate"),
                    );
                    ui.add(
                        egui::Slider::new(&mut evolution.weight_mutate_rate, 0.0..=1.0)
                            .text("Weight Mutation Rate"),
                    );
                    ui.add(
                        egui::Slider::new(&mut evolution.max_stagnation, 0..=100)
                            .text("Max Stagnation (0 = off)"),
                    );
                });

                let network = &mut config.evolution.network;
                ui.collapsing("Brain Architecture", |ui| {
                    let mut hidden = network.hidden_layers.first().copied().unwrap_or(0);
                    ui.add(egui::Slider::new(&mut hidden, 0..=16).text("Hidden Neurons (0 = none)"));
                    network.hidden_layers = if hidden == 0 { Vec::new() } else { vec![hidden] };

                    ui.horizontal(|ui| {
                        ui.label("Activation:");
                        ui.radio_value(&mut network.activation, Activation::Tanh, "tanh");
                        ui.radio_value(&mut network.activation, Activation::Sigmoid, "sigmoid");
                        ui.radio_value(&mut network.activation, Activation::Relu, "relu");
                    });
                });

                let simulation = &mut config.simulation;
                ui.collapsing("World Parameters", |ui| {
                    ui.add(
                        egui::Slider::new(&mut simulation.scroll_speed, 1.0..=15.0)
                            .text("Scroll Speed"),
                    );
                    ui.add(
                        egui::Slider::new(&mut simulation.pipe_gap, 100.0..=300.0).text("Pipe Gap"),
                    );
                    let mut limit = simulation.score_limit.unwrap_or(0);
                    ui.add(egui::Slider::new(&mut limit, 0..=1000).text("Score Limit (0 = none)"));
                    simulation.score_limit = (limit > 0).then_some(limit);
                });
            });
        });
    });

    egui_macroquad::draw();

    choice
}
