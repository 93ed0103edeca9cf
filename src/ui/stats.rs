use egui_macroquad::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use flappy_evo::simulation::brain::NeuralController;
use flappy_evo::simulation::generation::Generation;
use flappy_evo::simulation::stats::{FitnessHistory, GenerationReport};

use super::ui::{Overview, UIState};

pub(super) fn draw_stats_panel(
    egui_ctx: &egui::Context,
    state: &mut UIState,
    generation: &Generation<'_, NeuralController>,
    overview: &Overview,
) {
    egui::SidePanel::right("stats_panel")
        .default_width(state.stats_panel_width)
        .resizable(true)
        .show(egui_ctx, |ui| {
            ui.heading("Training Stats");
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("💾 Save champion").clicked() {
                    state.save_requested = true;
                }
                if ui.button("⏹ Menu").clicked() {
                    state.stop_requested = true;
                }
            });

            // Rendering toggle
            ui.horizontal(|ui| {
                let button_text = if state.rendering_enabled {
                    "🎨 Rendering: ON"
                } else {
                    "🎨 Rendering: OFF"
                };
                if ui.button(button_text).clicked() {
                    state.rendering_enabled = !state.rendering_enabled;
                }
            });
            ui.checkbox(&mut state.show_target, "Show target gap");
            ui.checkbox(&mut state.show_network, "Show lead network");

            // Show status message if any
            if let Some(ref msg) = state.status_message {
                ui.label(msg);
            }

            ui.separator();

            ui.label("Simulation Speed");
            ui.add(egui::Slider::new(&mut state.simulation_speed, 0.25..=20.0).text("x"));
            ui.label(format!("Ticks/sec: {:.1}", state.actual_ticks_per_sec));

            ui.separator();

            ui.label(format!(
                "Generation: {}/{}",
                generation.number(),
                overview.max_generations
            ));
            ui.label(format!("Tick: {}", generation.tick()));
            ui.label(format!("Score: {}", generation.score()));
            ui.label(format!(
                "Alive: {}/{} (died {})",
                generation.alive(),
                generation.population(),
                generation.died()
            ));

            let live_best = generation
                .contestants()
                .iter()
                .map(|c| c.fitness())
                .reduce(f64::max);
            if let Some(best) = live_best {
                ui.label(format!("Best live fitness: {:.1}", best));
            }

            if let Some(ref champion) = overview.champion {
                ui.label(format!(
                    "Champion: #{} fitness={:.1}",
                    champion.id, champion.fitness
                ));
            }
            ui.label(format!("Stagnation: {}", overview.stagnation));
            ui.label(format!("Best score: {}", overview.history.best_score()));
            if let Some(last) = overview.history.latest() {
                ui.label(format!(
                    "Last generation: best={:.1} mean={:.1} score={}",
                    last.best, last.mean, last.score
                ));
            }

            ui.separator();

            ui.label("Fitness per generation");
            draw_fitness_plot(ui, &overview.history);

            ui.separator();

            ui.label("Score per generation");
            draw_series_plot(
                ui,
                "score_plot",
                &overview.history,
                |r| f64::from(r.score),
                "Score",
            );
        });
}

fn draw_fitness_plot(ui: &mut egui::Ui, history: &FitnessHistory) {
    if history.is_empty() {
        ui.label("Collecting data...");
        return;
    }

    let best: PlotPoints = history.series(|r| r.best).into();
    let mean: PlotPoints = history.series(|r| r.mean).into();

    Plot::new("fitness_plot")
        .height(180.0)
        .show_axes([true, true])
        .legend(Legend::default())
        .label_formatter(|name, value| {
            format!("{}: Gen {:.0}, Fitness: {:.1}", name, value.x, value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(best)
                    .color(egui::Color32::from_rgb(255, 200, 60))
                    .name("Best"),
            );
            plot_ui.line(
                Line::new(mean)
                    .color(egui::Color32::from_rgb(100, 150, 255))
                    .name("Mean"),
            );
        });
}

fn draw_series_plot(
    ui: &mut egui::Ui,
    id: &str,
    history: &FitnessHistory,
    value: impl Fn(&GenerationReport) -> f64,
    y_label: &str,
) {
    if history.is_empty() {
        ui.label("Collecting data...");
        return;
    }

    let points: PlotPoints = history.series(value).into();
    let line = Line::new(points);

    Plot::new(id)
        .height(150.0)
        .show_axes([true, true])
        .label_formatter(|_name, value| {
            format!("Gen: {:.0}\n{}: {:.1}", value.x, y_label, value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}
