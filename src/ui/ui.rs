use egui_macroquad::egui;
use flappy_evo::simulation::brain::NeuralController;
use flappy_evo::simulation::evolution::{Genome, Population};
use flappy_evo::simulation::generation::Generation;
use flappy_evo::simulation::stats::FitnessHistory;

#[allow(clippy::struct_excessive_bools)]
pub struct UIState {
    pub stats_panel_width: f32,
    pub simulation_speed: f32,
    pub rendering_enabled: bool,
    pub show_target: bool,
    pub show_network: bool,
    pub save_requested: bool,
    pub stop_requested: bool,
    pub status_message: Option<String>,
    pub actual_ticks_per_sec: f32,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            stats_panel_width: 320.0,
            simulation_speed: 1.0, // Default 1x speed
            rendering_enabled: true,
            show_target: false,
            show_network: false,
            save_requested: false,
            stop_requested: false,
            status_message: None,
            actual_ticks_per_sec: 0.0,
        }
    }

    /// Clears per-run requests before a new training run.
    pub fn reset_requests(&mut self) {
        self.save_requested = false;
        self.stop_requested = false;
        self.status_message = None;
    }
}

/// What the stats panel shows about past generations.
///
/// Captured before a generation starts: the running generation holds the
/// population's genomes, and none of this changes until it ends.
pub struct Overview {
    pub history: FitnessHistory,
    pub champion: Option<Genome>,
    pub population_size: usize,
    pub max_generations: u32,
    pub stagnation: u32,
}

impl Overview {
    pub fn capture(population: &Population) -> Self {
        Self {
            history: population.history().clone(),
            champion: population.champion().cloned(),
            population_size: population.params().population_size,
            max_generations: population.params().max_generations,
            stagnation: population.stagnation(),
        }
    }
}

pub fn draw_ui(
    state: &mut UIState,
    generation: &Generation<'_, NeuralController>,
    overview: &Overview,
) {
    egui_macroquad::ui(|egui_ctx| {
        // Configure brighter text and UI
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::from_rgb(240, 240, 240));
        visuals.widgets.noninteractive.fg_stroke.color = egui::Color32::from_rgb(220, 220, 220);
        visuals.widgets.inactive.fg_stroke.color = egui::Color32::from_rgb(200, 200, 200);
        visuals.widgets.hovered.fg_stroke.color = egui::Color32::WHITE;
        visuals.widgets.active.fg_stroke.color = egui::Color32::WHITE;
        egui_ctx.set_visuals(visuals);

        // Right-side stats panel
        super::stats::draw_stats_panel(egui_ctx, state, generation, overview);

        if state.show_network {
            let lead = generation.contestants().first();
            let target = generation.target_obstacle();
            if let (Some(lead), Some(target)) = (lead, target) {
                egui::Window::new("Lead agent network")
                    .default_pos(egui::pos2(20.0, 120.0))
                    .resizable(false)
                    .show(egui_ctx, |ui| {
                        super::nn::draw_neural_network(ui, lead.controller(), &lead.agent, target);
                    });
            }
        }
    });
}

pub fn process_egui() {
    egui_macroquad::draw();
}
