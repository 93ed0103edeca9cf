use egui_macroquad::egui;
use flappy_evo::simulation::agent::Agent;
use flappy_evo::simulation::brain::NeuralController;
use flappy_evo::simulation::generation::Observation;
use flappy_evo::simulation::obstacle::Obstacle;
use ndarray::Array1;

const INPUT_LABELS: [&str; 3] = ["y", "gap top", "gap bottom"];

pub(super) fn draw_neural_network(
    ui: &mut egui::Ui,
    controller: &NeuralController,
    agent: &Agent,
    target: &Obstacle,
) {
    // Forward pass on the agent's current observation, keeping every layer
    let observation = Observation::new(agent, target);
    let mut current_activation = Array1::from_iter(observation.to_array().map(|v| v as f32));
    let mut layer_activations = vec![current_activation.clone()];

    let layers = &controller.brain().layers;
    for layer in layers {
        current_activation = layer.forward(&current_activation, controller.activation());
        layer_activations.push(current_activation.clone());
    }

    let width = 360.0;
    let height = 240.0;
    let (response, painter) = ui.allocate_painter(egui::vec2(width, height), egui::Sense::hover());
    let rect = response.rect;
    let layer_count = layer_activations.len();
    let layer_spacing = rect.width() / (layer_count as f32 + 1.0);

    let neuron_pos = |layer_idx: usize, neuron_idx: usize, count: usize| {
        egui::pos2(
            rect.left() + layer_spacing * (layer_idx + 1) as f32,
            rect.top() + rect.height() * (neuron_idx as f32 + 1.0) / (count as f32 + 1.0),
        )
    };

    // Connections first so neurons draw on top
    for (layer_idx, layer) in layers.iter().enumerate() {
        let inputs = &layer_activations[layer_idx];
        let outputs = &layer_activations[layer_idx + 1];

        for out_idx in 0..outputs.len() {
            let to = neuron_pos(layer_idx + 1, out_idx, outputs.len());
            for in_idx in 0..inputs.len() {
                let from = neuron_pos(layer_idx, in_idx, inputs.len());
                let weight = layer.weights[[out_idx, in_idx]];
                let strength = weight.abs().min(1.0);
                let alpha = (40.0 + strength * 200.0) as u8;

                let color = if weight > 0.0 {
                    egui::Color32::from_rgba_unmultiplied(0, 220, 80, alpha)
                } else {
                    egui::Color32::from_rgba_unmultiplied(220, 40, 60, alpha)
                };
                painter.line_segment([from, to], egui::Stroke::new(0.8 + strength * 2.0, color));
            }
        }
    }

    for (layer_idx, activations) in layer_activations.iter().enumerate() {
        let is_input_layer = layer_idx == 0;
        let is_output_layer = layer_idx == layer_count - 1;

        for (neuron_idx, &activation) in activations.iter().enumerate() {
            let pos = neuron_pos(layer_idx, neuron_idx, activations.len());

            // Inputs are raw pixel distances, only hidden and output values are squashed
            let color = if is_input_layer {
                egui::Color32::from_rgb(150, 150, 150)
            } else if activation > 0.1 {
                let intensity = (f32::midpoint(activation, 1.0).clamp(0.0, 1.0) * 255.0) as u8;
                egui::Color32::from_rgb(255, intensity, 0)
            } else if activation < -0.1 {
                let intensity = (f32::midpoint(-activation, 1.0).clamp(0.0, 1.0) * 255.0) as u8;
                egui::Color32::from_rgb(0, intensity, 255)
            } else {
                egui::Color32::from_rgb(150, 150, 150)
            };

            painter.circle_filled(pos, 6.0, color);
            painter.circle_stroke(pos, 6.0, egui::Stroke::new(1.5, egui::Color32::WHITE));

            let label = if is_input_layer {
                INPUT_LABELS
                    .get(neuron_idx)
                    .map(|name| format!("{name} {activation:.0}"))
            } else if is_output_layer {
                Some(format!("jump {activation:.2}"))
            } else {
                None
            };

            if let Some(label_text) = label {
                painter.text(
                    egui::pos2(if is_input_layer { pos.x - 12.0 } else { pos.x + 12.0 }, pos.y),
                    if is_input_layer {
                        egui::Align2::RIGHT_CENTER
                    } else {
                        egui::Align2::LEFT_CENTER
                    },
                    label_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::WHITE,
                );
            }
        }
    }
}
