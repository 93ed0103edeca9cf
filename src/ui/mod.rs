// UI module - handles all user interface rendering

mod genesis;
mod nn;
mod stats;
mod ui;

// Re-export the public interface
pub use genesis::{MenuChoice, draw_genesis_screen};
pub use ui::{Overview, UIState, draw_ui, process_egui};
