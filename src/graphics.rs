use flappy_evo::simulation::agent::Agent;
use flappy_evo::simulation::floor::Floor;
use flappy_evo::simulation::generation::Generation;
use flappy_evo::simulation::human::{HumanGame, Phase};
use flappy_evo::simulation::obstacle::Obstacle;
use flappy_evo::simulation::params::SimulationParams;
use flappy_evo::simulation::shape::{BODY_INSET, LIP_HEIGHT};
use macroquad::prelude::*;

const SKY: Color = Color::new(0.44, 0.77, 0.81, 1.0);
const PIPE_BODY: Color = Color::new(0.45, 0.75, 0.18, 1.0);
const PIPE_LIP: Color = Color::new(0.33, 0.60, 0.12, 1.0);
const GROUND: Color = Color::new(0.87, 0.84, 0.58, 1.0);
const GROUND_STRIPE: Color = Color::new(0.52, 0.80, 0.25, 1.0);
const BIRD: Color = Color::new(0.98, 0.78, 0.16, 1.0);
const TARGET: Color = Color::new(1.0, 0.2, 0.2, 0.8);

/// Maps playfield coordinates onto the window, keeping the aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    scale: f32,
    origin_x: f32,
    origin_y: f32,
}

impl Viewport {
    /// Fits the playfield into the window minus `reserved_right` pixels.
    pub fn fit(world: &SimulationParams, reserved_right: f32) -> Self {
        let available_w = (screen_width() - reserved_right).max(1.0);
        let available_h = screen_height();
        let scale_x = available_w / world.playfield_width as f32;
        let scale_y = available_h / world.playfield_height as f32;
        let scale = scale_x.min(scale_y);

        Self {
            scale,
            origin_x: (available_w - world.playfield_width as f32 * scale) / 2.0,
            origin_y: (available_h - world.playfield_height as f32 * scale) / 2.0,
        }
    }
}

trait ToScreen {
    type Output;
    fn to_screen(&self, view: &Viewport) -> Self::Output;
}

impl ToScreen for (f64, f64) {
    type Output = (f32, f32);
    fn to_screen(&self, view: &Viewport) -> (f32, f32) {
        (
            view.origin_x + self.0 as f32 * view.scale,
            view.origin_y + self.1 as f32 * view.scale,
        )
    }
}

impl ToScreen for f64 {
    type Output = f32;
    fn to_screen(&self, view: &Viewport) -> f32 {
        *self as f32 * view.scale
    }
}

fn fill_rect(view: &Viewport, x: f64, y: f64, w: f64, h: f64, color: Color) {
    let (sx, sy) = (x, y).to_screen(view);
    draw_rectangle(sx, sy, w.to_screen(view), h.to_screen(view), color);
}

pub fn draw_background(view: &Viewport, world: &SimulationParams) {
    clear_background(BLACK);
    fill_rect(
        view,
        0.0,
        0.0,
        world.playfield_width,
        world.playfield_height,
        SKY,
    );
}

/// Draws both pieces of a pipe with the same outline the collision test uses.
pub fn draw_obstacle(view: &Viewport, obstacle: &Obstacle, width: f64) {
    let lip = LIP_HEIGHT.min(obstacle.pipe_height / 2.0);
    let inset = BODY_INSET.min(width / 4.0);
    let body_w = width - 2.0 * inset;

    // top piece: body above, lip at the gap
    let top = obstacle.top();
    fill_rect(
        view,
        obstacle.x + inset,
        top,
        body_w,
        obstacle.pipe_height - lip,
        PIPE_BODY,
    );
    fill_rect(view, obstacle.x, obstacle.height - lip, width, lip, PIPE_LIP);

    // bottom piece: lip at the gap, body below
    let bottom = obstacle.bottom();
    fill_rect(view, obstacle.x, bottom, width, lip, PIPE_LIP);
    fill_rect(
        view,
        obstacle.x + inset,
        bottom + lip,
        body_w,
        obstacle.pipe_height - lip,
        PIPE_BODY,
    );
}

/// Draws a bird as an ellipse rotated by its tilt, with a beak showing the heading.
pub fn draw_agent(view: &Viewport, agent: &Agent, world: &SimulationParams, color: Color) {
    let rx = world.agent_width / 2.0;
    let ry = world.agent_height / 2.0;
    let (cx, cy) = (agent.x + rx, agent.y + ry).to_screen(view);
    let rotation = -agent.tilt as f32;

    draw_ellipse(
        cx,
        cy,
        rx.to_screen(view),
        ry.to_screen(view),
        rotation,
        color,
    );

    let heading = rotation.to_radians();
    let beak = rx.to_screen(view) * 1.3;
    draw_line(
        cx,
        cy,
        cx + beak * heading.cos(),
        cy + beak * heading.sin(),
        2.0,
        ORANGE,
    );
}

/// Draws the ground from the floor line to the bottom of the playfield.
pub fn draw_ground(view: &Viewport, ground_y: f64, offset: f64, world: &SimulationParams) {
    let depth = world.playfield_height - ground_y;
    fill_rect(view, 0.0, ground_y, world.playfield_width, depth, GROUND);

    // stripes carry the scroll motion
    let stripe = 24.0;
    let mut x = offset.rem_euclid(stripe * 2.0) - stripe * 2.0;
    while x < world.playfield_width {
        fill_rect(view, x.max(0.0), ground_y, stripe, 12.0, GROUND_STRIPE);
        x += stripe * 2.0;
    }
}

fn draw_floor(view: &Viewport, floor: &Floor, world: &SimulationParams) {
    draw_ground(view, floor.y, floor.leftmost(), world);
}

pub fn draw_text_centered(text: &str, y: f32, font_size: f32, color: Color) {
    let size = measure_text(text, None, font_size as u16, 1.0);
    draw_text(
        text,
        screen_width() / 2.0 - size.width / 2.0,
        y,
        font_size,
        color,
    );
}

/// Draws the full AI-mode scene.
pub fn draw_generation<C>(view: &Viewport, generation: &Generation<'_, C>, show_target: bool) {
    let world = generation.params();
    draw_background(view, world);

    for obstacle in generation.obstacles() {
        draw_obstacle(view, obstacle, world.pipe_width);
    }

    if show_target {
        if let (Some(target), Some(lead)) = (
            generation.target_obstacle(),
            generation.contestants().first(),
        ) {
            let (bx, by) = (
                lead.agent.x + world.agent_width / 2.0,
                lead.agent.y + world.agent_height / 2.0,
            )
                .to_screen(view);
            let gap_x = target.x + world.pipe_width / 2.0;
            for edge in [target.height, target.bottom()] {
                let (tx, ty) = (gap_x, edge).to_screen(view);
                draw_line(bx, by, tx, ty, 1.0, TARGET);
            }
        }
    }

    for agent in generation.agents() {
        draw_agent(view, agent, world, BIRD);
    }

    draw_floor(view, generation.floor(), world);

    let (right, top) = (world.playfield_width - 15.0, 10.0).to_screen(view);
    let score = format!("Score: {}", generation.score());
    let size = measure_text(&score, None, 30, 1.0);
    draw_text(&score, right - size.width, top + size.height, 30.0, WHITE);

    let (left, _) = (10.0, 0.0).to_screen(view);
    draw_text(
        &format!("Gen: {}", generation.number()),
        left,
        top + 30.0,
        30.0,
        WHITE,
    );
    draw_text(
        &format!("Alive: {}", generation.alive()),
        left,
        top + 60.0,
        30.0,
        WHITE,
    );
}

/// Draws the human-mode scene.
pub fn draw_human(view: &Viewport, game: &HumanGame) {
    let world = game.world();
    draw_background(view, world);

    for pipe in game.pipes() {
        draw_obstacle(view, pipe, world.pipe_width);
    }
    draw_agent(view, game.bird(), world, BIRD);
    draw_ground(view, game.params().ground_y, game.ground_scroll(), world);

    let (_, top) = (0.0, 20.0).to_screen(view);
    draw_text_centered(&game.score().to_string(), top + 40.0, 60.0, WHITE);

    match game.phase() {
        Phase::Ready => {
            draw_text_centered("Press Space or click to flap", screen_height() / 2.0, 30.0, WHITE);
        }
        Phase::GameOver => {
            draw_text_centered("Game over", screen_height() / 2.0 - 20.0, 50.0, WHITE);
            draw_text_centered(
                "R: restart   Esc: menu",
                screen_height() / 2.0 + 20.0,
                28.0,
                WHITE,
            );
        }
        Phase::Flying => {}
    }
}
