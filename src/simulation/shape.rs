//! Occupied regions of birds and pipe pieces.
//!
//! Collision is tested on the exact outline of each sprite, not on its
//! bounding box: a pipe piece is a narrow body capped by a wider lip, and the
//! bird is an ellipse, so both bounding boxes contain empty margins.

use geo::{Intersects, LineString, Polygon, Translate};

use super::params::SimulationParams;

/// Height of the lip at the open end of a pipe piece.
pub const LIP_HEIGHT: f64 = 24.0;
/// Horizontal inset of the pipe body relative to its lip, on each side.
pub const BODY_INSET: f64 = 3.0;
/// Vertices used to approximate the bird ellipse.
const BIRD_SEGMENTS: usize = 20;

/// Outlines in local coordinates, with the origin at the top-left corner of
/// each sprite's bounding box.
#[derive(Debug, Clone)]
pub struct Shapes {
    /// Bird outline.
    pub bird: Polygon<f64>,
    /// Top pipe piece, lip at the bottom.
    pub pipe_top: Polygon<f64>,
    /// Bottom pipe piece, lip at the top.
    pub pipe_bottom: Polygon<f64>,
}

impl Shapes {
    /// Builds outlines for the given sprite dimensions.
    pub fn new(bird_width: f64, bird_height: f64, pipe_width: f64, pipe_height: f64) -> Self {
        Self {
            bird: ellipse(bird_width, bird_height),
            pipe_top: pipe_piece(pipe_width, pipe_height, false),
            pipe_bottom: pipe_piece(pipe_width, pipe_height, true),
        }
    }

    /// Builds outlines from the AI-mode sprite dimensions.
    pub fn from_params(params: &SimulationParams) -> Self {
        Self::new(
            params.agent_width,
            params.agent_height,
            params.pipe_width,
            params.pipe_height,
        )
    }
}

/// Tests whether two outlines overlap when placed at the given origins.
pub fn overlaps(
    a: &Polygon<f64>,
    a_origin: (f64, f64),
    b: &Polygon<f64>,
    b_origin: (f64, f64),
) -> bool {
    let moved = b.translate(b_origin.0 - a_origin.0, b_origin.1 - a_origin.1);
    a.intersects(&moved)
}

fn ellipse(width: f64, height: f64) -> Polygon<f64> {
    let (rx, ry) = (width / 2.0, height / 2.0);
    let points: Vec<(f64, f64)> = (0..BIRD_SEGMENTS)
        .map(|i| {
            let angle = i as f64 / BIRD_SEGMENTS as f64 * std::f64::consts::TAU;
            (rx + rx * angle.cos(), ry + ry * angle.sin())
        })
        .collect();
    Polygon::new(LineString::from(points), vec![])
}

fn pipe_piece(width: f64, height: f64, lip_on_top: bool) -> Polygon<f64> {
    let lip = LIP_HEIGHT.min(height / 2.0);
    let inset = BODY_INSET.min(width / 4.0);
    let points = if lip_on_top {
        vec![
            (0.0, 0.0),
            (width, 0.0),
            (width, lip),
            (width - inset, lip),
            (width - inset, height),
            (inset, height),
            (inset, lip),
            (0.0, lip),
        ]
    } else {
        let neck = height - lip;
        vec![
            (inset, 0.0),
            (width - inset, 0.0),
            (width - inset, neck),
            (width, neck),
            (width, height),
            (0.0, height),
            (0.0, neck),
            (inset, neck),
        ]
    };
    Polygon::new(LineString::from(points), vec![])
}
