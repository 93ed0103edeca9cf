//! Scrolling ground strip.
//!
//! Purely cosmetic: two tiles laid end to end scroll left, and a tile that
//! leaves the screen jumps behind the other one.

use serde::{Deserialize, Serialize};

/// The ground, drawn as two alternating tiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    /// Vertical position of the ground line.
    pub y: f64,
    /// Width of one tile.
    pub width: f64,
    /// Left edge of the first tile.
    pub x1: f64,
    /// Left edge of the second tile.
    pub x2: f64,
}

impl Floor {
    /// Creates a floor whose first tile starts at the left edge.
    pub fn new(y: f64, width: f64) -> Self {
        Self {
            y,
            width,
            x1: 0.0,
            x2: width,
        }
    }

    /// Scrolls both tiles and wraps any tile that is fully offscreen.
    pub fn advance(&mut self, scroll_speed: f64) {
        self.x1 -= scroll_speed;
        self.x2 -= scroll_speed;

        if self.x1 + self.width < 0.0 {
            self.x1 = self.x2 + self.width;
        }
        if self.x2 + self.width < 0.0 {
            self.x2 = self.x1 + self.width;
        }
    }

    /// Left edge of whichever tile is further left.
    pub fn leftmost(&self) -> f64 {
        self.x1.min(self.x2)
    }
}
