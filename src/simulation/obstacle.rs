//! Paired-gap pipes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::shape::{self, Shapes};

/// A top/bottom pipe pair with a vertical gap between the pieces.
///
/// `height` is the lower edge of the top piece; the bottom piece starts
/// `gap` below it. Both pieces are `pipe_height` tall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    /// Horizontal position of the left edge.
    pub x: f64,
    /// Upper edge of the gap.
    pub height: f64,
    /// Vertical size of the gap.
    pub gap: f64,
    /// Height of each pipe piece.
    pub pipe_height: f64,
    /// Set once the first agent has flown past this pipe.
    pub passed: bool,
}

impl Obstacle {
    /// Creates a pipe at `x` with a random gap drawn from `[gap_min, gap_max)`.
    pub fn spawn<R: Rng>(
        x: f64,
        gap: f64,
        pipe_height: f64,
        gap_min: i32,
        gap_max: i32,
        rng: &mut R,
    ) -> Self {
        let mut obstacle = Self {
            x,
            height: 0.0,
            gap,
            pipe_height,
            passed: false,
        };
        obstacle.set_height(gap_min, gap_max, rng);
        obstacle
    }

    /// Creates a pipe whose gap is centered on `center`.
    pub fn centered(x: f64, center: f64, gap: f64, pipe_height: f64) -> Self {
        Self {
            x,
            height: center - (gap / 2.0).trunc(),
            gap,
            pipe_height,
            passed: false,
        }
    }

    /// Draws a new gap position uniformly from the integer range `[gap_min, gap_max)`.
    pub fn set_height<R: Rng>(&mut self, gap_min: i32, gap_max: i32, rng: &mut R) {
        self.height = f64::from(rng.random_range(gap_min..gap_max));
    }

    /// Vertical origin of the top piece.
    pub fn top(&self) -> f64 {
        self.height - self.pipe_height
    }

    /// Vertical origin of the bottom piece (lower edge of the gap).
    pub fn bottom(&self) -> f64 {
        self.height + self.gap
    }

    /// Scrolls the pipe left.
    pub fn advance(&mut self, scroll_speed: f64) {
        self.x -= scroll_speed;
    }

    /// True once the pipe's right edge has left the playfield.
    pub fn is_offscreen(&self, pipe_width: f64) -> bool {
        self.x + pipe_width < 0.0
    }

    /// Exact-shape overlap test against an agent.
    pub fn collides(&self, agent: &Agent, shapes: &Shapes) -> bool {
        let bird = agent.origin();
        shape::overlaps(&shapes.bird, bird, &shapes.pipe_top, (self.x, self.top()))
            || shape::overlaps(
                &shapes.bird,
                bird,
                &shapes.pipe_bottom,
                (self.x, self.bottom()),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn shapes() -> Shapes {
        Shapes::new(34.0, 24.0, 52.0, 320.0)
    }

    #[test]
    fn spawn_draws_height_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let obstacle = Obstacle::spawn(700.0, 170.0, 320.0, 50, 450, &mut rng);
            assert!(obstacle.height >= 50.0 && obstacle.height < 450.0);
            assert_eq!(obstacle.height.fract(), 0.0);
            assert!((obstacle.bottom() - obstacle.height - 170.0).abs() < 1e-9);
            assert!((obstacle.top() - (obstacle.height - 320.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn centered_splits_gap_around_center() {
        let obstacle = Obstacle::centered(764.0, 418.0, 150.0, 320.0);
        assert!((obstacle.height - 343.0).abs() < 1e-9);
        assert!((obstacle.bottom() - 493.0).abs() < 1e-9);
    }

    #[test]
    fn advances_and_leaves_screen() {
        let mut obstacle = Obstacle::centered(0.0, 300.0, 170.0, 320.0);
        assert!(!obstacle.is_offscreen(52.0));
        for _ in 0..10 {
            obstacle.advance(5.0);
        }
        assert!((obstacle.x + 50.0).abs() < 1e-9);
        assert!(!obstacle.is_offscreen(52.0));
        obstacle.advance(5.0);
        assert!(obstacle.is_offscreen(52.0));
    }

    #[test]
    fn collides_with_either_piece() {
        let shapes = shapes();
        let obstacle = Obstacle {
            x: 220.0,
            height: 300.0,
            gap: 170.0,
            pipe_height: 320.0,
            passed: false,
        };

        assert!(!obstacle.collides(&Agent::new(230.0, 350.0), &shapes));
        assert!(obstacle.collides(&Agent::new(230.0, 290.0), &shapes));
        assert!(obstacle.collides(&Agent::new(230.0, 460.0), &shapes));
        assert!(!obstacle.collides(&Agent::new(100.0, 290.0), &shapes));
    }
}
