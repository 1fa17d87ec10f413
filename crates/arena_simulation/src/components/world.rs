//! World positioning: Position

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// 2D arena position (y grows downward, screen convention).
///
/// Accessors hand out copies of the coordinate; other entities read it as a
/// snapshot and never hold a live reference.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct Position(Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }

    pub fn from_vec(value: Vec2) -> Self {
        Self(value)
    }

    pub fn position(&self) -> Vec2 {
        self.0
    }

    pub fn set_position(&mut self, value: Vec2) {
        self.0 = value;
    }

    /// Relative move.
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.0 += Vec2::new(dx, dy);
    }

    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.0.distance(point)
    }

    /// Unit vector toward `point`; zero when the points coincide.
    pub fn direction_to(&self, point: Vec2) -> Vec2 {
        (point - self.0).normalize_or_zero()
    }

    /// Inclusive: a point exactly `range` away is in range.
    pub fn is_in_range(&self, point: Vec2, range: f32) -> bool {
        self.distance_to(point) <= range
    }

    /// Linear blend toward `target`. `factor` is clamped into `[0, 1]`.
    pub fn interpolate_to(&mut self, target: Vec2, factor: f32) {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        self.0 = self.0.lerp(target, factor);
    }
}

impl From<Vec2> for Position {
    fn from(value: Vec2) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_returns_copy() {
        let mut pos = Position::new(3.0, 4.0);
        let mut copy = pos.position();
        copy.x = 100.0;

        assert_eq!(pos.position(), Vec2::new(3.0, 4.0));

        pos.move_by(1.0, -1.0);
        assert_eq!(pos.position(), Vec2::new(4.0, 3.0));
    }

    #[test]
    fn test_distance_and_range() {
        let pos = Position::new(0.0, 0.0);
        assert_eq!(pos.distance_to(Vec2::new(3.0, 4.0)), 5.0);

        // Boundary is inclusive
        assert!(pos.is_in_range(Vec2::new(3.0, 4.0), 5.0));
        assert!(!pos.is_in_range(Vec2::new(3.0, 4.0), 4.99));
    }

    #[test]
    fn test_direction_to_coincident_is_zero() {
        let pos = Position::new(7.0, -2.0);
        assert_eq!(pos.direction_to(Vec2::new(7.0, -2.0)), Vec2::ZERO);

        let dir = pos.direction_to(Vec2::new(17.0, -2.0));
        assert!((dir - Vec2::X).length() < 1e-6);
    }

    #[test]
    fn test_interpolate_clamps_factor() {
        let mut pos = Position::new(0.0, 0.0);
        pos.interpolate_to(Vec2::new(10.0, 0.0), 0.25);
        assert_eq!(pos.position(), Vec2::new(2.5, 0.0));

        pos.interpolate_to(Vec2::new(10.0, 0.0), 4.0);
        assert_eq!(pos.position(), Vec2::new(10.0, 0.0));

        pos.interpolate_to(Vec2::new(0.0, 0.0), -1.0);
        assert_eq!(pos.position(), Vec2::new(10.0, 0.0));
    }
}
