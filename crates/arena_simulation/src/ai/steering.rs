//! Pack steering: separation-aware pursuit with smoothed heading
//!
//! Used by non-player pursuers converging on one target. Each tick:
//! 1. stop inside `stop_distance` (state reset)
//! 2. desired = unit vector toward the target
//! 3. repulsion from peers closer than `min_peer_distance`
//! 4. smoothed ← normalize(smoothed·(1−α) + desired·α)
//! 5. velocity = normalize(smoothed + repulsion) · speed (repulsion is not damped)
//! 6. facing = octant of velocity, gated by hysteresis
//!
//! Hysteresis only affects the discrete facing, never the velocity.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Direction, Movement, Position};
use crate::error::{non_negative, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub stop_distance: f32,
    pub min_peer_distance: f32,
    /// Smoothing factor α in (0, 1].
    pub smoothing: f32,
    /// Units per second.
    pub speed: f32,
    pub direction_change_cooldown_ms: f32,
    /// `dot(smoothed, desired)` below this is a significant heading change.
    pub significant_dot: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            stop_distance: 50.0,
            min_peer_distance: 36.0,
            smoothing: 0.05,
            speed: 120.0,
            direction_change_cooldown_ms: 500.0,
            significant_dot: 0.5,
        }
    }
}

impl SteeringConfig {
    /// Share of the skill reach a pursuer closes to before stopping.
    const REACH_MARGIN: f32 = 0.75;

    /// Pulls `stop_distance` inside `reach` so a parked pursuer can still hit.
    /// A non-positive reach (unlimited skills) leaves the config untouched.
    pub fn within_reach(self, reach: f32) -> Self {
        if reach <= 0.0 || self.stop_distance <= reach * Self::REACH_MARGIN {
            return self;
        }
        Self {
            stop_distance: reach * Self::REACH_MARGIN,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("stop_distance", self.stop_distance)?;
        non_negative("min_peer_distance", self.min_peer_distance)?;
        non_negative("speed", self.speed)?;
        non_negative("direction_change_cooldown_ms", self.direction_change_cooldown_ms)?;
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::Smoothing(self.smoothing));
        }
        Ok(())
    }
}

/// Σ (p−q)/|p−q| · (min − |p−q|)/min over peers closer than `min_distance`.
///
/// Coincident peers have no defined "away" direction and are skipped.
pub fn separation(position: Vec2, peers: impl IntoIterator<Item = Vec2>, min_distance: f32) -> Vec2 {
    if min_distance <= 0.0 {
        return Vec2::ZERO;
    }
    peers
        .into_iter()
        .filter_map(|peer| {
            let offset = position - peer;
            let distance = offset.length();
            (distance > 0.0 && distance < min_distance)
                .then(|| offset / distance * ((min_distance - distance) / min_distance))
        })
        .fold(Vec2::ZERO, |acc, push| acc + push)
}

/// Per-agent steering state.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Steering {
    config: SteeringConfig,
    desired: Vec2,
    smoothed: Vec2,
    last_direction_change_ms: Option<f64>,
    facing: Direction,
    moving: bool,
    velocity: Vec2,
}

impl Default for Steering {
    fn default() -> Self {
        Self::new(SteeringConfig::default())
    }
}

impl Steering {
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            config,
            desired: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            last_direction_change_ms: None,
            facing: Direction::None,
            moving: false,
            velocity: Vec2::ZERO,
        }
    }

    /// One steering step. Returns the velocity to feed into `Movement::set_velocity`.
    pub fn steer(
        &mut self,
        position: Vec2,
        target: Vec2,
        peers: impl IntoIterator<Item = Vec2>,
        now_ms: f64,
    ) -> Vec2 {
        if position.distance(target) <= self.config.stop_distance {
            self.reset();
            return Vec2::ZERO;
        }

        self.desired = (target - position).normalize_or_zero();
        let repulsion = separation(position, peers, self.config.min_peer_distance);

        let alpha = self.config.smoothing;
        self.smoothed = (self.smoothed * (1.0 - alpha) + self.desired * alpha).normalize_or_zero();

        self.velocity = (self.smoothed + repulsion).normalize_or_zero() * self.config.speed;
        self.moving = self.velocity != Vec2::ZERO;

        self.update_facing(Direction::from_vector(self.velocity), now_ms);
        self.velocity
    }

    fn update_facing(&mut self, candidate: Direction, now_ms: f64) {
        if candidate == Direction::None || candidate == self.facing {
            return;
        }
        if self.facing == Direction::None {
            self.facing = candidate;
            return;
        }

        let significant = self.smoothed.dot(self.desired) < self.config.significant_dot;
        if !significant {
            self.facing = candidate;
            return;
        }

        let cooled_down = self
            .last_direction_change_ms
            .is_none_or(|last| now_ms - last >= self.config.direction_change_cooldown_ms as f64);
        if cooled_down {
            self.facing = candidate;
            self.last_direction_change_ms = Some(now_ms);
        }
    }

    /// Zero desired/smoothed heading and velocity. Facing is kept for the renderer.
    pub fn reset(&mut self) {
        self.desired = Vec2::ZERO;
        self.smoothed = Vec2::ZERO;
        self.velocity = Vec2::ZERO;
        self.moving = false;
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    pub fn desired(&self) -> Vec2 {
        self.desired
    }

    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn last_direction_change_ms(&self) -> Option<f64> {
        self.last_direction_change_ms
    }
}

/// Entity a steering agent pursues.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SteeringTarget(pub Entity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separation_close_peers_push_apart() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);

        let push_a = separation(a, [b], 36.0);
        let push_b = separation(b, [a], 36.0);

        assert!(push_a.x < 0.0 && push_a.y == 0.0);
        assert!(push_b.x > 0.0);
        assert!((push_a + push_b).length() < 1e-6);
        assert!((push_a.length() - 26.0 / 36.0).abs() < 1e-5);
    }

    #[test]
    fn test_separation_zero_at_or_beyond_min_distance() {
        let a = Vec2::ZERO;
        assert_eq!(separation(a, [Vec2::new(36.0, 0.0)], 36.0), Vec2::ZERO);
        assert_eq!(separation(a, [Vec2::new(0.0, 80.0)], 36.0), Vec2::ZERO);
        // Coincident peer: skipped, not NaN
        assert_eq!(separation(a, [a], 36.0), Vec2::ZERO);
    }

    #[test]
    fn test_stop_distance_resets_state() {
        let mut steering = Steering::default();
        let v = steering.steer(Vec2::ZERO, Vec2::new(300.0, 0.0), [], 0.0);
        assert!((v.length() - 120.0).abs() < 1e-3);
        assert!(steering.is_moving());

        let v = steering.steer(Vec2::ZERO, Vec2::new(50.0, 0.0), [], 16.0);
        assert_eq!(v, Vec2::ZERO);
        assert_eq!(steering.smoothed(), Vec2::ZERO);
        assert_eq!(steering.desired(), Vec2::ZERO);
        assert!(!steering.is_moving());
        // Facing survives the stop
        assert_eq!(steering.facing(), Direction::E);
    }

    #[test]
    fn test_smoothing_turns_gradually() {
        let mut steering = Steering::default();
        steering.steer(Vec2::ZERO, Vec2::new(300.0, 0.0), [], 0.0);

        // Target jumps to the south: heading only moves a little per tick
        steering.steer(Vec2::ZERO, Vec2::new(0.0, 300.0), [], 16.0);
        let smoothed = steering.smoothed();
        assert!(smoothed.x > 0.99);
        assert!(smoothed.y > 0.0);
        assert!((smoothed.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_facing_hysteresis() {
        let mut steering = Steering::default();
        steering.smoothed = Vec2::X;
        steering.facing = Direction::E;
        steering.last_direction_change_ms = Some(1000.0);

        let target = Vec2::new(0.0, 200.0);
        let crowding_peer = [Vec2::new(0.0, -10.0)];

        // Velocity already points SE but the change is significant and too soon
        let v = steering.steer(Vec2::ZERO, target, crowding_peer, 1100.0);
        assert_eq!(Direction::from_vector(v), Direction::SE);
        assert_eq!(steering.facing(), Direction::E);
        assert_eq!(steering.last_direction_change_ms(), Some(1000.0));

        // Cooldown elapsed: change registered
        steering.steer(Vec2::ZERO, target, crowding_peer, 1600.0);
        assert_eq!(steering.facing(), Direction::SE);
        assert_eq!(steering.last_direction_change_ms(), Some(1600.0));
    }

    #[test]
    fn test_within_reach_pulls_stop_distance_in() {
        let config = SteeringConfig::default();
        assert_eq!(config.within_reach(20.0).stop_distance, 15.0);
        assert_eq!(config.within_reach(200.0), config);
        assert_eq!(config.within_reach(0.0), config);
    }

    #[test]
    fn test_config_validation() {
        assert!(SteeringConfig::default().validate().is_ok());
        let bad = SteeringConfig {
            smoothing: 1.5,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::Smoothing(_))));
    }
}
