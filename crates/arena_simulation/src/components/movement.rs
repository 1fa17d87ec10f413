//! Movement components: Direction, MovementConfig, Movement
//!
//! Kinematics run in arena units. Time deltas arrive in milliseconds and are
//! converted to seconds once, inside `Movement::update`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::Position;
use crate::error::{non_negative, ConfigError};

/// Discrete 9-way direction (none + 8 octants).
///
/// Encodable as a composition of the cardinal flags UP/RIGHT/DOWN/LEFT;
/// diagonals are the OR of two cardinals. Screen convention: UP is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    None,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    pub const UP: u8 = 1;
    pub const RIGHT: u8 = 2;
    pub const DOWN: u8 = 4;
    pub const LEFT: u8 = 8;

    /// Octant index → direction for `from_vector` (index 0 starts at -x).
    pub const OCTANTS: [Direction; 8] = [
        Direction::W,
        Direction::NW,
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
    ];

    pub fn bits(self) -> u8 {
        match self {
            Direction::None => 0,
            Direction::N => Self::UP,
            Direction::NE => Self::UP | Self::RIGHT,
            Direction::E => Self::RIGHT,
            Direction::SE => Self::DOWN | Self::RIGHT,
            Direction::S => Self::DOWN,
            Direction::SW => Self::DOWN | Self::LEFT,
            Direction::W => Self::LEFT,
            Direction::NW => Self::UP | Self::LEFT,
        }
    }

    /// Decodes a flag composition. `None` for UP|DOWN, LEFT|RIGHT and unknown bits.
    pub fn from_bits(bits: u8) -> Option<Direction> {
        let dir = match bits {
            0 => Direction::None,
            b if b == Self::UP => Direction::N,
            b if b == Self::UP | Self::RIGHT => Direction::NE,
            b if b == Self::RIGHT => Direction::E,
            b if b == Self::DOWN | Self::RIGHT => Direction::SE,
            b if b == Self::DOWN => Direction::S,
            b if b == Self::DOWN | Self::LEFT => Direction::SW,
            b if b == Self::LEFT => Direction::W,
            b if b == Self::UP | Self::LEFT => Direction::NW,
            _ => return None,
        };
        Some(dir)
    }

    /// Raw key state → direction. Opposing keys cancel each other.
    pub fn from_axes(up: bool, right: bool, down: bool, left: bool) -> Direction {
        let mut bits = 0;
        if up != down {
            bits |= if up { Self::UP } else { Self::DOWN };
        }
        if right != left {
            bits |= if right { Self::RIGHT } else { Self::LEFT };
        }
        // Every composition built above is legal.
        Self::from_bits(bits).unwrap_or_default()
    }

    /// Unit vector (zero for `None`). Diagonals are normalized, not hardcoded.
    pub fn unit_vector(self) -> Vec2 {
        let bits = self.bits();
        let mut v = Vec2::ZERO;
        if bits & Self::UP != 0 {
            v.y -= 1.0;
        }
        if bits & Self::DOWN != 0 {
            v.y += 1.0;
        }
        if bits & Self::RIGHT != 0 {
            v.x += 1.0;
        }
        if bits & Self::LEFT != 0 {
            v.x -= 1.0;
        }
        v.normalize_or_zero()
    }

    /// Quantizes a heading into one of 8 octants; zero (or non-finite) → `None`.
    ///
    /// `floor(((atan2(dy, dx) + π) · 4/π + 0.5) mod 8)` indexes `OCTANTS`.
    /// With y pointing down, 0° is E and 45° is SE.
    pub fn from_vector(v: Vec2) -> Direction {
        if v == Vec2::ZERO || !v.is_finite() {
            return Direction::None;
        }
        let angle = v.y.atan2(v.x);
        let octant = ((angle + std::f32::consts::PI) * 4.0 / std::f32::consts::PI + 0.5)
            .rem_euclid(8.0)
            .floor() as usize;
        Self::OCTANTS[octant % 8]
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::N => Direction::S,
            Direction::NE => Direction::SW,
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::S => Direction::N,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
            Direction::NW => Direction::SE,
        }
    }

    /// Animation key suffix. `None` renders facing the camera (`s`).
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::N => "n",
            Direction::NE => "ne",
            Direction::E => "e",
            Direction::SE => "se",
            Direction::S | Direction::None => "s",
            Direction::SW => "sw",
            Direction::W => "w",
            Direction::NW => "nw",
        }
    }
}

/// Acceleration envelope (units/sec, units/sec²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementConfig {
    pub base_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    /// Working max speed until the first `Movement::move_in`.
    pub max_speed: f32,
}

impl MovementConfig {
    /// Default envelope: accel 4×, decel 2×, max 1.5× base speed.
    pub fn from_base(base_speed: f32) -> Self {
        let base_speed = base_speed.max(0.0);
        Self {
            base_speed,
            acceleration: base_speed * 4.0,
            deceleration: base_speed * 2.0,
            max_speed: base_speed * 1.5,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("base_speed", self.base_speed)?;
        non_negative("acceleration", self.acceleration)?;
        non_negative("deceleration", self.deceleration)?;
        non_negative("max_speed", self.max_speed)?;
        Ok(())
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self::from_base(5.0)
    }
}

/// Kinematic integrator.
///
/// Two modes:
/// - directional: `move_in`/`stop` drive an accel/decel envelope along a `Direction`
/// - steered: `set_velocity` integrates a continuous velocity as-is
#[derive(Component, Debug, Clone)]
pub struct Movement {
    config: MovementConfig,
    direction: Direction,
    moving: bool,
    current_speed: f32,
    working_max_speed: f32,
    velocity: Vec2,
    steered: Option<Vec2>,
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(MovementConfig::default())
    }
}

impl Movement {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            direction: Direction::None,
            moving: false,
            current_speed: 0.0,
            working_max_speed: config.max_speed,
            velocity: Vec2::ZERO,
            steered: None,
        }
    }

    /// Start moving toward `direction`; working max becomes `speed × 1.5`.
    pub fn move_in(&mut self, direction: Direction, speed: f32) {
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        self.direction = direction;
        self.moving = direction != Direction::None;
        self.working_max_speed = speed * 1.5;
        self.steered = None;
    }

    /// Clear the moving flag; speed decays at `deceleration` from the next update.
    ///
    /// A steered velocity is folded back into directional mode: its octant becomes
    /// the direction and its length the current speed.
    pub fn stop(&mut self) {
        if let Some(v) = self.steered.take() {
            self.direction = Direction::from_vector(v);
            self.current_speed = v.length();
        }
        self.moving = false;
    }

    /// Immediate stop, no deceleration (death).
    pub fn halt(&mut self) {
        self.moving = false;
        self.steered = None;
        self.current_speed = 0.0;
        self.velocity = Vec2::ZERO;
    }

    /// Steered mode: integrate `velocity` directly, bypassing the envelope.
    pub fn set_velocity(&mut self, velocity: Vec2) {
        let velocity = if velocity.is_finite() { velocity } else { Vec2::ZERO };
        self.steered = Some(velocity);
        self.moving = velocity != Vec2::ZERO;
        if self.moving {
            self.direction = Direction::from_vector(velocity);
        }
    }

    /// Kinematic step. Non-positive or non-finite deltas are a no-op.
    pub fn update(&mut self, delta_ms: f32, position: &mut Position) {
        if !delta_ms.is_finite() || delta_ms <= 0.0 {
            return;
        }
        let dt = delta_ms / 1000.0;

        if let Some(velocity) = self.steered {
            self.velocity = velocity;
            self.current_speed = velocity.length();
        } else {
            self.current_speed = if self.moving {
                (self.current_speed + self.config.acceleration * dt).min(self.working_max_speed)
            } else {
                (self.current_speed - self.config.deceleration * dt).max(0.0)
            };
            self.velocity = self.direction.unit_vector() * self.current_speed;
        }

        let step = self.velocity * dt;
        position.move_by(step.x, step.y);
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn base_speed(&self) -> f32 {
        self.config.base_speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn max_speed(&self) -> f32 {
        self.working_max_speed
    }

    /// Velocity applied by the last update (copy).
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_octant_table_pinned() {
        let cases = [
            (Vec2::new(1.0, 0.0), Direction::E),
            (Vec2::new(1.0, 1.0), Direction::SE),
            (Vec2::new(0.0, 1.0), Direction::S),
            (Vec2::new(-1.0, 1.0), Direction::SW),
            (Vec2::new(-1.0, 0.0), Direction::W),
            (Vec2::new(-1.0, -1.0), Direction::NW),
            (Vec2::new(0.0, -1.0), Direction::N),
            (Vec2::new(1.0, -1.0), Direction::NE),
            (Vec2::ZERO, Direction::None),
        ];
        for (v, expected) in cases {
            assert_eq!(Direction::from_vector(v), expected, "vector {:?}", v);
        }
    }

    #[test]
    fn test_octant_boundaries() {
        // 22.4° still E, 22.6° already SE
        let near = |deg: f32| Vec2::new(deg.to_radians().cos(), deg.to_radians().sin());
        assert_eq!(Direction::from_vector(near(22.4)), Direction::E);
        assert_eq!(Direction::from_vector(near(22.6)), Direction::SE);
        assert_eq!(Direction::from_vector(near(-22.4)), Direction::E);
        assert_eq!(Direction::from_vector(near(-22.6)), Direction::NE);
    }

    #[test]
    fn test_unit_vectors_round_trip() {
        for dir in Direction::OCTANTS {
            let v = dir.unit_vector();
            assert!((v.length() - 1.0).abs() < EPS);
            assert_eq!(Direction::from_vector(v), dir);
        }
        assert_eq!(Direction::None.unit_vector(), Vec2::ZERO);
    }

    #[test]
    fn test_bits_reject_opposites() {
        assert_eq!(Direction::from_bits(Direction::UP | Direction::DOWN), None);
        assert_eq!(Direction::from_bits(Direction::LEFT | Direction::RIGHT), None);
        assert_eq!(Direction::from_bits(16), None);
        assert_eq!(Direction::from_bits(0), Some(Direction::None));

        for dir in Direction::OCTANTS {
            assert_eq!(Direction::from_bits(dir.bits()), Some(dir));
        }
        assert_eq!(Direction::NE.bits(), Direction::N.bits() | Direction::E.bits());
    }

    #[test]
    fn test_from_axes_cancels_opposites() {
        assert_eq!(Direction::from_axes(true, false, true, false), Direction::None);
        assert_eq!(Direction::from_axes(true, true, false, true), Direction::N);
        assert_eq!(Direction::from_axes(false, true, true, false), Direction::SE);
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(Direction::None.suffix(), "s");
        assert_eq!(Direction::NW.suffix(), "nw");
        assert_eq!(Direction::SE.opposite(), Direction::NW);
    }

    #[test]
    fn test_speed_converges_to_max() {
        let mut movement = Movement::new(MovementConfig::from_base(10.0));
        let mut pos = Position::default();
        movement.move_in(Direction::E, 10.0);

        for _ in 0..10 {
            movement.update(1000.0, &mut pos);
            assert!(movement.current_speed() <= 15.0 + EPS);
        }
        assert!((movement.current_speed() - 15.0).abs() < EPS);
    }

    #[test]
    fn test_requested_speed_overrides_config_max() {
        let mut movement = Movement::new(MovementConfig::from_base(5.0));
        let mut pos = Position::default();
        assert_eq!(movement.max_speed(), 7.5);

        movement.move_in(Direction::E, 10.0);
        assert_eq!(movement.max_speed(), 15.0);
        for _ in 0..20 {
            movement.update(1000.0, &mut pos);
        }
        assert!((movement.current_speed() - 15.0).abs() < EPS);

        // A slower request lowers the working max again
        movement.move_in(Direction::E, 2.0);
        assert_eq!(movement.max_speed(), 3.0);
        movement.update(16.0, &mut pos);
        assert!(movement.current_speed() <= 3.0 + EPS);
    }

    #[test]
    fn test_acceleration_envelope() {
        let mut movement = Movement::new(MovementConfig::from_base(10.0));
        let mut pos = Position::default();
        movement.move_in(Direction::E, 10.0);

        // accel 40/s² → 4 units/s after 100ms
        movement.update(100.0, &mut pos);
        assert!((movement.current_speed() - 4.0).abs() < EPS);
        assert!((pos.position().x - 0.4).abs() < EPS);

        movement.update(1000.0, &mut pos);
        movement.stop();
        // decel 20/s² → 15 - 2 = 13 after 100ms
        movement.update(100.0, &mut pos);
        assert!((movement.current_speed() - 13.0).abs() < EPS);

        movement.update(5000.0, &mut pos);
        assert_eq!(movement.current_speed(), 0.0);
    }

    #[test]
    fn test_diagonal_displacement_matches_cardinal() {
        let config = MovementConfig {
            base_speed: 10.0,
            acceleration: 1.0e6,
            deceleration: 1.0e6,
            max_speed: 100.0,
        };
        let mut movement = Movement::new(config);
        let mut pos = Position::default();
        movement.move_in(Direction::NE, 10.0);

        // Effectively instant acceleration to 15
        movement.update(1000.0, &mut pos);
        let p = pos.position();
        let expected = 15.0 / 2.0_f32.sqrt();
        assert!((p.x - expected).abs() < 1e-3);
        assert!((p.y + expected).abs() < 1e-3);
        assert!((p.length() - 15.0).abs() < 1e-3);
    }

    #[test]
    fn test_non_positive_delta_is_noop() {
        let mut movement = Movement::default();
        let mut pos = Position::new(1.0, 1.0);
        movement.move_in(Direction::S, 5.0);

        movement.update(0.0, &mut pos);
        movement.update(-16.0, &mut pos);
        movement.update(f32::NAN, &mut pos);

        assert_eq!(pos.position(), Vec2::new(1.0, 1.0));
        assert_eq!(movement.current_speed(), 0.0);
    }

    #[test]
    fn test_steered_velocity_bypasses_envelope() {
        let mut movement = Movement::default();
        let mut pos = Position::default();
        movement.set_velocity(Vec2::new(0.0, 120.0));
        movement.update(500.0, &mut pos);

        assert_eq!(pos.position(), Vec2::new(0.0, 60.0));
        assert_eq!(movement.direction(), Direction::S);

        // Back to directional mode: decelerates from the steered speed
        movement.stop();
        assert!(!movement.is_moving());
        assert_eq!(movement.current_speed(), 120.0);
    }
}
