//! Automation FSM components (behavior, config, state, driver).
//!
//! The FSM is plain data + pure methods: it reads geometry handed in by the
//! system and answers with an `AutomationCommand`. The system turns commands
//! into `Movement` calls and `SkillRequested` events.

use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::{Direction, Position};
use crate::error::{non_negative, ConfigError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect, Serialize, Deserialize)]
pub enum Behavior {
    #[default]
    Idle,
    Chase,
    Attack,
    Retreat,
    Patrol,
}

impl Behavior {
    pub fn as_str(self) -> &'static str {
        match self {
            Behavior::Idle => "idle",
            Behavior::Chase => "chase",
            Behavior::Attack => "attack",
            Behavior::Retreat => "retreat",
            Behavior::Patrol => "patrol",
        }
    }
}

/// Speed per behavior, as a multiple of the owner's base speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedMultipliers {
    pub idle: f32,
    pub chase: f32,
    pub attack: f32,
    pub retreat: f32,
    pub patrol: f32,
}

impl Default for SpeedMultipliers {
    fn default() -> Self {
        Self {
            idle: 0.0,
            chase: 1.0,
            attack: 0.0,
            retreat: 1.2,
            patrol: 0.8,
        }
    }
}

impl SpeedMultipliers {
    pub fn get(&self, behavior: Behavior) -> f32 {
        match behavior {
            Behavior::Idle => self.idle,
            Behavior::Chase => self.chase,
            Behavior::Attack => self.attack,
            Behavior::Retreat => self.retreat,
            Behavior::Patrol => self.patrol,
        }
    }
}

/// Static AI policy. Never mutated by the FSM; shared between instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIConfig {
    pub chase_range: f32,
    pub preferred_range: f32,
    pub retreat_range: f32,
    #[serde(default)]
    pub speed_multipliers: SpeedMultipliers,
    #[serde(default)]
    pub patrol_points: Vec<Vec2>,
    #[serde(default)]
    pub initial_behavior: Option<Behavior>,
    #[serde(default = "default_arrival_radius")]
    pub patrol_arrival_radius: f32,
}

fn default_arrival_radius() -> f32 {
    5.0
}

impl AIConfig {
    pub fn new(chase_range: f32, preferred_range: f32, retreat_range: f32) -> Self {
        Self {
            chase_range,
            preferred_range,
            retreat_range,
            speed_multipliers: SpeedMultipliers::default(),
            patrol_points: Vec::new(),
            initial_behavior: None,
            patrol_arrival_radius: default_arrival_radius(),
        }
    }

    pub fn with_patrol(mut self, points: Vec<Vec2>) -> Self {
        self.patrol_points = points;
        self
    }

    pub fn with_multipliers(mut self, multipliers: SpeedMultipliers) -> Self {
        self.speed_multipliers = multipliers;
        self
    }

    /// Ranges must be finite, non-negative and ordered retreat ≤ preferred ≤ chase;
    /// otherwise guards and re-selection can oscillate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("chase_range", self.chase_range)?;
        non_negative("preferred_range", self.preferred_range)?;
        non_negative("retreat_range", self.retreat_range)?;
        non_negative("patrol_arrival_radius", self.patrol_arrival_radius)?;
        if !(self.retreat_range <= self.preferred_range && self.preferred_range <= self.chase_range) {
            return Err(ConfigError::RangeOrder {
                retreat: self.retreat_range,
                preferred: self.preferred_range,
                chase: self.chase_range,
            });
        }
        let m = &self.speed_multipliers;
        for (field, value) in [
            ("speed_multipliers.idle", m.idle),
            ("speed_multipliers.chase", m.chase),
            ("speed_multipliers.attack", m.attack),
            ("speed_multipliers.retreat", m.retreat),
            ("speed_multipliers.patrol", m.patrol),
        ] {
            non_negative(field, value)?;
        }
        Ok(())
    }

    pub fn has_patrol(&self) -> bool {
        !self.patrol_points.is_empty()
    }
}

impl Default for AIConfig {
    fn default() -> Self {
        Self::new(300.0, 150.0, 50.0)
    }
}

/// Mutable FSM state.
///
/// `target` is a handle, not ownership: it is resolved every tick and cleared
/// once the entity is gone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AIState {
    pub behavior: Behavior,
    pub behavior_time_ms: f32,
    pub target: Option<Entity>,
    pub last_known_target_position: Option<Vec2>,
    /// Index of the next patrol point.
    pub patrol_cursor: usize,
}

/// What the owner should do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationCommand {
    Stop,
    Move { direction: Direction, speed: f32 },
    /// Stop and fire every owned skill at the target.
    Attack,
}

#[derive(Component, Debug, Clone)]
pub struct Automation {
    config: Arc<AIConfig>,
    state: AIState,
}

impl Automation {
    pub fn new(config: impl Into<Arc<AIConfig>>) -> Result<Self, ConfigError> {
        let config = config.into();
        config.validate()?;
        let state = AIState {
            behavior: config.initial_behavior.unwrap_or_default(),
            ..Default::default()
        };
        Ok(Self { config, state })
    }

    /// Swap the policy. The patrol cursor restarts at the first point.
    pub fn configure(&mut self, config: impl Into<Arc<AIConfig>>) -> Result<(), ConfigError> {
        let config = config.into();
        config.validate()?;
        self.config = config;
        self.state.patrol_cursor = 0;
        Ok(())
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    pub fn state(&self) -> &AIState {
        &self.state
    }

    pub fn behavior(&self) -> Behavior {
        self.state.behavior
    }

    pub fn target(&self) -> Option<Entity> {
        self.state.target
    }

    /// Assign (with its current position) or clear the target.
    pub fn set_target(&mut self, target: Option<(Entity, Vec2)>) {
        match target {
            Some((entity, position)) => {
                self.state.target = Some(entity);
                self.state.last_known_target_position = Some(position);
            }
            None => {
                self.state.target = None;
                self.state.last_known_target_position = None;
            }
        }
    }

    /// Resolves the target handle through `lookup`; a dangling handle is cleared.
    pub fn resolve_target(&mut self, lookup: impl FnOnce(Entity) -> Option<Vec2>) -> Option<(Entity, Vec2)> {
        let entity = self.state.target?;
        match lookup(entity) {
            Some(position) => Some((entity, position)),
            None => {
                self.set_target(None);
                None
            }
        }
    }

    /// Always restarts `behavior_time_ms`, even for the current behavior.
    pub fn set_behavior(&mut self, behavior: Behavior) {
        self.state.behavior = behavior;
        self.state.behavior_time_ms = 0.0;
    }

    /// Visibility substitute: within chase range. Refreshes the last known position.
    pub fn can_see_target(&mut self, own: Vec2, target: Vec2) -> bool {
        if self.state.target.is_none() {
            return false;
        }
        self.state.last_known_target_position = Some(target);
        own.distance(target) <= self.config.chase_range
    }

    /// Per-behavior guard on the distance to the target.
    pub fn should_update_behavior(&self, distance: f32) -> bool {
        let c = &self.config;
        match self.state.behavior {
            Behavior::Idle | Behavior::Patrol => distance <= c.chase_range,
            Behavior::Chase => distance <= c.preferred_range || distance > c.chase_range,
            Behavior::Attack => distance > c.preferred_range || distance < c.retreat_range,
            Behavior::Retreat => distance >= c.preferred_range,
        }
    }

    /// Re-selection, independent of the current behavior.
    pub fn select_behavior(&self, distance: f32) -> Behavior {
        let c = &self.config;
        if distance > c.chase_range {
            if c.has_patrol() {
                Behavior::Patrol
            } else {
                Behavior::Idle
            }
        } else if distance < c.retreat_range {
            Behavior::Retreat
        } else if distance <= c.preferred_range {
            Behavior::Attack
        } else {
            Behavior::Chase
        }
    }

    pub fn update_behavior(&mut self, distance: f32) {
        self.set_behavior(self.select_behavior(distance));
    }

    /// One FSM step.
    ///
    /// `target` is the resolved target position (`None`: no live target, the
    /// machine holds and the owner stops). `base_speed` scales the behavior
    /// multipliers.
    pub fn update(
        &mut self,
        delta_ms: f32,
        own: &Position,
        target: Option<Vec2>,
        base_speed: f32,
    ) -> AutomationCommand {
        let Some(target) = target else {
            return AutomationCommand::Stop;
        };

        self.state.behavior_time_ms += delta_ms.max(0.0);
        self.state.last_known_target_position = Some(target);

        let distance = own.distance_to(target);
        if self.should_update_behavior(distance) {
            self.update_behavior(distance);
        }

        let speed = self.config.speed_multipliers.get(self.state.behavior) * base_speed;
        match self.state.behavior {
            Behavior::Idle => AutomationCommand::Stop,
            Behavior::Attack => AutomationCommand::Attack,
            Behavior::Chase => AutomationCommand::Move {
                direction: Direction::from_vector(own.direction_to(target)),
                speed,
            },
            Behavior::Retreat => AutomationCommand::Move {
                direction: Direction::from_vector(-own.direction_to(target)),
                speed,
            },
            Behavior::Patrol => self.patrol_step(own, speed),
        }
    }

    fn patrol_step(&mut self, own: &Position, speed: f32) -> AutomationCommand {
        let points = &self.config.patrol_points;
        if points.is_empty() {
            return AutomationCommand::Stop;
        }
        let cursor = self.state.patrol_cursor % points.len();
        let point = points[cursor];
        let direction = Direction::from_vector(own.direction_to(point));

        if own.is_in_range(point, self.config.patrol_arrival_radius) {
            self.state.patrol_cursor = (cursor + 1) % points.len();
        }

        AutomationCommand::Move { direction, speed }
    }
}
