//! World-level tuning knobs (RON-loadable)
//!
//! Per-entity policy lives on the entity (`MovementConfig`, `AIConfig`, ...).
//! `ArenaTuning` holds what is shared by the whole arena.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::SteeringConfig;
use crate::error::{non_negative, ConfigError};

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaTuning {
    /// `ArenaTick` rate when driven from `FixedUpdate`.
    pub tick_hz: f64,
    /// How long a corpse stays before despawn.
    pub corpse_linger_ms: f32,
    /// Default steering for pursuer packs.
    pub pursuer: SteeringConfig,
    /// Arena extent, origin top-left.
    pub arena_size: Vec2,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            corpse_linger_ms: 3000.0,
            pursuer: SteeringConfig::default(),
            arena_size: Vec2::new(800.0, 600.0),
        }
    }
}

impl ArenaTuning {
    /// Parses and validates a RON document. Missing fields take defaults.
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        let tuning: ArenaTuning = ron::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(ConfigError::Negative {
                field: "tick_hz",
                value: self.tick_hz as f32,
            });
        }
        non_negative("corpse_linger_ms", self.corpse_linger_ms)?;
        non_negative("arena_size.x", self.arena_size.x)?;
        non_negative("arena_size.y", self.arena_size.y)?;
        self.pursuer.validate()
    }
}
