//! Actor components: Combatant, Health, damage model

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{non_negative, ConfigError};

/// Combatant (player, soldier, dog): faction for hostility checks.
///
/// Pulls in `Health` and `Position` through required components.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Component)]
#[require(Health, crate::components::Position)]
pub struct Combatant {
    pub faction: u64,
}

impl Combatant {
    pub fn new(faction: u64) -> Self {
        Self { faction }
    }

    pub fn is_hostile_to(&self, other: &Combatant) -> bool {
        self.faction != other.faction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Explosive,
    Fire,
    Electric,
}

impl DamageType {
    pub const ALL: [DamageType; 4] = [
        DamageType::Physical,
        DamageType::Explosive,
        DamageType::Fire,
        DamageType::Electric,
    ];

    pub fn index(self) -> usize {
        match self {
            DamageType::Physical => 0,
            DamageType::Explosive => 1,
            DamageType::Fire => 2,
            DamageType::Electric => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    pub amount: f32,
    pub damage_type: DamageType,
}

impl DamageInfo {
    pub fn new(amount: f32, damage_type: DamageType) -> Self {
        Self { amount, damage_type }
    }

    pub fn physical(amount: f32) -> Self {
        Self::new(amount, DamageType::Physical)
    }
}

/// Static health policy: pool size + resistances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    pub max_health: f32,
    #[serde(default)]
    pub resistances: Vec<(DamageType, f32)>,
}

impl HealthConfig {
    pub fn new(max_health: f32) -> Self {
        Self {
            max_health,
            resistances: Vec::new(),
        }
    }

    pub fn with_resistance(mut self, damage_type: DamageType, value: f32) -> Self {
        self.resistances.push((damage_type, value));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(ConfigError::NonPositiveMaxHealth(self.max_health));
        }
        for (_, value) in &self.resistances {
            non_negative("resistance", *value)?;
        }
        Ok(())
    }
}

/// Health pool with per-type resistance.
///
/// Invariants: 0 ≤ current ≤ max, every resistance in [0, 1].
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(crate::combat::ActiveEffects)]
pub struct Health {
    current: f32,
    max: f32,
    resistance: [f32; 4],
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    /// Full pool. A non-positive or non-finite `max` falls back to 1.
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() && max > 0.0 { max } else { 1.0 };
        Self {
            current: max,
            max,
            resistance: [0.0; 4],
        }
    }

    pub fn from_config(config: &HealthConfig) -> Self {
        let mut health = Self::new(config.max_health);
        for (damage_type, value) in &config.resistances {
            health.set_resistance(*damage_type, *value);
        }
        health
    }

    /// Applies `amount × (1 − resistance[type])`. Returns "still alive".
    ///
    /// Dead targets are left untouched and report `false`.
    pub fn take_damage(&mut self, info: DamageInfo) -> bool {
        if self.is_dead() {
            return false;
        }
        let amount = if info.amount.is_finite() { info.amount.max(0.0) } else { 0.0 };
        let effective = amount * (1.0 - self.resistance(info.damage_type));
        self.current = (self.current - effective).clamp(0.0, self.max);
        !self.is_dead()
    }

    /// Clamped at `max`. Negative amounts count as 0; the dead stay dead.
    pub fn heal(&mut self, amount: f32) {
        if self.is_dead() || !amount.is_finite() {
            return;
        }
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// `current / max` in [0, 1].
    pub fn percentage(&self) -> f32 {
        self.current / self.max
    }

    pub fn resistance(&self, damage_type: DamageType) -> f32 {
        self.resistance[damage_type.index()]
    }

    pub fn set_resistance(&mut self, damage_type: DamageType, value: f32) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        self.resistance[damage_type.index()] = value;
    }
}
