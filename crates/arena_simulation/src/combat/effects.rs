//! Effect plumbing: queued effects, over-time effects, passive regeneration

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::skill::{Effect, SkillTarget, VisualHandle};
use crate::components::DamageType;

/// Event: one effect of a fired skill, waiting to be applied this tick.
///
/// Applied in the order written, which is skill resolution order.
#[derive(Event, Debug, Clone)]
pub struct EffectQueued {
    pub source: Entity,
    pub target: SkillTarget,
    pub effect: Effect,
}

/// Event: forwarded untouched to the renderer's effect manager.
#[derive(Event, Debug, Clone)]
pub struct VisualEffectRequested {
    pub source: Entity,
    pub handle: VisualHandle,
    pub position: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimedKind {
    Damage(DamageType),
    Heal,
}

/// Damage or heal spread evenly over `duration_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedEffect {
    pub source: Entity,
    pub kind: TimedKind,
    pub total: f32,
    pub duration_ms: f32,
    pub remaining_ms: f32,
}

impl TimedEffect {
    pub fn new(source: Entity, kind: TimedKind, total: f32, duration_ms: f32) -> Self {
        Self {
            source,
            kind,
            total,
            duration_ms,
            remaining_ms: duration_ms,
        }
    }

    /// Advances by `delta_ms`, returns this step's share of `total`.
    pub fn step(&mut self, delta_ms: f32) -> f32 {
        if self.duration_ms <= 0.0 || delta_ms <= 0.0 || self.is_finished() {
            return 0.0;
        }
        let slice = delta_ms.min(self.remaining_ms);
        self.remaining_ms -= delta_ms;
        self.total * slice / self.duration_ms
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_ms <= 0.0
    }
}

/// Over-time effects currently running on an entity.
#[derive(Component, Debug, Clone, Default)]
pub struct ActiveEffects {
    pub effects: Vec<TimedEffect>,
}

impl ActiveEffects {
    pub fn push(&mut self, effect: TimedEffect) {
        self.effects.push(effect);
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Passive heal: `amount` per full `interval_ms` of simulated time.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regeneration {
    pub amount: f32,
    pub interval_ms: f32,
    #[serde(skip)]
    pub accumulated_ms: f32,
}

impl Regeneration {
    pub fn new(amount: f32, interval_ms: f32) -> Self {
        Self {
            amount,
            interval_ms,
            accumulated_ms: 0.0,
        }
    }

    /// Heal owed after `delta_ms`; leftover time carries into the next tick.
    pub fn tick(&mut self, delta_ms: f32) -> f32 {
        if self.interval_ms <= 0.0 || delta_ms <= 0.0 {
            return 0.0;
        }
        self.accumulated_ms += delta_ms;
        let intervals = (self.accumulated_ms / self.interval_ms).floor();
        self.accumulated_ms -= intervals * self.interval_ms;
        intervals * self.amount
    }
}

impl Default for Regeneration {
    fn default() -> Self {
        // 1 HP per second
        Self::new(1.0, 1000.0)
    }
}
