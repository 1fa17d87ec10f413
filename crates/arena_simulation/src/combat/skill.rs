//! Skills: descriptors, per-owner catalog, cooldown gating
//!
//! `SkillSet::use_skill` only decides whether a skill fires. The resulting
//! `SkillCast` carries the effects; systems in `combat::systems` apply them
//! to the target's `Health` later in the same tick.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::DamageType;
use crate::error::{non_negative, ConfigError};

/// Opaque handle to a visual owned by the renderer's effect manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisualHandle(pub u64);

/// What a skill does to its target.
///
/// `duration_ms > 0` spreads the value evenly over that span of simulated time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Damage {
        amount: f32,
        damage_type: DamageType,
        #[serde(default)]
        duration_ms: f32,
        /// Area of effect around the target position; 0 = single target.
        #[serde(default)]
        radius: f32,
        /// Area damage shrinks with distance from the blast centre.
        #[serde(default)]
        falloff: Option<DamageFalloff>,
    },
    Heal {
        amount: f32,
        #[serde(default)]
        duration_ms: f32,
    },
    Visual {
        handle: VisualHandle,
    },
}

/// Linear falloff for area damage.
///
/// Full `amount` up to `full_radius`, then linear down to `min_amount` at the
/// edge of the blast, nothing beyond it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageFalloff {
    pub min_amount: f32,
    pub full_radius: f32,
}

impl DamageFalloff {
    pub fn amount_at(&self, max_amount: f32, radius: f32, distance: f32) -> f32 {
        if distance > radius {
            return 0.0;
        }
        let span = radius - self.full_radius;
        if span <= 0.0 || distance <= self.full_radius {
            return max_amount;
        }
        let t = ((radius - distance) / span).clamp(0.0, 1.0);
        self.min_amount + t * (max_amount - self.min_amount)
    }
}

impl Effect {
    pub fn damage(amount: f32, damage_type: DamageType) -> Self {
        Effect::Damage {
            amount,
            damage_type,
            duration_ms: 0.0,
            radius: 0.0,
            falloff: None,
        }
    }

    /// Instant area damage: `max_amount` within `full_radius`, `min_amount` at `radius`.
    pub fn proximity(
        max_amount: f32,
        min_amount: f32,
        full_radius: f32,
        radius: f32,
        damage_type: DamageType,
    ) -> Self {
        Effect::Damage {
            amount: max_amount,
            damage_type,
            duration_ms: 0.0,
            radius,
            falloff: Some(DamageFalloff {
                min_amount,
                full_radius,
            }),
        }
    }

    pub fn heal(amount: f32) -> Self {
        Effect::Heal {
            amount,
            duration_ms: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDescriptor {
    pub id: String,
    pub cooldown_ms: f32,
    /// 0 = unlimited.
    #[serde(default)]
    pub range: f32,
    #[serde(default)]
    pub requires_target: bool,
    pub effects: Vec<Effect>,
}

impl SkillDescriptor {
    pub fn new(id: impl Into<String>, cooldown_ms: f32, range: f32) -> Self {
        Self {
            id: id.into(),
            cooldown_ms,
            range,
            requires_target: false,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn requiring_target(mut self) -> Self {
        self.requires_target = true;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("cooldown_ms", self.cooldown_ms)?;
        non_negative("range", self.range)?;
        for effect in &self.effects {
            match effect {
                Effect::Damage {
                    amount,
                    duration_ms,
                    radius,
                    falloff,
                    ..
                } => {
                    non_negative("damage", *amount)?;
                    non_negative("duration_ms", *duration_ms)?;
                    non_negative("radius", *radius)?;
                    if let Some(falloff) = falloff {
                        non_negative("falloff.min_amount", falloff.min_amount)?;
                        non_negative("falloff.full_radius", falloff.full_radius)?;
                    }
                }
                Effect::Heal {
                    amount,
                    duration_ms,
                } => {
                    non_negative("heal", *amount)?;
                    non_negative("duration_ms", *duration_ms)?;
                }
                Effect::Visual { .. } => {}
            }
        }
        Ok(())
    }
}

/// Where a skill is aimed.
///
/// Systems refresh `position` from the target entity's current `Position`
/// before the range check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillTarget {
    pub position: Vec2,
    pub entity: Option<Entity>,
}

impl SkillTarget {
    pub fn entity(entity: Entity, position: Vec2) -> Self {
        Self {
            position,
            entity: Some(entity),
        }
    }

    pub fn point(position: Vec2) -> Self {
        Self {
            position,
            entity: None,
        }
    }
}

/// A skill that fired: its effects still have to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCast {
    pub skill_id: String,
    pub target: SkillTarget,
    pub effects: Vec<Effect>,
}

/// Why `use_skill` did not fire. Ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum SkillRejected {
    Unknown,
    OnCooldown { remaining_ms: f32 },
    MissingTarget,
    OutOfRange { distance: f32, range: f32 },
}

/// Event: someone wants `skill_id` fired this tick.
///
/// Written by automation (ATTACK) and player intent during `TickSet::Intent`,
/// resolved after movement against the target's current position.
#[derive(Event, Debug, Clone)]
pub struct SkillRequested {
    pub caster: Entity,
    pub skill_id: String,
    pub target: SkillTarget,
}

/// Event: a skill fired (cooldown restarted, effects queued).
#[derive(Event, Debug, Clone)]
pub struct SkillUsed {
    pub caster: Entity,
    pub skill_id: String,
    pub target: SkillTarget,
}

#[derive(Debug, Clone)]
struct SkillSlot {
    descriptor: SkillDescriptor,
    /// Countdown; usable at ≤ 0.
    cooldown_ms: f32,
}

/// Skill catalog of one owner, in insertion order.
#[derive(Component, Debug, Clone, Default)]
pub struct SkillSet {
    slots: Vec<SkillSlot>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a ready-to-use skill.
    pub fn add_skill(&mut self, descriptor: SkillDescriptor) -> Result<(), ConfigError> {
        descriptor.validate()?;
        if self.has_skill(&descriptor.id) {
            return Err(ConfigError::DuplicateSkill(descriptor.id));
        }
        self.slots.push(SkillSlot {
            descriptor,
            cooldown_ms: 0.0,
        });
        Ok(())
    }

    pub fn remove_skill(&mut self, id: &str) -> Option<SkillDescriptor> {
        let index = self.slots.iter().position(|slot| slot.descriptor.id == id)?;
        Some(self.slots.remove(index).descriptor)
    }

    pub fn has_skill(&self, id: &str) -> bool {
        self.slot(id).is_some()
    }

    pub fn descriptor(&self, id: &str) -> Option<&SkillDescriptor> {
        self.slot(id).map(|slot| &slot.descriptor)
    }

    /// Milliseconds until ready (0 when ready); `None` for an unknown id.
    pub fn cooldown(&self, id: &str) -> Option<f32> {
        self.slot(id).map(|slot| slot.cooldown_ms.max(0.0))
    }

    pub fn skill_ids(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.descriptor.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Counts every cooldown down by `delta_ms`, floored at 0.
    pub fn update_skills(&mut self, delta_ms: f32) {
        if !delta_ms.is_finite() || delta_ms <= 0.0 {
            return;
        }
        for slot in &mut self.slots {
            if slot.cooldown_ms > 0.0 {
                slot.cooldown_ms = (slot.cooldown_ms - delta_ms).max(0.0);
            }
        }
    }

    /// Fires `id` from `owner` at `target` if ready and in range.
    ///
    /// On success the cooldown restarts and the effects are returned for
    /// application. On rejection nothing changes.
    pub fn use_skill(
        &mut self,
        id: &str,
        owner: Vec2,
        target: &SkillTarget,
    ) -> Result<SkillCast, SkillRejected> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.descriptor.id == id)
            .ok_or(SkillRejected::Unknown)?;

        if slot.cooldown_ms > 0.0 {
            return Err(SkillRejected::OnCooldown {
                remaining_ms: slot.cooldown_ms,
            });
        }

        if slot.descriptor.requires_target && target.entity.is_none() {
            return Err(SkillRejected::MissingTarget);
        }

        let range = slot.descriptor.range;
        if range > 0.0 {
            let distance = owner.distance(target.position);
            if distance > range {
                return Err(SkillRejected::OutOfRange { distance, range });
            }
        }

        slot.cooldown_ms = slot.descriptor.cooldown_ms;

        Ok(SkillCast {
            skill_id: slot.descriptor.id.clone(),
            target: *target,
            effects: slot.descriptor.effects.clone(),
        })
    }

    fn slot(&self, id: &str) -> Option<&SkillSlot> {
        self.slots.iter().find(|slot| slot.descriptor.id == id)
    }
}
