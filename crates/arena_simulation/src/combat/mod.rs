//! Combat module
//!
//! ECS responsibility:
//! - State: SkillSet (cooldowns), Health (via components), ActiveEffects, Regeneration
//! - Rules: cooldown/range gating, resistance, over-time and area effects
//! - Events: SkillRequested → SkillUsed → EffectQueued → DamageDealt / HealApplied → EntityDied
//!
//! Renderer responsibility: visuals behind `VisualHandle`, death animation.

use bevy::prelude::*;

pub mod damage;
pub mod effects;
pub mod skill;
pub mod systems;

pub use damage::{DamageDealt, Dead, DespawnAfter, EntityDied, HealApplied};
pub use effects::{ActiveEffects, EffectQueued, Regeneration, TimedEffect, TimedKind, VisualEffectRequested};
pub use skill::{
    DamageFalloff, Effect, SkillCast, SkillDescriptor, SkillRejected, SkillRequested, SkillSet, SkillTarget, SkillUsed,
    VisualHandle,
};

use crate::{ArenaTick, TickEventAppExt, TickSet};

/// Combat Plugin
///
/// Execution order inside `ArenaTick`:
/// 1. `TickSet::Skills`: tick_skill_cooldowns → resolve_skill_requests
/// 2. `TickSet::Effects`: apply_queued_effects → tick_active_effects → regenerate_health
/// 3. `TickSet::Lifecycle`: handle_deaths → despawn_after_timeout
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<SkillRequested>()
            .add_tick_event::<SkillUsed>()
            .add_tick_event::<EffectQueued>()
            .add_tick_event::<DamageDealt>()
            .add_tick_event::<HealApplied>()
            .add_tick_event::<EntityDied>()
            .add_tick_event::<VisualEffectRequested>();

        app.add_systems(
            ArenaTick,
            (systems::tick_skill_cooldowns, systems::resolve_skill_requests)
                .chain()
                .in_set(TickSet::Skills),
        )
        .add_systems(
            ArenaTick,
            (
                systems::apply_queued_effects,
                systems::tick_active_effects,
                systems::regenerate_health,
            )
                .chain()
                .in_set(TickSet::Effects),
        )
        .add_systems(
            ArenaTick,
            (systems::handle_deaths, systems::despawn_after_timeout)
                .chain()
                .in_set(TickSet::Lifecycle),
        );
    }
}
