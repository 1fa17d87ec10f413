//! Damage bookkeeping: events and death markers
//!
//! `Health` does the arithmetic; this module carries the outcome to the rest
//! of the tick (UI feed, death handling, presentation).

use bevy::prelude::*;

/// Event: damage landed on `target`
///
/// `amount` is the effective amount after resistance.
#[derive(Event, Debug, Clone)]
pub struct DamageDealt {
    pub source: Entity,
    pub target: Entity,
    pub amount: f32,
    pub target_died: bool,
}

/// Event: health restored on `target` (effective amount after clamping)
#[derive(Event, Debug, Clone)]
pub struct HealApplied {
    pub source: Entity,
    pub target: Entity,
    pub amount: f32,
}

/// Event: entity reached 0 health this tick
#[derive(Event, Debug, Clone)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Marker: entity is dead (no longer active)
///
/// Dead entities are skipped by intent, movement and skill systems. The corpse
/// stays until `DespawnAfter` fires so the renderer can play the death animation.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Dead;

/// Despawn at a point in simulated time (`SimClock::elapsed_ms`)
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    pub despawn_at_ms: f64,
}
