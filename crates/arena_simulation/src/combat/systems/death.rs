//! Death handling: Dead marker, corpse despawn

use bevy::prelude::*;

use crate::combat::{Dead, DespawnAfter, EntityDied};
use crate::components::Movement;
use crate::logger;
use crate::tuning::ArenaTuning;
use crate::SimClock;

/// System: mark dead entities and schedule the corpse despawn
///
/// Movement halts immediately (no deceleration slide). Other components stay
/// so the renderer can still query the corpse.
pub fn handle_deaths(
    mut commands: Commands,
    clock: Res<SimClock>,
    tuning: Res<ArenaTuning>,
    mut death_events: EventReader<EntityDied>,
    mut movement_query: Query<&mut Movement>,
) {
    for event in death_events.read() {
        if let Ok(mut movement) = movement_query.get_mut(event.entity) {
            movement.halt();
        }

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert((
                Dead,
                DespawnAfter {
                    despawn_at_ms: clock.elapsed_ms + tuning.corpse_linger_ms as f64,
                },
            ));
            logger::log_info(&format!("💀 {:?} died (killer: {:?})", event.entity, event.killer));
        }
    }
}

/// System: despawn entities whose `DespawnAfter` time has come
pub fn despawn_after_timeout(mut commands: Commands, clock: Res<SimClock>, query: Query<(Entity, &DespawnAfter)>) {
    for (entity, despawn_after) in query.iter() {
        if clock.elapsed_ms >= despawn_after.despawn_at_ms {
            logger::log_info(&format!("⚰️ Despawning {:?}", entity));
            commands.entity(entity).despawn();
        }
    }
}
