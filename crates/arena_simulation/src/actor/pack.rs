//! Pack upkeep: a fixed number of pursuers, replaced at the arena edge as they fall

use bevy::prelude::*;

use crate::actor::{edge_spawn_position, spawn_combatant, Loadout};
use crate::combat::Dead;
use crate::logger;
use crate::tuning::ArenaTuning;
use crate::DeterministicRng;

/// Keeps `size` living pack members in the arena.
///
/// Every missing member is spawned from `template` at a random point just
/// outside the arena, drawn from `DeterministicRng`.
#[derive(Resource, Debug, Clone)]
pub struct PackSpawner {
    pub size: usize,
    pub template: Loadout,
    /// Distance outside the arena edge.
    pub margin: f32,
}

impl PackSpawner {
    pub fn new(size: usize, template: Loadout) -> Self {
        Self {
            size,
            template,
            margin: 20.0,
        }
    }
}

/// Marker: spawned and replaced by `PackSpawner`
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PackMember;

/// System: top the pack up to its size
///
/// Runs after death handling, so a member killed this tick is replaced in
/// the same tick while its corpse lingers.
pub fn replenish_pack(world: &mut World) {
    let Some(size) = world.get_resource::<PackSpawner>().map(|spawner| spawner.size) else {
        return;
    };
    let alive = world
        .query_filtered::<Entity, (With<PackMember>, Without<Dead>)>()
        .iter(world)
        .count();
    if alive >= size {
        return;
    }

    let Some(spawner) = world.get_resource::<PackSpawner>().cloned() else {
        return;
    };
    let arena = world
        .get_resource::<ArenaTuning>()
        .map(|tuning| tuning.arena_size)
        .unwrap_or_else(|| ArenaTuning::default().arena_size);

    for _ in alive..size {
        let position = {
            let Some(mut rng) = world.get_resource_mut::<DeterministicRng>() else {
                logger::log_warning("pack: DeterministicRng missing, nothing spawned");
                return;
            };
            edge_spawn_position(&mut rng.rng, arena, spawner.margin)
        };

        let mut loadout = spawner.template.clone();
        loadout.position = position;
        // Rejected templates are logged by spawn_combatant and never get better
        let Ok(entity) = spawn_combatant(world, loadout) else {
            return;
        };
        world.entity_mut(entity).insert(PackMember);
        logger::log(&format!("🐺 pack member {:?} enters at ({:.0}, {:.0})", entity, position.x, position.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Archetype, Control};
    use crate::ai::SteeringConfig;
    use crate::components::HealthConfig;

    fn pack_world(size: usize) -> (World, Entity) {
        let mut world = World::new();
        world.insert_resource(DeterministicRng::new(7));
        world.insert_resource(ArenaTuning::default());
        let prey = spawn_combatant(&mut world, Loadout::new(1, Vec2::new(400.0, 300.0))).unwrap();

        let template = Archetype::Hound
            .loadout(2, Vec2::ZERO, 5.0, 1.0)
            .controlled_by(Control::Pursuer {
                steering: SteeringConfig::default(),
                target: prey,
            });
        world.insert_resource(PackSpawner::new(size, template));
        (world, prey)
    }

    fn members(world: &mut World) -> Vec<Entity> {
        world
            .query_filtered::<Entity, (With<PackMember>, Without<Dead>)>()
            .iter(world)
            .collect()
    }

    #[test]
    fn test_fills_pack_at_arena_edges() {
        let (mut world, _) = pack_world(4);

        replenish_pack(&mut world);
        let pack = members(&mut world);
        assert_eq!(pack.len(), 4);

        for entity in pack {
            let p = world.get::<crate::components::Position>(entity).unwrap().position();
            let outside = p.x < 0.0 || p.y < 0.0 || p.x > 800.0 || p.y > 600.0;
            assert!(outside, "{:?} spawned inside the arena", p);
        }

        // Full pack: nothing more
        replenish_pack(&mut world);
        assert_eq!(members(&mut world).len(), 4);
    }

    #[test]
    fn test_dead_member_is_replaced() {
        let (mut world, _) = pack_world(2);
        replenish_pack(&mut world);
        let fallen = members(&mut world)[0];

        world.entity_mut(fallen).insert(Dead);
        replenish_pack(&mut world);

        let pack = members(&mut world);
        assert_eq!(pack.len(), 2);
        assert!(!pack.contains(&fallen));
        // The corpse is left for the lifecycle systems
        assert!(world.get_entity(fallen).is_ok());
    }

    #[test]
    fn test_invalid_template_spawns_nothing() {
        let (mut world, _) = pack_world(3);
        world.resource_mut::<PackSpawner>().template.health = HealthConfig::new(0.0);

        replenish_pack(&mut world);
        assert!(members(&mut world).is_empty());
    }
}
