//! ECS components for arena entities
//!
//! By domain:
//! - actor: combatant identity, health and damage model (Combatant, Health, DamageType)
//! - movement: discrete directions and the kinematic integrator (Direction, Movement)
//! - world: 2D position (Position)
//!
//! Skills live in `combat`, automation and steering in `ai`. `ComponentKey`
//! names every kind an entity can carry so hosts can inspect an entity
//! without touching the concrete types.

use bevy::prelude::*;

pub mod actor;
pub mod movement;
pub mod world;

pub use actor::*;
pub use movement::*;
pub use world::*;

use crate::ai::{Automation, Steering};
use crate::combat::SkillSet;

/// Stable key per component kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKey {
    Position,
    Movement,
    Health,
    Skills,
    Automation,
    Steering,
}

impl ComponentKey {
    pub const ALL: [ComponentKey; 6] = [
        ComponentKey::Position,
        ComponentKey::Movement,
        ComponentKey::Health,
        ComponentKey::Skills,
        ComponentKey::Automation,
        ComponentKey::Steering,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKey::Position => "position",
            ComponentKey::Movement => "movement",
            ComponentKey::Health => "health",
            ComponentKey::Skills => "skills",
            ComponentKey::Automation => "automation",
            ComponentKey::Steering => "steering",
        }
    }

    pub fn parse(key: &str) -> Option<ComponentKey> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    /// Whether `entity` carries this kind. Despawned entities carry nothing.
    pub fn is_attached(self, world: &World, entity: Entity) -> bool {
        let Ok(entity_ref) = world.get_entity(entity) else {
            return false;
        };
        match self {
            ComponentKey::Position => entity_ref.contains::<Position>(),
            ComponentKey::Movement => entity_ref.contains::<Movement>(),
            ComponentKey::Health => entity_ref.contains::<Health>(),
            ComponentKey::Skills => entity_ref.contains::<SkillSet>(),
            ComponentKey::Automation => entity_ref.contains::<Automation>(),
            ComponentKey::Steering => entity_ref.contains::<Steering>(),
        }
    }
}

/// Keys attached to `entity`, in `ComponentKey::ALL` order.
pub fn component_keys(world: &World, entity: Entity) -> Vec<ComponentKey> {
    ComponentKey::ALL
        .into_iter()
        .filter(|key| key.is_attached(world, entity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_strings_round_trip() {
        for key in ComponentKey::ALL {
            assert_eq!(ComponentKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(ComponentKey::parse("animation"), None);
    }

    #[test]
    fn test_component_keys_follow_attachment() {
        let mut world = World::new();
        let entity = world.spawn((Position::new(1.0, 2.0), Movement::default())).id();

        assert_eq!(
            component_keys(&world, entity),
            vec![ComponentKey::Position, ComponentKey::Movement]
        );

        world.despawn(entity);
        assert!(component_keys(&world, entity).is_empty());
    }
}
