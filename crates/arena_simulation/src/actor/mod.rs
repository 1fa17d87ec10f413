//! Combatant assembly: loadouts, archetypes, spawn and renderer snapshot
//!
//! Every component an entity will ever have is attached here, once. Config
//! validation happens here too, so systems never see a malformed policy.

use std::sync::Arc;

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{AIConfig, AutoTarget, Automation, Behavior, SpeedMultipliers, Steering, SteeringConfig, SteeringTarget};
use crate::combat::{Dead, Effect, Regeneration, SkillDescriptor, SkillSet};
use crate::components::{Combatant, DamageType, Direction, Health, HealthConfig, Movement, MovementConfig, Position};
use crate::error::ConfigError;
use crate::logger;
use crate::player::PlayerControlled;
use crate::visual::Presentation;

pub mod pack;

pub use pack::{replenish_pack, PackMember, PackSpawner};

/// Who decides where a combatant goes.
#[derive(Debug, Clone)]
pub enum Control {
    /// Driven by `PlayerIntent`.
    Player,
    /// Automation FSM. `auto_target` picks the nearest hostile when the target is lost.
    Automation {
        config: Arc<AIConfig>,
        target: Option<Entity>,
        auto_target: bool,
    },
    /// Pack steering toward `target`, attacking it with every owned skill.
    /// The stop distance is pulled inside the longest skill range at spawn.
    Pursuer { steering: SteeringConfig, target: Entity },
    /// Moves only when something else commands it.
    Inert,
}

/// Everything needed to spawn one combatant.
#[derive(Debug, Clone)]
pub struct Loadout {
    pub faction: u64,
    pub position: Vec2,
    pub health: HealthConfig,
    pub movement: MovementConfig,
    pub skills: Vec<SkillDescriptor>,
    pub regeneration: Option<Regeneration>,
    pub control: Control,
}

impl Loadout {
    pub fn new(faction: u64, position: Vec2) -> Self {
        Self {
            faction,
            position,
            health: HealthConfig::new(100.0),
            movement: MovementConfig::default(),
            skills: Vec::new(),
            regeneration: None,
            control: Control::Inert,
        }
    }

    pub fn controlled_by(mut self, control: Control) -> Self {
        self.control = control;
        self
    }

    pub fn with_skill(mut self, skill: SkillDescriptor) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_regeneration(mut self, regeneration: Regeneration) -> Self {
        self.regeneration = Some(regeneration);
        self
    }

    /// Retarget an automation/pursuer loadout. No-op for other controls.
    pub fn targeting(mut self, target: Entity) -> Self {
        match &mut self.control {
            Control::Automation { target: slot, .. } => *slot = Some(target),
            Control::Pursuer { target: slot, .. } => *slot = target,
            Control::Player | Control::Inert => {}
        }
        self
    }
}

/// Ready-made combatant templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Ranged hero: durable, long gun.
    Commando,
    /// Line infantry: fragile, retreats fast.
    Rifleman,
    /// Melee pack animal: fast, bites at contact range.
    Hound,
}

impl Archetype {
    /// Template loadout under automation. `attacks_per_second` sets the cooldown
    /// (`1000 / rate` ms; a non-positive rate means no cooldown).
    pub fn loadout(self, faction: u64, position: Vec2, damage: f32, attacks_per_second: f32) -> Loadout {
        let cooldown_ms = if attacks_per_second > 0.0 { 1000.0 / attacks_per_second } else { 0.0 };

        let (health, movement, skill_id, range, ai) = match self {
            Archetype::Commando => (
                HealthConfig::new(100.0)
                    .with_resistance(DamageType::Physical, 0.2)
                    .with_resistance(DamageType::Explosive, 0.1),
                MovementConfig {
                    base_speed: 5.0,
                    acceleration: 20.0,
                    deceleration: 10.0,
                    max_speed: 8.0,
                },
                "shoot",
                200.0,
                AIConfig::new(300.0, 150.0, 50.0),
            ),
            Archetype::Rifleman => (
                HealthConfig::new(50.0)
                    .with_resistance(DamageType::Physical, 0.1)
                    .with_resistance(DamageType::Explosive, 0.05),
                MovementConfig {
                    base_speed: 4.0,
                    acceleration: 15.0,
                    deceleration: 8.0,
                    max_speed: 6.0,
                },
                "rifle_shot",
                150.0,
                AIConfig::new(200.0, 100.0, 40.0).with_multipliers(SpeedMultipliers {
                    retreat: 1.5,
                    patrol: 0.7,
                    ..Default::default()
                }),
            ),
            Archetype::Hound => (
                HealthConfig::new(30.0)
                    .with_resistance(DamageType::Physical, 0.05)
                    .with_resistance(DamageType::Explosive, 0.02),
                MovementConfig {
                    base_speed: 7.0,
                    acceleration: 25.0,
                    deceleration: 15.0,
                    max_speed: 10.0,
                },
                "bite",
                20.0,
                AIConfig::new(250.0, 10.0, 0.0).with_multipliers(SpeedMultipliers {
                    chase: 1.2,
                    retreat: 1.0,
                    ..Default::default()
                }),
            ),
        };

        let skill = SkillDescriptor::new(skill_id, cooldown_ms, range)
            .requiring_target()
            .with_effect(Effect::damage(damage, DamageType::Physical));

        Loadout {
            faction,
            position,
            health,
            movement,
            skills: vec![skill],
            regeneration: None,
            control: Control::Automation {
                config: Arc::new(ai),
                target: None,
                auto_target: false,
            },
        }
    }
}

/// Validates `loadout` and spawns the combatant.
///
/// Nothing is spawned on error.
pub fn spawn_combatant(world: &mut World, loadout: Loadout) -> Result<Entity, ConfigError> {
    build_and_spawn(world, loadout).inspect_err(|error| {
        logger::log_warning(&format!("spawn rejected: {}", error));
    })
}

fn build_and_spawn(world: &mut World, loadout: Loadout) -> Result<Entity, ConfigError> {
    loadout.health.validate()?;
    loadout.movement.validate()?;

    let reach = loadout.skills.iter().map(|skill| skill.range).fold(0.0, f32::max);
    let mut skills = SkillSet::new();
    for skill in loadout.skills {
        skills.add_skill(skill)?;
    }

    let automation = match &loadout.control {
        Control::Automation { config, target, .. } => {
            let mut automation = Automation::new(config.clone())?;
            if let Some(target) = *target {
                let position = world.get::<Position>(target).map(Position::position);
                if let Some(position) = position {
                    automation.set_target(Some((target, position)));
                }
            }
            Some(automation)
        }
        _ => None,
    };
    if let Control::Pursuer { steering, .. } = &loadout.control {
        steering.validate()?;
    }

    let mut entity = world.spawn((
        Combatant::new(loadout.faction),
        Position::from_vec(loadout.position),
        Health::from_config(&loadout.health),
        Movement::new(loadout.movement),
        skills,
        Presentation::default(),
    ));

    if let Some(regeneration) = loadout.regeneration {
        entity.insert(regeneration);
    }

    match loadout.control {
        Control::Player => {
            entity.insert(PlayerControlled);
        }
        Control::Automation { auto_target, .. } => {
            if let Some(automation) = automation {
                entity.insert(automation);
            }
            if auto_target {
                entity.insert(AutoTarget);
            }
        }
        Control::Pursuer { steering, target } => {
            entity.insert((Steering::new(steering.within_reach(reach)), SteeringTarget(target)));
        }
        Control::Inert => {}
    }

    let id = entity.id();
    logger::log(&format!("spawned combatant {:?} (faction {})", id, loadout.faction));
    Ok(id)
}

/// Point just outside one of the arena edges (origin top-left).
pub fn edge_spawn_position(rng: &mut impl Rng, arena: Vec2, margin: f32) -> Vec2 {
    let width = arena.x.max(0.0);
    let height = arena.y.max(0.0);
    match rng.gen_range(0..4) {
        0 => Vec2::new(rng.gen_range(0.0..=width), -margin),
        1 => Vec2::new(width + margin, rng.gen_range(0.0..=height)),
        2 => Vec2::new(rng.gen_range(0.0..=width), height + margin),
        _ => Vec2::new(-margin, rng.gen_range(0.0..=height)),
    }
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantSnapshot {
    pub entity: Entity,
    pub position: Vec2,
    pub facing: Direction,
    pub behavior: Option<Behavior>,
    pub animation_key: String,
    pub active: bool,
    pub health_percentage: f32,
}

/// `None` once the entity is despawned or if it has no position.
pub fn snapshot(world: &World, entity: Entity) -> Option<CombatantSnapshot> {
    let entity_ref = world.get_entity(entity).ok()?;
    let position = entity_ref.get::<Position>()?.position();
    let presentation = entity_ref.get::<Presentation>();

    Some(CombatantSnapshot {
        entity,
        position,
        facing: presentation.map(|p| p.facing).unwrap_or_default(),
        behavior: entity_ref.get::<Automation>().map(Automation::behavior),
        animation_key: presentation.map(|p| p.key.clone()).unwrap_or_default(),
        active: !entity_ref.contains::<Dead>(),
        health_percentage: entity_ref.get::<Health>().map(Health::percentage).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_archetype_cooldown_from_rate() {
        let loadout = Archetype::Rifleman.loadout(2, Vec2::ZERO, 8.0, 2.0);
        assert_eq!(loadout.skills[0].cooldown_ms, 500.0);
        assert_eq!(loadout.skills[0].range, 150.0);
        assert_eq!(loadout.health.max_health, 50.0);

        let hound = Archetype::Hound.loadout(2, Vec2::ZERO, 5.0, 0.0);
        assert_eq!(hound.skills[0].cooldown_ms, 0.0);
        assert_eq!(hound.skills[0].id, "bite");
    }

    #[test]
    fn test_archetypes_are_valid() {
        let mut world = World::new();
        for archetype in [Archetype::Commando, Archetype::Rifleman, Archetype::Hound] {
            let loadout = archetype.loadout(1, Vec2::ZERO, 10.0, 1.0);
            assert!(spawn_combatant(&mut world, loadout).is_ok(), "{:?}", archetype);
        }
    }

    #[test]
    fn test_spawn_rejects_bad_config_without_spawning() {
        let mut world = World::new();

        let mut loadout = Loadout::new(1, Vec2::ZERO);
        loadout.health = HealthConfig::new(0.0);
        assert!(matches!(
            spawn_combatant(&mut world, loadout),
            Err(ConfigError::NonPositiveMaxHealth(_))
        ));

        let duplicated = Loadout::new(1, Vec2::ZERO)
            .with_skill(SkillDescriptor::new("shoot", 100.0, 10.0))
            .with_skill(SkillDescriptor::new("shoot", 200.0, 10.0));
        assert!(matches!(
            spawn_combatant(&mut world, duplicated),
            Err(ConfigError::DuplicateSkill(_))
        ));

        let bad_ai = Loadout::new(1, Vec2::ZERO).controlled_by(Control::Automation {
            config: Arc::new(AIConfig::new(10.0, 100.0, 5.0)),
            target: None,
            auto_target: false,
        });
        assert!(spawn_combatant(&mut world, bad_ai).is_err());

        assert_eq!(world.query::<&Combatant>().iter(&world).count(), 0);
    }

    #[test]
    fn test_snapshot_of_fresh_combatant() {
        let mut world = World::new();
        let target = spawn_combatant(&mut world, Loadout::new(1, Vec2::new(100.0, 0.0))).unwrap();
        let soldier = Archetype::Rifleman
            .loadout(2, Vec2::new(10.0, 20.0), 8.0, 1.0)
            .targeting(target);
        let entity = spawn_combatant(&mut world, soldier).unwrap();

        let view = snapshot(&world, entity).unwrap();
        assert_eq!(view.position, Vec2::new(10.0, 20.0));
        assert_eq!(view.behavior, Some(Behavior::Idle));
        assert_eq!(view.animation_key, "standing_s");
        assert!(view.active);
        assert_eq!(view.health_percentage, 1.0);

        let automation = world.get::<Automation>(entity).unwrap();
        assert_eq!(automation.target(), Some(target));

        world.despawn(entity);
        assert!(snapshot(&world, entity).is_none());
    }

    #[test]
    fn test_pursuer_stops_within_skill_reach() {
        let mut world = World::new();
        let prey = spawn_combatant(&mut world, Loadout::new(1, Vec2::ZERO)).unwrap();
        let hound = Archetype::Hound
            .loadout(2, Vec2::new(300.0, 0.0), 5.0, 1.0)
            .controlled_by(Control::Pursuer {
                steering: SteeringConfig::default(),
                target: prey,
            });
        let entity = spawn_combatant(&mut world, hound).unwrap();

        let steering = world.get::<Steering>(entity).unwrap();
        assert_eq!(steering.config().stop_distance, 15.0);
        assert_eq!(steering.config().speed, SteeringConfig::default().speed);
    }

    #[test]
    fn test_edge_spawn_is_outside_arena() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let arena = Vec2::new(800.0, 600.0);

        for _ in 0..100 {
            let p = edge_spawn_position(&mut rng, arena, 20.0);
            let outside = p.x < 0.0 || p.y < 0.0 || p.x > arena.x || p.y > arena.y;
            assert!(outside, "{:?} inside arena", p);
        }
    }
}
