//! Automation systems: target acquisition + FSM driver

use bevy::prelude::*;

use crate::ai::components::{Automation, AutomationCommand, Behavior};
use crate::combat::{Dead, SkillRequested, SkillSet, SkillTarget};
use crate::components::{Combatant, Movement, Position};
use crate::logger;
use crate::TickDelta;

/// Event: an automation agent switched behavior
#[derive(Event, Debug, Clone)]
pub struct BehaviorChanged {
    pub entity: Entity,
    pub from: Behavior,
    pub to: Behavior,
}

/// Marker: automation agent picks its own target (nearest hostile in chase range)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct AutoTarget;

/// Nearest living combatant of another faction within `max_range`.
///
/// Ties go to the lower entity index so the pick does not depend on query order.
pub fn find_nearest_hostile<'a>(
    self_entity: Entity,
    self_faction: &Combatant,
    self_position: Vec2,
    candidates: impl IntoIterator<Item = (Entity, &'a Combatant, &'a Position)>,
    max_range: f32,
) -> Option<(Entity, Vec2)> {
    let mut nearest: Option<(Entity, Vec2, f32)> = None;

    for (entity, combatant, position) in candidates {
        if entity == self_entity || !self_faction.is_hostile_to(combatant) {
            continue;
        }

        let distance = position.distance_to(self_position);
        if distance > max_range {
            continue;
        }

        let closer = match nearest {
            None => true,
            Some((best, _, best_distance)) => {
                distance < best_distance || (distance == best_distance && entity.index() < best.index())
            }
        };
        if closer {
            nearest = Some((entity, position.position(), distance));
        }
    }

    nearest.map(|(entity, position, _)| (entity, position))
}

/// System: assign targets to `AutoTarget` agents without a live one
pub fn acquire_nearest_hostile(
    mut agents: Query<(Entity, &Combatant, &Position, &mut Automation), (With<AutoTarget>, Without<Dead>)>,
    candidates: Query<(Entity, &Combatant, &Position), Without<Dead>>,
) {
    for (entity, combatant, position, mut automation) in agents.iter_mut() {
        if let Some(target) = automation.target() {
            if candidates.contains(target) {
                continue;
            }
        }

        let chase_range = automation.config().chase_range;
        let found = find_nearest_hostile(entity, combatant, position.position(), candidates.iter(), chase_range);
        if let Some((target, _)) = found {
            logger::log(&format!("🎯 {:?} acquired target {:?}", entity, target));
        }
        automation.set_target(found);
    }
}

/// System: one FSM step per living automation agent
///
/// Reads pre-tick positions. Movement commands are applied to `Movement`
/// (integrated later in `TickSet::Movement`); ATTACK requests every owned
/// skill, gating happens when the request is resolved.
pub fn run_automation(
    delta: Res<TickDelta>,
    mut agents: Query<(Entity, &Position, &mut Automation, &mut Movement, Option<&SkillSet>), Without<Dead>>,
    targets: Query<&Position, Without<Dead>>,
    mut skill_requests: EventWriter<SkillRequested>,
    mut behavior_events: EventWriter<BehaviorChanged>,
) {
    for (entity, position, mut automation, mut movement, skills) in agents.iter_mut() {
        let target = automation.resolve_target(|target| targets.get(target).ok().map(Position::position));

        let before = automation.behavior();
        let command = automation.update(
            delta.ms,
            position,
            target.map(|(_, target_position)| target_position),
            movement.base_speed(),
        );
        let after = automation.behavior();

        if before != after {
            logger::log(&format!(
                "🧠 {:?}: {} → {}",
                entity,
                before.as_str(),
                after.as_str()
            ));
            behavior_events.write(BehaviorChanged {
                entity,
                from: before,
                to: after,
            });
        }

        match command {
            AutomationCommand::Stop => movement.stop(),
            AutomationCommand::Move { direction, speed } => movement.move_in(direction, speed),
            AutomationCommand::Attack => {
                movement.stop();
                let (Some(skills), Some((target_entity, target_position))) = (skills, target) else {
                    continue;
                };
                for skill_id in skills.skill_ids() {
                    skill_requests.write(SkillRequested {
                        caster: entity,
                        skill_id: skill_id.to_string(),
                        target: SkillTarget::entity(target_entity, target_position),
                    });
                }
            }
        }
    }
}
