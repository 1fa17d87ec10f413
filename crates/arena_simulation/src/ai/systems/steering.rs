//! Steering system for pursuer packs

use bevy::prelude::*;

use crate::ai::components::Automation;
use crate::ai::steering::{Steering, SteeringTarget};
use crate::combat::{Dead, SkillRequested, SkillSet, SkillTarget};
use crate::components::{Movement, Position};
use crate::SimClock;

/// System: steer every living pursuer toward its target
///
/// Peers are the other living steering agents, read from pre-tick positions.
/// Agents driven by `Automation` are left to the FSM.
pub fn steer_pursuers(
    clock: Res<SimClock>,
    mut agents: Query<
        (Entity, &Position, &SteeringTarget, &mut Steering, &mut Movement),
        (Without<Dead>, Without<Automation>),
    >,
    peers: Query<(Entity, &Position), (With<Steering>, Without<Dead>)>,
    targets: Query<&Position, Without<Dead>>,
) {
    let mut peer_positions: Vec<(Entity, Vec2)> = peers
        .iter()
        .map(|(entity, position)| (entity, position.position()))
        .collect();
    peer_positions.sort_by_key(|(entity, _)| entity.index());

    for (entity, position, target, mut steering, mut movement) in agents.iter_mut() {
        let Ok(target_position) = targets.get(target.0) else {
            steering.reset();
            movement.set_velocity(Vec2::ZERO);
            continue;
        };

        let others = peer_positions
            .iter()
            .filter(|(peer, _)| *peer != entity)
            .map(|(_, peer_position)| *peer_position);

        let velocity = steering.steer(
            position.position(),
            target_position.position(),
            others,
            clock.elapsed_ms,
        );
        movement.set_velocity(velocity);
    }
}

/// System: pursuers fire every owned skill at their target each tick
///
/// Cooldown and range gating happen when the request is resolved, against
/// post-movement positions.
pub fn pursuer_attacks(
    agents: Query<(Entity, &SteeringTarget, &SkillSet), (With<Steering>, Without<Automation>, Without<Dead>)>,
    targets: Query<&Position, Without<Dead>>,
    mut skill_requests: EventWriter<SkillRequested>,
) {
    let mut attackers: Vec<_> = agents.iter().collect();
    attackers.sort_by_key(|(entity, ..)| entity.index());

    for (entity, target, skills) in attackers {
        let Ok(target_position) = targets.get(target.0) else {
            continue;
        };
        for skill_id in skills.skill_ids() {
            skill_requests.write(SkillRequested {
                caster: entity,
                skill_id: skill_id.to_string(),
                target: SkillTarget::entity(target.0, target_position.position()),
            });
        }
    }
}
