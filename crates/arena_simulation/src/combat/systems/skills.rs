//! Skill systems: cooldown countdown, request resolution

use bevy::prelude::*;

use crate::combat::{Dead, EffectQueued, SkillRequested, SkillSet, SkillTarget, SkillUsed};
use crate::components::Position;
use crate::TickDelta;

/// System: count every skill cooldown down by the tick delta
pub fn tick_skill_cooldowns(delta: Res<TickDelta>, mut query: Query<&mut SkillSet>) {
    for mut skills in query.iter_mut() {
        skills.update_skills(delta.ms);
    }
}

/// Re-reads the target entity's position after movement.
///
/// A target that died or despawned degrades to a point target at the
/// requested position (`requires_target` skills then reject it).
pub fn refresh_target(requested: &SkillTarget, targets: &Query<&Position, Without<Dead>>) -> SkillTarget {
    match requested.entity {
        Some(entity) => match targets.get(entity) {
            Ok(position) => SkillTarget::entity(entity, position.position()),
            Err(_) => SkillTarget::point(requested.position),
        },
        None => *requested,
    }
}

/// System: evaluate skill requests against post-movement positions
///
/// Requests are handled in submission order. A fired skill queues each of its
/// effects as `EffectQueued`; rejections (cooldown, range, unknown id) are
/// ordinary and leave no trace.
pub fn resolve_skill_requests(
    mut requests: EventReader<SkillRequested>,
    mut casters: Query<(&Position, &mut SkillSet), Without<Dead>>,
    targets: Query<&Position, Without<Dead>>,
    mut used_events: EventWriter<SkillUsed>,
    mut queued_events: EventWriter<EffectQueued>,
) {
    for request in requests.read() {
        let Ok((caster_position, mut skills)) = casters.get_mut(request.caster) else {
            continue;
        };

        let target = refresh_target(&request.target, &targets);
        let Ok(cast) = skills.use_skill(&request.skill_id, caster_position.position(), &target) else {
            continue;
        };

        used_events.write(SkillUsed {
            caster: request.caster,
            skill_id: cast.skill_id,
            target: cast.target,
        });
        for effect in cast.effects {
            queued_events.write(EffectQueued {
                source: request.caster,
                target: cast.target,
                effect,
            });
        }
    }
}
