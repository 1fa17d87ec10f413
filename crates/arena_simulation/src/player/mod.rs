//! Player control: raw directional/target input → movement and skill requests
//!
//! The input layer (outside the simulation) writes `PlayerIntent` between
//! ticks; the simulation consumes it during `TickSet::Intent`.

use bevy::prelude::*;

use crate::combat::{Dead, SkillRequested, SkillTarget};
use crate::components::{Direction, Movement, Position};
use crate::{ArenaTick, TickSet};

/// Marker: entity driven by player input
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(PlayerIntent)]
pub struct PlayerControlled;

/// Latest input state for a player-controlled entity
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PlayerIntent {
    /// Held direction (`None` = no key held).
    pub direction: Direction,
    /// Selected target entity, if any.
    pub target: Option<Entity>,
    /// Aim point used when there is no live target.
    pub aim: Option<Vec2>,
    /// Skill to fire; consumed by the next tick.
    pub skill: Option<String>,
}

impl PlayerIntent {
    pub fn fire(&mut self, skill_id: impl Into<String>) {
        self.skill = Some(skill_id.into());
    }
}

/// System: map player intent onto Movement and SkillRequested
pub fn apply_player_intent(
    mut players: Query<
        (Entity, &Position, &mut PlayerIntent, &mut Movement),
        (With<PlayerControlled>, Without<Dead>),
    >,
    targets: Query<&Position, Without<Dead>>,
    mut skill_requests: EventWriter<SkillRequested>,
) {
    for (entity, position, mut intent, mut movement) in players.iter_mut() {
        match intent.direction {
            Direction::None => movement.stop(),
            direction => {
                let speed = movement.base_speed();
                movement.move_in(direction, speed);
            }
        }

        let Some(skill_id) = intent.skill.take() else {
            continue;
        };

        let live_target = intent
            .target
            .and_then(|target| targets.get(target).ok().map(|p| (target, p.position())));
        let target = match (live_target, intent.aim) {
            (Some((target, target_position)), _) => SkillTarget::entity(target, target_position),
            (None, Some(aim)) => SkillTarget::point(aim),
            (None, None) => SkillTarget::point(position.position()),
        };

        skill_requests.write(SkillRequested {
            caster: entity,
            skill_id,
            target,
        });
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(ArenaTick, apply_player_intent.in_set(TickSet::Intent));
    }
}
