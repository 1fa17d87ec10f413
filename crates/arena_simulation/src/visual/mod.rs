//! Presentation output for the renderer: facing + animation key
//!
//! The renderer selects sprites by `"<animation>_<octant suffix>"`, e.g.
//! `running_ne` or `standing_s`. The simulation only produces the key.

use bevy::prelude::*;

use crate::ai::Steering;
use crate::combat::{Dead, SkillUsed};
use crate::components::{Direction, Movement, Position};
use crate::{ArenaTick, TickSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum AnimationKind {
    #[default]
    Standing,
    Running,
    Shooting,
    Death,
}

impl AnimationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationKind::Standing => "standing",
            AnimationKind::Running => "running",
            AnimationKind::Shooting => "shooting",
            AnimationKind::Death => "death",
        }
    }
}

pub fn animation_key(kind: AnimationKind, facing: Direction) -> String {
    format!("{}_{}", kind.as_str(), facing.suffix())
}

/// What the renderer shows for an entity this tick.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Presentation {
    pub kind: AnimationKind,
    pub facing: Direction,
    pub key: String,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            kind: AnimationKind::Standing,
            facing: Direction::None,
            key: animation_key(AnimationKind::Standing, Direction::None),
        }
    }
}

impl Presentation {
    fn set(&mut self, kind: AnimationKind, facing: Direction) {
        if self.kind != kind || self.facing != facing {
            self.kind = kind;
            self.facing = facing;
            self.key = animation_key(kind, facing);
        }
    }
}

/// System: refresh animation kind and facing
///
/// Facing priority: aim at the target of a skill fired this tick, then the
/// steering facing (hysteresis-stable), then the movement direction, then the
/// previous facing.
pub fn update_presentation(
    mut used_events: EventReader<SkillUsed>,
    mut query: Query<(
        Entity,
        &Position,
        &mut Presentation,
        Option<&Movement>,
        Option<&Steering>,
        Has<Dead>,
    )>,
) {
    let shots: Vec<(Entity, Vec2)> = used_events
        .read()
        .map(|used| (used.caster, used.target.position))
        .collect();

    for (entity, position, mut presentation, movement, steering, dead) in query.iter_mut() {
        let aim = shots
            .iter()
            .rev()
            .find(|(caster, _)| *caster == entity)
            .map(|(_, target)| Direction::from_vector(*target - position.position()));

        let moving = movement.is_some_and(Movement::is_moving) || steering.is_some_and(Steering::is_moving);

        let kind = if dead {
            AnimationKind::Death
        } else if aim.is_some() {
            AnimationKind::Shooting
        } else if moving {
            AnimationKind::Running
        } else {
            AnimationKind::Standing
        };

        let facing = [
            aim.unwrap_or_default(),
            steering.map(Steering::facing).unwrap_or_default(),
            movement.map(Movement::direction).unwrap_or_default(),
            presentation.facing,
        ]
        .into_iter()
        .find(|direction| *direction != Direction::None)
        .unwrap_or_default();

        presentation.set(kind, facing);
    }
}

pub struct PresentationPlugin;

impl Plugin for PresentationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(ArenaTick, update_presentation.in_set(TickSet::Presentation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_key_format() {
        assert_eq!(animation_key(AnimationKind::Running, Direction::NE), "running_ne");
        assert_eq!(animation_key(AnimationKind::Standing, Direction::None), "standing_s");
        assert_eq!(Presentation::default().key, "standing_s");
    }

    #[test]
    fn test_set_rebuilds_key() {
        let mut presentation = Presentation::default();
        presentation.set(AnimationKind::Shooting, Direction::W);
        assert_eq!(presentation.key, "shooting_w");
    }
}
