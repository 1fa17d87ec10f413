//! AI module
//!
//! - Automation FSM (IDLE/CHASE/ATTACK/RETREAT/PATROL) for soldiers
//! - Pack steering (separation + smoothing + facing hysteresis) for pursuers
//!
//! Both run in `TickSet::Intent` on pre-tick positions and only write
//! movement commands and skill requests.

use bevy::prelude::*;

pub mod components;
pub mod steering;
pub mod systems;

pub use components::{AIConfig, AIState, Automation, AutomationCommand, Behavior, SpeedMultipliers};
pub use steering::{separation, Steering, SteeringConfig, SteeringTarget};
pub use systems::{AutoTarget, BehaviorChanged};

use crate::{ArenaTick, TickEventAppExt, TickSet};

/// AI Plugin
///
/// Order (after player intent):
/// 1. acquire_nearest_hostile: targets for `AutoTarget` agents
/// 2. run_automation: FSM step → Movement / SkillRequested
/// 3. steer_pursuers: steering → Movement::set_velocity
/// 4. pursuer_attacks: pursuers → SkillRequested at their target
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_tick_event::<BehaviorChanged>();

        app.add_systems(
            ArenaTick,
            (
                systems::acquire_nearest_hostile,
                systems::run_automation,
                systems::steer_pursuers,
                systems::pursuer_attacks,
            )
                .chain()
                .in_set(TickSet::Intent)
                .after(crate::player::apply_player_intent),
        );
    }
}
