//! Kinematic integration
//!
//! No physics engine: arena actors are points integrated by `Movement`.
//! Runs in `TickSet::Movement`, after every intent was turned into a
//! movement command and before skills read positions.

use bevy::prelude::*;

use crate::combat::Dead;
use crate::components::{Movement, Position};
use crate::TickDelta;

/// System: advance every living entity's position by its movement
pub fn integrate_movement(delta: Res<TickDelta>, mut query: Query<(&mut Movement, &mut Position), Without<Dead>>) {
    for (mut movement, mut position) in query.iter_mut() {
        movement.update(delta.ms, &mut position);
    }
}
