//! Headless arena run
//!
//! One commando in the middle, a hound pack pouring in from the edges (and
//! replaced as it falls), two riflemen hunting the commando. 1000 ticks at
//! 60 Hz, progress every 100.

use std::sync::Arc;

use arena_simulation::combat::Regeneration;
use arena_simulation::logger::{log_error, log_info};
use arena_simulation::{
    advance, create_headless_app, snapshot, spawn_combatant, AIConfig, Archetype, ArenaTuning, ConfigError, Control,
    DamageType, Effect, PackSpawner, PlayerIntent, SimulationPlugin, SkillDescriptor, TickDriver,
};
use bevy::prelude::*;

const PLAYER_FACTION: u64 = 1;
const HOSTILE_FACTION: u64 = 2;
const PACK_SIZE: usize = 6;
const TICKS: u32 = 1000;
const TICK_MS: f32 = 1000.0 / 60.0;

fn main() {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin {
        drive: TickDriver::Manual,
        tuning: ArenaTuning::default(),
    });
    log_info("🚀 Arena simulation starting (headless)");

    let (player, marked) = match populate(app.world_mut()) {
        Ok(spawned) => spawned,
        Err(error) => {
            log_error(&format!("arena setup failed: {}", error));
            return;
        }
    };

    for tick in 1..=TICKS {
        // Scripted input: strafe east pulsing for two seconds, then hold and shoot
        if let Some(mut intent) = app.world_mut().get_mut::<PlayerIntent>(player) {
            if tick <= 120 {
                intent.direction = arena_simulation::Direction::E;
                intent.fire("pulse");
            } else {
                intent.direction = arena_simulation::Direction::None;
                intent.target = Some(marked);
                intent.fire(if tick % 2 == 0 { "shoot" } else { "pulse" });
            }
        }

        advance(app.world_mut(), TICK_MS);

        if tick % 100 == 0 {
            report(app.world_mut(), tick, player);
        }
    }

    log_info("✅ Arena simulation finished");
}

/// Spawns the arena. Returns the player and the rifleman the player shoots at.
fn populate(world: &mut World) -> Result<(Entity, Entity), ConfigError> {
    let tuning = world.resource::<ArenaTuning>().clone();
    let center = tuning.arena_size / 2.0;

    let player = spawn_combatant(
        world,
        Archetype::Commando
            .loadout(PLAYER_FACTION, center, 25.0, 2.0)
            .controlled_by(Control::Player)
            .with_skill(
                SkillDescriptor::new("pulse", 500.0, 0.0)
                    .with_effect(Effect::proximity(20.0, 5.0, 30.0, 120.0, DamageType::Explosive)),
            )
            .with_regeneration(Regeneration::default()),
    )?;

    let rifleman_ai = Arc::new(AIConfig::new(200.0, 100.0, 40.0).with_patrol(vec![
        Vec2::new(100.0, 100.0),
        Vec2::new(700.0, 100.0),
        Vec2::new(700.0, 500.0),
        Vec2::new(100.0, 500.0),
    ]));
    let spawn_rifleman = |world: &mut World, corner: Vec2| {
        spawn_combatant(
            world,
            Archetype::Rifleman
                .loadout(HOSTILE_FACTION, corner, 8.0, 1.0)
                .controlled_by(Control::Automation {
                    config: rifleman_ai.clone(),
                    target: Some(player),
                    auto_target: true,
                }),
        )
    };
    let marked = spawn_rifleman(world, Vec2::new(100.0, 100.0))?;
    spawn_rifleman(world, Vec2::new(700.0, 500.0))?;

    // The pack is topped up at the edges every tick, starting with the first
    world.insert_resource(PackSpawner::new(
        PACK_SIZE,
        Archetype::Hound
            .loadout(HOSTILE_FACTION, Vec2::ZERO, 5.0, 1.0)
            .controlled_by(Control::Pursuer {
                steering: tuning.pursuer,
                target: player,
            }),
    ));

    Ok((player, marked))
}

fn report(world: &mut World, tick: u32, player: Entity) {
    let alive = world
        .query_filtered::<Entity, (With<arena_simulation::Combatant>, Without<arena_simulation::Dead>)>()
        .iter(world)
        .count();

    match snapshot(world, player) {
        Some(view) => log_info(&format!(
            "tick {:4}: {} alive, player at ({:.1}, {:.1}) {} hp {:.0}%",
            tick,
            alive,
            view.position.x,
            view.position.y,
            view.animation_key,
            view.health_percentage * 100.0
        )),
        None => log_info(&format!("tick {:4}: {} alive, player gone", tick, alive)),
    }
}
