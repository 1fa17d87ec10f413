//! Arena simulation core
//!
//! Headless ECS simulation on Bevy 0.16 of a top-down arena: combatants move,
//! pick behaviors, steer around each other and trade skills under cooldown and
//! range rules. Rendering, input capture and assets live outside; they talk
//! to the core through `PlayerIntent`, events and `actor::snapshot`.
//!
//! Tick model:
//! - `ArenaTick` is one uniform update of every entity with one shared delta
//! - `advance(world, delta_ms)` runs exactly one tick (tests, headless runs)
//! - `SimulationPlugin` can also drive `ArenaTick` from `FixedUpdate`
//!
//! Fixed order inside a tick (`TickSet`):
//! Intent → Movement → Skills → Effects → Lifecycle → Presentation → Flush

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod actor;
pub mod ai;
pub mod combat;
pub mod components;
pub mod error;
pub mod logger;
pub mod physics;
pub mod player;
pub mod tuning;
pub mod visual;

pub use actor::{snapshot, spawn_combatant, Archetype, CombatantSnapshot, Control, Loadout, PackMember, PackSpawner};
pub use ai::{AIConfig, AIPlugin, AIState, Automation, Behavior, Steering, SteeringConfig, SteeringTarget};
pub use combat::{
    CombatPlugin, DamageDealt, Dead, Effect, EntityDied, SkillDescriptor, SkillRequested, SkillSet, SkillTarget,
    SkillUsed,
};
pub use components::*;
pub use error::ConfigError;
pub use logger::init_logger;
pub use player::{PlayerControlled, PlayerIntent, PlayerPlugin};
pub use tuning::ArenaTuning;
pub use visual::{AnimationKind, Presentation, PresentationPlugin};

/// One simulation tick.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArenaTick;

/// Phases of a tick, chained in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Player input, automation, steering (pre-tick positions).
    Intent,
    /// Kinematic integration.
    Movement,
    /// Cooldowns, then skill requests against post-movement positions.
    Skills,
    /// Health changes.
    Effects,
    /// Death marking, corpse despawn, pack replenishment.
    Lifecycle,
    /// Facing and animation keys.
    Presentation,
    /// Event buffer rotation.
    Flush,
}

/// Delta of the tick being run, milliseconds (finite, ≥ 0).
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct TickDelta {
    pub ms: f32,
}

impl TickDelta {
    pub fn secs(&self) -> f32 {
        self.ms / 1000.0
    }
}

/// Simulated time. Advanced only by `advance`, never by a wall clock.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub elapsed_ms: f64,
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickDriver {
    /// One `ArenaTick` per `FixedUpdate` step.
    #[default]
    FixedUpdate,
    /// Ticks only run through explicit `advance` calls.
    Manual,
}

/// Main simulation plugin (wires every subsystem into `ArenaTick`)
#[derive(Default)]
pub struct SimulationPlugin {
    pub drive: TickDriver,
    pub tuning: ArenaTuning,
}

impl SimulationPlugin {
    pub fn manual() -> Self {
        Self {
            drive: TickDriver::Manual,
            ..Default::default()
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Single-threaded: system order inside a set never depends on thread timing.
        app.edit_schedule(ArenaTick, |schedule| {
            schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        })
        .configure_sets(
            ArenaTick,
            (
                TickSet::Intent,
                TickSet::Movement,
                TickSet::Skills,
                TickSet::Effects,
                TickSet::Lifecycle,
                TickSet::Presentation,
                TickSet::Flush,
            )
                .chain(),
        )
        .insert_resource(self.tuning.clone())
        .init_resource::<TickDelta>()
        .init_resource::<SimClock>()
        .add_systems(ArenaTick, physics::integrate_movement.in_set(TickSet::Movement))
        .add_plugins((PlayerPlugin, AIPlugin, CombatPlugin, PresentationPlugin))
        .add_systems(
            ArenaTick,
            actor::replenish_pack
                .run_if(resource_exists::<actor::PackSpawner>)
                .in_set(TickSet::Lifecycle)
                .after(combat::systems::despawn_after_timeout),
        );

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        if self.drive == TickDriver::FixedUpdate {
            app.insert_resource(Time::<Fixed>::from_hz(self.tuning.tick_hz))
                .add_systems(FixedUpdate, run_arena_tick);
        }
    }
}

/// Runs exactly one tick of `delta_ms` simulated milliseconds.
///
/// Negative and non-finite deltas are clamped to 0 (the tick still runs, time
/// does not move).
pub fn advance(world: &mut World, delta_ms: f32) {
    let ms = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };

    world.insert_resource(TickDelta { ms });
    {
        let mut clock = world.get_resource_or_insert_with(SimClock::default);
        clock.elapsed_ms += ms as f64;
        clock.ticks += 1;
    }

    if world.try_run_schedule(ArenaTick).is_err() {
        logger::log_error("advance: ArenaTick is not registered (SimulationPlugin missing?)");
    }
}

fn run_arena_tick(world: &mut World) {
    let delta_ms = world.resource::<Time<Fixed>>().timestep().as_secs_f32() * 1000.0;
    advance(world, delta_ms);
}

/// Rotates a tick-scoped event buffer at the end of the tick.
///
/// Events of the last tick stay readable (`tick_events`) until the next flush.
fn flush_events<T: Event>(mut events: ResMut<Events<T>>) {
    events.update();
}

pub trait TickEventAppExt {
    /// Registers `T` as an event rotated once per `ArenaTick`.
    fn add_tick_event<T: Event>(&mut self) -> &mut Self;
}

impl TickEventAppExt for App {
    fn add_tick_event<T: Event>(&mut self) -> &mut Self {
        self.init_resource::<Events<T>>()
            .add_systems(ArenaTick, flush_events::<T>.in_set(TickSet::Flush))
    }
}

/// Events of type `T` emitted by the last completed tick.
pub fn tick_events<T: Event + Clone>(world: &World) -> Vec<T> {
    let Some(events) = world.get_resource::<Events<T>>() else {
        return Vec::new();
    };
    let mut cursor = events.get_cursor();
    cursor.read(events).cloned().collect()
}

/// Deterministic RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Minimal headless Bevy App (no window, no renderer)
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// World snapshot for determinism checks
///
/// Entities sorted by index, components rendered through `Debug`.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
