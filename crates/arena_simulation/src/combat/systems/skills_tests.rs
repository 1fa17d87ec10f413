//! Tests for skill systems.

#[cfg(test)]
mod tests {
    use crate::combat::{Effect, SkillDescriptor, SkillRequested, SkillSet, SkillTarget, SkillUsed};
    use crate::components::{DamageType, Health, Movement, Position};
    use crate::{advance, create_headless_app, spawn_combatant, tick_events, Loadout, SimulationPlugin};
    use bevy::prelude::*;

    fn arena() -> App {
        let mut app = create_headless_app(1);
        app.add_plugins(SimulationPlugin::manual());
        app
    }

    fn gunner(at: Vec2) -> Loadout {
        Loadout::new(1, at).with_skill(
            SkillDescriptor::new("shoot", 1000.0, 200.0)
                .requiring_target()
                .with_effect(Effect::damage(10.0, DamageType::Physical)),
        )
    }

    fn request(app: &mut App, caster: Entity, target: Entity) {
        let position = app.world().get::<Position>(target).map(Position::position).unwrap_or_default();
        app.world_mut().send_event(SkillRequested {
            caster,
            skill_id: "shoot".to_string(),
            target: SkillTarget::entity(target, position),
        });
    }

    #[test]
    fn test_range_checked_after_movement() {
        let mut app = arena();
        let caster = spawn_combatant(app.world_mut(), gunner(Vec2::ZERO)).unwrap();
        let target = spawn_combatant(app.world_mut(), Loadout::new(2, Vec2::new(210.0, 0.0))).unwrap();

        // Target closes 60 units during this tick: 210 → 150, inside range 200
        app.world_mut()
            .get_mut::<Movement>(target)
            .unwrap()
            .set_velocity(Vec2::new(-600.0, 0.0));
        request(&mut app, caster, target);
        advance(app.world_mut(), 100.0);

        let used = tick_events::<SkillUsed>(app.world());
        assert_eq!(used.len(), 1);
        assert_eq!(used[0].target.position, Vec2::new(150.0, 0.0));
        assert_eq!(app.world().get::<Health>(target).unwrap().current(), 90.0);
    }

    #[test]
    fn test_out_of_range_request_is_dropped() {
        let mut app = arena();
        let caster = spawn_combatant(app.world_mut(), gunner(Vec2::ZERO)).unwrap();
        let target = spawn_combatant(app.world_mut(), Loadout::new(2, Vec2::new(250.0, 0.0))).unwrap();

        request(&mut app, caster, target);
        advance(app.world_mut(), 16.0);

        assert!(tick_events::<SkillUsed>(app.world()).is_empty());
        assert_eq!(app.world().get::<SkillSet>(caster).unwrap().cooldown("shoot"), Some(0.0));
        assert_eq!(app.world().get::<Health>(target).unwrap().current(), 100.0);
    }

    #[test]
    fn test_cooldown_gates_repeat_requests() {
        let mut app = arena();
        let caster = spawn_combatant(app.world_mut(), gunner(Vec2::ZERO)).unwrap();
        let target = spawn_combatant(app.world_mut(), Loadout::new(2, Vec2::new(50.0, 0.0))).unwrap();

        // Two requests in one tick: only the first fires
        request(&mut app, caster, target);
        request(&mut app, caster, target);
        advance(app.world_mut(), 100.0);
        assert_eq!(tick_events::<SkillUsed>(app.world()).len(), 1);
        assert_eq!(app.world().get::<SkillSet>(caster).unwrap().cooldown("shoot"), Some(1000.0));

        // Cooldowns tick before requests are resolved: 9 × 100ms leaves 100ms
        for _ in 0..9 {
            advance(app.world_mut(), 100.0);
        }
        request(&mut app, caster, target);
        advance(app.world_mut(), 50.0);
        assert!(tick_events::<SkillUsed>(app.world()).is_empty());

        request(&mut app, caster, target);
        advance(app.world_mut(), 50.0);
        assert_eq!(tick_events::<SkillUsed>(app.world()).len(), 1);
        assert_eq!(app.world().get::<Health>(target).unwrap().current(), 80.0);
    }

    #[test]
    fn test_despawned_target_rejects_targeted_skill() {
        let mut app = arena();
        let caster = spawn_combatant(app.world_mut(), gunner(Vec2::ZERO)).unwrap();
        let target = spawn_combatant(app.world_mut(), Loadout::new(2, Vec2::new(50.0, 0.0))).unwrap();

        request(&mut app, caster, target);
        app.world_mut().despawn(target);
        advance(app.world_mut(), 16.0);

        assert!(tick_events::<SkillUsed>(app.world()).is_empty());
    }
}
