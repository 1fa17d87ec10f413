//! Effect systems: apply queued effects, tick over-time effects, regeneration
//!
//! All health changes of a tick happen here, after skills were resolved.

use bevy::prelude::*;

use crate::combat::{
    ActiveEffects, DamageDealt, Dead, Effect, EffectQueued, EntityDied, HealApplied, Regeneration, TimedEffect,
    TimedKind, VisualEffectRequested,
};
use crate::components::{DamageInfo, Health, Position};
use crate::TickDelta;

/// Damages `health` and reports the outcome. Dead targets are skipped.
pub fn deal_damage(
    source: Entity,
    target: Entity,
    health: &mut Health,
    info: DamageInfo,
    damage_events: &mut EventWriter<DamageDealt>,
    died_events: &mut EventWriter<EntityDied>,
) {
    if health.is_dead() {
        return;
    }

    let before = health.current();
    let alive = health.take_damage(info);

    damage_events.write(DamageDealt {
        source,
        target,
        amount: before - health.current(),
        target_died: !alive,
    });

    if !alive {
        died_events.write(EntityDied {
            entity: target,
            killer: Some(source),
        });
    }
}

fn restore_health(
    source: Entity,
    target: Entity,
    health: &mut Health,
    amount: f32,
    heal_events: &mut EventWriter<HealApplied>,
) {
    let before = health.current();
    health.heal(amount);
    let gained = health.current() - before;
    if gained > 0.0 {
        heal_events.write(HealApplied {
            source,
            target,
            amount: gained,
        });
    }
}

/// System: apply this tick's queued effects in submission order
///
/// - damage with `radius > 0` hits every living `Health` within the radius of
///   the target position, caster excluded, in entity index order; a falloff
///   scales each hit by its distance from the centre
/// - `duration_ms > 0` starts an over-time effect instead of an instant hit
/// - visual effects are forwarded to the renderer untouched
pub fn apply_queued_effects(
    mut queued: EventReader<EffectQueued>,
    mut targets: Query<(Entity, &Position, &mut Health, &mut ActiveEffects)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut heal_events: EventWriter<HealApplied>,
    mut died_events: EventWriter<EntityDied>,
    mut visual_events: EventWriter<VisualEffectRequested>,
) {
    for queued_effect in queued.read() {
        let source = queued_effect.source;
        let target = &queued_effect.target;

        match &queued_effect.effect {
            Effect::Damage {
                amount,
                damage_type,
                duration_ms,
                radius,
                falloff,
            } => {
                let victims: Vec<(Entity, f32)> = if *radius > 0.0 {
                    let mut in_blast: Vec<(Entity, f32)> = targets
                        .iter()
                        .filter(|(entity, position, health, _)| {
                            *entity != source && !health.is_dead() && position.is_in_range(target.position, *radius)
                        })
                        .map(|(entity, position, ..)| {
                            let scaled = match falloff {
                                Some(falloff) => {
                                    falloff.amount_at(*amount, *radius, position.distance_to(target.position))
                                }
                                None => *amount,
                            };
                            (entity, scaled)
                        })
                        .collect();
                    in_blast.sort_by_key(|(entity, _)| entity.index());
                    in_blast
                } else {
                    target.entity.map(|entity| (entity, *amount)).into_iter().collect()
                };

                for (victim, victim_amount) in victims {
                    if victim_amount <= 0.0 {
                        continue;
                    }
                    let Ok((_, _, mut health, mut active)) = targets.get_mut(victim) else {
                        continue;
                    };
                    if *duration_ms > 0.0 {
                        if !health.is_dead() {
                            active.push(TimedEffect::new(
                                source,
                                TimedKind::Damage(*damage_type),
                                victim_amount,
                                *duration_ms,
                            ));
                        }
                    } else {
                        deal_damage(
                            source,
                            victim,
                            &mut health,
                            DamageInfo::new(victim_amount, *damage_type),
                            &mut damage_events,
                            &mut died_events,
                        );
                    }
                }
            }
            Effect::Heal { amount, duration_ms } => {
                let Some(Ok((entity, _, mut health, mut active))) = target.entity.map(|e| targets.get_mut(e)) else {
                    continue;
                };
                if *duration_ms > 0.0 {
                    if !health.is_dead() {
                        active.push(TimedEffect::new(source, TimedKind::Heal, *amount, *duration_ms));
                    }
                } else {
                    restore_health(source, entity, &mut health, *amount, &mut heal_events);
                }
            }
            Effect::Visual { handle } => {
                visual_events.write(VisualEffectRequested {
                    source,
                    handle: *handle,
                    position: target.position,
                });
            }
        }
    }
}

/// System: advance over-time effects by the tick delta
pub fn tick_active_effects(
    delta: Res<TickDelta>,
    mut query: Query<(Entity, &mut Health, &mut ActiveEffects), Without<Dead>>,
    mut damage_events: EventWriter<DamageDealt>,
    mut heal_events: EventWriter<HealApplied>,
    mut died_events: EventWriter<EntityDied>,
) {
    for (entity, mut health, mut active) in query.iter_mut() {
        if active.is_empty() {
            continue;
        }

        for effect in active.effects.iter_mut() {
            let share = effect.step(delta.ms);
            if share <= 0.0 {
                continue;
            }
            match effect.kind {
                TimedKind::Damage(damage_type) => deal_damage(
                    effect.source,
                    entity,
                    &mut health,
                    DamageInfo::new(share, damage_type),
                    &mut damage_events,
                    &mut died_events,
                ),
                TimedKind::Heal => restore_health(effect.source, entity, &mut health, share, &mut heal_events),
            }
        }

        active.effects.retain(|effect| !effect.is_finished());
    }
}

/// System: passive regeneration
pub fn regenerate_health(
    delta: Res<TickDelta>,
    mut query: Query<(Entity, &mut Health, &mut Regeneration), Without<Dead>>,
    mut heal_events: EventWriter<HealApplied>,
) {
    for (entity, mut health, mut regeneration) in query.iter_mut() {
        let amount = regeneration.tick(delta.ms);
        if amount > 0.0 && !health.is_dead() {
            restore_health(entity, entity, &mut health, amount, &mut heal_events);
        }
    }
}
