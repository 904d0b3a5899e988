//! Combat resolution engine
//!
//! Advances every active combat entity through its lifecycle and resolves
//! overlaps against the enemy roster. Instant shapes damage each enemy at
//! most once per entity lifetime via their hit tracker; periodic shapes
//! (the whirlwind aura) gate repeats on a per-enemy tick interval.
//!
//! Damage is queued as events and applied through the enemy component
//! directly; enemies that reach zero health are culled in a separate pass
//! so every shape active this frame still gets credit.

use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

use crate::combat::events::{DamageDealt, EnemySlain, PlayerHealed};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::director::Enemy;
use super::entities::{
    ChannelAura, ConeStrike, DashBeam, ExplosionPulse, HitTracker, NovaBurst, PeriodicHits,
    ProjectileBolt, StrikePhases,
};
use super::fsm::PlayerFsm;
use super::skills::{CHAIN_FRACTION, EXPLOSION_RADIUS, FROSTBITE_SLOW, SLOW_SECS};
use super::statuses::{StatusEffect, StatusEffects, StatusKind};
use super::{Health, Player, SessionStats};

/// Collision radius of an enemy body
pub const ENEMY_HIT_RADIUS: f32 = 24.0;
/// Search radius for a ricochet redirect
pub const RICOCHET_RADIUS: f32 = 240.0;
/// Detection radius for homing steer
pub const HOMING_RADIUS: f32 = 300.0;
/// Homing turn rate in radians per second
pub const HOMING_TURN_RATE: f32 = 6.0;
/// Duration of the sunder mark
pub const SUNDER_SECS: f32 = 4.0;
/// Health fraction below which an execute hit doubles damage
pub const EXECUTE_THRESHOLD: f32 = 0.25;
/// Execute damage multiplier
pub const EXECUTE_MULT: f32 = 2.0;
/// Maximum distance-based damage bonus at full travel range
pub const DISTANCE_BONUS_MAX: f32 = 0.5;

/// Cone hit test: inside iff distance from apex <= radius and the angle
/// between the facing and the apex-to-point vector <= half-angle.
pub fn cone_contains(apex: Vec2, facing: Vec2, radius: f32, half_angle: f32, point: Vec2) -> bool {
    let offset = point - apex;
    let distance = offset.length();
    if distance > radius {
        return false;
    }
    if distance < 1e-6 {
        return true;
    }
    let facing = facing.normalize_or_zero();
    if facing == Vec2::ZERO {
        return false;
    }
    let cos = facing.dot(offset / distance).clamp(-1.0, 1.0);
    cos.acos() <= half_angle
}

/// Execute check at the moment damage is applied: below the threshold of
/// max health (checked against current health, not post-hit health) the
/// hit is doubled.
pub fn execute_damage(base: f32, execute: bool, current_health: f32, max_health: f32) -> f32 {
    if execute && current_health < EXECUTE_THRESHOLD * max_health {
        base * EXECUTE_MULT
    } else {
        base
    }
}

/// Distance-based damage multiplier: linear from 1.0 at the muzzle to
/// 1.0 + DISTANCE_BONUS_MAX at max travel range.
pub fn distance_bonus(traveled: f32, max_range: f32) -> f32 {
    if max_range <= 0.0 {
        return 1.0;
    }
    1.0 + DISTANCE_BONUS_MAX * (traveled / max_range).clamp(0.0, 1.0)
}

/// Rotate a velocity toward a desired direction by at most `max_turn`
/// radians, preserving speed. Bounded turning, no instantaneous snapping.
pub fn steer_towards(velocity: Vec2, desired: Vec2, max_turn: f32) -> Vec2 {
    let speed = velocity.length();
    if speed < 1e-6 || desired.length_squared() < 1e-6 {
        return velocity;
    }
    let current = velocity.to_angle();
    let target = desired.to_angle();
    let mut diff = target - current;
    while diff > PI {
        diff -= TAU;
    }
    while diff < -PI {
        diff += TAU;
    }
    let turn = diff.clamp(-max_turn, max_turn);
    Vec2::from_angle(current + turn) * speed
}

/// Distance from a point to a line segment.
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-9 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Advance phase timers on instant shapes and despawn finished ones.
pub fn advance_strike_phases(
    mut commands: Commands,
    time: Res<Time>,
    mut strikes: Query<(Entity, &mut StrikePhases)>,
) {
    let dt = time.delta_secs();
    for (entity, mut phases) in strikes.iter_mut() {
        phases.advance(dt);
        if phases.phase() == super::entities::StrikePhase::Finished {
            commands.entity(entity).despawn();
        }
    }
}

/// Move bolts, apply homing steer, expire bolts past their max range.
pub fn move_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut bolts: Query<
        (Entity, &mut Transform, &mut ProjectileBolt, &HitTracker),
        Without<Enemy>,
    >,
    enemies: Query<(Entity, &Transform, &Enemy), Without<ProjectileBolt>>,
) {
    let dt = time.delta_secs();
    for (entity, mut transform, mut bolt, hits) in bolts.iter_mut() {
        let pos = transform.translation.truncate();

        if bolt.homing {
            // Steer toward the nearest enemy this bolt has not hit yet
            let target = enemies
                .iter()
                .filter(|(enemy, _, e)| e.is_alive() && !hits.already_hit(*enemy))
                .map(|(_, t, _)| t.translation.truncate())
                .filter(|p| p.distance(pos) <= HOMING_RADIUS)
                .min_by(|a, b| {
                    a.distance_squared(pos)
                        .partial_cmp(&b.distance_squared(pos))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some(target) = target {
                bolt.velocity = steer_towards(bolt.velocity, target - pos, HOMING_TURN_RATE * dt);
            }
        }

        let step = bolt.velocity * dt;
        transform.translation += step.extend(0.0);
        bolt.traveled += step.length();

        if bolt.traveled >= bolt.max_range {
            commands.entity(entity).despawn();
        }
    }
}

/// Resolve bolt-enemy overlaps: pierce, ricochet, freeze, explosions.
#[allow(clippy::too_many_arguments)]
pub fn resolve_projectile_hits(
    mut commands: Commands,
    mut bolts: Query<
        (Entity, &Transform, &mut ProjectileBolt, &mut HitTracker),
        Without<Enemy>,
    >,
    mut enemies: Query<
        (Entity, &Transform, &mut Enemy, &mut StatusEffects),
        Without<ProjectileBolt>,
    >,
    mut damage_events: EventWriter<DamageDealt>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (bolt_entity, bolt_transform, mut bolt, mut hits) in bolts.iter_mut() {
        let pos = bolt_transform.translation.truncate();

        // Overlapping enemies nearest-first, so a pierce budget spends on
        // the closest targets
        let mut candidates: Vec<(Entity, f32)> = enemies
            .iter()
            .filter(|(enemy, _, e, _)| e.is_alive() && !hits.already_hit(*enemy))
            .map(|(enemy, t, _, _)| (enemy, t.translation.truncate().distance(pos)))
            .filter(|(_, d)| *d <= ENEMY_HIT_RADIUS)
            .collect();
        candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut destroyed = false;
        for (enemy_entity, _) in candidates {
            // Scoped so the enemy borrow ends before the ricochet search
            let hit = {
                let Ok((_, enemy_transform, mut enemy, mut statuses)) =
                    enemies.get_mut(enemy_entity)
                else {
                    continue;
                };

                let damage = if bolt.distance_bonus {
                    bolt.damage * distance_bonus(bolt.traveled, bolt.max_range)
                } else {
                    bolt.damage
                };
                enemy.take_damage(damage);
                let killed = !enemy.is_alive();

                if bolt.freeze {
                    statuses.apply(StatusEffect {
                        kind: StatusKind::Slow,
                        duration: SLOW_SECS,
                        magnitude: FROSTBITE_SLOW,
                    });
                    combat_log.log(
                        CombatLogEventType::StatusApplied,
                        format!("Enemy #{} slowed", enemy.id),
                    );
                }

                (damage, killed, enemy_transform.translation.truncate())
            };
            let (damage, killed, enemy_pos) = hit;

            hits.mark(enemy_entity);
            bolt.hits_this_pass += 1;

            damage_events.send(DamageDealt {
                source: bolt.owner,
                target: enemy_entity,
                amount: damage,
                skill_name: "Bolt".to_string(),
                killing_blow: killed,
            });

            if bolt.explode_on_hit || (bolt.explode_on_kill && killed) {
                commands.spawn(ExplosionPulse {
                    owner: bolt.owner,
                    pos: enemy_pos,
                    damage: damage * CHAIN_FRACTION,
                    radius: EXPLOSION_RADIUS,
                    exclude: hits.0.clone(),
                    chain: bolt.explode_on_kill,
                });
            }

            // Budget exhausted once hits exceed the pierce allowance
            if bolt.hits_this_pass > bolt.pierce_budget {
                if bolt.ricochet {
                    let next = enemies
                        .iter()
                        .filter(|(e, _, enemy, _)| enemy.is_alive() && !hits.already_hit(*e))
                        .map(|(e, t, _, _)| (e, t.translation.truncate()))
                        .filter(|(_, p)| p.distance(pos) <= RICOCHET_RADIUS)
                        .min_by(|(_, a), (_, b)| {
                            a.distance_squared(pos)
                                .partial_cmp(&b.distance_squared(pos))
                                .unwrap_or(std::cmp::Ordering::Equal)
                        });
                    if let Some((_, target)) = next {
                        let dir = (target - pos).normalize_or_zero();
                        bolt.velocity = dir * bolt.speed;
                        bolt.hits_this_pass = 0;
                    } else {
                        destroyed = true;
                    }
                } else {
                    destroyed = true;
                }
                break;
            }
        }

        if destroyed {
            commands.entity(bolt_entity).despawn();
        }
    }
}

/// Resolve cone strikes: execute, sunder, lifesteal.
pub fn resolve_cone_hits(
    mut cones: Query<(&ConeStrike, &StrikePhases, &mut HitTracker)>,
    mut enemies: Query<(Entity, &Transform, &mut Enemy, &mut StatusEffects)>,
    mut players: Query<&mut Health, With<Player>>,
    mut damage_events: EventWriter<DamageDealt>,
    mut heal_events: EventWriter<PlayerHealed>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (cone, phases, mut hits) in cones.iter_mut() {
        if !phases.is_active() {
            continue;
        }
        for (enemy_entity, transform, mut enemy, mut statuses) in enemies.iter_mut() {
            if !enemy.is_alive() || hits.already_hit(enemy_entity) {
                continue;
            }
            let enemy_pos = transform.translation.truncate();
            if !cone_contains(cone.apex, cone.facing, cone.radius, cone.half_angle, enemy_pos) {
                continue;
            }

            let damage = execute_damage(
                cone.damage,
                cone.execute,
                enemy.current_health,
                enemy.max_health,
            );
            enemy.take_damage(damage);
            hits.mark(enemy_entity);

            damage_events.send(DamageDealt {
                source: cone.owner,
                target: enemy_entity,
                amount: damage,
                skill_name: "Cleave".to_string(),
                killing_blow: !enemy.is_alive(),
            });

            if cone.sunder {
                statuses.apply(StatusEffect {
                    kind: StatusKind::Sunder,
                    duration: SUNDER_SECS,
                    magnitude: 0.0,
                });
                combat_log.log(
                    CombatLogEventType::StatusApplied,
                    format!("Enemy #{} sundered", enemy.id),
                );
            }

            if cone.lifesteal_frac > 0.0 {
                if let Ok(mut health) = players.get_single_mut() {
                    let heal = damage * cone.lifesteal_frac;
                    health.heal(heal);
                    heal_events.send(PlayerHealed {
                        amount: heal,
                        source_name: "Lifesteal".to_string(),
                    });
                }
            }
        }
    }
}

/// Resolve nova bursts: pull, slow field, heal-on-hit.
pub fn resolve_nova_hits(
    mut novas: Query<(&NovaBurst, &StrikePhases, &mut HitTracker)>,
    mut enemies: Query<(Entity, &mut Transform, &mut Enemy, &mut StatusEffects)>,
    mut players: Query<&mut Health, (With<Player>, Without<Enemy>)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut heal_events: EventWriter<PlayerHealed>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (nova, phases, mut hits) in novas.iter_mut() {
        if !phases.is_active() {
            continue;
        }
        let mut healed = 0.0;
        for (enemy_entity, mut transform, mut enemy, mut statuses) in enemies.iter_mut() {
            if !enemy.is_alive() || hits.already_hit(enemy_entity) {
                continue;
            }
            let enemy_pos = transform.translation.truncate();
            if enemy_pos.distance(nova.center) > nova.radius {
                continue;
            }

            enemy.take_damage(nova.damage);
            hits.mark(enemy_entity);

            damage_events.send(DamageDealt {
                source: nova.owner,
                target: enemy_entity,
                amount: nova.damage,
                skill_name: "Nova".to_string(),
                killing_blow: !enemy.is_alive(),
            });

            if nova.pull > 0.0 {
                let to_center = nova.center - enemy_pos;
                let pull = to_center.clamp_length_max(nova.pull);
                transform.translation += pull.extend(0.0);
            }
            if nova.slow > 0.0 {
                statuses.apply(StatusEffect {
                    kind: StatusKind::Slow,
                    duration: SLOW_SECS,
                    magnitude: nova.slow,
                });
                combat_log.log(
                    CombatLogEventType::StatusApplied,
                    format!("Enemy #{} slowed", enemy.id),
                );
            }
            healed += nova.damage * nova.heal_frac;
        }

        if healed > 0.0 {
            if let Ok(mut health) = players.get_single_mut() {
                health.heal(healed);
                heal_events.send(PlayerHealed {
                    amount: healed,
                    source_name: "Leeching Blades".to_string(),
                });
            }
        }
    }
}

/// Resolve dash beams: damage, knockback, brief stun along the path.
pub fn resolve_beam_hits(
    mut beams: Query<(&DashBeam, &StrikePhases, &mut HitTracker)>,
    mut enemies: Query<(Entity, &mut Transform, &mut Enemy, &mut StatusEffects)>,
    mut damage_events: EventWriter<DamageDealt>,
    mut combat_log: ResMut<CombatLog>,
) {
    for (beam, phases, mut hits) in beams.iter_mut() {
        if !phases.is_active() {
            continue;
        }
        let beam_dir = (beam.end - beam.start).normalize_or_zero();
        for (enemy_entity, mut transform, mut enemy, mut statuses) in enemies.iter_mut() {
            if !enemy.is_alive() || hits.already_hit(enemy_entity) {
                continue;
            }
            let enemy_pos = transform.translation.truncate();
            let distance = point_segment_distance(enemy_pos, beam.start, beam.end);
            if distance > beam.width / 2.0 + ENEMY_HIT_RADIUS {
                continue;
            }

            enemy.take_damage(beam.damage);
            hits.mark(enemy_entity);

            damage_events.send(DamageDealt {
                source: beam.owner,
                target: enemy_entity,
                amount: beam.damage,
                skill_name: "Dash".to_string(),
                killing_blow: !enemy.is_alive(),
            });

            if beam.knockback > 0.0 {
                transform.translation += (beam_dir * beam.knockback).extend(0.0);
            }
            if beam.stun_secs > 0.0 {
                statuses.apply(StatusEffect {
                    kind: StatusKind::Stun,
                    duration: beam.stun_secs,
                    magnitude: 1.0,
                });
                combat_log.log(
                    CombatLogEventType::StatusApplied,
                    format!("Enemy #{} stunned", enemy.id),
                );
            }
        }
    }
}

/// Tick the whirlwind aura: each enemy inside is hit at most once per
/// tick interval.
pub fn tick_channel_auras(
    time: Res<Time>,
    mut auras: Query<(&ChannelAura, &Transform, &mut PeriodicHits), Without<Enemy>>,
    mut enemies: Query<(Entity, &Transform, &mut Enemy), Without<ChannelAura>>,
    mut damage_events: EventWriter<DamageDealt>,
) {
    let now = time.elapsed_secs_f64();
    for (aura, transform, mut ticks) in auras.iter_mut() {
        let center = transform.translation.truncate();
        for (enemy_entity, enemy_transform, mut enemy) in enemies.iter_mut() {
            if !enemy.is_alive() {
                continue;
            }
            if enemy_transform.translation.truncate().distance(center) > aura.radius {
                continue;
            }
            if !ticks.should_hit(enemy_entity, now) {
                continue;
            }
            enemy.take_damage(aura.damage_per_tick);
            damage_events.send(DamageDealt {
                source: aura.owner,
                target: enemy_entity,
                amount: aura.damage_per_tick,
                skill_name: "Whirlwind".to_string(),
                killing_blow: !enemy.is_alive(),
            });
        }
    }
}

/// Keep channel auras glued to their owner, and despawn any aura whose
/// owner is no longer channeling. Auras never act on a stale owner state.
pub fn follow_channel_auras(
    mut commands: Commands,
    mut auras: Query<(Entity, &ChannelAura, &mut Transform), Without<Player>>,
    owners: Query<(&Transform, &PlayerFsm), With<Player>>,
) {
    for (entity, aura, mut transform) in auras.iter_mut() {
        match owners.get(aura.owner) {
            Ok((owner_transform, fsm)) if fsm.is_channeling() => {
                transform.translation.x = owner_transform.translation.x;
                transform.translation.y = owner_transform.translation.y;
            }
            _ => {
                commands.entity(entity).despawn();
            }
        }
    }
}

/// Resolve explosion pulses spawned by chain/detonate hits. Each pulse
/// lives exactly one resolution pass; kills by a chaining pulse spawn
/// further pulses at a quarter of the pulse's damage.
pub fn resolve_explosions(
    mut commands: Commands,
    pulses: Query<(Entity, &ExplosionPulse)>,
    mut enemies: Query<(Entity, &Transform, &mut Enemy)>,
    mut damage_events: EventWriter<DamageDealt>,
) {
    for (pulse_entity, pulse) in pulses.iter() {
        for (enemy_entity, transform, mut enemy) in enemies.iter_mut() {
            if !enemy.is_alive() || pulse.exclude.contains(&enemy_entity) {
                continue;
            }
            let enemy_pos = transform.translation.truncate();
            if enemy_pos.distance(pulse.pos) > pulse.radius {
                continue;
            }

            enemy.take_damage(pulse.damage);
            let killed = !enemy.is_alive();
            damage_events.send(DamageDealt {
                source: pulse.owner,
                target: enemy_entity,
                amount: pulse.damage,
                skill_name: "Explosion".to_string(),
                killing_blow: killed,
            });

            if pulse.chain && killed {
                let mut exclude = pulse.exclude.clone();
                exclude.insert(enemy_entity);
                commands.spawn(ExplosionPulse {
                    owner: pulse.owner,
                    pos: enemy_pos,
                    damage: pulse.damage * CHAIN_FRACTION,
                    radius: pulse.radius,
                    exclude,
                    chain: true,
                });
            }
        }
        commands.entity(pulse_entity).despawn();
    }
}

/// Remove dead enemies and announce their deaths.
pub fn cull_dead_enemies(
    mut commands: Commands,
    enemies: Query<(Entity, &Enemy)>,
    mut slain_events: EventWriter<EnemySlain>,
) {
    for (entity, enemy) in enemies.iter() {
        if !enemy.is_alive() {
            slain_events.send(EnemySlain {
                enemy: entity,
                enemy_id: enemy.id,
                xp_reward: enemy.xp_reward,
            });
            commands.entity(entity).despawn();
        }
    }
}

/// Fold damage events into the session stats and the combat log.
pub fn record_damage_events(
    mut damage: EventReader<DamageDealt>,
    mut heals: EventReader<PlayerHealed>,
    mut stats: ResMut<SessionStats>,
    mut combat_log: ResMut<CombatLog>,
) {
    for event in damage.read() {
        stats.damage_dealt += event.amount;
        combat_log.log(
            CombatLogEventType::Damage,
            format!("{} hit for {:.1}", event.skill_name, event.amount),
        );
    }
    for event in heals.read() {
        combat_log.log(
            CombatLogEventType::Healing,
            format!("{} healed {:.1}", event.source_name, event.amount),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cone_hits_centerline_inside_radius() {
        let hit = cone_contains(Vec2::ZERO, Vec2::X, 80.0, 0.35, Vec2::new(79.9, 0.0));
        assert!(hit);
    }

    #[test]
    fn cone_misses_past_half_angle() {
        let half_angle = 0.35_f32;
        let angle = half_angle + 0.01;
        let point = Vec2::from_angle(angle) * 50.0;
        assert!(!cone_contains(Vec2::ZERO, Vec2::X, 80.0, half_angle, point));
    }

    #[test]
    fn cone_misses_past_radius() {
        assert!(!cone_contains(Vec2::ZERO, Vec2::X, 80.0, 0.35, Vec2::new(80.1, 0.0)));
    }

    #[test]
    fn execute_threshold_is_strict() {
        // 24.9% of max health: doubled
        assert_eq!(execute_damage(10.0, true, 24.9, 100.0), 20.0);
        // 25.1% of max health: unmodified
        assert_eq!(execute_damage(10.0, true, 25.1, 100.0), 10.0);
        // Locked passive: unmodified either way
        assert_eq!(execute_damage(10.0, false, 10.0, 100.0), 10.0);
    }

    #[test]
    fn distance_bonus_caps_at_half() {
        assert_eq!(distance_bonus(0.0, 400.0), 1.0);
        assert!((distance_bonus(200.0, 400.0) - 1.25).abs() < 1e-6);
        assert_eq!(distance_bonus(400.0, 400.0), 1.5);
        assert_eq!(distance_bonus(900.0, 400.0), 1.5);
    }

    #[test]
    fn steer_is_bounded_per_step() {
        let velocity = Vec2::new(100.0, 0.0);
        let steered = steer_towards(velocity, Vec2::new(0.0, 1.0), 0.1);
        // Speed preserved, turn clamped to 0.1 radians
        assert!((steered.length() - 100.0).abs() < 1e-3);
        assert!((steered.to_angle() - 0.1).abs() < 1e-4);
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::ZERO;
        let b = Vec2::new(100.0, 0.0);
        assert!((point_segment_distance(Vec2::new(50.0, 30.0), a, b) - 30.0).abs() < 1e-4);
        assert!((point_segment_distance(Vec2::new(-40.0, 0.0), a, b) - 40.0).abs() < 1e-4);
    }
}
