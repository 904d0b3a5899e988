//! Integration tests for combat resolution
//!
//! These tests verify that:
//! - Cone containment and execute thresholds behave exactly at their
//!   boundaries
//! - A cleave hit applies damage, sunder and lifesteal in one pass and
//!   never hits the same enemy twice
//! - A piercing bolt spends its budget on the nearest enemies and is
//!   destroyed once the budget is exhausted
//! - A ricochet bolt redirects to the nearest unhit enemy with a fresh
//!   pass counter instead of dying
//! - Detonating hits spawn an explosion pulse at a quarter of the hit's
//!   damage that skips the enemies the bolt already hit
//! - Homing steer is bounded per step

use bevy::prelude::*;

use deepspire::combat::events::{DamageDealt, EnemySlain, PlayerHealed};
use deepspire::combat::log::{CombatLog, CombatLogEventType};
use deepspire::states::session::director::Enemy;
use deepspire::states::session::entities::{
    ConeStrike, ExplosionPulse, HitTracker, ProjectileBolt, StrikePhases,
};
use deepspire::states::session::resolution::{
    cone_contains, distance_bonus, execute_damage, point_segment_distance,
    resolve_cone_hits, resolve_explosions, resolve_projectile_hits, steer_towards,
    ENEMY_HIT_RADIUS,
};
use deepspire::states::session::statuses::StatusEffects;
use deepspire::states::session::{Health, Player};

// =============================================================================
// Geometry and damage math
// =============================================================================

#[test]
fn test_cone_containment_boundaries() {
    let radius = 80.0;
    let half_angle = 0.4_f32;

    // On the center line just inside the radius: hit
    assert!(cone_contains(
        Vec2::ZERO,
        Vec2::X,
        radius,
        half_angle,
        Vec2::new(radius - 0.01, 0.0)
    ));
    // Same distance, just past the half-angle: miss
    let outside = Vec2::from_angle(half_angle + 0.01) * (radius - 0.01);
    assert!(!cone_contains(Vec2::ZERO, Vec2::X, radius, half_angle, outside));
    // Past the radius on the center line: miss
    assert!(!cone_contains(
        Vec2::ZERO,
        Vec2::X,
        radius,
        half_angle,
        Vec2::new(radius + 0.01, 0.0)
    ));
}

#[test]
fn test_execute_doubles_below_quarter_health() {
    // 24.9% of max: doubled
    assert_eq!(execute_damage(40.0, true, 24.9, 100.0), 80.0);
    // 25.1% of max: unmodified
    assert_eq!(execute_damage(40.0, true, 25.1, 100.0), 40.0);
    // Exactly 25%: unmodified (strictly below threshold only)
    assert_eq!(execute_damage(40.0, true, 25.0, 100.0), 40.0);
}

#[test]
fn test_distance_bonus_is_linear_and_capped() {
    assert_eq!(distance_bonus(0.0, 500.0), 1.0);
    assert!((distance_bonus(250.0, 500.0) - 1.25).abs() < 1e-6);
    assert_eq!(distance_bonus(500.0, 500.0), 1.5);
    assert_eq!(distance_bonus(1200.0, 500.0), 1.5);
}

#[test]
fn test_steer_never_exceeds_turn_budget() {
    let velocity = Vec2::new(0.0, 200.0);
    // Target is 90 degrees away; budget is 0.25 radians
    let steered = steer_towards(velocity, Vec2::X, 0.25);
    let expected = std::f32::consts::FRAC_PI_2 - 0.25;
    assert!((steered.to_angle() - expected).abs() < 1e-4);
    assert!((steered.length() - 200.0).abs() < 1e-3);
}

#[test]
fn test_segment_distance_for_beam_hits() {
    let a = Vec2::new(0.0, 0.0);
    let b = Vec2::new(200.0, 0.0);
    assert!((point_segment_distance(Vec2::new(100.0, 25.0), a, b) - 25.0).abs() < 1e-4);
    // Beyond the end: measured to the endpoint
    assert!((point_segment_distance(Vec2::new(260.0, 0.0), a, b) - 60.0).abs() < 1e-4);
}

// =============================================================================
// App-driven resolution scenarios
// =============================================================================

fn spawn_enemy(app: &mut App, pos: Vec2, health: f32) -> Entity {
    app.world_mut()
        .spawn((
            Enemy {
                id: 1,
                max_health: health,
                current_health: health,
                speed: 0.0,
                contact_damage: 0.0,
                xp_reward: 25,
                attack_timer: 0.0,
            },
            StatusEffects::default(),
            Transform::from_translation(pos.extend(0.0)),
        ))
        .id()
}

fn enemy_health(app: &mut App, entity: Entity) -> f32 {
    app.world().get::<Enemy>(entity).unwrap().current_health
}

#[test]
fn test_cleave_applies_damage_sunder_and_lifesteal_once() {
    let mut app = App::new();
    app.init_resource::<CombatLog>()
        .add_event::<DamageDealt>()
        .add_event::<PlayerHealed>()
        .add_event::<EnemySlain>()
        .add_systems(Update, resolve_cone_hits);

    let player = app
        .world_mut()
        .spawn((Player, Health { current: 200.0, max: 300.0 }))
        .id();

    // Enemy at cone-center distance 50, within range 80
    let enemy = spawn_enemy(&mut app, Vec2::new(50.0, 0.0), 100.0);

    let damage = 22.0;
    app.world_mut().spawn((
        ConeStrike {
            owner: player,
            damage,
            radius: 80.0,
            half_angle: 0.35,
            facing: Vec2::X,
            apex: Vec2::ZERO,
            lifesteal_frac: 0.05,
            sunder: true,
            execute: false,
        },
        StrikePhases::new(0.0, 1.0, 0.0),
        HitTracker::default(),
    ));

    app.update();

    assert_eq!(enemy_health(&mut app, enemy), 100.0 - damage);
    assert!(app
        .world()
        .get::<StatusEffects>(enemy)
        .unwrap()
        .is_sundered());
    let player_health = app.world().get::<Health>(player).unwrap();
    assert!((player_health.current - (200.0 + damage * 0.05)).abs() < 1e-4);
    // The sunder application lands in the combat log
    let log = app.world().resource::<CombatLog>();
    assert_eq!(log.filter_by_type(CombatLogEventType::StatusApplied).len(), 1);

    // Second pass over the same entity: the hit tracker blocks a repeat
    app.update();
    assert_eq!(enemy_health(&mut app, enemy), 100.0 - damage);
}

#[test]
fn test_execute_cleave_doubles_on_low_health_enemy() {
    let mut app = App::new();
    app.init_resource::<CombatLog>()
        .add_event::<DamageDealt>()
        .add_event::<PlayerHealed>()
        .add_systems(Update, resolve_cone_hits);

    let player = app
        .world_mut()
        .spawn((Player, Health { current: 300.0, max: 300.0 }))
        .id();
    // 20 of 100 health: below the 25% execute threshold
    let enemy = spawn_enemy(&mut app, Vec2::new(40.0, 0.0), 100.0);
    app.world_mut().get_mut::<Enemy>(enemy).unwrap().current_health = 20.0;

    app.world_mut().spawn((
        ConeStrike {
            owner: player,
            damage: 8.0,
            radius: 80.0,
            half_angle: 0.35,
            facing: Vec2::X,
            apex: Vec2::ZERO,
            lifesteal_frac: 0.0,
            sunder: false,
            execute: true,
        },
        StrikePhases::new(0.0, 1.0, 0.0),
        HitTracker::default(),
    ));

    app.update();
    assert_eq!(enemy_health(&mut app, enemy), 20.0 - 16.0);
}

fn spawn_bolt(app: &mut App, owner: Entity, pierce_budget: u32) -> Entity {
    app.world_mut()
        .spawn((
            ProjectileBolt {
                owner,
                damage: 30.0,
                velocity: Vec2::ZERO,
                speed: 0.0,
                pierce_budget,
                hits_this_pass: 0,
                ricochet: false,
                homing: false,
                freeze: false,
                explode_on_kill: false,
                explode_on_hit: false,
                distance_bonus: false,
                origin: Vec2::ZERO,
                traveled: 0.0,
                max_range: 500.0,
            },
            HitTracker::default(),
            Transform::from_translation(Vec3::ZERO),
        ))
        .id()
}

#[test]
fn test_pierce_budget_hits_two_then_destroys_bolt() {
    let mut app = App::new();
    app.init_resource::<CombatLog>()
        .add_event::<DamageDealt>()
        .add_systems(Update, resolve_projectile_hits);

    let player = app.world_mut().spawn(Player).id();

    // Three colinear enemies, all within the hit radius of the bolt
    let near = spawn_enemy(&mut app, Vec2::new(5.0, 0.0), 100.0);
    let mid = spawn_enemy(&mut app, Vec2::new(10.0, 0.0), 100.0);
    let far = spawn_enemy(&mut app, Vec2::new(ENEMY_HIT_RADIUS - 1.0, 0.0), 100.0);

    // Pierce budget 1: two hits allowed
    let bolt = spawn_bolt(&mut app, player, 1);

    app.update();

    assert_eq!(enemy_health(&mut app, near), 70.0);
    assert_eq!(enemy_health(&mut app, mid), 70.0);
    // Budget exhausted before the third enemy
    assert_eq!(enemy_health(&mut app, far), 100.0);
    // Bolt destroyed after the second hit
    assert!(app.world().get::<ProjectileBolt>(bolt).is_none());
}

#[test]
fn test_unpierced_bolt_stops_at_first_enemy() {
    let mut app = App::new();
    app.init_resource::<CombatLog>()
        .add_event::<DamageDealt>()
        .add_systems(Update, resolve_projectile_hits);

    let player = app.world_mut().spawn(Player).id();
    let near = spawn_enemy(&mut app, Vec2::new(5.0, 0.0), 100.0);
    let mid = spawn_enemy(&mut app, Vec2::new(10.0, 0.0), 100.0);

    let bolt = spawn_bolt(&mut app, player, 0);
    app.update();

    assert_eq!(enemy_health(&mut app, near), 70.0);
    assert_eq!(enemy_health(&mut app, mid), 100.0);
    assert!(app.world().get::<ProjectileBolt>(bolt).is_none());
}

#[test]
fn test_ricochet_redirects_spent_bolt_and_resets_pass_counter() {
    let mut app = App::new();
    app.init_resource::<CombatLog>()
        .add_event::<DamageDealt>()
        .add_systems(Update, resolve_projectile_hits);

    let player = app.world_mut().spawn(Player).id();
    // First enemy inside the hit radius; the next well outside it but
    // within ricochet range, straight up from the bolt
    let first = spawn_enemy(&mut app, Vec2::new(5.0, 0.0), 100.0);
    let next = spawn_enemy(&mut app, Vec2::new(0.0, 100.0), 100.0);

    let speed = 300.0;
    let bolt = app
        .world_mut()
        .spawn((
            ProjectileBolt {
                owner: player,
                damage: 30.0,
                velocity: Vec2::X * speed,
                speed,
                pierce_budget: 0,
                hits_this_pass: 0,
                ricochet: true,
                homing: false,
                freeze: false,
                explode_on_kill: false,
                explode_on_hit: false,
                distance_bonus: false,
                origin: Vec2::ZERO,
                traveled: 0.0,
                max_range: 500.0,
            },
            HitTracker::default(),
            Transform::from_translation(Vec3::ZERO),
        ))
        .id();

    app.update();

    // First enemy took the hit; the next is untouched this frame
    assert_eq!(enemy_health(&mut app, first), 70.0);
    assert_eq!(enemy_health(&mut app, next), 100.0);

    // The spent bolt survives, turned toward the next enemy at full
    // speed with a fresh pass counter
    let redirected = app
        .world()
        .get::<ProjectileBolt>(bolt)
        .expect("bolt survives the ricochet");
    assert_eq!(redirected.hits_this_pass, 0);
    assert!((redirected.velocity.length() - speed).abs() < 1e-3);
    assert!(redirected.velocity.normalize().y > 0.99);
}

#[test]
fn test_ricochet_with_no_target_in_range_destroys_bolt() {
    let mut app = App::new();
    app.init_resource::<CombatLog>()
        .add_event::<DamageDealt>()
        .add_systems(Update, resolve_projectile_hits);

    let player = app.world_mut().spawn(Player).id();
    let first = spawn_enemy(&mut app, Vec2::new(5.0, 0.0), 100.0);
    // The only other enemy is beyond the 240-unit ricochet search radius
    spawn_enemy(&mut app, Vec2::new(0.0, 300.0), 100.0);

    let bolt = app
        .world_mut()
        .spawn((
            ProjectileBolt {
                owner: player,
                damage: 30.0,
                velocity: Vec2::X * 300.0,
                speed: 300.0,
                pierce_budget: 0,
                hits_this_pass: 0,
                ricochet: true,
                homing: false,
                freeze: false,
                explode_on_kill: false,
                explode_on_hit: false,
                distance_bonus: false,
                origin: Vec2::ZERO,
                traveled: 0.0,
                max_range: 500.0,
            },
            HitTracker::default(),
            Transform::from_translation(Vec3::ZERO),
        ))
        .id();

    app.update();

    assert_eq!(enemy_health(&mut app, first), 70.0);
    assert!(app.world().get::<ProjectileBolt>(bolt).is_none());
}

#[test]
fn test_detonating_hit_spawns_pulse_that_skips_parent_hits() {
    let mut app = App::new();
    app.init_resource::<CombatLog>()
        .add_event::<DamageDealt>()
        .add_systems(
            Update,
            (resolve_projectile_hits, resolve_explosions).chain(),
        );

    let player = app.world_mut().spawn(Player).id();
    let struck = spawn_enemy(&mut app, Vec2::new(5.0, 0.0), 100.0);
    // Bystander outside the bolt's hit radius but inside the 70-unit
    // explosion radius around the struck enemy
    let bystander = spawn_enemy(&mut app, Vec2::new(5.0, 40.0), 100.0);

    let damage = 30.0;
    app.world_mut().spawn((
        ProjectileBolt {
            owner: player,
            damage,
            velocity: Vec2::ZERO,
            speed: 0.0,
            pierce_budget: 0,
            hits_this_pass: 0,
            ricochet: false,
            homing: false,
            freeze: false,
            explode_on_kill: false,
            explode_on_hit: true,
            distance_bonus: false,
            origin: Vec2::ZERO,
            traveled: 0.0,
            max_range: 500.0,
        },
        HitTracker::default(),
        Transform::from_translation(Vec3::ZERO),
    ));

    app.update();

    // Direct hit on the struck enemy, then a pulse at a quarter of the
    // hit's damage on the bystander; the struck enemy is excluded from
    // its own pulse
    assert_eq!(enemy_health(&mut app, struck), 100.0 - damage);
    assert_eq!(enemy_health(&mut app, bystander), 100.0 - damage * 0.25);

    // Each pulse lives exactly one resolution pass
    let mut pulses = app.world_mut().query::<&ExplosionPulse>();
    assert_eq!(pulses.iter(app.world()).count(), 0);
}
