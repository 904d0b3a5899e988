//! Enemy roster and spawn director
//!
//! Spawns enemies on a ring around the player at a fixed interval, up to a
//! population cap. Enemies chase the player and deal contact damage on a
//! per-enemy attack timer. The director is deliberately simple; the combat
//! core only reads positions and health and applies damage.

use bevy::prelude::*;

use crate::combat::log::{CombatLog, CombatLogEventType};

use super::statuses::StatusEffects;
use super::{GameRng, Health, Invulnerable, Player, SessionStats};

/// Seconds between spawn attempts
pub const SPAWN_INTERVAL_SECS: f32 = 2.0;
/// Maximum live enemies
pub const MAX_ENEMIES: usize = 12;
/// Spawn ring distance from the player
const SPAWN_RING_MIN: f32 = 400.0;
const SPAWN_RING_MAX: f32 = 600.0;
/// Base enemy tuning
const ENEMY_HEALTH: f32 = 60.0;
const ENEMY_SPEED: f32 = 90.0;
const ENEMY_CONTACT_DAMAGE: f32 = 8.0;
const ENEMY_XP_REWARD: u32 = 25;
/// Seconds between contact attacks from the same enemy
const CONTACT_ATTACK_INTERVAL: f32 = 1.0;
/// Distance at which an enemy can land a contact attack
const CONTACT_RANGE: f32 = 30.0;

/// A live enemy. Health lives here, not in the player's Health component.
#[derive(Component, Debug)]
pub struct Enemy {
    /// Stable identifier issued at spawn, used in logs and kill events
    pub id: u32,
    pub max_health: f32,
    pub current_health: f32,
    pub speed: f32,
    pub contact_damage: f32,
    pub xp_reward: u32,
    pub attack_timer: f32,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current_health = (self.current_health - amount).max(0.0);
    }
}

/// Spawn pacing state.
#[derive(Resource, Debug)]
pub struct SpawnDirector {
    pub timer: f32,
    pub next_enemy_id: u32,
    /// Spawning can be frozen for scripted sessions
    pub enabled: bool,
}

impl Default for SpawnDirector {
    fn default() -> Self {
        Self {
            timer: 0.0,
            next_enemy_id: 1,
            enabled: true,
        }
    }
}

/// Spawn enemies on a ring around the player at the configured interval.
pub fn spawn_enemies(
    mut commands: Commands,
    time: Res<Time>,
    mut director: ResMut<SpawnDirector>,
    mut rng: ResMut<GameRng>,
    mut combat_log: ResMut<CombatLog>,
    players: Query<&Transform, With<Player>>,
    enemies: Query<(), With<Enemy>>,
) {
    if !director.enabled {
        return;
    }
    director.timer += time.delta_secs();
    if director.timer < SPAWN_INTERVAL_SECS {
        return;
    }
    director.timer = 0.0;

    if enemies.iter().count() >= MAX_ENEMIES {
        return;
    }
    let Ok(player_transform) = players.get_single() else {
        return;
    };

    let angle = rng.random_f32() * std::f32::consts::TAU;
    let distance = rng.random_range(SPAWN_RING_MIN, SPAWN_RING_MAX);
    let offset = Vec2::from_angle(angle) * distance;
    let pos = player_transform.translation.truncate() + offset;

    let id = director.next_enemy_id;
    director.next_enemy_id += 1;

    commands.spawn((
        Enemy {
            id,
            max_health: ENEMY_HEALTH,
            current_health: ENEMY_HEALTH,
            speed: ENEMY_SPEED,
            contact_damage: ENEMY_CONTACT_DAMAGE,
            xp_reward: ENEMY_XP_REWARD,
            attack_timer: 0.0,
        },
        StatusEffects::default(),
        Transform::from_translation(pos.extend(0.0)),
    ));
    combat_log.log(
        CombatLogEventType::SessionEvent,
        format!("Enemy #{} spawned", id),
    );
}

/// Move live enemies toward the player, scaled by slow/stun statuses.
pub fn chase_player(
    time: Res<Time>,
    players: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&Enemy, &StatusEffects, &mut Transform), Without<Player>>,
) {
    let Ok(player_transform) = players.get_single() else {
        return;
    };
    let target = player_transform.translation.truncate();
    let dt = time.delta_secs();

    for (enemy, statuses, mut transform) in enemies.iter_mut() {
        if !enemy.is_alive() {
            continue;
        }
        let pos = transform.translation.truncate();
        let to_player = target - pos;
        if to_player.length() < CONTACT_RANGE * 0.5 {
            continue;
        }
        let step = to_player.normalize_or_zero()
            * enemy.speed
            * statuses.movement_multiplier()
            * dt;
        transform.translation += step.extend(0.0);
    }
}

/// Enemies in contact range attack on their own timers. Invulnerable
/// players take no damage but the timer still resets.
pub fn enemy_contact_attacks(
    time: Res<Time>,
    mut combat_log: ResMut<CombatLog>,
    mut stats: ResMut<SessionStats>,
    mut players: Query<
        (&Transform, &mut Health, Option<&Invulnerable>),
        (With<Player>, Without<Enemy>),
    >,
    mut enemies: Query<(&mut Enemy, &StatusEffects, &Transform), Without<Player>>,
) {
    let Ok((player_transform, mut health, invulnerable)) = players.get_single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let now = time.elapsed_secs_f64();
    let dt = time.delta_secs();
    let is_invulnerable = invulnerable.map(|i| now < i.until).unwrap_or(false);

    for (mut enemy, statuses, transform) in enemies.iter_mut() {
        if !enemy.is_alive() || statuses.is_stunned() {
            continue;
        }
        enemy.attack_timer -= dt;
        if enemy.attack_timer > 0.0 {
            continue;
        }
        if transform.translation.truncate().distance(player_pos) > CONTACT_RANGE {
            continue;
        }
        enemy.attack_timer = CONTACT_ATTACK_INTERVAL;
        if is_invulnerable {
            continue;
        }
        health.take_damage(enemy.contact_damage);
        stats.damage_taken += enemy.contact_damage;
        combat_log.log(
            CombatLogEventType::Damage,
            format!("Enemy #{} hit you for {:.0}", enemy.id, enemy.contact_damage),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero() {
        let mut enemy = Enemy {
            id: 1,
            max_health: 60.0,
            current_health: 10.0,
            speed: 90.0,
            contact_damage: 8.0,
            xp_reward: 25,
            attack_timer: 0.0,
        };
        enemy.take_damage(50.0);
        assert_eq!(enemy.current_health, 0.0);
        assert!(!enemy.is_alive());
    }
}
