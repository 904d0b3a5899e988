//! XP and leveling economy
//!
//! The player gains XP from slain enemies; each level grants one skill
//! point to spend in the skill tree. All state is in-memory and lost on
//! process exit.

use bevy::prelude::*;

use crate::combat::events::{EnemySlain, LevelUp, PlayerHealed};
use crate::combat::log::{CombatLog, CombatLogEventType};
use super::{Health, Player, SessionStats};

/// XP required to go from level 1 to level 2
const BASE_XP_TO_NEXT: u32 = 100;

/// Per-level growth of the XP requirement
const XP_GROWTH: f32 = 1.25;

/// Fraction of max health restored on level up
const LEVEL_UP_HEAL_FRACTION: f32 = 0.2;

/// Player progression state: level, XP, unspent skill points.
#[derive(Component, Clone, Debug)]
pub struct Progression {
    pub level: u32,
    pub current_level_xp: u32,
    pub xp_to_next_level: u32,
    pub skill_points: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            current_level_xp: 0,
            xp_to_next_level: BASE_XP_TO_NEXT,
            skill_points: 0,
        }
    }
}

impl Progression {
    /// Add XP, crossing as many level boundaries as the amount covers.
    /// Each level grants one skill point. Returns the number of levels
    /// gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        let mut levels_gained = 0;
        self.current_level_xp += amount;

        while self.current_level_xp >= self.xp_to_next_level {
            self.current_level_xp -= self.xp_to_next_level;
            self.level += 1;
            self.skill_points += 1;
            levels_gained += 1;
            self.xp_to_next_level =
                ((self.xp_to_next_level as f32) * XP_GROWTH).round() as u32;
        }

        levels_gained
    }

    /// Spend one skill point. Returns false if none are available.
    pub fn spend_skill_point(&mut self) -> bool {
        if self.skill_points == 0 {
            return false;
        }
        self.skill_points -= 1;
        true
    }
}

/// Grant XP for slain enemies and apply level-up side effects.
pub fn grant_xp_on_kills(
    mut slain: EventReader<EnemySlain>,
    mut combat_log: ResMut<CombatLog>,
    mut stats: ResMut<SessionStats>,
    mut level_ups: EventWriter<LevelUp>,
    mut heals: EventWriter<PlayerHealed>,
    mut players: Query<(&mut Progression, &mut Health), With<Player>>,
) {
    let Ok((mut progression, mut health)) = players.get_single_mut() else {
        return;
    };

    for event in slain.read() {
        stats.enemies_slain += 1;
        combat_log.log(
            CombatLogEventType::EnemyDeath,
            format!("Enemy #{} slain (+{} XP)", event.enemy_id, event.xp_reward),
        );

        let levels = progression.gain_xp(event.xp_reward);
        for _ in 0..levels {
            let heal = health.max * LEVEL_UP_HEAL_FRACTION;
            health.heal(heal);
            heals.send(PlayerHealed {
                amount: heal,
                source_name: "Level Up".to_string(),
            });
            level_ups.send(LevelUp {
                new_level: progression.level,
            });
            combat_log.log(
                CombatLogEventType::Progression,
                format!(
                    "Reached level {} (+1 skill point, {} unspent)",
                    progression.level, progression.skill_points
                ),
            );
            info!("Player reached level {}", progression.level);
        }
    }
}
