//! Combat events
//!
//! Defines the events that flow between the combat core and its
//! collaborators (logging, XP economy, animation driver).

use bevy::prelude::*;

/// Event fired when a combat entity damages an enemy
#[derive(Event)]
pub struct DamageDealt {
    /// Entity dealing the damage (the combat entity's owner)
    pub source: Entity,
    /// Enemy receiving the damage
    pub target: Entity,
    /// Damage actually applied to health
    pub amount: f32,
    /// Name of the skill that caused the damage
    pub skill_name: String,
    /// Whether this hit reduced the target to zero health
    pub killing_blow: bool,
}

/// Event fired when the player is healed (lifesteal, heal-on-hit, level up)
#[derive(Event)]
pub struct PlayerHealed {
    pub amount: f32,
    pub source_name: String,
}

/// Event fired when an enemy dies. Consumed by the XP economy and the log.
#[derive(Event)]
pub struct EnemySlain {
    pub enemy: Entity,
    /// Stable identifier issued at spawn
    pub enemy_id: u32,
    pub xp_reward: u32,
}

/// Event fired when the player gains a level
#[derive(Event)]
pub struct LevelUp {
    pub new_level: u32,
}

/// Request to the animation collaborator: play a named clip.
///
/// The core does not assume which frame the matching [`AnimationComplete`]
/// arrives in; missing clips simply never complete and the requesting state
/// falls back to its timeout.
#[derive(Event)]
pub struct AnimationRequest {
    pub name: String,
    /// Nominal clip length in seconds
    pub duration: f32,
}

/// Notification from the animation collaborator: a clip finished.
#[derive(Event)]
pub struct AnimationComplete {
    pub name: String,
}
