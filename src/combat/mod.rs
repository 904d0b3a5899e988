//! Combat support layer
//!
//! Events and logging shared by the graphical and headless modes. The
//! actual combat mechanics (skills, projectiles, hit resolution) live in
//! `states::session`.

use bevy::prelude::*;

pub mod events;
pub mod log;

use events::*;

/// Plugin registering combat events and the session log
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageDealt>()
            .add_event::<PlayerHealed>()
            .add_event::<EnemySlain>()
            .add_event::<LevelUp>()
            .add_event::<AnimationRequest>()
            .add_event::<AnimationComplete>()
            .init_resource::<log::CombatLog>();
    }
}
