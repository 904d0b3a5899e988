//! Game state management
//!
//! Defines the core game states and transitions between them.

use bevy::prelude::*;

pub mod class_select;
pub mod session;

pub use session::archetype::Archetype;

/// The core game states representing the main screens/modes of the game.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Class selection - entry point, pick an archetype
    #[default]
    ClassSelect,
    /// Active adventure session - the real-time combat loop
    Adventure,
}

/// Plugin for managing game states and transitions
pub struct StatesPlugin;

impl Plugin for StatesPlugin {
    fn build(&self, app: &mut App) {
        app
            // Class select screen (egui)
            .add_systems(
                Update,
                class_select::class_select_ui.run_if(in_state(GameState::ClassSelect)),
            )
            // Adventure session systems
            .add_plugins(session::SessionPlugin);
    }
}
