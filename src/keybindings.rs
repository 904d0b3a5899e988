//! Keybinding system for remappable controls
//!
//! Maps player actions to keyboard keys. Primary and secondary attacks are
//! additionally hard-wired to the mouse buttons in the input layer; the
//! bindings here cover the keyboard surface.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::states::session::input::PlayerAction;

/// Key binding with primary and optional secondary key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub primary: KeyCode,
    pub secondary: Option<KeyCode>,
}

impl KeyBinding {
    pub fn new(primary: KeyCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(primary: KeyCode, secondary: KeyCode) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }
}

/// Complete keybindings configuration
#[derive(Debug, Clone, Resource)]
pub struct Keybindings {
    bindings: HashMap<PlayerAction, KeyBinding>,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::create_defaults()
    }
}

impl Keybindings {
    /// Create default keybindings
    pub fn create_defaults() -> Self {
        let mut bindings = HashMap::new();

        // Movement
        bindings.insert(
            PlayerAction::MoveUp,
            KeyBinding::with_secondary(KeyCode::KeyW, KeyCode::ArrowUp),
        );
        bindings.insert(
            PlayerAction::MoveDown,
            KeyBinding::with_secondary(KeyCode::KeyS, KeyCode::ArrowDown),
        );
        bindings.insert(
            PlayerAction::MoveLeft,
            KeyBinding::with_secondary(KeyCode::KeyA, KeyCode::ArrowLeft),
        );
        bindings.insert(
            PlayerAction::MoveRight,
            KeyBinding::with_secondary(KeyCode::KeyD, KeyCode::ArrowRight),
        );

        // Combat
        bindings.insert(PlayerAction::Dash, KeyBinding::new(KeyCode::Space));
        bindings.insert(PlayerAction::AttackPrimary, KeyBinding::new(KeyCode::KeyJ));
        bindings.insert(PlayerAction::AttackSecondary, KeyBinding::new(KeyCode::KeyK));
        bindings.insert(PlayerAction::Special1, KeyBinding::new(KeyCode::KeyQ));

        // UI
        bindings.insert(PlayerAction::ToggleSkillTree, KeyBinding::new(KeyCode::KeyT));

        Self { bindings }
    }

    /// Get the binding for an action
    pub fn get(&self, action: PlayerAction) -> Option<&KeyBinding> {
        self.bindings.get(&action)
    }

    /// Check if an action is currently held down
    pub fn action_pressed(&self, action: PlayerAction, keyboard: &ButtonInput<KeyCode>) -> bool {
        if let Some(binding) = self.get(action) {
            keyboard.pressed(binding.primary)
                || binding.secondary.map_or(false, |key| keyboard.pressed(key))
        } else {
            false
        }
    }

    /// Check if an action was just pressed this frame
    pub fn action_just_pressed(
        &self,
        action: PlayerAction,
        keyboard: &ButtonInput<KeyCode>,
    ) -> bool {
        if let Some(binding) = self.get(action) {
            keyboard.just_pressed(binding.primary)
                || binding
                    .secondary
                    .map_or(false, |key| keyboard.just_pressed(key))
        } else {
            false
        }
    }
}
