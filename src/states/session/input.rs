//! Input Command Layer
//!
//! Translates raw device input into two views the rest of the core
//! consumes:
//!
//! - [`CommandBuffer`]: edge-triggered, timestamped commands buffered for a
//!   short window, so a press arriving slightly before the state that can
//!   consume it is not lost. Each raw edge produces exactly one command and
//!   each command is delivered to at most one consumer.
//! - [`HeldActions`]: level-triggered "is held" snapshot for continuous
//!   movement and channel-hold checks.
//!
//! Edge detection is computed here from the raw input source; nothing
//! downstream touches the device state.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::keybindings::Keybindings;

/// All player-facing actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Dash,
    AttackPrimary,
    AttackSecondary,
    Special1,
    ToggleSkillTree,
}

/// A discrete command produced by an input edge. Movement is
/// level-triggered and never buffered; it flows through [`HeldActions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Dash,
    AttackPrimary,
    AttackSecondary,
    Special1,
    ToggleSkillTree,
}

/// Payload-free tag for matching commands in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Dash,
    AttackPrimary,
    AttackSecondary,
    Special1,
    ToggleSkillTree,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Dash => CommandKind::Dash,
            Command::AttackPrimary => CommandKind::AttackPrimary,
            Command::AttackSecondary => CommandKind::AttackSecondary,
            Command::Special1 => CommandKind::Special1,
            Command::ToggleSkillTree => CommandKind::ToggleSkillTree,
        }
    }
}

/// A buffered command with its creation timestamp (session seconds)
#[derive(Debug, Clone, Copy)]
pub struct BufferedCommand {
    pub command: Command,
    pub issued_at: f64,
}

/// Short-window command buffer. Commands older than the window are pruned
/// lazily on every access; consumed commands never resurrect.
#[derive(Resource, Debug)]
pub struct CommandBuffer {
    entries: VecDeque<BufferedCommand>,
    window_secs: f64,
}

impl CommandBuffer {
    /// Buffer window: a command is consumable only while
    /// `now - issued_at < WINDOW_SECS`.
    pub const WINDOW_SECS: f64 = 0.150;

    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            window_secs: Self::WINDOW_SECS,
        }
    }

    fn prune(&mut self, now: f64) {
        let window = self.window_secs;
        self.entries.retain(|entry| now - entry.issued_at < window);
    }

    /// Append a command created by an input edge this frame.
    pub fn record(&mut self, command: Command, now: f64) {
        self.prune(now);
        self.entries.push_back(BufferedCommand {
            command,
            issued_at: now,
        });
    }

    /// Look at the oldest unexpired command of the given kind without
    /// removing it.
    pub fn peek(&mut self, kind: CommandKind, now: f64) -> Option<&BufferedCommand> {
        self.prune(now);
        self.entries.iter().find(|entry| entry.command.kind() == kind)
    }

    /// Remove and return the oldest unexpired command of the given kind.
    /// The first state that consumes within the window wins.
    pub fn consume(&mut self, kind: CommandKind, now: f64) -> Option<Command> {
        self.prune(now);
        let index = self
            .entries
            .iter()
            .position(|entry| entry.command.kind() == kind)?;
        self.entries.remove(index).map(|entry| entry.command)
    }

    /// Number of currently buffered (unexpired) commands.
    pub fn len(&mut self, now: f64) -> usize {
        self.prune(now);
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Level-triggered held-action snapshot, refreshed once per frame.
#[derive(Resource, Default, Debug)]
pub struct HeldActions {
    held: HashSet<PlayerAction>,
}

impl HeldActions {
    pub fn set_held(&mut self, action: PlayerAction, held: bool) {
        if held {
            self.held.insert(action);
        } else {
            self.held.remove(&action);
        }
    }

    pub fn is_held(&self, action: PlayerAction) -> bool {
        self.held.contains(&action)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Sum of held directional unit contributions, normalized so diagonal
    /// movement is not faster than axis movement.
    pub fn movement_vector(&self) -> Vec2 {
        let mut v = Vec2::ZERO;
        if self.is_held(PlayerAction::MoveUp) {
            v.y += 1.0;
        }
        if self.is_held(PlayerAction::MoveDown) {
            v.y -= 1.0;
        }
        if self.is_held(PlayerAction::MoveLeft) {
            v.x -= 1.0;
        }
        if self.is_held(PlayerAction::MoveRight) {
            v.x += 1.0;
        }
        v.normalize_or_zero()
    }
}

/// Pointer position in world coordinates, updated once per frame.
#[derive(Resource, Default, Debug)]
pub struct AimState {
    pub world_pos: Vec2,
}

/// Translate raw keyboard/mouse state into buffered commands and the held
/// snapshot. Runs first in the frame, before the player FSM.
pub fn collect_player_input(
    time: Res<Time>,
    keybindings: Res<Keybindings>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut buffer: ResMut<CommandBuffer>,
    mut held: ResMut<HeldActions>,
) {
    let now = time.elapsed_secs_f64();

    // Held snapshot (movement + channel hold)
    for action in [
        PlayerAction::MoveUp,
        PlayerAction::MoveDown,
        PlayerAction::MoveLeft,
        PlayerAction::MoveRight,
        PlayerAction::Special1,
    ] {
        held.set_held(action, keybindings.action_pressed(action, &keyboard));
    }

    // Edge-triggered commands
    if keybindings.action_just_pressed(PlayerAction::Dash, &keyboard) {
        buffer.record(Command::Dash, now);
    }
    if keybindings.action_just_pressed(PlayerAction::AttackPrimary, &keyboard)
        || mouse.just_pressed(MouseButton::Left)
    {
        buffer.record(Command::AttackPrimary, now);
    }
    if keybindings.action_just_pressed(PlayerAction::AttackSecondary, &keyboard)
        || mouse.just_pressed(MouseButton::Right)
    {
        buffer.record(Command::AttackSecondary, now);
    }
    if keybindings.action_just_pressed(PlayerAction::Special1, &keyboard) {
        buffer.record(Command::Special1, now);
    }
    if keybindings.action_just_pressed(PlayerAction::ToggleSkillTree, &keyboard) {
        buffer.record(Command::ToggleSkillTree, now);
    }
}

/// Project the cursor into world space for aiming.
pub fn update_aim(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut aim: ResMut<AimState>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.get_single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    if let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor) {
        aim.world_pos = world_pos;
    }
}
