//! Deepspire - Top-Down Action RPG Prototype
//!
//! A prototype implementation of a top-down action RPG: one player avatar
//! (Tank, Glass Cannon or Evasive), a state-machine-driven combat model,
//! skills with cooldowns and passive-tree modifiers, and a simple enemy
//! director feeding the XP economy.
//!
//! This library exposes the core game modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod headless;
pub mod keybindings;
pub mod states;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use headless::HeadlessSessionConfig;
pub use states::session::archetype::Archetype;
pub use states::GameState;
