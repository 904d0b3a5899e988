//! Headless mode for agentic testing
//!
//! This module provides functionality to run adventure sessions without
//! any graphical output, suitable for automated testing and AI agent
//! integration.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless session
//! cargo run --release -- --headless session_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "archetype": "Tank",
//!   "max_duration_secs": 60,
//!   "random_seed": 42,
//!   "unlocked_passives": ["Lifesteal", "Execute"],
//!   "script": [
//!     { "at_secs": 1.0, "action": "AttackPrimary" },
//!     { "at_secs": 2.0, "action": "MoveRight", "hold_secs": 1.5 }
//!   ]
//! }
//! ```

pub mod config;
pub mod runner;

pub use config::{HeadlessSessionConfig, ScriptEvent};
pub use runner::{run_headless_session, HeadlessPlugin, SessionResult};
