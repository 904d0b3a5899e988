//! JSON configuration parsing for headless mode
//!
//! Parses scripted session configurations: the archetype to play, an
//! optional deterministic seed, passives to pre-unlock, and a timed input
//! script driving the player.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::states::session::archetype::Archetype;
use crate::states::session::input::PlayerAction;
use crate::states::session::skill_tree::Passive;

/// One scripted input: fire `action` at `at_secs` into the session.
/// Movement and channel actions can be held for `hold_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptEvent {
    pub at_secs: f32,
    pub action: PlayerAction,
    #[serde(default)]
    pub hold_secs: f32,
}

/// Headless session configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessSessionConfig {
    /// Archetype name ("Tank", "GlassCannon", "Evasive")
    pub archetype: String,
    /// Maximum session duration in seconds (default: 120)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// Random seed for deterministic session reproduction
    /// If provided, the session will use a seeded RNG for reproducible results
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Custom output path for the session log (optional)
    #[serde(default)]
    pub output_path: Option<String>,
    /// Timed input script, sorted by at_secs
    #[serde(default)]
    pub script: Vec<ScriptEvent>,
    /// Passives unlocked before the session starts (by display name)
    #[serde(default)]
    pub unlocked_passives: Vec<String>,
}

fn default_max_duration() -> f32 {
    120.0
}

impl HeadlessSessionConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessSessionConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.parse_archetype()?;

        if self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }

        for name in &self.unlocked_passives {
            Passive::parse(name)?;
        }

        for (i, event) in self.script.iter().enumerate() {
            if event.at_secs < 0.0 {
                return Err(format!("script[{}]: at_secs must be >= 0", i));
            }
            if event.hold_secs < 0.0 {
                return Err(format!("script[{}]: hold_secs must be >= 0", i));
            }
        }

        Ok(())
    }

    pub fn parse_archetype(&self) -> Result<Archetype, String> {
        Archetype::parse(&self.archetype)
    }

    /// Resolve the pre-unlocked passive names
    pub fn parse_passives(&self) -> Result<Vec<Passive>, String> {
        self.unlocked_passives
            .iter()
            .map(|name| Passive::parse(name))
            .collect()
    }
}
