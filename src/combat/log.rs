//! Combat logging
//!
//! Records all combat events for display and post-session analysis.

use bevy::prelude::*;
use serde::Serialize;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Timestamp in session time (seconds since session start)
    pub timestamp: f32,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt to an enemy
    Damage,
    /// Healing received by the player
    Healing,
    /// Skill cast by the player
    SkillCast,
    /// Status effect applied to an enemy
    StatusApplied,
    /// Enemy died
    EnemyDeath,
    /// Player leveled up or spent a skill point
    Progression,
    /// Session event (start, end, player death)
    SessionEvent,
}

/// Per-session metadata attached to an exported log
#[derive(Debug, Clone, Serialize)]
pub struct SessionMetadata {
    pub archetype: String,
    pub survived: bool,
    pub final_level: u32,
    pub enemies_slain: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub session_time: f32,
    pub random_seed: Option<u64>,
}

/// The combat log resource storing all events
#[derive(Resource, Default)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current session time, advanced by the session clock system
    pub session_time: f32,
}

#[derive(Serialize)]
struct ExportedLog<'a> {
    metadata: &'a SessionMetadata,
    entries: &'a [CombatLogEntry],
}

impl CombatLog {
    /// Clear the log for a new session
    pub fn clear(&mut self) {
        self.entries.clear();
        self.session_time = 0.0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp: self.session_time,
            event_type,
            message,
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get only HP-changing events (damage and healing)
    pub fn hp_changes_only(&self) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    e.event_type,
                    CombatLogEventType::Damage | CombatLogEventType::Healing
                )
            })
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Save the log with session metadata to a JSON file.
    /// Returns the filename written.
    pub fn save_to_file(
        &self,
        metadata: &SessionMetadata,
        output_path: Option<&str>,
    ) -> Result<String, String> {
        let filename = output_path.unwrap_or("session_log.json").to_string();

        let exported = ExportedLog {
            metadata,
            entries: &self.entries,
        };
        let json = serde_json::to_string_pretty(&exported)
            .map_err(|e| format!("Failed to serialize session log: {}", e))?;

        std::fs::write(&filename, json)
            .map_err(|e| format!("Failed to write {}: {}", filename, e))?;

        Ok(filename)
    }
}
