//! Named cooldown tracker
//!
//! Cooldowns are keyed by skill slot and stored as ready-at timestamps in
//! session seconds. Starting a cooldown always overwrites the previous
//! ready-at (last-write-wins); there is no queuing or partial refund.
//!
//! The `now` parameter is session time in seconds
//! (`Time::elapsed_secs_f64`), passed in explicitly so the tracker stays a
//! pure unit.

use bevy::prelude::*;
use std::collections::HashMap;

/// Skill slot identifiers used as cooldown keys
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SkillSlot {
    Primary,
    Secondary,
    Special,
}

impl SkillSlot {
    pub fn name(self) -> &'static str {
        match self {
            SkillSlot::Primary => "PRIMARY_SKILL",
            SkillSlot::Secondary => "SECONDARY_SKILL",
            SkillSlot::Special => "SPECIAL_SKILL",
        }
    }
}

/// Per-player cooldown state
#[derive(Component, Default, Debug)]
pub struct Cooldowns {
    ready_at: HashMap<SkillSlot, f64>,
}

impl Cooldowns {
    /// Start (or restart) a cooldown: ready-at becomes now + duration
    /// unconditionally.
    pub fn start(&mut self, slot: SkillSlot, duration_secs: f64, now: f64) {
        self.ready_at.insert(slot, now + duration_secs);
    }

    /// A slot is ready if it was never started or its ready-at has passed.
    pub fn is_ready(&self, slot: SkillSlot, now: f64) -> bool {
        match self.ready_at.get(&slot) {
            Some(&ready_at) => now >= ready_at,
            None => true,
        }
    }

    /// Seconds until the slot is ready (0.0 when ready). For the HUD.
    pub fn remaining(&self, slot: SkillSlot, now: f64) -> f64 {
        match self.ready_at.get(&slot) {
            Some(&ready_at) => (ready_at - now).max(0.0),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_started_slot_is_ready() {
        let cooldowns = Cooldowns::default();
        assert!(cooldowns.is_ready(SkillSlot::Primary, 0.0));
    }

    #[test]
    fn restart_overwrites_ready_at() {
        let mut cooldowns = Cooldowns::default();
        cooldowns.start(SkillSlot::Primary, 10.0, 0.0);
        // Restarting with a shorter duration shortens the cooldown
        cooldowns.start(SkillSlot::Primary, 1.0, 0.5);
        assert!(cooldowns.is_ready(SkillSlot::Primary, 1.5));
    }
}
