//! Passive skill tree
//!
//! A purely additive unlock set read by the skill activation pipeline.
//! Passives are read at cast time, never cached, so an unlock mid-session
//! affects the very next cast. Unlocking spends skill points earned from
//! leveling; failed unlocks are rejected without state change.

use bevy::prelude::*;
use std::collections::HashSet;
use std::fmt;

use super::archetype::Archetype;
use super::progression::Progression;

/// All unlockable passives across the three archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Passive {
    // Tank
    WideCleave,
    Lifesteal,
    Sunder,
    Execute,
    // Evasive
    Nova,
    Gravity,
    CaltropField,
    LeechingBlades,
    GreaterNova,
    Resonance,
    // Glass Cannon
    Pierce,
    Ricochet,
    Frostbite,
    ChainReaction,
    Detonate,
    Homing,
    MultiShot,
    Headshot,
    FarReach,
}

impl Passive {
    pub fn name(self) -> &'static str {
        match self {
            Passive::WideCleave => "Wide Cleave",
            Passive::Lifesteal => "Lifesteal",
            Passive::Sunder => "Sunder",
            Passive::Execute => "Execute",
            Passive::Nova => "Nova",
            Passive::Gravity => "Gravity",
            Passive::CaltropField => "Caltrop Field",
            Passive::LeechingBlades => "Leeching Blades",
            Passive::GreaterNova => "Greater Nova",
            Passive::Resonance => "Resonance",
            Passive::Pierce => "Pierce",
            Passive::Ricochet => "Ricochet",
            Passive::Frostbite => "Frostbite",
            Passive::ChainReaction => "Chain Reaction",
            Passive::Detonate => "Detonate",
            Passive::Homing => "Homing",
            Passive::MultiShot => "Multi-Shot",
            Passive::Headshot => "Headshot",
            Passive::FarReach => "Far Reach",
        }
    }

    /// Short description shown in the skill tree panel
    pub fn description(self) -> &'static str {
        match self {
            Passive::WideCleave => "Cleave becomes a wide arc",
            Passive::Lifesteal => "Melee hits heal for 5% of damage dealt",
            Passive::Sunder => "Cleave marks enemies as sundered",
            Passive::Execute => "Double damage to enemies below 25% health",
            Passive::Nova => "Shuriken fan becomes a circular burst",
            Passive::Gravity => "Nova pulls enemies toward its center",
            Passive::CaltropField => "Nova leaves a slowing field",
            Passive::LeechingBlades => "Nova hits heal for a fraction of damage",
            Passive::GreaterNova => "Nova radius increased",
            Passive::Resonance => "Every 3rd nova has double radius and damage",
            Passive::Pierce => "Bolts pierce one extra enemy",
            Passive::Ricochet => "Spent bolts ricochet to a nearby enemy",
            Passive::Frostbite => "Bolt hits slow enemies",
            Passive::ChainReaction => "Kills trigger a chain explosion",
            Passive::Detonate => "Every bolt hit explodes",
            Passive::Homing => "Bolts steer toward nearby enemies",
            Passive::MultiShot => "Fire two bolts per cast",
            Passive::Headshot => "Every 4th bolt deals 2.5x damage",
            Passive::FarReach => "Bolts deal up to +50% damage at long range",
        }
    }

    /// The passives offered to each archetype, in display order.
    pub fn for_archetype(archetype: Archetype) -> &'static [Passive] {
        match archetype {
            Archetype::Tank => &[
                Passive::WideCleave,
                Passive::Lifesteal,
                Passive::Sunder,
                Passive::Execute,
            ],
            Archetype::Evasive => &[
                Passive::Nova,
                Passive::Gravity,
                Passive::CaltropField,
                Passive::LeechingBlades,
                Passive::GreaterNova,
                Passive::Resonance,
            ],
            Archetype::GlassCannon => &[
                Passive::Pierce,
                Passive::Ricochet,
                Passive::Frostbite,
                Passive::ChainReaction,
                Passive::Detonate,
                Passive::Homing,
                Passive::MultiShot,
                Passive::Headshot,
                Passive::FarReach,
            ],
        }
    }

    pub fn parse(name: &str) -> Result<Passive, String> {
        let all = [
            Passive::WideCleave,
            Passive::Lifesteal,
            Passive::Sunder,
            Passive::Execute,
            Passive::Nova,
            Passive::Gravity,
            Passive::CaltropField,
            Passive::LeechingBlades,
            Passive::GreaterNova,
            Passive::Resonance,
            Passive::Pierce,
            Passive::Ricochet,
            Passive::Frostbite,
            Passive::ChainReaction,
            Passive::Detonate,
            Passive::Homing,
            Passive::MultiShot,
            Passive::Headshot,
            Passive::FarReach,
        ];
        all.iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| format!("Unknown passive: '{}'", name))
    }
}

/// Why an unlock was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockError {
    NotEnoughPoints,
    AlreadyUnlocked,
}

impl fmt::Display for UnlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnlockError::NotEnoughPoints => write!(f, "Not enough skill points"),
            UnlockError::AlreadyUnlocked => write!(f, "Already unlocked"),
        }
    }
}

/// The unlock set. Additive during a session; reset on session restart.
#[derive(Resource, Default, Debug)]
pub struct SkillTree {
    unlocked: HashSet<Passive>,
}

impl SkillTree {
    pub fn is_unlocked(&self, passive: Passive) -> bool {
        self.unlocked.contains(&passive)
    }

    /// Spend one skill point to unlock a passive. Rejected unlocks leave
    /// both the tree and the progression unchanged.
    pub fn unlock(
        &mut self,
        passive: Passive,
        progression: &mut Progression,
    ) -> Result<(), UnlockError> {
        if self.unlocked.contains(&passive) {
            return Err(UnlockError::AlreadyUnlocked);
        }
        if !progression.spend_skill_point() {
            return Err(UnlockError::NotEnoughPoints);
        }
        self.unlocked.insert(passive);
        Ok(())
    }

    /// Unlock without spending points. Used by scripted sessions to set up
    /// a build before the clock starts.
    pub fn force_unlock(&mut self, passive: Passive) {
        self.unlocked.insert(passive);
    }

    pub fn clear(&mut self) {
        self.unlocked.clear();
    }
}
