//! Player archetypes and base stats
//!
//! Each archetype is a fixed row of base stats plus a row in the skill
//! table mapping it to its primary/secondary/special skills. Adding an
//! archetype means adding one stat row and one skill row, nothing else.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::skill_config::SkillId;

/// The three playable archetypes. Immutable once the player is spawned.
#[derive(Component, Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Archetype {
    /// High HP melee bruiser: cleave, shield bash, whirlwind channel
    Tank,
    /// Low HP ranged burst: homing/piercing bolts
    GlassCannon,
    /// Fast skirmisher: shuriken fan / nova, shadow dash
    Evasive,
}

/// Base stats derived from the archetype at creation. Immutable.
#[derive(Component, Clone, Debug)]
pub struct ArchetypeStats {
    pub max_health: f32,
    /// Movement speed in units per second
    pub speed: f32,
    /// Base damage all skill damage multipliers apply to
    pub damage: f32,
    /// Attack speed factor; real cooldown = skill cooldown / attack_speed
    pub attack_speed: f32,
}

/// One row of the archetype -> skills table
#[derive(Clone, Copy, Debug)]
pub struct SkillRow {
    pub primary: SkillId,
    /// None = placeholder slot (logged, returns to Idle)
    pub secondary: Option<SkillId>,
    pub special: Option<SkillId>,
}

impl Archetype {
    pub fn name(self) -> &'static str {
        match self {
            Archetype::Tank => "Tank",
            Archetype::GlassCannon => "Glass Cannon",
            Archetype::Evasive => "Evasive",
        }
    }

    pub fn all() -> [Archetype; 3] {
        [Archetype::Tank, Archetype::GlassCannon, Archetype::Evasive]
    }

    /// Base stats per archetype
    /// (max_health, speed, damage, attack_speed)
    pub fn stats(self) -> ArchetypeStats {
        let (max_health, speed, damage, attack_speed) = match self {
            Archetype::Tank => (300.0, 180.0, 22.0, 0.9),
            Archetype::GlassCannon => (140.0, 210.0, 30.0, 1.2),
            Archetype::Evasive => (180.0, 260.0, 16.0, 1.4),
        };
        ArchetypeStats {
            max_health,
            speed,
            damage,
            attack_speed,
        }
    }

    /// The archetype's row in the skill table
    pub fn skill_row(self) -> SkillRow {
        match self {
            Archetype::Tank => SkillRow {
                primary: SkillId::Cleave,
                secondary: Some(SkillId::ShieldBash),
                special: Some(SkillId::Whirlwind),
            },
            Archetype::GlassCannon => SkillRow {
                primary: SkillId::ArcBolt,
                // Secondary and special are intentionally unimplemented for
                // this archetype; the FSM logs and returns to Idle.
                secondary: None,
                special: None,
            },
            Archetype::Evasive => SkillRow {
                primary: SkillId::ShurikenFan,
                secondary: Some(SkillId::ShadowDash),
                special: None,
            },
        }
    }

    pub fn parse(name: &str) -> Result<Archetype, String> {
        match name {
            "Tank" => Ok(Archetype::Tank),
            "GlassCannon" | "Glass Cannon" => Ok(Archetype::GlassCannon),
            "Evasive" => Ok(Archetype::Evasive),
            _ => Err(format!(
                "Unknown archetype: '{}'. Valid archetypes: Tank, GlassCannon, Evasive",
                name
            )),
        }
    }
}
