//! Skill tuning loaded from RON
//!
//! All skill numbers (damage multipliers, cooldowns, ranges, phase
//! durations) live in `assets/config/skills.ron` so tuning does not require
//! a recompile. The file is loaded once at startup and validated; a missing
//! or malformed file is a startup failure, not a runtime one.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifiers for every castable skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillId {
    Cleave,
    ShurikenFan,
    ArcBolt,
    ShieldBash,
    ShadowDash,
    Whirlwind,
}

impl SkillId {
    pub fn all() -> [SkillId; 6] {
        [
            SkillId::Cleave,
            SkillId::ShurikenFan,
            SkillId::ArcBolt,
            SkillId::ShieldBash,
            SkillId::ShadowDash,
            SkillId::Whirlwind,
        ]
    }
}

fn default_damage_mult() -> f32 {
    1.0
}

fn default_projectile_count() -> u32 {
    1
}

/// Base parameters for one skill, before passive composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillParams {
    /// Display name used in the combat log
    pub name: String,
    /// Multiplier applied to the archetype's base damage
    #[serde(default = "default_damage_mult")]
    pub damage_mult: f32,
    /// Cooldown in seconds, before attack-speed scaling
    pub cooldown: f32,
    /// Reach in world units (cone radius, projectile max range, dash reach)
    pub range: f32,
    /// Area radius for burst/aura shapes
    #[serde(default)]
    pub radius: f32,
    /// Full cone angle in degrees for cone shapes
    #[serde(default)]
    pub cone_degrees: f32,
    /// Wind-up before the hit region is live
    #[serde(default)]
    pub anticipation: f32,
    /// Duration the hit region is live
    pub active: f32,
    /// Wind-down after the hit region expires
    #[serde(default)]
    pub recovery: f32,
    /// Units per second; None for non-projectile skills
    #[serde(default)]
    pub projectile_speed: Option<f32>,
    /// Projectiles spawned per cast before Multi-Shot
    #[serde(default = "default_projectile_count")]
    pub projectile_count: u32,
    /// Fan spread in degrees when projectile_count > 1
    #[serde(default)]
    pub spread_degrees: f32,
    /// Seconds between hits on the same enemy for periodic skills
    #[serde(default)]
    pub tick_interval: f32,
    /// Knockback impulse in world units
    #[serde(default)]
    pub knockback: f32,
    /// Stun applied on hit, in seconds
    #[serde(default)]
    pub stun_secs: f32,
}

/// The deserialized contents of skills.ron
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsConfig {
    pub skills: HashMap<SkillId, SkillParams>,
}

/// Resource holding validated skill parameters.
#[derive(Resource, Debug, Clone)]
pub struct SkillDefinitions {
    config: SkillsConfig,
}

impl SkillDefinitions {
    pub fn new(config: SkillsConfig) -> Result<Self, String> {
        let defs = Self { config };
        defs.validate()?;
        Ok(defs)
    }

    pub fn get(&self, id: SkillId) -> Option<&SkillParams> {
        self.config.skills.get(&id)
    }

    /// For callers that have already validated coverage at startup.
    pub fn get_unchecked(&self, id: SkillId) -> &SkillParams {
        self.config
            .skills
            .get(&id)
            .unwrap_or_else(|| panic!("Skill definition missing for {:?}", id))
    }

    fn validate(&self) -> Result<(), String> {
        for id in SkillId::all() {
            let params = self
                .config
                .skills
                .get(&id)
                .ok_or_else(|| format!("Missing skill definition: {:?}", id))?;

            if params.name.is_empty() {
                return Err(format!("{:?}: name must not be empty", id));
            }
            if params.damage_mult < 0.0 {
                return Err(format!("{:?}: damage_mult must be >= 0", id));
            }
            if params.cooldown < 0.0 {
                return Err(format!("{:?}: cooldown must be >= 0", id));
            }
            if params.range <= 0.0 {
                return Err(format!("{:?}: range must be > 0", id));
            }
            if params.active <= 0.0 {
                return Err(format!("{:?}: active phase must be > 0", id));
            }
            if params.anticipation < 0.0 || params.recovery < 0.0 {
                return Err(format!("{:?}: phase durations must be >= 0", id));
            }
            if let Some(speed) = params.projectile_speed {
                if speed <= 0.0 {
                    return Err(format!("{:?}: projectile_speed must be > 0", id));
                }
            }
            if params.projectile_count == 0 {
                return Err(format!("{:?}: projectile_count must be >= 1", id));
            }
            if params.tick_interval < 0.0 {
                return Err(format!("{:?}: tick_interval must be >= 0", id));
            }
        }
        Ok(())
    }
}

impl Default for SkillDefinitions {
    fn default() -> Self {
        load_skill_definitions()
            .unwrap_or_else(|e| panic!("Failed to load skill definitions: {}", e))
    }
}

/// Load and validate skills.ron from the assets directory.
pub fn load_skill_definitions() -> Result<SkillDefinitions, String> {
    let path = "assets/config/skills.ron";
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path, e))?;
    let config: SkillsConfig =
        ron::from_str(&contents).map_err(|e| format!("Failed to parse {}: {}", path, e))?;
    SkillDefinitions::new(config)
}

/// Registers the skill definitions resource at startup.
pub struct SkillConfigPlugin;

impl Plugin for SkillConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SkillDefinitions>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(name: &str) -> SkillParams {
        SkillParams {
            name: name.to_string(),
            damage_mult: 1.0,
            cooldown: 1.0,
            range: 100.0,
            radius: 0.0,
            cone_degrees: 0.0,
            anticipation: 0.1,
            active: 0.2,
            recovery: 0.1,
            projectile_speed: None,
            projectile_count: 1,
            spread_degrees: 0.0,
            tick_interval: 0.0,
            knockback: 0.0,
            stun_secs: 0.0,
        }
    }

    fn full_config() -> SkillsConfig {
        let mut skills = HashMap::new();
        for id in SkillId::all() {
            skills.insert(id, params(&format!("{:?}", id)));
        }
        SkillsConfig { skills }
    }

    #[test]
    fn complete_config_validates() {
        assert!(SkillDefinitions::new(full_config()).is_ok());
    }

    #[test]
    fn missing_skill_fails_validation() {
        let mut config = full_config();
        config.skills.remove(&SkillId::Whirlwind);
        let err = SkillDefinitions::new(config).unwrap_err();
        assert!(err.contains("Whirlwind"));
    }

    #[test]
    fn zero_active_phase_fails_validation() {
        let mut config = full_config();
        config.skills.get_mut(&SkillId::Cleave).unwrap().active = 0.0;
        assert!(SkillDefinitions::new(config).is_err());
    }

    #[test]
    fn ron_defaults_fill_optional_fields() {
        let source = r#"(
            skills: {
                Cleave: (
                    name: "Cleave",
                    cooldown: 0.8,
                    range: 80.0,
                    active: 0.2,
                ),
            },
        )"#;
        let config: SkillsConfig = ron::from_str(source).unwrap();
        let cleave = &config.skills[&SkillId::Cleave];
        assert_eq!(cleave.damage_mult, 1.0);
        assert_eq!(cleave.projectile_count, 1);
        assert!(cleave.projectile_speed.is_none());
    }
}
