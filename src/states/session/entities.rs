//! Combat entity components
//!
//! Every cast spawns one or more of these. Each carries its own hit
//! bookkeeping: instant shapes track a hit set so an enemy is damaged at
//! most once per entity, periodic shapes track per-enemy last-hit
//! timestamps gated by a tick interval.

use bevy::prelude::*;
use std::collections::{HashMap, HashSet};

/// Phase timer shared by instant strike shapes.
/// Anticipation -> Active -> Recovery -> Finished.
#[derive(Component, Debug, Clone)]
pub struct StrikePhases {
    pub anticipation: f32,
    pub active: f32,
    pub recovery: f32,
    pub elapsed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikePhase {
    Anticipation,
    Active,
    Recovery,
    Finished,
}

impl StrikePhases {
    pub fn new(anticipation: f32, active: f32, recovery: f32) -> Self {
        Self {
            anticipation,
            active,
            recovery,
            elapsed: 0.0,
        }
    }

    pub fn phase(&self) -> StrikePhase {
        if self.elapsed < self.anticipation {
            StrikePhase::Anticipation
        } else if self.elapsed < self.anticipation + self.active {
            StrikePhase::Active
        } else if self.elapsed < self.anticipation + self.active + self.recovery {
            StrikePhase::Recovery
        } else {
            StrikePhase::Finished
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() == StrikePhase::Active
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}

/// Enemies already credited by this entity. One damage application per
/// enemy per entity lifetime.
#[derive(Component, Default, Debug)]
pub struct HitTracker(pub HashSet<Entity>);

impl HitTracker {
    pub fn already_hit(&self, enemy: Entity) -> bool {
        self.0.contains(&enemy)
    }

    pub fn mark(&mut self, enemy: Entity) {
        self.0.insert(enemy);
    }
}

/// Per-enemy last-hit timestamps for periodic shapes (whirlwind, auras).
#[derive(Component, Debug)]
pub struct PeriodicHits {
    last_hit: HashMap<Entity, f64>,
    pub interval: f32,
}

impl PeriodicHits {
    pub fn new(interval: f32) -> Self {
        Self {
            last_hit: HashMap::new(),
            interval,
        }
    }

    /// True if this enemy has not been hit within the tick interval.
    /// Marks the hit when true.
    pub fn should_hit(&mut self, enemy: Entity, now: f64) -> bool {
        match self.last_hit.get(&enemy) {
            Some(&last) if now - last < self.interval as f64 => false,
            _ => {
                self.last_hit.insert(enemy, now);
                true
            }
        }
    }
}

/// Melee cone strike (Tank cleave)
#[derive(Component, Debug)]
pub struct ConeStrike {
    pub owner: Entity,
    pub damage: f32,
    pub radius: f32,
    /// Half the cone angle, in radians
    pub half_angle: f32,
    pub facing: Vec2,
    pub apex: Vec2,
    /// Fraction of final damage healed back to the owner, 0 disables
    pub lifesteal_frac: f32,
    pub sunder: bool,
    pub execute: bool,
}

/// Circular burst centered on the caster (Evasive nova)
#[derive(Component, Debug)]
pub struct NovaBurst {
    pub owner: Entity,
    pub damage: f32,
    pub radius: f32,
    /// Pull impulse toward the center, 0 disables
    pub pull: f32,
    /// Slow magnitude applied on hit, 0 disables
    pub slow: f32,
    /// Fraction of damage healed back to the owner, 0 disables
    pub heal_frac: f32,
    pub center: Vec2,
}

/// Ranged bolt with optional pierce/ricochet/homing behavior
#[derive(Component, Debug)]
pub struct ProjectileBolt {
    pub owner: Entity,
    pub damage: f32,
    pub velocity: Vec2,
    pub speed: f32,
    /// Extra enemies the bolt may pass through after the first hit
    pub pierce_budget: u32,
    /// Hits since spawn or since the last ricochet redirect
    pub hits_this_pass: u32,
    pub ricochet: bool,
    pub homing: bool,
    pub freeze: bool,
    pub explode_on_kill: bool,
    pub explode_on_hit: bool,
    /// Damage scales up with distance traveled when set
    pub distance_bonus: bool,
    pub origin: Vec2,
    pub traveled: f32,
    pub max_range: f32,
}

/// Oriented beam covering a dash travel path
#[derive(Component, Debug)]
pub struct DashBeam {
    pub owner: Entity,
    pub damage: f32,
    pub start: Vec2,
    pub end: Vec2,
    pub width: f32,
    pub knockback: f32,
    pub stun_secs: f32,
}

/// Player-centered rotating damage field, alive while the owner channels
#[derive(Component, Debug)]
pub struct ChannelAura {
    pub owner: Entity,
    pub damage_per_tick: f32,
    pub radius: f32,
}

/// Secondary area pulse from chain/detonate passives. Resolves on its
/// first resolution pass and despawns.
#[derive(Component, Debug)]
pub struct ExplosionPulse {
    pub owner: Entity,
    pub pos: Vec2,
    pub damage: f32,
    pub radius: f32,
    /// Enemies excluded because the parent entity already hit them this pass
    pub exclude: HashSet<Entity>,
    /// Whether kills by this pulse spawn further pulses
    pub chain: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strike_phases_advance_in_order() {
        let mut phases = StrikePhases::new(0.1, 0.2, 0.1);
        assert_eq!(phases.phase(), StrikePhase::Anticipation);
        phases.advance(0.15);
        assert_eq!(phases.phase(), StrikePhase::Active);
        phases.advance(0.2);
        assert_eq!(phases.phase(), StrikePhase::Recovery);
        phases.advance(0.1);
        assert_eq!(phases.phase(), StrikePhase::Finished);
    }

    #[test]
    fn periodic_hits_gate_by_interval() {
        let mut hits = PeriodicHits::new(0.25);
        let enemy = Entity::from_raw(7);
        assert!(hits.should_hit(enemy, 0.0));
        assert!(!hits.should_hit(enemy, 0.1));
        assert!(!hits.should_hit(enemy, 0.249));
        assert!(hits.should_hit(enemy, 0.25));
    }
}
