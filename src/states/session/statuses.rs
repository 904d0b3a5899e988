//! Status effects on enemies
//!
//! Slows, stuns and sunder marks applied by skill hits. Durations tick
//! down each frame; expired effects are removed in place.

use bevy::prelude::*;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Movement speed reduced by `magnitude` (0.4 = 40% slower)
    Slow,
    /// No movement or attacks
    Stun,
    /// Sunder mark from cleave hits
    Sunder,
}

#[derive(Debug, Clone, Copy)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: f32,
    pub magnitude: f32,
}

/// Active status effects on one enemy.
#[derive(Component, Default, Debug)]
pub struct StatusEffects(pub SmallVec<[StatusEffect; 4]>);

impl StatusEffects {
    /// Apply an effect. An existing effect of the same kind is replaced if
    /// the new one lasts longer or slows harder.
    pub fn apply(&mut self, effect: StatusEffect) {
        if let Some(existing) = self.0.iter_mut().find(|e| e.kind == effect.kind) {
            if effect.duration > existing.duration {
                existing.duration = effect.duration;
            }
            if effect.magnitude > existing.magnitude {
                existing.magnitude = effect.magnitude;
            }
        } else {
            self.0.push(effect);
        }
    }

    /// Combined movement multiplier. Stun zeroes movement outright.
    pub fn movement_multiplier(&self) -> f32 {
        if self.is_stunned() {
            return 0.0;
        }
        let mut multiplier = 1.0;
        for effect in &self.0 {
            if effect.kind == StatusKind::Slow {
                multiplier *= (1.0 - effect.magnitude).max(0.0);
            }
        }
        multiplier
    }

    pub fn is_stunned(&self) -> bool {
        self.0.iter().any(|e| e.kind == StatusKind::Stun)
    }

    pub fn is_sundered(&self) -> bool {
        self.0.iter().any(|e| e.kind == StatusKind::Sunder)
    }

    pub fn tick(&mut self, dt: f32) {
        for effect in self.0.iter_mut() {
            effect.duration -= dt;
        }
        self.0.retain(|e| e.duration > 0.0);
    }
}

/// Tick down status durations on all enemies.
pub fn update_statuses(time: Res<Time>, mut statuses: Query<&mut StatusEffects>) {
    let dt = time.delta_secs();
    for mut status in statuses.iter_mut() {
        status.tick(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_reduces_movement() {
        let mut statuses = StatusEffects::default();
        statuses.apply(StatusEffect {
            kind: StatusKind::Slow,
            duration: 2.0,
            magnitude: 0.4,
        });
        assert!((statuses.movement_multiplier() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn stun_zeroes_movement() {
        let mut statuses = StatusEffects::default();
        statuses.apply(StatusEffect {
            kind: StatusKind::Slow,
            duration: 2.0,
            magnitude: 0.4,
        });
        statuses.apply(StatusEffect {
            kind: StatusKind::Stun,
            duration: 0.5,
            magnitude: 1.0,
        });
        assert_eq!(statuses.movement_multiplier(), 0.0);
    }

    #[test]
    fn effects_expire_after_duration() {
        let mut statuses = StatusEffects::default();
        statuses.apply(StatusEffect {
            kind: StatusKind::Sunder,
            duration: 1.0,
            magnitude: 0.0,
        });
        statuses.tick(0.5);
        assert!(statuses.is_sundered());
        statuses.tick(0.6);
        assert!(!statuses.is_sundered());
    }

    #[test]
    fn reapply_keeps_longest_duration() {
        let mut statuses = StatusEffects::default();
        statuses.apply(StatusEffect {
            kind: StatusKind::Slow,
            duration: 2.0,
            magnitude: 0.4,
        });
        statuses.apply(StatusEffect {
            kind: StatusKind::Slow,
            duration: 0.5,
            magnitude: 0.4,
        });
        statuses.tick(1.0);
        assert!(statuses.movement_multiplier() < 1.0);
    }
}
