//! Unit tests for skill definitions, the passive tree and progression
//!
//! These tests verify that:
//! - The shipped skills.ron is complete and has sane values
//! - Unlocks spend skill points and reject invalid requests
//! - Every-Nth-cast amplifiers (Resonance, Headshot) trigger and reset
//! - XP gain crosses multiple level boundaries correctly

use deepspire::states::session::archetype::Archetype;
use deepspire::states::session::progression::Progression;
use deepspire::states::session::skill_config::{SkillDefinitions, SkillId};
use deepspire::states::session::skill_tree::{Passive, SkillTree, UnlockError};
use deepspire::states::session::skills::{
    headshot_multiplier, nova_parameters, HEADSHOT_MULT, RESONANCE_MULT,
};

// =============================================================================
// Skill definition validation
// =============================================================================

/// Helper to load skill definitions for tests
fn load_skills() -> SkillDefinitions {
    SkillDefinitions::default()
}

#[test]
fn test_all_skills_have_names() {
    let skills = load_skills();
    for id in SkillId::all() {
        let def = skills.get_unchecked(id);
        assert!(!def.name.is_empty(), "{:?} should have a name", id);
    }
}

#[test]
fn test_all_skills_have_positive_range_and_active_phase() {
    let skills = load_skills();
    for id in SkillId::all() {
        let def = skills.get_unchecked(id);
        assert!(def.range > 0.0, "{:?} should have positive range", id);
        assert!(def.active > 0.0, "{:?} should have an active phase", id);
    }
}

#[test]
fn test_all_skills_have_non_negative_cooldown() {
    let skills = load_skills();
    for id in SkillId::all() {
        let def = skills.get_unchecked(id);
        assert!(
            def.cooldown >= 0.0,
            "{:?} should have non-negative cooldown, got {}",
            id,
            def.cooldown
        );
    }
}

#[test]
fn test_every_archetype_skill_row_is_defined() {
    let skills = load_skills();
    for archetype in Archetype::all() {
        let row = archetype.skill_row();
        assert!(skills.get(row.primary).is_some());
        if let Some(secondary) = row.secondary {
            assert!(skills.get(secondary).is_some());
        }
        if let Some(special) = row.special {
            assert!(skills.get(special).is_some());
        }
    }
}

#[test]
fn test_whirlwind_ticks_every_quarter_second() {
    let skills = load_skills();
    let whirlwind = skills.get_unchecked(SkillId::Whirlwind);
    assert!((whirlwind.tick_interval - 0.25).abs() < 1e-6);
}

#[test]
fn test_projectile_skills_have_speeds() {
    let skills = load_skills();
    assert!(skills.get_unchecked(SkillId::ArcBolt).projectile_speed.is_some());
    assert!(skills
        .get_unchecked(SkillId::ShurikenFan)
        .projectile_speed
        .is_some());
    assert_eq!(skills.get_unchecked(SkillId::ShurikenFan).projectile_count, 3);
}

// =============================================================================
// Skill tree unlocks
// =============================================================================

#[test]
fn test_unlock_requires_skill_point() {
    let mut tree = SkillTree::default();
    let mut progression = Progression::default();

    assert_eq!(
        tree.unlock(Passive::WideCleave, &mut progression),
        Err(UnlockError::NotEnoughPoints)
    );

    progression.skill_points = 1;
    assert!(tree.unlock(Passive::WideCleave, &mut progression).is_ok());
    assert!(tree.is_unlocked(Passive::WideCleave));
    assert_eq!(progression.skill_points, 0);
}

#[test]
fn test_duplicate_unlock_rejected_without_state_change() {
    let mut tree = SkillTree::default();
    let mut progression = Progression::default();
    progression.skill_points = 3;

    tree.unlock(Passive::Homing, &mut progression).unwrap();
    assert_eq!(
        tree.unlock(Passive::Homing, &mut progression),
        Err(UnlockError::AlreadyUnlocked)
    );
    assert_eq!(progression.skill_points, 2);
    assert!(tree.is_unlocked(Passive::Homing));
}

#[test]
fn test_every_passive_belongs_to_one_archetype_listing() {
    for archetype in Archetype::all() {
        for &passive in Passive::for_archetype(archetype) {
            // Round-trips through the name parser used by headless configs
            assert_eq!(Passive::parse(passive.name()), Ok(passive));
        }
    }
}

#[test]
fn test_force_unlock_skips_point_spend() {
    let mut tree = SkillTree::default();
    tree.force_unlock(Passive::Resonance);
    assert!(tree.is_unlocked(Passive::Resonance));
}

// =============================================================================
// Every-Nth-cast amplifiers
// =============================================================================

#[test]
fn test_resonance_third_cast_doubles_and_resets() {
    let mut counter = 0;
    let (d1, r1) = nova_parameters(12.0, 150.0, false, true, &mut counter);
    let (d2, r2) = nova_parameters(12.0, 150.0, false, true, &mut counter);
    let (d3, r3) = nova_parameters(12.0, 150.0, false, true, &mut counter);

    assert_eq!((d1, r1), (12.0, 150.0));
    assert_eq!((d2, r2), (12.0, 150.0));
    assert_eq!(d3, 12.0 * RESONANCE_MULT);
    assert_eq!(r3, 150.0 * RESONANCE_MULT);
    // Counter resets after triggering
    assert_eq!(counter, 0);

    // The cycle repeats: fourth cast is plain again
    let (d4, r4) = nova_parameters(12.0, 150.0, false, true, &mut counter);
    assert_eq!((d4, r4), (12.0, 150.0));
}

#[test]
fn test_greater_nova_stacks_with_resonance() {
    let mut counter = 2;
    let (damage, radius) = nova_parameters(10.0, 100.0, true, true, &mut counter);
    assert_eq!(damage, 10.0 * RESONANCE_MULT);
    // Greater Nova multiplies the radius before Resonance doubles it
    assert!((radius - 100.0 * 1.3 * RESONANCE_MULT).abs() < 1e-3);
}

#[test]
fn test_headshot_every_fourth_shot() {
    let mut counter = 0;
    let multipliers: Vec<f32> = (0..8)
        .map(|_| headshot_multiplier(true, &mut counter))
        .collect();
    assert_eq!(
        multipliers,
        vec![1.0, 1.0, 1.0, HEADSHOT_MULT, 1.0, 1.0, 1.0, HEADSHOT_MULT]
    );
}

#[test]
fn test_headshot_counter_frozen_when_locked() {
    let mut counter = 0;
    for _ in 0..10 {
        assert_eq!(headshot_multiplier(false, &mut counter), 1.0);
    }
    assert_eq!(counter, 0);
}

// =============================================================================
// Progression
// =============================================================================

#[test]
fn test_single_level_up_grants_one_point() {
    let mut progression = Progression::default();
    let levels = progression.gain_xp(100);
    assert_eq!(levels, 1);
    assert_eq!(progression.level, 2);
    assert_eq!(progression.skill_points, 1);
    // Requirement grows by 25%, rounded
    assert_eq!(progression.xp_to_next_level, 125);
}

#[test]
fn test_large_xp_gain_crosses_multiple_levels() {
    let mut progression = Progression::default();
    // 100 + 125 = 225 to reach level 3
    let levels = progression.gain_xp(230);
    assert_eq!(levels, 2);
    assert_eq!(progression.level, 3);
    assert_eq!(progression.skill_points, 2);
    assert_eq!(progression.current_level_xp, 5);
}

#[test]
fn test_spend_skill_point_fails_at_zero() {
    let mut progression = Progression::default();
    assert!(!progression.spend_skill_point());
    progression.skill_points = 1;
    assert!(progression.spend_skill_point());
    assert!(!progression.spend_skill_point());
}
