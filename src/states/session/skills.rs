//! Skill activation pipeline
//!
//! Given the caster's archetype, position, aim and the current passive
//! unlocks, compose final skill parameters and spawn combat entities.
//! Passives are read from the tree at the moment of activation, never
//! cached, so an unlock affects the very next cast.

use bevy::prelude::*;

use crate::combat::log::{CombatLog, CombatLogEventType};

use super::archetype::{Archetype, ArchetypeStats};
use super::entities::{
    ChannelAura, ConeStrike, DashBeam, HitTracker, NovaBurst, PeriodicHits, ProjectileBolt,
    StrikePhases,
};
use super::skill_config::{SkillDefinitions, SkillParams};
use super::skill_tree::{Passive, SkillTree};

/// Fraction of melee damage healed back with Lifesteal
pub const LIFESTEAL_FRACTION: f32 = 0.05;
/// Full cone angle when Wide Cleave is unlocked
pub const WIDE_CLEAVE_DEGREES: f32 = 120.0;
/// Radius multiplier from Greater Nova
pub const GREATER_NOVA_MULT: f32 = 1.3;
/// Every Nth nova cast is amplified by Resonance
pub const RESONANCE_EVERY: u32 = 3;
/// Resonance multiplier on radius and damage
pub const RESONANCE_MULT: f32 = 2.0;
/// Every Nth bolt is a Headshot
pub const HEADSHOT_EVERY: u32 = 4;
/// Headshot damage multiplier
pub const HEADSHOT_MULT: f32 = 2.5;
/// Chain/detonate explosion damage as a fraction of the triggering hit
pub const CHAIN_FRACTION: f32 = 0.25;
/// Chain/detonate explosion radius
pub const EXPLOSION_RADIUS: f32 = 70.0;
/// Nova pull impulse with Gravity
pub const GRAVITY_PULL: f32 = 120.0;
/// Nova slow magnitude with Caltrop Field
pub const CALTROP_SLOW: f32 = 0.4;
/// Slow duration from nova and frostbite hits
pub const SLOW_SECS: f32 = 2.0;
/// Heal fraction with Leeching Blades
pub const LEECHING_FRACTION: f32 = 0.04;
/// Frostbite slow magnitude
pub const FROSTBITE_SLOW: f32 = 0.3;
/// Shield bash / shadow dash charge distance clamp
pub const CHARGE_MIN: f32 = 50.0;
pub const CHARGE_MAX: f32 = 200.0;
/// Shadow dash invulnerability window
pub const SHADOW_DASH_INVULN_SECS: f32 = 0.3;

/// Per-player every-Nth-cast counters. Reset only when their passive
/// triggers, never on archetype change or level up.
#[derive(Component, Default, Debug)]
pub struct CastCounters {
    pub nova_casts: u32,
    pub bolt_casts: u32,
}

/// Everything a cast needs about the caster, assembled by the FSM.
pub struct CastContext<'a> {
    pub owner: Entity,
    pub archetype: Archetype,
    pub stats: &'a ArchetypeStats,
    pub position: Vec2,
    /// Aim point in world coordinates
    pub aim: Vec2,
    pub tree: &'a SkillTree,
    pub counters: &'a mut CastCounters,
}

impl CastContext<'_> {
    /// Unit vector from the caster toward the aim point, falling back to
    /// +X when the aim sits on the caster.
    pub fn aim_direction(&self) -> Vec2 {
        let dir = self.aim - self.position;
        if dir.length_squared() > 1e-6 {
            dir.normalize()
        } else {
            Vec2::X
        }
    }
}

/// What the FSM does after a cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkillOutcome {
    /// Instant skill: hold the casting state for `state_duration`, then
    /// return to Idle. Dash skills also move the player along a segment.
    Cast {
        state_duration: f32,
        dash: Option<(Vec2, Vec2)>,
        invuln_secs: f32,
    },
    /// Channeled skill: stay in the channel state while the key is held.
    Channel,
    /// No implementation for this archetype and slot.
    Unimplemented,
}

/// Resonance and Greater Nova composition for a single nova cast.
/// Increments the counter and resets it when Resonance triggers.
pub fn nova_parameters(
    base_damage: f32,
    base_radius: f32,
    greater: bool,
    resonance: bool,
    nova_casts: &mut u32,
) -> (f32, f32) {
    let mut damage = base_damage;
    let mut radius = base_radius;
    if greater {
        radius *= GREATER_NOVA_MULT;
    }
    if resonance {
        *nova_casts += 1;
        if *nova_casts >= RESONANCE_EVERY {
            *nova_casts = 0;
            damage *= RESONANCE_MULT;
            radius *= RESONANCE_MULT;
        }
    }
    (damage, radius)
}

/// Headshot composition for a single bolt cast. Increments the counter and
/// resets it when Headshot triggers. One increment per cast, not per bolt.
pub fn headshot_multiplier(unlocked: bool, bolt_casts: &mut u32) -> f32 {
    if !unlocked {
        return 1.0;
    }
    *bolt_casts += 1;
    if *bolt_casts >= HEADSHOT_EVERY {
        *bolt_casts = 0;
        HEADSHOT_MULT
    } else {
        1.0
    }
}

/// Clamp a charge target so the travel distance stays in [min, max].
pub fn clamp_charge(start: Vec2, target: Vec2, min: f32, max: f32) -> Vec2 {
    let offset = target - start;
    let distance = offset.length();
    let dir = if distance > 1e-6 { offset / distance } else { Vec2::X };
    start + dir * distance.clamp(min, max)
}

/// Cast the archetype's primary skill. Returns how long the FSM should
/// hold the attack state as a fallback if no animation completes first.
pub fn cast_primary(
    commands: &mut Commands,
    definitions: &SkillDefinitions,
    combat_log: &mut CombatLog,
    ctx: &mut CastContext,
) -> f32 {
    let skill_id = ctx.archetype.skill_row().primary;
    let params = definitions.get_unchecked(skill_id);

    match ctx.archetype {
        Archetype::Tank => cast_cleave(commands, combat_log, params, ctx),
        Archetype::Evasive => cast_shuriken_or_nova(commands, combat_log, params, ctx),
        Archetype::GlassCannon => cast_bolts(commands, combat_log, params, ctx),
    }

    params.anticipation + params.active + params.recovery
}

fn cast_cleave(
    commands: &mut Commands,
    combat_log: &mut CombatLog,
    params: &SkillParams,
    ctx: &mut CastContext,
) {
    let wide = ctx.tree.is_unlocked(Passive::WideCleave);
    let cone_degrees = if wide {
        WIDE_CLEAVE_DEGREES
    } else {
        params.cone_degrees
    };
    let lifesteal_frac = if ctx.tree.is_unlocked(Passive::Lifesteal) {
        LIFESTEAL_FRACTION
    } else {
        0.0
    };

    commands.spawn((
        ConeStrike {
            owner: ctx.owner,
            damage: ctx.stats.damage * params.damage_mult,
            radius: params.range,
            half_angle: (cone_degrees / 2.0).to_radians(),
            facing: ctx.aim_direction(),
            apex: ctx.position,
            lifesteal_frac,
            sunder: ctx.tree.is_unlocked(Passive::Sunder),
            execute: ctx.tree.is_unlocked(Passive::Execute),
        },
        StrikePhases::new(params.anticipation, params.active, params.recovery),
        HitTracker::default(),
        Transform::from_translation(ctx.position.extend(0.0)),
    ));

    combat_log.log(
        CombatLogEventType::SkillCast,
        format!("{} ({})", params.name, if wide { "wide arc" } else { "stab" }),
    );
}

fn cast_shuriken_or_nova(
    commands: &mut Commands,
    combat_log: &mut CombatLog,
    params: &SkillParams,
    ctx: &mut CastContext,
) {
    if ctx.tree.is_unlocked(Passive::Nova) {
        let (damage, radius) = nova_parameters(
            ctx.stats.damage * params.damage_mult,
            params.radius,
            ctx.tree.is_unlocked(Passive::GreaterNova),
            ctx.tree.is_unlocked(Passive::Resonance),
            &mut ctx.counters.nova_casts,
        );
        let heal_frac = if ctx.tree.is_unlocked(Passive::LeechingBlades) {
            LEECHING_FRACTION
        } else {
            0.0
        };
        let pull = if ctx.tree.is_unlocked(Passive::Gravity) {
            GRAVITY_PULL
        } else {
            0.0
        };
        let slow = if ctx.tree.is_unlocked(Passive::CaltropField) {
            CALTROP_SLOW
        } else {
            0.0
        };

        commands.spawn((
            NovaBurst {
                owner: ctx.owner,
                damage,
                radius,
                pull,
                slow,
                heal_frac,
                center: ctx.position,
            },
            StrikePhases::new(params.anticipation, params.active, params.recovery),
            HitTracker::default(),
            Transform::from_translation(ctx.position.extend(0.0)),
        ));

        combat_log.log(
            CombatLogEventType::SkillCast,
            format!("Nova (radius {:.0})", radius),
        );
    } else {
        // Shuriken fan: projectile_count bolts across the spread angle
        let damage = ctx.stats.damage * params.damage_mult;
        let facing = ctx.aim_direction();
        let count = params.projectile_count.max(1);
        let spread = params.spread_degrees.to_radians();

        for i in 0..count {
            let t = if count > 1 {
                i as f32 / (count - 1) as f32 - 0.5
            } else {
                0.0
            };
            let dir = Vec2::from_angle(t * spread).rotate(facing);
            spawn_bolt(
                commands,
                ctx,
                params,
                damage,
                dir,
                BoltModifiers::default(),
            );
        }

        combat_log.log(
            CombatLogEventType::SkillCast,
            format!("{} ({} blades)", params.name, count),
        );
    }
}

#[derive(Default, Clone, Copy)]
struct BoltModifiers {
    pierce_budget: u32,
    ricochet: bool,
    homing: bool,
    freeze: bool,
    explode_on_kill: bool,
    explode_on_hit: bool,
    distance_bonus: bool,
}

fn cast_bolts(
    commands: &mut Commands,
    combat_log: &mut CombatLog,
    params: &SkillParams,
    ctx: &mut CastContext,
) {
    let headshot = headshot_multiplier(
        ctx.tree.is_unlocked(Passive::Headshot),
        &mut ctx.counters.bolt_casts,
    );
    let damage = ctx.stats.damage * params.damage_mult * headshot;
    let modifiers = BoltModifiers {
        pierce_budget: if ctx.tree.is_unlocked(Passive::Pierce) { 1 } else { 0 },
        ricochet: ctx.tree.is_unlocked(Passive::Ricochet),
        homing: ctx.tree.is_unlocked(Passive::Homing),
        freeze: ctx.tree.is_unlocked(Passive::Frostbite),
        explode_on_kill: ctx.tree.is_unlocked(Passive::ChainReaction),
        explode_on_hit: ctx.tree.is_unlocked(Passive::Detonate),
        distance_bonus: ctx.tree.is_unlocked(Passive::FarReach),
    };

    let facing = ctx.aim_direction();
    let count = if ctx.tree.is_unlocked(Passive::MultiShot) { 2 } else { 1 };
    let spread = 12.0_f32.to_radians();

    for i in 0..count {
        let t = if count > 1 {
            i as f32 / (count - 1) as f32 - 0.5
        } else {
            0.0
        };
        let dir = Vec2::from_angle(t * spread).rotate(facing);
        spawn_bolt(commands, ctx, params, damage, dir, modifiers);
    }

    let mut message = format!("{} x{}", params.name, count);
    if headshot > 1.0 {
        message.push_str(" (headshot)");
    }
    combat_log.log(CombatLogEventType::SkillCast, message);
}

fn spawn_bolt(
    commands: &mut Commands,
    ctx: &CastContext,
    params: &SkillParams,
    damage: f32,
    direction: Vec2,
    modifiers: BoltModifiers,
) {
    let speed = params.projectile_speed.unwrap_or(400.0);
    commands.spawn((
        ProjectileBolt {
            owner: ctx.owner,
            damage,
            velocity: direction * speed,
            speed,
            pierce_budget: modifiers.pierce_budget,
            hits_this_pass: 0,
            ricochet: modifiers.ricochet,
            homing: modifiers.homing,
            freeze: modifiers.freeze,
            explode_on_kill: modifiers.explode_on_kill,
            explode_on_hit: modifiers.explode_on_hit,
            distance_bonus: modifiers.distance_bonus,
            origin: ctx.position,
            traveled: 0.0,
            max_range: params.range,
        },
        HitTracker::default(),
        Transform::from_translation(ctx.position.extend(0.0)),
    ));
}

/// Cast the archetype's secondary skill.
pub fn cast_secondary(
    commands: &mut Commands,
    definitions: &SkillDefinitions,
    combat_log: &mut CombatLog,
    ctx: &mut CastContext,
) -> SkillOutcome {
    let Some(skill_id) = ctx.archetype.skill_row().secondary else {
        combat_log.log(
            CombatLogEventType::SkillCast,
            format!("{}: secondary skill not available", ctx.archetype.name()),
        );
        return SkillOutcome::Unimplemented;
    };
    let params = definitions.get_unchecked(skill_id);

    let start = ctx.position;
    let end = clamp_charge(start, ctx.aim, CHARGE_MIN, CHARGE_MAX);

    match ctx.archetype {
        Archetype::Tank => {
            // Shield bash: charge with a cone of knockback along the path
            commands.spawn((
                DashBeam {
                    owner: ctx.owner,
                    damage: ctx.stats.damage * params.damage_mult,
                    start,
                    end,
                    width: params.radius,
                    knockback: params.knockback,
                    stun_secs: params.stun_secs,
                },
                StrikePhases::new(params.anticipation, params.active, params.recovery),
                HitTracker::default(),
            ));
            combat_log.log(CombatLogEventType::SkillCast, params.name.clone());
            SkillOutcome::Cast {
                state_duration: params.anticipation + params.active + params.recovery,
                dash: Some((start, end)),
                invuln_secs: 0.0,
            }
        }
        Archetype::Evasive => {
            // Shadow dash: teleport-like move with a damaging trail
            commands.spawn((
                DashBeam {
                    owner: ctx.owner,
                    damage: ctx.stats.damage * params.damage_mult,
                    start,
                    end,
                    width: params.radius,
                    knockback: 0.0,
                    stun_secs: 0.0,
                },
                StrikePhases::new(params.anticipation, params.active, params.recovery),
                HitTracker::default(),
            ));
            combat_log.log(CombatLogEventType::SkillCast, params.name.clone());
            SkillOutcome::Cast {
                state_duration: params.anticipation + params.active + params.recovery,
                dash: Some((start, end)),
                invuln_secs: SHADOW_DASH_INVULN_SECS,
            }
        }
        Archetype::GlassCannon => SkillOutcome::Unimplemented,
    }
}

/// Cast the archetype's special/channel skill.
pub fn cast_special(
    commands: &mut Commands,
    definitions: &SkillDefinitions,
    combat_log: &mut CombatLog,
    ctx: &mut CastContext,
) -> SkillOutcome {
    let Some(skill_id) = ctx.archetype.skill_row().special else {
        combat_log.log(
            CombatLogEventType::SkillCast,
            format!("{}: special skill not available", ctx.archetype.name()),
        );
        return SkillOutcome::Unimplemented;
    };
    let params = definitions.get_unchecked(skill_id);

    match ctx.archetype {
        Archetype::Tank => {
            // Whirlwind: rotating field following the player while channeled
            commands.spawn((
                ChannelAura {
                    owner: ctx.owner,
                    damage_per_tick: ctx.stats.damage * params.damage_mult,
                    radius: params.radius,
                },
                PeriodicHits::new(params.tick_interval),
                Transform::from_translation(ctx.position.extend(0.0)),
            ));
            combat_log.log(CombatLogEventType::SkillCast, params.name.clone());
            SkillOutcome::Channel
        }
        _ => SkillOutcome::Unimplemented,
    }
}
