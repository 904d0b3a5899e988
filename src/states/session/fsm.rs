//! Player finite state machine
//!
//! Exactly one of Idle / Move / AttackPrimary / CastSecondary /
//! ChannelSpecial is active at any time. Transitions consume buffered
//! commands; a reentrancy guard rejects a transition requested while one
//! is already in flight, so an entry effect can never corrupt the
//! exit/enter ordering.
//!
//! Timed states are driven by a single clock: the state's own elapsed
//! counter, advanced each frame. An attack state also listens for an
//! animation-complete notification, with a fail-safe timeout so a missing
//! animation asset cannot deadlock the machine.

use bevy::prelude::*;

use crate::combat::events::{AnimationComplete, AnimationRequest};
use crate::combat::log::{CombatLog, CombatLogEventType};

use super::archetype::{Archetype, ArchetypeStats};
use super::cooldowns::{Cooldowns, SkillSlot};
use super::input::{AimState, CommandBuffer, CommandKind, HeldActions, PlayerAction};
use super::skill_config::SkillDefinitions;
use super::skill_tree::SkillTree;
use super::skills::{self, CastContext, CastCounters, SkillOutcome};
use super::{Facing, Invulnerable, Player};

/// Fail-safe timeout for the attack state when no animation-complete
/// notification ever arrives.
pub const ATTACK_FAILSAFE_SECS: f32 = 1.0;

/// Movement speed factor while channeling
pub const CHANNEL_SPEED_FACTOR: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Move,
    AttackPrimary,
    CastSecondary,
    ChannelSpecial,
}

impl PlayerState {
    pub fn name(self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Move => "Move",
            PlayerState::AttackPrimary => "AttackPrimary",
            PlayerState::CastSecondary => "CastSecondary",
            PlayerState::ChannelSpecial => "ChannelSpecial",
        }
    }
}

/// Per-player FSM state.
#[derive(Component, Debug)]
pub struct PlayerFsm {
    pub state: PlayerState,
    /// Seconds spent in the current state
    pub state_elapsed: f32,
    /// Duration after which a timed state returns to Idle
    pub phase_duration: f32,
    /// The attack state is also woken by an animation-complete event
    pub awaiting_animation: bool,
    /// Reentrancy guard: set while an enter/exit pair is running
    in_transition: bool,
    /// True once the channel skill actually started
    pub channel_active: bool,
    /// Dash segment traversed during CastSecondary
    pub dash: Option<(Vec2, Vec2)>,
}

impl Default for PlayerFsm {
    fn default() -> Self {
        Self {
            state: PlayerState::Idle,
            state_elapsed: 0.0,
            phase_duration: 0.0,
            awaiting_animation: false,
            in_transition: false,
            channel_active: false,
            dash: None,
        }
    }
}

impl PlayerFsm {
    /// Begin a transition. Returns false (and leaves the state unchanged)
    /// if a transition is already in flight.
    pub fn try_begin_transition(&mut self, next: PlayerState) -> bool {
        if self.in_transition {
            warn!(
                "Rejected reentrant transition {} -> {}",
                self.state.name(),
                next.name()
            );
            return false;
        }
        self.in_transition = true;
        self.state = next;
        self.state_elapsed = 0.0;
        self.phase_duration = 0.0;
        self.awaiting_animation = false;
        self.channel_active = false;
        self.dash = None;
        true
    }

    pub fn finish_transition(&mut self) {
        self.in_transition = false;
    }

    pub fn is_channeling(&self) -> bool {
        self.state == PlayerState::ChannelSpecial && self.channel_active
    }
}

/// Decide the next state from Idle or Move. Consumes the winning command
/// from the buffer; secondary/special commands are consumed only when
/// their cooldown is ready, so a slightly-early press stays buffered.
/// Timed states (attack, cast, channel) exit on their own clocks and are
/// not decided here.
pub fn decide_transition(
    state: PlayerState,
    movement: Vec2,
    buffer: &mut CommandBuffer,
    cooldowns: &Cooldowns,
    now: f64,
) -> Option<PlayerState> {
    if !matches!(state, PlayerState::Idle | PlayerState::Move) {
        return None;
    }

    // Attacks interrupt movement
    if buffer.consume(CommandKind::AttackPrimary, now).is_some() {
        return Some(PlayerState::AttackPrimary);
    }
    if cooldowns.is_ready(SkillSlot::Secondary, now)
        && (buffer.consume(CommandKind::AttackSecondary, now).is_some()
            || buffer.consume(CommandKind::Dash, now).is_some())
    {
        return Some(PlayerState::CastSecondary);
    }
    if cooldowns.is_ready(SkillSlot::Special, now)
        && buffer.consume(CommandKind::Special1, now).is_some()
    {
        return Some(PlayerState::ChannelSpecial);
    }

    let moving = movement.length_squared() > 0.0;
    match state {
        PlayerState::Idle if moving => Some(PlayerState::Move),
        PlayerState::Move if !moving => Some(PlayerState::Idle),
        _ => None,
    }
}

fn attack_animation_name(archetype: Archetype) -> &'static str {
    match archetype {
        Archetype::Tank => "tank_attack",
        Archetype::GlassCannon => "glass_cannon_attack",
        Archetype::Evasive => "evasive_attack",
    }
}

/// Drive the player FSM: decide transitions, run enter effects, advance
/// timed states, apply movement.
#[allow(clippy::too_many_arguments)]
pub fn update_player_fsm(
    time: Res<Time>,
    mut commands: Commands,
    definitions: Res<SkillDefinitions>,
    mut combat_log: ResMut<CombatLog>,
    mut buffer: ResMut<CommandBuffer>,
    held: Res<HeldActions>,
    aim: Res<AimState>,
    tree: Res<SkillTree>,
    mut animation_requests: EventWriter<AnimationRequest>,
    mut animations_complete: EventReader<AnimationComplete>,
    mut players: Query<
        (
            Entity,
            &mut Transform,
            &Archetype,
            &ArchetypeStats,
            &mut PlayerFsm,
            &mut Cooldowns,
            &mut CastCounters,
            &mut Facing,
        ),
        With<Player>,
    >,
) {
    let Ok((
        entity,
        mut transform,
        &archetype,
        stats,
        mut fsm,
        mut cooldowns,
        mut counters,
        mut facing,
    )) = players.get_single_mut()
    else {
        return;
    };

    let now = time.elapsed_secs_f64();
    let dt = time.delta_secs();
    let movement = held.movement_vector();
    let position = transform.translation.truncate();

    let attack_done = animations_complete
        .read()
        .any(|event| event.name == attack_animation_name(archetype));

    fsm.state_elapsed += dt;

    // Timed-state exits, each driven by its own clock
    let timed_exit = match fsm.state {
        PlayerState::AttackPrimary => {
            (fsm.awaiting_animation && attack_done) || fsm.state_elapsed >= fsm.phase_duration
        }
        PlayerState::CastSecondary => fsm.state_elapsed >= fsm.phase_duration,
        PlayerState::ChannelSpecial => {
            !fsm.channel_active || !held.is_held(PlayerAction::Special1)
        }
        _ => false,
    };

    let next = if timed_exit {
        Some(PlayerState::Idle)
    } else {
        decide_transition(fsm.state, movement, &mut buffer, &cooldowns, now)
    };

    if let Some(next) = next {
        if fsm.try_begin_transition(next) {
            if movement.length_squared() > 0.0 {
                facing.0 = movement;
            }
            let mut ctx = CastContext {
                owner: entity,
                archetype,
                stats,
                position,
                aim: aim.world_pos,
                tree: &tree,
                counters: &mut counters,
            };

            match next {
                PlayerState::Idle | PlayerState::Move => {}
                PlayerState::AttackPrimary => {
                    if cooldowns.is_ready(SkillSlot::Primary, now) {
                        fsm.phase_duration = ATTACK_FAILSAFE_SECS;
                        let duration = skills::cast_primary(
                            &mut commands,
                            &definitions,
                            &mut combat_log,
                            &mut ctx,
                        );
                        let skill_id = archetype.skill_row().primary;
                        let cooldown =
                            definitions.get_unchecked(skill_id).cooldown / stats.attack_speed;
                        cooldowns.start(SkillSlot::Primary, cooldown as f64, now);
                        fsm.awaiting_animation = true;
                        animation_requests.send(AnimationRequest {
                            name: attack_animation_name(archetype).to_string(),
                            duration,
                        });
                    }
                }
                PlayerState::CastSecondary => {
                    match skills::cast_secondary(
                        &mut commands,
                        &definitions,
                        &mut combat_log,
                        &mut ctx,
                    ) {
                        SkillOutcome::Cast {
                            state_duration,
                            dash,
                            invuln_secs,
                        } => {
                            fsm.phase_duration = state_duration;
                            fsm.dash = dash;
                            if invuln_secs > 0.0 {
                                commands.entity(entity).insert(Invulnerable {
                                    until: now + invuln_secs as f64,
                                });
                            }
                            if let Some(skill_id) = archetype.skill_row().secondary {
                                let cooldown = definitions.get_unchecked(skill_id).cooldown
                                    / stats.attack_speed;
                                cooldowns.start(SkillSlot::Secondary, cooldown as f64, now);
                            }
                        }
                        SkillOutcome::Channel => {
                            // Secondary skills are never channels
                            fsm.phase_duration = 0.0;
                        }
                        SkillOutcome::Unimplemented => {
                            fsm.phase_duration = 0.0;
                        }
                    }
                }
                PlayerState::ChannelSpecial => {
                    match skills::cast_special(
                        &mut commands,
                        &definitions,
                        &mut combat_log,
                        &mut ctx,
                    ) {
                        SkillOutcome::Channel => {
                            fsm.channel_active = true;
                            if let Some(skill_id) = archetype.skill_row().special {
                                let cooldown = definitions.get_unchecked(skill_id).cooldown
                                    / stats.attack_speed;
                                cooldowns.start(SkillSlot::Special, cooldown as f64, now);
                            }
                        }
                        _ => {
                            // Unimplemented slot: next frame's hold check
                            // sends the machine back to Idle
                            fsm.channel_active = false;
                        }
                    }
                }
            }
            fsm.finish_transition();
        }
    }

    // Per-frame behavior of the current state
    match fsm.state {
        PlayerState::Move => {
            let delta = movement * stats.speed * dt;
            transform.translation += delta.extend(0.0);
            if movement.length_squared() > 0.0 {
                facing.0 = movement;
            }
        }
        PlayerState::CastSecondary => {
            if let Some((start, end)) = fsm.dash {
                let progress = if fsm.phase_duration > 0.0 {
                    (fsm.state_elapsed / fsm.phase_duration).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                let pos = start.lerp(end, progress);
                transform.translation.x = pos.x;
                transform.translation.y = pos.y;
            }
        }
        PlayerState::ChannelSpecial if fsm.channel_active => {
            // Reduced-speed movement while channeling
            let delta = movement * stats.speed * CHANNEL_SPEED_FACTOR * dt;
            transform.translation += delta.extend(0.0);
            if movement.length_squared() > 0.0 {
                facing.0 = movement;
            }
        }
        _ => {}
    }

    if fsm.state != PlayerState::Idle && fsm.state_elapsed == 0.0 {
        combat_log.log(
            CombatLogEventType::SessionEvent,
            format!("State: {}", fsm.state.name()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::states::session::input::Command;

    #[test]
    fn idle_moves_when_movement_nonzero() {
        let mut buffer = CommandBuffer::new();
        let cooldowns = Cooldowns::default();
        let next = decide_transition(
            PlayerState::Idle,
            Vec2::new(1.0, 0.0),
            &mut buffer,
            &cooldowns,
            0.0,
        );
        assert_eq!(next, Some(PlayerState::Move));
    }

    #[test]
    fn attack_command_interrupts_movement() {
        let mut buffer = CommandBuffer::new();
        buffer.record(Command::AttackPrimary, 0.0);
        let cooldowns = Cooldowns::default();
        let next = decide_transition(
            PlayerState::Move,
            Vec2::new(1.0, 0.0),
            &mut buffer,
            &cooldowns,
            0.05,
        );
        assert_eq!(next, Some(PlayerState::AttackPrimary));
    }

    #[test]
    fn secondary_on_cooldown_leaves_command_buffered() {
        let mut buffer = CommandBuffer::new();
        buffer.record(Command::AttackSecondary, 0.0);
        let mut cooldowns = Cooldowns::default();
        cooldowns.start(SkillSlot::Secondary, 5.0, 0.0);

        let next = decide_transition(
            PlayerState::Idle,
            Vec2::ZERO,
            &mut buffer,
            &cooldowns,
            0.05,
        );
        assert_eq!(next, None);
        // Still buffered while inside the window
        assert!(buffer.peek(CommandKind::AttackSecondary, 0.1).is_some());
    }

    #[test]
    fn reentrancy_guard_rejects_nested_transition() {
        let mut fsm = PlayerFsm::default();
        assert!(fsm.try_begin_transition(PlayerState::Move));
        assert!(!fsm.try_begin_transition(PlayerState::AttackPrimary));
        assert_eq!(fsm.state, PlayerState::Move);
        fsm.finish_transition();
        assert!(fsm.try_begin_transition(PlayerState::Idle));
    }

    #[test]
    fn timed_states_are_not_decided_by_commands() {
        let mut buffer = CommandBuffer::new();
        buffer.record(Command::AttackPrimary, 0.0);
        let cooldowns = Cooldowns::default();
        let next = decide_transition(
            PlayerState::AttackPrimary,
            Vec2::ZERO,
            &mut buffer,
            &cooldowns,
            0.05,
        );
        assert_eq!(next, None);
    }
}
