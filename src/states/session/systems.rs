//! Session Systems API
//!
//! This module provides a stable API for the session simulation systems.
//! Both graphical and headless modes should import from here rather than
//! directly from internal modules, allowing internal refactoring without
//! breaking external consumers.
//!
//! ## System Phases
//!
//! Session systems run in four ordered phases each frame:
//!
//! 1. **Input** - Command buffering, aim update (graphical or scripted)
//! 2. **Player** - FSM update, skill casts, player movement
//! 3. **Entities** - Strike phases, projectile motion, enemy AI, statuses
//! 4. **Resolution** - Hit tests, damage, explosions, death, XP
//!
//! Input collection itself is NOT added here: the graphical app adds the
//! keyboard/mouse collector and the headless runner adds its scripted
//! driver, both into the Input phase.

use bevy::prelude::*;

// === Phase 2: Player ===
pub use super::fsm::update_player_fsm;
pub use super::{drive_stub_animations, expire_invulnerability, tick_session_clock};

// === Phase 3: Entities ===
pub use super::director::{chase_player, spawn_enemies};
pub use super::resolution::{advance_strike_phases, follow_channel_auras, move_projectiles};
pub use super::statuses::update_statuses;

// === Phase 4: Resolution ===
pub use super::director::enemy_contact_attacks;
pub use super::progression::grant_xp_on_kills;
pub use super::resolution::{
    cull_dead_enemies, record_damage_events, resolve_beam_hits, resolve_cone_hits,
    resolve_explosions, resolve_nova_hits, resolve_projectile_hits, tick_channel_auras,
};

/// System set labels for session system ordering.
///
/// A command issued this frame can be consumed by a state transition in
/// the same frame; a combat entity spawned by that transition is first
/// hit-tested no earlier than the resolution phase.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// Phase 1: Raw input to commands, aim projection
    Input,
    /// Phase 2: Player FSM, casts, player movement
    Player,
    /// Phase 3: Entity lifecycles, enemy AI, status ticks
    Entities,
    /// Phase 4: Hit resolution, damage, death, XP
    Resolution,
}

/// Configures the ordering between session system phases.
///
/// Call this once during app setup before adding session systems.
pub fn configure_session_phase_ordering(app: &mut App) {
    app.configure_sets(
        Update,
        (
            SessionPhase::Input,
            SessionPhase::Player,
            SessionPhase::Entities,
            SessionPhase::Resolution,
        )
            .chain(),
    );
}

/// Adds the core session simulation systems to the app.
///
/// These are the systems needed for the combat loop to function.
/// Both graphical and headless modes need these.
///
/// # Arguments
/// * `app` - The Bevy App to add systems to
/// * `run_condition` - A run condition (e.g., `in_state(GameState::Adventure)`)
///
/// # Example
/// ```ignore
/// // For graphical mode
/// add_core_session_systems(&mut app, in_state(GameState::Adventure));
///
/// // For headless mode (always run)
/// add_core_session_systems(&mut app, || true);
/// ```
pub fn add_core_session_systems<M>(app: &mut App, run_condition: impl Condition<M> + Clone)
where
    M: 'static,
{
    // Phase 2: Player
    app.add_systems(
        Update,
        (
            tick_session_clock,
            drive_stub_animations,
            update_player_fsm,
            expire_invulnerability,
        )
            .chain()
            .in_set(SessionPhase::Player)
            .run_if(run_condition.clone()),
    );

    // Flush deferred spawns so entities cast this frame exist before the
    // entity phase advances them
    app.add_systems(
        Update,
        apply_deferred
            .after(SessionPhase::Player)
            .before(SessionPhase::Entities)
            .run_if(run_condition.clone()),
    );

    // Phase 3: Entities
    app.add_systems(
        Update,
        (
            advance_strike_phases,
            move_projectiles,
            follow_channel_auras,
            spawn_enemies,
            chase_player,
            update_statuses,
        )
            .chain()
            .in_set(SessionPhase::Entities)
            .run_if(run_condition.clone()),
    );

    // Phase 4: Resolution
    app.add_systems(
        Update,
        (
            resolve_cone_hits,
            resolve_nova_hits,
            resolve_beam_hits,
            resolve_projectile_hits,
            tick_channel_auras,
            resolve_explosions,
            enemy_contact_attacks,
            record_damage_events,
            cull_dead_enemies,
            grant_xp_on_kills,
        )
            .chain()
            .in_set(SessionPhase::Resolution)
            .run_if(run_condition),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_phase_ordering() {
        // Verify session phases can be compared for ordering
        assert_ne!(SessionPhase::Input, SessionPhase::Player);
        assert_ne!(SessionPhase::Player, SessionPhase::Entities);
        assert_ne!(SessionPhase::Entities, SessionPhase::Resolution);
    }
}
