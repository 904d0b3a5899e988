//! Headless session execution
//!
//! Runs adventure sessions without any graphical output, suitable for
//! automated testing. Input comes from a timed script instead of a
//! keyboard; aiming locks onto the nearest enemy.

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;
use std::time::Duration;

use crate::combat::log::{CombatLog, CombatLogEventType, SessionMetadata};
use crate::combat::CombatPlugin;
use crate::states::session::director::Enemy;
use crate::states::session::input::{AimState, Command, CommandBuffer, HeldActions, PlayerAction};
use crate::states::session::skill_config::SkillConfigPlugin;
use crate::states::session::skill_tree::SkillTree;
// Use the stable systems API instead of importing internal functions directly
use crate::states::session::systems::{self, SessionPhase};
use crate::states::session::{
    self, progression::Progression, ChosenArchetype, Facing, GameRng, Health, Player,
    SessionStats,
};

use super::config::{HeadlessSessionConfig, ScriptEvent};

/// Result of a completed headless session
///
/// This struct provides programmatic access to session results for
/// testing and analysis.
#[derive(Debug, Clone)]
pub struct SessionResult {
    /// Whether the player was still alive at session end
    pub survived: bool,
    /// Final player level
    pub level: u32,
    /// Enemies slain during the session
    pub enemies_slain: u32,
    /// Total damage dealt by the player
    pub damage_dealt: f32,
    /// Total damage taken by the player
    pub damage_taken: f32,
    /// Session duration in seconds
    pub session_time: f32,
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
}

/// Resource to track headless session state
#[derive(Resource)]
pub struct HeadlessSessionState {
    /// Maximum session duration before stopping
    pub max_duration: f32,
    /// Elapsed session time
    pub elapsed_time: f32,
    /// Custom output path for the session log
    pub output_path: Option<String>,
    /// Whether the session has completed
    pub session_complete: bool,
    /// Random seed for deterministic simulation (if provided)
    pub random_seed: Option<u64>,
    /// Session result (populated when the session completes)
    pub result: Option<SessionResult>,
}

/// Scripted input state: pending events and currently held actions
#[derive(Resource, Debug)]
pub struct ScriptedInput {
    events: Vec<ScriptEvent>,
    next_index: usize,
    /// (action, release time in elapsed seconds)
    holds: Vec<(PlayerAction, f32)>,
}

impl ScriptedInput {
    pub fn new(mut events: Vec<ScriptEvent>) -> Self {
        events.sort_by(|a, b| {
            a.at_secs
                .partial_cmp(&b.at_secs)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            events,
            next_index: 0,
            holds: Vec::new(),
        }
    }
}

fn action_to_command(action: PlayerAction) -> Option<Command> {
    match action {
        PlayerAction::Dash => Some(Command::Dash),
        PlayerAction::AttackPrimary => Some(Command::AttackPrimary),
        PlayerAction::AttackSecondary => Some(Command::AttackSecondary),
        PlayerAction::Special1 => Some(Command::Special1),
        PlayerAction::ToggleSkillTree => Some(Command::ToggleSkillTree),
        _ => None,
    }
}

/// Feed the input layer from the script: due events become buffered
/// commands or timed holds, exactly like keyboard edges would.
pub fn drive_scripted_input(
    time: Res<Time>,
    state: Res<HeadlessSessionState>,
    mut script: ResMut<ScriptedInput>,
    mut buffer: ResMut<CommandBuffer>,
    mut held: ResMut<HeldActions>,
) {
    let now = time.elapsed_secs_f64();
    let elapsed = state.elapsed_time;

    while script.next_index < script.events.len()
        && script.events[script.next_index].at_secs <= elapsed
    {
        let event = script.events[script.next_index].clone();
        script.next_index += 1;

        if let Some(command) = action_to_command(event.action) {
            buffer.record(command, now);
        }
        if event.hold_secs > 0.0 {
            held.set_held(event.action, true);
            script.holds.push((event.action, event.at_secs + event.hold_secs));
        }
    }

    let mut released = Vec::new();
    script.holds.retain(|&(action, release_at)| {
        if elapsed >= release_at {
            released.push(action);
            false
        } else {
            true
        }
    });
    for action in released {
        held.set_held(action, false);
    }
}

/// Aim at the nearest enemy, or straight ahead when none are alive.
pub fn headless_auto_aim(
    mut aim: ResMut<AimState>,
    players: Query<(&Transform, &Facing), With<Player>>,
    enemies: Query<(&Transform, &Enemy), Without<Player>>,
) {
    let Ok((player_transform, facing)) = players.get_single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    let nearest = enemies
        .iter()
        .filter(|(_, enemy)| enemy.is_alive())
        .map(|(t, _)| t.translation.truncate())
        .min_by(|a, b| {
            a.distance_squared(player_pos)
                .partial_cmp(&b.distance_squared(player_pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    aim.world_pos = match nearest {
        Some(pos) => pos,
        None => player_pos + facing.0 * 100.0,
    };
}

/// Plugin for headless session execution
pub struct HeadlessPlugin {
    pub config: HeadlessSessionConfig,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        let archetype = self
            .config
            .parse_archetype()
            .expect("Invalid session configuration");

        app.insert_resource(ChosenArchetype(archetype))
            .insert_resource(HeadlessSessionState {
                max_duration: self.config.max_duration_secs,
                elapsed_time: 0.0,
                output_path: self.config.output_path.clone(),
                session_complete: false,
                random_seed: self.config.random_seed,
                result: None,
            })
            .insert_resource(ScriptedInput::new(self.config.script.clone()))
            .init_resource::<CommandBuffer>()
            .init_resource::<HeldActions>()
            .init_resource::<AimState>()
            .init_resource::<SkillTree>()
            .init_resource::<SessionStats>()
            .init_resource::<session::director::SpawnDirector>()
            .init_resource::<session::PendingAnimations>();

        // Initialize GameRng with seed if provided (deterministic mode)
        let game_rng = match self.config.random_seed {
            Some(seed) => {
                info!("Using deterministic RNG with seed: {}", seed);
                GameRng::from_seed(seed)
            }
            None => {
                info!("Using non-deterministic RNG (no seed provided)");
                GameRng::from_entropy()
            }
        };
        app.insert_resource(game_rng);

        // Configure session phase ordering
        systems::configure_session_phase_ordering(app);

        // Scripted input replaces the keyboard/mouse collector
        app.add_systems(
            Update,
            (drive_scripted_input, headless_auto_aim)
                .chain()
                .in_set(SessionPhase::Input),
        );

        // Add core session systems using the shared API (always run)
        systems::add_core_session_systems(app, || true);

        let passives = self
            .config
            .parse_passives()
            .expect("Invalid session configuration");
        app.insert_resource(PreUnlockedPassives(passives));

        app.add_systems(
            Startup,
            (session::setup_session, headless_apply_unlocks).chain(),
        )
        .add_systems(
            Update,
            (headless_track_time, headless_check_session_end)
                .chain()
                .after(SessionPhase::Resolution),
        )
        .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

/// Passives to force-unlock at startup, from the config
#[derive(Resource, Debug)]
pub struct PreUnlockedPassives(pub Vec<crate::states::session::skill_tree::Passive>);

/// Apply pre-unlocked passives after session setup has reset the tree.
fn headless_apply_unlocks(
    passives: Res<PreUnlockedPassives>,
    mut tree: ResMut<SkillTree>,
    mut combat_log: ResMut<CombatLog>,
) {
    for &passive in &passives.0 {
        tree.force_unlock(passive);
        combat_log.log(
            CombatLogEventType::Progression,
            format!("Pre-unlocked {}", passive.name()),
        );
    }
}

/// Track elapsed session time for timeout detection.
fn headless_track_time(time: Res<Time>, mut state: ResMut<HeadlessSessionState>) {
    state.elapsed_time += time.delta_secs();
}

/// Check if the session has ended (player dead or timeout).
fn headless_check_session_end(
    players: Query<(&Health, &Progression), With<Player>>,
    stats: Res<SessionStats>,
    combat_log: Res<CombatLog>,
    chosen: Res<ChosenArchetype>,
    mut state: ResMut<HeadlessSessionState>,
) {
    if state.session_complete {
        return;
    }
    let Ok((health, progression)) = players.get_single() else {
        return;
    };

    let timed_out = state.elapsed_time >= state.max_duration;
    let died = !health.is_alive();
    if !timed_out && !died {
        return;
    }

    if died {
        info!("Player died after {:.1}s", state.elapsed_time);
    } else {
        info!("Session finished after {:.1}s", state.elapsed_time);
    }

    let result = SessionResult {
        survived: !died,
        level: progression.level,
        enemies_slain: stats.enemies_slain,
        damage_dealt: stats.damage_dealt,
        damage_taken: stats.damage_taken,
        session_time: state.elapsed_time,
        random_seed: state.random_seed,
    };

    let metadata = SessionMetadata {
        archetype: chosen.0.name().to_string(),
        survived: result.survived,
        final_level: result.level,
        enemies_slain: result.enemies_slain,
        damage_dealt: result.damage_dealt,
        damage_taken: result.damage_taken,
        session_time: result.session_time,
        random_seed: result.random_seed,
    };
    match combat_log.save_to_file(&metadata, state.output_path.as_deref()) {
        Ok(filename) => {
            println!("Session complete. Log saved to: {}", filename);
        }
        Err(e) => {
            eprintln!("Failed to save session log: {}", e);
        }
    }

    state.result = Some(result);
    state.session_complete = true;
}

/// Exit the app when the session is complete
fn headless_exit_on_complete(
    state: Res<HeadlessSessionState>,
    mut exit: EventWriter<AppExit>,
) {
    if state.session_complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless session with the given configuration
pub fn run_headless_session(config: HeadlessSessionConfig) -> Result<(), String> {
    config.validate()?;

    println!("Starting headless session simulation...");
    println!("  Archetype: {}", config.archetype);
    println!("  Max duration: {:.0}s", config.max_duration_secs);
    println!("  Script events: {}", config.script.len());

    App::new()
        // Minimal plugins - no window, no rendering
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
                1.0 / 60.0,
            ))),
        )
        // Transform and hierarchy plugins needed for entity positions
        .add_plugins(TransformPlugin)
        .add_plugins(HierarchyPlugin)
        // Combat events and log
        .add_plugins(CombatPlugin)
        // Load skill definitions from config
        .add_plugins(SkillConfigPlugin)
        // Our headless session plugin
        .add_plugins(HeadlessPlugin { config })
        .run();

    Ok(())
}
