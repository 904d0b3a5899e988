//! Adventure Session Scene
//!
//! The active play session: a player-controlled avatar fighting waves of
//! enemies on an open field. The player is driven by a finite state
//! machine fed from a buffered command layer; skills compose their
//! parameters from the passive tree at cast time and spawn combat
//! entities resolved against the enemy roster each frame.
//!
//! ## Flow
//! 1. `setup_session`: spawns the player from `ChosenArchetype`, resets
//!    per-session resources, logs the session start
//! 2. Systems run each frame in four chained phases (see `systems`)
//! 3. `cleanup_session`: despawns the player, enemies and any live combat
//!    entities when leaving the scene

pub mod archetype;
pub mod cooldowns;
pub mod director;
pub mod entities;
pub mod fsm;
pub mod hud;
pub mod input;
pub mod progression;
pub mod resolution;
pub mod skill_config;
pub mod skill_tree;
pub mod skills;
pub mod statuses;
pub mod systems;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::combat::events::{AnimationComplete, AnimationRequest};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::states::GameState;

pub use archetype::{Archetype, ArchetypeStats};
pub use skills::CastCounters;

/// Marker component for the player avatar
#[derive(Component)]
pub struct Player;

/// Player health. Enemies keep their health inside their own component.
#[derive(Component, Debug)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }
}

/// Last non-zero movement direction
#[derive(Component, Debug)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec2::X)
    }
}

/// Temporary damage immunity, granted by shadow dash
#[derive(Component, Debug)]
pub struct Invulnerable {
    /// Session time at which immunity ends
    pub until: f64,
}

/// Running per-session totals for the results export
#[derive(Resource, Default, Debug)]
pub struct SessionStats {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub enemies_slain: u32,
}

/// The archetype picked on the class select screen
#[derive(Resource, Debug, Clone, Copy)]
pub struct ChosenArchetype(pub Archetype);

/// Seedable random number generator for deterministic sessions.
#[derive(Resource)]
pub struct GameRng {
    rng: StdRng,
    /// The seed used to initialize this RNG (if deterministic)
    pub seed: Option<u64>,
}

impl GameRng {
    /// Create a new GameRng with a specific seed for deterministic behavior
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Create a new GameRng with random entropy (non-deterministic)
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Generate a random f32 in the range [0.0, 1.0)
    pub fn random_f32(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Generate a random f32 in the given range
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.random_f32() * (max - min)
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Stub animation driver: every requested animation completes after its
/// duration. A real animation layer would replace this by emitting
/// completion events from its own clips.
#[derive(Resource, Default, Debug)]
pub struct PendingAnimations {
    playing: Vec<(String, f32)>,
}

/// Advance stub animations and emit completion events.
pub fn drive_stub_animations(
    time: Res<Time>,
    mut pending: ResMut<PendingAnimations>,
    mut requests: EventReader<AnimationRequest>,
    mut complete: EventWriter<AnimationComplete>,
) {
    for request in requests.read() {
        pending.playing.push((request.name.clone(), request.duration));
    }

    let dt = time.delta_secs();
    let mut finished = Vec::new();
    pending.playing.retain_mut(|(name, remaining)| {
        *remaining -= dt;
        if *remaining <= 0.0 {
            finished.push(name.clone());
            false
        } else {
            true
        }
    });
    for name in finished {
        complete.send(AnimationComplete { name });
    }
}

/// Advance the session clock on the combat log.
pub fn tick_session_clock(time: Res<Time>, mut combat_log: ResMut<CombatLog>) {
    combat_log.session_time += time.delta_secs();
}

/// Remove expired invulnerability windows.
pub fn expire_invulnerability(
    mut commands: Commands,
    time: Res<Time>,
    players: Query<(Entity, &Invulnerable)>,
) {
    let now = time.elapsed_secs_f64();
    for (entity, invulnerable) in players.iter() {
        if now >= invulnerable.until {
            commands.entity(entity).remove::<Invulnerable>();
        }
    }
}

/// Spawn the player avatar and reset per-session state.
pub fn setup_session(
    mut commands: Commands,
    chosen: Res<ChosenArchetype>,
    mut combat_log: ResMut<CombatLog>,
    mut buffer: ResMut<input::CommandBuffer>,
    mut held: ResMut<input::HeldActions>,
    mut tree: ResMut<skill_tree::SkillTree>,
    mut stats: ResMut<SessionStats>,
    mut director: ResMut<director::SpawnDirector>,
) {
    let archetype = chosen.0;
    let archetype_stats = archetype.stats();

    buffer.clear();
    held.clear();
    tree.clear();
    *stats = SessionStats::default();
    *director = director::SpawnDirector::default();

    combat_log.clear();
    combat_log.log(
        CombatLogEventType::SessionEvent,
        format!("Session started as {}", archetype.name()),
    );

    commands.spawn((
        Player,
        archetype,
        Health::new(archetype_stats.max_health),
        archetype_stats,
        Facing::default(),
        fsm::PlayerFsm::default(),
        cooldowns::Cooldowns::default(),
        CastCounters::default(),
        progression::Progression::default(),
        Transform::from_translation(Vec3::ZERO),
    ));

    info!("Session started: {}", archetype.name());
}

/// Despawn everything the session spawned.
pub fn cleanup_session(
    mut commands: Commands,
    session_entities: Query<
        Entity,
        Or<(
            With<Player>,
            With<director::Enemy>,
            With<entities::StrikePhases>,
            With<entities::ProjectileBolt>,
            With<entities::ChannelAura>,
            With<entities::ExplosionPulse>,
        )>,
    >,
) {
    for entity in session_entities.iter() {
        commands.entity(entity).despawn();
    }
}

/// Keep the camera centered on the player. Graphical mode only.
pub fn camera_follow_player(
    players: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut cameras: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(player) = players.get_single() else {
        return;
    };
    for mut camera in cameras.iter_mut() {
        camera.translation.x = player.translation.x;
        camera.translation.y = player.translation.y;
    }
}

/// End the session and return to class select when the player dies.
/// Graphical mode only; the headless runner checks health itself.
pub fn handle_player_death(
    mut combat_log: ResMut<CombatLog>,
    mut next_state: ResMut<NextState<GameState>>,
    players: Query<&Health, With<Player>>,
) {
    let Ok(health) = players.get_single() else {
        return;
    };
    if !health.is_alive() {
        combat_log.log(
            CombatLogEventType::SessionEvent,
            "You died".to_string(),
        );
        next_state.set(GameState::ClassSelect);
    }
}

/// Graphical session plugin: core systems plus keyboard/mouse input,
/// camera follow, death handling and the HUD.
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<input::CommandBuffer>()
            .init_resource::<input::HeldActions>()
            .init_resource::<input::AimState>()
            .init_resource::<skill_tree::SkillTree>()
            .init_resource::<SessionStats>()
            .init_resource::<director::SpawnDirector>()
            .init_resource::<GameRng>()
            .init_resource::<PendingAnimations>()
            .init_resource::<hud::HudState>();

        systems::configure_session_phase_ordering(app);

        app.add_systems(OnEnter(GameState::Adventure), setup_session)
            .add_systems(OnExit(GameState::Adventure), cleanup_session);

        app.add_systems(
            Update,
            (input::collect_player_input, input::update_aim)
                .chain()
                .in_set(systems::SessionPhase::Input)
                .run_if(in_state(GameState::Adventure)),
        );

        systems::add_core_session_systems(app, in_state(GameState::Adventure));

        app.add_systems(
            Update,
            (camera_follow_player, handle_player_death, hud::draw_hud)
                .after(systems::SessionPhase::Resolution)
                .run_if(in_state(GameState::Adventure)),
        );
    }
}
