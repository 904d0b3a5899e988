//! Deepspire - Top-Down Action RPG Prototype
//!
//! A prototype implementation of a top-down action RPG: one player avatar
//! fights waves of enemies with archetype-specific skills, a passive tree
//! and an XP economy.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use deepspire::cli;
use deepspire::combat::CombatPlugin;
use deepspire::headless::{self, HeadlessSessionConfig};
use deepspire::keybindings::Keybindings;
use deepspire::states::session::skill_config::SkillConfigPlugin;
use deepspire::states::{GameState, StatesPlugin};

fn main() {
    let args = cli::parse_args();

    if let Some(config_path) = args.headless {
        let mut config = match HeadlessSessionConfig::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        };
        if let Some(output) = args.output {
            config.output_path = Some(output.to_string_lossy().into_owned());
        }
        if let Some(max_duration) = args.max_duration {
            config.max_duration_secs = max_duration;
        }

        if let Err(e) = headless::run_headless_session(config) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    App::new()
        // Bevy default plugins with custom window settings
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Deepspire".to_string(),
                resolution: (1280.0, 720.0).into(),
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        // Our game plugins
        .add_plugins((EguiPlugin, CombatPlugin, SkillConfigPlugin, StatesPlugin))
        .init_resource::<Keybindings>()
        .add_systems(Startup, spawn_camera)
        // Start on the class select screen
        .init_state::<GameState>()
        .run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
