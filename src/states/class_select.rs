//! Class Select Scene UI
//!
//! Entry screen: pick one of the three archetypes and start a session.
//! The choice is stored in the `ChosenArchetype` resource read by
//! `setup_session`.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::session::archetype::Archetype;
use super::session::ChosenArchetype;
use super::GameState;

fn archetype_blurb(archetype: Archetype) -> &'static str {
    match archetype {
        Archetype::Tank => "High health melee bruiser. Cleave, shield bash, whirlwind.",
        Archetype::GlassCannon => "Fragile ranged burst. Piercing and homing bolts.",
        Archetype::Evasive => "Fast skirmisher. Shuriken fan, nova, shadow dash.",
    }
}

/// Main UI system for the class select screen.
pub fn class_select_ui(
    mut contexts: EguiContexts,
    mut commands: Commands,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let ctx = contexts.ctx_mut();

    // Configure dark theme
    let mut style = (*ctx.style()).clone();
    style.visuals.window_fill = egui::Color32::from_rgb(20, 20, 30);
    style.visuals.panel_fill = egui::Color32::from_rgb(20, 20, 30);
    ctx.set_style(style);

    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading(
                egui::RichText::new("DEEPSPIRE")
                    .size(42.0)
                    .color(egui::Color32::LIGHT_BLUE),
            );
            ui.label("Choose your archetype");
            ui.add_space(30.0);

            for archetype in Archetype::all() {
                let button = egui::Button::new(
                    egui::RichText::new(archetype.name()).size(24.0),
                )
                .min_size(egui::vec2(260.0, 48.0));
                if ui.add(button).clicked() {
                    commands.insert_resource(ChosenArchetype(archetype));
                    next_state.set(GameState::Adventure);
                }
                ui.label(egui::RichText::new(archetype_blurb(archetype)).small());
                ui.add_space(16.0);
            }
        });
    });
}
