//! Session HUD and Skill Tree Panel
//!
//! Overlays during the adventure session:
//! - Bottom bar: health, level/XP, cooldown readouts, recent combat log
//! - Skill tree window (toggled with the skill tree key): per-archetype
//!   passive list with unlock buttons; rejected unlocks show the reason
//!   without changing any state

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::combat::log::{CombatLog, CombatLogEventType};

use super::archetype::Archetype;
use super::cooldowns::{Cooldowns, SkillSlot};
use super::input::{CommandBuffer, CommandKind};
use super::progression::Progression;
use super::skill_tree::{Passive, SkillTree};
use super::{Health, Player};

/// HUD-local state that survives across frames
#[derive(Resource, Default)]
pub struct HudState {
    pub show_skill_tree: bool,
    /// Feedback from the last rejected unlock attempt
    pub unlock_error: Option<String>,
}

/// Main HUD system. Consumes skill-tree toggle commands so they are not
/// picked up twice.
#[allow(clippy::too_many_arguments)]
pub fn draw_hud(
    mut contexts: EguiContexts,
    time: Res<Time>,
    mut hud: ResMut<HudState>,
    mut buffer: ResMut<CommandBuffer>,
    mut tree: ResMut<SkillTree>,
    mut combat_log: ResMut<CombatLog>,
    mut players: Query<
        (&Archetype, &Health, &mut Progression, &Cooldowns),
        With<Player>,
    >,
) {
    let now = time.elapsed_secs_f64();
    if buffer.consume(CommandKind::ToggleSkillTree, now).is_some() {
        hud.show_skill_tree = !hud.show_skill_tree;
        hud.unlock_error = None;
    }

    let Ok((&archetype, health, mut progression, cooldowns)) = players.get_single_mut() else {
        return;
    };

    let ctx = contexts.ctx_mut();

    egui::TopBottomPanel::bottom("session_hud").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(archetype.name())
                    .strong()
                    .color(egui::Color32::LIGHT_BLUE),
            );
            ui.separator();
            ui.label(format!("HP {:.0}/{:.0}", health.current, health.max));
            ui.separator();
            ui.label(format!(
                "Lv {}  XP {}/{}",
                progression.level, progression.current_level_xp, progression.xp_to_next_level
            ));
            ui.separator();
            ui.label(format!("Points: {}", progression.skill_points));
            ui.separator();
            for slot in [SkillSlot::Primary, SkillSlot::Secondary, SkillSlot::Special] {
                let remaining = cooldowns.remaining(slot, now);
                let text = if remaining > 0.0 {
                    format!("{} {:.1}s", slot.name(), remaining)
                } else {
                    format!("{} ready", slot.name())
                };
                ui.label(text);
            }
        });

        ui.separator();
        for entry in combat_log.recent(4) {
            ui.label(
                egui::RichText::new(format!("[{:.1}s] {}", entry.timestamp, entry.message))
                    .small(),
            );
        }
    });

    if !hud.show_skill_tree {
        return;
    }

    egui::Window::new("Skill Tree")
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!(
                "Skill points available: {}",
                progression.skill_points
            ));
            ui.separator();

            let mut unlock_request: Option<Passive> = None;
            for &passive in Passive::for_archetype(archetype) {
                ui.horizontal(|ui| {
                    if tree.is_unlocked(passive) {
                        ui.label(
                            egui::RichText::new(passive.name())
                                .color(egui::Color32::LIGHT_GREEN),
                        );
                    } else if ui.button(passive.name()).clicked() {
                        unlock_request = Some(passive);
                    }
                    ui.label(egui::RichText::new(passive.description()).small());
                });
            }

            if let Some(passive) = unlock_request {
                match tree.unlock(passive, &mut progression) {
                    Ok(()) => {
                        hud.unlock_error = None;
                        combat_log.log(
                            CombatLogEventType::Progression,
                            format!("Unlocked {}", passive.name()),
                        );
                    }
                    Err(error) => {
                        hud.unlock_error = Some(format!("{}: {}", passive.name(), error));
                    }
                }
            }

            if let Some(error) = &hud.unlock_error {
                ui.separator();
                ui.colored_label(egui::Color32::LIGHT_RED, error);
            }
        });
}
