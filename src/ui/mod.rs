//! egui panels: playback toolbar, global settings and the material editor.
//!
//! Panels never touch viewer state directly. They read a [`PanelModel`] and
//! report what the user did as [`UiAction`]s for the viewer to apply.

use crate::animation::PlaybackState;
use crate::config::{HdrPreset, ViewerSettings, ANIMATION_DURATION_RANGE, LIGHT_INTENSITY_RANGE};
use crate::scene::material::{Color, MaterialConfig};
use crate::scene::overrides::MaterialEdit;

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    OpenFile,
    SetPlayback(PlaybackState),
    ToggleSettings,
    CloseSettings,
    CloseEditor,
    SetHdrPreset(HdrPreset),
    SetLightIntensity(f32),
    ToggleBackground,
    ToggleAutoZoom,
    SetAnimationDuration(f32),
    Edit(MaterialEdit),
    ApplyGlassPreset,
}

/// The selected mesh as the material editor shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialPanel<'a> {
    pub mesh_name: &'a str,
    pub material: MaterialConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelModel<'a> {
    pub model_name: Option<&'a str>,
    pub playback: PlaybackState,
    pub panel_open: bool,
    pub settings: &'a ViewerSettings,
    pub material: Option<MaterialPanel<'a>>,
}

pub fn show(ctx: &egui::Context, model: &PanelModel<'_>) -> Vec<UiAction> {
    let mut actions = Vec::new();

    egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.strong("Vitrine");
            if let Some(name) = model.model_name {
                ui.label(egui::RichText::new(name).weak());
            }
            if ui.button("Open model…").clicked() {
                actions.push(UiAction::OpenFile);
            }
            if ui.selectable_label(model.panel_open, "Settings").clicked() {
                actions.push(UiAction::ToggleSettings);
            }
        });
    });

    egui::TopBottomPanel::bottom("playback").show(ctx, |ui| {
        ui.add_enabled_ui(model.model_name.is_some(), |ui| {
            ui.horizontal(|ui| {
                for (state, label) in [
                    (PlaybackState::Close, "⏪ Close"),
                    (PlaybackState::Pause, "⏸ Pause"),
                    (PlaybackState::Open, "▶ Open"),
                ] {
                    if ui.selectable_label(model.playback == state, label).clicked() {
                        actions.push(UiAction::SetPlayback(state));
                    }
                }
            });
        });
    });

    if model.model_name.is_some() && model.material.is_none() && !model.panel_open {
        egui::TopBottomPanel::bottom("hint").show(ctx, |ui| {
            ui.label(egui::RichText::new("Click a part of the model to edit its material").weak());
        });
    }

    if model.panel_open {
        egui::SidePanel::right("inspector")
            .resizable(false)
            .default_width(280.0)
            .show(ctx, |ui| match &model.material {
                Some(panel) => material_editor(ui, panel, &mut actions),
                None => global_settings(ui, model.settings, &mut actions),
            });
    }

    actions
}

fn global_settings(ui: &mut egui::Ui, settings: &ViewerSettings, actions: &mut Vec<UiAction>) {
    ui.horizontal(|ui| {
        ui.heading("Settings");
        if ui.small_button("✕").clicked() {
            actions.push(UiAction::CloseSettings);
        }
    });
    ui.separator();

    ui.label("Environment");
    ui.horizontal(|ui| {
        for preset in HdrPreset::ALL {
            if ui
                .selectable_label(settings.hdr_preset == preset, preset.label())
                .clicked()
            {
                actions.push(UiAction::SetHdrPreset(preset));
            }
        }
    });

    let mut intensity = settings.light_intensity;
    if ui
        .add(
            egui::Slider::new(&mut intensity, LIGHT_INTENSITY_RANGE)
                .step_by(0.1)
                .text("Light intensity"),
        )
        .changed()
    {
        actions.push(UiAction::SetLightIntensity(intensity));
    }

    let mut background = settings.show_background;
    if ui.checkbox(&mut background, "Show background").changed() {
        actions.push(UiAction::ToggleBackground);
    }
    let mut auto_zoom = settings.auto_zoom;
    if ui.checkbox(&mut auto_zoom, "Auto zoom on load").changed() {
        actions.push(UiAction::ToggleAutoZoom);
    }

    ui.separator();
    let mut duration = settings.animation_duration;
    if ui
        .add(
            egui::Slider::new(&mut duration, ANIMATION_DURATION_RANGE)
                .step_by(0.5)
                .text(format!("Anim duration: {}s", settings.animation_duration)),
        )
        .changed()
    {
        actions.push(UiAction::SetAnimationDuration(duration));
    }
}

fn material_editor(ui: &mut egui::Ui, panel: &MaterialPanel<'_>, actions: &mut Vec<UiAction>) {
    let material = &panel.material;
    ui.horizontal(|ui| {
        ui.heading("Material");
        if ui.small_button("✕").clicked() {
            actions.push(UiAction::CloseEditor);
        }
    });
    ui.label(egui::RichText::new(panel.mesh_name).weak());
    ui.separator();

    let mut rgb = Color::from_hex(&material.color)
        .unwrap_or(Color::WHITE)
        .to_srgb8();
    ui.horizontal(|ui| {
        ui.label("Color");
        if ui.color_edit_button_srgb(&mut rgb).changed() {
            actions.push(UiAction::Edit(MaterialEdit::Color(
                Color::from_srgb8(rgb).to_hex(),
            )));
        }
    });

    slider(
        ui,
        material.roughness,
        0.0..=1.0,
        0.01,
        "Roughness",
        actions,
        MaterialEdit::Roughness,
    );
    slider(
        ui,
        material.metalness,
        0.0..=1.0,
        0.01,
        "Metalness",
        actions,
        MaterialEdit::Metalness,
    );

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Glass");
        if ui.button("Glass preset").clicked() {
            actions.push(UiAction::ApplyGlassPreset);
        }
    });
    slider(
        ui,
        material.transmission,
        0.0..=1.0,
        0.01,
        "Transmission",
        actions,
        MaterialEdit::Transmission,
    );
    slider(
        ui,
        material.ior,
        1.0..=2.33,
        0.01,
        "IOR (refraction)",
        actions,
        MaterialEdit::Ior,
    );
}

fn slider(
    ui: &mut egui::Ui,
    value: f32,
    range: std::ops::RangeInclusive<f32>,
    step: f64,
    label: &str,
    actions: &mut Vec<UiAction>,
    edit: fn(f32) -> MaterialEdit,
) {
    let mut value = value;
    if ui
        .add(egui::Slider::new(&mut value, range).step_by(step).text(label))
        .changed()
    {
        actions.push(UiAction::Edit(edit(value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(model: &PanelModel<'_>) -> Vec<UiAction> {
        let ctx = egui::Context::default();
        let mut actions = Vec::new();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = show(ctx, model);
        });
        actions
    }

    #[test]
    fn settings_panel_renders_without_input() {
        let settings = ViewerSettings::default();
        let model = PanelModel {
            model_name: Some("display_case"),
            playback: PlaybackState::Idle,
            panel_open: true,
            settings: &settings,
            material: None,
        };
        assert!(run(&model).is_empty());
    }

    #[test]
    fn material_editor_renders_without_input() {
        let settings = ViewerSettings::default();
        let model = PanelModel {
            model_name: Some("display_case"),
            playback: PlaybackState::Open,
            panel_open: true,
            settings: &settings,
            material: Some(MaterialPanel {
                mesh_name: "Lid",
                material: MaterialConfig {
                    color: "not a color".into(),
                    ..MaterialConfig::default()
                },
            }),
        };
        assert!(run(&model).is_empty());
    }

    #[test]
    fn hint_shows_before_anything_is_selected() {
        let settings = ViewerSettings::default();
        let model = PanelModel {
            model_name: None,
            playback: PlaybackState::Idle,
            panel_open: false,
            settings: &settings,
            material: None,
        };
        assert!(run(&model).is_empty());
    }
}
