mod input;
mod timing;

pub use input::{InputAction, InputState};
pub use timing::FrameTiming;

use glam::Vec2;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use winit::keyboard::PhysicalKey;

use crate::animation::{AnimationController, PlaybackState};
use crate::assets::{self, AssetError, ModelData, ModelLoader};
use crate::config::{
    self, ConfigError, EnvironmentLighting, HdrPreset, ViewerSettings, ANIMATION_DURATION_RANGE,
    LIGHT_INTENSITY_RANGE,
};
use crate::render::pick::{camera_ray, pick};
use crate::render::{
    AutoFrameController, CameraController, MaterialSynchronizer, OrbitControls, PickHit, SyncStats,
};
use crate::scene::material::MaterialConfig;
use crate::scene::overrides::{
    detect_glass, MaterialEdit, MaterialOverrides, MaterialPatch, OverrideStore,
};
use crate::scene::selection::SelectionController;
use crate::scene::{MeshId, SceneGraph};
use crate::ui::{self, MaterialPanel, PanelModel, UiAction};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("settings: {0}")]
    Config(#[from] ConfigError),
    #[error("model: {0}")]
    Asset(#[from] AssetError),
}

/// The viewer core: one loaded model, its material overrides, the current
/// selection and playback, driven one frame at a time by the host.
pub struct Viewer {
    settings: ViewerSettings,
    model_name: Option<String>,
    scene: SceneGraph,
    overrides: OverrideStore,
    selection: SelectionController,
    animation: AnimationController,
    camera: CameraController,
    controls: OrbitControls,
    auto_frame: AutoFrameController,
    synchronizer: MaterialSynchronizer,
    input: InputState,
    pointer_over_ui: bool,
}

impl Viewer {
    pub fn new(settings: ViewerSettings) -> Self {
        let animation = AnimationController::new(settings.animation_duration);
        Self {
            settings,
            model_name: None,
            scene: SceneGraph::new(),
            overrides: OverrideStore::new(),
            selection: SelectionController::new(),
            animation,
            camera: CameraController::default(),
            controls: OrbitControls::default(),
            auto_frame: AutoFrameController::new(),
            synchronizer: MaterialSynchronizer::new(),
            input: InputState::default(),
            pointer_over_ui: false,
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn overrides(&self) -> &OverrideStore {
        &self.overrides
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn environment(&self) -> EnvironmentLighting {
        self.settings.environment()
    }

    /// Replace the current model. Playback, overrides, selection and the
    /// editor all start over; glass parts get the glass bundle.
    pub fn load_model(&mut self, model: ModelData) {
        let ModelData {
            name,
            meshes,
            clips,
        } = model;

        self.animation = AnimationController::new(self.settings.animation_duration);
        self.animation.load_clips(&clips);
        self.selection.clear();
        let generation = self.scene.load(meshes);
        self.overrides.reset(generation);
        self.auto_frame.reset();
        self.synchronizer.invalidate();

        let detected = self.auto_detect_glass();
        let merged = self.overrides.merge_detected(&detected);
        log::info!(
            "Model '{}' ready: {} meshes, {} glass parts, generation {}",
            name,
            self.scene.len(),
            merged,
            generation
        );
        self.model_name = Some(name);
    }

    pub fn open_model(
        &mut self,
        loader: &mut dyn ModelLoader,
        path: &Path,
    ) -> Result<(), AssetError> {
        let model = assets::load_model(loader, path)?;
        self.load_model(model);
        Ok(())
    }

    /// Glass overrides for the meshes of the current model.
    pub fn auto_detect_glass(&self) -> MaterialOverrides {
        detect_glass(self.scene.iter())
    }

    /// Returns `false` for ids that are not part of the current model.
    pub fn select_mesh(&mut self, id: MeshId) -> bool {
        let Some(mesh) = self.scene.mesh(id) else {
            log::debug!("Ignoring selection of unknown {}", id);
            return false;
        };
        let snapshot = mesh
            .primary_material()
            .map(|material| material.read_config())
            .unwrap_or_default();
        log::debug!("Selected '{}' ({})", mesh.name(), id);
        self.selection.select_mesh(id, snapshot);
        true
    }

    pub fn deselect(&mut self) -> bool {
        self.selection.deselect()
    }

    /// Close the material editor. The panel stays open on global settings.
    pub fn close_editor(&mut self) {
        self.selection.deselect();
    }

    /// Show or hide the side panel. The selection is kept either way.
    pub fn toggle_settings(&mut self) {
        let open = !self.selection.panel_open();
        self.selection.set_panel_open(open);
    }

    /// Set one field on the selected mesh. Does nothing without a selection.
    pub fn update_override(&mut self, edit: MaterialEdit) -> bool {
        match self.selection.selected() {
            Some(id) => self.overrides.edit(id, edit),
            None => false,
        }
    }

    pub fn apply_glass_preset(&mut self) -> bool {
        match self.selection.selected() {
            Some(id) => self.overrides.apply_patch(id, &MaterialPatch::glass()),
            None => false,
        }
    }

    pub fn effective_material(&self) -> Option<MaterialConfig> {
        self.selection.effective_material(self.overrides.overrides())
    }

    pub fn set_playback(&mut self, state: PlaybackState) {
        if self.model_name.is_none() {
            log::debug!("Ignoring playback {} with no model loaded", state);
            return;
        }
        self.animation.set_playback(state);
    }

    pub fn set_animation_duration(&mut self, seconds: f32) {
        let seconds = seconds.clamp(
            *ANIMATION_DURATION_RANGE.start(),
            *ANIMATION_DURATION_RANGE.end(),
        );
        self.settings.animation_duration = seconds;
        self.animation.set_desired_duration(seconds);
    }

    pub fn set_light_intensity(&mut self, intensity: f32) {
        self.settings.light_intensity =
            intensity.clamp(*LIGHT_INTENSITY_RANGE.start(), *LIGHT_INTENSITY_RANGE.end());
    }

    pub fn set_hdr_preset(&mut self, preset: HdrPreset) {
        self.settings.hdr_preset = preset;
    }

    pub fn toggle_background(&mut self) {
        self.settings.show_background = !self.settings.show_background;
    }

    pub fn toggle_auto_zoom(&mut self) {
        self.settings.auto_zoom = !self.settings.auto_zoom;
    }

    /// Whether the last UI pass claimed the pointer.
    pub fn set_pointer_over_ui(&mut self, over_ui: bool) {
        self.pointer_over_ui = over_ui;
    }

    /// Route a pick result. Clicks the UI consumed never reach the scene, so
    /// only a true empty-space click deselects.
    pub fn handle_pointer(&mut self, hit: PickHit) -> bool {
        if self.pointer_over_ui {
            return false;
        }
        match hit {
            PickHit::Mesh { id, .. } => self.select_mesh(id),
            PickHit::Missed => self.deselect(),
        }
    }

    /// Click at normalized device coordinates.
    pub fn click(&mut self, ndc: Vec2) -> PickHit {
        let hit = pick(&self.scene, &camera_ray(&self.camera, ndc));
        self.handle_pointer(hit);
        hit
    }

    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) {
        let Some(action) = self.input.handle_key(key, pressed) else {
            return;
        };
        match action {
            InputAction::Playback(state) => self.set_playback(state),
            InputAction::Deselect => {
                self.deselect();
            }
            InputAction::ApplyGlassPreset => {
                self.apply_glass_preset();
            }
            InputAction::ToggleSettings => self.toggle_settings(),
        }
    }

    /// Draw the panels and apply what the user did. Actions the viewer cannot
    /// handle itself (opening a file) are handed back to the host.
    pub fn run_ui(&mut self, ctx: &egui::Context) -> Vec<UiAction> {
        let actions = {
            let material = self.selection.selected().and_then(|id| {
                let mesh = self.scene.mesh(id)?;
                Some(MaterialPanel {
                    mesh_name: mesh.name(),
                    material: self.effective_material()?,
                })
            });
            let model = PanelModel {
                model_name: self.model_name.as_deref(),
                playback: self.animation.state(),
                panel_open: self.selection.panel_open(),
                settings: &self.settings,
                material,
            };
            ui::show(ctx, &model)
        };
        self.set_pointer_over_ui(ctx.wants_pointer_input() || ctx.is_pointer_over_area());

        actions
            .into_iter()
            .filter_map(|action| self.apply_ui_action(action))
            .collect()
    }

    /// Returns the action back if the host has to handle it.
    pub fn apply_ui_action(&mut self, action: UiAction) -> Option<UiAction> {
        match action {
            UiAction::OpenFile => return Some(action),
            UiAction::SetPlayback(state) => self.set_playback(state),
            UiAction::ToggleSettings => self.toggle_settings(),
            UiAction::CloseSettings => self.selection.set_panel_open(false),
            UiAction::CloseEditor => self.close_editor(),
            UiAction::SetHdrPreset(preset) => self.set_hdr_preset(preset),
            UiAction::SetLightIntensity(intensity) => self.set_light_intensity(intensity),
            UiAction::ToggleBackground => self.toggle_background(),
            UiAction::ToggleAutoZoom => self.toggle_auto_zoom(),
            UiAction::SetAnimationDuration(seconds) => self.set_animation_duration(seconds),
            UiAction::Edit(edit) => {
                self.update_override(edit);
            }
            UiAction::ApplyGlassPreset => {
                self.apply_glass_preset();
            }
        }
        None
    }

    /// Per-frame update. Returns synchronizer stats when materials were
    /// rewritten this frame.
    pub fn frame(&mut self, dt: f32) -> Option<SyncStats> {
        self.animation.on_frame(dt);
        if self.model_name.is_some() {
            let bounds = self.scene.bounds();
            self.auto_frame.frame_once(
                self.scene.generation(),
                &bounds,
                self.settings.auto_zoom,
                &mut self.camera,
                &mut self.controls,
            );
        }
        self.camera.update_orbit(&self.input.orbit(), &self.controls, dt);
        self.synchronizer.sync(&mut self.scene, &self.overrides)
    }
}

/// Hands out the built-in sample model for any supported path.
struct SampleLoader;

impl ModelLoader for SampleLoader {
    fn load(&mut self, _path: &Path) -> Result<ModelData, AssetError> {
        Ok(assets::sample_model())
    }
}

/// Headless session over the sample model: open the lid, hold, close it.
///
/// No window or event loop is created here. A windowed host feeds
/// [`Viewer::handle_key`], [`Viewer::handle_pointer`] (or [`Viewer::click`])
/// and [`Viewer::run_ui`] from its own events before each [`Viewer::frame`].
pub fn run(settings_path: Option<PathBuf>) -> Result<(), AppError> {
    let settings = match settings_path {
        Some(path) => config::load_settings(&path)?,
        None => ViewerSettings::default(),
    };
    let environment = settings.environment();
    log::info!(
        "Environment: {} (background {}, light {:.1})",
        environment.preset.label(),
        environment.background,
        environment.environment_intensity
    );

    let mut viewer = Viewer::new(settings);
    viewer.open_model(&mut SampleLoader, Path::new("display_case.glb"))?;

    let target_frame_duration = Duration::from_millis(16);
    let mut timing = FrameTiming::new("Vitrine".to_string(), Instant::now());
    let travel = viewer.settings().animation_duration + 0.25;
    let script = [
        (PlaybackState::Open, travel),
        (PlaybackState::Pause, 0.5),
        (PlaybackState::Close, travel),
    ];

    // Bind the clip and frame the model before the first click.
    timing.update(Instant::now());
    viewer.frame(timing.frame_dt);
    match viewer.click(Vec2::ZERO) {
        PickHit::Mesh { id, distance } => log::info!(
            "Center click hit {} at {:.2}: {:?}",
            id,
            distance,
            viewer.effective_material()
        ),
        PickHit::Missed => log::info!("Center click missed"),
    }
    viewer.close_editor();

    for (state, seconds) in script {
        viewer.set_playback(state);
        let mut elapsed = 0.0;
        while elapsed < seconds {
            let frame_start = Instant::now();
            timing.update(frame_start);
            viewer.frame(timing.frame_dt);
            elapsed += timing.frame_dt;

            let work = frame_start.elapsed();
            timing.set_work_ms(work.as_secs_f32() * 1000.0);
            std::thread::sleep(target_frame_duration.saturating_sub(work));
        }
        if let Some(action) = viewer.animation().action() {
            log::info!(
                "{} done: clip time {:.2}/{:.2}s ({:.0} fps)",
                state,
                action.time(),
                action.duration(),
                timing.fps()
            );
        }
    }

    log::info!("Session finished");
    Ok(())
}
