//! Per-mesh material overrides.
//!
//! An override entry only holds the fields a user (or glass detection)
//! changed. Fields missing from an entry fall through to whatever the mesh
//! had when it was selected, never to a default.

use std::collections::HashMap;
use std::sync::Arc;

use super::material::MaterialConfig;
use super::{MeshId, MeshNode};

/// Partial [`MaterialConfig`]: `None` means "not overridden".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialPatch {
    pub color: Option<String>,
    pub roughness: Option<f32>,
    pub metalness: Option<f32>,
    pub transmission: Option<f32>,
    pub ior: Option<f32>,
    pub opacity: Option<f32>,
}

/// A single-field edit coming from the material editor.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialEdit {
    Color(String),
    Roughness(f32),
    Metalness(f32),
    Transmission(f32),
    Ior(f32),
    Opacity(f32),
}

impl MaterialPatch {
    /// The fixed glass bundle used by the preset button and by auto-detection.
    pub fn glass() -> Self {
        Self {
            color: Some("#ffffff".to_string()),
            roughness: Some(0.02),
            metalness: Some(0.1),
            transmission: Some(1.0),
            ior: Some(1.0),
            opacity: Some(1.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_edit(&mut self, edit: MaterialEdit) {
        match edit {
            MaterialEdit::Color(value) => self.color = Some(value),
            MaterialEdit::Roughness(value) => self.roughness = Some(value),
            MaterialEdit::Metalness(value) => self.metalness = Some(value),
            MaterialEdit::Transmission(value) => self.transmission = Some(value),
            MaterialEdit::Ior(value) => self.ior = Some(value),
            MaterialEdit::Opacity(value) => self.opacity = Some(value),
        }
    }

    /// Copy every field present in `other` over this patch.
    pub fn overlay(&mut self, other: &MaterialPatch) {
        overlay_field(&mut self.color, &other.color);
        overlay_field(&mut self.roughness, &other.roughness);
        overlay_field(&mut self.metalness, &other.metalness);
        overlay_field(&mut self.transmission, &other.transmission);
        overlay_field(&mut self.ior, &other.ior);
        overlay_field(&mut self.opacity, &other.opacity);
    }

    /// Take fields from `other` only where this patch has none.
    pub fn fill_missing(&mut self, other: &MaterialPatch) {
        fill_field(&mut self.color, &other.color);
        fill_field(&mut self.roughness, &other.roughness);
        fill_field(&mut self.metalness, &other.metalness);
        fill_field(&mut self.transmission, &other.transmission);
        fill_field(&mut self.ior, &other.ior);
        fill_field(&mut self.opacity, &other.opacity);
    }

    /// Merge onto a base snapshot; present fields win.
    pub fn resolve(&self, base: &MaterialConfig) -> MaterialConfig {
        MaterialConfig {
            color: self.color.clone().unwrap_or_else(|| base.color.clone()),
            roughness: self.roughness.unwrap_or(base.roughness),
            metalness: self.metalness.unwrap_or(base.metalness),
            transmission: self.transmission.unwrap_or(base.transmission),
            ior: self.ior.unwrap_or(base.ior),
            opacity: self.opacity.unwrap_or(base.opacity),
        }
    }
}

fn overlay_field<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}

fn fill_field<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
    if target.is_none() {
        *target = source.clone();
    }
}

/// One version of the mesh -> patch mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialOverrides {
    entries: HashMap<MeshId, MaterialPatch>,
}

impl MaterialOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: MeshId) -> Option<&MaterialPatch> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MeshId, &MaterialPatch)> {
        self.entries.iter()
    }

    pub fn insert(&mut self, id: MeshId, patch: MaterialPatch) {
        self.entries.insert(id, patch);
    }

    fn entry_mut(&mut self, id: MeshId) -> &mut MaterialPatch {
        self.entries.entry(id).or_default()
    }
}

/// Owner of the live overrides for the current load generation.
///
/// Every write goes through copy-on-write: a version handed out by
/// [`OverrideStore::snapshot`] never changes afterwards, and the revision
/// counter moves on every accepted write.
#[derive(Debug, Default)]
pub struct OverrideStore {
    generation: u32,
    current: Arc<MaterialOverrides>,
    revision: u64,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every override and only accept ids from `generation` from now on.
    pub fn reset(&mut self, generation: u32) {
        self.generation = generation;
        self.current = Arc::new(MaterialOverrides::new());
        self.revision += 1;
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn overrides(&self) -> &MaterialOverrides {
        &self.current
    }

    pub fn snapshot(&self) -> Arc<MaterialOverrides> {
        Arc::clone(&self.current)
    }

    pub fn get(&self, id: MeshId) -> Option<&MaterialPatch> {
        self.current.get(id)
    }

    /// Set one field for `id`, keeping its other fields and other meshes.
    pub fn edit(&mut self, id: MeshId, edit: MaterialEdit) -> bool {
        if !self.accepts(id) {
            return false;
        }
        Arc::make_mut(&mut self.current)
            .entry_mut(id)
            .apply_edit(edit);
        self.revision += 1;
        true
    }

    /// Write every field of `patch` for `id` as one update.
    pub fn apply_patch(&mut self, id: MeshId, patch: &MaterialPatch) -> bool {
        if !self.accepts(id) {
            return false;
        }
        Arc::make_mut(&mut self.current).entry_mut(id).overlay(patch);
        self.revision += 1;
        true
    }

    /// Fold detected overrides in. Fields already present win, so edits made
    /// before detection landed are kept. Returns the number of entries touched.
    pub fn merge_detected(&mut self, detected: &MaterialOverrides) -> usize {
        let accepted: Vec<(MeshId, &MaterialPatch)> = detected
            .iter()
            .filter(|(id, _)| self.accepts(**id))
            .map(|(id, patch)| (*id, patch))
            .collect();
        if accepted.is_empty() {
            return 0;
        }
        let overrides = Arc::make_mut(&mut self.current);
        for (id, patch) in &accepted {
            overrides.entry_mut(*id).fill_missing(patch);
        }
        self.revision += 1;
        accepted.len()
    }

    fn accepts(&self, id: MeshId) -> bool {
        if id.generation() == self.generation {
            true
        } else {
            log::warn!(
                "Ignoring override for {} from a previous load (current generation {})",
                id,
                self.generation
            );
            false
        }
    }
}

/// Glass overrides for every mesh whose primary material name mentions glass.
pub fn detect_glass<'a>(meshes: impl IntoIterator<Item = &'a MeshNode>) -> MaterialOverrides {
    let mut detected = MaterialOverrides::new();
    for mesh in meshes {
        let Some(material) = mesh.primary_material() else {
            continue;
        };
        if material.name().to_lowercase().contains("glass") {
            log::debug!(
                "Detected glass material '{}' on '{}'",
                material.name(),
                mesh.name()
            );
            detected.insert(mesh.id(), MaterialPatch::glass());
        }
    }
    detected
}
