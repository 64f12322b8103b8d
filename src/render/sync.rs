//! Per-frame reconciliation of material overrides with live scene materials.
//!
//! Overrides are additive: only fields present in a patch are written, and
//! a standard material is promoted to a physical one the first time a patch
//! asks for transmission. Re-applying the same overrides is a no-op.

use crate::scene::material::Material;
use crate::scene::overrides::{MaterialOverrides, MaterialPatch, OverrideStore};
use crate::scene::SceneGraph;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Meshes that had an override entry.
    pub meshes: usize,
    /// Material slots promoted from standard to physical during this pass.
    pub promoted: usize,
}

/// Write every override onto the scene, slot by slot.
pub fn apply_overrides(scene: &mut SceneGraph, overrides: &MaterialOverrides) -> SyncStats {
    let mut stats = SyncStats::default();
    for node in scene.iter_mut() {
        let Some(patch) = overrides.get(node.id()) else {
            continue;
        };
        stats.meshes += 1;
        let id = node.id();
        for material in node.materials_mut() {
            if apply_patch(material, patch) {
                stats.promoted += 1;
                log::info!(
                    "Promoted material '{}' on {} to physical for transmission",
                    material.name(),
                    id
                );
            }
        }
    }
    stats
}

/// Apply the present fields of `patch`. Returns `true` if the material was promoted.
pub fn apply_patch(material: &mut Material, patch: &MaterialPatch) -> bool {
    let wants_transmission = patch.transmission.unwrap_or(0.0) > 0.0;
    let promoted = wants_transmission && material.promote();

    let base = material.standard_mut();
    if let Some(color) = patch.color.as_deref().filter(|color| !color.is_empty()) {
        base.color.set_hex(color);
    }
    if let Some(roughness) = patch.roughness {
        base.roughness = roughness;
    }
    if let Some(metalness) = patch.metalness {
        base.metalness = metalness;
    }

    if let Material::Physical(physical) = material {
        if let Some(transmission) = patch.transmission {
            physical.transmission = transmission;
            // Unit thickness whenever any light transmits.
            physical.thickness = if transmission > 0.0 { 1.0 } else { 0.0 };
            physical.base.transparent = transmission > 0.0;
        }
        if let Some(ior) = patch.ior {
            physical.ior = ior;
        }
    }
    promoted
}

/// Runs [`apply_overrides`] once per frame, skipping frames where neither the
/// override revision nor the scene generation moved.
#[derive(Debug, Default)]
pub struct MaterialSynchronizer {
    applied: Option<(u32, u64)>,
}

impl MaterialSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next [`MaterialSynchronizer::sync`] to do a full pass.
    pub fn invalidate(&mut self) {
        self.applied = None;
    }

    pub fn sync(&mut self, scene: &mut SceneGraph, store: &OverrideStore) -> Option<SyncStats> {
        let key = (scene.generation(), store.revision());
        if self.applied == Some(key) {
            return None;
        }
        let stats = apply_overrides(scene, store.overrides());
        self.applied = Some(key);
        if stats.meshes > 0 {
            log::debug!(
                "Synchronized {} overridden meshes ({} promotions)",
                stats.meshes,
                stats.promoted
            );
        }
        Some(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::material::{
        Color, PhysicalMaterial, StandardMaterial, TextureHandle, TextureMaps,
    };
    use crate::scene::overrides::MaterialEdit;
    use crate::scene::{Aabb, MeshDesc, MeshId};

    fn textured_standard() -> StandardMaterial {
        StandardMaterial {
            name: "Shell".into(),
            color: Color::from_hex("#204060").unwrap(),
            roughness: 0.35,
            metalness: 0.6,
            opacity: 1.0,
            transparent: false,
            maps: TextureMaps {
                base_color: Some(TextureHandle(10)),
                normal: Some(TextureHandle(11)),
                roughness: Some(TextureHandle(12)),
                metalness: Some(TextureHandle(13)),
            },
        }
    }

    fn scene_with(materials: Vec<Vec<Material>>) -> (SceneGraph, Vec<MeshId>) {
        let mut scene = SceneGraph::new();
        scene.load(
            materials
                .into_iter()
                .enumerate()
                .map(|(index, materials)| MeshDesc {
                    name: format!("mesh{}", index),
                    materials,
                    bounds: Aabb::EMPTY,
                })
                .collect(),
        );
        let ids = scene.iter().map(|node| node.id()).collect();
        (scene, ids)
    }

    #[test]
    fn transmission_promotes_standard_material_once() {
        let original = textured_standard();
        let (mut scene, ids) = scene_with(vec![vec![original.clone().into()]]);
        let mut store = OverrideStore::new();
        store.reset(scene.generation());
        store.edit(ids[0], MaterialEdit::Transmission(0.8));

        let stats = apply_overrides(&mut scene, store.overrides());
        assert_eq!(stats.promoted, 1);

        let material = &scene.mesh(ids[0]).unwrap().materials()[0];
        let physical = material.physical().expect("promoted to physical");
        assert_eq!(physical.base.color, original.color);
        assert_eq!(physical.base.maps, original.maps);
        assert_eq!(physical.base.roughness, original.roughness);
        assert_eq!(physical.base.metalness, original.metalness);
        assert_eq!(physical.transmission, 0.8);
        assert_eq!(physical.thickness, 1.0);
        assert!(physical.base.transparent);

        let before = scene.mesh(ids[0]).unwrap().materials().to_vec();
        let stats = apply_overrides(&mut scene, store.overrides());
        assert_eq!(stats.promoted, 0);
        assert_eq!(scene.mesh(ids[0]).unwrap().materials(), before.as_slice());
    }

    #[test]
    fn absent_fields_leave_live_values_alone() {
        let (mut scene, ids) = scene_with(vec![vec![textured_standard().into()]]);
        let mut store = OverrideStore::new();
        store.reset(scene.generation());
        store.edit(ids[0], MaterialEdit::Roughness(0.9));
        apply_overrides(&mut scene, store.overrides());

        let material = scene.mesh(ids[0]).unwrap().materials()[0].standard().clone();
        assert_eq!(material.roughness, 0.9);
        assert_eq!(material.metalness, 0.6);
        assert_eq!(material.color.to_hex(), "#204060");
        assert!(!scene.mesh(ids[0]).unwrap().materials()[0].is_physical());
    }

    #[test]
    fn standard_material_ignores_physical_only_fields() {
        let (mut scene, ids) = scene_with(vec![vec![StandardMaterial::default().into()]]);
        let mut store = OverrideStore::new();
        store.reset(scene.generation());
        store.edit(ids[0], MaterialEdit::Transmission(0.0));
        store.edit(ids[0], MaterialEdit::Ior(1.8));
        apply_overrides(&mut scene, store.overrides());

        assert!(!scene.mesh(ids[0]).unwrap().materials()[0].is_physical());
    }

    #[test]
    fn zero_transmission_clears_derived_flags_on_physical() {
        let physical = PhysicalMaterial {
            transmission: 1.0,
            thickness: 1.0,
            ..PhysicalMaterial::default()
        };
        let mut material = Material::from(physical);
        let mut patch = MaterialPatch::default();
        patch.apply_edit(MaterialEdit::Transmission(0.0));
        patch.apply_edit(MaterialEdit::Ior(1.33));

        assert!(!apply_patch(&mut material, &patch));
        let physical = material.physical().unwrap();
        assert_eq!(physical.transmission, 0.0);
        assert_eq!(physical.thickness, 0.0);
        assert!(!physical.base.transparent);
        assert_eq!(physical.ior, 1.33);
    }

    #[test]
    fn every_material_slot_receives_the_override() {
        let (mut scene, ids) = scene_with(vec![vec![
            StandardMaterial::named("Outer").into(),
            StandardMaterial::named("Inner").into(),
        ]]);
        let mut store = OverrideStore::new();
        store.reset(scene.generation());
        store.apply_patch(ids[0], &MaterialPatch::glass());

        let stats = apply_overrides(&mut scene, store.overrides());
        assert_eq!(stats.meshes, 1);
        assert_eq!(stats.promoted, 2);
        for material in scene.mesh(ids[0]).unwrap().materials() {
            let physical = material.physical().unwrap();
            assert_eq!(physical.transmission, 1.0);
            assert_eq!(physical.ior, 1.0);
            assert_eq!(physical.base.roughness, 0.02);
        }
    }

    #[test]
    fn malformed_color_keeps_previous_color() {
        let mut material = Material::from(textured_standard());
        let mut patch = MaterialPatch::default();
        patch.apply_edit(MaterialEdit::Color("#zzzzzz".into()));
        apply_patch(&mut material, &patch);
        assert_eq!(material.standard().color.to_hex(), "#204060");
    }

    #[test]
    fn synchronizer_skips_unchanged_state() {
        let (mut scene, ids) = scene_with(vec![vec![StandardMaterial::default().into()]]);
        let mut store = OverrideStore::new();
        store.reset(scene.generation());
        let mut sync = MaterialSynchronizer::new();

        assert!(sync.sync(&mut scene, &store).is_some());
        assert!(sync.sync(&mut scene, &store).is_none());

        store.edit(ids[0], MaterialEdit::Metalness(1.0));
        let stats = sync.sync(&mut scene, &store).unwrap();
        assert_eq!(stats.meshes, 1);
        assert_eq!(
            scene.mesh(ids[0]).unwrap().materials()[0].standard().metalness,
            1.0
        );

        sync.invalidate();
        assert!(sync.sync(&mut scene, &store).is_some());
    }
}
