//! Model loading boundary.
//!
//! Parsing the asset format belongs to the host engine; it hands the viewer
//! a [`ModelData`] through a [`ModelLoader`]. The built-in sample model lets
//! the viewer run without any engine attached.

use glam::Vec3;
use std::path::Path;

use crate::animation::AnimationClip;
use crate::scene::material::{
    Color, PhysicalMaterial, StandardMaterial, TextureHandle, TextureMaps,
};
use crate::scene::{Aabb, MeshDesc};

pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["glb", "gltf"];

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("unsupported model format: {path} (expected .glb or .gltf)")]
    UnsupportedFormat { path: String },
    #[error("model {path} contains no meshes")]
    Empty { path: String },
}

/// Everything the viewer needs from one parsed model file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshDesc>,
    pub clips: Vec<AnimationClip>,
}

pub trait ModelLoader {
    fn load(&mut self, path: &Path) -> Result<ModelData, AssetError>;
}

pub fn check_supported(path: &Path) -> Result<(), AssetError> {
    let supported = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
        .unwrap_or(false);
    if supported {
        Ok(())
    } else {
        Err(AssetError::UnsupportedFormat {
            path: path.display().to_string(),
        })
    }
}

/// Run `loader` on `path` after checking the extension, rejecting empty models.
pub fn load_model(loader: &mut dyn ModelLoader, path: &Path) -> Result<ModelData, AssetError> {
    check_supported(path)?;
    let model = loader.load(path)?;
    if model.meshes.is_empty() {
        return Err(AssetError::Empty {
            path: path.display().to_string(),
        });
    }
    log::info!(
        "Loaded model '{}' from {} ({} meshes, {} clips)",
        model.name,
        path.display(),
        model.meshes.len(),
        model.clips.len()
    );
    Ok(model)
}

/// A display case: metal frame, hinged glass lid, brass and rubber hinge,
/// and a four second lid-opening clip.
pub fn sample_model() -> ModelData {
    let frame = StandardMaterial {
        name: "Metal_Frame".to_string(),
        color: Color::new(0.55, 0.56, 0.58),
        roughness: 0.35,
        metalness: 0.9,
        maps: TextureMaps {
            normal: Some(TextureHandle(1)),
            ..TextureMaps::default()
        },
        ..StandardMaterial::default()
    };
    let lid = StandardMaterial {
        name: "Glass_Outer".to_string(),
        color: Color::new(0.85, 0.9, 0.95),
        roughness: 0.1,
        metalness: 0.0,
        ..StandardMaterial::default()
    };
    let plinth = PhysicalMaterial {
        base: StandardMaterial {
            name: "Lacquer".to_string(),
            color: Color::new(0.08, 0.08, 0.1),
            roughness: 0.2,
            ..StandardMaterial::default()
        },
        ior: 1.45,
        ..PhysicalMaterial::default()
    };

    ModelData {
        name: "display_case".to_string(),
        meshes: vec![
            MeshDesc {
                name: "Frame".to_string(),
                materials: vec![frame.into()],
                bounds: Aabb::new(Vec3::new(-1.0, 0.0, -0.6), Vec3::new(1.0, 1.2, 0.6)),
            },
            MeshDesc {
                name: "Lid".to_string(),
                materials: vec![lid.into()],
                bounds: Aabb::new(Vec3::new(-0.95, 1.2, -0.55), Vec3::new(0.95, 1.3, 0.55)),
            },
            MeshDesc {
                name: "Hinge".to_string(),
                materials: vec![
                    StandardMaterial {
                        name: "Brass".to_string(),
                        color: Color::new(0.78, 0.6, 0.25),
                        roughness: 0.3,
                        metalness: 1.0,
                        ..StandardMaterial::default()
                    }
                    .into(),
                    StandardMaterial::named("Rubber").into(),
                ],
                bounds: Aabb::new(Vec3::new(-0.9, 1.15, -0.65), Vec3::new(0.9, 1.25, -0.55)),
            },
            MeshDesc {
                name: "Plinth".to_string(),
                materials: vec![plinth.into()],
                bounds: Aabb::new(Vec3::new(-1.2, -0.3, -0.8), Vec3::new(1.2, 0.0, 0.8)),
            },
        ],
        clips: vec![AnimationClip::new("LidOpen", 4.0)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct FixtureLoader {
        model: ModelData,
        calls: usize,
    }

    impl ModelLoader for FixtureLoader {
        fn load(&mut self, _path: &Path) -> Result<ModelData, AssetError> {
            self.calls += 1;
            Ok(self.model.clone())
        }
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(check_supported(Path::new("case.GLB")).is_ok());
        assert!(check_supported(Path::new("scene.gltf")).is_ok());
        assert!(matches!(
            check_supported(Path::new("mesh.obj")),
            Err(AssetError::UnsupportedFormat { .. })
        ));
        assert!(check_supported(Path::new("no_extension")).is_err());
    }

    #[test]
    fn unsupported_path_never_reaches_the_loader() {
        let mut loader = FixtureLoader {
            model: sample_model(),
            calls: 0,
        };
        assert!(load_model(&mut loader, &PathBuf::from("case.fbx")).is_err());
        assert_eq!(loader.calls, 0);
        assert!(load_model(&mut loader, &PathBuf::from("case.glb")).is_ok());
        assert_eq!(loader.calls, 1);
    }

    #[test]
    fn empty_model_is_rejected() {
        let mut loader = FixtureLoader {
            model: ModelData {
                name: "empty".into(),
                meshes: Vec::new(),
                clips: Vec::new(),
            },
            calls: 0,
        };
        assert!(matches!(
            load_model(&mut loader, Path::new("empty.glb")),
            Err(AssetError::Empty { .. })
        ));
    }

    #[test]
    fn sample_model_has_one_glass_mesh_and_a_clip() {
        let model = sample_model();
        let glass: Vec<&str> = model
            .meshes
            .iter()
            .filter(|mesh| {
                mesh.materials[0]
                    .name()
                    .to_lowercase()
                    .contains("glass")
            })
            .map(|mesh| mesh.name.as_str())
            .collect();
        assert_eq!(glass, vec!["Lid"]);
        assert_eq!(model.clips[0].duration, 4.0);
    }
}
