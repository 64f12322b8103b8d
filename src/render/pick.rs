//! Pointer picking against mesh bounds.
//!
//! A click becomes a ray through the camera; the nearest mesh whose world
//! bounds the ray enters is the hit. A ray that enters nothing is a true
//! empty-space click and reported as [`PickHit::Missed`].

use glam::{Vec2, Vec3};

use crate::render::camera::CameraController;
use crate::scene::{MeshId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickHit {
    Mesh { id: MeshId, distance: f32 },
    Missed,
}

impl PickHit {
    pub fn mesh(&self) -> Option<MeshId> {
        match self {
            PickHit::Mesh { id, .. } => Some(*id),
            PickHit::Missed => None,
        }
    }

    pub fn is_missed(&self) -> bool {
        matches!(self, PickHit::Missed)
    }
}

/// World-space ray from the camera through `ndc` (`-1..=1` on both axes, +Y up).
pub fn camera_ray(camera: &CameraController, ndc: Vec2) -> Ray {
    let (forward, right, up) = camera.basis();
    let tan_half = (camera.fov_y_radians() / 2.0).tan();
    let direction = forward
        + right * (ndc.x * tan_half * camera.aspect)
        + up * (ndc.y * tan_half);
    Ray {
        origin: camera.position,
        direction: direction.normalize_or_zero(),
    }
}

pub fn pick(scene: &SceneGraph, ray: &Ray) -> PickHit {
    let mut best: Option<(MeshId, f32)> = None;
    for node in scene.iter() {
        let Some(distance) = node.bounds().ray_intersection(ray.origin, ray.direction) else {
            continue;
        };
        if best.map_or(true, |(_, nearest)| distance < nearest) {
            best = Some((node.id(), distance));
        }
    }
    match best {
        Some((id, distance)) => PickHit::Mesh { id, distance },
        None => PickHit::Missed,
    }
}
