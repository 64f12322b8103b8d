pub mod material;
pub mod overrides;
pub mod selection;

use glam::Vec3;
use std::fmt;

use material::Material;

/// Identity of one mesh within one loaded model.
///
/// Ids carry the load generation they were allocated in, so an id kept
/// around from a previous model never resolves against the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId {
    generation: u32,
    index: u32,
}

impl MeshId {
    pub(crate) fn new(generation: u32, index: u32) -> Self {
        Self { generation, index }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mesh {}:{}", self.generation, self.index)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_extent(center: Vec3, half_extent: Vec3) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.min + self.max) * 0.5
        }
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    /// Distance along the ray to the first intersection, `0.0` when the
    /// origin is inside the box.
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        let inv = direction.recip();
        let t1 = (self.min - origin) * inv;
        let t2 = (self.max - origin) * inv;
        let t_near = t1.min(t2).max_element().max(0.0);
        let t_far = t1.max(t2).min_element();
        if t_far.is_nan() || t_near.is_nan() || t_far < t_near {
            None
        } else {
            Some(t_near)
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// A mesh as handed over by the model loader, before it has an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDesc {
    pub name: String,
    pub materials: Vec<Material>,
    pub bounds: Aabb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshNode {
    id: MeshId,
    name: String,
    materials: Vec<Material>,
    bounds: Aabb,
}

impl MeshNode {
    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// All material slots; most meshes have exactly one.
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.materials
    }

    /// First material slot, the one the editor reads and glass detection inspects.
    pub fn primary_material(&self) -> Option<&Material> {
        self.materials.first()
    }
}

/// Arena of the meshes of the currently loaded model.
#[derive(Debug, Default)]
pub struct SceneGraph {
    generation: u32,
    nodes: Vec<MeshNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Replace the scene contents. Every id handed out before is invalidated.
    pub fn load(&mut self, meshes: Vec<MeshDesc>) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.nodes = meshes
            .into_iter()
            .enumerate()
            .map(|(index, desc)| MeshNode {
                id: MeshId::new(generation, index as u32),
                name: desc.name,
                materials: desc.materials,
                bounds: desc.bounds,
            })
            .collect();
        generation
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshNode> {
        if id.generation != self.generation {
            return None;
        }
        self.nodes.get(id.index as usize)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&MeshNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshNode> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MeshNode> {
        self.nodes.iter_mut()
    }

    /// Union of every mesh's bounds.
    pub fn bounds(&self) -> Aabb {
        self.nodes
            .iter()
            .fold(Aabb::EMPTY, |acc, node| acc.union(&node.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::material::StandardMaterial;
    use super::*;

    fn desc(name: &str, center: Vec3) -> MeshDesc {
        MeshDesc {
            name: name.to_string(),
            materials: vec![StandardMaterial::named(name).into()],
            bounds: Aabb::from_center_extent(center, Vec3::splat(0.5)),
        }
    }

    #[test]
    fn load_allocates_ids_in_a_new_generation() {
        let mut scene = SceneGraph::new();
        let first = scene.load(vec![desc("a", Vec3::ZERO), desc("b", Vec3::X)]);
        let ids: Vec<MeshId> = scene.iter().map(|node| node.id()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|id| id.generation() == first));

        let second = scene.load(vec![desc("c", Vec3::ZERO)]);
        assert_ne!(first, second);
        assert!(scene.mesh(ids[0]).is_none());
        assert_eq!(scene.iter().next().unwrap().name(), "c");
    }

    #[test]
    fn bounds_cover_every_mesh() {
        let mut scene = SceneGraph::new();
        assert!(scene.bounds().is_empty());
        scene.load(vec![desc("a", Vec3::ZERO), desc("b", Vec3::new(2.0, 0.0, 0.0))]);
        let bounds = scene.bounds();
        assert_eq!(bounds.min, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(bounds.max, Vec3::new(2.5, 0.5, 0.5));
        assert_eq!(bounds.center(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(bounds.size(), Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn ray_hits_box_in_front_and_misses_box_behind() {
        let bounds = Aabb::from_center_extent(Vec3::new(0.0, 0.0, -5.0), Vec3::ONE);
        let hit = bounds.ray_intersection(Vec3::ZERO, Vec3::NEG_Z).unwrap();
        assert!((hit - 4.0).abs() < 1e-5);
        assert!(bounds.ray_intersection(Vec3::ZERO, Vec3::Z).is_none());
        assert!(bounds
            .ray_intersection(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Z)
            .is_none());
    }
}
