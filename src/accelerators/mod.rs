pub mod bvh;
pub mod octree;

/// Which structure accelerates a mesh's triangle lookups. The scene
/// level always uses the BVH.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MeshAccelKind {
    Bvh,
    Octree,
}

impl Default for MeshAccelKind {
    fn default() -> Self {
        MeshAccelKind::Bvh
    }
}
