//! Surface hit record produced by ray/shape intersection.

// lumiray
use crate::core::base::{Float, RAY_EPSILON};
use crate::core::frame::ShadingFrame;
use crate::core::geometry::{Ray, Vector2f, Vector3f};

/// Everything the integrators need at a hit point: world position, the
/// shading frame at the hit, the ray parameter, wrapped texture
/// coordinates, and the index of the hit shape in the scene.
#[derive(Debug, Clone)]
pub struct Intersection {
    pub p: Vector3f,
    pub frame: ShadingFrame,
    pub t: Float,
    pub uv: Vector2f,
    pub shape_index: usize,
}

impl Default for Intersection {
    fn default() -> Self {
        Intersection {
            p: Vector3f::zero(),
            frame: ShadingFrame::default(),
            t: Float::INFINITY,
            uv: Vector2f::new(Float::INFINITY, Float::INFINITY),
            shape_index: usize::MAX,
        }
    }
}

impl Intersection {
    /// Spawn the next path segment along a local-frame direction, nudged
    /// off the surface to avoid self-intersection.
    pub fn recursive_ray_to(&self, local_next_dir: &Vector3f) -> Ray {
        let world_d = self.frame.to_world(local_next_dir);
        Ray::new(self.p + world_d * RAY_EPSILON, world_d)
    }
}
