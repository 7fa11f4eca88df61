//! Orthonormal shading basis. Local space puts the shading normal on
//! `+z`, so the cosine of an angle to the normal is just `v.z`.

// lumiray
use crate::core::geometry::Vector3f;

#[derive(Debug, Copy, Clone)]
pub struct ShadingFrame {
    pub n: Vector3f,
    pub t: Vector3f,
    pub b: Vector3f,
}

impl Default for ShadingFrame {
    fn default() -> Self {
        ShadingFrame {
            n: Vector3f::new(0.0, 0.0, 1.0),
            t: Vector3f::new(1.0, 0.0, 0.0),
            b: Vector3f::new(0.0, 1.0, 0.0),
        }
    }
}

impl ShadingFrame {
    pub fn new(world_normal: Vector3f) -> Self {
        let n = world_normal.normalize();
        let t = if n.x.abs() < 1e-7 && n.z.abs() < 1e-7 {
            Vector3f::new(n.y, -n.x, 0.0).normalize()
        } else {
            Vector3f::new(n.z, 0.0, -n.x).normalize()
        };
        let b = Vector3f::cross(&n, &t);
        ShadingFrame { n, t, b }
    }

    pub fn to_world(&self, local: &Vector3f) -> Vector3f {
        self.t * local.x + self.b * local.y + self.n * local.z
    }

    pub fn to_local(&self, world: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.t.dot(world),
            self.b.dot(world),
            self.n.dot(world),
        )
    }
}
