//! A single triangle, either standing alone in the scene or materialised
//! on demand as a view into a mesh's vertex arrays.

// lumiray
use crate::core::base::Float;
use crate::core::frame::ShadingFrame;
use crate::core::geometry::{Aabb, Ray, Vector2f, Vector3f};
use crate::core::interaction::Intersection;
use crate::core::sampler::Sampler;
use crate::core::shape::interpolate;
#[cfg(feature = "moller-trumbore")]
use crate::core::shape::moller_trumbore;
#[cfg(not(feature = "moller-trumbore"))]
use crate::core::shape::watertight_intersect;

#[derive(Debug, Clone)]
pub struct Triangle {
    pub p0: Vector3f,
    pub p1: Vector3f,
    pub p2: Vector3f,
    normals: Option<[Vector3f; 3]>,
    uvs: Option<[Vector2f; 3]>,
}

impl Triangle {
    pub fn new(p0: Vector3f, p1: Vector3f, p2: Vector3f) -> Self {
        Triangle {
            p0,
            p1,
            p2,
            normals: None,
            uvs: None,
        }
    }

    pub fn with_normals(mut self, n0: Vector3f, n1: Vector3f, n2: Vector3f) -> Self {
        self.normals = Some([n0, n1, n2]);
        self
    }

    pub fn with_uvs(mut self, uv0: Vector2f, uv1: Vector2f, uv2: Vector2f) -> Self {
        self.uvs = Some([uv0, uv1, uv2]);
        self
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::merge(
            &Aabb::new(self.p0, self.p1),
            &Aabb::new(self.p2, self.p2),
        )
    }

    pub fn center(&self) -> Vector3f {
        self.aabb().center()
    }

    pub fn area(&self) -> Float {
        Vector3f::cross(&(self.p1 - self.p0), &(self.p2 - self.p0)).length() * 0.5
    }

    fn geometric_normal(&self) -> Vector3f {
        Vector3f::cross(&(self.p1 - self.p0), &(self.p2 - self.p0)).normalize()
    }

    /// Uniform surface point via the square-root warp over barycentrics:
    /// `(point, world normal, 1/area)`.
    pub fn sample_point(&self, sampler: &mut Sampler) -> (Vector3f, Vector3f, Float) {
        let u = sampler.sample_1d();
        let v = sampler.sample_1d();
        let x = 1.0 - (1.0 - u).sqrt();
        let y = v * (1.0 - u).sqrt();

        let normal = match &self.normals {
            Some([n0, n1, n2]) => interpolate(*n0, *n1, *n2, x, y).normalize(),
            None => self.geometric_normal(),
        };
        (
            interpolate(self.p0, self.p1, self.p2, x, y),
            normal,
            1.0 / self.area(),
        )
    }

    pub fn ray_intersect(&self, ray: &Ray, maxt: Float) -> Option<Intersection> {
        #[cfg(feature = "moller-trumbore")]
        let hit = moller_trumbore(ray, &self.p0, &self.p1, &self.p2, maxt);
        #[cfg(not(feature = "moller-trumbore"))]
        let hit = watertight_intersect(ray, &self.p0, &self.p1, &self.p2, maxt);

        let (u, v, t) = hit?;

        let mut uv = match &self.uvs {
            Some([uv0, uv1, uv2]) => interpolate(*uv0, *uv1, *uv2, u, v),
            None => Vector2f::new(u, v),
        };
        uv.x -= uv.x.floor();
        uv.y -= uv.y.floor();

        let normal = match &self.normals {
            Some([n0, n1, n2]) => interpolate(*n0, *n1, *n2, u, v).normalize(),
            None => self.geometric_normal(),
        };

        Some(Intersection {
            p: interpolate(self.p0, self.p1, self.p2, u, v),
            frame: ShadingFrame::new(normal),
            t,
            uv,
            ..Intersection::default()
        })
    }
}
