//! Scene geometry: shapes pair a geometric entity with a BSDF and an
//! optional area-light binding, plus the two ray/triangle kernels shared
//! by everything triangle-shaped.

// std
use std::ops::{Add, Mul};
use std::sync::Arc;
// lumiray
use crate::core::base::Float;
use crate::core::bsdf::Bsdf;
use crate::core::geometry::{Aabb, Ray, Vector3f};
use crate::core::interaction::Intersection;
use crate::core::sampler::Sampler;
use crate::shapes::mesh::TriangleMesh;
use crate::shapes::triangle::Triangle;

pub enum Geometry {
    Triangle(Triangle),
    Mesh(TriangleMesh),
}

/// A shape owns its geometry and BSDF; `area_light` is an index into the
/// scene's light array when this shape emits. The light stores the
/// reverse index, both resolved by the scene that owns the two arrays.
pub struct Shape {
    pub geometry: Geometry,
    pub bsdf: Arc<Bsdf>,
    pub area_light: Option<usize>,
}

impl Shape {
    pub fn new(geometry: Geometry, bsdf: Arc<Bsdf>) -> Self {
        Shape {
            geometry,
            bsdf,
            area_light: None,
        }
    }

    pub fn is_light(&self) -> bool {
        self.area_light.is_some()
    }

    pub fn ray_intersect(&self, ray: &Ray, maxt: Float) -> Option<Intersection> {
        match &self.geometry {
            Geometry::Triangle(t) => t.ray_intersect(ray, maxt),
            Geometry::Mesh(m) => m.ray_intersect(ray, maxt),
        }
    }

    pub fn aabb(&self) -> Aabb {
        match &self.geometry {
            Geometry::Triangle(t) => t.aabb(),
            Geometry::Mesh(m) => m.aabb(),
        }
    }

    pub fn center(&self) -> Vector3f {
        self.aabb().center()
    }

    pub fn area(&self) -> Float {
        match &self.geometry {
            Geometry::Triangle(t) => t.area(),
            Geometry::Mesh(m) => m.area(),
        }
    }

    /// Uniform point on the surface: `(point, world normal, area pdf)`.
    pub fn sample_point(&self, sampler: &mut Sampler) -> (Vector3f, Vector3f, Float) {
        match &self.geometry {
            Geometry::Triangle(t) => t.sample_point(sampler),
            Geometry::Mesh(m) => m.sample_point(sampler),
        }
    }

    /// Density of having sampled `shapepos` seen from `hitpos`, converted
    /// to the solid-angle measure: `d^2 / (|n . dir| area)`.
    pub fn pdf_solidangle(
        &self,
        hitpos_world: &Vector3f,
        shapepos_world: &Vector3f,
        shape_normal_world: &Vector3f,
    ) -> Float {
        let shape_to_hitpos = hitpos_world - shapepos_world;
        let dist_squared = shape_to_hitpos.dot(&shape_to_hitpos);
        let cos = shape_normal_world.dot(&shape_to_hitpos.normalize()).abs();
        dist_squared / (cos * self.area())
    }
}

/// Barycentric interpolation `a (1-u-v) + b u + c v`.
pub fn interpolate<T>(a: T, b: T, c: T, u: Float, v: Float) -> T
where
    T: Mul<Float, Output = T> + Add<Output = T> + Copy,
{
    a * (1.0 - u - v) + b * u + c * v
}

/// Moller-Trumbore ray/triangle intersection; `Some((u, v, t))` with
/// barycentrics in `[0, 1]`, `u + v <= 1`, `0 < t <= maxt`.
pub fn moller_trumbore(
    ray: &Ray,
    p0: &Vector3f,
    p1: &Vector3f,
    p2: &Vector3f,
    maxt: Float,
) -> Option<(Float, Float, Float)> {
    let d = &ray.d;

    let tvec = ray.o - p0;
    let e1 = p1 - p0;
    let e2 = p2 - p0;

    let de2 = Vector3f::cross(d, &e2);

    let denom = de2.dot(&e1);
    let denom_inv = 1.0 / denom;

    let te1 = Vector3f::cross(&tvec, &e1);

    let t = te1.dot(&e2) * denom_inv;
    if !t.is_finite() || t <= 0.0 || t > maxt {
        return None;
    }

    let v = te1.dot(d) * denom_inv;
    if !(0.0..=1.0).contains(&v) {
        return None;
    }

    let u = de2.dot(&tvec) * denom_inv;
    if u < 0.0 || 1.0 < u + v {
        return None;
    }

    Some((u, v, t))
}

/// Watertight ray/triangle intersection after Woop et al. (JCGT 2013):
/// shear the triangle into a ray-aligned space, evaluate the three edge
/// functions, and fall back to double precision when any of them is
/// exactly zero.
pub fn watertight_intersect(
    ray: &Ray,
    p0: &Vector3f,
    p1: &Vector3f,
    p2: &Vector3f,
    maxt: Float,
) -> Option<(Float, Float, Float)> {
    // dimension where the ray direction is maximal in absolute value
    let idx_z = if ray.d.x.abs() > ray.d.y.abs() {
        if ray.d.x.abs() > ray.d.z.abs() {
            0
        } else {
            2
        }
    } else if ray.d.y.abs() > ray.d.z.abs() {
        1
    } else {
        2
    };

    let mut idx_x = if idx_z == 2 { 0 } else { idx_z + 1 };
    let mut idx_y = if idx_x == 2 { 0 } else { idx_x + 1 };

    // swap to preserve triangle winding
    if ray.d[idx_z] < 0.0 {
        std::mem::swap(&mut idx_x, &mut idx_y);
    }

    // shear constants
    let sx = ray.d[idx_x] / ray.d[idx_z];
    let sy = ray.d[idx_y] / ray.d[idx_z];
    let sz = 1.0 / ray.d[idx_z];

    // vertices relative to the ray origin
    let a = p0 - ray.o;
    let b = p1 - ray.o;
    let c = p2 - ray.o;

    // shear and scale
    let ax = a[idx_x] - sx * a[idx_z];
    let ay = a[idx_y] - sy * a[idx_z];
    let bx = b[idx_x] - sx * b[idx_z];
    let by = b[idx_y] - sy * b[idx_z];
    let cx = c[idx_x] - sx * c[idx_z];
    let cy = c[idx_y] - sy * c[idx_z];

    // scaled barycentric edge functions
    let mut u = cx * by - cy * bx;
    let mut v = ax * cy - ay * cx;
    let mut w = bx * ay - by * ax;

    // exact-zero edge functions re-evaluate in double precision
    if u == 0.0 || v == 0.0 || w == 0.0 {
        let (cxd, cyd) = (cx as f64, cy as f64);
        let (bxd, byd) = (bx as f64, by as f64);
        let (axd, ayd) = (ax as f64, ay as f64);
        u = (cxd * byd - cyd * bxd) as Float;
        v = (axd * cyd - ayd * cxd) as Float;
        w = (bxd * ayd - byd * axd) as Float;
    }

    // double-sided: accept only when all three share a sign
    if (u < 0.0 || v < 0.0 || w < 0.0) && (u > 0.0 || v > 0.0 || w > 0.0) {
        return None;
    }

    let det = u + v + w;
    if det == 0.0 {
        return None;
    }

    // scaled hit distance
    let az = sz * a[idx_z];
    let bz = sz * b[idx_z];
    let cz = sz * c[idx_z];
    let t = u * az + v * bz + w * cz;

    if det > 0.0 && (t <= 0.0 || t > maxt * det) {
        return None;
    }
    if det <= 0.0 && (t >= 0.0 || t < maxt * det) {
        return None;
    }

    let inv_det = 1.0 / det;
    // reordered so the barycentrics line up with moller_trumbore
    Some((v * inv_det, w * inv_det, t * inv_det))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> (Vector3f, Vector3f, Vector3f) {
        (
            Vector3f::new(-0.24, 1.58, -0.22),
            Vector3f::new(0.23, 1.58, -0.22),
            Vector3f::new(-0.24, 1.58, 0.16),
        )
    }

    fn assert_uvt(got: Option<(Float, Float, Float)>, u: Float, v: Float, t: Float) {
        let (gu, gv, gt) = got.expect("expected a hit");
        assert!((gu - u).abs() < 1e-4, "u: {} vs {}", gu, u);
        assert!((gv - v).abs() < 1e-4, "v: {} vs {}", gv, v);
        assert!((gt - t).abs() < 1e-4, "t: {} vs {}", gt, t);
    }

    #[test]
    fn moller_trumbore_known_hits() {
        let (p0, p1, p2) = tri();
        let r = Ray::new(
            Vector3f::new(-0.868556, 0.0, 0.134),
            Vector3f::new(0.37142, 0.92271, -0.103212),
        );
        assert_uvt(
            moller_trumbore(&r, &p0, &p1, &p2, Float::INFINITY),
            0.015839,
            0.466487,
            1.71235,
        );

        let r = Ray::new(
            Vector3f::new(-0.995326, 0.0600852, -0.614505),
            Vector3f::new(0.47721, 0.807191, 0.347438),
        );
        assert_uvt(
            moller_trumbore(&r, &p0, &p1, &p2, Float::INFINITY),
            0.304777,
            0.683443,
            1.88297,
        );
    }

    #[test]
    fn moller_trumbore_rejects_outside() {
        let (p0, p1, p2) = tri();
        // passes over the plane outside the triangle
        let r = Ray::new(
            Vector3f::new(-1.01365, 0.580243, 0.813654),
            Vector3f::new(0.665883, 0.602144, -0.44048),
        );
        assert!(moller_trumbore(&r, &p0, &p1, &p2, Float::INFINITY).is_none());
    }

    #[test]
    fn moller_trumbore_respects_maxt() {
        let (p0, p1, p2) = tri();
        let r = Ray::new(
            Vector3f::new(-0.868556, 0.0, 0.134),
            Vector3f::new(0.37142, 0.92271, -0.103212),
        );
        assert!(moller_trumbore(&r, &p0, &p1, &p2, 1.0).is_none());
        assert!(moller_trumbore(&r, &p0, &p1, &p2, 2.0).is_some());
    }

    #[test]
    fn watertight_agrees_with_moller_trumbore() {
        let (p0, p1, p2) = tri();
        let rays = [
            (
                Vector3f::new(-0.868556, 0.0, 0.134),
                Vector3f::new(0.37142, 0.92271, -0.103212),
            ),
            (
                Vector3f::new(-0.995326, 0.0600852, -0.614505),
                Vector3f::new(0.47721, 0.807191, 0.347438),
            ),
        ];
        for (o, d) in rays.iter() {
            let r = Ray::new(*o, *d);
            let mt = moller_trumbore(&r, &p0, &p1, &p2, Float::INFINITY).unwrap();
            let wt = watertight_intersect(&r, &p0, &p1, &p2, Float::INFINITY).unwrap();
            assert!((mt.0 - wt.0).abs() < 1e-3);
            assert!((mt.1 - wt.1).abs() < 1e-3);
            assert!((mt.2 - wt.2).abs() < 1e-3);
        }
    }

    #[test]
    fn degenerate_triangle_misses() {
        let p = Vector3f::new(0.0, 1.0, 0.0);
        let r = Ray::new(Vector3f::new(0.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0));
        assert!(moller_trumbore(&r, &p, &p, &p, Float::INFINITY).is_none());
        assert!(watertight_intersect(&r, &p, &p, &p, Float::INFINITY).is_none());
    }

    #[test]
    fn watertight_hits_from_both_sides() {
        let (p0, p1, p2) = tri();
        let above = Ray::new(Vector3f::new(-0.1, 2.0, 0.0), Vector3f::new(0.0, -1.0, 0.0));
        let below = Ray::new(Vector3f::new(-0.1, 1.0, 0.0), Vector3f::new(0.0, 1.0, 0.0));
        assert!(watertight_intersect(&above, &p0, &p1, &p2, Float::INFINITY).is_some());
        assert!(watertight_intersect(&below, &p0, &p1, &p2, Float::INFINITY).is_some());
    }
}
