//! The scene owns every rendering entity: shapes, lights, the camera,
//! the top-level BVH, and the power-weighted light-selection
//! distribution. After `build()` everything is immutable for the whole
//! render.

// others
use anyhow::{ensure, Result};
// lumiray
use crate::accelerators::bvh::{Bvh, BvhPrimitives};
use crate::core::base::{Float, Spectrum, RAY_EPSILON, VISIBILITY_EPSILON};
use crate::core::camera::Camera;
use crate::core::geometry::{Aabb, Ray, Vector3f};
use crate::core::interaction::Intersection;
use crate::core::light::Light;
use crate::core::sampler::Sampler;
use crate::core::sampling::Distribution1D;
use crate::core::shape::Shape;
use crate::lights::area::AreaLight;

pub struct Scene {
    pub shapes: Vec<Shape>,
    pub lights: Vec<Light>,
    pub camera: Camera,
    pub env_light: Option<usize>,
    pub aabb: Aabb,
    pub center: Vector3f,
    pub radius: Float,
    accel: Option<Bvh>,
    /// Precomputed distribution over lights by power. Light picking
    /// itself is uniform; this is kept alongside it for diagnostics and
    /// power-proportional queries.
    pub light_distrib: Distribution1D,
}

/// Adapts the shape array to the BVH; the traversal stamps the shape
/// index into the returned hit.
struct SceneAccessor<'a> {
    shapes: &'a [Shape],
}

impl<'a> BvhPrimitives for SceneAccessor<'a> {
    fn aabb(&self, prim: u32) -> Aabb {
        self.shapes[prim as usize].aabb()
    }
    fn center(&self, prim: u32) -> Vector3f {
        self.shapes[prim as usize].center()
    }
    fn intersect(&self, prim: u32, ray: &Ray, maxt: Float) -> Option<Intersection> {
        let mut info = self.shapes[prim as usize].ray_intersect(ray, maxt)?;
        info.shape_index = prim as usize;
        Some(info)
    }
}

impl Scene {
    pub fn new(camera: Camera) -> Scene {
        Scene {
            shapes: Vec::new(),
            lights: Vec::new(),
            camera,
            env_light: None,
            aabb: Aabb::default(),
            center: Vector3f::zero(),
            radius: 0.0,
            accel: None,
            light_distrib: Distribution1D::default(),
        }
    }

    pub fn add_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Add an emitting shape: the shape and its area light end up
    /// referencing each other by index.
    pub fn add_shape_with_area_light(&mut self, mut shape: Shape, radiance: Spectrum) -> usize {
        let shape_index = self.shapes.len();
        let light_index = self.lights.len();
        shape.area_light = Some(light_index);
        self.shapes.push(shape);
        self.lights
            .push(Light::Area(AreaLight::new(shape_index, radiance)));
        shape_index
    }

    pub fn add_light(&mut self, light: Light) -> usize {
        let index = self.lights.len();
        if light.is_envlight() {
            self.env_light = Some(index);
        }
        self.lights.push(light);
        index
    }

    /// Freeze the scene: compute the bound, tell the environment lights
    /// how large the world is, build the light-selection distribution
    /// from light powers, and build the top-level BVH.
    pub fn build(&mut self) -> Result<()> {
        ensure!(!self.shapes.is_empty(), "scene has no shapes");

        let mut aabb = Aabb::default();
        for shape in self.shapes.iter() {
            aabb = Aabb::merge(&aabb, &shape.aabb());
        }
        self.aabb = aabb;
        self.center = aabb.center();
        self.radius = (aabb.max - self.center).length();

        let radius = self.radius;
        for light in self.lights.iter_mut() {
            light.set_scene_radius(radius);
        }

        if !self.lights.is_empty() {
            let powers: Vec<Float> = self.lights.iter().map(|l| l.power(self)).collect();
            self.light_distrib = Distribution1D::new(powers);
        }

        log::info!(
            "building scene BVH over {} shapes, {} lights",
            self.shapes.len(),
            self.lights.len()
        );
        let accessor = SceneAccessor {
            shapes: &self.shapes,
        };
        let accel = Bvh::build((0..self.shapes.len() as u32).collect(), &accessor);
        self.accel = Some(accel);
        Ok(())
    }

    pub fn ray_intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.ray_intersect_maxt(ray, Float::INFINITY)
    }

    pub fn ray_intersect_maxt(&self, ray: &Ray, maxt: Float) -> Option<Intersection> {
        let accel = self
            .accel
            .as_ref()
            .expect("Scene::build must run before tracing");
        let accessor = SceneAccessor {
            shapes: &self.shapes,
        };
        accel.ray_intersect(ray, maxt, &accessor)
    }

    /// Mutual visibility of two world points, with the shadow ray offset
    /// off its origin and a tolerance at the target so hitting the
    /// target surface itself counts as visible.
    pub fn is_visible(&self, pos1: &Vector3f, pos2: &Vector3f) -> bool {
        let to_pos2 = pos2 - pos1;
        let dir = to_pos2.normalize();
        let len = to_pos2.length();
        let ray = Ray::new(pos1 + dir * RAY_EPSILON, dir);

        match self.ray_intersect_maxt(&ray, len) {
            None => true,
            Some(info) => (len - info.t).abs() <= VISIBILITY_EPSILON,
        }
    }

    /// Draw a light uniformly; returns the light index and the
    /// selection probability `1 / |lights|`.
    pub fn sample_light(&self, sampler: &mut Sampler) -> (usize, Float) {
        let len = self.lights.len();
        let index = ((sampler.sample_1d() * len as Float) as usize).min(len - 1);
        (index, 1.0 / len as Float)
    }

    /// Selection probability of any light, `1 / |lights|`, for MIS
    /// weights on the BSDF-sampling side.
    pub fn pdf_light(&self, _index: usize) -> Float {
        1.0 / self.lights.len() as Float
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cameras::pinhole::Pinhole;
    use crate::core::bsdf::Bsdf;
    use crate::core::shape::Geometry;
    use crate::bsdfs::diffuse::Diffuse;
    use crate::shapes::triangle::Triangle;
    use std::sync::Arc;

    fn test_camera() -> Camera {
        Camera::Pinhole(Pinhole::new(
            Vector3f::new(0.0, 0.0, -5.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            16,
            16,
            45.0,
        ))
    }

    fn diffuse() -> Arc<Bsdf> {
        Arc::new(Bsdf::Diffuse(Diffuse::new(Spectrum::splat(0.5))))
    }

    fn wall(z: Float, size: Float) -> Triangle {
        Triangle::new(
            Vector3f::new(-size, -size, z),
            Vector3f::new(size, -size, z),
            Vector3f::new(-size, size, z),
        )
    }

    fn build_scene() -> Scene {
        let mut scene = Scene::new(test_camera());
        scene.add_shape(Shape::new(Geometry::Triangle(wall(0.0, 2.0)), diffuse()));
        scene.add_shape_with_area_light(
            Shape::new(Geometry::Triangle(wall(3.0, 1.0)), diffuse()),
            Spectrum::splat(10.0),
        );
        scene.build().unwrap();
        scene
    }

    #[test]
    fn shape_light_back_references_resolve() {
        let scene = build_scene();
        assert!(!scene.shapes[0].is_light());
        assert!(scene.shapes[1].is_light());
        let light_idx = scene.shapes[1].area_light.unwrap();
        match &scene.lights[light_idx] {
            Light::Area(area) => assert_eq!(area.shape_index, 1),
            _ => panic!("expected an area light"),
        }
    }

    #[test]
    fn visibility_respects_occluders() {
        let scene = build_scene();
        // the wall at z=0 blocks the segment crossing it
        let a = Vector3f::new(-0.5, -0.5, -1.0);
        let b = Vector3f::new(-0.5, -0.5, 1.0);
        assert!(!scene.is_visible(&a, &b));
        // a segment ending on the wall surface is "visible" to it
        let on_wall = Vector3f::new(-0.5, -0.5, 0.0);
        assert!(scene.is_visible(&a, &on_wall));
        // a segment off to the side misses everything
        let c = Vector3f::new(5.0, 5.0, -1.0);
        let d = Vector3f::new(5.0, 5.0, 1.0);
        assert!(scene.is_visible(&c, &d));
    }

    #[test]
    fn light_selection_is_uniform() {
        let scene = build_scene();
        let total: Float = (0..scene.lights.len()).map(|i| scene.pdf_light(i)).sum();
        assert!((total - 1.0).abs() < 1e-6);
        let mut sampler = Sampler::new(1, 1);
        for _ in 0..32 {
            let (idx, pdf) = scene.sample_light(&mut sampler);
            assert!(idx < scene.lights.len());
            assert_eq!(pdf, 1.0 / scene.lights.len() as Float);
        }
        // the power-weighted distribution is built alongside but does
        // not drive the pick
        let power_total: Float = (0..scene.lights.len())
            .map(|i| scene.light_distrib.pdf(i))
            .sum();
        assert!((power_total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn intersection_carries_shape_index() {
        let scene = build_scene();
        let ray = Ray::new(Vector3f::new(-0.5, -0.5, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        let hit = scene.ray_intersect(&ray).expect("hit the front wall");
        assert_eq!(hit.shape_index, 0);
        assert!((hit.t - 5.0).abs() < 1e-4);
    }
}
