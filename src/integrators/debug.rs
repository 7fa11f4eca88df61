//! Debug integrators writing a trivial function of the primary hit.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;

pub fn depth(scene: &Scene, x: Float, y: Float, sampler: &mut Sampler) -> Spectrum {
    let ray = scene.camera.sample_ray(x, y, sampler);
    match scene.ray_intersect(&ray) {
        Some(info) => Spectrum::splat(info.t),
        None => Spectrum::zero(),
    }
}

pub fn uv(scene: &Scene, x: Float, y: Float, sampler: &mut Sampler) -> Spectrum {
    let ray = scene.camera.sample_ray(x, y, sampler);
    match scene.ray_intersect(&ray) {
        Some(info) => Spectrum::new(info.uv.x, info.uv.y, 0.0),
        None => Spectrum::zero(),
    }
}

pub fn hitpos(scene: &Scene, x: Float, y: Float, sampler: &mut Sampler) -> Spectrum {
    let ray = scene.camera.sample_ray(x, y, sampler);
    match scene.ray_intersect(&ray) {
        Some(info) => info.p,
        None => Spectrum::zero(),
    }
}

pub fn normal(scene: &Scene, x: Float, y: Float, sampler: &mut Sampler) -> Spectrum {
    let ray = scene.camera.sample_ray(x, y, sampler);
    match scene.ray_intersect(&ray) {
        Some(info) => info.frame.n,
        None => Spectrum::zero(),
    }
}
