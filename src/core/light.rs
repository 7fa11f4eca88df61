//! Light sources. All variants share one contract: sample a direct
//! contribution toward a shading point (with the visibility test against
//! the scene folded in), evaluate their pdf over solid angle, report
//! emitted radiance along a ray, and expose the power that drives the
//! scene's light-selection distribution.
//!
//! For the point light and the environment lights the returned direct
//! contribution already carries the `1/d^2` falloff or the `1/pdf`
//! direction factor; the area light returns raw radiance and the
//! integrator divides by the solid-angle pdf explicitly, so that it can
//! weight the sample with MIS.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::geometry::Vector3f;
use crate::core::interaction::Intersection;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::lights::area::AreaLight;
use crate::lights::constant_env::ConstantEnvLight;
use crate::lights::image_env::ImageEnvLight;
use crate::lights::point::PointLight;

/// A sampled point on a light: its contribution toward the receiver,
/// the sampled position and surface normal, and the area pdf of the
/// position sample.
#[derive(Debug, Clone)]
pub struct DirectSample {
    pub radiance: Spectrum,
    pub light_pos: Vector3f,
    pub light_normal: Vector3f,
    pub pdf: Float,
}

impl DirectSample {
    pub fn blocked(pdf: Float) -> Self {
        DirectSample {
            radiance: Spectrum::zero(),
            light_pos: Vector3f::zero(),
            light_normal: Vector3f::zero(),
            pdf,
        }
    }
}

pub enum Light {
    Point(PointLight),
    Area(AreaLight),
    ConstantEnv(ConstantEnvLight),
    ImageEnv(ImageEnvLight),
}

impl Light {
    pub fn sample_direct_contribution(
        &self,
        scene: &Scene,
        hit: &Intersection,
        sampler: &mut Sampler,
    ) -> DirectSample {
        match self {
            Light::Point(l) => l.sample_direct_contribution(scene, hit, sampler),
            Light::Area(l) => l.sample_direct_contribution(scene, hit, sampler),
            Light::ConstantEnv(l) => l.sample_direct_contribution(scene, hit, sampler),
            Light::ImageEnv(l) => l.sample_direct_contribution(scene, hit, sampler),
        }
    }

    /// Solid-angle density of sampling `lightpos` from `hitpos`;
    /// meaningless (zero) for delta lights.
    pub fn pdf_solidangle(
        &self,
        scene: &Scene,
        hitpos: &Vector3f,
        lightpos: &Vector3f,
        light_normal: &Vector3f,
    ) -> Float {
        match self {
            Light::Point(l) => l.pdf_solidangle(hitpos, lightpos, light_normal),
            Light::Area(l) => l.pdf_solidangle(scene, hitpos, lightpos, light_normal),
            Light::ConstantEnv(l) => l.pdf_solidangle(hitpos, lightpos, light_normal),
            Light::ImageEnv(l) => l.pdf_solidangle(hitpos, lightpos, light_normal),
        }
    }

    /// Radiance emitted toward `hitpos`; delta lights are never hit by a
    /// traced ray and report zero.
    pub fn radiance(
        &self,
        hitpos: &Vector3f,
        lightpos: &Vector3f,
        light_normal: &Vector3f,
    ) -> Spectrum {
        match self {
            Light::Point(l) => l.radiance(hitpos, lightpos, light_normal),
            Light::Area(l) => l.radiance(hitpos, lightpos, light_normal),
            Light::ConstantEnv(l) => l.radiance(hitpos, lightpos, light_normal),
            Light::ImageEnv(l) => l.radiance(hitpos, lightpos, light_normal),
        }
    }

    pub fn power(&self, scene: &Scene) -> Float {
        match self {
            Light::Point(l) => l.power(),
            Light::Area(l) => l.power(scene),
            Light::ConstantEnv(l) => l.power(),
            Light::ImageEnv(l) => l.power(),
        }
    }

    pub fn is_delta(&self) -> bool {
        matches!(self, Light::Point(_))
    }

    pub fn is_envlight(&self) -> bool {
        matches!(self, Light::ConstantEnv(_) | Light::ImageEnv(_))
    }

    /// Environment lights need the scene extent to place their samples;
    /// called once after the scene bound is known.
    pub fn set_scene_radius(&mut self, radius: Float) {
        match self {
            Light::ConstantEnv(l) => l.set_scene_radius(radius),
            Light::ImageEnv(l) => l.set_scene_radius(radius),
            Light::Point(_) | Light::Area(_) => {}
        }
    }
}
