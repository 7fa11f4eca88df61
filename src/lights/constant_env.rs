//! Environment light with constant radiance in every direction, sampled
//! uniformly over the sphere.

// lumiray
use crate::core::base::{luminance, Float, Spectrum, INV_4_PI, PI};
use crate::core::geometry::Vector3f;
use crate::core::interaction::Intersection;
use crate::core::light::DirectSample;
use crate::core::sampler::Sampler;
use crate::core::sampling::sample_unit_sphere_uniformly;
use crate::core::scene::Scene;

pub struct ConstantEnvLight {
    radiance: Spectrum,
    scale: Float,
    scene_radius: Float,
}

impl ConstantEnvLight {
    pub fn new(radiance: Spectrum, scale: Float) -> Self {
        ConstantEnvLight {
            radiance,
            scale,
            scene_radius: 0.0,
        }
    }

    pub fn set_scene_radius(&mut self, radius: Float) {
        self.scene_radius = radius;
    }

    pub fn radiance(
        &self,
        _hitpos: &Vector3f,
        _lightpos: &Vector3f,
        _light_normal: &Vector3f,
    ) -> Spectrum {
        self.radiance * self.scale
    }

    /// The direction pdf is folded into the returned radiance; the
    /// sampled light point sits past the scene bound along the sampled
    /// direction.
    pub fn sample_direct_contribution(
        &self,
        scene: &Scene,
        hit: &Intersection,
        sampler: &mut Sampler,
    ) -> DirectSample {
        let (dir, pdf) = sample_unit_sphere_uniformly(sampler);
        let light_pos = hit.p + dir * (2.0 * self.scene_radius);

        if !scene.is_visible(&hit.p, &light_pos) {
            return DirectSample::blocked(pdf);
        }

        DirectSample {
            radiance: self.radiance * self.scale / pdf,
            light_pos,
            light_normal: -dir,
            pdf,
        }
    }

    pub fn pdf_solidangle(
        &self,
        _hitpos: &Vector3f,
        _lightpos: &Vector3f,
        _light_normal: &Vector3f,
    ) -> Float {
        INV_4_PI
    }

    pub fn power(&self) -> Float {
        luminance(&self.radiance) * self.scale * 4.0 * PI * PI * self.scene_radius
            * self.scene_radius
    }
}
