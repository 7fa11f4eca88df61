//! Point light with a radiant intensity in watts per steradian. A delta
//! light: it is sampled, never hit.

// lumiray
use crate::core::base::{luminance, Float, Spectrum, PI};
use crate::core::geometry::Vector3f;
use crate::core::interaction::Intersection;
use crate::core::light::DirectSample;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;

pub struct PointLight {
    pos: Vector3f,
    // dWatt / dSolidAngle; the scene description calls it "radiance"
    radiant_intensity: Spectrum,
}

impl PointLight {
    pub fn new(pos: Vector3f, radiant_intensity: Spectrum) -> Self {
        PointLight {
            pos,
            radiant_intensity,
        }
    }

    pub fn sample_direct_contribution(
        &self,
        scene: &Scene,
        hit: &Intersection,
        _sampler: &mut Sampler,
    ) -> DirectSample {
        if !scene.is_visible(&self.pos, &hit.p) {
            return DirectSample::blocked(1.0);
        }

        let light_to_hitpos = hit.p - self.pos;
        DirectSample {
            radiance: self.radiant_intensity / light_to_hitpos.dot(&light_to_hitpos),
            light_pos: self.pos,
            light_normal: light_to_hitpos.normalize(),
            pdf: 1.0,
        }
    }

    pub fn pdf_solidangle(
        &self,
        _hitpos: &Vector3f,
        _lightpos: &Vector3f,
        _light_normal: &Vector3f,
    ) -> Float {
        0.0
    }

    pub fn radiance(
        &self,
        _hitpos: &Vector3f,
        _lightpos: &Vector3f,
        _light_normal: &Vector3f,
    ) -> Spectrum {
        Spectrum::zero()
    }

    pub fn power(&self) -> Float {
        luminance(&self.radiant_intensity) * 4.0 * PI
    }
}
