//! Diffuse area emitter bound to a scene shape. The light knows its
//! shape by index and the shape stores the reverse index; the scene owns
//! both, so the back-reference cycle never turns into shared ownership.

// lumiray
use crate::core::base::{luminance, Float, Spectrum, PI};
use crate::core::geometry::Vector3f;
use crate::core::interaction::Intersection;
use crate::core::light::DirectSample;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;

pub struct AreaLight {
    pub shape_index: usize,
    radiance: Spectrum,
}

impl AreaLight {
    pub fn new(shape_index: usize, radiance: Spectrum) -> Self {
        AreaLight {
            shape_index,
            radiance,
        }
    }

    /// Emission is one-sided: only toward the half space the surface
    /// normal points into.
    pub fn radiance(
        &self,
        hitpos: &Vector3f,
        lightpos: &Vector3f,
        light_normal: &Vector3f,
    ) -> Spectrum {
        if light_normal.dot(&(hitpos - lightpos)) <= 0.0 {
            return Spectrum::zero();
        }
        self.radiance
    }

    pub fn sample_direct_contribution(
        &self,
        scene: &Scene,
        hit: &Intersection,
        sampler: &mut Sampler,
    ) -> DirectSample {
        let shape = &scene.shapes[self.shape_index];
        let (light_pos, light_normal, pos_pdf) = shape.sample_point(sampler);
        let light_to_hitpos = hit.p - light_pos;

        // receiver behind the emitting side
        if light_normal.dot(&light_to_hitpos) <= 0.0 {
            return DirectSample::blocked(pos_pdf);
        }

        if !scene.is_visible(&hit.p, &light_pos) {
            return DirectSample::blocked(pos_pdf);
        }

        DirectSample {
            radiance: self.radiance,
            light_pos,
            light_normal,
            pdf: pos_pdf,
        }
    }

    pub fn pdf_solidangle(
        &self,
        scene: &Scene,
        hitpos: &Vector3f,
        lightpos: &Vector3f,
        light_normal: &Vector3f,
    ) -> Float {
        scene.shapes[self.shape_index].pdf_solidangle(hitpos, lightpos, light_normal)
    }

    /// One-sided emission integrated over area and hemisphere:
    /// `luminance * area * pi`.
    pub fn power(&self, scene: &Scene) -> Float {
        luminance(&self.radiance) * scene.shapes[self.shape_index].area() * PI
    }
}
