//! Lambertian reflection, `f = rho / pi`, cosine-hemisphere sampled. The
//! albedo comes from a constant or from a texture looked up at the hit's
//! texture coordinates.

// std
use std::sync::Arc;
// lumiray
use crate::core::base::{Float, Spectrum, INV_PI};
use crate::core::bsdf::BsdfSample;
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;
use crate::core::sampling::{sample_unit_hemisphere_cosine, sample_unit_hemisphere_cosine_pdf};
use crate::core::texture::Texture;

pub struct Diffuse {
    albedo: Spectrum,
    texture: Option<Arc<Texture>>,
}

impl Diffuse {
    pub fn new(albedo: Spectrum) -> Self {
        Diffuse {
            albedo,
            texture: None,
        }
    }

    pub fn with_texture(texture: Arc<Texture>) -> Self {
        Diffuse {
            albedo: Spectrum::zero(),
            texture: Some(texture),
        }
    }

    fn reflectance(&self, uv: &Vector2f) -> Spectrum {
        match &self.texture {
            Some(t) => t.evaluate(uv),
            None => self.albedo,
        }
    }

    pub fn sample(&self, _wi: &Vector3f, uv: &Vector2f, sampler: &mut Sampler) -> BsdfSample {
        let (wo, pdf) = sample_unit_hemisphere_cosine(sampler);
        // f |cos| / pdf collapses to the reflectance under cosine sampling
        BsdfSample {
            wo,
            weight: self.reflectance(uv),
            pdf,
        }
    }

    pub fn pdf(&self, _wi: &Vector3f, wo: &Vector3f) -> Float {
        sample_unit_hemisphere_cosine_pdf(wo)
    }

    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f, uv: &Vector2f) -> Spectrum {
        // flip so both directions point away from the hit point
        let wi_flipped = -wi.normalize();
        if wi_flipped.z <= 0.0 || wo.z <= 0.0 {
            return Spectrum::zero();
        }
        self.reflectance(uv) * INV_PI
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backside_is_black() {
        let d = Diffuse::new(Spectrum::splat(0.8));
        let below = Vector3f::new(0.1, 0.1, -0.9).normalize();
        let above = Vector3f::new(0.1, 0.1, 0.9).normalize();
        let uv = Vector2f::default();
        // incoming from below the surface (wi.z < 0 is front-side)
        assert!(!d.eval(&below, &above, &uv).is_zero());
        assert!(d.eval(&above, &above, &uv).is_zero());
        assert!(d.eval(&below, &-above, &uv).is_zero());
    }

    #[test]
    fn sample_weight_is_albedo() {
        let d = Diffuse::new(Spectrum::new(0.2, 0.4, 0.6));
        let mut sampler = Sampler::new(3, 1);
        let wi = Vector3f::new(0.0, 0.0, -1.0);
        let s = d.sample(&wi, &Vector2f::default(), &mut sampler);
        assert_eq!(s.weight, Spectrum::new(0.2, 0.4, 0.6));
        assert!(s.wo.z > 0.0);
        assert!((s.pdf - d.pdf(&wi, &s.wo)).abs() < 1e-6);
    }
}
