//! Smooth dielectric interface. Reflection or refraction is chosen by
//! the Fresnel reflectance, both as delta lobes; the refracted branch
//! carries the `(eta_ex / eta_in)^2` solid-angle compression.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::bsdf::{fresnel_dielectric, ior, refract, BsdfSample};
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;

pub struct Dielectric {
    in_ior: Float,
    ex_ior: Float,
}

impl Dielectric {
    pub fn new(in_ior: Float, ex_ior: Float) -> Self {
        Dielectric { in_ior, ex_ior }
    }

    pub fn sample(&self, wi: &Vector3f, _uv: &Vector2f, sampler: &mut Sampler) -> BsdfSample {
        // the incoming direction points toward the surface, so negate it
        // for the cosine against the normal
        let mut n = Vector3f::new(0.0, 0.0, 1.0);
        let mut cos_i = n.dot(&-wi);

        let mut ex_ior = self.ex_ior;
        let mut in_ior = self.in_ior;

        // leaving the medium: swap the interface and flip the normal
        if cos_i < 0.0 {
            in_ior = self.ex_ior;
            ex_ior = self.in_ior;
            n = -n;
            cos_i = -cos_i;
        }

        let reflect_ratio = fresnel_dielectric(cos_i, ex_ior, in_ior);

        if sampler.sample_1d() <= reflect_ratio {
            BsdfSample {
                wo: Vector3f::new(wi.x, wi.y, -wi.z),
                weight: Spectrum::one(),
                pdf: 0.0,
            }
        } else {
            let wo = refract(wi, &n, in_ior, ex_ior);
            let compression = (ex_ior * ex_ior) / (in_ior * in_ior);
            BsdfSample {
                wo,
                weight: Spectrum::splat(compression),
                pdf: 0.0,
            }
        }
    }

    pub fn pdf(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        0.0
    }

    pub fn eval(&self, _wi: &Vector3f, _wo: &Vector3f, _uv: &Vector2f) -> Spectrum {
        Spectrum::zero()
    }
}

impl Default for Dielectric {
    fn default() -> Self {
        Dielectric::new(ior::GLASS, ior::VACUUM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refracted_direction_obeys_snell() {
        let d = Dielectric::new(1.5, 1.0);
        let mut sampler = Sampler::new(5, 1);
        let wi = Vector3f::new(0.4, 0.0, -0.6).normalize();
        let sin_i = (1.0 - wi.z * wi.z).sqrt();
        // draw until the refraction branch comes up
        for _ in 0..64 {
            let s = d.sample(&wi, &Vector2f::default(), &mut sampler);
            if s.wo.z < 0.0 {
                // transmitted into the medium
                let sin_t = (1.0 - s.wo.z * s.wo.z).max(0.0).sqrt();
                assert!((sin_t - sin_i / 1.5).abs() < 1e-4);
                let c = (1.0 / 1.5) * (1.0 / 1.5) as Float;
                assert!((s.weight.x - c).abs() < 1e-6);
                return;
            }
            assert_eq!(s.weight, Spectrum::one());
        }
        panic!("refraction branch never sampled");
    }

    #[test]
    fn total_internal_reflection_always_reflects() {
        let d = Dielectric::new(1.5, 1.0);
        let mut sampler = Sampler::new(6, 1);
        // leaving the dense medium at a grazing angle
        let wi = Vector3f::new(0.95, 0.0, 0.31225).normalize();
        for _ in 0..32 {
            let s = d.sample(&wi, &Vector2f::default(), &mut sampler);
            assert_eq!(s.wo, Vector3f::new(wi.x, wi.y, -wi.z));
        }
    }
}
