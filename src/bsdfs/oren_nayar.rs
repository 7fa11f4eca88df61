//! Oren-Nayar rough diffuse reflection with the standard A/B
//! approximation; sigma is given in degrees.

// lumiray
use crate::core::base::{radians, Float, Spectrum, INV_PI};
use crate::core::bsdf::BsdfSample;
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;
use crate::core::sampling::{sample_unit_hemisphere_cosine, sample_unit_hemisphere_cosine_pdf};

pub struct OrenNayar {
    reflection: Spectrum,
    a: Float,
    b: Float,
}

// sine of the angle to the local normal, for a normalized direction
fn vec_sin(v: &Vector3f) -> Float {
    (1.0 - v.z * v.z).max(0.0).sqrt()
}

impl OrenNayar {
    pub fn new(reflection: Spectrum, sigma: Float) -> Self {
        let s = radians(sigma);
        let s_2 = s * s;
        OrenNayar {
            reflection,
            a: 1.0 - (s_2 / (2.0 * (s_2 + 0.33))),
            b: 0.45 * s_2 / (s_2 + 0.09),
        }
    }

    pub fn sample(&self, wi: &Vector3f, uv: &Vector2f, sampler: &mut Sampler) -> BsdfSample {
        let (wo, pdf) = sample_unit_hemisphere_cosine(sampler);
        if pdf <= 0.0 {
            return BsdfSample::null();
        }
        let weight = self.eval(wi, &wo, uv) * wo.z / pdf;
        BsdfSample { wo, weight, pdf }
    }

    pub fn pdf(&self, _wi: &Vector3f, wo: &Vector3f) -> Float {
        sample_unit_hemisphere_cosine_pdf(wo)
    }

    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f, _uv: &Vector2f) -> Spectrum {
        let wi_flipped = -wi.normalize();

        if wi_flipped.z <= 0.0 || wo.z <= 0.0 {
            return Spectrum::zero();
        }

        let sin_wi = vec_sin(&wi_flipped);
        let sin_wo = vec_sin(wo);

        // max(0, cos(phi_i - phi_o)), guarded against the poles where phi
        // is undefined
        let mut cos_max = 0.0;
        if sin_wi > 1e-4 && sin_wo > 1e-4 {
            let cos_phi_wi = wi_flipped.x / sin_wi;
            let sin_phi_wi = wi_flipped.y / sin_wi;
            let cos_phi_wo = wo.x / sin_wo;
            let sin_phi_wo = wo.y / sin_wo;
            cos_max = (cos_phi_wi * cos_phi_wo + sin_phi_wi * sin_phi_wo).max(0.0);
        }

        // alpha = max(theta_i, theta_o), beta = min(theta_i, theta_o)
        let (sin_alpha, tan_beta) = if wi_flipped.z.abs() > wo.z.abs() {
            (sin_wo, sin_wi / wi_flipped.z.abs())
        } else {
            (sin_wi, sin_wo / wo.z.abs())
        };

        self.reflection * INV_PI * (self.a + self.b * cos_max * sin_alpha * tan_beta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sigma_reduces_to_lambert() {
        let on = OrenNayar::new(Spectrum::splat(0.5), 0.0);
        let wi = Vector3f::new(0.4, 0.1, -0.9).normalize();
        let wo = Vector3f::new(-0.3, 0.5, 0.8).normalize();
        let f = on.eval(&wi, &wo, &Vector2f::default());
        let lambert = 0.5 * INV_PI;
        assert!((f.x - lambert).abs() < 1e-6);
    }

    #[test]
    fn rough_forward_scatter_exceeds_back_scatter() {
        let on = OrenNayar::new(Spectrum::splat(0.5), 30.0);
        let wi = Vector3f::new(0.6, 0.0, -0.8).normalize();
        let uv = Vector2f::default();
        // retroreflection direction shares phi with the flipped incoming
        let back = Vector3f::new(-0.6, 0.0, 0.8).normalize();
        let forward = Vector3f::new(0.6, 0.0, 0.8).normalize();
        let f_back = on.eval(&wi, &back, &uv);
        let f_forward = on.eval(&wi, &forward, &uv);
        assert!(f_back.x > f_forward.x);
    }

    #[test]
    fn energy_conservation_monte_carlo() {
        let on = OrenNayar::new(Spectrum::splat(0.8), 25.0);
        let mut sampler = Sampler::new(8, 1);
        let wi = Vector3f::new(0.3, 0.3, -0.9).normalize();
        let uv = Vector2f::default();
        let n = 50_000;
        let mut acc = Spectrum::zero();
        for _ in 0..n {
            let (wo, pdf) = crate::core::sampling::sample_unit_hemisphere_uniformly(&mut sampler);
            acc += on.eval(&wi, &wo, &uv) * wo.z / pdf;
        }
        let integral = acc / n as Float;
        assert!(integral.max_component() <= 1.02, "{:?}", integral);
    }
}
