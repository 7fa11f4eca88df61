//! Rough conductor-style lobe: a Beckmann half-vector specular term
//! mixed with a Lambertian base. The specular mix weight is
//! `ks = 1 - max(kd)`.

// lumiray
use crate::core::base::{Float, Spectrum, INV_PI};
use crate::core::bsdf::{beckmann_g1, fresnel_dielectric, BsdfSample};
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;
use crate::core::sampling::{
    sample_beckmann_distrib, sample_beckmann_distrib_pdf, sample_unit_hemisphere_cosine,
};

pub struct Microfacet {
    alpha: Float,
    in_ior: Float,
    ex_ior: Float,
    kd: Spectrum,
    ks: Float,
}

impl Microfacet {
    pub fn new(alpha: Float, in_ior: Float, ex_ior: Float, kd: Spectrum) -> Self {
        Microfacet {
            alpha,
            in_ior,
            ex_ior,
            kd,
            ks: 1.0 - kd.max_component(),
        }
    }

    pub fn sample(&self, wi: &Vector3f, _uv: &Vector2f, sampler: &mut Sampler) -> BsdfSample {
        let wi_flipped = -wi.normalize();
        if wi_flipped.z <= 0.0 {
            return BsdfSample::null();
        }

        let wo = if sampler.sample_1d() < self.ks {
            // reflect about a sampled microfacet normal
            let (wh, _) = sample_beckmann_distrib(sampler, self.alpha);
            -wi_flipped + 2.0 * wi_flipped.dot(&wh) * wh
        } else {
            sample_unit_hemisphere_cosine(sampler).0
        };

        if wo.z <= 0.0 {
            return BsdfSample::null();
        }

        let pdf = self.pdf(wi, &wo);
        if pdf <= 0.0 {
            return BsdfSample::null();
        }

        let weight = self.eval(wi, &wo, &Vector2f::default()) * wo.z / pdf;
        BsdfSample { wo, weight, pdf }
    }

    pub fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        let wi_flipped = -wi.normalize();
        let wo = wo.normalize();

        if wi_flipped.z <= 0.0 || wo.z <= 0.0 {
            return 0.0;
        }

        let wh = (wi_flipped + wo).normalize();
        // Jacobian of the half-vector reflection map
        let jh = 1.0 / (4.0 * wh.dot(&wo));

        self.ks * sample_beckmann_distrib_pdf(&wh, self.alpha) * jh
            + (1.0 - self.ks) * wo.z * INV_PI
    }

    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f, _uv: &Vector2f) -> Spectrum {
        let wi_flipped = -wi.normalize();
        let wo = wo.normalize();

        if wi_flipped.z <= 0.0 || wo.z <= 0.0 {
            return Spectrum::zero();
        }

        let wh = (wi_flipped + wo).normalize();
        let d = sample_beckmann_distrib_pdf(&wh, self.alpha);
        let f = fresnel_dielectric(wh.dot(&wi_flipped), self.ex_ior, self.in_ior);
        let g = beckmann_g1(&wi_flipped, &wh, self.alpha) * beckmann_g1(&wo, &wh, self.alpha);

        let denom = 4.0 * wi_flipped.z * wo.z * wh.z;
        let spec = self.ks * d * f * g / denom;
        self.kd * INV_PI + Spectrum::splat(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bsdf::ior;

    #[test]
    fn backside_sampling_terminates() {
        let m = Microfacet::new(0.3, ior::GLASS, ior::VACUUM, Spectrum::splat(0.3));
        let mut sampler = Sampler::new(1, 1);
        // incoming from below: wi.z > 0 means a back-side hit
        let wi = Vector3f::new(0.1, 0.2, 0.97).normalize();
        let s = m.sample(&wi, &Vector2f::default(), &mut sampler);
        assert!(s.is_null());
    }

    #[test]
    fn sample_pdf_consistency() {
        let m = Microfacet::new(0.3, ior::GLASS, ior::VACUUM, Spectrum::splat(0.3));
        let mut sampler = Sampler::new(2, 1);
        let wi = Vector3f::new(0.3, 0.1, -0.95).normalize();
        let uv = Vector2f::default();
        let mut accepted = 0;
        for _ in 0..128 {
            let s = m.sample(&wi, &uv, &mut sampler);
            if s.is_null() {
                continue;
            }
            accepted += 1;
            let pdf = m.pdf(&wi, &s.wo);
            assert!((s.pdf - pdf).abs() < 1e-3 * pdf.max(1.0));
            // weight must reproduce eval * cos / pdf
            let expect = m.eval(&wi, &s.wo, &uv) * s.wo.z / pdf;
            assert!((s.weight - expect).is_zero());
        }
        assert!(accepted > 64);
    }

    #[test]
    fn energy_conservation_monte_carlo() {
        // integral of f cos over the hemisphere stays at or below one
        let m = Microfacet::new(0.3, ior::GLASS, ior::VACUUM, Spectrum::splat(0.4));
        let mut sampler = Sampler::new(3, 1);
        let wi = Vector3f::new(0.2, 0.0, -0.98).normalize();
        let uv = Vector2f::default();
        let n = 50_000;
        let mut acc = Spectrum::zero();
        for _ in 0..n {
            let (wo, pdf) = crate::core::sampling::sample_unit_hemisphere_uniformly(&mut sampler);
            acc += m.eval(&wi, &wo, &uv) * wo.z / pdf;
        }
        let integral = acc / n as Float;
        assert!(
            integral.max_component() <= 1.05,
            "integral = {:?}",
            integral
        );
    }
}
