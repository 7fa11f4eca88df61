//! Smooth conductor: mirror reflection weighted by the per-channel
//! Fresnel-conductor term of the metal's complex IOR.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::bsdf::{fresnel_conductor, BsdfSample, Conductors};
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;

pub struct Conductor {
    in_ior: Spectrum,
    in_ior_k: Spectrum,
    ex_ior: Float,
}

impl Conductor {
    pub fn new(material: Conductors, ex_ior: Float) -> Self {
        Conductor {
            in_ior: material.eta(),
            in_ior_k: material.k(),
            ex_ior,
        }
    }

    pub fn sample(&self, wi: &Vector3f, _uv: &Vector2f, _sampler: &mut Sampler) -> BsdfSample {
        let wo = Vector3f::new(wi.x, wi.y, -wi.z);
        let cos_i = -wi.z;

        if cos_i <= 0.0 {
            return BsdfSample {
                wo,
                weight: Spectrum::one(),
                pdf: 0.0,
            };
        }

        BsdfSample {
            wo,
            weight: fresnel_conductor(
                cos_i,
                &Spectrum::splat(self.ex_ior),
                &self.in_ior,
                &self.in_ior_k,
            ),
            pdf: 0.0,
        }
    }

    pub fn pdf(&self, _wi: &Vector3f, _wo: &Vector3f) -> Float {
        0.0
    }

    pub fn eval(&self, _wi: &Vector3f, _wo: &Vector3f, _uv: &Vector2f) -> Spectrum {
        Spectrum::zero()
    }
}
