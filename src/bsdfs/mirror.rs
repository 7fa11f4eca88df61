//! Perfect specular reflection: a delta lobe with unit weight.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::bsdf::BsdfSample;
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;

pub struct Mirror;

impl Mirror {
    pub fn new() -> Self {
        Mirror
    }

    pub fn sample(&self, wi: &Vector3f, _uv: &Vector2f, _sampler: &mut Sampler) -> BsdfSample {
        BsdfSample {
            wo: Vector3f::new(wi.x, wi.y, -wi.z),
            weight: Spectrum::one(),
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

impl Default for Mirror {
    fn default() -> Self {
        Mirror::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflects_about_z() {
        let m = Mirror::new();
        let mut sampler = Sampler::new(0, 1);
        let wi = Vector3f::new(0.3, -0.2, -0.9).normalize();
        let s = m.sample(&wi, &Vector2f::default(), &mut sampler);
        assert_eq!(s.wo, Vector3f::new(wi.x, wi.y, -wi.z));
        assert_eq!(s.weight, Spectrum::one());
        assert_eq!(s.pdf, 0.0);
    }
}
