//! Wrapper that gives a surface different BSDFs on its two sides. A
//! back-side interaction is mirrored into the front-side convention,
//! delegated to the back BSDF, and mirrored back.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::bsdf::{Bsdf, BsdfSample};
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;

fn flip_z(v: &Vector3f) -> Vector3f {
    Vector3f::new(v.x, v.y, -v.z)
}

pub struct TwoSided {
    front: Box<Bsdf>,
    back: Box<Bsdf>,
}

impl TwoSided {
    pub fn new(front: Bsdf, back: Bsdf) -> Self {
        TwoSided {
            front: Box::new(front),
            back: Box::new(back),
        }
    }

    pub fn sample(&self, wi: &Vector3f, uv: &Vector2f, sampler: &mut Sampler) -> BsdfSample {
        let frontside = wi.z < 0.0;
        let flipped_in = if frontside { *wi } else { flip_z(wi) };
        let bsdf = if frontside { &self.front } else { &self.back };

        let mut result = bsdf.sample(&flipped_in, uv, sampler);
        if !frontside {
            result.wo = flip_z(&result.wo);
        }
        result
    }

    pub fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        if wi.z < 0.0 {
            self.front.pdf(wi, wo)
        } else {
            self.back.pdf(&flip_z(wi), &flip_z(wo))
        }
    }

    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f, uv: &Vector2f) -> Spectrum {
        if wi.z < 0.0 {
            self.front.eval(wi, wo, uv)
        } else {
            self.back.eval(&flip_z(wi), &flip_z(wo), uv)
        }
    }

    pub fn is_discrete(&self, frontside: bool) -> bool {
        if frontside {
            self.front.is_discrete(true)
        } else {
            self.back.is_discrete(true)
        }
    }
}
