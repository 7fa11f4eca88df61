//! BSDF abstraction and the reflectance maths shared by its variants.
//!
//! Directions use the shading-frame convention that the incoming
//! direction points *into* the surface, so a front-side hit has
//! `wi_local.z < 0`. Every variant exposes the same contract: importance
//! sampling (returning the Monte-Carlo weight `f |cos| / pdf`), pdf
//! evaluation, BSDF evaluation, and a discrete-lobe flag. Discrete lobes
//! report pdf 0 and evaluate to zero.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::geometry::{Vector2f, Vector3f};
use crate::core::sampler::Sampler;
use crate::bsdfs::conductor::Conductor;
use crate::bsdfs::dielectric::Dielectric;
use crate::bsdfs::diffuse::Diffuse;
use crate::bsdfs::microfacet::Microfacet;
use crate::bsdfs::mirror::Mirror;
use crate::bsdfs::oren_nayar::OrenNayar;
use crate::bsdfs::two_sided::TwoSided;

/// Result of importance-sampling a BSDF: the outgoing local direction,
/// the throughput factor `f |cos| / pdf`, and the solid-angle pdf (0 for
/// a discrete lobe).
#[derive(Debug, Clone)]
pub struct BsdfSample {
    pub wo: Vector3f,
    pub weight: Spectrum,
    pub pdf: Float,
}

impl BsdfSample {
    pub fn null() -> Self {
        BsdfSample {
            wo: Vector3f::zero(),
            weight: Spectrum::zero(),
            pdf: 0.0,
        }
    }

    /// A sample that cannot continue the path: zero weight or a
    /// degenerate direction.
    pub fn is_null(&self) -> bool {
        self.wo.is_zero() || self.weight.is_zero()
    }
}

pub enum Bsdf {
    Diffuse(Diffuse),
    Mirror(Mirror),
    Dielectric(Dielectric),
    Conductor(Conductor),
    Microfacet(Microfacet),
    OrenNayar(OrenNayar),
    TwoSided(TwoSided),
}

impl Bsdf {
    pub fn sample(&self, wi: &Vector3f, uv: &Vector2f, sampler: &mut Sampler) -> BsdfSample {
        match self {
            Bsdf::Diffuse(b) => b.sample(wi, uv, sampler),
            Bsdf::Mirror(b) => b.sample(wi, uv, sampler),
            Bsdf::Dielectric(b) => b.sample(wi, uv, sampler),
            Bsdf::Conductor(b) => b.sample(wi, uv, sampler),
            Bsdf::Microfacet(b) => b.sample(wi, uv, sampler),
            Bsdf::OrenNayar(b) => b.sample(wi, uv, sampler),
            Bsdf::TwoSided(b) => b.sample(wi, uv, sampler),
        }
    }

    pub fn pdf(&self, wi: &Vector3f, wo: &Vector3f) -> Float {
        match self {
            Bsdf::Diffuse(b) => b.pdf(wi, wo),
            Bsdf::Mirror(b) => b.pdf(wi, wo),
            Bsdf::Dielectric(b) => b.pdf(wi, wo),
            Bsdf::Conductor(b) => b.pdf(wi, wo),
            Bsdf::Microfacet(b) => b.pdf(wi, wo),
            Bsdf::OrenNayar(b) => b.pdf(wi, wo),
            Bsdf::TwoSided(b) => b.pdf(wi, wo),
        }
    }

    pub fn eval(&self, wi: &Vector3f, wo: &Vector3f, uv: &Vector2f) -> Spectrum {
        match self {
            Bsdf::Diffuse(b) => b.eval(wi, wo, uv),
            Bsdf::Mirror(b) => b.eval(wi, wo, uv),
            Bsdf::Dielectric(b) => b.eval(wi, wo, uv),
            Bsdf::Conductor(b) => b.eval(wi, wo, uv),
            Bsdf::Microfacet(b) => b.eval(wi, wo, uv),
            Bsdf::OrenNayar(b) => b.eval(wi, wo, uv),
            Bsdf::TwoSided(b) => b.eval(wi, wo, uv),
        }
    }

    pub fn is_discrete(&self, frontside: bool) -> bool {
        match self {
            Bsdf::Diffuse(_) | Bsdf::Microfacet(_) | Bsdf::OrenNayar(_) => false,
            Bsdf::Mirror(_) | Bsdf::Dielectric(_) | Bsdf::Conductor(_) => true,
            Bsdf::TwoSided(b) => b.is_discrete(frontside),
        }
    }
}

// ----------------------------------------------------------------------
// Shared reflectance helpers.

/// Snell's law `eta_i sin_i = eta_t sin_t`, solved for `sin_t`.
pub fn snell_get_sin_t(sin_i: Float, eta_i: Float, eta_t: Float) -> Float {
    debug_assert!(sin_i >= 0.0);
    eta_i * sin_i / eta_t
}

/// Mirror an incoming (point-toward-surface) direction about a normal.
pub fn reflect(wi: &Vector3f, n: &Vector3f) -> Vector3f {
    wi + 2.0 * -wi.dot(n) * n
}

/// Refract with Snell's law; callers have already established that total
/// internal reflection does not occur.
pub fn refract(wi: &Vector3f, n: &Vector3f, in_ior: Float, ex_ior: Float) -> Vector3f {
    let eta_ratio = ex_ior / in_ior;
    let sin_i = (1.0 - wi.z * wi.z).max(0.0).sqrt();
    let sin_t = snell_get_sin_t(sin_i, ex_ior, in_ior);
    let cos_t = (1.0 - sin_t * sin_t).max(0.0).sqrt();
    eta_ratio * wi + (eta_ratio * n.dot(&-wi) - cos_t) * n
}

fn clamp_cos(cos_i: Float) -> Float {
    if cos_i < 0.0 {
        log::warn!("fresnel cosine {} below 0, clamped", cos_i);
        0.0
    } else if cos_i > 1.0 {
        log::warn!("fresnel cosine {} above 1, clamped", cos_i);
        1.0
    } else {
        cos_i
    }
}

/// Fresnel reflectance between two dielectrics; returns 1 on total
/// internal reflection.
pub fn fresnel_dielectric(cos_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let cos_i = clamp_cos(cos_i);

    let sin_i = (1.0 - cos_i * cos_i).sqrt();
    let sin_t = snell_get_sin_t(sin_i, eta_i, eta_t);
    if sin_t >= 1.0 {
        return 1.0;
    }
    let cos_t = (1.0 - sin_t * sin_t).sqrt();

    let r_parallel = (eta_t * cos_i - eta_i * cos_t) / (eta_t * cos_i + eta_i * cos_t);
    let r_perpendicular = (eta_i * cos_i - eta_t * cos_t) / (eta_i * cos_i + eta_t * cos_t);

    (r_parallel * r_parallel + r_perpendicular * r_perpendicular) * 0.5
}

/// Per-channel Fresnel reflectance between a dielectric and a conductor
/// with complex IOR `eta + i k`, in the Shirley `a^2 + b^2` form.
pub fn fresnel_conductor(
    cos_i: Float,
    eta_i: &Spectrum,
    eta_t: &Spectrum,
    eta_t_k: &Spectrum,
) -> Spectrum {
    let cos_i = clamp_cos(cos_i);

    let eta = eta_t.div(eta_i);
    let etak = eta_t_k.div(eta_i);

    let cos_i_sq = cos_i * cos_i;
    let sin_i_sq = Spectrum::splat(1.0 - cos_i_sq);
    let sin_i_4 = sin_i_sq * sin_i_sq;
    let eta_sq = eta * eta;
    let etak_sq = etak * etak;

    let tmp1 = eta_sq - etak_sq - sin_i_sq;
    let tmp2 = 4.0 * (eta_sq * etak_sq);
    let a2b2 = (tmp1 * tmp1 + tmp2).sqrt();
    let a = (0.5 * (a2b2 + tmp1)).sqrt();

    let cos_i_sq_v = Spectrum::splat(cos_i_sq);
    let r_perpendicular = (a2b2 + cos_i_sq_v - (2.0 * cos_i) * a)
        .div(&(a2b2 + cos_i_sq_v + (2.0 * cos_i) * a));

    let r_parallel = r_perpendicular
        * (cos_i_sq * a2b2 + sin_i_4 - (2.0 * cos_i) * (a * sin_i_sq))
            .div(&(cos_i_sq * a2b2 + sin_i_4 + (2.0 * cos_i) * (a * sin_i_sq)));

    (r_parallel + r_perpendicular) * 0.5
}

/// Beckmann shadowing-masking term, the rational approximation of the
/// slope-space Lambda saturating to 1 for `b >= 1.6`.
pub fn beckmann_g1(wv: &Vector3f, wh: &Vector3f, alpha: Float) -> Float {
    if wv.dot(wh) / wv.z <= 0.0 {
        return 0.0;
    }
    let b = 1.0 / (alpha * wv.z);
    if b >= 1.6 {
        return 1.0;
    }
    let b_2 = b * b;
    (3.535 * b + 2.181 * b_2) / (1.0 + 2.276 * b + 2.577 * b_2)
}

// ----------------------------------------------------------------------
// Reference indices of refraction.

pub mod ior {
    use crate::core::base::Float;

    pub const VACUUM: Float = 1.0;
    pub const ICE: Float = 1.31;
    pub const FUSED_QUARTZ: Float = 1.46;
    pub const GLASS: Float = 1.55;
    pub const SAPPHIRE: Float = 1.77;
    pub const DIAMOND: Float = 2.42;
}

/// Conductors with tabulated complex IOR (RGB-averaged measured data).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Conductors {
    Au,
    Ag,
    Al,
    Cu,
}

impl Conductors {
    pub fn eta(self) -> Spectrum {
        match self {
            Conductors::Au => Spectrum::new(0.143035978, 0.375307083, 1.44204533),
            Conductors::Ag => Spectrum::new(0.155276194, 0.116727956, 0.138387635),
            Conductors::Al => Spectrum::new(1.65750086, 0.880404711, 0.521244466),
            Conductors::Cu => Spectrum::new(0.201005474, 0.923749506, 1.10221541),
        }
    }

    pub fn k(self) -> Spectrum {
        match self {
            Conductors::Au => Spectrum::new(3.98299694, 2.38555646, 1.60335922),
            Conductors::Ag => Spectrum::new(4.82835436, 3.12222242, 2.14690113),
            Conductors::Al => Spectrum::new(9.22381114, 6.26950216, 4.83700418),
            Conductors::Cu => Spectrum::new(3.91326213, 2.45304513, 2.14208984),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresnel_dielectric_limits() {
        // normal incidence against glass: ((n-1)/(n+1))^2
        let f0 = fresnel_dielectric(1.0, 1.0, 1.5);
        let expect = ((1.5 - 1.0) / (1.5 + 1.0) as Float).powi(2);
        assert!((f0 - expect).abs() < 1e-5);
        // grazing incidence reflects everything
        let f_graze = fresnel_dielectric(0.0, 1.0, 1.5);
        assert!((f_graze - 1.0).abs() < 1e-4);
        // total internal reflection from the dense side
        let f_tir = fresnel_dielectric(0.2, 1.5, 1.0);
        assert_eq!(f_tir, 1.0);
    }

    #[test]
    fn fresnel_conductor_is_bright_at_normal_incidence() {
        let vac = Spectrum::one();
        let f = fresnel_conductor(1.0, &vac, &Conductors::Ag.eta(), &Conductors::Ag.k());
        // silver reflects most of the visible range
        assert!(f.x > 0.9 && f.y > 0.9 && f.z > 0.9, "{:?}", f);
        for c in 0..3 {
            assert!(f[c] <= 1.0 + 1e-5);
        }
    }

    #[test]
    fn reflect_flips_about_normal() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.5, 0.0, -0.5).normalize();
        let r = reflect(&wi, &n);
        assert!((r.x - wi.x).abs() < 1e-6);
        assert!((r.z + wi.z).abs() < 1e-6);
    }

    #[test]
    fn refract_straight_through_matched_media() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.3, 0.1, -0.9).normalize();
        let t = refract(&wi, &n, 1.0, 1.0);
        assert!((t - wi).is_zero());
    }
}
