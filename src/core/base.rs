//! Scalar layer shared by every module: the floating-point type, angular
//! constants, small numeric helpers, and the latitude-longitude mapping
//! used by the environment lights.

// std
use std::f32::consts::PI as PI_F32;
// lumiray
use crate::core::geometry::{Vector2f, Vector3f};

pub type Float = f32;

/// RGB radiance/reflectance triple. Componentwise arithmetic comes from
/// the vector type; radiometric code reads better with its own name.
pub type Spectrum = Vector3f;

pub const PI: Float = PI_F32;
pub const TWO_PI: Float = 2.0 * PI_F32;
pub const INV_PI: Float = 1.0 / PI_F32;
pub const INV_2_PI: Float = 1.0 / (2.0 * PI_F32);
pub const INV_4_PI: Float = 1.0 / (4.0 * PI_F32);

/// Offset applied along a spawned ray direction to escape the surface it
/// starts on.
pub const RAY_EPSILON: Float = 1e-3;

/// A shadow ray that stops within this distance of its target is treated
/// as unoccluded (it hit the target surface itself).
pub const VISIBILITY_EPSILON: Float = 1.1e-3;

pub fn radians(deg: Float) -> Float {
    deg * PI / 180.0
}

pub fn clamp_t<T: PartialOrd>(val: T, low: T, high: T) -> T {
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

pub fn lerp(t: Float, a: Float, b: Float) -> Float {
    (1.0 - t) * a + t * b
}

/// CIE-weighted luminance of a linear RGB triple.
pub fn luminance(s: &Spectrum) -> Float {
    0.212671 * s.x + 0.715160 * s.y + 0.072169 * s.z
}

/// Map a normalized direction to latitude-longitude texture coordinates,
/// `u -> phi` and `v -> theta` with `v = 0` at the `+y` zenith.
pub fn vec_to_normalized_uv(dir: &Vector3f) -> Vector2f {
    let mut uv = Vector2f::new(
        dir.x.atan2(-dir.z) * INV_2_PI,
        clamp_t(dir.y, -1.0, 1.0).acos() * INV_PI,
    );
    if uv.x < 0.0 {
        uv.x += 1.0;
    }
    uv
}

/// Inverse of [`vec_to_normalized_uv`]. Note the axis convention differs
/// from the uniform sphere warp: `v = 0` maps to `+y`.
pub fn normalized_uv_to_vec(uv: &Vector2f) -> Vector3f {
    let phi = TWO_PI * uv.x;
    let theta = PI * uv.y;

    let sin_theta = theta.sin();
    let cos_theta = theta.cos();
    let sin_phi = phi.sin();
    let cos_phi = phi.cos();

    Vector3f::new(sin_theta * sin_phi, cos_theta, -sin_theta * cos_phi)
}
