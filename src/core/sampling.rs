//! Draw random samples from a chosen probability distribution: discrete
//! piecewise-constant distributions over one and two dimensions, and the
//! warps from the unit square onto disk, sphere, hemisphere and the
//! Beckmann microfacet lobe. Every warp has a pdf function that matches
//! the sampler exactly.

// lumiray
use crate::core::base::{Float, INV_2_PI, INV_4_PI, INV_PI, TWO_PI};
use crate::core::geometry::{Vector2f, Vector2u, Vector3f};
use crate::core::sampler::Sampler;

/// Discrete distribution with normalized pdf and inclusive cdf;
/// `sample(u)` returns the first index whose cdf exceeds `u`.
#[derive(Debug, Default, Clone)]
pub struct Distribution1D {
    pdf: Vec<Float>,
    cdf: Vec<Float>,
}

impl Distribution1D {
    pub fn new(weights: Vec<Float>) -> Self {
        let n = weights.len();
        assert!(n > 0, "empty weight vector");
        let mut pdf = weights;
        let mut cdf = vec![0.0 as Float; n];
        cdf[0] = pdf[0];
        for i in 1..n {
            cdf[i] = cdf[i - 1] + pdf[i];
        }
        let sum = cdf[n - 1];
        if sum > 0.0 {
            for i in 0..n {
                pdf[i] /= sum;
                cdf[i] /= sum;
            }
        } else {
            // all-zero weights degrade to a uniform pick
            let uniform = 1.0 / n as Float;
            for i in 0..n {
                pdf[i] = uniform;
                cdf[i] = (i + 1) as Float * uniform;
            }
        }
        Distribution1D { pdf, cdf }
    }

    pub fn count(&self) -> usize {
        self.pdf.len()
    }

    pub fn sample(&self, u: Float) -> usize {
        // binary search for the first cdf entry above u
        let idx = self.cdf.partition_point(|&c| c <= u);
        idx.min(self.cdf.len() - 1)
    }

    pub fn pdf(&self, i: usize) -> Float {
        self.pdf[i]
    }
}

/// Two [`Distribution1D`]s composed: a marginal over the outer index and
/// one conditional per outer entry.
#[derive(Debug, Default, Clone)]
pub struct Distribution2D {
    marginal: Distribution1D,
    conditional: Vec<Distribution1D>,
}

impl Distribution2D {
    pub fn new(weights: Vec<Vec<Float>>) -> Self {
        let mut marginal_weights = Vec::with_capacity(weights.len());
        let mut conditional = Vec::with_capacity(weights.len());
        for row in weights {
            marginal_weights.push(row.iter().sum());
            conditional.push(Distribution1D::new(row));
        }
        Distribution2D {
            marginal: Distribution1D::new(marginal_weights),
            conditional,
        }
    }

    pub fn sample(&self, u1: Float, u2: Float) -> Vector2u {
        let i = self.marginal.sample(u1);
        let j = self.conditional[i].sample(u2);
        Vector2u::new(i as u32, j as u32)
    }

    pub fn pdf(&self, i: usize, j: usize) -> Float {
        self.marginal.pdf(i) * self.conditional[i].pdf(j)
    }
}

// ----------------------------------------------------------------------
// Warps. Each consumes exactly two uniform draws.

pub fn sample_unit_disk_uniformly(sampler: &mut Sampler) -> (Vector2f, Float) {
    let sqrt_x = sampler.sample_1d().sqrt();
    let angle = sampler.sample_1d() * TWO_PI;
    (
        Vector2f::new(sqrt_x * angle.cos(), sqrt_x * angle.sin()),
        INV_PI,
    )
}

pub fn sample_unit_disk_uniformly_pdf(p: &Vector2f) -> Float {
    if p.length() >= 1.0 {
        0.0
    } else {
        INV_PI
    }
}

pub fn sample_unit_sphere_uniformly(sampler: &mut Sampler) -> (Vector3f, Float) {
    let phi = TWO_PI * sampler.sample_1d();
    let theta = (1.0 - 2.0 * sampler.sample_1d()).acos();

    let sin_theta = theta.sin();
    let cos_theta = theta.cos();
    (
        Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta),
        INV_4_PI,
    )
}

// the sphere warp never produces interior points, so no containment check
pub fn sample_unit_sphere_uniformly_pdf(_v: &Vector3f) -> Float {
    INV_4_PI
}

pub fn sample_unit_hemisphere_uniformly(sampler: &mut Sampler) -> (Vector3f, Float) {
    let phi = TWO_PI * sampler.sample_1d();
    let theta = (1.0 - sampler.sample_1d()).acos();

    let sin_theta = theta.sin();
    let cos_theta = theta.cos();
    (
        Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta),
        INV_2_PI,
    )
}

pub fn sample_unit_hemisphere_uniformly_pdf(v: &Vector3f) -> Float {
    if v.z <= 0.0 {
        0.0
    } else {
        INV_2_PI
    }
}

pub fn sample_unit_hemisphere_cosine(sampler: &mut Sampler) -> (Vector3f, Float) {
    let (xy, _) = sample_unit_disk_uniformly(sampler);
    let z = (1.0 - xy.dot(&xy)).max(0.0).sqrt();
    (Vector3f::new(xy.x, xy.y, z), z * INV_PI)
}

pub fn sample_unit_hemisphere_cosine_pdf(v: &Vector3f) -> Float {
    if v.z <= 0.0 {
        0.0
    } else {
        v.z * INV_PI
    }
}

/// Beckmann normal distribution pdf over the upper hemisphere,
/// `exp(-tan^2 theta / alpha^2) / (pi alpha^2 cos^3 theta)`.
pub fn sample_beckmann_distrib_pdf(v: &Vector3f, alpha: Float) -> Float {
    if v.z <= 0.0 {
        return 0.0;
    }
    let alpha_2 = alpha * alpha;
    let tan_theta_2 = (v.x * v.x + v.y * v.y) / (v.z * v.z);
    let cos_theta_3 = v.z * v.z * v.z;
    INV_PI * (-tan_theta_2 / alpha_2).exp() / (alpha_2 * cos_theta_3)
}

pub fn sample_beckmann_distrib(sampler: &mut Sampler, alpha: Float) -> (Vector3f, Float) {
    let s1 = sampler.sample_1d();
    let s2 = sampler.sample_1d();

    let phi = TWO_PI * s1;
    let theta = (-alpha * alpha * (1.0 - s2).ln()).sqrt().atan();

    let sin_theta = theta.sin();
    let cos_theta = theta.cos();
    let v = Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);

    let pdf = sample_beckmann_distrib_pdf(&v, alpha);
    (v, pdf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_1d_picks_by_cdf() {
        let d = Distribution1D::new(vec![1.0, 0.0, 3.0]);
        assert!((d.pdf(0) - 0.25).abs() < 1e-6);
        assert!((d.pdf(1) - 0.0).abs() < 1e-6);
        assert!((d.pdf(2) - 0.75).abs() < 1e-6);
        assert_eq!(d.sample(0.0), 0);
        assert_eq!(d.sample(0.2), 0);
        assert_eq!(d.sample(0.25), 2);
        assert_eq!(d.sample(0.9), 2);
        assert_eq!(d.sample(0.999999), 2);
    }

    #[test]
    fn distribution_1d_zero_weights_uniform() {
        let d = Distribution1D::new(vec![0.0, 0.0]);
        assert!((d.pdf(0) - 0.5).abs() < 1e-6);
        assert_eq!(d.sample(0.75), 1);
    }

    #[test]
    fn distribution_2d_pdf_factorizes() {
        let d = Distribution2D::new(vec![vec![1.0, 1.0], vec![2.0, 6.0]]);
        // marginal: [2, 8] -> [0.2, 0.8]
        assert!((d.pdf(0, 0) - 0.2 * 0.5).abs() < 1e-6);
        assert!((d.pdf(1, 1) - 0.8 * 0.75).abs() < 1e-6);
        let total: Float = (0..2).flat_map(|i| (0..2).map(move |j| (i, j)))
            .map(|(i, j)| d.pdf(i, j))
            .sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn warp_pdfs_match_samplers() {
        let mut sampler = Sampler::new(9, 1);
        for _ in 0..256 {
            let (p, pdf) = sample_unit_disk_uniformly(&mut sampler);
            assert_eq!(pdf, sample_unit_disk_uniformly_pdf(&p));

            let (v, pdf) = sample_unit_sphere_uniformly(&mut sampler);
            assert_eq!(pdf, sample_unit_sphere_uniformly_pdf(&v));
            assert!((v.length() - 1.0).abs() < 1e-5);

            let (v, pdf) = sample_unit_hemisphere_uniformly(&mut sampler);
            assert_eq!(pdf, sample_unit_hemisphere_uniformly_pdf(&v));
            assert!(v.z >= 0.0);

            let (v, pdf) = sample_unit_hemisphere_cosine(&mut sampler);
            assert!((pdf - sample_unit_hemisphere_cosine_pdf(&v)).abs() < 1e-6);

            let (v, pdf) = sample_beckmann_distrib(&mut sampler, 0.3);
            assert!((pdf - sample_beckmann_distrib_pdf(&v, 0.3)).abs() < 1e-3 * pdf.max(1.0));
        }
    }

    #[test]
    fn cosine_hemisphere_mean_cos() {
        // E[cos theta] under z/pi sampling is 2/3
        let mut sampler = Sampler::new(11, 1);
        let n = 20_000;
        let mut acc = 0.0f64;
        for _ in 0..n {
            let (v, _) = sample_unit_hemisphere_cosine(&mut sampler);
            acc += v.z as f64;
        }
        let mean = acc / n as f64;
        assert!((mean - 2.0 / 3.0).abs() < 0.01, "mean = {}", mean);
    }
}
