//! Importance-sampled latitude-longitude environment map. Construction
//! builds a 2D piecewise-constant distribution over texels from their
//! luminance, weighted by `sin theta` to undo the latitude stretch of
//! the parameterization; sampling draws a texel, jitters inside it, and
//! maps through the lat-long parameterization and the light's world
//! rotation.

// lumiray
use crate::core::base::{
    luminance, normalized_uv_to_vec, vec_to_normalized_uv, Float, Spectrum, PI, TWO_PI,
};
use crate::core::geometry::{Matrix3x3, Matrix4x4, Vector2f, Vector3f};
use crate::core::image::Image;
use crate::core::interaction::Intersection;
use crate::core::light::DirectSample;
use crate::core::sampler::Sampler;
use crate::core::sampling::Distribution2D;
use crate::core::scene::Scene;

pub struct ImageEnvLight {
    image: Image,
    scale: Float,
    distrib: Distribution2D,
    width: u32,
    height: u32,
    mean_luminance: Float,
    to_world: Matrix3x3,
    to_local: Matrix3x3,
    scene_radius: Float,
}

impl ImageEnvLight {
    pub fn new(image: Image, scale: Float, to_world: &Matrix4x4) -> Self {
        let columns = image.get_data_for_sampling(true);
        let distrib = Distribution2D::new(columns);

        let flat = image.get_data_for_sampling(false);
        let texel_count = (image.width() * image.height()) as Float;
        let mean_luminance =
            flat.iter().map(|col| col.iter().sum::<Float>()).sum::<Float>() / texel_count;

        ImageEnvLight {
            width: image.width(),
            height: image.height(),
            image,
            scale,
            distrib,
            mean_luminance,
            to_world: Matrix3x3::from_upper_left(to_world),
            to_local: Matrix3x3::from_upper_left(&to_world.inverse()),
            scene_radius: 0.0,
        }
    }

    pub fn set_scene_radius(&mut self, radius: Float) {
        self.scene_radius = radius;
    }

    fn lookup(&self, uv: &Vector2f) -> Spectrum {
        let x = ((uv.x * self.width as Float) as i64).clamp(0, self.width as i64 - 1) as u32;
        let y = ((uv.y * self.height as Float) as i64).clamp(0, self.height as i64 - 1) as u32;
        self.image.get_pixel(x, y) * self.scale
    }

    /// Radiance along a ray that escaped toward the environment; the
    /// `light_normal` argument points back toward the receiver, so the
    /// lookup direction is its negation.
    pub fn radiance(
        &self,
        _hitpos: &Vector3f,
        _lightpos: &Vector3f,
        light_normal: &Vector3f,
    ) -> Spectrum {
        let dir = self.to_local.mul_vector(&-light_normal).normalize();
        self.lookup(&vec_to_normalized_uv(&dir))
    }

    pub fn sample_direct_contribution(
        &self,
        scene: &Scene,
        hit: &Intersection,
        sampler: &mut Sampler,
    ) -> DirectSample {
        let texel = self
            .distrib
            .sample(sampler.sample_1d(), sampler.sample_1d());

        // jitter inside the chosen texel; the pdf is constant across it
        let uv = Vector2f::new(
            (texel.x as Float + sampler.sample_1d()) / self.width as Float,
            (texel.y as Float + sampler.sample_1d()) / self.height as Float,
        );

        let sin_theta = (PI * uv.y).sin();
        if sin_theta <= 0.0 {
            return DirectSample::blocked(0.0);
        }
        let pdf = self.distrib.pdf(texel.x as usize, texel.y as usize)
            * (self.width * self.height) as Float
            / (TWO_PI * PI * sin_theta);
        if pdf <= 0.0 {
            return DirectSample::blocked(0.0);
        }

        let dir = self
            .to_world
            .mul_vector(&normalized_uv_to_vec(&uv))
            .normalize();
        let light_pos = hit.p + dir * (2.0 * self.scene_radius);

        if !scene.is_visible(&hit.p, &light_pos) {
            return DirectSample::blocked(pdf);
        }

        DirectSample {
            radiance: self.lookup(&uv) / pdf,
            light_pos,
            light_normal: -dir,
            pdf,
        }
    }

    pub fn pdf_solidangle(
        &self,
        hitpos: &Vector3f,
        lightpos: &Vector3f,
        _light_normal: &Vector3f,
    ) -> Float {
        let dir = self
            .to_local
            .mul_vector(&(lightpos - hitpos).normalize())
            .normalize();
        let uv = vec_to_normalized_uv(&dir);
        let sin_theta = (PI * uv.y).sin();
        if sin_theta <= 0.0 {
            return 0.0;
        }
        let x = ((uv.x * self.width as Float) as i64).clamp(0, self.width as i64 - 1) as usize;
        let y = ((uv.y * self.height as Float) as i64).clamp(0, self.height as i64 - 1) as usize;
        self.distrib.pdf(x, y) * (self.width * self.height) as Float / (TWO_PI * PI * sin_theta)
    }

    pub fn power(&self) -> Float {
        self.mean_luminance * self.scale * 4.0 * PI * PI * self.scene_radius * self.scene_radius
    }
}
