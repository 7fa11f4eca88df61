//! Perspective camera shared machinery and the camera variants.

// lumiray
use crate::core::base::{radians, Float};
use crate::core::geometry::{Matrix4x4, Ray, Vector3f, Vector4f};
use crate::core::sampler::Sampler;
use crate::cameras::pinhole::Pinhole;
use crate::cameras::thinlens::ThinLens;

pub enum Camera {
    Pinhole(Pinhole),
    ThinLens(ThinLens),
}

impl Camera {
    /// Generate the ray through raster position `(x, y)`; the thin lens
    /// draws its aperture sample from the sampler, the pinhole ignores
    /// it.
    pub fn sample_ray(&self, x: Float, y: Float, sampler: &mut Sampler) -> Ray {
        match self {
            Camera::Pinhole(c) => c.sample_ray(x, y, sampler),
            Camera::ThinLens(c) => c.sample_ray(x, y, sampler),
        }
    }

    pub fn width(&self) -> u32 {
        self.base().w
    }

    pub fn height(&self) -> u32 {
        self.base().h
    }

    fn base(&self) -> &CameraBase {
        match self {
            Camera::Pinhole(c) => &c.base,
            Camera::ThinLens(c) => &c.base,
        }
    }
}

/// Projection setup common to the perspective cameras: position, the
/// camera-to-world frame and the inverse of the raster-sample projection
/// chain.
pub struct CameraBase {
    pub pos: Vector3f,
    pub w: u32,
    pub h: u32,
    pub sample_to_camera: Matrix4x4,
    pub cam_to_world: Matrix4x4,
}

const NEAR: Float = 1e-4;
const FAR: Float = 1000.0;

impl CameraBase {
    pub fn from_matrix(cam_to_world: Matrix4x4, w: u32, h: u32, fov_x: Float) -> Self {
        let pos = cam_to_world
            .mul_vec4(&Vector4f::new(0.0, 0.0, 0.0, 1.0))
            .xyz();
        CameraBase {
            pos,
            w,
            h,
            sample_to_camera: Self::sample_to_camera(w, h, fov_x),
            cam_to_world,
        }
    }

    pub fn look_at(
        pos: Vector3f,
        dir: Vector3f,
        up: Vector3f,
        w: u32,
        h: u32,
        fov_x: Float,
    ) -> Self {
        let dir = dir.normalize();
        let mut up = up.normalize();
        // right-handed frame: left = up x dir, then re-orthogonalize up
        let left = Vector3f::cross(&up, &dir);
        up = Vector3f::cross(&dir, &left);

        let cam_to_world = Matrix4x4::from_cols(
            Vector4f::new(left.x, left.y, left.z, 0.0),
            Vector4f::new(up.x, up.y, up.z, 0.0),
            Vector4f::new(dir.x, dir.y, dir.z, 0.0),
            Vector4f::new(pos.x, pos.y, pos.z, 1.0),
        );

        CameraBase {
            pos,
            w,
            h,
            sample_to_camera: Self::sample_to_camera(w, h, fov_x),
            cam_to_world,
        }
    }

    /// Inverse of `scale(-1/2, -aspect/2, 1) . translate(-1, -1/aspect, 0)
    /// . perspective(fov_x, near, far)`, mapping a normalized raster
    /// sample in `[0,1]^2` into camera space.
    fn sample_to_camera(w: u32, h: u32, fov_x: Float) -> Matrix4x4 {
        let ratio = w as Float / h as Float;
        let recip = 1.0 / (FAR - NEAR);
        let cot = 1.0 / (radians(fov_x * 0.5)).tan();

        let perspective = Matrix4x4::from_rows([
            [cot, 0.0, 0.0, 0.0],
            [0.0, cot, 0.0, 0.0],
            [0.0, 0.0, FAR * recip, -NEAR * FAR * recip],
            [0.0, 0.0, 1.0, 0.0],
        ]);

        let camera_to_sample = Matrix4x4::scale(-0.5, -0.5 * ratio, 1.0)
            * Matrix4x4::translate(-1.0, -1.0 / ratio, 0.0)
            * perspective;

        camera_to_sample.inverse()
    }

    /// Camera-space direction through the normalized raster sample.
    pub fn raster_to_camera_dir(&self, x: Float, y: Float) -> Vector3f {
        self.sample_to_camera
            .mul_vec4(&Vector4f::new(
                x / self.w as Float,
                y / self.h as Float,
                0.0,
                1.0,
            ))
            .xyz()
    }

    pub fn camera_to_world_dir(&self, d: &Vector3f) -> Vector3f {
        self.cam_to_world
            .mul_vec4(&Vector4f::new(d.x, d.y, d.z, 0.0))
            .xyz()
    }

    pub fn camera_to_world_point(&self, p: &Vector3f) -> Vector3f {
        self.cam_to_world
            .mul_vec4(&Vector4f::new(p.x, p.y, p.z, 1.0))
            .xyz()
    }
}
