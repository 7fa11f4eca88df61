//! Pinhole perspective camera.

// lumiray
use crate::core::base::Float;
use crate::core::camera::CameraBase;
use crate::core::geometry::{Matrix4x4, Ray, Vector3f};
use crate::core::sampler::Sampler;

pub struct Pinhole {
    pub base: CameraBase,
}

impl Pinhole {
    pub fn new(pos: Vector3f, dir: Vector3f, up: Vector3f, w: u32, h: u32, fov_x: Float) -> Self {
        Pinhole {
            base: CameraBase::look_at(pos, dir, up, w, h, fov_x),
        }
    }

    pub fn from_matrix(cam_to_world: Matrix4x4, w: u32, h: u32, fov_x: Float) -> Self {
        Pinhole {
            base: CameraBase::from_matrix(cam_to_world, w, h, fov_x),
        }
    }

    pub fn sample_ray(&self, x: Float, y: Float, _sampler: &mut Sampler) -> Ray {
        let local_d = self.base.raster_to_camera_dir(x, y);
        let d = self.base.camera_to_world_dir(&local_d);
        Ray::new(self.base.pos, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_looks_along_view_direction() {
        let cam = Pinhole::new(
            Vector3f::new(0.0, 1.0, -3.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            64,
            64,
            45.0,
        );
        let mut sampler = Sampler::new(0, 1);
        let r = cam.sample_ray(32.0, 32.0, &mut sampler);
        assert_eq!(r.o, Vector3f::new(0.0, 1.0, -3.0));
        assert!((r.d.z - 1.0).abs() < 1e-4, "{:?}", r.d);
    }

    #[test]
    fn corner_rays_diverge_symmetrically() {
        let cam = Pinhole::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            100,
            100,
            60.0,
        );
        let mut sampler = Sampler::new(0, 1);
        let left = cam.sample_ray(0.0, 50.0, &mut sampler);
        let right = cam.sample_ray(100.0, 50.0, &mut sampler);
        assert!((left.d.x + right.d.x).abs() < 1e-4);
        assert!((left.d.z - right.d.z).abs() < 1e-4);
        // a 60 degree horizontal fov puts the edge rays 30 degrees out
        let half = left.d.x.abs().atan2(left.d.z).to_degrees();
        assert!((half - 30.0).abs() < 0.5, "half fov = {}", half);
    }
}
