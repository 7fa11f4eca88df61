//! Thin-lens camera: a pinhole with a finite aperture. The ray origin
//! jitters over the lens disk and the direction is bent so that rays
//! through the lens centre stay in focus at `focal_dist`.

// lumiray
use crate::core::base::Float;
use crate::core::camera::CameraBase;
use crate::core::geometry::{Matrix4x4, Ray, Vector3f};
use crate::core::sampler::Sampler;
use crate::core::sampling::sample_unit_disk_uniformly;

pub struct ThinLens {
    pub base: CameraBase,
    lens_radius: Float,
    focal_dist: Float,
}

impl ThinLens {
    pub fn new(
        pos: Vector3f,
        dir: Vector3f,
        up: Vector3f,
        w: u32,
        h: u32,
        fov_x: Float,
        lens_radius: Float,
        focal_dist: Float,
    ) -> Self {
        ThinLens {
            base: CameraBase::look_at(pos, dir, up, w, h, fov_x),
            lens_radius,
            focal_dist,
        }
    }

    pub fn from_matrix(
        cam_to_world: Matrix4x4,
        w: u32,
        h: u32,
        fov_x: Float,
        lens_radius: Float,
        focal_dist: Float,
    ) -> Self {
        ThinLens {
            base: CameraBase::from_matrix(cam_to_world, w, h, fov_x),
            lens_radius,
            focal_dist,
        }
    }

    pub fn sample_ray(&self, x: Float, y: Float, sampler: &mut Sampler) -> Ray {
        let pinhole_dir = self.base.raster_to_camera_dir(x, y).normalize();

        // a closed aperture degenerates to the pinhole
        if self.lens_radius <= 0.0 {
            let d = self.base.camera_to_world_dir(&pinhole_dir);
            return Ray::new(self.base.pos, d);
        }

        let (lens_uv, _) = sample_unit_disk_uniformly(sampler);
        let p_lens = Vector3f::new(
            lens_uv.x * self.lens_radius,
            lens_uv.y * self.lens_radius,
            0.0,
        );

        // where the central ray meets the focal plane
        let ft = self.focal_dist / pinhole_dir.z;
        let p_focus = pinhole_dir * ft;

        let dir_cam = (p_focus - p_lens).normalize();

        let origin = self.base.camera_to_world_point(&p_lens);
        let dir = self.base.camera_to_world_dir(&dir_cam);
        Ray::new(origin, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_matches_pinhole() {
        let tl = ThinLens::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            64,
            64,
            45.0,
            0.0,
            5.0,
        );
        let ph = crate::cameras::pinhole::Pinhole::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            64,
            64,
            45.0,
        );
        let mut s1 = Sampler::new(1, 1);
        let mut s2 = Sampler::new(1, 1);
        let a = tl.sample_ray(10.0, 50.0, &mut s1);
        let b = ph.sample_ray(10.0, 50.0, &mut s2);
        assert!((a.o - b.o).is_zero());
        assert!((a.d - b.d).is_zero());
    }

    #[test]
    fn rays_converge_on_the_focal_plane() {
        let focal = 4.0;
        let tl = ThinLens::new(
            Vector3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 1.0, 0.0),
            64,
            64,
            45.0,
            0.25,
            focal,
        );
        let mut sampler = Sampler::new(2, 1);
        // the same raster position through different lens samples must
        // cross at one point on the focal plane
        let mut target: Option<Vector3f> = None;
        for _ in 0..8 {
            let r = tl.sample_ray(20.0, 30.0, &mut sampler);
            let t = (focal - r.o.z) / r.d.z;
            let hit = r.point_at(t);
            match target {
                None => target = Some(hit),
                Some(expect) => {
                    assert!((hit - expect).length() < 1e-3, "{:?} vs {:?}", hit, expect);
                }
            }
        }
    }
}
