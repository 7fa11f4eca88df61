//! Integrator dispatch and the parallel per-pixel render loop. Rows are
//! distributed across the rayon pool; every row owns a sampler seeded by
//! its row index, so a render is reproducible bit-for-bit for a fixed
//! scene.

// std
use std::time::Instant;
// others
use rayon::prelude::*;
// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::image::Image;
use crate::core::progress::ProgressBar;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::integrators::debug;
use crate::integrators::direct::DirectIntegrator;
use crate::integrators::path::PathIntegrator;

pub fn balance_heuristic(a: Float, b: Float) -> Float {
    a / (a + b)
}

pub enum Integrator {
    Depth,
    Uv,
    HitPos,
    Normal,
    Direct(DirectIntegrator),
    Path(PathIntegrator),
}

impl Integrator {
    fn spp(&self) -> u32 {
        match self {
            Integrator::Depth | Integrator::Uv | Integrator::HitPos | Integrator::Normal => 1,
            Integrator::Direct(d) => d.spp,
            Integrator::Path(p) => p.spp,
        }
    }

    fn pixel_radiance(&self, scene: &Scene, x: Float, y: Float, sampler: &mut Sampler) -> Spectrum {
        match self {
            Integrator::Depth => debug::depth(scene, x, y, sampler),
            Integrator::Uv => debug::uv(scene, x, y, sampler),
            Integrator::HitPos => debug::hitpos(scene, x, y, sampler),
            Integrator::Normal => debug::normal(scene, x, y, sampler),
            Integrator::Direct(d) => d.li(scene, x, y, sampler),
            Integrator::Path(p) => p.li(scene, x, y, sampler),
        }
    }

    /// Render the scene into a fresh image. Workers write disjoint rows,
    /// so the only synchronisation is the progress counter.
    pub fn render(&self, scene: &Scene) -> Image {
        let width = scene.camera.width();
        let height = scene.camera.height();
        let spp = self.spp();
        let mut img = Image::new(width, height);

        let progress = ProgressBar::new(height as usize);
        log::info!("render start: {}x{}, {} spp", width, height, spp);
        let start = Instant::now();

        let row_len = width as usize * Image::channels();
        img.data_mut()
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(j, row)| {
                let mut sampler = Sampler::new(j as u64, 1);
                for i in 0..width {
                    let mut rgb = Spectrum::zero();
                    for _ in 0..spp {
                        let dx = sampler.sample_1d();
                        let dy = sampler.sample_1d();
                        rgb += self.pixel_radiance(
                            scene,
                            i as Float + dx,
                            j as Float + dy,
                            &mut sampler,
                        );
                    }
                    rgb /= spp as Float;

                    let o = i as usize * Image::channels();
                    row[o] = rgb.x;
                    row[o + 1] = rgb.y;
                    row[o + 2] = rgb.z;
                }
                progress.increase();
            });

        progress.finish();
        log::info!("render done in {:.3} s", start.elapsed().as_secs_f32());
        img
    }
}
