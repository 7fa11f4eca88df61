//! One-bounce direct lighting, combining light sampling and BSDF
//! sampling with the balance heuristic.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::integrator::balance_heuristic;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;

pub struct DirectIntegrator {
    pub spp: u32,
}

impl DirectIntegrator {
    pub fn new(spp: u32) -> Self {
        DirectIntegrator { spp }
    }

    pub fn li(&self, scene: &Scene, x: Float, y: Float, sampler: &mut Sampler) -> Spectrum {
        let ray = scene.camera.sample_ray(x, y, sampler);
        let info = match scene.ray_intersect(&ray) {
            Some(info) => info,
            None => {
                if let Some(env_idx) = scene.env_light {
                    let far = ray.o + ray.d * (scene.radius * 2.0);
                    return scene.lights[env_idx].radiance(&ray.o, &far, &-ray.d);
                }
                return Spectrum::zero();
            }
        };

        let shape = &scene.shapes[info.shape_index];
        let local_ray_dir = info.frame.to_local(&ray.d);
        let frontside = local_ray_dir.z < 0.0;

        if let Some(light_idx) = shape.area_light {
            return scene.lights[light_idx].radiance(&ray.o, &info.p, &info.frame.n);
        }
        if scene.lights.is_empty() {
            return Spectrum::zero();
        }

        let (light_idx, pick_pdf) = scene.sample_light(sampler);
        let light = &scene.lights[light_idx];

        let mut l_light = Spectrum::zero();
        let mut l_bsdf = Spectrum::zero();

        // strategy one: sample the light
        {
            let ds = light.sample_direct_contribution(scene, &info, sampler);
            if !ds.radiance.is_zero() {
                let to_light_local = info.frame.to_local(&(ds.light_pos - info.p)).normalize();
                let f = shape.bsdf.eval(&local_ray_dir, &to_light_local, &info.uv);

                if light.is_delta() || light.is_envlight() {
                    l_light = f * ds.radiance * to_light_local.z.abs() / pick_pdf;
                } else {
                    let pdf_solidangle =
                        light.pdf_solidangle(scene, &info.p, &ds.light_pos, &ds.light_normal);
                    let bsdf_pdf = shape.bsdf.pdf(&local_ray_dir, &to_light_local);
                    let light_pdf = pick_pdf * pdf_solidangle;
                    l_light = f
                        * ds.radiance
                        * to_light_local.z.abs()
                        * balance_heuristic(light_pdf, bsdf_pdf)
                        / light_pdf;
                }
            }
        }

        // strategy two: sample the BSDF and see what it hits
        {
            let bs = shape.bsdf.sample(&local_ray_dir, &info.uv, sampler);
            if bs.is_null() {
                return l_light;
            }
            let recursive_ray = info.recursive_ray_to(&bs.wo);

            let recursive_info = match scene.ray_intersect(&recursive_ray) {
                Some(ri) => ri,
                None => {
                    let mut env = Spectrum::zero();
                    if let Some(env_idx) = scene.env_light {
                        let far = recursive_ray.o + recursive_ray.d * (scene.radius * 2.0);
                        env = scene.lights[env_idx].radiance(
                            &recursive_ray.o,
                            &far,
                            &-recursive_ray.d,
                        ) * bs.weight;
                    }
                    return l_light + env;
                }
            };

            // only emitters contribute on this strategy
            let recursive_shape = &scene.shapes[recursive_info.shape_index];
            if let Some(hit_light_idx) = recursive_shape.area_light {
                let hit_light = &scene.lights[hit_light_idx];
                let emitted = hit_light.radiance(
                    &recursive_ray.o,
                    &recursive_info.p,
                    &recursive_info.frame.n,
                );
                if shape.bsdf.is_discrete(frontside) {
                    l_bsdf = bs.weight * emitted;
                } else {
                    let light_pdf_solidangle = hit_light.pdf_solidangle(
                        scene,
                        &info.p,
                        &recursive_info.p,
                        &recursive_info.frame.n,
                    );
                    let pick = scene.pdf_light(hit_light_idx);
                    l_bsdf = bs.weight
                        * emitted
                        * balance_heuristic(bs.pdf, light_pdf_solidangle * pick);
                }
            }
        }

        l_light + l_bsdf
    }
}
