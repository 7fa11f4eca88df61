//! Unidirectional path tracer with next-event estimation and multiple
//! importance sampling under the balance heuristic, plus
//! Russian-roulette termination.

// lumiray
use crate::core::base::{Float, Spectrum};
use crate::core::integrator::balance_heuristic;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;

pub struct PathIntegrator {
    pub rr_depth: u32,
    pub max_depth: u32,
    pub spp: u32,
}

impl PathIntegrator {
    pub fn new(rr_depth: u32, max_depth: u32, spp: u32) -> Self {
        PathIntegrator {
            rr_depth,
            max_depth,
            spp,
        }
    }

    pub fn li(&self, scene: &Scene, x: Float, y: Float, sampler: &mut Sampler) -> Spectrum {
        let mut ray = scene.camera.sample_ray(x, y, sampler);
        // throughput: the product of f |cos| / pdf along the path
        let mut beta = Spectrum::one();
        let mut radiance = Spectrum::zero();
        let mut from_specular = true;
        let mut prev_bsdf_pdf: Float = 1.0;

        for depth in 1..=self.max_depth {
            let info = match scene.ray_intersect(&ray) {
                Some(info) => info,
                None => {
                    // escaped: pick up the environment, unweighted
                    // (sampling the environment is efficient on its own)
                    if let Some(env_idx) = scene.env_light {
                        let far = ray.o + ray.d * (scene.radius * 2.0);
                        let env = scene.lights[env_idx].radiance(&ray.o, &far, &-ray.d);
                        radiance += env * beta;
                    }
                    break;
                }
            };

            let shape = &scene.shapes[info.shape_index];
            let local_ray_dir = info.frame.to_local(&ray.d);
            let frontside = local_ray_dir.z < 0.0;

            if let Some(light_idx) = shape.area_light {
                // hit an emitter: weight against the chance that light
                // sampling would have produced this vertex
                let light = &scene.lights[light_idx];
                let pdf_solidangle =
                    light.pdf_solidangle(scene, &ray.o, &info.p, &info.frame.n);
                let pdf_pick_light = scene.pdf_light(light_idx);
                let weight =
                    balance_heuristic(prev_bsdf_pdf, pdf_pick_light * pdf_solidangle);
                let emitted = light.radiance(&ray.o, &info.p, &info.frame.n) * beta;

                radiance += if from_specular {
                    emitted
                } else {
                    emitted * weight
                };
                break;
            }

            if depth == self.max_depth {
                break;
            }

            // next-event estimation, pointless for delta lobes
            let is_current_discrete = shape.bsdf.is_discrete(frontside);
            if !is_current_discrete && !scene.lights.is_empty() {
                let (light_idx, pick_pdf) = scene.sample_light(sampler);
                let light = &scene.lights[light_idx];
                let ds = light.sample_direct_contribution(scene, &info, sampler);

                if !ds.radiance.is_zero() {
                    let to_light_local = info
                        .frame
                        .to_local(&(ds.light_pos - info.p))
                        .normalize();
                    let f = shape.bsdf.eval(&local_ray_dir, &to_light_local, &info.uv);

                    if light.is_delta() || light.is_envlight() {
                        // no MIS against delta lights; env contributions
                        // arrive pre-divided by their direction pdf
                        radiance +=
                            f * ds.radiance * beta * to_light_local.z.abs() / pick_pdf;
                    } else {
                        let pdf_solidangle = light.pdf_solidangle(
                            scene,
                            &info.p,
                            &ds.light_pos,
                            &ds.light_normal,
                        );
                        let bsdf_pdf = shape.bsdf.pdf(&local_ray_dir, &to_light_local);
                        let light_pdf = pick_pdf * pdf_solidangle;
                        radiance += f
                            * ds.radiance
                            * beta
                            * to_light_local.z.abs()
                            * balance_heuristic(light_pdf, bsdf_pdf)
                            / light_pdf;
                    }
                }
            }

            // russian roulette once past the guaranteed depth
            if !from_specular && depth >= self.rr_depth {
                let q = beta.max_component();
                if q > sampler.sample_1d() {
                    beta /= q;
                } else {
                    break;
                }
            }

            // continue the path by sampling the BSDF
            let bs = shape.bsdf.sample(&local_ray_dir, &info.uv, sampler);
            if bs.is_null() {
                break;
            }
            beta *= bs.weight;
            from_specular = is_current_discrete;
            ray = info.recursive_ray_to(&bs.wo);
            prev_bsdf_pdf = bs.pdf;
        }
        radiance
    }
}
