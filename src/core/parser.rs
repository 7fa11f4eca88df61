//! JSON scene description: serde-typed structs mirroring the file
//! format, validated and lowered into the runtime [`Scene`]. Malformed
//! input surfaces as an error chain to the CLI instead of a panic.

// std
use std::path::{Path, PathBuf};
use std::sync::Arc;
// others
use anyhow::{bail, ensure, Context, Result};
use serde::Deserialize;
// lumiray
use crate::accelerators::MeshAccelKind;
use crate::bsdfs::conductor::Conductor;
use crate::bsdfs::dielectric::Dielectric;
use crate::bsdfs::diffuse::Diffuse;
use crate::bsdfs::microfacet::Microfacet;
use crate::bsdfs::mirror::Mirror;
use crate::bsdfs::oren_nayar::OrenNayar;
use crate::bsdfs::two_sided::TwoSided;
use crate::cameras::pinhole::Pinhole;
use crate::cameras::thinlens::ThinLens;
use crate::core::base::{Float, Spectrum};
use crate::core::bsdf::{ior, Bsdf, Conductors};
use crate::core::camera::Camera;
use crate::core::geometry::{Matrix4x4, Vector3f};
use crate::core::image::Image;
use crate::core::integrator::Integrator;
use crate::core::light::Light;
use crate::core::scene::Scene;
use crate::core::shape::{Geometry, Shape};
use crate::core::texture::{ImageTexture, Texture};
use crate::integrators::direct::DirectIntegrator;
use crate::integrators::path::PathIntegrator;
use crate::lights::constant_env::ConstantEnvLight;
use crate::lights::image_env::ImageEnvLight;
use crate::lights::point::PointLight;
use crate::shapes::mesh::TriangleMesh;
use crate::shapes::triangle::Triangle;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDesc {
    pub integrator: IntegratorDesc,
    pub camera: CameraDesc,
    #[serde(default)]
    pub shape: Vec<ShapeDesc>,
    #[serde(default)]
    pub light: Vec<LightDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum IntegratorDesc {
    Depth,
    Uv,
    Hitpos,
    Normal,
    Direct {
        spp: u32,
    },
    Path {
        spp: u32,
        depth_rr: u32,
        depth_max: u32,
    },
}

#[derive(Debug, Deserialize)]
pub struct CameraDesc {
    #[serde(rename = "type")]
    pub kind: String,
    pub pos: Option<[Float; 3]>,
    pub dir: Option<[Float; 3]>,
    pub up: Option<[Float; 3]>,
    pub to_world: Option<TransformDesc>,
    pub width: u32,
    pub height: u32,
    pub fov: Float,
    pub lens_radius: Option<Float>,
    pub focal_dist: Option<Float>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeDesc {
    Obj {
        path: String,
        to_world: Option<TransformDesc>,
        bsdf: Option<BsdfDesc>,
        arealight: Option<AreaLightDesc>,
        accel: Option<AccelDesc>,
    },
    Ply {
        path: String,
        to_world: Option<TransformDesc>,
        bsdf: Option<BsdfDesc>,
        arealight: Option<AreaLightDesc>,
        accel: Option<AccelDesc>,
    },
    Triangle {
        p0: [Float; 3],
        p1: [Float; 3],
        p2: [Float; 3],
        n0: Option<[Float; 3]>,
        n1: Option<[Float; 3]>,
        n2: Option<[Float; 3]>,
        bsdf: Option<BsdfDesc>,
        arealight: Option<AreaLightDesc>,
    },
}

#[derive(Debug, Deserialize)]
pub struct AreaLightDesc {
    pub radiance: [Float; 3],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccelDesc {
    Bvh,
    Octree,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BsdfDesc {
    Diffuse {
        albedo: Option<[Float; 3]>,
        texture: Option<TextureDesc>,
    },
    Mirror,
    Dielectric {
        in_ior: Option<Float>,
        ex_ior: Option<Float>,
    },
    Conductor {
        material: String,
        ex_ior: Option<Float>,
    },
    Microfacet {
        alpha: Float,
        in_ior: Option<Float>,
        ex_ior: Option<Float>,
        kd: [Float; 3],
    },
    Orennayar {
        albedo: [Float; 3],
        sigma: Float,
    },
    Twosided {
        front: Box<BsdfDesc>,
        back: Box<BsdfDesc>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TextureDesc {
    Image { path: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDesc {
    Point {
        pos: [Float; 3],
        radiance: [Float; 3],
    },
    ConstantEnv {
        radiance: [Float; 3],
        scale: Option<Float>,
    },
    ImageEnv {
        path: String,
        scale: Option<Float>,
        to_world: Option<TransformDesc>,
    },
}

/// Either a flat row-major 4x4 or a list of elementary transforms
/// composed in declaration order, the first listed applied first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TransformDesc {
    Flat(Vec<Float>),
    Ops(Vec<TransformOp>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformOp {
    Translate { value: [Float; 3] },
    Scale { value: [Float; 3] },
    RotateX { degree: Float },
    RotateY { degree: Float },
    RotateZ { degree: Float },
}

impl TransformDesc {
    pub fn to_matrix(&self) -> Result<Matrix4x4> {
        match self {
            TransformDesc::Flat(values) => {
                ensure!(
                    values.len() == 16,
                    "flat transform needs 16 values, found {}",
                    values.len()
                );
                let mut m = [[0.0; 4]; 4];
                for i in 0..4 {
                    for j in 0..4 {
                        m[i][j] = values[i * 4 + j];
                    }
                }
                Ok(Matrix4x4::from_rows(m))
            }
            TransformDesc::Ops(ops) => {
                let mut mat = Matrix4x4::identity();
                for op in ops.iter() {
                    let step = match op {
                        TransformOp::Translate { value } => {
                            Matrix4x4::translate(value[0], value[1], value[2])
                        }
                        TransformOp::Scale { value } => {
                            Matrix4x4::scale(value[0], value[1], value[2])
                        }
                        TransformOp::RotateX { degree } => Matrix4x4::rotate_x(*degree),
                        TransformOp::RotateY { degree } => Matrix4x4::rotate_y(*degree),
                        TransformOp::RotateZ { degree } => Matrix4x4::rotate_z(*degree),
                    };
                    mat = step * mat;
                }
                Ok(mat)
            }
        }
    }
}

fn vec3(v: &[Float; 3]) -> Vector3f {
    Vector3f::new(v[0], v[1], v[2])
}

pub fn parse_scene_str(text: &str) -> Result<SceneDesc> {
    serde_json::from_str(text).context("malformed scene description")
}

/// Lower a parsed description into a built scene plus its integrator.
/// Relative mesh/image paths resolve against `base_dir`.
pub fn build_scene(desc: SceneDesc, base_dir: &Path) -> Result<(Scene, Integrator)> {
    let integrator = build_integrator(&desc.integrator)?;
    let camera = build_camera(&desc.camera)?;

    let mut scene = Scene::new(camera);

    for shape_desc in desc.shape.iter() {
        add_shape(&mut scene, shape_desc, base_dir)?;
    }
    for light_desc in desc.light.iter() {
        let light = build_light(light_desc, base_dir)?;
        scene.add_light(light);
    }

    scene.build()?;
    Ok((scene, integrator))
}

fn build_integrator(desc: &IntegratorDesc) -> Result<Integrator> {
    Ok(match desc {
        IntegratorDesc::Depth => Integrator::Depth,
        IntegratorDesc::Uv => Integrator::Uv,
        IntegratorDesc::Hitpos => Integrator::HitPos,
        IntegratorDesc::Normal => Integrator::Normal,
        IntegratorDesc::Direct { spp } => {
            ensure!(*spp > 0, "direct integrator needs a positive spp");
            Integrator::Direct(DirectIntegrator::new(*spp))
        }
        IntegratorDesc::Path {
            spp,
            depth_rr,
            depth_max,
        } => {
            ensure!(*spp > 0, "path integrator needs a positive spp");
            ensure!(
                *depth_rr > 0 && *depth_max > 0,
                "path integrator needs positive depths"
            );
            Integrator::Path(PathIntegrator::new(*depth_rr, *depth_max, *spp))
        }
    })
}

fn build_camera(desc: &CameraDesc) -> Result<Camera> {
    ensure!(
        desc.width > 0 && desc.height > 0,
        "camera needs positive dimensions"
    );
    ensure!(desc.fov > 0.0, "camera needs a positive fov");

    let lens = match desc.kind.as_str() {
        "pinhole" => None,
        "thinlens" => {
            let radius = desc
                .lens_radius
                .context("thinlens camera needs lens_radius")?;
            let dist = desc.focal_dist.context("thinlens camera needs focal_dist")?;
            ensure!(dist > 0.0, "focal_dist must be positive");
            Some((radius, dist))
        }
        other => bail!("unsupported camera type: {}", other),
    };

    enum Frame {
        LookAt(Vector3f, Vector3f, Vector3f),
        Matrix(Matrix4x4),
    }

    let frame = match (&desc.to_world, &desc.pos, &desc.dir, &desc.up) {
        (Some(t), None, None, None) => Frame::Matrix(t.to_matrix()?),
        (None, Some(pos), Some(dir), Some(up)) => {
            Frame::LookAt(vec3(pos), vec3(dir), vec3(up))
        }
        _ => bail!("camera needs either pos/dir/up or to_world"),
    };

    Ok(match (frame, lens) {
        (Frame::LookAt(pos, dir, up), None) => Camera::Pinhole(Pinhole::new(
            pos,
            dir,
            up,
            desc.width,
            desc.height,
            desc.fov,
        )),
        (Frame::Matrix(m), None) => {
            Camera::Pinhole(Pinhole::from_matrix(m, desc.width, desc.height, desc.fov))
        }
        (Frame::LookAt(pos, dir, up), Some((radius, dist))) => Camera::ThinLens(ThinLens::new(
            pos,
            dir,
            up,
            desc.width,
            desc.height,
            desc.fov,
            radius,
            dist,
        )),
        (Frame::Matrix(m), Some((radius, dist))) => Camera::ThinLens(ThinLens::from_matrix(
            m,
            desc.width,
            desc.height,
            desc.fov,
            radius,
            dist,
        )),
    })
}

fn add_shape(scene: &mut Scene, desc: &ShapeDesc, base_dir: &Path) -> Result<()> {
    let (geometry, bsdf_desc, arealight) = match desc {
        ShapeDesc::Obj {
            path,
            to_world,
            bsdf,
            arealight,
            accel,
        } => {
            let matrix = transform_or_identity(to_world)?;
            let mesh = TriangleMesh::load_obj(
                &resolve(base_dir, path),
                &matrix,
                accel_kind(accel),
            )?;
            (Geometry::Mesh(mesh), bsdf, arealight)
        }
        ShapeDesc::Ply {
            path,
            to_world,
            bsdf,
            arealight,
            accel,
        } => {
            let matrix = transform_or_identity(to_world)?;
            let mesh = TriangleMesh::load_ply(
                &resolve(base_dir, path),
                &matrix,
                accel_kind(accel),
            )?;
            (Geometry::Mesh(mesh), bsdf, arealight)
        }
        ShapeDesc::Triangle {
            p0,
            p1,
            p2,
            n0,
            n1,
            n2,
            bsdf,
            arealight,
        } => {
            let mut triangle = Triangle::new(vec3(p0), vec3(p1), vec3(p2));
            if let (Some(n0), Some(n1), Some(n2)) = (n0, n1, n2) {
                triangle = triangle.with_normals(vec3(n0), vec3(n1), vec3(n2));
            }
            (Geometry::Triangle(triangle), bsdf, arealight)
        }
    };

    let bsdf = match bsdf_desc {
        Some(desc) => build_bsdf(desc, base_dir)?,
        None => Bsdf::Diffuse(Diffuse::new(Spectrum::zero())),
    };
    let shape = Shape::new(geometry, Arc::new(bsdf));

    match arealight {
        Some(al) => {
            scene.add_shape_with_area_light(shape, vec3(&al.radiance));
        }
        None => {
            scene.add_shape(shape);
        }
    }
    Ok(())
}

fn build_bsdf(desc: &BsdfDesc, base_dir: &Path) -> Result<Bsdf> {
    Ok(match desc {
        BsdfDesc::Diffuse { albedo, texture } => match (albedo, texture) {
            (_, Some(TextureDesc::Image { path })) => {
                let image = Image::read(&resolve(base_dir, path))?;
                Bsdf::Diffuse(Diffuse::with_texture(Arc::new(Texture::Image(
                    ImageTexture::new(image),
                ))))
            }
            (Some(albedo), None) => Bsdf::Diffuse(Diffuse::new(vec3(albedo))),
            (None, None) => Bsdf::Diffuse(Diffuse::new(Spectrum::zero())),
        },
        BsdfDesc::Mirror => Bsdf::Mirror(Mirror::new()),
        BsdfDesc::Dielectric { in_ior, ex_ior } => Bsdf::Dielectric(Dielectric::new(
            positive(in_ior.unwrap_or(ior::GLASS), "in_ior")?,
            positive(ex_ior.unwrap_or(ior::VACUUM), "ex_ior")?,
        )),
        BsdfDesc::Conductor { material, ex_ior } => {
            let kind = match material.as_str() {
                "Au" => Conductors::Au,
                "Ag" => Conductors::Ag,
                "Al" => Conductors::Al,
                "Cu" => Conductors::Cu,
                other => bail!("unknown conductor material: {}", other),
            };
            Bsdf::Conductor(Conductor::new(
                kind,
                positive(ex_ior.unwrap_or(ior::VACUUM), "ex_ior")?,
            ))
        }
        BsdfDesc::Microfacet {
            alpha,
            in_ior,
            ex_ior,
            kd,
        } => Bsdf::Microfacet(Microfacet::new(
            positive(*alpha, "alpha")?,
            positive(in_ior.unwrap_or(ior::GLASS), "in_ior")?,
            positive(ex_ior.unwrap_or(ior::VACUUM), "ex_ior")?,
            vec3(kd),
        )),
        BsdfDesc::Orennayar { albedo, sigma } => {
            Bsdf::OrenNayar(OrenNayar::new(vec3(albedo), positive(*sigma, "sigma")?))
        }
        BsdfDesc::Twosided { front, back } => Bsdf::TwoSided(TwoSided::new(
            build_bsdf(front, base_dir)?,
            build_bsdf(back, base_dir)?,
        )),
    })
}

fn build_light(desc: &LightDesc, base_dir: &Path) -> Result<Light> {
    Ok(match desc {
        LightDesc::Point { pos, radiance } => {
            Light::Point(PointLight::new(vec3(pos), vec3(radiance)))
        }
        LightDesc::ConstantEnv { radiance, scale } => Light::ConstantEnv(ConstantEnvLight::new(
            vec3(radiance),
            scale.unwrap_or(1.0),
        )),
        LightDesc::ImageEnv {
            path,
            scale,
            to_world,
        } => {
            let image = Image::read(&resolve(base_dir, path))?;
            let matrix = transform_or_identity(to_world)?;
            Light::ImageEnv(ImageEnvLight::new(image, scale.unwrap_or(1.0), &matrix))
        }
    })
}

fn accel_kind(desc: &Option<AccelDesc>) -> MeshAccelKind {
    match desc {
        Some(AccelDesc::Octree) => MeshAccelKind::Octree,
        Some(AccelDesc::Bvh) | None => MeshAccelKind::Bvh,
    }
}

fn transform_or_identity(desc: &Option<TransformDesc>) -> Result<Matrix4x4> {
    match desc {
        Some(t) => t.to_matrix(),
        None => Ok(Matrix4x4::identity()),
    }
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn positive(value: Float, name: &str) -> Result<Float> {
    ensure!(value > 0.0, "{} must be positive, found {}", name, value);
    Ok(value)
}
