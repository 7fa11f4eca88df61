//! Triangle meshes: vertex/normal/uv arrays with per-attribute index
//! triples. Individual triangles are materialised on demand from the
//! indices, so the mesh stays the single owner of the data. Loading
//! covers triangulated OBJ (tobj) and PLY (ply-rs).

// std
use std::path::Path;
// others
use anyhow::{bail, Context, Result};
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};
// lumiray
use crate::accelerators::bvh::{Bvh, BvhPrimitives};
use crate::accelerators::octree::Octree;
use crate::accelerators::MeshAccelKind;
use crate::core::base::Float;
use crate::core::geometry::{
    transform_normal, transform_point, Aabb, Matrix4x4, Ray, Vector2f, Vector3f,
};
use crate::core::interaction::Intersection;
use crate::core::sampler::Sampler;
use crate::core::sampling::Distribution1D;
use crate::shapes::triangle::Triangle;

/// Raw mesh arrays plus the derived quantities (total area, area
/// distribution over triangles, bounding box).
pub struct MeshData {
    vertices: Vec<Vector3f>,
    normals: Vec<Vector3f>,
    tex_coords: Vec<Vector2f>,
    vertex_indices: Vec<[u32; 3]>,
    normal_indices: Vec<[u32; 3]>,
    tex_coord_indices: Vec<[u32; 3]>,
    area: Float,
    triangle_distrib: Distribution1D,
    aabb: Aabb,
}

impl MeshData {
    pub fn new(
        vertices: Vec<Vector3f>,
        normals: Vec<Vector3f>,
        tex_coords: Vec<Vector2f>,
        vertex_indices: Vec<[u32; 3]>,
        normal_indices: Vec<[u32; 3]>,
        tex_coord_indices: Vec<[u32; 3]>,
    ) -> Result<MeshData> {
        if vertices.is_empty() || vertex_indices.is_empty() {
            bail!("mesh without vertices or faces");
        }

        let mut aabb = Aabb::default();
        for v in vertices.iter() {
            aabb = Aabb::merge(&aabb, &Aabb::new(*v, *v));
        }

        let mut data = MeshData {
            vertices,
            normals,
            tex_coords,
            vertex_indices,
            normal_indices,
            tex_coord_indices,
            area: 0.0,
            triangle_distrib: Distribution1D::default(),
            aabb,
        };

        let mut areas = Vec::with_capacity(data.triangle_count() as usize);
        let mut total = 0.0;
        for i in 0..data.triangle_count() {
            let a = data.triangle(i).area();
            areas.push(a);
            total += a;
        }
        data.area = total;
        data.triangle_distrib = Distribution1D::new(areas);
        Ok(data)
    }

    pub fn triangle_count(&self) -> u32 {
        self.vertex_indices.len() as u32
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    /// Materialise triangle `i` from the index arrays.
    pub fn triangle(&self, i: u32) -> Triangle {
        let vi = self.vertex_indices[i as usize];
        let mut tri = Triangle::new(
            self.vertices[vi[0] as usize],
            self.vertices[vi[1] as usize],
            self.vertices[vi[2] as usize],
        );
        if self.has_normals() {
            let ni = self.normal_indices[i as usize];
            tri = tri.with_normals(
                self.normals[ni[0] as usize],
                self.normals[ni[1] as usize],
                self.normals[ni[2] as usize],
            );
        }
        if self.has_tex_coords() {
            let ti = self.tex_coord_indices[i as usize];
            tri = tri.with_uvs(
                self.tex_coords[ti[0] as usize],
                self.tex_coords[ti[1] as usize],
                self.tex_coords[ti[2] as usize],
            );
        }
        tri
    }
}

/// Adapts a mesh's triangles to the acceleration structures.
pub struct MeshAccessor<'a> {
    pub data: &'a MeshData,
}

impl<'a> BvhPrimitives for MeshAccessor<'a> {
    fn aabb(&self, prim: u32) -> Aabb {
        self.data.triangle(prim).aabb()
    }
    fn center(&self, prim: u32) -> Vector3f {
        self.data.triangle(prim).center()
    }
    fn intersect(&self, prim: u32, ray: &Ray, maxt: Float) -> Option<Intersection> {
        self.data.triangle(prim).ray_intersect(ray, maxt)
    }
}

enum MeshAccel {
    Bvh(Bvh),
    Octree(Octree),
}

pub struct TriangleMesh {
    data: MeshData,
    accel: MeshAccel,
}

impl TriangleMesh {
    pub fn new(data: MeshData, accel_kind: MeshAccelKind) -> TriangleMesh {
        let accel = {
            let accessor = MeshAccessor { data: &data };
            match accel_kind {
                MeshAccelKind::Bvh => MeshAccel::Bvh(Bvh::build(
                    (0..data.triangle_count()).collect(),
                    &accessor,
                )),
                MeshAccelKind::Octree => {
                    MeshAccel::Octree(Octree::build(data.triangle_count(), &accessor))
                }
            }
        };
        TriangleMesh { data, accel }
    }

    pub fn load_obj(
        path: &Path,
        to_world: &Matrix4x4,
        accel_kind: MeshAccelKind,
    ) -> Result<TriangleMesh> {
        log::info!("loading obj {}", path.display());
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: false,
                ..Default::default()
            },
        )
        .with_context(|| format!("failed to read {}", path.display()))?;

        if models.len() != 1 {
            bail!(
                "{}: expected exactly one shape, found {}",
                path.display(),
                models.len()
            );
        }
        let mesh = &models[0].mesh;

        let vertices: Vec<Vector3f> = mesh
            .positions
            .chunks(3)
            .map(|p| transform_point(&Vector3f::new(p[0], p[1], p[2]), to_world))
            .collect();
        let normals: Vec<Vector3f> = mesh
            .normals
            .chunks(3)
            .map(|n| transform_normal(&Vector3f::new(n[0], n[1], n[2]), to_world))
            .collect();
        let tex_coords: Vec<Vector2f> = mesh
            .texcoords
            .chunks(2)
            .map(|t| Vector2f::new(t[0], t[1]))
            .collect();

        let to_triples = |idx: &[u32]| -> Vec<[u32; 3]> {
            idx.chunks(3).map(|c| [c[0], c[1], c[2]]).collect()
        };
        let vertex_indices = to_triples(&mesh.indices);
        let normal_indices = to_triples(&mesh.normal_indices);
        let tex_coord_indices = to_triples(&mesh.texcoord_indices);

        let data = MeshData::new(
            vertices,
            normals,
            tex_coords,
            vertex_indices,
            normal_indices,
            tex_coord_indices,
        )
        .with_context(|| format!("{} has no usable geometry", path.display()))?;

        Ok(TriangleMesh::new(data, accel_kind))
    }

    pub fn load_ply(
        path: &Path,
        to_world: &Matrix4x4,
        accel_kind: MeshAccelKind,
    ) -> Result<TriangleMesh> {
        log::info!("loading ply {}", path.display());
        let mut file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let parser = Parser::<DefaultElement>::new();
        let ply = parser
            .read_ply(&mut file)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        let vertex_elems = ply
            .payload
            .get("vertex")
            .with_context(|| format!("{} has no vertex element", path.display()))?;
        let face_elems = ply
            .payload
            .get("face")
            .with_context(|| format!("{} has no face element", path.display()))?;

        let has_normals = vertex_elems
            .first()
            .map(|v| v.contains_key("nx") && v.contains_key("ny") && v.contains_key("nz"))
            .unwrap_or(false);

        let mut vertices = Vec::with_capacity(vertex_elems.len());
        let mut normals = Vec::with_capacity(if has_normals { vertex_elems.len() } else { 0 });
        for elem in vertex_elems.iter() {
            let p = Vector3f::new(
                prop_to_float(&elem["x"])?,
                prop_to_float(&elem["y"])?,
                prop_to_float(&elem["z"])?,
            );
            vertices.push(transform_point(&p, to_world));
            if has_normals {
                let n = Vector3f::new(
                    prop_to_float(&elem["nx"])?,
                    prop_to_float(&elem["ny"])?,
                    prop_to_float(&elem["nz"])?,
                );
                normals.push(transform_normal(&n, to_world));
            }
        }

        let mut vertex_indices = Vec::with_capacity(face_elems.len());
        for elem in face_elems.iter() {
            let indices = elem
                .get("vertex_indices")
                .or_else(|| elem.get("vertex_index"))
                .with_context(|| format!("{} face without vertex indices", path.display()))?;
            let face = prop_to_index_list(indices)?;
            if face.len() < 3 {
                log::warn!("skipping degenerate face with {} vertices", face.len());
                continue;
            }
            // fan triangulation of polygonal faces
            for i in 1..face.len() - 1 {
                vertex_indices.push([face[0], face[i], face[i + 1]]);
            }
        }

        // ply shares one index stream across attributes
        let normal_indices = if has_normals {
            vertex_indices.clone()
        } else {
            Vec::new()
        };

        let data = MeshData::new(
            vertices,
            normals,
            Vec::new(),
            vertex_indices,
            normal_indices,
            Vec::new(),
        )
        .with_context(|| format!("{} has no usable geometry", path.display()))?;

        Ok(TriangleMesh::new(data, accel_kind))
    }

    pub fn data(&self) -> &MeshData {
        &self.data
    }

    pub fn ray_intersect(&self, ray: &Ray, maxt: Float) -> Option<Intersection> {
        let accessor = MeshAccessor { data: &self.data };
        match &self.accel {
            MeshAccel::Bvh(bvh) => bvh.ray_intersect(ray, maxt, &accessor),
            MeshAccel::Octree(octree) => octree.ray_intersect(ray, maxt, &accessor),
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.data.aabb
    }

    pub fn area(&self) -> Float {
        self.data.area
    }

    /// Pick a triangle by area, then a uniform point on it. The returned
    /// pdf is over the whole mesh surface, `1 / total_area`.
    pub fn sample_point(&self, sampler: &mut Sampler) -> (Vector3f, Vector3f, Float) {
        let i = self.data.triangle_distrib.sample(sampler.sample_1d());
        let (pos, normal, _) = self.data.triangle(i as u32).sample_point(sampler);
        (pos, normal, 1.0 / self.data.area)
    }
}

fn prop_to_float(prop: &Property) -> Result<Float> {
    match prop {
        Property::Float(f) => Ok(*f),
        Property::Double(d) => Ok(*d as Float),
        other => bail!("unexpected vertex property type: {:?}", other),
    }
}

fn prop_to_index_list(prop: &Property) -> Result<Vec<u32>> {
    match prop {
        Property::ListInt(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListUInt(v) => Ok(v.clone()),
        Property::ListUShort(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        Property::ListUChar(v) => Ok(v.iter().map(|&i| i as u32).collect()),
        other => bail!("unexpected face index type: {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two triangles forming the unit square in the xy plane.
    fn quad_data() -> MeshData {
        MeshData::new(
            vec![
                Vector3f::new(0.0, 0.0, 0.0),
                Vector3f::new(1.0, 0.0, 0.0),
                Vector3f::new(1.0, 1.0, 0.0),
                Vector3f::new(0.0, 1.0, 0.0),
            ],
            Vec::new(),
            Vec::new(),
            vec![[0, 1, 2], [0, 2, 3]],
            Vec::new(),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn derived_quantities() {
        let data = quad_data();
        assert_eq!(data.triangle_count(), 2);
        let mesh = TriangleMesh::new(data, MeshAccelKind::Bvh);
        assert!((mesh.area() - 1.0).abs() < 1e-6);
        assert_eq!(mesh.aabb().min, Vector3f::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.aabb().max, Vector3f::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn mesh_sample_point_pdf() {
        let mesh = TriangleMesh::new(quad_data(), MeshAccelKind::Bvh);
        let mut sampler = Sampler::new(17, 1);
        for _ in 0..50 {
            let (p, _n, pdf) = mesh.sample_point(&mut sampler);
            assert!((pdf - 1.0 / mesh.area()).abs() < 1e-6);
            assert!((0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y));
        }
    }

    #[test]
    fn intersect_through_both_accels() {
        for kind in [MeshAccelKind::Bvh, MeshAccelKind::Octree].iter() {
            let mesh = TriangleMesh::new(quad_data(), *kind);
            let ray = Ray::new(Vector3f::new(0.7, 0.3, 1.0), Vector3f::new(0.0, 0.0, -1.0));
            let hit = mesh.ray_intersect(&ray, Float::INFINITY).expect("hit");
            assert!((hit.t - 1.0).abs() < 1e-5);
            let miss = Ray::new(Vector3f::new(2.0, 2.0, 1.0), Vector3f::new(0.0, 0.0, -1.0));
            assert!(mesh.ray_intersect(&miss, Float::INFINITY).is_none());
        }
    }
}
