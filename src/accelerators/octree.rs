//! Octree over mesh triangles, the alternative to the mesh-level BVH.
//! Nodes split at their centre into eight children; a triangle goes to
//! the first child whose box contains its centroid. Children then shrink
//! to the tight union of their triangles' boxes, which is what makes the
//! traversal cheap, and are visited in ascending ray entry distance.

// others
use rayon::prelude::*;
use smallvec::SmallVec;
// lumiray
use crate::accelerators::bvh::BvhPrimitives;
use crate::core::base::Float;
use crate::core::geometry::{Aabb, Ray};
use crate::core::interaction::Intersection;

const MAX_DEPTH: u32 = 7;
const MAX_TRIANGLE_NUM: usize = 30;

pub struct Octree {
    root: Node,
}

#[derive(Default)]
struct Node {
    aabb: Aabb,
    children: Vec<Node>,
    triangles: Vec<u32>,
}

impl Octree {
    pub fn build<P: BvhPrimitives + Sync>(prim_count: u32, access: &P) -> Octree {
        assert!(prim_count > 0, "octree over zero triangles");
        let mut aabb = access.aabb(0);
        for p in 1..prim_count {
            aabb = Aabb::merge(&aabb, &access.aabb(p));
        }
        let mut root = Node {
            aabb,
            children: Vec::new(),
            triangles: (0..prim_count).collect(),
        };
        root.construct_children_recursively(access, 0);
        Octree { root }
    }

    pub fn ray_intersect<P: BvhPrimitives>(
        &self,
        ray: &Ray,
        maxt: Float,
        access: &P,
    ) -> Option<Intersection> {
        if !self.root.aabb.ray_intersect(ray, maxt).0 {
            return None;
        }
        self.root.ray_intersect(ray, maxt, access)
    }

    pub fn aabb(&self) -> Aabb {
        self.root.aabb
    }
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn construct_children<P: BvhPrimitives>(&mut self, access: &P) {
        let center = self.aabb.center();

        let mut children: Vec<Node> = (0..8)
            .map(|i| Node {
                aabb: Aabb::new(center, self.aabb.corner(i)),
                children: Vec::new(),
                triangles: Vec::new(),
            })
            .collect();

        for &ti in self.triangles.iter() {
            let c = access.center(ti);
            for child in children.iter_mut() {
                if child.aabb.is_contain(&c) {
                    child.triangles.push(ti);
                    break;
                }
            }
        }

        children.retain(|c| !c.triangles.is_empty());
        self.triangles.clear();

        // shrink each child to the union of its triangles' boxes
        for child in children.iter_mut() {
            let mut shrunk = access.aabb(child.triangles[0]);
            for &ti in child.triangles.iter().skip(1) {
                shrunk = Aabb::merge(&shrunk, &access.aabb(ti));
            }
            child.aabb = shrunk;
        }
        self.children = children;
    }

    fn construct_children_recursively<P: BvhPrimitives + Sync>(
        &mut self,
        access: &P,
        depth: u32,
    ) {
        // only nodes over the triangle budget split, the root included
        if depth > MAX_DEPTH || self.triangles.len() <= MAX_TRIANGLE_NUM {
            return;
        }

        self.construct_children(access);

        if depth == 0 && self.children.len() == 8 {
            self.children
                .par_iter_mut()
                .for_each(|c| c.construct_children_recursively(access, depth + 1));
        } else {
            for c in self.children.iter_mut() {
                c.construct_children_recursively(access, depth + 1);
            }
        }
    }

    fn ray_intersect_leaf<P: BvhPrimitives>(
        &self,
        ray: &Ray,
        maxt: Float,
        access: &P,
    ) -> Option<Intersection> {
        let mut best: Option<Intersection> = None;
        let mut best_t = maxt;
        for &ti in self.triangles.iter() {
            if let Some(info) = access.intersect(ti, ray, best_t) {
                best_t = info.t;
                best = Some(info);
            }
        }
        best
    }

    fn ray_intersect_branch<P: BvhPrimitives>(
        &self,
        ray: &Ray,
        maxt: Float,
        access: &P,
    ) -> Option<Intersection> {
        let mut entries: SmallVec<[(usize, Float); 8]> = SmallVec::new();
        for (i, child) in self.children.iter().enumerate() {
            let (hit, tmin, _) = child.aabb.ray_intersect(ray, maxt);
            if hit {
                entries.push((i, tmin));
            }
        }
        entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut best: Option<Intersection> = None;
        let mut best_t = maxt;
        for &(idx, tmin) in entries.iter() {
            // every later child starts even further away
            if tmin > best_t {
                break;
            }
            if let Some(info) = self.children[idx].ray_intersect(ray, best_t, access) {
                best_t = info.t;
                best = Some(info);
            }
        }
        best
    }

    fn ray_intersect<P: BvhPrimitives>(
        &self,
        ray: &Ray,
        maxt: Float,
        access: &P,
    ) -> Option<Intersection> {
        if self.is_leaf() {
            self.ray_intersect_leaf(ray, maxt, access)
        } else {
            self.ray_intersect_branch(ray, maxt, access)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vector3f;
    use crate::core::sampler::Sampler;
    use crate::shapes::triangle::Triangle;

    struct TriangleSoup {
        triangles: Vec<Triangle>,
    }

    impl BvhPrimitives for TriangleSoup {
        fn aabb(&self, prim: u32) -> Aabb {
            self.triangles[prim as usize].aabb()
        }
        fn center(&self, prim: u32) -> Vector3f {
            self.triangles[prim as usize].center()
        }
        fn intersect(&self, prim: u32, ray: &Ray, maxt: Float) -> Option<Intersection> {
            self.triangles[prim as usize].ray_intersect(ray, maxt)
        }
    }

    #[test]
    fn small_mesh_root_stays_leaf() {
        // at or under the triangle budget nothing splits
        let mut triangles = Vec::new();
        for i in 0..3 {
            let base = Vector3f::new(i as Float, 0.0, 0.0);
            triangles.push(Triangle::new(
                base,
                base + Vector3f::new(0.5, 0.0, 0.0),
                base + Vector3f::new(0.0, 0.5, 0.0),
            ));
        }
        let soup = TriangleSoup { triangles };
        let octree = Octree::build(3, &soup);
        assert!(octree.root.is_leaf());
        assert_eq!(octree.root.triangles.len(), 3);

        let ray = Ray::new(Vector3f::new(1.1, 0.1, 1.0), Vector3f::new(0.0, 0.0, -1.0));
        let hit = octree.ray_intersect(&ray, Float::INFINITY, &soup).expect("hit");
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn traversal_matches_linear_scan() {
        let mut sampler = Sampler::new(31, 1);
        let mut triangles = Vec::new();
        for _ in 0..200 {
            let base = Vector3f::new(
                sampler.sample_1d() * 8.0 - 4.0,
                sampler.sample_1d() * 8.0 - 4.0,
                sampler.sample_1d() * 8.0 - 4.0,
            );
            let e1 = Vector3f::new(
                sampler.sample_1d() - 0.5,
                sampler.sample_1d() - 0.5,
                sampler.sample_1d() - 0.5,
            );
            let e2 = Vector3f::new(
                sampler.sample_1d() - 0.5,
                sampler.sample_1d() - 0.5,
                sampler.sample_1d() - 0.5,
            );
            triangles.push(Triangle::new(base, base + e1, base + e2));
        }
        let soup = TriangleSoup { triangles };
        let octree = Octree::build(200, &soup);

        let mut hits = 0;
        for _ in 0..400 {
            let o = Vector3f::new(
                sampler.sample_1d() * 12.0 - 6.0,
                sampler.sample_1d() * 12.0 - 6.0,
                sampler.sample_1d() * 12.0 - 6.0,
            );
            let d = Vector3f::new(
                sampler.sample_1d() - 0.5,
                sampler.sample_1d() - 0.5,
                sampler.sample_1d() - 0.5,
            );
            if d.length() < 1e-3 {
                continue;
            }
            let ray = Ray::new(o, d);

            let mut linear: Option<Intersection> = None;
            let mut best_t = Float::INFINITY;
            for t in soup.triangles.iter() {
                if let Some(info) = t.ray_intersect(&ray, best_t) {
                    best_t = info.t;
                    linear = Some(info);
                }
            }

            let got = octree.ray_intersect(&ray, Float::INFINITY, &soup);
            match (linear, got) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    assert!((a.t - b.t).abs() < 1e-4);
                    hits += 1;
                }
                (a, b) => panic!("octree disagreement: {:?} vs {:?}", a.map(|i| i.t), b.map(|i| i.t)),
            }
        }
        assert!(hits > 30);
    }
}
