//! Bounding volume hierarchy with surface-area-heuristic splits, generic
//! over how primitives are accessed so the same build and traversal
//! serve both the scene level (shape indices) and the mesh level
//! (triangle indices).

// lumiray
use crate::core::base::Float;
use crate::core::geometry::{Aabb, Ray, Vector3f};
use crate::core::interaction::Intersection;

// as pbrt says so...
const COST_TRAVERSAL: Float = 1.0;
const COST_INTERSECTION: Float = 2.0;
const BVH_BUCKET_COUNT: usize = 12;
const BVH_MAX_PRIMITIVE_NUM: usize = 4;

/// Access to the primitives a BVH is built over, by index.
pub trait BvhPrimitives {
    fn aabb(&self, prim: u32) -> Aabb;
    fn center(&self, prim: u32) -> Vector3f;
    fn intersect(&self, prim: u32, ray: &Ray, maxt: Float) -> Option<Intersection>;
}

pub struct Bvh {
    root: BvhNode,
}

struct BvhNode {
    aabb: Aabb,
    split_axis: usize,
    kind: NodeKind,
}

enum NodeKind {
    Leaf(Vec<u32>),
    Interior(Box<BvhNode>, Box<BvhNode>),
}

impl Bvh {
    pub fn build<P: BvhPrimitives>(prims: Vec<u32>, access: &P) -> Bvh {
        assert!(!prims.is_empty(), "BVH over zero primitives");
        let mut root = BvhNode::new(prims, access);
        root.create_children(access);
        Bvh { root }
    }

    pub fn ray_intersect<P: BvhPrimitives>(
        &self,
        ray: &Ray,
        maxt: Float,
        access: &P,
    ) -> Option<Intersection> {
        self.root.ray_intersect(ray, maxt, access)
    }

    pub fn aabb(&self) -> Aabb {
        self.root.aabb
    }
}

impl BvhNode {
    fn new<P: BvhPrimitives>(prims: Vec<u32>, access: &P) -> BvhNode {
        let mut aabb = access.aabb(prims[0]);
        for &p in prims.iter().skip(1) {
            aabb = Aabb::merge(&aabb, &access.aabb(p));
        }
        BvhNode {
            aabb,
            split_axis: 0,
            kind: NodeKind::Leaf(prims),
        }
    }

    fn bucket_of<P: BvhPrimitives>(&self, access: &P, prim: u32, axis: usize) -> usize {
        let rel = self.aabb.offset(&access.center(prim))[axis];
        ((rel * BVH_BUCKET_COUNT as Float) as usize).min(BVH_BUCKET_COUNT - 1)
    }

    fn create_children<P: BvhPrimitives>(&mut self, access: &P) {
        let prims = match &self.kind {
            NodeKind::Leaf(p) => p,
            NodeKind::Interior(..) => return,
        };
        if prims.len() <= 2 {
            return;
        }

        let axis = self.aabb.longest_axis();
        let cut_count = BVH_BUCKET_COUNT - 1;

        // bin primitives by centroid position along the split axis
        let mut counts = [0usize; BVH_BUCKET_COUNT];
        let mut bounds = [Aabb::default(); BVH_BUCKET_COUNT];
        for &p in prims.iter() {
            let b = self.bucket_of(access, p, axis);
            counts[b] += 1;
            bounds[b] = Aabb::merge(&bounds[b], &access.aabb(p));
        }

        // cost of each candidate cut: SA_L * N_L + SA_R * N_R
        let mut costs = [Float::INFINITY; BVH_BUCKET_COUNT - 1];
        let mut lower_aabb = Aabb::default();
        let mut lower_count = 0usize;
        for i in 0..cut_count {
            lower_aabb = Aabb::merge(&lower_aabb, &bounds[i]);
            lower_count += counts[i];
            if lower_count > 0 {
                costs[i] = lower_aabb.surface_area() * lower_count as Float;
            }
        }
        let mut upper_aabb = Aabb::default();
        let mut upper_count = 0usize;
        for i in (1..=cut_count).rev() {
            upper_aabb = Aabb::merge(&upper_aabb, &bounds[i]);
            upper_count += counts[i];
            if upper_count > 0 && costs[i - 1].is_finite() {
                costs[i - 1] += upper_aabb.surface_area() * upper_count as Float;
            } else {
                costs[i - 1] = Float::INFINITY;
            }
        }

        let mut best_cut = 0;
        let mut best_cost = Float::INFINITY;
        for (i, &c) in costs.iter().enumerate() {
            if c < best_cost {
                best_cut = i;
                best_cost = c;
            }
        }
        if !best_cost.is_finite() {
            // every cut leaves one side empty
            return;
        }

        let total_cost = COST_TRAVERSAL + best_cost / self.aabb.surface_area();
        if prims.len() > BVH_MAX_PRIMITIVE_NUM
            || total_cost < prims.len() as Float * COST_INTERSECTION
        {
            let (left, right): (Vec<u32>, Vec<u32>) = prims
                .iter()
                .copied()
                .partition(|&p| self.bucket_of(access, p, axis) <= best_cut);
            if left.is_empty() || right.is_empty() {
                return;
            }

            let mut left_node = BvhNode::new(left, access);
            let mut right_node = BvhNode::new(right, access);
            left_node.create_children(access);
            right_node.create_children(access);
            self.split_axis = axis;
            self.kind = NodeKind::Interior(Box::new(left_node), Box::new(right_node));
        }
    }

    fn ray_intersect<P: BvhPrimitives>(
        &self,
        ray: &Ray,
        maxt: Float,
        access: &P,
    ) -> Option<Intersection> {
        match &self.kind {
            NodeKind::Leaf(prims) => {
                let mut best: Option<Intersection> = None;
                let mut best_t = maxt;
                for &p in prims.iter() {
                    if let Some(info) = access.intersect(p, ray, best_t) {
                        best_t = info.t;
                        best = Some(info);
                    }
                }
                best
            }
            NodeKind::Interior(left, right) => {
                if !self.aabb.ray_intersect(ray, maxt).0 {
                    return None;
                }
                // near child first, bounded by the best hit so far
                let (first, second) = if ray.d[self.split_axis] > 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };

                let mut best = first.ray_intersect(ray, maxt, access);
                let best_t = best.as_ref().map_or(maxt, |i| i.t);
                if let Some(info) = second.ray_intersect(ray, best_t, access) {
                    best = Some(info);
                }
                best
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn random_soup(sampler: &mut Sampler, n: usize) -> TriangleSoup {
        let mut triangles = Vec::with_capacity(n);
        for _ in 0..n {
            let base = Vector3f::new(
                sampler.sample_1d() * 10.0 - 5.0,
                sampler.sample_1d() * 10.0 - 5.0,
                sampler.sample_1d() * 10.0 - 5.0,
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
        TriangleSoup { triangles }
    }

    fn linear_scan(soup: &TriangleSoup, ray: &Ray) -> Option<Intersection> {
        let mut best: Option<Intersection> = None;
        let mut best_t = Float::INFINITY;
        for t in soup.triangles.iter() {
            if let Some(info) = t.ray_intersect(ray, best_t) {
                best_t = info.t;
                best = Some(info);
            }
        }
        best
    }

    #[test]
    fn traversal_matches_linear_scan() {
        let mut sampler = Sampler::new(77, 1);
        let soup = random_soup(&mut sampler, 300);
        let bvh = Bvh::build((0..300u32).collect(), &soup);

        let mut checked_hits = 0;
        for _ in 0..500 {
            let o = Vector3f::new(
                sampler.sample_1d() * 16.0 - 8.0,
                sampler.sample_1d() * 16.0 - 8.0,
                sampler.sample_1d() * 16.0 - 8.0,
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
            let expect = linear_scan(&soup, &ray);
            let got = bvh.ray_intersect(&ray, Float::INFINITY, &soup);
            match (expect, got) {
                (None, None) => {}
                (Some(a), Some(b)) => {
                    assert!((a.t - b.t).abs() < 1e-4, "t {} vs {}", a.t, b.t);
                    checked_hits += 1;
                }
                (a, b) => panic!(
                    "hit disagreement: linear {:?} vs bvh {:?}",
                    a.map(|i| i.t),
                    b.map(|i| i.t)
                ),
            }
        }
        assert!(checked_hits > 50, "too few hits to be meaningful");
    }

    #[test]
    fn single_primitive_stays_leaf() {
        let mut sampler = Sampler::new(5, 1);
        let soup = random_soup(&mut sampler, 1);
        let bvh = Bvh::build(vec![0], &soup);
        let c = soup.triangles[0].center();
        let ray = Ray::new(c + Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        // whatever the linear scan says, the bvh must agree
        assert_eq!(
            bvh.ray_intersect(&ray, Float::INFINITY, &soup).is_some(),
            linear_scan(&soup, &ray).is_some()
        );
    }
}
