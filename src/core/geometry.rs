//! Fixed-size vectors and matrices, rays, and axis-aligned bounding
//! boxes. Everything here is plain data with value semantics; the
//! operator impls are generated with `impl_op_ex!` so borrowed and owned
//! operands mix freely.

// std
use std::ops;
use std::ops::{Index, IndexMut};
// lumiray
use crate::core::base::Float;

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector2f {
    pub x: Float,
    pub y: Float,
}

impl Vector2f {
    pub fn new(x: Float, y: Float) -> Self {
        Vector2f { x, y }
    }
    pub fn dot(&self, other: &Vector2f) -> Float {
        self.x * other.x + self.y * other.y
    }
    pub fn length(&self) -> Float {
        self.dot(self).sqrt()
    }
}

impl Index<usize> for Vector2f {
    type Output = Float;
    fn index(&self, i: usize) -> &Float {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Vector2f index out of range: {}", i),
        }
    }
}

impl_op_ex!(+|a: &Vector2f, b: &Vector2f| -> Vector2f {
    Vector2f::new(a.x + b.x, a.y + b.y)
});
impl_op_ex!(-|a: &Vector2f, b: &Vector2f| -> Vector2f {
    Vector2f::new(a.x - b.x, a.y - b.y)
});
impl_op_ex_commutative!(*|a: &Vector2f, b: Float| -> Vector2f {
    Vector2f::new(a.x * b, a.y * b)
});

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector2i {
    pub x: i32,
    pub y: i32,
}

impl Vector2i {
    pub fn new(x: i32, y: i32) -> Self {
        Vector2i { x, y }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector2u {
    pub x: u32,
    pub y: u32,
}

impl Vector2u {
    pub fn new(x: u32, y: u32) -> Self {
        Vector2u { x, y }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector3f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
}

impl Vector3f {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Vector3f { x, y, z }
    }
    pub fn splat(v: Float) -> Self {
        Vector3f { x: v, y: v, z: v }
    }
    pub fn zero() -> Self {
        Vector3f::default()
    }
    pub fn one() -> Self {
        Vector3f::splat(1.0)
    }
    pub fn dot(&self, other: &Vector3f) -> Float {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
    pub fn cross(a: &Vector3f, b: &Vector3f) -> Vector3f {
        Vector3f::new(
            a.y * b.z - a.z * b.y,
            a.z * b.x - a.x * b.z,
            a.x * b.y - a.y * b.x,
        )
    }
    pub fn length_squared(&self) -> Float {
        self.dot(self)
    }
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }
    pub fn normalize(&self) -> Vector3f {
        let inv = 1.0 / self.length();
        Vector3f::new(self.x * inv, self.y * inv, self.z * inv)
    }
    pub fn max_component(&self) -> Float {
        self.x.max(self.y).max(self.z)
    }
    pub fn sqrt(&self) -> Vector3f {
        Vector3f::new(self.x.sqrt(), self.y.sqrt(), self.z.sqrt())
    }
    /// Componentwise quotient; colour-space Fresnel maths needs it.
    pub fn div(&self, other: &Vector3f) -> Vector3f {
        Vector3f::new(self.x / other.x, self.y / other.y, self.z / other.z)
    }
    pub fn is_zero(&self) -> bool {
        self.x.abs() < 1e-7 && self.y.abs() < 1e-7 && self.z.abs() < 1e-7
    }
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }
}

impl Index<usize> for Vector3f {
    type Output = Float;
    fn index(&self, i: usize) -> &Float {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3f index out of range: {}", i),
        }
    }
}

impl IndexMut<usize> for Vector3f {
    fn index_mut(&mut self, i: usize) -> &mut Float {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vector3f index out of range: {}", i),
        }
    }
}

impl_op_ex!(+|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f::new(a.x + b.x, a.y + b.y, a.z + b.z)
});
impl_op_ex!(-|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f::new(a.x - b.x, a.y - b.y, a.z - b.z)
});
// componentwise product, matching the reflectance/radiance arithmetic
impl_op_ex!(*|a: &Vector3f, b: &Vector3f| -> Vector3f {
    Vector3f::new(a.x * b.x, a.y * b.y, a.z * b.z)
});
impl_op_ex_commutative!(*|a: &Vector3f, b: Float| -> Vector3f {
    Vector3f::new(a.x * b, a.y * b, a.z * b)
});
impl_op_ex!(/|a: &Vector3f, b: Float| -> Vector3f {
    Vector3f::new(a.x / b, a.y / b, a.z / b)
});
impl std::ops::Neg for Vector3f {
    type Output = Vector3f;
    fn neg(self) -> Vector3f {
        Vector3f::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::Neg for &Vector3f {
    type Output = Vector3f;
    fn neg(self) -> Vector3f {
        Vector3f::new(-self.x, -self.y, -self.z)
    }
}

impl_op_ex!(+=|a: &mut Vector3f, b: Vector3f| {
    a.x += b.x;
    a.y += b.y;
    a.z += b.z;
});
impl_op_ex!(*=|a: &mut Vector3f, b: Vector3f| {
    a.x *= b.x;
    a.y *= b.y;
    a.z *= b.z;
});
impl_op_ex!(/=|a: &mut Vector3f, b: Float| {
    a.x /= b;
    a.y /= b;
    a.z /= b;
});

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Vector4f {
    pub x: Float,
    pub y: Float,
    pub z: Float,
    pub w: Float,
}

impl Vector4f {
    pub fn new(x: Float, y: Float, z: Float, w: Float) -> Self {
        Vector4f { x, y, z, w }
    }
    pub fn xyz(&self) -> Vector3f {
        Vector3f::new(self.x, self.y, self.z)
    }
}

impl Index<usize> for Vector4f {
    type Output = Float;
    fn index(&self, i: usize) -> &Float {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("Vector4f index out of range: {}", i),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix3x3 {
    pub m: [[Float; 3]; 3],
}

impl Default for Matrix3x3 {
    fn default() -> Self {
        Matrix3x3 {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }
}

impl Matrix3x3 {
    /// Upper-left block of a 4x4, i.e. its rotation/scale part.
    pub fn from_upper_left(mat: &Matrix4x4) -> Self {
        let mut m = [[0.0; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            row.copy_from_slice(&mat.m[i][0..3]);
        }
        Matrix3x3 { m }
    }
    pub fn transpose(&self) -> Matrix3x3 {
        let mut t = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                t[i][j] = self.m[j][i];
            }
        }
        Matrix3x3 { m: t }
    }
    pub fn mul_vector(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        )
    }
}

/// Row-major 4x4 matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix4x4 {
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Matrix4x4::identity()
    }
}

impl Matrix4x4 {
    pub fn identity() -> Self {
        Matrix4x4 {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
    pub fn from_rows(m: [[Float; 4]; 4]) -> Self {
        Matrix4x4 { m }
    }
    pub fn from_cols(c0: Vector4f, c1: Vector4f, c2: Vector4f, c3: Vector4f) -> Self {
        let mut m = [[0.0; 4]; 4];
        for i in 0..4 {
            m[i][0] = c0[i];
            m[i][1] = c1[i];
            m[i][2] = c2[i];
            m[i][3] = c3[i];
        }
        Matrix4x4 { m }
    }
    pub fn transpose(&self) -> Matrix4x4 {
        let mut t = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                t[i][j] = self.m[j][i];
            }
        }
        Matrix4x4 { m: t }
    }
    pub fn mul_mat(a: &Matrix4x4, b: &Matrix4x4) -> Matrix4x4 {
        let mut r = [[0.0; 4]; 4];
        for (i, row) in r.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a.m[i][0] * b.m[0][j]
                    + a.m[i][1] * b.m[1][j]
                    + a.m[i][2] * b.m[2][j]
                    + a.m[i][3] * b.m[3][j];
            }
        }
        Matrix4x4 { m: r }
    }
    pub fn mul_vec4(&self, v: &Vector4f) -> Vector4f {
        Vector4f::new(
            self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z + self.m[0][3] * v.w,
            self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z + self.m[1][3] * v.w,
            self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z + self.m[2][3] * v.w,
            self.m[3][0] * v.x + self.m[3][1] * v.y + self.m[3][2] * v.z + self.m[3][3] * v.w,
        )
    }
    /// Gauss-Jordan with partial pivoting. A singular argument is a
    /// programming error here: the only inverted matrices are the camera
    /// projection chain, invertible by construction.
    pub fn inverse(&self) -> Matrix4x4 {
        let mut indxc = [0usize; 4];
        let mut indxr = [0usize; 4];
        let mut ipiv = [0usize; 4];
        let mut minv = self.m;
        for i in 0..4 {
            let mut irow = 0;
            let mut icol = 0;
            let mut big: Float = 0.0;
            // choose pivot
            for j in 0..4 {
                if ipiv[j] != 1 {
                    for (k, ipiv_k) in ipiv.iter().enumerate() {
                        if *ipiv_k == 0 && minv[j][k].abs() >= big {
                            big = minv[j][k].abs();
                            irow = j;
                            icol = k;
                        }
                    }
                }
            }
            ipiv[icol] += 1;
            if irow != icol {
                for k in 0..4 {
                    let tmp = minv[irow][k];
                    minv[irow][k] = minv[icol][k];
                    minv[icol][k] = tmp;
                }
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv[icol][icol] == 0.0 {
                panic!("singular matrix in Matrix4x4::inverse");
            }
            let pivinv = 1.0 / minv[icol][icol];
            minv[icol][icol] = 1.0;
            for j in 0..4 {
                minv[icol][j] *= pivinv;
            }
            for j in 0..4 {
                if j != icol {
                    let save = minv[j][icol];
                    minv[j][icol] = 0.0;
                    for k in 0..4 {
                        minv[j][k] -= minv[icol][k] * save;
                    }
                }
            }
        }
        for j in (0..4).rev() {
            if indxr[j] != indxc[j] {
                for k in 0..4 {
                    let tmp = minv[k][indxr[j]];
                    minv[k][indxr[j]] = minv[k][indxc[j]];
                    minv[k][indxc[j]] = tmp;
                }
            }
        }
        Matrix4x4 { m: minv }
    }

    pub fn scale(x: Float, y: Float, z: Float) -> Matrix4x4 {
        Matrix4x4::from_rows([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
    pub fn translate(x: Float, y: Float, z: Float) -> Matrix4x4 {
        Matrix4x4::from_rows([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
    pub fn rotate_x(degree: Float) -> Matrix4x4 {
        let s = crate::core::base::radians(degree).sin();
        let c = crate::core::base::radians(degree).cos();
        Matrix4x4::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
    pub fn rotate_y(degree: Float) -> Matrix4x4 {
        let s = crate::core::base::radians(degree).sin();
        let c = crate::core::base::radians(degree).cos();
        Matrix4x4::from_rows([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
    pub fn rotate_z(degree: Float) -> Matrix4x4 {
        let s = crate::core::base::radians(degree).sin();
        let c = crate::core::base::radians(degree).cos();
        Matrix4x4::from_rows([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

impl_op_ex!(*|a: &Matrix4x4, b: &Matrix4x4| -> Matrix4x4 { Matrix4x4::mul_mat(a, b) });

pub fn transform_point(p: &Vector3f, mat: &Matrix4x4) -> Vector3f {
    mat.mul_vec4(&Vector4f::new(p.x, p.y, p.z, 1.0)).xyz()
}

pub fn transform_vector(v: &Vector3f, mat: &Matrix4x4) -> Vector3f {
    mat.mul_vec4(&Vector4f::new(v.x, v.y, v.z, 0.0)).xyz()
}

/// Normals transform by the inverse transpose.
pub fn transform_normal(n: &Vector3f, mat: &Matrix4x4) -> Vector3f {
    mat.transpose()
        .inverse()
        .mul_vec4(&Vector4f::new(n.x, n.y, n.z, 0.0))
        .xyz()
}

/// A ray with unit direction and cached per-component reciprocal
/// direction. Never mutated after construction.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub o: Vector3f,
    pub d: Vector3f,
    pub d_recip: Vector3f,
}

impl Ray {
    pub fn new(o: Vector3f, d: Vector3f) -> Self {
        let d = d.normalize();
        Ray {
            o,
            d,
            d_recip: Vector3f::new(1.0 / d.x, 1.0 / d.y, 1.0 / d.z),
        }
    }
    pub fn point_at(&self, t: Float) -> Vector3f {
        self.o + self.d * t
    }
}

/// Axis-aligned box, `min <= max` componentwise once any point has been
/// merged in. The default box is empty (inverted bounds), the identity of
/// `merge`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vector3f,
    pub max: Vector3f,
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb {
            min: Vector3f::splat(Float::INFINITY),
            max: Vector3f::splat(Float::NEG_INFINITY),
        }
    }
}

impl Aabb {
    pub fn new(p1: Vector3f, p2: Vector3f) -> Self {
        Aabb {
            min: Vector3f::new(p1.x.min(p2.x), p1.y.min(p2.y), p1.z.min(p2.z)),
            max: Vector3f::new(p1.x.max(p2.x), p1.y.max(p2.y), p1.z.max(p2.z)),
        }
    }

    pub fn merge(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb {
            min: Vector3f::new(
                a.min.x.min(b.min.x),
                a.min.y.min(b.min.y),
                a.min.z.min(b.min.z),
            ),
            max: Vector3f::new(
                a.max.x.max(b.max.x),
                a.max.y.max(b.max.y),
                a.max.z.max(b.max.z),
            ),
        }
    }

    pub fn is_overlap(&self, other: &Aabb) -> bool {
        other.min.x <= self.max.x
            && other.min.y <= self.max.y
            && other.min.z <= self.max.z
            && other.max.x >= self.min.x
            && other.max.y >= self.min.y
            && other.max.z >= self.min.z
    }

    pub fn is_contain(&self, p: &Vector3f) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    pub fn corner(&self, i: usize) -> Vector3f {
        Vector3f::new(
            if i & 1 != 0 { self.min.x } else { self.max.x },
            if i & 2 != 0 { self.min.y } else { self.max.y },
            if i & 4 != 0 { self.min.z } else { self.max.z },
        )
    }

    /// Relative position of `p` inside the box, `[0,1]^3` when contained.
    pub fn offset(&self, p: &Vector3f) -> Vector3f {
        let mut o = p - self.min;
        if self.max.x > self.min.x {
            o.x /= self.max.x - self.min.x;
        }
        if self.max.y > self.min.y {
            o.y /= self.max.y - self.min.y;
        }
        if self.max.z > self.min.z {
            o.z /= self.max.z - self.min.z;
        }
        o
    }

    pub fn surface_area(&self) -> Float {
        let d = self.max - self.min;
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    pub fn longest_axis(&self) -> usize {
        let d = self.max - self.min;
        if d.x > d.y {
            if d.x > d.z {
                0
            } else {
                2
            }
        } else if d.y > d.z {
            1
        } else {
            2
        }
    }

    pub fn center(&self) -> Vector3f {
        (self.min + self.max) * 0.5
    }

    pub fn split(&self, axis: usize) -> (Aabb, Aabb) {
        let mid = (self.min[axis] + self.max[axis]) * 0.5;
        let mut lo = *self;
        let mut hi = *self;
        lo.max[axis] = mid;
        hi.min[axis] = mid;
        (lo, hi)
    }

    /// Slab test using the ray's cached reciprocal direction. Returns
    /// `(hit, tmin, tmax)`; a hit requires the entry distance to be at
    /// most `maxt`. The min/max ladder keeps zero-direction axes (whose
    /// slab distances are infinities) on the conservative side.
    pub fn ray_intersect(&self, ray: &Ray, maxt: Float) -> (bool, Float, Float) {
        let mut tmin: Float = 0.0;
        let mut tmax: Float = Float::INFINITY;
        for i in 0..3 {
            let t1 = (self.min[i] - ray.o[i]) * ray.d_recip[i];
            let t2 = (self.max[i] - ray.o[i]) * ray.d_recip[i];
            {
                let a = if t1 > tmin { t1 } else { tmin };
                let b = if t2 > tmin { t2 } else { tmin };
                tmin = if a > b { b } else { a };
            }
            {
                let a = if t1 > tmax { tmax } else { t1 };
                let b = if t2 > tmax { tmax } else { t2 };
                tmax = if a > b { a } else { b };
            }
        }
        (tmin <= tmax && tmin <= maxt, tmin, tmax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord() -> impl Strategy<Value = Float> {
        -100.0f32..100.0f32
    }

    fn aabb() -> impl Strategy<Value = Aabb> {
        (coord(), coord(), coord(), coord(), coord(), coord()).prop_map(|(a, b, c, d, e, f)| {
            Aabb::new(Vector3f::new(a, b, c), Vector3f::new(d, e, f))
        })
    }

    fn point() -> impl Strategy<Value = Vector3f> {
        (coord(), coord(), coord()).prop_map(|(x, y, z)| Vector3f::new(x, y, z))
    }

    #[test]
    fn vector_basics() {
        let a = Vector3f::new(1.0, 2.0, 3.0);
        let b = Vector3f::new(4.0, -5.0, 6.0);
        assert_eq!(a.dot(&b), 12.0);
        let c = Vector3f::cross(&Vector3f::new(1.0, 0.0, 0.0), &Vector3f::new(0.0, 1.0, 0.0));
        assert_eq!(c, Vector3f::new(0.0, 0.0, 1.0));
        assert!((a.normalize().length() - 1.0).abs() < 1e-6);
        assert_eq!(a * b, Vector3f::new(4.0, -10.0, 18.0));
        assert_eq!(b.max_component(), 6.0);
    }

    #[test]
    fn matrix_inverse_roundtrip() {
        let m = Matrix4x4::translate(1.0, 2.0, 3.0)
            * Matrix4x4::rotate_y(31.0)
            * Matrix4x4::scale(2.0, 2.0, 2.0);
        let id = m * m.inverse();
        for i in 0..4 {
            for j in 0..4 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((id.m[i][j] - expect).abs() < 1e-4, "{:?}", id);
            }
        }
    }

    #[test]
    fn transform_point_vs_vector() {
        let t = Matrix4x4::translate(5.0, 0.0, 0.0);
        let p = Vector3f::new(1.0, 1.0, 1.0);
        assert_eq!(transform_point(&p, &t), Vector3f::new(6.0, 1.0, 1.0));
        assert_eq!(transform_vector(&p, &t), p);
    }

    #[test]
    fn slab_hit_and_miss() {
        let b = Aabb::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0));
        let r = Ray::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        let (hit, tmin, tmax) = b.ray_intersect(&r, Float::INFINITY);
        assert!(hit);
        assert!((tmin - 4.0).abs() < 1e-5);
        assert!((tmax - 6.0).abs() < 1e-5);

        // box entirely behind the origin
        let r = Ray::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!b.ray_intersect(&r, Float::INFINITY).0);

        // entry point past maxt
        let r = Ray::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!b.ray_intersect(&r, 2.0).0);
    }

    #[test]
    fn slab_axis_parallel() {
        let b = Aabb::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0));
        // direction with zero components, origin inside the slab on those axes
        let r = Ray::new(Vector3f::new(0.5, 0.5, -3.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(b.ray_intersect(&r, Float::INFINITY).0);
        let r = Ray::new(Vector3f::new(2.5, 0.5, -3.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(!b.ray_intersect(&r, Float::INFINITY).0);
    }

    proptest! {
        #[test]
        fn merge_commutative(a in aabb(), b in aabb()) {
            prop_assert_eq!(Aabb::merge(&a, &b), Aabb::merge(&b, &a));
        }

        #[test]
        fn merge_associative(a in aabb(), b in aabb(), c in aabb()) {
            let lhs = Aabb::merge(&Aabb::merge(&a, &b), &c);
            let rhs = Aabb::merge(&a, &Aabb::merge(&b, &c));
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn merge_contains_iff_either(a in aabb(), b in aabb(), p in point()) {
            // one direction is exact set algebra; the other only holds for
            // points inside either operand
            if a.is_contain(&p) || b.is_contain(&p) {
                prop_assert!(Aabb::merge(&a, &b).is_contain(&p));
            }
            if !Aabb::merge(&a, &b).is_contain(&p) {
                prop_assert!(!a.is_contain(&p) && !b.is_contain(&p));
            }
        }

        #[test]
        fn offset_inside_unit_cube(a in aabb(), p in point()) {
            if a.is_contain(&p) {
                let o = a.offset(&p);
                for i in 0..3 {
                    prop_assert!(o[i] >= -1e-4 && o[i] <= 1.0 + 1e-4);
                }
            }
        }
    }
}
