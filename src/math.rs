//! Fixed-size vector and matrix kernel.
//!
//! [`Mat4`] is stored row-major (element `(row, col)` lives at
//! `m[row * 4 + col]`) and follows the column-vector convention: a point is
//! transformed as `M * v`, translations live in the last column, and a chain
//! `A * B * v` applies `B` first. Angles are radians throughout.
//!
//! The GPU side (WGSL, glam) is column-major; use [`Mat4::to_cols_array_2d`]
//! or the `From<Mat4> for glam::Mat4` conversion when uploading.

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use bytemuck::{Pod, Zeroable};

/// Two-component vector.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Three-component vector.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Four-component vector.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

macro_rules! impl_vector {
    ($name:ident { $($field:ident),+ }) => {
        impl $name {
            /// Vector with every component set to `v`.
            pub const fn splat(v: f32) -> Self {
                Self { $($field: v),+ }
            }

            pub fn dot(self, rhs: Self) -> f32 {
                0.0 $(+ self.$field * rhs.$field)+
            }

            pub fn length_squared(self) -> f32 {
                self.dot(self)
            }

            pub fn length(self) -> f32 {
                self.length_squared().sqrt()
            }

            /// Divides by the length. A zero-length vector is divided by 1
            /// instead, so it comes back unchanged (still zero).
            pub fn normalize(self) -> Self {
                let len = self.length();
                let len = if len == 0.0 { 1.0 } else { len };
                self / len
            }

            pub fn abs(self) -> Self {
                Self { $($field: self.$field.abs()),+ }
            }

            pub fn is_finite(self) -> bool {
                true $(&& self.$field.is_finite())+
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Mul for $name {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Self { $($field: self.$field * rhs.$field),+ }
            }
        }

        impl Div for $name {
            type Output = Self;
            fn div(self, rhs: Self) -> Self {
                Self { $($field: self.$field / rhs.$field),+ }
            }
        }

        impl Mul<f32> for $name {
            type Output = Self;
            fn mul(self, rhs: f32) -> Self {
                Self { $($field: self.$field * rhs),+ }
            }
        }

        impl Mul<$name> for f32 {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                rhs * self
            }
        }

        impl Div<f32> for $name {
            type Output = Self;
            fn div(self, rhs: f32) -> Self {
                Self { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                *self = *self + rhs;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                *self = *self - rhs;
            }
        }

        impl MulAssign for $name {
            fn mul_assign(&mut self, rhs: Self) {
                *self = *self * rhs;
            }
        }

        impl DivAssign for $name {
            fn div_assign(&mut self, rhs: Self) {
                *self = *self / rhs;
            }
        }

        impl MulAssign<f32> for $name {
            fn mul_assign(&mut self, rhs: f32) {
                *self = *self * rhs;
            }
        }

        impl DivAssign<f32> for $name {
            fn div_assign(&mut self, rhs: f32) {
                *self = *self / rhs;
            }
        }
    };
}

impl_vector!(Vec2 { x, y });
impl_vector!(Vec3 { x, y, z });
impl_vector!(Vec4 { x, y, z, w });

impl Vec2 {
    pub const ZERO: Self = Self::splat(0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vec3 {
    pub const ZERO: Self = Self::splat(0.0);
    pub const ONE: Self = Self::splat(1.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Vec4 {
    pub const ZERO: Self = Self::splat(0.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Drops `w`.
    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl From<Vec3> for glam::Vec3 {
    fn from(v: Vec3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

/// Row-major 4x4 matrix, column-vector convention.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self::from_diagonal(1.0);

    /// Builds a matrix from 16 values listed row by row.
    pub const fn from_row_major(m: [f32; 16]) -> Self {
        Self { m }
    }

    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let [r0, r1, r2, r3] = rows;
        Self::from_row_major([
            r0[0], r0[1], r0[2], r0[3], //
            r1[0], r1[1], r1[2], r1[3], //
            r2[0], r2[1], r2[2], r2[3], //
            r3[0], r3[1], r3[2], r3[3],
        ])
    }

    /// `trace` on the diagonal, zero elsewhere.
    pub const fn from_diagonal(trace: f32) -> Self {
        Self::from_rows([
            [trace, 0.0, 0.0, 0.0],
            [0.0, trace, 0.0, 0.0],
            [0.0, 0.0, trace, 0.0],
            [0.0, 0.0, 0.0, trace],
        ])
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[row * 4 + col]
    }

    pub fn row(&self, row: usize) -> Vec4 {
        Vec4::new(self.get(row, 0), self.get(row, 1), self.get(row, 2), self.get(row, 3))
    }

    pub fn col(&self, col: usize) -> Vec4 {
        Vec4::new(self.get(0, col), self.get(1, col), self.get(2, col), self.get(3, col))
    }

    pub fn translation(t: Vec3) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, t.x],
            [0.0, 1.0, 0.0, t.y],
            [0.0, 0.0, 1.0, t.z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation of `angle` radians around `axis` (normalized internally).
    pub fn axis_angle(axis: Vec3, angle: f32) -> Self {
        let a = axis.normalize();
        let (s, c) = angle.sin_cos();
        let oc = 1.0 - c;

        Self::from_rows([
            [
                oc * a.x * a.x + c,
                oc * a.x * a.y - a.z * s,
                oc * a.z * a.x + a.y * s,
                0.0,
            ],
            [
                oc * a.x * a.y + a.z * s,
                oc * a.y * a.y + c,
                oc * a.y * a.z - a.x * s,
                0.0,
            ],
            [
                oc * a.z * a.x - a.y * s,
                oc * a.y * a.z + a.x * s,
                oc * a.z * a.z + c,
                0.0,
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn scale(s: Vec3) -> Self {
        Self::from_rows([
            [s.x, 0.0, 0.0, 0.0],
            [0.0, s.y, 0.0, 0.0],
            [0.0, 0.0, s.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Left-handed perspective projection, depth mapped to `[0, 1]`.
    ///
    /// `fov_y` is the full vertical field of view in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let t = (fov_y / 2.0).tan();
        Self::from_rows([
            [1.0 / (aspect * t), 0.0, 0.0, 0.0],
            [0.0, 1.0 / t, 0.0, 0.0],
            [0.0, 0.0, far / (far - near), -(far * near) / (far - near)],
            [0.0, 0.0, 1.0, 0.0],
        ])
    }

    /// Orthographic projection, depth mapped to `[0, 1]`.
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self::from_rows([
            [2.0 / (right - left), 0.0, 0.0, -(right + left) / (right - left)],
            [0.0, 2.0 / (top - bottom), 0.0, -(top + bottom) / (top - bottom)],
            [0.0, 0.0, 1.0 / (far - near), -near / (far - near)],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation whose columns are the right/up/forward basis looking along `dir`.
    pub fn look_at(dir: Vec3, up: Vec3) -> Self {
        let right = up.cross(dir).normalize();
        let up = dir.cross(right).normalize();
        let dir = dir.normalize();

        Self::from_rows([
            [right.x, up.x, dir.x, 0.0],
            [right.y, up.y, dir.y, 0.0],
            [right.z, up.z, dir.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn transpose(&self) -> Self {
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[col * 4 + row] = self.get(row, col);
            }
        }
        Self::from_row_major(out)
    }

    pub fn determinant(&self) -> f32 {
        let (s, c) = self.minors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// 2x2 minors of the top two rows (`s`) and the bottom two rows (`c`),
    /// the building blocks of the cofactor expansion.
    fn minors(&self) -> ([f32; 6], [f32; 6]) {
        let a = |r, c| self.get(r, c);
        let s = [
            a(0, 0) * a(1, 1) - a(1, 0) * a(0, 1),
            a(0, 0) * a(1, 2) - a(1, 0) * a(0, 2),
            a(0, 0) * a(1, 3) - a(1, 0) * a(0, 3),
            a(0, 1) * a(1, 2) - a(1, 1) * a(0, 2),
            a(0, 1) * a(1, 3) - a(1, 1) * a(0, 3),
            a(0, 2) * a(1, 3) - a(1, 2) * a(0, 3),
        ];
        let c = [
            a(2, 0) * a(3, 1) - a(3, 0) * a(2, 1),
            a(2, 0) * a(3, 2) - a(3, 0) * a(2, 2),
            a(2, 0) * a(3, 3) - a(3, 0) * a(2, 3),
            a(2, 1) * a(3, 2) - a(3, 1) * a(2, 2),
            a(2, 1) * a(3, 3) - a(3, 1) * a(2, 3),
            a(2, 2) * a(3, 3) - a(3, 2) * a(2, 3),
        ];
        (s, c)
    }

    /// Inverse by cofactor expansion, or `None` when the determinant is zero
    /// or not finite.
    pub fn try_inverse(&self) -> Option<Self> {
        let (s, c) = self.minors();
        let det = s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;
        let a = |r, c| self.get(r, c);

        let adjugate = [
            a(1, 1) * c[5] - a(1, 2) * c[4] + a(1, 3) * c[3],
            -a(0, 1) * c[5] + a(0, 2) * c[4] - a(0, 3) * c[3],
            a(3, 1) * s[5] - a(3, 2) * s[4] + a(3, 3) * s[3],
            -a(2, 1) * s[5] + a(2, 2) * s[4] - a(2, 3) * s[3],
            //
            -a(1, 0) * c[5] + a(1, 2) * c[2] - a(1, 3) * c[1],
            a(0, 0) * c[5] - a(0, 2) * c[2] + a(0, 3) * c[1],
            -a(3, 0) * s[5] + a(3, 2) * s[2] - a(3, 3) * s[1],
            a(2, 0) * s[5] - a(2, 2) * s[2] + a(2, 3) * s[1],
            //
            a(1, 0) * c[4] - a(1, 1) * c[2] + a(1, 3) * c[0],
            -a(0, 0) * c[4] + a(0, 1) * c[2] - a(0, 3) * c[0],
            a(3, 0) * s[4] - a(3, 1) * s[2] + a(3, 3) * s[0],
            -a(2, 0) * s[4] + a(2, 1) * s[2] - a(2, 3) * s[0],
            //
            -a(1, 0) * c[3] + a(1, 1) * c[1] - a(1, 2) * c[0],
            a(0, 0) * c[3] - a(0, 1) * c[1] + a(0, 2) * c[0],
            -a(3, 0) * s[3] + a(3, 1) * s[1] - a(3, 2) * s[0],
            a(2, 0) * s[3] - a(2, 1) * s[1] + a(2, 2) * s[0],
        ];

        Some(Self::from_row_major(adjugate.map(|v| v * inv_det)))
    }

    /// Inverse by cofactor expansion.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is singular. See [`Mat4::try_inverse`].
    pub fn inverse(&self) -> Self {
        match self.try_inverse() {
            Some(inv) => inv,
            None => panic!("Mat4::inverse called on a singular matrix: {:?}", self.m),
        }
    }

    pub fn mul_vec4(&self, v: Vec4) -> Vec4 {
        Vec4::new(self.row(0).dot(v), self.row(1).dot(v), self.row(2).dot(v), self.row(3).dot(v))
    }

    /// Transforms a point (`w = 1`) without a perspective divide.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.mul_vec4(p.extend(1.0)).truncate()
    }

    /// Transforms a direction (`w = 0`).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.mul_vec4(v.extend(0.0)).truncate()
    }

    /// Projects `v` and remaps x/y from NDC `[-1, 1]` to `[0, 1]`.
    pub fn project(&self, v: Vec3) -> Vec3 {
        let clip = self.mul_vec4(v.extend(1.0));
        let ndc = clip / clip.w;
        Vec3::new(ndc.x / 2.0 + 0.5, ndc.y / 2.0 + 0.5, ndc.z)
    }

    /// Inverse of [`Mat4::project`].
    pub fn unproject(&self, screen: Vec3) -> Vec3 {
        let ndc = Vec3::new(screen.x * 2.0 - 1.0, screen.y * 2.0 - 1.0, screen.z);
        let v = self.inverse().mul_vec4(ndc.extend(1.0));
        (v / v.w).truncate()
    }

    /// First column of the rotation part.
    pub fn right(&self) -> Vec3 {
        self.col(0).truncate()
    }

    /// Second column of the rotation part.
    pub fn up(&self) -> Vec3 {
        self.col(1).truncate()
    }

    /// Third column of the rotation part.
    pub fn forward(&self) -> Vec3 {
        self.col(2).truncate()
    }

    /// Column-major nested array, the layout WGSL `mat4x4<f32>` expects.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        [
            self.col(0).to_array(),
            self.col(1).to_array(),
            self.col(2).to_array(),
            self.col(3).to_array(),
        ]
    }

    /// Element-wise comparison within `eps`.
    pub fn abs_diff_eq(&self, other: &Self, eps: f32) -> bool {
        self.m.iter().zip(other.m.iter()).all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [0.0; 16];
        for row in 0..4 {
            let r = self.row(row);
            for col in 0..4 {
                out[row * 4 + col] = r.dot(rhs.col(col));
            }
        }
        Self::from_row_major(out)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Vec4 {
        self.mul_vec4(rhs)
    }
}

impl From<Mat4> for glam::Mat4 {
    fn from(m: Mat4) -> Self {
        glam::Mat4::from_cols_array_2d(&m.to_cols_array_2d())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-4;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < EPS, "{:?} != {:?}", a, b);
    }

    fn sample_transforms() -> Vec<Mat4> {
        vec![
            Mat4::IDENTITY,
            Mat4::translation(Vec3::new(1.0, -2.0, 3.5)),
            Mat4::axis_angle(Vec3::new(1.0, 2.0, 3.0), 0.7),
            Mat4::scale(Vec3::new(2.0, 0.5, 4.0)),
            Mat4::translation(Vec3::new(-4.0, 0.25, 9.0))
                * Mat4::axis_angle(Vec3::Y, 1.3)
                * Mat4::scale(Vec3::new(1.5, 1.5, 0.75)),
            Mat4::perspective(0.8, 16.0 / 9.0, 0.1, 100.0),
            Mat4::orthographic(-3.0, 5.0, -2.0, 2.0, 0.5, 20.0),
            Mat4::from_rows([
                [2.0, -1.0, 0.5, 3.0],
                [0.0, 1.5, -2.0, 1.0],
                [1.0, 0.25, 3.0, -1.0],
                [0.5, 0.0, 1.0, 2.0],
            ]),
        ]
    }

    #[test]
    fn test_normalize_zero_vector_stays_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        assert_eq!(Vec4::ZERO.normalize(), Vec4::ZERO);
    }

    #[test]
    fn test_normalize_gives_unit_length() {
        let v = Vec3::new(3.0, -4.0, 12.0).normalize();
        assert!((v.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_cross_is_right_handed() {
        assert_vec3_eq(Vec3::X.cross(Vec3::Y), Vec3::Z);
        assert_vec3_eq(Vec3::Y.cross(Vec3::X), -Vec3::Z);
    }

    #[test]
    fn test_componentwise_ops() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3::splat(3.0));
        assert_eq!(a * b, Vec3::new(4.0, 10.0, 18.0));
        assert_eq!(b / a, Vec3::new(4.0, 2.5, 2.0));
        assert_eq!(a.dot(b), 32.0);
    }

    #[test]
    fn test_inverse_round_trip() {
        for m in sample_transforms() {
            let inv = m.inverse();
            assert!((m * inv).abs_diff_eq(&Mat4::IDENTITY, EPS), "M * M^-1 != I for {:?}", m);
            assert!(inv.inverse().abs_diff_eq(&m, EPS), "(M^-1)^-1 != M for {:?}", m);
        }
    }

    #[test]
    fn test_inverse_matches_glam() {
        for m in sample_transforms() {
            let ours: glam::Mat4 = m.inverse().into();
            let theirs = glam::Mat4::from(m).inverse();
            assert!(ours.abs_diff_eq(theirs, 1e-3), "{:?} vs {:?}", ours, theirs);
        }
    }

    #[test]
    fn test_determinant_of_scale() {
        let m = Mat4::scale(Vec3::new(2.0, 3.0, 4.0));
        assert!((m.determinant() - 24.0).abs() < EPS);
    }

    #[test]
    #[should_panic(expected = "singular")]
    fn test_inverse_of_singular_panics() {
        Mat4::scale(Vec3::new(1.0, 0.0, 1.0)).inverse();
    }

    #[test]
    fn test_try_inverse_of_singular_is_none() {
        assert!(Mat4::from_diagonal(0.0).try_inverse().is_none());
    }

    #[test]
    fn test_multiplication_is_not_commutative() {
        let t = Mat4::translation(Vec3::new(1.0, 0.0, 0.0));
        let r = Mat4::axis_angle(Vec3::Z, FRAC_PI_2);
        assert!(!(t * r).abs_diff_eq(&(r * t), EPS));

        // T * R rotates first, then translates.
        assert_vec3_eq((t * r).transform_point(Vec3::X), Vec3::new(1.0, 1.0, 0.0));
        assert_vec3_eq((r * t).transform_point(Vec3::X), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_translation_ignores_directions() {
        let t = Mat4::translation(Vec3::new(5.0, 6.0, 7.0));
        assert_vec3_eq(t.transform_point(Vec3::ZERO), Vec3::new(5.0, 6.0, 7.0));
        assert_vec3_eq(t.transform_vector(Vec3::X), Vec3::X);
    }

    #[test]
    fn test_axis_angle_about_y() {
        let r = Mat4::axis_angle(Vec3::Y, FRAC_PI_2);
        assert_vec3_eq(r.transform_point(Vec3::Z), Vec3::X);
    }

    #[test]
    fn test_basis_columns() {
        let m = Mat4::look_at(Vec3::Z, Vec3::Y);
        assert_vec3_eq(m.right(), Vec3::X);
        assert_vec3_eq(m.up(), Vec3::Y);
        assert_vec3_eq(m.forward(), Vec3::Z);
    }

    #[test]
    fn test_project_unproject() {
        let proj = Mat4::perspective(1.0, 1.5, 0.1, 50.0);
        let p = Vec3::new(0.4, -0.3, 5.0);
        let screen = proj.project(p);
        assert!((0.0..=1.0).contains(&screen.x));
        assert!((0.0..=1.0).contains(&screen.z));
        assert_vec3_eq(proj.unproject(screen), p);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = Mat4::perspective(1.0, 1.0, 0.5, 10.0);
        assert!(proj.project(Vec3::new(0.0, 0.0, 0.5)).z.abs() < EPS);
        assert!((proj.project(Vec3::new(0.0, 0.0, 10.0)).z - 1.0).abs() < EPS);
    }

    #[test]
    fn test_glam_conversion_preserves_transform() {
        let m = Mat4::translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::axis_angle(Vec3::X, 0.3);
        let p = Vec3::new(0.5, -1.0, 2.0);
        let ours = m.transform_point(p);
        let theirs = glam::Mat4::from(m).transform_point3(glam::Vec3::from(p));
        assert_vec3_eq(ours, Vec3::new(theirs.x, theirs.y, theirs.z));
    }
}
