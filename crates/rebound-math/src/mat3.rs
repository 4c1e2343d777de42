// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops::{Add, Mul, Sub};

use crate::Vec3;

/// Column‑major 3×3 matrix used for rotations and inertia tensors.
///
/// - `at(row, col)` reads element `data[col * 3 + row]`.
/// - Rotation matrices map body-local directions into world space; their
///   transpose maps back.
///
/// # Examples
/// ```
/// use rebound_math::{Mat3, Vec3};
/// let m = Mat3::from_diagonal(Vec3::new(2.0, 3.0, 4.0));
/// assert_eq!((m * Vec3::new(1.0, 1.0, 1.0)).to_array(), [2.0, 3.0, 4.0]);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat3 {
    data: [f32; 9],
}

impl Mat3 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        data: [
            1.0, 0.0, 0.0, // col 0
            0.0, 1.0, 0.0, // col 1
            0.0, 0.0, 1.0, // col 2
        ],
    };

    /// Null matrix. Used as the inverse inertia of immovable bodies.
    pub const ZERO: Self = Self { data: [0.0; 9] };

    /// Creates a matrix from column-major data.
    pub const fn new(data: [f32; 9]) -> Self {
        Self { data }
    }

    /// Builds a matrix from three column vectors.
    pub fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self::new([
            c0.x(),
            c0.y(),
            c0.z(),
            c1.x(),
            c1.y(),
            c1.z(),
            c2.x(),
            c2.y(),
            c2.z(),
        ])
    }

    /// Diagonal matrix with `d` on the diagonal.
    pub fn from_diagonal(d: Vec3) -> Self {
        Self::new([d.x(), 0.0, 0.0, 0.0, d.y(), 0.0, 0.0, 0.0, d.z()])
    }

    /// Outer product `a · bᵀ`.
    pub fn outer(a: Vec3, b: Vec3) -> Self {
        Self::from_cols(a * b.x(), a * b.y(), a * b.z())
    }

    /// Returns the underlying column-major array.
    pub fn to_array(self) -> [f32; 9] {
        self.data
    }

    /// Element at `row`, `col`.
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[col * 3 + row]
    }

    /// Column `idx` as a vector.
    pub fn column(&self, idx: usize) -> Vec3 {
        let base = idx * 3;
        Vec3::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }

    /// Row `idx` as a vector.
    pub fn row(&self, idx: usize) -> Vec3 {
        Vec3::new(self.data[idx], self.data[idx + 3], self.data[idx + 6])
    }

    /// Transposed matrix.
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2))
    }

    /// Scales every element.
    pub fn scale(&self, s: f32) -> Self {
        let mut out = self.data;
        for v in &mut out {
            *v *= s;
        }
        Self::new(out)
    }

    /// `Mᵀ · v`. Maps a world direction into the local frame of a rotation.
    pub fn transpose_mul_vec(&self, v: Vec3) -> Vec3 {
        Vec3::new(self.column(0).dot(&v), self.column(1).dot(&v), self.column(2).dot(&v))
    }

    /// Determinant.
    pub fn determinant(&self) -> f32 {
        self.column(0).dot(&self.column(1).cross(&self.column(2)))
    }

    /// Inverse, or `None` if the matrix is singular.
    pub fn try_inverse(&self) -> Option<Self> {
        let c0 = self.column(0);
        let c1 = self.column(1);
        let c2 = self.column(2);
        let r0 = c1.cross(&c2);
        let r1 = c2.cross(&c0);
        let r2 = c0.cross(&c1);
        let det = c0.dot(&r0);
        if det.abs() <= f32::MIN_POSITIVE || !det.is_finite() {
            return None;
        }
        // Rows of the inverse are the cross products of the columns.
        Some(Self::from_cols(r0, r1, r2).transpose().scale(1.0 / det))
    }

    /// Inverse, or the null matrix if singular.
    pub fn inverse_or_zero(&self) -> Self {
        self.try_inverse().unwrap_or(Self::ZERO)
    }

    /// `R · self · Rᵀ`: re-expresses a tensor given in `rot`'s local frame
    /// in the parent frame.
    pub fn rotate_tensor(&self, rot: &Self) -> Self {
        *rot * *self * rot.transpose()
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    fn mul(self, v: Vec3) -> Vec3 {
        self.column(0) * v.x() + self.column(1) * v.y() + self.column(2) * v.z()
    }
}

impl Mul for Mat3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(self * rhs.column(0), self * rhs.column(1), self * rhs.column(2))
    }
}

impl Add for Mat3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut out = self.data;
        for (a, b) in out.iter_mut().zip(rhs.data) {
            *a += b;
        }
        Self::new(out)
    }
}

impl Sub for Mat3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut out = self.data;
        for (a, b) in out.iter_mut().zip(rhs.data) {
            *a -= b;
        }
        Self::new(out)
    }
}
