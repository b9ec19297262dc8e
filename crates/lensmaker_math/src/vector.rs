//! Dimension-tagged vectors and matrices on top of nalgebra.
//!
//! Simulations run in either 2D or 3D, chosen at runtime by the sampling
//! configuration. Both cases are stored as nalgebra `Vector3` / `Matrix3` so
//! they stay `Copy`; a 2D vector lives in the `z = 0` plane and a 2D matrix
//! keeps the identity on its third row and column. Mixing dimensions is a
//! programmer error and panics.

use std::ops::{Add, Mul, Neg, Sub};

use glam::{DMat3, DVec3};
use nalgebra::{Matrix3, Vector3};

use crate::Scalar;

#[inline]
fn check_dim(dim: usize) {
    assert!(dim == 2 || dim == 3, "dimension must be 2 or 3, got {dim}");
}

/// A point or direction in 2D or 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorN<S: Scalar> {
    coords: Vector3<S>,
    dim: usize,
}

impl<S: Scalar> VectorN<S> {
    /// Create a 2D vector.
    pub fn new2(x: S, y: S) -> Self {
        Self {
            coords: Vector3::new(x, y, S::zero()),
            dim: 2,
        }
    }

    /// Create a 3D vector.
    pub fn new3(x: S, y: S, z: S) -> Self {
        Self {
            coords: Vector3::new(x, y, z),
            dim: 3,
        }
    }

    /// Build from a slice of length 2 or 3.
    pub fn from_slice(values: &[S]) -> Self {
        check_dim(values.len());
        let mut coords = Vector3::zeros();
        coords.as_mut_slice()[..values.len()].copy_from_slice(values);
        Self {
            coords,
            dim: values.len(),
        }
    }

    /// The origin.
    pub fn zeros(dim: usize) -> Self {
        check_dim(dim);
        Self {
            coords: Vector3::zeros(),
            dim,
        }
    }

    /// Vector along the principal axis: `(value, 0[, 0])`.
    pub fn along_x(dim: usize, value: S) -> Self {
        Self::zeros(dim).with_x(value)
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Coordinate along the principal axis.
    #[inline]
    pub fn x(&self) -> S {
        self.coords.x
    }

    #[inline]
    pub fn get(&self, i: usize) -> S {
        assert!(i < self.dim, "index {i} out of range for dimension {}", self.dim);
        self.coords[i]
    }

    #[inline]
    pub fn as_slice(&self) -> &[S] {
        &self.coords.as_slice()[..self.dim]
    }

    /// Coordinates orthogonal to the principal axis.
    #[inline]
    pub fn transverse(&self) -> &[S] {
        &self.as_slice()[1..]
    }

    /// Squared distance to the principal axis.
    pub fn radial_squared(&self) -> S {
        self.coords.y * self.coords.y + self.coords.z * self.coords.z
    }

    /// Replace the principal-axis coordinate.
    pub fn with_x(mut self, x: S) -> Self {
        self.coords.x = x;
        self
    }

    pub fn dot(&self, other: &Self) -> S {
        assert_eq!(self.dim, other.dim, "dimension mismatch");
        self.coords.dot(&other.coords)
    }

    #[inline]
    pub fn norm_squared(&self) -> S {
        self.coords.norm_squared()
    }

    #[inline]
    pub fn norm(&self) -> S {
        self.coords.norm()
    }

    /// Unit vector in the same direction. Zero vectors become NaN.
    pub fn normalize(&self) -> Self {
        Self {
            coords: self.coords.normalize(),
            dim: self.dim,
        }
    }

    /// Apply `f` to every coordinate up to `dim`.
    pub fn map(&self, f: impl Fn(S) -> S) -> Self {
        let mut out = *self;
        for c in out.coords.iter_mut().take(self.dim) {
            *c = f(*c);
        }
        out
    }

    /// Copy with derivative tracking removed from every coordinate.
    pub fn detach(&self) -> Self {
        self.map(S::detach)
    }

    pub fn is_finite(&self) -> bool {
        self.as_slice().iter().all(|c| c.is_finite())
    }

    /// Primal values as a glam vector (z = 0 in 2D).
    pub fn to_dvec3(&self) -> DVec3 {
        DVec3::new(
            self.coords.x.value(),
            self.coords.y.value(),
            self.coords.z.value(),
        )
    }
}

impl<S: Scalar> Add for VectorN<S> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        assert_eq!(self.dim, rhs.dim, "dimension mismatch");
        Self {
            coords: self.coords + rhs.coords,
            dim: self.dim,
        }
    }
}

impl<S: Scalar> Sub for VectorN<S> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        assert_eq!(self.dim, rhs.dim, "dimension mismatch");
        Self {
            coords: self.coords - rhs.coords,
            dim: self.dim,
        }
    }
}

impl<S: Scalar> Neg for VectorN<S> {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            coords: -self.coords,
            dim: self.dim,
        }
    }
}

impl<S: Scalar> Mul<S> for VectorN<S> {
    type Output = Self;

    fn mul(self, rhs: S) -> Self {
        Self {
            coords: self.coords * rhs,
            dim: self.dim,
        }
    }
}

/// A 2x2 or 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixN<S: Scalar> {
    inner: Matrix3<S>,
    dim: usize,
}

impl<S: Scalar> MatrixN<S> {
    pub fn identity(dim: usize) -> Self {
        check_dim(dim);
        Self {
            inner: Matrix3::identity(),
            dim,
        }
    }

    /// Uniform scaling `s * I`.
    pub fn scaling(dim: usize, s: S) -> Self {
        let mut m = Self::identity(dim);
        for i in 0..dim {
            m.inner[(i, i)] = s;
        }
        m
    }

    /// Build from rows; the row count sets the dimension.
    pub fn from_rows(rows: &[&[S]]) -> Self {
        let mut m = Self::identity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), m.dim, "matrix must be square");
            for (c, &value) in row.iter().enumerate() {
                m.inner[(r, c)] = value;
            }
        }
        m
    }

    /// Counter-clockwise rotation in the plane of the first two axes.
    pub fn rotation_z(dim: usize, theta: S) -> Self {
        let (s, c) = (theta.sin(), theta.cos());
        let mut m = Self::identity(dim);
        m.inner[(0, 0)] = c;
        m.inner[(0, 1)] = -s;
        m.inner[(1, 0)] = s;
        m.inner[(1, 1)] = c;
        m
    }

    /// Rotation about the second axis (3D only).
    pub fn rotation_y(theta: S) -> Self {
        let (s, c) = (theta.sin(), theta.cos());
        let mut m = Self::identity(3);
        m.inner[(0, 0)] = c;
        m.inner[(0, 2)] = s;
        m.inner[(2, 0)] = -s;
        m.inner[(2, 2)] = c;
        m
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> S {
        assert!(row < self.dim && col < self.dim, "index out of range");
        self.inner[(row, col)]
    }

    pub fn transpose(&self) -> Self {
        Self {
            inner: self.inner.transpose(),
            dim: self.dim,
        }
    }

    pub fn mul_vector(&self, v: &VectorN<S>) -> VectorN<S> {
        assert_eq!(self.dim, v.dim(), "dimension mismatch");
        VectorN {
            coords: self.inner * v.coords,
            dim: self.dim,
        }
    }

    /// Primal values as a glam matrix, 2D embedded in the upper-left block.
    pub fn to_dmat3(&self) -> DMat3 {
        let m = self.inner.map(S::value);
        DMat3::from_cols_slice(m.as_slice())
    }
}

impl<S: Scalar> Mul for MatrixN<S> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        assert_eq!(self.dim, rhs.dim, "dimension mismatch");
        Self {
            inner: self.inner * rhs.inner,
            dim: self.dim,
        }
    }
}

impl<S: Scalar> Mul<VectorN<S>> for MatrixN<S> {
    type Output = VectorN<S>;

    fn mul(self, rhs: VectorN<S>) -> VectorN<S> {
        self.mul_vector(&rhs)
    }
}
