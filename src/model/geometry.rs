//! Fixed-length vectors and square matrices.
//!
//! The wire representation of these types is a plain (nested) array, so
//! their length can only be checked when converting from a dynamic
//! sequence. Once constructed, the storage is a fixed-size array and no
//! operation can change the shape.

use serde::{Deserialize, Serialize};

use crate::error::CetsError;

/// A vector of exactly `N` floats.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Vector<const N: usize>([f64; N]);

/// A two-element vector.
pub type Vector2D = Vector<2>;
/// A three-element vector.
pub type Vector3D = Vector<3>;

impl<const N: usize> Vector<N> {
    /// Creates a vector from a fixed-size array.
    #[inline]
    pub fn new(values: [f64; N]) -> Self {
        Self(values)
    }

    /// Creates a vector from a slice, checking its length.
    pub fn from_slice(values: &[f64]) -> Result<Self, CetsError> {
        let array: [f64; N] = values.try_into().map_err(|_| CetsError::Shape {
            what: vector_name(N),
            expected: N,
            actual: values.len(),
        })?;
        Ok(Self(array))
    }

    /// Creates a vector with every element set to `value`.
    #[inline]
    pub fn splat(value: f64) -> Self {
        Self([value; N])
    }

    /// Number of elements (always `N`).
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    /// True only when `N` is 0.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Overwrites one element. The length never changes.
    pub fn set(&mut self, index: usize, value: f64) -> Result<(), CetsError> {
        let slot = self.0.get_mut(index).ok_or(CetsError::Shape {
            what: vector_name(N),
            expected: N,
            actual: index.saturating_add(1),
        })?;
        *slot = value;
        Ok(())
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[inline]
    pub fn to_array(self) -> [f64; N] {
        self.0
    }

    /// Returns true if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl<const N: usize> TryFrom<Vec<f64>> for Vector<N> {
    type Error = CetsError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_slice(&values)
    }
}

impl<const N: usize> From<Vector<N>> for Vec<f64> {
    fn from(vector: Vector<N>) -> Self {
        vector.0.to_vec()
    }
}

impl<const N: usize> From<[f64; N]> for Vector<N> {
    fn from(values: [f64; N]) -> Self {
        Self(values)
    }
}

/// A square `N`x`N` matrix stored row-major.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix<const N: usize>([Vector<N>; N]);

/// A 2x2 matrix.
pub type Matrix2x2 = Matrix<2>;
/// A 3x3 matrix.
pub type Matrix3x3 = Matrix<3>;

impl<const N: usize> Matrix<N> {
    /// Creates a matrix from fixed-size rows.
    #[inline]
    pub fn new(rows: [[f64; N]; N]) -> Self {
        Self(rows.map(Vector::new))
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        let mut rows = [[0.0; N]; N];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self::new(rows)
    }

    /// A diagonal matrix with the given entries.
    pub fn diagonal(entries: [f64; N]) -> Self {
        let mut rows = [[0.0; N]; N];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = entries[i];
        }
        Self::new(rows)
    }

    /// Creates a matrix from dynamic rows, checking the outer length and
    /// the length of every row.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, CetsError> {
        if rows.len() != N {
            return Err(CetsError::Shape {
                what: matrix_name(N),
                expected: N,
                actual: rows.len(),
            });
        }

        let mut out = [Vector::splat(0.0); N];
        for (slot, row) in out.iter_mut().zip(rows) {
            let row = row.as_ref();
            *slot = Vector::from_slice(row).map_err(|_| CetsError::Shape {
                what: matrix_row_name(N),
                expected: N,
                actual: row.len(),
            })?;
        }
        Ok(Self(out))
    }

    #[inline]
    pub fn rank(&self) -> usize {
        N
    }

    #[inline]
    pub fn row(&self, index: usize) -> Option<&Vector<N>> {
        self.0.get(index)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.0.get(row).and_then(|r| r.get(col))
    }

    /// Overwrites one element. The shape never changes.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), CetsError> {
        let target = self.0.get_mut(row).ok_or(CetsError::Shape {
            what: matrix_name(N),
            expected: N,
            actual: row.saturating_add(1),
        })?;
        target.set(col, value)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Vector<N>> {
        self.0.iter()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.0.iter().map(|row| row.as_slice().to_vec()).collect()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(Vector::is_finite)
    }
}

impl<const N: usize> TryFrom<Vec<Vec<f64>>> for Matrix<N> {
    type Error = CetsError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl<const N: usize> From<Matrix<N>> for Vec<Vec<f64>> {
    fn from(matrix: Matrix<N>) -> Self {
        matrix.to_rows()
    }
}

impl<const N: usize> From<[[f64; N]; N]> for Matrix<N> {
    fn from(rows: [[f64; N]; N]) -> Self {
        Self::new(rows)
    }
}

fn vector_name(n: usize) -> &'static str {
    match n {
        2 => "Vector2D",
        3 => "Vector3D",
        _ => "vector",
    }
}

fn matrix_name(n: usize) -> &'static str {
    match n {
        2 => "Matrix2x2",
        3 => "Matrix3x3",
        _ => "matrix",
    }
}

fn matrix_row_name(n: usize) -> &'static str {
    match n {
        2 => "Matrix2x2 row",
        3 => "Matrix3x3 row",
        _ => "matrix row",
    }
}
