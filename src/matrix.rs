//! Validated dense distance matrix.

use crate::error::InvalidMatrixError;

/// A square distance matrix (meters) stored in row-major order.
///
/// Construction through [`DistanceMatrix::from_rows`] guarantees at least one
/// location, finite non-negative entries and a zero diagonal. The matrix is
/// not required to be symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Validates and flattens an NxN grid.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, InvalidMatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(InvalidMatrixError::Empty);
        }

        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(InvalidMatrixError::NotSquare {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }

            for (col, value) in values.into_iter().enumerate() {
                if !value.is_finite() {
                    return Err(InvalidMatrixError::NonFinite { row, col });
                }
                if value < 0.0 {
                    return Err(InvalidMatrixError::Negative { row, col, value });
                }
                if row == col && value != 0.0 {
                    return Err(InvalidMatrixError::NonZeroDiagonal { index: row, value });
                }
                data.push(value);
            }
        }

        Ok(Self { data, size })
    }

    pub(crate) fn zeros(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of locations.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.size).map(<[f64]>::to_vec).collect()
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}
