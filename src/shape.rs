//! Shape normalization between host dims and the engine's rows × cols.
//!
//! Host → engine promotes: scalars become 1×1, vectors become columns.
//! Engine → host never demotes: the result is always `[rows, cols]`.

use crate::error::{MarshalError, Result};

/// Rows × cols of an engine matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixShape {
    pub rows: usize,
    pub cols: usize,
}

impl MatrixShape {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Number of elements, or `None` on overflow.
    pub fn checked_len(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }
}

impl std::fmt::Display for MatrixShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Classification of a host array by rank.
///
/// The degenerate cases stay separate variants: the copy engine treats
/// scalars and vectors differently from matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostLayout {
    /// Rank 0. Has no strides.
    Scalar,
    /// Rank 1 of length `len`.
    Vector { len: usize },
    /// Rank 2.
    Matrix { rows: usize, cols: usize },
}

impl HostLayout {
    /// Classify host dims, rejecting ranks above two.
    pub fn classify(dims: &[usize]) -> Result<Self> {
        match *dims {
            [] => Ok(HostLayout::Scalar),
            [len] => Ok(HostLayout::Vector { len }),
            [rows, cols] => Ok(HostLayout::Matrix { rows, cols }),
            _ => Err(MarshalError::UnsupportedRank { rank: dims.len() }),
        }
    }

    /// True for layouts copied with the vector routines.
    #[inline]
    pub fn is_vector_like(self) -> bool {
        !matches!(self, HostLayout::Matrix { .. })
    }

    /// The engine shape this layout is stored as.
    pub fn engine_shape(self) -> MatrixShape {
        match self {
            HostLayout::Scalar => MatrixShape::new(1, 1),
            // an empty vector is 0x0, never 0x1
            HostLayout::Vector { len } => MatrixShape::new(len, len.min(1)),
            HostLayout::Matrix { rows, cols } => MatrixShape::new(rows, cols),
        }
    }
}

/// Engine shape for host `dims`.
pub fn engine_shape(dims: &[usize]) -> Result<MatrixShape> {
    HostLayout::classify(dims).map(HostLayout::engine_shape)
}

/// Host dims for an engine matrix. Always rank 2.
pub fn host_dims(shape: MatrixShape) -> [usize; 2] {
    [shape.rows, shape.cols]
}
