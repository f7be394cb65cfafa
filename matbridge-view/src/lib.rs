//! Dynamic-rank strided view types for host-side numeric arrays.
//!
//! A view is `(data, dims, strides, offset)` with strides counted in
//! elements. Strides may be negative (reversed axes) or zero (broadcast
//! axes); construction checks that every reachable offset stays inside
//! `data`, so readers never have to re-check bounds.
//!
//! # Core Types
//!
//! - [`StridedView`] / [`StridedViewMut`]: borrowed views over existing data
//! - [`StridedArray`]: owned strided array
//!
//! # Metadata Transformations
//!
//! These touch only dims/strides/offset:
//! - `permute`, `transpose_2d`: reorder axes
//! - `step_axis`: keep every n-th element along one axis (negative steps reverse)

pub mod view;

pub use view::{col_major_strides, row_major_strides, StridedArray, StridedView, StridedViewMut};

// ============================================================================
// Error types
// ============================================================================

/// Errors raised while building or transforming strided views.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StridedError {
    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Array shapes do not match.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Invalid axis index for the given rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// A step of zero was requested.
    #[error("step must be non-zero")]
    ZeroStep,

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// A reachable offset falls outside the backing buffer.
    #[error("offset overflow while computing element position")]
    OffsetOverflow,
}

/// Result type for strided view operations.
pub type Result<T> = std::result::Result<T, StridedError>;
