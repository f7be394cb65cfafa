//! [`ndarray`] interop for matbridge.
//!
//! - [`host_view`]: wrap any `ndarray::ArrayView` (including reversed,
//!   stepped or transposed views) as a [`matbridge::HostView`] without copying
//! - [`to_engine_matrix`]: convert an `ndarray` view straight to an engine matrix
//! - [`from_engine_matrix`]: convert an engine matrix into an `Array2`
//!
//! # Example
//!
//! ```rust
//! use ndarray::{array, s};
//! use matbridge_ndarray::{from_engine_matrix, to_engine_matrix, NdMatrix};
//!
//! let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
//! let m = to_engine_matrix(&a.slice(s![.., ..;-2])).unwrap();
//! assert_eq!(m.real(), &[3.0, 6.0, 1.0, 4.0]);
//!
//! match from_engine_matrix(&m).unwrap() {
//!     NdMatrix::Real(back) => assert_eq!(back, array![[3.0, 1.0], [6.0, 4.0]]),
//!     NdMatrix::Complex(_) => unreachable!(),
//! }
//! ```

mod convert;

pub use convert::{
    from_engine_matrix, host_view, strided_array_to_array2, to_engine_matrix,
    view_to_strided_view, NdMatrix,
};

/// Errors raised while bridging `ndarray` values.
#[derive(Debug, thiserror::Error)]
pub enum NdBridgeError {
    #[error(transparent)]
    Strided(#[from] matbridge_view::StridedError),

    #[error(transparent)]
    Marshal(#[from] matbridge::MarshalError),
}

/// Convenience alias for `Result<T, NdBridgeError>`.
pub type Result<T> = std::result::Result<T, NdBridgeError>;
