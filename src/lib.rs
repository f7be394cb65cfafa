//! Marshaling between strided host arrays and column-major engine matrices.
//!
//! The host side is a possibly non-contiguous, strided array of rank 0, 1
//! or 2 with an element-kind tag. The engine side is an always-rank-2,
//! column-major double matrix whose real and imaginary parts live in
//! separate planes. Every conversion copies; no buffer is shared across
//! the boundary.
//!
//! # Core Types
//!
//! - [`HostArray`] / [`HostView`]: tagged unions over typed strided arrays
//! - [`EngineMatrix`]: engine-side matrix with split real/imaginary planes
//! - [`Value`]: generic, untyped host sequence element
//! - [`Session`]: `open` / `close` / `eval` / `get` / `put` / `call` against an [`Engine`]
//!
//! # Conversion Rules
//!
//! | host rank | engine shape |
//! |---|---|
//! | 0 | 1 × 1 |
//! | 1, length n | n × min(1, n) |
//! | 2, (r, c) | r × c |
//! | ≥ 3 | error |
//!
//! Engine → host always yields dims `[rows, cols]`; vectors are never
//! squeezed back.
//!
//! # Example
//!
//! ```rust
//! use matbridge::{to_engine_matrix, to_host_array, HostArray, StridedArray};
//!
//! // every second column of a 2x4 row-major array
//! let a: HostArray =
//!     StridedArray::from_fn_row_major(&[2, 4], |idx| (idx[0] * 4 + idx[1]) as i32).into();
//! let view = a.view().step_axis(1, 2).unwrap();
//!
//! let m = to_engine_matrix(&view.into()).unwrap();
//! assert_eq!((m.rows(), m.cols()), (2, 2));
//! assert_eq!(m.real(), &[0.0, 4.0, 2.0, 6.0]);
//!
//! let back = to_host_array(&m).unwrap();
//! assert_eq!(back.dims(), &[2, 2]);
//! ```

pub mod convert;
pub mod copy;
mod error;
mod host;
pub mod kind;
mod matrix;
pub mod session;
pub mod shape;
mod value;

// ============================================================================
// Errors
// ============================================================================
pub use error::{ErrorKind, MarshalError, Result};

// ============================================================================
// Host side
// ============================================================================
pub use host::{HostArray, HostView};
pub use kind::{ComplexElement, ElementKind, RealElement};
pub use value::{demote_staged, stage_sequence, Number, Value};

// ============================================================================
// Engine side
// ============================================================================
pub use matrix::{CharArray, EngineMatrix, EngineValue};
pub use shape::{engine_shape, host_dims, HostLayout, MatrixShape};

// ============================================================================
// Conversion and sessions
// ============================================================================
pub use convert::{
    char_array_to_text, sequence_to_engine_matrix, to_engine_matrix, to_engine_value,
    to_host_array, view_to_engine_matrix, HostValue,
};
pub use session::{
    interpret_transcript, validate_function_name, validate_variable_name, Engine, EngineFailure,
    EngineLauncher, Fetched, Session, SessionOptions,
};

pub use matbridge_view::{StridedArray, StridedError, StridedView, StridedViewMut};

// ============================================================================
// Constants
// ============================================================================

/// Highest host rank the converters accept.
pub const MAX_HOST_RANK: usize = 2;

/// Longest accepted workspace variable name.
pub const MAX_VARIABLE_NAME_LEN: usize = 63;

/// Default `eval` transcript capacity in bytes. Longer transcripts are
/// truncated.
pub const DEFAULT_OUTPUT_BUFFER_SIZE: usize = 10_000;

/// Transcript prefix of an engine error banner.
pub const ERROR_MARKER: &str = ">> ??? ";

/// Prompt the engine echoes before command output.
pub const PROMPT: &str = ">> ";
