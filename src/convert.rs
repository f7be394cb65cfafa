//! Host ↔ engine array converters.

use matbridge_view::{StridedArray, StridedView};
use num_complex::Complex64;
use tracing::debug;

use crate::copy;
use crate::error::{MarshalError, Result};
use crate::host::{HostArray, HostView};
use crate::kind::{ComplexElement, RealElement};
use crate::matrix::{CharArray, EngineMatrix, EngineValue};
use crate::shape::{host_dims, HostLayout, MatrixShape};
use crate::value::{demote_staged, stage_sequence, Number, Value};

/// Anything `put` accepts.
#[derive(Debug, Clone)]
pub enum HostValue<'a> {
    /// A typed host array or view.
    Array(HostView<'a>),
    /// A generic, possibly nested, sequence.
    Sequence(&'a [Value]),
    /// A single number.
    Scalar(Number),
    /// Text, routed to the char-array path.
    Text(&'a str),
}

impl<'a> From<HostView<'a>> for HostValue<'a> {
    fn from(v: HostView<'a>) -> Self {
        HostValue::Array(v)
    }
}

impl<'a> From<&'a HostArray> for HostValue<'a> {
    fn from(a: &'a HostArray) -> Self {
        HostValue::Array(a.view())
    }
}

impl<'a> From<&'a [Value]> for HostValue<'a> {
    fn from(items: &'a [Value]) -> Self {
        HostValue::Sequence(items)
    }
}

impl<'a> From<&'a Vec<Value>> for HostValue<'a> {
    fn from(items: &'a Vec<Value>) -> Self {
        HostValue::Sequence(items)
    }
}

impl<'a> From<&'a str> for HostValue<'a> {
    fn from(text: &'a str) -> Self {
        HostValue::Text(text)
    }
}

impl From<Number> for HostValue<'_> {
    fn from(n: Number) -> Self {
        HostValue::Scalar(n)
    }
}

impl From<f64> for HostValue<'_> {
    fn from(x: f64) -> Self {
        HostValue::Scalar(Number::Float(x))
    }
}

impl From<i64> for HostValue<'_> {
    fn from(i: i64) -> Self {
        HostValue::Scalar(Number::Int(i))
    }
}

impl From<Complex64> for HostValue<'_> {
    fn from(c: Complex64) -> Self {
        HostValue::Scalar(Number::Complex(c))
    }
}

// ============================================================================
// Host -> engine
// ============================================================================

/// Convert any host value to an engine value. Text becomes a char array,
/// everything else a double matrix.
pub fn to_engine_value(value: &HostValue<'_>) -> Result<EngineValue> {
    match value {
        HostValue::Text(text) => Ok(EngineValue::Char(CharArray::from_text(text))),
        numeric => to_engine_matrix(numeric).map(EngineValue::Matrix),
    }
}

/// Convert a numeric host value to an engine matrix.
pub fn to_engine_matrix(value: &HostValue<'_>) -> Result<EngineMatrix> {
    match value {
        HostValue::Array(view) => view_to_engine_matrix(view),
        HostValue::Sequence(items) => sequence_to_engine_matrix(items),
        HostValue::Scalar(n) => sequence_to_engine_matrix(&[Value::from(*n)]),
        HostValue::Text(_) => Err(MarshalError::TextInput),
    }
}

/// Convert a generic sequence: stage as complex, demote if every imaginary
/// part is zero, then convert as a typed array.
pub fn sequence_to_engine_matrix(items: &[Value]) -> Result<EngineMatrix> {
    let host = demote_staged(stage_sequence(items)?)?;
    view_to_engine_matrix(&host.view())
}

/// Convert a typed host view. Rank is checked before element kind.
pub fn view_to_engine_matrix(view: &HostView<'_>) -> Result<EngineMatrix> {
    let layout = HostLayout::classify(view.dims())?;
    let kind = view.kind();
    let shape = layout.engine_shape();
    debug!(%kind, dims = ?view.dims(), %shape, "host -> engine");
    match view {
        HostView::I8(v) => real_matrix(v, layout, shape),
        HostView::U8(v) => real_matrix(v, layout, shape),
        HostView::I16(v) => real_matrix(v, layout, shape),
        HostView::I32(v) => real_matrix(v, layout, shape),
        HostView::I64(v) => real_matrix(v, layout, shape),
        HostView::F32(v) => real_matrix(v, layout, shape),
        HostView::F64(v) => real_matrix(v, layout, shape),
        HostView::C32(v) => complex_matrix(v, layout, shape),
        HostView::C64(v) => complex_matrix(v, layout, shape),
        HostView::Object(_) => Err(MarshalError::UnsupportedElementKind { kind }),
    }
}

fn real_matrix<T: RealElement>(
    src: &StridedView<'_, T>,
    layout: HostLayout,
    shape: MatrixShape,
) -> Result<EngineMatrix> {
    let mut matrix = EngineMatrix::try_zeros(shape, false)?;
    let (re, _) = matrix.planes_mut();
    if layout.is_vector_like() {
        copy::copy_vector_real(src, re)?;
    } else {
        copy::copy_matrix_real(src, re)?;
    }
    Ok(matrix)
}

fn complex_matrix<T: ComplexElement>(
    src: &StridedView<'_, T>,
    layout: HostLayout,
    shape: MatrixShape,
) -> Result<EngineMatrix> {
    let mut matrix = EngineMatrix::try_zeros(shape, true)?;
    if let (re, Some(im)) = matrix.planes_mut() {
        if layout.is_vector_like() {
            copy::copy_vector_complex(src, re, im)?;
        } else {
            copy::copy_matrix_complex(src, re, im)?;
        }
    }
    Ok(matrix)
}

// ============================================================================
// Engine -> host
// ============================================================================

fn try_dense<T: Clone + Default>(shape: MatrixShape) -> Result<StridedArray<T>> {
    let failed = || MarshalError::AllocationFailed {
        rows: shape.rows,
        cols: shape.cols,
    };
    let len = shape.checked_len().ok_or_else(failed)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| failed())?;
    data.resize(len, T::default());
    Ok(StridedArray::from_vec_row_major(data, &host_dims(shape))?)
}

/// Convert an engine matrix to a dense row-major host array of dims
/// `[rows, cols]`. The engine's complex flag alone picks `F64` or `C64`.
pub fn to_host_array(matrix: &EngineMatrix) -> Result<HostArray> {
    let shape = matrix.shape();
    debug!(%shape, complex = matrix.is_complex(), "engine -> host");
    match matrix.imag() {
        Some(im) => {
            let mut out = try_dense::<Complex64>(shape)?;
            copy::planes_into_host(&mut out.view_mut(), matrix.real(), im)?;
            Ok(HostArray::C64(out))
        }
        None => {
            let mut out = try_dense::<f64>(shape)?;
            copy::plane_into_host(&mut out.view_mut(), matrix.real())?;
            Ok(HostArray::F64(out))
        }
    }
}

/// Convert an engine char array to text. Only single-row arrays (and the
/// empty `0 × 0` array) are supported.
pub fn char_array_to_text(chars: &CharArray) -> Result<String> {
    let shape = chars.shape();
    match shape.rows {
        1 => Ok(chars.chars().iter().collect()),
        0 if shape.cols == 0 => Ok(String::new()),
        rows => Err(MarshalError::MultiRowText { rows }),
    }
}
