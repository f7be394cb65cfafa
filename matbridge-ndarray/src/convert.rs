use matbridge::{EngineMatrix, HostArray, HostView, MarshalError};
use matbridge_view::{StridedArray, StridedError, StridedView};
use ndarray::{Array2, ArrayView, Dimension};
use num_complex::Complex64;

use crate::Result;

/// Min and max element offsets reachable from index `[0, 0, ...]`.
///
/// Negative strides (reversed views) make the min negative relative to
/// `as_ptr()`.
fn compute_offset_range(shape: &[usize], strides: &[isize]) -> (isize, isize) {
    let mut min_off: isize = 0;
    let mut max_off: isize = 0;
    for (&d, &s) in shape.iter().zip(strides.iter()) {
        if d == 0 {
            continue;
        }
        let end = s * (d as isize - 1);
        if end < 0 {
            min_off += end;
        } else {
            max_off += end;
        }
    }
    (min_off, max_off)
}

/// Wrap an `ndarray` view as a [`StridedView`] (zero-copy).
///
/// Dims and strides pass through unchanged; the returned view's data
/// slice spans exactly the memory the `ndarray` view can reach.
pub fn view_to_strided_view<'a, T, D>(view: &ArrayView<'a, T, D>) -> Result<StridedView<'a, T>>
where
    D: Dimension,
{
    let shape = view.shape();
    let strides = view.strides();
    if view.is_empty() {
        return Ok(StridedView::new(&[], shape, strides, 0)?);
    }
    let (min_off, max_off) = compute_offset_range(shape, strides);
    let data_len = (max_off - min_off + 1) as usize;
    // SAFETY: every offset in [min_off, max_off] relative to `as_ptr()` is
    // an element of the array the view borrows for 'a.
    let data: &'a [T] =
        unsafe { std::slice::from_raw_parts(view.as_ptr().offset(min_off), data_len) };
    Ok(StridedView::new(data, shape, strides, -min_off)?)
}

/// Wrap an `ndarray` view as a [`HostView`] (zero-copy).
pub fn host_view<'a, T, D>(view: &ArrayView<'a, T, D>) -> Result<HostView<'a>>
where
    D: Dimension,
    StridedView<'a, T>: Into<HostView<'a>>,
{
    Ok(view_to_strided_view(view)?.into())
}

/// Convert an `ndarray` view to an engine matrix.
pub fn to_engine_matrix<'a, T, D>(view: &ArrayView<'a, T, D>) -> Result<EngineMatrix>
where
    D: Dimension,
    StridedView<'a, T>: Into<HostView<'a>>,
{
    let host = host_view(view)?;
    Ok(matbridge::view_to_engine_matrix(&host)?)
}

/// Copy a rank-2 [`StridedArray`] of any layout into a standard-layout
/// `Array2`.
pub fn strided_array_to_array2<T: Copy>(arr: &StridedArray<T>) -> Result<Array2<T>> {
    match *arr.dims() {
        [rows, cols] => Ok(Array2::from_shape_fn((rows, cols), |(i, j)| arr.get(&[i, j]))),
        _ => Err(StridedError::RankMismatch(arr.ndim(), 2).into()),
    }
}

/// An engine matrix converted to `ndarray`.
#[derive(Debug, Clone, PartialEq)]
pub enum NdMatrix {
    Real(Array2<f64>),
    Complex(Array2<Complex64>),
}

/// Convert an engine matrix into an `Array2` of shape `(rows, cols)`.
pub fn from_engine_matrix(matrix: &EngineMatrix) -> Result<NdMatrix> {
    match matbridge::to_host_array(matrix)? {
        HostArray::F64(a) => Ok(NdMatrix::Real(strided_array_to_array2(&a)?)),
        HostArray::C64(a) => Ok(NdMatrix::Complex(strided_array_to_array2(&a)?)),
        other => Err(MarshalError::UnsupportedElementKind { kind: other.kind() }.into()),
    }
}
