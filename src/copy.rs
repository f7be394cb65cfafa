//! Strided copy engine.
//!
//! Host → engine: stride-aware reads from an arbitrary host view into
//! dense column-major planes (`dst[col * rows + row]`).
//! Engine → host: dense column-major reads into a freshly allocated host
//! destination addressed through its own strides.
//!
//! Every routine takes its extent from the view's own dims and only forms
//! the offset of an element it actually reads, so a stride on a length-1
//! axis never enters the arithmetic.

use matbridge_view::{StridedError, StridedView, StridedViewMut};
use num_complex::Complex64;

use crate::error::{MarshalError, Result};
use crate::kind::{ComplexElement, RealElement};

#[inline(always)]
fn at<T: Copy>(data: &[T], pos: isize) -> T {
    data[pos as usize]
}

fn check_plane(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(MarshalError::PlaneLengthMismatch { expected, found });
    }
    Ok(())
}

/// Element count of a rank-0 or rank-1 view.
fn vector_len<T>(src: &StridedView<'_, T>) -> Result<usize> {
    match *src.dims() {
        [] => Ok(1),
        [len] => Ok(len),
        _ => Err(StridedError::RankMismatch(src.ndim(), 1).into()),
    }
}

fn matrix_dims(dims: &[usize]) -> Result<(usize, usize)> {
    match *dims {
        [rows, cols] => Ok((rows, cols)),
        _ => Err(StridedError::RankMismatch(dims.len(), 2).into()),
    }
}

/// Copy a rank-0 or rank-1 real source into `dst`.
///
/// A single element is read directly at the view offset: a length-1 axis
/// may carry a meaningless stride, and a rank-0 source has none at all.
pub fn copy_vector_real<T: RealElement>(src: &StridedView<'_, T>, dst: &mut [f64]) -> Result<()> {
    let rows = vector_len(src)?;
    check_plane(rows, dst.len())?;
    let data = src.data();
    if rows == 1 {
        dst[0] = at(data, src.offset()).widen();
        return Ok(());
    }
    let stride = src.strides().first().copied().unwrap_or(0);
    for (row, out) in dst.iter_mut().enumerate() {
        *out = at(data, src.offset() + row as isize * stride).widen();
    }
    Ok(())
}

/// Copy a rank-2 real source into a dense column-major plane.
pub fn copy_matrix_real<T: RealElement>(src: &StridedView<'_, T>, dst: &mut [f64]) -> Result<()> {
    let (rows, cols) = matrix_dims(src.dims())?;
    check_plane(rows * cols, dst.len())?;
    let data = src.data();
    let (row_stride, col_stride) = (src.strides()[0], src.strides()[1]);
    for (k, out) in dst.iter_mut().enumerate() {
        let (row, col) = (k % rows, k / rows);
        let pos = src.offset() + row as isize * row_stride + col as isize * col_stride;
        *out = at(data, pos).widen();
    }
    Ok(())
}

/// Copy a rank-0 or rank-1 complex source, splitting each element across
/// the real and imaginary planes.
pub fn copy_vector_complex<T: ComplexElement>(
    src: &StridedView<'_, T>,
    re: &mut [f64],
    im: &mut [f64],
) -> Result<()> {
    let rows = vector_len(src)?;
    check_plane(rows, re.len())?;
    check_plane(rows, im.len())?;
    let data = src.data();
    // rank 0 has no stride; index 0 never multiplies it anyway
    let stride = src.strides().first().copied().unwrap_or(0);
    for (row, (r, i)) in re.iter_mut().zip(im.iter_mut()).enumerate() {
        (*r, *i) = at(data, src.offset() + row as isize * stride).widen_parts();
    }
    Ok(())
}

/// Copy a rank-2 complex source into dense column-major planes.
pub fn copy_matrix_complex<T: ComplexElement>(
    src: &StridedView<'_, T>,
    re: &mut [f64],
    im: &mut [f64],
) -> Result<()> {
    let (rows, cols) = matrix_dims(src.dims())?;
    check_plane(rows * cols, re.len())?;
    check_plane(rows * cols, im.len())?;
    let data = src.data();
    let (row_stride, col_stride) = (src.strides()[0], src.strides()[1]);
    for (k, (r, i)) in re.iter_mut().zip(im.iter_mut()).enumerate() {
        let (row, col) = (k % rows, k / rows);
        let pos = src.offset() + row as isize * row_stride + col as isize * col_stride;
        (*r, *i) = at(data, pos).widen_parts();
    }
    Ok(())
}

/// Scatter a dense column-major plane into a `[rows, cols]` destination.
pub fn plane_into_host(dst: &mut StridedViewMut<'_, f64>, re: &[f64]) -> Result<()> {
    let (rows, cols) = matrix_dims(dst.dims())?;
    check_plane(rows * cols, re.len())?;
    for (k, &x) in re.iter().enumerate() {
        dst.set(&[k % rows, k / rows], x);
    }
    Ok(())
}

/// Merge two dense column-major planes into a `[rows, cols]` complex
/// destination.
pub fn planes_into_host(
    dst: &mut StridedViewMut<'_, Complex64>,
    re: &[f64],
    im: &[f64],
) -> Result<()> {
    let (rows, cols) = matrix_dims(dst.dims())?;
    check_plane(rows * cols, re.len())?;
    check_plane(rows * cols, im.len())?;
    for (k, (&r, &i)) in re.iter().zip(im.iter()).enumerate() {
        dst.set(&[k % rows, k / rows], Complex64::new(r, i));
    }
    Ok(())
}
