//! Borrowed and owned dynamic-rank strided arrays.
//!
//! - [`StridedView`]: immutable borrowed view
//! - [`StridedViewMut`]: mutable borrowed view
//! - [`StridedArray`]: owned array (row-major or column-major, or any
//!   validated stride pattern over its own buffer)

use std::sync::Arc;

use crate::{Result, StridedError};

// ============================================================================
// Validation helpers
// ============================================================================

/// Validate that all reachable offsets stay within `[0, len)`.
fn validate_bounds(len: usize, dims: &[usize], strides: &[isize], offset: isize) -> Result<()> {
    if dims.len() != strides.len() {
        return Err(StridedError::StrideLengthMismatch);
    }
    // Empty array - nothing is ever read
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &stride) in dims.iter().zip(strides.iter()) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(StridedError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset < 0 || max_offset as usize >= len {
        return Err(StridedError::OffsetOverflow);
    }
    Ok(())
}

/// Column-major strides: first index varies fastest.
pub fn col_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = Vec::with_capacity(dims.len());
    let mut acc = 1isize;
    for &d in dims {
        strides.push(acc);
        acc *= d.max(1) as isize;
    }
    strides
}

/// Row-major strides: last index varies fastest.
pub fn row_major_strides(dims: &[usize]) -> Vec<isize> {
    let mut strides = vec![0isize; dims.len()];
    let mut acc = 1isize;
    for (s, &d) in strides.iter_mut().zip(dims.iter()).rev() {
        *s = acc;
        acc *= d.max(1) as isize;
    }
    strides
}

#[inline]
fn element_position(dims: &[usize], strides: &[isize], offset: isize, indices: &[usize]) -> usize {
    assert_eq!(indices.len(), dims.len(), "wrong number of indices");
    let mut pos = offset;
    for ((&index, &dim), &stride) in indices.iter().zip(dims.iter()).zip(strides.iter()) {
        assert!(index < dim, "index {} out of bounds for dim {}", index, dim);
        pos += index as isize * stride;
    }
    pos as usize
}

fn check_perm(perm: &[usize], rank: usize) -> Result<()> {
    if perm.len() != rank {
        return Err(StridedError::RankMismatch(perm.len(), rank));
    }
    let mut seen = vec![false; rank];
    for &p in perm {
        if p >= rank || seen[p] {
            return Err(StridedError::InvalidAxis { axis: p, rank });
        }
        seen[p] = true;
    }
    Ok(())
}

// ============================================================================
// StridedView
// ============================================================================

/// Dynamic-rank immutable strided view.
///
/// The view borrows `data` and addresses element `idx` at
/// `offset + Σ idx[k] * strides[k]`.
pub struct StridedView<'a, T> {
    data: &'a [T],
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T> Clone for StridedView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T> std::fmt::Debug for StridedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedView")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedView<'a, T> {
    /// Create a view over a borrowed slice, validating that every
    /// reachable element lies inside `data`.
    pub fn new(data: &'a [T], dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Borrow the element at `indices`.
    pub fn get_ref(&self, indices: &[usize]) -> &'a T {
        let pos = element_position(&self.dims, &self.strides, self.offset, indices);
        &self.data[pos]
    }

    /// Permute dimensions.
    pub fn permute(&self, perm: &[usize]) -> Result<StridedView<'a, T>> {
        check_perm(perm, self.dims.len())?;
        let dims: Vec<usize> = perm.iter().map(|&p| self.dims[p]).collect();
        let strides: Vec<isize> = perm.iter().map(|&p| self.strides[p]).collect();
        Ok(StridedView {
            data: self.data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset: self.offset,
        })
    }

    /// Swap the two axes of a 2D view.
    pub fn transpose_2d(&self) -> Result<StridedView<'a, T>> {
        if self.dims.len() != 2 {
            return Err(StridedError::RankMismatch(self.dims.len(), 2));
        }
        self.permute(&[1, 0])
    }

    /// Keep every `step`-th element along `axis`.
    ///
    /// A negative step walks the axis backwards starting from its last
    /// element, so `step_axis(0, -1)` reverses axis 0.
    pub fn step_axis(&self, axis: usize, step: isize) -> Result<StridedView<'a, T>> {
        let rank = self.dims.len();
        if axis >= rank {
            return Err(StridedError::InvalidAxis { axis, rank });
        }
        if step == 0 {
            return Err(StridedError::ZeroStep);
        }
        let dim = self.dims[axis];
        let stride = self.strides[axis];
        let magnitude = step.unsigned_abs();

        let mut dims = self.dims.to_vec();
        let mut strides = self.strides.to_vec();
        let mut offset = self.offset;
        dims[axis] = dim.div_ceil(magnitude);
        strides[axis] = stride
            .checked_mul(step)
            .ok_or(StridedError::OffsetOverflow)?;
        if step < 0 && dim > 0 {
            offset += stride * (dim as isize - 1);
        }
        StridedView::new(self.data, &dims, &strides, offset)
    }
}

impl<'a, T: Copy> StridedView<'a, T> {
    /// Read the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> T {
        *self.get_ref(indices)
    }
}

// ============================================================================
// StridedViewMut
// ============================================================================

/// Dynamic-rank mutable strided view.
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T> std::fmt::Debug for StridedViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedViewMut")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Create a mutable view, validating bounds as [`StridedView::new`] does.
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Write `value` at `indices`.
    pub fn set(&mut self, indices: &[usize], value: T) {
        let pos = element_position(&self.dims, &self.strides, self.offset, indices);
        self.data[pos] = value;
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &*self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Copy> StridedViewMut<'_, T> {
    /// Read the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> T {
        let pos = element_position(&self.dims, &self.strides, self.offset, indices);
        self.data[pos]
    }
}

// ============================================================================
// StridedArray
// ============================================================================

/// Owned strided multidimensional array.
pub struct StridedArray<T> {
    data: Vec<T>,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T> std::fmt::Debug for StridedArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedArray")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T: Clone> Clone for StridedArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Clone + Default> StridedArray<T> {
    /// Column-major array filled with `T::default()`.
    pub fn col_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims)),
            offset: 0,
        }
    }

    /// Row-major array filled with `T::default()`.
    pub fn row_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims)),
            offset: 0,
        }
    }
}

impl<T> StridedArray<T> {
    /// Create from raw parts, validating bounds.
    pub fn from_parts(
        data: Vec<T>,
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    /// Wrap a dense row-major buffer. `data.len()` must equal the product
    /// of `dims`.
    pub fn from_vec_row_major(data: Vec<T>, dims: &[usize]) -> Result<Self> {
        let total: usize = dims.iter().product();
        if data.len() != total {
            return Err(StridedError::ShapeMismatch(vec![data.len()], dims.to_vec()));
        }
        let strides = row_major_strides(dims);
        Self::from_parts(data, dims, &strides, 0)
    }

    /// Row-major array with values produced by `f`, called in row-major
    /// index order.
    pub fn from_fn_row_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total: usize = dims.iter().product();
        let rank = dims.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in (0..rank).rev() {
                idx[d] += 1;
                if idx[d] < dims[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims)),
            offset: 0,
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dims.iter().product()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dims.iter().any(|&d| d == 0)
    }

    /// Backing buffer in memory order.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the array, returning its backing buffer.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Immutable view over the whole array.
    pub fn view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    /// Mutable view over the whole array.
    pub fn view_mut(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut {
            data: &mut self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Copy> StridedArray<T> {
    /// Read the element at `indices`.
    pub fn get(&self, indices: &[usize]) -> T {
        let pos = element_position(&self.dims, &self.strides, self.offset, indices);
        self.data[pos]
    }

    /// Write `value` at `indices`.
    pub fn set(&mut self, indices: &[usize], value: T) {
        let pos = element_position(&self.dims, &self.strides, self.offset, indices);
        self.data[pos] = value;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn test_col_major_strides() {
        assert_eq!(col_major_strides(&[3, 4]), vec![1, 3]);
        assert_eq!(col_major_strides(&[2, 3, 4]), vec![1, 2, 6]);
        assert!(col_major_strides(&[]).is_empty());
    }

    #[test]
    fn test_row_major_strides() {
        assert_eq!(row_major_strides(&[3, 4]), vec![4, 1]);
        assert_eq!(row_major_strides(&[2, 3, 4]), vec![12, 4, 1]);
        assert_eq!(row_major_strides(&[0, 3]), vec![3, 1]);
    }

    #[test]
    fn test_view_get_row_major() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = StridedView::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        assert_eq!(view.ndim(), 2);
        assert_eq!(view.len(), 6);
        assert_eq!(view.get(&[0, 0]), 1.0);
        assert_eq!(view.get(&[0, 2]), 3.0);
        assert_eq!(view.get(&[1, 0]), 4.0);
        assert_eq!(view.get(&[1, 2]), 6.0);
    }

    #[test]
    fn test_view_get_col_major() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = StridedView::new(&data, &[2, 3], &[1, 2], 0).unwrap();
        assert_eq!(view.get(&[1, 0]), 2.0);
        assert_eq!(view.get(&[0, 1]), 3.0);
        assert_eq!(view.get(&[1, 2]), 6.0);
    }

    #[test]
    fn test_view_rank0() {
        let data = vec![Complex64::new(1.0, -1.0)];
        let view = StridedView::new(&data, &[], &[], 0).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view.get(&[]), Complex64::new(1.0, -1.0));
    }

    #[test]
    fn test_view_transpose_2d() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let view = StridedView::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        let t = view.transpose_2d().unwrap();
        assert_eq!(t.dims(), &[3, 2]);
        assert_eq!(t.strides(), &[1, 3]);
        assert_eq!(t.get(&[1, 0]), 2.0);
        assert_eq!(t.get(&[0, 1]), 4.0);
    }

    #[test]
    fn test_view_transpose_requires_2d() {
        let data = vec![1.0, 2.0, 3.0];
        let view = StridedView::new(&data, &[3], &[1], 0).unwrap();
        assert!(matches!(
            view.transpose_2d(),
            Err(StridedError::RankMismatch(1, 2))
        ));
    }

    #[test]
    fn test_view_permute_rejects_duplicates() {
        let data = vec![0.0; 6];
        let view = StridedView::new(&data, &[2, 3], &[3, 1], 0).unwrap();
        assert!(view.permute(&[0, 0]).is_err());
        assert!(view.permute(&[0]).is_err());
    }

    #[test]
    fn test_step_axis_forward() {
        // every second column of a 2x5 row-major array
        let data: Vec<f64> = (0..10).map(|x| x as f64).collect();
        let view = StridedView::new(&data, &[2, 5], &[5, 1], 0).unwrap();
        let stepped = view.step_axis(1, 2).unwrap();
        assert_eq!(stepped.dims(), &[2, 3]);
        assert_eq!(stepped.strides(), &[5, 2]);
        assert_eq!(stepped.get(&[0, 1]), 2.0);
        assert_eq!(stepped.get(&[1, 2]), 9.0);
    }

    #[test]
    fn test_step_axis_reverse() {
        let data = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let view = StridedView::new(&data, &[5], &[1], 0).unwrap();
        let rev = view.step_axis(0, -2).unwrap();
        assert_eq!(rev.dims(), &[3]);
        assert_eq!(rev.strides(), &[-2]);
        assert_eq!(rev.offset(), 4);
        assert_eq!(rev.get(&[0]), 50.0);
        assert_eq!(rev.get(&[1]), 30.0);
        assert_eq!(rev.get(&[2]), 10.0);
    }

    #[test]
    fn test_step_axis_empty_and_zero_step() {
        let data: Vec<f64> = vec![];
        let view = StridedView::new(&data, &[0], &[1], 0).unwrap();
        assert_eq!(view.step_axis(0, -3).unwrap().dims(), &[0]);
        assert_eq!(view.step_axis(0, 0).unwrap_err(), StridedError::ZeroStep);
    }

    #[test]
    fn test_view_mut_set() {
        let mut data = vec![0.0; 6];
        {
            let mut view = StridedViewMut::new(&mut data, &[2, 3], &[3, 1], 0).unwrap();
            view.set(&[0, 0], 1.0);
            view.set(&[1, 2], 6.0);
            assert_eq!(view.as_view().get(&[1, 2]), 6.0);
        }
        assert_eq!(data[0], 1.0);
        assert_eq!(data[5], 6.0);
    }

    #[test]
    fn test_array_from_fn_row_major() {
        let a = StridedArray::from_fn_row_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as f64);
        assert_eq!(a.strides(), &[3, 1]);
        assert_eq!(a.data(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(a.get(&[1, 0]), 3.0);
    }

    #[test]
    fn test_array_from_vec_row_major_len_check() {
        assert!(StridedArray::from_vec_row_major(vec![1i32, 2, 3], &[2, 2]).is_err());
        let a = StridedArray::from_vec_row_major(vec![1i32, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(a.get(&[1, 0]), 3);
    }

    #[test]
    fn test_array_col_major_set() {
        let mut a = StridedArray::<f64>::col_major(&[2, 3]);
        a.set(&[1, 2], 42.0);
        assert_eq!(a.data()[5], 42.0);
        assert_eq!(a.view().get(&[1, 2]), 42.0);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds(6, &[2, 3], &[3, 1], 0).is_ok());
        assert!(validate_bounds(5, &[2, 3], &[3, 1], 0).is_err());
        assert!(validate_bounds(0, &[0, 3], &[3, 1], 0).is_ok());
        assert!(validate_bounds(7, &[2, 3], &[3, 1], 1).is_ok());
        assert!(validate_bounds(6, &[2, 3], &[3, 1], 1).is_err());
        assert!(validate_bounds(3, &[3], &[-1], 2).is_ok());
        assert!(validate_bounds(3, &[3], &[-1], 1).is_err());
        assert!(validate_bounds(3, &[3], &[1, 1], 0).is_err());
    }
}
