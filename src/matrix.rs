//! Engine-side values.
//!
//! An [`EngineMatrix`] owns its planes; nothing here ever borrows host
//! memory. Conversions copy across the boundary in both directions.

use num_complex::Complex64;

use crate::error::{MarshalError, Result};
use crate::shape::MatrixShape;

/// Column-major double matrix with separate real and imaginary planes.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineMatrix {
    shape: MatrixShape,
    real: Vec<f64>,
    imag: Option<Vec<f64>>,
}

fn try_plane(shape: MatrixShape) -> Result<Vec<f64>> {
    let failed = || MarshalError::AllocationFailed {
        rows: shape.rows,
        cols: shape.cols,
    };
    let len = shape.checked_len().ok_or_else(failed)?;
    let mut plane = Vec::new();
    plane.try_reserve_exact(len).map_err(|_| failed())?;
    plane.resize(len, 0.0);
    Ok(plane)
}

impl EngineMatrix {
    /// Allocate a zero-filled matrix. Fails with
    /// [`MarshalError::AllocationFailed`] instead of aborting when the
    /// planes cannot be reserved.
    pub fn try_zeros(shape: MatrixShape, complex: bool) -> Result<Self> {
        let real = try_plane(shape)?;
        let imag = if complex {
            Some(try_plane(shape)?)
        } else {
            None
        };
        Ok(Self { shape, real, imag })
    }

    /// Build from existing column-major planes.
    pub fn from_planes(shape: MatrixShape, real: Vec<f64>, imag: Option<Vec<f64>>) -> Result<Self> {
        let expected = shape.checked_len().ok_or(MarshalError::AllocationFailed {
            rows: shape.rows,
            cols: shape.cols,
        })?;
        for plane in std::iter::once(&real).chain(imag.as_ref()) {
            if plane.len() != expected {
                return Err(MarshalError::PlaneLengthMismatch {
                    expected,
                    found: plane.len(),
                });
            }
        }
        Ok(Self { shape, real, imag })
    }

    #[inline]
    pub fn shape(&self) -> MatrixShape {
        self.shape
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    #[inline]
    pub fn real(&self) -> &[f64] {
        &self.real
    }

    #[inline]
    pub fn imag(&self) -> Option<&[f64]> {
        self.imag.as_deref()
    }

    /// Both planes, mutably. The imaginary plane is `None` for real matrices.
    pub fn planes_mut(&mut self) -> (&mut [f64], Option<&mut [f64]>) {
        (&mut self.real, self.imag.as_deref_mut())
    }

    /// Element at `(row, col)`, or `None` out of range. The imaginary part
    /// is zero for real matrices.
    pub fn at(&self, row: usize, col: usize) -> Option<Complex64> {
        if row >= self.shape.rows || col >= self.shape.cols {
            return None;
        }
        let k = col * self.shape.rows + row;
        let im = self.imag.as_ref().map_or(0.0, |p| p[k]);
        Some(Complex64::new(self.real[k], im))
    }
}

/// Column-major engine character array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharArray {
    shape: MatrixShape,
    chars: Vec<char>,
}

impl CharArray {
    /// A `1 × n` row holding `text`. Empty text is the engine's `0 × 0`
    /// empty string.
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let rows = usize::from(!chars.is_empty());
        Self {
            shape: MatrixShape::new(rows, chars.len()),
            chars,
        }
    }

    /// Build from column-major characters.
    pub fn from_chars(shape: MatrixShape, chars: Vec<char>) -> Result<Self> {
        let expected = shape.checked_len().ok_or(MarshalError::AllocationFailed {
            rows: shape.rows,
            cols: shape.cols,
        })?;
        if chars.len() != expected {
            return Err(MarshalError::PlaneLengthMismatch {
                expected,
                found: chars.len(),
            });
        }
        Ok(Self { shape, chars })
    }

    #[inline]
    pub fn shape(&self) -> MatrixShape {
        self.shape
    }

    #[inline]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

/// A workspace variable as the engine reports it.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    Matrix(EngineMatrix),
    Char(CharArray),
    /// Any other engine class (struct, cell, integer classes, ...).
    Other { class: String },
}

impl EngineValue {
    /// Engine class name.
    pub fn class(&self) -> &str {
        match self {
            EngineValue::Matrix(_) => "double",
            EngineValue::Char(_) => "char",
            EngineValue::Other { class } => class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_zeros() {
        let m = EngineMatrix::try_zeros(MatrixShape::new(2, 3), true).unwrap();
        assert_eq!(m.real().len(), 6);
        assert_eq!(m.imag().map(<[f64]>::len), Some(6));
        assert!(m.is_complex());
        let r = EngineMatrix::try_zeros(MatrixShape::new(0, 0), false).unwrap();
        assert!(r.real().is_empty());
        assert!(!r.is_complex());
    }

    #[test]
    fn test_try_zeros_overflow() {
        let err = EngineMatrix::try_zeros(MatrixShape::new(usize::MAX, 2), false).unwrap_err();
        assert_eq!(
            err,
            MarshalError::AllocationFailed {
                rows: usize::MAX,
                cols: 2
            }
        );
    }

    #[test]
    fn test_from_planes_checks_lengths() {
        let shape = MatrixShape::new(2, 2);
        assert!(EngineMatrix::from_planes(shape, vec![0.0; 4], None).is_ok());
        assert!(EngineMatrix::from_planes(shape, vec![0.0; 3], None).is_err());
        assert!(EngineMatrix::from_planes(shape, vec![0.0; 4], Some(vec![0.0; 5])).is_err());
    }

    #[test]
    fn test_at_column_major() {
        let m = EngineMatrix::from_planes(
            MatrixShape::new(2, 2),
            vec![1.0, 2.0, 3.0, 4.0],
            Some(vec![0.5, 0.0, 0.0, -1.0]),
        )
        .unwrap();
        assert_eq!(m.at(1, 0), Some(Complex64::new(2.0, 0.0)));
        assert_eq!(m.at(0, 1), Some(Complex64::new(3.0, 0.0)));
        assert_eq!(m.at(1, 1), Some(Complex64::new(4.0, -1.0)));
        assert_eq!(m.at(2, 0), None);
        assert_eq!(m.at(0, 2), None);
    }

    #[test]
    fn test_char_array() {
        let c = CharArray::from_text("héllo");
        assert_eq!(c.shape(), MatrixShape::new(1, 5));
        assert_eq!(EngineValue::Char(c).class(), "char");
        assert!(CharArray::from_chars(MatrixShape::new(2, 2), vec!['a'; 3]).is_err());
        assert_eq!(CharArray::from_text("").shape(), MatrixShape::new(0, 0));
    }
}
