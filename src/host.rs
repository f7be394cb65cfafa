//! Host-side arrays: closed tagged unions over the element-kind registry.

use matbridge_view::{StridedArray, StridedView};
use num_complex::{Complex32, Complex64};

use crate::error::Result;
use crate::kind::ElementKind;
use crate::value::Value;

/// Apply `$body` to the payload of any variant of `$enum`.
macro_rules! with_payload {
    ($enum:ident, $value:expr, $bind:ident => $body:expr) => {
        match $value {
            $enum::I8($bind) => $body,
            $enum::U8($bind) => $body,
            $enum::I16($bind) => $body,
            $enum::I32($bind) => $body,
            $enum::I64($bind) => $body,
            $enum::F32($bind) => $body,
            $enum::F64($bind) => $body,
            $enum::C32($bind) => $body,
            $enum::C64($bind) => $body,
            $enum::Object($bind) => $body,
        }
    };
}

/// Apply `$body` to the payload and rewrap the result in the same variant
/// of `$out`.
macro_rules! map_payload {
    ($enum:ident => $out:ident, $value:expr, $bind:ident => $body:expr) => {
        match $value {
            $enum::I8($bind) => $out::I8($body),
            $enum::U8($bind) => $out::U8($body),
            $enum::I16($bind) => $out::I16($body),
            $enum::I32($bind) => $out::I32($body),
            $enum::I64($bind) => $out::I64($body),
            $enum::F32($bind) => $out::F32($body),
            $enum::F64($bind) => $out::F64($body),
            $enum::C32($bind) => $out::C32($body),
            $enum::C64($bind) => $out::C64($body),
            $enum::Object($bind) => $out::Object($body),
        }
    };
}

/// An owned host array of any supported element kind.
#[derive(Debug, Clone)]
pub enum HostArray {
    I8(StridedArray<i8>),
    U8(StridedArray<u8>),
    I16(StridedArray<i16>),
    I32(StridedArray<i32>),
    I64(StridedArray<i64>),
    F32(StridedArray<f32>),
    F64(StridedArray<f64>),
    C32(StridedArray<Complex32>),
    C64(StridedArray<Complex64>),
    Object(StridedArray<Value>),
}

impl HostArray {
    pub fn kind(&self) -> ElementKind {
        match self {
            HostArray::I8(_) => ElementKind::Int8,
            HostArray::U8(_) => ElementKind::UInt8,
            HostArray::I16(_) => ElementKind::Int16,
            HostArray::I32(_) => ElementKind::Int32,
            HostArray::I64(_) => ElementKind::Int64,
            HostArray::F32(_) => ElementKind::Float32,
            HostArray::F64(_) => ElementKind::Float64,
            HostArray::C32(_) => ElementKind::Complex32,
            HostArray::C64(_) => ElementKind::Complex64,
            HostArray::Object(_) => ElementKind::Object,
        }
    }

    pub fn dims(&self) -> &[usize] {
        with_payload!(HostArray, self, a => a.dims())
    }

    pub fn ndim(&self) -> usize {
        self.dims().len()
    }

    /// Borrow the whole array as a view.
    pub fn view(&self) -> HostView<'_> {
        map_payload!(HostArray => HostView, self, a => a.view())
    }

    pub fn as_f64(&self) -> Option<&StridedArray<f64>> {
        match self {
            HostArray::F64(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_c64(&self) -> Option<&StridedArray<Complex64>> {
        match self {
            HostArray::C64(a) => Some(a),
            _ => None,
        }
    }
}

/// A borrowed, possibly non-contiguous view of a host array.
#[derive(Debug, Clone)]
pub enum HostView<'a> {
    I8(StridedView<'a, i8>),
    U8(StridedView<'a, u8>),
    I16(StridedView<'a, i16>),
    I32(StridedView<'a, i32>),
    I64(StridedView<'a, i64>),
    F32(StridedView<'a, f32>),
    F64(StridedView<'a, f64>),
    C32(StridedView<'a, Complex32>),
    C64(StridedView<'a, Complex64>),
    Object(StridedView<'a, Value>),
}

impl<'a> HostView<'a> {
    pub fn kind(&self) -> ElementKind {
        match self {
            HostView::I8(_) => ElementKind::Int8,
            HostView::U8(_) => ElementKind::UInt8,
            HostView::I16(_) => ElementKind::Int16,
            HostView::I32(_) => ElementKind::Int32,
            HostView::I64(_) => ElementKind::Int64,
            HostView::F32(_) => ElementKind::Float32,
            HostView::F64(_) => ElementKind::Float64,
            HostView::C32(_) => ElementKind::Complex32,
            HostView::C64(_) => ElementKind::Complex64,
            HostView::Object(_) => ElementKind::Object,
        }
    }

    pub fn dims(&self) -> &[usize] {
        with_payload!(HostView, self, v => v.dims())
    }

    pub fn strides(&self) -> &[isize] {
        with_payload!(HostView, self, v => v.strides())
    }

    pub fn ndim(&self) -> usize {
        self.dims().len()
    }

    /// See [`StridedView::step_axis`].
    pub fn step_axis(&self, axis: usize, step: isize) -> Result<HostView<'a>> {
        Ok(map_payload!(HostView => HostView, self, v => v.step_axis(axis, step)?))
    }

    /// See [`StridedView::transpose_2d`].
    pub fn transpose_2d(&self) -> Result<HostView<'a>> {
        Ok(map_payload!(HostView => HostView, self, v => v.transpose_2d()?))
    }
}

macro_rules! impl_host_from {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<StridedArray<$t>> for HostArray {
                fn from(a: StridedArray<$t>) -> Self {
                    HostArray::$variant(a)
                }
            }

            impl<'a> From<StridedView<'a, $t>> for HostView<'a> {
                fn from(v: StridedView<'a, $t>) -> Self {
                    HostView::$variant(v)
                }
            }
        )*
    };
}

impl_host_from!(
    i8 => I8,
    u8 => U8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Complex32 => C32,
    Complex64 => C64,
    Value => Object,
);
