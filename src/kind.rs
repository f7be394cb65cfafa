//! Element-kind registry.
//!
//! The set of host element kinds is closed. Adding a kind means adding a
//! row to [`ElementKind`], a [`RealElement`] or [`ComplexElement`] impl,
//! and a variant to the host array enums.

use num_complex::{Complex32, Complex64};
use num_traits::AsPrimitive;

/// Tag identifying the element type of a host array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Int8,
    UInt8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Complex32,
    Complex64,
    /// Untyped generic objects. Never convertible.
    Object,
}

impl ElementKind {
    /// Every numeric kind, in registry order.
    pub const NUMERIC: [ElementKind; 9] = [
        ElementKind::Int8,
        ElementKind::UInt8,
        ElementKind::Int16,
        ElementKind::Int32,
        ElementKind::Int64,
        ElementKind::Float32,
        ElementKind::Float64,
        ElementKind::Complex32,
        ElementKind::Complex64,
    ];

    /// Size of one element in bytes, or `None` for [`ElementKind::Object`].
    pub const fn byte_width(self) -> Option<usize> {
        match self {
            ElementKind::Int8 | ElementKind::UInt8 => Some(1),
            ElementKind::Int16 => Some(2),
            ElementKind::Int32 | ElementKind::Float32 => Some(4),
            ElementKind::Int64 | ElementKind::Float64 | ElementKind::Complex32 => Some(8),
            ElementKind::Complex64 => Some(16),
            ElementKind::Object => None,
        }
    }

    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, ElementKind::Complex32 | ElementKind::Complex64)
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, ElementKind::Object)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::Int8 => "int8",
            ElementKind::UInt8 => "uint8",
            ElementKind::Int16 => "int16",
            ElementKind::Int32 => "int32",
            ElementKind::Int64 => "int64",
            ElementKind::Float32 => "float32",
            ElementKind::Float64 => "float64",
            ElementKind::Complex32 => "complex64",
            ElementKind::Complex64 => "complex128",
            ElementKind::Object => "object",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Host element types stored in the engine's real plane.
pub trait RealElement: Copy + Send + Sync + 'static {
    const KIND: ElementKind;

    /// Widen to the engine's double precision.
    fn widen(self) -> f64;
}

/// Host element types split across the engine's real and imaginary planes.
pub trait ComplexElement: Copy + Send + Sync + 'static {
    const KIND: ElementKind;

    /// Widen to a `(re, im)` pair of doubles.
    fn widen_parts(self) -> (f64, f64);
}

macro_rules! impl_real_element {
    ($($t:ty => $kind:ident),* $(,)?) => {
        $(
            impl RealElement for $t {
                const KIND: ElementKind = ElementKind::$kind;

                #[inline(always)]
                fn widen(self) -> f64 {
                    self.as_()
                }
            }
        )*
    };
}

impl_real_element!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
);

impl ComplexElement for Complex32 {
    const KIND: ElementKind = ElementKind::Complex32;

    #[inline(always)]
    fn widen_parts(self) -> (f64, f64) {
        (self.re.as_(), self.im.as_())
    }
}

impl ComplexElement for Complex64 {
    const KIND: ElementKind = ElementKind::Complex64;

    #[inline(always)]
    fn widen_parts(self) -> (f64, f64) {
        (self.re, self.im)
    }
}
