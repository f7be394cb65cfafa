//! Generic (untyped) host values and the complex staging path.
//!
//! A generic sequence carries no element-kind tag, so it is first staged
//! into a dense row-major `Complex64` array and then demoted to `f64` when
//! every imaginary part is exactly zero. That value-content check is
//! confined to this module; typed arrays are dispatched by tag alone.

use matbridge_view::StridedArray;
use num_complex::Complex64;
use tracing::trace;

use crate::error::{MarshalError, Result};
use crate::host::HostArray;
use crate::MAX_HOST_RANK;

/// A numeric scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
    Complex(Complex64),
}

impl Number {
    /// Widen to a complex double.
    pub fn to_complex(self) -> Complex64 {
        match self {
            Number::Int(i) => Complex64::new(i as f64, 0.0),
            Number::Float(x) => Complex64::new(x, 0.0),
            Number::Complex(c) => c,
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Number::Int(v)
    }
}

impl From<i32> for Number {
    fn from(v: i32) -> Self {
        Number::Int(v.into())
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Number::Float(v)
    }
}

impl From<Complex64> for Number {
    fn from(v: Complex64) -> Self {
        Number::Complex(v)
    }
}

/// One element of a generic, possibly nested, host sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Complex(Complex64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Build a list from anything convertible to values.
    pub fn list<I, V>(items: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Text(_) => "text",
            Value::List(_) => "list",
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Value::Int(i),
            Number::Float(x) => Value::Float(x),
            Number::Complex(c) => Value::Complex(c),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Complex64> for Value {
    fn from(v: Complex64) -> Self {
        Value::Complex(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

/// Shape implied by the nesting of `items`, read along the first element
/// at every depth.
fn infer_dims(items: &[Value]) -> Vec<usize> {
    let mut dims = vec![items.len()];
    let mut level = items;
    while let Some(Value::List(inner)) = level.first() {
        dims.push(inner.len());
        level = inner;
    }
    dims
}

fn flatten_into(
    items: &[Value],
    dims: &[usize],
    depth: usize,
    out: &mut Vec<Complex64>,
) -> Result<()> {
    if items.len() != dims[depth] {
        return Err(MarshalError::RaggedSequence {
            depth,
            expected: dims[depth],
            found: items.len(),
        });
    }
    let innermost = depth + 1 == dims.len();
    for item in items {
        match (item, innermost) {
            (Value::List(inner), false) => flatten_into(inner, dims, depth + 1, out)?,
            (Value::List(_), true) => return Err(MarshalError::InconsistentNesting { depth }),
            (Value::Int(i), true) => out.push(Complex64::new(*i as f64, 0.0)),
            (Value::Float(x), true) => out.push(Complex64::new(*x, 0.0)),
            (Value::Complex(c), true) => out.push(*c),
            (Value::Text(_), true) => {
                return Err(MarshalError::NonNumericElement {
                    position: out.len(),
                    found: item.type_name(),
                })
            }
            (_, false) => return Err(MarshalError::InconsistentNesting { depth }),
        }
    }
    Ok(())
}

/// Coerce a generic sequence into a dense row-major complex staging array.
///
/// Nesting depth is the rank; anything deeper than [`MAX_HOST_RANK`] is
/// rejected before any element is read.
pub fn stage_sequence(items: &[Value]) -> Result<StridedArray<Complex64>> {
    let dims = infer_dims(items);
    if dims.len() > MAX_HOST_RANK {
        return Err(MarshalError::UnsupportedRank { rank: dims.len() });
    }
    let mut flat = Vec::with_capacity(dims.iter().product());
    flatten_into(items, &dims, 0, &mut flat)?;
    Ok(StridedArray::from_vec_row_major(flat, &dims)?)
}

/// Demote a staged array to `f64` iff every imaginary part is exactly zero.
pub fn demote_staged(staged: StridedArray<Complex64>) -> Result<HostArray> {
    let all_real = staged.data().iter().all(|c| c.im == 0.0);
    trace!(dims = ?staged.dims(), all_real, "staged sequence");
    if !all_real {
        return Ok(HostArray::C64(staged));
    }
    let dims = staged.dims().to_vec();
    let strides = staged.strides().to_vec();
    let offset = staged.offset();
    let real: Vec<f64> = staged.into_data().into_iter().map(|c| c.re).collect();
    Ok(HostArray::F64(StridedArray::from_parts(
        real, &dims, &strides, offset,
    )?))
}
