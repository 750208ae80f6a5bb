//! Conversion of engine-native values into plain JSON values.
//!
//! OCR engines hand back typed arrays (`[4, 2]` point grids), fixed-width
//! scalars (`f32` scores) and raw byte strings. None of those belong in a
//! stored record. `to_builtin` walks a `RawValue` and maps each recognized
//! shape to its plain equivalent:
//!
//! | engine value      | plain value                   |
//! |-------------------|-------------------------------|
//! | `Array`           | nested JSON arrays by shape   |
//! | `Scalar`          | JSON number                   |
//! | `Bytes`           | UTF-8 string (lossy)          |
//! | `Seq` / `Map`     | array / object, recursively   |
//! | `Opaque`          | passed through unchanged      |

use serde_json::{Map, Number, Value};

/// Fixed-width scalar as produced by an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    F32(f32),
    F64(f64),
    I32(i32),
    I64(i64),
    U8(u8),
    U32(u32),
}

/// Flat element storage of an n-dimensional array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float(Vec<f64>),
    Int(Vec<i64>),
}

impl ArrayData {
    fn len(&self) -> usize {
        match self {
            ArrayData::Float(v) => v.len(),
            ArrayData::Int(v) => v.len(),
        }
    }

    fn element(&self, index: usize) -> Value {
        match self {
            ArrayData::Float(v) => float_value(v[index]),
            ArrayData::Int(v) => Value::from(v[index]),
        }
    }
}

/// Row-major n-dimensional array whose shape matches its element count.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    shape: Vec<usize>,
    data: ArrayData,
}

impl NdArray {
    /// Build an array, or `None` if `shape` does not cover `data` exactly.
    pub fn new(shape: Vec<usize>, data: ArrayData) -> Option<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return None;
        }
        Some(Self { shape, data })
    }

    /// An `[n, 2]` integer point grid.
    pub fn from_int_points(points: &[[i64; 2]]) -> Self {
        Self {
            shape: vec![points.len(), 2],
            data: ArrayData::Int(points.iter().flatten().copied().collect()),
        }
    }

    /// An `[n, 2]` float point grid.
    pub fn from_float_points(points: &[[f32; 2]]) -> Self {
        Self {
            shape: vec![points.len(), 2],
            data: ArrayData::Float(points.iter().flatten().map(|v| widen(*v)).collect()),
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

/// A value as returned by an OCR engine, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Scalar(ScalarValue),
    Array(NdArray),
    Seq(Vec<RawValue>),
    Map(Vec<(String, RawValue)>),
    /// Anything without a dedicated shape. Kept as-is.
    Opaque(Value),
}

/// Recursively convert an engine value into a plain JSON value.
pub fn to_builtin(value: &RawValue) -> Value {
    match value {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Int(i) => Value::from(*i),
        RawValue::Float(f) => float_value(*f),
        RawValue::Str(s) => Value::String(s.clone()),
        RawValue::Bytes(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        RawValue::Scalar(scalar) => scalar_value(*scalar),
        RawValue::Array(array) => nest(&array.shape, &array.data, 0),
        RawValue::Seq(items) => Value::Array(items.iter().map(to_builtin).collect()),
        RawValue::Map(entries) => {
            let mut map = Map::new();
            for (key, item) in entries {
                map.insert(key.clone(), to_builtin(item));
            }
            Value::Object(map)
        }
        RawValue::Opaque(v) => v.clone(),
    }
}

fn scalar_value(scalar: ScalarValue) -> Value {
    match scalar {
        ScalarValue::F32(f) => float_value(widen(f)),
        ScalarValue::F64(f) => float_value(f),
        ScalarValue::I32(i) => Value::from(i),
        ScalarValue::I64(i) => Value::from(i),
        ScalarValue::U8(u) => Value::from(u),
        ScalarValue::U32(u) => Value::from(u),
    }
}

fn nest(shape: &[usize], data: &ArrayData, offset: usize) -> Value {
    match shape.split_first() {
        None => data.element(offset),
        Some((&dim, rest)) => {
            let stride: usize = rest.iter().product();
            Value::Array(
                (0..dim)
                    .map(|i| nest(rest, data, offset + i * stride))
                    .collect(),
            )
        }
    }
}

/// JSON has no NaN or infinity.
fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

/// Widen through the shortest decimal form so `0.95f32` stays `0.95`.
fn widen(f: f32) -> f64 {
    if !f.is_finite() {
        return f64::from(f);
    }
    f.to_string().parse().unwrap_or(f64::from(f))
}
