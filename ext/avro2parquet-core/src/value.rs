use bytes::Bytes;
use indexmap::IndexMap;
use num::BigInt;
use std::sync::Arc;

/// One decoded record: a value per top-level schema field, in schema order
pub type Row = Vec<Value>;

/// A single field value on its way from an Avro record into a Parquet column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    // Numeric types
    Int32(i32),
    Int64(i64),
    Float32(ordered_float::OrderedFloat<f32>),
    Float64(ordered_float::OrderedFloat<f64>),

    // Basic types
    Boolean(bool),
    String(Arc<str>),
    Bytes(Bytes),

    // Days since epoch
    Date32(i32),

    // Decimal types
    Decimal128(i128, i8),   // value, scale
    Decimal256(BigInt, i8), // precision above 38 digits

    // Timestamps with optional timezone; `None` is a local timestamp
    TimestampMillis(i64, Option<Arc<str>>),
    TimestampMicros(i64, Option<Arc<str>>),
    TimestampNanos(i64, Option<Arc<str>>),

    // Time types
    TimeMillis(i32), // Time of day in milliseconds since midnight
    TimeMicros(i64), // Time of day in microseconds since midnight

    // Complex types
    List(Vec<Value>),
    Map(Vec<(Value, Value)>), // Using Vec of tuples for deterministic ordering
    Record(IndexMap<Arc<str>, Value>), // For struct/record types, preserves field order

    Null,
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int32(_) => "Int32",
            Value::Int64(_) => "Int64",
            Value::Float32(_) => "Float32",
            Value::Float64(_) => "Float64",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Bytes(_) => "Bytes",
            Value::Date32(_) => "Date32",
            Value::Decimal128(_, _) => "Decimal128",
            Value::Decimal256(_, _) => "Decimal256",
            Value::TimestampMillis(_, _) => "TimestampMillis",
            Value::TimestampMicros(_, _) => "TimestampMicros",
            Value::TimestampNanos(_, _) => "TimestampNanos",
            Value::TimeMillis(_) => "TimeMillis",
            Value::TimeMicros(_) => "TimeMicros",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Record(_) => "Record",
            Value::Null => "Null",
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}
