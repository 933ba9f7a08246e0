//! Bidirectional conversion between Arrow arrays and [`Value`]
//!
//! The writer transposes buffered rows into columns and builds one Arrow
//! array per column with [`values_to_arrow_array`]. The read-back reader goes
//! the other way with [`arrow_to_value`].

use crate::{ConvertError, Result, Value};
use arrow_array::{builder::*, Array, ArrayRef, ListArray, MapArray, StructArray};
use arrow_schema::{DataType, Field, TimeUnit};
use bytes::Bytes;
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// Convert a single value from an Arrow array at the given index to a Value
pub fn arrow_to_value(array: &dyn Array, index: usize) -> Result<Value> {
    use arrow_array::*;

    if array.is_null(index) {
        return Ok(Value::Null);
    }

    match array.data_type() {
        DataType::Boolean => {
            let array = downcast_array::<BooleanArray>(array)?;
            Ok(Value::Boolean(array.value(index)))
        }
        DataType::Int32 => {
            let array = downcast_array::<Int32Array>(array)?;
            Ok(Value::Int32(array.value(index)))
        }
        DataType::Int64 => {
            let array = downcast_array::<Int64Array>(array)?;
            Ok(Value::Int64(array.value(index)))
        }
        DataType::Float32 => {
            let array = downcast_array::<Float32Array>(array)?;
            Ok(Value::Float32(OrderedFloat(array.value(index))))
        }
        DataType::Float64 => {
            let array = downcast_array::<Float64Array>(array)?;
            Ok(Value::Float64(OrderedFloat(array.value(index))))
        }

        DataType::Utf8 => {
            let array = downcast_array::<StringArray>(array)?;
            Ok(Value::String(Arc::from(array.value(index))))
        }
        DataType::Binary => {
            let array = downcast_array::<BinaryArray>(array)?;
            Ok(Value::Bytes(Bytes::copy_from_slice(array.value(index))))
        }
        DataType::FixedSizeBinary(_) => {
            let array = downcast_array::<FixedSizeBinaryArray>(array)?;
            Ok(Value::Bytes(Bytes::copy_from_slice(array.value(index))))
        }

        DataType::Date32 => {
            let array = downcast_array::<Date32Array>(array)?;
            Ok(Value::Date32(array.value(index)))
        }

        DataType::Timestamp(TimeUnit::Millisecond, timezone) => {
            let array = downcast_array::<TimestampMillisecondArray>(array)?;
            Ok(Value::TimestampMillis(array.value(index), timezone.clone()))
        }
        DataType::Timestamp(TimeUnit::Microsecond, timezone) => {
            let array = downcast_array::<TimestampMicrosecondArray>(array)?;
            Ok(Value::TimestampMicros(array.value(index), timezone.clone()))
        }
        DataType::Timestamp(TimeUnit::Nanosecond, timezone) => {
            let array = downcast_array::<TimestampNanosecondArray>(array)?;
            Ok(Value::TimestampNanos(array.value(index), timezone.clone()))
        }

        DataType::Time32(TimeUnit::Millisecond) => {
            let array = downcast_array::<Time32MillisecondArray>(array)?;
            Ok(Value::TimeMillis(array.value(index)))
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            let array = downcast_array::<Time64MicrosecondArray>(array)?;
            Ok(Value::TimeMicros(array.value(index)))
        }

        DataType::Decimal128(_precision, scale) => {
            let array = downcast_array::<Decimal128Array>(array)?;
            Ok(Value::Decimal128(array.value(index), *scale))
        }
        DataType::Decimal256(_precision, scale) => {
            let array = downcast_array::<Decimal256Array>(array)?;
            let bytes = array.value(index).to_le_bytes();
            let bigint = num::BigInt::from_signed_bytes_le(&bytes);
            Ok(Value::Decimal256(bigint, *scale))
        }

        DataType::List(_) => {
            let array = downcast_array::<ListArray>(array)?;
            let list_values = array.value(index);

            let mut values = Vec::with_capacity(list_values.len());
            for i in 0..list_values.len() {
                values.push(arrow_to_value(&list_values, i)?);
            }

            Ok(Value::List(values))
        }
        DataType::Map(_, _) => {
            let array = downcast_array::<MapArray>(array)?;
            let map_value = array.value(index);

            // Map is stored as a struct with two fields: keys and values
            let keys = map_value.column(0);
            let values = map_value.column(1);

            let mut map_vec = Vec::with_capacity(keys.len());
            for i in 0..keys.len() {
                let key = arrow_to_value(keys, i)?;
                let value = arrow_to_value(values, i)?;
                map_vec.push((key, value));
            }

            Ok(Value::Map(map_vec))
        }
        DataType::Struct(_) => {
            let array = downcast_array::<StructArray>(array)?;

            let mut map = IndexMap::new();
            for (col_idx, field) in array.fields().iter().enumerate() {
                let column = array.column(col_idx);
                let value = arrow_to_value(column, index)?;
                map.insert(Arc::from(field.name().as_str()), value);
            }

            Ok(Value::Record(map))
        }

        dt => Err(ConvertError::Conversion(format!(
            "Unsupported data type for conversion: {:?}",
            dt
        ))),
    }
}

/// Convert a column of Values to an Arrow array
pub fn values_to_arrow_array(values: Vec<Value>, field: &Field) -> Result<ArrayRef> {
    match field.data_type() {
        DataType::Boolean => build_boolean_array(values),
        DataType::Int32 => build_int32_array(values),
        DataType::Int64 => build_int64_array(values),
        DataType::Float32 => build_float32_array(values),
        DataType::Float64 => build_float64_array(values),

        DataType::Utf8 => build_string_array(values),
        DataType::Binary => build_binary_array(values),
        DataType::FixedSizeBinary(size) => build_fixed_binary_array(values, *size),

        DataType::Date32 => build_date32_array(values),
        DataType::Time32(TimeUnit::Millisecond) => build_time_millis_array(values),
        DataType::Time64(TimeUnit::Microsecond) => build_time_micros_array(values),
        DataType::Timestamp(TimeUnit::Millisecond, tz) => {
            build_timestamp_millis_array(values, tz.clone())
        }
        DataType::Timestamp(TimeUnit::Microsecond, tz) => {
            build_timestamp_micros_array(values, tz.clone())
        }
        DataType::Timestamp(TimeUnit::Nanosecond, tz) => {
            build_timestamp_nanos_array(values, tz.clone())
        }

        DataType::Decimal128(precision, scale) => {
            build_decimal128_array(values, *precision, *scale)
        }
        DataType::Decimal256(precision, scale) => {
            build_decimal256_array(values, *precision, *scale)
        }

        DataType::List(item_field) => build_list_array(values, item_field),
        DataType::Map(entries_field, _) => build_map_array(values, entries_field),
        DataType::Struct(fields) => build_struct_array(values, fields),

        dt => Err(ConvertError::Conversion(format!(
            "Unsupported data type for conversion: {:?}",
            dt
        ))),
    }
}

/// Helper function to downcast an array with better error messages
fn downcast_array<T: 'static>(array: &dyn Array) -> Result<&T> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        ConvertError::Conversion(format!("Failed to cast to {}", std::any::type_name::<T>()))
    })
}

fn mismatch(expected: &str, value: &Value) -> ConvertError {
    ConvertError::Conversion(format!(
        "Expected {}, got {:?}",
        expected,
        value.type_name()
    ))
}

fn build_boolean_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = BooleanBuilder::with_capacity(values.len());
    for value in values {
        match value {
            Value::Boolean(b) => builder.append_value(b),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Boolean", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_int32_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = Int32Builder::with_capacity(values.len());
    for value in values {
        match value {
            Value::Int32(i) => builder.append_value(i),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Int32", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Int32 values are widened, matching Avro's int to long promotion
fn build_int64_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = Int64Builder::with_capacity(values.len());
    for value in values {
        match value {
            Value::Int64(i) => builder.append_value(i),
            Value::Int32(i) => builder.append_value(i as i64),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Int64", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_float32_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = Float32Builder::with_capacity(values.len());
    for value in values {
        match value {
            Value::Float32(OrderedFloat(f)) => builder.append_value(f),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Float32", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_float64_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = Float64Builder::with_capacity(values.len());
    for value in values {
        match value {
            Value::Float64(OrderedFloat(f)) => builder.append_value(f),
            Value::Float32(OrderedFloat(f)) => builder.append_value(f as f64),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Float64", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_string_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = StringBuilder::with_capacity(values.len(), 0);
    for value in values {
        match value {
            Value::String(s) => builder.append_value(&s),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("String", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_binary_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = BinaryBuilder::with_capacity(values.len(), 0);
    for value in values {
        match value {
            Value::Bytes(b) => builder.append_value(&b),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Bytes", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_fixed_binary_array(values: Vec<Value>, size: i32) -> Result<ArrayRef> {
    let mut builder = FixedSizeBinaryBuilder::with_capacity(values.len(), size);
    for value in values {
        match value {
            Value::Bytes(b) => {
                if b.len() != size as usize {
                    return Err(ConvertError::Conversion(format!(
                        "Fixed size binary expected {} bytes, got {}",
                        size,
                        b.len()
                    )));
                }
                builder.append_value(&b)?;
            }
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Bytes", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_date32_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = Date32Builder::with_capacity(values.len());
    for value in values {
        match value {
            Value::Date32(d) => builder.append_value(d),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Date32", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_time_millis_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = Time32MillisecondBuilder::with_capacity(values.len());
    for value in values {
        match value {
            Value::TimeMillis(t) => builder.append_value(t),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("TimeMillis", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_time_micros_array(values: Vec<Value>) -> Result<ArrayRef> {
    let mut builder = Time64MicrosecondBuilder::with_capacity(values.len());
    for value in values {
        match value {
            Value::TimeMicros(t) => builder.append_value(t),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("TimeMicros", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Timestamps take the field's timezone; the value's own zone only marks UTC vs local
fn build_timestamp_millis_array(values: Vec<Value>, timezone: Option<Arc<str>>) -> Result<ArrayRef> {
    let mut builder = TimestampMillisecondBuilder::with_capacity(values.len()).with_timezone_opt(timezone);
    for value in values {
        match value {
            Value::TimestampMillis(t, _) => builder.append_value(t),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("TimestampMillis", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_timestamp_micros_array(values: Vec<Value>, timezone: Option<Arc<str>>) -> Result<ArrayRef> {
    let mut builder = TimestampMicrosecondBuilder::with_capacity(values.len()).with_timezone_opt(timezone);
    for value in values {
        match value {
            Value::TimestampMicros(t, _) => builder.append_value(t),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("TimestampMicros", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_timestamp_nanos_array(values: Vec<Value>, timezone: Option<Arc<str>>) -> Result<ArrayRef> {
    let mut builder = TimestampNanosecondBuilder::with_capacity(values.len()).with_timezone_opt(timezone);
    for value in values {
        match value {
            Value::TimestampNanos(t, _) => builder.append_value(t),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("TimestampNanos", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_decimal128_array(values: Vec<Value>, precision: u8, scale: i8) -> Result<ArrayRef> {
    let mut builder = Decimal128Builder::with_capacity(values.len())
        .with_precision_and_scale(precision, scale)?;
    for value in values {
        match value {
            Value::Decimal128(d, _) => builder.append_value(d),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Decimal128", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn build_decimal256_array(values: Vec<Value>, precision: u8, scale: i8) -> Result<ArrayRef> {
    let mut builder = Decimal256Builder::with_capacity(values.len())
        .with_precision_and_scale(precision, scale)?;
    for value in values {
        match value {
            Value::Decimal256(bigint, _) => builder.append_value(decimal256_from_bigint(&bigint)?),
            Value::Null => builder.append_null(),
            _ => return Err(mismatch("Decimal256", &value)),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Convert BigInt to i256, sign-extending to 32 bytes
fn decimal256_from_bigint(bigint: &num::BigInt) -> Result<arrow_buffer::i256> {
    let mut bytes = bigint.to_signed_bytes_le();
    if bytes.len() > 32 {
        return Err(ConvertError::Conversion(
            "Decimal256 value too large".to_string(),
        ));
    }

    let fill = if bigint.sign() == num::bigint::Sign::Minus {
        0xff
    } else {
        0
    };
    bytes.resize(32, fill);

    let byte_array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| ConvertError::Conversion("Failed to convert bytes to i256".to_string()))?;
    Ok(arrow_buffer::i256::from_le_bytes(byte_array))
}

fn build_list_array(values: Vec<Value>, item_field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items = Vec::new();
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut null_buffer_builder = arrow_buffer::BooleanBufferBuilder::new(values.len());
    offsets.push(0i32);

    for value in values {
        match value {
            Value::List(items) => {
                all_items.extend(items);
                offsets.push(all_items.len() as i32);
                null_buffer_builder.append(true);
            }
            Value::Null => {
                offsets.push(all_items.len() as i32);
                null_buffer_builder.append(false);
            }
            _ => return Err(mismatch("List", &value)),
        }
    }

    let item_array = values_to_arrow_array(all_items, item_field)?;
    let offset_buffer = arrow_buffer::OffsetBuffer::new(offsets.into());
    let null_buffer = null_buffer_builder.finish();

    Ok(Arc::new(ListArray::try_new(
        item_field.clone(),
        offset_buffer,
        item_array,
        Some(null_buffer.into()),
    )?))
}

fn build_map_array(values: Vec<Value>, entries_field: &Arc<Field>) -> Result<ArrayRef> {
    let struct_fields = match entries_field.data_type() {
        DataType::Struct(fields) if fields.len() == 2 => fields.clone(),
        _ => {
            return Err(ConvertError::Conversion(
                "Map entries field must be a struct with exactly 2 fields".to_string(),
            ))
        }
    };

    let mut all_keys = Vec::new();
    let mut all_values = Vec::new();
    let mut offsets = Vec::with_capacity(values.len() + 1);
    let mut null_buffer_builder = arrow_buffer::BooleanBufferBuilder::new(values.len());
    offsets.push(0i32);

    for value in values {
        match value {
            Value::Map(entries) => {
                for (k, v) in entries {
                    all_keys.push(k);
                    all_values.push(v);
                }
                offsets.push(all_keys.len() as i32);
                null_buffer_builder.append(true);
            }
            Value::Null => {
                offsets.push(all_keys.len() as i32);
                null_buffer_builder.append(false);
            }
            _ => return Err(mismatch("Map", &value)),
        }
    }

    let key_array = values_to_arrow_array(all_keys, &struct_fields[0])?;
    let value_array = values_to_arrow_array(all_values, &struct_fields[1])?;
    let struct_array = StructArray::try_new(struct_fields, vec![key_array, value_array], None)?;

    let offset_buffer = arrow_buffer::OffsetBuffer::new(offsets.into());
    let null_buffer = null_buffer_builder.finish();

    Ok(Arc::new(MapArray::try_new(
        entries_field.clone(),
        offset_buffer,
        struct_array,
        Some(null_buffer.into()),
        false,
    )?))
}

fn build_struct_array(values: Vec<Value>, fields: &arrow_schema::Fields) -> Result<ArrayRef> {
    let num_rows = values.len();
    let mut null_buffer_builder = arrow_buffer::BooleanBufferBuilder::new(num_rows);
    let mut field_columns: Vec<Vec<Value>> = vec![Vec::with_capacity(num_rows); fields.len()];

    for value in values {
        match value {
            Value::Record(mut map) => {
                null_buffer_builder.append(true);
                for (idx, field) in fields.iter().enumerate() {
                    let field_value = map
                        .swap_remove(field.name().as_str())
                        .unwrap_or(Value::Null);
                    field_columns[idx].push(field_value);
                }
            }
            Value::Null => {
                null_buffer_builder.append(false);
                for field_column in field_columns.iter_mut() {
                    field_column.push(Value::Null);
                }
            }
            _ => return Err(mismatch("Record", &value)),
        }
    }

    let field_arrays = field_columns
        .into_iter()
        .zip(fields.iter())
        .map(|(column, field)| values_to_arrow_array(column, field))
        .collect::<Result<Vec<_>>>()?;

    let null_buffer = null_buffer_builder.finish();
    Ok(Arc::new(StructArray::try_new(
        fields.clone(),
        field_arrays,
        Some(null_buffer.into()),
    )?))
}
