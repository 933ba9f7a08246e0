//! Bridge from Avro schemas and decoded Avro values to the Parquet-side model
//!
//! Type mapping follows the layout the parquet-avro writers use: nullable
//! unions become optional columns, unions with several non-null branches
//! become a struct of optional `memberN` fields, and logical types map onto
//! the matching Parquet logical types.

use crate::{ConvertError, PrimitiveType, Result, Row, Schema, SchemaNode, Value};
use apache_avro::schema::{DecimalSchema, Name, RecordSchema, Schema as AvroSchema, UnionSchema};
use apache_avro::types::Value as AvroValue;
use bytes::Bytes;
use indexmap::IndexMap;
use num::{BigInt, ToPrimitive};
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::sync::Arc;

const MAX_DECIMAL128_PRECISION: usize = 38;
const MAX_DECIMAL256_PRECISION: usize = 76;
const DURATION_BYTES: i32 = 12;

/// Named type definitions reachable from a schema, keyed by full name
type NameMap<'a> = HashMap<Name, &'a AvroSchema>;

fn collect_names<'a>(schema: &'a AvroSchema, names: &mut NameMap<'a>) {
    match schema {
        AvroSchema::Record(record) => {
            names.insert(record.name.clone(), schema);
            for field in &record.fields {
                collect_names(&field.schema, names);
            }
        }
        AvroSchema::Enum(e) => {
            names.insert(e.name.clone(), schema);
        }
        AvroSchema::Fixed(f) => {
            names.insert(f.name.clone(), schema);
        }
        AvroSchema::Array(array) => collect_names(&array.items, names),
        AvroSchema::Map(map) => collect_names(&map.types, names),
        AvroSchema::Union(union) => {
            for variant in union.variants() {
                collect_names(variant, names);
            }
        }
        _ => {}
    }
}

fn resolve<'a>(schema: &'a AvroSchema, names: &NameMap<'a>) -> Result<&'a AvroSchema> {
    match schema {
        AvroSchema::Ref { name } => names.get(name).copied().ok_or_else(|| {
            ConvertError::schema(format!(
                "Unresolved named type reference '{}'",
                name.fullname(None)
            ))
        }),
        other => Ok(other),
    }
}

fn non_null_variants(union: &UnionSchema) -> Vec<(usize, &AvroSchema)> {
    union
        .variants()
        .iter()
        .enumerate()
        .filter(|(_, s)| !matches!(s, AvroSchema::Null))
        .collect()
}

/// Translate an Avro record schema into the Parquet-side schema
pub fn schema_from_avro(avro: &AvroSchema) -> Result<Schema> {
    let mut names = HashMap::new();
    collect_names(avro, &mut names);

    let mut translator = SchemaTranslator {
        names,
        stack: Vec::new(),
    };

    match avro {
        AvroSchema::Record(record) => {
            let root = translator.record_node(record.name.name.clone(), record)?;
            Ok(Schema { root })
        }
        other => Err(ConvertError::schema(format!(
            "Top-level Avro schema must be a record, got {:?}",
            other
        ))),
    }
}

struct SchemaTranslator<'a> {
    names: NameMap<'a>,
    // Records currently being expanded, to reject recursive types
    stack: Vec<Name>,
}

impl<'a> SchemaTranslator<'a> {
    fn record_node(&mut self, name: String, record: &'a RecordSchema) -> Result<SchemaNode> {
        if self.stack.contains(&record.name) {
            return Err(ConvertError::schema(format!(
                "Recursive record '{}' cannot be represented in Parquet",
                record.name.fullname(None)
            )));
        }
        if record.fields.is_empty() {
            return Err(ConvertError::schema(format!(
                "Record '{}' has no fields",
                record.name.fullname(None)
            )));
        }

        self.stack.push(record.name.clone());
        let fields = record
            .fields
            .iter()
            .map(|field| self.field_node(field.name.clone(), &field.schema))
            .collect::<Result<Vec<_>>>();
        self.stack.pop();

        Ok(SchemaNode::Struct {
            name,
            nullable: false,
            fields: fields?,
        })
    }

    fn field_node(&mut self, name: String, schema: &'a AvroSchema) -> Result<SchemaNode> {
        let schema = resolve(schema, &self.names)?;
        let primitive = |primitive_type| SchemaNode::Primitive {
            name: name.clone(),
            primitive_type,
            nullable: false,
        };

        Ok(match schema {
            AvroSchema::Boolean => primitive(PrimitiveType::Boolean),
            AvroSchema::Int => primitive(PrimitiveType::Int32),
            AvroSchema::Long => primitive(PrimitiveType::Int64),
            AvroSchema::Float => primitive(PrimitiveType::Float32),
            AvroSchema::Double => primitive(PrimitiveType::Float64),
            AvroSchema::Bytes => primitive(PrimitiveType::Binary),
            AvroSchema::String | AvroSchema::Enum(_) | AvroSchema::Uuid => {
                primitive(PrimitiveType::String)
            }
            AvroSchema::Fixed(fixed) => {
                let size = i32::try_from(fixed.size).map_err(|_| {
                    ConvertError::schema(format!("Fixed size {} is too large", fixed.size))
                })?;
                primitive(PrimitiveType::FixedLenByteArray(size))
            }
            AvroSchema::Decimal(decimal) => primitive(decimal_type(decimal)?),
            AvroSchema::Date => primitive(PrimitiveType::Date32),
            AvroSchema::TimeMillis => primitive(PrimitiveType::TimeMillis),
            AvroSchema::TimeMicros => primitive(PrimitiveType::TimeMicros),
            AvroSchema::TimestampMillis => primitive(PrimitiveType::TimestampMillis(Some(utc()))),
            AvroSchema::TimestampMicros => primitive(PrimitiveType::TimestampMicros(Some(utc()))),
            AvroSchema::TimestampNanos => primitive(PrimitiveType::TimestampNanos(Some(utc()))),
            AvroSchema::LocalTimestampMillis => primitive(PrimitiveType::TimestampMillis(None)),
            AvroSchema::LocalTimestampMicros => primitive(PrimitiveType::TimestampMicros(None)),
            AvroSchema::LocalTimestampNanos => primitive(PrimitiveType::TimestampNanos(None)),
            AvroSchema::Duration => primitive(PrimitiveType::FixedLenByteArray(DURATION_BYTES)),
            AvroSchema::Array(array) => SchemaNode::List {
                name,
                nullable: false,
                item: Box::new(self.field_node("element".to_string(), &array.items)?),
            },
            AvroSchema::Map(map) => SchemaNode::Map {
                name,
                nullable: false,
                key: Box::new(SchemaNode::Primitive {
                    name: "key".to_string(),
                    primitive_type: PrimitiveType::String,
                    nullable: false,
                }),
                value: Box::new(self.field_node("value".to_string(), &map.types)?),
            },
            AvroSchema::Union(union) => self.union_node(name, union)?,
            AvroSchema::Record(record) => self.record_node(name, record)?,
            AvroSchema::Null => {
                return Err(ConvertError::schema(format!(
                    "Field '{}' has type null, which is only allowed inside a union",
                    name
                )))
            }
            other => {
                return Err(ConvertError::schema(format!(
                    "Field '{}' has unsupported Avro type {:?}",
                    name, other
                )))
            }
        })
    }

    fn union_node(&mut self, name: String, union: &'a UnionSchema) -> Result<SchemaNode> {
        let branches = non_null_variants(union);
        let has_null = branches.len() != union.variants().len();

        match branches.as_slice() {
            [] => Err(ConvertError::schema(format!(
                "Field '{}' is a union with no non-null branch",
                name
            ))),
            [(_, only)] => Ok(self.field_node(name, only)?.with_nullable(has_null)),
            _ => {
                let fields = branches
                    .iter()
                    .enumerate()
                    .map(|(member, (_, branch))| {
                        Ok(self
                            .field_node(format!("member{}", member), branch)?
                            .with_nullable(true))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(SchemaNode::Struct {
                    name,
                    nullable: has_null,
                    fields,
                })
            }
        }
    }
}

fn utc() -> Arc<str> {
    Arc::from("UTC")
}

fn decimal_type(decimal: &DecimalSchema) -> Result<PrimitiveType> {
    let scale = i8::try_from(decimal.scale)
        .map_err(|_| ConvertError::schema(format!("Decimal scale {} is too large", decimal.scale)))?;
    match decimal.precision {
        p if p <= MAX_DECIMAL128_PRECISION => Ok(PrimitiveType::Decimal128(p as u8, scale)),
        p if p <= MAX_DECIMAL256_PRECISION => Ok(PrimitiveType::Decimal256(p as u8, scale)),
        p => Err(ConvertError::schema(format!(
            "Decimal precision {} exceeds the maximum of {}",
            p, MAX_DECIMAL256_PRECISION
        ))),
    }
}

/// Converts decoded Avro records into rows guided by the reader schema
pub struct RecordMapping<'a> {
    record: &'a RecordSchema,
    names: NameMap<'a>,
}

impl<'a> RecordMapping<'a> {
    pub fn new(schema: &'a AvroSchema) -> Result<Self> {
        let record = match schema {
            AvroSchema::Record(record) => record,
            other => {
                return Err(ConvertError::schema(format!(
                    "Top-level Avro schema must be a record, got {:?}",
                    other
                )))
            }
        };
        let mut names = HashMap::new();
        collect_names(schema, &mut names);
        Ok(Self { record, names })
    }

    /// Flatten one top-level Avro record into a row
    pub fn to_row(&self, value: AvroValue) -> Result<Row> {
        let fields = match value {
            AvroValue::Record(fields) => fields,
            other => {
                return Err(ConvertError::conversion(format!(
                    "Expected a record, got {:?}",
                    other
                )))
            }
        };
        self.record_values(self.record, fields)
    }

    fn record_values(
        &self,
        record: &'a RecordSchema,
        fields: Vec<(String, AvroValue)>,
    ) -> Result<Vec<Value>> {
        if fields.len() != record.fields.len() {
            return Err(ConvertError::conversion(format!(
                "Record '{}' has {} values but the schema has {} fields",
                record.name.fullname(None),
                fields.len(),
                record.fields.len()
            )));
        }

        fields
            .into_iter()
            .zip(&record.fields)
            .map(|((name, value), field)| {
                if name != field.name {
                    return Err(ConvertError::conversion(format!(
                        "Expected field '{}', got '{}'",
                        field.name, name
                    )));
                }
                self.value(value, &field.schema)
            })
            .collect()
    }

    fn value(&self, value: AvroValue, schema: &'a AvroSchema) -> Result<Value> {
        let schema = resolve(schema, &self.names)?;

        Ok(match (value, schema) {
            (AvroValue::Null, _) => Value::Null,
            (AvroValue::Union(index, inner), AvroSchema::Union(union)) => {
                self.union_value(index as usize, *inner, union)?
            }
            (AvroValue::Union(_, inner), other) => self.value(*inner, other)?,
            (AvroValue::Boolean(b), _) => Value::Boolean(b),
            (AvroValue::Int(i), _) => Value::Int32(i),
            (AvroValue::Long(i), _) => Value::Int64(i),
            (AvroValue::Float(f), _) => Value::Float32(OrderedFloat(f)),
            (AvroValue::Double(f), _) => Value::Float64(OrderedFloat(f)),
            (AvroValue::Bytes(b), _) | (AvroValue::Fixed(_, b), _) => Value::Bytes(Bytes::from(b)),
            (AvroValue::String(s), _) => Value::String(Arc::from(s)),
            (AvroValue::Enum(_, symbol), _) => Value::String(Arc::from(symbol)),
            (AvroValue::Uuid(uuid), _) => Value::String(Arc::from(uuid.to_string())),
            (AvroValue::Date(d), _) => Value::Date32(d),
            (AvroValue::TimeMillis(t), _) => Value::TimeMillis(t),
            (AvroValue::TimeMicros(t), _) => Value::TimeMicros(t),
            (AvroValue::TimestampMillis(t), _) => Value::TimestampMillis(t, Some(utc())),
            (AvroValue::TimestampMicros(t), _) => Value::TimestampMicros(t, Some(utc())),
            (AvroValue::TimestampNanos(t), _) => Value::TimestampNanos(t, Some(utc())),
            (AvroValue::LocalTimestampMillis(t), _) => Value::TimestampMillis(t, None),
            (AvroValue::LocalTimestampMicros(t), _) => Value::TimestampMicros(t, None),
            (AvroValue::LocalTimestampNanos(t), _) => Value::TimestampNanos(t, None),
            (AvroValue::Duration(duration), _) => {
                let raw: [u8; 12] = duration.into();
                Value::Bytes(Bytes::copy_from_slice(&raw))
            }
            (AvroValue::Decimal(decimal), AvroSchema::Decimal(decimal_schema)) => {
                let raw = Vec::<u8>::try_from(&decimal)?;
                decimal_value(&raw, decimal_schema)?
            }
            (AvroValue::Array(items), AvroSchema::Array(array)) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.value(item, &array.items))
                    .collect::<Result<Vec<_>>>()?,
            ),
            (AvroValue::Map(entries), AvroSchema::Map(map)) => {
                let mut entries: Vec<_> = entries.into_iter().collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                Value::Map(
                    entries
                        .into_iter()
                        .map(|(k, v)| Ok((Value::String(Arc::from(k)), self.value(v, &map.types)?)))
                        .collect::<Result<Vec<_>>>()?,
                )
            }
            (AvroValue::Record(fields), AvroSchema::Record(record)) => {
                let values = self.record_values(record, fields)?;
                Value::Record(
                    record
                        .fields
                        .iter()
                        .map(|f| Arc::<str>::from(f.name.as_str()))
                        .zip(values)
                        .collect(),
                )
            }
            (value, schema) => {
                return Err(ConvertError::conversion(format!(
                    "Avro value {:?} does not match schema {:?}",
                    value, schema
                )))
            }
        })
    }

    fn union_value(
        &self,
        index: usize,
        inner: AvroValue,
        union: &'a UnionSchema,
    ) -> Result<Value> {
        if matches!(inner, AvroValue::Null) {
            return Ok(Value::Null);
        }

        let branches = non_null_variants(union);
        let member = branches
            .iter()
            .position(|(i, _)| *i == index)
            .ok_or_else(|| {
                ConvertError::conversion(format!("Union branch {} is out of range", index))
            })?;
        let branch_value = self.value(inner, branches[member].1)?;

        if branches.len() == 1 {
            return Ok(branch_value);
        }

        let mut members = IndexMap::with_capacity(branches.len());
        for i in 0..branches.len() {
            let name: Arc<str> = Arc::from(format!("member{}", i));
            members.insert(name, Value::Null);
        }
        members.insert(Arc::from(format!("member{}", member)), branch_value);
        Ok(Value::Record(members))
    }
}

/// Decode a big-endian two's complement unscaled decimal
fn decimal_value(raw: &[u8], schema: &DecimalSchema) -> Result<Value> {
    let scale = i8::try_from(schema.scale)
        .map_err(|_| ConvertError::conversion(format!("Decimal scale {} is too large", schema.scale)))?;
    let unscaled = BigInt::from_signed_bytes_be(raw);

    if schema.precision <= MAX_DECIMAL128_PRECISION {
        let value = unscaled.to_i128().ok_or_else(|| {
            ConvertError::conversion(format!(
                "Decimal value {} does not fit precision {}",
                unscaled, schema.precision
            ))
        })?;
        Ok(Value::Decimal128(value, scale))
    } else {
        Ok(Value::Decimal256(unscaled, scale))
    }
}
