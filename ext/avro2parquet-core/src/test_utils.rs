//! Fixtures shared by unit tests

use crate::{PrimitiveType, Schema, SchemaNode};
use apache_avro::types::Value as AvroValue;

pub const USER_SCHEMA: &str = r#"{
    "type": "record",
    "name": "User",
    "fields": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "string"}
    ]
}"#;

/// Parquet-side schema matching [`USER_SCHEMA`]
pub fn id_name_schema() -> Schema {
    Schema {
        root: SchemaNode::Struct {
            name: "User".to_string(),
            nullable: false,
            fields: vec![
                SchemaNode::Primitive {
                    name: "id".to_string(),
                    primitive_type: PrimitiveType::Int32,
                    nullable: false,
                },
                SchemaNode::Primitive {
                    name: "name".to_string(),
                    primitive_type: PrimitiveType::String,
                    nullable: false,
                },
            ],
        },
    }
}

pub fn user_records(rows: &[(i32, &str)]) -> Vec<AvroValue> {
    rows.iter()
        .map(|(id, name)| {
            AvroValue::Record(vec![
                ("id".to_string(), AvroValue::Int(*id)),
                ("name".to_string(), AvroValue::String(name.to_string())),
            ])
        })
        .collect()
}

/// Encode records as an in-memory Avro container
pub fn write_avro(schema: &str, records: Vec<AvroValue>) -> Vec<u8> {
    let schema = apache_avro::Schema::parse_str(schema).unwrap();
    let mut writer = apache_avro::Writer::new(&schema, Vec::new());
    for record in records {
        writer.append(record).unwrap();
    }
    writer.into_inner().unwrap()
}
