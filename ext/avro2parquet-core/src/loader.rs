//! Schema loading
//!
//! A [`SchemaDescriptor`] is parsed once per conversion and shared by
//! reference with the record reader and the writer.

use crate::{avro::schema_from_avro, ConvertError, ErrorContext, Result, Schema, Stage};
use apache_avro::Schema as AvroSchema;
use std::path::Path;

/// Footer key holding the Avro schema text
pub const AVRO_SCHEMA_KEY: &str = "parquet.avro.schema";
/// Footer key naming the object model that produced the file
pub const WRITER_MODEL_KEY: &str = "writer.model.name";
pub const WRITER_MODEL_NAME: &str = "avro";

/// Parsed Avro record schema together with its source text
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    text: String,
    avro: AvroSchema,
}

impl SchemaDescriptor {
    /// Read and parse a schema definition file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).with_context(Stage::SchemaLoad, || {
            format!("Failed to read schema file {}", path.display())
        })?;
        Self::parse(text)
    }

    /// Parse schema definition text
    pub fn parse<S: Into<String>>(text: S) -> Result<Self> {
        let text = text.into();
        let avro = AvroSchema::parse_str(&text)
            .context(Stage::SchemaLoad, "Invalid Avro schema")?;

        match &avro {
            AvroSchema::Record(record) if record.fields.is_empty() => {
                Err(ConvertError::schema_parse(format!(
                    "Record '{}' declares no fields",
                    record.name.fullname(None)
                )))
            }
            AvroSchema::Record(_) => Ok(Self { text, avro }),
            other => Err(ConvertError::schema_parse(format!(
                "Top-level schema must be a record, got {}",
                schema_kind(other)
            ))),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn avro(&self) -> &AvroSchema {
        &self.avro
    }

    /// Fully qualified record name
    pub fn name(&self) -> String {
        match &self.avro {
            AvroSchema::Record(record) => record.name.fullname(None),
            _ => String::new(),
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        match &self.avro {
            AvroSchema::Record(record) => record.fields.iter().map(|f| f.name.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Translate to the Parquet-side schema
    pub fn to_parquet(&self) -> Result<Schema> {
        schema_from_avro(&self.avro).context(Stage::Write, "Cannot map schema to Parquet")
    }
}

fn schema_kind(schema: &AvroSchema) -> &'static str {
    match schema {
        AvroSchema::Null => "null",
        AvroSchema::Boolean => "boolean",
        AvroSchema::Int => "int",
        AvroSchema::Long => "long",
        AvroSchema::Float => "float",
        AvroSchema::Double => "double",
        AvroSchema::Bytes => "bytes",
        AvroSchema::String => "string",
        AvroSchema::Array(_) => "array",
        AvroSchema::Map(_) => "map",
        AvroSchema::Union(_) => "union",
        AvroSchema::Enum(_) => "enum",
        AvroSchema::Fixed(_) => "fixed",
        _ => "logical type",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    const USER_SCHEMA: &str = r#"{
        "type": "record",
        "name": "User",
        "namespace": "example",
        "fields": [
            {"name": "id", "type": "int"},
            {"name": "name", "type": "string"}
        ]
    }"#;

    #[test]
    fn test_parse_record() {
        let descriptor = SchemaDescriptor::parse(USER_SCHEMA).unwrap();
        assert_eq!(descriptor.name(), "example.User");
        assert_eq!(descriptor.field_names(), vec!["id", "name"]);
        assert_eq!(descriptor.text(), USER_SCHEMA);

        let schema = descriptor.to_parquet().unwrap();
        assert_eq!(schema.field_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_malformed_text() {
        let err = SchemaDescriptor::parse("{\"type\": \"record\"").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::SchemaParse));
    }

    #[test]
    fn test_non_record_root() {
        let err = SchemaDescriptor::parse("\"string\"").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::SchemaParse));
        assert!(err.to_string().contains("got string"));
    }

    #[test]
    fn test_empty_record() {
        let err =
            SchemaDescriptor::parse(r#"{"type": "record", "name": "Empty", "fields": []}"#)
                .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::SchemaParse));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchemaDescriptor::load(dir.path().join("absent.avsc")).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::SchemaParse));
        assert!(err.to_string().contains("absent.avsc"));
    }
}
