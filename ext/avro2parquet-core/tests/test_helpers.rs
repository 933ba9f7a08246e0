#![allow(dead_code)]

use apache_avro::types::Value as AvroValue;
use apache_avro::Codec;
use avro2parquet_core::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const USER_SCHEMA: &str = r#"{
    "type": "record",
    "name": "User",
    "namespace": "example",
    "fields": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "string"}
    ]
}"#;

/// Schema, input and output locations inside a private temp directory
pub struct Fixture {
    pub dir: TempDir,
    pub schema: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Fixture {
    pub fn job(&self) -> ConversionJob {
        ConversionJob::new(&self.schema, &self.input, &self.output)
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

/// Write a schema file and an uncompressed Avro file holding `records`
pub fn fixture(schema: &str, records: Vec<AvroValue>) -> Fixture {
    fixture_with_codec(schema, records, Codec::Null)
}

pub fn fixture_with_codec(schema: &str, records: Vec<AvroValue>, codec: Codec) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let schema_path = dir.path().join("records.avsc");
    let input = dir.path().join("records.avro");
    let output = dir.path().join("records.parquet");

    std::fs::write(&schema_path, schema).unwrap();
    write_avro_file(&input, schema, records, codec);

    Fixture {
        dir,
        schema: schema_path,
        input,
        output,
    }
}

/// Encode records into an Avro object container file
pub fn write_avro_file(path: &Path, schema: &str, records: Vec<AvroValue>, codec: Codec) {
    let schema = apache_avro::Schema::parse_str(schema).unwrap();
    let file = File::create(path).unwrap();
    let mut writer = apache_avro::Writer::with_codec(&schema, file, codec);
    for record in records {
        writer.append(record).unwrap();
    }
    writer.into_inner().unwrap();
}

pub fn user_record(id: i32, name: &str) -> AvroValue {
    AvroValue::Record(vec![
        ("id".to_string(), AvroValue::Int(id)),
        ("name".to_string(), AvroValue::String(name.to_string())),
    ])
}

/// Generate user records with sequential ids
pub fn generate_users(count: usize) -> Vec<AvroValue> {
    (0..count)
        .map(|i| user_record(i as i32, &format!("user_{}", i)))
        .collect()
}

/// Expected Parquet rows for [`generate_users`]
pub fn expected_users(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            vec![
                Value::Int32(i as i32),
                Value::from(format!("user_{}", i).as_str()),
            ]
        })
        .collect()
}

/// Read every row of a Parquet file
pub fn read_parquet(path: &Path) -> Vec<Row> {
    let file = File::open(path).unwrap();
    Reader::new(file)
        .read_rows()
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

/// Whether the file has a footer a Parquet reader accepts
pub fn is_valid_parquet(path: &Path) -> bool {
    match File::open(path) {
        Ok(file) => Reader::new(file).metadata().is_ok(),
        Err(_) => false,
    }
}

pub fn footer_value(path: &Path, key: &str) -> Option<String> {
    let file = File::open(path).unwrap();
    Reader::new(file).key_value(key).unwrap()
}
