//! Parquet record writer
//!
//! Rows are validated against the translated schema, buffered, and flushed to
//! an `ArrowWriter` as record batches. Unless a fixed batch size is
//! configured, the batch size follows the sampled row size so that a batch
//! stays near the memory threshold.

use crate::{
    arrow_conversion::values_to_arrow_array, CompressionCodec, ConvertError, ErrorContext,
    PrimitiveType, Result, Row, Schema, SchemaNode, Stage, Value,
};
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, TimeUnit};
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;
use rand::Rng;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

// Default configuration constants
const DEFAULT_BATCH_SIZE: usize = 1000;
const DEFAULT_MEMORY_THRESHOLD: usize = 100 * 1024 * 1024; // 100MB
const DEFAULT_SAMPLE_SIZE: usize = 100;
const MIN_BATCH_SIZE: usize = 10;
const MIN_SAMPLES_FOR_ESTIMATE: usize = 10;

/// Writer settings that a conversion passes through unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub codec: CompressionCodec,
    /// Fixed number of rows per batch; `None` enables dynamic sizing
    pub batch_size: Option<usize>,
    pub memory_threshold: usize,
    pub sample_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            batch_size: None,
            memory_threshold: DEFAULT_MEMORY_THRESHOLD,
            sample_size: DEFAULT_SAMPLE_SIZE,
        }
    }
}

/// Builder for creating a configured [`RecordWriter`]
#[derive(Debug, Clone, Default)]
pub struct WriterBuilder {
    config: WriterConfig,
    metadata: Vec<(String, String)>,
}

impl WriterBuilder {
    /// Create a new WriterBuilder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: WriterConfig) -> Self {
        Self {
            config,
            metadata: Vec::new(),
        }
    }

    /// Set the compression codec
    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.config.codec = codec;
        self
    }

    /// Set a fixed batch size (disables dynamic sizing)
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = Some(size);
        self
    }

    /// Set the memory threshold for flushing
    pub fn with_memory_threshold(mut self, threshold: usize) -> Self {
        self.config.memory_threshold = threshold;
        self
    }

    /// Set the sample size for row size estimation
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.config.sample_size = size;
        self
    }

    /// Add a key/value pair to the Parquet footer
    pub fn with_metadata<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Build a writer over any sink
    pub fn build<W: Write + Send>(self, writer: W, schema: &Schema) -> Result<RecordWriter<W>> {
        let compression = self.config.codec.to_parquet()?;
        let arrow_schema =
            schema_to_arrow(schema).context(Stage::Write, "Failed to translate schema")?;

        let key_value_metadata = self
            .metadata
            .into_iter()
            .map(|(key, value)| KeyValue::new(key, value))
            .collect::<Vec<_>>();

        let props = WriterProperties::builder()
            .set_compression(compression)
            .set_key_value_metadata(Some(key_value_metadata))
            .build();

        let arrow_writer = ArrowWriter::try_new(writer, arrow_schema.clone(), Some(props))
            .context(Stage::Write, "Failed to open Parquet writer")?;

        let sample_size = self.config.sample_size;
        Ok(RecordWriter {
            arrow_writer: Some(arrow_writer),
            finished: None,
            arrow_schema,
            buffered_rows: Vec::new(),
            current_batch_size: self.config.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            memory_threshold: self.config.memory_threshold,
            sample_size,
            size_samples: Vec::with_capacity(sample_size),
            rows_seen: 0,
            rows_written: 0,
            fixed_batch_size: self.config.batch_size,
        })
    }

    /// Create a new file at `path` and build a writer over it
    ///
    /// The file must not exist yet.
    pub fn create<P: AsRef<Path>>(self, path: P, schema: &Schema) -> Result<RecordWriter<File>> {
        let path = path.as_ref();
        // Resolve the codec before the file exists
        self.config.codec.to_parquet()?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => ConvertError::write(format!(
                    "Output file {} already exists",
                    path.display()
                )),
                _ => ConvertError::write(format!(
                    "Failed to create output file {}: {}",
                    path.display(),
                    e
                )),
            })?;

        self.build(file, schema)
    }
}

/// Buffered Parquet writer over any `Write + Send` sink
pub struct RecordWriter<W: Write + Send> {
    arrow_writer: Option<ArrowWriter<W>>,
    finished: Option<W>,
    arrow_schema: Arc<arrow_schema::Schema>,
    buffered_rows: Vec<Row>,
    current_batch_size: usize,
    memory_threshold: usize,
    sample_size: usize,
    size_samples: Vec<usize>,
    rows_seen: usize,
    rows_written: usize,
    fixed_batch_size: Option<usize>,
}

impl<W> RecordWriter<W>
where
    W: Write + Send,
{
    /// Create a new writer with default settings
    pub fn new(writer: W, schema: &Schema) -> Result<Self> {
        WriterBuilder::new().build(writer, schema)
    }

    /// Number of rows accepted so far, buffered or flushed
    pub fn rows_written(&self) -> usize {
        self.rows_written + self.buffered_rows.len()
    }

    pub fn is_closed(&self) -> bool {
        self.arrow_writer.is_none()
    }

    /// Write a single row
    ///
    /// Rows are buffered internally and written in batches to bound memory usage
    pub fn write_row(&mut self, row: Row) -> Result<()> {
        if self.arrow_writer.is_none() {
            return Err(ConvertError::write("Writer has been closed"));
        }

        let num_cols = self.arrow_schema.fields().len();
        if row.len() != num_cols {
            return Err(ConvertError::write(format!(
                "Row has {} values but schema has {} fields",
                row.len(),
                num_cols
            )));
        }

        for (value, field) in row.iter().zip(self.arrow_schema.fields()) {
            validate_value_against_field(value, field, field.name())?;
        }

        if self.fixed_batch_size.is_none() {
            self.sample_row_size(&row);
        }
        self.rows_seen += 1;

        self.buffered_rows.push(row);

        if self.buffered_rows.len() >= self.current_batch_size {
            self.flush_buffered_rows()?;
        }

        Ok(())
    }

    /// Write a batch of rows
    pub fn write_rows(&mut self, rows: Vec<Row>) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Sample row size for dynamic batch sizing using reservoir sampling
    fn sample_row_size(&mut self, row: &[Value]) {
        let row_size = self.estimate_row_size(row);

        if self.size_samples.len() < self.sample_size {
            self.size_samples.push(row_size);
        } else {
            let mut rng = rand::rng();
            let idx = rng.random_range(0..=self.rows_seen);
            if idx < self.sample_size {
                self.size_samples[idx] = row_size;
            }
        }

        if self.size_samples.len() >= MIN_SAMPLES_FOR_ESTIMATE {
            self.update_batch_size();
        }
    }

    /// Estimate the memory size of a single row
    fn estimate_row_size(&self, row: &[Value]) -> usize {
        row.iter()
            .zip(self.arrow_schema.fields())
            .map(|(value, field)| estimate_value_size(value, field.data_type()))
            .sum()
    }

    /// Update dynamic batch size based on current samples
    fn update_batch_size(&mut self) {
        if self.size_samples.is_empty() {
            return;
        }

        let total_size: usize = self.size_samples.iter().sum();
        let avg_row_size = (total_size as f64 / self.size_samples.len() as f64).max(1.0);
        let suggested_batch_size = (self.memory_threshold as f64 / avg_row_size).floor() as usize;
        self.current_batch_size = suggested_batch_size.max(MIN_BATCH_SIZE);
    }

    /// Flush buffered rows as one record batch
    fn flush_buffered_rows(&mut self) -> Result<()> {
        if self.buffered_rows.is_empty() {
            return Ok(());
        }

        let writer = self
            .arrow_writer
            .as_mut()
            .ok_or_else(|| ConvertError::write("Writer has been closed"))?;

        let rows = std::mem::take(&mut self.buffered_rows);
        let num_rows = rows.len();

        // Transpose rows to columns
        let num_cols = self.arrow_schema.fields().len();
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(num_rows); num_cols];
        for row in rows {
            for (col_idx, value) in row.into_iter().enumerate() {
                columns[col_idx].push(value);
            }
        }

        let arrow_columns = columns
            .into_iter()
            .zip(self.arrow_schema.fields())
            .map(|(values, field)| values_to_arrow_array(values, field))
            .collect::<Result<Vec<_>>>()
            .context(Stage::Write, "Failed to build record batch")?;

        let batch = RecordBatch::try_new(self.arrow_schema.clone(), arrow_columns)
            .context(Stage::Write, "Failed to build record batch")?;

        writer
            .write(&batch)
            .context(Stage::Write, "Failed to write record batch")?;
        self.rows_written += num_rows;

        tracing::debug!(
            rows = num_rows,
            total = self.rows_written,
            batch_size = self.current_batch_size,
            "flushed record batch"
        );

        if writer.in_progress_size() >= self.memory_threshold {
            writer
                .flush()
                .context(Stage::Write, "Failed to flush row group")?;
        }

        Ok(())
    }

    /// Flush remaining rows and write the file footer
    ///
    /// Closing an already closed writer does nothing.
    pub fn close(&mut self) -> Result<()> {
        if self.arrow_writer.is_none() {
            return Ok(());
        }

        let flushed = self.flush_buffered_rows();
        // The handle is released whether or not the final flush succeeded
        let writer = match self.arrow_writer.take() {
            Some(writer) => writer,
            None => return flushed,
        };
        if let Err(e) = flushed {
            drop(writer);
            return Err(e);
        }

        let inner = writer
            .into_inner()
            .context(Stage::Write, "Failed to write Parquet footer")?;
        self.finished = Some(inner);
        Ok(())
    }

    /// Release the sink without writing a footer
    ///
    /// Whatever was written stays behind as an incomplete file that Parquet
    /// readers reject.
    pub fn abandon(&mut self) {
        self.buffered_rows.clear();
        if let Some(writer) = self.arrow_writer.take() {
            drop(writer);
        }
    }

    /// Close the writer and hand back the sink
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        self.finished
            .take()
            .ok_or_else(|| ConvertError::write("Writer was abandoned before closing"))
    }
}

/// Estimate the memory footprint of a single value
fn estimate_value_size(value: &Value, data_type: &DataType) -> usize {
    match (value, data_type) {
        (Value::Null, _) => 0,

        // Fixed size types
        (Value::Boolean(_), DataType::Boolean) => 1,
        (Value::Int32(_), DataType::Int32) => 4,
        (Value::Float32(_), DataType::Float32) => 4,
        (Value::Int64(_), DataType::Int64) => 8,
        (Value::Float64(_), DataType::Float64) => 8,
        (Value::Date32(_), DataType::Date32) => 4,
        (Value::TimeMillis(_), DataType::Time32(_)) => 4,
        (Value::TimeMicros(_), DataType::Time64(_)) => 8,
        (Value::TimestampMillis(_, _), DataType::Timestamp(_, _)) => 8,
        (Value::TimestampMicros(_, _), DataType::Timestamp(_, _)) => 8,
        (Value::TimestampNanos(_, _), DataType::Timestamp(_, _)) => 8,
        (Value::Decimal128(_, _), DataType::Decimal128(_, _)) => 16,
        (Value::Decimal256(_, _), DataType::Decimal256(_, _)) => 32,

        // Variable size types
        (Value::String(s), DataType::Utf8) => s.len() + std::mem::size_of::<usize>() * 3,
        (Value::Bytes(b), DataType::Binary) => b.len() + std::mem::size_of::<usize>() * 3,
        (Value::Bytes(_), DataType::FixedSizeBinary(len)) => *len as usize,

        // Complex types
        (Value::List(items), DataType::List(field)) => {
            let base_size = std::mem::size_of::<usize>() * 3;
            if items.is_empty() {
                base_size
            } else {
                // Sample up to 5 elements
                let sample_count = items.len().min(5);
                let sample_size: usize = items
                    .iter()
                    .take(sample_count)
                    .map(|item| estimate_value_size(item, field.data_type()))
                    .sum();
                base_size + (sample_size / sample_count) * items.len()
            }
        }

        (Value::Map(entries), DataType::Map(entries_field, _)) => match entries_field.data_type()
        {
            DataType::Struct(fields) if fields.len() == 2 => {
                let base_size = std::mem::size_of::<usize>() * 4;
                if entries.is_empty() {
                    base_size
                } else {
                    let sample_count = entries.len().min(5);
                    let sample_size: usize = entries
                        .iter()
                        .take(sample_count)
                        .map(|(key, val)| {
                            estimate_value_size(key, fields[0].data_type())
                                + estimate_value_size(val, fields[1].data_type())
                        })
                        .sum();
                    base_size + (sample_size / sample_count) * entries.len()
                }
            }
            _ => 100,
        },

        (Value::Record(fields), DataType::Struct(schema_fields)) => {
            let base_size = std::mem::size_of::<usize>() * 3;
            let field_sizes: usize = schema_fields
                .iter()
                .filter_map(|field| {
                    fields
                        .get(field.name().as_str())
                        .map(|val| estimate_value_size(val, field.data_type()))
                })
                .sum();
            base_size + field_sizes
        }

        _ => 100,
    }
}

/// Validate a value against its column before it is buffered
fn validate_value_against_field(value: &Value, field: &Field, path: &str) -> Result<()> {
    if value.is_null() {
        if !field.is_nullable() {
            return Err(ConvertError::write(format!(
                "Found null value for non-nullable field at {}",
                path
            )));
        }
        return Ok(());
    }

    match (value, field.data_type()) {
        (Value::Boolean(_), DataType::Boolean)
        | (Value::Int32(_), DataType::Int32)
        | (Value::Int64(_), DataType::Int64)
        | (Value::Float32(_), DataType::Float32)
        | (Value::Float64(_), DataType::Float64)
        | (Value::String(_), DataType::Utf8)
        | (Value::Bytes(_), DataType::Binary)
        | (Value::Date32(_), DataType::Date32)
        | (Value::TimeMillis(_), DataType::Time32(TimeUnit::Millisecond))
        | (Value::TimeMicros(_), DataType::Time64(TimeUnit::Microsecond))
        | (Value::TimestampMillis(_, _), DataType::Timestamp(TimeUnit::Millisecond, _))
        | (Value::TimestampMicros(_, _), DataType::Timestamp(TimeUnit::Microsecond, _))
        | (Value::TimestampNanos(_, _), DataType::Timestamp(TimeUnit::Nanosecond, _))
        | (Value::Decimal128(_, _), DataType::Decimal128(_, _))
        | (Value::Decimal256(_, _), DataType::Decimal256(_, _)) => Ok(()),

        (Value::Bytes(b), DataType::FixedSizeBinary(size)) => {
            if b.len() == *size as usize {
                Ok(())
            } else {
                Err(ConvertError::write(format!(
                    "Fixed value at {} has {} bytes, expected {}",
                    path,
                    b.len(),
                    size
                )))
            }
        }

        (Value::List(items), DataType::List(item_field)) => {
            for (idx, item) in items.iter().enumerate() {
                validate_value_against_field(item, item_field, &format!("{}[{}]", path, idx))?;
            }
            Ok(())
        }

        (Value::Map(entries), DataType::Map(entries_field, _)) => {
            if let DataType::Struct(fields) = entries_field.data_type() {
                if fields.len() == 2 {
                    for (idx, (key, val)) in entries.iter().enumerate() {
                        validate_value_against_field(
                            key,
                            &fields[0],
                            &format!("{}.key[{}]", path, idx),
                        )?;
                        validate_value_against_field(
                            val,
                            &fields[1],
                            &format!("{}.value[{}]", path, idx),
                        )?;
                    }
                }
            }
            Ok(())
        }

        (Value::Record(record_fields), DataType::Struct(schema_fields)) => {
            for field in schema_fields {
                let field_name = field.name();
                match record_fields.get(field_name.as_str()) {
                    Some(value) => validate_value_against_field(
                        value,
                        field,
                        &format!("{}.{}", path, field_name),
                    )?,
                    None if !field.is_nullable() => {
                        return Err(ConvertError::write(format!(
                            "Required field '{}' is missing in struct at {}",
                            field_name, path
                        )))
                    }
                    None => {}
                }
            }
            Ok(())
        }

        (value, expected_type) => Err(ConvertError::write(format!(
            "Type mismatch at {}: expected {:?}, got {}",
            path,
            expected_type,
            value.type_name()
        ))),
    }
}

/// Convert the translated schema to an Arrow schema
pub fn schema_to_arrow(schema: &Schema) -> Result<Arc<arrow_schema::Schema>> {
    match &schema.root {
        SchemaNode::Struct { fields, .. } => {
            if fields.is_empty() {
                return Err(ConvertError::schema("Schema has no fields"));
            }
            let arrow_fields = fields
                .iter()
                .map(schema_node_to_arrow_field)
                .collect::<Result<Vec<_>>>()?;

            Ok(Arc::new(arrow_schema::Schema::new(arrow_fields)))
        }
        _ => Err(ConvertError::schema("Root schema node must be a struct")),
    }
}

/// Convert a SchemaNode to an Arrow Field
fn schema_node_to_arrow_field(node: &SchemaNode) -> Result<Field> {
    match node {
        SchemaNode::Primitive {
            name,
            primitive_type,
            nullable,
        } => Ok(Field::new(
            name,
            primitive_type_to_arrow(primitive_type),
            *nullable,
        )),
        SchemaNode::List {
            name,
            item,
            nullable,
        } => {
            let item_field = schema_node_to_arrow_field(item)?;
            Ok(Field::new(
                name,
                DataType::List(Arc::new(item_field)),
                *nullable,
            ))
        }
        SchemaNode::Map {
            name,
            key,
            value,
            nullable,
        } => {
            let key_field = schema_node_to_arrow_field(key)?.with_nullable(false);
            let value_field = schema_node_to_arrow_field(value)?;

            let map_type = DataType::Map(
                Arc::new(Field::new(
                    "entries",
                    DataType::Struct(vec![key_field, value_field].into()),
                    false,
                )),
                false, // keys_sorted
            );

            Ok(Field::new(name, map_type, *nullable))
        }
        SchemaNode::Struct {
            name,
            fields,
            nullable,
        } => {
            let struct_fields = fields
                .iter()
                .map(schema_node_to_arrow_field)
                .collect::<Result<Vec<_>>>()?;

            Ok(Field::new(
                name,
                DataType::Struct(struct_fields.into()),
                *nullable,
            ))
        }
    }
}

/// Convert PrimitiveType to Arrow DataType
fn primitive_type_to_arrow(ptype: &PrimitiveType) -> DataType {
    match ptype {
        PrimitiveType::Boolean => DataType::Boolean,
        PrimitiveType::Int32 => DataType::Int32,
        PrimitiveType::Int64 => DataType::Int64,
        PrimitiveType::Float32 => DataType::Float32,
        PrimitiveType::Float64 => DataType::Float64,
        PrimitiveType::String => DataType::Utf8,
        PrimitiveType::Binary => DataType::Binary,
        PrimitiveType::Date32 => DataType::Date32,
        PrimitiveType::TimeMillis => DataType::Time32(TimeUnit::Millisecond),
        PrimitiveType::TimeMicros => DataType::Time64(TimeUnit::Microsecond),
        PrimitiveType::TimestampMillis(tz) => DataType::Timestamp(TimeUnit::Millisecond, tz.clone()),
        PrimitiveType::TimestampMicros(tz) => DataType::Timestamp(TimeUnit::Microsecond, tz.clone()),
        PrimitiveType::TimestampNanos(tz) => DataType::Timestamp(TimeUnit::Nanosecond, tz.clone()),
        PrimitiveType::Decimal128(precision, scale) => DataType::Decimal128(*precision, *scale),
        PrimitiveType::Decimal256(precision, scale) => DataType::Decimal256(*precision, *scale),
        PrimitiveType::FixedLenByteArray(len) => DataType::FixedSizeBinary(*len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::id_name_schema;
    use crate::{ErrorKind, Reader};
    use bytes::Bytes;

    #[test]
    fn test_writer_builder() {
        let builder = WriterBuilder::new()
            .with_codec(CompressionCodec::Zstd)
            .with_batch_size(500)
            .with_memory_threshold(50 * 1024 * 1024)
            .with_sample_size(50);

        assert_eq!(builder.config().codec, CompressionCodec::Zstd);
        assert_eq!(builder.config().batch_size, Some(500));

        let _writer = builder.build(Vec::new(), &id_name_schema()).unwrap();
    }

    #[test]
    fn test_default_codec_is_snappy() {
        assert_eq!(WriterConfig::default().codec, CompressionCodec::Snappy);
    }

    #[test]
    fn test_lzo_rejected_at_build() {
        let err = WriterBuilder::new()
            .with_codec(CompressionCodec::Lzo)
            .build(Vec::new(), &id_name_schema())
            .err()
            .unwrap();
        assert_eq!(err.kind(), Some(ErrorKind::UnsupportedCodec));
    }

    #[test]
    fn test_buffered_writing() {
        let mut writer = WriterBuilder::new()
            .with_batch_size(10)
            .build(Vec::new(), &id_name_schema())
            .unwrap();

        // 25 rows with batch size 10 flush twice before close
        for i in 0..25 {
            writer
                .write_row(vec![
                    Value::Int32(i),
                    Value::String(Arc::from(format!("row_{}", i))),
                ])
                .unwrap();
        }
        assert_eq!(writer.rows_written(), 25);

        let bytes = Bytes::from(writer.into_inner().unwrap());
        let reader = Reader::new(bytes);
        assert_eq!(reader.num_rows().unwrap(), 25);
    }

    #[test]
    fn test_footer_metadata() {
        let mut writer = WriterBuilder::new()
            .with_metadata("writer.model.name", "avro")
            .build(Vec::new(), &id_name_schema())
            .unwrap();
        writer
            .write_row(vec![Value::Int32(1), Value::from("a")])
            .unwrap();

        let bytes = Bytes::from(writer.into_inner().unwrap());
        let reader = Reader::new(bytes);
        assert_eq!(
            reader.key_value("writer.model.name").unwrap(),
            Some("avro".to_string())
        );
    }

    #[test]
    fn test_row_validation() {
        let mut writer = RecordWriter::new(Vec::new(), &id_name_schema()).unwrap();

        let err = writer.write_row(vec![Value::Int32(1)]).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Write));

        let err = writer
            .write_row(vec![Value::Null, Value::from("a")])
            .unwrap_err();
        assert!(err.to_string().contains("non-nullable"));

        let err = writer
            .write_row(vec![Value::from("1"), Value::from("a")])
            .unwrap_err();
        assert!(err.to_string().contains("Type mismatch at id"));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut writer = RecordWriter::new(Vec::new(), &id_name_schema()).unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());

        let err = writer
            .write_row(vec![Value::Int32(1), Value::from("a")])
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Write));
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");
        std::fs::write(&path, b"keep").unwrap();

        let err = WriterBuilder::new()
            .create(&path, &id_name_schema())
            .err()
            .unwrap();
        assert_eq!(err.kind(), Some(ErrorKind::Write));
        assert_eq!(std::fs::read(&path).unwrap(), b"keep");
    }

    #[test]
    fn test_abandon_leaves_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.parquet");

        let mut writer = WriterBuilder::new()
            .create(&path, &id_name_schema())
            .unwrap();
        writer
            .write_row(vec![Value::Int32(1), Value::from("a")])
            .unwrap();
        writer.abandon();
        assert!(writer.is_closed());

        let file = File::open(&path).unwrap();
        assert!(Reader::new(file).metadata().is_err());
    }

    #[test]
    fn test_row_size_estimation() {
        let writer = RecordWriter::new(Vec::new(), &id_name_schema()).unwrap();

        let row = vec![Value::Int32(12345), Value::from("Hello, World!")];
        let size = writer.estimate_row_size(&row);

        // Int32 = 4 bytes, String = 13 chars + overhead
        assert!(size >= 4 + 13);
    }
}
