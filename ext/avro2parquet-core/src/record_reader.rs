//! Streaming Avro record reader

use crate::{avro::RecordMapping, ConvertError, ErrorContext, Result, Row, SchemaDescriptor, Stage};
use apache_avro::Reader as AvroReader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Forward-only sequence of rows decoded from an Avro container
///
/// Records are resolved against the supplied schema, so the file's own
/// writer schema only has to be readable as that schema. The underlying
/// handle is released on [`close`](RecordReader::close), at the end of the
/// sequence, or at the first error.
pub struct RecordReader<'s, R: Read = BufReader<File>> {
    reader: Option<AvroReader<'s, R>>,
    mapping: RecordMapping<'s>,
    records_read: usize,
}

impl<'s> RecordReader<'s, BufReader<File>> {
    /// Open an Avro container file
    pub fn open<P: AsRef<Path>>(path: P, schema: &'s SchemaDescriptor) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ConvertError::read(format!(
                "Failed to open input file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_reader(BufReader::new(file), schema)
            .with_context(Stage::Read, || format!("Failed to read {}", path.display()))
    }
}

impl<'s, R: Read> RecordReader<'s, R> {
    /// Read an Avro container from any source
    pub fn from_reader(source: R, schema: &'s SchemaDescriptor) -> Result<Self> {
        let mapping = RecordMapping::new(schema.avro()).context(Stage::Read, "Invalid schema")?;
        let reader = AvroReader::with_schema(schema.avro(), source)
            .context(Stage::Read, "Invalid Avro container")?;

        Ok(Self {
            reader: Some(reader),
            mapping,
            records_read: 0,
        })
    }

    /// Number of records yielded so far
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Release the input handle; later calls do nothing
    pub fn close(&mut self) {
        self.reader = None;
    }
}

impl<R: Read> Iterator for RecordReader<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        let next = match reader.next() {
            Some(next) => next,
            None => {
                self.close();
                return None;
            }
        };

        let record_number = self.records_read + 1;
        let row = next
            .map_err(ConvertError::from)
            .and_then(|value| self.mapping.to_row(value))
            .with_context(Stage::Read, || format!("Record {}", record_number));

        match row {
            Ok(row) => {
                self.records_read += 1;
                Some(Ok(row))
            }
            Err(e) => {
                self.close();
                Some(Err(e))
            }
        }
    }
}
