//! Parquet read-back for verifying converted files

use crate::{arrow_conversion::arrow_to_value, Result, Row};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use parquet::file::metadata::{ParquetMetaData, ParquetMetaDataReader};
use parquet::file::reader::ChunkReader;

/// Parquet reader over any chunked source (files, in-memory bytes)
pub struct Reader<R> {
    inner: R,
}

impl<R> Reader<R>
where
    R: ChunkReader + 'static,
{
    /// Create a new reader
    pub fn new(reader: R) -> Self {
        Self { inner: reader }
    }

    /// Parse the file footer
    pub fn metadata(&self) -> Result<ParquetMetaData> {
        Ok(ParquetMetaDataReader::new().parse_and_finish(&self.inner)?)
    }

    /// Total number of rows recorded in the footer
    pub fn num_rows(&self) -> Result<i64> {
        Ok(self.metadata()?.file_metadata().num_rows())
    }

    /// Look up a key in the footer's key/value metadata
    pub fn key_value(&self, key: &str) -> Result<Option<String>> {
        let metadata = self.metadata()?;
        Ok(metadata
            .file_metadata()
            .key_value_metadata()
            .and_then(|entries| entries.iter().find(|kv| kv.key == key))
            .and_then(|kv| kv.value.clone()))
    }

    /// Read rows from the Parquet file
    ///
    /// Returns an iterator over rows where each row holds one value per column
    pub fn read_rows(self) -> Result<RowIterator> {
        let builder = ParquetRecordBatchReaderBuilder::try_new(self.inner)?;
        let reader = builder.build()?;

        Ok(RowIterator {
            batch_reader: reader,
            current_batch: None,
            current_row: 0,
        })
    }
}

/// Iterator over rows in a Parquet file
pub struct RowIterator {
    batch_reader: ParquetRecordBatchReader,
    current_batch: Option<RecordBatch>,
    current_row: usize,
}

impl Iterator for RowIterator {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(ref batch) = self.current_batch {
                if self.current_row < batch.num_rows() {
                    let mut row_values = Vec::with_capacity(batch.num_columns());

                    for column in batch.columns() {
                        match arrow_to_value(column.as_ref(), self.current_row) {
                            Ok(v) => row_values.push(v),
                            Err(e) => return Some(Err(e)),
                        }
                    }

                    self.current_row += 1;
                    return Some(Ok(row_values));
                }
            }

            // Need to fetch next batch
            match self.batch_reader.next() {
                Some(Ok(batch)) => {
                    self.current_batch = Some(batch);
                    self.current_row = 0;
                }
                Some(Err(e)) => return Some(Err(e.into())),
                None => return None,
            }
        }
    }
}
