//! Avro to Parquet conversion
//!
//! `avro2parquet-core` turns an Avro object container file into a Parquet
//! file, given the Avro record schema the records should be read as. Avro
//! decoding is done by `apache-avro` and columnar encoding by the `parquet`
//! crate's Arrow writer; this crate wires the two together.
//!
//! # Key Components
//!
//! - **Schema Loader**: [`SchemaDescriptor`] parses an `.avsc` file once and
//!   keeps its text for the Parquet footer
//!
//! - **Record Reader**: [`RecordReader`] streams rows out of an Avro file,
//!   resolving every record against the loaded schema
//!
//! - **Record Writer**: [`RecordWriter`] validates and buffers rows and
//!   flushes them as Arrow record batches
//!   - Codec selection through [`CompressionCodec`], SNAPPY by default
//!   - Dynamic batch sizing based on sampled row sizes
//!
//! - **Orchestrator**: [`Converter`] runs a [`ConversionJob`] and records the
//!   state it reached; [`convert`] and [`convert_with_codec`] wrap it with
//!   default options
//!
//! - **Read-back**: [`Reader`] iterates the rows of a finished Parquet file
//!
//! # Example
//!
//! ```no_run
//! use avro2parquet_core::{resolve_paths, ConversionJob, Converter, ConvertOptions};
//!
//! let paths = resolve_paths(Some("users"), Some("users.avro"), None)?;
//! let mut converter = Converter::new(ConvertOptions::default());
//! let summary = converter.run(&ConversionJob::from(paths))?;
//! println!("wrote {} records", summary.records);
//! # Ok::<(), avro2parquet_core::ConvertError>(())
//! ```

pub mod arrow_conversion;
pub mod avro;
pub mod compression;
pub mod converter;
pub mod error;
pub mod loader;
pub mod paths;
pub mod reader;
pub mod record_reader;
pub mod schema;
pub mod value;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_utils;

pub use compression::CompressionCodec;
pub use converter::{
    convert, convert_with_codec, ConversionJob, ConversionState, ConversionSummary,
    ConvertOptions, Converter,
};
pub use error::{ConvertError, ErrorContext, ErrorKind, Result, Stage};
pub use loader::SchemaDescriptor;
pub use paths::{resolve_paths, ConversionPaths};
pub use reader::Reader;
pub use record_reader::RecordReader;
pub use schema::{PrimitiveType, Schema, SchemaNode};
pub use value::{Row, Value};
pub use writer::{RecordWriter, WriterBuilder, WriterConfig};
