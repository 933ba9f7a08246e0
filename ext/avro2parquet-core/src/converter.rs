//! Conversion orchestration
//!
//! A [`Converter`] runs one [`ConversionJob`] at a time through a fixed
//! sequence of steps:
//!
//! 1. check that the codec has an encoder
//! 2. load the schema
//! 3. open the Avro input
//! 4. delete an existing output file
//! 5. create the Parquet output
//! 6. copy every record from reader to writer
//! 7. close the writer, then the reader
//!
//! A failing step leaves the converter in [`ConversionState::Failed`] with
//! the kind of the error it returned. Open handles are released before the
//! error is handed back; a writer that never reached its footer leaves an
//! incomplete file behind unless [`ConvertOptions::remove_partial_output`]
//! is set.

use crate::{
    loader::{AVRO_SCHEMA_KEY, WRITER_MODEL_KEY, WRITER_MODEL_NAME},
    CompressionCodec, ConversionPaths, ConvertError, ErrorKind, RecordReader, RecordWriter,
    Result, SchemaDescriptor, WriterBuilder, WriterConfig,
};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Where a converter is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionState {
    #[default]
    Idle,
    SchemaLoaded,
    ReaderOpen,
    Writing,
    Closed,
    Failed(ErrorKind),
}

/// Settings shared by every job a converter runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Writer settings; the job's codec replaces `writer.codec`
    pub writer: WriterConfig,
    /// Delete an existing output file before writing; otherwise fail
    pub overwrite_existing: bool,
    /// Delete the output file this run created when the run fails
    pub remove_partial_output: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            writer: WriterConfig::default(),
            overwrite_existing: true,
            remove_partial_output: false,
        }
    }
}

/// The files and codec that fully determine one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub codec: CompressionCodec,
}

impl ConversionJob {
    pub fn new<S, I, O>(schema: S, input: I, output: O) -> Self
    where
        S: Into<PathBuf>,
        I: Into<PathBuf>,
        O: Into<PathBuf>,
    {
        Self {
            schema: schema.into(),
            input: input.into(),
            output: output.into(),
            codec: CompressionCodec::default(),
        }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }
}

impl From<ConversionPaths> for ConversionJob {
    fn from(paths: ConversionPaths) -> Self {
        ConversionJob::new(paths.schema, paths.input, paths.output)
    }
}

/// Outcome of a successful conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub records: usize,
    pub output: PathBuf,
    pub codec: CompressionCodec,
    /// An output file existed before the run and was deleted
    pub replaced_existing: bool,
}

/// Drives schema loading, reading and writing for a conversion job
#[derive(Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
    state: ConversionState,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self {
            options,
            state: ConversionState::Idle,
        }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// State reached by the most recent run
    pub fn state(&self) -> ConversionState {
        self.state
    }

    /// Convert one Avro file into a Parquet file
    pub fn run(&mut self, job: &ConversionJob) -> Result<ConversionSummary> {
        self.state = ConversionState::Idle;
        tracing::info!(
            schema = %job.schema.display(),
            input = %job.input.display(),
            output = %job.output.display(),
            codec = %job.codec,
            "starting conversion"
        );

        match self.execute(job) {
            Ok(summary) => {
                self.transition(ConversionState::Closed);
                tracing::info!(
                    records = summary.records,
                    output = %summary.output.display(),
                    replaced_existing = summary.replaced_existing,
                    "conversion finished"
                );
                Ok(summary)
            }
            Err(err) => {
                let kind = err.kind().unwrap_or(ErrorKind::Write);
                self.transition(ConversionState::Failed(kind));
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: ConversionState) {
        tracing::info!(from = ?self.state, to = ?next, "conversion state");
        self.state = next;
    }

    fn execute(&mut self, job: &ConversionJob) -> Result<ConversionSummary> {
        // Nothing on disk is touched for a codec without an encoder
        job.codec.to_parquet()?;

        let descriptor = SchemaDescriptor::load(&job.schema)?;
        self.transition(ConversionState::SchemaLoaded);

        let mut reader = RecordReader::open(&job.input, &descriptor)?;
        self.transition(ConversionState::ReaderOpen);

        let replaced_existing = match self.prepare_output(&job.output) {
            Ok(replaced) => replaced,
            Err(e) => {
                reader.close();
                return Err(e);
            }
        };

        let config = WriterConfig {
            codec: job.codec,
            ..self.options.writer.clone()
        };
        let mut writer = match descriptor.to_parquet().and_then(|schema| {
            WriterBuilder::from_config(config)
                .with_metadata(AVRO_SCHEMA_KEY, descriptor.text())
                .with_metadata(WRITER_MODEL_KEY, WRITER_MODEL_NAME)
                .create(&job.output, &schema)
        }) {
            Ok(writer) => writer,
            Err(e) => {
                reader.close();
                return Err(e);
            }
        };
        self.transition(ConversionState::Writing);

        let copied = copy_records(&mut reader, &mut writer).and_then(|records| {
            writer.close()?;
            Ok(records)
        });

        match copied {
            Ok(records) => {
                reader.close();
                Ok(ConversionSummary {
                    records,
                    output: job.output.clone(),
                    codec: job.codec,
                    replaced_existing,
                })
            }
            Err(e) => {
                writer.abandon();
                reader.close();
                if self.options.remove_partial_output {
                    remove_partial(&job.output);
                }
                Err(e)
            }
        }
    }

    /// Clear the output path before the writer creates it
    ///
    /// Returns whether a file was deleted.
    fn prepare_output(&self, output: &Path) -> Result<bool> {
        if std::fs::symlink_metadata(output).is_err() {
            return Ok(false);
        }

        if !self.options.overwrite_existing {
            return Err(ConvertError::write(format!(
                "Output file {} already exists",
                output.display()
            )));
        }

        match std::fs::remove_file(output) {
            Ok(()) => {
                tracing::debug!(output = %output.display(), "deleted existing output");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ConvertError::write(format!(
                "Failed to delete existing output file {}: {}",
                output.display(),
                e
            ))),
        }
    }
}

fn copy_records<R, W>(reader: &mut RecordReader<'_, R>, writer: &mut RecordWriter<W>) -> Result<usize>
where
    R: Read,
    W: Write + Send,
{
    for row in reader.by_ref() {
        writer.write_row(row?)?;
    }
    Ok(reader.records_read())
}

fn remove_partial(output: &Path) {
    match std::fs::remove_file(output) {
        Ok(()) => tracing::debug!(output = %output.display(), "removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            output = %output.display(),
            error = %e,
            "failed to remove partial output"
        ),
    }
}

/// Convert with the default codec and options
pub fn convert<S, I, O>(schema: S, input: I, output: O) -> Result<ConversionSummary>
where
    S: Into<PathBuf>,
    I: Into<PathBuf>,
    O: Into<PathBuf>,
{
    convert_with_codec(schema, input, output, CompressionCodec::default())
}

/// Convert with an explicit codec and default options
pub fn convert_with_codec<S, I, O>(
    schema: S,
    input: I,
    output: O,
    codec: CompressionCodec,
) -> Result<ConversionSummary>
where
    S: Into<PathBuf>,
    I: Into<PathBuf>,
    O: Into<PathBuf>,
{
    let job = ConversionJob::new(schema, input, output).with_codec(codec);
    Converter::default().run(&job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{user_records, write_avro, USER_SCHEMA};
    use tempfile::TempDir;

    fn user_job(dir: &TempDir) -> ConversionJob {
        let schema = dir.path().join("user.avsc");
        let input = dir.path().join("user.avro");
        std::fs::write(&schema, USER_SCHEMA).unwrap();
        std::fs::write(
            &input,
            write_avro(USER_SCHEMA, user_records(&[(1, "a"), (2, "b")])),
        )
        .unwrap();
        ConversionJob::new(schema, input, dir.path().join("user.parquet"))
    }

    #[test]
    fn test_successful_run_ends_closed() {
        let dir = tempfile::tempdir().unwrap();
        let job = user_job(&dir);

        let mut converter = Converter::default();
        assert_eq!(converter.state(), ConversionState::Idle);

        let summary = converter.run(&job).unwrap();
        assert_eq!(converter.state(), ConversionState::Closed);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.codec, CompressionCodec::Snappy);
        assert!(!summary.replaced_existing);
    }

    #[test]
    fn test_failed_run_records_kind() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = user_job(&dir);
        job.input = dir.path().join("missing.avro");

        let mut converter = Converter::default();
        let err = converter.run(&job).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Read));
        assert_eq!(converter.state(), ConversionState::Failed(ErrorKind::Read));
    }

    #[test]
    fn test_codec_checked_before_schema() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = user_job(&dir).with_codec(CompressionCodec::Lzo);
        job.schema = dir.path().join("missing.avsc");

        let mut converter = Converter::default();
        let err = converter.run(&job).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnsupportedCodec));
        assert_eq!(
            converter.state(),
            ConversionState::Failed(ErrorKind::UnsupportedCodec)
        );
    }

    #[test]
    fn test_no_overwrite_option() {
        let dir = tempfile::tempdir().unwrap();
        let job = user_job(&dir);
        std::fs::write(&job.output, b"existing").unwrap();

        let mut converter = Converter::new(ConvertOptions {
            overwrite_existing: false,
            ..ConvertOptions::default()
        });
        let err = converter.run(&job).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Write));
        assert_eq!(std::fs::read(&job.output).unwrap(), b"existing");
    }

    #[test]
    fn test_converter_is_reusable() {
        let dir = tempfile::tempdir().unwrap();
        let job = user_job(&dir);

        let mut converter = Converter::default();
        converter.run(&job).unwrap();
        let summary = converter.run(&job).unwrap();
        assert!(summary.replaced_existing);
        assert_eq!(converter.state(), ConversionState::Closed);
    }
}
