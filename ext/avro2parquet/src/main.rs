mod logger;

use std::fs::File;

use avro2parquet_core::{
    resolve_paths, CompressionCodec, ConversionJob, ConversionSummary, ConvertError,
    ConvertOptions, Converter, Reader, WriterConfig,
};
use clap::Parser;
use thiserror::Error;

use crate::logger::LogLevel;

#[cfg(target_os = "linux")]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("Verification failed: wrote {written} records but the output holds {found} rows")]
    Verify { written: usize, found: i64 },

    #[error("{0}")]
    Logger(String),
}

#[derive(Parser, Debug)]
#[clap(name = "avro2parquet")]
#[clap(version)]
#[clap(about = "Convert an Avro data file to Parquet", long_about = None)]
struct Cli {
    /// Avro schema file; `.avsc` is appended when missing.
    schema: Option<String>,

    /// Avro data file; `.avro` is appended when missing.
    input: Option<String>,

    /// Parquet output file; derived from the input when omitted.
    output: Option<String>,

    /// Parquet compression codec.
    #[clap(long, default_value = "snappy")]
    codec: String,

    /// Fail instead of replacing an existing output file.
    #[clap(long)]
    no_overwrite: bool,

    /// Delete the output file when the conversion fails.
    #[clap(long)]
    remove_partial: bool,

    /// Fixed number of rows per record batch.
    #[clap(long)]
    batch_size: Option<usize>,

    /// Read the output back and check its row count.
    #[clap(long)]
    verify: bool,

    /// Log verbosity.
    #[clap(long, value_enum, default_value_t = LogLevel::default(), ignore_case = true)]
    log_level: LogLevel,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(cli.log_level) {
        println!("ERROR: {e}");
        std::process::exit(1);
    }

    match run(cli) {
        Ok(summary) => {
            tracing::info!(
                records = summary.records,
                output = %summary.output.display(),
                "done"
            );
        }
        Err(e) => {
            println!("ERROR: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<ConversionSummary, CliError> {
    let codec: CompressionCodec = cli.codec.parse()?;
    let paths = resolve_paths(
        cli.schema.as_deref(),
        cli.input.as_deref(),
        cli.output.as_deref(),
    )?;

    let options = ConvertOptions {
        writer: WriterConfig {
            codec,
            batch_size: cli.batch_size,
            ..WriterConfig::default()
        },
        overwrite_existing: !cli.no_overwrite,
        remove_partial_output: cli.remove_partial,
    };

    let job = ConversionJob::from(paths).with_codec(codec);
    let summary = Converter::new(options).run(&job)?;

    if cli.verify {
        verify(&summary)?;
    }

    Ok(summary)
}

fn verify(summary: &ConversionSummary) -> Result<(), CliError> {
    let file = File::open(&summary.output).map_err(ConvertError::from)?;
    let found = Reader::new(file).num_rows()?;
    if found != summary.records as i64 {
        return Err(CliError::Verify {
            written: summary.records,
            found,
        });
    }
    tracing::debug!(rows = found, "output verified");
    Ok(())
}
