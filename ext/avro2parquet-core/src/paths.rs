//! Filename inference for a conversion job

use crate::{ConvertError, Result};
use std::path::PathBuf;

pub const SCHEMA_EXTENSION: &str = ".avsc";
pub const INPUT_EXTENSION: &str = ".avro";
pub const OUTPUT_EXTENSION: &str = ".parquet";

/// Fully resolved file names of one conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPaths {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Complete the three file names of a conversion
///
/// Appends missing extensions and derives the output name from the input
/// when none is given. Only the strings are inspected; nothing is read
/// from disk.
pub fn resolve_paths(
    schema: Option<&str>,
    input: Option<&str>,
    output: Option<&str>,
) -> Result<ConversionPaths> {
    let schema = non_empty(schema)
        .ok_or_else(|| ConvertError::invalid_argument("A schema path is required"))?;
    let input = non_empty(input)
        .ok_or_else(|| ConvertError::invalid_argument("An input path is required"))?;

    let schema = with_extension(schema, SCHEMA_EXTENSION);
    let output = non_empty(output).map(|output| with_extension(output, OUTPUT_EXTENSION));

    let (input, output) = match input.rfind(INPUT_EXTENSION) {
        Some(index) if input.ends_with(INPUT_EXTENSION) => {
            let output =
                output.unwrap_or_else(|| format!("{}{}", &input[..index], OUTPUT_EXTENSION));
            (input.to_string(), output)
        }
        _ => {
            let output = output.unwrap_or_else(|| format!("{}{}", input, OUTPUT_EXTENSION));
            (format!("{}{}", input, INPUT_EXTENSION), output)
        }
    };

    Ok(ConversionPaths {
        schema: PathBuf::from(schema),
        input: PathBuf::from(input),
        output: PathBuf::from(output),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn with_extension(name: &str, extension: &str) -> String {
    if name.ends_with(extension) {
        name.to_string()
    } else {
        format!("{}{}", name, extension)
    }
}
