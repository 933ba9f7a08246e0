//! Compression codec selection for the Parquet writer

use crate::{ConvertError, Result};
use parquet::basic::{BrotliLevel, Compression, GzipLevel, ZstdLevel};
use std::fmt;
use std::str::FromStr;

/// Column chunk compression, named the way Parquet names its codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionCodec {
    Uncompressed,
    #[default]
    Snappy,
    Gzip,
    Lzo,
    Brotli,
    Lz4,
    Zstd,
    Lz4Raw,
}

impl CompressionCodec {
    pub const ALL: [CompressionCodec; 8] = [
        CompressionCodec::Uncompressed,
        CompressionCodec::Snappy,
        CompressionCodec::Gzip,
        CompressionCodec::Lzo,
        CompressionCodec::Brotli,
        CompressionCodec::Lz4,
        CompressionCodec::Zstd,
        CompressionCodec::Lz4Raw,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CompressionCodec::Uncompressed => "UNCOMPRESSED",
            CompressionCodec::Snappy => "SNAPPY",
            CompressionCodec::Gzip => "GZIP",
            CompressionCodec::Lzo => "LZO",
            CompressionCodec::Brotli => "BROTLI",
            CompressionCodec::Lz4 => "LZ4",
            CompressionCodec::Zstd => "ZSTD",
            CompressionCodec::Lz4Raw => "LZ4_RAW",
        }
    }

    /// Whether the Parquet writer can produce this codec
    pub fn is_supported(&self) -> bool {
        !matches!(self, CompressionCodec::Lzo)
    }

    /// Map to the parquet writer setting, failing for codecs without an encoder
    pub fn to_parquet(self) -> Result<Compression> {
        Ok(match self {
            CompressionCodec::Uncompressed => Compression::UNCOMPRESSED,
            CompressionCodec::Snappy => Compression::SNAPPY,
            CompressionCodec::Gzip => Compression::GZIP(GzipLevel::default()),
            CompressionCodec::Brotli => Compression::BROTLI(BrotliLevel::default()),
            CompressionCodec::Lz4 => Compression::LZ4,
            CompressionCodec::Zstd => Compression::ZSTD(ZstdLevel::default()),
            CompressionCodec::Lz4Raw => Compression::LZ4_RAW,
            CompressionCodec::Lzo => {
                return Err(ConvertError::unsupported_codec(format!(
                    "{} has no Parquet encoder available",
                    self
                )))
            }
        })
    }
}

impl fmt::Display for CompressionCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompressionCodec {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "none" | "uncompressed" => CompressionCodec::Uncompressed,
            "snappy" => CompressionCodec::Snappy,
            "gzip" => CompressionCodec::Gzip,
            "lzo" => CompressionCodec::Lzo,
            "brotli" => CompressionCodec::Brotli,
            "lz4" => CompressionCodec::Lz4,
            "zstd" => CompressionCodec::Zstd,
            "lz4_raw" | "lz4-raw" => CompressionCodec::Lz4Raw,
            _ => {
                return Err(ConvertError::unsupported_codec(format!(
                    "Unknown compression codec '{}'",
                    s
                )))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_default_is_snappy() {
        assert_eq!(CompressionCodec::default(), CompressionCodec::Snappy);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(
            "SNAPPY".parse::<CompressionCodec>().unwrap(),
            CompressionCodec::Snappy
        );
        assert_eq!(
            "none".parse::<CompressionCodec>().unwrap(),
            CompressionCodec::Uncompressed
        );
        assert_eq!(
            "Lz4_Raw".parse::<CompressionCodec>().unwrap(),
            CompressionCodec::Lz4Raw
        );
        for codec in CompressionCodec::ALL {
            assert_eq!(codec.name().parse::<CompressionCodec>().unwrap(), codec);
        }
    }

    #[test]
    fn test_unknown_name_is_unsupported() {
        let err = "bzip2".parse::<CompressionCodec>().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnsupportedCodec));
    }

    #[test]
    fn test_lzo_has_no_encoder() {
        assert!(!CompressionCodec::Lzo.is_supported());
        let err = CompressionCodec::Lzo.to_parquet().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnsupportedCodec));

        assert_eq!(
            CompressionCodec::Snappy.to_parquet().unwrap(),
            Compression::SNAPPY
        );
    }
}
