use thiserror::Error;

/// Core error type for Avro to Parquet conversion
///
/// The first four variants are terminal kinds that a conversion surfaces to
/// its caller. The remaining variants come from the libraries and helpers the
/// pipeline is built on and are attributed to a stage through [`ErrorContext`].
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Missing, unreadable or malformed schema definition
    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    /// Missing, corrupt or truncated Avro input
    #[error("Read error: {0}")]
    Read(String),

    /// Output I/O failure, record/schema mismatch or output deletion failure
    #[error("Write error: {0}")]
    Write(String),

    /// Compression codec that the Parquet writer cannot produce
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// IO errors from file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow errors from record batch assembly
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Parquet format errors
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Avro decoding and schema errors
    #[error("Avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    /// Schema translation errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Value conversion errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Terminal classification of a failed conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaParse,
    Read,
    Write,
    UnsupportedCodec,
    InvalidArgument,
}

/// Pipeline stage an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SchemaLoad,
    Read,
    Write,
}

impl ConvertError {
    pub fn schema_parse<S: Into<String>>(msg: S) -> Self {
        ConvertError::SchemaParse(msg.into())
    }

    pub fn read<S: Into<String>>(msg: S) -> Self {
        ConvertError::Read(msg.into())
    }

    pub fn write<S: Into<String>>(msg: S) -> Self {
        ConvertError::Write(msg.into())
    }

    pub fn unsupported_codec<S: Into<String>>(msg: S) -> Self {
        ConvertError::UnsupportedCodec(msg.into())
    }

    /// Create a new schema translation error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        ConvertError::Schema(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        ConvertError::Conversion(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ConvertError::InvalidArgument(msg.into())
    }

    /// The terminal kind, if this error already carries one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ConvertError::SchemaParse(_) => Some(ErrorKind::SchemaParse),
            ConvertError::Read(_) => Some(ErrorKind::Read),
            ConvertError::Write(_) => Some(ErrorKind::Write),
            ConvertError::UnsupportedCodec(_) => Some(ErrorKind::UnsupportedCodec),
            ConvertError::InvalidArgument(_) => Some(ErrorKind::InvalidArgument),
            _ => None,
        }
    }

    /// Attribute this error to a stage, keeping an existing terminal kind
    pub fn at_stage<S: Into<String>>(self, stage: Stage, ctx: S) -> Self {
        if self.kind().is_some() {
            return self;
        }
        let msg = format!("{}: {}", ctx.into(), self);
        match stage {
            Stage::SchemaLoad => ConvertError::SchemaParse(msg),
            Stage::Read => ConvertError::Read(msg),
            Stage::Write => ConvertError::Write(msg),
        }
    }
}

/// Extension trait to attribute errors to a pipeline stage
pub trait ErrorContext<T> {
    /// Add stage and context to an error
    fn context<S: Into<String>>(self, stage: Stage, ctx: S) -> Result<T>;

    /// Add stage and context with a closure that's only called on error
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, stage: Stage, f: F) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ConvertError>,
{
    fn context<S: Into<String>>(self, stage: Stage, ctx: S) -> Result<T> {
        self.map_err(|e| e.into().at_stage(stage, ctx))
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, stage: Stage, f: F) -> Result<T> {
        self.map_err(|e| e.into().at_stage(stage, f()))
    }
}
