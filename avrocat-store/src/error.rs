//! Error types for the avrocat core

use thiserror::Error;

/// avrocat error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data store directory holds no eligible container files.
    #[error("data store '{path}' is empty or not valid: no eligible files")]
    EmptyDataStore {
        /// Data store directory path.
        path: String,
    },
    /// The explicitly supplied schema file cannot be parsed.
    #[error("supplied schema '{path}' cannot be parsed: {source}")]
    Schema {
        /// Schema file path.
        path: String,
        /// Parse failure reported by the codec.
        source: apache_avro::Error,
    },
    /// Decoding a record failed, either through schema resolution or
    /// corrupt data.
    #[error(
        "decoding record with index {global_index} failed; the record comes from \
         '{path}' where it has local index {local_index}: {source}"
    )]
    RecordDecode {
        /// Zero-based index within the whole logical stream.
        global_index: u64,
        /// Container file the record comes from.
        path: String,
        /// Zero-based index within that file.
        local_index: u64,
        /// Decode failure reported by the codec.
        source: apache_avro::Error,
    },
    /// A dotted field path did not resolve inside a record.
    #[error("field not found in record: '{path}'")]
    FieldNotFound {
        /// The full dotted path that was requested.
        path: String,
    },
    /// An output path already exists where overwriting is disallowed.
    #[error(
        "output path '{path}' already exists{}",
        .name_field.as_deref().map(|f| format!(" (name derived from field '{f}')")).unwrap_or_default()
    )]
    DuplicateOutput {
        /// The colliding output path.
        path: String,
        /// Name field the basename was derived from, if one was used.
        name_field: Option<String>,
    },
    /// A range string does not match `a-b`, `-b`, `a-`, or `a`.
    #[error("invalid range specification '{spec}'")]
    InvalidRangeSpec {
        /// The offending range string.
        spec: String,
    },
    /// A selection string does not match `key=value`.
    #[error("invalid selection specification '{spec}': expected 'key=value'")]
    InvalidSelectionSpec {
        /// The offending selection string.
        spec: String,
    },
    /// A value kind with no defined JSON or textual projection.
    #[error("unsupported value type: {0}")]
    Unsupported(String),
    /// A failure while processing one specific record.
    #[error("while processing record with index {index}: {source}")]
    AtRecord {
        /// Global index of the record being processed.
        index: u64,
        /// Underlying failure.
        source: Box<StoreError>,
    },
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Codec failure outside per-record decoding.
    #[error("Avro error: {0}")]
    Avro(#[from] apache_avro::Error),
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Annotate an error with the global index of the record being
    /// processed when it occurred.
    pub fn at_record(self, index: u64) -> Self {
        StoreError::AtRecord {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;
