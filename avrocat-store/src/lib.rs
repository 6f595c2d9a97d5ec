//! avrocat core - record-level browsing and extraction over directories of
//! Avro container files
//!
//! A directory of container files sharing one schema is treated as one
//! logical, ordered record stream. This crate provides:
//!
//! - [`DataStore`]: the virtual multi-file store, concatenating per-file
//!   record streams in lexicographic path order and resolving a reader
//!   schema against each file's writer schema
//! - [`RecordSelector`]: index range, field-equality, and limit filtering
//!   over the logical stream, with early termination
//! - [`ops`]: the user-facing operations (schema retrieval, binary-safe
//!   JSON projection, field extraction, filtered copying, counting)
//!
//! The Avro binary format itself is handled by the `apache-avro` codec;
//! filesystem access goes through the `avrocat-fs` path abstraction.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fields;
pub mod json;
pub mod ops;
pub mod select;
pub mod store;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use ops::{copy, count, extract, get_schema_json, to_json, ExtractRequest, COPY_FILE_NAME};
pub use select::{EqualitySelection, Range, Record, RecordSelector, Selection};
pub use store::{DataStore, RecordIter};

// The codec's value type is part of this crate's API surface.
pub use apache_avro::types::Value;
pub use apache_avro::Schema;
