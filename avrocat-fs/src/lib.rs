//! Path abstraction for avrocat
//!
//! Data stores and operation outputs live behind the [`FsPath`] trait so the
//! record-level machinery never touches a concrete filesystem API. Two
//! backends are provided:
//!
//! - [`LocalPath`]: the local filesystem via `std::fs`
//! - [`MemPath`]: a shared in-memory filesystem, mainly for tests and
//!   embedders that need a scratch backend
//!
//! A backend is picked once per path spec by a literal prefix (`local:` or
//! `mem:`); unprefixed specs go to the local backend. Remote filesystems
//! (HDFS, object stores) are expected to plug in behind the same trait.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod local;
pub mod memory;

pub use local::LocalPath;
pub use memory::{MemFs, MemPath};

use std::fmt;
use std::io::{self, Read, Seek, Write};

/// Byte source supporting random access reads.
///
/// Container file readers seek within a file, so a plain `Read` stream is
/// not enough.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// A location in one of the filesystem backends.
///
/// The `Display` form is the full path string and doubles as the sort key:
/// data store files are concatenated in the lexicographic order of these
/// strings.
pub trait FsPath: fmt::Display {
    /// Open the path for reading.
    fn open_read(&self) -> io::Result<Box<dyn ReadSeek>>;

    /// Open the path for writing, creating it if absent.
    fn open_write(&self) -> io::Result<Box<dyn Write>>;

    /// Names of the entries directly under this directory.
    fn list(&self) -> io::Result<Vec<String>>;

    /// Whether anything exists at this path.
    fn exists(&self) -> bool;

    /// Whether this path is a directory.
    fn is_dir(&self) -> bool;

    /// Derive the path of a named child.
    fn child(&self, name: &str) -> Box<dyn FsPath>;

    /// Create this directory and any missing ancestors.
    fn make_dirs(&self) -> io::Result<()>;
}

/// Path spec prefix selecting the local backend.
pub const LOCAL_PREFIX: &str = "local:";

/// Path spec prefix selecting the in-memory backend.
pub const MEMORY_PREFIX: &str = "mem:";

/// Filesystem backend named by a path spec prefix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Local filesystem.
    Local,
    /// Shared in-memory filesystem.
    Memory,
}

/// Split a path spec into its backend and the backend-relative path.
///
/// Unprefixed specs map to the local backend.
pub fn classify_spec(spec: &str) -> (Backend, &str) {
    if let Some(rest) = spec.strip_prefix(LOCAL_PREFIX) {
        (Backend::Local, rest)
    } else if let Some(rest) = spec.strip_prefix(MEMORY_PREFIX) {
        (Backend::Memory, rest)
    } else {
        (Backend::Local, spec)
    }
}

/// Resolve a path spec against the backends, picking one by prefix.
///
/// The backend choice happens here, once; nothing downstream re-inspects the
/// spec string.
pub fn resolve_spec(spec: &str, mem: &MemFs) -> Box<dyn FsPath> {
    match classify_spec(spec) {
        (Backend::Local, path) => Box::new(LocalPath::new(path)),
        (Backend::Memory, path) => Box::new(mem.path(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprefixed_spec_is_local() {
        assert_eq!(classify_spec("/data/store"), (Backend::Local, "/data/store"));
    }

    #[test]
    fn local_prefix_is_stripped() {
        assert_eq!(classify_spec("local:/tmp/x"), (Backend::Local, "/tmp/x"));
    }

    #[test]
    fn memory_prefix_is_stripped() {
        assert_eq!(classify_spec("mem:/stores/a"), (Backend::Memory, "/stores/a"));
    }

    #[test]
    fn resolved_paths_print_backend_relative_form() {
        let mem = MemFs::new();
        let path = resolve_spec("mem:/stores/a", &mem);
        assert_eq!(path.to_string(), "/stores/a");
    }
}
