//! Local filesystem backend

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::{FsPath, ReadSeek};

/// A path on the local filesystem.
#[derive(Clone, Debug)]
pub struct LocalPath {
    path: PathBuf,
}

impl LocalPath {
    /// Wrap a local filesystem path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl fmt::Display for LocalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl FsPath for LocalPath {
    fn open_read(&self) -> io::Result<Box<dyn ReadSeek>> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn open_write(&self) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(File::create(&self.path)?))
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn is_dir(&self) -> bool {
        self.path.is_dir()
    }

    fn child(&self, name: &str) -> Box<dyn FsPath> {
        Box::new(Self::new(self.path.join(name)))
    }

    fn make_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let root = LocalPath::new(dir.path());
        let file = root.child("a.txt");

        file.open_write().unwrap().write_all(b"payload").unwrap();

        let mut buf = Vec::new();
        file.open_read().unwrap().read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"payload");
        assert!(file.exists());
        assert!(!file.is_dir());
        assert_eq!(root.list().unwrap(), vec!["a.txt".to_string()]);
    }

    #[test]
    fn make_dirs_creates_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = LocalPath::new(dir.path()).child("a").child("b");
        nested.make_dirs().unwrap();
        assert!(nested.is_dir());
    }
}
