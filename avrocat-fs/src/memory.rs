//! Shared in-memory filesystem backend
//!
//! Backs the `mem:` path prefix. A [`MemFs`] handle is cheap to clone and
//! all clones see the same tree, so a test can write a data store through
//! one path and read it back through another.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use crate::{FsPath, ReadSeek};

#[derive(Default)]
struct MemState {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
}

/// Handle to a shared in-memory filesystem.
#[derive(Clone, Default)]
pub struct MemFs {
    state: Arc<Mutex<MemState>>,
}

impl MemFs {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Address a path within this filesystem.
    pub fn path(&self, path: &str) -> MemPath {
        MemPath {
            fs: self.clone(),
            path: normalize(path),
        }
    }
}

/// A path inside a [`MemFs`].
#[derive(Clone)]
pub struct MemPath {
    fs: MemFs,
    path: String,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn join(base: &str, name: &str) -> String {
    if base == "/" {
        format!("/{name}")
    } else {
        format!("{base}/{name}")
    }
}

impl MemPath {
    fn child_prefix(&self) -> String {
        join(&self.path, "")
    }

    fn has_children(&self, state: &MemState) -> bool {
        let prefix = self.child_prefix();
        state.files.range(prefix.clone()..).next().is_some_and(|(k, _)| k.starts_with(&prefix))
            || state.dirs.range(prefix.clone()..).next().is_some_and(|k| k.starts_with(&prefix))
    }
}

impl fmt::Display for MemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl FsPath for MemPath {
    fn open_read(&self) -> io::Result<Box<dyn ReadSeek>> {
        let state = self.fs.state.lock().expect("memory fs lock");
        match state.files.get(&self.path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", self.path),
            )),
        }
    }

    fn open_write(&self) -> io::Result<Box<dyn Write>> {
        Ok(Box::new(MemWriter {
            fs: self.fs.clone(),
            path: self.path.clone(),
            buf: Vec::new(),
        }))
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let state = self.fs.state.lock().expect("memory fs lock");
        let prefix = self.child_prefix();
        let mut names = BTreeSet::new();
        for key in state.files.keys().chain(state.dirs.iter()) {
            if let Some(rest) = key.strip_prefix(&prefix) {
                if let Some(name) = rest.split('/').next() {
                    if !name.is_empty() {
                        names.insert(name.to_string());
                    }
                }
            }
        }
        Ok(names.into_iter().collect())
    }

    fn exists(&self) -> bool {
        let state = self.fs.state.lock().expect("memory fs lock");
        state.files.contains_key(&self.path)
            || state.dirs.contains(&self.path)
            || self.has_children(&state)
    }

    fn is_dir(&self) -> bool {
        let state = self.fs.state.lock().expect("memory fs lock");
        !state.files.contains_key(&self.path)
            && (state.dirs.contains(&self.path) || self.has_children(&state))
    }

    fn child(&self, name: &str) -> Box<dyn FsPath> {
        Box::new(MemPath {
            fs: self.fs.clone(),
            path: join(&self.path, name),
        })
    }

    fn make_dirs(&self) -> io::Result<()> {
        let mut state = self.fs.state.lock().expect("memory fs lock");
        let mut current = String::new();
        for part in self.path.split('/').filter(|p| !p.is_empty()) {
            current = join(if current.is_empty() { "/" } else { &current }, part);
            state.dirs.insert(current.clone());
        }
        Ok(())
    }
}

/// Buffers writes and commits the file on flush or drop.
struct MemWriter {
    fs: MemFs,
    path: String,
    buf: Vec<u8>,
}

impl MemWriter {
    fn commit(&mut self) {
        let mut state = self.fs.state.lock().expect("memory fs lock");
        state.files.insert(self.path.clone(), self.buf.clone());
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MemWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
