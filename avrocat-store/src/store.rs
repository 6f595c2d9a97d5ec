//! Virtual multi-file Avro data store
//!
//! A data store is a directory of Avro container files sharing one schema.
//! All eligible files are treated as a single concatenated record stream,
//! ordered by the lexicographic order of their full paths.

use std::io::Read;
use std::sync::OnceLock;

use apache_avro::types::Value;
use apache_avro::{Reader, Schema};

use avrocat_fs::{FsPath, ReadSeek};

use crate::error::{Result, StoreError};

/// Directory of Avro container files viewed as one logical record stream.
pub struct DataStore {
    dir: Box<dyn FsPath>,
    schema_path: Option<Box<dyn FsPath>>,
    schema: OnceLock<Schema>,
}

impl DataStore {
    /// Open a data store rooted at `dir`.
    ///
    /// With a `schema_path`, records are decoded against that reader schema
    /// (resolving it against each file's embedded writer schema, which is
    /// how field projection works). Without one, the reader schema is the
    /// writer schema embedded in the first eligible file.
    pub fn new(dir: Box<dyn FsPath>, schema_path: Option<Box<dyn FsPath>>) -> Self {
        Self {
            dir,
            schema_path,
            schema: OnceLock::new(),
        }
    }

    /// The resolved reader schema, computed at most once per store.
    pub fn schema(&self) -> Result<&Schema> {
        if let Some(schema) = self.schema.get() {
            return Ok(schema);
        }
        let loaded = self.load_schema()?;
        Ok(self.schema.get_or_init(|| loaded))
    }

    fn load_schema(&self) -> Result<Schema> {
        match &self.schema_path {
            Some(path) => {
                let mut text = String::new();
                path.open_read()?.read_to_string(&mut text)?;
                Schema::parse_str(&text).map_err(|source| StoreError::Schema {
                    path: path.to_string(),
                    source,
                })
            }
            None => {
                // No explicit schema: take the writer schema embedded in the
                // lexicographically first eligible file.
                let files = self.eligible_files()?;
                let reader = Reader::new(files[0].open_read()?)?;
                Ok(reader.writer_schema().clone())
            }
        }
    }

    /// Eligible container files in concatenation order.
    ///
    /// Files whose base name starts with `_` or `.` are skipped (the same
    /// names map-reduce jobs ignore: `_SUCCESS` markers, `.svn` leftovers).
    /// The remaining paths sort by their full string form, which must be
    /// stable across runs since it defines the global record order.
    fn eligible_files(&self) -> Result<Vec<Box<dyn FsPath>>> {
        let mut files: Vec<Box<dyn FsPath>> = self
            .dir
            .list()?
            .into_iter()
            .filter(|name| !name.starts_with('_') && !name.starts_with('.'))
            .map(|name| self.dir.child(&name))
            .collect();
        if files.is_empty() {
            return Err(StoreError::EmptyDataStore {
                path: self.dir.to_string(),
            });
        }
        files.sort_by_key(|path| path.to_string());
        Ok(files)
    }

    /// Iterate the decoded records of the whole store, in order.
    ///
    /// Each call starts a fresh pass. Items are `(global index, content)`
    /// pairs; a decode failure surfaces as [`StoreError::RecordDecode`]
    /// naming the global index, the source file, and the record's local
    /// index within it, and ends the iteration.
    pub fn iter(&self) -> Result<RecordIter<'_>> {
        let files = self.eligible_files()?;
        let schema = self.schema()?;
        Ok(RecordIter {
            schema,
            files: files.into_iter(),
            current: None,
            global_index: 0,
        })
    }
}

/// Lazy record iterator over all files of a [`DataStore`].
pub struct RecordIter<'a> {
    schema: &'a Schema,
    files: std::vec::IntoIter<Box<dyn FsPath>>,
    current: Option<FileCursor<'a>>,
    global_index: u64,
}

struct FileCursor<'a> {
    reader: Reader<'a, Box<dyn ReadSeek>>,
    path: String,
    local_index: u64,
}

impl RecordIter<'_> {
    fn fail(&mut self, err: StoreError) -> Option<<Self as Iterator>::Item> {
        // No partial recovery: drop the remaining files so the iterator
        // stays exhausted after an error.
        self.current = None;
        self.files = Vec::new().into_iter();
        Some(Err(err))
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<(u64, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cursor) = &mut self.current {
                match cursor.reader.next() {
                    Some(Ok(content)) => {
                        let index = self.global_index;
                        self.global_index += 1;
                        cursor.local_index += 1;
                        return Some(Ok((index, content)));
                    }
                    Some(Err(source)) => {
                        let err = StoreError::RecordDecode {
                            global_index: self.global_index,
                            path: cursor.path.clone(),
                            local_index: cursor.local_index,
                            source,
                        };
                        return self.fail(err);
                    }
                    None => {
                        self.current = None;
                    }
                }
            }
            let file = self.files.next()?;
            let stream = match file.open_read() {
                Ok(stream) => stream,
                Err(err) => return self.fail(err.into()),
            };
            // Opening with the resolved reader schema makes the codec
            // resolve it against this file's own writer schema.
            match Reader::with_schema(self.schema, stream) {
                Ok(reader) => {
                    self.current = Some(FileCursor {
                        reader,
                        path: file.to_string(),
                        local_index: 0,
                    });
                }
                Err(source) => {
                    let err = StoreError::RecordDecode {
                        global_index: self.global_index,
                        path: file.to_string(),
                        local_index: 0,
                        source,
                    };
                    return self.fail(err);
                }
            }
        }
    }
}
