//! The user-facing operations: schema retrieval, JSON projection, field
//! extraction, filtered copying, and counting
//!
//! Every operation consumes a [`DataStore`] plus a [`RecordSelector`];
//! selection happens once per invocation. Failures while processing a
//! specific record are annotated with that record's global index before
//! propagating, and nothing skips-and-continues.

use std::io::Write;

use apache_avro::Writer;

use avrocat_fs::FsPath;

use crate::error::{Result, StoreError};
use crate::fields;
use crate::json;
use crate::select::{Record, RecordSelector};
use crate::store::DataStore;

/// Name of the container file produced by [`copy`].
pub const COPY_FILE_NAME: &str = "content.avro";

/// The store's resolved schema as pretty JSON text, field order preserved.
pub fn get_schema_json(store: &DataStore) -> Result<String> {
    let schema = store.schema()?;
    let value = serde_json::to_value(schema)?;
    json::pretty_json(&value)
}

/// Serialize the selected records to JSON on `out`.
///
/// Non-pretty mode emits one compact object per line (NDJSON), and nothing
/// at all when no record matches. Pretty mode emits a single JSON array of
/// indented objects, `[]` when no record matches; both modes are valid
/// standalone documents in pretty mode, only per-line in the other.
pub fn to_json(
    store: &DataStore,
    selector: &RecordSelector,
    out: &mut dyn Write,
    pretty: bool,
) -> Result<()> {
    if pretty {
        out.write_all(b"[")?;
    }
    let mut first = true;
    for record in selector.select(store)? {
        let record = record?;
        let text =
            json::encode(&record.content, pretty).map_err(|err| err.at_record(record.index))?;
        if pretty {
            if !first {
                out.write_all(b",\n")?;
            }
            out.write_all(text.as_bytes())?;
        } else {
            out.write_all(text.as_bytes())?;
            out.write_all(b"\n")?;
        }
        first = false;
    }
    if pretty {
        out.write_all(b"]\n")?;
    }
    out.flush()?;
    Ok(())
}

/// How [`extract`] should materialize the selected field.
pub struct ExtractRequest<'a> {
    /// Dotted path of the field whose value is written out.
    pub value_field: &'a str,
    /// Dotted path of the field naming each output; the global index names
    /// outputs when absent.
    pub name_field: Option<&'a str>,
    /// Group outputs into per-name directories of sequentially numbered
    /// files instead of failing on repeated names.
    pub create_dirs: bool,
    /// Directory to write into; values print to `out` when absent.
    pub output_dir: Option<&'a dyn FsPath>,
}

/// Extract one field from every selected record.
///
/// Records with empty content are skipped. Without an output directory the
/// value's text form goes to `out`, one line per record. With one, each
/// value is written raw (bytes byte-for-byte) to its own file; pre-existing
/// targets are [`StoreError::DuplicateOutput`] errors rather than being
/// overwritten.
pub fn extract(
    store: &DataStore,
    selector: &RecordSelector,
    request: &ExtractRequest<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    if let Some(dir) = request.output_dir {
        dir.make_dirs()?;
    }
    for record in selector.select(store)? {
        let record = record?;
        if fields::is_empty_content(&record.content) {
            continue;
        }
        let result = match request.output_dir {
            None => {
                let value = fields::resolve(&record.content, request.value_field)?;
                fields::text_form(value).and_then(|text| {
                    writeln!(out, "{text}")?;
                    Ok(())
                })
            }
            Some(dir) => write_extracted(dir, request, &record),
        };
        result.map_err(|err| err.at_record(record.index))?;
    }
    out.flush()?;
    Ok(())
}

fn write_extracted(
    dir: &dyn FsPath,
    request: &ExtractRequest<'_>,
    record: &Record,
) -> Result<()> {
    let value = fields::resolve(&record.content, request.value_field)?;
    let payload = fields::raw_form(value)?;
    let basename = output_basename(request, record)?;

    let target: Box<dyn FsPath> = if request.create_dirs {
        let group = dir.child(&basename);
        if group.exists() && !group.is_dir() {
            return Err(duplicate(&*group, request));
        }
        group.make_dirs()?;
        let slot = next_slot(&*group)?;
        group.child(&slot.to_string())
    } else {
        let target = dir.child(&basename);
        if target.exists() {
            return Err(duplicate(&*target, request));
        }
        target
    };

    let mut sink = target.open_write()?;
    sink.write_all(&payload)?;
    sink.flush()?;
    Ok(())
}

fn output_basename(request: &ExtractRequest<'_>, record: &Record) -> Result<String> {
    let field = match request.name_field {
        None => return Ok(record.index.to_string()),
        Some(field) => field,
    };
    let value = fields::resolve(&record.content, field)?;
    if fields::is_null(value) {
        return Ok("null".to_string());
    }
    let text = fields::text_form(value)?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        // Empty names collapse into the same bucket as absent ones.
        Ok("null".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn duplicate(path: &dyn FsPath, request: &ExtractRequest<'_>) -> StoreError {
    StoreError::DuplicateOutput {
        path: path.to_string(),
        name_field: request.name_field.map(String::from),
    }
}

/// Next slot after the highest numeric entry of `dir`, `0` when none exist.
fn next_slot(dir: &dyn FsPath) -> Result<u64> {
    let mut next = 0;
    for name in dir.list()? {
        if let Ok(n) = name.parse::<u64>() {
            next = next.max(n + 1);
        }
    }
    Ok(next)
}

/// Re-serialize the selected records into `<output_dir>/content.avro`.
///
/// The file is written with the store's resolved reader schema, so an
/// explicit schema projection plus selection filters produce a smaller,
/// still valid container file. Returns the number of records written.
pub fn copy(store: &DataStore, selector: &RecordSelector, output_dir: &dyn FsPath) -> Result<u64> {
    let schema = store.schema()?;
    output_dir.make_dirs()?;
    let sink = output_dir.child(COPY_FILE_NAME).open_write()?;
    let mut writer = Writer::new(schema, sink);
    let mut written = 0;
    for record in selector.select(store)? {
        let record = record?;
        writer
            .append_value_ref(&record.content)
            .map_err(|err| StoreError::from(err).at_record(record.index))?;
        written += 1;
    }
    writer.into_inner()?;
    Ok(written)
}

/// Number of records the selector yields, with the same early termination
/// as any other scan.
pub fn count(store: &DataStore, selector: &RecordSelector) -> Result<u64> {
    let mut n = 0;
    for record in selector.select(store)? {
        record?;
        n += 1;
    }
    Ok(n)
}
