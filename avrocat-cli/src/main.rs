//! avrocat CLI - Command-line tool for Avro data stores
//!
//! This binary provides command-line interfaces for:
//! - getschema: print the schema shared by a data store
//! - tojson: dump selected records as JSON
//! - extract: write one field of each selected record to files or stdout
//! - copy: copy selected records into a fresh data store
//! - count: count the selected records

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::Write;

use avrocat_fs::{resolve_spec, FsPath, MemFs};
use avrocat_store::{
    copy, count, extract, get_schema_json, to_json, DataStore, EqualitySelection, ExtractRequest,
    Range, RecordSelector,
};

#[derive(Parser)]
#[command(name = "avrocat")]
#[command(about = "Browse, extract, and copy records in Avro data stores")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the schema every file of the data store is read with
    Getschema {
        /// Data store directory (prefix with "local:"; paths without a
        /// prefix are local)
        store: String,
        /// Reader schema file applied instead of the store's writer schema
        #[arg(long)]
        schema: Option<String>,
        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Dump selected records as JSON
    ///
    /// Examples:
    ///   avrocat tojson data/users
    ///   avrocat tojson data/users --index 2-5 --pretty
    ///   avrocat tojson data/users --select favorite_color=blue --limit 1
    Tojson {
        /// Data store directory
        store: String,
        /// Reader schema file applied instead of the store's writer schema
        #[arg(long)]
        schema: Option<String>,
        /// Record range, e.g. "4", "2-5", "-3", or "6-"
        #[arg(long)]
        index: Option<String>,
        /// Equality filter on a (dotted) field, e.g. "name=Ben"
        #[arg(long)]
        select: Option<String>,
        /// Stop after this many matching records
        #[arg(long)]
        limit: Option<u64>,
        /// Emit one indented JSON array instead of one object per line
        #[arg(long)]
        pretty: bool,
        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Write one field of each selected record to files or stdout
    ///
    /// Examples:
    ///   avrocat extract data/users --value-field name
    ///   avrocat extract data/users --value-field payload --output dump
    ///   avrocat extract data/users --value-field payload --name-field id --output dump
    Extract {
        /// Data store directory
        store: String,
        /// Reader schema file applied instead of the store's writer schema
        #[arg(long)]
        schema: Option<String>,
        /// Record range, e.g. "4", "2-5", "-3", or "6-"
        #[arg(long)]
        index: Option<String>,
        /// Equality filter on a (dotted) field, e.g. "name=Ben"
        #[arg(long)]
        select: Option<String>,
        /// Stop after this many matching records
        #[arg(long)]
        limit: Option<u64>,
        /// Dotted path of the field whose value is written out
        #[arg(long)]
        value_field: String,
        /// Dotted path of the field naming each output file; the record's
        /// index names the file when absent
        #[arg(long)]
        name_field: Option<String>,
        /// Group outputs into per-name directories of numbered files
        /// instead of failing on repeated names
        #[arg(long)]
        create_dirs: bool,
        /// Output directory (values print to stdout when absent)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Copy selected records into a fresh single-file data store
    Copy {
        /// Data store directory
        store: String,
        /// Reader schema file; the copy is written with it when given
        #[arg(long)]
        schema: Option<String>,
        /// Record range, e.g. "4", "2-5", "-3", or "6-"
        #[arg(long)]
        index: Option<String>,
        /// Equality filter on a (dotted) field, e.g. "name=Ben"
        #[arg(long)]
        select: Option<String>,
        /// Stop after this many matching records
        #[arg(long)]
        limit: Option<u64>,
        /// Output directory for the new data store
        #[arg(short, long)]
        output: String,
    },
    /// Count the selected records
    Count {
        /// Data store directory
        store: String,
        /// Reader schema file applied instead of the store's writer schema
        #[arg(long)]
        schema: Option<String>,
        /// Record range, e.g. "4", "2-5", "-3", or "6-"
        #[arg(long)]
        index: Option<String>,
        /// Equality filter on a (dotted) field, e.g. "name=Ben"
        #[arg(long)]
        select: Option<String>,
        /// Stop after this many matching records
        #[arg(long)]
        limit: Option<u64>,
        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mem = MemFs::new();

    match cli.command {
        Commands::Getschema {
            store,
            schema,
            output,
        } => {
            handle_getschema(&mem, &store, schema.as_deref(), output.as_deref())?;
        }
        Commands::Tojson {
            store,
            schema,
            index,
            select,
            limit,
            pretty,
            output,
        } => {
            let selector = build_selector(index.as_deref(), select.as_deref(), limit)?;
            handle_tojson(
                &mem,
                &store,
                schema.as_deref(),
                &selector,
                pretty,
                output.as_deref(),
            )?;
        }
        Commands::Extract {
            store,
            schema,
            index,
            select,
            limit,
            value_field,
            name_field,
            create_dirs,
            output,
        } => {
            let selector = build_selector(index.as_deref(), select.as_deref(), limit)?;
            handle_extract(
                &mem,
                &store,
                schema.as_deref(),
                &selector,
                &value_field,
                name_field.as_deref(),
                create_dirs,
                output.as_deref(),
            )?;
        }
        Commands::Copy {
            store,
            schema,
            index,
            select,
            limit,
            output,
        } => {
            let selector = build_selector(index.as_deref(), select.as_deref(), limit)?;
            handle_copy(&mem, &store, schema.as_deref(), &selector, &output)?;
        }
        Commands::Count {
            store,
            schema,
            index,
            select,
            limit,
            output,
        } => {
            let selector = build_selector(index.as_deref(), select.as_deref(), limit)?;
            handle_count(&mem, &store, schema.as_deref(), &selector, output.as_deref())?;
        }
    }

    Ok(())
}

fn build_selector(
    index: Option<&str>,
    select: Option<&str>,
    limit: Option<u64>,
) -> Result<RecordSelector, Box<dyn Error>> {
    let range = index.map(str::parse::<Range>).transpose()?;
    let selection = select.map(str::parse::<EqualitySelection>).transpose()?;
    Ok(RecordSelector::new(range, selection, limit))
}

fn open_store(mem: &MemFs, store: &str, schema: Option<&str>) -> DataStore {
    let dir = resolve_spec(store, mem);
    let schema_path = schema.map(|spec| resolve_spec(spec, mem));
    DataStore::new(dir, schema_path)
}

fn open_sink(mem: &MemFs, output: Option<&str>) -> Result<Box<dyn Write>, Box<dyn Error>> {
    match output {
        Some(spec) => Ok(resolve_spec(spec, mem).open_write()?),
        None => Ok(Box::new(std::io::stdout().lock())),
    }
}

fn handle_getschema(
    mem: &MemFs,
    store: &str,
    schema: Option<&str>,
    output: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let store = open_store(mem, store, schema);
    let text = get_schema_json(&store)?;
    let mut sink = open_sink(mem, output)?;
    writeln!(sink, "{}", text)?;
    sink.flush()?;
    Ok(())
}

fn handle_tojson(
    mem: &MemFs,
    store: &str,
    schema: Option<&str>,
    selector: &RecordSelector,
    pretty: bool,
    output: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let store = open_store(mem, store, schema);
    let mut sink = open_sink(mem, output)?;
    to_json(&store, selector, &mut sink, pretty)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_extract(
    mem: &MemFs,
    store: &str,
    schema: Option<&str>,
    selector: &RecordSelector,
    value_field: &str,
    name_field: Option<&str>,
    create_dirs: bool,
    output: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let store = open_store(mem, store, schema);
    let output_dir = output.map(|spec| resolve_spec(spec, mem));
    let request = ExtractRequest {
        value_field,
        name_field,
        create_dirs,
        output_dir: output_dir.as_deref(),
    };
    let mut stdout = std::io::stdout().lock();
    extract(&store, selector, &request, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn handle_copy(
    mem: &MemFs,
    store: &str,
    schema: Option<&str>,
    selector: &RecordSelector,
    output: &str,
) -> Result<(), Box<dyn Error>> {
    let store = open_store(mem, store, schema);
    let output_dir = resolve_spec(output, mem);
    let written = copy(&store, selector, &*output_dir)?;
    let mut stderr = std::io::stderr().lock();
    writeln!(&mut stderr, "Copied {} records to {}", written, output_dir)?;
    Ok(())
}

fn handle_count(
    mem: &MemFs,
    store: &str,
    schema: Option<&str>,
    selector: &RecordSelector,
    output: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let store = open_store(mem, store, schema);
    let total = count(&store, selector)?;
    let mut sink = open_sink(mem, output)?;
    writeln!(sink, "{}", total)?;
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_selector_accepts_all_range_forms() {
        for spec in ["4", "2-5", "-3", "6-"] {
            build_selector(Some(spec), None, None).unwrap();
        }
    }

    #[test]
    fn build_selector_rejects_malformed_range() {
        assert!(build_selector(Some("-"), None, None).is_err());
        assert!(build_selector(Some("1-2-3"), None, None).is_err());
        assert!(build_selector(Some("abc"), None, None).is_err());
    }

    #[test]
    fn build_selector_rejects_selection_without_key() {
        assert!(build_selector(None, Some("=blue"), None).is_err());
        assert!(build_selector(None, Some("no_equals_sign"), None).is_err());
    }

    #[test]
    fn build_selector_keeps_value_side_verbatim() {
        // Only the first '=' splits; the rest belongs to the target value.
        build_selector(None, Some("name=a=b"), None).unwrap();
    }
}
