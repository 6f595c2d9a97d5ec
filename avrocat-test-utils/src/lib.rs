//! Example data store fixtures for the avrocat test suites
//!
//! Three canonical stores, written onto any `FsPath` backend:
//!
//! - **standard**: eight `User` records spread over four files (one of them
//!   empty) plus a `_SUCCESS` marker that eligibility filtering must skip;
//!   exercises unions, nulls, empty strings, and byte payloads
//! - **nested**: two records with a nested sub-record
//! - **binary**: two records whose `packed_files` field holds non-UTF8
//!   bytes

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::error::Error;
use std::io::Write as _;

use apache_avro::types::Value;
use apache_avro::{Schema, Writer};

use avrocat_fs::FsPath;

/// Result alias for fixture construction.
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Schema of the standard store.
pub const USER_SCHEMA_JSON: &str = r#"
{
    "namespace": "avrocat.test.data",
    "type": "record",
    "name": "User",
    "fields": [
        {"name": "position", "type": "int"},
        {"name": "name", "type": "string"},
        {"name": "favorite_number", "type": ["int", "null"]},
        {"name": "favorite_color", "type": ["string", "null"]},
        {"name": "secret", "type": ["bytes", "null"]}
    ]
}
"#;

/// Reader schema projecting the standard store down to two fields.
pub const USER_PROJECTION_JSON: &str = r#"
{
    "namespace": "avrocat.test.data",
    "type": "record",
    "name": "User",
    "fields": [
        {"name": "position", "type": "int"},
        {"name": "name", "type": "string"}
    ]
}
"#;

/// Schema of the nested store.
pub const NESTED_SCHEMA_JSON: &str = r#"
{
    "namespace": "avrocat.test.data",
    "type": "record",
    "name": "Nested",
    "fields": [
        {"name": "sup", "type": "int"},
        {"name": "sub", "type": {
            "type": "record",
            "name": "Sub",
            "fields": [{"name": "level2", "type": "int"}]
        }}
    ]
}
"#;

/// Schema of the binary store.
pub const BINARY_SCHEMA_JSON: &str = r#"
{
    "namespace": "avrocat.test.data",
    "type": "record",
    "name": "Packed",
    "fields": [
        {"name": "description", "type": "string"},
        {"name": "packed_files", "type": "bytes"}
    ]
}
"#;

/// Byte payloads stored in the binary store, deliberately not valid UTF-8.
pub const BINARY_PAYLOADS: [(&str, &[u8]); 2] = [
    (
        "various stuff",
        &[0x1F, 0x8B, 0x08, 0x00, 0xFF, 0xFE, 0x00, 0x80, 0x7F],
    ),
    ("greetings", &[0x1F, 0x8B, 0x08, 0x08, 0xC0, 0x00, 0x9F, 0x01]),
];

fn user(
    position: i32,
    name: &str,
    favorite_number: Option<i32>,
    favorite_color: Option<&str>,
    secret: Option<&[u8]>,
) -> Value {
    let opt = |value: Option<Value>| match value {
        Some(inner) => Value::Union(0, Box::new(inner)),
        None => Value::Union(1, Box::new(Value::Null)),
    };
    Value::Record(vec![
        ("position".into(), Value::Int(position)),
        ("name".into(), Value::String(name.into())),
        (
            "favorite_number".into(),
            opt(favorite_number.map(Value::Int)),
        ),
        (
            "favorite_color".into(),
            opt(favorite_color.map(|c| Value::String(c.into()))),
        ),
        ("secret".into(), opt(secret.map(|s| Value::Bytes(s.to_vec())))),
    ])
}

fn write_file(dir: &dyn FsPath, name: &str, schema: &Schema, records: Vec<Value>) -> Result<()> {
    let mut writer = Writer::new(schema, dir.child(name).open_write()?);
    for record in records {
        writer.append(record)?;
    }
    writer.into_inner()?;
    Ok(())
}

/// Write the standard store: eight users over four part files.
pub fn write_standard_store(dir: &dyn FsPath) -> Result<()> {
    dir.make_dirs()?;
    let schema = Schema::parse_str(USER_SCHEMA_JSON)?;

    write_file(
        dir,
        "part-m-00000.avro",
        &schema,
        vec![
            user(0, "Alyssa", Some(256), None, None),
            user(1, "Ben", Some(4), Some("red"), None),
        ],
    )?;
    write_file(
        dir,
        "part-m-00001.avro",
        &schema,
        vec![
            user(2, "Alyssa2", Some(512), None, None),
            user(3, "Ben2", Some(8), Some("blue"), Some(b"0987654321")),
            user(4, "Ben3", Some(2), Some("green"), Some(b"12345abcd")),
        ],
    )?;
    // A legitimately empty part file: contributes no records but must not
    // break concatenation.
    write_file(dir, "part-m-00002.avro", &schema, vec![])?;
    write_file(
        dir,
        "part-m-00003.avro",
        &schema,
        vec![
            user(5, "Alyssa3", Some(16), None, None),
            user(6, "Mallet", None, Some("blue"), Some(b"asdfgf")),
            user(7, "Mikel", None, Some(""), None),
        ],
    )?;

    // Marker file in the map-reduce style; eligibility filtering skips it.
    dir.child("_SUCCESS").open_write()?.flush()?;
    Ok(())
}

/// Write the nested store: two records with a nested sub-record.
pub fn write_nested_store(dir: &dyn FsPath) -> Result<()> {
    dir.make_dirs()?;
    let schema = Schema::parse_str(NESTED_SCHEMA_JSON)?;
    let nested = |sup: i32, level2: i32| {
        Value::Record(vec![
            ("sup".into(), Value::Int(sup)),
            (
                "sub".into(),
                Value::Record(vec![("level2".into(), Value::Int(level2))]),
            ),
        ])
    };
    write_file(
        dir,
        "part-m-00004.avro",
        &schema,
        vec![nested(1, 2), nested(2, 1)],
    )
}

/// Write the binary store: two records holding non-UTF8 byte payloads.
pub fn write_binary_store(dir: &dyn FsPath) -> Result<()> {
    dir.make_dirs()?;
    let schema = Schema::parse_str(BINARY_SCHEMA_JSON)?;
    let records = BINARY_PAYLOADS
        .iter()
        .map(|(description, payload)| {
            Value::Record(vec![
                ("description".into(), Value::String((*description).into())),
                ("packed_files".into(), Value::Bytes(payload.to_vec())),
            ])
        })
        .collect();
    write_file(dir, "content.avro", &schema, records)
}
