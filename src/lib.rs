//! SceneScript DB2 table toolkit.
//!
//! The `scenescript-db2` crate (library name `db2`) reads and writes the WDB6
//! flavour of the DB2 client table format for the three SceneScript tables
//! (`SceneScriptPackage`, `SceneScriptPackageMember`, `SceneScript`) and maps
//! them to an editable package catalog and directory tree.
//!
//! # CLI Reference
//!
//! The `ssdb` binary wraps the library:
//!
//! | Command | Purpose |
//! |---------|---------|
//! | [`ssdb unpack`](cli::app::Commands::Unpack) | Decode the three tables into a `by id` / `by name` tree |
//! | [`ssdb pack`](cli::app::Commands::Pack) | Build the three tables from a tree |
//! | [`ssdb info`](cli::app::Commands::Info) | Show a table header and its validation status |
//! | [`ssdb dump`](cli::app::Commands::Dump) | Decode one table and print its rows |
//! | [`ssdb check`](cli::app::Commands::Check) | Decode and cross-check all three tables |
//!
//! All subcommands accept `--color <auto|always|never>`, `--output <file>` and
//! `-v` (repeatable) to raise the log level. `RUST_LOG` overrides `-v`.
//!
//! # Library API
//!
//! ```no_run
//! use db2::wdb::reader::read_table;
//! use db2::wdb::records::Script;
//!
//! let data = std::fs::read("DBFilesClient/SceneScript.db2").unwrap();
//! let scripts: Vec<Script> = read_table(&data).unwrap();
//! println!("{} script fragments", scripts.len());
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`wdb::header`] | 56-byte WDB6 header parsing, writing and validation |
//! | [`wdb::schema`] | Per-table layout descriptors ([`TableSchema`](wdb::schema::TableSchema)) |
//! | [`wdb::strings`] | String block accessor and builder |
//! | [`wdb::records`] | Typed rows for the three SceneScript tables |
//! | [`wdb::reader`] | Table decoder (rows, id array, copy table) |
//! | [`wdb::writer`] | Table encoder |
//! | [`scene`] | Package catalog, script chunking and chain reassembly |
//! | [`util::tree`] | Directory tree projection of a catalog (`cli` feature) |

#[cfg(feature = "cli")]
pub mod cli;
pub mod scene;
pub mod util;
pub mod wdb;

use thiserror::Error;

/// Wire-format violations found while validating or slicing a table buffer.
///
/// The header decides how every following byte is interpreted, so none of
/// these are recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The first four bytes are not `WDB6`.
    #[error("bad header magic 0x{found:08x} (expected WDB6)")]
    BadMagic { found: u32 },

    /// Some columns live in a common data block.
    #[error("uses common data (field_count {field_count}, total_field_count {total_field_count})")]
    UsesCommonData {
        field_count: u32,
        total_field_count: u32,
    },

    /// Flags other than "ids stored as trailing array".
    #[error("unknown flags 0x{flags:04x}")]
    UnsupportedFlags { flags: u16 },

    /// Header row size differs from the raw row size of the table kind.
    #[error("row size mismatch: header has {found} bytes, raw row is {expected}")]
    RowSizeMismatch { expected: u32, found: u32 },

    /// Header layout hash differs from the compiled one.
    #[error("layout hash mismatch: 0x{found:08x} (expected 0x{expected:08x})")]
    LayoutHashMismatch { expected: u32, found: u32 },

    /// The buffer ends before a section does.
    #[error("truncated {section}: need {needed} bytes, have {available}")]
    Truncated {
        section: &'static str,
        needed: usize,
        available: usize,
    },

    /// Copy table size is not a whole number of 8-byte entries.
    #[error("copy table size {0} is not a multiple of 8")]
    MisalignedCopyTable(u32),

    /// A string field points past the end of the string block.
    #[error("string offset {offset} outside {len}-byte string block")]
    StringOffsetOutOfRange { offset: u32, len: usize },
}

/// Errors returned by `db2` operations.
#[derive(Error, Debug)]
pub enum Db2Error {
    /// An I/O error occurred (file open, read, write or symlink failure).
    #[error("I/O error: {0}")]
    Io(String),

    /// Malformed input outside the binary format (tree names, CLI values).
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid argument was supplied.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// A table buffer failed header validation or bounds checks.
    #[error("{table}: {source}")]
    Format {
        table: &'static str,
        source: FormatError,
    },

    /// A copy table entry names a source row that does not exist.
    #[error("{table}: copy table entry {new_id} refers to missing row {source_id}")]
    DanglingCopySource {
        table: &'static str,
        new_id: u32,
        source_id: u32,
    },

    /// A chain link does not name a known script. `link` is `member` for the
    /// head link held by a package member (`from` is then the member id), or
    /// `next` / `previous` for links between scripts.
    #[error("{link} link from {from} to script {target} does not resolve to a known script")]
    DanglingChainLink {
        from: u32,
        link: &'static str,
        target: u32,
    },

    /// Following `next` links from `head` reached `at` a second time.
    #[error("script chain starting at {head} loops back to script {at}")]
    ChainCycle { head: u32, at: u32 },

    /// A value does not fit the width of its raw column.
    #[error("{table}: {field} value {value} does not fit in {bits} bits")]
    FieldOverflow {
        table: &'static str,
        field: &'static str,
        value: u32,
        bits: u32,
    },

    /// A string cannot be stored NUL-terminated.
    #[error("{table}: {field} of row {id} contains a NUL byte")]
    InteriorNul {
        table: &'static str,
        field: &'static str,
        id: u32,
    },
}

impl Db2Error {
    /// Wrap a [`FormatError`] with the name of the table it was found in.
    pub fn format(table: &'static str, source: FormatError) -> Self {
        Db2Error::Format { table, source }
    }
}
