//! CLI subcommand implementations for the `ssdb` binary.
//!
//! Argument parsing uses clap derive macros. The top-level [`app::Cli`] struct
//! and [`app::Commands`] enum live in [`app`] and are shared between `main.rs`
//! and `build.rs` (for man pages and completions) via `include!()`.
//!
//! Each subcommand module exposes an `Options` struct holding the parsed
//! arguments and a `pub fn execute(opts, writer) -> Result<(), Db2Error>`
//! entry point. Output goes through `writer: &mut dyn Write`, so tests can
//! capture it and the global `--output` flag can redirect it.
//!
//! # Subcommands
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `ssdb unpack` | [`unpack`] | Decode the three tables into a directory tree |
//! | `ssdb pack` | [`pack`] | Encode a directory tree into the three tables |
//! | `ssdb info` | [`info`] | Header fields and per-check validation status |
//! | `ssdb dump` | [`dump`] | Rows of one table |
//! | `ssdb check` | [`check`] | Structural and catalog checks across all three tables |
//!
//! The `wprintln!` macro wraps `writeln!` to convert `io::Error` into
//! `Db2Error`.

pub mod app;
pub mod check;
pub mod dump;
pub mod info;
pub mod pack;
pub mod unpack;

/// Write a line to the given writer, converting io::Error to Db2Error.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::Db2Error::Io(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::Db2Error::Io(e.to_string()))
    };
}

pub(crate) use wprintln;

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::app::TableKind;
use crate::wdb::schema::RecordKind;
use crate::Db2Error;

// Kept out of `app` because `build.rs` includes that file without the crate.
impl From<TableKind> for RecordKind {
    fn from(kind: TableKind) -> Self {
        match kind {
            TableKind::Package => RecordKind::Package,
            TableKind::Member => RecordKind::PackageMember,
            TableKind::Script => RecordKind::Script,
        }
    }
}

/// Install the global `tracing` subscriber, logging to stderr.
///
/// `verbose` maps 0/1/2+ to warn/debug/trace. A `RUST_LOG` value replaces
/// the default entirely. Calling this twice is harmless.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Serialize a report for `--json` output.
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, Db2Error> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Db2Error::Parse(format!("JSON serialization error: {}", e)))
}
