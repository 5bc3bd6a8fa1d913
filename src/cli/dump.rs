//! CLI implementation for the `ssdb dump` subcommand.
//!
//! Decodes one table file (copy table entries included) and prints every row.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::cli::app::TableKind;
use crate::cli::{to_json, wprintln};
use crate::util::fs::read_file;
use crate::wdb::header::Db2Header;
use crate::wdb::reader::read_table;
use crate::wdb::records::{Package, PackageMember, Script};
use crate::wdb::schema::RecordKind;
use crate::Db2Error;

/// Options for the `ssdb dump` subcommand.
pub struct DumpOptions {
    /// Path to the .db2 file.
    pub file: String,
    /// Table kind; detected from the header table hash when `None`.
    pub kind: Option<TableKind>,
    /// Output in JSON format.
    pub json: bool,
}

#[derive(Serialize)]
struct DumpReport<'a, R> {
    table: &'static str,
    rows: &'a [R],
}

fn detect_kind(data: &[u8], file: &str) -> Result<RecordKind, Db2Error> {
    Db2Header::parse(data)
        .and_then(|h| RecordKind::from_table_hash(h.table_hash))
        .ok_or_else(|| {
            Db2Error::Argument(format!(
                "{}: unknown table hash; pass --kind to choose a layout",
                file
            ))
        })
}

/// Print the rows of one table.
pub fn execute(opts: &DumpOptions, writer: &mut dyn Write) -> Result<(), Db2Error> {
    let data = read_file(Path::new(&opts.file))?;
    let kind = match opts.kind {
        Some(k) => RecordKind::from(k),
        None => detect_kind(&data, &opts.file)?,
    };
    let table = kind.schema().name;

    match kind {
        RecordKind::Package => {
            let rows: Vec<Package> = read_table(&data)?;
            if opts.json {
                return emit_json(writer, table, &rows);
            }
            wprintln!(writer, "{} ({} rows)", table, rows.len())?;
            wprintln!(writer, "  {:>6}  {}", "ID", "Name")?;
            for p in &rows {
                wprintln!(writer, "  {:>6}  {}", p.id, p.name)?;
            }
        }
        RecordKind::PackageMember => {
            let rows: Vec<PackageMember> = read_table(&data)?;
            if opts.json {
                return emit_json(writer, table, &rows);
            }
            wprintln!(writer, "{} ({} rows)", table, rows.len())?;
            wprintln!(
                writer,
                "  {:>6} {:>8} {:>8} {:>8} {:>8}",
                "ID",
                "Package",
                "Script",
                "Include",
                "Seq"
            )?;
            for m in &rows {
                wprintln!(
                    writer,
                    "  {:>6} {:>8} {:>8} {:>8} {:>8}",
                    m.id,
                    m.package,
                    m.script,
                    m.include,
                    m.sequence
                )?;
            }
        }
        RecordKind::Script => {
            let rows: Vec<Script> = read_table(&data)?;
            if opts.json {
                return emit_json(writer, table, &rows);
            }
            wprintln!(writer, "{} ({} rows)", table, rows.len())?;
            wprintln!(
                writer,
                "  {:>6} {:>6} {:>6} {:>6}  {}",
                "ID",
                "Prev",
                "Next",
                "Bytes",
                "Name"
            )?;
            for s in &rows {
                wprintln!(
                    writer,
                    "  {:>6} {:>6} {:>6} {:>6}  {}",
                    s.id,
                    s.previous,
                    s.next,
                    s.content.len(),
                    s.name
                )?;
            }
        }
    }
    Ok(())
}

fn emit_json<R: Serialize>(
    writer: &mut dyn Write,
    table: &'static str,
    rows: &[R],
) -> Result<(), Db2Error> {
    wprintln!(writer, "{}", to_json(&DumpReport { table, rows })?)
}
