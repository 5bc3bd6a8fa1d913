//! CLI implementation for the `ssdb info` subcommand.
//!
//! Prints the WDB6 header of one table file, identifies the table by its
//! hash and reports each header check separately, so a file that fails
//! validation still shows everything that could be read.

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{to_json, wprintln};
use crate::util::fs::read_file;
use crate::wdb::constants::SIZE_DB2_HEADER;
use crate::wdb::header::{Db2Header, HeaderCheck};
use crate::wdb::schema::RecordKind;
use crate::{Db2Error, FormatError};

/// Options for the `ssdb info` subcommand.
pub struct InfoOptions {
    /// Path to the .db2 file.
    pub file: String,
    /// Output in JSON format.
    pub json: bool,
}

#[derive(Serialize)]
struct InfoReport {
    file: String,
    file_size: usize,
    table: Option<String>,
    header: Db2Header,
    flags: Vec<String>,
    checks: Vec<HeaderCheck>,
    valid: bool,
}

/// Show the header and validation status of a table file.
pub fn execute(opts: &InfoOptions, writer: &mut dyn Write) -> Result<(), Db2Error> {
    let data = read_file(Path::new(&opts.file))?;
    let header = Db2Header::parse(&data).ok_or_else(|| {
        Db2Error::format(
            "table",
            FormatError::Truncated {
                section: "header",
                needed: SIZE_DB2_HEADER,
                available: data.len(),
            },
        )
    })?;

    let kind = RecordKind::from_table_hash(header.table_hash);
    let checks = kind
        .map(|k| header.checks(k.schema()))
        .unwrap_or_default();
    let report = InfoReport {
        file: opts.file.clone(),
        file_size: data.len(),
        table: kind.map(|k| k.to_string()),
        flags: header.flag_names(),
        valid: kind.is_some() && checks.iter().all(|c| c.passed),
        header,
        checks,
    };

    if opts.json {
        wprintln!(writer, "{}", to_json(&report)?)?;
        return Ok(());
    }

    let h = &report.header;
    wprintln!(writer, "File: {} ({} bytes)", report.file, report.file_size)?;
    match &report.table {
        Some(name) => wprintln!(writer, "Table: {} (hash 0x{:08X})", name, h.table_hash)?,
        None => wprintln!(
            writer,
            "Table: {} (hash 0x{:08X})",
            "unknown".yellow(),
            h.table_hash
        )?,
    }
    wprintln!(writer)?;
    wprintln!(writer, "Header:")?;
    wprintln!(writer, "  Magic:             0x{:08X}", h.magic)?;
    wprintln!(writer, "  Rows:              {}", h.row_count)?;
    wprintln!(
        writer,
        "  Fields:            {} (total {})",
        h.field_count,
        h.total_field_count
    )?;
    wprintln!(writer, "  Row size:          {}", h.row_size)?;
    wprintln!(writer, "  String block:      {} bytes", h.string_table_size)?;
    wprintln!(writer, "  Layout hash:       {}", h.layout_hash)?;
    wprintln!(writer, "  Id range:          {}..={}", h.min_id, h.max_id)?;
    wprintln!(writer, "  Locale:            0x{:08X}", h.locale)?;
    wprintln!(writer, "  Copy table:        {} bytes", h.copy_table_size)?;
    wprintln!(
        writer,
        "  Flags:             0x{:04X} [{}]",
        h.flags,
        report.flags.join(", ")
    )?;
    wprintln!(writer, "  Id index:          {}", h.id_index)?;
    wprintln!(writer, "  Common data:       {} bytes", h.common_data_table_size)?;

    if report.table.is_none() {
        return Ok(());
    }

    wprintln!(writer)?;
    wprintln!(writer, "Checks:")?;
    for check in &report.checks {
        let status = if check.passed {
            "PASS".green().to_string()
        } else {
            "FAIL".red().to_string()
        };
        match &check.message {
            Some(msg) => wprintln!(writer, "  {:<14} {}  {}", check.kind, status, msg)?,
            None => wprintln!(writer, "  {:<14} {}", check.kind, status)?,
        }
    }

    Ok(())
}
