//! CLI implementation for the `ssdb check` subcommand.
//!
//! Decodes all three tables and resolves them into a catalog without writing
//! anything. Structural problems (bad headers, truncated sections, broken
//! script chains) fail the command. Member rows that cannot be placed and
//! script rows no chain reaches are listed as anomalies.

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{to_json, wprintln};
use crate::scene::catalog::Anomaly;
use crate::scene::mapper::{resolve_tables, SceneTables};
use crate::util::fs::read_table_set;
use crate::Db2Error;

/// Options for the `ssdb check` subcommand.
pub struct CheckOptions {
    /// Directory holding the three tables.
    pub tables: String,
    /// Output in JSON format.
    pub json: bool,
}

#[derive(Serialize)]
struct CheckReport {
    tables: String,
    package_rows: usize,
    member_rows: usize,
    script_rows: usize,
    packages: usize,
    members: usize,
    script_bytes: usize,
    anomalies: Vec<Anomaly>,
    clean: bool,
}

/// Decode and cross-check the three tables in a directory.
pub fn execute(opts: &CheckOptions, writer: &mut dyn Write) -> Result<(), Db2Error> {
    let set = read_table_set(Path::new(&opts.tables))?;
    let tables = SceneTables::decode(&set)?;
    let resolved = resolve_tables(&tables)?;

    let report = CheckReport {
        tables: opts.tables.clone(),
        package_rows: tables.packages.len(),
        member_rows: tables.members.len(),
        script_rows: tables.scripts.len(),
        packages: resolved.catalog.packages.len(),
        members: resolved.catalog.member_count(),
        script_bytes: resolved.catalog.script_bytes(),
        clean: resolved.anomalies.is_empty(),
        anomalies: resolved.anomalies,
    };

    if opts.json {
        wprintln!(writer, "{}", to_json(&report)?)?;
        return Ok(());
    }

    wprintln!(writer, "Checking {}", report.tables)?;
    wprintln!(writer, "  Package rows:  {}", report.package_rows)?;
    wprintln!(writer, "  Member rows:   {}", report.member_rows)?;
    wprintln!(writer, "  Script rows:   {}", report.script_rows)?;
    wprintln!(
        writer,
        "  Resolved:      {} packages, {} members, {} bytes of script",
        report.packages,
        report.members,
        report.script_bytes
    )?;
    wprintln!(writer)?;

    if report.clean {
        wprintln!(writer, "Status: {}", "PASS".green())?;
    } else {
        wprintln!(
            writer,
            "Status: {} ({} anomalies)",
            "WARN".yellow(),
            report.anomalies.len()
        )?;
        for anomaly in &report.anomalies {
            wprintln!(writer, "  {}", anomaly)?;
        }
    }
    Ok(())
}
