//! CLI implementation for the `ssdb unpack` subcommand.
//!
//! Reads `SceneScriptPackage.db2`, `SceneScriptPackageMember.db2` and
//! `SceneScript.db2` from a table directory, resolves them into a catalog and
//! writes it out as a `by id` / `by name` tree. Everything is decoded and
//! resolved before the first directory is created.

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::cli::{to_json, wprintln};
use crate::scene::catalog::Anomaly;
use crate::scene::mapper::{resolve_tables, SceneTables};
use crate::util::fs::read_table_set;
use crate::util::tree::{export_tree, TreeStats};
use crate::Db2Error;

/// Options for the `ssdb unpack` subcommand.
pub struct UnpackOptions {
    /// Directory holding the three tables.
    pub tables: String,
    /// Tree root to create.
    pub tree: String,
    /// Output a JSON summary.
    pub json: bool,
}

#[derive(Serialize)]
struct UnpackReport {
    tables: String,
    tree: String,
    #[serde(flatten)]
    stats: TreeStats,
    anomalies: Vec<Anomaly>,
}

/// Decode the tables in `opts.tables` into a tree at `opts.tree`.
pub fn execute(opts: &UnpackOptions, writer: &mut dyn Write) -> Result<(), Db2Error> {
    let set = read_table_set(Path::new(&opts.tables))?;
    let tables = SceneTables::decode(&set)?;
    let resolved = resolve_tables(&tables)?;
    let stats = export_tree(Path::new(&opts.tree), &resolved.catalog)?;

    let report = UnpackReport {
        tables: opts.tables.clone(),
        tree: opts.tree.clone(),
        stats,
        anomalies: resolved.anomalies,
    };

    if opts.json {
        wprintln!(writer, "{}", to_json(&report)?)?;
        return Ok(());
    }

    wprintln!(writer, "Unpacked {} -> {}", report.tables, report.tree)?;
    wprintln!(writer, "  Packages:       {}", stats.packages)?;
    wprintln!(writer, "  Scripts:        {}", stats.scripts)?;
    wprintln!(writer, "  Includes:       {}", stats.includes)?;
    wprintln!(writer, "  By-name links:  {}", stats.name_links)?;
    if stats.name_collisions > 0 {
        wprintln!(
            writer,
            "  Name collisions: {}",
            stats.name_collisions.to_string().yellow()
        )?;
    }
    if !report.anomalies.is_empty() {
        wprintln!(
            writer,
            "  Skipped rows:   {}",
            report.anomalies.len().to_string().yellow()
        )?;
        for anomaly in &report.anomalies {
            wprintln!(writer, "    {}", anomaly)?;
        }
    }
    Ok(())
}
