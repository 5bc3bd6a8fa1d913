//! CLI implementation for the `ssdb pack` subcommand.
//!
//! Reads a `by id` tree, assigns fresh member and script ids, splits script
//! source into fragments and writes the three tables. All three buffers are
//! encoded before any file is written.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::cli::{to_json, wprintln};
use crate::scene::mapper::{build_tables, PackConfig};
use crate::util::fs::{table_path, write_table_set};
use crate::util::tree::import_tree;
use crate::wdb::schema::RecordKind;
use crate::Db2Error;

/// Options for the `ssdb pack` subcommand.
pub struct PackOptions {
    /// Tree root (containing `by id`).
    pub tree: String,
    /// Directory to write the tables to.
    pub tables: String,
    /// Maximum bytes of script source per `SceneScript` row.
    pub fragment_len: usize,
    /// Output a JSON summary.
    pub json: bool,
}

#[derive(Serialize)]
struct TableFile {
    table: &'static str,
    path: String,
    rows: usize,
    bytes: usize,
}

#[derive(Serialize)]
struct PackReport {
    tree: String,
    packages: usize,
    members: usize,
    script_bytes: usize,
    files: Vec<TableFile>,
}

/// Encode the tree at `opts.tree` into tables under `opts.tables`.
pub fn execute(opts: &PackOptions, writer: &mut dyn Write) -> Result<(), Db2Error> {
    let catalog = import_tree(Path::new(&opts.tree))?;
    let config = PackConfig {
        fragment_len: opts.fragment_len,
    };
    let tables = build_tables(&catalog, &config)?;
    let set = tables.encode()?;

    let dir = Path::new(&opts.tables);
    write_table_set(dir, &set)?;

    let files = RecordKind::ALL
        .into_iter()
        .map(|kind| TableFile {
            table: kind.schema().name,
            path: table_path(dir, kind).display().to_string(),
            rows: match kind {
                RecordKind::Package => tables.packages.len(),
                RecordKind::PackageMember => tables.members.len(),
                RecordKind::Script => tables.scripts.len(),
            },
            bytes: set.get(kind).len(),
        })
        .collect();
    let report = PackReport {
        tree: opts.tree.clone(),
        packages: catalog.packages.len(),
        members: catalog.member_count(),
        script_bytes: catalog.script_bytes(),
        files,
    };

    if opts.json {
        wprintln!(writer, "{}", to_json(&report)?)?;
        return Ok(());
    }

    wprintln!(
        writer,
        "Packed {} ({} packages, {} members, {} bytes of script)",
        report.tree,
        report.packages,
        report.members,
        report.script_bytes
    )?;
    for f in &report.files {
        wprintln!(
            writer,
            "  {:<28} {:>6} rows {:>10} bytes",
            f.table,
            f.rows,
            f.bytes
        )?;
    }
    Ok(())
}
