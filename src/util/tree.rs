//! Directory tree projection of a [`Catalog`].
//!
//! ```text
//! <root>/by id/<package id>/name.txt           package name
//! <root>/by id/<package id>/id.txt             package id
//! <root>/by id/<package id>/<seq>.<name>.lua   script member source
//! <root>/by id/<package id>/<seq>.<name>.inc   symlink to ../<included id>
//! <root>/by name/<name>                        symlink to ../by id/<package id>
//! ```
//!
//! [`export_tree`] writes this layout; [`import_tree`] reads it back from the
//! `by id` half only, so the `by name` links are purely a browsing aid.
//! Symlink targets are relative, which keeps a tree valid after it is moved.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scene::catalog::{Catalog, CatalogMember, CatalogPackage, MemberBody};
use crate::Db2Error;

pub const BY_ID_DIR: &str = "by id";
pub const BY_NAME_DIR: &str = "by name";
pub const NAME_FILE: &str = "name.txt";
pub const ID_FILE: &str = "id.txt";
pub const SCRIPT_EXT: &str = "lua";
pub const INCLUDE_EXT: &str = "inc";

/// Counts of what [`export_tree`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    pub packages: usize,
    pub scripts: usize,
    pub includes: usize,
    pub name_links: usize,
    /// `by name` links skipped because another package already took the name.
    pub name_collisions: usize,
}

/// Make a name usable as a single path component: `/` becomes `,` and an
/// empty name becomes `_`.
pub fn sanitize_name(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    name.replace('/', ",")
}

fn io_err(action: &str, path: &Path, e: io::Error) -> Db2Error {
    Db2Error::Io(format!("Cannot {} {}: {}", action, path.display(), e))
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

fn member_file_name(sequence: u32, member: &CatalogMember) -> String {
    let ext = match member.body {
        MemberBody::Script(_) => SCRIPT_EXT,
        MemberBody::Include(_) => INCLUDE_EXT,
    };
    format!("{}.{}.{}", sequence, sanitize_name(&member.name), ext)
}

/// Write `catalog` as a tree under `root`.
///
/// `root` may exist, but must not already contain a `by id` directory.
pub fn export_tree(root: &Path, catalog: &Catalog) -> Result<TreeStats, Db2Error> {
    let by_id = root.join(BY_ID_DIR);
    let by_name = root.join(BY_NAME_DIR);
    if by_id.exists() {
        return Err(Db2Error::Argument(format!(
            "{} already exists; refusing to overwrite",
            by_id.display()
        )));
    }
    fs::create_dir_all(&by_id).map_err(|e| io_err("create", &by_id, e))?;
    fs::create_dir_all(&by_name).map_err(|e| io_err("create", &by_name, e))?;

    let mut stats = TreeStats::default();
    for (&id, package) in &catalog.packages {
        let dir = by_id.join(id.to_string());
        fs::create_dir(&dir).map_err(|e| io_err("create", &dir, e))?;

        let name_path = dir.join(NAME_FILE);
        fs::write(&name_path, package.name.as_bytes()).map_err(|e| io_err("write", &name_path, e))?;
        let id_path = dir.join(ID_FILE);
        fs::write(&id_path, id.to_string()).map_err(|e| io_err("write", &id_path, e))?;

        for (&sequence, member) in &package.members {
            let path = dir.join(member_file_name(sequence, member));
            match &member.body {
                MemberBody::Script(content) => {
                    fs::write(&path, content).map_err(|e| io_err("write", &path, e))?;
                    stats.scripts += 1;
                }
                MemberBody::Include(target) => {
                    let rel = Path::new("..").join(target.to_string());
                    symlink_dir(&rel, &path).map_err(|e| io_err("link", &path, e))?;
                    stats.includes += 1;
                }
            }
        }

        let link = by_name.join(sanitize_name(&package.name));
        if link.symlink_metadata().is_ok() {
            tracing::warn!(
                package = id,
                name = %package.name,
                "by-name link already taken, skipping"
            );
            stats.name_collisions += 1;
        } else {
            let rel = Path::new("..").join(BY_ID_DIR).join(id.to_string());
            symlink_dir(&rel, &link).map_err(|e| io_err("link", &link, e))?;
            stats.name_links += 1;
        }
        stats.packages += 1;
    }

    tracing::debug!(root = %root.display(), packages = stats.packages, "exported tree");
    Ok(stats)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, Db2Error> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| io_err("read", dir, e))? {
        let entry = entry.map_err(|e| io_err("read", dir, e))?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split a member file stem `<seq>.<name>` into its parts.
fn parse_member_stem(path: &Path) -> Result<Option<(u32, String)>, Db2Error> {
    let stem = match path.file_stem() {
        Some(s) if !s.is_empty() => s.to_string_lossy().into_owned(),
        _ => return Ok(None),
    };
    let (seq, name) = stem.split_once('.').ok_or_else(|| {
        Db2Error::Parse(format!(
            "{}: member file name must be <sequence>.<name>.<ext>",
            path.display()
        ))
    })?;
    let seq = seq.parse::<u32>().map_err(|_| {
        Db2Error::Parse(format!("{}: bad sequence number '{}'", path.display(), seq))
    })?;
    Ok(Some((seq, name.to_string())))
}

fn read_include_target(path: &Path) -> Result<u32, Db2Error> {
    let target = fs::read_link(path).map_err(|e| io_err("read link", path, e))?;
    let last = file_name(&target);
    last.parse::<u32>().map_err(|_| {
        Db2Error::Parse(format!(
            "{}: link target {} is not a package id",
            path.display(),
            target.display()
        ))
    })
}

fn import_package(dir: &Path) -> Result<CatalogPackage, Db2Error> {
    let name_path = dir.join(NAME_FILE);
    let raw = fs::read(&name_path).map_err(|e| io_err("read", &name_path, e))?;
    let text = String::from_utf8_lossy(&raw);
    let name = text.lines().next().unwrap_or("").to_string();

    let mut package = CatalogPackage {
        name,
        ..Default::default()
    };

    for path in sorted_entries(dir)? {
        let body = match path.extension().and_then(|e| e.to_str()) {
            Some(SCRIPT_EXT) => None,
            Some(INCLUDE_EXT) => Some(read_include_target(&path)?),
            _ => continue,
        };
        let Some((sequence, name)) = parse_member_stem(&path)? else {
            continue;
        };
        let body = match body {
            Some(target) => MemberBody::Include(target),
            None => MemberBody::Script(fs::read(&path).map_err(|e| io_err("read", &path, e))?),
        };
        if package.members.contains_key(&sequence) {
            return Err(Db2Error::Parse(format!(
                "{}: sequence {} used by more than one member",
                path.display(),
                sequence
            )));
        }
        package.members.insert(sequence, CatalogMember { name, body });
    }
    Ok(package)
}

/// Read a catalog from the `by id` half of a tree under `root`.
pub fn import_tree(root: &Path) -> Result<Catalog, Db2Error> {
    let by_id = root.join(BY_ID_DIR);
    let mut catalog = Catalog::new();

    for dir in sorted_entries(&by_id)? {
        if !dir.is_dir() {
            tracing::debug!(path = %dir.display(), "ignoring non-directory entry");
            continue;
        }
        let dir_name = file_name(&dir);
        let id = dir_name.parse::<u32>().map_err(|_| {
            Db2Error::Parse(format!(
                "{}: package directory name is not a numeric id",
                dir.display()
            ))
        })?;
        let package = import_package(&dir)?;
        catalog.packages.insert(id, package);
    }

    tracing::debug!(
        root = %root.display(),
        packages = catalog.packages.len(),
        members = catalog.member_count(),
        "imported tree"
    );
    Ok(catalog)
}
