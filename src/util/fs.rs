//! Filesystem helpers for table directories.
//!
//! A table directory holds the three SceneScript tables under their client
//! file names ([`TableSchema::file_name`](crate::wdb::schema::TableSchema)).
//! Used by the `pack`, `unpack` and `check` subcommands.

use std::path::{Path, PathBuf};

use crate::scene::mapper::TableSet;
use crate::wdb::schema::RecordKind;
use crate::Db2Error;

/// Path of the table of `kind` inside `dir`.
pub fn table_path(dir: &Path, kind: RecordKind) -> PathBuf {
    dir.join(kind.schema().file_name)
}

/// Read a whole file, mapping failures to [`Db2Error::Io`] with the path.
pub fn read_file(path: &Path) -> Result<Vec<u8>, Db2Error> {
    std::fs::read(path)
        .map_err(|e| Db2Error::Io(format!("Cannot read {}: {}", path.display(), e)))
}

/// Read all three tables from `dir`.
pub fn read_table_set(dir: &Path) -> Result<TableSet, Db2Error> {
    let mut set = TableSet::default();
    for kind in RecordKind::ALL {
        *set.get_mut(kind) = read_file(&table_path(dir, kind))?;
    }
    Ok(set)
}

/// Write all three tables into `dir`, creating it if needed.
pub fn write_table_set(dir: &Path, set: &TableSet) -> Result<(), Db2Error> {
    std::fs::create_dir_all(dir)
        .map_err(|e| Db2Error::Io(format!("Cannot create {}: {}", dir.display(), e)))?;

    for kind in RecordKind::ALL {
        let path = table_path(dir, kind);
        std::fs::write(&path, set.get(kind))
            .map_err(|e| Db2Error::Io(format!("Cannot write {}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), bytes = set.get(kind).len(), "wrote table");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_table_path_uses_client_name() {
        let p = table_path(Path::new("/t"), RecordKind::PackageMember);
        assert!(p.ends_with("SceneScriptPackageMember.db2"));
    }

    #[test]
    fn test_write_then_read_set() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("DBFilesClient");
        let set = TableSet {
            packages: vec![1],
            members: vec![2, 2],
            scripts: vec![3, 3, 3],
        };
        write_table_set(&out, &set).unwrap();
        assert!(out.join("SceneScript.db2").is_file());
        assert_eq!(read_table_set(&out).unwrap(), set);
    }

    #[test]
    fn test_read_missing_table() {
        let dir = TempDir::new().unwrap();
        let err = read_table_set(dir.path()).unwrap_err();
        match err {
            Db2Error::Io(msg) => assert!(msg.contains("SceneScriptPackage.db2")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
