//! Table layout descriptors.
//!
//! A [`TableSchema`] carries everything the codec needs to know about one
//! table kind: raw row size, the stored column layout, and the two hashes
//! that pin a file to this exact layout. Schemas are plain values handed to
//! [`TableReader::open`](crate::wdb::reader::TableReader::open) and
//! [`TableWriter::new`](crate::wdb::writer::TableWriter::new); the codec itself
//! has no per-table knowledge.

use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::wdb::constants::*;

/// Storage of one column inside the raw row: width code and byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldStorage {
    /// Width code; the column holds `32 - size_code` bits.
    pub size_code: u16,
    /// Byte offset of the column within the row.
    pub offset: u16,
}

impl FieldStorage {
    pub const fn new(size_code: u16, offset: u16) -> Self {
        FieldStorage { size_code, offset }
    }

    /// Number of bits the column occupies.
    pub fn bits(&self) -> u32 {
        32 - self.size_code as u32
    }
}

/// The three SceneScript table kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RecordKind {
    Package,
    PackageMember,
    Script,
}

impl RecordKind {
    /// All kinds, in the order their files are conventionally processed.
    pub const ALL: [RecordKind; 3] = [
        RecordKind::Package,
        RecordKind::PackageMember,
        RecordKind::Script,
    ];

    /// Layout descriptor for this kind.
    pub fn schema(self) -> &'static TableSchema {
        match self {
            RecordKind::Package => &SCENE_SCRIPT_PACKAGE,
            RecordKind::PackageMember => &SCENE_SCRIPT_PACKAGE_MEMBER,
            RecordKind::Script => &SCENE_SCRIPT,
        }
    }

    /// Identify a table kind from the `table_hash` header field.
    pub fn from_table_hash(hash: u32) -> Option<Self> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.schema().table_hash == hash)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.schema().name)
    }
}

/// Immutable layout descriptor of one table kind.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    /// Table name as used by the client, e.g. `SceneScript`.
    pub name: &'static str,
    /// File name inside the table directory.
    pub file_name: &'static str,
    /// Which record kind this layout belongs to.
    pub kind: RecordKind,
    /// Size of one raw row in bytes.
    pub row_size: u32,
    /// Column count including the id column.
    pub field_count: u32,
    /// Stored columns (the id column is excluded because ids trail the rows).
    pub fields: &'static [FieldStorage],
    /// Table identity hash.
    pub table_hash: u32,
    /// Layout hash; any column change produces a new value.
    pub layout_hash: u32,
}

impl TableSchema {
    /// Number of entries in the field layout table written by the encoder.
    pub fn stored_field_count(&self) -> u32 {
        self.field_count - 1
    }

    /// Serialize the field layout table (`size_code`, `offset` per column).
    pub fn layout_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.fields.len() * SIZE_FIELD_ENTRY];
        for (i, field) in self.fields.iter().enumerate() {
            let at = i * SIZE_FIELD_ENTRY;
            LittleEndian::write_u16(&mut buf[at..], field.size_code);
            LittleEndian::write_u16(&mut buf[at + 2..], field.offset);
        }
        buf
    }
}

pub static SCENE_SCRIPT_PACKAGE: TableSchema = TableSchema {
    name: "SceneScriptPackage",
    file_name: "SceneScriptPackage.db2",
    kind: RecordKind::Package,
    row_size: 4,
    field_count: 2,
    fields: &[FieldStorage::new(FIELD_SIZE_32, 0)],
    table_hash: 0xE8CB_5E09,
    layout_hash: 956_619_678,
};

pub static SCENE_SCRIPT_PACKAGE_MEMBER: TableSchema = TableSchema {
    name: "SceneScriptPackageMember",
    file_name: "SceneScriptPackageMember.db2",
    kind: RecordKind::PackageMember,
    row_size: 8,
    field_count: 5,
    fields: &[
        FieldStorage::new(FIELD_SIZE_16, 0), // package
        FieldStorage::new(FIELD_SIZE_16, 2), // script
        FieldStorage::new(FIELD_SIZE_16, 4), // include
        FieldStorage::new(FIELD_SIZE_8, 6),  // sequence
    ],
    table_hash: 0xE44D_B71C,
    layout_hash: 275_693_289,
};

pub static SCENE_SCRIPT: TableSchema = TableSchema {
    name: "SceneScript",
    file_name: "SceneScript.db2",
    kind: RecordKind::Script,
    row_size: 12,
    field_count: 5,
    fields: &[
        FieldStorage::new(FIELD_SIZE_32, 0), // name
        FieldStorage::new(FIELD_SIZE_32, 4), // content
        FieldStorage::new(FIELD_SIZE_16, 8), // previous
        FieldStorage::new(FIELD_SIZE_16, 10), // next
    ],
    table_hash: 0xD4B1_63CC,
    layout_hash: 1_240_380_216,
};
