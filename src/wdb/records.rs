//! Typed rows of the three SceneScript tables.
//!
//! Each table has two representations:
//!
//! - a raw row ([`RawPackage`], [`RawPackageMember`], [`RawScript`]) that
//!   mirrors the fixed-size bytes of one row, with string columns as string
//!   block offsets;
//! - a domain record ([`Package`], [`PackageMember`], [`Script`]) that owns
//!   its strings and carries the row id from the trailing id array.
//!
//! [`Record`] ties the two together and names the table layout, so the
//! generic reader and writer can convert rows without per-table code.

use byteorder::{ByteOrder, LittleEndian};
use serde::{Serialize, Serializer};

use crate::wdb::schema::RecordKind;
use crate::wdb::strings::{StringBlock, StringBlockBuilder};
use crate::{Db2Error, FormatError};

/// Fixed-size binary projection of one row.
pub trait RawRow: Sized {
    /// Decode from a slice of exactly `row_size` bytes.
    fn parse(row: &[u8]) -> Self;
    /// Encode into a slice of exactly `row_size` bytes.
    fn write(&self, row: &mut [u8]);
}

/// A domain record stored in one DB2 table.
pub trait Record: Clone + Sized {
    type Raw: RawRow;

    /// Table kind; selects the layout used by the codec.
    const KIND: RecordKind;

    /// Row id (from the trailing id array).
    fn id(&self) -> u32;

    /// Copy of this record under another id (copy table semantics).
    fn with_id(&self, id: u32) -> Self;

    /// Build the record from its raw row, resolving strings against the block.
    fn from_raw(raw: &Self::Raw, strings: &StringBlock<'_>, id: u32) -> Result<Self, FormatError>;

    /// Build the raw row, appending string columns to `strings`.
    fn to_raw(&self, strings: &mut StringBlockBuilder) -> Result<Self::Raw, Db2Error>;
}

/// Narrow `value` to a u16 column that holds `bits` significant bits.
fn narrow(kind: RecordKind, field: &'static str, value: u32, bits: u32) -> Result<u16, Db2Error> {
    match u16::try_from(value) {
        Ok(v) if value >> bits == 0 => Ok(v),
        _ => Err(Db2Error::FieldOverflow {
            table: kind.schema().name,
            field,
            value,
            bits: bits.min(16),
        }),
    }
}

fn narrow_u16(kind: RecordKind, field: &'static str, value: u32) -> Result<u16, Db2Error> {
    narrow(kind, field, value, 16)
}

fn push_string(
    strings: &mut StringBlockBuilder,
    kind: RecordKind,
    field: &'static str,
    id: u32,
    bytes: &[u8],
) -> Result<u32, Db2Error> {
    if bytes.contains(&0) {
        return Err(Db2Error::InteriorNul {
            table: kind.schema().name,
            field,
            id,
        });
    }
    strings.push(bytes)
}

fn serialize_lossy<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(bytes))
}

// ── SceneScriptPackage ──────────────────────────────────────────────

/// Raw `SceneScriptPackage` row (4 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPackage {
    pub name: u32,
}

impl RawRow for RawPackage {
    fn parse(row: &[u8]) -> Self {
        RawPackage {
            name: LittleEndian::read_u32(&row[0..]),
        }
    }

    fn write(&self, row: &mut [u8]) {
        LittleEndian::write_u32(&mut row[0..], self.name);
    }
}

/// A scene script package: a named, ordered list of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub id: u32,
    pub name: String,
}

impl Record for Package {
    type Raw = RawPackage;
    const KIND: RecordKind = RecordKind::Package;

    fn id(&self) -> u32 {
        self.id
    }

    fn with_id(&self, id: u32) -> Self {
        Package { id, ..self.clone() }
    }

    fn from_raw(raw: &RawPackage, strings: &StringBlock<'_>, id: u32) -> Result<Self, FormatError> {
        Ok(Package {
            id,
            name: strings.get_string(raw.name)?,
        })
    }

    fn to_raw(&self, strings: &mut StringBlockBuilder) -> Result<RawPackage, Db2Error> {
        Ok(RawPackage {
            name: push_string(strings, Self::KIND, "name", self.id, self.name.as_bytes())?,
        })
    }
}

// ── SceneScriptPackageMember ────────────────────────────────────────

/// Raw `SceneScriptPackageMember` row (8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPackageMember {
    pub package: u16,
    pub script: u16,
    pub include: u16,
    pub sequence: u16,
}

impl RawRow for RawPackageMember {
    fn parse(row: &[u8]) -> Self {
        RawPackageMember {
            package: LittleEndian::read_u16(&row[0..]),
            script: LittleEndian::read_u16(&row[2..]),
            include: LittleEndian::read_u16(&row[4..]),
            sequence: LittleEndian::read_u16(&row[6..]),
        }
    }

    fn write(&self, row: &mut [u8]) {
        LittleEndian::write_u16(&mut row[0..], self.package);
        LittleEndian::write_u16(&mut row[2..], self.script);
        LittleEndian::write_u16(&mut row[4..], self.include);
        LittleEndian::write_u16(&mut row[6..], self.sequence);
    }
}

/// Width the field layout table declares for `sequence`. The raw column is
/// two bytes wide, but readers only trust the low 8 bits.
const SEQUENCE_BITS: u32 = 8;

/// What a package member points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLink {
    /// Head of a script fragment chain.
    Script(u32),
    /// Another package, included in place.
    Include(u32),
    /// Neither column set.
    Neither,
}

/// One entry of a package, ordered by `sequence`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMember {
    pub id: u32,
    /// Owning package id.
    pub package: u32,
    /// First script of the content chain, or 0.
    pub script: u32,
    /// Included package id, or 0.
    pub include: u32,
    /// Position within the package.
    pub sequence: u32,
}

impl PackageMember {
    /// Classify the member. A set script column wins over a set include column.
    pub fn link(&self) -> MemberLink {
        if self.script != 0 {
            MemberLink::Script(self.script)
        } else if self.include != 0 {
            MemberLink::Include(self.include)
        } else {
            MemberLink::Neither
        }
    }
}

impl Record for PackageMember {
    type Raw = RawPackageMember;
    const KIND: RecordKind = RecordKind::PackageMember;

    fn id(&self) -> u32 {
        self.id
    }

    fn with_id(&self, id: u32) -> Self {
        PackageMember { id, ..self.clone() }
    }

    fn from_raw(
        raw: &RawPackageMember,
        _strings: &StringBlock<'_>,
        id: u32,
    ) -> Result<Self, FormatError> {
        Ok(PackageMember {
            id,
            package: raw.package as u32,
            script: raw.script as u32,
            include: raw.include as u32,
            sequence: raw.sequence as u32,
        })
    }

    fn to_raw(&self, _strings: &mut StringBlockBuilder) -> Result<RawPackageMember, Db2Error> {
        Ok(RawPackageMember {
            package: narrow_u16(Self::KIND, "package", self.package)?,
            script: narrow_u16(Self::KIND, "script", self.script)?,
            include: narrow_u16(Self::KIND, "include", self.include)?,
            sequence: narrow(Self::KIND, "sequence", self.sequence, SEQUENCE_BITS)?,
        })
    }
}

// ── SceneScript ─────────────────────────────────────────────────────

/// Raw `SceneScript` row (12 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawScript {
    pub name: u32,
    pub content: u32,
    pub previous: u16,
    pub next: u16,
}

impl RawRow for RawScript {
    fn parse(row: &[u8]) -> Self {
        RawScript {
            name: LittleEndian::read_u32(&row[0..]),
            content: LittleEndian::read_u32(&row[4..]),
            previous: LittleEndian::read_u16(&row[8..]),
            next: LittleEndian::read_u16(&row[10..]),
        }
    }

    fn write(&self, row: &mut [u8]) {
        LittleEndian::write_u32(&mut row[0..], self.name);
        LittleEndian::write_u32(&mut row[4..], self.content);
        LittleEndian::write_u16(&mut row[8..], self.previous);
        LittleEndian::write_u16(&mut row[10..], self.next);
    }
}

/// One fragment of script text, linked to its neighbours by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    pub id: u32,
    pub name: String,
    /// Fragment bytes. Fragments split at byte positions, so a single
    /// fragment is not necessarily valid UTF-8.
    #[serde(serialize_with = "serialize_lossy")]
    pub content: Vec<u8>,
    /// Previous fragment id, or 0 for the first fragment.
    pub previous: u32,
    /// Next fragment id, or 0 for the last fragment.
    pub next: u32,
}

impl Record for Script {
    type Raw = RawScript;
    const KIND: RecordKind = RecordKind::Script;

    fn id(&self) -> u32 {
        self.id
    }

    fn with_id(&self, id: u32) -> Self {
        Script { id, ..self.clone() }
    }

    fn from_raw(raw: &RawScript, strings: &StringBlock<'_>, id: u32) -> Result<Self, FormatError> {
        Ok(Script {
            id,
            name: strings.get_string(raw.name)?,
            content: strings.get(raw.content)?.to_vec(),
            previous: raw.previous as u32,
            next: raw.next as u32,
        })
    }

    fn to_raw(&self, strings: &mut StringBlockBuilder) -> Result<RawScript, Db2Error> {
        let name = push_string(strings, Self::KIND, "name", self.id, self.name.as_bytes())?;
        let content = push_string(strings, Self::KIND, "content", self.id, &self.content)?;
        Ok(RawScript {
            name,
            content,
            previous: narrow_u16(Self::KIND, "previous", self.previous)?,
            next: narrow_u16(Self::KIND, "next", self.next)?,
        })
    }
}
