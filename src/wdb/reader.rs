//! Table decoding.
//!
//! A WDB6 buffer is laid out as:
//!
//! ```text
//! header (56) | field layout (field_count * 4) | rows (row_count * row_size)
//!             | string block (string_table_size) | ids (row_count * 4)
//!             | copy table (copy_table_size, 8-byte entries)
//! ```
//!
//! [`TableReader::open`] validates the header against a [`TableSchema`] and
//! slices the buffer into those sections, bounds-checking each one. Nothing is
//! copied until [`TableReader::records`] converts rows into owned records.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::wdb::constants::*;
use crate::wdb::header::Db2Header;
use crate::wdb::records::{RawRow, Record};
use crate::wdb::schema::TableSchema;
use crate::wdb::strings::StringBlock;
use crate::{Db2Error, FormatError};

/// One copy table entry: row `new_id` duplicates row `source_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CopyEntry {
    pub new_id: u32,
    pub source_id: u32,
}

/// Validated view over one table buffer.
#[derive(Debug)]
pub struct TableReader<'a> {
    schema: &'a TableSchema,
    header: Db2Header,
    rows: &'a [u8],
    strings: StringBlock<'a>,
    ids: &'a [u8],
    copies: &'a [u8],
}

/// Slice `len` bytes at `offset`, or report which section is cut short.
fn section<'a>(
    data: &'a [u8],
    offset: usize,
    len: Option<usize>,
    name: &'static str,
) -> Result<&'a [u8], FormatError> {
    let end = len.and_then(|l| offset.checked_add(l));
    match end {
        Some(end) if end <= data.len() => Ok(&data[offset..end]),
        _ => Err(FormatError::Truncated {
            section: name,
            needed: end.unwrap_or(usize::MAX),
            available: data.len(),
        }),
    }
}

impl<'a> TableReader<'a> {
    /// Validate the header of `data` against `schema` and locate every section.
    pub fn open(data: &'a [u8], schema: &'a TableSchema) -> Result<Self, Db2Error> {
        let fail = |e| Db2Error::format(schema.name, e);

        let header = Db2Header::parse(data).ok_or_else(|| {
            fail(FormatError::Truncated {
                section: "header",
                needed: SIZE_DB2_HEADER,
                available: data.len(),
            })
        })?;
        header.validate(schema).map_err(fail)?;

        if header.copy_table_size as usize % SIZE_COPY_ENTRY != 0 {
            return Err(fail(FormatError::MisalignedCopyTable(
                header.copy_table_size,
            )));
        }

        let row_count = header.row_count as usize;
        let mut offset = header.rows_offset();

        let rows_len = row_count.checked_mul(header.row_size as usize);
        let rows = section(data, offset, rows_len, "rows").map_err(fail)?;
        offset += rows.len();

        let strings = section(
            data,
            offset,
            Some(header.string_table_size as usize),
            "string block",
        )
        .map_err(fail)?;
        offset += strings.len();

        let ids_len = row_count.checked_mul(SIZE_ID_ENTRY);
        let ids = section(data, offset, ids_len, "id array").map_err(fail)?;
        offset += ids.len();

        let copies = section(
            data,
            offset,
            Some(header.copy_table_size as usize),
            "copy table",
        )
        .map_err(fail)?;
        offset += copies.len();

        if offset < data.len() {
            tracing::debug!(
                table = schema.name,
                trailing = data.len() - offset,
                "ignoring bytes after copy table"
            );
        }

        Ok(TableReader {
            schema,
            header,
            rows,
            strings: StringBlock::new(strings),
            ids,
            copies,
        })
    }

    pub fn header(&self) -> &Db2Header {
        &self.header
    }

    pub fn row_count(&self) -> usize {
        self.header.row_count as usize
    }

    /// Raw bytes of row `index`. Panics if `index >= row_count()`.
    pub fn raw_row(&self, index: usize) -> &'a [u8] {
        let size = self.header.row_size as usize;
        &self.rows[index * size..(index + 1) * size]
    }

    /// Id of row `index` from the trailing id array.
    pub fn row_id(&self, index: usize) -> u32 {
        LittleEndian::read_u32(&self.ids[index * SIZE_ID_ENTRY..])
    }

    pub fn strings(&self) -> StringBlock<'a> {
        self.strings
    }

    /// Entries of the copy table, in file order.
    pub fn copy_entries(&self) -> impl Iterator<Item = CopyEntry> + 'a {
        self.copies.chunks_exact(SIZE_COPY_ENTRY).map(|e| CopyEntry {
            new_id: LittleEndian::read_u32(&e[0..]),
            source_id: LittleEndian::read_u32(&e[4..]),
        })
    }

    /// Decode every row into `R`, then append copy table duplicates.
    ///
    /// Copy sources are looked up by a linear scan over the records decoded so
    /// far, including earlier copies, so a copy may itself be copied.
    pub fn records<R: Record>(&self) -> Result<Vec<R>, Db2Error> {
        if R::KIND != self.schema.kind {
            return Err(Db2Error::Argument(format!(
                "{} rows cannot be read from a {} table",
                R::KIND,
                self.schema.name
            )));
        }

        let copy_count = self.copies.len() / SIZE_COPY_ENTRY;
        let mut records = Vec::with_capacity(self.row_count() + copy_count);

        for i in 0..self.row_count() {
            let raw = R::Raw::parse(self.raw_row(i));
            let record = R::from_raw(&raw, &self.strings, self.row_id(i))
                .map_err(|e| Db2Error::format(self.schema.name, e))?;
            records.push(record);
        }

        for entry in self.copy_entries() {
            let copy = records
                .iter()
                .find(|r| r.id() == entry.source_id)
                .map(|r| r.with_id(entry.new_id))
                .ok_or(Db2Error::DanglingCopySource {
                    table: self.schema.name,
                    new_id: entry.new_id,
                    source_id: entry.source_id,
                })?;
            records.push(copy);
        }

        tracing::debug!(
            table = self.schema.name,
            rows = self.row_count(),
            copies = copy_count,
            strings = self.strings.len(),
            "decoded table"
        );

        Ok(records)
    }
}

/// Decode a complete table of `R` records.
pub fn read_table<R: Record>(data: &[u8]) -> Result<Vec<R>, Db2Error> {
    TableReader::open(data, R::KIND.schema())?.records()
}
