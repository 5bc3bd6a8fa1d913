//! WDB6 table header parsing and validation.
//!
//! Every table buffer starts with the 56-byte [`Db2Header`]. It gives the row
//! count and size, the byte sizes of the string block and copy table, the
//! flags that decide whether row ids trail the string block, and the two
//! hashes identifying the table and its column layout.
//!
//! [`Db2Header::validate`] checks a header against a [`TableSchema`]. Each
//! check fails with its own [`FormatError`] variant, and
//! [`Db2Header::checks`] reports all of them at once for `ssdb info`.

use byteorder::{ByteOrder, LittleEndian};
use serde::Serialize;

use crate::wdb::constants::*;
use crate::wdb::schema::TableSchema;
use crate::FormatError;

/// Parsed WDB6 header (56 bytes at the start of every table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Db2Header {
    /// Magic, read as a little-endian u32. Bytes 0-3.
    pub magic: u32,
    /// Number of rows in the row array. Bytes 4-7.
    pub row_count: u32,
    /// Number of entries in the field layout table. Bytes 8-11.
    pub field_count: u32,
    /// Size of one row in bytes. Bytes 12-15.
    pub row_size: u32,
    /// Size of the string block in bytes. Bytes 16-19.
    pub string_table_size: u32,
    /// Table identity hash. Bytes 20-23.
    pub table_hash: u32,
    /// Column layout hash. Bytes 24-27.
    pub layout_hash: u32,
    /// Lowest row id at encode time. Bytes 28-31.
    pub min_id: u32,
    /// Highest row id at encode time. Bytes 32-35.
    pub max_id: u32,
    /// Locale mask. Bytes 36-39.
    pub locale: u32,
    /// Size of the copy table in bytes. Bytes 40-43.
    pub copy_table_size: u32,
    /// Flag bits. Bytes 44-45.
    pub flags: u16,
    /// Index of the id column, unused when ids trail. Bytes 46-47.
    pub id_index: u16,
    /// Field count including common data columns. Bytes 48-51.
    pub total_field_count: u32,
    /// Size of the common data block. Bytes 52-55.
    pub common_data_table_size: u32,
}

/// Kind of header check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderCheckKind {
    Magic,
    CommonData,
    Flags,
    RowSize,
    LayoutHash,
}

impl std::fmt::Display for HeaderCheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            HeaderCheckKind::Magic => "magic",
            HeaderCheckKind::CommonData => "common_data",
            HeaderCheckKind::Flags => "flags",
            HeaderCheckKind::RowSize => "row_size",
            HeaderCheckKind::LayoutHash => "layout_hash",
        })
    }
}

/// Outcome of one header check.
#[derive(Debug, Clone, Serialize)]
pub struct HeaderCheck {
    pub kind: HeaderCheckKind,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Db2Header {
    /// Parse a header from the start of a table buffer.
    ///
    /// Returns `None` if `data` is shorter than 56 bytes. Field values are not
    /// validated; use [`validate`](Self::validate) for that.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < SIZE_DB2_HEADER {
            return None;
        }

        Some(Db2Header {
            magic: LittleEndian::read_u32(&data[DB2_MAGIC_OFFSET..]),
            row_count: LittleEndian::read_u32(&data[DB2_ROW_COUNT..]),
            field_count: LittleEndian::read_u32(&data[DB2_FIELD_COUNT..]),
            row_size: LittleEndian::read_u32(&data[DB2_ROW_SIZE..]),
            string_table_size: LittleEndian::read_u32(&data[DB2_STRING_TABLE_SIZE..]),
            table_hash: LittleEndian::read_u32(&data[DB2_TABLE_HASH..]),
            layout_hash: LittleEndian::read_u32(&data[DB2_LAYOUT_HASH..]),
            min_id: LittleEndian::read_u32(&data[DB2_MIN_ID..]),
            max_id: LittleEndian::read_u32(&data[DB2_MAX_ID..]),
            locale: LittleEndian::read_u32(&data[DB2_LOCALE..]),
            copy_table_size: LittleEndian::read_u32(&data[DB2_COPY_TABLE_SIZE..]),
            flags: LittleEndian::read_u16(&data[DB2_FLAGS..]),
            id_index: LittleEndian::read_u16(&data[DB2_ID_INDEX..]),
            total_field_count: LittleEndian::read_u32(&data[DB2_TOTAL_FIELD_COUNT..]),
            common_data_table_size: LittleEndian::read_u32(&data[DB2_COMMON_DATA_TABLE_SIZE..]),
        })
    }

    /// Write the header into the first 56 bytes of `buf`.
    pub fn write(&self, buf: &mut [u8]) {
        LittleEndian::write_u32(&mut buf[DB2_MAGIC_OFFSET..], self.magic);
        LittleEndian::write_u32(&mut buf[DB2_ROW_COUNT..], self.row_count);
        LittleEndian::write_u32(&mut buf[DB2_FIELD_COUNT..], self.field_count);
        LittleEndian::write_u32(&mut buf[DB2_ROW_SIZE..], self.row_size);
        LittleEndian::write_u32(&mut buf[DB2_STRING_TABLE_SIZE..], self.string_table_size);
        LittleEndian::write_u32(&mut buf[DB2_TABLE_HASH..], self.table_hash);
        LittleEndian::write_u32(&mut buf[DB2_LAYOUT_HASH..], self.layout_hash);
        LittleEndian::write_u32(&mut buf[DB2_MIN_ID..], self.min_id);
        LittleEndian::write_u32(&mut buf[DB2_MAX_ID..], self.max_id);
        LittleEndian::write_u32(&mut buf[DB2_LOCALE..], self.locale);
        LittleEndian::write_u32(&mut buf[DB2_COPY_TABLE_SIZE..], self.copy_table_size);
        LittleEndian::write_u16(&mut buf[DB2_FLAGS..], self.flags);
        LittleEndian::write_u16(&mut buf[DB2_ID_INDEX..], self.id_index);
        LittleEndian::write_u32(&mut buf[DB2_TOTAL_FIELD_COUNT..], self.total_field_count);
        LittleEndian::write_u32(
            &mut buf[DB2_COMMON_DATA_TABLE_SIZE..],
            self.common_data_table_size,
        );
    }

    /// Returns true if row ids are stored as an array after the string block.
    pub fn has_trailing_ids(&self) -> bool {
        self.flags & DB2_FLAG_IDS_TRAILING != 0
    }

    /// Names of the set flag bits, for display.
    pub fn flag_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for bit in 0..16 {
            let mask = 1u16 << bit;
            if self.flags & mask == 0 {
                continue;
            }
            names.push(match mask {
                DB2_FLAG_OFFSET_MAP => "offset_map".to_string(),
                DB2_FLAG_IDS_TRAILING => "ids_trailing".to_string(),
                other => format!("0x{:04x}", other),
            });
        }
        names
    }

    /// Byte offset of the first row (after the header and field layout table).
    pub fn rows_offset(&self) -> usize {
        SIZE_DB2_HEADER + self.field_count as usize * SIZE_FIELD_ENTRY
    }

    /// Validate the header against a table layout.
    ///
    /// Checks run in a fixed order (magic, common data, flags, row size,
    /// layout hash) and the first failure is returned.
    pub fn validate(&self, schema: &TableSchema) -> Result<(), FormatError> {
        self.check_magic()?;
        self.check_common_data()?;
        self.check_flags()?;
        self.check_row_size(schema)?;
        self.check_layout_hash(schema)?;
        Ok(())
    }

    /// Run every check and report each outcome, without stopping at the first failure.
    pub fn checks(&self, schema: &TableSchema) -> Vec<HeaderCheck> {
        let results = [
            (HeaderCheckKind::Magic, self.check_magic()),
            (HeaderCheckKind::CommonData, self.check_common_data()),
            (HeaderCheckKind::Flags, self.check_flags()),
            (HeaderCheckKind::RowSize, self.check_row_size(schema)),
            (HeaderCheckKind::LayoutHash, self.check_layout_hash(schema)),
        ];
        results
            .into_iter()
            .map(|(kind, result)| HeaderCheck {
                kind,
                passed: result.is_ok(),
                message: result.err().map(|e| e.to_string()),
            })
            .collect()
    }

    fn check_magic(&self) -> Result<(), FormatError> {
        if self.magic != DB2_MAGIC_U32 {
            return Err(FormatError::BadMagic { found: self.magic });
        }
        Ok(())
    }

    fn check_common_data(&self) -> Result<(), FormatError> {
        if self.field_count != self.total_field_count {
            return Err(FormatError::UsesCommonData {
                field_count: self.field_count,
                total_field_count: self.total_field_count,
            });
        }
        Ok(())
    }

    fn check_flags(&self) -> Result<(), FormatError> {
        if self.flags != DB2_FLAG_IDS_TRAILING {
            return Err(FormatError::UnsupportedFlags { flags: self.flags });
        }
        Ok(())
    }

    fn check_row_size(&self, schema: &TableSchema) -> Result<(), FormatError> {
        if self.row_size != schema.row_size {
            return Err(FormatError::RowSizeMismatch {
                expected: schema.row_size,
                found: self.row_size,
            });
        }
        Ok(())
    }

    fn check_layout_hash(&self, schema: &TableSchema) -> Result<(), FormatError> {
        if self.layout_hash != schema.layout_hash {
            return Err(FormatError::LayoutHashMismatch {
                expected: schema.layout_hash,
                found: self.layout_hash,
            });
        }
        Ok(())
    }
}
