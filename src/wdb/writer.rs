//! Table encoding.
//!
//! [`TableWriter`] accumulates rows, their ids and the string block, then
//! [`finish`](TableWriter::finish) lays out a complete WDB6 buffer that
//! [`TableReader`](crate::wdb::reader::TableReader) accepts:
//!
//! - flags are always "ids trailing", so the field layout table omits the id
//!   column and `field_count == total_field_count`;
//! - the copy table is always empty; duplicated rows stay materialized;
//! - output depends only on the input order, so encoding twice gives the
//!   same bytes.

use crate::wdb::constants::*;
use crate::wdb::header::Db2Header;
use crate::wdb::records::{RawRow, Record};
use crate::wdb::schema::TableSchema;
use crate::wdb::strings::StringBlockBuilder;
use crate::Db2Error;

/// Convert a length or offset to a 32-bit header or column value.
pub(crate) fn checked_u32(what: &str, value: usize) -> Result<u32, Db2Error> {
    u32::try_from(value)
        .map_err(|_| Db2Error::Argument(format!("{} {} does not fit in 32 bits", what, value)))
}

/// Incremental encoder for one table.
#[derive(Debug)]
pub struct TableWriter<'a> {
    schema: &'a TableSchema,
    rows: Vec<u8>,
    ids: Vec<u32>,
    strings: StringBlockBuilder,
}

impl<'a> TableWriter<'a> {
    pub fn new(schema: &'a TableSchema) -> Self {
        TableWriter {
            schema,
            rows: Vec::new(),
            ids: Vec::new(),
            strings: StringBlockBuilder::new(),
        }
    }

    /// Number of rows pushed so far.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Append one record as the next row.
    ///
    /// String columns are added to the string block in column order, and the
    /// row stores each string's offset at the time it was added.
    pub fn push<R: Record>(&mut self, record: &R) -> Result<(), Db2Error> {
        if R::KIND != self.schema.kind {
            return Err(Db2Error::Argument(format!(
                "{} rows cannot be written to a {} table",
                R::KIND,
                self.schema.name
            )));
        }

        let raw = record.to_raw(&mut self.strings)?;
        let start = self.rows.len();
        self.rows.resize(start + self.schema.row_size as usize, 0);
        raw.write(&mut self.rows[start..]);
        self.ids.push(record.id());
        Ok(())
    }

    /// Header describing the rows pushed so far.
    pub fn header(&self) -> Result<Db2Header, Db2Error> {
        let (min_id, max_id) = self
            .ids
            .iter()
            .fold((DB2_EMPTY_MIN_ID, 0u32), |(lo, hi), &id| {
                (lo.min(id), hi.max(id))
            });
        let field_count = self.schema.stored_field_count();

        Ok(Db2Header {
            magic: DB2_MAGIC_U32,
            row_count: checked_u32("row count", self.ids.len())?,
            field_count,
            row_size: self.schema.row_size,
            string_table_size: checked_u32("string block size", self.strings.len())?,
            table_hash: self.schema.table_hash,
            layout_hash: self.schema.layout_hash,
            min_id,
            max_id,
            locale: DB2_LOCALE_ANY,
            copy_table_size: 0,
            flags: DB2_FLAG_IDS_TRAILING,
            id_index: 0,
            total_field_count: field_count,
            common_data_table_size: 0,
        })
    }

    /// Lay out the complete table buffer.
    pub fn finish(self) -> Result<Vec<u8>, Db2Error> {
        let header = self.header()?;
        let layout = self.schema.layout_bytes();
        let strings = self.strings.into_bytes();

        let total = SIZE_DB2_HEADER
            + layout.len()
            + self.rows.len()
            + strings.len()
            + self.ids.len() * SIZE_ID_ENTRY;
        let mut data = vec![0u8; SIZE_DB2_HEADER];
        data.reserve(total - SIZE_DB2_HEADER);
        header.write(&mut data);

        data.extend_from_slice(&layout);
        data.extend_from_slice(&self.rows);
        data.extend_from_slice(&strings);
        for id in &self.ids {
            data.extend_from_slice(&id.to_le_bytes());
        }

        tracing::debug!(
            table = self.schema.name,
            rows = header.row_count,
            strings = header.string_table_size,
            bytes = data.len(),
            "encoded table"
        );

        Ok(data)
    }
}

/// Encode `records`, in order, as a complete table of their kind.
pub fn write_table<R: Record>(records: &[R]) -> Result<Vec<u8>, Db2Error> {
    let mut writer = TableWriter::new(R::KIND.schema());
    for record in records {
        writer.push(record)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wdb::reader::{read_table, TableReader};
    use crate::wdb::records::{Package, PackageMember, Script};
    use crate::wdb::schema::SCENE_SCRIPT_PACKAGE;
    use byteorder::{ByteOrder, LittleEndian};

    fn intro() -> Package {
        Package {
            id: 7,
            name: "Intro".to_string(),
        }
    }

    #[test]
    fn test_package_table_bytes() {
        let data = write_table(&[intro()]).unwrap();

        let mut expected = vec![0u8; SIZE_DB2_HEADER];
        expected[0..4].copy_from_slice(b"WDB6");
        LittleEndian::write_u32(&mut expected[DB2_ROW_COUNT..], 1);
        LittleEndian::write_u32(&mut expected[DB2_FIELD_COUNT..], 1);
        LittleEndian::write_u32(&mut expected[DB2_ROW_SIZE..], 4);
        LittleEndian::write_u32(&mut expected[DB2_STRING_TABLE_SIZE..], 8);
        LittleEndian::write_u32(&mut expected[DB2_TABLE_HASH..], 0xE8CB_5E09);
        LittleEndian::write_u32(&mut expected[DB2_LAYOUT_HASH..], 956_619_678);
        LittleEndian::write_u32(&mut expected[DB2_MIN_ID..], 7);
        LittleEndian::write_u32(&mut expected[DB2_MAX_ID..], 7);
        LittleEndian::write_u32(&mut expected[DB2_LOCALE..], 0xFFFF_FFFF);
        LittleEndian::write_u16(&mut expected[DB2_FLAGS..], 4);
        LittleEndian::write_u32(&mut expected[DB2_TOTAL_FIELD_COUNT..], 1);
        expected.extend_from_slice(&[0, 0, 0, 0]); // field layout: 32 bits at 0
        expected.extend_from_slice(&[2, 0, 0, 0]); // row: name at offset 2
        expected.extend_from_slice(b"\0\0Intro\0");
        expected.extend_from_slice(&[7, 0, 0, 0]); // id array

        assert_eq!(data, expected);
    }

    #[test]
    fn test_header_self_consistency() {
        let scripts = vec![
            Script {
                id: 3,
                name: "a".to_string(),
                content: b"x".to_vec(),
                previous: 0,
                next: 0,
            },
            Script {
                id: 1,
                name: "b".to_string(),
                content: Vec::new(),
                previous: 0,
                next: 0,
            },
        ];
        let data = write_table(&scripts).unwrap();
        let reader = TableReader::open(&data, Script::KIND.schema()).unwrap();
        let hdr = reader.header();

        assert_eq!(hdr.field_count, hdr.total_field_count);
        assert_eq!(hdr.field_count, 4);
        assert_eq!(hdr.row_size, 12);
        assert_eq!(hdr.flags, DB2_FLAG_IDS_TRAILING);
        assert_eq!(hdr.copy_table_size, 0);
        assert_eq!(hdr.common_data_table_size, 0);
        assert_eq!((hdr.min_id, hdr.max_id), (1, 3));
    }

    #[test]
    fn test_empty_table() {
        let data = write_table::<PackageMember>(&[]).unwrap();
        let hdr = Db2Header::parse(&data).unwrap();
        assert_eq!(hdr.row_count, 0);
        assert_eq!(hdr.min_id, DB2_EMPTY_MIN_ID);
        assert_eq!(hdr.max_id, 0);
        assert_eq!(hdr.string_table_size, 2);
        assert!(read_table::<PackageMember>(&data).unwrap().is_empty());
    }

    #[test]
    fn test_deterministic() {
        let pkgs = vec![intro(), intro().with_id(8)];
        assert_eq!(write_table(&pkgs).unwrap(), write_table(&pkgs).unwrap());
    }

    #[test]
    fn test_duplicates_stay_materialized() {
        let pkgs = vec![intro(), intro().with_id(99)];
        let data = write_table(&pkgs).unwrap();
        let reader = TableReader::open(&data, &SCENE_SCRIPT_PACKAGE).unwrap();
        assert_eq!(reader.row_count(), 2);
        assert_eq!(reader.copy_entries().count(), 0);
        assert_eq!(reader.records::<Package>().unwrap(), pkgs);
    }

    #[test]
    fn test_header_matches_pushed_rows() {
        let mut writer = TableWriter::new(&SCENE_SCRIPT_PACKAGE);
        writer.push(&intro()).unwrap();
        writer.push(&intro().with_id(2)).unwrap();
        let hdr = writer.header().unwrap();
        assert_eq!(hdr.row_count, 2);
        assert_eq!(hdr.string_table_size, 2 + 6 + 6);
        assert_eq!((hdr.min_id, hdr.max_id), (2, 7));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_oversized_values_rejected() {
        assert_eq!(checked_u32("row count", 12).unwrap(), 12);
        assert_eq!(checked_u32("row count", u32::MAX as usize).unwrap(), u32::MAX);
        let err = checked_u32("string block size", u32::MAX as usize + 1).unwrap_err();
        match err {
            Db2Error::Argument(msg) => assert!(msg.starts_with("string block size")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_push_wrong_kind() {
        let mut writer = TableWriter::new(&SCENE_SCRIPT_PACKAGE);
        let member = PackageMember {
            id: 1,
            package: 7,
            script: 1,
            include: 0,
            sequence: 1,
        };
        assert!(matches!(writer.push(&member), Err(Db2Error::Argument(_))));
        assert!(writer.is_empty());
    }
}
