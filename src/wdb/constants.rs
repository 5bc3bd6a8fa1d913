/// WDB6 table structure constants.
///
/// Offsets are relative to the start of the table buffer. All multi-byte
/// values are little-endian.
// Magic: "WDB6" as stored on disk, read little-endian
pub const DB2_MAGIC_U32: u32 = 0x3642_4457;

// Header (56 bytes total)
pub const SIZE_DB2_HEADER: usize = 56;
pub const DB2_MAGIC_OFFSET: usize = 0; // 4 bytes
pub const DB2_ROW_COUNT: usize = 4; // 4 bytes
pub const DB2_FIELD_COUNT: usize = 8; // 4 bytes - excludes the id column when ids trail
pub const DB2_ROW_SIZE: usize = 12; // 4 bytes
pub const DB2_STRING_TABLE_SIZE: usize = 16; // 4 bytes
pub const DB2_TABLE_HASH: usize = 20; // 4 bytes
pub const DB2_LAYOUT_HASH: usize = 24; // 4 bytes - changes only when the column layout changes
pub const DB2_MIN_ID: usize = 28; // 4 bytes
pub const DB2_MAX_ID: usize = 32; // 4 bytes
pub const DB2_LOCALE: usize = 36; // 4 bytes
pub const DB2_COPY_TABLE_SIZE: usize = 40; // 4 bytes
pub const DB2_FLAGS: usize = 44; // 2 bytes
pub const DB2_ID_INDEX: usize = 46; // 2 bytes - ignored when ids trail
pub const DB2_TOTAL_FIELD_COUNT: usize = 48; // 4 bytes - includes common data columns
pub const DB2_COMMON_DATA_TABLE_SIZE: usize = 52; // 4 bytes

// Header flags
pub const DB2_FLAG_OFFSET_MAP: u16 = 0x01; // string_table_size becomes an offset map pointer
pub const DB2_FLAG_IDS_TRAILING: u16 = 0x04; // row ids follow the string block

// Field layout table: one (size code, offset) pair of u16 per stored field
pub const SIZE_FIELD_ENTRY: usize = 4;

// Size codes: stored bits = 32 - code
pub const FIELD_SIZE_32: u16 = 0x00;
pub const FIELD_SIZE_16: u16 = 0x10;
pub const FIELD_SIZE_8: u16 = 0x18;

// Trailing id array and copy table
pub const SIZE_ID_ENTRY: usize = 4;
pub const SIZE_COPY_ENTRY: usize = 8; // new id (4) + source id (4)

// Values written by the encoder
pub const DB2_LOCALE_ANY: u32 = 0xFFFF_FFFF;
pub const DB2_EMPTY_MIN_ID: u32 = 0x7FFF_FFFF;

// String block: offsets 0 and 1 are reserved empty strings
pub const STRING_BLOCK_RESERVED: usize = 2;
