//! WDB6 DB2 table format.
//!
//! This module reads and writes the binary client tables used by the
//! SceneScript system. A table is a 56-byte header, a field layout table, an
//! array of fixed-size rows, a string block, a trailing array of row ids and a
//! copy table of duplicated rows.
//!
//! Start with [`reader::read_table`] and [`writer::write_table`]; the record
//! type picks the layout from [`schema`].

pub mod constants;
pub mod header;
pub mod reader;
pub mod records;
pub mod schema;
pub mod strings;
pub mod writer;
