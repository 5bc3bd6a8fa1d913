//! String block access.
//!
//! String columns hold byte offsets into the table's string block, a run of
//! NUL-terminated strings following the row array. [`StringBlock`] resolves
//! offsets against a borrowed block; [`StringBlockBuilder`] grows a block while
//! rows are being encoded.

use crate::wdb::constants::STRING_BLOCK_RESERVED;
use crate::wdb::writer::checked_u32;
use crate::{Db2Error, FormatError};

/// Borrowed view of a decoded table's string block.
#[derive(Debug, Clone, Copy)]
pub struct StringBlock<'a> {
    data: &'a [u8],
}

impl<'a> StringBlock<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        StringBlock { data }
    }

    /// Size of the block in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes of the string starting at `offset`, without the terminator.
    ///
    /// A string missing its terminator runs to the end of the block. An offset
    /// equal to the block size is the empty string.
    pub fn get(&self, offset: u32) -> Result<&'a [u8], FormatError> {
        let start = offset as usize;
        if start > self.data.len() {
            return Err(FormatError::StringOffsetOutOfRange {
                offset,
                len: self.data.len(),
            });
        }
        let rest = &self.data[start..];
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        Ok(&rest[..end])
    }

    /// String at `offset`, with invalid UTF-8 replaced.
    pub fn get_string(&self, offset: u32) -> Result<String, FormatError> {
        self.get(offset)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Append-only string block used while encoding.
///
/// Starts with two reserved zero bytes; every pushed string gets its own copy
/// (no deduplication) so output matches the client's own tooling byte for byte.
#[derive(Debug, Clone)]
pub struct StringBlockBuilder {
    buf: Vec<u8>,
}

impl Default for StringBlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StringBlockBuilder {
    pub fn new() -> Self {
        StringBlockBuilder {
            buf: vec![0u8; STRING_BLOCK_RESERVED],
        }
    }

    /// Append `bytes` plus a terminator and return the offset it starts at.
    ///
    /// Callers must reject interior NUL bytes first; see
    /// [`Db2Error::InteriorNul`]. Fails once offsets no longer fit in 32 bits.
    pub fn push(&mut self, bytes: &[u8]) -> Result<u32, Db2Error> {
        let offset = checked_u32("string offset", self.buf.len())?;
        self.buf.extend_from_slice(bytes);
        self.buf.push(0);
        Ok(offset)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
