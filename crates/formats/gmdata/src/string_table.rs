use std::collections::HashMap;

use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// A reference to a string in the STRG chunk.
///
/// The value is the absolute file offset of the string's **first character
/// byte** (the u32 length prefix sits 4 bytes earlier). This matches how
/// every other chunk refers to strings, so the raw u32 read from a record
/// is usable as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef(pub u32);

impl StringRef {
    /// A null reference (offset 0) means "no string".
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Decoded STRG chunk: absolute address → text.
///
/// Built once per load; lookups after that are plain map hits, so a string
/// referenced from many records is decoded exactly once.
pub struct StringTable {
    entries: HashMap<u32, String>,
}

impl StringTable {
    /// Parse the STRG chunk.
    ///
    /// `chunk_data` is the raw chunk content, `data_offset` its absolute
    /// position in the file (pointer-list entries are absolute offsets).
    pub fn parse(chunk_data: &[u8], data_offset: usize) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut entries = HashMap::with_capacity(pointers.len());
        for ptr in pointers {
            let local = (ptr as usize)
                .checked_sub(data_offset)
                .ok_or(Error::UnresolvedString { offset: ptr })?;
            let mut ec = Cursor::new(chunk_data).at_offset(local);
            let text = ec.read_gm_string()?;
            // Key by the char-data address, the form other chunks use.
            entries.insert(ptr + 4, text);
        }
        Ok(Self { entries })
    }

    /// Look up the text at an absolute address.
    pub fn get(&self, address: u32) -> Result<&str> {
        self.entries
            .get(&address)
            .map(String::as_str)
            .ok_or(Error::UnresolvedString { offset: address })
    }

    /// Resolve a [`StringRef`] read from a record.
    pub fn resolve(&self, sref: StringRef) -> Result<&str> {
        self.get(sref.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
