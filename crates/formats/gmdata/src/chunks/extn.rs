use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// An extension entry. Only names are decoded.
#[derive(Debug)]
pub struct ExtensionEntry {
    pub name: StringRef,
    pub class_name: StringRef,
}

/// Parsed EXTN chunk.
#[derive(Debug)]
pub struct Extn {
    pub extensions: Vec<ExtensionEntry>,
}

impl Extn {
    /// Parse the EXTN chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut extensions = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            extensions.push(ExtensionEntry {
                name: StringRef(ec.read_u32()?),
                class_name: StringRef(ec.read_u32()?),
            });
        }
        Ok(Self { extensions })
    }
}
