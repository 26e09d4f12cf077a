use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// A script entry: name plus the id of its compiled code. Only the name
/// is surfaced; bytecode stays opaque.
#[derive(Debug)]
pub struct ScriptEntry {
    pub name: StringRef,
    pub code_id: i32,
}

/// Parsed SCPT chunk.
#[derive(Debug)]
pub struct Scpt {
    pub scripts: Vec<ScriptEntry>,
}

impl Scpt {
    /// Parse the SCPT chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut scripts = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            scripts.push(ScriptEntry {
                name: StringRef(ec.read_u32()?),
                code_id: ec.read_i32()?,
            });
        }
        Ok(Self { scripts })
    }
}
