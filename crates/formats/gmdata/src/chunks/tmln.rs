use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// A timeline entry. Only the header is decoded; moment actions are
/// bytecode and stay opaque.
#[derive(Debug)]
pub struct TimelineEntry {
    pub name: StringRef,
    pub moment_count: u32,
}

/// Parsed TMLN chunk.
#[derive(Debug)]
pub struct Tmln {
    pub timelines: Vec<TimelineEntry>,
}

impl Tmln {
    /// Parse the TMLN chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut timelines = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            timelines.push(TimelineEntry {
                name: StringRef(ec.read_u32()?),
                moment_count: ec.read_u32()?,
            });
        }
        Ok(Self { timelines })
    }
}
