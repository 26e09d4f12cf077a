use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// A sound definition in the SOND chunk.
///
/// The audio payload itself lives in AUDO; `audio_id` indexes into it.
/// A negative `audio_id` means the sound is streamed from an external
/// file named by `file`.
#[derive(Debug)]
pub struct SoundEntry {
    pub name: StringRef,
    pub flags: u32,
    /// Format tag string, e.g. ".ogg" or ".wav".
    pub kind: StringRef,
    /// Original file name.
    pub file: StringRef,
    pub volume: f32,
    pub pitch: f32,
    pub audio_group: i32,
    pub audio_id: i32,
}

/// Parsed SOND chunk.
#[derive(Debug)]
pub struct Sond {
    pub sounds: Vec<SoundEntry>,
}

impl Sond {
    /// Parse the SOND chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut sounds = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            sounds.push(SoundEntry {
                name: StringRef(ec.read_u32()?),
                flags: ec.read_u32()?,
                kind: StringRef(ec.read_u32()?),
                file: StringRef(ec.read_u32()?),
                volume: ec.read_f32()?,
                pitch: ec.read_f32()?,
                audio_group: ec.read_i32()?,
                audio_id: ec.read_i32()?,
            });
        }
        Ok(Self { sounds })
    }
}
