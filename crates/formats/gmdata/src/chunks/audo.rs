use crate::cursor::Cursor;
use crate::error::Result;

/// Locator for one embedded audio payload: an absolute offset + length
/// into the file. The bytes are not copied; consumers slice on demand.
#[derive(Debug, Clone, Copy)]
pub struct AudioSpan {
    pub offset: usize,
    pub length: usize,
}

/// Parsed AUDO chunk.
///
/// Entries whose declared length runs past the file are kept as `None` so
/// that indices stay aligned with SOND's `audio_id` values; one corrupt
/// payload never shifts every later sound.
#[derive(Debug)]
pub struct Audo {
    pub entries: Vec<Option<AudioSpan>>,
}

impl Audo {
    /// Parse the AUDO chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut entries = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            let span = match ec.read_u32() {
                Ok(length) => {
                    let offset = ptr as usize + 4;
                    let length = length as usize;
                    (offset + length <= data.len()).then_some(AudioSpan { offset, length })
                }
                Err(_) => None,
            };
            entries.push(span);
        }
        Ok(Self { entries })
    }

    /// The raw payload bytes for an entry, if present and in bounds.
    pub fn payload<'a>(&self, index: usize, data: &'a [u8]) -> Option<&'a [u8]> {
        let span = (*self.entries.get(index)?)?;
        data.get(span.offset..span.offset + span.length)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
