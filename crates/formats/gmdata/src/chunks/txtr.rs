use crate::cursor::Cursor;
use crate::error::Result;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// A texture page entry in the TXTR chunk.
#[derive(Debug)]
pub struct TexturePageEntry {
    /// Scaled flag (unused by the renderer, kept for completeness).
    pub scaled: u32,
    /// Absolute offset of the embedded PNG stream.
    pub data_offset: u32,
    /// Page dimensions read from the PNG IHDR header, without decoding any
    /// pixels. `None` when the payload is absent or not a PNG.
    pub dimensions: Option<(u32, u32)>,
}

/// Parsed TXTR chunk.
#[derive(Debug)]
pub struct Txtr {
    pub pages: Vec<TexturePageEntry>,
}

impl Txtr {
    /// Parse the TXTR chunk.
    ///
    /// `chunk_data` is the raw chunk content; `data` the full file data
    /// (entry pointers and payload offsets are absolute).
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut pages = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            let scaled = ec.read_u32()?;
            let data_offset = ec.read_u32()?;
            let dimensions = png_dimensions(data, data_offset as usize);
            pages.push(TexturePageEntry {
                scaled,
                data_offset,
                dimensions,
            });
        }
        Ok(Self { pages })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Extract the raw PNG stream for a page.
    ///
    /// Walks the PNG's own chunk headers to the IEND marker to find the
    /// payload end, so a page's extent never depends on neighbouring
    /// entries. Returns `None` when the payload is absent or malformed —
    /// the caller treats the page as undecodable, not the file as broken.
    pub fn payload<'a>(&self, index: usize, data: &'a [u8]) -> Option<&'a [u8]> {
        let entry = self.pages.get(index)?;
        let start = entry.data_offset as usize;
        if start == 0 || !data.get(start..start + 8)?.eq(&PNG_SIGNATURE) {
            return None;
        }
        let mut pos = start + 8;
        loop {
            let header = data.get(pos..pos + 8)?;
            let len = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let end = pos.checked_add(12 + len)?;
            if end > data.len() {
                return None;
            }
            let kind = &header[4..8];
            pos = end;
            if kind == b"IEND" {
                return Some(&data[start..pos]);
            }
        }
    }
}

/// Read the width/height declared in a PNG stream's IHDR header
/// (big-endian u32 pair at bytes 16..24).
fn png_dimensions(data: &[u8], offset: usize) -> Option<(u32, u32)> {
    if offset == 0 || !data.get(offset..offset + 8)?.eq(&PNG_SIGNATURE) {
        return None;
    }
    let ihdr = data.get(offset + 8..offset + 24)?;
    if &ihdr[4..8] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([ihdr[8], ihdr[9], ihdr[10], ihdr[11]]);
    let height = u32::from_be_bytes([ihdr[12], ihdr[13], ihdr[14], ihdr[15]]);
    Some((width, height))
}
