use crate::cursor::Cursor;
use crate::error::{Error, Result};

/// Magic bytes for the FORM container.
const FORM_MAGIC: [u8; 4] = *b"FORM";

/// How much of a chunk's content the typed parsers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSupport {
    /// Fully decoded into a typed record table.
    Full,
    /// Only a subset of each record is decoded (e.g. timelines).
    Partial,
    /// Only the record names are decoded (e.g. scripts, extensions).
    NamesOnly,
    /// Retained as an opaque byte range (bytecode, unknown tags).
    Opaque,
}

/// A single chunk entry in the file.
#[derive(Debug, Clone, Copy)]
pub struct ChunkEntry {
    /// 4-byte ASCII tag identifying the chunk type.
    pub tag: [u8; 4],
    /// Absolute byte offset of the chunk header (tag field) in the file.
    pub offset: usize,
    /// Size of the chunk's content (excluding the 8-byte header).
    pub size: usize,
}

impl ChunkEntry {
    /// Absolute offset where chunk content begins (after tag + size fields).
    pub fn data_offset(&self) -> usize {
        self.offset + 8
    }

    /// Tag as a string (for display).
    pub fn tag_str(&self) -> &str {
        std::str::from_utf8(&self.tag).unwrap_or("????")
    }
}

/// Index of all top-level chunks in a FORM file.
///
/// This is Layer 1: it only knows about the FORM envelope and chunk
/// boundaries. It does not parse any chunk internals. Chunks with tags no
/// downstream decoder recognizes are retained as opaque ranges — the index
/// fails only when the envelope itself is inconsistent.
pub struct ChunkIndex {
    /// Ordered list of chunks as they appear in the file.
    chunks: Vec<ChunkEntry>,
    /// Declared envelope content length.
    envelope_size: usize,
}

impl ChunkIndex {
    /// Parse the FORM envelope and build a chunk index.
    ///
    /// The `data` slice must be the entire file contents.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let magic = cursor.read_tag()?;
        if magic != FORM_MAGIC {
            return Err(Error::InvalidMagic {
                expected: FORM_MAGIC,
                found: magic,
            });
        }
        let envelope_size = cursor.read_u32()? as usize;
        let envelope_end = 8 + envelope_size;
        if envelope_end > data.len() {
            return Err(Error::ChunkOverrun {
                tag: FORM_MAGIC,
                offset: 0,
                end: envelope_end,
                envelope_end: data.len(),
            });
        }

        let mut chunks = Vec::new();
        while cursor.position() < envelope_end {
            let chunk_offset = cursor.position();

            let tag = cursor.read_tag()?;
            if !tag.iter().all(|&b| b.is_ascii_alphanumeric()) {
                return Err(Error::InvalidChunkTag {
                    offset: chunk_offset,
                    tag,
                });
            }

            let size = cursor.read_u32()? as usize;
            let end = chunk_offset + 8 + size;
            if end > envelope_end {
                return Err(Error::ChunkOverrun {
                    tag,
                    offset: chunk_offset,
                    end,
                    envelope_end,
                });
            }
            chunks.push(ChunkEntry {
                tag,
                offset: chunk_offset,
                size,
            });

            cursor.seek(end);
        }

        Ok(Self {
            chunks,
            envelope_size,
        })
    }

    /// All chunks in file order.
    pub fn chunks(&self) -> &[ChunkEntry] {
        &self.chunks
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Declared envelope content length (excludes the 8-byte FORM header).
    pub fn envelope_size(&self) -> usize {
        self.envelope_size
    }

    /// Find a chunk by its 4-byte tag. Returns the first match.
    pub fn find(&self, tag: &[u8; 4]) -> Option<&ChunkEntry> {
        self.chunks.iter().find(|c| &c.tag == tag)
    }

    /// Get the raw content bytes for a chunk from the file data.
    pub fn chunk_data<'a>(&self, data: &'a [u8], tag: &[u8; 4]) -> Result<&'a [u8]> {
        let entry = self.find(tag).ok_or(Error::ChunkNotFound { tag: *tag })?;
        let start = entry.data_offset();
        let end = start + entry.size;
        if end > data.len() {
            return Err(Error::UnexpectedEof {
                offset: start,
                need: entry.size,
                have: data.len().saturating_sub(start),
            });
        }
        Ok(&data[start..end])
    }

    /// Support level for a chunk tag.
    ///
    /// Anything not listed — CODE, VARI, FUNC, and tags from later format
    /// generations — is opaque: retained, never decoded, never an error.
    pub fn support_level(tag: &[u8; 4]) -> ChunkSupport {
        match tag {
            b"GEN8" | b"STRG" | b"TXTR" | b"TPAG" | b"SPRT" | b"SOND" | b"AUDO" | b"BGND"
            | b"OBJT" | b"ROOM" | b"FONT" | b"PATH" | b"SHDR" => ChunkSupport::Full,
            b"TMLN" => ChunkSupport::Partial,
            b"SCPT" | b"EXTN" => ChunkSupport::NamesOnly,
            _ => ChunkSupport::Opaque,
        }
    }
}
