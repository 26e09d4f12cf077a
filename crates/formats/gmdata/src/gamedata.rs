use std::cell::RefCell;
use std::collections::HashMap;

use crate::chunks::audo::Audo;
use crate::chunks::bgnd::Bgnd;
use crate::chunks::extn::Extn;
use crate::chunks::font::Font;
use crate::chunks::gen8::Gen8;
use crate::chunks::objt::Objt;
use crate::chunks::path::Path;
use crate::chunks::room::Room;
use crate::chunks::scpt::Scpt;
use crate::chunks::shdr::Shdr;
use crate::chunks::sond::Sond;
use crate::chunks::sprt::Sprt;
use crate::chunks::tmln::Tmln;
use crate::chunks::tpag::Tpag;
use crate::chunks::txtr::Txtr;
use crate::error::{Error, Result};
use crate::reader::ChunkIndex;
use crate::string_table::{StringRef, StringTable};

/// High-level lazy wrapper over a GameMaker data.win file.
///
/// Typed chunk accessors parse on first access and cache the result.
/// The full file data is retained for string resolution, raw payload
/// slicing and cross-chunk pointer chasing.
pub struct GameData {
    /// Raw file data.
    data: Vec<u8>,
    /// Chunk index (always parsed eagerly).
    index: ChunkIndex,
    /// Lazily parsed chunks, stored as type-erased boxes keyed by chunk tag.
    cache: RefCell<HashMap<[u8; 4], Box<dyn std::any::Any>>>,
}

impl GameData {
    /// Parse a data.win file (or a PE exe containing an embedded data.win) from raw bytes.
    ///
    /// If `data` begins with the PE magic `MZ`, the file is a Windows executable with an
    /// embedded GameMaker FORM blob. In that case the FORM header is located by scanning
    /// for the `FORM` signature and the data is trimmed to start there.
    ///
    /// Only the FORM envelope and chunk index are parsed eagerly.
    /// Individual chunk contents are parsed lazily on first access.
    pub fn parse(mut data: Vec<u8>) -> Result<Self> {
        // Detect PE-wrapped data.win and strip the PE prefix.
        if data.starts_with(b"MZ") {
            if let Some(offset) = find_embedded_form(&data) {
                data.drain(..offset);
            }
        }
        let index = ChunkIndex::parse(&data)?;
        Ok(Self {
            data,
            index,
            cache: RefCell::new(HashMap::new()),
        })
    }

    /// Raw file data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Chunk index.
    pub fn index(&self) -> &ChunkIndex {
        &self.index
    }

    /// Whether a chunk with the given tag exists.
    pub fn has_chunk(&self, tag: &[u8; 4]) -> bool {
        self.index.find(tag).is_some()
    }

    /// Get or parse a chunk, caching the result.
    fn get_or_parse<T: 'static>(&self, tag: &[u8; 4], parse: impl FnOnce() -> Result<T>) -> Result<()> {
        let cache = self.cache.borrow();
        if cache.contains_key(tag) {
            return Ok(());
        }
        drop(cache);
        let value = parse()?;
        self.cache.borrow_mut().insert(*tag, Box::new(value));
        Ok(())
    }

    /// Retrieve a cached chunk reference.
    fn cached<T: 'static>(&self, tag: &[u8; 4]) -> &T {
        let cache = self.cache.borrow();
        let boxed = cache.get(tag).expect("chunk should be cached");
        let ptr = boxed.downcast_ref::<T>().expect("type mismatch") as *const T;
        // SAFETY: The data lives in the HashMap which is owned by self.
        // We never remove entries, and self is borrowed immutably.
        unsafe { &*ptr }
    }

    /// Parse an optional chunk, returning `None` when the tag is absent.
    fn optional<T: 'static>(
        &self,
        tag: &[u8; 4],
        parse: impl FnOnce(&[u8]) -> Result<T>,
    ) -> Result<Option<&T>> {
        if !self.has_chunk(tag) {
            return Ok(None);
        }
        self.get_or_parse(tag, || {
            let chunk_data = self.index.chunk_data(&self.data, tag)?;
            parse(chunk_data)
        })?;
        Ok(Some(self.cached(tag)))
    }

    /// GEN8 metadata (game name, id, version, window size).
    pub fn gen8(&self) -> Result<&Gen8> {
        self.get_or_parse(b"GEN8", || {
            let chunk_data = self.index.chunk_data(&self.data, b"GEN8")?;
            Gen8::parse(chunk_data)
        })?;
        Ok(self.cached(b"GEN8"))
    }

    /// String table (STRG chunk).
    pub fn strings(&self) -> Result<&StringTable> {
        self.get_or_parse(b"STRG", || {
            let entry = self
                .index
                .find(b"STRG")
                .ok_or(Error::ChunkNotFound { tag: *b"STRG" })?;
            let chunk_data = self.index.chunk_data(&self.data, b"STRG")?;
            StringTable::parse(chunk_data, entry.data_offset())
        })?;
        Ok(self.cached(b"STRG"))
    }

    /// Resolve a string reference against the string table.
    pub fn resolve_string(&self, sref: StringRef) -> Result<&str> {
        self.strings()?.resolve(sref)
    }

    /// TXTR chunk (texture pages). `None` if absent.
    pub fn txtr(&self) -> Result<Option<&Txtr>> {
        self.optional(b"TXTR", |chunk| Txtr::parse(chunk, &self.data))
    }

    /// TPAG chunk (texture page regions). `None` if absent.
    pub fn tpag(&self) -> Result<Option<&Tpag>> {
        self.optional(b"TPAG", |chunk| Tpag::parse(chunk, &self.data))
    }

    /// SPRT chunk (sprite definitions). `None` if absent.
    pub fn sprt(&self) -> Result<Option<&Sprt>> {
        self.optional(b"SPRT", |chunk| Sprt::parse(chunk, &self.data))
    }

    /// BGND chunk (backgrounds / tilesets). `None` if absent.
    pub fn bgnd(&self) -> Result<Option<&Bgnd>> {
        self.optional(b"BGND", |chunk| Bgnd::parse(chunk, &self.data))
    }

    /// OBJT chunk (object definitions). `None` if absent.
    pub fn objt(&self) -> Result<Option<&Objt>> {
        self.optional(b"OBJT", |chunk| Objt::parse(chunk, &self.data))
    }

    /// ROOM chunk (room definitions). `None` if absent.
    pub fn room(&self) -> Result<Option<&Room>> {
        self.optional(b"ROOM", |chunk| Room::parse(chunk, &self.data))
    }

    /// SOND chunk (sound definitions). `None` if absent.
    pub fn sond(&self) -> Result<Option<&Sond>> {
        self.optional(b"SOND", |chunk| Sond::parse(chunk, &self.data))
    }

    /// AUDO chunk (embedded audio payloads). `None` if absent.
    pub fn audo(&self) -> Result<Option<&Audo>> {
        self.optional(b"AUDO", |chunk| Audo::parse(chunk, &self.data))
    }

    /// FONT chunk (font definitions). `None` if absent.
    pub fn font(&self) -> Result<Option<&Font>> {
        self.optional(b"FONT", |chunk| Font::parse(chunk, &self.data))
    }

    /// PATH chunk (path definitions). `None` if absent.
    pub fn path(&self) -> Result<Option<&Path>> {
        self.optional(b"PATH", |chunk| Path::parse(chunk, &self.data))
    }

    /// SCPT chunk (script names). `None` if absent.
    pub fn scpt(&self) -> Result<Option<&Scpt>> {
        self.optional(b"SCPT", |chunk| Scpt::parse(chunk, &self.data))
    }

    /// SHDR chunk (shader sources). `None` if absent.
    pub fn shdr(&self) -> Result<Option<&Shdr>> {
        self.optional(b"SHDR", |chunk| Shdr::parse(chunk, &self.data))
    }

    /// TMLN chunk (timeline headers). `None` if absent.
    pub fn tmln(&self) -> Result<Option<&Tmln>> {
        self.optional(b"TMLN", |chunk| Tmln::parse(chunk, &self.data))
    }

    /// EXTN chunk (extension names). `None` if absent.
    pub fn extn(&self) -> Result<Option<&Extn>> {
        self.optional(b"EXTN", |chunk| Extn::parse(chunk, &self.data))
    }
}

/// Scan `data` (a Windows PE executable) for an embedded GameMaker FORM blob.
///
/// Searches every `FORM` occurrence and validates that the declared FORM size fits
/// within the remaining file. Returns the byte offset of the first valid FORM header,
/// or `None` if no valid FORM is found.
///
/// A PE file may contain false-positive `FORM` byte sequences (e.g. inside the
/// import table or resource section), so each candidate is validated before accepting.
fn find_embedded_form(data: &[u8]) -> Option<usize> {
    const FORM: &[u8] = b"FORM";
    for offset in 0..data.len().saturating_sub(7) {
        if &data[offset..offset + 4] != FORM {
            continue;
        }
        let size_bytes: [u8; 4] = data[offset + 4..offset + 8].try_into().ok()?;
        let form_size = u32::from_le_bytes(size_bytes) as usize;
        // 8-byte header + content must fit within the file.
        if offset + 8 + form_size <= data.len() {
            return Some(offset);
        }
    }
    None
}

impl std::fmt::Debug for GameData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameData")
            .field("size", &self.data.len())
            .field("chunks", &self.index.len())
            .finish()
    }
}
