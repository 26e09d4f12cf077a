use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// A background entry in the BGND chunk. Backgrounds double as tilesets:
/// the tile fields describe how the texture region slices into cells.
#[derive(Debug)]
pub struct BackgroundEntry {
    pub name: StringRef,
    pub transparent: bool,
    pub smooth: bool,
    pub preload: bool,
    /// Absolute TPAG record address of the full image.
    pub region_address: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_columns: u32,
    pub tiling_flags: u32,
}

impl BackgroundEntry {
    /// Whether the tile fields describe a usable grid.
    pub fn is_tileset(&self) -> bool {
        self.tile_width > 0 && self.tile_height > 0
    }
}

/// Parsed BGND chunk.
#[derive(Debug)]
pub struct Bgnd {
    pub backgrounds: Vec<BackgroundEntry>,
}

impl Bgnd {
    /// Parse the BGND chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut backgrounds = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            backgrounds.push(BackgroundEntry {
                name: StringRef(ec.read_u32()?),
                transparent: ec.read_bool32()?,
                smooth: ec.read_bool32()?,
                preload: ec.read_bool32()?,
                region_address: ec.read_u32()?,
                tile_width: ec.read_u32()?,
                tile_height: ec.read_u32()?,
                tile_columns: ec.read_u32()?,
                tiling_flags: ec.read_u32()?,
            });
        }
        Ok(Self { backgrounds })
    }
}
