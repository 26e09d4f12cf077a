use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// One glyph within a font's texture region. Rects are relative to the
/// font's region on the texture page, not the page itself.
#[derive(Debug, Clone, Copy)]
pub struct Glyph {
    pub character: u16,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    /// Horizontal advance.
    pub shift: i16,
    /// Left-side bearing.
    pub offset: i16,
}

/// A font entry in the FONT chunk.
#[derive(Debug)]
pub struct FontEntry {
    pub name: StringRef,
    pub display_name: StringRef,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub range_start: u16,
    pub range_end: u16,
    /// Absolute TPAG record address of the glyph atlas region.
    pub region_address: u32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub glyphs: Vec<Glyph>,
}

impl FontEntry {
    /// Look up a glyph by character code.
    pub fn glyph(&self, character: u16) -> Option<&Glyph> {
        self.glyphs.iter().find(|g| g.character == character)
    }
}

/// Parsed FONT chunk.
#[derive(Debug)]
pub struct Font {
    pub fonts: Vec<FontEntry>,
}

impl Font {
    /// Parse the FONT chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut fonts = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            let name = StringRef(ec.read_u32()?);
            let display_name = StringRef(ec.read_u32()?);
            let size = ec.read_f32()?;
            let bold = ec.read_bool32()?;
            let italic = ec.read_bool32()?;
            let range_start = ec.read_u16()?;
            ec.skip(2)?;
            let range_end = ec.read_u16()?;
            ec.skip(2)?;
            let region_address = ec.read_u32()?;
            let scale_x = ec.read_f32()?;
            let scale_y = ec.read_f32()?;
            ec.skip(4)?;
            let glyphs_ptr = ec.read_u32()?;

            let mut gc = Cursor::new(data).at_offset(glyphs_ptr as usize);
            let glyph_pointers = gc.read_pointer_list()?;
            let mut glyphs = Vec::with_capacity(glyph_pointers.len());
            for gp in glyph_pointers {
                let mut g = Cursor::new(data).at_offset(gp as usize);
                glyphs.push(Glyph {
                    character: g.read_u16()?,
                    x: g.read_u16()?,
                    y: g.read_u16()?,
                    width: g.read_u16()?,
                    height: g.read_u16()?,
                    shift: g.read_i16()?,
                    offset: g.read_i16()?,
                });
            }

            fonts.push(FontEntry {
                name,
                display_name,
                size,
                bold,
                italic,
                range_start,
                range_end,
                region_address,
                scale_x,
                scale_y,
                glyphs,
            });
        }
        Ok(Self { fonts })
    }
}
