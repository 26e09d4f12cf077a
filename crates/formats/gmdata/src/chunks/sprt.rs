use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// A sprite entry in the SPRT chunk.
#[derive(Debug)]
pub struct SpriteEntry {
    pub name: StringRef,
    /// Canvas size of every frame.
    pub width: u32,
    pub height: u32,
    /// Collision margins; together they describe the bounding box.
    pub margin_left: i32,
    pub margin_right: i32,
    pub margin_bottom: i32,
    pub margin_top: i32,
    pub transparent: bool,
    pub smooth: bool,
    pub preload: bool,
    pub bbox_mode: u32,
    pub sep_masks: u32,
    pub origin_x: i32,
    pub origin_y: i32,
    /// Absolute TPAG record addresses, one per frame, in playback order.
    pub frame_addresses: Vec<u32>,
}

/// Parsed SPRT chunk.
#[derive(Debug)]
pub struct Sprt {
    pub sprites: Vec<SpriteEntry>,
}

impl Sprt {
    /// Parse the SPRT chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut sprites = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            let name = StringRef(ec.read_u32()?);
            let width = ec.read_u32()?;
            let height = ec.read_u32()?;
            let margin_left = ec.read_i32()?;
            let margin_right = ec.read_i32()?;
            let margin_bottom = ec.read_i32()?;
            let margin_top = ec.read_i32()?;
            let transparent = ec.read_bool32()?;
            let smooth = ec.read_bool32()?;
            let preload = ec.read_bool32()?;
            let bbox_mode = ec.read_u32()?;
            let sep_masks = ec.read_u32()?;
            let origin_x = ec.read_i32()?;
            let origin_y = ec.read_i32()?;

            // Frame list: count + absolute TPAG addresses, inline.
            let frame_addresses = ec.read_pointer_list()?;

            sprites.push(SpriteEntry {
                name,
                width,
                height,
                margin_left,
                margin_right,
                margin_bottom,
                margin_top,
                transparent,
                smooth,
                preload,
                bbox_mode,
                sep_masks,
                origin_x,
                origin_y,
                frame_addresses,
            });
        }
        Ok(Self { sprites })
    }
}
