use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::string_table::StringRef;

/// A background layer placed in a room. Foreground layers draw above
/// everything else; the rest draw below tiles and instances.
#[derive(Debug)]
pub struct RoomBackground {
    pub visible: bool,
    pub foreground: bool,
    /// −1 when the slot is unused.
    pub background_index: i32,
    pub x: i32,
    pub y: i32,
    pub tile_h: bool,
    pub tile_v: bool,
    pub stretch: bool,
    pub depth: i32,
}

/// A tile grid referencing one tileset background. Cells are row-major
/// tile ids, −1 marking an empty cell.
#[derive(Debug)]
pub struct TileLayer {
    pub background_index: i32,
    pub depth: i32,
    pub x: i32,
    pub y: i32,
    pub grid_width: u32,
    pub grid_height: u32,
    pub cells: Vec<i32>,
}

impl TileLayer {
    /// The tile id at (col, row), if in bounds and not empty.
    pub fn cell(&self, col: u32, row: u32) -> Option<i32> {
        if col >= self.grid_width || row >= self.grid_height {
            return None;
        }
        let id = self.cells[(row * self.grid_width + col) as usize];
        (id >= 0).then_some(id)
    }
}

/// A placed object instance.
#[derive(Debug)]
pub struct Instance {
    pub x: i32,
    pub y: i32,
    pub object_index: i32,
    pub instance_id: u32,
    pub creation_code: i32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Blend color, 0xAABBGGRR. 0xFFFFFFFF means untinted.
    pub color: u32,
    /// Degrees, counter-clockwise.
    pub rotation: f32,
}

/// A group of instances sharing creation order.
#[derive(Debug)]
pub struct InstanceLayer {
    pub instances: Vec<Instance>,
}

/// A room entry in the ROOM chunk.
#[derive(Debug)]
pub struct RoomEntry {
    pub name: StringRef,
    pub caption: StringRef,
    pub width: u32,
    pub height: u32,
    pub speed: u32,
    pub persistent: bool,
    /// 0xAARRGGBB.
    pub background_color: u32,
    pub draw_background_color: bool,
    pub backgrounds: Vec<RoomBackground>,
    pub tile_layers: Vec<TileLayer>,
    pub instance_layers: Vec<InstanceLayer>,
}

/// Parsed ROOM chunk.
#[derive(Debug)]
pub struct Room {
    pub rooms: Vec<RoomEntry>,
}

impl Room {
    /// Parse the ROOM chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut rooms = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            let name = StringRef(ec.read_u32()?);
            let caption = StringRef(ec.read_u32()?);
            let width = ec.read_u32()?;
            let height = ec.read_u32()?;
            let speed = ec.read_u32()?;
            let persistent = ec.read_bool32()?;
            let background_color = ec.read_u32()?;
            let draw_background_color = ec.read_bool32()?;
            let backgrounds_ptr = ec.read_u32()?;
            let tiles_ptr = ec.read_u32()?;
            let instances_ptr = ec.read_u32()?;

            rooms.push(RoomEntry {
                name,
                caption,
                width,
                height,
                speed,
                persistent,
                background_color,
                draw_background_color,
                backgrounds: read_backgrounds(data, backgrounds_ptr)?,
                tile_layers: read_tile_layers(data, tiles_ptr)?,
                instance_layers: read_instance_layers(data, instances_ptr)?,
            });
        }
        Ok(Self { rooms })
    }
}

fn read_backgrounds(data: &[u8], list_ptr: u32) -> Result<Vec<RoomBackground>> {
    let mut lc = Cursor::new(data).at_offset(list_ptr as usize);
    let pointers = lc.read_pointer_list()?;

    let mut layers = Vec::with_capacity(pointers.len());
    for ptr in pointers {
        let mut ec = Cursor::new(data).at_offset(ptr as usize);
        layers.push(RoomBackground {
            visible: ec.read_bool32()?,
            foreground: ec.read_bool32()?,
            background_index: ec.read_i32()?,
            x: ec.read_i32()?,
            y: ec.read_i32()?,
            tile_h: ec.read_bool32()?,
            tile_v: ec.read_bool32()?,
            stretch: ec.read_bool32()?,
            depth: ec.read_i32()?,
        });
    }
    Ok(layers)
}

fn read_tile_layers(data: &[u8], list_ptr: u32) -> Result<Vec<TileLayer>> {
    let mut lc = Cursor::new(data).at_offset(list_ptr as usize);
    let pointers = lc.read_pointer_list()?;

    let mut layers = Vec::with_capacity(pointers.len());
    for ptr in pointers {
        let mut ec = Cursor::new(data).at_offset(ptr as usize);
        let background_index = ec.read_i32()?;
        let depth = ec.read_i32()?;
        let x = ec.read_i32()?;
        let y = ec.read_i32()?;
        let grid_width = ec.read_u32()?;
        let grid_height = ec.read_u32()?;

        // Bounds-check the whole grid before allocating for it.
        let count = grid_width as usize * grid_height as usize;
        if count > ec.remaining() / 4 {
            return Err(Error::UnexpectedEof {
                offset: ec.position(),
                need: count * 4,
                have: ec.remaining(),
            });
        }
        let mut cells = Vec::with_capacity(count);
        for _ in 0..count {
            cells.push(ec.read_i32()?);
        }
        layers.push(TileLayer {
            background_index,
            depth,
            x,
            y,
            grid_width,
            grid_height,
            cells,
        });
    }
    Ok(layers)
}

fn read_instance_layers(data: &[u8], list_ptr: u32) -> Result<Vec<InstanceLayer>> {
    let mut lc = Cursor::new(data).at_offset(list_ptr as usize);
    let layer_pointers = lc.read_pointer_list()?;

    let mut layers = Vec::with_capacity(layer_pointers.len());
    for layer_ptr in layer_pointers {
        let mut ic = Cursor::new(data).at_offset(layer_ptr as usize);
        let instance_pointers = ic.read_pointer_list()?;

        let mut instances = Vec::with_capacity(instance_pointers.len());
        for ptr in instance_pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            instances.push(Instance {
                x: ec.read_i32()?,
                y: ec.read_i32()?,
                object_index: ec.read_i32()?,
                instance_id: ec.read_u32()?,
                creation_code: ec.read_i32()?,
                scale_x: ec.read_f32()?,
                scale_y: ec.read_f32()?,
                color: ec.read_u32()?,
                rotation: ec.read_f32()?,
            });
        }
        layers.push(InstanceLayer { instances });
    }
    Ok(layers)
}
