use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// An object entry in the OBJT chunk.
///
/// `parent_index` links objects into an inheritance tree; −1 means no
/// parent. The index is taken as-is here, cycle defense belongs to the
/// asset-graph layer.
#[derive(Debug)]
pub struct ObjectEntry {
    pub name: StringRef,
    /// −1 when the object has no sprite.
    pub sprite_index: i32,
    pub visible: bool,
    pub solid: bool,
    pub depth: i32,
    pub persistent: bool,
    pub parent_index: i32,
    pub mask_index: i32,
    pub uses_physics: bool,
    pub is_sensor: bool,
    pub shape: i32,
    pub density: f32,
    pub restitution: f32,
    pub friction: f32,
}

/// Parsed OBJT chunk.
#[derive(Debug)]
pub struct Objt {
    pub objects: Vec<ObjectEntry>,
}

impl Objt {
    /// Parse the OBJT chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut objects = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            objects.push(ObjectEntry {
                name: StringRef(ec.read_u32()?),
                sprite_index: ec.read_i32()?,
                visible: ec.read_bool32()?,
                solid: ec.read_bool32()?,
                depth: ec.read_i32()?,
                persistent: ec.read_bool32()?,
                parent_index: ec.read_i32()?,
                mask_index: ec.read_i32()?,
                uses_physics: ec.read_bool32()?,
                is_sensor: ec.read_bool32()?,
                shape: ec.read_i32()?,
                density: ec.read_f32()?,
                restitution: ec.read_f32()?,
                friction: ec.read_f32()?,
            });
        }
        Ok(Self { objects })
    }
}
