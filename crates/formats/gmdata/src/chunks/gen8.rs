use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// Parsed GEN8 chunk (game metadata).
#[derive(Debug)]
pub struct Gen8 {
    pub debug: bool,
    pub bytecode_version: u8,
    /// Reference to the original project file name.
    pub filename: StringRef,
    pub config: StringRef,
    pub last_object_id: u32,
    pub last_tile_id: u32,
    pub game_id: u32,
    pub guid: [u8; 16],
    pub name: StringRef,
    pub major: u32,
    pub minor: u32,
    pub release: u32,
    pub build: u32,
    pub window_width: u32,
    pub window_height: u32,
}

impl Gen8 {
    /// Parse the GEN8 chunk. The chunk is a single flat record; fields past
    /// the window size vary across format generations and are ignored.
    pub fn parse(chunk_data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let debug = c.read_u8()? != 0;
        let bytecode_version = c.read_u8()?;
        c.skip(2)?; // padding

        let filename = StringRef(c.read_u32()?);
        let config = StringRef(c.read_u32()?);
        let last_object_id = c.read_u32()?;
        let last_tile_id = c.read_u32()?;
        let game_id = c.read_u32()?;

        let mut guid = [0u8; 16];
        guid.copy_from_slice(c.read_bytes(16)?);

        let name = StringRef(c.read_u32()?);
        let major = c.read_u32()?;
        let minor = c.read_u32()?;
        let release = c.read_u32()?;
        let build = c.read_u32()?;
        let window_width = c.read_u32()?;
        let window_height = c.read_u32()?;

        Ok(Self {
            debug,
            bytecode_version,
            filename,
            config,
            last_object_id,
            last_tile_id,
            game_id,
            guid,
            name,
            major,
            minor,
            release,
            build,
            window_width,
            window_height,
        })
    }
}
