use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::string_table::StringRef;

/// One point along a path.
#[derive(Debug, Clone, Copy)]
pub struct PathPoint {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

/// A path entry in the PATH chunk. Points follow the header inline.
#[derive(Debug)]
pub struct PathEntry {
    pub name: StringRef,
    pub smooth: bool,
    pub closed: bool,
    pub precision: u32,
    pub points: Vec<PathPoint>,
}

/// Parsed PATH chunk.
#[derive(Debug)]
pub struct Path {
    pub paths: Vec<PathEntry>,
}

impl Path {
    /// Parse the PATH chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut paths = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            let name = StringRef(ec.read_u32()?);
            let smooth = ec.read_bool32()?;
            let closed = ec.read_bool32()?;
            let precision = ec.read_u32()?;
            let count = ec.read_u32()? as usize;
            if count > ec.remaining() / 12 {
                return Err(Error::UnexpectedEof {
                    offset: ec.position(),
                    need: count * 12,
                    have: ec.remaining(),
                });
            }
            let mut points = Vec::with_capacity(count);
            for _ in 0..count {
                points.push(PathPoint {
                    x: ec.read_f32()?,
                    y: ec.read_f32()?,
                    speed: ec.read_f32()?,
                });
            }
            paths.push(PathEntry {
                name,
                smooth,
                closed,
                precision,
                points,
            });
        }
        Ok(Self { paths })
    }
}
