use crate::cursor::Cursor;
use crate::error::Result;
use crate::string_table::StringRef;

/// A shader entry: name, type tag and GLSL-style source references.
#[derive(Debug)]
pub struct ShaderEntry {
    pub name: StringRef,
    pub shader_type: StringRef,
    pub vertex_source: StringRef,
    pub fragment_source: StringRef,
}

/// Parsed SHDR chunk.
#[derive(Debug)]
pub struct Shdr {
    pub shaders: Vec<ShaderEntry>,
}

impl Shdr {
    /// Parse the SHDR chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut shaders = Vec::with_capacity(pointers.len());
        for ptr in pointers {
            let mut ec = Cursor::new(data).at_offset(ptr as usize);
            shaders.push(ShaderEntry {
                name: StringRef(ec.read_u32()?),
                shader_type: StringRef(ec.read_u32()?),
                vertex_source: StringRef(ec.read_u32()?),
                fragment_source: StringRef(ec.read_u32()?),
            });
        }
        Ok(Self { shaders })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Writer;

    #[test]
    fn parses_source_references() {
        let mut file = Writer::new();
        let entry_abs = file.position() as u32;
        file.write_u32(0x100);
        file.write_u32(0x110);
        file.write_u32(0x120);
        file.write_u32(0x130);
        let file = file.into_bytes();

        let mut chunk = Writer::new();
        chunk.write_u32(1);
        chunk.write_u32(entry_abs);
        let chunk = chunk.into_bytes();

        let shdr = Shdr::parse(&chunk, &file).unwrap();
        let s = &shdr.shaders[0];
        assert_eq!(s.vertex_source.0, 0x120);
        assert_eq!(s.fragment_source.0, 0x130);
    }
}
