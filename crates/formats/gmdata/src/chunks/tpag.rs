use std::collections::HashMap;

use crate::cursor::Cursor;
use crate::error::Result;

/// A texture page item: a rectangular crop of a texture page plus where it
/// lands on the asset's own canvas.
///
/// Sprites, backgrounds, and fonts reference these records by absolute
/// file address, so the table keeps an address → index map alongside the
/// records themselves.
#[derive(Debug, Clone, Copy)]
pub struct Region {
    /// Crop rectangle within the owning texture page.
    pub source_x: u16,
    pub source_y: u16,
    pub source_width: u16,
    pub source_height: u16,
    /// Placement of the crop on the asset's canvas (trimmed sprites have a
    /// non-zero target offset).
    pub target_x: u16,
    pub target_y: u16,
    pub target_width: u16,
    pub target_height: u16,
    /// Full canvas size the region belongs to.
    pub bounds_width: u16,
    pub bounds_height: u16,
    /// Index into the TXTR page table.
    pub page_id: u16,
}

/// Parsed TPAG chunk: the region table.
#[derive(Debug)]
pub struct Tpag {
    pub regions: Vec<Region>,
    by_address: HashMap<u32, usize>,
}

impl Tpag {
    /// Parse the TPAG chunk.
    pub fn parse(chunk_data: &[u8], data: &[u8]) -> Result<Self> {
        let mut c = Cursor::new(chunk_data);
        let pointers = c.read_pointer_list()?;

        let mut regions = Vec::with_capacity(pointers.len());
        let mut by_address = HashMap::with_capacity(pointers.len());
        for (i, ptr) in pointers.iter().enumerate() {
            let mut ec = Cursor::new(data).at_offset(*ptr as usize);
            regions.push(Region {
                source_x: ec.read_u16()?,
                source_y: ec.read_u16()?,
                source_width: ec.read_u16()?,
                source_height: ec.read_u16()?,
                target_x: ec.read_u16()?,
                target_y: ec.read_u16()?,
                target_width: ec.read_u16()?,
                target_height: ec.read_u16()?,
                bounds_width: ec.read_u16()?,
                bounds_height: ec.read_u16()?,
                page_id: ec.read_u16()?,
            });
            by_address.insert(*ptr, i);
        }
        Ok(Self {
            regions,
            by_address,
        })
    }

    /// Resolve an absolute record address to a region index.
    pub fn index_of(&self, address: u32) -> Option<usize> {
        self.by_address.get(&address).copied()
    }

    /// The full address → index map, for callers resolving many record
    /// addresses at once.
    pub fn address_index(&self) -> &HashMap<u32, usize> {
        &self.by_address
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
