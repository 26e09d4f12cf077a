use crate::error::{Error, Result};

/// Read cursor over a byte slice. All multi-byte reads are little-endian.
///
/// Every read is bounds-checked; running off the end yields
/// [`Error::UnexpectedEof`] rather than partial data.
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte position.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total length of underlying data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Remaining bytes from current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Seek to an absolute position.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Skip `n` bytes forward.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a slice of `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a 4-byte chunk tag / magic.
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        self.read_array::<4>()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a boolean stored as a 32-bit word (0 = false, nonzero = true).
    pub fn read_bool32(&mut self) -> Result<bool> {
        Ok(self.read_u32()? != 0)
    }

    /// Read a GameMaker string at the current position: u32 length + bytes +
    /// null terminator.
    pub fn read_gm_string(&mut self) -> Result<String> {
        let offset = self.pos;
        let len = self.read_u32()? as usize;
        let bytes = self.read_bytes(len)?;
        self.skip(1)?; // null terminator
        String::from_utf8(bytes.to_vec()).map_err(|e| Error::InvalidString { offset, source: e })
    }

    /// Read a pointer list: u32 count, then count × u32 absolute file offsets.
    ///
    /// This is the container's recurring "count + offsets to variable-length
    /// records" pattern. The returned offsets are finite and the list can be
    /// re-walked freely.
    pub fn read_pointer_list(&mut self) -> Result<Vec<u32>> {
        let count = self.read_u32()? as usize;
        // A count cannot describe more offsets than the buffer has bytes for.
        if count > self.remaining() / 4 {
            return Err(Error::UnexpectedEof {
                offset: self.pos,
                need: count * 4,
                have: self.remaining(),
            });
        }
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(self.read_u32()?);
        }
        Ok(offsets)
    }

    /// Access the full underlying data (for absolute offset reads).
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Create a cursor over the same data positioned at an absolute offset.
    pub fn at_offset(&self, offset: usize) -> Self {
        Self {
            data: self.data,
            pos: offset,
        }
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos + n > self.data.len() {
            return Err(Error::UnexpectedEof {
                offset: self.pos,
                need: n,
                have: self.remaining(),
            });
        }
        Ok(())
    }
}

/// Byte-buffer builder used by tests to assemble synthetic containers.
/// All writes are little-endian.
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_tag(&mut self, tag: &[u8; 4]) {
        self.buf.extend_from_slice(tag);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    /// Write a GameMaker string: u32 length + bytes + null terminator.
    pub fn write_gm_string(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.buf.extend_from_slice(s.as_bytes());
        self.buf.push(0);
    }

    /// Patch a u32 at a specific position (for backpatching pointers).
    pub fn patch_u32(&mut self, pos: usize, v: u32) {
        self.buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Pad to 4-byte alignment.
    pub fn align4(&mut self) {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
