use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid container magic: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    UnexpectedEof {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("invalid chunk tag at offset {offset:#x}: {tag:?}")]
    InvalidChunkTag { offset: usize, tag: [u8; 4] },

    #[error("chunk {} at offset {offset:#x} overruns the envelope (end {end:#x}, envelope end {envelope_end:#x})", tag_name(.tag))]
    ChunkOverrun {
        tag: [u8; 4],
        offset: usize,
        end: usize,
        envelope_end: usize,
    },

    #[error("chunk {} not found", tag_name(.tag))]
    ChunkNotFound { tag: [u8; 4] },

    #[error("string at offset {offset:#x} is not valid UTF-8: {source}")]
    InvalidString {
        offset: usize,
        source: std::string::FromUtf8Error,
    },

    #[error("no string table entry at offset {offset:#x}")]
    UnresolvedString { offset: u32 },
}

fn tag_name(tag: &[u8; 4]) -> String {
    std::str::from_utf8(tag).unwrap_or("????").to_string()
}

pub type Result<T> = std::result::Result<T, Error>;
