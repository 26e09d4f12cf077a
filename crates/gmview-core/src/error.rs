use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Container-level parse failure. Fatal: nothing usable was loaded.
    #[error(transparent)]
    Data(#[from] gmdata::Error),

    #[error("no sprite with index {index}")]
    NoSuchSprite { index: usize },

    #[error("no room with index {index}")]
    NoSuchRoom { index: usize },

    #[error("sprite {sprite} has no frame {frame}")]
    NoSuchFrame { sprite: usize, frame: usize },

    /// The frame's texture region failed validation or never resolved.
    #[error("texture region for sprite {sprite} frame {frame} is unavailable")]
    RegionUnavailable { sprite: usize, frame: usize },

    /// The texture page's PNG payload could not be decoded.
    #[error("texture page {page} is unavailable")]
    PageUnavailable { page: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
