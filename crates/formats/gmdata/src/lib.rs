//! Reader for GameMaker's compiled data.win format.
//!
//! Three-layer architecture:
//! - **Layer 1** (`reader`): Raw chunk I/O — FORM envelope, chunk index
//! - **Layer 2** (`chunks`): Typed parsers for individual chunk formats
//! - **Layer 3** (`gamedata`): High-level lazy wrapper with cached accessors
//!
//! The format is read-only: nothing here re-encodes a container. The
//! byte-level `cursor::Writer` exists so tests can assemble synthetic
//! fixtures.

pub mod chunks;
pub mod cursor;
pub mod error;
pub mod gamedata;
pub mod reader;
pub mod string_table;

pub use error::{Error, Result};
pub use gamedata::GameData;
pub use reader::{ChunkIndex, ChunkSupport};
pub use string_table::{StringRef, StringTable};
