//! Typed parsers for individual chunk formats (Layer 2).
//!
//! Each parser takes the chunk's content slice plus the full file data,
//! because records reference each other through absolute file offsets.

pub mod audo;
pub mod bgnd;
pub mod extn;
pub mod font;
pub mod gen8;
pub mod objt;
pub mod path;
pub mod room;
pub mod scpt;
pub mod shdr;
pub mod sond;
pub mod sprt;
pub mod tmln;
pub mod tpag;
pub mod txtr;
