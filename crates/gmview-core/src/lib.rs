//! Asset realization over a parsed GameMaker container.
//!
//! Built on top of `gmdata`'s chunk parsers:
//! - `graph`: typed records resolved out of the raw chunks, plus the
//!   load-issue ledger
//! - `texture`: lazy PNG page decoding with per-page memoization
//! - `sprite`: frame assembly from texture-page regions
//! - `room`: pure-function room compositing behind a [`RenderFilter`]
//! - `cache`: eager tile slicing and the bounded room-render memo
//! - `assets`: the one-stop handle wiring all of the above together
//!
//! [`RenderFilter`]: room::RenderFilter

pub mod assets;
pub mod cache;
pub mod error;
pub mod graph;
pub mod pixmap;
pub mod room;
pub mod sprite;
pub mod texture;

pub use assets::GameAssets;
pub use cache::{RoomRenderCache, TilesetCache};
pub use error::{Error, Result};
pub use graph::{AssetGraph, AudioFormat, LoadIssue};
pub use room::RenderFilter;
pub use sprite::SpriteAssembler;
pub use texture::TexturePageStore;
