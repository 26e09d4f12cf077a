//! Top-level handle tying the container, graph and caches together.

use std::sync::Arc;

use gmdata::GameData;
use image::RgbaImage;
use tracing::info;

use crate::cache::{RoomRenderCache, TilesetCache, DEFAULT_RENDER_CACHE_CAPACITY};
use crate::error::Result;
use crate::graph::{AssetGraph, AudioFormat, SoundPayload};
use crate::room::{self, RenderFilter};
use crate::sprite::SpriteAssembler;
use crate::texture::TexturePageStore;

/// One loaded container: raw bytes, resolved graph, page store, tile
/// slices and the room-render memo.
///
/// Everything is rebuilt wholesale by [`GameAssets::load`]; there is no
/// partial mutation after load.
pub struct GameAssets {
    game: GameData,
    graph: AssetGraph,
    store: TexturePageStore,
    tilesets: TilesetCache,
    renders: RoomRenderCache,
}

impl GameAssets {
    /// Parse a container and resolve it into a ready-to-render graph.
    pub fn load(bytes: Vec<u8>) -> Result<Self> {
        Self::load_with_cache_capacity(bytes, DEFAULT_RENDER_CACHE_CAPACITY)
    }

    /// Same as [`load`](Self::load) with an explicit render-cache bound.
    pub fn load_with_cache_capacity(bytes: Vec<u8>, capacity: usize) -> Result<Self> {
        let game = GameData::parse(bytes)?;
        let graph = AssetGraph::build(&game)?;
        let store = match game.txtr()? {
            Some(txtr) => TexturePageStore::new(txtr, game.data()),
            None => TexturePageStore::empty(),
        };
        let tilesets = TilesetCache::build(&graph, &store, game.data());
        info!(
            game = %graph.info.name,
            sprites = graph.sprites.len(),
            rooms = graph.rooms.len(),
            issues = graph.issues.len(),
            "container loaded"
        );
        Ok(Self {
            game,
            graph,
            store,
            tilesets,
            renders: RoomRenderCache::new(capacity),
        })
    }

    pub fn graph(&self) -> &AssetGraph {
        &self.graph
    }

    pub fn pages(&self) -> &TexturePageStore {
        &self.store
    }

    pub fn tilesets(&self) -> &TilesetCache {
        &self.tilesets
    }

    /// A frame assembler borrowing this container.
    pub fn assembler(&self) -> SpriteAssembler<'_> {
        SpriteAssembler::new(&self.graph, &self.store, self.game.data())
    }

    /// Realize one sprite frame.
    pub fn sprite_frame(&self, sprite: usize, frame: usize) -> Result<RgbaImage> {
        self.assembler().frame(sprite, frame)
    }

    /// Composite a room, going through the render cache.
    pub fn compose_room(&self, room: usize, filter: &RenderFilter) -> Result<Arc<RgbaImage>> {
        if let Some(hit) = self.renders.get(room, filter) {
            return Ok(hit);
        }
        // Composed outside the cache lock; a parallel caller may race to
        // compose the same key, which publishes the identical bitmap.
        let image = Arc::new(self.compose_room_uncached(room, filter)?);
        self.renders.insert(room, filter, Arc::clone(&image));
        Ok(image)
    }

    /// Composite a room, bypassing the render cache.
    pub fn compose_room_uncached(&self, room: usize, filter: &RenderFilter) -> Result<RgbaImage> {
        room::compose(
            &self.graph,
            room,
            filter,
            &self.store,
            &self.tilesets,
            self.game.data(),
        )
    }

    /// Embedded audio bytes and sniffed format for a sound, when present.
    pub fn sound_payload(&self, sound: usize) -> Option<(&[u8], AudioFormat)> {
        let record = self.graph.sounds.get(sound)?;
        let SoundPayload::Embedded { index, format } = &record.payload else {
            return None;
        };
        let audo = self.game.audo().ok()??;
        Some((audo.payload(*index, self.game.data())?, *format))
    }

    /// Drop memoized room renders, e.g. after a settings change that
    /// bypasses the filter key.
    pub fn invalidate_renders(&self) {
        self.renders.invalidate_all();
    }
}
