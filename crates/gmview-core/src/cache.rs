//! Tile slicing and room-render memoization.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use image::imageops;
use image::RgbaImage;
use tracing::debug;

use crate::graph::AssetGraph;
use crate::room::RenderFilter;
use crate::texture::TexturePageStore;

/// Pre-sliced tile bitmaps, one set per background.
///
/// Built eagerly at load so the compositor never re-crops per room. Tile
/// ids index row-major across the background's region; `tile_columns`
/// gives the stride when set, otherwise it is derived from the region
/// width.
pub struct TilesetCache {
    sets: Vec<TilesetSlot>,
}

struct TilesetSlot {
    /// The background's full region bitmap, used by room background
    /// layers.
    image: Option<RgbaImage>,
    tiles: Vec<RgbaImage>,
}

impl TilesetCache {
    /// Slice every background's region. Backgrounds whose region or page
    /// is unavailable get an empty slot.
    pub fn build(graph: &AssetGraph, store: &TexturePageStore, data: &[u8]) -> Self {
        let sets = graph
            .backgrounds
            .iter()
            .map(|bg| {
                let image = bg
                    .region
                    .and_then(|i| graph.regions.get(i))
                    .filter(|r| r.available)
                    .and_then(|r| {
                        let page = store.page(r.page, data)?;
                        Some(
                            imageops::crop_imm(
                                page,
                                u32::from(r.source_x),
                                u32::from(r.source_y),
                                u32::from(r.source_width),
                                u32::from(r.source_height),
                            )
                            .to_image(),
                        )
                    });

                let tiles = match (&image, bg.is_tileset()) {
                    (Some(img), true) => slice_tiles(img, bg.tile_width, bg.tile_height, bg.tile_columns),
                    _ => Vec::new(),
                };
                TilesetSlot { image, tiles }
            })
            .collect();
        Self { sets }
    }

    /// The background's full region bitmap, if it realized.
    pub fn image(&self, background: usize) -> Option<&RgbaImage> {
        self.sets.get(background)?.image.as_ref()
    }

    /// The pre-sliced bitmap for one tile id.
    pub fn tile(&self, background: usize, id: i32) -> Option<&RgbaImage> {
        if id < 0 {
            return None;
        }
        self.sets.get(background)?.tiles.get(id as usize)
    }

    /// How many tiles a background sliced into.
    pub fn tile_count(&self, background: usize) -> usize {
        self.sets.get(background).map_or(0, |s| s.tiles.len())
    }
}

fn slice_tiles(image: &RgbaImage, tile_w: u32, tile_h: u32, columns: u32) -> Vec<RgbaImage> {
    let cols = if columns > 0 {
        columns.min(image.width() / tile_w.max(1)).max(1)
    } else {
        (image.width() / tile_w.max(1)).max(1)
    };
    let rows = image.height() / tile_h.max(1);

    let mut tiles = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            tiles.push(
                imageops::crop_imm(image, col * tile_w, row * tile_h, tile_w, tile_h).to_image(),
            );
        }
    }
    tiles
}

/// Bounded memo of composited rooms, keyed by room index + filter.
///
/// Bitmaps go in fully composed; a reader either gets a complete `Arc`
/// or a miss. Eviction is least-recently-used over a monotonic stamp.
pub struct RoomRenderCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    entries: HashMap<(usize, RenderFilter), (u64, Arc<RgbaImage>)>,
    stamp: u64,
}

pub const DEFAULT_RENDER_CACHE_CAPACITY: usize = 16;

impl RoomRenderCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                stamp: 0,
            }),
            capacity: capacity.max(1),
        }
    }

    /// Fetch a composited bitmap, refreshing its recency on hit.
    pub fn get(&self, room: usize, filter: &RenderFilter) -> Option<Arc<RgbaImage>> {
        let mut inner = self.lock();
        inner.stamp += 1;
        let stamp = inner.stamp;
        let (last_used, image) = inner.entries.get_mut(&(room, *filter))?;
        *last_used = stamp;
        Some(Arc::clone(image))
    }

    /// Publish a finished composite. Evicts the least recently used entry
    /// when full. The bitmap must be complete before insertion; callers
    /// compose outside the lock.
    pub fn insert(&self, room: usize, filter: &RenderFilter, image: Arc<RgbaImage>) {
        let mut inner = self.lock();
        inner.stamp += 1;
        let stamp = inner.stamp;
        if inner.entries.len() >= self.capacity && !inner.entries.contains_key(&(room, *filter)) {
            if let Some(oldest) = inner
                .entries
                .iter()
                .min_by_key(|(_, (used, _))| *used)
                .map(|(k, _)| *k)
            {
                debug!(room = oldest.0, "evicting room render");
                inner.entries.remove(&oldest);
            }
        }
        inner.entries.insert((room, *filter), (stamp, image));
    }

    /// Drop every entry, e.g. when the container is reloaded.
    pub fn invalidate_all(&self) {
        self.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheInner> {
        // A poisoned lock means a panic mid-bookkeeping; the map itself
        // only ever holds complete entries, so keep serving it.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for RoomRenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_CACHE_CAPACITY)
    }
}
