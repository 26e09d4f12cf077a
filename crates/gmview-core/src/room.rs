//! Room compositing.
//!
//! `compose` is a pure function of the graph, the room and the filter:
//! the canvas is local to the call, shared state is only read (page
//! decodes are idempotent), and identical inputs produce bit-identical
//! bitmaps.

use image::RgbaImage;
use tracing::debug;

use crate::cache::TilesetCache;
use crate::error::{Error, Result};
use crate::graph::{AssetGraph, RoomRecord};
use crate::pixmap;
use crate::sprite::SpriteAssembler;
use crate::texture::TexturePageStore;

/// Which room layers participate in a composite.
///
/// The whole value is the render-cache key, so every field change maps
/// to a distinct cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderFilter {
    pub backgrounds: bool,
    pub tiles: bool,
    pub instances: bool,
    /// Draw instances of invisible objects too.
    pub show_hidden: bool,
    pub depth_min: i32,
    pub depth_max: i32,
}

impl Default for RenderFilter {
    fn default() -> Self {
        Self {
            backgrounds: true,
            tiles: true,
            instances: true,
            show_hidden: false,
            depth_min: i32::MIN,
            depth_max: i32::MAX,
        }
    }
}

impl RenderFilter {
    fn admits_depth(&self, depth: i32) -> bool {
        depth >= self.depth_min && depth <= self.depth_max
    }
}

/// Composite a room into a flattened RGBA bitmap of its declared size.
///
/// Layer order: background color, non-foreground background layers in
/// declared order, tile layers, instances sorted by depth descending
/// (tie-break: declaration order ascending), foreground background
/// layers.
pub fn compose(
    graph: &AssetGraph,
    room_index: usize,
    filter: &RenderFilter,
    store: &TexturePageStore,
    tilesets: &TilesetCache,
    data: &[u8],
) -> Result<RgbaImage> {
    let room = graph
        .rooms
        .get(room_index)
        .ok_or(Error::NoSuchRoom { index: room_index })?;

    // The canvas is exactly the declared room size; a 0x0 room yields an
    // empty image.
    let mut canvas = RgbaImage::new(room.width, room.height);

    if filter.backgrounds {
        if room.draw_background_color {
            pixmap::fill_rgb(&mut canvas, room.background_color & 0x00FF_FFFF);
        }
        draw_background_layers(&mut canvas, room, filter, tilesets, false);
    }

    if filter.tiles {
        draw_tile_layers(&mut canvas, room, filter, tilesets);
    }

    if filter.instances {
        draw_instances(&mut canvas, graph, room, filter, store, data);
    }

    if filter.backgrounds {
        draw_background_layers(&mut canvas, room, filter, tilesets, true);
    }

    Ok(canvas)
}

fn draw_background_layers(
    canvas: &mut RgbaImage,
    room: &RoomRecord,
    filter: &RenderFilter,
    tilesets: &TilesetCache,
    foreground: bool,
) {
    for layer in &room.backgrounds {
        if layer.foreground != foreground || !layer.visible {
            continue;
        }
        if !filter.admits_depth(layer.depth) {
            continue;
        }
        let Some(image) = layer.background.and_then(|bg| tilesets.image(bg)) else {
            continue;
        };

        let (w, h) = (image.width() as i64, image.height() as i64);
        let xs = positions(layer.x as i64, w, canvas.width() as i64, layer.tile_h);
        let ys = positions(layer.y as i64, h, canvas.height() as i64, layer.tile_v);
        for &y in &ys {
            for &x in &xs {
                pixmap::blit(canvas, image, x, y);
            }
        }
    }
}

/// Draw positions along one axis: a single anchor, or the anchor tiled
/// across the canvas extent when repetition is on.
fn positions(anchor: i64, step: i64, extent: i64, repeat: bool) -> Vec<i64> {
    if !repeat || step <= 0 {
        return vec![anchor];
    }
    let first = anchor.rem_euclid(step) - step;
    (0..)
        .map(|i| first + i * step)
        .take_while(|&p| p < extent)
        .collect()
}

fn draw_tile_layers(
    canvas: &mut RgbaImage,
    room: &RoomRecord,
    filter: &RenderFilter,
    tilesets: &TilesetCache,
) {
    for layer in &room.tile_layers {
        if !filter.admits_depth(layer.depth) {
            continue;
        }
        let Some(bg) = layer.background else {
            continue;
        };

        // Cell extents come from the tileset's declared tile size.
        let (tw, th) = match tilesets.tile(bg, 0) {
            Some(t) => (t.width() as i64, t.height() as i64),
            None => continue,
        };
        for row in 0..layer.grid_height {
            for col in 0..layer.grid_width {
                let id = layer.cells[(row * layer.grid_width + col) as usize];
                let Some(tile) = tilesets.tile(bg, id) else {
                    continue;
                };
                pixmap::blit(
                    canvas,
                    tile,
                    layer.x as i64 + col as i64 * tw,
                    layer.y as i64 + row as i64 * th,
                );
            }
        }
    }
}

fn draw_instances(
    canvas: &mut RgbaImage,
    graph: &AssetGraph,
    room: &RoomRecord,
    filter: &RenderFilter,
    store: &TexturePageStore,
    data: &[u8],
) {
    let assembler = SpriteAssembler::new(graph, store, data);

    // (depth, order, instance index): higher depth draws first, so equal
    // input always yields the same paint order.
    let mut draw_list: Vec<(i32, usize, usize)> = Vec::new();
    for (i, inst) in room.instances.iter().enumerate() {
        let Some(object) = inst.object.and_then(|o| graph.objects.get(o)) else {
            continue;
        };
        if !object.visible && !filter.show_hidden {
            continue;
        }
        if !filter.admits_depth(object.depth) {
            continue;
        }
        draw_list.push((object.depth, inst.order, i));
    }
    draw_list.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    for (_, _, i) in draw_list {
        let inst = &room.instances[i];
        let object = match inst.object.and_then(|o| graph.objects.get(o)) {
            Some(o) => o,
            None => continue,
        };
        let Some(sprite_index) = object.sprite else {
            continue;
        };
        let frame = match assembler.frame(sprite_index, 0) {
            Ok(f) => f,
            Err(err) => {
                debug!(instance = inst.instance_id, %err, "skipping undrawable instance");
                continue;
            }
        };
        let sprite = &graph.sprites[sprite_index];
        let pivot = (sprite.origin_x as f32, sprite.origin_y as f32);

        let (mut image, mut pivot) = if inst.scale_x != 1.0 || inst.scale_y != 1.0 {
            pixmap::scale_flip(&frame, inst.scale_x, inst.scale_y, pivot)
        } else {
            (frame, pivot)
        };
        if inst.rotation.rem_euclid(360.0) != 0.0 {
            let rotated = pixmap::rotate_about(&image, inst.rotation, pivot);
            image = rotated.0;
            pivot = rotated.1;
        }
        pixmap::blit(
            canvas,
            &image,
            inst.x as i64 - pivot.0.round() as i64,
            inst.y as i64 - pivot.1.round() as i64,
        );
    }
}
