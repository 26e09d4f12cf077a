mod common;

use std::sync::Arc;

use common::{solid_image, ContainerBuilder, InstanceSpec, RoomBgSpec, RoomSpec, TileLayerSpec};
use gmview_core::{GameAssets, RenderFilter};
use image::{Rgba, RgbaImage};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

/// A 64x64 page whose top-left 16x16 tile is red and the rest green.
fn tileset_page() -> RgbaImage {
    let mut img = solid_image(64, 64, GREEN);
    for y in 0..16 {
        for x in 0..16 {
            img.put_pixel(x, y, Rgba(RED));
        }
    }
    img
}

fn tile_grid_container() -> Vec<u8> {
    let mut b = ContainerBuilder::new();
    let page = b.page(tileset_page());
    let region = b.region(page, (0, 0, 64, 64));
    let bg = b.background("bg_tiles", region, 16, 16, 4);
    let mut room = RoomSpec::new("room_tiles", 64, 64);
    room.tile_layers.push(TileLayerSpec {
        background: bg as i32,
        depth: 0,
        x: 0,
        y: 0,
        grid_width: 4,
        grid_height: 4,
        cells: vec![0; 16],
    });
    b.room(room);
    b.build()
}

#[test]
fn tile_grid_repeats_first_tile() {
    common::init_tracing();
    let assets = GameAssets::load(tile_grid_container()).unwrap();
    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();

    assert_eq!(bitmap.dimensions(), (64, 64));
    // Tile id 0 is the all-red 16x16 slice, so the whole 4x4 grid is red.
    assert!(bitmap.pixels().all(|p| p.0 == RED));
}

#[test]
fn tile_grid_respects_tile_toggle_and_depth_range() {
    let assets = GameAssets::load(tile_grid_container()).unwrap();

    let no_tiles = RenderFilter {
        tiles: false,
        ..RenderFilter::default()
    };
    let bitmap = assets.compose_room_uncached(0, &no_tiles).unwrap();
    assert!(bitmap.pixels().all(|p| p.0[3] == 0));

    // The layer sits at depth 0; a range that excludes it drops it too.
    let far_range = RenderFilter {
        depth_min: 100,
        depth_max: 200,
        ..RenderFilter::default()
    };
    let bitmap = assets.compose_room_uncached(0, &far_range).unwrap();
    assert!(bitmap.pixels().all(|p| p.0[3] == 0));
}

fn two_instance_container(depth_a: i32, depth_b: i32) -> Vec<u8> {
    // One page, left half red, right half blue.
    let mut img = solid_image(16, 8, RED);
    for y in 0..8 {
        for x in 8..16 {
            img.put_pixel(x, y, Rgba(BLUE));
        }
    }
    let mut b = ContainerBuilder::new();
    let page = b.page(img);
    let red = b.region(page, (0, 0, 8, 8));
    let blue = b.region(page, (8, 0, 8, 8));
    let spr_red = b.sprite("spr_red", 8, 8, (0, 0), &[red]);
    let spr_blue = b.sprite("spr_blue", 8, 8, (0, 0), &[blue]);
    let obj_a = b.object("obj_a", spr_red as i32, true, depth_a);
    let obj_b = b.object("obj_b", spr_blue as i32, true, depth_b);
    let mut room = RoomSpec::new("room_overlap", 16, 16);
    room.instances.push(InstanceSpec::at(0, 0, obj_a as i32));
    room.instances.push(InstanceSpec::at(0, 0, obj_b as i32));
    b.room(room);
    b.build()
}

#[test]
fn lower_depth_draws_on_top() {
    // obj_a (red) at depth 10, obj_b (blue) at depth 5: blue wins.
    let assets = GameAssets::load(two_instance_container(10, 5)).unwrap();
    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();
    assert_eq!(bitmap.get_pixel(0, 0), &Rgba(BLUE));

    // Swapped depths put red on top.
    let assets = GameAssets::load(two_instance_container(5, 10)).unwrap();
    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();
    assert_eq!(bitmap.get_pixel(0, 0), &Rgba(RED));
}

#[test]
fn equal_depth_breaks_ties_by_declaration_order() {
    // Later declaration draws on top.
    let assets = GameAssets::load(two_instance_container(7, 7)).unwrap();
    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();
    assert_eq!(bitmap.get_pixel(0, 0), &Rgba(BLUE));
}

#[test]
fn hidden_objects_need_show_hidden() {
    let mut b = ContainerBuilder::new();
    let page = b.page(solid_image(8, 8, RED));
    let region = b.region(page, (0, 0, 8, 8));
    let sprite = b.sprite("spr_secret", 8, 8, (0, 0), &[region]);
    let obj = b.object("obj_secret", sprite as i32, false, 0);
    let mut room = RoomSpec::new("room_secret", 8, 8);
    room.instances.push(InstanceSpec::at(0, 0, obj as i32));
    b.room(room);
    let assets = GameAssets::load(b.build()).unwrap();

    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();
    assert!(bitmap.pixels().all(|p| p.0[3] == 0));

    let reveal = RenderFilter {
        show_hidden: true,
        ..RenderFilter::default()
    };
    let bitmap = assets.compose_room_uncached(0, &reveal).unwrap();
    assert_eq!(bitmap.get_pixel(0, 0), &Rgba(RED));
}

#[test]
fn background_color_fills_beneath_layers() {
    let mut b = ContainerBuilder::new();
    let mut room = RoomSpec::new("room_sky", 8, 8);
    room.background_color = 0xFF33_6699;
    room.draw_background_color = true;
    b.room(room);
    let assets = GameAssets::load(b.build()).unwrap();

    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();
    assert!(bitmap.pixels().all(|p| p.0 == [0x33, 0x66, 0x99, 0xFF]));

    // With backgrounds filtered out, the underlay goes too.
    let bare = RenderFilter {
        backgrounds: false,
        ..RenderFilter::default()
    };
    let bitmap = assets.compose_room_uncached(0, &bare).unwrap();
    assert!(bitmap.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn foreground_background_covers_instances() {
    // One page: green overall, bottom-right quarter red.
    let mut img = solid_image(16, 16, GREEN);
    for y in 8..16 {
        for x in 8..16 {
            img.put_pixel(x, y, Rgba(RED));
        }
    }
    let mut b = ContainerBuilder::new();
    let page = b.page(img);
    let green = b.region(page, (0, 0, 8, 8));
    let red = b.region(page, (8, 8, 8, 8));
    let bg = b.background("bg_front", green, 0, 0, 0);
    let sprite = b.sprite("spr_block", 8, 8, (0, 0), &[red]);
    let obj = b.object("obj_block", sprite as i32, true, 0);
    let mut room = RoomSpec::new("room_front", 8, 8);
    room.backgrounds.push(RoomBgSpec {
        background: bg as i32,
        foreground: true,
        x: 0,
        y: 0,
        tile_h: false,
        tile_v: false,
        depth: 0,
    });
    room.instances.push(InstanceSpec::at(0, 0, obj as i32));
    b.room(room);
    let assets = GameAssets::load(b.build()).unwrap();

    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();
    // The foreground layer composites after instances.
    assert_eq!(bitmap.get_pixel(0, 0), &Rgba(GREEN));
}

#[test]
fn compose_is_pure() {
    let mut b = ContainerBuilder::new();
    let page = b.page(tileset_page());
    let region = b.region(page, (0, 0, 64, 64));
    let bg = b.background("bg_tiles", region, 16, 16, 4);
    let sprite = b.sprite("spr_mark", 16, 16, (8, 8), &[region]);
    let obj = b.object("obj_mark", sprite as i32, true, -5);
    let mut room = RoomSpec::new("room_mix", 64, 64);
    room.tile_layers.push(TileLayerSpec {
        background: bg as i32,
        depth: 0,
        x: 0,
        y: 0,
        grid_width: 2,
        grid_height: 2,
        cells: vec![0, 1, 4, 5],
    });
    let mut inst = InstanceSpec::at(40, 40, obj as i32);
    inst.scale_x = -2.0;
    inst.rotation = 90.0;
    room.instances.push(inst);
    b.room(room);
    let assets = GameAssets::load(b.build()).unwrap();

    let filter = RenderFilter::default();
    let first = assets.compose_room_uncached(0, &filter).unwrap();
    let second = assets.compose_room_uncached(0, &filter).unwrap();
    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn render_cache_hits_and_keys() {
    let assets = GameAssets::load(tile_grid_container()).unwrap();
    let filter = RenderFilter::default();

    let fresh = assets.compose_room_uncached(0, &filter).unwrap();
    let first = assets.compose_room(0, &filter).unwrap();
    let second = assets.compose_room(0, &filter).unwrap();

    // Hit returns the published bitmap itself, identical to a fresh
    // composite of the same key.
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.as_raw(), fresh.as_raw());

    // Any changed filter field is a different key.
    let other = RenderFilter {
        tiles: false,
        ..filter
    };
    let third = assets.compose_room(0, &other).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_ne!(first.as_raw(), third.as_raw());

    // Invalidation forces a recompute; contents stay identical.
    assets.invalidate_renders();
    let fourth = assets.compose_room(0, &filter).unwrap();
    assert!(!Arc::ptr_eq(&first, &fourth));
    assert_eq!(first.as_raw(), fourth.as_raw());
}

#[test]
fn zero_sized_room_composes_empty() {
    let mut b = ContainerBuilder::new();
    b.room(RoomSpec::new("room_void", 0, 0));

    let assets = GameAssets::load(b.build()).unwrap();
    let bitmap = assets
        .compose_room_uncached(0, &RenderFilter::default())
        .unwrap();

    // The canvas is exactly the declared size, never padded.
    assert_eq!(bitmap.dimensions(), (0, 0));
}
