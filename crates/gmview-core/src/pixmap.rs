//! Small raster helpers shared by the sprite assembler and compositor.
//!
//! Everything works on straight-alpha `RgbaImage` buffers. Blitting goes
//! through `imageops::overlay`, which alpha-blends and clips to the
//! destination.

use image::imageops;
use image::{Rgba, RgbaImage};

/// Alpha-blend `src` onto `canvas` with its top-left at (x, y), clipped.
pub fn blit(canvas: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    imageops::overlay(canvas, src, x, y);
}

/// Fill the whole canvas with an opaque color given as 0x00RRGGBB.
pub fn fill_rgb(canvas: &mut RgbaImage, rgb: u32) {
    let pixel = Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF]);
    for p in canvas.pixels_mut() {
        *p = pixel;
    }
}

/// Scale and flip a bitmap per a signed scale pair, and return it with
/// the pivot point mapped into the result.
///
/// Nearest-neighbour scaling keeps pixel art crisp. A negative scale
/// mirrors along that axis, which also mirrors the pivot.
pub fn scale_flip(src: &RgbaImage, scale_x: f32, scale_y: f32, pivot: (f32, f32)) -> (RgbaImage, (f32, f32)) {
    let (w, h) = (src.width() as f32, src.height() as f32);
    let sw = (w * scale_x.abs()).round().max(1.0) as u32;
    let sh = (h * scale_y.abs()).round().max(1.0) as u32;

    let mut out = if (sw, sh) == src.dimensions() {
        src.clone()
    } else {
        imageops::resize(src, sw, sh, imageops::FilterType::Nearest)
    };
    let mut px = pivot.0 * scale_x.abs();
    let mut py = pivot.1 * scale_y.abs();
    if scale_x < 0.0 {
        out = imageops::flip_horizontal(&out);
        px = sw as f32 - px;
    }
    if scale_y < 0.0 {
        out = imageops::flip_vertical(&out);
        py = sh as f32 - py;
    }
    (out, (px, py))
}

/// Rotate a bitmap counter-clockwise (screen coordinates, y down) about
/// a pivot point, expanding the canvas to fit. Returns the rotated
/// bitmap and the pivot's position within it.
///
/// Nearest-neighbour inverse mapping; pixels outside the source stay
/// transparent.
pub fn rotate_about(src: &RgbaImage, degrees: f32, pivot: (f32, f32)) -> (RgbaImage, (f32, f32)) {
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin(), theta.cos());

    // Forward map of a point relative to the pivot, CCW on screen:
    //   x' =  x*cos + y*sin
    //   y' = -x*sin + y*cos
    let fw = |x: f32, y: f32| (x * cos + y * sin, -x * sin + y * cos);

    let (w, h) = (src.width() as f32, src.height() as f32);
    let corners = [
        fw(-pivot.0, -pivot.1),
        fw(w - pivot.0, -pivot.1),
        fw(-pivot.0, h - pivot.1),
        fw(w - pivot.0, h - pivot.1),
    ];
    let min_x = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
    let min_y = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
    let max_x = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
    let max_y = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

    let out_w = (max_x - min_x).round().max(1.0) as u32;
    let out_h = (max_y - min_y).round().max(1.0) as u32;
    let new_pivot = (-min_x, -min_y);

    let mut out = RgbaImage::new(out_w, out_h);
    for v in 0..out_h {
        for u in 0..out_w {
            let rx = u as f32 + 0.5 - new_pivot.0;
            let ry = v as f32 + 0.5 - new_pivot.1;
            // Inverse of the forward map (transpose of the rotation).
            let sx = rx * cos - ry * sin + pivot.0;
            let sy = rx * sin + ry * cos + pivot.1;
            if sx >= 0.0 && sy >= 0.0 && (sx as u32) < src.width() && (sy as u32) < src.height() {
                out.put_pixel(u, v, *src.get_pixel(sx as u32, sy as u32));
            }
        }
    }
    (out, new_pivot)
}
