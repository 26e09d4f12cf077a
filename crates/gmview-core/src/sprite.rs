//! Sprite frame assembly from texture-page regions.

use std::time::Duration;

use image::imageops;
use image::RgbaImage;
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::AssetGraph;
use crate::pixmap;
use crate::texture::TexturePageStore;

/// Realizes sprite frames by cropping texture pages and positioning the
/// crop on a sprite-sized canvas.
///
/// Borrows the graph, the page store and the raw file; cheap to construct
/// per call site.
pub struct SpriteAssembler<'a> {
    graph: &'a AssetGraph,
    store: &'a TexturePageStore,
    data: &'a [u8],
}

impl<'a> SpriteAssembler<'a> {
    pub fn new(graph: &'a AssetGraph, store: &'a TexturePageStore, data: &'a [u8]) -> Self {
        Self { graph, store, data }
    }

    /// Realize one frame of a sprite.
    ///
    /// The result is always the sprite's declared width×height; the
    /// region's crop lands at its target offset and everything else is
    /// transparent. Frames whose region or page is unavailable yield a
    /// typed error, never a truncated bitmap.
    pub fn frame(&self, sprite: usize, frame: usize) -> Result<RgbaImage> {
        let record = self
            .graph
            .sprites
            .get(sprite)
            .ok_or(Error::NoSuchSprite { index: sprite })?;
        let region_index = *record
            .frames
            .get(frame)
            .ok_or(Error::NoSuchFrame { sprite, frame })?;
        let region = region_index
            .and_then(|i| self.graph.regions.get(i))
            .filter(|r| r.available)
            .ok_or(Error::RegionUnavailable { sprite, frame })?;

        let page = self
            .store
            .page(region.page, self.data)
            .ok_or(Error::PageUnavailable { page: region.page })?;

        let crop = imageops::crop_imm(
            page,
            u32::from(region.source_x),
            u32::from(region.source_y),
            u32::from(region.source_width),
            u32::from(region.source_height),
        )
        .to_image();

        let mut canvas = RgbaImage::new(record.width, record.height);
        pixmap::blit(
            &mut canvas,
            &crop,
            i64::from(region.target_x),
            i64::from(region.target_y),
        );
        Ok(canvas)
    }

    /// The full frame sequence of a sprite.
    ///
    /// The iterator's length always equals the record's declared frame
    /// count; frames that cannot be realized come back as transparent
    /// placeholders rather than being dropped.
    pub fn frames(&self, sprite: usize) -> Result<Frames<'_, 'a>> {
        let record = self
            .graph
            .sprites
            .get(sprite)
            .ok_or(Error::NoSuchSprite { index: sprite })?;
        Ok(Frames {
            assembler: self,
            sprite,
            count: record.frames.len(),
            next: 0,
        })
    }

    /// Nominal display time of one frame.
    pub fn frame_duration(&self, sprite: usize) -> Result<Duration> {
        let record = self
            .graph
            .sprites
            .get(sprite)
            .ok_or(Error::NoSuchSprite { index: sprite })?;
        Ok(Duration::from_secs_f32(1.0 / record.playback_rate))
    }
}

/// Restartable frame sequence, see [`SpriteAssembler::frames`].
pub struct Frames<'s, 'a> {
    assembler: &'s SpriteAssembler<'a>,
    sprite: usize,
    count: usize,
    next: usize,
}

impl Iterator for Frames<'_, '_> {
    type Item = RgbaImage;

    fn next(&mut self) -> Option<RgbaImage> {
        if self.next >= self.count {
            return None;
        }
        let i = self.next;
        self.next += 1;
        let record = &self.assembler.graph.sprites[self.sprite];
        Some(match self.assembler.frame(self.sprite, i) {
            Ok(img) => img,
            Err(err) => {
                debug!(sprite = self.sprite, frame = i, %err, "substituting placeholder frame");
                RgbaImage::new(record.width, record.height)
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.count - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames<'_, '_> {}
