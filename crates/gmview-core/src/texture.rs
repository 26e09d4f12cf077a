//! Lazy texture-page decoding.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

use gmdata::chunks::txtr::Txtr;
use image::RgbaImage;
use tracing::warn;

/// One page's payload location and decode cell.
struct PageSlot {
    /// Byte span of the PNG stream within the file, when one was found.
    span: Option<(usize, usize)>,
    /// Dimensions from the PNG header, known without decoding.
    dimensions: Option<(u32, u32)>,
    /// Decoded pixels, filled at most once. `Some(None)` marks a page
    /// whose payload failed to decode; regions on it stay unavailable.
    pixels: OnceLock<Option<RgbaImage>>,
}

/// Owns the decoded RGBA bitmaps of every texture page.
///
/// Decoding is deferred until a region on the page is first realized and
/// the result is kept for the store's lifetime. Each page has its own
/// cell, so different pages can decode concurrently; the same page
/// decodes at most once.
pub struct TexturePageStore {
    pages: Vec<PageSlot>,
    decodes: AtomicUsize,
}

impl TexturePageStore {
    /// Index the page payloads of a parsed TXTR chunk.
    pub fn new(txtr: &Txtr, data: &[u8]) -> Self {
        let pages = (0..txtr.pages.len())
            .map(|i| PageSlot {
                span: txtr
                    .payload(i, data)
                    .map(|p| (txtr.pages[i].data_offset as usize, p.len())),
                dimensions: txtr.pages[i].dimensions,
                pixels: OnceLock::new(),
            })
            .collect();
        Self {
            pages,
            decodes: AtomicUsize::new(0),
        }
    }

    /// A store over zero pages, for containers without a TXTR chunk.
    pub fn empty() -> Self {
        Self {
            pages: Vec::new(),
            decodes: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Header dimensions of a page, available before any decode.
    pub fn dimensions(&self, index: usize) -> Option<(u32, u32)> {
        self.pages.get(index)?.dimensions
    }

    /// The decoded bitmap of a page, decoding on first access.
    ///
    /// `data` must be the same file buffer the store was built over.
    /// Returns `None` for an out-of-range index, a page with no payload,
    /// or a page whose payload failed to decode; the failure is recorded
    /// once and every later access short-circuits.
    pub fn page(&self, index: usize, data: &[u8]) -> Option<&RgbaImage> {
        let slot = self.pages.get(index)?;
        slot.pixels
            .get_or_init(|| {
                let (offset, length) = slot.span?;
                let payload = data.get(offset..offset + length)?;
                self.decodes.fetch_add(1, Ordering::Relaxed);
                match image::load_from_memory_with_format(payload, image::ImageFormat::Png) {
                    Ok(img) => Some(img.into_rgba8()),
                    Err(err) => {
                        warn!(page = index, %err, "texture page failed to decode");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// How many page decodes have actually run. Memoization means this
    /// never exceeds the page count.
    pub fn decoded_pages(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }
}
