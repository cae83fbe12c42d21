//! Atlas compositing.
//!
//! Fills an atlas buffer with a type-appropriate background, then resamples
//! each entry into its grid cell. The diffuse and normal atlases are two
//! independent calls sharing the same plan and entry ordering, which is what
//! keeps them spatially aligned per entry.

use image::ImageEncoder;

use crate::atlas::resample::resample;
use crate::entries::CombinedEntry;
use crate::error::{PackError, Result};
use crate::grid::GridPlan;
use crate::source::SourceImage;
use crate::types::{ColorSpace, FLAT_NORMAL_PIXEL, WHITE_PIXEL};

/// Which of the two parallel atlases is being composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtlasKind {
    /// Diffuse color atlas, perceptually encoded.
    Diffuse,
    /// Normal map atlas, linearly encoded.
    Normal,
}

impl AtlasKind {
    /// Background pixel used for the whole buffer before any entry lands.
    ///
    /// Unused (wasted) cells render as this value rather than garbage.
    pub fn background_pixel(&self) -> [u8; 4] {
        match self {
            AtlasKind::Diffuse => WHITE_PIXEL,
            AtlasKind::Normal => FLAT_NORMAL_PIXEL,
        }
    }

    /// Color space entries are resampled in for this atlas.
    pub fn color_space(&self) -> ColorSpace {
        match self {
            AtlasKind::Diffuse => ColorSpace::Perceptual,
            AtlasKind::Normal => ColorSpace::Linear,
        }
    }
}

/// A finished atlas pixel buffer.
///
/// Mutated only during compositing; read-only once returned. Persisting it
/// (and declaring its color-space intent to the importer) is the caller's job.
#[derive(Debug, Clone)]
pub struct AtlasImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 pixel data.
    pub pixels: Vec<u8>,
    /// Color space the pixel values are encoded in.
    pub color_space: ColorSpace,
}

impl AtlasImage {
    /// Get a pixel at (x, y).
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Export the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let cursor = std::io::Cursor::new(&mut bytes);
        let encoder = image::codecs::png::PngEncoder::new(cursor);
        encoder.write_image(
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }
}

/// Composite one atlas from the ordered entry list.
///
/// Entry `i` lands in cell `(i / columns, i % columns)` with its padding
/// border around it. For the diffuse atlas, entries with `apply_tint` get
/// their color channels multiplied by the tint (alpha untouched). Entries
/// without a normal map are skipped in the normal atlas — the flat background
/// already covers their cells.
pub fn composite(
    entries: &[CombinedEntry<'_>],
    plan: &GridPlan,
    padding: u32,
    kind: AtlasKind,
) -> Result<AtlasImage> {
    if entries.is_empty() {
        return Err(PackError::NoEntries);
    }

    let width = plan.atlas_width(padding);
    let height = plan.atlas_height(padding);
    let background = kind.background_pixel();

    let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 4);
    for _ in 0..(width as usize) * (height as usize) {
        pixels.extend_from_slice(&background);
    }

    let stride = plan.cell_stride(padding);
    for (i, entry) in entries.iter().enumerate() {
        let image: SourceImage<'_> = match kind {
            AtlasKind::Diffuse => entry.diffuse,
            AtlasKind::Normal => match entry.normal {
                Some(normal) => normal,
                None => continue,
            },
        };

        let mut cell = resample(image, plan.cell_size, kind.color_space());
        if kind == AtlasKind::Diffuse && entry.apply_tint {
            apply_tint(&mut cell.pixels, entry.tint);
        }

        let (row, col) = plan.cell_of(i);
        let origin_x = (col * stride + padding) as usize;
        let origin_y = (row * stride + padding) as usize;
        blit(
            &mut pixels,
            width as usize,
            origin_x,
            origin_y,
            &cell.pixels,
            plan.cell_size as usize,
        );
    }

    log::debug!(
        "composited {:?} atlas: {}x{}px, {} entries",
        kind,
        width,
        height,
        entries.len()
    );

    Ok(AtlasImage {
        width,
        height,
        pixels,
        color_space: kind.color_space(),
    })
}

/// Multiply color channels by the tint in place. Alpha is untouched.
fn apply_tint(pixels: &mut [u8], tint: [f32; 4]) {
    let r = tint[0].clamp(0.0, 1.0);
    let g = tint[1].clamp(0.0, 1.0);
    let b = tint[2].clamp(0.0, 1.0);
    for px in pixels.chunks_exact_mut(4) {
        px[0] = (px[0] as f32 * r).round() as u8;
        px[1] = (px[1] as f32 * g).round() as u8;
        px[2] = (px[2] as f32 * b).round() as u8;
    }
}

/// Copy a square cell buffer into the atlas at the given origin.
fn blit(
    atlas: &mut [u8],
    atlas_width: usize,
    origin_x: usize,
    origin_y: usize,
    cell: &[u8],
    cell_size: usize,
) {
    for row in 0..cell_size {
        let src_start = row * cell_size * 4;
        let dst_start = ((origin_y + row) * atlas_width + origin_x) * 4;
        atlas[dst_start..dst_start + cell_size * 4]
            .copy_from_slice(&cell[src_start..src_start + cell_size * 4]);
    }
}
