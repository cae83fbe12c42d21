//! Color-space aware bilinear resampling.

use crate::source::{ImageData, SourceImage};
use crate::types::{linear_to_srgb, srgb_to_linear, ColorSpace};

/// Resample a source image into a square `target_size` buffer.
///
/// Interpolation happens in the space named by `mode`: color channels are
/// converted out of the source's storage space before mixing when the two
/// disagree, and the output is encoded in `mode`'s space. Alpha always
/// interpolates linearly. The source is never mutated.
pub fn resample(source: SourceImage<'_>, target_size: u32, mode: ColorSpace) -> ImageData {
    let color_lut = channel_lut(source.color_space(), mode);
    let alpha_lut = identity_lut();

    let src_w = source.width();
    let src_h = source.height();
    let scale_x = src_w as f32 / target_size as f32;
    let scale_y = src_h as f32 / target_size as f32;

    let mut pixels = Vec::with_capacity((target_size as usize) * (target_size as usize) * 4);

    for y in 0..target_size {
        let sy = (y as f32 + 0.5) * scale_y - 0.5;
        let y0 = sy.floor();
        let fy = sy - y0;
        let iy0 = (y0 as i64).clamp(0, src_h as i64 - 1) as u32;
        let iy1 = (y0 as i64 + 1).clamp(0, src_h as i64 - 1) as u32;

        for x in 0..target_size {
            let sx = (x as f32 + 0.5) * scale_x - 0.5;
            let x0 = sx.floor();
            let fx = sx - x0;
            let ix0 = (x0 as i64).clamp(0, src_w as i64 - 1) as u32;
            let ix1 = (x0 as i64 + 1).clamp(0, src_w as i64 - 1) as u32;

            let p00 = source.get_pixel(ix0, iy0);
            let p10 = source.get_pixel(ix1, iy0);
            let p01 = source.get_pixel(ix0, iy1);
            let p11 = source.get_pixel(ix1, iy1);

            for channel in 0..4 {
                let lut = if channel < 3 { &color_lut } else { &alpha_lut };
                let top = lerp(lut[p00[channel] as usize], lut[p10[channel] as usize], fx);
                let bottom = lerp(lut[p01[channel] as usize], lut[p11[channel] as usize], fx);
                let mixed = lerp(top, bottom, fy);
                pixels.push((mixed.clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
    }

    ImageData {
        width: target_size,
        height: target_size,
        pixels,
        color_space: mode,
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Byte-to-working-space table for the color channels.
fn channel_lut(from: ColorSpace, to: ColorSpace) -> [f32; 256] {
    let mut lut = [0.0f32; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        let c = i as f32 / 255.0;
        *slot = match (from, to) {
            (ColorSpace::Perceptual, ColorSpace::Linear) => srgb_to_linear(c),
            (ColorSpace::Linear, ColorSpace::Perceptual) => linear_to_srgb(c),
            _ => c,
        };
    }
    lut
}

/// Byte-to-unit table for alpha, which carries no gamma.
fn identity_lut() -> [f32; 256] {
    let mut lut = [0.0f32; 256];
    for (i, slot) in lut.iter_mut().enumerate() {
        *slot = i as f32 / 255.0;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_same_space_is_identity() {
        let mut pixels = Vec::new();
        for i in 0..16u32 {
            pixels.extend_from_slice(&[(i * 16) as u8, 255 - (i * 16) as u8, i as u8, 255]);
        }
        let img = ImageData::new(4, 4, pixels.clone(), ColorSpace::Perceptual).unwrap();
        let out = resample(img.as_source(0), 4, ColorSpace::Perceptual);
        assert_eq!(out.pixels, pixels);
    }

    #[test]
    fn test_solid_color_is_invariant_under_scaling() {
        let img = ImageData::solid(7, 7, [200, 100, 50, 255], ColorSpace::Perceptual);
        for target in [1u32, 4, 16, 64] {
            let out = resample(img.as_source(0), target, ColorSpace::Perceptual);
            assert_eq!(out.width, target);
            for px in out.pixels.chunks(4) {
                assert_eq!(px, [200, 100, 50, 255]);
            }
        }
    }

    #[test]
    fn test_upscale_single_pixel() {
        let img = ImageData::solid(1, 1, [10, 20, 30, 40], ColorSpace::Linear);
        let out = resample(img.as_source(0), 8, ColorSpace::Linear);
        assert_eq!(out.pixels.len(), 8 * 8 * 4);
        assert!(out.pixels.chunks(4).all(|px| px == [10, 20, 30, 40]));
    }

    #[test]
    fn test_interpolation_space_matters() {
        // Averaging black with sRGB 188 (linear ~0.5): mixing the encoded
        // bytes gives 94, mixing the decoded linear values gives ~64.
        let img = ImageData::new(
            2,
            1,
            vec![0, 0, 0, 255, 188, 188, 188, 255],
            ColorSpace::Perceptual,
        )
        .unwrap();

        let perceptual = resample(img.as_source(0), 1, ColorSpace::Perceptual);
        assert_eq!(perceptual.get_pixel(0, 0)[0], 94);

        let linear = resample(img.as_source(0), 1, ColorSpace::Linear);
        let value = linear.get_pixel(0, 0)[0];
        assert!((62..=66).contains(&value), "got {value}");
    }

    #[test]
    fn test_alpha_never_gamma_converted() {
        let img = ImageData::new(
            2,
            1,
            vec![0, 0, 0, 0, 0, 0, 0, 200],
            ColorSpace::Perceptual,
        )
        .unwrap();
        let out = resample(img.as_source(0), 1, ColorSpace::Linear);
        // Alpha mixes linearly whatever the color-space conversion does
        assert_eq!(out.get_pixel(0, 0)[3], 100);
    }

    #[test]
    fn test_output_carries_requested_space() {
        let img = ImageData::solid(2, 2, [128, 128, 255, 255], ColorSpace::Linear);
        let out = resample(img.as_source(0), 4, ColorSpace::Linear);
        assert_eq!(out.color_space, ColorSpace::Linear);
    }
}
