//! Shared color types and conversions.

/// Color space interpretation of RGBA8 pixel data.
///
/// Diffuse textures are stored perceptually (sRGB-encoded); normal maps are
/// stored linearly. Resampling must interpolate in the right space — mixing
/// them corrupts normal vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Gamma-encoded (sRGB) values, as authored for display.
    Perceptual,
    /// Linear values, as consumed by lighting math.
    Linear,
}

/// Opaque white, the background and substitute pixel for diffuse atlases.
pub const WHITE_PIXEL: [u8; 4] = [255, 255, 255, 255];

/// Flat "pointing up" tangent-space normal (0, 0, 1) encoded as RGBA8.
pub const FLAT_NORMAL_PIXEL: [u8; 4] = [128, 128, 255, 255];

/// Neutral tint that leaves diffuse pixels unchanged.
pub const NEUTRAL_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Quantize a float RGBA tint to 8-bit channels.
///
/// Identity keys compare quantized tints so that float noise below one
/// display step cannot split entries.
pub fn quantize_tint(tint: [f32; 4]) -> [u8; 4] {
    let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [q(tint[0]), q(tint[1]), q(tint[2]), q(tint[3])]
}

/// Decode an sRGB-encoded channel (0..1) to linear.
pub(crate) fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode a linear channel (0..1) to sRGB.
pub(crate) fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
