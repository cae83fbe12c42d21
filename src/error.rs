//! Error and warning types for atlas packing.

use thiserror::Error;

/// Result type alias using PackError.
pub type Result<T> = std::result::Result<T, PackError>;

/// Fatal errors that abort a packing run.
///
/// A failed run returns no partial output: atlases are all-or-nothing.
#[derive(Error, Debug)]
pub enum PackError {
    /// Failed to decode or encode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Failed to serialize or parse JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Pixel buffer length does not match the declared dimensions.
    #[error("Invalid image data: {width}x{height} RGBA needs {expected} bytes, got {actual}")]
    InvalidImageData {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    /// Maximum atlas size is not one of the supported values.
    #[error("Unsupported atlas size {0} (must be 256, 512, 1024, 2048 or 4096)")]
    InvalidAtlasSize(u32),

    /// No consumer surfaces were supplied.
    #[error("No surfaces to pack")]
    NoSurfaces,

    /// Compositing was asked to run with no entries.
    #[error("No texture entries to composite")]
    NoEntries,

    /// No grid satisfies the atlas size ceiling even at the minimum cell size.
    #[error("No grid for {entry_count} entries fits a {max_atlas_size}px atlas at any cell size")]
    GridUnsatisfiable {
        entry_count: usize,
        max_atlas_size: u32,
    },
}

/// Non-fatal conditions accumulated during a packing run.
///
/// Warnings are returned alongside successful output for the caller's UI to
/// display; they never abort the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PackWarning {
    /// A surface had no diffuse texture and received the canonical white.
    #[error("Surface {surface} has no diffuse texture; substituted opaque white")]
    MissingDiffuse { surface: usize },

    /// Two surfaces share a diffuse+tint entry but disagree on the normal map.
    #[error("Conflicting normal maps for atlas entry {entry}; keeping the first seen")]
    NormalConflict { entry: usize },

    /// A surface had UV coordinates outside [0,1] that were clamped.
    #[error("Surface {surface}: clamped {count} UV coordinates outside [0,1]")]
    UvClamped { surface: usize, count: usize },
}
