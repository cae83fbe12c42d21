//! # Atlas Packer
//!
//! A Rust library for packing tinted textures (and their companion normal
//! maps) into uniform-grid texture atlases and remapping mesh UVs into them.
//!
//! ## Overview
//!
//! Many objects that need distinct materials only because they use distinct
//! textures or tint colors can share one material per atlas. This library
//! deduplicates (texture, tint) combinations, chooses a rows x columns grid
//! of power-of-two cells that fits a size ceiling with minimal waste,
//! composites the diffuse and normal atlases with correct color-space
//! handling, and transforms every consumer mesh's UVs into its assigned cell.
//!
//! ## Quick Start
//!
//! ```ignore
//! use atlas_packer::{ImageData, Packer, PackerConfig, SurfaceInput, ColorSpace};
//!
//! let brick = ImageData::from_png_bytes(&brick_png, ColorSpace::Perceptual)?;
//! let stone = ImageData::from_png_bytes(&stone_png, ColorSpace::Perceptual)?;
//!
//! let surfaces = vec![
//!     SurfaceInput {
//!         diffuse: Some(brick.as_source(0)),
//!         normal: None,
//!         tint: [1.0, 0.8, 0.8, 1.0],
//!         tint_enabled: true,
//!         uvs: &wall_uvs,
//!     },
//!     SurfaceInput {
//!         diffuse: Some(stone.as_source(1)),
//!         normal: None,
//!         tint: [1.0, 1.0, 1.0, 1.0],
//!         tint_enabled: false,
//!         uvs: &floor_uvs,
//!     },
//! ];
//!
//! let output = Packer::new().pack(&surfaces)?;
//! let png = output.diffuse_atlas.to_png()?;
//! for warning in &output.warnings {
//!     eprintln!("{warning}");
//! }
//! ```
//!
//! The packer never performs file I/O: sources arrive as borrowed pixel views
//! ([`SourceImage`]) and atlases leave as raw buffers ([`AtlasImage`]) plus a
//! serializable [`AtlasLayout`] manifest for the persistence layer.

pub mod atlas;
pub mod entries;
pub mod error;
pub mod grid;
pub mod layout;
pub mod packer;
pub mod remap;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use atlas::{composite, AtlasImage, AtlasKind};
pub use entries::{CanonicalImages, CombinedEntry, Deduplicator, Observation};
pub use error::{PackError, PackWarning, Result};
pub use grid::{plan_grid, GridPlan, MIN_CELL_SIZE};
pub use layout::{AtlasLayout, CellRegion};
pub use packer::{PackOutput, Packer, PackerConfig, SurfaceInput, SurfaceResult};
pub use remap::{remap_uvs, RemappedUvs};
pub use source::{ImageData, SourceImage};
pub use types::{ColorSpace, FLAT_NORMAL_PIXEL, NEUTRAL_TINT, WHITE_PIXEL};
