//! Atlas image construction.
//!
//! [`resample`](resample::resample) scales source textures into uniform cells
//! and [`composite`](compositor::composite) assembles the cells into the final
//! atlas pixel buffer.

mod compositor;
mod resample;

pub use compositor::{composite, AtlasImage, AtlasKind};
pub use resample::resample;
