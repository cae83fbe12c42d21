//! UV remapping into atlas grid space.
//!
//! Transforms a mesh's UVs into its entry's cell of the normalized
//! rows x columns grid. Out-of-range input UVs are clamped to [0,1] first:
//! unclamped they would alias into neighboring cells once the texture stops
//! tiling per-object and starts addressing the shared atlas.
//!
//! Pixel padding never enters this math — it only shrinks the usable atlas
//! fraction per cell, which the compositor already accounts for in placement.

use glam::Vec2;

use crate::grid::GridPlan;

/// Result of remapping one mesh's UV set.
#[derive(Debug, Clone, PartialEq)]
pub struct RemappedUvs {
    /// The transformed coordinates, one per input UV.
    pub uvs: Vec<[f32; 2]>,
    /// Number of input UVs that had a component outside [0,1].
    pub clamped: usize,
}

impl RemappedUvs {
    /// Returns `true` if any input UV required clamping.
    pub fn was_clamped(&self) -> bool {
        self.clamped > 0
    }
}

/// Remap a UV sequence into the cell assigned to `entry_index`.
///
/// Pure function; the input is never mutated. Each UV is clamped to [0,1]
/// when any component lies outside, then scaled and offset into the cell's
/// sub-rectangle of the grid.
pub fn remap_uvs(uvs: &[[f32; 2]], entry_index: usize, plan: &GridPlan) -> RemappedUvs {
    let (row, col) = plan.cell_of(entry_index);
    let scale = Vec2::new(1.0 / plan.columns as f32, 1.0 / plan.rows as f32);
    let offset = Vec2::new(col as f32, row as f32) * scale;

    let mut clamped = 0;
    let remapped = uvs
        .iter()
        .map(|&uv| {
            let original = Vec2::from(uv);
            let bounded = original.clamp(Vec2::ZERO, Vec2::ONE);
            if bounded != original {
                clamped += 1;
            }
            (bounded * scale + offset).to_array()
        })
        .collect();

    RemappedUvs {
        uvs: remapped,
        clamped,
    }
}
