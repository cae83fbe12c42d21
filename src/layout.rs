//! Serializable atlas layout manifest.
//!
//! Describes the grid and every entry's cell so the persistence layer can
//! import the atlas and wire materials without re-deriving the packing.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::grid::GridPlan;

/// The complete layout of one packing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasLayout {
    /// Number of cell rows.
    pub rows: u32,
    /// Number of cell columns.
    pub columns: u32,
    /// Cell edge length in pixels, excluding padding.
    pub cell_size: u32,
    /// Padding border around each cell in pixels.
    pub padding: u32,
    /// Atlas width in pixels.
    pub width: u32,
    /// Atlas height in pixels.
    pub height: u32,
    /// One region per entry, in entry order.
    pub cells: Vec<CellRegion>,
}

/// One entry's cell in the atlas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRegion {
    /// Entry index (also the position in `cells`).
    pub entry: usize,
    /// Grid row.
    pub row: u32,
    /// Grid column.
    pub column: u32,
    /// Pixel x of the cell content, inside the padding border.
    pub x: u32,
    /// Pixel y of the cell content, inside the padding border.
    pub y: u32,
    /// Normalized left edge of the cell in grid space.
    pub u_min: f32,
    /// Normalized top edge of the cell in grid space.
    pub v_min: f32,
    /// Normalized right edge of the cell in grid space.
    pub u_max: f32,
    /// Normalized bottom edge of the cell in grid space.
    pub v_max: f32,
}

impl AtlasLayout {
    /// Build the layout for a plan and entry count.
    pub fn from_plan(plan: &GridPlan, padding: u32, entry_count: usize) -> Self {
        let stride = plan.cell_stride(padding);
        let cells = (0..entry_count)
            .map(|entry| {
                let (row, col) = plan.cell_of(entry);
                CellRegion {
                    entry,
                    row,
                    column: col,
                    x: col * stride + padding,
                    y: row * stride + padding,
                    u_min: col as f32 / plan.columns as f32,
                    v_min: row as f32 / plan.rows as f32,
                    u_max: (col + 1) as f32 / plan.columns as f32,
                    v_max: (row + 1) as f32 / plan.rows as f32,
                }
            })
            .collect();

        Self {
            rows: plan.rows,
            columns: plan.columns,
            cell_size: plan.cell_size,
            padding,
            width: plan.atlas_width(padding),
            height: plan.atlas_height(padding),
            cells,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
