//! The packing pipeline.
//!
//! One [`Packer::pack`] call runs the whole linear pass:
//! Collect -> Deduplicate -> Plan -> Composite(x2) -> Remap(xN). There is no
//! cross-invocation state; identical inputs in identical order reproduce
//! byte-identical atlases and UVs.

use crate::atlas::{composite, AtlasImage, AtlasKind};
use crate::entries::{CanonicalImages, Deduplicator, Observation};
use crate::error::{PackError, PackWarning, Result};
use crate::grid::plan_grid;
use crate::layout::AtlasLayout;
use crate::remap::remap_uvs;
use crate::source::SourceImage;

/// Atlas dimensions the packer accepts as the size ceiling.
pub const SUPPORTED_ATLAS_SIZES: [u32; 5] = [256, 512, 1024, 2048, 4096];

/// Packer configuration.
#[derive(Debug, Clone)]
pub struct PackerConfig {
    /// Maximum atlas dimension in pixels. Must be one of
    /// [`SUPPORTED_ATLAS_SIZES`].
    pub max_atlas_size: u32,
    /// Padding border around each cell in pixels.
    pub padding: u32,
    /// Build a second atlas from the entries' normal maps.
    pub pack_normal_maps: bool,
    /// Honor surface tint colors; when off, tints are ignored globally.
    pub apply_material_color: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_atlas_size: 1024,
            padding: 2,
            pack_normal_maps: false,
            apply_material_color: true,
        }
    }
}

impl PackerConfig {
    fn validate(&self) -> Result<()> {
        if !SUPPORTED_ATLAS_SIZES.contains(&self.max_atlas_size) {
            return Err(PackError::InvalidAtlasSize(self.max_atlas_size));
        }
        Ok(())
    }
}

/// One consumer surface: its textures, tint, and the mesh UVs that reference
/// them, in the asset layer's traversal order.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceInput<'a> {
    /// Diffuse texture, if the surface has one.
    pub diffuse: Option<SourceImage<'a>>,
    /// Companion normal map, if the surface has one.
    pub normal: Option<SourceImage<'a>>,
    /// Material tint color.
    pub tint: [f32; 4],
    /// Whether this surface wants its tint applied.
    pub tint_enabled: bool,
    /// The mesh's UV coordinates referencing the original texture.
    pub uvs: &'a [[f32; 2]],
}

/// Per-surface result: the assigned cell and the remapped UVs.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceResult {
    /// Index of the entry (= atlas cell) this surface was assigned.
    pub entry_index: usize,
    /// UVs transformed into the entry's cell. A fresh sequence; the input
    /// mesh is never mutated.
    pub uvs: Vec<[f32; 2]>,
}

/// Everything a packing run produces.
#[derive(Debug, Clone)]
pub struct PackOutput {
    /// The diffuse atlas, perceptually encoded.
    pub diffuse_atlas: AtlasImage,
    /// The normal atlas, linearly encoded. `Some` when normal packing is on.
    pub normal_atlas: Option<AtlasImage>,
    /// One result per input surface, in input order.
    pub surfaces: Vec<SurfaceResult>,
    /// Grid layout manifest for the persistence layer.
    pub layout: AtlasLayout,
    /// Accumulated non-fatal warnings.
    pub warnings: Vec<PackWarning>,
}

/// The atlas packer.
pub struct Packer {
    config: PackerConfig,
}

impl Packer {
    /// Create a packer with default configuration.
    pub fn new() -> Self {
        Self {
            config: PackerConfig::default(),
        }
    }

    /// Create a packer with custom configuration.
    pub fn with_config(config: PackerConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    /// Pack the given surfaces into atlases and remap their UVs.
    ///
    /// All-or-nothing: on error no partial atlases are returned. Recoverable
    /// conditions accumulate in [`PackOutput::warnings`] instead.
    pub fn pack(&self, surfaces: &[SurfaceInput<'_>]) -> Result<PackOutput> {
        self.config.validate()?;
        if surfaces.is_empty() {
            return Err(PackError::NoSurfaces);
        }

        let mut warnings = Vec::new();
        let canonicals = CanonicalImages::new();
        let mut dedup = Deduplicator::new(&canonicals, self.config.pack_normal_maps);

        let indices: Vec<usize> = surfaces
            .iter()
            .map(|s| {
                dedup.observe(
                    Observation {
                        diffuse: s.diffuse,
                        normal: s.normal,
                        tint: s.tint,
                        tint_enabled: s.tint_enabled && self.config.apply_material_color,
                    },
                    &mut warnings,
                )
            })
            .collect();
        let entries = dedup.finish();

        let max_source_dim = entries
            .iter()
            .map(|e| e.diffuse.max_dimension())
            .max()
            .unwrap_or(1);
        let plan = plan_grid(
            entries.len(),
            self.config.max_atlas_size,
            max_source_dim,
            self.config.padding,
        )?;

        let diffuse_atlas = composite(&entries, &plan, self.config.padding, AtlasKind::Diffuse)?;
        let normal_atlas = if self.config.pack_normal_maps {
            Some(composite(
                &entries,
                &plan,
                self.config.padding,
                AtlasKind::Normal,
            )?)
        } else {
            None
        };

        let results = surfaces
            .iter()
            .zip(indices)
            .enumerate()
            .map(|(surface, (s, entry_index))| {
                let remapped = remap_uvs(s.uvs, entry_index, &plan);
                if remapped.was_clamped() {
                    warnings.push(PackWarning::UvClamped {
                        surface,
                        count: remapped.clamped,
                    });
                }
                SurfaceResult {
                    entry_index,
                    uvs: remapped.uvs,
                }
            })
            .collect();

        let layout = AtlasLayout::from_plan(&plan, self.config.padding, entries.len());

        log::debug!(
            "packed {} surfaces into {} entries on a {}x{} grid of {}px cells",
            surfaces.len(),
            entries.len(),
            plan.rows,
            plan.columns,
            plan.cell_size
        );

        Ok(PackOutput {
            diffuse_atlas,
            normal_atlas,
            surfaces: results,
            layout,
            warnings,
        })
    }
}

impl Default for Packer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ImageData;
    use crate::types::{ColorSpace, NEUTRAL_TINT, WHITE_PIXEL};

    fn surface<'a>(diffuse: SourceImage<'a>, uvs: &'a [[f32; 2]]) -> SurfaceInput<'a> {
        SurfaceInput {
            diffuse: Some(diffuse),
            normal: None,
            tint: NEUTRAL_TINT,
            tint_enabled: false,
            uvs,
        }
    }

    #[test]
    fn test_shared_texture_shares_cell() {
        let red = ImageData::solid(8, 8, [255, 0, 0, 255], ColorSpace::Perceptual);
        let blue = ImageData::solid(8, 8, [0, 0, 255, 255], ColorSpace::Perceptual);
        let uvs = [[0.0, 0.0], [1.0, 1.0]];

        let packer = Packer::new();
        let output = packer
            .pack(&[
                surface(red.as_source(1), &uvs),
                surface(blue.as_source(2), &uvs),
                surface(red.as_source(1), &uvs),
            ])
            .unwrap();

        assert_eq!(output.layout.cells.len(), 2);
        assert_eq!(output.surfaces[0].entry_index, 0);
        assert_eq!(output.surfaces[1].entry_index, 1);
        assert_eq!(output.surfaces[2].entry_index, 0);
        assert_eq!(output.surfaces[0].uvs, output.surfaces[2].uvs);
        assert!(output.warnings.is_empty());
        assert!(output.normal_atlas.is_none());
    }

    #[test]
    fn test_empty_surface_list_is_fatal() {
        assert!(matches!(Packer::new().pack(&[]), Err(PackError::NoSurfaces)));
    }

    #[test]
    fn test_invalid_atlas_size_rejected() {
        let img = ImageData::solid(4, 4, [1, 1, 1, 255], ColorSpace::Perceptual);
        let uvs = [[0.0, 0.0]];
        let packer = Packer::with_config(PackerConfig {
            max_atlas_size: 1000,
            ..PackerConfig::default()
        });
        assert!(matches!(
            packer.pack(&[surface(img.as_source(1), &uvs)]),
            Err(PackError::InvalidAtlasSize(1000))
        ));
    }

    #[test]
    fn test_determinism() {
        let a = ImageData::solid(16, 16, [200, 50, 25, 255], ColorSpace::Perceptual);
        let b = ImageData::solid(8, 8, [25, 50, 200, 255], ColorSpace::Perceptual);
        let uvs = [[0.1, 0.2], [0.9, 0.8]];
        let inputs = [surface(a.as_source(1), &uvs), surface(b.as_source(2), &uvs)];

        let packer = Packer::new();
        let first = packer.pack(&inputs).unwrap();
        let second = packer.pack(&inputs).unwrap();

        assert_eq!(first.diffuse_atlas.pixels, second.diffuse_atlas.pixels);
        assert_eq!(first.surfaces, second.surfaces);
        assert_eq!(first.layout, second.layout);
    }

    #[test]
    fn test_normal_atlases_share_layout() {
        let diffuse = ImageData::solid(8, 8, [90, 90, 90, 255], ColorSpace::Perceptual);
        let normal = ImageData::solid(8, 8, [110, 140, 240, 255], ColorSpace::Linear);
        let uvs = [[0.5, 0.5]];
        let packer = Packer::with_config(PackerConfig {
            pack_normal_maps: true,
            padding: 0,
            ..PackerConfig::default()
        });

        let output = packer
            .pack(&[SurfaceInput {
                diffuse: Some(diffuse.as_source(1)),
                normal: Some(normal.as_source(2)),
                tint: NEUTRAL_TINT,
                tint_enabled: false,
                uvs: &uvs,
            }])
            .unwrap();

        let normal_atlas = output.normal_atlas.unwrap();
        assert_eq!(normal_atlas.width, output.diffuse_atlas.width);
        assert_eq!(normal_atlas.height, output.diffuse_atlas.height);
        assert_eq!(normal_atlas.color_space, ColorSpace::Linear);
        // Entry 0's cell holds the normal map pixels in the same region the
        // diffuse atlas holds the diffuse pixels
        let region = &output.layout.cells[0];
        assert_eq!(
            normal_atlas.get_pixel(region.x, region.y),
            [110, 140, 240, 255]
        );
        assert_eq!(
            output.diffuse_atlas.get_pixel(region.x, region.y),
            [90, 90, 90, 255]
        );
    }

    #[test]
    fn test_global_color_switch_overrides_surface_tint() {
        let img = ImageData::solid(8, 8, [200, 200, 200, 255], ColorSpace::Perceptual);
        let uvs = [[0.0, 0.0]];
        let inputs = [SurfaceInput {
            diffuse: Some(img.as_source(1)),
            normal: None,
            tint: [0.5, 0.5, 0.5, 1.0],
            tint_enabled: true,
            uvs: &uvs,
        }];

        let tinted = Packer::with_config(PackerConfig {
            padding: 0,
            ..PackerConfig::default()
        })
        .pack(&inputs)
        .unwrap();
        let untinted = Packer::with_config(PackerConfig {
            padding: 0,
            apply_material_color: false,
            ..PackerConfig::default()
        })
        .pack(&inputs)
        .unwrap();

        assert_eq!(tinted.diffuse_atlas.get_pixel(0, 0), [100, 100, 100, 255]);
        assert_eq!(untinted.diffuse_atlas.get_pixel(0, 0), [200, 200, 200, 255]);
    }

    #[test]
    fn test_uv_clamp_warning() {
        let img = ImageData::solid(8, 8, [1, 1, 1, 255], ColorSpace::Perceptual);
        let tiled = [[0.0, 0.0], [2.0, 2.0], [-1.0, 0.5]];
        let output = Packer::new()
            .pack(&[surface(img.as_source(1), &tiled)])
            .unwrap();

        assert_eq!(
            output.warnings,
            vec![PackWarning::UvClamped {
                surface: 0,
                count: 2
            }]
        );
    }

    #[test]
    fn test_missing_diffuse_substituted_and_warned() {
        let uvs = [[0.0, 0.0], [1.0, 1.0]];
        let output = Packer::with_config(PackerConfig {
            padding: 0,
            ..PackerConfig::default()
        })
        .pack(&[SurfaceInput {
            diffuse: None,
            normal: None,
            tint: NEUTRAL_TINT,
            tint_enabled: false,
            uvs: &uvs,
        }])
        .unwrap();

        assert_eq!(
            output.warnings,
            vec![PackWarning::MissingDiffuse { surface: 0 }]
        );
        // The substituted cell is opaque white
        assert_eq!(output.diffuse_atlas.get_pixel(0, 0), WHITE_PIXEL);
    }

    #[test]
    fn test_five_surfaces_scenario() {
        // 5 distinct 512px textures under a 1024 ceiling with 1px padding:
        // 512px cells are infeasible, so the packer falls back to 256px cells
        // on a 3x2 grid with one wasted cell.
        let images: Vec<ImageData> = (0..5)
            .map(|i| {
                ImageData::solid(
                    512,
                    512,
                    [i as u8 * 40, 255 - i as u8 * 40, 0, 255],
                    ColorSpace::Perceptual,
                )
            })
            .collect();
        let uvs = [[0.0, 0.0], [1.0, 1.0]];
        let inputs: Vec<SurfaceInput<'_>> = images
            .iter()
            .enumerate()
            .map(|(i, img)| surface(img.as_source(i as u64), &uvs))
            .collect();

        let packer = Packer::with_config(PackerConfig {
            max_atlas_size: 1024,
            padding: 1,
            ..PackerConfig::default()
        });
        let output = packer.pack(&inputs).unwrap();

        assert_eq!(output.layout.cell_size, 256);
        assert_eq!((output.layout.rows, output.layout.columns), (3, 2));
        assert_eq!(output.layout.cells.len(), 5);
        assert_eq!(output.diffuse_atlas.width, 2 * 258);
        assert_eq!(output.diffuse_atlas.height, 3 * 258);
    }

    #[test]
    fn test_grid_unsatisfiable_is_fatal() {
        let uvs = [[0.0, 0.0]];
        // 300 entries cannot fit a 256px ceiling even at 16px floor cells
        let images: Vec<ImageData> = (0..300)
            .map(|_| ImageData::solid(512, 512, [1, 1, 1, 255], ColorSpace::Perceptual))
            .collect();
        let inputs: Vec<SurfaceInput<'_>> = images
            .iter()
            .enumerate()
            .map(|(i, img)| surface(img.as_source(i as u64), &uvs))
            .collect();

        let packer = Packer::with_config(PackerConfig {
            max_atlas_size: 256,
            padding: 0,
            ..PackerConfig::default()
        });
        assert!(matches!(
            packer.pack(&inputs),
            Err(PackError::GridUnsatisfiable { .. })
        ));
    }
}
