//! Atlas Packer CLI
//!
//! Packs PNG textures from disk into a texture atlas. A thin consumer of the
//! library standing in for an asset pipeline: it does the file I/O and leaves
//! every packing decision to [`atlas_packer::Packer`].

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use atlas_packer::{
    ColorSpace, ImageData, Packer, PackerConfig, Result, SurfaceInput, NEUTRAL_TINT,
};

#[derive(Parser)]
#[command(name = "atlas-packer")]
#[command(author, version, about = "Pack textures into uniform-grid atlases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack PNG textures into a diffuse (and optionally normal) atlas
    Pack {
        /// Texture specs: DIFFUSE.png[,NORMAL.png][,#RRGGBB[AA] tint]
        #[arg(required = true, value_parser = parse_texture_spec)]
        textures: Vec<TextureSpec>,

        /// Output path prefix (writes PREFIX_diffuse.png, PREFIX_layout.json, ...)
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum atlas size (256, 512, 1024, 2048 or 4096)
        #[arg(long, default_value = "1024")]
        max_size: u32,

        /// Padding around each cell in pixels
        #[arg(long, default_value = "2")]
        padding: u32,

        /// Also pack normal maps into a second atlas
        #[arg(long)]
        normals: bool,

        /// Ignore tint colors
        #[arg(long)]
        no_color: bool,
    },
}

/// One texture argument: a diffuse PNG with optional normal map and tint.
#[derive(Debug, Clone)]
struct TextureSpec {
    diffuse: PathBuf,
    normal: Option<PathBuf>,
    tint: Option<[f32; 4]>,
}

/// Parse `DIFFUSE.png[,NORMAL.png][,#RRGGBB[AA]]`.
fn parse_texture_spec(spec: &str) -> std::result::Result<TextureSpec, String> {
    let mut parts = spec.split(',');
    let diffuse = PathBuf::from(
        parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| format!("empty texture spec: {spec:?}"))?,
    );

    let mut normal = None;
    let mut tint = None;
    for part in parts {
        if let Some(hex) = part.strip_prefix('#') {
            tint = Some(parse_hex_color(hex)?);
        } else if normal.is_none() {
            normal = Some(PathBuf::from(part));
        } else {
            return Err(format!("too many paths in texture spec: {spec:?}"));
        }
    }

    Ok(TextureSpec {
        diffuse,
        normal,
        tint,
    })
}

/// Parse RRGGBB or RRGGBBAA into a float color.
fn parse_hex_color(hex: &str) -> std::result::Result<[f32; 4], String> {
    if hex.len() != 6 && hex.len() != 8 {
        return Err(format!("tint must be #RRGGBB or #RRGGBBAA, got #{hex}"));
    }
    let channel = |i: usize| -> std::result::Result<f32, String> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|e| format!("bad hex digit in #{hex}: {e}"))
    };
    let alpha = if hex.len() == 8 { channel(6)? } else { 1.0 };
    Ok([channel(0)?, channel(2)?, channel(4)?, alpha])
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Pack {
            textures,
            output,
            max_size,
            padding,
            normals,
            no_color,
        } => pack_command(textures, output, max_size, padding, normals, no_color),
    }
}

fn pack_command(
    textures: Vec<TextureSpec>,
    output: PathBuf,
    max_size: u32,
    padding: u32,
    normals: bool,
    no_color: bool,
) -> Result<()> {
    println!("Loading {} textures...", textures.len());
    let mut loaded = Vec::with_capacity(textures.len());
    for spec in &textures {
        let diffuse =
            ImageData::from_png_bytes(&fs::read(&spec.diffuse)?, ColorSpace::Perceptual)?;
        let normal = match &spec.normal {
            Some(path) => Some(ImageData::from_png_bytes(&fs::read(path)?, ColorSpace::Linear)?),
            None => None,
        };
        println!(
            "  {} ({}x{}){}",
            spec.diffuse.display(),
            diffuse.width,
            diffuse.height,
            if normal.is_some() { " + normal map" } else { "" }
        );
        loaded.push((diffuse, normal, spec.tint));
    }

    // Each texture gets unit-quad UVs so the layout manifest shows where a
    // full-texture mesh would land.
    let quad = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let surfaces: Vec<SurfaceInput<'_>> = loaded
        .iter()
        .enumerate()
        .map(|(i, (diffuse, normal, tint))| SurfaceInput {
            diffuse: Some(diffuse.as_source(i as u64)),
            normal: normal.as_ref().map(|n| n.as_source(u32::MAX as u64 + i as u64)),
            tint: tint.unwrap_or(NEUTRAL_TINT),
            tint_enabled: tint.is_some(),
            uvs: &quad,
        })
        .collect();

    let packer = Packer::with_config(PackerConfig {
        max_atlas_size: max_size,
        padding,
        pack_normal_maps: normals,
        apply_material_color: !no_color,
    });
    let result = packer.pack(&surfaces)?;

    println!(
        "Packed {} surfaces into a {}x{} grid of {}px cells",
        surfaces.len(),
        result.layout.rows,
        result.layout.columns,
        result.layout.cell_size
    );

    let diffuse_path = output.with_file_name(format!(
        "{}_diffuse.png",
        output.file_name().unwrap_or_default().to_string_lossy()
    ));
    fs::write(&diffuse_path, result.diffuse_atlas.to_png()?)?;
    println!(
        "  Wrote {} ({}x{})",
        diffuse_path.display(),
        result.diffuse_atlas.width,
        result.diffuse_atlas.height
    );

    if let Some(normal_atlas) = &result.normal_atlas {
        let normal_path = output.with_file_name(format!(
            "{}_normal.png",
            output.file_name().unwrap_or_default().to_string_lossy()
        ));
        fs::write(&normal_path, normal_atlas.to_png()?)?;
        println!("  Wrote {}", normal_path.display());
    }

    let layout_path = output.with_file_name(format!(
        "{}_layout.json",
        output.file_name().unwrap_or_default().to_string_lossy()
    ));
    fs::write(&layout_path, result.layout.to_json()?)?;
    println!("  Wrote {}", layout_path.display());

    for warning in &result.warnings {
        println!("Warning: {warning}");
    }

    Ok(())
}
