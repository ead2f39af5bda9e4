/// Error types for asset conversion.
pub mod error;

/// Core type definitions for assets.
pub mod types;

/// Identifier generation and sanitization.
pub mod identifier;

/// TGA/PNG color texture and heightmap conversion.
pub mod image_converter;

/// Color-mapped TGA reader for palette normal maps.
pub mod tga_indexed;

/// Output file generation (Rust wrappers + binary data).
pub mod output_gen;

pub use error::AssetError;
pub use image_converter::{load_color, load_heightmap, load_normal_map};
pub use types::{AssetBuildConfig, AssetKind, ColorAsset, GeneratedAsset, HeightmapAsset, NormalMapAsset};

use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["tga", "png"];
const NORMAL_MAP_EXTENSIONS: &[&str] = &["tga"];

/// Process all assets in `config.source_dir` and write outputs to `config.out_dir`.
///
/// Scans `textures/` and `heightmaps/` for `.tga`/`.png` files and
/// `normal_maps/` for color-mapped `.tga` files. Returns the generated assets
/// (for `cargo:rerun-if-changed` directives). A source directory with no
/// assets still produces an empty `mod.rs`.
pub fn build_assets(config: &AssetBuildConfig) -> Result<Vec<GeneratedAsset>, AssetError> {
    fs::create_dir_all(&config.out_dir)?;

    let textures = collect_files(&config.source_dir.join("textures"), IMAGE_EXTENSIONS);
    let heightmaps = collect_files(&config.source_dir.join("heightmaps"), IMAGE_EXTENSIONS);
    let normal_maps = collect_files(&config.source_dir.join("normal_maps"), NORMAL_MAP_EXTENSIONS);

    let all_paths: Vec<&Path> = textures
        .iter()
        .chain(&heightmaps)
        .chain(&normal_maps)
        .map(PathBuf::as_path)
        .collect();
    identifier::check_collisions(&all_paths)?;

    let mut generated = Vec::with_capacity(all_paths.len());

    for path in &textures {
        log::info!("Converting texture: {}", path.display());
        let asset = image_converter::load_color(path)?;
        generated.push(output_gen::write_color_output(&asset, &config.out_dir)?);
    }

    for path in &heightmaps {
        log::info!("Converting heightmap: {}", path.display());
        let asset = image_converter::load_heightmap(path)?;
        generated.push(output_gen::write_heightmap_output(&asset, &config.out_dir)?);
    }

    for path in &normal_maps {
        log::info!("Converting normal map: {}", path.display());
        let asset = image_converter::load_normal_map(path)?;
        generated.push(output_gen::write_normal_map_output(&asset, &config.out_dir)?);
    }

    output_gen::write_mod_rs(&generated, &config.out_dir)?;

    Ok(generated)
}

/// Convert a single color texture. Writes output files to `out_dir`.
pub fn convert_texture(input: &Path, out_dir: &Path) -> Result<ColorAsset, AssetError> {
    fs::create_dir_all(out_dir)?;
    let asset = image_converter::load_color(input)?;
    output_gen::write_color_output(&asset, out_dir)?;
    Ok(asset)
}

/// Convert a single heightmap. Writes output files to `out_dir`.
pub fn convert_heightmap(input: &Path, out_dir: &Path) -> Result<HeightmapAsset, AssetError> {
    fs::create_dir_all(out_dir)?;
    let asset = image_converter::load_heightmap(input)?;
    output_gen::write_heightmap_output(&asset, out_dir)?;
    Ok(asset)
}

/// Convert a single palette normal map. Writes output files to `out_dir`.
pub fn convert_normal_map(input: &Path, out_dir: &Path) -> Result<NormalMapAsset, AssetError> {
    fs::create_dir_all(out_dir)?;
    let asset = image_converter::load_normal_map(input)?;
    output_gen::write_normal_map_output(&asset, out_dir)?;
    Ok(asset)
}

/// Files in `dir` (non-recursive) with one of `extensions`, sorted.
fn collect_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        })
        .collect();
    files.sort();
    files
}
