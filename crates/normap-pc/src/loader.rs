//! Builds the demo's textures: procedural built-ins, then assets linked at
//! build time, then files named on the command line.

use std::path::{Path, PathBuf};

use asset_build_tool::{ColorAsset, HeightmapAsset, NormalMapAsset};
use normap_core::assets::demo_assets;
use normap_core::image::{ColorImage, Heightmap, IndexedImage};
use normap_core::scene::{DemoAssets, NormalVariant, Surface, TextureAsset};
use normap_core::vdp::Rgb1555;

use crate::embedded::EmbeddedAssets;
use crate::error::SimError;

/// Optional source files for one texture.
#[derive(Clone, Debug, Default)]
pub struct TexturePaths {
    pub color: Option<PathBuf>,
    pub heightmap: Option<PathBuf>,
    pub normal_map: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct AssetPaths {
    pub wall: TexturePaths,
    pub sign: TexturePaths,
}

/// Built-in assets for `variant`. Linked assets replace built-in images and
/// any given file replaces both.
pub fn load_demo_assets(
    variant: NormalVariant,
    embedded: &EmbeddedAssets,
    paths: &AssetPaths,
) -> Result<DemoAssets, SimError> {
    let mut assets = demo_assets(variant);
    embedded.apply(&mut assets, variant)?;
    apply(&mut assets.wall, &paths.wall, variant)?;
    apply(&mut assets.sign, &paths.sign, variant)?;
    Ok(assets)
}

fn apply(asset: &mut TextureAsset, paths: &TexturePaths, variant: NormalVariant) -> Result<(), SimError> {
    if let Some(path) = &paths.color {
        asset.color = color_image(asset_build_tool::load_color(path)?)?;
    }

    let (used, ignored) = match variant {
        NormalVariant::Heightmap => (&paths.heightmap, &paths.normal_map),
        NormalVariant::AuthoredNormalMap => (&paths.normal_map, &paths.heightmap),
    };
    if let Some(path) = ignored {
        log::warn!("{} ignored for the {:?} variant", path.display(), variant);
    }
    if let Some(path) = used {
        asset.surface = match variant {
            NormalVariant::Heightmap => {
                Surface::Heightmap(heightmap(asset_build_tool::load_heightmap(path)?)?)
            }
            NormalVariant::AuthoredNormalMap => {
                Surface::NormalMap(indexed_image(asset_build_tool::load_normal_map(path)?)?)
            }
        };
    }
    Ok(())
}

fn dims(path: &Path, width: u32, height: u32) -> Result<(u16, u16), SimError> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(SimError::InvalidAsset {
            path: path.to_path_buf(),
            message: format!("{width}x{height} is too large"),
        }),
    }
}

pub fn color_image(asset: ColorAsset) -> Result<ColorImage, SimError> {
    let (width, height) = dims(&asset.source, asset.width, asset.height)?;
    Ok(ColorImage {
        width,
        height,
        pixels: asset.pixels.into_iter().map(Rgb1555).collect(),
    })
}

pub fn heightmap(asset: HeightmapAsset) -> Result<Heightmap, SimError> {
    let (width, height) = dims(&asset.source, asset.width, asset.height)?;
    Ok(Heightmap {
        width,
        height,
        data: asset.data,
    })
}

pub fn indexed_image(asset: NormalMapAsset) -> Result<IndexedImage, SimError> {
    let (width, height) = dims(&asset.source, asset.width, asset.height)?;
    Ok(IndexedImage {
        width,
        height,
        indices: asset.indices,
        palette: asset.palette,
    })
}
