//! Demo images converted from `assets/` by the build script and linked into
//! the binary.

use normap_core::image::{ColorImage, Heightmap, IndexedImage};
use normap_core::scene::{DemoAssets, NormalVariant, Surface, TextureAsset};
use normap_core::vdp::Rgb1555;

use crate::error::SimError;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/assets/mod.rs"));
}

/// `(identifier, width, height, data)` as written by asset-prep.
pub type AssetEntry = (&'static str, u16, u16, &'static [u8]);
/// `(identifier, palette)` for normal maps.
pub type PaletteEntry = (&'static str, &'static [[u8; 3]]);

/// Lookup over linked asset tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedAssets {
    assets: &'static [AssetEntry],
    palettes: &'static [PaletteEntry],
}

impl EmbeddedAssets {
    pub const fn new(assets: &'static [AssetEntry], palettes: &'static [PaletteEntry]) -> Self {
        Self { assets, palettes }
    }

    /// Whatever the build script found under `assets/`.
    pub const fn linked() -> Self {
        Self::new(generated::ASSETS, generated::NORMAL_MAP_PALETTES)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    fn find(&self, identifier: &str) -> Option<&AssetEntry> {
        self.assets.iter().find(|(id, ..)| *id == identifier)
    }

    /// `textures/<name>` as RGB1555 texels.
    pub fn color(&self, name: &str) -> Result<Option<ColorImage>, SimError> {
        let identifier = format!("TEXTURES_{name}");
        let Some(&(_, width, height, data)) = self.find(&identifier) else {
            return Ok(None);
        };
        check_len(&identifier, width, height, 2, data)?;
        Ok(Some(ColorImage {
            width,
            height,
            pixels: data
                .chunks_exact(2)
                .map(|b| Rgb1555(u16::from_be_bytes([b[0], b[1]])))
                .collect(),
        }))
    }

    /// `heightmaps/<name>`.
    pub fn heightmap(&self, name: &str) -> Result<Option<Heightmap>, SimError> {
        let identifier = format!("HEIGHTMAPS_{name}");
        let Some(&(_, width, height, data)) = self.find(&identifier) else {
            return Ok(None);
        };
        check_len(&identifier, width, height, 1, data)?;
        Ok(Some(Heightmap {
            width,
            height,
            data: data.to_vec(),
        }))
    }

    /// `normal_maps/<name>` with its direction palette.
    pub fn normal_map(&self, name: &str) -> Result<Option<IndexedImage>, SimError> {
        let identifier = format!("NORMAL_MAPS_{name}");
        let Some(&(_, width, height, data)) = self.find(&identifier) else {
            return Ok(None);
        };
        check_len(&identifier, width, height, 1, data)?;
        let palette = self
            .palettes
            .iter()
            .find(|(id, _)| *id == identifier)
            .map(|&(_, palette)| palette.to_vec())
            .ok_or_else(|| SimError::Embedded {
                identifier: identifier.clone(),
                message: "no palette linked".to_string(),
            })?;
        Ok(Some(IndexedImage {
            width,
            height,
            indices: data.to_vec(),
            palette,
        }))
    }

    /// Replace built-in wall and sign images with linked ones.
    pub fn apply(&self, assets: &mut DemoAssets, variant: NormalVariant) -> Result<(), SimError> {
        self.apply_texture(&mut assets.wall, "WALL", variant)?;
        self.apply_texture(&mut assets.sign, "SIGN", variant)
    }

    fn apply_texture(
        &self,
        asset: &mut TextureAsset,
        name: &str,
        variant: NormalVariant,
    ) -> Result<(), SimError> {
        if let Some(color) = self.color(name)? {
            log::info!("using linked {} texture ({}x{})", name, color.width, color.height);
            asset.color = color;
        }
        let surface = match variant {
            NormalVariant::Heightmap => self.heightmap(name)?.map(Surface::Heightmap),
            NormalVariant::AuthoredNormalMap => self.normal_map(name)?.map(Surface::NormalMap),
        };
        if let Some(surface) = surface {
            log::info!("using linked {} {:?} surface", name, variant);
            asset.surface = surface;
        }
        Ok(())
    }
}

fn check_len(
    identifier: &str,
    width: u16,
    height: u16,
    bytes_per_texel: usize,
    data: &[u8],
) -> Result<(), SimError> {
    let expected = width as usize * height as usize * bytes_per_texel;
    if data.len() == expected {
        Ok(())
    } else {
        Err(SimError::Embedded {
            identifier: identifier.to_string(),
            message: format!("{width}x{height} needs {expected} bytes, {} linked", data.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normap_core::assets::demo_assets;

    static SIGN_COLOR: [u8; 16] = [
        0x80, 0x1F, 0x80, 0x1F, 0x80, 0x1F, 0x80, 0x1F, 0x80, 0x1F, 0x80, 0x1F, 0x80, 0x1F, 0x80,
        0x1F,
    ];
    static SIGN_NORMALS: [u8; 8] = [0, 1, 1, 0, 0, 1, 1, 0];
    static SIGN_PALETTE: [[u8; 3]; 2] = [[128, 128, 255], [255, 128, 128]];
    static WALL_HEIGHTS: [u8; 8] = [9; 8];

    static ASSETS: [AssetEntry; 4] = [
        ("HEIGHTMAPS_WALL", 8, 1, &WALL_HEIGHTS),
        ("NORMAL_MAPS_SIGN", 8, 1, &SIGN_NORMALS),
        ("TEXTURES_SIGN", 8, 1, &SIGN_COLOR),
        ("TEXTURES_WALL", 8, 2, &SIGN_COLOR),
    ];
    static PALETTES: [PaletteEntry; 1] = [("NORMAL_MAPS_SIGN", &SIGN_PALETTE)];

    fn tables() -> EmbeddedAssets {
        EmbeddedAssets::new(&ASSETS, &PALETTES)
    }

    #[test]
    fn test_linked_assets_apply_cleanly() {
        for variant in [NormalVariant::Heightmap, NormalVariant::AuthoredNormalMap] {
            let mut assets = demo_assets(variant);
            EmbeddedAssets::linked().apply(&mut assets, variant).unwrap();
        }
    }

    #[test]
    fn test_color_decodes_big_endian() {
        let color = tables().color("SIGN").unwrap().unwrap();
        assert_eq!((color.width, color.height), (8, 1));
        assert!(color.pixels.iter().all(|&p| p == Rgb1555(0x801F)));
        assert!(tables().color("MISSING").unwrap().is_none());
    }

    #[test]
    fn test_normal_map_carries_palette() {
        let map = tables().normal_map("SIGN").unwrap().unwrap();
        assert_eq!(map.indices, SIGN_NORMALS.to_vec());
        assert_eq!(map.palette, SIGN_PALETTE.to_vec());
    }

    #[test]
    fn test_short_data_is_an_error() {
        assert!(matches!(
            tables().color("WALL"),
            Err(SimError::Embedded { ref identifier, .. }) if identifier == "TEXTURES_WALL"
        ));
    }

    #[test]
    fn test_apply_follows_variant() {
        let mut assets = demo_assets(NormalVariant::Heightmap);
        let wall_color = assets.wall.color.clone();
        let err = tables().apply(&mut assets, NormalVariant::Heightmap);
        // TEXTURES_WALL is malformed in these tables.
        assert!(err.is_err());
        assert_eq!(assets.wall.color, wall_color);

        let good = EmbeddedAssets::new(&ASSETS[..3], &PALETTES);
        let mut assets = demo_assets(NormalVariant::Heightmap);
        good.apply(&mut assets, NormalVariant::Heightmap).unwrap();
        assert_eq!(assets.sign.color.width, 8);
        assert!(matches!(&assets.wall.surface, Surface::Heightmap(h) if h.data == WALL_HEIGHTS));
        assert!(matches!(assets.sign.surface, Surface::Heightmap(_)));

        let mut assets = demo_assets(NormalVariant::AuthoredNormalMap);
        good.apply(&mut assets, NormalVariant::AuthoredNormalMap).unwrap();
        assert!(matches!(&assets.sign.surface, Surface::NormalMap(m) if m.width == 8));
        assert_eq!(assets.wall.color.width, 320);
    }
}
