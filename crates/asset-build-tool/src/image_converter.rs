use crate::error::AssetError;
use crate::identifier::generate_identifier;
use crate::tga_indexed;
use crate::types::{ColorAsset, HeightmapAsset, NormalMapAsset};
use image::{GenericImageView, RgbaImage};
use std::fs;
use std::path::Path;

/// Widest sprite CMDSIZE can describe (6 bits of width / 8).
pub const MAX_SPRITE_WIDTH: u32 = 504;
/// Tallest sprite CMDSIZE can describe (8 bits).
pub const MAX_SPRITE_HEIGHT: u32 = 255;

/// Check decoded dimensions against what one sprite command can draw.
fn validate_dimensions(path: &Path, width: u32, height: u32) -> Result<(), AssetError> {
    let fail = |message: String| {
        Err(AssetError::Validation {
            path: path.to_path_buf(),
            message,
        })
    };
    if width == 0 || width % 8 != 0 {
        return fail(format!(
            "width {} is not a multiple of 8; try {}",
            width,
            width.div_ceil(8).max(1) * 8
        ));
    }
    if width > MAX_SPRITE_WIDTH || height > MAX_SPRITE_HEIGHT {
        return fail(format!(
            "{}x{} exceeds the {}x{} sprite limit",
            width, height, MAX_SPRITE_WIDTH, MAX_SPRITE_HEIGHT
        ));
    }
    if height == 0 {
        return fail("image has no rows".to_string());
    }
    Ok(())
}

fn open(path: &Path) -> Result<image::DynamicImage, AssetError> {
    image::open(path).map_err(|e| AssetError::ImageDecode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// RGBA8 to RGB1555: alpha 0 becomes the transparent code 0x0000, anything
/// else is opaque with the MSB set.
pub fn rgba_to_rgb1555(img: &RgbaImage) -> Vec<u16> {
    img.pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            if a == 0 {
                0x0000
            } else {
                0x8000 | ((b as u16 >> 3) << 10) | ((g as u16 >> 3) << 5) | (r as u16 >> 3)
            }
        })
        .collect()
}

/// Load a TGA or PNG color texture and convert it to RGB1555.
pub fn load_color(path: &Path) -> Result<ColorAsset, AssetError> {
    let img = open(path)?;
    let (width, height) = img.dimensions();
    validate_dimensions(path, width, height)?;

    let pixels = rgba_to_rgb1555(&img.to_rgba8());
    let identifier = generate_identifier(path)?;

    log::info!(
        "  {}x{} RGB1555, {} bytes, identifier {}",
        width,
        height,
        pixels.len() * 2,
        identifier
    );

    Ok(ColorAsset {
        source: path.to_path_buf(),
        width,
        height,
        pixels,
        identifier,
    })
}

/// Load a heightmap. Color inputs are reduced to luma.
pub fn load_heightmap(path: &Path) -> Result<HeightmapAsset, AssetError> {
    let img = open(path)?;
    let (width, height) = img.dimensions();
    validate_dimensions(path, width, height)?;

    let data = img.to_luma8().into_raw();
    let identifier = generate_identifier(path)?;
    log::info!("  {}x{} heightmap, identifier {}", width, height, identifier);

    Ok(HeightmapAsset {
        source: path.to_path_buf(),
        width,
        height,
        data,
        identifier,
    })
}

/// Load a color-mapped TGA whose palette encodes normal directions.
pub fn load_normal_map(path: &Path) -> Result<NormalMapAsset, AssetError> {
    let bytes = fs::read(path)?;
    let tga = tga_indexed::decode(&bytes).map_err(|source| AssetError::NormalMap {
        path: path.to_path_buf(),
        source,
    })?;
    let (width, height) = (tga.width as u32, tga.height as u32);
    validate_dimensions(path, width, height)?;

    let identifier = generate_identifier(path)?;
    log::info!(
        "  {}x{} normal map, {} palette entries, identifier {}",
        width,
        height,
        tga.palette.len(),
        identifier
    );

    Ok(NormalMapAsset {
        source: path.to_path_buf(),
        width,
        height,
        indices: tga.indices,
        palette: tga.palette,
        identifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tga_indexed::tests::encode;
    use image::{GrayImage, Luma, Rgba};

    #[test]
    fn test_validate_dimensions() {
        let p = Path::new("textures/x.png");
        assert!(validate_dimensions(p, 320, 240).is_ok());
        assert!(validate_dimensions(p, 8, 1).is_ok());
        assert!(validate_dimensions(p, 504, 255).is_ok());
        assert!(validate_dimensions(p, 100, 64).is_err());
        assert!(validate_dimensions(p, 512, 64).is_err());
        assert!(validate_dimensions(p, 64, 256).is_err());
        assert!(validate_dimensions(p, 0, 8).is_err());
        assert!(validate_dimensions(p, 8, 0).is_err());
    }

    #[test]
    fn test_rgba_to_rgb1555() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
        img.put_pixel(2, 0, Rgba([255, 255, 255, 0]));
        assert_eq!(rgba_to_rgb1555(&img), vec![0x801F, 0x8000, 0x0000]);
    }

    #[test]
    fn test_load_color_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.png");
        let img = RgbaImage::from_pixel(16, 2, Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let asset = load_color(&path).unwrap();
        assert_eq!((asset.width, asset.height), (16, 2));
        assert!(asset.pixels.iter().all(|&p| p == 0x8000 | (31 << 10)));
        assert_eq!(asset.to_be_bytes()[..2], [0xFC, 0x00]);
    }

    #[test]
    fn test_load_color_rejects_odd_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.png");
        RgbaImage::new(12, 4).save(&path).unwrap();
        assert!(matches!(load_color(&path), Err(AssetError::Validation { .. })));
    }

    #[test]
    fn test_load_heightmap_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wall.png");
        let mut img = GrayImage::new(8, 2);
        img.put_pixel(3, 1, Luma([200]));
        img.save(&path).unwrap();

        let asset = load_heightmap(&path).unwrap();
        assert_eq!(asset.data.len(), 16);
        assert_eq!(asset.data[8 + 3], 200);
        assert_eq!(asset.data[0], 0);
    }

    #[test]
    fn test_load_normal_map_tga() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sign.tga");
        let pal = [[128, 128, 255], [255, 128, 128]];
        let pixels: Vec<u8> = (0..16).map(|i| (i % 2) as u8).collect();
        fs::write(&path, encode(8, 2, &pal, &pixels, false, true)).unwrap();

        let asset = load_normal_map(&path).unwrap();
        assert_eq!((asset.width, asset.height), (8, 2));
        assert_eq!(asset.indices, pixels);
        assert_eq!(asset.palette, pal.to_vec());
        assert_eq!(asset.palette_bytes(), vec![128, 128, 255, 255, 128, 128]);
    }

    #[test]
    fn test_load_normal_map_reports_tga_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tga");
        fs::write(&path, [0u8; 4]).unwrap();
        assert!(matches!(
            load_normal_map(&path),
            Err(AssetError::NormalMap { .. })
        ));
    }
}
