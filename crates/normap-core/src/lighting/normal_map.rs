//! Normals read from an authored, palette-indexed normal map.
//!
//! Each palette entry stores a direction as three biased bytes: red is x,
//! green is y, blue is z, and 128 is zero.

use crate::image::{dims_match, IndexedImage};
use crate::math::{Fix16, Fix16Vec3};

use super::source::{Directions, NormalError, NormalIndexMap, NormalSource, MAX_DIRECTIONS};

/// Smallest z an entry-0 direction may have (about 2.5 degrees off flat).
const FLAT_MIN_Z: Fix16 = Fix16::from_bits(65_470);

/// Decode one biased `[r, g, b]` palette entry to a unit vector.
pub fn decode_palette_normal(rgb: [u8; 3]) -> Fix16Vec3 {
    let [r, g, b] = rgb;
    Fix16Vec3::from_f32(
        r as f32 - 128.0,
        g as f32 - 128.0,
        b as f32 - 128.0,
    )
    .normalized()
}

/// Uses an indexed image's pixel codes directly as normal indices.
pub struct AuthoredNormals<'a> {
    image: &'a IndexedImage,
}

impl<'a> AuthoredNormals<'a> {
    pub fn new(image: &'a IndexedImage) -> Self {
        Self { image }
    }
}

impl NormalSource for AuthoredNormals<'_> {
    fn width(&self) -> u16 {
        self.image.width
    }

    fn height(&self) -> u16 {
        self.image.height
    }

    fn directions(&self) -> Result<Directions, NormalError> {
        let palette = &self.image.palette;
        if palette.len() > MAX_DIRECTIONS {
            return Err(NormalError::PaletteTooLarge(palette.len()));
        }
        let directions: Directions = palette.iter().map(|&rgb| decode_palette_normal(rgb)).collect();
        if let (Some(&first), Some(dir)) = (palette.first(), directions.first()) {
            if dir.z < FLAT_MIN_Z {
                return Err(NormalError::FirstEntryNotFlat(first));
            }
        }
        Ok(directions)
    }

    fn index_map(&self) -> Result<NormalIndexMap, NormalError> {
        let img = self.image;
        if !dims_match(img.width, img.height, img.indices.len()) {
            return Err(NormalError::DimensionMismatch {
                width: img.width,
                height: img.height,
                len: img.indices.len(),
            });
        }

        let palette_len = img.palette.len();
        let mut map = NormalIndexMap::new(img.width, img.height);
        for (i, &index) in img.indices.iter().enumerate() {
            if index as usize >= palette_len {
                return Err(NormalError::IndexOutOfRange { index, palette_len });
            }
            map.set(i, index);
        }
        Ok(map)
    }
}
