//! Normals derived from heightmap gradients.

use crate::image::{dims_match, Heightmap};
use crate::math::fixed::FIX16_ONE;
use crate::math::{Fix16, Fix16Vec3};

use super::palette::{closest_normal_index, DIRECTION_PALETTE, FLAT_INDEX};
use super::source::{Directions, NormalError, NormalIndexMap, NormalSource};

/// Quantizes a heightmap's surface normals onto `DIRECTION_PALETTE`.
pub struct HeightmapNormals<'a> {
    heightmap: &'a Heightmap,
    /// Height in texels that a full 0..255 swing represents.
    relief: u8,
}

impl<'a> HeightmapNormals<'a> {
    pub fn new(heightmap: &'a Heightmap, relief: u8) -> Self {
        Self { heightmap, relief }
    }

    /// Surface normal at `(x, y)` from the slope towards the right neighbour
    /// and the row above. Not normalized. The caller keeps `x < width - 1`
    /// and `y > 0`.
    pub fn surface_normal(&self, x: usize, y: usize) -> Fix16Vec3 {
        let h = self.heightmap;
        let here = h.at(x, y) as i32;
        let dz_dx = h.at(x + 1, y) as i32 - here;
        let dz_dy = h.at(x, y - 1) as i32 - here;

        let scale = self.relief as f32 / 255.0;
        let v1 = Fix16Vec3::new(FIX16_ONE, Fix16::ZERO, Fix16::from_num(dz_dx as f32 * scale));
        let v2 = Fix16Vec3::new(Fix16::ZERO, FIX16_ONE, Fix16::from_num(dz_dy as f32 * scale));
        v1.cross(v2)
    }
}

impl NormalSource for HeightmapNormals<'_> {
    fn width(&self) -> u16 {
        self.heightmap.width
    }

    fn height(&self) -> u16 {
        self.heightmap.height
    }

    fn directions(&self) -> Result<Directions, NormalError> {
        Ok(DIRECTION_PALETTE.iter().copied().collect())
    }

    fn index_map(&self) -> Result<NormalIndexMap, NormalError> {
        let h = self.heightmap;
        if !dims_match(h.width, h.height, h.data.len()) {
            return Err(NormalError::DimensionMismatch {
                width: h.width,
                height: h.height,
                len: h.data.len(),
            });
        }

        let width = h.width as usize;
        let height = h.height as usize;
        let mut map = NormalIndexMap::new(h.width, h.height);

        for y in 0..height {
            for x in 0..width {
                // First row and last column have no neighbour to diff against.
                let index = if y > 0 && x + 1 < width {
                    closest_normal_index(self.surface_normal(x, y), &DIRECTION_PALETTE)
                } else {
                    FLAT_INDEX
                };
                map.set(y * width + x, index as u8);
            }
        }

        Ok(map)
    }
}
