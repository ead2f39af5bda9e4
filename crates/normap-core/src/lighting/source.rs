//! The normal-acquisition strategy seam and the packed index bitmap.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::math::Fix16Vec3;

/// Directions a single texture can select from (one 4bpp lookup table).
pub const MAX_DIRECTIONS: usize = 16;

/// Direction palette owned by a texture.
pub type Directions = heapless::Vec<Fix16Vec3, MAX_DIRECTIONS>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalError {
    /// Pixel buffer length does not match width x height.
    DimensionMismatch { width: u16, height: u16, len: usize },
    /// The authored palette has more entries than a 4bpp table can address.
    PaletteTooLarge(usize),
    /// A pixel selects a palette entry that does not exist.
    IndexOutOfRange { index: u8, palette_len: usize },
    /// Entry 0 is not the flat normal. Pixel code 0 is transparent in the
    /// overlay, so those pixels could never be shaded.
    FirstEntryNotFlat([u8; 3]),
}

impl fmt::Display for NormalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalError::DimensionMismatch { width, height, len } => {
                write!(f, "{width}x{height} image has {len} pixels")
            }
            NormalError::PaletteTooLarge(n) => {
                write!(f, "normal palette has {n} entries, at most {MAX_DIRECTIONS} allowed")
            }
            NormalError::IndexOutOfRange { index, palette_len } => {
                write!(f, "pixel index {index} outside {palette_len}-entry palette")
            }
            NormalError::FirstEntryNotFlat([r, g, b]) => {
                write!(
                    f,
                    "normal palette entry 0 is ({r}, {g}, {b}), must be flat (128, 128, 255)"
                )
            }
        }
    }
}

/// Packed 4-bit normal indices, two pixels per byte, even pixel in the high
/// nibble. Packing runs over the whole image, not per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalIndexMap {
    width: u16,
    height: u16,
    packed: Vec<u8>,
}

impl NormalIndexMap {
    /// All-zero map.
    pub fn new(width: u16, height: u16) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            packed: vec![0; pixels.div_ceil(2)],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Store a 4-bit index for pixel number `i` (row-major).
    pub fn set(&mut self, i: usize, index: u8) {
        let byte = &mut self.packed[i >> 1];
        if i & 1 == 1 {
            *byte = (*byte & 0xF0) | (index & 0xF);
        } else {
            *byte = (*byte & 0x0F) | ((index & 0xF) << 4);
        }
    }

    pub fn get(&self, i: usize) -> u8 {
        let byte = self.packed[i >> 1];
        if i & 1 == 1 {
            byte & 0xF
        } else {
            byte >> 4
        }
    }

    pub fn get_xy(&self, x: usize, y: usize) -> u8 {
        self.get(y * self.width as usize + x)
    }

    /// VRAM image of the bitmap.
    pub fn as_bytes(&self) -> &[u8] {
        &self.packed
    }
}

/// Where a texture's per-pixel normals come from.
///
/// Heightmap-derived and authored normal maps differ only here; loading,
/// relighting and drawing are shared.
pub trait NormalSource {
    fn width(&self) -> u16;

    fn height(&self) -> u16;

    /// Unit directions the index map selects from; entry `i` shades pixel code `i`.
    fn directions(&self) -> Result<Directions, NormalError>;

    /// Per-pixel indices into `directions()`.
    fn index_map(&self) -> Result<NormalIndexMap, NormalError>;
}
