//! Decoded source images handed to the texture loader.
//!
//! Decoding from files happens on the host (`asset-prep`); the core only sees
//! pixels.

use alloc::vec::Vec;

use crate::vdp::color::Rgb1555;

/// Row-major RGB1555 color image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub width: u16,
    pub height: u16,
    pub pixels: Vec<Rgb1555>,
}

/// Single-channel elevation image, one byte per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heightmap {
    pub width: u16,
    pub height: u16,
    pub data: Vec<u8>,
}

impl Heightmap {
    /// Height at `(x, y)`. The caller keeps coordinates in range.
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width as usize + x]
    }
}

/// Palette-indexed image. Palette entries are `[r, g, b]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedImage {
    pub width: u16,
    pub height: u16,
    pub indices: Vec<u8>,
    pub palette: Vec<[u8; 3]>,
}

/// Checks that `len` matches a `width x height` buffer.
pub(crate) fn dims_match(width: u16, height: u16, len: usize) -> bool {
    width as usize * height as usize == len
}
