//! RGB1555 colors and 16-entry color lookup tables.

use alloc::vec::Vec;

/// Number of entries in a 4bpp color lookup table.
pub const CLUT_ENTRIES: usize = 16;
/// Size of one lookup table in VRAM.
pub const CLUT_BYTES: usize = CLUT_ENTRIES * 2;

/// A 16-bit console color: `[15]=MSB, [14:10]=B, [9:5]=G, [4:0]=R`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb1555(pub u16);

impl Rgb1555 {
    /// The transparent pixel in RGB sprite mode.
    pub const TRANSPARENT: Self = Self(0x0000);

    /// Pack a color from 5-bit channels. Channels above 31 are masked.
    pub const fn new(msb: u8, r: u8, g: u8, b: u8) -> Self {
        Self(
            ((msb as u16 & 0x1) << 15)
                | ((b as u16 & 0x1F) << 10)
                | ((g as u16 & 0x1F) << 5)
                | (r as u16 & 0x1F),
        )
    }

    /// Opaque gray at the given 5-bit level.
    pub const fn gray(level: u8) -> Self {
        Self::new(1, level, level, level)
    }

    /// Reduce 8-bit channels to 5 bits and set the MSB.
    pub const fn from_rgb888(r: u8, g: u8, b: u8) -> Self {
        Self::new(1, r >> 3, g >> 3, b >> 3)
    }

    pub const fn msb(self) -> bool {
        self.0 & 0x8000 != 0
    }

    pub const fn r(self) -> u8 {
        (self.0 & 0x1F) as u8
    }

    pub const fn g(self) -> u8 {
        ((self.0 >> 5) & 0x1F) as u8
    }

    pub const fn b(self) -> u8 {
        ((self.0 >> 10) & 0x1F) as u8
    }

    /// Expand to 8-bit channels (`c << 3 | c >> 2`).
    pub const fn to_rgb888(self) -> [u8; 3] {
        const fn expand(c: u8) -> u8 {
            (c << 3) | (c >> 2)
        }
        [expand(self.r()), expand(self.g()), expand(self.b())]
    }
}

/// One 16-entry lookup table. Always uploaded whole.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clut {
    pub entries: [Rgb1555; CLUT_ENTRIES],
}

impl Clut {
    /// Big-endian VRAM layout.
    pub fn to_bytes(&self) -> [u8; CLUT_BYTES] {
        let mut out = [0u8; CLUT_BYTES];
        for (chunk, entry) in out.chunks_exact_mut(2).zip(self.entries.iter()) {
            chunk.copy_from_slice(&entry.0.to_be_bytes());
        }
        out
    }
}

/// Serialize RGB1555 pixels big-endian, the byte order VDP1 reads.
pub fn pixels_to_bytes(pixels: &[Rgb1555]) -> Vec<u8> {
    pixels.iter().flat_map(|p| p.0.to_be_bytes()).collect()
}
