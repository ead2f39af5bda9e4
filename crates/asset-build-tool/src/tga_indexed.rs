//! Color-mapped TGA decoding that keeps the palette indices.
//!
//! General-purpose decoders expand color-mapped images to RGB, which loses the
//! pixel codes a palette normal map is made of. This reader handles image
//! types 1 (uncompressed) and 9 (run-length) with 8-bit pixels and 15, 16, 24
//! or 32-bit palette entries.

/// Most entries a 4bpp lookup table can address.
pub const MAX_PALETTE_ENTRIES: usize = 16;

const HEADER_LEN: usize = 18;
const COLOR_MAP_PRESENT: u8 = 1;
const TYPE_COLOR_MAPPED: u8 = 1;
const TYPE_COLOR_MAPPED_RLE: u8 = 9;
const DESC_RIGHT_TO_LEFT: u8 = 1 << 4;
const DESC_TOP_TO_BOTTOM: u8 = 1 << 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TgaError {
    #[error("data ends inside the {0}")]
    UnexpectedEof(&'static str),

    #[error("no color map present")]
    MissingColorMap,

    #[error("image type {0} is not color-mapped (expected 1 or 9)")]
    NotColorMapped(u8),

    #[error("{0}-bit pixels, expected 8-bit palette indices")]
    UnsupportedPixelDepth(u8),

    #[error("{0}-bit palette entries are not supported")]
    UnsupportedEntrySize(u8),

    #[error("palette has {0} entries, at most {MAX_PALETTE_ENTRIES} allowed")]
    PaletteTooLarge(usize),

    #[error("pixel value {value} is outside the color map ({first}..{end})")]
    IndexOutOfRange { value: u8, first: u16, end: u32 },

    #[error("run-length packet runs past the end of the image")]
    RleOverrun,
}

/// Decoded indexed image, rows top to bottom, pixels left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedTga {
    pub width: u16,
    pub height: u16,
    /// Indices into `palette`, already rebased by the color map's first entry.
    pub indices: Vec<u8>,
    pub palette: Vec<[u8; 3]>,
}

struct Header {
    id_len: usize,
    color_map_type: u8,
    image_type: u8,
    map_first: u16,
    map_len: u16,
    entry_bits: u8,
    width: u16,
    height: u16,
    pixel_bits: u8,
    descriptor: u8,
}

impl Header {
    fn parse(b: &[u8]) -> Result<Self, TgaError> {
        if b.len() < HEADER_LEN {
            return Err(TgaError::UnexpectedEof("header"));
        }
        let le = |i: usize| u16::from_le_bytes([b[i], b[i + 1]]);
        Ok(Self {
            id_len: b[0] as usize,
            color_map_type: b[1],
            image_type: b[2],
            map_first: le(3),
            map_len: le(5),
            entry_bits: b[7],
            width: le(12),
            height: le(14),
            pixel_bits: b[16],
            descriptor: b[17],
        })
    }
}

/// Forward-only cursor over the file body.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], TgaError> {
        let end = self.pos.checked_add(n).ok_or(TgaError::UnexpectedEof(what))?;
        let slice = self.bytes.get(self.pos..end).ok_or(TgaError::UnexpectedEof(what))?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self, what: &'static str) -> Result<u8, TgaError> {
        Ok(self.take(1, what)?[0])
    }
}

/// Decode a color-mapped TGA file held in memory.
pub fn decode(bytes: &[u8]) -> Result<IndexedTga, TgaError> {
    let h = Header::parse(bytes)?;
    if h.image_type != TYPE_COLOR_MAPPED && h.image_type != TYPE_COLOR_MAPPED_RLE {
        return Err(TgaError::NotColorMapped(h.image_type));
    }
    if h.color_map_type != COLOR_MAP_PRESENT {
        return Err(TgaError::MissingColorMap);
    }
    if h.pixel_bits != 8 {
        return Err(TgaError::UnsupportedPixelDepth(h.pixel_bits));
    }
    if !matches!(h.entry_bits, 15 | 16 | 24 | 32) {
        return Err(TgaError::UnsupportedEntrySize(h.entry_bits));
    }
    if h.map_len as usize > MAX_PALETTE_ENTRIES {
        return Err(TgaError::PaletteTooLarge(h.map_len as usize));
    }

    let mut cur = Cursor {
        bytes,
        pos: HEADER_LEN,
    };
    cur.take(h.id_len, "image id")?;

    let entry_len = h.entry_bits.div_ceil(8) as usize;
    let palette: Vec<[u8; 3]> = cur
        .take(h.map_len as usize * entry_len, "color map")?
        .chunks_exact(entry_len)
        .map(palette_entry)
        .collect();

    let count = h.width as usize * h.height as usize;
    let stored = match h.image_type {
        TYPE_COLOR_MAPPED => cur.take(count, "pixel data")?.to_vec(),
        _ => unpack_rle(&mut cur, count)?,
    };

    let end = h.map_first as u32 + h.map_len as u32;
    let rebase = |value: u8| -> Result<u8, TgaError> {
        if (value as u16) < h.map_first || value as u32 >= end {
            return Err(TgaError::IndexOutOfRange {
                value,
                first: h.map_first,
                end,
            });
        }
        Ok(value - h.map_first as u8)
    };

    let (w, ht) = (h.width as usize, h.height as usize);
    let flip_x = h.descriptor & DESC_RIGHT_TO_LEFT != 0;
    let flip_y = h.descriptor & DESC_TOP_TO_BOTTOM == 0;
    let mut indices = Vec::with_capacity(count);
    for y in 0..ht {
        let sy = if flip_y { ht - 1 - y } else { y };
        for x in 0..w {
            let sx = if flip_x { w - 1 - x } else { x };
            indices.push(rebase(stored[sy * w + sx])?);
        }
    }

    Ok(IndexedTga {
        width: h.width,
        height: h.height,
        indices,
        palette,
    })
}

/// One color map entry to `[r, g, b]`. Stored order is B, G, R(, A); 15 and
/// 16-bit entries are little-endian `A RRRRR GGGGG BBBBB`.
fn palette_entry(e: &[u8]) -> [u8; 3] {
    match e.len() {
        2 => {
            let v = u16::from_le_bytes([e[0], e[1]]);
            let expand = |c: u16| ((c << 3) | (c >> 2)) as u8;
            [
                expand((v >> 10) & 0x1F),
                expand((v >> 5) & 0x1F),
                expand(v & 0x1F),
            ]
        }
        _ => [e[2], e[1], e[0]],
    }
}

fn unpack_rle(cur: &mut Cursor<'_>, count: usize) -> Result<Vec<u8>, TgaError> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let packet = cur.byte("run-length data")?;
        let run = (packet & 0x7F) as usize + 1;
        if out.len() + run > count {
            return Err(TgaError::RleOverrun);
        }
        if packet & 0x80 != 0 {
            let value = cur.byte("run-length data")?;
            out.extend(std::iter::repeat_n(value, run));
        } else {
            out.extend_from_slice(cur.take(run, "run-length data")?);
        }
    }
    Ok(out)
}
