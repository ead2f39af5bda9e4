//! Procedurally generated demo textures, so the scene runs without asset files.
//!
//! Each texture is described by a height field and a color field over pixel
//! coordinates; heightmaps sample the height field directly, authored normal
//! maps quantize its gradient onto `AUTHORED_PALETTE`.

use alloc::vec::Vec;

use crate::image::{ColorImage, Heightmap, IndexedImage};
use crate::lighting::closest_normal_index;
use crate::lighting::normal_map::decode_palette_normal;
use crate::math::Fix16Vec3;
use crate::vdp::color::Rgb1555;

pub const WALL_WIDTH: u16 = 320;
pub const WALL_HEIGHT: u16 = 240;
pub const SIGN_WIDTH: u16 = 256;
pub const SIGN_HEIGHT: u16 = 128;

const BRICK_W: i32 = 40;
const BRICK_H: i32 = 20;
const MORTAR: i32 = 2;

/// Biased `[r, g, b]` directions: flat first, then a ring of 8 gentle slopes
/// and a ring of 7 steep ones.
pub const AUTHORED_PALETTE: [[u8; 3]; 16] = [
    [128, 128, 255],
    [191, 128, 238],
    [173, 173, 238],
    [128, 191, 238],
    [83, 173, 238],
    [65, 128, 238],
    [83, 83, 238],
    [128, 65, 238],
    [173, 83, 238],
    [243, 128, 182],
    [200, 218, 182],
    [102, 240, 182],
    [24, 178, 182],
    [24, 78, 182],
    [102, 16, 182],
    [200, 38, 182],
];

/// Something with a height and a color at every pixel.
trait Pattern {
    const WIDTH: u16;
    const HEIGHT: u16;

    /// Elevation 0..=255.
    fn height(&self, x: i32, y: i32) -> u8;

    /// `None` for transparent texels.
    fn color(&self, x: i32, y: i32) -> Option<[u8; 3]>;
}

struct BrickWall;

impl BrickWall {
    /// Distance in pixels from `(x, y)` to the nearest brick edge, and the
    /// brick's id.
    fn brick(x: i32, y: i32) -> (i32, u32) {
        let row = y / BRICK_H;
        let shift = if row % 2 == 1 { BRICK_W / 2 } else { 0 };
        let col = (x + shift) / BRICK_W;
        let bx = (x + shift) % BRICK_W;
        let by = y % BRICK_H;
        let edge = bx.min(BRICK_W - 1 - bx).min(by).min(BRICK_H - 1 - by);
        (edge, hash(col as u32, row as u32))
    }
}

impl Pattern for BrickWall {
    const WIDTH: u16 = WALL_WIDTH;
    const HEIGHT: u16 = WALL_HEIGHT;

    fn height(&self, x: i32, y: i32) -> u8 {
        let (edge, _) = Self::brick(x, y);
        if edge < MORTAR {
            0
        } else {
            ((edge - MORTAR + 1) * 64).min(200) as u8
        }
    }

    fn color(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        let (edge, id) = Self::brick(x, y);
        if edge < MORTAR {
            return Some([150, 148, 140]);
        }
        let tint = (id % 40) as u8;
        let grain = (hash(x as u32, y as u32) % 12) as u8;
        Some([150 + tint / 2 + grain, 60 + tint / 3, 44 + grain / 2])
    }
}

struct EmbossedSign;

impl EmbossedSign {
    const INSET: f32 = 4.0;
    const CORNER: f32 = 16.0;
    const RING_RADIUS: f32 = 40.0;
    const RING_WIDTH: f32 = 6.0;

    /// Signed distance to the plate outline, negative inside.
    fn plate_distance(x: i32, y: i32) -> f32 {
        let cx = Self::WIDTH as f32 / 2.0;
        let cy = Self::HEIGHT as f32 / 2.0;
        let hx = cx - Self::INSET - Self::CORNER;
        let hy = cy - Self::INSET - Self::CORNER;
        let qx = libm::fabsf(x as f32 + 0.5 - cx) - hx;
        let qy = libm::fabsf(y as f32 + 0.5 - cy) - hy;
        let ox = qx.max(0.0);
        let oy = qy.max(0.0);
        libm::sqrtf(ox * ox + oy * oy) + qx.max(qy).min(0.0) - Self::CORNER
    }

    /// Distance from the ring's center line.
    fn ring_distance(x: i32, y: i32) -> f32 {
        let dx = x as f32 + 0.5 - Self::WIDTH as f32 / 2.0;
        let dy = y as f32 + 0.5 - Self::HEIGHT as f32 / 2.0;
        libm::fabsf(libm::sqrtf(dx * dx + dy * dy) - Self::RING_RADIUS)
    }
}

impl Pattern for EmbossedSign {
    const WIDTH: u16 = SIGN_WIDTH;
    const HEIGHT: u16 = SIGN_HEIGHT;

    fn height(&self, x: i32, y: i32) -> u8 {
        let inside = -Self::plate_distance(x, y);
        if inside <= 0.0 {
            return 0;
        }
        let plate = (inside * 24.0).min(160.0);
        let ring = Self::ring_distance(x, y);
        let raised = if ring < Self::RING_WIDTH {
            (Self::RING_WIDTH - ring) * 16.0
        } else {
            0.0
        };
        libm::roundf((plate + raised).min(255.0)) as u8
    }

    fn color(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        if Self::plate_distance(x, y) >= 0.0 {
            return None;
        }
        if Self::ring_distance(x, y) < Self::RING_WIDTH {
            Some([232, 196, 64])
        } else {
            Some([44, 68, 150])
        }
    }
}

/// Small integer hash for per-brick and per-texel variation.
fn hash(a: u32, b: u32) -> u32 {
    let mut h = a.wrapping_mul(0x9E37_79B9) ^ b.wrapping_mul(0x85EB_CA6B);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^ (h >> 12)
}

fn color_image<S: Pattern>(surface: &S) -> ColorImage {
    let pixels = coords::<S>()
        .map(|(x, y)| match surface.color(x, y) {
            Some([r, g, b]) => Rgb1555::from_rgb888(r, g, b),
            None => Rgb1555::TRANSPARENT,
        })
        .collect();
    ColorImage {
        width: S::WIDTH,
        height: S::HEIGHT,
        pixels,
    }
}

fn heightmap<S: Pattern>(surface: &S) -> Heightmap {
    Heightmap {
        width: S::WIDTH,
        height: S::HEIGHT,
        data: coords::<S>().map(|(x, y)| surface.height(x, y)).collect(),
    }
}

/// Quantize the surface gradient onto `AUTHORED_PALETTE`. Transparent texels
/// and the image border use the flat entry.
fn normal_map<S: Pattern>(surface: &S, relief: u8) -> IndexedImage {
    let directions: Vec<Fix16Vec3> = AUTHORED_PALETTE
        .iter()
        .map(|&rgb| decode_palette_normal(rgb))
        .collect();
    let scale = relief as f32 / 255.0;
    let (w, h) = (S::WIDTH as i32, S::HEIGHT as i32);

    let indices = coords::<S>()
        .map(|(x, y)| {
            if x + 1 >= w || y == 0 || y + 1 >= h || surface.color(x, y).is_none() {
                return 0;
            }
            let here = surface.height(x, y) as f32;
            let dz_dx = surface.height(x + 1, y) as f32 - here;
            let dz_dy = surface.height(x, y - 1) as f32 - here;
            let n = Fix16Vec3::from_f32(-dz_dx * scale, -dz_dy * scale, 1.0);
            closest_normal_index(n, &directions) as u8
        })
        .collect();

    IndexedImage {
        width: S::WIDTH,
        height: S::HEIGHT,
        indices,
        palette: AUTHORED_PALETTE.to_vec(),
    }
}

fn coords<S: Pattern>() -> impl Iterator<Item = (i32, i32)> {
    (0..S::HEIGHT as i32).flat_map(|y| (0..S::WIDTH as i32).map(move |x| (x, y)))
}

pub fn wall_color() -> ColorImage {
    color_image(&BrickWall)
}

pub fn wall_heightmap() -> Heightmap {
    heightmap(&BrickWall)
}

pub fn wall_normal_map(relief: u8) -> IndexedImage {
    normal_map(&BrickWall, relief)
}

pub fn sign_color() -> ColorImage {
    color_image(&EmbossedSign)
}

pub fn sign_heightmap() -> Heightmap {
    heightmap(&EmbossedSign)
}

pub fn sign_normal_map(relief: u8) -> IndexedImage {
    normal_map(&EmbossedSign, relief)
}
