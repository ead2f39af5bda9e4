//! Fixed direction palette for heightmap-derived normals.

use crate::math::fixed::{Fix16, Fix16Vec3, FIX16_INV_SQRT_2, FIX16_ONE};

const O: Fix16 = Fix16::ZERO;
const I: Fix16 = FIX16_ONE;
const NI: Fix16 = Fix16::from_bits(-0x0001_0000);
const H: Fix16 = FIX16_INV_SQRT_2;
const NH: Fix16 = Fix16::from_bits(-46341);

/// Index of the flat `(0, 0, 1)` direction. Pixel code 0 is also the
/// transparent overlay pixel, so flat texels show the texture unshaded.
pub const FLAT_INDEX: usize = 0;

/// Hand-picked directions approximating common heightmap gradients. Order is
/// free except for position 0.
pub const DIRECTION_PALETTE: [Fix16Vec3; 13] = [
    Fix16Vec3::new(O, O, I),
    Fix16Vec3::new(NI, O, O),
    Fix16Vec3::new(NH, NH, O),
    Fix16Vec3::new(O, NI, O),
    Fix16Vec3::new(H, NH, O),
    Fix16Vec3::new(I, O, O),
    Fix16Vec3::new(H, H, O),
    Fix16Vec3::new(O, I, O),
    Fix16Vec3::new(NH, H, O),
    Fix16Vec3::new(NH, O, H),
    Fix16Vec3::new(O, NH, H),
    Fix16Vec3::new(H, O, H),
    Fix16Vec3::new(O, H, H),
];

/// Index of the palette entry with the largest dot product against `v`.
///
/// Ties keep the first index reached. An empty palette yields 0.
pub fn closest_normal_index(v: Fix16Vec3, palette: &[Fix16Vec3]) -> usize {
    let mut best = Fix16::MIN;
    let mut best_idx = 0;
    for (i, candidate) in palette.iter().enumerate() {
        let p = v.dot(*candidate);
        if i == 0 || p > best {
            best = p;
            best_idx = i;
        }
    }
    best_idx
}
