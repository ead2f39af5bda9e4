//! Per-frame Lambertian relighting of a normal palette.

use crate::math::fixed::{fix16_cos, fix16_sin, mul_to_int, Fix16, Fix16Vec3, FIX16_ONE};
use crate::vdp::color::{Clut, Rgb1555, CLUT_ENTRIES};

/// Brightest 5-bit channel value.
pub const MAX_LEVEL: u8 = 31;

/// Unit light direction for a light orbiting in the image plane and pointing
/// into the screen: `normalize(cos a, sin a, -1)`.
pub fn light_vector(angle: Fix16) -> Fix16Vec3 {
    Fix16Vec3::new(fix16_cos(angle), fix16_sin(angle), -FIX16_ONE).normalized()
}

/// Shaded level for one normal: `-dot(light, normal) * max_intensity`,
/// rounded and clamped to `[0, min(max_intensity, 31)]`.
pub fn intensity(light: Fix16Vec3, normal: Fix16Vec3, max_intensity: u8) -> u8 {
    let ceiling = max_intensity.min(MAX_LEVEL);
    let lit = -light.dot(normal) * Fix16::from_num(max_intensity);
    lit.round().to_num::<i32>().clamp(0, ceiling as i32) as u8
}

/// Build a full lookup table: opaque gray per direction, transparent past the
/// end of the palette.
pub fn shade_table(light: Fix16Vec3, directions: &[Fix16Vec3], max_intensity: u8) -> Clut {
    let mut clut = Clut::default();
    for (entry, &normal) in clut.entries.iter_mut().zip(directions.iter().take(CLUT_ENTRIES)) {
        *entry = Rgb1555::gray(intensity(light, normal, max_intensity));
    }
    clut
}

/// Screen position of the shadow quad: the anchor pushed away from the light
/// by `offset` pixels. Y is negated since screen y grows downward. Results
/// saturate at the `i16` vertex range.
pub fn shadow_position(anchor: (i16, i16), angle: Fix16, offset: i16) -> (i16, i16) {
    let dx = mul_to_int(fix16_cos(angle), offset);
    let dy = -mul_to_int(fix16_sin(angle), offset);
    (offset_vertex(anchor.0, dx), offset_vertex(anchor.1, dy))
}

fn offset_vertex(base: i16, delta: i32) -> i16 {
    (i32::from(base) + delta).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
