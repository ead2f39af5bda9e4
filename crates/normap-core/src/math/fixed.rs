//! Q16.16 fixed-point helpers matching the console's `fix16` arithmetic.
//!
//! Dot and cross products run in fixed point so results match what the SH-2
//! computes without an FPU. Normalization and trig go through `f32`
//! (`glam`/`libm`) and are quantized back, which stays within one LSB.

use ::fixed::types::I16F16;
use glam::Vec3;

/// Signed Q16.16 scalar.
pub type Fix16 = I16F16;

/// 1.0
pub const FIX16_ONE: Fix16 = Fix16::from_bits(0x0001_0000);
/// 1/sqrt(2), rounded the same way the asset tables were authored (0.7071).
pub const FIX16_INV_SQRT_2: Fix16 = Fix16::from_bits(46341);
/// 2*pi
pub const FIX16_2PI: Fix16 = Fix16::from_bits(411_774);

/// Three Q16.16 components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fix16Vec3 {
    pub x: Fix16,
    pub y: Fix16,
    pub z: Fix16,
}

impl Fix16Vec3 {
    pub const ZERO: Self = Self::new(Fix16::ZERO, Fix16::ZERO, Fix16::ZERO);

    pub const fn new(x: Fix16, y: Fix16, z: Fix16) -> Self {
        Self { x, y, z }
    }

    /// Quantize three `f32` components.
    pub fn from_f32(x: f32, y: f32, z: f32) -> Self {
        Self::new(Fix16::from_num(x), Fix16::from_num(y), Fix16::from_num(z))
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::from_f32(v.x, v.y, v.z)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(
            self.x.to_num::<f32>(),
            self.y.to_num::<f32>(),
            self.z.to_num::<f32>(),
        )
    }

    pub fn dot(self, rhs: Self) -> Fix16 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn length(self) -> Fix16 {
        Fix16::from_num(self.to_vec3().length())
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Self {
        Self::from_vec3(self.to_vec3().normalize_or_zero())
    }
}

/// Cosine of an angle in radians.
pub fn fix16_cos(angle: Fix16) -> Fix16 {
    Fix16::from_num(libm::cosf(angle.to_num::<f32>()))
}

/// Sine of an angle in radians.
pub fn fix16_sin(angle: Fix16) -> Fix16 {
    Fix16::from_num(libm::sinf(angle.to_num::<f32>()))
}

/// Multiply by an integer and drop the fraction (floor), like `fix16_int16_mul`
/// followed by `fix16_int32_to`.
pub fn mul_to_int(value: Fix16, factor: i16) -> i32 {
    (value * Fix16::from_num(factor)).to_num::<i32>()
}
