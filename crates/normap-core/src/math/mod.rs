pub mod fixed;

pub use self::fixed::{fix16_cos, fix16_sin, Fix16, Fix16Vec3};
