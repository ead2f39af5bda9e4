//! Screen placement and per-texture parameters of the demo scene.

use crate::texture::TextureConfig;

/// Wall: shallow relief, half brightness.
pub const WALL_CONFIG: TextureConfig = TextureConfig {
    relief: 4,
    max_light_intensity: 15,
};

/// Sign: deeper relief, full brightness.
pub const SIGN_CONFIG: TextureConfig = TextureConfig {
    relief: 8,
    max_light_intensity: 31,
};

/// Coordinates are relative to `origin` once the local-coordinate command runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoLayout {
    /// System clip rectangle.
    pub screen: (i16, i16),
    /// Local coordinate origin (screen center).
    pub origin: (i16, i16),
    pub wall: (i16, i16),
    pub sign: (i16, i16),
    /// Where the shadow quad sits before the first frame moves it.
    pub shadow_start: (i16, i16),
    /// Point the shadow is offset from every frame.
    pub shadow_anchor: (i16, i16),
    /// Shadow distance from the anchor in pixels.
    pub shadow_offset: i16,
}

impl Default for DemoLayout {
    fn default() -> Self {
        Self {
            screen: (320, 240),
            origin: (160, 120),
            wall: (-160, -120),
            sign: (-128, -64),
            shadow_start: (-160, -96),
            shadow_anchor: (-128, -64),
            shadow_offset: 10,
        }
    }
}
