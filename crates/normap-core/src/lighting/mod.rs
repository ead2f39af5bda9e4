//! Normal-index lighting: building quantized normal fields and relighting them.

pub mod heightmap;
pub mod normal_map;
pub mod palette;
pub mod relight;
pub mod source;

pub use heightmap::HeightmapNormals;
pub use normal_map::AuthoredNormals;
pub use palette::{closest_normal_index, DIRECTION_PALETTE};
pub use relight::{intensity, light_vector, shade_table, shadow_position};
pub use source::{Directions, NormalError, NormalIndexMap, NormalSource};
