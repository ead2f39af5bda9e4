//! Sprite processor (VDP1) data formats and driver.

pub mod cmdt;
pub mod color;
pub mod driver;
pub mod vram;

pub use cmdt::{CommandIndex, CommandList, CommandTable};
pub use color::{Clut, Rgb1555};
pub use driver::{DisplaySettings, VdpDriver, VdpError};
pub use vram::{VramArena, VramPartitions, VramRegion};
