//! Platform-agnostic core of the normap demo.
//!
//! Derives quantized normal-index maps for textures, relights them every frame
//! by rewriting a 16-entry lookup table, and drives the sprite processor through
//! the traits in `normap-hal`.

#![no_std]

extern crate alloc;

pub mod assets;
pub mod frame;
pub mod image;
pub mod lighting;
pub mod math;
pub mod scene;
pub mod texture;
pub mod vdp;
