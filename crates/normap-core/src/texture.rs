//! Textures with a normal-index overlay and their VRAM placement.

use core::fmt;

use normap_hal::{DisplayControl, VramTransport};

use crate::image::{dims_match, ColorImage};
use crate::lighting::source::{Directions, NormalError, NormalSource};
use crate::lighting::shade_table;
use crate::math::Fix16Vec3;
use crate::vdp::cmdt::{ColorCalc, ColorMode, DrawMode, SpriteParams};
use crate::vdp::color::{pixels_to_bytes, Clut, CLUT_BYTES};
use crate::vdp::driver::{VdpDriver, VdpError};
use crate::vdp::vram::{VramArena, VramError, VramPartitions, VramRegion, VRAM_ALIGN};

/// Per-texture lighting parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureConfig {
    /// Heightmap relief: texels of height a 0..255 swing represents.
    pub relief: u8,
    /// Peak brightness of the lookup table (5-bit level).
    pub max_light_intensity: u8,
}

/// Error loading a texture, generic over transport errors.
#[derive(Debug)]
pub enum LoadError<E: fmt::Debug> {
    /// Sprite widths must be a multiple of 8 (CMDSIZE stores width / 8).
    UnalignedWidth(u16),
    /// Color image and normal source disagree on size, or a buffer is short.
    SizeMismatch {
        color: (u16, u16),
        normals: (u16, u16),
    },
    Normals(NormalError),
    Vram(VramError),
    Driver(VdpError<E>),
}

impl<E: fmt::Debug> From<NormalError> for LoadError<E> {
    fn from(e: NormalError) -> Self {
        LoadError::Normals(e)
    }
}

impl<E: fmt::Debug> From<VramError> for LoadError<E> {
    fn from(e: VramError) -> Self {
        LoadError::Vram(e)
    }
}

impl<E: fmt::Debug> From<VdpError<E>> for LoadError<E> {
    fn from(e: VdpError<E>) -> Self {
        LoadError::Driver(e)
    }
}

impl<E: fmt::Debug> fmt::Display for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::UnalignedWidth(w) => write!(f, "texture width {w} is not a multiple of 8"),
            LoadError::SizeMismatch { color, normals } => write!(
                f,
                "color image is {}x{} but normals are {}x{}",
                color.0, color.1, normals.0, normals.1
            ),
            LoadError::Normals(e) => write!(f, "normal map: {e}"),
            LoadError::Vram(e) => write!(f, "{e}"),
            LoadError::Driver(e) => write!(f, "{e}"),
        }
    }
}

/// Bump allocators for texture data and lookup tables.
pub struct TextureAllocator {
    pub texture: VramArena,
    pub clut: VramArena,
}

impl TextureAllocator {
    pub fn new(partitions: &VramPartitions) -> Self {
        Self {
            texture: VramArena::new(partitions.texture),
            clut: VramArena::new(partitions.clut),
        }
    }
}

/// A color texture plus the normal-index overlay that shades it.
#[derive(Clone, Debug)]
pub struct NormapTexture {
    pub width: u16,
    pub height: u16,
    /// RGB1555 texels.
    pub texture: VramRegion,
    /// Packed 4bpp normal indices.
    pub normal_map: VramRegion,
    /// The 16-entry table rewritten every frame.
    pub clut: VramRegion,
    pub max_light_intensity: u8,
    pub directions: Directions,
}

impl NormapTexture {
    /// Upload `color` and the index map from `normals`, and reserve the
    /// texture's lookup table. Regions are taken from `alloc` in that order.
    pub fn load<T, S>(
        driver: &mut VdpDriver<T>,
        alloc: &mut TextureAllocator,
        color: &ColorImage,
        normals: &S,
        max_light_intensity: u8,
    ) -> Result<Self, LoadError<T::Error>>
    where
        T: VramTransport + DisplayControl,
        S: NormalSource + ?Sized,
    {
        let (width, height) = (color.width, color.height);
        if width % 8 != 0 {
            return Err(LoadError::UnalignedWidth(width));
        }
        if (normals.width(), normals.height()) != (width, height)
            || !dims_match(width, height, color.pixels.len())
        {
            return Err(LoadError::SizeMismatch {
                color: (width, height),
                normals: (normals.width(), normals.height()),
            });
        }

        let texels = pixels_to_bytes(&color.pixels);
        let texture = alloc.texture.alloc(texels.len() as u32, VRAM_ALIGN)?;
        driver.upload(texture, &texels)?;

        let index_map = normals.index_map()?;
        let directions = normals.directions()?;
        let packed = index_map.as_bytes();
        let normal_map = alloc.texture.alloc(packed.len() as u32, VRAM_ALIGN)?;
        driver.upload(normal_map, packed)?;

        let clut = alloc.clut.alloc(CLUT_BYTES as u32, VRAM_ALIGN)?;

        log::info!(
            "loaded {}x{} texture: texels @0x{:05X}, normals @0x{:05X}, clut @0x{:05X}, {} directions",
            width,
            height,
            texture.offset,
            normal_map.offset,
            clut.offset,
            directions.len()
        );

        Ok(Self {
            width,
            height,
            texture,
            normal_map,
            clut,
            max_light_intensity,
            directions,
        })
    }

    /// Lookup table for the given light direction.
    pub fn shade(&self, light: Fix16Vec3) -> Clut {
        shade_table(light, &self.directions, self.max_light_intensity)
    }

    /// The RGB texture drawn as-is.
    pub fn color_sprite(&self) -> SpriteParams {
        SpriteParams {
            char_region: self.texture,
            width: self.width,
            height: self.height,
            draw_mode: DrawMode {
                color_mode: ColorMode::Rgb,
                ..DrawMode::default()
            },
            colr: 0,
        }
    }

    /// The normal-index bitmap drawn through the lookup table, averaged with
    /// whatever is below it.
    pub fn overlay_sprite(&self) -> SpriteParams {
        SpriteParams {
            char_region: self.normal_map,
            width: self.width,
            height: self.height,
            draw_mode: DrawMode {
                color_mode: ColorMode::Lookup16,
                color_calc: ColorCalc::HalfTransparent,
                // Code 0xF is an ordinary direction for authored palettes.
                end_code_disable: true,
                transparent_pixel_disable: false,
            },
            colr: self.clut.addr_div8(),
        }
    }

    /// The RGB texture used as a shadow mask.
    pub fn shadow_sprite(&self) -> SpriteParams {
        SpriteParams {
            draw_mode: DrawMode {
                color_mode: ColorMode::Rgb,
                color_calc: ColorCalc::Shadow,
                ..DrawMode::default()
            },
            ..self.color_sprite()
        }
    }
}
