//! The demo scene: two normal-mapped quads, a floating shadow, and the
//! per-frame relight loop.

pub mod layout;

use core::fmt;

use normap_hal::{DisplayControl, FrameSync, PeripheralPort, VramTransport};

use crate::frame::{vblank_out, LightAngle};
use crate::image::{ColorImage, Heightmap, IndexedImage};
use crate::lighting::{light_vector, shadow_position, AuthoredNormals, HeightmapNormals};
use crate::math::{Fix16, Fix16Vec3};
use crate::texture::{LoadError, NormapTexture, TextureAllocator, TextureConfig};
use crate::vdp::cmdt::{CommandError, CommandIndex, CommandList};
use crate::vdp::driver::{VdpDriver, VdpError};

pub use layout::DemoLayout;

/// Frames between performance log lines.
const PERF_LOG_INTERVAL: u32 = 120;

/// Which normal-acquisition strategy the demo's assets use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalVariant {
    /// Normals derived from heightmap gradients.
    #[default]
    Heightmap,
    /// Normals read from an authored palette normal map.
    AuthoredNormalMap,
}

/// Surface description that yields per-pixel normals.
#[derive(Clone, Debug)]
pub enum Surface {
    Heightmap(Heightmap),
    NormalMap(IndexedImage),
}

/// Everything needed to build one texture.
#[derive(Clone, Debug)]
pub struct TextureAsset {
    pub color: ColorImage,
    pub surface: Surface,
    pub config: TextureConfig,
}

impl TextureAsset {
    /// Load through whichever normal strategy the surface calls for.
    pub fn load<T: VramTransport + DisplayControl>(
        &self,
        driver: &mut VdpDriver<T>,
        alloc: &mut TextureAllocator,
    ) -> Result<NormapTexture, LoadError<T::Error>> {
        let max = self.config.max_light_intensity;
        match &self.surface {
            Surface::Heightmap(h) => {
                let normals = HeightmapNormals::new(h, self.config.relief);
                NormapTexture::load(driver, alloc, &self.color, &normals, max)
            }
            Surface::NormalMap(img) => {
                let normals = AuthoredNormals::new(img);
                NormapTexture::load(driver, alloc, &self.color, &normals, max)
            }
        }
    }
}

/// The two textures the scene draws.
#[derive(Clone, Debug)]
pub struct DemoAssets {
    pub wall: TextureAsset,
    pub sign: TextureAsset,
}

/// Error type for scene setup and frames, generic over transport errors.
#[derive(Debug)]
pub enum SceneError<E: fmt::Debug> {
    Load(LoadError<E>),
    Command(CommandError),
    Driver(VdpError<E>),
}

impl<E: fmt::Debug> From<LoadError<E>> for SceneError<E> {
    fn from(e: LoadError<E>) -> Self {
        SceneError::Load(e)
    }
}

impl<E: fmt::Debug> From<CommandError> for SceneError<E> {
    fn from(e: CommandError) -> Self {
        SceneError::Command(e)
    }
}

impl<E: fmt::Debug> From<VdpError<E>> for SceneError<E> {
    fn from(e: VdpError<E>) -> Self {
        SceneError::Driver(e)
    }
}

impl<E: fmt::Debug> fmt::Display for SceneError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Load(e) => write!(f, "texture load failed: {e}"),
            SceneError::Command(e) => write!(f, "command list: {e}"),
            SceneError::Driver(e) => write!(f, "{e}"),
        }
    }
}

/// What one frame did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u32,
    /// Light angle the frame was lit with.
    pub angle: Fix16,
    pub light: Fix16Vec3,
    pub shadow: (i16, i16),
    /// VBlank-out edges handled after the frame.
    pub vblanks: u32,
}

/// Scene state and the hardware it draws with.
pub struct NormapDemo<T> {
    driver: VdpDriver<T>,
    wall: NormapTexture,
    sign: NormapTexture,
    commands: CommandList,
    shadow: CommandIndex,
    layout: DemoLayout,
    light_angle: LightAngle,
}

impl<T> NormapDemo<T>
where
    T: VramTransport + DisplayControl + FrameSync + PeripheralPort,
{
    /// Load both textures and build the fixed command list.
    pub fn new(
        mut driver: VdpDriver<T>,
        assets: &DemoAssets,
        layout: DemoLayout,
    ) -> Result<Self, SceneError<T::Error>> {
        let mut alloc = TextureAllocator::new(driver.partitions());
        let wall = assets.wall.load(&mut driver, &mut alloc)?;
        let sign = assets.sign.load(&mut driver, &mut alloc)?;

        let mut commands = CommandList::new();
        commands.push_system_clip(layout.screen.0, layout.screen.1)?;
        commands.push_local_coord(layout.origin.0, layout.origin.1)?;
        commands.push_normap_quad(&wall, layout.wall.0, layout.wall.1)?;
        let shadow = commands.push_shadow_quad(&sign, layout.shadow_start.0, layout.shadow_start.1)?;
        commands.push_normap_quad(&sign, layout.sign.0, layout.sign.1)?;
        commands.push_end()?;

        log::info!(
            "scene ready: {} commands, {} bytes texture VRAM used",
            commands.len(),
            alloc.texture.used()
        );

        Ok(Self {
            driver,
            wall,
            sign,
            commands,
            shadow,
            layout,
            light_angle: LightAngle::default(),
        })
    }

    /// Relight, draw and sync one frame.
    ///
    /// Both lookup tables are written whole and their transfer has completed
    /// before the command list is submitted.
    pub fn run_frame(&mut self) -> Result<FrameStats, SceneError<T::Error>> {
        let angle = self.light_angle.get();

        let shadow = shadow_position(self.layout.shadow_anchor, angle, self.layout.shadow_offset);
        self.commands.set_vertex(self.shadow, shadow.0, shadow.1)?;

        let light = light_vector(angle);
        let wall_clut = self.wall.shade(light);
        let sign_clut = self.sign.shade(light);
        self.driver
            .upload_cluts(&[(self.wall.clut, &wall_clut), (self.sign.clut, &sign_clut)])?;

        self.driver.submit(&self.commands)?;
        let vblanks = self.driver.sync_frame();
        for _ in 0..vblanks {
            vblank_out(&mut self.driver, &self.light_angle);
        }

        let frame = self.driver.frames();
        if frame % PERF_LOG_INTERVAL == 0 {
            log::info!(
                "frame={}, angle={:.3}, shadow=({}, {}), vblanks={}",
                frame,
                angle.to_num::<f32>(),
                shadow.0,
                shadow.1,
                vblanks
            );
        }

        Ok(FrameStats {
            frame,
            angle,
            light,
            shadow,
            vblanks,
        })
    }

    /// Run frames forever, or until one fails.
    pub fn run(&mut self) -> Result<core::convert::Infallible, SceneError<T::Error>> {
        loop {
            self.run_frame()?;
        }
    }

    pub fn light_angle(&self) -> &LightAngle {
        &self.light_angle
    }

    pub fn commands(&self) -> &CommandList {
        &self.commands
    }

    pub fn shadow_command(&self) -> CommandIndex {
        self.shadow
    }

    pub fn wall(&self) -> &NormapTexture {
        &self.wall
    }

    pub fn sign(&self) -> &NormapTexture {
        &self.sign
    }

    pub fn driver(&self) -> &VdpDriver<T> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut VdpDriver<T> {
        &mut self.driver
    }
}
