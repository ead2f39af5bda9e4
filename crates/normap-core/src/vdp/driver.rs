//! Platform-agnostic VDP driver, generic over the HAL transport traits.

use core::fmt;

use normap_hal::{DisplayControl, FrameSync, PeripheralPort, VramTransport};

use super::cmdt::{CommandList, CMDT_BYTES};
use super::color::{Clut, Rgb1555};
use super::vram::{VramPartitions, VramRegion};

/// Error type for driver operations, generic over transport errors.
#[derive(Debug)]
pub enum VdpError<E: fmt::Debug> {
    /// A write would run past the end of its destination region.
    RegionOverflow { region: VramRegion, len: u32 },
    /// DMA transport error.
    Transport(E),
}

impl<E: fmt::Debug> From<E> for VdpError<E> {
    fn from(e: E) -> Self {
        VdpError::Transport(e)
    }
}

impl<E: fmt::Debug> fmt::Display for VdpError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VdpError::RegionOverflow { region, len } => write!(
                f,
                "{len} bytes do not fit VRAM region 0x{:05X}+0x{:X}",
                region.offset, region.len
            ),
            VdpError::Transport(e) => write!(f, "transport error: {e:?}"),
        }
    }
}

/// Display configuration applied once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySettings {
    pub width: u16,
    pub height: u16,
    pub back_screen_color: Rgb1555,
    pub erase_color: Rgb1555,
    pub sprite_priority: u8,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            back_screen_color: Rgb1555::gray(10),
            erase_color: Rgb1555::gray(10),
            sprite_priority: 6,
        }
    }
}

/// Owns the platform transport and the VRAM layout.
pub struct VdpDriver<T> {
    transport: T,
    settings: DisplaySettings,
    partitions: VramPartitions,
    frames: u32,
}

impl<T: VramTransport + DisplayControl> VdpDriver<T> {
    /// Configure the display and take ownership of the transport.
    pub fn new(mut transport: T, settings: DisplaySettings, partitions: VramPartitions) -> Self {
        transport.set_resolution(settings.width, settings.height);
        transport.set_back_screen_color(settings.back_screen_color.0);
        transport.set_erase_color(settings.erase_color.0);
        transport.set_sprite_priority(settings.sprite_priority);
        transport.enable_display();

        log::info!(
            "display {}x{}, sprite priority {}",
            settings.width,
            settings.height,
            settings.sprite_priority
        );

        Self {
            transport,
            settings,
            partitions,
            frames: 0,
        }
    }

    /// Start a DMA write into `region` without waiting for it.
    pub fn write_region(&mut self, region: VramRegion, data: &[u8]) -> Result<(), VdpError<T::Error>> {
        let len = data.len() as u32;
        if len > region.len {
            return Err(VdpError::RegionOverflow { region, len });
        }
        self.transport.dma_write(region.offset, data)?;
        Ok(())
    }

    /// Block until all started writes have landed.
    pub fn wait_transfers(&mut self) -> Result<(), VdpError<T::Error>> {
        self.transport.dma_wait()?;
        Ok(())
    }

    /// Blocking write of `data` into `region`.
    pub fn upload(&mut self, region: VramRegion, data: &[u8]) -> Result<(), VdpError<T::Error>> {
        self.write_region(region, data)?;
        self.wait_transfers()
    }

    /// Upload several lookup tables and wait once for all of them.
    pub fn upload_cluts(&mut self, tables: &[(VramRegion, &Clut)]) -> Result<(), VdpError<T::Error>> {
        for (region, clut) in tables {
            self.write_region(*region, &clut.to_bytes())?;
        }
        self.wait_transfers()
    }

    pub fn settings(&self) -> &DisplaySettings {
        &self.settings
    }

    pub fn partitions(&self) -> &VramPartitions {
        &self.partitions
    }

    /// Frames synced so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// Methods available when the transport can also plot and sync frames.
impl<T: VramTransport + DisplayControl + FrameSync> VdpDriver<T> {
    /// Copy the command list into the command table partition and request a plot.
    pub fn submit(&mut self, list: &CommandList) -> Result<(), VdpError<T::Error>> {
        let bytes = list.to_bytes();
        debug_assert_eq!(bytes.len(), list.len() * CMDT_BYTES);
        self.upload(self.partitions.cmdt, &bytes)?;
        self.transport.request_plot();
        Ok(())
    }

    /// Block until the frame is plotted and the VBlank has ended. Returns the
    /// number of VBlank-out edges seen.
    pub fn sync_frame(&mut self) -> u32 {
        self.frames = self.frames.wrapping_add(1);
        self.transport.sync_frame()
    }
}

impl<T: PeripheralPort> PeripheralPort for VdpDriver<T> {
    fn issue_intback(&mut self) {
        self.transport.issue_intback();
    }
}
