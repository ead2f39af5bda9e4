//! Simulated console implementing every HAL trait on the host.

use normap_core::vdp::vram::VDP1_VRAM_SIZE;
use normap_hal::{DisplayControl, FrameSync, PeripheralPort, VramTransport};

use crate::renderer::{self, Framebuffer, PlotStats};

/// DMA failure on the simulated bus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DmaError {
    #[error("DMA of {len} bytes to 0x{addr:05X} runs past the end of VRAM")]
    OutOfRange { addr: u32, len: usize },
}

/// Display state set through `DisplayControl`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub width: u16,
    pub height: u16,
    pub back_screen_color: u16,
    pub erase_color: u16,
    pub sprite_priority: u8,
    pub enabled: bool,
}

/// VDP1 VRAM, a DMA queue, the sprite framebuffer and the VBlank counter.
pub struct SimConsole {
    vram: Vec<u8>,
    /// Transfers started but not yet waited on.
    pending: Vec<(u32, Vec<u8>)>,
    display: DisplayState,
    framebuffer: Framebuffer,
    plot_requested: bool,
    last_plot: PlotStats,
    vblanks: u64,
    intbacks: u64,
}

impl Default for SimConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConsole {
    pub fn new() -> Self {
        Self {
            vram: vec![0; VDP1_VRAM_SIZE as usize],
            pending: Vec::new(),
            display: DisplayState::default(),
            framebuffer: Framebuffer::new(0, 0),
            plot_requested: false,
            last_plot: PlotStats::default(),
            vblanks: 0,
            intbacks: 0,
        }
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn last_plot(&self) -> PlotStats {
        self.last_plot
    }

    pub fn vblanks(&self) -> u64 {
        self.vblanks
    }

    pub fn intbacks(&self) -> u64 {
        self.intbacks
    }

    /// Transfers still in flight.
    pub fn pending_transfers(&self) -> usize {
        self.pending.len()
    }
}

impl VramTransport for SimConsole {
    type Error = DmaError;

    fn dma_write(&mut self, vram_addr: u32, data: &[u8]) -> Result<(), Self::Error> {
        let end = vram_addr as usize + data.len();
        if end > self.vram.len() {
            return Err(DmaError::OutOfRange {
                addr: vram_addr,
                len: data.len(),
            });
        }
        log::debug!("dma 0x{:05X} <- {} bytes", vram_addr, data.len());
        self.pending.push((vram_addr, data.to_vec()));
        Ok(())
    }

    fn dma_wait(&mut self) -> Result<(), Self::Error> {
        for (addr, data) in self.pending.drain(..) {
            let start = addr as usize;
            self.vram[start..start + data.len()].copy_from_slice(&data);
        }
        Ok(())
    }
}

impl DisplayControl for SimConsole {
    fn set_resolution(&mut self, width: u16, height: u16) {
        self.display.width = width;
        self.display.height = height;
        self.framebuffer = Framebuffer::new(width as usize, height as usize);
    }

    fn set_back_screen_color(&mut self, color: u16) {
        self.display.back_screen_color = color;
    }

    fn set_erase_color(&mut self, color: u16) {
        self.display.erase_color = color;
    }

    fn set_sprite_priority(&mut self, priority: u8) {
        self.display.sprite_priority = priority;
    }

    fn enable_display(&mut self) {
        self.display.enabled = true;
    }
}

impl FrameSync for SimConsole {
    fn request_plot(&mut self) {
        self.plot_requested = true;
    }

    /// Erase and plot if a plot was requested, then pass one VBlank.
    fn sync_frame(&mut self) -> u32 {
        if self.plot_requested {
            if !self.pending.is_empty() {
                log::warn!("plotting with {} DMA transfers still pending", self.pending.len());
            }
            self.framebuffer.clear(self.display.erase_color);
            self.last_plot = renderer::plot(&self.vram, &mut self.framebuffer);
            self.plot_requested = false;
        } else {
            log::warn!("frame synced without a plot request");
        }
        self.vblanks += 1;
        1
    }
}

impl PeripheralPort for SimConsole {
    fn issue_intback(&mut self) {
        self.intbacks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normap_core::vdp::cmdt::CommandTable;

    #[test]
    fn test_dma_visible_after_wait() {
        let mut sim = SimConsole::new();
        sim.dma_write(0x100, &[1, 2, 3]).unwrap();
        assert_eq!(sim.pending_transfers(), 1);
        assert_eq!(&sim.vram()[0x100..0x103], &[0, 0, 0]);
        sim.dma_wait().unwrap();
        assert_eq!(&sim.vram()[0x100..0x103], &[1, 2, 3]);
        assert_eq!(sim.pending_transfers(), 0);
    }

    #[test]
    fn test_dma_past_end_is_rejected() {
        let mut sim = SimConsole::new();
        let err = sim.dma_write(VDP1_VRAM_SIZE - 2, &[0; 4]).unwrap_err();
        assert_eq!(
            err,
            DmaError::OutOfRange {
                addr: VDP1_VRAM_SIZE - 2,
                len: 4
            }
        );
    }

    #[test]
    fn test_resolution_sizes_framebuffer() {
        let mut sim = SimConsole::new();
        sim.set_resolution(320, 240);
        sim.enable_display();
        assert_eq!(sim.framebuffer().width(), 320);
        assert_eq!(sim.framebuffer().height(), 240);
        assert!(sim.display().enabled);
    }

    #[test]
    fn test_sync_plots_requested_frame() {
        let mut sim = SimConsole::new();
        sim.set_resolution(16, 16);
        sim.set_erase_color(0x8421);
        sim.dma_write(0, &CommandTable::end().to_bytes()).unwrap();
        sim.dma_wait().unwrap();
        sim.request_plot();
        assert_eq!(sim.sync_frame(), 1);
        assert_eq!(sim.last_plot().commands, 1);
        assert_eq!(sim.framebuffer().get(5, 5), 0x8421);
        assert_eq!(sim.vblanks(), 1);
    }

    #[test]
    fn test_sync_without_plot_keeps_framebuffer() {
        let mut sim = SimConsole::new();
        sim.set_resolution(8, 8);
        sim.set_erase_color(0x8421);
        sim.sync_frame();
        assert_eq!(sim.framebuffer().get(0, 0), 0);
        assert_eq!(sim.vblanks(), 1);
    }

    #[test]
    fn test_intback_counted() {
        let mut sim = SimConsole::new();
        sim.issue_intback();
        sim.issue_intback();
        assert_eq!(sim.intbacks(), 2);
    }
}
