#![no_std]

/// Abstracts the DMA path from work RAM into VDP1 VRAM.
///
/// Addresses are byte offsets from the start of VDP1 VRAM. A transfer is only
/// guaranteed to be visible to the sprite processor once `dma_wait` returns.
pub trait VramTransport {
    type Error: core::fmt::Debug;

    /// Start a transfer of `data` to `vram_addr`.
    fn dma_write(&mut self, vram_addr: u32, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until every transfer started so far has completed.
    fn dma_wait(&mut self) -> Result<(), Self::Error>;
}

/// Abstracts the background processor (VDP2) and the sprite framebuffer setup.
pub trait DisplayControl {
    /// Select the display resolution (non-interlaced).
    fn set_resolution(&mut self, width: u16, height: u16);

    /// Color shown where no layer or sprite pixel is drawn (RGB1555).
    fn set_back_screen_color(&mut self, color: u16);

    /// Color the sprite framebuffer is erased to between frames (RGB1555).
    fn set_erase_color(&mut self, color: u16);

    /// Priority of the sprite layer relative to the background layers.
    fn set_sprite_priority(&mut self, priority: u8);

    /// Turn the display on.
    fn enable_display(&mut self);
}

/// Abstracts the per-frame plot/sync handshake with the sprite processor.
pub trait FrameSync {
    /// Ask the sprite processor to plot the command tables at VRAM offset 0.
    fn request_plot(&mut self);

    /// Block until plotting has finished and the next vertical blank has ended.
    ///
    /// Returns how many VBlank-out edges occurred since the previous call. The
    /// caller runs its VBlank-out work that many times before starting the next
    /// frame, so state touched by that work only changes between frames.
    fn sync_frame(&mut self) -> u32;
}

/// Abstracts the system manager's peripheral polling.
pub trait PeripheralPort {
    /// Issue an INTBACK request so pad state is refreshed for the next frame.
    fn issue_intback(&mut self);
}
