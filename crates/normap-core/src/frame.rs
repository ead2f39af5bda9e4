//! State advanced by the VBlank-out handler.
//!
//! The light angle has one writer (the VBlank-out work) and one reader (the
//! frame loop). The writer only runs between `sync_frame` returning and the
//! next frame starting, and the reader samples it once per frame, so relaxed
//! ordering is enough.

use core::sync::atomic::{AtomicI32, Ordering};

use normap_hal::PeripheralPort;

use crate::math::fixed::{Fix16, FIX16_2PI};

/// Angle added per VBlank-out.
pub const LIGHT_ANGLE_STEP: Fix16 = Fix16::from_bits(3277); // 0.05 rad

/// Light azimuth in radians, Q16.16.
#[derive(Debug, Default)]
pub struct LightAngle(AtomicI32);

impl LightAngle {
    pub const fn new(angle: Fix16) -> Self {
        Self(AtomicI32::new(angle.to_bits()))
    }

    pub fn get(&self) -> Fix16 {
        Fix16::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, angle: Fix16) {
        self.0.store(angle.to_bits(), Ordering::Relaxed);
    }

    /// Step the angle, restarting at 0 once it passes 2*pi.
    pub fn advance(&self) -> Fix16 {
        let mut next = self.get() + LIGHT_ANGLE_STEP;
        if next > FIX16_2PI {
            next = Fix16::ZERO;
        }
        self.set(next);
        next
    }
}

/// Work done once per VBlank-out edge: poll peripherals, step the light.
pub fn vblank_out<P: PeripheralPort + ?Sized>(port: &mut P, angle: &LightAngle) {
    port.issue_intback();
    angle.advance();
}
