//! VDP1 VRAM partitions and bump allocation.
//!
//! VRAM is addressed by byte offset. Each partition is an arena handing out
//! regions front to back; nothing is ever freed.

use core::fmt;

/// Total VDP1 VRAM.
pub const VDP1_VRAM_SIZE: u32 = 0x8_0000;

/// VDP1 stores texture and lookup-table addresses divided by 8.
pub const VRAM_ALIGN: u32 = 8;

/// A span of VDP1 VRAM.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VramRegion {
    pub offset: u32,
    pub len: u32,
}

impl VramRegion {
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    pub const fn end(&self) -> u32 {
        self.offset + self.len
    }

    /// Address in the 8-byte units used by CMDSRCA and CMDCOLR.
    pub const fn addr_div8(&self) -> u16 {
        (self.offset / VRAM_ALIGN) as u16
    }

    pub const fn contains(&self, other: &VramRegion) -> bool {
        other.offset >= self.offset && other.end() <= self.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VramError {
    /// The partition has no room for the request.
    Exhausted {
        requested: u32,
        available: u32,
    },
}

impl fmt::Display for VramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VramError::Exhausted {
                requested,
                available,
            } => write!(
                f,
                "VRAM partition exhausted: requested {requested} bytes, {available} available"
            ),
        }
    }
}

/// Bump allocator over one partition.
#[derive(Clone, Debug)]
pub struct VramArena {
    region: VramRegion,
    next: u32,
}

impl VramArena {
    pub fn new(region: VramRegion) -> Self {
        Self {
            region,
            next: region.offset,
        }
    }

    /// Reserve `len` bytes starting on a multiple of `align`.
    pub fn alloc(&mut self, len: u32, align: u32) -> Result<VramRegion, VramError> {
        let align = align.max(1);
        let start = self.next.div_ceil(align) * align;
        let available = self.region.end().saturating_sub(start);
        if len > available {
            return Err(VramError::Exhausted {
                requested: len,
                available,
            });
        }
        self.next = start + len;
        Ok(VramRegion::new(start, len))
    }

    /// Bytes handed out so far, padding included.
    pub fn used(&self) -> u32 {
        self.next - self.region.offset
    }

    pub fn remaining(&self) -> u32 {
        self.region.end() - self.next
    }

    pub fn region(&self) -> VramRegion {
        self.region
    }
}

/// How VDP1 VRAM is split between command tables, textures, gouraud tables
/// and color lookup tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VramPartitions {
    pub cmdt: VramRegion,
    pub texture: VramRegion,
    pub gouraud: VramRegion,
    pub clut: VramRegion,
}

impl Default for VramPartitions {
    fn default() -> Self {
        Self {
            // 2048 command tables.
            cmdt: VramRegion::new(0x0_0000, 0x1_0000),
            texture: VramRegion::new(0x1_0000, 0x6_C000),
            gouraud: VramRegion::new(0x7_C000, 0x2000),
            clut: VramRegion::new(0x7_E000, 0x2000),
        }
    }
}
