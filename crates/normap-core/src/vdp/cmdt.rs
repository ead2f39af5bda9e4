//! VDP1 command tables and the per-frame command list.
//!
//! A command table is 32 bytes (16 big-endian words):
//! CMDCTRL, CMDLINK, CMDPMOD, CMDCOLR, CMDSRCA, CMDSIZE, XA, YA, XB, YB,
//! XC, YC, XD, YD, CMDGRDA, reserved.

use alloc::vec::Vec;
use core::fmt;

use crate::texture::NormapTexture;
use crate::vdp::vram::VramRegion;

/// Command tables the sprite processor is given per frame.
pub const MAX_COMMANDS: usize = 255;
/// Bytes per command table.
pub const CMDT_BYTES: usize = 32;

const CTRL_END: u16 = 0x8000;
const CTRL_COMM_MASK: u16 = 0x000F;

const PMOD_ECD: u16 = 1 << 7;
const PMOD_SPD: u16 = 1 << 6;
const PMOD_COLOR_MODE_SHIFT: u16 = 3;
const PMOD_COLOR_MODE_MASK: u16 = 0x7 << PMOD_COLOR_MODE_SHIFT;
const PMOD_CC_MASK: u16 = 0x7;

/// Command field of CMDCTRL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    NormalSprite,
    ScaledSprite,
    DistortedSprite,
    Polygon,
    Polyline,
    Line,
    UserClip,
    SystemClip,
    LocalCoord,
    Unknown(u8),
}

impl CommandKind {
    const fn bits(self) -> u16 {
        match self {
            CommandKind::NormalSprite => 0x0,
            CommandKind::ScaledSprite => 0x1,
            CommandKind::DistortedSprite => 0x2,
            CommandKind::Polygon => 0x4,
            CommandKind::Polyline => 0x5,
            CommandKind::Line => 0x6,
            CommandKind::UserClip => 0x8,
            CommandKind::SystemClip => 0x9,
            CommandKind::LocalCoord => 0xA,
            CommandKind::Unknown(b) => b as u16 & CTRL_COMM_MASK,
        }
    }

    const fn from_bits(bits: u16) -> Self {
        match bits & CTRL_COMM_MASK {
            0x0 => CommandKind::NormalSprite,
            0x1 => CommandKind::ScaledSprite,
            0x2 | 0x3 => CommandKind::DistortedSprite,
            0x4 => CommandKind::Polygon,
            0x5 => CommandKind::Polyline,
            0x6 => CommandKind::Line,
            0x8 => CommandKind::UserClip,
            0x9 => CommandKind::SystemClip,
            0xA => CommandKind::LocalCoord,
            other => CommandKind::Unknown(other as u8),
        }
    }
}

/// Pixel color interpretation (CMDPMOD bits 5..3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    #[default]
    Bank16,
    Lookup16,
    Bank64,
    Bank128,
    Bank256,
    Rgb,
    Reserved(u8),
}

impl ColorMode {
    const fn bits(self) -> u16 {
        match self {
            ColorMode::Bank16 => 0,
            ColorMode::Lookup16 => 1,
            ColorMode::Bank64 => 2,
            ColorMode::Bank128 => 3,
            ColorMode::Bank256 => 4,
            ColorMode::Rgb => 5,
            ColorMode::Reserved(b) => b as u16 & 0x7,
        }
    }

    const fn from_bits(bits: u16) -> Self {
        match bits & 0x7 {
            0 => ColorMode::Bank16,
            1 => ColorMode::Lookup16,
            2 => ColorMode::Bank64,
            3 => ColorMode::Bank128,
            4 => ColorMode::Bank256,
            5 => ColorMode::Rgb,
            other => ColorMode::Reserved(other as u8),
        }
    }
}

/// Color calculation against the framebuffer (CMDPMOD bits 2..0).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorCalc {
    #[default]
    Replace,
    Shadow,
    HalfLuminance,
    HalfTransparent,
    Gouraud(u8),
}

impl ColorCalc {
    const fn bits(self) -> u16 {
        match self {
            ColorCalc::Replace => 0,
            ColorCalc::Shadow => 1,
            ColorCalc::HalfLuminance => 2,
            ColorCalc::HalfTransparent => 3,
            ColorCalc::Gouraud(b) => b as u16 & PMOD_CC_MASK,
        }
    }

    const fn from_bits(bits: u16) -> Self {
        match bits & PMOD_CC_MASK {
            0 => ColorCalc::Replace,
            1 => ColorCalc::Shadow,
            2 => ColorCalc::HalfLuminance,
            3 => ColorCalc::HalfTransparent,
            other => ColorCalc::Gouraud(other as u8),
        }
    }
}

/// The CMDPMOD fields this demo uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawMode {
    pub color_mode: ColorMode,
    pub color_calc: ColorCalc,
    /// End codes are drawn as ordinary pixels.
    pub end_code_disable: bool,
    /// Pixel code 0 is drawn instead of being transparent.
    pub transparent_pixel_disable: bool,
}

impl DrawMode {
    pub const fn to_pmod(self) -> u16 {
        let mut pmod = (self.color_mode.bits() << PMOD_COLOR_MODE_SHIFT) | self.color_calc.bits();
        if self.end_code_disable {
            pmod |= PMOD_ECD;
        }
        if self.transparent_pixel_disable {
            pmod |= PMOD_SPD;
        }
        pmod
    }

    pub const fn from_pmod(pmod: u16) -> Self {
        Self {
            color_mode: ColorMode::from_bits((pmod & PMOD_COLOR_MODE_MASK) >> PMOD_COLOR_MODE_SHIFT),
            color_calc: ColorCalc::from_bits(pmod),
            end_code_disable: pmod & PMOD_ECD != 0,
            transparent_pixel_disable: pmod & PMOD_SPD != 0,
        }
    }
}

/// One 32-byte VDP1 command table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommandTable {
    pub ctrl: u16,
    pub link: u16,
    pub pmod: u16,
    pub colr: u16,
    pub srca: u16,
    pub size: u16,
    /// Vertices A..D as `(x, y)`.
    pub vertices: [(i16, i16); 4],
    pub grda: u16,
}

impl CommandTable {
    /// Set the system clipping rectangle to `(0,0)..(width,height)`.
    pub fn system_clip(width: i16, height: i16) -> Self {
        let mut cmd = Self {
            ctrl: CommandKind::SystemClip.bits(),
            ..Self::default()
        };
        cmd.vertices[2] = (width, height);
        cmd
    }

    /// Move the origin of later vertex coordinates.
    pub fn local_coord(x: i16, y: i16) -> Self {
        let mut cmd = Self {
            ctrl: CommandKind::LocalCoord.bits(),
            ..Self::default()
        };
        cmd.vertices[0] = (x, y);
        cmd
    }

    /// Unscaled sprite with its top-left corner at `(x, y)`.
    pub fn normal_sprite(sprite: &SpriteParams, x: i16, y: i16) -> Self {
        let mut cmd = Self {
            ctrl: CommandKind::NormalSprite.bits(),
            pmod: sprite.draw_mode.to_pmod(),
            colr: sprite.colr,
            srca: sprite.char_region.addr_div8(),
            size: encode_size(sprite.width, sprite.height),
            ..Self::default()
        };
        cmd.vertices[0] = (x, y);
        cmd
    }

    /// Terminates command processing.
    pub fn end() -> Self {
        Self {
            ctrl: CTRL_END,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> CommandKind {
        CommandKind::from_bits(self.ctrl)
    }

    pub fn is_end(&self) -> bool {
        self.ctrl & CTRL_END != 0
    }

    pub fn draw_mode(&self) -> DrawMode {
        DrawMode::from_pmod(self.pmod)
    }

    /// Character size as `(width, height)` in pixels.
    pub fn char_size(&self) -> (u16, u16) {
        (((self.size >> 8) & 0x3F) * 8, self.size & 0xFF)
    }

    /// Character data offset in VRAM bytes.
    pub fn char_addr(&self) -> u32 {
        self.srca as u32 * 8
    }

    /// Lookup table offset in VRAM bytes (color mode 1).
    pub fn clut_addr(&self) -> u32 {
        self.colr as u32 * 8
    }

    pub fn to_words(&self) -> [u16; 16] {
        let v = self.vertices;
        [
            self.ctrl,
            self.link,
            self.pmod,
            self.colr,
            self.srca,
            self.size,
            v[0].0 as u16,
            v[0].1 as u16,
            v[1].0 as u16,
            v[1].1 as u16,
            v[2].0 as u16,
            v[2].1 as u16,
            v[3].0 as u16,
            v[3].1 as u16,
            self.grda,
            0,
        ]
    }

    pub fn from_words(w: &[u16; 16]) -> Self {
        Self {
            ctrl: w[0],
            link: w[1],
            pmod: w[2],
            colr: w[3],
            srca: w[4],
            size: w[5],
            vertices: [
                (w[6] as i16, w[7] as i16),
                (w[8] as i16, w[9] as i16),
                (w[10] as i16, w[11] as i16),
                (w[12] as i16, w[13] as i16),
            ],
            grda: w[14],
        }
    }

    pub fn to_bytes(&self) -> [u8; CMDT_BYTES] {
        let mut out = [0u8; CMDT_BYTES];
        for (chunk, word) in out.chunks_exact_mut(2).zip(self.to_words()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8; CMDT_BYTES]) -> Self {
        let mut words = [0u16; 16];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Self::from_words(&words)
    }
}

/// CMDSIZE: `[13:8]` width / 8, `[7:0]` height.
const fn encode_size(width: u16, height: u16) -> u16 {
    (((width / 8) & 0x3F) << 8) | (height & 0xFF)
}

/// Source data and draw mode for a sprite command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteParams {
    pub char_region: VramRegion,
    pub width: u16,
    pub height: u16,
    pub draw_mode: DrawMode,
    /// CMDCOLR: lookup table address / 8 in color mode 1, unused in RGB mode.
    pub colr: u16,
}

/// Position of a command inside a `CommandList`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandIndex(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The list already holds `MAX_COMMANDS` tables.
    ListFull,
    /// No command at this index.
    InvalidIndex(usize),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::ListFull => write!(f, "command list full ({MAX_COMMANDS} entries)"),
            CommandError::InvalidIndex(i) => write!(f, "no command at index {i}"),
        }
    }
}

/// Ordered command tables for one frame.
#[derive(Clone, Debug, Default)]
pub struct CommandList {
    tables: heapless::Vec<CommandTable, MAX_COMMANDS>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn get(&self, index: CommandIndex) -> Option<&CommandTable> {
        self.tables.get(index.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandTable> {
        self.tables.iter()
    }

    pub fn push(&mut self, cmd: CommandTable) -> Result<CommandIndex, CommandError> {
        let index = self.tables.len();
        self.tables.push(cmd).map_err(|_| CommandError::ListFull)?;
        Ok(CommandIndex(index))
    }

    pub fn push_system_clip(&mut self, width: i16, height: i16) -> Result<CommandIndex, CommandError> {
        self.push(CommandTable::system_clip(width, height))
    }

    pub fn push_local_coord(&mut self, x: i16, y: i16) -> Result<CommandIndex, CommandError> {
        self.push(CommandTable::local_coord(x, y))
    }

    pub fn push_end(&mut self) -> Result<CommandIndex, CommandError> {
        self.push(CommandTable::end())
    }

    /// Push the RGB texture sprite followed by its lookup-table overlay, which
    /// is blended half-transparent over the texture. Returns the texture
    /// command's index.
    pub fn push_normap_quad(
        &mut self,
        texture: &NormapTexture,
        x: i16,
        y: i16,
    ) -> Result<CommandIndex, CommandError> {
        if self.tables.len() + 2 > MAX_COMMANDS {
            return Err(CommandError::ListFull);
        }
        let index = self.push(CommandTable::normal_sprite(&texture.color_sprite(), x, y))?;
        self.push(CommandTable::normal_sprite(&texture.overlay_sprite(), x, y))?;
        Ok(index)
    }

    /// Push the texture as a shadow: every opaque texel halves the framebuffer
    /// pixel beneath it.
    pub fn push_shadow_quad(
        &mut self,
        texture: &NormapTexture,
        x: i16,
        y: i16,
    ) -> Result<CommandIndex, CommandError> {
        self.push(CommandTable::normal_sprite(&texture.shadow_sprite(), x, y))
    }

    /// Move vertex A of an existing command.
    pub fn set_vertex(&mut self, index: CommandIndex, x: i16, y: i16) -> Result<(), CommandError> {
        let cmd = self
            .tables
            .get_mut(index.0)
            .ok_or(CommandError::InvalidIndex(index.0))?;
        cmd.vertices[0] = (x, y);
        Ok(())
    }

    /// VRAM image of the list, table 0 first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.tables.len() * CMDT_BYTES);
        for cmd in &self.tables {
            out.extend_from_slice(&cmd.to_bytes());
        }
        out
    }
}
