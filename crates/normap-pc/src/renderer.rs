//! Software sprite plotter: walks the command tables in VRAM and draws them
//! into an RGB1555 framebuffer.
//!
//! Only what the demo needs is modelled: normal sprites in lookup-table and
//! RGB color modes, system clipping, local coordinates and the four basic
//! color calculation modes. Other commands are skipped with a warning.

use std::path::Path;

use normap_core::vdp::cmdt::{ColorCalc, ColorMode, CommandKind, CommandTable, CMDT_BYTES, MAX_COMMANDS};
use normap_core::vdp::Rgb1555;

const LOOKUP_END_CODE: u8 = 0xF;
const RGB_END_CODE: u16 = 0x7FFF;

/// Sprite framebuffer, row-major RGB1555.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u16>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: u16) {
        self.pixels.fill(color);
    }

    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * self.width + x]
    }

    fn set(&mut self, x: usize, y: usize, color: u16) {
        self.pixels[y * self.width + x] = color;
    }

    /// Expand to RGB888. Pixels nothing was drawn to show `back_color`.
    pub fn to_rgb_image(&self, back_color: u16) -> image::RgbImage {
        image::RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let p = self.get(x as usize, y as usize);
            let p = if p == 0 { back_color } else { p };
            image::Rgb(Rgb1555(p).to_rgb888())
        })
    }

    pub fn save_png(&self, path: &Path, back_color: u16) -> Result<(), image::ImageError> {
        self.to_rgb_image(back_color).save(path)
    }
}

/// What one plot pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlotStats {
    /// Command tables read, including the end command.
    pub commands: usize,
    pub sprites: usize,
    pub pixels: usize,
}

/// Plotter state carried across commands within one pass.
struct Plotter<'a> {
    vram: &'a [u8],
    fb: &'a mut Framebuffer,
    /// Exclusive lower-right clip corner.
    clip: (i32, i32),
    origin: (i32, i32),
}

fn read_u16(vram: &[u8], addr: usize) -> Option<u16> {
    let b = vram.get(addr..addr + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

/// Plot the command list starting at VRAM offset 0.
pub fn plot(vram: &[u8], fb: &mut Framebuffer) -> PlotStats {
    let clip = (fb.width() as i32, fb.height() as i32);
    let mut p = Plotter {
        vram,
        fb,
        clip,
        origin: (0, 0),
    };
    let mut stats = PlotStats::default();

    for i in 0..MAX_COMMANDS {
        let Some(raw) = vram.get(i * CMDT_BYTES..(i + 1) * CMDT_BYTES) else {
            log::warn!("command table {} runs past VRAM", i);
            break;
        };
        let mut bytes = [0u8; CMDT_BYTES];
        bytes.copy_from_slice(raw);
        let cmd = CommandTable::from_bytes(&bytes);
        stats.commands += 1;

        if cmd.is_end() {
            return stats;
        }

        match cmd.kind() {
            CommandKind::SystemClip => {
                let (w, h) = cmd.vertices[2];
                p.clip = (
                    (w as i32).min(p.fb.width() as i32),
                    (h as i32).min(p.fb.height() as i32),
                );
            }
            CommandKind::LocalCoord => {
                let (x, y) = cmd.vertices[0];
                p.origin = (x as i32, y as i32);
            }
            CommandKind::NormalSprite => {
                stats.sprites += 1;
                stats.pixels += p.normal_sprite(&cmd);
            }
            other => log::warn!("command {} ({:?}) not supported, skipped", i, other),
        }
    }

    log::warn!("command list has no end command within {} tables", MAX_COMMANDS);
    stats
}

impl Plotter<'_> {
    /// Draw one unscaled sprite. Returns the number of pixels written.
    fn normal_sprite(&mut self, cmd: &CommandTable) -> usize {
        let mode = cmd.draw_mode();
        let (w, h) = cmd.char_size();
        let (w, h) = (w as usize, h as usize);
        let (ax, ay) = cmd.vertices[0];
        let left = self.origin.0 + ax as i32;
        let top = self.origin.1 + ay as i32;
        let base = cmd.char_addr() as usize;
        let clut = cmd.clut_addr() as usize;

        if !matches!(mode.color_mode, ColorMode::Lookup16 | ColorMode::Rgb) {
            log::warn!("color mode {:?} not supported, sprite skipped", mode.color_mode);
            return 0;
        }

        let mut written = 0;
        for ty in 0..h {
            let y = top + ty as i32;
            if y < 0 || y >= self.clip.1 {
                continue;
            }
            for tx in 0..w {
                let x = left + tx as i32;
                if x < 0 || x >= self.clip.0 {
                    continue;
                }
                let texel = ty * w + tx;

                let color = match mode.color_mode {
                    ColorMode::Lookup16 => {
                        let Some(&byte) = self.vram.get(base + texel / 2) else {
                            continue;
                        };
                        let code = if texel % 2 == 0 { byte >> 4 } else { byte & 0xF };
                        if code == 0 && !mode.transparent_pixel_disable {
                            continue;
                        }
                        if code == LOOKUP_END_CODE && !mode.end_code_disable {
                            continue;
                        }
                        match read_u16(self.vram, clut + code as usize * 2) {
                            Some(c) => c,
                            None => continue,
                        }
                    }
                    _ => {
                        let Some(c) = read_u16(self.vram, base + texel * 2) else {
                            continue;
                        };
                        if c == 0 && !mode.transparent_pixel_disable {
                            continue;
                        }
                        if c == RGB_END_CODE && !mode.end_code_disable {
                            continue;
                        }
                        c
                    }
                };

                let (x, y) = (x as usize, y as usize);
                let below = self.fb.get(x, y);
                self.fb.set(x, y, blend(mode.color_calc, below, color));
                written += 1;
            }
        }
        written
    }
}

fn halve(c: Rgb1555) -> (u8, u8, u8) {
    (c.r() >> 1, c.g() >> 1, c.b() >> 1)
}

/// Apply color calculation of `color` over the framebuffer pixel `below`.
pub fn blend(calc: ColorCalc, below: u16, color: u16) -> u16 {
    let src = Rgb1555(color);
    let dst = Rgb1555(below);
    match calc {
        ColorCalc::Replace | ColorCalc::Gouraud(_) => color,
        ColorCalc::Shadow => {
            // Only darkens pixels something opaque was drawn to.
            if !dst.msb() {
                return below;
            }
            let (r, g, b) = halve(dst);
            Rgb1555::new(1, r, g, b).0
        }
        ColorCalc::HalfLuminance => {
            let (r, g, b) = halve(src);
            Rgb1555::new(src.msb() as u8, r, g, b).0
        }
        ColorCalc::HalfTransparent => {
            if !dst.msb() {
                return color;
            }
            let avg = |a: u8, b: u8| (a + b) >> 1;
            Rgb1555::new(1, avg(src.r(), dst.r()), avg(src.g(), dst.g()), avg(src.b(), dst.b())).0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use normap_core::vdp::cmdt::{CommandList, DrawMode};

    const GRAY10: u16 = 0x8000 | (10 << 10) | (10 << 5) | 10;

    fn vram() -> Vec<u8> {
        vec![0; 0x8_0000]
    }

    fn write_list(vram: &mut [u8], cmds: &[CommandTable]) {
        let mut list = CommandList::new();
        for c in cmds {
            list.push(*c).unwrap();
        }
        let bytes = list.to_bytes();
        vram[..bytes.len()].copy_from_slice(&bytes);
    }

    fn sprite(mode: DrawMode, srca: u32, colr: u32, w: u16, h: u16, x: i16, y: i16) -> CommandTable {
        let mut cmd = CommandTable {
            pmod: mode.to_pmod(),
            srca: (srca / 8) as u16,
            colr: (colr / 8) as u16,
            size: ((w / 8) << 8) | h,
            ..CommandTable::default()
        };
        cmd.vertices[0] = (x, y);
        cmd
    }

    fn rgb_mode(calc: ColorCalc) -> DrawMode {
        DrawMode {
            color_mode: ColorMode::Rgb,
            color_calc: calc,
            ..DrawMode::default()
        }
    }

    fn fill_rgb(vram: &mut [u8], addr: usize, count: usize, color: u16) {
        for i in 0..count {
            vram[addr + i * 2..addr + i * 2 + 2].copy_from_slice(&color.to_be_bytes());
        }
    }

    #[test]
    fn test_rgb_sprite_replace() {
        let mut v = vram();
        fill_rgb(&mut v, 0x1_0000, 16, 0x801F);
        write_list(
            &mut v,
            &[
                sprite(rgb_mode(ColorCalc::Replace), 0x1_0000, 0, 8, 2, 4, 3),
                CommandTable::end(),
            ],
        );
        let mut fb = Framebuffer::new(32, 16);
        fb.clear(GRAY10);
        let stats = plot(&v, &mut fb);
        assert_eq!(stats, PlotStats { commands: 2, sprites: 1, pixels: 16 });
        assert_eq!(fb.get(4, 3), 0x801F);
        assert_eq!(fb.get(11, 4), 0x801F);
        assert_eq!(fb.get(12, 4), GRAY10);
        assert_eq!(fb.get(4, 5), GRAY10);
    }

    #[test]
    fn test_transparent_texels_are_skipped() {
        let mut v = vram();
        fill_rgb(&mut v, 0x1_0000, 8, 0x801F);
        fill_rgb(&mut v, 0x1_0000, 1, 0x0000);
        write_list(
            &mut v,
            &[
                sprite(rgb_mode(ColorCalc::Replace), 0x1_0000, 0, 8, 1, 0, 0),
                CommandTable::end(),
            ],
        );
        let mut fb = Framebuffer::new(16, 4);
        fb.clear(GRAY10);
        assert_eq!(plot(&v, &mut fb).pixels, 7);
        assert_eq!(fb.get(0, 0), GRAY10);
        assert_eq!(fb.get(1, 0), 0x801F);
    }

    #[test]
    fn test_lookup_sprite_reads_clut() {
        let mut v = vram();
        // Codes 0, 1, 2, 15 in the first two bytes.
        v[0x1_0000] = 0x01;
        v[0x1_0001] = 0x2F;
        fill_rgb(&mut v, 0x7_E000 + 2, 1, 0x8001);
        fill_rgb(&mut v, 0x7_E000 + 4, 1, 0x8002);
        fill_rgb(&mut v, 0x7_E000 + 30, 1, 0x800F);
        let mode = DrawMode {
            color_mode: ColorMode::Lookup16,
            end_code_disable: true,
            ..DrawMode::default()
        };
        write_list(
            &mut v,
            &[sprite(mode, 0x1_0000, 0x7_E000, 8, 1, 0, 0), CommandTable::end()],
        );
        let mut fb = Framebuffer::new(8, 1);
        plot(&v, &mut fb);
        assert_eq!(fb.get(0, 0), 0);
        assert_eq!(fb.get(1, 0), 0x8001);
        assert_eq!(fb.get(2, 0), 0x8002);
        assert_eq!(fb.get(3, 0), 0x800F);
    }

    #[test]
    fn test_lookup_end_code_skipped_without_ecd() {
        let mut v = vram();
        v[0x1_0000] = 0xF1;
        fill_rgb(&mut v, 0x7_E000, 16, 0x8421);
        let mode = DrawMode {
            color_mode: ColorMode::Lookup16,
            ..DrawMode::default()
        };
        write_list(
            &mut v,
            &[sprite(mode, 0x1_0000, 0x7_E000, 8, 1, 0, 0), CommandTable::end()],
        );
        let mut fb = Framebuffer::new(8, 1);
        plot(&v, &mut fb);
        assert_eq!(fb.get(0, 0), 0);
        assert_eq!(fb.get(1, 0), 0x8421);
    }

    #[test]
    fn test_local_coord_and_clip() {
        let mut v = vram();
        fill_rgb(&mut v, 0x1_0000, 64, 0x83E0);
        write_list(
            &mut v,
            &[
                CommandTable::system_clip(10, 10),
                CommandTable::local_coord(8, 8),
                sprite(rgb_mode(ColorCalc::Replace), 0x1_0000, 0, 8, 8, -4, -4),
                CommandTable::end(),
            ],
        );
        let mut fb = Framebuffer::new(32, 32);
        let stats = plot(&v, &mut fb);
        // Covers 4..12 but clipped at 10 on both axes.
        assert_eq!(stats.pixels, 36);
        assert_eq!(fb.get(4, 4), 0x83E0);
        assert_eq!(fb.get(9, 9), 0x83E0);
        assert_eq!(fb.get(10, 9), 0);
        assert_eq!(fb.get(3, 4), 0);
    }

    #[test]
    fn test_end_stops_processing() {
        let mut v = vram();
        fill_rgb(&mut v, 0x1_0000, 8, 0x801F);
        write_list(
            &mut v,
            &[
                CommandTable::end(),
                sprite(rgb_mode(ColorCalc::Replace), 0x1_0000, 0, 8, 1, 0, 0),
            ],
        );
        let mut fb = Framebuffer::new(8, 1);
        assert_eq!(plot(&v, &mut fb).sprites, 0);
        assert_eq!(fb.get(0, 0), 0);
    }

    #[test]
    fn test_blend_modes() {
        let dst = Rgb1555::new(1, 20, 10, 4).0;
        let src = Rgb1555::new(1, 10, 30, 0).0;
        assert_eq!(blend(ColorCalc::Replace, dst, src), src);
        assert_eq!(blend(ColorCalc::Shadow, dst, src), Rgb1555::new(1, 10, 5, 2).0);
        assert_eq!(blend(ColorCalc::HalfLuminance, dst, src), Rgb1555::new(1, 5, 15, 0).0);
        assert_eq!(blend(ColorCalc::HalfTransparent, dst, src), Rgb1555::new(1, 15, 20, 2).0);
    }

    #[test]
    fn test_blend_over_undrawn_pixel() {
        let src = Rgb1555::new(1, 10, 30, 0).0;
        assert_eq!(blend(ColorCalc::Shadow, 0, src), 0);
        assert_eq!(blend(ColorCalc::HalfTransparent, 0, src), src);
    }

    #[test]
    fn test_png_expands_colors() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set(0, 0, 0xFFFF);
        let img = fb.to_rgb_image(GRAY10);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(1, 0).0, Rgb1555(GRAY10).to_rgb888());
    }
}
