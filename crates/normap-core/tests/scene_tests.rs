//! Integration tests for the VDP driver, texture loading and the demo frame
//! loop, using a mock console that records every transfer and handshake.

use std::cell::RefCell;
use std::rc::Rc;

use normap_core::assets::demo_assets;
use normap_core::frame::LIGHT_ANGLE_STEP;
use normap_core::image::{ColorImage, Heightmap};
use normap_core::lighting::{light_vector, HeightmapNormals};
use normap_core::math::Fix16;
use normap_core::scene::{DemoLayout, NormalVariant, NormapDemo, SceneError};
use normap_core::texture::{LoadError, NormapTexture, TextureAllocator};
use normap_core::vdp::cmdt::{ColorCalc, ColorMode, CommandKind, CommandTable, CMDT_BYTES};
use normap_core::vdp::vram::{VramError, VDP1_VRAM_SIZE};
use normap_core::vdp::{DisplaySettings, Rgb1555, VdpDriver, VdpError, VramPartitions, VramRegion};

/// Everything the console was asked to do, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Event {
    Dma { addr: u32, len: usize },
    Wait,
    Plot,
    Sync,
    Intback,
}

struct MockState {
    events: Vec<Event>,
    /// Transfers started but not yet waited on.
    pending: Vec<(u32, Vec<u8>)>,
    vram: Vec<u8>,
    resolution: Option<(u16, u16)>,
    back_color: Option<u16>,
    erase_color: Option<u16>,
    priority: Option<u8>,
    display_on: bool,
    vblanks_per_frame: u32,
    fail_dma: bool,
}

/// Mock console. Clones share state, so a test keeps one handle after the
/// driver takes ownership of the other.
#[derive(Clone)]
struct MockConsole {
    state: Rc<RefCell<MockState>>,
}

impl MockConsole {
    fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(MockState {
                events: Vec::new(),
                pending: Vec::new(),
                vram: vec![0; VDP1_VRAM_SIZE as usize],
                resolution: None,
                back_color: None,
                erase_color: None,
                priority: None,
                display_on: false,
                vblanks_per_frame: 1,
                fail_dma: false,
            })),
        }
    }

    fn events(&self) -> Vec<Event> {
        self.state.borrow().events.clone()
    }

    fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    fn vram(&self, offset: u32, len: usize) -> Vec<u8> {
        let start = offset as usize;
        self.state.borrow().vram[start..start + len].to_vec()
    }

    fn command(&self, index: usize) -> CommandTable {
        let bytes = self.vram((index * CMDT_BYTES) as u32, CMDT_BYTES);
        let mut raw = [0u8; CMDT_BYTES];
        raw.copy_from_slice(&bytes);
        CommandTable::from_bytes(&raw)
    }

    fn set_vblanks_per_frame(&self, n: u32) {
        self.state.borrow_mut().vblanks_per_frame = n;
    }

    fn set_fail_dma(&self, fail: bool) {
        self.state.borrow_mut().fail_dma = fail;
    }
}

#[derive(Debug, PartialEq, Eq)]
struct MockError;

impl normap_hal::VramTransport for MockConsole {
    type Error = MockError;

    fn dma_write(&mut self, vram_addr: u32, data: &[u8]) -> Result<(), Self::Error> {
        let mut s = self.state.borrow_mut();
        if s.fail_dma {
            return Err(MockError);
        }
        s.events.push(Event::Dma {
            addr: vram_addr,
            len: data.len(),
        });
        s.pending.push((vram_addr, data.to_vec()));
        Ok(())
    }

    fn dma_wait(&mut self) -> Result<(), Self::Error> {
        let mut s = self.state.borrow_mut();
        s.events.push(Event::Wait);
        let pending = std::mem::take(&mut s.pending);
        for (addr, data) in pending {
            let start = addr as usize;
            s.vram[start..start + data.len()].copy_from_slice(&data);
        }
        Ok(())
    }
}

impl normap_hal::DisplayControl for MockConsole {
    fn set_resolution(&mut self, width: u16, height: u16) {
        self.state.borrow_mut().resolution = Some((width, height));
    }

    fn set_back_screen_color(&mut self, color: u16) {
        self.state.borrow_mut().back_color = Some(color);
    }

    fn set_erase_color(&mut self, color: u16) {
        self.state.borrow_mut().erase_color = Some(color);
    }

    fn set_sprite_priority(&mut self, priority: u8) {
        self.state.borrow_mut().priority = Some(priority);
    }

    fn enable_display(&mut self) {
        self.state.borrow_mut().display_on = true;
    }
}

impl normap_hal::FrameSync for MockConsole {
    fn request_plot(&mut self) {
        self.state.borrow_mut().events.push(Event::Plot);
    }

    fn sync_frame(&mut self) -> u32 {
        let mut s = self.state.borrow_mut();
        s.events.push(Event::Sync);
        s.vblanks_per_frame
    }
}

impl normap_hal::PeripheralPort for MockConsole {
    fn issue_intback(&mut self) {
        self.state.borrow_mut().events.push(Event::Intback);
    }
}

fn new_driver() -> (VdpDriver<MockConsole>, MockConsole) {
    let console = MockConsole::new();
    let driver = VdpDriver::new(
        console.clone(),
        DisplaySettings::default(),
        VramPartitions::default(),
    );
    (driver, console)
}

fn new_demo(variant: NormalVariant) -> (NormapDemo<MockConsole>, MockConsole) {
    let (driver, console) = new_driver();
    let demo = NormapDemo::new(driver, &demo_assets(variant), DemoLayout::default()).unwrap();
    (demo, console)
}

fn solid(width: u16, height: u16) -> (ColorImage, Heightmap) {
    let n = width as usize * height as usize;
    (
        ColorImage {
            width,
            height,
            pixels: vec![Rgb1555::gray(20); n],
        },
        Heightmap {
            width,
            height,
            data: vec![0; n],
        },
    )
}

// ============================================================================
// Driver
// ============================================================================

mod driver {
    use super::*;

    #[test]
    fn new_configures_display() {
        let (_driver, console) = new_driver();
        let s = console.state.borrow();
        assert_eq!(s.resolution, Some((320, 240)));
        assert_eq!(s.back_color, Some(0x8000 | (10 << 10) | (10 << 5) | 10));
        assert_eq!(s.erase_color, s.back_color);
        assert_eq!(s.priority, Some(6));
        assert!(s.display_on);
    }

    #[test]
    fn write_is_visible_after_wait() {
        let (mut driver, console) = new_driver();
        let region = VramRegion::new(0x1_0000, 16);
        driver.write_region(region, &[0xAB; 16]).unwrap();
        assert_eq!(console.vram(0x1_0000, 4), vec![0; 4]);
        driver.wait_transfers().unwrap();
        assert_eq!(console.vram(0x1_0000, 4), vec![0xAB; 4]);
    }

    #[test]
    fn oversized_write_is_rejected() {
        let (mut driver, console) = new_driver();
        let region = VramRegion::new(0x7_E000, 32);
        let err = driver.write_region(region, &[0; 33]).unwrap_err();
        assert!(matches!(err, VdpError::RegionOverflow { len: 33, .. }));
        assert!(console.events().is_empty());
    }

    #[test]
    fn transport_errors_propagate() {
        let (mut driver, console) = new_driver();
        console.set_fail_dma(true);
        let err = driver.upload(VramRegion::new(0, 32), &[0; 32]).unwrap_err();
        assert!(matches!(err, VdpError::Transport(MockError)));
    }

    #[test]
    fn cluts_share_one_wait() {
        let (mut driver, console) = new_driver();
        let clut = normap_core::vdp::Clut::default();
        let a = VramRegion::new(0x7_E000, 32);
        let b = VramRegion::new(0x7_E020, 32);
        driver.upload_cluts(&[(a, &clut), (b, &clut)]).unwrap();
        assert_eq!(
            console.events(),
            vec![
                Event::Dma { addr: 0x7_E000, len: 32 },
                Event::Dma { addr: 0x7_E020, len: 32 },
                Event::Wait,
            ]
        );
    }
}

// ============================================================================
// Texture loading
// ============================================================================

mod texture_load {
    use super::*;

    #[test]
    fn regions_are_allocated_in_order() {
        let (mut driver, console) = new_driver();
        let mut alloc = TextureAllocator::new(driver.partitions());
        let (color, height) = solid(16, 4);
        let normals = HeightmapNormals::new(&height, 8);
        let tex = NormapTexture::load(&mut driver, &mut alloc, &color, &normals, 15).unwrap();

        assert_eq!(tex.texture, VramRegion::new(0x1_0000, 128));
        assert_eq!(tex.normal_map, VramRegion::new(0x1_0080, 32));
        assert_eq!(tex.clut, VramRegion::new(0x7_E000, 32));
        assert_eq!(
            console.events(),
            vec![
                Event::Dma { addr: 0x1_0000, len: 128 },
                Event::Wait,
                Event::Dma { addr: 0x1_0080, len: 32 },
                Event::Wait,
            ]
        );
        // Texels are big-endian RGB1555.
        assert_eq!(console.vram(0x1_0000, 2), Rgb1555::gray(20).0.to_be_bytes().to_vec());
    }

    #[test]
    fn second_texture_follows_first() {
        let (mut driver, _console) = new_driver();
        let mut alloc = TextureAllocator::new(driver.partitions());
        let (color, height) = solid(16, 4);
        let normals = HeightmapNormals::new(&height, 8);
        let a = NormapTexture::load(&mut driver, &mut alloc, &color, &normals, 15).unwrap();
        let b = NormapTexture::load(&mut driver, &mut alloc, &color, &normals, 15).unwrap();
        assert_eq!(b.texture.offset, a.normal_map.end());
        assert_eq!(b.clut.offset, a.clut.end());
    }

    #[test]
    fn width_must_be_multiple_of_8() {
        let (mut driver, _console) = new_driver();
        let mut alloc = TextureAllocator::new(driver.partitions());
        let (color, height) = solid(12, 4);
        let normals = HeightmapNormals::new(&height, 8);
        let err = NormapTexture::load(&mut driver, &mut alloc, &color, &normals, 15).unwrap_err();
        assert!(matches!(err, LoadError::UnalignedWidth(12)));
    }

    #[test]
    fn mismatched_normals_are_rejected() {
        let (mut driver, console) = new_driver();
        let mut alloc = TextureAllocator::new(driver.partitions());
        let (color, _) = solid(8, 4);
        let (_, height) = solid(8, 2);
        let normals = HeightmapNormals::new(&height, 8);
        let err = NormapTexture::load(&mut driver, &mut alloc, &color, &normals, 15).unwrap_err();
        assert!(matches!(
            err,
            LoadError::SizeMismatch {
                color: (8, 4),
                normals: (8, 2)
            }
        ));
        assert!(console.events().is_empty());
    }

    #[test]
    fn exhausted_texture_vram_is_an_error() {
        let console = MockConsole::new();
        let partitions = VramPartitions {
            texture: VramRegion::new(0x1_0000, 64),
            ..VramPartitions::default()
        };
        let mut driver = VdpDriver::new(console, DisplaySettings::default(), partitions);
        let mut alloc = TextureAllocator::new(driver.partitions());
        let (color, height) = solid(16, 4);
        let normals = HeightmapNormals::new(&height, 8);
        let err = NormapTexture::load(&mut driver, &mut alloc, &color, &normals, 15).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Vram(VramError::Exhausted {
                requested: 128,
                available: 64
            })
        ));
    }

    #[test]
    fn overlay_draws_through_lookup_table() {
        let (mut driver, _console) = new_driver();
        let mut alloc = TextureAllocator::new(driver.partitions());
        let (color, height) = solid(16, 4);
        let normals = HeightmapNormals::new(&height, 8);
        let tex = NormapTexture::load(&mut driver, &mut alloc, &color, &normals, 15).unwrap();

        let overlay = tex.overlay_sprite();
        assert_eq!(overlay.draw_mode.color_mode, ColorMode::Lookup16);
        assert_eq!(overlay.draw_mode.color_calc, ColorCalc::HalfTransparent);
        assert!(overlay.draw_mode.end_code_disable);
        assert!(!overlay.draw_mode.transparent_pixel_disable);
        assert_eq!(overlay.colr as u32 * 8, tex.clut.offset);
        assert_eq!(overlay.char_region, tex.normal_map);

        assert_eq!(tex.shadow_sprite().draw_mode.color_calc, ColorCalc::Shadow);
        assert_eq!(tex.color_sprite().draw_mode.color_calc, ColorCalc::Replace);
    }
}

// ============================================================================
// Scene setup
// ============================================================================

mod scene_setup {
    use super::*;

    #[test]
    fn command_list_layout() {
        let (demo, _console) = new_demo(NormalVariant::Heightmap);
        let cmds: Vec<CommandTable> = demo.commands().iter().copied().collect();
        let kinds: Vec<CommandKind> = cmds.iter().map(|c| c.kind()).collect();
        assert_eq!(cmds.len(), 8);
        assert_eq!(kinds[0], CommandKind::SystemClip);
        assert_eq!(kinds[1], CommandKind::LocalCoord);
        for k in &kinds[2..7] {
            assert_eq!(*k, CommandKind::NormalSprite);
        }
        assert!(cmds[7].is_end());

        assert_eq!(cmds[0].vertices[2], (320, 240));
        assert_eq!(cmds[1].vertices[0], (160, 120));
        assert_eq!(cmds[2].vertices[0], (-160, -120));
        assert_eq!(cmds[3].vertices[0], (-160, -120));
        assert_eq!(cmds[4].vertices[0], (-160, -96));
        assert_eq!(cmds[5].vertices[0], (-128, -64));
        assert_eq!(cmds[6].vertices[0], (-128, -64));
        assert_eq!(demo.shadow_command().0, 4);
    }

    #[test]
    fn sprites_reference_loaded_textures() {
        let (demo, _console) = new_demo(NormalVariant::Heightmap);
        let cmds: Vec<CommandTable> = demo.commands().iter().copied().collect();
        let (wall, sign) = (demo.wall(), demo.sign());

        assert_eq!(cmds[2].char_addr(), wall.texture.offset);
        assert_eq!(cmds[2].char_size(), (320, 240));
        assert_eq!(cmds[2].draw_mode().color_mode, ColorMode::Rgb);
        assert_eq!(cmds[3].char_addr(), wall.normal_map.offset);
        assert_eq!(cmds[3].clut_addr(), wall.clut.offset);
        assert_eq!(cmds[4].char_addr(), sign.texture.offset);
        assert_eq!(cmds[4].draw_mode().color_calc, ColorCalc::Shadow);
        assert_eq!(cmds[5].char_size(), (256, 128));
        assert_eq!(cmds[6].clut_addr(), sign.clut.offset);
    }

    #[test]
    fn vram_layout_is_packed_and_disjoint() {
        let (demo, _console) = new_demo(NormalVariant::Heightmap);
        let (wall, sign) = (demo.wall(), demo.sign());
        assert_eq!(wall.texture, VramRegion::new(0x1_0000, 320 * 240 * 2));
        assert_eq!(wall.normal_map, VramRegion::new(0x3_5800, 320 * 240 / 2));
        assert_eq!(sign.texture, VramRegion::new(0x3_EE00, 256 * 128 * 2));
        assert_eq!(sign.normal_map, VramRegion::new(0x4_EE00, 256 * 128 / 2));
        assert_eq!(wall.clut, VramRegion::new(0x7_E000, 32));
        assert_eq!(sign.clut, VramRegion::new(0x7_E020, 32));

        let p = VramPartitions::default();
        for r in [wall.texture, wall.normal_map, sign.texture, sign.normal_map] {
            assert!(p.texture.contains(&r));
        }
    }

    #[test]
    fn heightmap_variant_uses_fixed_palette() {
        let (demo, _console) = new_demo(NormalVariant::Heightmap);
        assert_eq!(demo.wall().directions.len(), 13);
        assert_eq!(demo.sign().directions.len(), 13);
        assert_eq!(demo.wall().max_light_intensity, 15);
        assert_eq!(demo.sign().max_light_intensity, 31);
    }

    #[test]
    fn normal_map_variant_uses_authored_palette() {
        let (demo, _console) = new_demo(NormalVariant::AuthoredNormalMap);
        assert_eq!(demo.wall().directions.len(), 16);
        assert_eq!(demo.sign().directions.len(), 16);
        assert_eq!(demo.commands().len(), 8);
    }

    #[test]
    fn unaligned_asset_fails_setup() {
        let (driver, _console) = new_driver();
        let mut assets = demo_assets(NormalVariant::Heightmap);
        let (color, height) = solid(12, 4);
        assets.wall.color = color;
        assets.wall.surface = normap_core::scene::Surface::Heightmap(height);
        let err = NormapDemo::new(driver, &assets, DemoLayout::default()).err();
        assert!(matches!(err, Some(SceneError::Load(LoadError::UnalignedWidth(12)))));
    }
}

// ============================================================================
// Frame loop
// ============================================================================

mod frame_loop {
    use super::*;

    #[test]
    fn frame_uploads_tables_before_plotting() {
        let (mut demo, console) = new_demo(NormalVariant::Heightmap);
        console.clear_events();
        demo.run_frame().unwrap();
        assert_eq!(
            console.events(),
            vec![
                Event::Dma { addr: 0x7_E000, len: 32 },
                Event::Dma { addr: 0x7_E020, len: 32 },
                Event::Wait,
                Event::Dma { addr: 0, len: 8 * CMDT_BYTES },
                Event::Wait,
                Event::Plot,
                Event::Sync,
                Event::Intback,
            ]
        );
    }

    #[test]
    fn first_frame_is_lit_at_angle_zero() {
        let (mut demo, console) = new_demo(NormalVariant::Heightmap);
        let stats = demo.run_frame().unwrap();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.angle, Fix16::ZERO);
        assert_eq!(stats.light, light_vector(Fix16::ZERO));
        assert_eq!(stats.shadow, (-118, -64));
        assert_eq!(stats.vblanks, 1);

        // Flat entry: 0.7071 * 15 and * 31, rounded.
        let wall = console.vram(0x7_E000, 2);
        assert_eq!(wall, Rgb1555::gray(11).0.to_be_bytes().to_vec());
        let sign = console.vram(0x7_E020, 2);
        assert_eq!(sign, Rgb1555::gray(22).0.to_be_bytes().to_vec());
    }

    #[test]
    fn shadow_vertex_is_written_to_vram() {
        let (mut demo, console) = new_demo(NormalVariant::Heightmap);
        demo.run_frame().unwrap();
        assert_eq!(console.command(4).vertices[0], (-118, -64));
        assert_eq!(console.command(4).kind(), CommandKind::NormalSprite);
        assert!(console.command(7).is_end());
    }

    #[test]
    fn angle_advances_once_per_vblank() {
        let (mut demo, _console) = new_demo(NormalVariant::Heightmap);
        demo.run_frame().unwrap();
        assert_eq!(demo.light_angle().get(), LIGHT_ANGLE_STEP);
        let stats = demo.run_frame().unwrap();
        assert_eq!(stats.angle, LIGHT_ANGLE_STEP);
        assert_eq!(demo.light_angle().get(), LIGHT_ANGLE_STEP + LIGHT_ANGLE_STEP);
    }

    #[test]
    fn late_frames_catch_up_on_vblanks() {
        let (mut demo, console) = new_demo(NormalVariant::Heightmap);
        console.set_vblanks_per_frame(3);
        console.clear_events();
        let stats = demo.run_frame().unwrap();
        assert_eq!(stats.vblanks, 3);
        let intbacks = console.events().iter().filter(|e| **e == Event::Intback).count();
        assert_eq!(intbacks, 3);
        assert_eq!(demo.light_angle().get(), Fix16::from_bits(3 * LIGHT_ANGLE_STEP.to_bits()));
    }

    #[test]
    fn light_changes_shading_between_frames() {
        let (mut demo, console) = new_demo(NormalVariant::Heightmap);
        demo.light_angle().set(Fix16::ZERO);
        demo.run_frame().unwrap();
        let first = console.vram(0x7_E000, 32);
        demo.light_angle().set(Fix16::from_num(core::f32::consts::PI));
        demo.run_frame().unwrap();
        let second = console.vram(0x7_E000, 32);
        assert_ne!(first, second);
        // Flat entry only depends on the light's z, which never changes.
        assert_eq!(first[..2], second[..2]);
    }

    #[test]
    fn frame_errors_propagate() {
        let (mut demo, console) = new_demo(NormalVariant::Heightmap);
        console.set_fail_dma(true);
        let err = demo.run_frame().unwrap_err();
        assert!(matches!(err, SceneError::Driver(VdpError::Transport(MockError))));
    }
}
