//! PC host for normap.
//!
//! Runs the relight demo against a simulated console: DMA into a VRAM image,
//! a software sprite plotter, and one VBlank per frame. Frames can be dumped
//! as PNG files.

mod embedded;
mod error;
mod loader;
mod renderer;
mod sim;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use normap_core::scene::{DemoLayout, FrameStats, NormalVariant, NormapDemo};
use normap_core::vdp::{DisplaySettings, VdpDriver, VramPartitions};

use crate::embedded::EmbeddedAssets;
use crate::error::SimError;
use crate::loader::{AssetPaths, TexturePaths};
use crate::sim::SimConsole;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Normals derived from heightmaps
    Heightmap,
    /// Normals from authored palette normal maps
    NormalMap,
}

impl From<Variant> for NormalVariant {
    fn from(v: Variant) -> Self {
        match v {
            Variant::Heightmap => NormalVariant::Heightmap,
            Variant::NormalMap => NormalVariant::AuthoredNormalMap,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "normap-pc")]
#[command(about = "Run the normal-index relight demo on a simulated console", long_about = None)]
#[command(version)]
struct Cli {
    /// Where per-pixel normals come from
    #[arg(long, value_enum, default_value_t = Variant::Heightmap)]
    variant: Variant,

    /// Frames to run (0 runs until interrupted)
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Wall color texture (TGA/PNG) replacing the built-in one
    #[arg(long)]
    wall_texture: Option<PathBuf>,

    /// Wall heightmap (TGA/PNG)
    #[arg(long)]
    wall_heightmap: Option<PathBuf>,

    /// Wall palette normal map (color-mapped TGA)
    #[arg(long)]
    wall_normal_map: Option<PathBuf>,

    /// Sign color texture (TGA/PNG) replacing the built-in one
    #[arg(long)]
    sign_texture: Option<PathBuf>,

    /// Sign heightmap (TGA/PNG)
    #[arg(long)]
    sign_heightmap: Option<PathBuf>,

    /// Sign palette normal map (color-mapped TGA)
    #[arg(long)]
    sign_normal_map: Option<PathBuf>,

    /// Write frames as PNG files into this directory
    #[arg(long)]
    dump_dir: Option<PathBuf>,

    /// Dump every Nth frame
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    dump_every: u32,

    /// Suppress progress output (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn asset_paths(&self) -> AssetPaths {
        AssetPaths {
            wall: TexturePaths {
                color: self.wall_texture.clone(),
                heightmap: self.wall_heightmap.clone(),
                normal_map: self.wall_normal_map.clone(),
            },
            sign: TexturePaths {
                color: self.sign_texture.clone(),
                heightmap: self.sign_heightmap.clone(),
                normal_map: self.sign_normal_map.clone(),
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn new_demo(cli: &Cli) -> Result<NormapDemo<SimConsole>, SimError> {
    let variant = NormalVariant::from(cli.variant);
    let embedded = EmbeddedAssets::linked();
    if !embedded.is_empty() {
        log::info!("{} asset(s) linked at build time", embedded.len());
    }
    let assets = loader::load_demo_assets(variant, &embedded, &cli.asset_paths())?;
    let driver = VdpDriver::new(
        SimConsole::new(),
        DisplaySettings::default(),
        VramPartitions::default(),
    );
    log::info!("normap-pc: {:?} variant", variant);
    Ok(NormapDemo::new(driver, &assets, DemoLayout::default())?)
}

fn run(cli: &Cli) -> Result<(), SimError> {
    if let Some(dir) = &cli.dump_dir {
        fs::create_dir_all(dir)?;
    }
    let mut demo = new_demo(cli)?;

    let mut last: Option<FrameStats> = None;
    while cli.frames == 0 || last.map_or(0, |s| s.frame) < cli.frames {
        let stats = demo.run_frame()?;
        log::debug!(
            "frame {}: angle {:.3}, shadow {:?}, {} pixels",
            stats.frame,
            stats.angle.to_num::<f32>(),
            stats.shadow,
            demo.driver().transport().last_plot().pixels
        );
        if let Some(dir) = &cli.dump_dir {
            if stats.frame == 1 || stats.frame % cli.dump_every == 0 {
                dump_frame(demo.driver().transport(), dir, stats.frame)?;
            }
        }
        last = Some(stats);
    }

    let console = demo.driver().transport();
    log::info!(
        "done: {} frames, {} vblanks, {} intbacks",
        last.map_or(0, |s| s.frame),
        console.vblanks(),
        console.intbacks()
    );
    Ok(())
}

fn dump_frame(console: &SimConsole, dir: &Path, frame: u32) -> Result<(), SimError> {
    let path = dir.join(format!("frame_{:05}.png", frame));
    console
        .framebuffer()
        .save_png(&path, console.display().back_screen_color)
        .map_err(|source| SimError::FrameDump {
            path: path.clone(),
            source,
        })?;
    log::info!("wrote {}", path.display());
    Ok(())
}
