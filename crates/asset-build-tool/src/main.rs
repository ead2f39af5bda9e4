use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "asset-prep")]
#[command(about = "Convert TGA/PNG textures, heightmaps and palette normal maps for normap", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress progress output (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a color image to RGB1555 texels
    Texture {
        /// Input TGA or PNG file
        input: PathBuf,

        /// Output directory for generated .rs and .bin files
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert a grayscale image to an 8-bit heightmap
    Heightmap {
        /// Input TGA or PNG file
        input: PathBuf,

        /// Output directory for generated .rs and .bin files
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert a color-mapped TGA to palette indices plus direction palette
    NormalMap {
        /// Input color-mapped TGA file (at most 16 palette entries; entry 0
        /// must be the flat normal 128,128,255 since pixel code 0 is transparent)
        input: PathBuf,

        /// Output directory for generated .rs and .bin files
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging (suppressed if --quiet)
    if !cli.quiet {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let result = match cli.command {
        Commands::Texture { input, output } => {
            asset_build_tool::convert_texture(&input, &output).map(|t| {
                format!(
                    "Texture converted: {} ({}x{}, {} KB)",
                    t.identifier,
                    t.width,
                    t.height,
                    t.size_bytes() / 1024
                )
            })
        }
        Commands::Heightmap { input, output } => {
            asset_build_tool::convert_heightmap(&input, &output).map(|h| {
                format!("Heightmap converted: {} ({}x{})", h.identifier, h.width, h.height)
            })
        }
        Commands::NormalMap { input, output } => {
            asset_build_tool::convert_normal_map(&input, &output).map(|n| {
                format!(
                    "Normal map converted: {} ({}x{}, {} directions)",
                    n.identifier,
                    n.width,
                    n.height,
                    n.palette.len()
                )
            })
        }
    };

    match result {
        Ok(summary) if !cli.quiet => eprintln!("Success: {}", summary),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
