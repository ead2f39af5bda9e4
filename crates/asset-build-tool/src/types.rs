use std::path::PathBuf;

/// Configuration for a whole-directory asset build (used by build scripts and
/// the simulator's asset loader).
#[derive(Debug, Clone)]
pub struct AssetBuildConfig {
    /// Directory containing `textures/`, `heightmaps/` and `normal_maps/`.
    pub source_dir: PathBuf,
    /// Output directory for generated files (typically OUT_DIR/assets).
    pub out_dir: PathBuf,
}

/// Which converter produced an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Color,
    Heightmap,
    NormalMap,
}

/// Metadata about a generated asset file, returned by the build process.
#[derive(Debug, Clone)]
pub struct GeneratedAsset {
    pub kind: AssetKind,
    /// Rust module name for this asset.
    pub module_name: String,
    /// Rust identifier prefix (uppercase).
    pub identifier: String,
    /// Path to the generated .rs file (relative to out_dir).
    pub rs_path: PathBuf,
    /// Source file that produced this asset (for rerun-if-changed).
    pub source_path: PathBuf,
}

/// Color texture converted to RGB1555.
#[derive(Debug, Clone)]
pub struct ColorAsset {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    /// Row-major RGB1555 texels. Fully transparent source pixels are 0x0000,
    /// every other texel has the MSB set.
    pub pixels: Vec<u16>,
    /// Rust identifier (sanitized from filename).
    pub identifier: String,
}

impl ColorAsset {
    /// Texels in the big-endian order VDP1 reads.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_be_bytes()).collect()
    }

    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * 2
    }
}

/// Single-channel elevation map, one byte per texel.
#[derive(Debug, Clone)]
pub struct HeightmapAsset {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub identifier: String,
}

/// Palette-indexed normal map. Palette entries are biased `[r, g, b]`
/// directions (128 = zero).
#[derive(Debug, Clone)]
pub struct NormalMapAsset {
    pub source: PathBuf,
    pub width: u32,
    pub height: u32,
    /// One palette index per texel, row-major, top row first.
    pub indices: Vec<u8>,
    /// At most 16 entries.
    pub palette: Vec<[u8; 3]>,
    pub identifier: String,
}

impl NormalMapAsset {
    /// Palette flattened to `r, g, b` triples.
    pub fn palette_bytes(&self) -> Vec<u8> {
        self.palette.iter().flatten().copied().collect()
    }
}
