use crate::error::AssetError;
use crate::types::{AssetKind, ColorAsset, GeneratedAsset, HeightmapAsset, NormalMapAsset};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write `<id>.bin` and the `<id>.rs` wrapper that includes it.
fn write_pair(
    kind: AssetKind,
    identifier: &str,
    source: &Path,
    bin: &[u8],
    body: String,
    out_dir: &Path,
) -> Result<GeneratedAsset, AssetError> {
    let lower_id = identifier.to_lowercase();
    let rs_filename = format!("{}.rs", lower_id);
    let bin_filename = format!("{}.bin", lower_id);

    fs::write(out_dir.join(&bin_filename), bin)?;

    let rust_source = format!(
        "// Generated from: {}\n{}pub const {}_DATA: &[u8] = include_bytes!(\"{}\");\n",
        source.display(),
        body,
        identifier,
        bin_filename
    );
    fs::write(out_dir.join(&rs_filename), rust_source)?;

    Ok(GeneratedAsset {
        kind,
        module_name: lower_id,
        identifier: identifier.to_string(),
        rs_path: rs_filename.into(),
        source_path: source.to_path_buf(),
    })
}

/// Color texture: big-endian RGB1555 texels.
pub fn write_color_output(asset: &ColorAsset, out_dir: &Path) -> Result<GeneratedAsset, AssetError> {
    let body = format!(
        "// {}x{} RGB1555, {} bytes\n\
         \n\
         pub const {id}_WIDTH: u16 = {w};\n\
         pub const {id}_HEIGHT: u16 = {h};\n",
        asset.width,
        asset.height,
        asset.size_bytes(),
        id = asset.identifier,
        w = asset.width,
        h = asset.height,
    );
    write_pair(
        AssetKind::Color,
        &asset.identifier,
        &asset.source,
        &asset.to_be_bytes(),
        body,
        out_dir,
    )
}

/// Heightmap: one byte per texel.
pub fn write_heightmap_output(
    asset: &HeightmapAsset,
    out_dir: &Path,
) -> Result<GeneratedAsset, AssetError> {
    let body = format!(
        "// {}x{} heightmap\n\
         \n\
         pub const {id}_WIDTH: u16 = {w};\n\
         pub const {id}_HEIGHT: u16 = {h};\n",
        asset.width,
        asset.height,
        id = asset.identifier,
        w = asset.width,
        h = asset.height,
    );
    write_pair(
        AssetKind::Heightmap,
        &asset.identifier,
        &asset.source,
        &asset.data,
        body,
        out_dir,
    )
}

/// Normal map: one index byte per texel, palette inlined as a const array.
pub fn write_normal_map_output(
    asset: &NormalMapAsset,
    out_dir: &Path,
) -> Result<GeneratedAsset, AssetError> {
    let entries: Vec<String> = asset
        .palette
        .iter()
        .map(|[r, g, b]| format!("[{r}, {g}, {b}]"))
        .collect();
    let body = format!(
        "// {}x{} palette normal map, {} directions\n\
         \n\
         pub const {id}_WIDTH: u16 = {w};\n\
         pub const {id}_HEIGHT: u16 = {h};\n\
         pub const {id}_PALETTE: [[u8; 3]; {n}] = [{list}];\n",
        asset.width,
        asset.height,
        asset.palette.len(),
        id = asset.identifier,
        w = asset.width,
        h = asset.height,
        n = asset.palette.len(),
        list = entries.join(", "),
    );
    write_pair(
        AssetKind::NormalMap,
        &asset.identifier,
        &asset.source,
        &asset.indices,
        body,
        out_dir,
    )
}

/// Write the master `mod.rs` that includes all generated asset files.
///
/// Besides the includes it emits two lookup tables so a consumer can find
/// assets by identifier without naming constants that may not exist:
/// `ASSETS` holds `(identifier, width, height, data)` for every asset and
/// `NORMAL_MAP_PALETTES` holds `(identifier, palette)` for normal maps.
pub fn write_mod_rs(generated: &[GeneratedAsset], out_dir: &Path) -> Result<(), AssetError> {
    let mut file = fs::File::create(out_dir.join("mod.rs"))?;

    writeln!(file, "// Auto-generated by asset-prep - do not edit")?;
    writeln!(file)?;

    let mut sorted: Vec<&GeneratedAsset> = generated.iter().collect();
    sorted.sort_unstable_by(|a, b| a.rs_path.cmp(&b.rs_path));

    for asset in &sorted {
        writeln!(file, "include!(\"{}\");", asset.rs_path.display())?;
    }

    writeln!(file)?;
    writeln!(file, "pub const ASSETS: &[(&str, u16, u16, &[u8])] = &[")?;
    for asset in &sorted {
        let id = &asset.identifier;
        writeln!(file, "    (\"{id}\", {id}_WIDTH, {id}_HEIGHT, {id}_DATA),")?;
    }
    writeln!(file, "];")?;

    writeln!(file)?;
    writeln!(file, "pub const NORMAL_MAP_PALETTES: &[(&str, &[[u8; 3]])] = &[")?;
    for asset in sorted.iter().filter(|a| a.kind == AssetKind::NormalMap) {
        let id = &asset.identifier;
        writeln!(file, "    (\"{id}\", &{id}_PALETTE),")?;
    }
    writeln!(file, "];")?;

    Ok(())
}
