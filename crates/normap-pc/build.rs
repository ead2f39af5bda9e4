use asset_build_tool::{build_assets, AssetBuildConfig};
use std::path::{Path, PathBuf};

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    let source_dir = manifest_dir.join("assets");

    println!("cargo:rerun-if-changed={}", source_dir.display());
    rerun_if_changed_recursive(&source_dir);

    let config = AssetBuildConfig {
        source_dir,
        out_dir: out_dir.join("assets"),
    };

    match build_assets(&config) {
        Ok(generated) => {
            for asset in &generated {
                println!("cargo:rerun-if-changed={}", asset.source_path.display());
            }
            eprintln!("asset-prep: converted {} asset(s)", generated.len());
        }
        Err(e) => panic!("Asset build failed: {}", e),
    }
}

/// Emit `cargo:rerun-if-changed` for every file under `dir`.
fn rerun_if_changed_recursive(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            rerun_if_changed_recursive(&path);
        } else {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
}
