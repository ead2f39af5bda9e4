//! Built-in demo content.

pub mod textures;

use crate::scene::layout::{SIGN_CONFIG, WALL_CONFIG};
use crate::scene::{DemoAssets, NormalVariant, Surface, TextureAsset};

/// The brick wall and embossed sign, with normals from the requested source.
pub fn demo_assets(variant: NormalVariant) -> DemoAssets {
    let (wall_surface, sign_surface) = match variant {
        NormalVariant::Heightmap => (
            Surface::Heightmap(textures::wall_heightmap()),
            Surface::Heightmap(textures::sign_heightmap()),
        ),
        NormalVariant::AuthoredNormalMap => (
            Surface::NormalMap(textures::wall_normal_map(WALL_CONFIG.relief)),
            Surface::NormalMap(textures::sign_normal_map(SIGN_CONFIG.relief)),
        ),
    };

    DemoAssets {
        wall: TextureAsset {
            color: textures::wall_color(),
            surface: wall_surface,
            config: WALL_CONFIG,
        },
        sign: TextureAsset {
            color: textures::sign_color(),
            surface: sign_surface,
            config: SIGN_CONFIG,
        },
    }
}
