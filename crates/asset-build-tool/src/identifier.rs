use crate::error::AssetError;
use std::collections::HashMap;
use std::path::Path;

/// Build the constant prefix for an asset from its path.
///
/// The kind directory is kept so a wall texture and the wall heightmap stay
/// distinct (`heightmaps/wall.tga` -> `HEIGHTMAPS_WALL`).
pub fn generate_identifier(path: &Path) -> Result<String, AssetError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AssetError::Validation {
            path: path.to_path_buf(),
            message: "file name is not valid UTF-8".to_string(),
        })?;

    let kind = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str());

    let ident = match kind {
        Some(dir) => format!("{}_{}", ident_part(dir), ident_part(stem)),
        None => ident_part(stem),
    };
    Ok(ident.to_uppercase())
}

/// Fail on the first pair of paths that map to the same identifier.
pub fn check_collisions(paths: &[&Path]) -> Result<(), AssetError> {
    let mut seen: HashMap<String, &Path> = HashMap::with_capacity(paths.len());
    for &path in paths {
        let identifier = generate_identifier(path)?;
        if let Some(first) = seen.insert(identifier.clone(), path) {
            return Err(AssetError::IdentifierCollision {
                identifier,
                path_a: first.to_path_buf(),
                path_b: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Map every character outside `[A-Za-z0-9_]` to `_` and guard a leading digit.
fn ident_part(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match mapped.chars().next() {
        None => "ASSET".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{mapped}"),
        Some(_) => mapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_ident_part() {
        assert_eq!(ident_part("wall"), "wall");
        assert_eq!(ident_part("sega-logo"), "sega_logo");
        assert_eq!(ident_part("bump map.v2"), "bump_map_v2");
        assert_eq!(ident_part("8bit"), "_8bit");
        assert_eq!(ident_part(""), "ASSET");
    }

    #[test]
    fn test_kind_directory_is_prefix() {
        let path = PathBuf::from("assets/heightmaps/wall.tga");
        assert_eq!(generate_identifier(&path).unwrap(), "HEIGHTMAPS_WALL");
    }

    #[test]
    fn test_bare_file_name() {
        let path = PathBuf::from("sign.png");
        assert_eq!(generate_identifier(&path).unwrap(), "SIGN");
    }

    #[test]
    fn test_same_stem_different_kind_is_fine() {
        let paths: Vec<&Path> = vec![
            Path::new("textures/wall.tga"),
            Path::new("heightmaps/wall.tga"),
            Path::new("normal_maps/wall.tga"),
        ];
        assert!(check_collisions(&paths).is_ok());
    }

    #[test]
    fn test_extension_only_difference_collides() {
        let paths: Vec<&Path> = vec![Path::new("textures/wall.tga"), Path::new("textures/wall.png")];
        match check_collisions(&paths).unwrap_err() {
            AssetError::IdentifierCollision {
                identifier,
                path_a,
                path_b,
            } => {
                assert_eq!(identifier, "TEXTURES_WALL");
                assert_eq!(path_a, PathBuf::from("textures/wall.tga"));
                assert_eq!(path_b, PathBuf::from("textures/wall.png"));
            }
            other => panic!("expected IdentifierCollision, got {other:?}"),
        }
    }
}
