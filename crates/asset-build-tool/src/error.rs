use std::path::PathBuf;

use crate::tga_indexed::TgaError;

/// Errors that can occur during asset conversion.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// I/O error reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The `image` crate could not decode a color image or heightmap.
    #[error("Image decode error for {path}: {message}")]
    ImageDecode { path: PathBuf, message: String },

    /// A palette normal map is not a color-mapped TGA we can read.
    #[error("Normal map {path}: {source}")]
    NormalMap {
        path: PathBuf,
        #[source]
        source: TgaError,
    },

    /// Decoded image violates a console constraint (size, palette length).
    #[error("Validation error for {path}: {message}")]
    Validation { path: PathBuf, message: String },

    /// Two different source files produce the same Rust identifier.
    #[error("Identifier collision: {identifier} is produced by both {path_a} and {path_b}")]
    IdentifierCollision {
        identifier: String,
        path_a: PathBuf,
        path_b: PathBuf,
    },
}
