use std::path::PathBuf;

use normap_core::scene::SceneError;

use crate::sim::DmaError;

/// Errors that stop the host.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Asset(#[from] asset_build_tool::AssetError),

    /// Decoded asset does not fit the core's image types.
    #[error("{path}: {message}")]
    InvalidAsset { path: PathBuf, message: String },

    /// A build-time converted asset does not match its declared size.
    #[error("linked asset {identifier}: {message}")]
    Embedded { identifier: String, message: String },

    /// Scene setup or a frame failed. Only the core error's message is kept.
    #[error("scene: {0}")]
    Scene(String),

    #[error("writing frame {path}: {source}")]
    FrameDump {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SceneError<DmaError>> for SimError {
    fn from(e: SceneError<DmaError>) -> Self {
        SimError::Scene(e.to_string())
    }
}
