use std::path::PathBuf;

/// Errors produced while loading an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    /// The file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but its contents could not be decoded.
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The model file contains no triangles.
    #[error("model {0} contains no geometry")]
    EmptyModel(PathBuf),

    /// No worker thread is available to take the request.
    #[error("asset workers are not running")]
    WorkerUnavailable,
}
