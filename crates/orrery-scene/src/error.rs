use orrery_space::{OrbitError, ScatterError};

/// Errors raised while building a scene from configuration.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("body `{name}` has an invalid orbit: {source}")]
    InvalidOrbit {
        name: String,
        #[source]
        source: OrbitError,
    },

    #[error("star field: {0}")]
    Scatter(#[from] ScatterError),
}
