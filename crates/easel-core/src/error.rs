#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("backend initialisation failed: {0}")]
    BackendInit(#[from] BackendError),

    #[error("leak tracker is already owned by another context")]
    LeakTrackerInUse,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Failure reported by a backend while bringing up its native device.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("native device unavailable: {0}")]
    Unavailable(String),
}
