use thiserror::Error;

/// Top-level error type for helmkit.
#[derive(Debug, Error)]
pub enum HelmKitError {
    #[error("invalid chart version '{0}': expected '<major>.<minor>'")]
    InvalidVersion(String),

    #[error("failed to parse schema at {path}: {message}")]
    SchemaParse { path: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
