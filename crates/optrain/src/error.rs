//! Error types for the optical system facade.

use optrain_surface::BuildError;
use optrain_trace::TraceError;
use thiserror::Error;

/// Errors from building or using an [`OpticalSystem`](crate::OpticalSystem).
#[derive(Error, Debug)]
pub enum Error {
    /// Surface construction or material resolution failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A trace was aborted.
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// A surface id was not found in the system.
    #[error("unknown surface '{0}'")]
    UnknownSurface(String),

    /// Invalid trace settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings text could not be parsed.
    #[error("failed to parse settings: {0}")]
    SettingsFormat(#[from] toml::de::Error),

    /// System description could not be (de)serialized.
    #[error("invalid system description: {0}")]
    SpecFormat(#[from] serde_json::Error),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
