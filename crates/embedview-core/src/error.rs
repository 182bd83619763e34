use thiserror::Error;

pub type ViewResult<T> = Result<T, ViewError>;

/// View-wide error.
///
/// Only setup paths return it. The resize handshake itself never fails across threads,
/// it reports through state and `bool` results.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("config error: {0}")]
    Config(String),

    #[error("platform error: {0}")]
    Platform(String),

    #[error("collaborator error [{collaborator}]: {source}")]
    Collaborator {
        collaborator: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ViewError {
    #[inline]
    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform(msg.into())
    }
}

/// Failures reported by a [`crate::services::SurfaceManager`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("no live surface")]
    Missing,

    #[error("surface creation failed: {0}")]
    CreateFailed(String),

    #[error("surface resize to {width}x{height} failed: {reason}")]
    ResizeFailed {
        width: u32,
        height: u32,
        reason: String,
    },
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
