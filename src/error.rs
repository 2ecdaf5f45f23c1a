//! Viewer error types
//!
//! Every fallible viewer operation reports one of the variants below. Errors
//! surface synchronously at the call site; nothing is retried internally.

use std::path::PathBuf;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Errors produced by the viewer facade and its render thread.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// An operation referenced a group or node that does not exist.
    #[error("no such group or node: {0}")]
    NotFound(String),

    /// A node with the same name already exists in the target group.
    #[error("node already exists: {0}")]
    AlreadyExists(String),

    /// The viewer was stopped, or the user closed the window; only
    /// `join` and drop remain valid.
    #[error("viewer is closed")]
    ViewerClosed,

    /// A malformed argument: unsupported channel-format string, bad
    /// multisample count, zero-sized window, unloadable asset path.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Window, adapter or device creation failed. Fatal; reported from the
    /// constructor only.
    #[error("viewer initialization failed: {0}")]
    InitializationFailed(String),

    /// A runtime graphics failure (lost surface, failed readback).
    #[error("graphics error: {0}")]
    Graphics(String),

    /// Screenshot file output failed.
    #[error("failed to write {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
