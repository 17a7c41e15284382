// Error types shared by the chat and image modules. Set-up and terminal
// failures stay as `anyhow::Error`; these enums cover the recoverable cases
// that the interactive loops report and then carry on from.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong during a single chat turn. None of these end
/// the session: the caller prints the error and prompts again.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Timeout, connection refused, DNS failure or a broken response body.
    #[error("{0}")]
    Transport(String),

    /// The provider answered with a non-2xx status. `message` is the
    /// provider's own error text when it could be parsed, else the raw body.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// A 2xx response whose body was not JSON.
    #[error("could not decode response body: {0}")]
    Decode(String),

    /// The success envelope was present but the reply text was missing or blank.
    #[error("received empty reply from API")]
    EmptyReply { raw: String },

    /// The request could not be built, e.g. a credential that is not a valid
    /// header value.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Failures while turning an image file into an intensity grid.
#[derive(Error, Debug)]
pub enum ImageLoadError {
    #[error("file not found at path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(usize),

    #[error("pixel buffer holds {actual} samples, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
}
