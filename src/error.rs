use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the grading engines and the session.
#[derive(Debug, Error)]
pub enum GradeError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("source and reference images are both required")]
    MissingInput,

    #[error("nothing has been processed yet")]
    NothingProcessed,

    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("image has no pixels")]
    EmptyImage,

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GradeError>;
