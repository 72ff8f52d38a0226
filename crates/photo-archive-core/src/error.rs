use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the photo-archive library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path exists but is not a directory, or does not exist at all
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Path is not a regular file at access time
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// A storage record was attached before its picture was saved
    #[error("no picture exists for fingerprint {0}; save the picture before assigning storages")]
    PictureNotFoundForStorage(String),

    /// Metadata extraction failure, e.g. a corrupt image
    #[error("could not extract metadata from {}: {}", .path.display(), .source)]
    Extraction {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Repository/database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid configuration error
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl Error {
    /// Whether a bulk run may swallow this error, count it, and continue.
    ///
    /// Path-kind races, unreadable files and corrupt images are per-item
    /// failures; everything else aborts the run.
    pub fn is_per_item(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::NotAFile(_) | Error::Extraction { .. }
        )
    }
}
