use std::io;
use std::path::PathBuf;

/// The primary error type for all operations in the `plumage` crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A builder path was malformed (empty, or containing an empty segment),
    /// or it collided with an entry of the other kind: a file where a
    /// directory was needed, or vice versa.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// A union found a file on one side and a directory on the other at the
    /// same tree position. There is no automatic resolution for this.
    #[error("cannot merge a file with a directory at {path:?}")]
    MergeConflict { path: String },

    /// A file's content producer failed when it was invoked during a read.
    #[error("producing content for {path:?} failed")]
    Content {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The path handed to [`Tree::from_path`](crate::Tree::from_path) does
    /// not name an existing directory.
    #[error("cannot import {path:?}: not an existing directory")]
    Import { path: PathBuf },

    /// An I/O failure from an archive encoder or the filesystem importer.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A failure raised by the zip encoder.
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    pub(crate) fn invalid_path(path: &str, reason: impl Into<String>) -> Error {
        Error::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
