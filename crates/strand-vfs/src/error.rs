//! Virtual file system errors

use std::path::PathBuf;

/// Errors produced by [`FileSystem`](crate::FileSystem) operations.
///
/// `Clone` so results can travel through task handles to any number of
/// continuations; the OS error is stringified for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VfsError {
    /// Underlying OS error
    #[error("io error: {message}")]
    Io {
        /// Display form of the source `io::Error`
        message: String,
    },

    /// Path does not exist
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path already exists
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Operation needs a folder but the path is not one
    #[error("not a folder: {}", .0.display())]
    NotAFolder(PathBuf),

    /// Operation needs a file but the path is not one
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Relative path, parent-directory escape, or otherwise unusable path
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    /// Folder still has entries
    #[error("folder not empty: {}", .0.display())]
    NotEmpty(PathBuf),
}

impl From<std::io::Error> for VfsError {
    fn from(err: std::io::Error) -> Self {
        VfsError::Io {
            message: err.to_string(),
        }
    }
}

/// Result alias for file system operations.
pub type VfsResult<T> = Result<T, VfsError>;
