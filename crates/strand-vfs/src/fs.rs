//! Blocking file system contract

use crate::entry::Entry;
use crate::error::{VfsError, VfsResult};
use std::path::{Component, Path, PathBuf};

/// A blocking virtual file system.
///
/// Implementations are shared across threads by the async facade, so the
/// contract is `Send + Sync`; interior mutability where state is needed.
/// Paths are absolute and rooted at the file system's own root, whatever
/// backs it.
pub trait FileSystem: Send + Sync {
    /// Whether the file system root is present.
    fn root_exists(&self) -> VfsResult<bool>;

    /// Whether `path` refers to an existing file or folder.
    fn exists(&self, path: &Path) -> VfsResult<bool>;

    /// Files and folders directly inside `path`, sorted by name.
    fn entries(&self, path: &Path) -> VfsResult<Vec<Entry>>;

    /// Create a folder at `path`. The parent must already exist and the
    /// path itself must not.
    fn create_folder(&self, path: &Path) -> VfsResult<()>;

    /// Read the file at `path` as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> VfsResult<String>;

    /// Create or truncate the file at `path`. The parent folder must
    /// already exist.
    fn write_string(&self, path: &Path, contents: &str) -> VfsResult<()>;

    /// Delete the file or empty folder at `path`. The root cannot be
    /// deleted; a folder with entries cannot either.
    fn delete(&self, path: &Path) -> VfsResult<()>;
}

/// Normalize a caller path: must be absolute, `.` components are dropped,
/// `..` and prefix components are rejected.
pub(crate) fn normalize(path: &Path) -> VfsResult<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::RootDir) => {}
        _ => return Err(VfsError::InvalidPath(path.to_path_buf())),
    }

    let mut normalized = PathBuf::from("/");
    for component in components {
        match component {
            Component::Normal(name) => normalized.push(name),
            Component::CurDir => {}
            _ => return Err(VfsError::InvalidPath(path.to_path_buf())),
        }
    }
    Ok(normalized)
}
