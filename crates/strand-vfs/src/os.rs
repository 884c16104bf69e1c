//! OS-backed file system rooted at a base directory

use crate::entry::{Entry, EntryKind};
use crate::error::{VfsError, VfsResult};
use crate::fs::{normalize, FileSystem};
use std::fs;
use std::path::{Path, PathBuf};

/// A [`FileSystem`] over a directory on the real file system.
///
/// Virtual paths are absolute and resolved against the base directory
/// after the usual normalization, so callers cannot escape the base with
/// relative components. Errors report the virtual path, not the resolved
/// one.
pub struct OsFileSystem {
    base: PathBuf,
}

impl OsFileSystem {
    /// Create a file system whose root is `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The base directory backing the root.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, path: &Path) -> VfsResult<PathBuf> {
        let normalized = normalize(path)?;
        let mut resolved = self.base.clone();
        for component in normalized.components().skip(1) {
            resolved.push(component);
        }
        Ok(resolved)
    }

    fn virtual_parent(path: &Path) -> VfsResult<PathBuf> {
        let normalized = normalize(path)?;
        Ok(normalized
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/")))
    }
}

impl FileSystem for OsFileSystem {
    fn root_exists(&self) -> VfsResult<bool> {
        Ok(self.base.is_dir())
    }

    fn exists(&self, path: &Path) -> VfsResult<bool> {
        Ok(self.resolve(path)?.exists())
    }

    fn entries(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        let resolved = self.resolve(path)?;
        if resolved.is_file() {
            return Err(VfsError::NotAFolder(path.to_path_buf()));
        }
        if !resolved.is_dir() {
            return Err(VfsError::NotFound(path.to_path_buf()));
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&resolved)? {
            let dir_entry = dir_entry?;
            let kind = if dir_entry.file_type()?.is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::File
            };
            entries.push(Entry {
                name: dir_entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn create_folder(&self, path: &Path) -> VfsResult<()> {
        let resolved = self.resolve(path)?;
        if resolved.exists() {
            return Err(VfsError::AlreadyExists(path.to_path_buf()));
        }
        match resolved.parent() {
            Some(parent) if parent.is_dir() => {
                fs::create_dir(&resolved)?;
                Ok(())
            }
            Some(parent) if parent.exists() => {
                Err(VfsError::NotAFolder(Self::virtual_parent(path)?))
            }
            _ => Err(VfsError::NotFound(Self::virtual_parent(path)?)),
        }
    }

    fn read_to_string(&self, path: &Path) -> VfsResult<String> {
        let resolved = self.resolve(path)?;
        if resolved.is_dir() {
            return Err(VfsError::NotAFile(path.to_path_buf()));
        }
        if !resolved.exists() {
            return Err(VfsError::NotFound(path.to_path_buf()));
        }
        Ok(fs::read_to_string(&resolved)?)
    }

    fn write_string(&self, path: &Path, contents: &str) -> VfsResult<()> {
        let resolved = self.resolve(path)?;
        if resolved.is_dir() {
            return Err(VfsError::NotAFile(path.to_path_buf()));
        }
        match resolved.parent() {
            Some(parent) if parent.is_dir() => {
                fs::write(&resolved, contents)?;
                Ok(())
            }
            Some(parent) if parent.exists() => {
                Err(VfsError::NotAFolder(Self::virtual_parent(path)?))
            }
            _ => Err(VfsError::NotFound(Self::virtual_parent(path)?)),
        }
    }

    fn delete(&self, path: &Path) -> VfsResult<()> {
        let resolved = self.resolve(path)?;
        if resolved == self.base {
            return Err(VfsError::InvalidPath(path.to_path_buf()));
        }
        if resolved.is_dir() {
            if fs::read_dir(&resolved)?.next().is_some() {
                return Err(VfsError::NotEmpty(path.to_path_buf()));
            }
            fs::remove_dir(&resolved)?;
            Ok(())
        } else if resolved.exists() {
            fs::remove_file(&resolved)?;
            Ok(())
        } else {
            Err(VfsError::NotFound(path.to_path_buf()))
        }
    }
}
