//! In-memory file system for deterministic tests

use crate::entry::Entry;
use crate::error::{VfsError, VfsResult};
use crate::fs::{normalize, FileSystem};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Tree state: folder set plus file contents, keyed by normalized path.
struct MemoryState {
    /// Always contains the root `/`
    folders: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, String>,
}

impl MemoryState {
    fn children_of(&self, path: &Path) -> Vec<Entry> {
        let mut entries = Vec::new();
        for folder in &self.folders {
            if folder.parent() == Some(path) {
                entries.push(Entry::folder(name_of(folder)));
            }
        }
        for file in self.files.keys() {
            if file.parent() == Some(path) {
                entries.push(Entry::file(name_of(file)));
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn has_children(&self, path: &Path) -> bool {
        self.folders.iter().any(|f| f.parent() == Some(path))
            || self.files.keys().any(|f| f.parent() == Some(path))
    }
}

fn name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A [`FileSystem`] held entirely in memory.
///
/// The root folder `/` always exists. All state lives behind one lock, so
/// an instance can back an async facade shared across runners.
pub struct MemoryFileSystem {
    state: Mutex<MemoryState>,
}

impl MemoryFileSystem {
    /// Create an empty file system containing only the root folder.
    pub fn new() -> Self {
        let mut folders = BTreeSet::new();
        folders.insert(PathBuf::from("/"));
        Self {
            state: Mutex::new(MemoryState {
                folders,
                files: BTreeMap::new(),
            }),
        }
    }
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MemoryFileSystem {
    fn root_exists(&self) -> VfsResult<bool> {
        Ok(true)
    }

    fn exists(&self, path: &Path) -> VfsResult<bool> {
        let path = normalize(path)?;
        let state = self.state.lock();
        Ok(state.folders.contains(&path) || state.files.contains_key(&path))
    }

    fn entries(&self, path: &Path) -> VfsResult<Vec<Entry>> {
        let path = normalize(path)?;
        let state = self.state.lock();
        if state.files.contains_key(&path) {
            return Err(VfsError::NotAFolder(path));
        }
        if !state.folders.contains(&path) {
            return Err(VfsError::NotFound(path));
        }
        Ok(state.children_of(&path))
    }

    fn create_folder(&self, path: &Path) -> VfsResult<()> {
        let path = normalize(path)?;
        let mut state = self.state.lock();
        if state.folders.contains(&path) || state.files.contains_key(&path) {
            return Err(VfsError::AlreadyExists(path));
        }
        // normalize guarantees a parent for everything below the root,
        // and the root itself always exists (caught above).
        match path.parent() {
            Some(parent) if state.folders.contains(parent) => {
                state.folders.insert(path);
                Ok(())
            }
            Some(parent) if state.files.contains_key(parent) => {
                Err(VfsError::NotAFolder(parent.to_path_buf()))
            }
            Some(parent) => Err(VfsError::NotFound(parent.to_path_buf())),
            None => Err(VfsError::AlreadyExists(path)),
        }
    }

    fn read_to_string(&self, path: &Path) -> VfsResult<String> {
        let path = normalize(path)?;
        let state = self.state.lock();
        match state.files.get(&path) {
            Some(contents) => Ok(contents.clone()),
            None if state.folders.contains(&path) => Err(VfsError::NotAFile(path)),
            None => Err(VfsError::NotFound(path)),
        }
    }

    fn write_string(&self, path: &Path, contents: &str) -> VfsResult<()> {
        let path = normalize(path)?;
        let mut state = self.state.lock();
        if state.folders.contains(&path) {
            return Err(VfsError::NotAFile(path));
        }
        match path.parent() {
            Some(parent) if state.folders.contains(parent) => {
                state.files.insert(path, contents.to_string());
                Ok(())
            }
            Some(parent) if state.files.contains_key(parent) => {
                Err(VfsError::NotAFolder(parent.to_path_buf()))
            }
            Some(parent) => Err(VfsError::NotFound(parent.to_path_buf())),
            None => Err(VfsError::NotAFile(path)),
        }
    }

    fn delete(&self, path: &Path) -> VfsResult<()> {
        let path = normalize(path)?;
        let mut state = self.state.lock();
        if state.files.remove(&path).is_some() {
            return Ok(());
        }
        if !state.folders.contains(&path) {
            return Err(VfsError::NotFound(path));
        }
        if path == Path::new("/") {
            return Err(VfsError::InvalidPath(path));
        }
        if state.has_children(&path) {
            return Err(VfsError::NotEmpty(path));
        }
        state.folders.remove(&path);
        Ok(())
    }
}
