//! Async facade scheduling blocking operations on an injected runner

use crate::entry::Entry;
use crate::error::VfsResult;
use crate::fs::FileSystem;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strand_runner::{default_runner, AsyncRunner, AsyncRunnerExt, TaskHandle};

/// Async wrapper over a [`FileSystem`].
///
/// Every operation schedules its blocking call on the configured runner
/// and returns the resulting [`TaskHandle`], so the calling thread never
/// touches the underlying file system. A `then()` continuation attached to
/// the handle lands on whatever runner is registered current at the call
/// site, which is how results come back to the caller's own loop.
pub struct AsyncFileSystem {
    inner: Arc<dyn FileSystem>,
    runner: Mutex<Arc<dyn AsyncRunner>>,
}

impl AsyncFileSystem {
    /// Wrap `inner`, scheduling work on `runner`.
    pub fn new(inner: Arc<dyn FileSystem>, runner: Arc<dyn AsyncRunner>) -> Self {
        Self {
            inner,
            runner: Mutex::new(runner),
        }
    }

    /// Wrap `inner`, scheduling work on the process-wide default runner.
    pub fn with_default_runner(inner: Arc<dyn FileSystem>) -> Self {
        Self::new(inner, default_runner())
    }

    /// Replace the runner used for subsequently scheduled operations.
    pub fn set_runner(&self, runner: Arc<dyn AsyncRunner>) {
        *self.runner.lock() = runner;
    }

    fn runner(&self) -> Arc<dyn AsyncRunner> {
        self.runner.lock().clone()
    }

    /// Whether the file system root is present.
    pub fn root_exists_async(&self) -> TaskHandle<VfsResult<bool>> {
        let fs = self.inner.clone();
        self.runner().schedule(move || fs.root_exists())
    }

    /// Whether `path` refers to an existing file or folder.
    pub fn exists_async(&self, path: &Path) -> TaskHandle<VfsResult<bool>> {
        let fs = self.inner.clone();
        let path = path.to_path_buf();
        self.runner().schedule(move || fs.exists(&path))
    }

    /// Files and folders directly inside `path`, sorted by name.
    pub fn entries_async(&self, path: &Path) -> TaskHandle<VfsResult<Vec<Entry>>> {
        let fs = self.inner.clone();
        let path = path.to_path_buf();
        self.runner().schedule(move || fs.entries(&path))
    }

    /// Create a folder at `path`.
    pub fn create_folder_async(&self, path: &Path) -> TaskHandle<VfsResult<()>> {
        let fs = self.inner.clone();
        let path = path.to_path_buf();
        self.runner().schedule(move || fs.create_folder(&path))
    }

    /// Read the file at `path` as UTF-8 text.
    pub fn read_to_string_async(&self, path: &Path) -> TaskHandle<VfsResult<String>> {
        let fs = self.inner.clone();
        let path = path.to_path_buf();
        self.runner().schedule(move || fs.read_to_string(&path))
    }

    /// Create or truncate the file at `path` with `contents`.
    pub fn write_string_async(
        &self,
        path: &Path,
        contents: impl Into<String>,
    ) -> TaskHandle<VfsResult<()>> {
        let fs = self.inner.clone();
        let path: PathBuf = path.to_path_buf();
        let contents = contents.into();
        self.runner()
            .schedule(move || fs.write_string(&path, &contents))
    }

    /// Delete the file or empty folder at `path`.
    pub fn delete_async(&self, path: &Path) -> TaskHandle<VfsResult<()>> {
        let fs = self.inner.clone();
        let path = path.to_path_buf();
        self.runner().schedule(move || fs.delete(&path))
    }
}
