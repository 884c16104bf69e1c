//! Strand virtual file systems
//!
//! A blocking [`FileSystem`] contract with two implementations, an
//! in-memory tree for deterministic tests and an OS-backed one rooted at
//! a base directory, plus [`AsyncFileSystem`], the facade that schedules
//! each blocking operation on an injected
//! [`AsyncRunner`](strand_runner::AsyncRunner) and hands back a
//! [`TaskHandle`](strand_runner::TaskHandle) for `then()` chaining.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod async_fs;
mod entry;
mod error;
mod fs;
mod memory;
mod os;

pub use async_fs::AsyncFileSystem;
pub use entry::{Entry, EntryKind};
pub use error::{VfsError, VfsResult};
pub use fs::FileSystem;
pub use memory::MemoryFileSystem;
pub use os::OsFileSystem;
