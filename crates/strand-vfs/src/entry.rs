//! Directory entry types

/// Kind of directory entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file
    File,
    /// A folder
    Folder,
}

/// A named entry inside a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry name without any path component
    pub name: String,
    /// Whether this is a file or a folder
    pub kind: EntryKind,
}

impl Entry {
    /// A file entry with the given name.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    /// A folder entry with the given name.
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Folder,
        }
    }
}
