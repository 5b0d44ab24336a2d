//! Predicates used to filter directory listings

use crate::path::VfsPath;

/// Kind of a directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file or archive member
    File,
    /// Directory, real or synthesized from archive member names
    Directory,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Full path of the entry, relative to the provider root
    pub path: VfsPath,
    /// File or directory
    pub kind: EntryKind,
}

impl DirEntry {
    /// Entry for a file
    pub fn file(path: VfsPath) -> Self {
        Self {
            path,
            kind: EntryKind::File,
        }
    }

    /// Entry for a directory
    pub fn directory(path: VfsPath) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
        }
    }
}

/// Decides which entries a listing returns
pub trait FileMatcher {
    /// Whether the entry at `path` of the given kind is selected
    fn matches(&self, path: &VfsPath, kind: EntryKind) -> bool;
}

impl<F> FileMatcher for F
where
    F: Fn(&VfsPath, EntryKind) -> bool,
{
    fn matches(&self, path: &VfsPath, kind: EntryKind) -> bool {
        self(path, kind)
    }
}

/// Selects files with one of several extensions, ignoring case
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionMatcher {
    extensions: Vec<String>,
}

impl ExtensionMatcher {
    /// Match any of `extensions` (given without the dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_string())
                .collect(),
        }
    }

    /// Match a single extension
    pub fn single(extension: &str) -> Self {
        Self::new([extension])
    }
}

impl FileMatcher for ExtensionMatcher {
    fn matches(&self, path: &VfsPath, kind: EntryKind) -> bool {
        kind == EntryKind::File && self.extensions.iter().any(|ext| path.has_extension(ext))
    }
}

/// Selects entries by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMatcher {
    /// Select files
    pub files: bool,
    /// Select directories
    pub directories: bool,
}

impl TypeMatcher {
    /// Files and directories
    pub const ALL: Self = Self {
        files: true,
        directories: true,
    };
    /// Files only
    pub const FILES: Self = Self {
        files: true,
        directories: false,
    };
    /// Directories only
    pub const DIRECTORIES: Self = Self {
        files: false,
        directories: true,
    };
}

impl FileMatcher for TypeMatcher {
    fn matches(&self, _path: &VfsPath, kind: EntryKind) -> bool {
        match kind {
            EntryKind::File => self.files,
            EntryKind::Directory => self.directories,
        }
    }
}
