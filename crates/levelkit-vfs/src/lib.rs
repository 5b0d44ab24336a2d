//! Layered virtual file system for game content.
//!
//! Game assets live in a stack of *providers*: plain directories on disk
//! and `PACK` archives found inside them. The stack presents one merged,
//! case-insensitive namespace in which later mounts override earlier ones:
//!
//! - **Disk**: [`DiskFileSystem`], a directory tree with case-insensitive
//!   lookup and memory-mapped reads
//! - **Archive**: [`PakFileSystem`], an indexed archive whose members are
//!   zero-copy slices of the mapped container
//! - **Stack**: [`LayeredFileSystem`], the override order over both
//!
//! # Example
//!
//! ```rust,no_run
//! use levelkit_vfs::{DiskFileSystem, FileSystem, LayeredFileSystem, PakFileSystem, Provider, VfsPath};
//! use std::path::Path;
//!
//! # fn example() -> levelkit_vfs::VfsResult<()> {
//! let mut fs = LayeredFileSystem::new();
//! fs.add_provider(Provider::Disk(DiskFileSystem::new("/games/quake/id1")));
//! fs.add_provider(Provider::Pak(PakFileSystem::open(Path::new("/games/quake/id1/pak0.pak"))?));
//!
//! let palette = fs.open_file(&VfsPath::new("gfx/palette.lmp"))?;
//! println!("{} bytes", palette.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod disk;
mod error;
mod layered;
mod mapped;
pub mod matcher;
pub mod pak;
mod path;

pub use disk::{DiskFileSystem, fix_path, resolve_path};
pub use error::{VfsError, VfsResult};
pub use layered::LayeredFileSystem;
pub use mapped::MappedFile;
pub use matcher::{DirEntry, EntryKind, ExtensionMatcher, FileMatcher, TypeMatcher};
pub use pak::{PackageFormat, PakFileSystem};
pub use path::VfsPath;

/// Read access to a tree of files and directories.
///
/// Paths are relative to the provider root and compared without regard to
/// case.
pub trait FileSystem {
    /// Immediate children of the directory `path`
    fn list_directory(&self, path: &VfsPath) -> VfsResult<Vec<DirEntry>>;

    /// Whether `path` names a file
    fn file_exists(&self, path: &VfsPath) -> bool;

    /// Whether `path` names a directory
    fn directory_exists(&self, path: &VfsPath) -> bool;

    /// Open the file at `path`
    fn open_file(&self, path: &VfsPath) -> VfsResult<MappedFile>;

    /// Children of `path` selected by `matcher`
    fn find_items(&self, path: &VfsPath, matcher: &dyn FileMatcher) -> VfsResult<Vec<VfsPath>> {
        Ok(self
            .list_directory(path)?
            .into_iter()
            .filter(|entry| matcher.matches(&entry.path, entry.kind))
            .map(|entry| entry.path)
            .collect())
    }

    /// Descendants of `path` selected by `matcher`, depth first
    fn find_items_recursively(
        &self,
        path: &VfsPath,
        matcher: &dyn FileMatcher,
    ) -> VfsResult<Vec<VfsPath>> {
        let mut found = Vec::new();
        let mut pending = vec![path.clone()];
        while let Some(directory) = pending.pop() {
            for entry in self.list_directory(&directory)? {
                if matcher.matches(&entry.path, entry.kind) {
                    found.push(entry.path.clone());
                }
                if entry.kind == EntryKind::Directory {
                    pending.push(entry.path);
                }
            }
        }
        Ok(found)
    }
}

/// A mountable file source
#[derive(Debug)]
pub enum Provider {
    /// Directory on disk
    Disk(DiskFileSystem),
    /// Package archive
    Pak(PakFileSystem),
}

impl Provider {
    /// Short description for log messages
    pub fn describe(&self) -> String {
        match self {
            Self::Disk(fs) => format!("directory {}", fs.root().display()),
            Self::Pak(fs) => format!("archive {}", fs.name()),
        }
    }

    fn inner(&self) -> &dyn FileSystem {
        match self {
            Self::Disk(fs) => fs,
            Self::Pak(fs) => fs,
        }
    }
}

impl FileSystem for Provider {
    fn list_directory(&self, path: &VfsPath) -> VfsResult<Vec<DirEntry>> {
        self.inner().list_directory(path)
    }

    fn file_exists(&self, path: &VfsPath) -> bool {
        self.inner().file_exists(path)
    }

    fn directory_exists(&self, path: &VfsPath) -> bool {
        self.inner().directory_exists(path)
    }

    fn open_file(&self, path: &VfsPath) -> VfsResult<MappedFile> {
        self.inner().open_file(path)
    }
}
