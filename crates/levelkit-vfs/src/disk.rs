//! Provider backed by a real directory

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use memmap2::Mmap;
use tracing::debug;

use crate::error::{VfsError, VfsResult};
use crate::mapped::MappedFile;
use crate::matcher::DirEntry;
use crate::path::VfsPath;
use crate::FileSystem;

/// Read-only view of a directory tree.
///
/// Lookups ignore case so that assets referenced as `progs/Player.mdl`
/// resolve on case-sensitive file systems.
#[derive(Debug, Clone)]
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    /// Provider rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Native location of `path`, with each component's case fixed.
    ///
    /// Absolute paths and paths with a `..` component are never resolved,
    /// so a provider cannot reach files outside its root.
    pub fn resolve(&self, path: &VfsPath) -> Option<PathBuf> {
        if path.is_absolute() || path.components().iter().any(|c| c == "..") {
            debug!("Rejecting {path} outside {}", self.root.display());
            return None;
        }
        fix_path(&self.root, path)
    }
}

impl FileSystem for DiskFileSystem {
    fn list_directory(&self, path: &VfsPath) -> VfsResult<Vec<DirEntry>> {
        let native = self
            .resolve(path)
            .filter(|p| p.is_dir())
            .ok_or_else(|| VfsError::not_found(path))?;

        let mut entries = Vec::new();
        for entry in fs::read_dir(&native).map_err(|e| VfsError::io(&native, e))? {
            let entry = entry.map_err(|e| VfsError::io(&native, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                debug!("Skipping non UTF-8 file name in {}", native.display());
                continue;
            };
            // Follows symbolic links
            let Ok(metadata) = fs::metadata(entry.path()) else {
                continue;
            };
            let child = path.join(name.as_str());
            if metadata.is_dir() {
                entries.push(DirEntry::directory(child));
            } else if metadata.is_file() {
                entries.push(DirEntry::file(child));
            }
        }
        Ok(entries)
    }

    fn file_exists(&self, path: &VfsPath) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }

    fn directory_exists(&self, path: &VfsPath) -> bool {
        self.resolve(path).is_some_and(|p| p.is_dir())
    }

    fn open_file(&self, path: &VfsPath) -> VfsResult<MappedFile> {
        let native = self
            .resolve(path)
            .filter(|p| p.is_file())
            .ok_or_else(|| VfsError::not_found(path))?;
        let data = map_file(&native).map_err(|e| VfsError::io(&native, e))?;
        Ok(MappedFile::new(path.clone(), data))
    }
}

/// Memory-map a whole file
pub fn map_file(path: &Path) -> std::io::Result<Bytes> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        // Zero-length mappings are rejected on some platforms
        return Ok(Bytes::new());
    }
    // SAFETY: mounted game files are not modified while the editor runs
    #[allow(unsafe_code)]
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(Bytes::from_owner(mmap))
}

/// Resolve `path` below `root`, matching each component case-insensitively.
///
/// An exact match is preferred; otherwise the parent directory is scanned.
/// Returns `None` for an absolute `path` or if some component does not exist.
pub fn fix_path(root: &Path, path: &VfsPath) -> Option<PathBuf> {
    if path.is_absolute() {
        return None;
    }

    let mut current = root.to_path_buf();
    for component in path.components() {
        let exact = current.join(component);
        if exact.exists() {
            current = exact;
            continue;
        }
        let found = fs::read_dir(&current).ok()?.flatten().find(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.eq_ignore_ascii_case(component))
        })?;
        current = found.path();
    }
    Some(current)
}

/// First existing candidate of `relative` under each of `search_paths`.
///
/// An absolute path is checked as is.
pub fn resolve_path(search_paths: &[PathBuf], relative: &VfsPath) -> Option<PathBuf> {
    if relative.is_absolute() {
        let native = relative.to_native(Path::new(""));
        return native.exists().then_some(native);
    }
    search_paths
        .iter()
        .find_map(|search_path| fix_path(search_path, relative))
}
