//! Provider backed by a `PACK` archive

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use levelkit_formats::pak::PakArchive;
use tracing::{debug, info};

use crate::disk::map_file;
use crate::error::{VfsError, VfsResult};
use crate::mapped::MappedFile;
use crate::matcher::DirEntry;
use crate::path::VfsPath;
use crate::FileSystem;

/// Package formats that can be mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// id Software `PACK` archives
    IdPak,
}

impl PackageFormat {
    /// Look up a format by its configured name, ignoring case
    pub fn from_name(name: &str) -> VfsResult<Self> {
        if name.eq_ignore_ascii_case("idpak") {
            Ok(Self::IdPak)
        } else {
            Err(VfsError::UnsupportedFormat(name.to_string()))
        }
    }

    /// Configured name of the format
    pub fn name(self) -> &'static str {
        match self {
            Self::IdPak => "idpak",
        }
    }
}

/// Read-only view of an archive's members.
///
/// The archive's flat member list is presented as a directory tree:
/// directories are synthesized from member name prefixes. Opened members
/// are slices of the archive buffer.
#[derive(Debug, Clone)]
pub struct PakFileSystem {
    name: String,
    data: Bytes,
    archive: PakArchive,
    files: HashMap<String, usize>,
    directories: HashMap<String, Vec<DirEntry>>,
}

impl PakFileSystem {
    /// Map and index the archive at `path`
    pub fn open(path: &Path) -> VfsResult<Self> {
        let data = map_file(path).map_err(|e| VfsError::io(path, e))?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self::from_bytes(name, data)
    }

    /// Index an archive already in memory
    pub fn from_bytes(name: impl Into<String>, data: Bytes) -> VfsResult<Self> {
        let name = name.into();
        let archive = PakArchive::parse(&data).map_err(|source| VfsError::MalformedArchive {
            name: name.clone(),
            source,
        })?;

        let mut files = HashMap::with_capacity(archive.len());
        let mut directories: HashMap<String, Vec<DirEntry>> = HashMap::new();
        directories.insert(String::new(), Vec::new());

        for (index, entry) in archive.entries().iter().enumerate() {
            let path = VfsPath::new(&entry.name);
            if path.is_empty() {
                debug!("Skipping unnamed member in {}", name);
                continue;
            }

            let mut parent = VfsPath::root();
            for component in &path.components()[..path.components().len() - 1] {
                let directory = parent.join(component.as_str());
                let key = directory.key();
                if !directories.contains_key(&key) {
                    directories.insert(key, Vec::new());
                    directories
                        .entry(parent.key())
                        .or_default()
                        .push(DirEntry::directory(directory.clone()));
                }
                parent = directory;
            }

            if files.insert(path.key(), index).is_none() {
                directories
                    .entry(parent.key())
                    .or_default()
                    .push(DirEntry::file(path));
            }
        }

        info!(
            "Indexed archive {} ({} members, {} directories)",
            name,
            files.len(),
            directories.len() - 1
        );

        Ok(Self {
            name,
            data,
            archive,
            files,
            directories,
        })
    }

    /// Archive file name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the archive has no members
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FileSystem for PakFileSystem {
    fn list_directory(&self, path: &VfsPath) -> VfsResult<Vec<DirEntry>> {
        self.directories
            .get(&path.key())
            .cloned()
            .ok_or_else(|| VfsError::not_found(path))
    }

    fn file_exists(&self, path: &VfsPath) -> bool {
        self.files.contains_key(&path.key())
    }

    fn directory_exists(&self, path: &VfsPath) -> bool {
        self.directories.contains_key(&path.key())
    }

    fn open_file(&self, path: &VfsPath) -> VfsResult<MappedFile> {
        let index = self
            .files
            .get(&path.key())
            .ok_or_else(|| VfsError::not_found(path))?;
        let entry = &self.archive.entries()[*index];
        Ok(MappedFile::new(path.clone(), self.data.slice(entry.range())))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::matcher::{EntryKind, TypeMatcher};
    use levelkit_test_utils::PakBuilder;
    use pretty_assertions::assert_eq;

    fn archive() -> PakFileSystem {
        let data = PakBuilder::new()
            .file("progs/player.mdl", b"player")
            .file("progs/items/armor.mdl", b"armor")
            .file("maps/e1m1.bsp", b"map")
            .file("default.cfg", b"bind")
            .build();
        PakFileSystem::from_bytes("pak0.pak", Bytes::from(data)).unwrap()
    }

    #[test]
    fn test_open_member_is_zero_copy_slice() {
        let pak = archive();
        let file = pak.open_file(&VfsPath::new("PROGS/Player.mdl")).unwrap();
        assert_eq!(&file[..], b"player");
        assert_eq!(pak.len(), 4);
    }

    #[test]
    fn test_synthesized_directories() {
        let pak = archive();
        assert!(pak.directory_exists(&VfsPath::root()));
        assert!(pak.directory_exists(&VfsPath::new("progs")));
        assert!(pak.directory_exists(&VfsPath::new("Progs/Items")));
        assert!(!pak.directory_exists(&VfsPath::new("progs/player.mdl")));
        assert!(!pak.file_exists(&VfsPath::new("progs")));
    }

    #[test]
    fn test_list_directory() {
        let pak = archive();
        let entries = pak.list_directory(&VfsPath::new("progs")).unwrap();
        let listed: Vec<(String, EntryKind)> = entries
            .iter()
            .map(|e| (e.path.to_string(), e.kind))
            .collect();
        assert_eq!(
            listed,
            [
                ("progs/player.mdl".to_string(), EntryKind::File),
                ("progs/items".to_string(), EntryKind::Directory),
            ]
        );
    }

    #[test]
    fn test_find_items_at_root() {
        let pak = archive();
        let dirs = pak
            .find_items(&VfsPath::root(), &TypeMatcher::DIRECTORIES)
            .unwrap();
        assert_eq!(dirs.len(), 2);
        let files = pak.find_items(&VfsPath::root(), &TypeMatcher::FILES).unwrap();
        assert_eq!(files, [VfsPath::new("default.cfg")]);
    }

    #[test]
    fn test_missing_member() {
        let pak = archive();
        assert!(matches!(
            pak.open_file(&VfsPath::new("progs/missing.mdl")),
            Err(VfsError::NotFound(_))
        ));
        assert!(pak.list_directory(&VfsPath::new("sound")).is_err());
    }

    #[test]
    fn test_malformed_archive() {
        let mut data = PakBuilder::new().file("a", b"x").build();
        data.truncate(data.len() - 10);
        let err = PakFileSystem::from_bytes("bad.pak", Bytes::from(data)).unwrap_err();
        assert!(matches!(err, VfsError::MalformedArchive { ref name, .. } if name == "bad.pak"));
    }

    #[test]
    fn test_package_format_names() {
        assert_eq!(PackageFormat::from_name("IdPak").unwrap(), PackageFormat::IdPak);
        assert!(matches!(
            PackageFormat::from_name("zip"),
            Err(VfsError::UnsupportedFormat(_))
        ));
    }
}
