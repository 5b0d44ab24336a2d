//! Shared read-only file contents

use std::ops::Deref;

use bytes::Bytes;

use crate::path::VfsPath;

/// Contents of an opened file.
///
/// Cloning is cheap: the bytes are reference counted. Files opened from a
/// package archive share the archive's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedFile {
    path: VfsPath,
    data: Bytes,
}

impl MappedFile {
    /// Wrap `data` opened from `path`
    pub fn new(path: VfsPath, data: Bytes) -> Self {
        Self { path, data }
    }

    /// Path the file was opened with
    pub fn path(&self) -> &VfsPath {
        &self.path
    }

    /// Shared handle to the contents
    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    /// Take the contents, dropping the path
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl Deref for MappedFile {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
