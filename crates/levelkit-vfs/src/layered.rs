//! Override stack of providers

use std::collections::HashSet;

use bytes::Bytes;
use levelkit_formats::AssetSource;
use tracing::{debug, trace};

use crate::error::{VfsError, VfsResult};
use crate::mapped::MappedFile;
use crate::matcher::DirEntry;
use crate::path::VfsPath;
use crate::{FileSystem, Provider};

/// Ordered stack of providers presenting one namespace.
///
/// Providers mounted later take priority: every lookup scans the stack from
/// the most recently added provider down and stops at the first match.
/// Directory listings merge all providers, keeping the highest priority
/// entry for names that differ only in case.
#[derive(Debug, Default)]
pub struct LayeredFileSystem {
    providers: Vec<Provider>,
}

impl LayeredFileSystem {
    /// Empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `provider` above all existing providers
    pub fn add_provider(&mut self, provider: Provider) {
        debug!(
            "Mounting {} at priority {}",
            provider.describe(),
            self.providers.len()
        );
        self.providers.push(provider);
    }

    /// Unmount every provider
    pub fn clear(&mut self) {
        debug!("Unmounting {} providers", self.providers.len());
        self.providers.clear();
    }

    /// Number of mounted providers
    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// True if nothing is mounted
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers from lowest to highest priority
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Highest priority provider containing the file `path`
    pub fn provider_for(&self, path: &VfsPath) -> Option<&Provider> {
        self.providers.iter().rev().find(|p| p.file_exists(path))
    }
}

impl FileSystem for LayeredFileSystem {
    fn list_directory(&self, path: &VfsPath) -> VfsResult<Vec<DirEntry>> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut found = false;

        for provider in self.providers.iter().rev() {
            if !provider.directory_exists(path) {
                continue;
            }
            found = true;
            for entry in provider.list_directory(path)? {
                if seen.insert(entry.path.key()) {
                    merged.push(entry);
                } else {
                    trace!("{} shadowed in {}", entry.path, provider.describe());
                }
            }
        }

        if !found {
            return Err(VfsError::not_found(path));
        }
        merged.sort_by_cached_key(|entry| entry.path.key());
        Ok(merged)
    }

    fn file_exists(&self, path: &VfsPath) -> bool {
        self.provider_for(path).is_some()
    }

    fn directory_exists(&self, path: &VfsPath) -> bool {
        self.providers.iter().rev().any(|p| p.directory_exists(path))
    }

    fn open_file(&self, path: &VfsPath) -> VfsResult<MappedFile> {
        let provider = self
            .provider_for(path)
            .ok_or_else(|| VfsError::not_found(path))?;
        trace!("Opening {} from {}", path, provider.describe());
        provider.open_file(path)
    }
}

impl AssetSource for LayeredFileSystem {
    fn read_asset(&self, path: &str) -> std::io::Result<Bytes> {
        Ok(self.open_file(&VfsPath::new(path))?.into_bytes())
    }
}
