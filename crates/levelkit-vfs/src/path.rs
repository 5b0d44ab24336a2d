//! Normalized virtual paths

use std::fmt;
use std::path::{Path, PathBuf};

/// A normalized path inside the virtual file system.
///
/// Both `/` and `\` separate components. Empty and `.` components are
/// dropped, and `..` removes the preceding component when there is one.
/// Equality compares components exactly; use [`VfsPath::key`] for the
/// case-insensitive lookup form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VfsPath {
    absolute: bool,
    components: Vec<String>,
}

impl VfsPath {
    /// Parse a path from text
    pub fn new(text: &str) -> Self {
        let absolute = text.starts_with(['/', '\\']) || has_drive_prefix(text);
        let mut path = Self {
            absolute,
            components: Vec::new(),
        };
        path.push_components(text);
        path
    }

    /// The empty relative path, naming the root of a provider
    pub fn root() -> Self {
        Self::default()
    }

    fn push_components(&mut self, text: &str) {
        for component in text.split(['/', '\\']) {
            match component {
                "" | "." => {}
                ".." => match self.components.last() {
                    Some(last) if last != ".." => {
                        self.components.pop();
                    }
                    // `..` above an absolute root stays at the root
                    _ if self.absolute => {}
                    _ => self.components.push(component.to_string()),
                },
                _ => self.components.push(component.to_string()),
            }
        }
    }

    /// Append `other`; an absolute `other` replaces this path
    #[must_use]
    pub fn join(&self, other: impl Into<Self>) -> Self {
        let other = other.into();
        if other.absolute {
            return other;
        }
        let mut joined = self.clone();
        for component in &other.components {
            joined.push_components(component);
        }
        joined
    }

    /// Components in order
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Whether the path starts at a file system root
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Whether the path has no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// First component
    pub fn first_component(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    /// Last component (the file name)
    pub fn last_component(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Path without its last component
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut parent = self.clone();
        parent.components.pop();
        parent
    }

    /// Extension of the last component, without the dot.
    ///
    /// A leading dot (`.hidden`) does not start an extension.
    pub fn extension(&self) -> Option<&str> {
        let name = self.last_component()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(dot) => Some(&name[dot + 1..]),
        }
    }

    /// Case-insensitive extension test; `extension` is given without a dot
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Last component without its extension
    pub fn stem(&self) -> Option<&str> {
        let name = self.last_component()?;
        match self.extension() {
            Some(ext) => Some(&name[..name.len() - ext.len() - 1]),
            None => Some(name),
        }
    }

    /// Join the components with `separator`
    pub fn to_string_with(&self, separator: char) -> String {
        let mut out = String::new();
        if self.absolute && !has_drive_prefix(self.first_component().unwrap_or_default()) {
            out.push(separator);
        }
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                out.push(separator);
            }
            out.push_str(component);
        }
        out
    }

    /// Lower-cased, `/` separated form used for case-insensitive lookups
    pub fn key(&self) -> String {
        self.to_string_with('/').to_ascii_lowercase()
    }

    /// Case-insensitive equality
    pub fn eq_ignore_case(&self, other: &Self) -> bool {
        self.absolute == other.absolute
            && self.components.len() == other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Whether `self` is `prefix` followed by zero or more components,
    /// compared case-insensitively
    pub fn starts_with_ignore_case(&self, prefix: &Self) -> bool {
        self.absolute == prefix.absolute
            && self.components.len() >= prefix.components.len()
            && self
                .components
                .iter()
                .zip(&prefix.components)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Convert to a native path below `root`; absolute paths ignore `root`
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut native = if self.absolute {
            PathBuf::from(std::path::MAIN_SEPARATOR_STR)
        } else {
            root.to_path_buf()
        };
        for component in &self.components {
            if has_drive_prefix(component) && self.absolute {
                native = PathBuf::from(format!("{component}{}", std::path::MAIN_SEPARATOR));
            } else {
                native.push(component);
            }
        }
        native
    }
}

fn has_drive_prefix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with('/'))
    }
}

impl From<&str> for VfsPath {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<&String> for VfsPath {
    fn from(text: &String) -> Self {
        Self::new(text)
    }
}

impl From<String> for VfsPath {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl From<&VfsPath> for VfsPath {
    fn from(path: &VfsPath) -> Self {
        path.clone()
    }
}

impl From<&Path> for VfsPath {
    fn from(path: &Path) -> Self {
        Self::new(&path.to_string_lossy())
    }
}
