//! Entity definition file references stored in map files

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{GameError, GameResult};

const BUILTIN_PREFIX: &str = "builtin:";
const EXTERNAL_PREFIX: &str = "external:";

/// Identifies the entity definition file a map uses.
///
/// Builtin files ship with the game configuration; external files are chosen
/// by the user. Equality compares the kind and the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum EntityDefinitionFileSpec {
    /// File bundled with the game configuration
    Builtin(PathBuf),
    /// File chosen by the user
    External(PathBuf),
    /// No file selected
    #[default]
    Unset,
}

impl EntityDefinitionFileSpec {
    /// Parse the attribute form `builtin:<path>`, `external:<path>`, or a
    /// bare path (treated as external).
    ///
    /// An empty string yields [`EntityDefinitionFileSpec::Unset`].
    pub fn parse(text: &str) -> GameResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::Unset);
        }
        let (spec, path): (fn(PathBuf) -> Self, &str) =
            if let Some(path) = text.strip_prefix(BUILTIN_PREFIX) {
                (Self::Builtin, path)
            } else if let Some(path) = text.strip_prefix(EXTERNAL_PREFIX) {
                (Self::External, path)
            } else {
                (Self::External, text)
            };
        let path = path.trim();
        if path.is_empty() {
            return Err(GameError::InvalidSpec(text.to_string()));
        }
        Ok(spec(PathBuf::from(path)))
    }

    /// Bundled file at `path`
    pub fn builtin(path: impl Into<PathBuf>) -> Self {
        Self::Builtin(path.into())
    }

    /// User file at `path`
    pub fn external(path: impl Into<PathBuf>) -> Self {
        Self::External(path.into())
    }

    /// True unless unset
    pub const fn is_valid(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// True for bundled files
    pub const fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }

    /// True for user files
    pub const fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// Stored path
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Builtin(path) | Self::External(path) => Some(path),
            Self::Unset => None,
        }
    }

    /// Attribute form, the inverse of [`EntityDefinitionFileSpec::parse`]
    pub fn as_attribute(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityDefinitionFileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(path) => write!(f, "{BUILTIN_PREFIX}{}", path.display()),
            Self::External(path) => write!(f, "{EXTERNAL_PREFIX}{}", path.display()),
            Self::Unset => Ok(()),
        }
    }
}
