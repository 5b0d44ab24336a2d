//! Game configuration
//!
//! Describes where a game keeps its content and which formats it uses. The
//! structures deserialize from JSON; locating the configuration file is left
//! to the caller.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

/// Configuration of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Display name, written into map file headers
    pub name: String,

    /// Content search path and package format
    pub file_system: FileSystemConfig,

    /// Texture packages and palette
    pub textures: TextureConfig,

    /// Entity definitions and models
    pub entities: EntityConfig,

    /// Surface and content flags
    pub face_attributes: FaceAttributesConfig,

    /// Brush content types shown by the editor
    pub brush_content_types: Vec<BrushContentType>,

    /// Longest attribute value the game's tools accept
    pub max_property_length: usize,

    /// File this configuration was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            file_system: FileSystemConfig::default(),
            textures: TextureConfig::default(),
            entities: EntityConfig::default(),
            face_attributes: FaceAttributesConfig::default(),
            brush_content_types: Vec::new(),
            max_property_length: 1023,
            config_path: None,
        }
    }
}

impl GameConfig {
    /// Configuration for a game named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Deserialize from JSON text
    pub fn from_json(text: &str) -> GameResult<Self> {
        serde_json::from_str(text).map_err(|e| GameError::Config(e.to_string()))
    }

    /// Read and deserialize a JSON configuration file
    pub fn load(path: &Path) -> GameResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
        let mut config = serde_json::from_str::<Self>(&text)
            .map_err(|e| GameError::Config(format!("{}: {e}", path.display())))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> GameResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GameError::Config(e.to_string()))
    }

    /// Resolve a file bundled with the configuration.
    ///
    /// Relative paths are taken relative to the configuration file's
    /// directory.
    pub fn find_config_file(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| path.to_path_buf(), |dir| dir.join(path))
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the default content directory below the game path
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<String>) -> Self {
        self.file_system.search_path = search_path.into();
        self
    }

    /// Set the package extension and format name
    #[must_use]
    pub fn with_package_format(
        mut self,
        extension: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        self.file_system.package_format = PackageFormatConfig {
            extension: extension.into(),
            format: format.into(),
        };
        self
    }

    /// Set the palette path inside the virtual file system
    #[must_use]
    pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
        self.textures.palette = palette.into();
        self
    }

    /// Set the texture package layout
    #[must_use]
    pub fn with_texture_package(mut self, package: TexturePackageConfig) -> Self {
        self.textures.package = package;
        self
    }

    /// Set the worldspawn attribute holding texture collections
    #[must_use]
    pub fn with_texture_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.textures.attribute = attribute.into();
        self
    }

    /// Set the bundled entity definition files
    #[must_use]
    pub fn with_entity_definition_files<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        self.entities.definition_files = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the enabled model formats
    #[must_use]
    pub fn with_model_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities.model_formats = formats
            .into_iter()
            .map(|f| f.into().to_ascii_lowercase())
            .collect();
        self
    }

    /// Set the maximum attribute value length
    #[must_use]
    pub const fn with_max_property_length(mut self, length: usize) -> Self {
        self.max_property_length = length;
        self
    }
}

/// Where content lives below the game path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSystemConfig {
    /// Default content directory, such as `id1`
    pub search_path: String,
    /// Archives mounted from every content directory
    pub package_format: PackageFormatConfig,
}

impl Default for FileSystemConfig {
    fn default() -> Self {
        Self {
            search_path: "id1".to_string(),
            package_format: PackageFormatConfig::default(),
        }
    }
}

/// Package archive files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageFormatConfig {
    /// File extension without the dot
    pub extension: String,
    /// Container format name
    pub format: String,
}

impl Default for PackageFormatConfig {
    fn default() -> Self {
        Self {
            extension: "pak".to_string(),
            format: "idpak".to_string(),
        }
    }
}

/// Textures and palette
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// How texture collections are stored
    pub package: TexturePackageConfig,
    /// Palette file inside the virtual file system
    pub palette: String,
    /// Worldspawn attribute listing the texture collections of a map
    pub attribute: String,
}

/// How texture collections are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TexturePackageType {
    /// Each collection is one file, such as a WAD
    File,
    /// Each collection is a directory of images
    Directory,
    /// Not configured
    #[default]
    Unset,
}

/// Texture collection layout
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePackageConfig {
    /// Package kind
    #[serde(rename = "type")]
    pub package_type: TexturePackageType,
    /// Extension of file packages, without the dot
    pub extension: String,
    /// Directory holding directory packages
    pub root_directory: String,
}

impl TexturePackageConfig {
    /// Collections stored as files with `extension`
    pub fn file(extension: impl Into<String>) -> Self {
        Self {
            package_type: TexturePackageType::File,
            extension: extension.into(),
            root_directory: String::new(),
        }
    }

    /// Collections stored as directories below `root`
    pub fn directory(root: impl Into<String>) -> Self {
        Self {
            package_type: TexturePackageType::Directory,
            extension: String::new(),
            root_directory: root.into(),
        }
    }
}

/// Entity definitions and models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Bundled definition files, relative to the configuration file
    pub definition_files: Vec<PathBuf>,
    /// Enabled model formats (`mdl`, `md2`, `bsp`)
    pub model_formats: BTreeSet<String>,
    /// Color of entities without one in their definition
    pub default_color: [f32; 4],
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            definition_files: Vec::new(),
            model_formats: BTreeSet::new(),
            default_color: [0.6, 0.6, 0.6, 1.0],
        }
    }
}

impl EntityConfig {
    /// Whether `format` is enabled, ignoring case
    pub fn supports_model_format(&self, format: &str) -> bool {
        self.model_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }
}

/// One named bit flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagConfig {
    /// Short name
    pub name: String,
    /// Tooltip text
    #[serde(default)]
    pub description: String,
}

/// Bit flags in bit order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagsConfig {
    /// Flag `i` is bit `1 << i`
    pub flags: Vec<FlagConfig>,
}

impl FlagsConfig {
    /// Bit value of the flag called `name`, or 0
    pub fn flag_value(&self, name: &str) -> u32 {
        self.flags
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .and_then(|i| 1u32.checked_shl(i))
            .unwrap_or(0)
    }

    /// Name of the flag at bit `index`
    pub fn flag_name(&self, index: usize) -> Option<&str> {
        self.flags.get(index).map(|f| f.name.as_str())
    }
}

/// Surface and content flags (Quake II family)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceAttributesConfig {
    /// Surface flags
    pub surface_flags: FlagsConfig,
    /// Content flags
    pub content_flags: FlagsConfig,
}

/// Content type a brush can be classified as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushContentType {
    /// Display name
    pub name: String,
    /// Whether brushes of this type are drawn translucent
    #[serde(default)]
    pub transparent: bool,
    /// Texture name pattern selecting the type
    #[serde(default)]
    pub texture_pattern: String,
}
