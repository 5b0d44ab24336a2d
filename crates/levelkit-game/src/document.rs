//! Map document types and collaborator interfaces.
//!
//! The game layer reads and writes a handful of attributes on the map's root
//! entity and hands everything else to collaborators: the map text
//! serializer, the texture loader, and the entity definition parsers.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use levelkit_vfs::LayeredFileSystem;

use crate::config::TextureConfig;

/// Error raised by a collaborator
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for collaborator calls
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// A node carrying string attributes (key/value pairs)
pub trait AttributableNode {
    /// Value of `name`
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Set `name` to `value`, keeping its position if it exists
    fn add_or_update_attribute(&mut self, name: &str, value: &str);

    /// Remove `name` if present
    fn remove_attribute(&mut self, name: &str);

    /// Attribute names in insertion order
    fn attribute_names(&self) -> Vec<String>;

    /// Whether `name` is set
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Remove every attribute named `base` followed by one or more digits
    fn remove_numbered_attribute(&mut self, base: &str) {
        let numbered: Vec<String> = self
            .attribute_names()
            .into_iter()
            .filter(|name| {
                name.strip_prefix(base)
                    .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|c| c.is_ascii_digit()))
            })
            .collect();
        for name in numbered {
            self.remove_attribute(&name);
        }
    }
}

/// Ordered attribute store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityAttributes {
    entries: Vec<(String, String)>,
}

impl EntityAttributes {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no attribute is set
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl AttributableNode for EntityAttributes {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn add_or_update_attribute(&mut self, name: &str, value: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        self.entries.retain(|(key, _)| key != name);
    }

    fn attribute_names(&self) -> Vec<String> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EntityAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (key, value) in iter {
            attributes.add_or_update_attribute(&key.into(), &value.into());
        }
        attributes
    }
}

/// Dialect of the map text format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapFormat {
    /// Quake
    #[default]
    Standard,
    /// Valve 220 texture axes
    Valve,
    /// Quake II surface attributes
    Quake2,
    /// Hexen II extra face value
    Hexen2,
}

impl MapFormat {
    /// Name written into map headers
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Valve => "Valve",
            Self::Quake2 => "Quake2",
            Self::Hexen2 => "Hexen2",
        }
    }

    /// Parse a header name, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::Standard, Self::Valve, Self::Quake2, Self::Hexen2]
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for MapFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Formats a map can be exported to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Wavefront OBJ geometry
    WavefrontObj,
}

/// Root entity of a map document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct World {
    format: MapFormat,
    attributes: EntityAttributes,
}

impl World {
    /// Empty world in `format`
    pub fn new(format: MapFormat) -> Self {
        Self {
            format,
            attributes: EntityAttributes::new(),
        }
    }

    /// World with the given attributes
    pub fn with_attributes(format: MapFormat, attributes: EntityAttributes) -> Self {
        Self { format, attributes }
    }

    /// Map text dialect
    pub const fn format(&self) -> MapFormat {
        self.format
    }

    /// All attributes
    pub const fn attributes(&self) -> &EntityAttributes {
        &self.attributes
    }
}

impl AttributableNode for World {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.attribute(name)
    }

    fn add_or_update_attribute(&mut self, name: &str, value: &str) {
        self.attributes.add_or_update_attribute(name, value);
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove_attribute(name);
    }

    fn attribute_names(&self) -> Vec<String> {
        self.attributes.attribute_names()
    }
}

/// Reads and writes map documents
pub trait MapSerializer {
    /// Parse map text in `format`
    fn read_map(&self, format: MapFormat, data: &[u8]) -> CollaboratorResult<World>;

    /// Write `world` as map text
    fn write_map(&self, world: &World, out: &mut dyn Write) -> CollaboratorResult<()>;

    /// Write `world` in an export format
    fn export_map(
        &self,
        world: &World,
        format: ExportFormat,
        out: &mut dyn Write,
    ) -> CollaboratorResult<()>;
}

/// Loads texture collections into the editor's texture manager
pub trait TextureLoader {
    /// Load `collections`, resolving them through `fs` and `search_paths`
    fn load_texture_collections(
        &mut self,
        fs: &LayeredFileSystem,
        search_paths: &[PathBuf],
        config: &TextureConfig,
        collections: &[String],
    ) -> CollaboratorResult<()>;
}

/// Syntax of an entity definition file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityDefinitionFormat {
    /// Forge Game Data (`.fgd`)
    Fgd,
    /// QuakeEd comment blocks (`.def`)
    Def,
}

impl EntityDefinitionFormat {
    /// Format for a file extension, ignoring case
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("fgd") {
            Some(Self::Fgd)
        } else if extension.eq_ignore_ascii_case("def") {
            Some(Self::Def)
        } else {
            None
        }
    }
}

/// Parses entity definition files
pub trait EntityDefinitionParser {
    /// Parsed definition
    type Definition;

    /// Parse `data`, using `default_color` for definitions without a color
    fn parse_definitions(
        &self,
        format: EntityDefinitionFormat,
        data: &[u8],
        default_color: [f32; 4],
    ) -> CollaboratorResult<Vec<Self::Definition>>;
}
