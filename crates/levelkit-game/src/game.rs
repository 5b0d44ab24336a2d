//! The game facade

use std::fs::File;
use std::io::{BufWriter, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use levelkit_formats::bsp::BspParser;
use levelkit_formats::md2::Md2Parser;
use levelkit_formats::mdl::MdlParser;
use levelkit_formats::{EntityModel, ModelParser, Palette};
use levelkit_vfs::{
    DiskFileSystem, ExtensionMatcher, FileSystem, LayeredFileSystem, PackageFormat,
    PakFileSystem, Provider, TypeMatcher, VfsPath, disk, resolve_path,
};
use tracing::{debug, info, warn};

use crate::attributes;
use crate::config::{BrushContentType, FlagsConfig, GameConfig, TexturePackageType};
use crate::document::{
    AttributableNode, EntityDefinitionFormat, EntityDefinitionParser, ExportFormat, MapFormat,
    MapSerializer, TextureLoader, World,
};
use crate::entity_def::EntityDefinitionFileSpec;
use crate::error::{GameError, GameResult};
use crate::strings;
use crate::system_paths;

/// One game: its configuration, install location, and mounted content.
///
/// The virtual file system is rebuilt whenever the game path or the
/// additional search paths change. Until a game path naming an existing
/// directory is set, nothing is mounted and every lookup fails with
/// [`GameError::NotFound`].
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    game_path: PathBuf,
    additional_search_paths: Vec<PathBuf>,
    fs: LayeredFileSystem,
}

impl Game {
    /// Game installed at `game_path`, mounting its default content directory
    pub fn new(config: GameConfig, game_path: impl Into<PathBuf>) -> GameResult<Self> {
        Self::with_search_paths(config, game_path, Vec::new())
    }

    /// Game installed at `game_path` with mod directories mounted above the
    /// default content directory, in order
    pub fn with_search_paths(
        config: GameConfig,
        game_path: impl Into<PathBuf>,
        additional_search_paths: Vec<PathBuf>,
    ) -> GameResult<Self> {
        let game_path = game_path.into();
        let fs = mount_file_system(&config, &game_path, &additional_search_paths)?;
        Ok(Self {
            config,
            game_path,
            additional_search_paths,
            fs,
        })
    }

    /// Display name
    pub fn game_name(&self) -> &str {
        &self.config.name
    }

    /// Install directory
    pub fn game_path(&self) -> &Path {
        &self.game_path
    }

    /// Configuration
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Move to another install directory and remount.
    ///
    /// On error the previous game path and mounts are kept.
    pub fn set_game_path(&mut self, game_path: impl Into<PathBuf>) -> GameResult<()> {
        let game_path = game_path.into();
        self.fs = mount_file_system(&self.config, &game_path, &self.additional_search_paths)?;
        self.game_path = game_path;
        Ok(())
    }

    /// Replace the mod directories and remount.
    ///
    /// On error the previous search paths and mounts are kept.
    pub fn set_additional_search_paths(&mut self, search_paths: Vec<PathBuf>) -> GameResult<()> {
        self.fs = mount_file_system(&self.config, &self.game_path, &search_paths)?;
        self.additional_search_paths = search_paths;
        Ok(())
    }

    /// Mod directories, lowest priority first
    pub fn additional_search_paths(&self) -> &[PathBuf] {
        &self.additional_search_paths
    }

    /// Longest attribute value the game accepts
    pub const fn max_property_length(&self) -> usize {
        self.config.max_property_length
    }

    /// Mounted content
    pub const fn file_system(&self) -> &LayeredFileSystem {
        &self.fs
    }

    /// Empty map in `format`
    pub fn new_map(&self, format: MapFormat) -> World {
        World::new(format)
    }

    /// Read the map file at `path`
    pub fn load_map<S>(&self, serializer: &S, format: MapFormat, path: &Path) -> GameResult<World>
    where
        S: MapSerializer + ?Sized,
    {
        let data = disk::map_file(path).map_err(|e| GameError::io(path, e))?;
        info!("Loading {} map {}", format, path.display());
        serializer
            .read_map(format, &data)
            .map_err(|e| GameError::asset(format!("Cannot load map {}", path.display()), e))
    }

    /// Write `world` to `out`, preceded by the game comment header
    pub fn write_map<S>(&self, serializer: &S, world: &World, out: &mut dyn Write) -> GameResult<()>
    where
        S: MapSerializer + ?Sized,
    {
        write!(
            out,
            "// Game: {}\n// Format: {}\n",
            self.config.name,
            world.format()
        )
        .map_err(|e| GameError::asset("Cannot write map header", e))?;
        serializer
            .write_map(world, out)
            .map_err(|e| GameError::asset("Cannot write map", e))
    }

    /// Write `world` to the file at `path`
    pub fn write_map_file<S>(&self, serializer: &S, world: &World, path: &Path) -> GameResult<()>
    where
        S: MapSerializer + ?Sized,
    {
        let file = File::create(path).map_err(|e| GameError::io(path, e))?;
        let mut out = BufWriter::new(file);
        self.write_map(serializer, world, &mut out)?;
        out.flush().map_err(|e| GameError::io(path, e))?;
        info!("Wrote map {}", path.display());
        Ok(())
    }

    /// Export `world` to the file at `path`
    pub fn export_map<S>(
        &self,
        serializer: &S,
        world: &World,
        format: ExportFormat,
        path: &Path,
    ) -> GameResult<()>
    where
        S: MapSerializer + ?Sized,
    {
        let file = File::create(path).map_err(|e| GameError::io(path, e))?;
        let mut out = BufWriter::new(file);
        serializer
            .export_map(world, format, &mut out)
            .map_err(|e| GameError::asset(format!("Cannot export map {}", path.display()), e))?;
        out.flush().map_err(|e| GameError::io(path, e))
    }

    /// How texture collections are stored
    pub fn texture_package_type(&self) -> GameResult<TexturePackageType> {
        match self.config.textures.package.package_type {
            TexturePackageType::Unset => Err(GameError::Config(
                "texture package type is not set".to_string(),
            )),
            package_type => Ok(package_type),
        }
    }

    /// Load the texture collections listed on `world`
    pub fn load_texture_collections(
        &self,
        world: &World,
        document_path: &Path,
        loader: &mut dyn TextureLoader,
    ) -> GameResult<()> {
        let collections = self.extract_texture_collections(world);
        let search_paths = self.texture_collection_search_paths(document_path);
        debug!(
            "Loading {} texture collections for {}",
            collections.len(),
            document_path.display()
        );
        loader
            .load_texture_collections(&self.fs, &search_paths, &self.config.textures, &collections)
            .map_err(|e| GameError::asset("Cannot load texture collections", e))
    }

    /// Directories searched for texture collections given by a relative
    /// path: the document's directory, the game path, then the application
    /// directory
    pub fn texture_collection_search_paths(&self, document_path: &Path) -> Vec<PathBuf> {
        let document_dir = document_path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);
        std::iter::once(document_dir)
            .chain(std::iter::once(self.game_path.clone()))
            .chain(system_paths::app_directory())
            .collect()
    }

    /// Whether `path` is a texture collection file
    pub fn is_texture_collection(&self, path: &VfsPath) -> bool {
        let package = &self.config.textures.package;
        match package.package_type {
            TexturePackageType::File => path.has_extension(&package.extension),
            TexturePackageType::Directory | TexturePackageType::Unset => false,
        }
    }

    /// Texture collection directories below the configured texture root
    pub fn find_texture_collections(&self) -> GameResult<Vec<VfsPath>> {
        let root = &self.config.textures.package.root_directory;
        if root.is_empty() {
            return Ok(Vec::new());
        }
        let root = VfsPath::new(root);
        if !self.fs.directory_exists(&root) {
            return Ok(Vec::new());
        }
        self.fs
            .find_items(&root, &TypeMatcher::DIRECTORIES)
            .map_err(|e| GameError::asset("Cannot find texture collections", e))
    }

    /// Texture collections listed on `world`
    pub fn extract_texture_collections<N>(&self, world: &N) -> Vec<String>
    where
        N: AttributableNode + ?Sized,
    {
        attributes::read_path_list(world, &self.config.textures.attribute)
    }

    /// List `paths` as the texture collections of `world`
    pub fn update_texture_collections<N, S>(&self, world: &mut N, paths: &[S])
    where
        N: AttributableNode + ?Sized,
        S: AsRef<str>,
    {
        attributes::write_path_list(world, &self.config.textures.attribute, paths);
    }

    /// Whether `path` has an entity definition extension (`fgd`, `def`)
    pub fn is_entity_definition_file(&self, path: &Path) -> bool {
        definition_format(path).is_some()
    }

    /// Parse the entity definition file at `path`
    pub fn load_entity_definitions<P>(
        &self,
        parser: &P,
        path: &Path,
    ) -> GameResult<Vec<P::Definition>>
    where
        P: EntityDefinitionParser + ?Sized,
    {
        let format = definition_format(path).ok_or_else(|| {
            GameError::UnsupportedFormat(format!("entity definitions {}", path.display()))
        })?;
        let data = disk::map_file(path).map_err(|e| GameError::io(path, e))?;
        debug!("Parsing {:?} entity definitions {}", format, path.display());
        parser
            .parse_definitions(format, &data, self.config.entities.default_color)
            .map_err(|e| {
                GameError::asset(
                    format!("Cannot load entity definitions {}", path.display()),
                    e,
                )
            })
    }

    /// Bundled entity definition files
    pub fn all_entity_definition_files(&self) -> Vec<EntityDefinitionFileSpec> {
        self.config
            .entities
            .definition_files
            .iter()
            .map(EntityDefinitionFileSpec::builtin)
            .collect()
    }

    /// Entity definition file selected on `world`, or the default
    pub fn extract_entity_definition_file<N>(&self, world: &N) -> GameResult<EntityDefinitionFileSpec>
    where
        N: AttributableNode + ?Sized,
    {
        match world.attribute(attributes::ENTITY_DEFINITIONS) {
            Some(value) if !value.trim().is_empty() => EntityDefinitionFileSpec::parse(value),
            _ => self.default_entity_definition_file(),
        }
    }

    /// First bundled entity definition file
    pub fn default_entity_definition_file(&self) -> GameResult<EntityDefinitionFileSpec> {
        self.config
            .entities
            .definition_files
            .first()
            .map(EntityDefinitionFileSpec::builtin)
            .ok_or_else(|| {
                GameError::Config(format!(
                    "no entity definition files configured for {}",
                    self.config.name
                ))
            })
    }

    /// Locate the file `spec` refers to.
    ///
    /// Builtin files are resolved next to the configuration file. External
    /// absolute paths are returned as given; relative ones are looked up in
    /// `search_paths` in order.
    pub fn find_entity_definition_file(
        &self,
        spec: &EntityDefinitionFileSpec,
        search_paths: &[PathBuf],
    ) -> GameResult<PathBuf> {
        match spec {
            EntityDefinitionFileSpec::Unset => {
                Err(GameError::InvalidSpec("no entity definition file".to_string()))
            }
            EntityDefinitionFileSpec::Builtin(path) => {
                let found = self.config.find_config_file(path);
                if found.is_file() {
                    Ok(found)
                } else {
                    Err(GameError::NotFound(found.display().to_string()))
                }
            }
            EntityDefinitionFileSpec::External(path) if path.is_absolute() => Ok(path.clone()),
            EntityDefinitionFileSpec::External(path) => {
                resolve_path(search_paths, &VfsPath::from(path.as_path()))
                    .filter(|found| found.is_file())
                    .ok_or_else(|| GameError::NotFound(path.display().to_string()))
            }
        }
    }

    /// Parse the model at `path` in the virtual file system.
    ///
    /// The format is chosen by extension and must be enabled in the
    /// configuration. Lookup, palette, and parse failures are reported as
    /// [`GameError::Asset`].
    pub fn load_entity_model(&self, path: &VfsPath) -> GameResult<EntityModel> {
        let context = || format!("Cannot load model {path}");
        let file = self
            .fs
            .open_file(path)
            .map_err(|e| GameError::asset(context(), e))?;

        let name = path.last_component().unwrap_or_default();
        let extension = path.extension().map(strings::to_lower).unwrap_or_default();
        if !self.config.entities.supports_model_format(&extension) {
            return Err(GameError::UnsupportedFormat(format!("model {path}")));
        }

        let palette = self
            .load_texture_palette()
            .map_err(|e| GameError::asset(context(), e))?;
        debug!("Parsing {} model {}", extension, path);
        let model = match extension.as_str() {
            "mdl" => MdlParser::new(name, &file, &palette).parse_model(),
            "md2" => Md2Parser::new(name, &file, &palette, &self.fs).parse_model(),
            "bsp" => BspParser::new(name, &file, &palette).parse_model(),
            _ => return Err(GameError::UnsupportedFormat(format!("model {path}"))),
        };
        model.map_err(|e| GameError::asset(context(), e))
    }

    /// Palette at the configured path in the virtual file system
    pub fn load_texture_palette(&self) -> GameResult<Palette> {
        let path = &self.config.textures.palette;
        if path.is_empty() {
            return Err(GameError::Config("no palette configured".to_string()));
        }
        let file = self.fs.open_file(&VfsPath::new(path))?;
        Palette::parse(&file).map_err(|e| GameError::asset(format!("Cannot load palette {path}"), e))
    }

    /// Brush content types
    pub fn brush_content_types(&self) -> &[BrushContentType] {
        &self.config.brush_content_types
    }

    /// Surface flags
    pub const fn surface_flags(&self) -> &FlagsConfig {
        &self.config.face_attributes.surface_flags
    }

    /// Content flags
    pub const fn content_flags(&self) -> &FlagsConfig {
        &self.config.face_attributes.content_flags
    }

    /// Directories in the game path other than the default content
    /// directory, sorted without regard to case
    pub fn available_mods(&self) -> GameResult<Vec<String>> {
        if self.game_path.as_os_str().is_empty() || !self.game_path.is_dir() {
            return Ok(Vec::new());
        }
        let default_mod = VfsPath::new(&self.config.file_system.search_path);
        let default_mod = default_mod.last_component().unwrap_or_default();

        let mut mods: Vec<String> = DiskFileSystem::new(&self.game_path)
            .find_items(&VfsPath::root(), &TypeMatcher::DIRECTORIES)?
            .iter()
            .filter_map(|dir| dir.last_component())
            .filter(|name| !strings::case_insensitive_equal(name, default_mod))
            .map(str::to_string)
            .collect();
        strings::sort_case_insensitive(&mut mods);
        debug!("Found {} mods in {}", mods.len(), self.game_path.display());
        Ok(mods)
    }

    /// Mods enabled on `world`
    pub fn extract_enabled_mods<N>(&self, world: &N) -> Vec<String>
    where
        N: AttributableNode + ?Sized,
    {
        attributes::extract_enabled_mods(world)
    }

    /// Default content directory
    pub fn default_mod(&self) -> &str {
        &self.config.file_system.search_path
    }

    /// Store `value` on `node` split into numbered attributes
    pub fn write_long_attribute<N>(
        &self,
        node: &mut N,
        base: &str,
        value: &str,
        max_length: NonZeroUsize,
    ) where
        N: AttributableNode + ?Sized,
    {
        attributes::write_long_attribute(node, base, value, max_length);
    }

    /// Reassemble a value stored with [`Game::write_long_attribute`]
    pub fn read_long_attribute<N>(&self, node: &N, base: &str) -> String
    where
        N: AttributableNode + ?Sized,
    {
        attributes::read_long_attribute(node, base)
    }
}

fn definition_format(path: &Path) -> Option<EntityDefinitionFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(EntityDefinitionFormat::from_extension)
}


/// Build the provider stack for `game_path`: the default search directory,
/// then each additional search path, then the packages found in each of
/// those directories. Nothing is mounted for an empty or missing game path.
fn mount_file_system(
    config: &GameConfig,
    game_path: &Path,
    additional_search_paths: &[PathBuf],
) -> GameResult<LayeredFileSystem> {
    let mut fs = LayeredFileSystem::new();
    if game_path.as_os_str().is_empty() {
        debug!("No game path set for {}", config.name);
        return Ok(fs);
    }
    if !game_path.is_dir() {
        warn!(
            "Game path {} for {} is not a directory",
            game_path.display(),
            config.name
        );
        return Ok(fs);
    }

    let search_dirs: Vec<PathBuf> = std::iter::once(Path::new(&config.file_system.search_path))
        .chain(additional_search_paths.iter().map(PathBuf::as_path))
        .map(|dir| game_path.join(dir))
        .collect();

    for dir in &search_dirs {
        fs.add_provider(Provider::Disk(DiskFileSystem::new(dir.clone())));
    }
    for dir in &search_dirs {
        add_packages(&mut fs, config, dir)?;
    }

    info!(
        "Mounted {} providers for {} from {}",
        fs.provider_count(),
        config.name,
        game_path.display()
    );
    Ok(fs)
}

fn add_packages(fs: &mut LayeredFileSystem, config: &GameConfig, dir: &Path) -> GameResult<()> {
    if !dir.is_dir() {
        debug!("Search path {} does not exist", dir.display());
        return Ok(());
    }

    let package = &config.file_system.package_format;
    let disk = DiskFileSystem::new(dir);
    let mut packages = disk.find_items(
        &VfsPath::root(),
        &ExtensionMatcher::single(&package.extension),
    )?;
    if packages.is_empty() {
        return Ok(());
    }
    packages.sort_by_cached_key(VfsPath::key);

    let format = PackageFormat::from_name(&package.format)?;
    for path in packages {
        let native = path.to_native(dir);
        debug!("Found {} package {}", format.name(), native.display());
        let provider = match format {
            PackageFormat::IdPak => Provider::Pak(PakFileSystem::open(&native)?),
        };
        fs.add_provider(provider);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::TexturePackageConfig;
    use levelkit_test_utils::GameTree;

    fn quake() -> GameConfig {
        GameConfig::new("Quake")
            .with_palette("gfx/palette.lmp")
            .with_texture_attribute("wad")
            .with_texture_package(TexturePackageConfig::file("wad"))
            .with_model_formats(["mdl", "bsp"])
    }

    #[test]
    fn test_empty_game_path_mounts_nothing() {
        let game = Game::new(quake(), "").unwrap();
        assert!(game.file_system().is_empty());
        assert!(matches!(
            game.load_texture_palette(),
            Err(GameError::NotFound(_))
        ));
        assert!(game.available_mods().unwrap().is_empty());
    }

    #[test]
    fn test_missing_game_path_mounts_nothing() {
        let tree = GameTree::new().unwrap();
        let game = Game::new(quake(), tree.join("missing")).unwrap();
        assert!(game.file_system().is_empty());
    }

    #[test]
    fn test_set_game_path_remounts() {
        let tree = GameTree::new().unwrap();
        tree.file("id1/gfx/palette.lmp", &[0u8; 768]).unwrap();
        let mut game = Game::new(quake(), "").unwrap();
        game.set_game_path(tree.path()).unwrap();
        assert_eq!(game.file_system().provider_count(), 1);
        assert!(game.load_texture_palette().is_ok());
        game.set_game_path("").unwrap();
        assert!(game.file_system().is_empty());
    }

    #[test]
    fn test_texture_package_type() {
        let game = Game::new(quake(), "").unwrap();
        assert_eq!(game.texture_package_type().unwrap(), TexturePackageType::File);
        assert!(game.is_texture_collection(&VfsPath::new("gfx/BASE.WAD")));
        assert!(!game.is_texture_collection(&VfsPath::new("gfx/base.pak")));

        let unset = Game::new(GameConfig::new("Unset"), "").unwrap();
        assert!(matches!(
            unset.texture_package_type(),
            Err(GameError::Config(_))
        ));
    }

    #[test]
    fn test_texture_collection_search_paths() {
        let game = Game::new(quake(), "/games/quake").unwrap();
        let paths = game.texture_collection_search_paths(Path::new("/maps/e1m1.map"));
        assert_eq!(paths[0], PathBuf::from("/maps"));
        assert_eq!(paths[1], PathBuf::from("/games/quake"));
    }

    #[test]
    fn test_default_entity_definition_file() {
        let game = Game::new(quake(), "").unwrap();
        assert!(matches!(
            game.default_entity_definition_file(),
            Err(GameError::Config(_))
        ));

        let config = quake().with_entity_definition_files(["Quake.fgd", "Quoth2.fgd"]);
        let game = Game::new(config, "").unwrap();
        assert_eq!(
            game.default_entity_definition_file().unwrap(),
            EntityDefinitionFileSpec::builtin("Quake.fgd")
        );
        assert_eq!(game.all_entity_definition_files().len(), 2);

        let mut world = World::new(MapFormat::Standard);
        assert_eq!(
            game.extract_entity_definition_file(&world).unwrap(),
            EntityDefinitionFileSpec::builtin("Quake.fgd")
        );
        world.add_or_update_attribute(attributes::ENTITY_DEFINITIONS, "external:/defs/ad.fgd");
        assert_eq!(
            game.extract_entity_definition_file(&world).unwrap(),
            EntityDefinitionFileSpec::external("/defs/ad.fgd")
        );
    }

    #[test]
    fn test_default_mod() {
        let game = Game::new(quake().with_search_path("id1"), "").unwrap();
        assert_eq!(game.default_mod(), "id1");
    }
}
