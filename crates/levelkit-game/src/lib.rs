//! Game definition layer for a Quake-family level editor.
//!
//! A [`Game`] ties a [`GameConfig`] to an install directory. It mounts the
//! game's content into a layered virtual file system and answers the
//! questions the editor asks about a game:
//!
//! - **Models**: load `.mdl`, `.md2` and `.bsp` entity models by path
//! - **Textures**: find texture collections and track the ones a map uses
//! - **Entity definitions**: resolve builtin and external definition files
//! - **Mods**: list mod directories and the mods a map enables
//!
//! Map text parsing, texture management, and entity definition parsing are
//! supplied by the caller through the traits in [`document`].
//!
//! # Example
//!
//! ```rust,no_run
//! use levelkit_game::{Game, GameConfig};
//! use levelkit_vfs::VfsPath;
//!
//! # fn example() -> levelkit_game::GameResult<()> {
//! let config = GameConfig::new("Quake")
//!     .with_search_path("id1")
//!     .with_palette("gfx/palette.lmp")
//!     .with_model_formats(["mdl", "bsp"]);
//! let game = Game::new(config, "/games/quake")?;
//!
//! let model = game.load_entity_model(&VfsPath::new("progs/player.mdl"))?;
//! println!("{} frames", model.frames.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::must_use_candidate)]

pub mod attributes;
pub mod config;
pub mod document;
mod entity_def;
mod error;
mod game;
pub mod strings;
pub mod system_paths;

pub use config::{GameConfig, TexturePackageType};
pub use document::{AttributableNode, EntityAttributes, ExportFormat, MapFormat, World};
pub use entity_def::EntityDefinitionFileSpec;
pub use error::{GameError, GameResult};
pub use game::Game;
