//! Round trip properties of the attributes stored on a map's root entity

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::num::NonZeroUsize;

use levelkit_game::attributes::{read_long_attribute, write_long_attribute};
use levelkit_game::{AttributableNode, EntityAttributes, Game, GameConfig, MapFormat, World};
use proptest::prelude::*;

fn game() -> Game {
    Game::new(GameConfig::new("Quake").with_texture_attribute("wad"), "").unwrap()
}

fn collection_path() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./-]{1,24}".prop_filter("no surrounding whitespace", |p| p.trim() == p)
}

proptest! {
    #[test]
    fn long_attribute_round_trips(value in ".{0,200}", max_length in 1usize..64) {
        let mut node = EntityAttributes::new();
        let max_length = NonZeroUsize::new(max_length).unwrap();
        write_long_attribute(&mut node, "message", &value, max_length);

        for name in node.attribute_names() {
            let chunk = node.attribute(&name).unwrap();
            prop_assert!(chunk.chars().count() <= max_length.get());
        }
        prop_assert_eq!(read_long_attribute(&node, "message"), value);
    }

    #[test]
    fn long_attribute_overwrite_leaves_no_stale_chunks(
        first in ".{0,120}",
        second in ".{0,120}",
        max_length in 1usize..16,
    ) {
        let game = game();
        let mut world = World::new(MapFormat::Standard);
        let max_length = NonZeroUsize::new(max_length).unwrap();
        game.write_long_attribute(&mut world, "message", &first, max_length);
        game.write_long_attribute(&mut world, "message", &second, max_length);
        prop_assert_eq!(game.read_long_attribute(&world, "message"), second);
    }

    #[test]
    fn texture_collections_round_trip(paths in prop::collection::vec(collection_path(), 0..8)) {
        let game = game();
        let mut world = World::new(MapFormat::Standard);
        game.update_texture_collections(&mut world, &paths);
        let stored = world.attribute("wad").unwrap().to_string();

        let extracted = game.extract_texture_collections(&world);
        prop_assert_eq!(&extracted, &paths);

        game.update_texture_collections(&mut world, &extracted);
        prop_assert_eq!(world.attribute("wad").unwrap(), stored.as_str());
    }
}
