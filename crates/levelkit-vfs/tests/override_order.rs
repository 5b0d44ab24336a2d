//! Merged namespace of a game directory, a mod directory, and an archive

#![allow(clippy::unwrap_used, clippy::expect_used)]

use levelkit_formats::pak::PakArchive;
use levelkit_test_utils::{GameTree, PakBuilder};
use levelkit_vfs::{
    DiskFileSystem, ExtensionMatcher, FileSystem, LayeredFileSystem, PakFileSystem, Provider,
    TypeMatcher, VfsError, VfsPath,
};
use pretty_assertions::assert_eq;

fn quake_tree() -> GameTree {
    let tree = GameTree::new().unwrap();
    tree.file("id1/autoexec.cfg", b"id1").unwrap();
    tree.file("id1/maps/start.bsp", b"id1 start").unwrap();
    tree.file("id1/progs/armor.mdl", b"id1 armor").unwrap();
    tree.file("mymod/autoexec.cfg", b"mymod").unwrap();
    tree.file("mymod/progs/armor.mdl", b"mymod armor").unwrap();
    tree.file("mymod/progs/custom.mdl", b"custom").unwrap();
    let pak = PakBuilder::new()
        .file("progs/armor.mdl", b"pak armor")
        .file("gfx/palette.lmp", &[0u8; 768])
        .build();
    tree.file("id1/pak0.pak", &pak).unwrap();
    tree
}

fn mount(tree: &GameTree) -> LayeredFileSystem {
    let mut fs = LayeredFileSystem::new();
    fs.add_provider(Provider::Disk(DiskFileSystem::new(tree.join("id1"))));
    fs.add_provider(Provider::Disk(DiskFileSystem::new(tree.join("mymod"))));
    fs.add_provider(Provider::Pak(
        PakFileSystem::open(&tree.join("id1/pak0.pak")).unwrap(),
    ));
    fs
}

fn read(fs: &LayeredFileSystem, path: &str) -> Vec<u8> {
    fs.open_file(&VfsPath::new(path)).unwrap().to_vec()
}

#[test]
fn archive_overrides_mod_overrides_game() {
    let tree = quake_tree();
    let fs = mount(&tree);

    assert_eq!(read(&fs, "maps/start.bsp"), b"id1 start");
    assert_eq!(read(&fs, "autoexec.cfg"), b"mymod");
    assert_eq!(read(&fs, "progs/armor.mdl"), b"pak armor");
    assert_eq!(read(&fs, "progs/custom.mdl"), b"custom");
    assert_eq!(read(&fs, "gfx/palette.lmp").len(), 768);
}

#[test]
fn merged_listing_has_each_name_once() {
    let tree = quake_tree();
    let fs = mount(&tree);

    let models: Vec<String> = fs
        .find_items(&VfsPath::new("progs"), &ExtensionMatcher::single("mdl"))
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(models, ["progs/armor.mdl", "progs/custom.mdl"]);

    let top: Vec<String> = fs
        .find_items(&VfsPath::root(), &TypeMatcher::DIRECTORIES)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(top, ["gfx", "maps", "progs"]);
}

#[test]
fn recursive_search_spans_providers() {
    let tree = quake_tree();
    let fs = mount(&tree);
    let mut found: Vec<String> = fs
        .find_items_recursively(&VfsPath::root(), &TypeMatcher::FILES)
        .unwrap()
        .iter()
        .map(VfsPath::key)
        .collect();
    found.sort();
    assert_eq!(
        found,
        [
            "autoexec.cfg",
            "gfx/palette.lmp",
            "maps/start.bsp",
            "pak0.pak",
            "progs/armor.mdl",
            "progs/custom.mdl",
        ]
    );
}

#[test]
fn absent_path_is_not_found() {
    let tree = quake_tree();
    let fs = mount(&tree);
    assert!(matches!(
        fs.open_file(&VfsPath::new("sound/missing.wav")),
        Err(VfsError::NotFound(_))
    ));
    assert!(matches!(
        fs.find_items(&VfsPath::new("sound"), &TypeMatcher::ALL),
        Err(VfsError::NotFound(_))
    ));
}

#[test]
fn truncated_archive_fails_to_mount() {
    let tree = GameTree::new().unwrap();
    let data = PakBuilder::new().file("a.txt", b"abc").build();
    let path = tree.file("id1/pak1.pak", &data[..data.len() - 1]).unwrap();
    assert!(PakArchive::parse(&data[..data.len() - 1]).is_err());
    assert!(matches!(
        PakFileSystem::open(&path),
        Err(VfsError::MalformedArchive { .. })
    ));
}
