//! Integration tests for the levelkit CLI

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use levelkit_test_utils::{GameTree, PakBuilder, gray_palette};
use predicates::prelude::*;

fn levelkit() -> Command {
    let mut cmd = Command::cargo_bin("levelkit").unwrap();
    cmd.env_remove("LEVELKIT_GAME_PATH")
        .env_remove("LEVELKIT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn quake_tree() -> GameTree {
    let tree = GameTree::new().unwrap();
    tree.file("id1/autoexec.cfg", b"id1").unwrap();
    tree.file("mymod/autoexec.cfg", b"mymod").unwrap();
    let pak = PakBuilder::new()
        .file("gfx/palette.lmp", &gray_palette())
        .file("progs/armor.mdl", b"not a model")
        .build();
    tree.file("id1/pak0.pak", &pak).unwrap();
    tree
}

#[test]
fn test_help_command() {
    levelkit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("ls"))
        .stdout(predicate::str::contains("cat"))
        .stdout(predicate::str::contains("model"))
        .stdout(predicate::str::contains("mods"))
        .stdout(predicate::str::contains("palette"));
}

#[test]
fn test_version_command() {
    levelkit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("levelkit"));
}

#[test]
fn test_requires_game_path() {
    levelkit()
        .arg("mods")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No game path given"));
}

#[test]
fn test_ls_merges_archive() {
    let tree = quake_tree();
    levelkit()
        .args(["ls", "--game-path"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout("autoexec.cfg\ngfx/\npak0.pak\nprogs/\n");
}

#[test]
fn test_cat_uses_search_path_override() {
    let tree = quake_tree();
    levelkit()
        .env("LEVELKIT_GAME_PATH", tree.path())
        .args(["cat", "AUTOEXEC.CFG", "--search-path", "mymod"])
        .assert()
        .success()
        .stdout("mymod");
}

#[test]
fn test_model_error_names_path() {
    let tree = quake_tree();
    levelkit()
        .env("LEVELKIT_GAME_PATH", tree.path())
        .args(["model", "progs/armor.mdl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("progs/armor.mdl"));
}

#[test]
fn test_palette_with_config_file() {
    let tree = quake_tree();
    let config = tree
        .file(
            "GameConfig.json",
            br#"{ "name": "Quake", "textures": { "palette": "gfx/palette.lmp" } }"#,
        )
        .unwrap();
    levelkit()
        .env("LEVELKIT_GAME_PATH", tree.path())
        .arg("--config")
        .arg(config)
        .arg("palette")
        .assert()
        .success()
        .stdout("gfx/palette.lmp: 256 colors\n");
}
