//! Attributes the game layer stores on the map's root entity

use std::num::NonZeroUsize;

use crate::document::AttributableNode;
use crate::strings;

/// Entity definition file of the map (`builtin:<path>` or an external path)
pub const ENTITY_DEFINITIONS: &str = "_tb_def";

/// Enabled mods, `;` separated
pub const MODS: &str = "_tb_mod";

/// Separator of path lists stored in one attribute
pub const LIST_SEPARATOR: char = ';';

/// Store `value` as `base1`, `base2`, ... with at most `max_length`
/// characters each.
///
/// Existing numbered attributes of `base` are removed first. The last chunk
/// is empty when the length is an exact multiple of `max_length`, so an
/// empty value still produces `base1`.
pub fn write_long_attribute<N: AttributableNode + ?Sized>(
    node: &mut N,
    base: &str,
    value: &str,
    max_length: NonZeroUsize,
) {
    node.remove_numbered_attribute(base);

    let chars: Vec<char> = value.chars().collect();
    let max_length = max_length.get();
    for i in 0..=chars.len() / max_length {
        let start = i * max_length;
        let end = (start + max_length).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        node.add_or_update_attribute(&format!("{base}{}", i + 1), &chunk);
    }
}

/// Reassemble a value written by [`write_long_attribute`].
///
/// Chunks are read from index 1 upward and reading stops at the first
/// missing index.
pub fn read_long_attribute<N: AttributableNode + ?Sized>(node: &N, base: &str) -> String {
    let mut value = String::new();
    for index in 1usize.. {
        match node.attribute(&format!("{base}{index}")) {
            Some(chunk) => value.push_str(chunk),
            None => break,
        }
    }
    value
}

/// Paths listed in the `;` separated attribute `attribute`
pub fn read_path_list<N: AttributableNode + ?Sized>(node: &N, attribute: &str) -> Vec<String> {
    if attribute.is_empty() {
        return Vec::new();
    }
    node.attribute(attribute)
        .map(|value| strings::split_and_trim(value, LIST_SEPARATOR))
        .unwrap_or_default()
}

/// Store `paths` as a `;` separated list in `attribute`.
///
/// Backslashes are written as forward slashes. Nothing is written if
/// `attribute` is empty.
pub fn write_path_list<N, S>(node: &mut N, attribute: &str, paths: &[S])
where
    N: AttributableNode + ?Sized,
    S: AsRef<str>,
{
    if attribute.is_empty() {
        return;
    }
    let paths: Vec<String> = paths
        .iter()
        .map(|path| strings::replace_chars(path.as_ref(), "\\", "/"))
        .collect();
    node.add_or_update_attribute(attribute, &strings::join(&paths, ";"));
}

/// Mods enabled for the map
pub fn extract_enabled_mods<N: AttributableNode + ?Sized>(node: &N) -> Vec<String> {
    read_path_list(node, MODS)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::{EntityAttributes, MapFormat, World};
    use pretty_assertions::assert_eq;

    fn max(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_chunks() {
        let mut node = EntityAttributes::new();
        write_long_attribute(&mut node, "msg", "abcdefg", max(3));
        assert_eq!(node.attribute("msg1"), Some("abc"));
        assert_eq!(node.attribute("msg2"), Some("def"));
        assert_eq!(node.attribute("msg3"), Some("g"));
        assert!(!node.has_attribute("msg4"));
    }

    #[test]
    fn test_exact_multiple_writes_empty_tail() {
        let mut node = EntityAttributes::new();
        write_long_attribute(&mut node, "msg", "abcdef", max(3));
        assert_eq!(node.attribute("msg3"), Some(""));
        assert_eq!(read_long_attribute(&node, "msg"), "abcdef");
    }

    #[test]
    fn test_rewrite_removes_stale_chunks() {
        let mut node = EntityAttributes::new();
        write_long_attribute(&mut node, "msg", "a long message", max(2));
        write_long_attribute(&mut node, "msg", "short", max(10));
        assert_eq!(node.len(), 1);
        assert_eq!(read_long_attribute(&node, "msg"), "short");
    }

    #[test]
    fn test_gap_truncates() {
        let mut node = EntityAttributes::new();
        write_long_attribute(&mut node, "msg", "aabbcc", max(2));
        node.remove_attribute("msg2");
        assert_eq!(read_long_attribute(&node, "msg"), "aa");
    }

    #[test]
    fn test_multibyte_chunks() {
        let mut node = EntityAttributes::new();
        write_long_attribute(&mut node, "msg", "héllo wörld", max(4));
        assert_eq!(node.attribute("msg1"), Some("héll"));
        assert_eq!(read_long_attribute(&node, "msg"), "héllo wörld");
    }

    #[test]
    fn test_path_list() {
        let mut world = World::new(MapFormat::Standard);
        assert!(read_path_list(&world, "wad").is_empty());
        write_path_list(&mut world, "wad", &["gfx\\base.wad", "gfx/start.wad"]);
        assert_eq!(world.attribute("wad"), Some("gfx/base.wad;gfx/start.wad"));
        assert_eq!(
            read_path_list(&world, "wad"),
            ["gfx/base.wad", "gfx/start.wad"]
        );
    }

    #[test]
    fn test_empty_attribute_name_is_ignored() {
        let mut world = World::new(MapFormat::Standard);
        write_path_list(&mut world, "", &["a.wad"]);
        assert!(world.attributes().is_empty());
        assert!(read_path_list(&world, "").is_empty());
    }

    #[test]
    fn test_enabled_mods() {
        let mut world = World::new(MapFormat::Standard);
        world.add_or_update_attribute(MODS, "quoth; ad ;");
        assert_eq!(extract_enabled_mods(&world), ["quoth", "ad"]);
    }
}
