//! ASCII string helpers shared by the configuration and attribute code.
//!
//! Case folding is ASCII only; game data and entity attributes are ASCII in
//! practice.

use std::cmp::Ordering;

/// Exact equality
pub fn case_sensitive_equal(a: &str, b: &str) -> bool {
    a == b
}

/// Equality ignoring ASCII case
pub fn case_insensitive_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Ordering ignoring ASCII case
pub fn case_insensitive_cmp(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}

/// Strip every character in `chars` from both ends of `s`
pub fn trim<'a>(s: &'a str, chars: &str) -> &'a str {
    s.trim_matches(|c| chars.contains(c))
}

/// Whether `s` starts with `prefix`
pub fn is_prefix(s: &str, prefix: &str) -> bool {
    s.starts_with(prefix)
}

/// Substring search
pub fn contains_case_sensitive(haystack: &str, needle: &str) -> bool {
    haystack.contains(needle)
}

/// Substring search ignoring ASCII case
pub fn contains_case_insensitive(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Sort in byte order
pub fn sort_case_sensitive(strings: &mut [String]) {
    strings.sort_unstable();
}

/// Sort ignoring ASCII case
pub fn sort_case_insensitive(strings: &mut [String]) {
    strings.sort_by(|a, b| case_insensitive_cmp(a, b));
}

/// Rolling string hash (`c + (h << 6) + (h << 16) - h`)
#[allow(clippy::cast_possible_wrap)] // Bytes are hashed as signed chars
pub fn make_hash(s: &str) -> i64 {
    s.bytes().fold(0i64, |hash, c| {
        i64::from(c as i8)
            .wrapping_add(hash.wrapping_shl(6))
            .wrapping_add(hash.wrapping_shl(16))
            .wrapping_sub(hash)
    })
}

/// ASCII lower case copy
pub fn to_lower(s: &str) -> String {
    s.to_ascii_lowercase()
}

/// Replace each occurrence of `needles[i]` with `replacements[i]`.
///
/// Returns `s` unchanged if the two sets differ in length.
pub fn replace_chars(s: &str, needles: &str, replacements: &str) -> String {
    let needles: Vec<char> = needles.chars().collect();
    let replacements: Vec<char> = replacements.chars().collect();
    if needles.len() != replacements.len() {
        return s.to_string();
    }
    s.chars()
        .map(|c| {
            needles
                .iter()
                .position(|&n| n == c)
                .map_or(c, |i| replacements[i])
        })
        .collect()
}

/// Upper-case the first letter of every whitespace separated word
pub fn capitalize(s: &str) -> String {
    let mut initial = true;
    s.chars()
        .map(|c| {
            if matches!(c, ' ' | '\n' | '\t' | '\r') {
                initial = true;
                c
            } else if initial {
                initial = false;
                c.to_ascii_uppercase()
            } else {
                c
            }
        })
        .collect()
}

/// Split on `delimiter`, trim whitespace, and drop empty pieces
pub fn split_and_trim(s: &str, delimiter: char) -> Vec<String> {
    s.split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join with `delimiter`
pub fn join<S: AsRef<str>>(items: &[S], delimiter: &str) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(delimiter)
}
