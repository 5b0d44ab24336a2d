//! Package archive container (`PACK`)
//!
//! ```text
//! +------------------+ 0
//! | "PACK"           |
//! | directory offset |  i32
//! | directory length |  i32
//! +------------------+ 12
//! | member data ...  |
//! +------------------+ directory offset
//! | name[56] off len |  64 bytes per entry
//! | ...              |
//! +------------------+
//! ```
//!
//! Member names are relative paths using `/`, compared case-insensitively.

mod error;
mod header;

pub use error::{PakError, PakResult};
pub use header::{
    PAK_ENTRY_SIZE, PAK_HEADER_SIZE, PAK_MAGIC, PAK_NAME_SIZE, PakDirectoryEntry, PakHeader,
};

use binrw::BinRead;
use std::collections::HashMap;
use std::io::Cursor;
use std::ops::Range;

/// A validated archive member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Member path as stored, with `\` normalized to `/`
    pub name: String,
    /// Offset of the member data within the container
    pub offset: usize,
    /// Length of the member data
    pub length: usize,
}

impl PakEntry {
    /// Byte range of the member within the container
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Parsed archive index.
///
/// Every entry's range is inside the container the index was parsed from.
#[derive(Debug, Clone, Default)]
pub struct PakArchive {
    entries: Vec<PakEntry>,
    lookup: HashMap<String, usize>,
}

impl PakArchive {
    /// Parse the header and directory of an archive
    pub fn parse(data: &[u8]) -> PakResult<Self> {
        if data.len() < PAK_HEADER_SIZE {
            return Err(PakError::TruncatedHeader { size: data.len() });
        }

        let header = PakHeader::read(&mut Cursor::new(&data[..PAK_HEADER_SIZE]))?;
        if header.magic != PAK_MAGIC {
            return Err(PakError::InvalidSignature(header.magic));
        }

        let directory_offset = non_negative("directory offset", header.directory_offset)?;
        let directory_length = non_negative("directory length", header.directory_length)?;
        if directory_length % PAK_ENTRY_SIZE != 0 {
            return Err(PakError::InvalidDirectoryLength(directory_length));
        }

        let directory = directory_offset
            .checked_add(directory_length)
            .and_then(|end| data.get(directory_offset..end))
            .ok_or(PakError::TruncatedIndex {
                offset: directory_offset,
                length: directory_length,
                size: data.len(),
            })?;

        let mut archive = Self::default();
        let mut cursor = Cursor::new(directory);
        for _ in 0..directory_length / PAK_ENTRY_SIZE {
            let raw = PakDirectoryEntry::read(&mut cursor)?;
            let entry = validate_entry(&raw, data.len())?;
            archive.insert(entry);
        }

        Ok(archive)
    }

    fn insert(&mut self, entry: PakEntry) {
        let key = entry.name.to_ascii_lowercase();
        if let Some(&index) = self.lookup.get(&key) {
            // Later directory entries shadow earlier ones with the same name
            self.entries[index] = entry;
        } else {
            self.lookup.insert(key, self.entries.len());
            self.entries.push(entry);
        }
    }

    /// All members in directory order
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the archive has no members
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find a member by path, ignoring case
    pub fn find(&self, name: &str) -> Option<&PakEntry> {
        let key = normalize_name(name).to_ascii_lowercase();
        self.lookup.get(&key).map(|&index| &self.entries[index])
    }
}

fn non_negative(field: &'static str, value: i32) -> PakResult<usize> {
    usize::try_from(value).map_err(|_| PakError::InvalidHeaderField { field, value })
}

fn validate_entry(raw: &PakDirectoryEntry, size: usize) -> PakResult<PakEntry> {
    let end = raw.name.iter().position(|&b| b == 0).unwrap_or(PAK_NAME_SIZE);
    let name = normalize_name(&String::from_utf8_lossy(&raw.name[..end]));

    let out_of_bounds = || PakError::EntryOutOfBounds {
        name: name.clone(),
        offset: i64::from(raw.offset),
        length: i64::from(raw.length),
        size,
    };

    let offset = usize::try_from(raw.offset).map_err(|_| out_of_bounds())?;
    let length = usize::try_from(raw.length).map_err(|_| out_of_bounds())?;
    match offset.checked_add(length) {
        Some(end) if end <= size => Ok(PakEntry {
            name,
            offset,
            length,
        }),
        _ => Err(out_of_bounds()),
    }
}

fn normalize_name(name: &str) -> String {
    name.replace('\\', "/").trim_start_matches('/').to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use levelkit_test_utils::PakBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_members() {
        let data = PakBuilder::new()
            .file("progs/player.mdl", b"model")
            .file("maps/e1m1.bsp", b"bsp data")
            .build();

        let archive = PakArchive::parse(&data).unwrap();
        assert_eq!(archive.len(), 2);

        let entry = archive.find("progs/player.mdl").unwrap();
        assert_eq!(&data[entry.range()], b"model");
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let data = PakBuilder::new().file("gfx/Palette.lmp", &[0; 4]).build();
        let archive = PakArchive::parse(&data).unwrap();
        assert!(archive.find("GFX/palette.LMP").is_some());
        assert!(archive.find("gfx\\palette.lmp").is_some());
        assert_eq!(archive.entries()[0].name, "gfx/Palette.lmp");
    }

    #[test]
    fn test_duplicate_member_later_wins() {
        let data = PakBuilder::new()
            .file("a.txt", b"first")
            .file("A.TXT", b"second")
            .build();
        let archive = PakArchive::parse(&data).unwrap();
        assert_eq!(archive.len(), 1);
        let entry = archive.find("a.txt").unwrap();
        assert_eq!(&data[entry.range()], b"second");
    }

    #[test]
    fn test_empty_archive() {
        let data = PakBuilder::new().build();
        let archive = PakArchive::parse(&data).unwrap();
        assert!(archive.is_empty());
    }

    #[test]
    fn test_rejects_bad_signature() {
        let mut data = PakBuilder::new().file("a", b"x").build();
        data[0] = b'Z';
        assert!(matches!(
            PakArchive::parse(&data),
            Err(PakError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_rejects_short_header() {
        assert!(matches!(
            PakArchive::parse(b"PACK\0\0"),
            Err(PakError::TruncatedHeader { size: 6 })
        ));
    }

    #[test]
    fn test_rejects_truncated_directory() {
        let data = PakBuilder::new()
            .file("a.txt", b"aaaa")
            .file("b.txt", b"bbbb")
            .build();
        // Cut the container in the middle of the second directory entry
        let cut = &data[..data.len() - PAK_ENTRY_SIZE / 2];
        let err = PakArchive::parse(cut).unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn test_rejects_member_out_of_bounds() {
        let mut data = PakBuilder::new().file("a.txt", b"abc").build();
        // Directory starts right after the data; patch the member length
        let dir = PAK_HEADER_SIZE + 3;
        let length_field = dir + PAK_NAME_SIZE + 4;
        data[length_field..length_field + 4].copy_from_slice(&1000i32.to_le_bytes());
        assert!(matches!(
            PakArchive::parse(&data),
            Err(PakError::EntryOutOfBounds { length: 1000, .. })
        ));
    }

    #[test]
    fn test_rejects_negative_directory_offset() {
        let mut data = PakBuilder::new().build();
        data[4..8].copy_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(
            PakArchive::parse(&data),
            Err(PakError::InvalidHeaderField { value: -1, .. })
        ));
    }

    #[test]
    fn test_rejects_partial_entry_length() {
        let mut data = PakBuilder::new().file("a", b"x").build();
        data[8..12].copy_from_slice(&63i32.to_le_bytes());
        assert!(matches!(
            PakArchive::parse(&data),
            Err(PakError::InvalidDirectoryLength(63))
        ));
    }
}
