//! Bounds-checked little-endian reader over a byte slice

use crate::model::{AssetError, AssetResult};
use binrw::BinRead;
use std::io::Cursor;

/// Cursor over a borrowed slice. Every read checks the remaining length
/// first and reports [`AssetError::Truncated`] instead of reading past the end.
#[derive(Debug, Clone)]
pub(crate) struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Reader positioned at `offset`
    pub(crate) fn at(data: &'a [u8], offset: usize) -> AssetResult<Self> {
        let mut reader = Self::new(data);
        reader.seek(offset)?;
        Ok(reader)
    }

    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    pub(crate) const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub(crate) fn seek(&mut self, offset: usize) -> AssetResult<()> {
        if offset > self.data.len() {
            return Err(AssetError::truncated(offset, 0, 0));
        }
        self.pos = offset;
        Ok(())
    }

    pub(crate) fn skip(&mut self, count: usize) -> AssetResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> AssetResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| AssetError::truncated(self.pos, count, self.remaining()))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> AssetResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> AssetResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub(crate) fn read_u16(&mut self) -> AssetResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_i16(&mut self) -> AssetResult<i16> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_u32(&mut self) -> AssetResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_i32(&mut self) -> AssetResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_f32(&mut self) -> AssetResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    pub(crate) fn read_vec3(&mut self) -> AssetResult<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Read a count field and reject negative values
    pub(crate) fn read_count(&mut self) -> AssetResult<usize> {
        let offset = self.pos;
        let value = self.read_i32()?;
        usize::try_from(value)
            .map_err(|_| AssetError::invalid_data(offset, format!("negative count {value}")))
    }

    /// Fixed-width NUL padded name
    pub(crate) fn read_name(&mut self, width: usize) -> AssetResult<String> {
        Ok(fixed_str(self.read_bytes(width)?))
    }

    /// Read a binrw header at the current position
    pub(crate) fn read_header<T>(&mut self, size: usize) -> AssetResult<T>
    where
        T: BinRead,
        for<'b> T::Args<'b>: Default,
    {
        let offset = self.pos;
        let bytes = self.read_bytes(size)?;
        T::read_le(&mut Cursor::new(bytes))
            .map_err(|e| AssetError::from_header_read(e, offset, size, bytes.len()))
    }
}

/// Decode a NUL padded name field, stopping at the first NUL
pub(crate) fn fixed_str(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Borrow `len` bytes at `offset`, checking the range against `data`
pub(crate) fn sub_slice(data: &[u8], offset: usize, len: usize) -> AssetResult<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| AssetError::truncated(offset, len, data.len().saturating_sub(offset)))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x01, 0x00, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x80, 0x3f];
        let mut reader = SliceReader::new(&data);
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert!((reader.read_f32().unwrap() - 1.0).abs() < f32::EPSILON);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_past_end_is_truncation() {
        let data = [1u8, 2, 3];
        let mut reader = SliceReader::new(&data);
        reader.skip(2).unwrap();
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(
            err,
            AssetError::Truncated {
                offset: 2,
                needed: 4,
                available: 1
            }
        ));
        // Failed read must not advance
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_negative_count_rejected() {
        let data = (-5i32).to_le_bytes();
        let mut reader = SliceReader::new(&data);
        assert!(matches!(
            reader.read_count(),
            Err(AssetError::InvalidData { offset: 0, .. })
        ));
    }

    #[test]
    fn test_fixed_str_stops_at_nul() {
        assert_eq!(fixed_str(b"skin\0\0garbage"), "skin");
        assert_eq!(fixed_str(b"full"), "full");
    }

    #[test]
    fn test_sub_slice_overflow() {
        let data = [0u8; 8];
        assert!(sub_slice(&data, 4, 4).is_ok());
        assert!(sub_slice(&data, 4, 5).is_err());
        assert!(sub_slice(&data, usize::MAX, 2).is_err());
    }
}
