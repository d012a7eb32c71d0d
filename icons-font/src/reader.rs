//! Positioned big-endian reader over an immutable byte view.

use crate::error::{FontError, FontResult};

/// Seconds between 1904-01-01 (the sfnt `LONGDATETIME` epoch) and 1970-01-01.
const LONGDATETIME_TO_UNIX: i64 = 2_082_844_800;

/// A cursor over a borrowed byte slice.
///
/// All multi-byte reads are big-endian, as everywhere in the sfnt container.
/// Sub-views created with [`Reader::view`] share the underlying buffer
/// without copying. Reads never cross the end of the view; doing so fails
/// with [`FontError::Truncated`].
#[derive(Clone, Debug, PartialEq)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor to an absolute offset.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Advances the cursor without touching the bytes.
    pub fn skip(&mut self, len: usize) {
        self.pos += len;
    }

    /// An independent reader over `[start, end)` of this view.
    pub fn view(&self, start: usize, end: usize) -> FontResult<Reader<'a>> {
        self.data
            .get(start..end)
            .map(Reader::new)
            .ok_or(FontError::Truncated)
    }

    pub fn read_bytes(&mut self, len: usize) -> FontResult<&'a [u8]> {
        let bytes = self
            .data
            .get(self.pos..self.pos + len)
            .ok_or(FontError::Truncated)?;
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> FontResult<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_i8(&mut self) -> FontResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> FontResult<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_i16(&mut self) -> FontResult<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> FontResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i32(&mut self) -> FontResult<i32> {
        Ok(self.read_u32()? as i32)
    }

    pub fn read_u64(&mut self) -> FontResult<u64> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    pub fn read_i64(&mut self) -> FontResult<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// 16.16 signed fixed-point number.
    pub fn read_fixed(&mut self) -> FontResult<f64> {
        Ok(f64::from(self.read_i32()?) / 65536.0)
    }

    /// 2.14 signed fixed-point number.
    pub fn read_f2dot14(&mut self) -> FontResult<f64> {
        Ok(f64::from(self.read_i16()?) / 16384.0)
    }

    /// `LONGDATETIME` converted to Unix-epoch seconds.
    pub fn read_longdatetime(&mut self) -> FontResult<i64> {
        Ok(self.read_i64()? - LONGDATETIME_TO_UNIX)
    }

    /// `len` bytes decoded as UTF-16 big-endian.
    pub fn read_utf16_be(&mut self, len: usize) -> FontResult<String> {
        let units = self
            .read_bytes(len)?
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect::<Vec<_>>();
        Ok(String::from_utf16_lossy(&units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_scalars() {
        let data = [0x00, 0x01, 0xFF, 0xFE, 0x80, 0x00, 0x00, 0x2A];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 1);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_i16().unwrap(), i16::MIN);
        assert_eq!(r.read_u16().unwrap(), 42);
        assert_eq!(r.read_u8(), Err(FontError::Truncated));
    }

    #[test]
    fn seek_makes_reads_repeatable() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_u32().unwrap(), 0x1234_5678);
        r.seek(2);
        assert_eq!(r.read_u16().unwrap(), 0x5678);
        r.seek(2);
        assert_eq!(r.read_u16().unwrap(), 0x5678);
    }

    #[test]
    fn view_bounds() {
        let data = [1, 2, 3, 4, 5];
        let r = Reader::new(&data);
        let sub = r.view(1, 4).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(r.view(3, 6), Err(FontError::Truncated));

        let mut sub = sub;
        sub.seek(2);
        assert_eq!(sub.read_u8().unwrap(), 4);
        assert_eq!(sub.read_u8(), Err(FontError::Truncated));
    }

    #[test]
    fn fixed_point_formats() {
        let data = [0x00, 0x02, 0x00, 0x00, 0x70, 0x00, 0xC0, 0x00];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_fixed().unwrap(), 2.0);
        assert_eq!(r.read_f2dot14().unwrap(), 1.75);
        assert_eq!(r.read_f2dot14().unwrap(), -1.0);
    }

    #[test]
    fn longdatetime_epoch() {
        // 1970-01-01 expressed in seconds since 1904-01-01.
        let raw = 2_082_844_800_i64.to_be_bytes();
        let mut r = Reader::new(&raw);
        assert_eq!(r.read_longdatetime().unwrap(), 0);
    }

    #[test]
    fn utf16_strings() {
        let data = [0x00, b'I', 0x00, b'c', 0x00, b'o', 0x00, b'n'];
        let mut r = Reader::new(&data);
        assert_eq!(r.read_utf16_be(8).unwrap(), "Icon");
    }
}
