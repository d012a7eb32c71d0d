//! Glyph index-to-location table.
//!
//! Stores `glyph_count + 1` byte offsets into `glyf`; consecutive pairs
//! delimit one glyph each. Short-format offsets are stored halved.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/loca>

use crate::error::FontResult;
use crate::reader::Reader;

pub(crate) fn parse(
    mut r: Reader<'_>,
    glyph_count: u16,
    index_to_loc_format: i16,
) -> FontResult<Vec<u32>> {
    let count = usize::from(glyph_count) + 1;
    let mut offsets = Vec::with_capacity(count);
    if index_to_loc_format == 0 {
        for _ in 0..count {
            offsets.push(u32::from(r.read_u16()?) * 2);
        }
    } else {
        for _ in 0..count {
            offsets.push(r.read_u32()?);
        }
    }
    Ok(offsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_offsets_are_doubled() {
        let data: Vec<u8> = [0u16, 10, 25]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        let offsets = parse(Reader::new(&data), 2, 0).unwrap();
        assert_eq!(offsets, vec![0, 20, 50]);
    }

    #[test]
    fn long_offsets_are_verbatim() {
        let data: Vec<u8> = [0u32, 10, 25]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        let offsets = parse(Reader::new(&data), 2, 1).unwrap();
        assert_eq!(offsets, vec![0, 10, 25]);
    }
}
