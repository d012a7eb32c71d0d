//! PostScript table, version 2 glyph names.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/post#version-20>

use std::collections::HashMap;

use crate::error::FontResult;
use crate::names::MACINTOSH_NAMES;
use crate::reader::Reader;

/// Name indices below this refer to the standard Macintosh list.
const STANDARD_NAME_COUNT: u16 = 258;

#[derive(Clone, Debug, Default)]
pub struct PostTable {
    pub glyph_names: HashMap<u16, String>,
}

impl PostTable {
    #[must_use]
    pub fn name(&self, glyph_id: u16) -> Option<&str> {
        self.glyph_names.get(&glyph_id).map(String::as_str)
    }
}

pub(crate) fn parse(mut r: Reader<'_>) -> FontResult<PostTable> {
    let version = r.read_fixed()?;
    if version != 2.0 {
        // Versions 1.0 and 3.0 carry no usable name data.
        return Ok(PostTable::default());
    }
    r.skip(28); // rest of the fixed-size header

    let glyph_count = r.read_u16()?;
    let mut indices = Vec::with_capacity(usize::from(glyph_count));
    for _ in 0..glyph_count {
        indices.push(r.read_u16()?);
    }

    // The appended Pascal-string array holds only the custom names; fonts
    // that use standard names exclusively have none at all.
    let custom_count = indices
        .iter()
        .filter_map(|&index| index.checked_sub(STANDARD_NAME_COUNT))
        .max()
        .map_or(0, |max| usize::from(max) + 1);
    let mut custom_names = Vec::with_capacity(custom_count);
    for _ in 0..custom_count {
        // Some fonts reference more names than they store; keep what is
        // actually there and let the lookup below skip the rest.
        let Ok(length) = r.read_u8() else { break };
        let Ok(bytes) = r.read_bytes(usize::from(length)) else {
            break;
        };
        custom_names.push(String::from_utf8_lossy(bytes).into_owned());
    }

    let mut glyph_names = HashMap::new();
    for (glyph_id, &index) in indices.iter().enumerate() {
        let name = if index < STANDARD_NAME_COUNT {
            MACINTOSH_NAMES[usize::from(index)].to_string()
        } else if let Some(name) = custom_names.get(usize::from(index - STANDARD_NAME_COUNT)) {
            name.clone()
        } else {
            continue;
        };
        glyph_names.insert(glyph_id as u16, name);
    }
    Ok(PostTable { glyph_names })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_bytes(version: u32, indices: &[u16], custom: &[&str]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&version.to_be_bytes());
        data.extend_from_slice(&[0; 28]);
        data.extend_from_slice(&(indices.len() as u16).to_be_bytes());
        for index in indices {
            data.extend_from_slice(&index.to_be_bytes());
        }
        for name in custom {
            data.push(name.len() as u8);
            data.extend_from_slice(name.as_bytes());
        }
        data
    }

    #[test]
    fn standard_and_custom_names() {
        let data = post_bytes(0x0002_0000, &[0, 3, 258, 259], &["heart", "cloud-up"]);
        let post = parse(Reader::new(&data)).unwrap();
        assert_eq!(post.name(0), Some(".notdef"));
        assert_eq!(post.name(1), Some("space"));
        assert_eq!(post.name(2), Some("heart"));
        assert_eq!(post.name(3), Some("cloud-up"));
    }

    #[test]
    fn standard_names_only_reads_no_string_array() {
        // No appended Pascal strings at all; must not fail or misindex.
        let data = post_bytes(0x0002_0000, &[0, 36, 37], &[]);
        let post = parse(Reader::new(&data)).unwrap();
        assert_eq!(post.name(1), Some("A"));
        assert_eq!(post.name(2), Some("B"));
        assert_eq!(post.glyph_names.len(), 3);
    }

    #[test]
    fn out_of_range_custom_index_is_skipped() {
        let data = post_bytes(0x0002_0000, &[258, 300], &["only-one"]);
        let post = parse(Reader::new(&data)).unwrap();
        assert_eq!(post.name(0), Some("only-one"));
        assert_eq!(post.name(1), None);
    }

    #[test]
    fn other_versions_yield_empty_map() {
        let data = post_bytes(0x0003_0000, &[], &[]);
        let post = parse(Reader::new(&data)).unwrap();
        assert!(post.glyph_names.is_empty());
    }
}
