//! Character map table.
//!
//! Builds the two mutually-inverse maps between codepoints and glyph ids
//! from the first acceptable unicode subtable. Segmented coverage
//! (format 12) and segment-mapping-to-delta (format 4) are supported.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/cmap>

use std::collections::HashMap;

use log::warn;

use crate::error::{FontError, FontResult};
use crate::reader::Reader;

#[derive(Clone, Debug, Default)]
pub struct CmapTable {
    pub codepoint_to_glyph: HashMap<u32, u16>,
    pub glyph_to_codepoint: HashMap<u16, u32>,
}

impl CmapTable {
    fn insert(&mut self, codepoint: u32, glyph_id: u16) {
        self.glyph_to_codepoint.insert(glyph_id, codepoint);
        self.codepoint_to_glyph.insert(codepoint, glyph_id);
    }
}

pub(crate) fn parse(mut r: Reader<'_>) -> FontResult<CmapTable> {
    r.read_u16()?; // version

    // Prefer the unicode full-repertoire subtable (0, 4) over the BMP-only
    // (0, 3); anything else is unsupported.
    let mut unicode_offset = 0usize;
    let mut subtables = Vec::new();
    let subtable_count = r.read_u16()?;
    for _ in 0..subtable_count {
        let platform_id = r.read_u16()?;
        let encoding_id = r.read_u16()?;
        let offset = r.read_u32()? as usize;
        subtables.push((platform_id, encoding_id));
        if platform_id == 0 && encoding_id == 4 {
            unicode_offset = offset;
        } else if unicode_offset == 0 && platform_id == 0 && encoding_id == 3 {
            unicode_offset = offset;
        }
    }
    if unicode_offset == 0 {
        return Err(FontError::UnsupportedCmap(subtables));
    }

    r.seek(unicode_offset);
    let format = r.read_u16()?;
    match format {
        12 => parse_format12(&mut r),
        4 => parse_format4(&mut r),
        other => Err(FontError::UnsupportedCmapFormat(other)),
    }
}

/// Format 12, segmented coverage: each group maps a codepoint range onto a
/// run of consecutive glyph ids.
fn parse_format12(r: &mut Reader<'_>) -> FontResult<CmapTable> {
    r.read_u16()?; // reserved
    r.read_u32()?; // length
    r.read_u32()?; // language

    let mut cmap = CmapTable::default();
    let group_count = r.read_u32()?;
    for _ in 0..group_count {
        let start = r.read_u32()?;
        let end = r.read_u32()?;
        let mut glyph_id = r.read_u32()?;
        for codepoint in start..=end {
            cmap.insert(codepoint, glyph_id as u16);
            glyph_id += 1;
        }
    }
    Ok(cmap)
}

/// Format 4, segment mapping to delta values.
fn parse_format4(r: &mut Reader<'_>) -> FontResult<CmapTable> {
    // The stored length counts from the subtable start, so for the last
    // table in a file it can reach past the end of the view; clamp it.
    let length = usize::from(r.read_u16()?);
    let end = (r.pos() + length).min(r.len());
    let mut r = r.view(r.pos(), end)?;
    r.skip(2); // language

    let segment_count = usize::from(r.read_u16()? / 2);
    r.skip(6); // legacy searchRange, entrySelector, rangeShift

    let mut end_codes = Vec::with_capacity(segment_count);
    for _ in 0..segment_count {
        end_codes.push(r.read_u16()?);
    }
    r.read_u16()?; // reservedPad
    let mut start_codes = Vec::with_capacity(segment_count);
    for _ in 0..segment_count {
        start_codes.push(r.read_u16()?);
    }
    let mut id_deltas = Vec::with_capacity(segment_count);
    for _ in 0..segment_count {
        id_deltas.push(r.read_i16()?);
    }
    let mut id_range_offsets = Vec::with_capacity(segment_count);
    for _ in 0..segment_count {
        id_range_offsets.push(r.read_u16()?);
    }
    // The trailing glyph-id array is only reachable through non-zero
    // idRangeOffset values, which no known icon font uses.

    let mut cmap = CmapTable::default();
    for segment in 0..segment_count {
        let (start, end) = (start_codes[segment], end_codes[segment]);
        if start == 0xFFFF && end == 0xFFFF {
            break;
        }
        if id_range_offsets[segment] != 0 {
            warn!("cmap format 4: idRangeOffset != 0 is not supported, skipping segment {start:#06X}..={end:#06X}");
            continue;
        }
        for codepoint in start..=end {
            let glyph_id = codepoint.wrapping_add_signed(id_deltas[segment]);
            cmap.insert(u32::from(codepoint), glyph_id);
        }
    }
    Ok(cmap)
}
