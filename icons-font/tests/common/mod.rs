//! In-memory sfnt assembly for the integration tests.

pub const SFNT_TRUETYPE: u32 = 0x0001_0000;
pub const SFNT_OPENTYPE: u32 = 0x4F54_544F;

/// Concatenates tables into a complete sfnt buffer with a directory.
pub fn assemble(sfnt_version: u32, tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut font = Vec::new();
    font.extend_from_slice(&sfnt_version.to_be_bytes());
    font.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    // searchRange, entrySelector, rangeShift are ignored by the parser.
    font.extend_from_slice(&[0; 6]);

    let mut offset = 12 + tables.len() * 16;
    for (tag, data) in tables {
        font.extend_from_slice(tag);
        font.extend_from_slice(&0u32.to_be_bytes()); // checksum
        font.extend_from_slice(&(offset as u32).to_be_bytes());
        font.extend_from_slice(&(data.len() as u32).to_be_bytes());
        offset += data.len();
    }
    for (_, data) in tables {
        font.extend_from_slice(data);
    }
    font
}

pub fn head(units_per_em: u16, index_to_loc_format: i16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    data.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    data.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // revision
    data.extend_from_slice(&0u32.to_be_bytes()); // checksumAdjustment
    data.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magic
    data.extend_from_slice(&0u16.to_be_bytes()); // flags
    data.extend_from_slice(&units_per_em.to_be_bytes());
    data.extend_from_slice(&2_082_844_800i64.to_be_bytes()); // created: epoch
    data.extend_from_slice(&2_082_844_800i64.to_be_bytes()); // modified: epoch
    for v in [0i16, 0, 0, 0] {
        data.extend_from_slice(&v.to_be_bytes()); // bbox
    }
    data.extend_from_slice(&0u16.to_be_bytes()); // macStyle
    data.extend_from_slice(&8u16.to_be_bytes()); // lowestRecPPEM
    data.extend_from_slice(&2i16.to_be_bytes()); // fontDirectionHint
    data.extend_from_slice(&index_to_loc_format.to_be_bytes());
    data.extend_from_slice(&0i16.to_be_bytes()); // glyphDataFormat
    data
}

pub fn maxp(glyph_count: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    data.extend_from_slice(&glyph_count.to_be_bytes());
    data
}

/// A name table with Windows/US-English family, subfamily, and version.
pub fn name(family: &str, subfamily: &str, version: &str) -> Vec<u8> {
    let records = [(1u16, family), (2, subfamily), (5, version)];
    let mut storage: Vec<u8> = Vec::new();
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_be_bytes()); // version
    data.extend_from_slice(&(records.len() as u16).to_be_bytes());
    let storage_offset = 6 + records.len() * 12;
    data.extend_from_slice(&(storage_offset as u16).to_be_bytes());
    for (name_id, value) in records {
        let encoded: Vec<u8> = value.encode_utf16().flat_map(u16::to_be_bytes).collect();
        for v in [3u16, 1, 1033, name_id] {
            data.extend_from_slice(&v.to_be_bytes());
        }
        data.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        data.extend_from_slice(&(storage.len() as u16).to_be_bytes());
        storage.extend_from_slice(&encoded);
    }
    data.extend_from_slice(&storage);
    data
}

/// A cmap with a single format-12 unicode (0, 4) subtable.
pub fn cmap_format12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0u16.to_be_bytes()); // version
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes()); // platform
    data.extend_from_slice(&4u16.to_be_bytes()); // encoding
    data.extend_from_slice(&12u32.to_be_bytes()); // offset
    data.extend_from_slice(&12u16.to_be_bytes()); // format
    data.extend_from_slice(&0u16.to_be_bytes()); // reserved
    data.extend_from_slice(&((16 + groups.len() * 12) as u32).to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes()); // language
    data.extend_from_slice(&(groups.len() as u32).to_be_bytes());
    for (start, end, glyph_id) in groups {
        data.extend_from_slice(&start.to_be_bytes());
        data.extend_from_slice(&end.to_be_bytes());
        data.extend_from_slice(&glyph_id.to_be_bytes());
    }
    data
}

/// A version-2 post table; indices below 258 reference standard names.
pub fn post(indices: &[u16], custom: &[&str]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&0x0002_0000u32.to_be_bytes());
    data.extend_from_slice(&[0; 28]);
    data.extend_from_slice(&(indices.len() as u16).to_be_bytes());
    for index in indices {
        data.extend_from_slice(&index.to_be_bytes());
    }
    for value in custom {
        data.push(value.len() as u8);
        data.extend_from_slice(value.as_bytes());
    }
    data
}

pub fn hhea(number_of_metrics: u16) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&1u16.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    for v in [800i16, -200, 90] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data.extend_from_slice(&1000u16.to_be_bytes()); // advanceWidthMax
    for v in [0i16; 6] {
        data.extend_from_slice(&v.to_be_bytes());
    }
    data.extend_from_slice(&[0; 10]); // reserved + metricDataFormat
    data.extend_from_slice(&number_of_metrics.to_be_bytes());
    data
}

pub fn hmtx(metrics: &[(u16, i16)], bearings: &[i16]) -> Vec<u8> {
    let mut data = Vec::new();
    for (advance, bearing) in metrics {
        data.extend_from_slice(&advance.to_be_bytes());
        data.extend_from_slice(&bearing.to_be_bytes());
    }
    for bearing in bearings {
        data.extend_from_slice(&bearing.to_be_bytes());
    }
    data
}

/// Long-format loca offsets for the given glyph records.
pub fn loca(glyphs: &[Vec<u8>]) -> Vec<u8> {
    let mut data = Vec::new();
    let mut offset = 0u32;
    data.extend_from_slice(&offset.to_be_bytes());
    for glyph in glyphs {
        offset += glyph.len() as u32;
        data.extend_from_slice(&offset.to_be_bytes());
    }
    data
}

pub fn glyf(glyphs: &[Vec<u8>]) -> Vec<u8> {
    glyphs.concat()
}

/// A simple glyph; every point is stored as an uncompressed i16 delta.
pub fn simple_glyph(contours: &[&[(i16, i16, bool)]]) -> Vec<u8> {
    let points: Vec<(i16, i16, bool)> = contours.concat();
    let (mut x_min, mut y_min, mut x_max, mut y_max) = (i16::MAX, i16::MAX, i16::MIN, i16::MIN);
    for &(x, y, _) in &points {
        x_min = x_min.min(x);
        y_min = y_min.min(y);
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }

    let mut data = Vec::new();
    data.extend_from_slice(&(contours.len() as i16).to_be_bytes());
    for v in [x_min, y_min, x_max, y_max] {
        data.extend_from_slice(&v.to_be_bytes());
    }

    let mut endpoint = 0u16;
    for contour in contours {
        endpoint += contour.len() as u16;
        data.extend_from_slice(&(endpoint - 1).to_be_bytes());
    }
    data.extend_from_slice(&0u16.to_be_bytes()); // instructionLength

    for &(_, _, on_curve) in &points {
        data.push(u8::from(on_curve)); // plain flags, both deltas as i16
    }
    let mut prev = 0i16;
    for &(x, _, _) in &points {
        data.extend_from_slice(&(x - prev).to_be_bytes());
        prev = x;
    }
    let mut prev = 0i16;
    for &(_, y, _) in &points {
        data.extend_from_slice(&(y - prev).to_be_bytes());
        prev = y;
    }
    data
}

/// A composite glyph built from `(child_glyph_id, dx, dy)` components.
pub fn composite_glyph(components: &[(u16, i16, i16)]) -> Vec<u8> {
    const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
    const ARGS_ARE_XY_VALUES: u16 = 0x0002;
    const MORE_COMPONENTS: u16 = 0x0020;

    let mut data = Vec::new();
    data.extend_from_slice(&(-1i16).to_be_bytes());
    for v in [0i16; 4] {
        data.extend_from_slice(&v.to_be_bytes()); // bbox, unused
    }
    for (index, &(glyph_id, dx, dy)) in components.iter().enumerate() {
        let mut flags = ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES;
        if index + 1 < components.len() {
            flags |= MORE_COMPONENTS;
        }
        data.extend_from_slice(&flags.to_be_bytes());
        data.extend_from_slice(&glyph_id.to_be_bytes());
        data.extend_from_slice(&dx.to_be_bytes());
        data.extend_from_slice(&dy.to_be_bytes());
    }
    data
}

/// A complete TrueType icon font over the given glyph records.
///
/// Glyph 0 should usually be an empty `.notdef` (`Vec::new()`).
pub fn icon_font(
    units_per_em: u16,
    glyphs: &[Vec<u8>],
    cmap: Vec<u8>,
    post_table: Vec<u8>,
) -> Vec<u8> {
    let glyph_count = glyphs.len() as u16;
    assemble(
        SFNT_TRUETYPE,
        &[
            (*b"head", head(units_per_em, 1)),
            (*b"maxp", maxp(glyph_count)),
            (*b"name", name("Test Icons", "Regular", "Version 1.0")),
            (*b"hhea", hhea(glyph_count)),
            (
                *b"hmtx",
                hmtx(&vec![(500, 0); glyph_count as usize], &[]),
            ),
            (*b"cmap", cmap),
            (*b"post", post_table),
            (*b"loca", loca(glyphs)),
            (*b"glyf", glyf(glyphs)),
        ],
    )
}
