//! Font header table.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/head>

use crate::error::{FontError, FontResult};
use crate::geom::Point;
use crate::reader::Reader;

const MAGIC: u32 = 0x5F0F_3CF5;

#[derive(Clone, Debug)]
pub struct HeadTable {
    pub revision: f64,
    pub flags: u16,
    pub units_per_em: u16,
    /// Creation time as Unix-epoch seconds.
    pub created: i64,
    /// Last-modified time as Unix-epoch seconds.
    pub modified: i64,
    pub min_point: Point,
    pub max_point: Point,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    /// 0 for short (u16 × 2) `loca` offsets, 1 for long (u32) ones.
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

pub(crate) fn parse(mut r: Reader<'_>) -> FontResult<HeadTable> {
    r.read_u16()?; // majorVersion
    r.read_u16()?; // minorVersion
    let revision = r.read_fixed()?;
    r.read_u32()?; // checksumAdjustment
    let magic = r.read_u32()?;
    if magic != MAGIC {
        return Err(FontError::BadMagic(magic));
    }
    let flags = r.read_u16()?;
    let units_per_em = r.read_u16()?;
    let created = r.read_longdatetime()?;
    let modified = r.read_longdatetime()?;
    let x_min = r.read_i16()?;
    let y_min = r.read_i16()?;
    let x_max = r.read_i16()?;
    let y_max = r.read_i16()?;
    let mac_style = r.read_u16()?;
    let lowest_rec_ppem = r.read_u16()?;
    let font_direction_hint = r.read_i16()?;
    let index_to_loc_format = r.read_i16()?;
    let glyph_data_format = r.read_i16()?;

    Ok(HeadTable {
        revision,
        flags,
        units_per_em,
        created,
        modified,
        min_point: Point::new(f64::from(x_min), f64::from(y_min)),
        max_point: Point::new(f64::from(x_max), f64::from(y_max)),
        mac_style,
        lowest_rec_ppem,
        font_direction_hint,
        index_to_loc_format,
        glyph_data_format,
    })
}
