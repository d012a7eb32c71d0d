//! The font façade: owns the byte buffer, the table directory, and the
//! memoized parsed tables.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/otff>

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter, Write as _};
use std::sync::OnceLock;

use chrono::DateTime;
use serde::Serialize;

use crate::error::{FontError, FontResult};
use crate::geom::Transform;
use crate::glyf::{GlyfTable, Glyph};
use crate::reader::Reader;
use crate::tables::{
    CmapTable, HeadTable, HheaTable, HmtxTable, NameTable, PostTable, TableRecord, Tag, cmap, head,
    hhea, hmtx, loca, name, post,
};

const SFNT_TRUETYPE: u32 = 0x0001_0000;
const SFNT_OPENTYPE: u32 = 0x4F54_544F;

/// Default cell size for [`Font::specimen`], in viewBox units.
pub const SPECIMEN_SIZE: u32 = 32;
/// Default column count for [`Font::specimen`].
pub const SPECIMEN_COLUMNS: u32 = 35;
/// Default cell padding for [`Font::specimen`].
pub const SPECIMEN_PADDING: u32 = 6;

/// Outline flavor declared by the sfnt header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontKind {
    /// `glyf` quadratic outlines.
    TrueType,
    /// CFF outlines; parsing works, outline extraction does not.
    OpenType,
}

/// A parsed font.
///
/// The sfnt directory, `maxp`, `name` and `head` are decoded eagerly; the
/// remaining tables are parsed on first use and cached in one-shot cells,
/// which keeps a `Font` shareable across threads for read-only use.
pub struct Font {
    data: Vec<u8>,
    kind: FontKind,
    tables: HashMap<Tag, TableRecord>,
    glyph_count: u16,
    name: NameTable,
    head: HeadTable,
    loca: OnceLock<FontResult<Option<Vec<u32>>>>,
    glyf: OnceLock<FontResult<Option<GlyfTable>>>,
    cmap: OnceLock<FontResult<CmapTable>>,
    post: OnceLock<FontResult<PostTable>>,
    hhea: OnceLock<FontResult<HheaTable>>,
    hmtx: OnceLock<FontResult<HmtxTable>>,
    name_to_codepoint: OnceLock<FontResult<BTreeMap<String, u32>>>,
}

/// Summary of a font, serializable for the CLI `json` output.
#[derive(Clone, Debug, Serialize)]
pub struct FontInfo {
    pub family: String,
    pub subfamily: String,
    pub version: String,
    pub glyph_count: u16,
    pub post_count: usize,
    pub units_per_em: u16,
    pub modified: String,
    pub tables: BTreeMap<String, u32>,
}

impl Font {
    /// Parses the sfnt container from an owned byte buffer.
    pub fn parse(data: Vec<u8>) -> FontResult<Self> {
        let mut r = Reader::new(&data);
        let sfnt_version = r.read_u32()?;
        let kind = match sfnt_version {
            SFNT_TRUETYPE => FontKind::TrueType,
            SFNT_OPENTYPE => FontKind::OpenType,
            other => return Err(FontError::UnknownSfntVersion(other)),
        };
        let num_tables = r.read_u16()?;
        r.skip(6); // searchRange, entrySelector, rangeShift

        let mut tables = HashMap::with_capacity(usize::from(num_tables));
        for _ in 0..num_tables {
            let tag_bytes = r.read_bytes(4)?;
            let tag = Tag([tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]]);
            let checksum = r.read_u32()?;
            let offset = r.read_u32()?;
            let length = r.read_u32()?;
            tables.insert(
                tag,
                TableRecord {
                    checksum,
                    offset,
                    length,
                },
            );
        }

        // Maximum profile: only the glyph count matters here.
        let mut maxp = Reader::new(required_slice(&data, &tables, Tag::MAXP)?);
        maxp.skip(4); // version
        let glyph_count = maxp.read_u16()?;

        let name = name::parse(Reader::new(required_slice(&data, &tables, Tag::NAME)?))?;
        let head = head::parse(Reader::new(required_slice(&data, &tables, Tag::HEAD)?))?;

        Ok(Self {
            data,
            kind,
            tables,
            glyph_count,
            name,
            head,
            loca: OnceLock::new(),
            glyf: OnceLock::new(),
            cmap: OnceLock::new(),
            post: OnceLock::new(),
            hhea: OnceLock::new(),
            hmtx: OnceLock::new(),
            name_to_codepoint: OnceLock::new(),
        })
    }

    /// The raw sfnt buffer the font was parsed from.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn kind(&self) -> FontKind {
        self.kind
    }

    #[must_use]
    pub fn glyph_count(&self) -> u16 {
        self.glyph_count
    }

    #[must_use]
    pub fn name(&self) -> &NameTable {
        &self.name
    }

    #[must_use]
    pub fn head(&self) -> &HeadTable {
        &self.head
    }

    /// Raw bytes of a table, or `None` when the directory lacks it.
    fn table_data(&self, tag: Tag) -> FontResult<Option<&[u8]>> {
        table_slice(&self.data, &self.tables, tag)
    }

    fn require_table(&self, tag: Tag) -> FontResult<&[u8]> {
        required_slice(&self.data, &self.tables, tag)
    }

    fn loca(&self) -> FontResult<Option<&Vec<u32>>> {
        self.loca
            .get_or_init(|| match self.table_data(Tag::LOCA)? {
                Some(data) => loca::parse(
                    Reader::new(data),
                    self.glyph_count,
                    self.head.index_to_loc_format,
                )
                .map(Some),
                None => Ok(None),
            })
            .as_ref()
            .map(Option::as_ref)
            .map_err(Clone::clone)
    }

    pub(crate) fn glyf(&self) -> FontResult<Option<&GlyfTable>> {
        self.glyf
            .get_or_init(|| {
                if self.table_data(Tag::GLYF)?.is_none() {
                    return Ok(None);
                }
                let Some(loca) = self.loca()? else {
                    return Ok(None);
                };
                let ranges = loca
                    .windows(2)
                    .map(|pair| (pair[0] as usize, pair[1] as usize))
                    .collect();
                Ok(Some(GlyfTable { ranges }))
            })
            .as_ref()
            .map(Option::as_ref)
            .map_err(Clone::clone)
    }

    pub fn cmap(&self) -> FontResult<&CmapTable> {
        self.cmap
            .get_or_init(|| cmap::parse(Reader::new(self.require_table(Tag::CMAP)?)))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn post(&self) -> FontResult<&PostTable> {
        self.post
            .get_or_init(|| post::parse(Reader::new(self.require_table(Tag::POST)?)))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn hhea(&self) -> FontResult<&HheaTable> {
        self.hhea
            .get_or_init(|| hhea::parse(Reader::new(self.require_table(Tag::HHEA)?)))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn hmtx(&self) -> FontResult<&HmtxTable> {
        self.hmtx
            .get_or_init(|| {
                let number_of_metrics = self.hhea()?.number_of_metrics;
                hmtx::parse(
                    Reader::new(self.require_table(Tag::HMTX)?),
                    number_of_metrics,
                    self.glyph_count,
                )
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The glyph stored under `glyph_id`, or `None` when the id is out of
    /// range or the font has no `glyf` table.
    pub fn glyph(&self, glyph_id: u16) -> FontResult<Option<Glyph<'_>>> {
        let Some(glyf) = self.glyf()? else {
            return Ok(None);
        };
        let Some(&(start, end)) = glyf.ranges.get(usize::from(glyph_id)) else {
            return Ok(None);
        };
        let data = self.require_table(Tag::GLYF)?;
        let glyph_data = data.get(start..end).unwrap_or_default();
        Glyph::parse(self, glyph_id, glyph_data).map(Some)
    }

    /// The glyph mapped to a Unicode codepoint.
    ///
    /// Only TrueType outlines can be extracted; OpenType/CFF fonts fail
    /// with [`FontError::UnsupportedOutlineFormat`].
    pub fn glyph_by_codepoint(&self, codepoint: u32) -> FontResult<Option<Glyph<'_>>> {
        if self.kind != FontKind::TrueType {
            return Err(FontError::UnsupportedOutlineFormat);
        }
        if self.glyf()?.is_none() {
            return Ok(None);
        }
        let Some(&glyph_id) = self.cmap()?.codepoint_to_glyph.get(&codepoint) else {
            return Ok(None);
        };
        self.glyph(glyph_id)
    }

    /// Joins `post` and `cmap` into a glyph-name → codepoint map.
    ///
    /// Glyphs missing from either table, and glyphs mapped to codepoint 0,
    /// are left out.
    pub fn codepoint_by_name(&self) -> FontResult<&BTreeMap<String, u32>> {
        self.name_to_codepoint
            .get_or_init(|| {
                let cmap = self.cmap()?;
                let post = self.post()?;
                let mut map = BTreeMap::new();
                for glyph_id in 0..self.glyph_count {
                    let Some(&codepoint) = cmap.glyph_to_codepoint.get(&glyph_id) else {
                        continue;
                    };
                    let Some(name) = post.name(glyph_id) else {
                        continue;
                    };
                    if codepoint == 0 {
                        continue;
                    }
                    map.insert(name.to_string(), codepoint);
                }
                Ok(map)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// A serializable summary of the font.
    pub fn info(&self) -> FontResult<FontInfo> {
        Ok(FontInfo {
            family: self.name.family.clone(),
            subfamily: self.name.subfamily.clone(),
            version: self.name.version.clone(),
            glyph_count: self.glyph_count,
            post_count: self.post()?.glyph_names.len(),
            units_per_em: self.head.units_per_em,
            modified: DateTime::from_timestamp(self.head.modified, 0)
                .unwrap_or_default()
                .to_rfc3339(),
            tables: self
                .tables
                .iter()
                .map(|(tag, record)| (tag.to_string(), record.length))
                .collect(),
        })
    }

    /// An SVG path specimen laying out every non-empty glyph on a grid.
    ///
    /// The top-left and bottom-right corners carry `M x,y h1 v1 h-1 z`
    /// markers so the drawing has a stable extent.
    pub fn specimen(&self, size: u32, columns: u32, padding: u32) -> FontResult<String> {
        if self.glyf()?.is_none() || self.glyph_count == 0 {
            return Ok(String::new());
        }

        let mut buf = String::from("M0,0h1v1h-1z");
        let scale = f64::from(size) / 100.0;
        let cell = size + padding;
        let mut row = 0;
        let mut index = 0;
        for glyph_id in 0..self.glyph_count {
            let Some(glyph) = self.glyph(glyph_id)? else {
                continue;
            };
            if glyph.is_empty() {
                continue;
            }
            row = index / columns;
            let col = index % columns;
            let tr = Transform::IDENTITY
                .translate(
                    f64::from(padding + col * cell),
                    f64::from(padding + row * cell),
                )
                .scale(scale, scale);
            buf.push_str(&glyph.to_svg_path(false, Some(tr))?);
            buf.push('\n');
            index += 1;
        }
        let mark_x = padding + columns * cell;
        let mark_y = padding + (row + 1) * cell;
        let _ = write!(buf, "M{mark_x},{mark_y}h1v1h-1z");
        Ok(buf)
    }
}

impl Debug for Font {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Font(family={}, subfamily={}, glyph_count={})",
            self.name.family, self.name.subfamily, self.glyph_count
        )
    }
}

fn table_slice<'a>(
    data: &'a [u8],
    tables: &HashMap<Tag, TableRecord>,
    tag: Tag,
) -> FontResult<Option<&'a [u8]>> {
    let Some(record) = tables.get(&tag) else {
        return Ok(None);
    };
    let start = record.offset as usize;
    // A table is allowed to be the last thing in the file with a slightly
    // overlong directory length; reads past the real end still fail.
    let end = (start + record.length as usize).min(data.len());
    data.get(start..end).map(Some).ok_or(FontError::Truncated)
}

fn required_slice<'a>(
    data: &'a [u8],
    tables: &HashMap<Tag, TableRecord>,
    tag: Tag,
) -> FontResult<&'a [u8]> {
    table_slice(data, tables, tag)?.ok_or(FontError::MissingTable(tag))
}
