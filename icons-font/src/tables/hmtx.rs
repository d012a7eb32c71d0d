//! Horizontal metrics table.
//!
//! The advance array may be shorter than the glyph count; trailing glyphs
//! share the last advance and store only a left side bearing.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/hmtx>

use crate::error::FontResult;
use crate::reader::Reader;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metrics {
    pub advance: u16,
    pub side_bearing: i16,
}

#[derive(Clone, Debug)]
pub struct HmtxTable {
    metrics: Vec<Metrics>,
    bearings: Vec<i16>,
}

impl HmtxTable {
    /// Total number of glyphs covered by either array.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len() + self.bearings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.bearings.is_empty()
    }

    /// Advance width; glyphs past the metrics array inherit the last one.
    #[must_use]
    pub fn advance(&self, glyph_id: u16) -> Option<u16> {
        let index = usize::from(glyph_id);
        if index >= self.len() {
            return None;
        }
        match self.metrics.get(index) {
            Some(metrics) => Some(metrics.advance),
            None => self.metrics.last().map(|metrics| metrics.advance),
        }
    }

    #[must_use]
    pub fn side_bearing(&self, glyph_id: u16) -> Option<i16> {
        let index = usize::from(glyph_id);
        match self.metrics.get(index) {
            Some(metrics) => Some(metrics.side_bearing),
            None => self.bearings.get(index - self.metrics.len()).copied(),
        }
    }
}

pub(crate) fn parse(
    mut r: Reader<'_>,
    number_of_metrics: u16,
    glyph_count: u16,
) -> FontResult<HmtxTable> {
    let mut metrics = Vec::with_capacity(usize::from(number_of_metrics));
    for _ in 0..number_of_metrics {
        metrics.push(Metrics {
            advance: r.read_u16()?,
            side_bearing: r.read_i16()?,
        });
    }

    let bearing_count = glyph_count.saturating_sub(number_of_metrics);
    let mut bearings = Vec::with_capacity(usize::from(bearing_count));
    for _ in 0..bearing_count {
        bearings.push(r.read_i16()?);
    }

    Ok(HmtxTable { metrics, bearings })
}
