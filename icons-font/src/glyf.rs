//! Glyph data table: simple and composite outline reconstruction.
//!
//! <https://learn.microsoft.com/en-us/typography/opentype/spec/glyf>

use std::fmt::{Debug, Formatter};

use log::warn;

use crate::error::FontResult;
use crate::font::Font;
use crate::geom::{Point, Transform};
use crate::outline::{BBoxBuilder, OutlineBuilder, SvgPathBuilder};
use crate::reader::Reader;

// Simple glyph flags.
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

// Composite glyph flags.
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Recursion cap for composite glyphs; the format itself has no limit, so
/// a cyclic reference would otherwise never terminate.
const MAX_COMPONENT_DEPTH: u8 = 32;

/// Byte ranges of the individual glyphs inside the `glyf` table.
#[derive(Clone, Debug)]
pub(crate) struct GlyfTable {
    pub(crate) ranges: Vec<(usize, usize)>,
}

/// One decoded point of a simple glyph contour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPoint {
    pub coord: Point,
    pub on_curve: bool,
    pub last_in_contour: bool,
}

/// A single glyph, borrowing its data from the owning [`Font`].
///
/// The outline body is decoded lazily; constructing a `Glyph` only reads
/// the 10-byte header.
#[derive(Clone, Copy)]
pub struct Glyph<'a> {
    font: &'a Font,
    pub glyph_id: u16,
    /// Negative for composite glyphs, zero for empty ones.
    pub contours_count: i16,
    pub min_point: Point,
    pub max_point: Point,
    data: &'a [u8],
}

impl<'a> Glyph<'a> {
    pub(crate) fn parse(font: &'a Font, glyph_id: u16, data: &'a [u8]) -> FontResult<Self> {
        if data.is_empty() {
            return Ok(Self {
                font,
                glyph_id,
                contours_count: 0,
                min_point: Point::ZERO,
                max_point: Point::ZERO,
                data,
            });
        }
        let mut r = Reader::new(data);
        let contours_count = r.read_i16()?;
        let min_point = Point::new(f64::from(r.read_i16()?), f64::from(r.read_i16()?));
        let max_point = Point::new(f64::from(r.read_i16()?), f64::from(r.read_i16()?));
        Ok(Self {
            font,
            glyph_id,
            contours_count,
            min_point,
            max_point,
            data: &data[10..],
        })
    }

    /// A glyph with no outline at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours_count == 0
    }

    /// Feeds the glyph outline into `builder`, transformed by `tr`.
    pub fn build_outline(
        &self,
        builder: &mut impl OutlineBuilder,
        tr: Transform,
    ) -> FontResult<()> {
        self.outline(builder, tr, 0)
    }

    /// The glyph rendered as an SVG path inside a 100×100 viewBox.
    ///
    /// The glyph bbox is centered on the em square and the outline is
    /// flipped from the font's Y-up convention to SVG's Y-down one. An
    /// extra transform, when given, is applied on top (in SVG space).
    pub fn to_svg_path(&self, relative: bool, tr: Option<Transform>) -> FontResult<String> {
        let Some((min, max)) = self.bbox()? else {
            return Ok(String::new());
        };
        let mid = (min + max) * 0.5;
        // Vendor head bboxes are unreliable, so the em box is stretched to
        // fit the scanned bbox when a glyph paints outside of it.
        let em = f64::from(self.font.head().units_per_em)
            .max((max.x - min.x) * 1.1)
            .max((max.y - min.y) * 1.1);
        let center = Point::new(em / 2.0, em / 2.0) - mid;

        let tr = tr.unwrap_or(Transform::IDENTITY).compose(
            Transform::new(1.0, 0.0, 0.0, 0.0, -1.0, 100.0)
                .scale(100.0 / em, 100.0 / em)
                .translate(center.x, center.y),
        );
        let mut builder = SvgPathBuilder::new(relative, SvgPathBuilder::DEFAULT_PRECISION, tr);
        self.build_outline(&mut builder, Transform::IDENTITY)?;
        Ok(builder.into_path())
    }

    /// Inclusive bounding box over every decoded point.
    ///
    /// The header bbox is not used: several vendor fonts store stale
    /// values there. Returns `None` for empty glyphs.
    pub fn bbox(&self) -> FontResult<Option<(Point, Point)>> {
        if self.contours_count < 0 {
            let mut bbox = BBoxBuilder::new();
            self.build_outline(&mut bbox, Transform::IDENTITY)?;
            return Ok(bbox.bounds());
        }
        if self.contours_count == 0 {
            return Ok(None);
        }

        let points = self.points()?;
        let mut iter = points.iter();
        let Some(first) = iter.next() else {
            return Ok(None);
        };
        let mut min = first.coord;
        let mut max = first.coord;
        for point in iter {
            min.x = min.x.min(point.coord.x);
            min.y = min.y.min(point.coord.y);
            max.x = max.x.max(point.coord.x);
            max.y = max.y.max(point.coord.y);
        }
        Ok(Some((min, max)))
    }

    fn outline(
        &self,
        builder: &mut impl OutlineBuilder,
        tr: Transform,
        depth: u8,
    ) -> FontResult<()> {
        if depth >= MAX_COMPONENT_DEPTH {
            return Ok(());
        }
        if self.contours_count >= 0 {
            self.simple_outline(builder, tr)
        } else {
            self.composite_outline(builder, tr, depth)
        }
    }

    /// Reassembles contours from the point stream.
    ///
    /// TrueType quadratic B-spline conventions:
    /// - `[on0, on1]` is a line;
    /// - `[on0, off, on1]` is one quadratic segment;
    /// - `[on0, off0, off1, on1]` has an implicit on-curve point at the
    ///   midpoint of `off0` and `off1`.
    ///
    /// A contour that starts off-curve gets its starting on-curve point
    /// synthesized the same way.
    fn simple_outline(&self, builder: &mut impl OutlineBuilder, tr: Transform) -> FontResult<()> {
        let mut first_on: Option<Point> = None;
        let mut first_off: Option<Point> = None;
        let mut last_off: Option<Point> = None;

        for point in self.points()? {
            let p = point.coord;
            if first_on.is_none() {
                if point.on_curve {
                    first_on = Some(p);
                    builder.move_to(tr.apply(p));
                } else if let Some(off) = first_off {
                    let mid = off.lerp(p, 0.5);
                    first_on = Some(mid);
                    last_off = Some(p);
                    builder.move_to(tr.apply(mid));
                } else {
                    first_off = Some(p);
                }
            } else if let Some(off) = last_off {
                if point.on_curve {
                    builder.quad_to(tr.apply(off), tr.apply(p));
                    last_off = None;
                } else {
                    let mid = off.lerp(p, 0.5);
                    builder.quad_to(tr.apply(off), tr.apply(mid));
                    last_off = Some(p);
                }
            } else if point.on_curve {
                builder.line_to(tr.apply(p));
            } else {
                last_off = Some(p);
            }

            if point.last_in_contour {
                // Bridge any outstanding off-curve points back to the
                // contour start.
                if let (Some(first), Some(last)) = (first_off, last_off) {
                    let mid = last.lerp(first, 0.5);
                    builder.quad_to(tr.apply(last), tr.apply(mid));
                    last_off = None;
                }
                if let Some(first) = first_on {
                    if let Some(off) = first_off {
                        builder.quad_to(tr.apply(off), tr.apply(first));
                    } else if let Some(off) = last_off {
                        builder.quad_to(tr.apply(off), tr.apply(first));
                    } else {
                        builder.line_to(tr.apply(first));
                    }
                }
                builder.close();
                first_on = None;
                first_off = None;
                last_off = None;
            }
        }
        Ok(())
    }

    /// Decodes the run-length-encoded point stream of a simple glyph.
    pub(crate) fn points(&self) -> FontResult<Vec<GlyphPoint>> {
        if self.contours_count <= 0 {
            return Ok(Vec::new());
        }
        let mut r = Reader::new(self.data);

        let mut endpoints = Vec::with_capacity(self.contours_count as usize);
        for _ in 0..self.contours_count {
            endpoints.push(r.read_u16()?);
        }
        let points_count = endpoints.last().map_or(0, |&last| usize::from(last) + 1);
        // A single point cannot form a contour; treat it as a no-op.
        if points_count <= 1 {
            return Ok(Vec::new());
        }

        let instructions_len = usize::from(r.read_u16()?);
        r.skip(instructions_len);

        // First pass: expand the flag runs and size the coordinate streams.
        let mut flags = Vec::with_capacity(points_count);
        let mut x_len = 0usize;
        let mut y_len = 0usize;
        while flags.len() < points_count {
            let flag = r.read_u8()?;
            let mut repeats = 1usize;
            if flag & REPEAT_FLAG != 0 {
                repeats += usize::from(r.read_u8()?);
            }
            // A run reaching past the point count is truncated.
            let repeats = repeats.min(points_count - flags.len());

            if flag & X_SHORT_VECTOR != 0 {
                x_len += repeats;
            } else if flag & X_SAME_OR_POSITIVE == 0 {
                x_len += repeats * 2;
            }
            if flag & Y_SHORT_VECTOR != 0 {
                y_len += repeats;
            } else if flag & Y_SAME_OR_POSITIVE == 0 {
                y_len += repeats * 2;
            }
            for _ in 0..repeats {
                flags.push(flag);
            }
        }

        // Second pass: two independent delta streams.
        let x_start = r.pos();
        let y_start = x_start + x_len;
        let mut x_reader = r.view(x_start, y_start.min(r.len()))?;
        let mut y_reader = r.view(y_start.min(r.len()), (y_start + y_len).min(r.len()))?;

        let mut x = 0i32;
        let mut y = 0i32;
        let mut points = Vec::with_capacity(points_count);
        for (index, &flag) in flags.iter().enumerate() {
            x += i32::from(coord_delta(
                flag,
                X_SHORT_VECTOR,
                X_SAME_OR_POSITIVE,
                &mut x_reader,
            )?);
            y += i32::from(coord_delta(
                flag,
                Y_SHORT_VECTOR,
                Y_SAME_OR_POSITIVE,
                &mut y_reader,
            )?);
            points.push(GlyphPoint {
                coord: Point::new(f64::from(x), f64::from(y)),
                on_curve: flag & ON_CURVE_POINT != 0,
                last_in_contour: endpoints.contains(&(index as u16)),
            });
        }
        Ok(points)
    }

    fn composite_outline(
        &self,
        builder: &mut impl OutlineBuilder,
        tr: Transform,
        depth: u8,
    ) -> FontResult<()> {
        let mut r = Reader::new(self.data);
        loop {
            let flags = r.read_u16()?;
            let child_id = r.read_u16()?;

            let mut component = Transform::IDENTITY;
            if flags & ARGS_ARE_XY_VALUES != 0 {
                if flags & ARG_1_AND_2_ARE_WORDS != 0 {
                    component.m02 = f64::from(r.read_i16()?);
                    component.m12 = f64::from(r.read_i16()?);
                } else {
                    component.m02 = f64::from(r.read_i8()?);
                    component.m12 = f64::from(r.read_i8()?);
                }
            } else {
                // Point-attachment mode: consume the two point numbers to
                // keep the record stream aligned; the attachment itself is
                // not reproduced.
                r.skip(if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 });
            }
            if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
                component.m00 = r.read_f2dot14()?;
                component.m10 = r.read_f2dot14()?;
                component.m01 = r.read_f2dot14()?;
                component.m11 = r.read_f2dot14()?;
            } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
                component.m00 = r.read_f2dot14()?;
                component.m11 = r.read_f2dot14()?;
            } else if flags & WE_HAVE_A_SCALE != 0 {
                component.m00 = r.read_f2dot14()?;
                component.m11 = component.m00;
            }

            match self.font.glyph(child_id)? {
                Some(child) => child.outline(builder, tr.compose(component), depth + 1)?,
                None => warn!(
                    "[{}][{}] composite references invalid glyph {child_id}",
                    self.font.name().family,
                    self.glyph_id,
                ),
            }

            if flags & MORE_COMPONENTS == 0 {
                break;
            }
        }
        Ok(())
    }
}

impl Debug for Glyph<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let width = self.max_point.x - self.min_point.x;
        let height = self.max_point.y - self.min_point.y;
        write!(
            f,
            "Glyph(id={}, size=({width}, {height}), contours={}, data={})",
            self.glyph_id,
            self.contours_count,
            self.data.len(),
        )
    }
}

fn coord_delta(
    flag: u8,
    short_flag: u8,
    same_or_positive_flag: u8,
    coords: &mut Reader<'_>,
) -> FontResult<i16> {
    match (flag & short_flag != 0, flag & same_or_positive_flag != 0) {
        (true, true) => Ok(i16::from(coords.read_u8()?)),
        (true, false) => Ok(-i16::from(coords.read_u8()?)),
        // Same as the previous coordinate.
        (false, true) => Ok(0),
        (false, false) => coords.read_i16(),
    }
}
