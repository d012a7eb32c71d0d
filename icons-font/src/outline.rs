//! Consumers of the glyph decoder's outline callbacks.

use std::fmt::{Display, Formatter, Write as _};

use crate::geom::{Point, Transform};

/// Receiver for decoded outline segments.
///
/// The glyph decoder is the sole driver. Quadratic segments are the normal
/// case for TrueType outlines; `cubic_to` exists so builders stay usable
/// once CFF outlines are added.
pub trait OutlineBuilder {
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quad_to(&mut self, c: Point, p: Point);
    fn cubic_to(&mut self, c1: Point, c2: Point, p: Point);
    fn close(&mut self);
}

/// Builds an SVG path string out of outline segments.
///
/// Coordinates are rounded half-away-from-zero to `precision` decimals and
/// rendered in their minimal form. Separators follow the usual SVG
/// compaction: a leading `-` doubles as a separator, so spaces and commas
/// are only written before non-negative coordinates.
pub struct SvgPathBuilder {
    path: String,
    relative: bool,
    precision: u8,
    transform: Transform,
    prev: Point,
}

impl SvgPathBuilder {
    pub const DEFAULT_PRECISION: u8 = 2;

    #[must_use]
    pub fn new(relative: bool, precision: u8, transform: Transform) -> Self {
        Self {
            path: String::new(),
            relative,
            precision,
            transform,
            prev: Point::ZERO,
        }
    }

    #[must_use]
    pub fn into_path(self) -> String {
        self.path
    }

    fn command(&mut self, absolute: char, relative: char) {
        self.path.push(if self.relative { relative } else { absolute });
    }

    /// Writes one point and returns its absolute transformed position.
    ///
    /// In relative mode every point of a command is offset against the
    /// previous command's end anchor, which is only updated by the caller
    /// once the whole command has been written.
    fn write_point(&mut self, p: Point, sep: bool) -> Point {
        let p = self.transform.apply(p);
        let out = if self.relative { p - self.prev } else { p };

        let x = round_coord(out.x, self.precision);
        let y = round_coord(out.y, self.precision);
        if sep && x >= 0.0 {
            self.path.push(' ');
        }
        let _ = write!(self.path, "{x}");
        if y >= 0.0 {
            self.path.push(',');
        }
        let _ = write!(self.path, "{y}");

        p
    }
}

impl OutlineBuilder for SvgPathBuilder {
    fn move_to(&mut self, p: Point) {
        self.command('M', 'm');
        self.prev = self.write_point(p, false);
    }

    fn line_to(&mut self, p: Point) {
        self.command('L', 'l');
        self.prev = self.write_point(p, false);
    }

    fn quad_to(&mut self, c: Point, p: Point) {
        self.command('Q', 'q');
        self.write_point(c, false);
        self.prev = self.write_point(p, true);
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.command('C', 'c');
        self.write_point(c1, false);
        self.write_point(c2, true);
        self.prev = self.write_point(p, true);
    }

    fn close(&mut self) {
        self.path.push('Z');
    }
}

/// Rounds half-away-from-zero to `precision` decimals, normalizing `-0`.
fn round_coord(value: f64, precision: u8) -> f64 {
    let factor = 10f64.powi(i32::from(precision));
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Accumulates the inclusive bounding box of every emitted point.
#[derive(Debug, Default)]
pub struct BBoxBuilder {
    min: Option<Point>,
    max: Option<Point>,
}

impl BBoxBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `(min, max)` of the observed points, or `None` when nothing was emitted.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point, Point)> {
        self.min.zip(self.max)
    }

    fn extend(&mut self, p: Point) {
        match (&mut self.min, &mut self.max) {
            (Some(min), Some(max)) => {
                min.x = min.x.min(p.x);
                min.y = min.y.min(p.y);
                max.x = max.x.max(p.x);
                max.y = max.y.max(p.y);
            }
            _ => {
                self.min = Some(p);
                self.max = Some(p);
            }
        }
    }
}

impl OutlineBuilder for BBoxBuilder {
    fn move_to(&mut self, _p: Point) {}

    fn line_to(&mut self, p: Point) {
        self.extend(p);
    }

    fn quad_to(&mut self, c: Point, p: Point) {
        self.extend(c);
        self.extend(p);
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.extend(c1);
        self.extend(c2);
        self.extend(p);
    }

    fn close(&mut self) {}
}

/// Collects one line per segment; handy when eyeballing decoder output.
#[derive(Debug, Default)]
pub struct DebugBuilder {
    lines: String,
}

impl DebugBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutlineBuilder for DebugBuilder {
    fn move_to(&mut self, p: Point) {
        let _ = writeln!(self.lines, "M{},{}", p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        let _ = writeln!(self.lines, "L{},{}", p.x, p.y);
    }

    fn quad_to(&mut self, c: Point, p: Point) {
        let _ = writeln!(self.lines, "Q{},{} {},{}", c.x, c.y, p.x, p.y);
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        let _ = writeln!(
            self.lines,
            "C{},{} {},{} {},{}",
            c1.x, c1.y, c2.x, c2.y, p.x, p.y
        );
    }

    fn close(&mut self) {
        let _ = writeln!(self.lines, "Z");
    }
}

impl Display for DebugBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lines)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.125, "0.13")]
    #[case(-0.125, "-0.13")]
    #[case(70.2, "70.2")]
    #[case(100.0, "100")]
    #[case(-0.0049, "0")]
    fn coordinate_rounding(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(round_coord(value, 2).to_string(), expected);
    }

    #[test]
    fn absolute_path_compaction() {
        let mut b = SvgPathBuilder::new(false, 2, Transform::IDENTITY);
        b.move_to(Point::new(0.0, 0.0));
        b.line_to(Point::new(10.0, -5.0));
        b.quad_to(Point::new(12.5, 3.0), Point::new(20.0, 0.0));
        b.close();
        assert_eq!(b.into_path(), "M0,0L10-5Q12.5,3 20,0Z");
    }

    #[test]
    fn negative_x_needs_no_separator() {
        let mut b = SvgPathBuilder::new(false, 2, Transform::IDENTITY);
        b.move_to(Point::new(5.0, 5.0));
        b.quad_to(Point::new(-1.0, 2.0), Point::new(-3.0, -4.0));
        assert_eq!(b.into_path(), "M5,5Q-1,2-3-4");
    }

    #[test]
    fn relative_mode_offsets_against_last_anchor() {
        let mut b = SvgPathBuilder::new(true, 2, Transform::IDENTITY);
        b.move_to(Point::new(10.0, 10.0));
        b.line_to(Point::new(15.0, 12.0));
        // Both the control and end point are relative to (15, 12).
        b.quad_to(Point::new(17.0, 14.0), Point::new(20.0, 12.0));
        b.line_to(Point::new(20.0, 20.0));
        b.close();
        assert_eq!(b.into_path(), "m10,10l5,2q2,2 5,0l0,8Z");
    }

    #[test]
    fn precision_rounds_half_away_from_zero() {
        let mut b = SvgPathBuilder::new(false, 2, Transform::IDENTITY);
        // 0.125 is exact in binary, so this is a true half-way case.
        b.move_to(Point::new(0.125, -0.125));
        b.line_to(Point::new(0.004, -0.0049));
        assert_eq!(b.into_path(), "M0.13-0.13L0,0");
    }

    #[test]
    fn transform_applies_before_formatting() {
        let tr = Transform::new(1.0, 0.0, 0.0, 0.0, -1.0, 100.0);
        let mut b = SvgPathBuilder::new(false, 2, tr);
        b.move_to(Point::new(0.0, 100.0));
        b.line_to(Point::new(100.0, 0.0));
        assert_eq!(b.into_path(), "M0,0L100,100");
    }

    #[test]
    fn bbox_covers_all_segment_points() {
        let mut b = BBoxBuilder::new();
        b.move_to(Point::new(-100.0, -100.0)); // move does not extend
        b.line_to(Point::new(10.0, 4.0));
        b.quad_to(Point::new(-2.0, 8.0), Point::new(6.0, -3.0));
        b.close();
        let (min, max) = b.bounds().unwrap();
        assert_eq!(min, Point::new(-2.0, -3.0));
        assert_eq!(max, Point::new(10.0, 8.0));
    }

    #[test]
    fn empty_bbox_is_none() {
        assert!(BBoxBuilder::new().bounds().is_none());
    }

    #[test]
    fn debug_builder_prints_commands() {
        let mut b = DebugBuilder::new();
        b.move_to(Point::new(0.0, 0.0));
        b.quad_to(Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        b.close();
        assert_eq!(b.to_string(), "M0,0\nQ1,2 3,4\nZ\n");
    }
}
