//! 2D point arithmetic and affine transforms used by the outline pipeline.

use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul, Sub};

/// A point in glyph design units (or SVG units after transformation).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `other`; `t = 0` is `self`, `t = 1` is `other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x * (1.0 - t) + other.x * t,
            y: self.y * (1.0 - t) + other.y * t,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major 2×3 affine transform with an implicit `[0, 0, 1]` last row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub m00: f64,
    pub m01: f64,
    pub m02: f64,
    pub m10: f64,
    pub m11: f64,
    pub m12: f64,
}

impl Transform {
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0);

    #[must_use]
    pub const fn new(m00: f64, m01: f64, m02: f64, m10: f64, m11: f64, m12: f64) -> Self {
        Self {
            m00,
            m01,
            m02,
            m10,
            m11,
            m12,
        }
    }

    /// Matrix product `self × other`; `other` is applied to points first.
    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        Self {
            m00: self.m00 * other.m00 + self.m01 * other.m10,
            m01: self.m00 * other.m01 + self.m01 * other.m11,
            m02: self.m00 * other.m02 + self.m01 * other.m12 + self.m02,
            m10: self.m10 * other.m00 + self.m11 * other.m10,
            m11: self.m10 * other.m01 + self.m11 * other.m11,
            m12: self.m10 * other.m02 + self.m11 * other.m12 + self.m12,
        }
    }

    #[must_use]
    pub fn translate(self, tx: f64, ty: f64) -> Self {
        self.compose(Self::new(1.0, 0.0, tx, 0.0, 1.0, ty))
    }

    #[must_use]
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        self.compose(Self::new(sx, 0.0, 0.0, 0.0, sy, 0.0))
    }

    #[must_use]
    pub fn rotate(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        self.compose(Self::new(cos, -sin, 0.0, sin, cos, 0.0))
    }

    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: p.x * self.m00 + p.y * self.m01 + self.m02,
            y: p.x * self.m10 + p.y * self.m11 + self.m12,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
