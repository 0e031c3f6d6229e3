//! # Common Foundation Crate
//!
//! Geometry primitives shared by the layout table, the overlay renderer and
//! the agent: points, rectangles and four-sided edge values.

#![forbid(unsafe_code)]

use core::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Point
// ─────────────────────────────────────────────────────────────────────────────

/// A position in CSS pixels.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle defined by origin `(x, y)` and size `(w, h)`.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, w: 0.0, h: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.h
    }

    /// Zero width *and* zero height. A collapsed line (one axis zero) still
    /// counts as rendered.
    #[inline]
    pub fn has_no_area(self) -> bool {
        self.w == 0.0 && self.h == 0.0
    }

    /// Does the rectangle contain the given point?
    #[inline]
    pub fn contains(self, px: f32, py: f32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.w && py < self.y + self.h
    }

    /// True when the whole rectangle lies inside a `width × height` viewport
    /// anchored at the origin.
    pub fn fits_within(self, width: f32, height: f32) -> bool {
        self.y >= 0.0 && self.x >= 0.0 && self.bottom() <= height && self.right() <= width
    }

    #[inline]
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            w: self.w,
            h: self.h,
        }
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({}, {}, {}×{})", self.x, self.y, self.w, self.h)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Side / Edges<T>
// ─────────────────────────────────────────────────────────────────────────────

/// One side of a box, in CSS shorthand order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The CSS keyword used in longhand property names (`margin-top`, …).
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Four-sided values (e.g. margin, padding, border widths).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edges<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy + Default> Edges<T> {
    #[inline]
    pub fn zero() -> Self {
        Self::all(T::default())
    }

    #[inline]
    pub fn all(v: T) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Expand a 1–4 value CSS shorthand list (`margin: 1px 2px` …).
    /// Returns `None` for an empty or over-long list.
    pub fn from_shorthand(values: &[T]) -> Option<Self> {
        let (top, right, bottom, left) = match *values {
            [a] => (a, a, a, a),
            [v, h] => (v, h, v, h),
            [t, h, b] => (t, h, b, h),
            [t, r, b, l] => (t, r, b, l),
            _ => return None,
        };
        Some(Self { top, right, bottom, left })
    }

    #[inline]
    pub fn get(&self, side: Side) -> T {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

impl<T: Copy + Add<Output = T>> Edges<T> {
    /// Sum of left + right.
    #[inline]
    pub fn horizontal(&self) -> T {
        self.left + self.right
    }

    /// Sum of top + bottom.
    #[inline]
    pub fn vertical(&self) -> T {
        self.top + self.bottom
    }
}

impl<T: Default> Default for Edges<T> {
    fn default() -> Self {
        Self {
            top: T::default(),
            right: T::default(),
            bottom: T::default(),
            left: T::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_expansion() {
        assert_eq!(Edges::from_shorthand(&[1]), Some(Edges::all(1)));
        let two = Edges::from_shorthand(&[1, 2]).unwrap();
        assert_eq!((two.top, two.right, two.bottom, two.left), (1, 2, 1, 2));
        let three = Edges::from_shorthand(&[1, 2, 3]).unwrap();
        assert_eq!((three.top, three.right, three.bottom, three.left), (1, 2, 3, 2));
        let four = Edges::from_shorthand(&[1, 2, 3, 4]).unwrap();
        assert_eq!(four.get(Side::Left), 4);
        assert_eq!(Edges::<i32>::from_shorthand(&[]), None);
        assert_eq!(Edges::from_shorthand(&[1, 2, 3, 4, 5]), None);
    }

    #[test]
    fn edge_sums() {
        let e = Edges { top: 1.0, right: 2.0, bottom: 3.0, left: 4.0 };
        assert_eq!(e.horizontal(), 6.0);
        assert_eq!(e.vertical(), 4.0);
    }

    #[test]
    fn rect_viewport_containment() {
        let r = Rect::new(10.0, 10.0, 100.0, 50.0);
        assert!(r.fits_within(800.0, 600.0));
        assert!(!r.translate(0.0, 580.0).fits_within(800.0, 600.0));
        assert!(!r.translate(-20.0, 0.0).fits_within(800.0, 600.0));
    }

    #[test]
    fn zero_area_only_when_both_axes_collapse() {
        assert!(Rect::new(5.0, 5.0, 0.0, 0.0).has_no_area());
        assert!(!Rect::new(5.0, 5.0, 0.0, 10.0).has_no_area());
    }

    #[test]
    fn rect_roundtrips_through_json() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"x":1.0,"y":2.0,"w":3.0,"h":4.0}"#);
    }
}
