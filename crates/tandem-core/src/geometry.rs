//! Geometric primitives for diagram layout and edge routing.
//!
//! # Overview
//!
//! - [`Point`]: node positions, anchors and control points
//! - [`Size`]: measured or default node extents
//! - [`Bounds`]: axis-aligned boxes, used for hit sides and the SVG viewBox
//! - [`Side`]: where an edge leaves or enters a node
//!
//! # Coordinate System
//!
//! Tandem uses a coordinate system consistent with SVG:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Node positions are the top-left corner of the node box, which is what the
//! rendering surface expects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in diagram space, y growing downwards.
///
/// ```
/// # use tandem_core::geometry::Point;
/// let anchor = Point::new(150.0, 25.0);
/// let control = anchor.add_point(Point::new(50.0, 0.0));
/// assert_eq!(control, Point::new(200.0, 25.0));
/// assert_eq!(anchor.midpoint(control).x(), 175.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Component-wise sum.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Component-wise difference, `self - other`.
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Length of the vector from the origin to this point.
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// False if either coordinate is NaN or infinite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height of a node box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Per-axis maximum, used to enforce minimum node sizes.
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// True for a node that has not been measured yet.
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned box given by its corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn to_size(self) -> Size {
        Size {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Smallest box covering both `self` and `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tandem_core::geometry::{Bounds, Point, Size};
    /// let group = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(300.0, 200.0));
    /// let node = Bounds::new_from_top_left(Point::new(250.0, 150.0), Size::new(150.0, 50.0));
    ///
    /// let combined = group.merge(&node);
    /// assert_eq!(combined.width(), 400.0);
    /// assert_eq!(combined.height(), 200.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Shifts the box by `offset` without resizing it.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Returns the midpoint of the given side of the box.
    ///
    /// # Examples
    ///
    /// ```
    /// # use tandem_core::geometry::{Bounds, Point, Side, Size};
    /// let node = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 40.0));
    ///
    /// assert_eq!(node.side_midpoint(Side::Right), Point::new(100.0, 20.0));
    /// assert_eq!(node.side_midpoint(Side::Top), Point::new(50.0, 0.0));
    /// ```
    pub fn side_midpoint(self, side: Side) -> Point {
        let center = self.center();
        match side {
            Side::Top => Point::new(center.x, self.min_y),
            Side::Right => Point::new(self.max_x, center.y),
            Side::Bottom => Point::new(center.x, self.max_y),
            Side::Left => Point::new(self.min_x, center.y),
        }
    }
}

/// A side of a node box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_add_and_sub() {
        let p1 = Point::new(10.0, 20.0);
        let p2 = Point::new(3.0, 4.0);

        assert_eq!(p1.add_point(p2), Point::new(13.0, 24.0));
        assert_eq!(p1.sub_point(p2), Point::new(7.0, 16.0));
    }

    #[test]
    fn test_point_hypot() {
        assert_eq!(Point::new(3.0, 4.0).hypot(), 5.0);
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, -1.0).is_finite());
        assert!(!Point::new(f32::NAN, 0.0).is_finite());
        assert!(!Point::new(0.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_bounds_new_from_top_left() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(100.0, 50.0));

        assert_eq!(bounds.min_x(), 10.0);
        assert_eq!(bounds.min_y(), 20.0);
        assert_eq!(bounds.max_x(), 110.0);
        assert_eq!(bounds.max_y(), 70.0);
        assert_eq!(bounds.center(), Point::new(60.0, 45.0));
        assert_eq!(bounds.to_size(), Size::new(100.0, 50.0));
    }

    #[test]
    fn test_bounds_side_midpoints() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(150.0, 50.0));

        assert_eq!(bounds.side_midpoint(Side::Top), Point::new(75.0, 0.0));
        assert_eq!(bounds.side_midpoint(Side::Right), Point::new(150.0, 25.0));
        assert_eq!(bounds.side_midpoint(Side::Bottom), Point::new(75.0, 50.0));
        assert_eq!(bounds.side_midpoint(Side::Left), Point::new(0.0, 25.0));
    }

    #[test]
    fn test_size_max() {
        let size = Size::new(10.0, 80.0).max(Size::new(150.0, 50.0));
        assert_eq!(size, Size::new(150.0, 80.0));
        assert!(Size::default().is_zero());
    }
}
