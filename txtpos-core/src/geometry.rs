// Geometry primitives for rule lines drawn on a page.
//
// NOTE ON NAMING: `is_vertical` and `is_horizontal` are named the opposite way
// round from what they check. `is_vertical` tests that the two endpoints have
// (nearly) the same *y*, `is_horizontal` that they have (nearly) the same *x*.
// Grid building relies on this exact classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default classification margin in page units.
pub const DEFAULT_LINE_MARGIN: f64 = 2.0;

/// A straight vector line drawn on a page, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Segment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// True when the endpoints' y-difference is below `margin`.
    ///
    /// See the module note: this is a y-closeness test despite the name.
    pub fn is_vertical(&self, margin: f64) -> bool {
        (self.y2 - self.y1).abs() < margin
    }

    /// True when the endpoints' x-difference is below `margin`.
    ///
    /// See the module note: this is an x-closeness test despite the name.
    pub fn is_horizontal(&self, margin: f64) -> bool {
        (self.x2 - self.x1).abs() < margin
    }

    /// Axis-aligned bounding box of the segment.
    pub fn bounds(&self) -> Rect {
        Rect {
            left: self.x1.min(self.x2),
            top: self.y1.min(self.y2),
            right: self.x1.max(self.x2),
            bottom: self.y1.max(self.y2),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Axis-aligned rectangle with `left <= right` and `top <= bottom`.
///
/// "top" is simply the smaller y; no page orientation is assumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Grow every edge outwards by `amount`.
    pub fn expand(&self, amount: f64) -> Rect {
        Rect {
            left: self.left - amount,
            top: self.top - amount,
            right: self.right + amount,
            bottom: self.bottom + amount,
        }
    }

    /// Closed-interval overlap test (touching edges intersect).
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_close_segment_is_classified_vertical() {
        // A rule drawn left-to-right at constant y.
        let seg = Segment::new(10.0, 50.0, 200.0, 50.5);
        assert!(seg.is_vertical(DEFAULT_LINE_MARGIN));
        assert!(!seg.is_horizontal(DEFAULT_LINE_MARGIN));
    }

    #[test]
    fn x_close_segment_is_classified_horizontal() {
        let seg = Segment::new(80.0, 10.0, 81.0, 300.0);
        assert!(seg.is_horizontal(DEFAULT_LINE_MARGIN));
        assert!(!seg.is_vertical(DEFAULT_LINE_MARGIN));
    }

    #[test]
    fn short_segment_can_be_both_and_diagonal_neither() {
        let dot = Segment::new(5.0, 5.0, 6.0, 6.0);
        assert!(dot.is_vertical(DEFAULT_LINE_MARGIN));
        assert!(dot.is_horizontal(DEFAULT_LINE_MARGIN));

        let diagonal = Segment::new(0.0, 0.0, 50.0, 50.0);
        assert!(!diagonal.is_vertical(DEFAULT_LINE_MARGIN));
        assert!(!diagonal.is_horizontal(DEFAULT_LINE_MARGIN));
    }

    #[test]
    fn margin_is_exclusive() {
        let seg = Segment::new(0.0, 0.0, 100.0, 2.0);
        assert!(!seg.is_vertical(2.0));
        assert!(seg.is_vertical(2.0001));
    }

    #[test]
    fn display_matches_record_form() {
        let seg = Segment::new(1.5, 2.0, 3.25, 4.0);
        assert_eq!(seg.to_string(), "1.5,2,3.25,4");
    }

    #[test]
    fn rect_intersection_counts_touching_edges() {
        let a = Segment::new(0.0, 10.0, 100.0, 10.0).bounds();
        let b = Segment::new(100.0, 10.0, 100.0, 80.0).bounds();
        assert!(a.intersects(&b));

        let far = Segment::new(300.0, 10.0, 300.0, 80.0).bounds();
        assert!(!a.intersects(&far));
        assert!(!a.expand(3.0).intersects(&far.expand(3.0)));
    }
}
