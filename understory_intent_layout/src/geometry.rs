// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle predicates and per-axis helpers.
//!
//! Rectangles are [`kurbo::Rect`]s in absolute pixel space. Float inputs are assumed to be
//! finite (no NaNs).

use kurbo::Rect;
use understory_intent_tree::{Direction, Error};

/// Interiors intersect.
///
/// Edges do not count, so boxes that merely share an edge do not overlap. A zero-width
/// rectangle still overlaps any box that crosses it.
///
/// ```
/// use kurbo::Rect;
/// use understory_intent_layout::geometry::overlaps;
///
/// let a = Rect::new(0.0, 0.0, 10.0, 10.0);
/// assert!(overlaps(a, Rect::new(5.0, 5.0, 15.0, 15.0)));
/// assert!(!overlaps(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
/// assert!(overlaps(a, Rect::new(5.0, 0.0, 5.0, 10.0)));
/// ```
pub fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

/// Rectangles overlap or share an edge or corner.
pub fn touches(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// `outer` contains `inner`, edges included.
pub fn contains(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && inner.x1 <= outer.x1 && outer.y0 <= inner.y0 && inner.y1 <= outer.y1
}

/// `a` is at least as wide and as tall as `b`, and strictly larger in one of the two.
pub fn bigger_than(a: Rect, b: Rect) -> bool {
    let (aw, ah, bw, bh) = (a.width(), a.height(), b.width(), b.height());
    aw >= bw && ah >= bh && (aw > bw || ah > bh)
}

/// Rectangles overlap without either containing the other.
pub fn partially_overlaps(a: Rect, b: Rect) -> bool {
    overlaps(a, b) && !contains(a, b) && !contains(b, a)
}

/// Smallest rectangle enclosing all of `rects`, or `None` if there are none.
pub fn bounding_rect(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|acc, r| acc.union(r))
}

/// `(near, far)` edges of a rectangle along an axis.
pub fn span(rect: Rect, dir: Direction) -> Result<(f64, f64), Error> {
    match dir.axis()? {
        Direction::Horizontal => Ok((rect.x0, rect.x1)),
        _ => Ok((rect.y0, rect.y1)),
    }
}

/// Near edge along an axis.
pub fn near(rect: Rect, dir: Direction) -> Result<f64, Error> {
    span(rect, dir).map(|(n, _)| n)
}

/// Extent along an axis.
pub fn extent(rect: Rect, dir: Direction) -> Result<f64, Error> {
    span(rect, dir).map(|(n, f)| f - n)
}

/// `rect` with its span along `dir` replaced.
pub fn with_span(rect: Rect, dir: Direction, near: f64, far: f64) -> Result<Rect, Error> {
    match dir.axis()? {
        Direction::Horizontal => Ok(Rect::new(near, rect.y0, far, rect.y1)),
        _ => Ok(Rect::new(rect.x0, near, rect.x1, far)),
    }
}

/// The rectangle strictly between `a` and `b` along `dir`.
///
/// It runs from `a`'s far edge to `b`'s near edge and covers both rectangles on the other axis.
pub fn rect_between(a: Rect, b: Rect, dir: Direction) -> Result<Rect, Error> {
    let (_, from) = span(a, dir)?;
    let (to, _) = span(b, dir)?;
    with_span(a.union(b), dir, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_strict_touch_is_not() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let edge = Rect::new(10.0, 0.0, 20.0, 10.0);
        let corner = Rect::new(10.0, 10.0, 20.0, 20.0);
        let apart = Rect::new(11.0, 0.0, 20.0, 10.0);
        assert!(!overlaps(a, edge));
        assert!(touches(a, edge));
        assert!(touches(a, corner));
        assert!(!touches(a, apart));
    }

    #[test]
    fn seams_detect_crossing_boxes() {
        let seam = Rect::new(20.0, 0.0, 20.0, 20.0);
        assert!(overlaps(seam, Rect::new(10.0, 5.0, 30.0, 15.0)));
        assert!(!overlaps(seam, Rect::new(0.0, 0.0, 20.0, 20.0)));
        assert!(!overlaps(seam, Rect::new(20.0, 0.0, 40.0, 20.0)));
    }

    #[test]
    fn containment_includes_edges() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(contains(outer, outer));
        assert!(contains(outer, Rect::new(0.0, 2.0, 10.0, 4.0)));
        assert!(!contains(outer, Rect::new(-1.0, 2.0, 10.0, 4.0)));
        assert!(!partially_overlaps(outer, Rect::new(2.0, 2.0, 4.0, 4.0)));
        assert!(partially_overlaps(outer, Rect::new(5.0, 5.0, 15.0, 15.0)));
    }

    #[test]
    fn bigger_is_dimensional() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(bigger_than(a, Rect::new(0.0, 0.0, 10.0, 5.0)));
        assert!(!bigger_than(a, a));
        assert!(!bigger_than(a, Rect::new(0.0, 0.0, 20.0, 1.0)));
        assert!(!bigger_than(Rect::new(0.0, 0.0, 20.0, 10.0), Rect::new(0.0, 0.0, 0.0, 20.0)));
    }

    #[test]
    fn axis_helpers() {
        let r = Rect::new(1.0, 2.0, 5.0, 10.0);
        assert_eq!(span(r, Direction::Vertical), Ok((2.0, 10.0)));
        assert_eq!(extent(r, Direction::Horizontal), Ok(4.0));
        assert!(near(r, Direction::None).is_err());
        let between = rect_between(
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(15.0, 0.0, 20.0, 12.0),
            Direction::Horizontal,
        );
        assert_eq!(between, Ok(Rect::new(10.0, 0.0, 15.0, 12.0)));
        assert_eq!(bounding_rect([]), None);
        assert_eq!(
            bounding_rect([r, Rect::new(0.0, 0.0, 1.0, 1.0)]),
            Some(Rect::new(0.0, 0.0, 5.0, 10.0))
        );
    }
}
