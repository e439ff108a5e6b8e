// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric queries over a layout.

use kurbo::Rect;
use understory_intent_tree::{BoxId, Direction, Error};

use crate::geometry::{bigger_than, contains, overlaps, partially_overlaps, touches};
use crate::layout::Layout;

/// How [`find_within`] relates a box to the query rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Within {
    /// Boxes fully inside the rectangle.
    #[default]
    Inside,
    /// Boxes overlapping the rectangle without being strictly larger than it.
    Partial,
    /// Boxes that fully contain the rectangle.
    Containing,
}

impl Within {
    /// Maps the `partial`/`contained` flag pair; `contained` wins when both are set.
    pub fn from_flags(partial: bool, contained: bool) -> Self {
        match (partial, contained) {
            (_, true) => Self::Containing,
            (true, false) => Self::Partial,
            (false, false) => Self::Inside,
        }
    }

    /// True if a box with rectangle `candidate` matches `rect`.
    pub fn matches(self, rect: Rect, candidate: Rect) -> bool {
        match self {
            Self::Inside => contains(rect, candidate),
            Self::Partial => overlaps(candidate, rect) && !bigger_than(candidate, rect),
            Self::Containing => contains(candidate, rect),
        }
    }
}

/// Rectangles of two boxes overlap.
pub fn box_overlaps(layout: &Layout, a: BoxId, b: BoxId) -> Result<bool, Error> {
    Ok(overlaps(layout.rect(a)?, layout.rect(b)?))
}

/// Boxes under `root` (outside `ignore`) that no earlier box in depth-first order overlaps.
///
/// This walks document order (post-order), not paint order. Descendants come before their
/// containers, so a box with overlapping content inside it never qualifies while its content
/// can. Among siblings both orders agree: an earlier sibling paints underneath, so nothing in
/// the same parent sits under a top-most box.
pub fn top_most(layout: &Layout, root: BoxId, ignore: &[BoxId]) -> Result<Vec<BoxId>, Error> {
    let candidates = layout.rects(
        layout
            .tree()
            .depth_first(root)
            .filter(|id| !ignore.contains(id)),
    )?;
    Ok(candidates
        .iter()
        .enumerate()
        .filter(|(i, (_, rect))| !candidates[..*i].iter().any(|(_, e)| overlaps(*e, *rect)))
        .map(|(_, (id, _))| *id)
        .collect())
}

/// Stable sort by absolute position along `dir`, ties broken along the other axis.
pub fn sort_by_direction(
    layout: &Layout,
    boxes: &[BoxId],
    dir: Direction,
) -> Result<Vec<BoxId>, Error> {
    let other = dir.other()?;
    let mut keyed = boxes
        .iter()
        .map(|&id| {
            Ok((
                id,
                layout.comp_position_abs(id, dir)?,
                layout.comp_position_abs(id, other)?,
            ))
        })
        .collect::<Result<Vec<_>, Error>>()?;
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.total_cmp(&b.2)));
    Ok(keyed.into_iter().map(|(id, ..)| id).collect())
}

/// Boxes from `boxes` related to `rect` as `mode` says, in input order.
pub fn find_within(
    layout: &Layout,
    rect: Rect,
    mode: Within,
    boxes: impl IntoIterator<Item = BoxId>,
) -> Result<Vec<BoxId>, Error> {
    filter_rects(layout, boxes, |candidate| mode.matches(rect, candidate))
}

/// [`find_within`] over every box of the layout, in depth-first order.
pub fn find_within_layout(layout: &Layout, rect: Rect, mode: Within) -> Result<Vec<BoxId>, Error> {
    find_within(layout, rect, mode, layout.boxes())
}

/// Boxes that partially overlap `rect`: interiors intersect and neither contains the other.
pub fn find_overlap(
    layout: &Layout,
    rect: Rect,
    boxes: impl IntoIterator<Item = BoxId>,
) -> Result<Vec<BoxId>, Error> {
    filter_rects(layout, boxes, |candidate| {
        partially_overlaps(rect, candidate)
    })
}

/// Boxes whose rectangle contains `rect`.
pub fn find_containers(
    layout: &Layout,
    rect: Rect,
    boxes: impl IntoIterator<Item = BoxId>,
) -> Result<Vec<BoxId>, Error> {
    find_within(layout, rect, Within::Containing, boxes)
}

/// Boxes whose rectangle touches or overlaps `rect`.
pub fn find_touching(
    layout: &Layout,
    rect: Rect,
    boxes: impl IntoIterator<Item = BoxId>,
) -> Result<Vec<BoxId>, Error> {
    filter_rects(layout, boxes, |candidate| touches(rect, candidate))
}

fn filter_rects(
    layout: &Layout,
    boxes: impl IntoIterator<Item = BoxId>,
    keep: impl Fn(Rect) -> bool,
) -> Result<Vec<BoxId>, Error> {
    let mut found = Vec::new();
    for id in boxes {
        if keep(layout.rect(id)?) {
            found.push(id);
        }
    }
    Ok(found)
}
