// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aligned stacks: turn runs of equally sized, aligned boxes into flow containers.
//!
//! Candidates are found per axis by scanning boxes sorted along the other axis, so boxes sharing
//! a near edge end up adjacent. Conflicting candidates are resolved longest first. A kept stack
//! becomes a generated box whose direction is the stack axis; its members lose their absolute
//! offsets and are laid out by flow, with generated gap boxes where they were apart.

use kurbo::Rect;
use tracing::{debug, warn};
use understory_intent_layout::{
    Layout,
    geometry::{contains, extent, rect_between},
    search::{Within, find_within_layout, sort_by_direction, top_most},
};
use understory_intent_tree::{Alignment, BoxId, Direction, Error, IdGen, IntentBox, Length};

use crate::operations::{fresh_id, pin};

/// A run of boxes to be laid out along one axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stack {
    /// Stacking axis.
    pub direction: Direction,
    /// Members in scan order.
    pub boxes: Vec<BoxId>,
}

/// A materialized stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackGroup {
    /// The generated container.
    pub parent: BoxId,
    /// Generated gap boxes between members.
    pub gaps: Vec<BoxId>,
}

/// Same length along `dir` and same absolute position on the other axis.
pub fn aligned(layout: &Layout, a: BoxId, b: BoxId, dir: Direction) -> Result<bool, Error> {
    let other = dir.other()?;
    Ok(layout.comp_length(a, dir)? == layout.comp_length(b, dir)?
        && layout.comp_position_abs(a, other)? == layout.comp_position_abs(b, other)?)
}

/// The rectangle between `a` and `b` along `dir`, spanning `a` on the other axis.
///
/// Its extent along `dir` is negative when the boxes overlap.
pub fn gap_between(layout: &Layout, a: BoxId, b: BoxId, dir: Direction) -> Result<Rect, Error> {
    let other = dir.other()?;
    let a_near = layout.comp_position_abs(a, dir)?;
    let a_len = layout.comp_length(a, dir)?;
    let b_near = layout.comp_position_abs(b, dir)?;
    let cross = layout.comp_position_abs(a, other)?;
    let cross_len = layout.comp_length(a, other)?;
    let (from, to) = (a_near + a_len, b_near);
    Ok(match dir {
        Direction::Horizontal => Rect {
            x0: from,
            y0: cross,
            x1: to,
            y1: cross + cross_len,
        },
        _ => Rect {
            x0: cross,
            y0: from,
            x1: cross + cross_len,
            y1: to,
        },
    })
}

/// `a` and `b` can sit next to each other in one stack along `dir`.
///
/// They must be aligned, must not overlap, and nothing that lies in the gap between them may be
/// independent of the pair.
pub fn stackable(layout: &Layout, a: BoxId, b: BoxId, dir: Direction) -> Result<bool, Error> {
    if !aligned(layout, a, b, dir)? {
        return Ok(false);
    }
    let gap = gap_between(layout, a, b, dir)?;
    let (near, far) = match dir {
        Direction::Horizontal => (gap.x0, gap.x1),
        _ => (gap.y0, gap.y1),
    };
    if far < near {
        return Ok(false);
    }
    let pair = layout.bounding_rect(&[a, b])?;
    for blocker in find_within_layout(layout, gap, Within::Partial)? {
        if !contains(layout.rect(blocker)?, pair) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Candidate stacks among `boxes`, conflicts resolved.
pub fn find_stacks(layout: &Layout, boxes: &[BoxId]) -> Result<Vec<Stack>, Error> {
    let mut candidates = Vec::new();
    for dir in Direction::AXES {
        let sorted = sort_by_direction(layout, boxes, dir.other()?)?;
        let mut run: Vec<BoxId> = Vec::new();
        for pair in sorted.windows(2) {
            if stackable(layout, pair[0], pair[1], dir)? {
                if run.is_empty() {
                    run.push(pair[0]);
                }
                run.push(pair[1]);
            } else if !run.is_empty() {
                candidates.push(Stack {
                    direction: dir,
                    boxes: core::mem::take(&mut run),
                });
            }
        }
        if !run.is_empty() {
            candidates.push(Stack {
                direction: dir,
                boxes: run,
            });
        }
    }
    Ok(resolve_conflicts(candidates))
}

/// Keeps the longest candidate, strips its members from the rest, and repeats.
///
/// Ties keep the earlier candidate. Candidates shrunk to one box are dropped.
pub fn resolve_conflicts(mut candidates: Vec<Stack>) -> Vec<Stack> {
    let mut kept = Vec::new();
    loop {
        candidates.retain(|s| s.boxes.len() > 1);
        candidates.sort_by(|a, b| b.boxes.len().cmp(&a.boxes.len()));
        if candidates.is_empty() {
            return kept;
        }
        let best = candidates.remove(0);
        for other in &mut candidates {
            other.boxes.retain(|b| !best.boxes.contains(b));
        }
        kept.push(best);
    }
}

/// Moves a stack's members into a new generated flow container.
///
/// The container goes right after `after` when that is a sibling of the members, and otherwise
/// takes the slot of the bottom-most member, so siblings painted under the members stay under
/// the container. Fails with [`Error::InvalidArgument`] for fewer than two members or members
/// with different parents.
pub fn create_stack(
    layout: &mut Layout,
    stack: &Stack,
    after: Option<BoxId>,
    ids: &mut IdGen,
) -> Result<StackGroup, Error> {
    let dir = stack.direction.axis()?;
    if stack.boxes.len() < 2 {
        return Err(Error::InvalidArgument("a stack needs two boxes"));
    }
    let tree = layout.tree();
    let parent = tree
        .parent_of(stack.boxes[0])
        .ok_or(Error::InvalidArgument("stacked boxes need a parent"))?;
    if stack
        .boxes
        .iter()
        .any(|&b| tree.parent_of(b) != Some(parent))
    {
        return Err(Error::InvalidArgument("stacked boxes must share a parent"));
    }
    let index = match after {
        Some(a) if tree.parent_of(a) == Some(parent) => tree.index_of_child(a).map_or(0, |i| i + 1),
        _ => stack
            .boxes
            .iter()
            .filter_map(|&b| tree.index_of_child(b))
            .min()
            .unwrap_or(0),
    };
    let members = sort_by_direction(layout, &stack.boxes, dir)?;
    let rects = layout.rects(members.iter().copied())?;
    let bound = layout.bounding_rect(&members)?;
    let origin = layout.rect(parent)?.origin();

    let group_id = fresh_id(layout, ids);
    let group = layout.tree_mut().insert_at(
        parent,
        index,
        IntentBox::px(bound.width(), bound.height())
            .at(bound.x0 - origin.x, bound.y0 - origin.y)
            .with_direction(dir)
            .with_alignment(Alignment::Near, Alignment::Near)
            .with_id(group_id)
            .generated(),
    );

    let mut gaps = Vec::new();
    let mut previous: Option<Rect> = None;
    for (member, rect) in rects {
        if let Some(prev) = previous {
            let between = rect_between(prev, rect, dir)?;
            let length = extent(between, dir)?;
            if length > 0.0 {
                let mut filler = IntentBox::default().generated();
                *filler.length_mut(dir)? = Length::Pixels(length);
                *filler.length_mut(dir.other()?)? = Length::Pixels(extent(prev, dir.other()?)?);
                filler.id = Some(fresh_id(layout, ids));
                let gap = layout.tree_mut().insert(Some(group), filler);
                gaps.push(gap);
            }
        }
        layout.tree_mut().append_child(group, member)?;
        pin(layout, member, rect, bound.origin())?;
        layout.tree_mut()[member].absolute = None;
        previous = Some(rect);
    }
    debug!(?group, ?dir, members = members.len(), "created stack");
    Ok(StackGroup {
        parent: group,
        gaps,
    })
}

/// Materializes stacks among the top-most boxes until a round finds none.
///
/// Boxes are only stacked with siblings. Stops after `max_rounds` rounds. Returns the created
/// stack containers.
pub fn apply_stacks(
    layout: &mut Layout,
    id_prefix: &str,
    max_rounds: usize,
) -> Result<Vec<BoxId>, Error> {
    let mut ids = IdGen::new(id_prefix);
    let mut consumed: Vec<BoxId> = Vec::new();
    let mut created = Vec::new();
    for round in 0..max_rounds {
        let root = layout.root();
        let candidates = top_most(layout, root, &consumed)?;
        let mut buckets: Vec<(Option<BoxId>, Vec<BoxId>)> = Vec::new();
        for id in candidates {
            let parent = layout.tree().parent_of(id);
            match buckets.iter_mut().find(|(p, _)| *p == parent) {
                Some((_, members)) => members.push(id),
                None => buckets.push((parent, vec![id])),
            }
        }

        let mut found = 0;
        for (_, members) in buckets {
            for stack in find_stacks(layout, &members)? {
                let group = create_stack(layout, &stack, None, &mut ids)?;
                consumed.extend(stack.boxes.iter().copied());
                consumed.extend(group.gaps.iter().copied());
                created.push(group.parent);
                found += 1;
            }
        }
        debug!(round, stacks = found, "stack round");
        if found == 0 {
            return Ok(created);
        }
    }
    warn!(max_rounds, "stacking stopped before reaching a fixed point");
    Ok(created)
}
