// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural edits that keep every box where it was drawn.
//!
//! Moving a box to a new parent changes what its offsets and relative lengths resolve against,
//! so each move here is followed by a [`pin`]: the box gets pixel offsets relative to its new
//! parent, and any length that depended on the old parent is frozen to its pixel value.

use kurbo::{Point, Rect};
use tracing::trace;
use understory_intent_layout::Layout;
use understory_intent_tree::{Absolute, BoxId, Error, IdGen, IntentBox, Length};

/// Fixes a box at `rect` (absolute pixels) inside a parent whose top-left corner is `origin`.
///
/// Every length other than `Pixels` becomes the pixel size of `rect`. Relative lengths follow
/// the parent, and `Shrink` resolves to zero across a stacking parent, so neither survives a
/// move.
pub fn pin(layout: &mut Layout, id: BoxId, rect: Rect, origin: Point) -> Result<(), Error> {
    let data = layout
        .tree_mut()
        .get_mut(id)
        .ok_or(Error::InvalidArgument("stale box id"))?;
    if data.w.is_parent_relative() || data.w == Length::Shrink {
        data.w = Length::Pixels(rect.width());
    }
    if data.h.is_parent_relative() || data.h == Length::Shrink {
        data.h = Length::Pixels(rect.height());
    }
    data.absolute = Some(Absolute::at(rect.x0 - origin.x, rect.y0 - origin.y));
    Ok(())
}

/// An id from `ids` that no box in the layout uses yet.
pub(crate) fn fresh_id(layout: &Layout, ids: &mut IdGen) -> String {
    ids.next_unused(&layout.tree().ids_in_use(layout.root()))
}

/// Moves `id` under `parent` at `index` and pins it where it was drawn.
fn move_pinned(
    layout: &mut Layout,
    id: BoxId,
    parent: BoxId,
    index: usize,
    rect: Rect,
) -> Result<(), Error> {
    layout.tree_mut().insert_child(parent, index, id)?;
    // Out of flow first so the parent's own size cannot depend on the newcomer.
    pin(layout, id, rect, Point::ZERO)?;
    let origin = layout.rect(parent)?.origin();
    pin(layout, id, rect, origin)
}

/// Collects sibling boxes under a new generated parent.
///
/// The group takes the bounding rectangle of `boxes`, is inserted at the lowest index any of
/// them held, and receives them in their existing child order. Returns `None` when there is
/// nothing to group: fewer than two boxes, or every child of the parent.
///
/// Fails with [`Error::InvalidArgument`] if the boxes do not share one parent.
pub fn group_children(
    layout: &mut Layout,
    boxes: &[BoxId],
    id: impl Into<String>,
) -> Result<Option<BoxId>, Error> {
    if boxes.len() < 2 {
        return Ok(None);
    }
    let tree = layout.tree();
    let parent = tree
        .parent_of(boxes[0])
        .ok_or(Error::InvalidArgument("grouped boxes need a parent"))?;
    if boxes.iter().any(|&b| tree.parent_of(b) != Some(parent)) {
        return Err(Error::InvalidArgument("grouped boxes must share a parent"));
    }
    let siblings = tree.children_of(parent);
    let mut members: Vec<BoxId> = siblings
        .iter()
        .copied()
        .filter(|c| boxes.contains(c))
        .collect();
    members.dedup();
    if members.len() < 2 || members.len() == siblings.len() {
        return Ok(None);
    }
    let index = tree.index_of_child(members[0]).unwrap_or(0);

    let rects = layout.rects(members.iter().copied())?;
    let bound = layout.bounding_rect(&members)?;
    let parent_origin = layout.rect(parent)?.origin();
    let group = layout.tree_mut().insert_at(
        parent,
        index,
        IntentBox::px(bound.width(), bound.height())
            .at(bound.x0 - parent_origin.x, bound.y0 - parent_origin.y)
            .with_id(id)
            .generated(),
    );
    for (member, rect) in rects {
        layout.tree_mut().append_child(group, member)?;
        pin(layout, member, rect, bound.origin())?;
    }
    trace!(?group, count = members.len(), "grouped siblings");
    Ok(Some(group))
}

/// Splits a box into a generated container and a backdrop.
///
/// A generated copy of `id` takes its place in the parent and adopts its children. `id` becomes
/// the copy's first child, filling it from the top-left corner. Returns the new container.
pub fn wrap_box(layout: &mut Layout, id: BoxId, ids: &mut IdGen) -> Result<BoxId, Error> {
    let tree = layout.tree();
    let parent = tree
        .parent_of(id)
        .ok_or(Error::InvalidArgument("cannot wrap a root box"))?;
    let index = tree.index_of_child(id).unwrap_or(0);
    let rect = layout.rect(id)?;
    let data = layout.data(id)?;
    let wrapper_data = IntentBox {
        id: Some(fresh_id(layout, ids)),
        layer_id: None,
        text: None,
        generated: true,
        ..data.clone()
    };
    let children = tree.children_of(id).to_vec();

    let tree = layout.tree_mut();
    let wrapper = tree.insert_at(parent, index, wrapper_data);
    for child in children {
        tree.append_child(wrapper, child)?;
    }
    tree.insert_child(wrapper, 0, id)?;
    let backdrop = &mut tree[id];
    // Shrink would look past the wrapper, so those fall back to pixels.
    backdrop.w = match backdrop.w {
        Length::Shrink => Length::Pixels(rect.width()),
        _ => Length::Percent(1.0),
    };
    backdrop.h = match backdrop.h {
        Length::Shrink => Length::Pixels(rect.height()),
        _ => Length::Percent(1.0),
    };
    backdrop.absolute = Some(Absolute::at(0.0, 0.0));
    trace!(?id, ?wrapper, "wrapped box");
    Ok(wrapper)
}

/// Moves `id` under `container` without changing what is drawn.
///
/// - If `container` already is the parent, nothing happens.
/// - If `container` is an ancestor, `id` lands right after the branch that held it, so it still
///   paints over everything in that branch.
/// - If `id` paints before `container`, it must stay underneath: a container with its own
///   content is first split by [`wrap_box`], and `id` goes to the front of the result.
/// - Otherwise `id` is appended.
///
/// Returns the wrapper when one was created. Fails with [`Error::Cycle`] if `container` is `id`
/// or inside it.
pub fn reparent(
    layout: &mut Layout,
    id: BoxId,
    container: BoxId,
    ids: &mut IdGen,
) -> Result<Option<BoxId>, Error> {
    let tree = layout.tree();
    if !tree.is_alive(id) || !tree.is_alive(container) {
        return Err(Error::InvalidArgument("stale box id"));
    }
    if tree.is_ancestor(id, container) {
        return Err(Error::Cycle);
    }
    if tree.parent_of(id) == Some(container) {
        return Ok(None);
    }
    let rect = layout.rect(id)?;

    if let Some(branch) = tree.branch_toward(container, id) {
        let index = tree.index_of_child(branch).map_or(0, |i| i + 1);
        move_pinned(layout, id, container, index, rect)?;
        return Ok(None);
    }
    if tree.is_before(id, container) {
        let (target, wrapper) = if tree[container].has_content() {
            let wrapper = wrap_box(layout, container, ids)?;
            (wrapper, Some(wrapper))
        } else {
            (container, None)
        };
        move_pinned(layout, id, target, 0, rect)?;
        return Ok(wrapper);
    }
    move_pinned(layout, id, container, usize::MAX, rect)?;
    Ok(None)
}
