// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Containment: move each box under the tightest box that visually encloses it.
//!
//! A box that partially overlaps anything is left for the overlap pass. Otherwise the nearest
//! enclosing box is looked up on both sides of it in paint order and the smaller one wins.
//! When the box paints before its new container, the container is wrapped so its own paint
//! stays on top (see [`operations::reparent`](crate::operations::reparent)).

use hashbrown::HashMap;
use kurbo::Rect;
use tracing::{debug, trace, warn};
use understory_intent_layout::{
    Layout,
    geometry::{contains, partially_overlaps},
};
use understory_intent_tree::{BoxId, Error, IdGen};

use crate::operations;

/// Absolute rectangles looked up during one sweep.
///
/// Every edit in a sweep keeps boxes where they were drawn, so an entry stays valid until the
/// sweep ends. Boxes created on the way are measured on first lookup.
#[derive(Debug, Default)]
struct RectCache(HashMap<BoxId, Rect>);

impl RectCache {
    fn new(layout: &Layout) -> Result<Self, Error> {
        Ok(Self(layout.rects(layout.boxes())?.into_iter().collect()))
    }

    fn get(&mut self, layout: &Layout, id: BoxId) -> Result<Rect, Error> {
        if let Some(&rect) = self.0.get(&id) {
            return Ok(rect);
        }
        let rect = layout.rect(id)?;
        self.0.insert(id, rect);
        Ok(rect)
    }
}

/// The tightest enclosing box on either side of `id` in paint order.
///
/// The nearest container painted above `id` and the nearest painted below it are compared by
/// area; on equal area the one above wins. Descendants of `id` are never candidates.
pub fn find_container(layout: &Layout, id: BoxId) -> Result<Option<BoxId>, Error> {
    find_container_cached(layout, id, &mut RectCache::default())
}

fn find_container_cached(
    layout: &Layout,
    id: BoxId,
    rects: &mut RectCache,
) -> Result<Option<BoxId>, Error> {
    let tree = layout.tree();
    let rect = rects.get(layout, id)?;
    let order: Vec<BoxId> = tree.paint_order(layout.root()).collect();
    let Some(pos) = order.iter().position(|&b| b == id) else {
        return Ok(None);
    };
    let above = first_container(
        layout,
        rects,
        rect,
        order[pos + 1..]
            .iter()
            .copied()
            .filter(|&b| !tree.is_ancestor(id, b)),
    )?;
    let below = first_container(layout, rects, rect, order[..pos].iter().rev().copied())?;
    Ok(match (above, below) {
        (Some((a, a_area)), Some((b, b_area))) => Some(if b_area < a_area { b } else { a }),
        (found, None) | (None, found) => found.map(|(b, _)| b),
    })
}

fn first_container(
    layout: &Layout,
    rects: &mut RectCache,
    rect: Rect,
    candidates: impl Iterator<Item = BoxId>,
) -> Result<Option<(BoxId, f64)>, Error> {
    for candidate in candidates {
        let candidate_rect = rects.get(layout, candidate)?;
        if contains(candidate_rect, rect) {
            return Ok(Some((candidate, candidate_rect.area())));
        }
    }
    Ok(None)
}

fn overlaps_anything(layout: &Layout, rects: &mut RectCache, rect: Rect) -> Result<bool, Error> {
    for other in layout.boxes() {
        if partially_overlaps(rect, rects.get(layout, other)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// True if moving `id` under `container` would not say anything new.
///
/// That holds when `container` is an ancestor, when it has the same rectangle as `id`, and when
/// it is a sibling acting as a backdrop that fills the shared parent.
pub fn is_contained_by(layout: &Layout, id: BoxId, container: BoxId) -> Result<bool, Error> {
    let tree = layout.tree();
    if tree.is_ancestor(container, id) {
        return Ok(true);
    }
    let rect = layout.rect(id)?;
    let container_rect = layout.rect(container)?;
    if container_rect == rect {
        return Ok(true);
    }
    let Some(parent) = tree.parent_of(id) else {
        return Ok(false);
    };
    if tree.parent_of(container) != Some(parent) {
        return Ok(false);
    }
    Ok(container_rect == layout.rect(parent)?)
}

/// One containment sweep over every box, in document order.
///
/// Returns the wrappers created on the way.
pub fn contain_boxes(layout: &mut Layout, ids: &mut IdGen) -> Result<Vec<BoxId>, Error> {
    let worklist: Vec<BoxId> = layout.boxes().collect();
    let mut rects = RectCache::new(layout)?;
    let mut wrappers = Vec::new();
    for id in worklist {
        if !layout.tree().is_alive(id) {
            continue;
        }
        let rect = rects.get(layout, id)?;
        if overlaps_anything(layout, &mut rects, rect)? {
            trace!(?id, "overlapping, left for clustering");
            continue;
        }
        let Some(container) = find_container_cached(layout, id, &mut rects)? else {
            continue;
        };
        if is_contained_by(layout, id, container)? {
            continue;
        }
        let wrapper = operations::reparent(layout, id, container, ids)?;
        debug!(?id, ?container, ?wrapper, "contained box");
        wrappers.extend(wrapper);
    }
    Ok(wrappers)
}

/// Repeats [`contain_boxes`] until a sweep creates no wrapper.
///
/// Stops after `max_rounds` sweeps. Returns every wrapper created.
pub fn contain_layout(
    layout: &mut Layout,
    id_prefix: &str,
    max_rounds: usize,
) -> Result<Vec<BoxId>, Error> {
    let mut ids = IdGen::new(id_prefix);
    let mut created = Vec::new();
    for round in 0..max_rounds {
        let wrappers = contain_boxes(layout, &mut ids)?;
        debug!(round, wrappers = wrappers.len(), "containment sweep");
        if wrappers.is_empty() {
            return Ok(created);
        }
        created.extend(wrappers);
    }
    warn!(max_rounds, "containment stopped before reaching a fixed point");
    Ok(created)
}
