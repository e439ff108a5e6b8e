// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gap partitioning: split a box's children into rows or columns along empty bands.
//!
//! For each axis the children's spans are subtracted from the box's span with [`Ranges`]; what
//! is left strictly inside the box are the gaps. The axis whose gaps cover more area wins, the
//! children between consecutive gaps are grouped, and the box becomes a stack along that axis.
//!
//! ```rust
//! use understory_intent::partition::{Range, Ranges};
//!
//! let mut free = Ranges::new(Range::new(0.0, 10.0));
//! free.remove_range(Range::new(4.0, 6.0));
//! assert_eq!(free.ranges(), [Range::new(0.0, 4.0), Range::new(6.0, 10.0)]);
//! assert!(free.middle_ranges().is_empty());
//! ```

use kurbo::Rect;
use smallvec::SmallVec;
use tracing::{debug, trace};
use understory_intent_layout::{
    Layout,
    geometry::{rect_between, span, with_span},
    search::{Within, find_within, sort_by_direction},
};
use understory_intent_tree::{BoxId, Direction, Error, IdGen};

use crate::operations::{fresh_id, group_children, pin};

/// Closed interval `[near, far]` on one axis.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Range {
    /// Start.
    pub near: f64,
    /// End.
    pub far: f64,
}

impl Range {
    /// The interval from `near` to `far`.
    pub fn new(near: f64, far: f64) -> Self {
        Self { near, far }
    }

    /// `far - near`.
    pub fn length(&self) -> f64 {
        self.far - self.near
    }
}

/// Free sub-intervals of an initial range.
///
/// Zero-length entries are kept as markers where a removed range starts exactly at the front
/// of a free interval, so touching children still leave a seam between them.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranges {
    initial: Range,
    ranges: SmallVec<[Range; 8]>,
}

impl Ranges {
    /// Tracks `initial` as one free interval.
    pub fn new(initial: Range) -> Self {
        let mut ranges = SmallVec::new();
        ranges.push(initial);
        Self { initial, ranges }
    }

    /// The interval this started from.
    pub fn initial(&self) -> Range {
        self.initial
    }

    /// Free intervals, sorted.
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Splits the interval at `index` into `first_length` and the rest.
    ///
    /// Does nothing if `index` is out of bounds or `first_length` is longer than the interval.
    pub fn split(&mut self, index: usize, first_length: f64) {
        let Some(&range) = self.ranges.get(index) else {
            return;
        };
        if first_length > range.length() {
            return;
        }
        let cut = range.near + first_length;
        self.ranges[index] = Range::new(range.near, cut);
        self.ranges.insert(index + 1, Range::new(cut, range.far));
    }

    /// Subtracts `removed`. Zero-length ranges are ignored.
    pub fn remove_range(&mut self, removed: Range) {
        if removed.length() == 0.0 {
            return;
        }
        let mut i = 0;
        while let Some(&current) = self.ranges.get(i) {
            if current.far <= removed.near {
                i += 1;
                continue;
            }
            if current.near >= removed.far {
                break;
            }
            if current.near < removed.near {
                self.split(i, removed.near - current.near);
                i += 1;
                continue;
            }
            if current.near == removed.near
                && (i == 0 || self.ranges[i - 1].far != current.near)
            {
                self.split(i, 0.0);
                i += 1;
                continue;
            }
            if current.far < removed.far {
                self.ranges.remove(i);
                continue;
            }
            self.split(i, removed.far - current.near);
            self.ranges.remove(i);
            break;
        }
    }

    /// Free intervals that touch neither end of the initial range.
    pub fn middle_ranges(&self) -> &[Range] {
        let mut start = 0;
        let mut end = self.ranges.len();
        if self
            .ranges
            .first()
            .is_some_and(|r| r.near <= self.initial.near)
        {
            start = 1;
        }
        if end > start
            && self
                .ranges
                .last()
                .is_some_and(|r| r.far >= self.initial.far)
        {
            end -= 1;
        }
        if start >= end {
            return &[];
        }
        &self.ranges[start..end]
    }
}

/// Empty bands across a box along one axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Gaps {
    /// The axis the children will be laid out along.
    pub direction: Direction,
    /// Gap rectangles, each spanning the full box on the other axis.
    pub rects: Vec<Rect>,
}

impl Gaps {
    /// Summed area of every gap.
    pub fn total_area(&self) -> f64 {
        self.rects.iter().map(|r| r.area()).sum()
    }
}

/// Gaps of `children` inside `bound` along `dir`, or `None` if there are none.
pub fn find_gaps(bound: Rect, children: &[Rect], dir: Direction) -> Result<Option<Gaps>, Error> {
    let (near, far) = span(bound, dir)?;
    let mut free = Ranges::new(Range::new(near, far));
    for &child in children {
        let (child_near, child_far) = span(child, dir)?;
        free.remove_range(Range::new(child_near, child_far));
    }
    let rects = free
        .middle_ranges()
        .iter()
        .map(|r| with_span(bound, dir, r.near, r.far))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((!rects.is_empty()).then_some(Gaps {
        direction: dir,
        rects,
    }))
}

/// The gaps to partition along: horizontal unless the vertical gaps cover strictly more area.
pub fn choose_gaps(bound: Rect, children: &[Rect]) -> Result<Option<Gaps>, Error> {
    let horizontal = find_gaps(bound, children, Direction::Horizontal)?;
    let vertical = find_gaps(bound, children, Direction::Vertical)?;
    Ok(match (horizontal, vertical) {
        (Some(h), Some(v)) => Some(if v.total_area() > h.total_area() { v } else { h }),
        (found, None) | (None, found) => found,
    })
}

/// Groups the children of `id` band by band and turns `id` into a stack.
///
/// Children are pinned at their current offsets, each band between consecutive gaps with two or
/// more children becomes a generated group, and the resulting children are sorted along the
/// chosen axis. Returns the created groups; a box without gaps is left untouched.
pub fn partition_children(
    layout: &mut Layout,
    id: BoxId,
    ids: &mut IdGen,
) -> Result<Vec<BoxId>, Error> {
    let children = layout.tree().children_of(id).to_vec();
    if children.len() < 2 {
        return Ok(Vec::new());
    }
    let bound = layout.rect(id)?;
    let child_rects = layout.rects(children.iter().copied())?;
    let rects: Vec<Rect> = child_rects.iter().map(|&(_, r)| r).collect();
    let Some(gaps) = choose_gaps(bound, &rects)? else {
        trace!(?id, "no gaps");
        return Ok(Vec::new());
    };
    let dir = gaps.direction;

    // Flow placement and shrink lengths both change once `id` gets a direction.
    for &(child, rect) in &child_rects {
        pin(layout, child, rect, bound.origin())?;
    }

    let (near, far) = span(bound, dir)?;
    let mut markers = Vec::with_capacity(gaps.rects.len() + 2);
    markers.push(with_span(bound, dir, near, near)?);
    markers.extend(gaps.rects.iter().copied());
    markers.push(with_span(bound, dir, far, far)?);

    let mut created = Vec::new();
    for pair in markers.windows(2) {
        let band = rect_between(pair[0], pair[1], dir)?;
        let candidates: Vec<BoxId> = children
            .iter()
            .copied()
            .filter(|&c| layout.tree().parent_of(c) == Some(id))
            .collect();
        let members = find_within(layout, band, Within::Inside, candidates)?;
        let group_id = fresh_id(layout, ids);
        if let Some(group) = group_children(layout, &members, group_id)? {
            debug!(?id, ?group, members = members.len(), "grouped band");
            created.push(group);
        }
    }

    let current = layout.tree().children_of(id).to_vec();
    let sorted = sort_by_direction(layout, &current, dir)?;
    let tree = layout.tree_mut();
    *tree.children_mut(id) = sorted;
    tree[id].direction = dir;
    Ok(created)
}

/// Partitions `id`, then every group that creates, until nothing is left to split.
pub fn partition(layout: &mut Layout, id: BoxId, id_prefix: &str) -> Result<Vec<BoxId>, Error> {
    let mut ids = IdGen::new(id_prefix);
    partition_with(layout, id, &mut ids)
}

pub(crate) fn partition_with(
    layout: &mut Layout,
    id: BoxId,
    ids: &mut IdGen,
) -> Result<Vec<BoxId>, Error> {
    let mut worklist = vec![id];
    let mut created = Vec::new();
    while let Some(next) = worklist.pop() {
        let groups = partition_children(layout, next, ids)?;
        worklist.extend(groups.iter().copied());
        created.extend(groups);
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Snapshot, SnapshotKind};
    use understory_intent_tree::{BoxTree, IntentBox};

    fn ranges_after(removed: &[(f64, f64)]) -> Ranges {
        let mut ranges = Ranges::new(Range::new(0.0, 10.0));
        for &(near, far) in removed {
            ranges.remove_range(Range::new(near, far));
        }
        ranges
    }

    fn pairs(ranges: &[Range]) -> Vec<(f64, f64)> {
        ranges.iter().map(|r| (r.near, r.far)).collect()
    }

    #[test]
    fn removing_from_the_front_leaves_a_marker() {
        let ranges = ranges_after(&[(0.0, 5.0)]);
        assert_eq!(pairs(ranges.ranges()), [(0.0, 0.0), (5.0, 10.0)]);
        assert!(ranges.middle_ranges().is_empty(), "both touch the boundary");
    }

    #[test]
    fn nested_removals() {
        let ranges = ranges_after(&[(4.0, 6.0), (3.0, 7.0)]);
        assert_eq!(pairs(ranges.ranges()), [(0.0, 3.0), (7.0, 10.0)]);
    }

    #[test]
    fn exact_and_covering_removals() {
        assert_eq!(
            pairs(ranges_after(&[(0.0, 10.0)]).ranges()),
            [(0.0, 0.0), (10.0, 10.0)]
        );
        assert!(ranges_after(&[(-5.0, 15.0)]).ranges().is_empty());
        assert_eq!(
            pairs(ranges_after(&[(2.0, 2.0)]).ranges()),
            [(0.0, 10.0)],
            "zero-length removals are ignored"
        );
    }

    #[test]
    fn removal_inside_an_existing_gap_is_a_no_op() {
        let ranges = ranges_after(&[(4.0, 6.0), (4.5, 5.5)]);
        assert_eq!(pairs(ranges.ranges()), [(0.0, 4.0), (6.0, 10.0)]);
    }

    #[test]
    fn touching_removals_leave_a_seam() {
        let ranges = ranges_after(&[(0.0, 4.0), (4.0, 10.0)]);
        assert_eq!(
            pairs(ranges.ranges()),
            [(0.0, 0.0), (4.0, 4.0), (10.0, 10.0)]
        );
        assert_eq!(pairs(ranges.middle_ranges()), [(4.0, 4.0)]);
    }

    #[test]
    fn split_rules() {
        let mut ranges = Ranges::new(Range::new(0.0, 10.0));
        ranges.split(0, 20.0);
        assert_eq!(pairs(ranges.ranges()), [(0.0, 10.0)], "too long");
        ranges.split(0, 10.0);
        assert_eq!(pairs(ranges.ranges()), [(0.0, 10.0), (10.0, 10.0)]);
        ranges.split(5, 1.0);
        assert_eq!(ranges.ranges().len(), 2);
    }

    fn scene(rects: &[(f64, f64, f64, f64)]) -> (Layout, Vec<BoxId>) {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, IntentBox::px(100.0, 100.0));
        let ids = rects
            .iter()
            .map(|&(x, y, w, h)| tree.insert(Some(root), IntentBox::px(w, h).at(x, y)))
            .collect();
        (Layout::new(tree, root).unwrap(), ids)
    }

    #[test]
    fn rows_without_gaps() {
        let (mut layout, ids) = scene(&[
            (0.0, 0.0, 100.0, 30.0),
            (0.0, 30.0, 50.0, 40.0),
            (50.0, 30.0, 50.0, 40.0),
            (0.0, 70.0, 100.0, 30.0),
        ]);
        let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();
        let root = layout.root();
        let mut gen_ids = IdGen::new("band");
        let created = partition_children(&mut layout, root, &mut gen_ids).unwrap();
        assert_eq!(created.len(), 1);
        let group = created[0];
        let tree = layout.tree();
        assert_eq!(tree.children_of(root), [ids[0], group, ids[3]]);
        assert_eq!(tree.children_of(group), [ids[1], ids[2]]);
        assert_eq!(tree[root].direction, Direction::Vertical);
        assert_eq!(layout.rect(group).unwrap(), Rect::new(0.0, 30.0, 100.0, 70.0));
        assert!(before.equals_layout(&mut layout).unwrap());
    }

    #[test]
    fn two_rows_of_three() {
        let (mut layout, ids) = scene(&[
            (0.0, 0.0, 30.0, 30.0),
            (35.0, 0.0, 30.0, 30.0),
            (70.0, 0.0, 30.0, 30.0),
            (0.0, 50.0, 30.0, 30.0),
            (35.0, 50.0, 30.0, 30.0),
            (70.0, 50.0, 30.0, 30.0),
        ]);
        let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();
        let root = layout.root();
        let created = partition(&mut layout, root, "band").unwrap();
        let tree = layout.tree();
        assert_eq!(tree[root].direction, Direction::Vertical);
        let rows = tree.children_of(root).to_vec();
        assert_eq!(rows.len(), 2);
        assert_eq!(tree.children_of(rows[0]), &ids[..3]);
        assert_eq!(tree.children_of(rows[1]), &ids[3..]);
        for row in rows {
            assert_eq!(tree[row].direction, Direction::Horizontal, "rows split into columns");
            assert!(created.contains(&row));
        }
        assert!(before.equals_layout(&mut layout).unwrap());
    }

    #[test]
    fn gap_axis_prefers_horizontal_on_ties() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        let children = [
            Rect::new(0.0, 0.0, 40.0, 40.0),
            Rect::new(60.0, 60.0, 100.0, 100.0),
        ];
        let gaps = choose_gaps(bound, &children).unwrap().unwrap();
        assert_eq!(gaps.direction, Direction::Horizontal);
        assert_eq!(gaps.rects, [Rect::new(40.0, 0.0, 60.0, 100.0)]);
        assert_eq!(choose_gaps(bound, &[bound]).unwrap(), None);
    }

    #[test]
    fn flow_children_are_pinned_before_regrouping() {
        let mut tree = BoxTree::new();
        let root = tree.insert(
            None,
            IntentBox::px(100.0, 100.0).with_direction(Direction::Horizontal),
        );
        let a = tree.insert(Some(root), IntentBox::px(30.0, 30.0));
        let b = tree.insert(Some(root), IntentBox::px(30.0, 30.0));
        let c = tree.insert(Some(root), IntentBox::px(30.0, 30.0).at(0.0, 60.0));
        let d = tree.insert(Some(root), IntentBox::px(30.0, 30.0).at(40.0, 60.0));
        let mut layout = Layout::new(tree, root).unwrap();
        let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();

        let created = partition(&mut layout, root, "band").unwrap();
        assert_eq!(created.len(), 2);
        let tree = layout.tree();
        assert_eq!(tree[root].direction, Direction::Vertical);
        assert_eq!(tree.children_of(root), created.as_slice());
        assert_eq!(tree.children_of(created[0]), [a, b]);
        assert_eq!(tree.children_of(created[1]), [c, d]);
        assert!(!tree[b].in_flow());
        assert_eq!(layout.rect(b).unwrap(), Rect::new(30.0, 0.0, 60.0, 30.0));
        assert!(before.equals_layout(&mut layout).unwrap());
    }

    #[test]
    fn shrink_children_keep_their_size() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, IntentBox::px(100.0, 100.0));
        let fit = tree.insert(Some(root), IntentBox::default().at(0.0, 0.0));
        let _inner = tree.insert(Some(fit), IntentBox::px(30.0, 30.0));
        let _other = tree.insert(Some(root), IntentBox::px(30.0, 30.0).at(0.0, 60.0));
        let mut layout = Layout::new(tree, root).unwrap();
        let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();

        partition(&mut layout, root, "band").unwrap();
        assert_ne!(layout.tree()[root].direction, Direction::None);
        assert_eq!(layout.rect(fit).unwrap(), Rect::new(0.0, 0.0, 30.0, 30.0));
        assert!(before.equals_layout(&mut layout).unwrap());
    }
}
