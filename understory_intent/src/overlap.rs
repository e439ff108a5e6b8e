// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap clusters: give every tangle of partially overlapping boxes a parent of its own.
//!
//! Clusters are closed under partial overlap, ordered by paint order, and split wherever an
//! outside box that encloses the whole cluster paints between two members. Each piece with at
//! least two members moves into a generated group sized to its bounding rectangle.

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;
use tracing::debug;
use understory_intent_layout::{Layout, geometry::partially_overlaps, search::find_containers};
use understory_intent_tree::{BoxId, Error, IdGen, IntentBox};

use crate::operations::{fresh_id, pin};

/// Every set of two or more boxes connected by partial overlap, each in paint order.
///
/// Clusters come out in document order of their first-seen box.
pub fn find_clusters(layout: &Layout) -> Result<Vec<Vec<BoxId>>, Error> {
    let rects = layout.rects(layout.boxes())?;
    let rect_of: HashMap<BoxId, Rect> = rects.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut clusters = Vec::new();
    for &(start, _) in &rects {
        if !seen.insert(start) {
            continue;
        }
        let mut cluster = vec![start];
        let mut i = 0;
        while let Some(&current) = cluster.get(i) {
            let rect = *rect_of
                .get(&current)
                .ok_or(Error::InvalidArgument("stale box id"))?;
            for &(other, other_rect) in &rects {
                if !seen.contains(&other) && partially_overlaps(rect, other_rect) {
                    seen.insert(other);
                    cluster.push(other);
                }
            }
            i += 1;
        }
        if cluster.len() > 1 {
            layout.tree().sort_by_paint_order(&mut cluster);
            clusters.push(cluster);
        }
    }
    Ok(clusters)
}

/// Splits a paint-ordered cluster wherever an enclosing outside box paints between members.
pub fn split_cluster(layout: &Layout, cluster: &[BoxId]) -> Result<Vec<Vec<BoxId>>, Error> {
    if cluster.is_empty() {
        return Ok(Vec::new());
    }
    let tree = layout.tree();
    let bound = layout.bounding_rect(cluster)?;
    let outside = layout.boxes().filter(|b| !cluster.contains(b));
    let mut cuts: Vec<usize> = find_containers(layout, bound, outside)?
        .into_iter()
        .map(|container| tree.paint_insertion_index(cluster, container))
        .filter(|&i| i > 0 && i < cluster.len())
        .collect();
    cuts.sort_unstable();
    cuts.dedup();
    cuts.push(cluster.len());

    let mut start = 0;
    Ok(cuts
        .into_iter()
        .map(|cut| {
            let piece = cluster[start..cut].to_vec();
            start = cut;
            piece
        })
        .collect())
}

/// Moves a set of boxes into a new generated group.
///
/// The group goes under the deepest box that holds every member without being one. It takes
/// the slot of the bottom-most member there, or the slot right after the container holding that
/// member when it sits deeper, and receives the members in paint order, each pinned where it
/// was drawn.
pub fn create_overlap_parent(
    layout: &mut Layout,
    members: &[BoxId],
    id: impl Into<String>,
) -> Result<BoxId, Error> {
    let tree = layout.tree();
    let mut members = members.to_vec();
    tree.sort_by_paint_order(&mut members);
    let anchor = *members
        .first()
        .ok_or(Error::InvalidArgument("empty rectangle list"))?;
    let mut host = anchor;
    for &member in &members[1..] {
        host = tree
            .common_ancestor(host, member)
            .ok_or(Error::InvalidArgument("grouped boxes must share a root"))?;
    }
    if members.contains(&host) {
        host = tree
            .parent_of(host)
            .ok_or(Error::InvalidArgument("cannot group the root"))?;
    }
    let branch = tree
        .branch_toward(host, anchor)
        .ok_or(Error::InvalidArgument("stale box id"))?;
    let slot = tree.index_of_child(branch).unwrap_or(0);
    let index = if branch == anchor { slot } else { slot + 1 };

    let rects = layout.rects(members.iter().copied())?;
    let bound = layout.bounding_rect(&members)?;
    let host_origin = layout.rect(host)?.origin();

    let group = layout.tree_mut().insert_at(
        host,
        index,
        IntentBox::px(bound.width(), bound.height())
            .at(bound.x0 - host_origin.x, bound.y0 - host_origin.y)
            .with_id(id)
            .generated(),
    );
    for (member, rect) in rects {
        layout.tree_mut().append_child(group, member)?;
        pin(layout, member, rect, bound.origin())?;
    }
    Ok(group)
}

/// Groups every overlap cluster of the layout. Returns the created groups.
pub fn contain_overlap_boxes(layout: &mut Layout, id_prefix: &str) -> Result<Vec<BoxId>, Error> {
    let mut ids = IdGen::new(id_prefix);
    let mut created = Vec::new();
    for mut cluster in find_clusters(layout)? {
        layout.tree().sort_by_paint_order(&mut cluster);
        for piece in split_cluster(layout, &cluster)? {
            if piece.len() < 2 {
                continue;
            }
            let id = fresh_id(layout, &mut ids);
            let group = create_overlap_parent(layout, &piece, id)?;
            debug!(?group, members = piece.len(), "grouped overlap cluster");
            created.push(group);
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Snapshot, SnapshotKind};
    use understory_intent_tree::BoxTree;

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
    fn pair_gets_a_group() {
        let (mut layout, ids) = scene(&[
            (0.0, 0.0, 30.0, 30.0),
            (20.0, 20.0, 30.0, 30.0),
            (70.0, 70.0, 10.0, 10.0),
        ]);
        let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();
        let created = contain_overlap_boxes(&mut layout, "overlap").unwrap();
        assert_eq!(created.len(), 1);
        let group = created[0];
        let root = layout.root();
        assert_eq!(layout.tree().children_of(root), [group, ids[2]]);
        assert_eq!(layout.tree().children_of(group), [ids[0], ids[1]]);
        assert_eq!(layout.rect(group).unwrap(), Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(layout.data(group).unwrap().id.as_deref(), Some("overlap0"));
        assert!(before.equals_layout(&mut layout).unwrap());
    }

    #[test]
    fn clusters_are_transitive() {
        let (layout, ids) = scene(&[
            (0.0, 0.0, 20.0, 20.0),
            (10.0, 10.0, 20.0, 20.0),
            (25.0, 25.0, 20.0, 20.0),
            (80.0, 0.0, 10.0, 10.0),
        ]);
        assert_eq!(find_clusters(&layout).unwrap(), [vec![ids[0], ids[1], ids[2]]]);
    }

    #[test]
    fn enclosing_box_between_members_splits() {
        let (mut layout, ids) = scene(&[
            (10.0, 10.0, 20.0, 20.0),
            (0.0, 0.0, 60.0, 60.0),
            (20.0, 20.0, 20.0, 20.0),
        ]);
        let cluster = vec![ids[0], ids[2]];
        assert_eq!(
            split_cluster(&layout, &cluster).unwrap(),
            [vec![ids[0]], vec![ids[2]]]
        );
        assert!(contain_overlap_boxes(&mut layout, "overlap").unwrap().is_empty());
        let root = layout.root();
        assert_eq!(layout.tree().children_of(root), ids.as_slice());
    }

    #[test]
    fn child_sticking_out_of_its_parent() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, IntentBox::px(100.0, 100.0));
        let panel = tree.insert(Some(root), IntentBox::px(40.0, 40.0).at(0.0, 0.0));
        let badge = tree.insert(Some(panel), IntentBox::px(20.0, 20.0).at(30.0, 30.0));
        let mut layout = Layout::new(tree, root).unwrap();
        let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();

        let created = contain_overlap_boxes(&mut layout, "overlap").unwrap();
        assert_eq!(created.len(), 1);
        let tree = layout.tree();
        assert_eq!(tree.children_of(created[0]), [panel, badge]);
        assert!(tree.children_of(panel).is_empty());
        assert!(before.equals_layout(&mut layout).unwrap());
    }

    #[test]
    fn group_climbs_to_the_shared_ancestor() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, IntentBox::px(100.0, 100.0));
        let card = tree.insert(Some(root), IntentBox::px(60.0, 60.0).at(0.0, 0.0));
        let a = tree.insert(Some(card), IntentBox::px(20.0, 20.0).at(10.0, 10.0));
        let d = tree.insert(Some(card), IntentBox::px(10.0, 10.0).at(45.0, 30.0));
        let b = tree.insert(Some(root), IntentBox::px(20.0, 20.0).at(25.0, 25.0));
        let mut layout = Layout::new(tree, root).unwrap();
        let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();

        let group = create_overlap_parent(&mut layout, &[b, a], "g").unwrap();
        let tree = layout.tree();
        assert_eq!(tree.children_of(root), [card, group]);
        assert_eq!(tree.children_of(card), [d]);
        assert_eq!(tree.children_of(group), [a, b]);
        assert!(tree.paints_before(d, b), "the touching sibling stays underneath");
        assert_eq!(layout.rect(group).unwrap(), Rect::new(10.0, 10.0, 45.0, 45.0));
        assert!(before.equals_layout(&mut layout).unwrap());
    }

    #[test]
    fn grouping_needs_members() {
        let (mut layout, _) = scene(&[]);
        assert!(create_overlap_parent(&mut layout, &[], "g").is_err());
        let root = layout.root();
        assert!(create_overlap_parent(&mut layout, &[root], "g").is_err());
    }
}
