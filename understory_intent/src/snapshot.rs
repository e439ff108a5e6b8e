// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshots: a fingerprint of what a layout draws.
//!
//! A [`Snapshot`] records, for every box that carries content (generated boxes are skipped), its
//! absolute rectangle and its "below" set: the content boxes it touches or overlaps that paint
//! after it. Two layouts with equal snapshots draw the same picture, which is the postcondition
//! every inference pass must keep.

use hashbrown::{HashMap, HashSet};
use kurbo::Rect;
use understory_intent_layout::{Layout, geometry::touches};
use understory_intent_tree::{BoxId, Error, IdGen};

bitflags::bitflags! {
    /// Which properties a [`Snapshot`] compares.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SnapshotKind: u8 {
        /// Absolute rectangles.
        const POSITION = 0b0000_0001;
        /// Below sets (occlusion and adjacency).
        const VISUAL   = 0b0000_0010;
    }
}

impl SnapshotKind {
    /// Positions and below sets.
    pub const ALL: Self = Self::POSITION.union(Self::VISUAL);
}

impl Default for SnapshotKind {
    fn default() -> Self {
        Self::ALL
    }
}

/// Recorded state of one content box.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotEntry {
    /// Absolute rectangle.
    pub rect: Rect,
    /// Ids of the content boxes touching this one that paint after it.
    pub below: HashSet<String>,
}

/// Position and occlusion fingerprint of a layout.
#[derive(Clone, Debug)]
pub struct Snapshot {
    kind: SnapshotKind,
    entries: HashMap<String, SnapshotEntry>,
}

impl Snapshot {
    /// Captures a layout, assigning `box<n>` ids to content boxes that have none.
    pub fn new(layout: &mut Layout, kind: SnapshotKind) -> Result<Self, Error> {
        Self::with_ids(layout, kind, &mut IdGen::new("box"))
    }

    /// Captures a layout, drawing missing ids from `ids`.
    ///
    /// Assigned ids never collide with ids already in the tree. Fails with
    /// [`Error::InvalidArgument`] if two content boxes share an id.
    pub fn with_ids(
        layout: &mut Layout,
        kind: SnapshotKind,
        ids: &mut IdGen,
    ) -> Result<Self, Error> {
        assign_ids(layout, ids)?;
        let tree = layout.tree();
        let content: Vec<BoxId> = layout
            .boxes()
            .filter(|&b| tree.get(b).is_some_and(|d| d.has_content()))
            .collect();
        if !tree.has_unique_ids(content.iter().copied()) {
            return Err(Error::InvalidArgument("duplicate box ids"));
        }
        let rects = layout.rects(content.iter().copied())?;

        let mut entries = HashMap::with_capacity(rects.len());
        for &(id, rect) in &rects {
            let below = rects
                .iter()
                .filter(|&&(other, other_rect)| {
                    other != id && touches(rect, other_rect) && tree.paints_before(id, other)
                })
                .map(|&(other, _)| label(layout, other))
                .collect::<Result<HashSet<_>, Error>>()?;
            entries.insert(label(layout, id)?, SnapshotEntry { rect, below });
        }
        Ok(Self { kind, entries })
    }

    /// What this snapshot compares.
    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    /// Number of recorded boxes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no box was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recorded state of the box with this id.
    pub fn get(&self, id: &str) -> Option<&SnapshotEntry> {
        self.entries.get(id)
    }

    /// Ids that are missing on one side or differ in a compared property, sorted.
    ///
    /// Fails with [`Error::InvalidArgument`] if the snapshots are of different kinds.
    pub fn diff(&self, other: &Self) -> Result<Vec<String>, Error> {
        if self.kind != other.kind {
            return Err(Error::InvalidArgument("snapshot kinds differ"));
        }
        let mut changed: Vec<String> = self
            .entries
            .keys()
            .chain(other.entries.keys())
            .filter(|id| match (self.entries.get(*id), other.entries.get(*id)) {
                (Some(a), Some(b)) => !self.same(a, b),
                _ => true,
            })
            .cloned()
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        changed.sort();
        Ok(changed)
    }

    /// True if both snapshots record the same boxes with the same compared properties.
    pub fn equals(&self, other: &Self) -> Result<bool, Error> {
        Ok(self.diff(other)?.is_empty())
    }

    /// Captures `layout` with this snapshot's kind and compares.
    pub fn equals_layout(&self, layout: &mut Layout) -> Result<bool, Error> {
        self.equals(&Self::new(layout, self.kind)?)
    }

    fn same(&self, a: &SnapshotEntry, b: &SnapshotEntry) -> bool {
        (!self.kind.contains(SnapshotKind::POSITION) || a.rect == b.rect)
            && (!self.kind.contains(SnapshotKind::VISUAL) || a.below == b.below)
    }
}

fn assign_ids(layout: &mut Layout, ids: &mut IdGen) -> Result<(), Error> {
    let root = layout.root();
    let mut taken = layout.tree().ids_in_use(root);
    let missing: Vec<BoxId> = layout
        .boxes()
        .filter(|&b| {
            layout
                .tree()
                .get(b)
                .is_some_and(|d| d.has_content() && d.id.is_none())
        })
        .collect();
    for b in missing {
        let id = ids.next_unused(&taken);
        taken.insert(id.clone());
        layout.tree_mut()[b].id = Some(id);
    }
    Ok(())
}

fn label(layout: &Layout, id: BoxId) -> Result<String, Error> {
    layout
        .data(id)?
        .id
        .clone()
        .ok_or(Error::InvalidArgument("snapshot box has no id"))
}
