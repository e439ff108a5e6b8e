// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena tree: structure, relations, and structural edits.

use core::cmp::Ordering;
use core::ops::{Index, IndexMut};

use hashbrown::HashSet;

use crate::error::Error;
use crate::types::{BoxId, IntentBox};

/// Arena holding boxes and their parent/child structure.
///
/// Children lists are paint order: the first child is painted first (bottom), the last child
/// last (top), and a box is painted underneath its own descendants.
///
/// ## Example
///
/// ```rust
/// use understory_intent_tree::{BoxTree, IntentBox};
///
/// let mut tree = BoxTree::new();
/// let root = tree.insert(None, IntentBox::px(100.0, 100.0).with_id("root"));
/// let a = tree.insert(Some(root), IntentBox::px(10.0, 10.0).with_id("a"));
/// let b = tree.insert(Some(root), IntentBox::px(10.0, 10.0).with_id("b"));
///
/// assert_eq!(tree.children_of(root), &[a, b]);
/// assert!(tree.is_before(a, b));
/// assert!(tree.is_before(a, root), "descendants come before their ancestors");
/// assert_eq!(tree.box_by_id(root, "b"), Some(b));
/// ```
#[derive(Clone, Default)]
pub struct BoxTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl core::fmt::Debug for BoxTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("BoxTree")
            .field("boxes_total", &total)
            .field("boxes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<BoxId>,
    children: Vec<BoxId>,
    data: IntentBox,
}

impl Node {
    fn new(generation: u32, data: IntentBox) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            data,
        }
    }
}

impl BoxTree {
    /// Create a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live boxes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// True if no box is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new box as the last child of `parent` (or as a root if `None`).
    pub fn insert(&mut self, parent: Option<BoxId>, data: IntentBox) -> BoxId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, data));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "BoxId uses 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, data)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "BoxId uses 32-bit indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = BoxId::new(idx, generation);
        if let Some(p) = parent
            && self.is_alive(p)
        {
            let at = self.node(p).children.len();
            self.link_parent(id, p, at);
        }
        id
    }

    /// Insert a new box at `index` among the children of `parent`.
    ///
    /// `index` is clamped to the child count.
    pub fn insert_at(&mut self, parent: BoxId, index: usize, data: IntentBox) -> BoxId {
        let id = self.insert(None, data);
        if self.is_alive(parent) {
            self.link_parent(id, parent, index);
        }
        id
    }

    /// Remove a box and its subtree from the arena.
    pub fn remove(&mut self, id: BoxId) {
        if !self.is_alive(id) {
            return;
        }
        self.orphan(id);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend(self.node(current).children.iter().copied());
            self.nodes[current.idx()] = None;
            self.free_list.push(current.idx());
        }
    }

    /// Returns true if `id` refers to a live box.
    ///
    /// A `BoxId` is live if its slot exists and its generation matches the generation stored in
    /// that slot.
    pub fn is_alive(&self, id: BoxId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Box data for a live id.
    pub fn get(&self, id: BoxId) -> Option<&IntentBox> {
        self.node_opt(id).map(|n| &n.data)
    }

    /// Mutable box data for a live id.
    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut IntentBox> {
        self.node_opt_mut(id).map(|n| &mut n.data)
    }

    /// Returns the parent of a box, or `None` for roots and stale ids.
    pub fn parent_of(&self, id: BoxId) -> Option<BoxId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a box, or an empty slice if the id is stale.
    pub fn children_of(&self, id: BoxId) -> &[BoxId] {
        self.node_opt(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Direct access to a child list.
    ///
    /// Parent links of the listed boxes are not updated; call [`BoxTree::refresh_parents`]
    /// after editing.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn children_mut(&mut self, id: BoxId) -> &mut Vec<BoxId> {
        &mut self.node_mut(id).children
    }

    /// Sets the parent link of every box below `root` from the child lists.
    pub fn refresh_parents(&mut self, root: BoxId) {
        if !self.is_alive(root) {
            return;
        }
        let mut stack = vec![root];
        while let Some(parent) = stack.pop() {
            let children = self.node(parent).children.clone();
            for child in children {
                if let Some(n) = self.node_opt_mut(child) {
                    n.parent = Some(parent);
                    stack.push(child);
                }
            }
        }
    }

    /// Position of a box within its parent's children.
    pub fn index_of_child(&self, id: BoxId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.node(parent).children.iter().position(|&c| c == id)
    }

    /// Detach a box from its parent, returning the old parent (`None` if it was a root).
    pub fn orphan(&mut self, id: BoxId) -> Option<BoxId> {
        let parent = self.parent_of(id)?;
        self.unlink_parent(id, parent);
        Some(parent)
    }

    /// Attach `child` to `parent` at `index` (clamped), detaching it from its old parent first.
    pub fn insert_child(&mut self, parent: BoxId, index: usize, child: BoxId) -> Result<(), Error> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(Error::InvalidArgument("stale box id"));
        }
        if self.is_ancestor(child, parent) {
            return Err(Error::Cycle);
        }
        self.orphan(child);
        self.link_parent(child, parent, index);
        Ok(())
    }

    /// Attach `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: BoxId, child: BoxId) -> Result<(), Error> {
        self.insert_child(parent, usize::MAX, child)
    }

    /// True if `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: BoxId, id: BoxId) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(id) {
            return false;
        }
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent_of(c);
        }
        false
    }

    /// Number of ancestors of a box.
    pub fn height(&self, id: BoxId) -> usize {
        let mut height = 0;
        let mut current = self.parent_of(id);
        while let Some(c) = current {
            height += 1;
            current = self.parent_of(c);
        }
        height
    }

    /// The ancestor `degree` levels up (`0` is the box itself).
    pub fn ancestor(&self, id: BoxId, degree: usize) -> Option<BoxId> {
        if !self.is_alive(id) {
            return None;
        }
        let mut current = id;
        for _ in 0..degree {
            current = self.parent_of(current)?;
        }
        Some(current)
    }

    /// The topmost ancestor of a box.
    pub fn root_of(&self, id: BoxId) -> BoxId {
        let mut current = id;
        while let Some(p) = self.parent_of(current) {
            current = p;
        }
        current
    }

    /// The child of `ancestor` whose subtree holds `id`.
    pub fn branch_toward(&self, ancestor: BoxId, id: BoxId) -> Option<BoxId> {
        let mut current = id;
        loop {
            let parent = self.parent_of(current)?;
            if parent == ancestor {
                return Some(current);
            }
            current = parent;
        }
    }

    /// The deepest box that is an ancestor of both `a` and `b`, either of them included.
    ///
    /// `None` for stale ids and boxes in different trees.
    pub fn common_ancestor(&self, a: BoxId, b: BoxId) -> Option<BoxId> {
        let mut current = Some(a);
        while let Some(c) = current {
            if self.is_ancestor(c, b) {
                return Some(c);
            }
            current = self.parent_of(c);
        }
        None
    }

    /// Document order: `a` comes before `b` in the depth-first (post-order) traversal.
    ///
    /// A descendant is before its ancestors; boxes in different sibling branches compare by the
    /// index of their branches under the shared parent. Stale ids and boxes in different trees
    /// are never before anything.
    pub fn is_before(&self, a: BoxId, b: BoxId) -> bool {
        if a == b || !self.is_alive(a) || !self.is_alive(b) {
            return false;
        }
        let height_a = self.height(a);
        let height_b = self.height(b);
        let (mut x, mut y) = (a, b);
        for _ in height_b..height_a {
            let Some(p) = self.parent_of(x) else {
                return false;
            };
            x = p;
        }
        for _ in height_a..height_b {
            let Some(p) = self.parent_of(y) else {
                return false;
            };
            y = p;
        }
        if x == y {
            return height_a > height_b;
        }
        loop {
            match (self.parent_of(x), self.parent_of(y)) {
                (Some(px), Some(py)) if px == py => break,
                (Some(px), Some(py)) => {
                    x = px;
                    y = py;
                }
                _ => return false,
            }
        }
        self.index_of_child(x) < self.index_of_child(y)
    }

    /// Paint order: `a` is painted before (underneath) `b`.
    ///
    /// Boxes are painted before their descendants and in child order otherwise, so this is
    /// pre-order position.
    pub fn paints_before(&self, a: BoxId, b: BoxId) -> bool {
        if a == b {
            return false;
        }
        if self.is_ancestor(a, b) {
            return true;
        }
        !self.is_ancestor(b, a) && self.is_before(a, b)
    }

    /// Sorts boxes in document order.
    pub fn sort_by_depth_first(&self, ids: &mut [BoxId]) {
        ids.sort_by(|&a, &b| order_by(|x, y| self.is_before(x, y), a, b));
    }

    /// Sorts boxes bottom to top in paint order.
    pub fn sort_by_paint_order(&self, ids: &mut [BoxId]) {
        ids.sort_by(|&a, &b| order_by(|x, y| self.paints_before(x, y), a, b));
    }

    /// Where `id` would land in `sorted` (document order).
    pub fn depth_first_insertion_index(&self, sorted: &[BoxId], id: BoxId) -> usize {
        sorted.partition_point(|&s| self.is_before(s, id))
    }

    /// Where `id` would land in `sorted` (paint order).
    pub fn paint_insertion_index(&self, sorted: &[BoxId], id: BoxId) -> usize {
        sorted.partition_point(|&s| self.paints_before(s, id))
    }

    /// Move `id` under `new_parent`, keeping its place in document order where possible.
    ///
    /// - If `new_parent` is already the parent, nothing changes.
    /// - If `new_parent` is an ancestor, `id` is inserted right after the branch that held it,
    ///   keeping it above that branch in paint order.
    /// - Otherwise `id` goes to the front of the children if it was before `new_parent`, and to
    ///   the back if not.
    ///
    /// Fails with [`Error::Cycle`] when `new_parent` is `id` or one of its descendants.
    pub fn reparent(&mut self, id: BoxId, new_parent: BoxId) -> Result<(), Error> {
        if !self.is_alive(id) || !self.is_alive(new_parent) {
            return Err(Error::InvalidArgument("stale box id"));
        }
        if self.is_ancestor(id, new_parent) {
            return Err(Error::Cycle);
        }
        if self.parent_of(id) == Some(new_parent) {
            return Ok(());
        }
        if let Some(branch) = self.branch_toward(new_parent, id) {
            self.orphan(id);
            let index = self.index_of_child(branch).map_or(0, |i| i + 1);
            self.link_parent(id, new_parent, index);
            return Ok(());
        }
        let before = self.is_before(id, new_parent);
        self.orphan(id);
        let index = if before { 0 } else { usize::MAX };
        self.link_parent(id, new_parent, index);
        Ok(())
    }

    /// Finds a box by identifier below (and including) `root`.
    pub fn box_by_id(&self, root: BoxId, id: &str) -> Option<BoxId> {
        self.depth_first(root)
            .find(|&b| self.get(b).and_then(|d| d.id.as_deref()) == Some(id))
    }

    /// True if no two boxes share an identifier. Boxes without one are ignored.
    pub fn has_unique_ids(&self, ids: impl IntoIterator<Item = BoxId>) -> bool {
        let mut seen = HashSet::new();
        ids.into_iter()
            .filter_map(|b| self.get(b).and_then(|d| d.id.as_deref()))
            .all(|id| seen.insert(id))
    }

    /// Every identifier in use below (and including) `root`.
    pub fn ids_in_use(&self, root: BoxId) -> HashSet<String> {
        self.depth_first(root)
            .filter_map(|b| self.get(b).and_then(|d| d.id.clone()))
            .collect()
    }

    /// Follows first children down to a leaf.
    pub fn deepest_first_child(&self, id: BoxId) -> BoxId {
        let mut current = id;
        while let Some(&first) = self.children_of(current).first() {
            current = first;
        }
        current
    }

    // --- internals ---

    fn node(&self, id: BoxId) -> &Node {
        self.nodes[id.idx()].as_ref().expect("dangling BoxId")
    }

    fn node_mut(&mut self, id: BoxId) -> &mut Node {
        self.nodes[id.idx()].as_mut().expect("dangling BoxId")
    }

    fn node_opt(&self, id: BoxId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: BoxId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn link_parent(&mut self, id: BoxId, parent: BoxId, index: usize) {
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, id);
        self.node_mut(id).parent = Some(parent);
    }

    fn unlink_parent(&mut self, id: BoxId, parent: BoxId) {
        let p = self.node_mut(parent);
        p.children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }
}

fn order_by(before: impl Fn(BoxId, BoxId) -> bool, a: BoxId, b: BoxId) -> Ordering {
    if before(a, b) {
        Ordering::Less
    } else if before(b, a) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl Index<BoxId> for BoxTree {
    type Output = IntentBox;

    /// # Panics
    ///
    /// Panics if `id` is stale.
    fn index(&self, id: BoxId) -> &IntentBox {
        &self.node(id).data
    }
}

impl IndexMut<BoxId> for BoxTree {
    fn index_mut(&mut self, id: BoxId) -> &mut IntentBox {
        &mut self.node_mut(id).data
    }
}
