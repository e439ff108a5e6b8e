// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Depth-first traversals and sequence helpers.
//!
//! All traversals are plain [`Iterator`]s, so the usual adapters (`filter`, `map`, `take`,
//! `skip_while`, `chain`, ...) apply. Cloning a traversal gives an independent cursor that
//! resumes from the same position.

use core::hash::Hash;

use hashbrown::HashSet;

use crate::tree::BoxTree;
use crate::types::BoxId;

/// Post-order traversal: the deepest first child first, then its siblings, then the parent.
#[derive(Clone, Debug)]
pub struct DepthFirst<'a> {
    tree: &'a BoxTree,
    root: BoxId,
    next: Option<BoxId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = if current == self.root {
            None
        } else {
            self.tree.parent_of(current).and_then(|parent| {
                let siblings = self.tree.children_of(parent);
                let pos = siblings.iter().position(|&c| c == current)?;
                Some(match siblings.get(pos + 1) {
                    Some(&sibling) => self.tree.deepest_first_child(sibling),
                    None => parent,
                })
            })
        };
        Some(current)
    }
}

/// The exact reverse of [`DepthFirst`]: a box, then its children from last to first.
#[derive(Clone, Debug)]
pub struct ReverseDepthFirst<'a> {
    tree: &'a BoxTree,
    root: BoxId,
    next: Option<BoxId>,
}

impl Iterator for ReverseDepthFirst<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = match self.tree.children_of(current).last() {
            Some(&last) => Some(last),
            None => self.prev_branch(current),
        };
        Some(current)
    }
}

impl ReverseDepthFirst<'_> {
    fn prev_branch(&self, from: BoxId) -> Option<BoxId> {
        let mut node = from;
        while node != self.root {
            let parent = self.tree.parent_of(node)?;
            let siblings = self.tree.children_of(parent);
            let pos = siblings.iter().position(|&c| c == node)?;
            if pos > 0 {
                return Some(siblings[pos - 1]);
            }
            node = parent;
        }
        None
    }
}

/// Pre-order traversal: a box, then its children from first to last.
///
/// This is the order boxes are painted in, bottom to top.
#[derive(Clone, Debug)]
pub struct PaintOrder<'a> {
    tree: &'a BoxTree,
    root: BoxId,
    next: Option<BoxId>,
}

impl Iterator for PaintOrder<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        let current = self.next?;
        self.next = match self.tree.children_of(current).first() {
            Some(&first) => Some(first),
            None => self.next_branch(current),
        };
        Some(current)
    }
}

impl PaintOrder<'_> {
    fn next_branch(&self, from: BoxId) -> Option<BoxId> {
        let mut node = from;
        while node != self.root {
            let parent = self.tree.parent_of(node)?;
            let siblings = self.tree.children_of(parent);
            let pos = siblings.iter().position(|&c| c == node)?;
            if let Some(&sibling) = siblings.get(pos + 1) {
                return Some(sibling);
            }
            node = parent;
        }
        None
    }
}

impl BoxTree {
    /// Post-order traversal of the subtree at `root`, ending with `root`.
    ///
    /// Earlier boxes are painted underneath later siblings, and descendants are yielded before
    /// their ancestors.
    pub fn depth_first(&self, root: BoxId) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            root,
            next: self.is_alive(root).then(|| self.deepest_first_child(root)),
        }
    }

    /// [`depth_first`](Self::depth_first) over `root`, resumed at `start`.
    ///
    /// Yields nothing if `start` is not inside `root`'s subtree.
    pub fn depth_first_from(&self, root: BoxId, start: BoxId) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            root,
            next: self.is_ancestor(root, start).then_some(start),
        }
    }

    /// Reverse post-order traversal of the subtree at `root`, starting with `root`.
    pub fn reverse_depth_first(&self, root: BoxId) -> ReverseDepthFirst<'_> {
        ReverseDepthFirst {
            tree: self,
            root,
            next: self.is_alive(root).then_some(root),
        }
    }

    /// [`reverse_depth_first`](Self::reverse_depth_first) over `root`, resumed at `start`.
    pub fn reverse_depth_first_from(&self, root: BoxId, start: BoxId) -> ReverseDepthFirst<'_> {
        ReverseDepthFirst {
            tree: self,
            root,
            next: self.is_ancestor(root, start).then_some(start),
        }
    }

    /// Pre-order traversal of the subtree at `root`: bottom-most paint first.
    pub fn paint_order(&self, root: BoxId) -> PaintOrder<'_> {
        PaintOrder {
            tree: self,
            root,
            next: self.is_alive(root).then_some(root),
        }
    }
}

/// Extra sequence adapters on top of [`Iterator`].
pub trait IterExt: Iterator + Sized {
    /// Drops items already seen, keeping the first occurrence.
    fn unique(self) -> Unique<Self>
    where
        Self::Item: Copy + Eq + Hash,
    {
        Unique {
            iter: self,
            seen: HashSet::new(),
        }
    }
}

impl<I: Iterator> IterExt for I {}

/// Iterator returned by [`IterExt::unique`].
pub struct Unique<I: Iterator> {
    iter: I,
    seen: HashSet<I::Item>,
}

impl<I> Clone for Unique<I>
where
    I: Iterator + Clone,
    I::Item: Clone,
{
    fn clone(&self) -> Self {
        Self {
            iter: self.iter.clone(),
            seen: self.seen.clone(),
        }
    }
}

impl<I: Iterator> core::fmt::Debug for Unique<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Unique")
            .field("seen", &self.seen.len())
            .finish_non_exhaustive()
    }
}

impl<I> Iterator for Unique<I>
where
    I: Iterator,
    I::Item: Copy + Eq + Hash,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.iter.by_ref().find(|item| self.seen.insert(*item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntentBox;

    /// root -> [a -> [c, d], b -> [e]]
    fn sample() -> (BoxTree, [BoxId; 6]) {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, IntentBox::default());
        let a = tree.insert(Some(root), IntentBox::default());
        let b = tree.insert(Some(root), IntentBox::default());
        let c = tree.insert(Some(a), IntentBox::default());
        let d = tree.insert(Some(a), IntentBox::default());
        let e = tree.insert(Some(b), IntentBox::default());
        (tree, [root, a, b, c, d, e])
    }

    #[test]
    fn depth_first_is_post_order() {
        let (tree, [root, a, b, c, d, e]) = sample();
        let order: Vec<_> = tree.depth_first(root).collect();
        assert_eq!(order, [c, d, a, e, b, root]);
        let sub: Vec<_> = tree.depth_first(a).collect();
        assert_eq!(sub, [c, d, a], "traversal stays inside the subtree");
    }

    #[test]
    fn reverse_is_exact_mirror() {
        let (tree, [root, ..]) = sample();
        let mut forward: Vec<_> = tree.depth_first(root).collect();
        forward.reverse();
        let reverse: Vec<_> = tree.reverse_depth_first(root).collect();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn start_mid_tree() {
        let (tree, [root, a, b, c, d, e]) = sample();
        let rest: Vec<_> = tree.depth_first_from(root, d).collect();
        assert_eq!(rest, [d, a, e, b, root]);
        let back: Vec<_> = tree.reverse_depth_first_from(root, e).collect();
        assert_eq!(back, [e, a, d, c]);
        assert_eq!(tree.depth_first_from(a, b).count(), 0);
    }

    #[test]
    fn paint_order_is_pre_order() {
        let (tree, [root, a, b, c, d, e]) = sample();
        let order: Vec<_> = tree.paint_order(root).collect();
        assert_eq!(order, [root, a, c, d, b, e]);
        assert_eq!(tree.paint_order(a).collect::<Vec<_>>(), [a, c, d]);
        for pair in order.windows(2) {
            assert!(tree.paints_before(pair[0], pair[1]), "agrees with paints_before");
        }
    }

    #[test]
    fn clones_resume_independently() {
        let (tree, [root, _, _, c, d, _]) = sample();
        let mut it = tree.depth_first(root);
        assert_eq!(it.next(), Some(c));
        let copy = it.clone();
        assert_eq!(it.next(), Some(d));
        assert_eq!(it.count(), 4);
        assert_eq!(copy.count(), 5);
    }

    #[test]
    fn sequence_adapters() {
        let (tree, [root, a, b, c, d, e]) = sample();
        let leaves: Vec<_> = tree
            .depth_first(root)
            .filter(|&x| tree.children_of(x).is_empty())
            .collect();
        assert_eq!(leaves, [c, d, e]);
        assert_eq!(tree.depth_first(root).find(|&x| x == b), Some(b));
        assert!(tree.depth_first(root).any(|x| x == e));
        let head: Vec<_> = tree.depth_first(root).take_while(|&x| x != a).collect();
        assert_eq!(head, [c, d]);
        let tail: Vec<_> = tree.depth_first(root).skip_while(|&x| x != b).collect();
        assert_eq!(tail, [b, root]);
        let twice: Vec<_> = tree
            .depth_first(a)
            .chain(tree.reverse_depth_first(root))
            .unique()
            .collect();
        assert_eq!(twice, [c, d, a, root, b, e]);
    }
}
