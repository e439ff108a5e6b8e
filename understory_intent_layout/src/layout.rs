// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Length and position resolution.

use kurbo::Rect;
use understory_intent_tree::{
    Alignment, BoxId, BoxTree, DepthFirst, Direction, Error, IntentBox, Length, LengthUnit,
};

use crate::geometry::bounding_rect;

/// A box tree together with the pixel size of its root.
///
/// Every query recomputes from the tree; nothing is cached, so results always reflect the
/// current structure.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use understory_intent_layout::Layout;
/// use understory_intent_tree::{BoxTree, Direction, IntentBox, Length};
///
/// let mut tree = BoxTree::new();
/// let root = tree.insert(
///     None,
///     IntentBox::px(100.0, 50.0).with_direction(Direction::Horizontal),
/// );
/// let a = tree.insert(Some(root), IntentBox::sized(Length::Parts(1.0), Length::Percent(1.0)));
/// let b = tree.insert(Some(root), IntentBox::sized(Length::Pixels(40.0), Length::Pixels(10.0)));
///
/// let layout = Layout::new(tree, root).unwrap();
/// assert_eq!(layout.rect(a).unwrap(), Rect::new(0.0, 0.0, 60.0, 50.0));
/// assert_eq!(layout.rect(b).unwrap(), Rect::new(60.0, 0.0, 100.0, 10.0));
/// ```
#[derive(Clone, Debug)]
pub struct Layout {
    tree: BoxTree,
    root: BoxId,
    width: f64,
    height: f64,
}

impl Layout {
    /// A layout sized by the root's own pixel lengths.
    ///
    /// Fails with [`Error::Config`] if either root length is not in pixels.
    pub fn new(tree: BoxTree, root: BoxId) -> Result<Self, Error> {
        Self::with_size(tree, root, None, None)
    }

    /// A layout with explicit root dimensions; a missing dimension falls back to the root's
    /// pixel length.
    pub fn with_size(
        tree: BoxTree,
        root: BoxId,
        width: Option<f64>,
        height: Option<f64>,
    ) -> Result<Self, Error> {
        let data = tree
            .get(root)
            .ok_or(Error::InvalidArgument("stale box id"))?;
        let width = match (width, data.w) {
            (Some(w), _) | (None, Length::Pixels(w)) => w,
            _ => return Err(Error::Config("root width must resolve to pixels")),
        };
        let height = match (height, data.h) {
            (Some(h), _) | (None, Length::Pixels(h)) => h,
            _ => return Err(Error::Config("root height must resolve to pixels")),
        };
        Ok(Self {
            tree,
            root,
            width,
            height,
        })
    }

    /// The box tree.
    pub fn tree(&self) -> &BoxTree {
        &self.tree
    }

    /// Mutable access to the box tree.
    pub fn tree_mut(&mut self) -> &mut BoxTree {
        &mut self.tree
    }

    /// Gives the tree back.
    pub fn into_tree(self) -> BoxTree {
        self.tree
    }

    /// The layout root.
    pub fn root(&self) -> BoxId {
        self.root
    }

    /// Root width in pixels.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Root height in pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Root extent along an axis.
    pub fn extent(&self, dir: Direction) -> Result<f64, Error> {
        match dir.axis()? {
            Direction::Horizontal => Ok(self.width),
            _ => Ok(self.height),
        }
    }

    /// Depth-first traversal of the whole layout.
    pub fn boxes(&self) -> DepthFirst<'_> {
        self.tree.depth_first(self.root)
    }

    /// Box data, or [`Error::InvalidArgument`] for a stale id.
    pub fn data(&self, id: BoxId) -> Result<&IntentBox, Error> {
        self.tree
            .get(id)
            .ok_or(Error::InvalidArgument("stale box id"))
    }

    /// In-flow children of `id` whose unit along `dir` matches `unit`, with `Shrink` children
    /// replaced in place by their own effective children.
    ///
    /// Fails if `dir` is not an axis or `unit` is [`LengthUnit::Shrink`].
    pub fn effective_children(
        &self,
        id: BoxId,
        dir: Direction,
        unit: Option<LengthUnit>,
    ) -> Result<EffectiveChildren<'_>, Error> {
        let horizontal = dir.axis()? == Direction::Horizontal;
        if unit == Some(LengthUnit::Shrink) {
            return Err(Error::InvalidArgument("shrink is not a child filter"));
        }
        Ok(EffectiveChildren {
            tree: &self.tree,
            horizontal,
            unit,
            stack: self.tree.children_of(id).iter().rev().copied().collect(),
        })
    }

    /// Resolve a `Pixels` or `Percent` length against a parent length.
    pub fn comp_fixed(parent_comp: f64, length: Length) -> Result<f64, Error> {
        match length {
            Length::Pixels(v) => Ok(v),
            Length::Percent(v) => Ok(parent_comp * v),
            _ => Err(Error::InvalidArgument("offsets must be pixels or percent")),
        }
    }

    /// Computed length of a box along an axis, in pixels.
    ///
    /// `Parts`, `Expand` and `Shrink` resolve against the nearest non-shrink ancestor. Along
    /// that ancestor's stacking axis (or any axis when it has none) siblings share its free
    /// space. Across it, `Parts` and `Expand` fill the ancestor and `Shrink` resolves to zero.
    pub fn comp_length(&self, id: BoxId, dir: Direction) -> Result<f64, Error> {
        let data = self.data(id)?;
        let length = data.length(dir)?;
        if let Length::Pixels(v) = length {
            return Ok(v);
        }
        let (parent_comp, parent) = self.effective_parent(id, dir)?;
        if let Length::Percent(v) = length {
            return Ok(parent_comp * v);
        }
        if let Some(absolute) = data.absolute
            && let (Some(near), Some(far)) = absolute.along(dir)?
        {
            let stretched = parent_comp
                - Self::comp_fixed(parent_comp, far)?
                - Self::comp_fixed(parent_comp, near)?;
            return Ok(stretched.max(0.0));
        }
        // Siblings only compete for space along the parent's stacking axis.
        let parent_direction = self.data(parent)?.direction;
        let shares_axis =
            parent == id || parent_direction == Direction::None || parent_direction == dir;
        match length {
            Length::Parts(_) | Length::Expand if !shares_axis => Ok(parent_comp),
            Length::Parts(v) => {
                let total = self.total_parts(parent, dir)?;
                if total == 0.0 {
                    return Ok(0.0);
                }
                Ok(self.free_space(parent, parent_comp, dir)? * v / total)
            }
            Length::Expand => {
                if self.total_parts(parent, dir)? > 0.0 {
                    return Ok(0.0);
                }
                let free = self.free_space(parent, parent_comp, dir)?;
                let count = self
                    .effective_children(parent, dir, Some(LengthUnit::Expand))?
                    .count();
                #[allow(
                    clippy::cast_precision_loss,
                    reason = "child counts are far below 2^52."
                )]
                let count = count as f64;
                Ok(if count == 0.0 { free } else { free / count })
            }
            _ if !shares_axis => Ok(0.0),
            _ => self
                .effective_children(id, dir, None)?
                .map(|c| self.comp_length(c, dir))
                .sum(),
        }
    }

    /// Computed width.
    pub fn comp_w(&self, id: BoxId) -> Result<f64, Error> {
        self.comp_length(id, Direction::Horizontal)
    }

    /// Computed height.
    pub fn comp_h(&self, id: BoxId) -> Result<f64, Error> {
        self.comp_length(id, Direction::Vertical)
    }

    /// Position of a box along an axis, relative to its parent.
    pub fn comp_position(&self, id: BoxId, dir: Direction) -> Result<f64, Error> {
        let dir = dir.axis()?;
        let data = self.data(id)?;
        let Some(parent) = self.tree.parent_of(id) else {
            return Ok(0.0);
        };
        let parent_comp = self.comp_length(parent, dir)?;
        if let Some(absolute) = data.absolute {
            return match absolute.along(dir)? {
                (Some(near), _) => Self::comp_fixed(parent_comp, near),
                (None, Some(far)) => Ok(parent_comp
                    - Self::comp_fixed(parent_comp, far)?
                    - self.comp_length(id, dir)?),
                (None, None) => Err(Error::InvalidArgument(
                    "absolute box has no offset on this axis",
                )),
            };
        }
        let parent_data = self.data(parent)?;
        if parent_data.direction == Direction::None {
            return Ok(0.0);
        }
        if parent_data.direction != dir {
            let box_comp = self.comp_length(id, dir)?;
            return Ok(match parent_data.cross_alignment {
                Alignment::Near => 0.0,
                Alignment::Center => (parent_comp - box_comp) / 2.0,
                Alignment::Far => parent_comp - box_comp,
            });
        }
        let mut before = 0.0;
        let mut from_box = 0.0;
        let mut seen = false;
        for &sibling in self.tree.children_of(parent) {
            if !self.data(sibling)?.in_flow() {
                continue;
            }
            seen |= sibling == id;
            let comp = self.comp_length(sibling, dir)?;
            if seen {
                from_box += comp;
            } else {
                before += comp;
            }
        }
        Ok(match parent_data.alignment {
            Alignment::Near => before,
            Alignment::Center => (parent_comp - before - from_box) / 2.0 + before,
            Alignment::Far => parent_comp - from_box,
        })
    }

    /// Horizontal position relative to the parent.
    pub fn comp_x(&self, id: BoxId) -> Result<f64, Error> {
        self.comp_position(id, Direction::Horizontal)
    }

    /// Vertical position relative to the parent.
    pub fn comp_y(&self, id: BoxId) -> Result<f64, Error> {
        self.comp_position(id, Direction::Vertical)
    }

    /// Absolute position along an axis: the sum of positions up the ancestor chain.
    pub fn comp_position_abs(&self, id: BoxId, dir: Direction) -> Result<f64, Error> {
        let mut pos = 0.0;
        let mut current = Some(id);
        while let Some(c) = current {
            pos += self.comp_position(c, dir)?;
            current = self.tree.parent_of(c);
        }
        Ok(pos)
    }

    /// Absolute pixel rectangle of a box.
    pub fn rect(&self, id: BoxId) -> Result<Rect, Error> {
        let x = self.comp_position_abs(id, Direction::Horizontal)?;
        let y = self.comp_position_abs(id, Direction::Vertical)?;
        let w = self.comp_w(id)?;
        let h = self.comp_h(id)?;
        Ok(Rect::new(x, y, x + w, y + h))
    }

    /// Smallest rectangle enclosing every box in `ids`.
    ///
    /// Fails with [`Error::InvalidArgument`] for an empty list.
    pub fn bounding_rect(&self, ids: &[BoxId]) -> Result<Rect, Error> {
        let rects = ids
            .iter()
            .map(|&id| self.rect(id))
            .collect::<Result<Vec<_>, _>>()?;
        bounding_rect(rects).ok_or(Error::InvalidArgument("empty rectangle list"))
    }

    /// Rectangles for a list of boxes, paired with their ids.
    pub fn rects(&self, ids: impl IntoIterator<Item = BoxId>) -> Result<Vec<(BoxId, Rect)>, Error> {
        ids.into_iter()
            .map(|id| self.rect(id).map(|r| (id, r)))
            .collect()
    }

    /// The nearest non-shrink ancestor and its length, or the layout root and its extent.
    fn effective_parent(&self, id: BoxId, dir: Direction) -> Result<(f64, BoxId), Error> {
        let mut current = self.tree.parent_of(id);
        while let Some(p) = current {
            if self.data(p)?.length(dir)? != Length::Shrink {
                return Ok((self.comp_length(p, dir)?, p));
            }
            current = self.tree.parent_of(p);
        }
        Ok((self.extent(dir)?, self.root))
    }

    fn total_parts(&self, parent: BoxId, dir: Direction) -> Result<f64, Error> {
        Ok(self
            .effective_children(parent, dir, Some(LengthUnit::Parts))?
            .filter_map(|c| self.tree[c].length(dir).ok()?.value())
            .sum())
    }

    fn free_space(&self, parent: BoxId, parent_comp: f64, dir: Direction) -> Result<f64, Error> {
        let mut used = 0.0;
        for unit in [LengthUnit::Pixels, LengthUnit::Percent] {
            for c in self.effective_children(parent, dir, Some(unit))? {
                used += self.comp_length(c, dir)?;
            }
        }
        Ok((parent_comp - used).max(0.0))
    }
}

/// Iterator returned by [`Layout::effective_children`].
///
/// Walks an explicit stack, so deeply nested `Shrink` chains do not recurse.
#[derive(Clone, Debug)]
pub struct EffectiveChildren<'a> {
    tree: &'a BoxTree,
    horizontal: bool,
    unit: Option<LengthUnit>,
    stack: Vec<BoxId>,
}

impl Iterator for EffectiveChildren<'_> {
    type Item = BoxId;

    fn next(&mut self) -> Option<BoxId> {
        while let Some(child) = self.stack.pop() {
            let Some(data) = self.tree.get(child) else {
                continue;
            };
            if !data.in_flow() {
                continue;
            }
            let length = if self.horizontal { data.w } else { data.h };
            if length == Length::Shrink {
                self.stack
                    .extend(self.tree.children_of(child).iter().rev().copied());
                continue;
            }
            if self.unit.is_none_or(|u| u == length.unit()) {
                return Some(child);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_intent_tree::Absolute;

    fn row(width: f64) -> (BoxTree, BoxId) {
        let mut tree = BoxTree::new();
        let root = tree.insert(
            None,
            IntentBox::px(width, 100.0).with_direction(Direction::Horizontal),
        );
        (tree, root)
    }

    #[test]
    fn root_must_resolve_to_pixels() {
        let mut tree = BoxTree::new();
        let root = tree.insert(None, IntentBox::sized(Length::Shrink, Length::Pixels(5.0)));
        assert!(matches!(
            Layout::new(tree.clone(), root),
            Err(Error::Config(_))
        ));
        let layout = Layout::with_size(tree, root, Some(40.0), None).unwrap();
        assert_eq!(layout.width(), 40.0);
        assert_eq!(layout.height(), 5.0);
    }

    #[test]
    fn shrink_sums_effective_children() {
        let (mut tree, root) = row(100.0);
        let shrink = tree.insert(
            Some(root),
            IntentBox::sized(Length::Shrink, Length::Pixels(10.0))
                .with_direction(Direction::Horizontal),
        );
        let px = tree.insert(Some(shrink), IntentBox::px(20.0, 10.0));
        let pct = tree.insert(
            Some(shrink),
            IntentBox::sized(Length::Percent(0.3), Length::Pixels(10.0)),
        );
        let one = tree.insert(
            Some(shrink),
            IntentBox::sized(Length::Parts(1.0), Length::Pixels(10.0)),
        );
        let two = tree.insert(
            Some(shrink),
            IntentBox::sized(Length::Parts(2.0), Length::Pixels(10.0)),
        );
        let mut layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.comp_w(pct).unwrap(), 30.0, "percent skips shrink parents");
        assert!((layout.comp_w(one).unwrap() - 50.0 / 3.0).abs() < 1e-9);
        assert!((layout.comp_w(shrink).unwrap() - 100.0).abs() < 1e-9);

        layout.tree_mut()[one].w = Length::Parts(0.0);
        layout.tree_mut()[two].w = Length::Parts(0.0);
        assert_eq!(layout.comp_w(shrink).unwrap(), 50.0);
        assert_eq!(layout.comp_w(px).unwrap(), 20.0);
    }

    #[test]
    fn effective_children_expand_nested_shrink_in_order() {
        let (mut tree, root) = row(100.0);
        let a = tree.insert(Some(root), IntentBox::px(1.0, 1.0));
        let outer = tree.insert(Some(root), IntentBox::default());
        let inner = tree.insert(Some(outer), IntentBox::default());
        let b = tree.insert(Some(inner), IntentBox::sized(Length::Expand, Length::Expand));
        let c = tree.insert(Some(outer), IntentBox::px(1.0, 1.0));
        let _abs = tree.insert(Some(root), IntentBox::px(1.0, 1.0).at(0.0, 0.0));
        let d = tree.insert(Some(root), IntentBox::px(1.0, 1.0));
        let layout = Layout::new(tree, root).unwrap();

        let all: Vec<_> = layout
            .effective_children(root, Direction::Horizontal, None)
            .unwrap()
            .collect();
        assert_eq!(all, [a, b, c, d]);
        let expand: Vec<_> = layout
            .effective_children(root, Direction::Horizontal, Some(LengthUnit::Expand))
            .unwrap()
            .collect();
        assert_eq!(expand, [b]);
        assert!(
            layout
                .effective_children(root, Direction::Horizontal, Some(LengthUnit::Shrink))
                .is_err()
        );
        assert!(layout.effective_children(root, Direction::None, None).is_err());
    }

    #[test]
    fn parts_beat_expand() {
        let (mut tree, root) = row(100.0);
        let _fixed = tree.insert(Some(root), IntentBox::px(40.0, 10.0));
        let e1 = tree.insert(Some(root), IntentBox::sized(Length::Expand, Length::Pixels(1.0)));
        let e2 = tree.insert(Some(root), IntentBox::sized(Length::Expand, Length::Pixels(1.0)));
        let mut layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.comp_w(e1).unwrap(), 30.0);
        assert_eq!(layout.comp_x(e2).unwrap(), 70.0);

        layout.tree_mut()[e2].w = Length::Parts(1.0);
        assert_eq!(layout.comp_w(e1).unwrap(), 0.0);
        assert_eq!(layout.comp_w(e2).unwrap(), 60.0);
    }

    #[test]
    fn absolute_offsets_and_stretch() {
        let (mut tree, root) = row(100.0);
        let near = tree.insert(Some(root), IntentBox::px(10.0, 10.0).at(5.0, 7.0));
        let far = tree.insert(
            Some(root),
            IntentBox::px(10.0, 10.0).with_absolute(Absolute {
                r: Some(Length::Pixels(5.0)),
                b: Some(Length::Percent(0.1)),
                ..Absolute::default()
            }),
        );
        let stretched = tree.insert(
            Some(root),
            IntentBox::sized(Length::Expand, Length::Pixels(10.0)).with_absolute(Absolute {
                l: Some(Length::Pixels(10.0)),
                r: Some(Length::Percent(0.2)),
                t: Some(Length::Pixels(0.0)),
                b: None,
            }),
        );
        let unplaced = tree.insert(
            Some(root),
            IntentBox::px(10.0, 10.0).with_absolute(Absolute {
                l: Some(Length::Pixels(1.0)),
                ..Absolute::default()
            }),
        );
        let layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.rect(near).unwrap(), Rect::new(5.0, 7.0, 15.0, 17.0));
        assert_eq!(layout.rect(far).unwrap(), Rect::new(85.0, 80.0, 95.0, 90.0));
        assert_eq!(layout.comp_w(stretched).unwrap(), 70.0);
        assert!(matches!(
            layout.comp_y(unplaced),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(layout.comp_x(unplaced).unwrap(), 1.0);
    }

    #[test]
    fn main_axis_alignment() {
        let (mut tree, root) = row(100.0);
        let a = tree.insert(Some(root), IntentBox::px(20.0, 10.0));
        let _abs = tree.insert(Some(root), IntentBox::px(50.0, 10.0).at(0.0, 0.0));
        let b = tree.insert(Some(root), IntentBox::px(30.0, 10.0));
        let mut layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.comp_x(b).unwrap(), 20.0, "absolute siblings take no space");

        layout.tree_mut()[root].alignment = Alignment::Far;
        assert_eq!(layout.comp_x(a).unwrap(), 50.0);
        assert_eq!(layout.comp_x(b).unwrap(), 70.0);

        layout.tree_mut()[root].alignment = Alignment::Center;
        assert_eq!(layout.comp_x(a).unwrap(), 25.0);
        assert_eq!(layout.comp_x(b).unwrap(), 45.0);
    }

    #[test]
    fn cross_axis_alignment() {
        let (mut tree, root) = row(100.0);
        let a = tree.insert(Some(root), IntentBox::px(20.0, 40.0));
        let mut layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.comp_y(a).unwrap(), 0.0);
        layout.tree_mut()[root].cross_alignment = Alignment::Center;
        assert_eq!(layout.comp_y(a).unwrap(), 30.0);
        layout.tree_mut()[root].cross_alignment = Alignment::Far;
        assert_eq!(layout.comp_y(a).unwrap(), 60.0);
        layout.tree_mut()[root].direction = Direction::None;
        assert_eq!(layout.comp_y(a).unwrap(), 0.0, "layered children sit at the origin");
        assert_eq!(layout.comp_x(a).unwrap(), 0.0);
    }

    #[test]
    fn cross_axis_lengths_fill_the_parent() {
        let (mut tree, root) = row(100.0);
        let _a = tree.insert(Some(root), IntentBox::px(20.0, 40.0));
        let parts = tree.insert(
            Some(root),
            IntentBox::sized(Length::Pixels(20.0), Length::Parts(1.0)),
        );
        let expand = tree.insert(
            Some(root),
            IntentBox::sized(Length::Pixels(20.0), Length::Expand),
        );
        let shrink = tree.insert(
            Some(root),
            IntentBox::sized(Length::Pixels(10.0), Length::Shrink),
        );
        let _inner = tree.insert(Some(shrink), IntentBox::px(5.0, 30.0));
        let mut layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.comp_h(parts).unwrap(), 100.0);
        assert_eq!(layout.comp_h(expand).unwrap(), 100.0);
        assert_eq!(layout.comp_h(shrink).unwrap(), 0.0);

        layout.tree_mut()[root].direction = Direction::Vertical;
        assert_eq!(layout.comp_h(parts).unwrap(), 30.0, "100 - 40 - 30 left for one part");
        assert_eq!(layout.comp_h(expand).unwrap(), 0.0);
        assert_eq!(layout.comp_h(shrink).unwrap(), 30.0);
    }

    #[test]
    fn nested_absolute_positions_accumulate() {
        let (mut tree, root) = row(100.0);
        let group = tree.insert(Some(root), IntentBox::px(50.0, 50.0).at(10.0, 20.0));
        let leaf = tree.insert(Some(group), IntentBox::px(5.0, 5.0).at(3.0, 4.0));
        let layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.rect(leaf).unwrap(), Rect::new(13.0, 24.0, 18.0, 29.0));
        assert_eq!(
            layout.bounding_rect(&[group, leaf]).unwrap(),
            Rect::new(10.0, 20.0, 60.0, 70.0)
        );
        assert!(matches!(
            layout.bounding_rect(&[]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn resolution_is_pure() {
        let (mut tree, root) = row(90.0);
        let a = tree.insert(Some(root), IntentBox::sized(Length::Parts(1.0), Length::Expand));
        let b = tree.insert(Some(root), IntentBox::sized(Length::Parts(2.0), Length::Shrink));
        let layout = Layout::new(tree, root).unwrap();
        assert_eq!(layout.rect(a).unwrap(), layout.rect(a).unwrap());
        assert_eq!(layout.comp_x(b).unwrap(), 30.0);
        assert!(matches!(
            layout.comp_position(b, Direction::None),
            Err(Error::InvalidArgument(_))
        ));
    }
}
