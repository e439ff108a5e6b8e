// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Intent Tree: the box model behind layout intent inference.
//!
//! A design file arrives as a flat list of absolutely positioned rectangles in paint order.
//! Inference passes regroup those rectangles into a hierarchy that says what the designer meant
//! (this sits inside that, these form a row) without changing what is drawn. This crate holds
//! the shared data model those passes work on.
//!
//! - [`BoxTree`]: arena of boxes addressed by generational [`BoxId`]s. Structure lives in the
//!   arena, so reparenting is index reassignment.
//! - [`IntentBox`]: per-box intent data: [`Length`]s, [`Absolute`] offsets, [`Direction`],
//!   and [`Alignment`]s.
//! - [`DepthFirst`] and [`ReverseDepthFirst`]: the two canonical traversals, restartable by
//!   cloning. [`PaintOrder`] walks boxes bottom to top. [`IterExt::unique`] adds streaming
//!   de-duplication.
//! - [`IdGen`]: request-scoped id counter.
//! - [`Error`]: the error taxonomy shared by every Understory Intent crate.
//!
//! ## Orders
//!
//! Children are in paint order: the first child is the bottom-most, and a box is painted
//! underneath its own descendants. Two orders fall out of that:
//!
//! - [`BoxTree::is_before`] is document order, the post-order of [`BoxTree::depth_first`]:
//!   descendants come before their ancestors.
//! - [`BoxTree::paints_before`] is paint order, the pre-order: ancestors come first.
//!
//! Geometry and layout live in `understory_intent_layout`; inference passes in
//! `understory_intent`.

mod error;
mod ids;
mod traverse;
mod tree;
mod types;

pub use error::Error;
pub use ids::IdGen;
pub use traverse::{DepthFirst, IterExt, PaintOrder, ReverseDepthFirst, Unique};
pub use tree::BoxTree;
pub use types::{
    Absolute, Alignment, BoxId, BoxText, Direction, IntentBox, Length, LengthUnit, length_equals,
};
