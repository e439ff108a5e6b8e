// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Intent Layout: pixel geometry for an intent tree.
//!
//! Boxes in an [`understory_intent_tree::BoxTree`] describe their size with flex-like
//! [`Length`](understory_intent_tree::Length)s. [`Layout`] resolves those into pixels:
//!
//! - `Pixels` are literal; `Percent` is a fraction of the nearest non-shrink ancestor.
//! - `Parts` split the free space left by pixel and percent siblings; `Expand` shares it
//!   equally when no parts are present.
//! - `Shrink` sums the box's effective children, looking through nested shrink boxes.
//! - Absolute offsets take a box out of the flow; both offsets on an axis stretch it.
//!
//! Positions follow the parent's [`Direction`](understory_intent_tree::Direction) and
//! alignments. Nothing is cached, so every query reflects the current tree.
//!
//! The [`geometry`] module holds rectangle predicates (strict overlap, inclusive touch and
//! containment) and [`search`] the queries inference passes build on.
//!
//! ```rust
//! use understory_intent_layout::{Layout, search};
//! use understory_intent_tree::{BoxTree, IntentBox};
//!
//! let mut tree = BoxTree::new();
//! let root = tree.insert(None, IntentBox::px(100.0, 100.0));
//! let a = tree.insert(Some(root), IntentBox::px(20.0, 20.0).at(0.0, 0.0));
//! let b = tree.insert(Some(root), IntentBox::px(20.0, 20.0).at(10.0, 10.0));
//! let layout = Layout::new(tree, root).unwrap();
//!
//! assert!(search::box_overlaps(&layout, a, b).unwrap());
//! assert_eq!(search::top_most(&layout, root, &[]).unwrap(), [a]);
//! ```

pub mod geometry;
mod layout;
pub mod search;

pub use layout::{EffectiveChildren, Layout};
pub use search::Within;
