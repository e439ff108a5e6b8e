// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Intent: infer layout structure from flat, absolutely positioned boxes.
//!
//! A design file gives every rectangle a pixel position and a place in paint order, and little
//! else. The passes in this crate rebuild the hierarchy a designer had in mind, while leaving
//! the rendered result exactly as it was:
//!
//! - [`containment`]: a box drawn inside another becomes its child.
//! - [`overlap`]: boxes that partially overlap share a generated parent.
//! - [`stack`]: runs of equally sized, aligned boxes become flow containers.
//! - [`partition`]: children separated by clear gaps are split into rows or columns.
//!
//! Every pass must be a visual no-op. [`Snapshot`] records, per box, its rectangle and the boxes
//! painted over it, so a snapshot taken before a pass must equal one taken after.
//!
//! [`run_pipeline`] runs a configurable sequence of passes and reports what each created and
//! whether the render was preserved. Passes log through `tracing`; install a subscriber to see
//! them.
//!
//! ```rust
//! use understory_intent::{Snapshot, SnapshotKind, containment};
//! use understory_intent_layout::Layout;
//! use understory_intent_tree::{BoxTree, IntentBox};
//!
//! let mut tree = BoxTree::new();
//! let root = tree.insert(None, IntentBox::px(100.0, 100.0));
//! let card = tree.insert(Some(root), IntentBox::px(80.0, 80.0).at(10.0, 10.0));
//! let label = tree.insert(Some(root), IntentBox::px(40.0, 20.0).at(20.0, 20.0));
//! let mut layout = Layout::new(tree, root).unwrap();
//!
//! let before = Snapshot::new(&mut layout, SnapshotKind::ALL).unwrap();
//! containment::contain_layout(&mut layout, "wrap", 16).unwrap();
//! assert_eq!(layout.tree().parent_of(label), Some(card));
//! assert!(before.equals_layout(&mut layout).unwrap());
//! ```

pub mod config;
pub mod containment;
pub mod operations;
pub mod overlap;
pub mod partition;
pub mod pipeline;
pub mod snapshot;
pub mod stack;

pub use config::{InferenceConfig, Pass};
pub use operations::{group_children, pin, reparent, wrap_box};
pub use pipeline::{PassReport, PipelineReport, run_pipeline};
pub use snapshot::{Snapshot, SnapshotEntry, SnapshotKind};
pub use stack::{Stack, StackGroup};
