// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Intent Layers: design files in and out of the intent model.
//!
//! A layer extractor writes a [`DesignFile`]: a tree of named [`Layer`]s with bounding boxes in
//! canvas coordinates, plus a preview bitmap per layer. This crate turns that into the flat
//! [`Layout`](understory_intent_layout::Layout) inference starts from, and renders results back
//! out as JSON.
//!
//! - [`DesignFile::from_json`] parses and validates extractor output.
//! - [`flatten_layers`] lists layers children first.
//! - [`layer_to_box`] builds one absolutely positioned box per layer under a canvas-sized root.
//! - [`export_layers`] and [`box_to_json`] produce the `layers.json` and `root.json` views.
//!
//! ```rust
//! use understory_intent_layers::{DesignFile, box_to_json, layer_to_box};
//!
//! let file = DesignFile::from_json(r#"{
//!     "rootLayer": {
//!         "id": "canvas",
//!         "bbox": { "w": 100, "h": 100 },
//!         "children": [{ "id": "logo", "bbox": { "x": 10, "y": 10, "w": 30, "h": 30 } }]
//!     }
//! }"#).unwrap();
//! let layout = layer_to_box(&file.root_layer).unwrap();
//! let view = box_to_json(&layout, layout.root()).unwrap();
//! assert_eq!(view.children.len(), 2);
//! assert_eq!(view.children[0].id.as_deref(), Some("logo"));
//! ```

mod convert;
mod error;
pub mod export;
mod layer;

pub use convert::layer_to_box;
pub use error::LayerError;
pub use export::{box_to_json, export_layers};
pub use layer::{BBox, DesignFile, Layer, LayerText, flatten_layers};
