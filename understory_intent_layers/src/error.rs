// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors from reading or converting a design file.
#[derive(Debug, Error)]
pub enum LayerError {
    /// The input is not a valid layer tree.
    #[error("malformed design file: {0}")]
    Json(#[from] serde_json::Error),
    /// The layer tree does not produce a valid layout.
    #[error(transparent)]
    Layout(#[from] understory_intent_tree::Error),
    /// A bounding box has a negative or non-finite dimension.
    #[error("layer `{0}` has an invalid bounding box")]
    BadBounds(String),
}
