// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inference configuration.

use serde::{Deserialize, Serialize};

/// One inference pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    /// [`contain_layout`](crate::containment::contain_layout).
    Containment,
    /// [`contain_overlap_boxes`](crate::overlap::contain_overlap_boxes).
    OverlapClusters,
    /// [`apply_stacks`](crate::stack::apply_stacks).
    Stacks,
    /// [`partition`](crate::partition::partition) of every box with children.
    Partition,
}

impl Pass {
    /// Short name used in generated ids and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Containment => "contain",
            Self::OverlapClusters => "overlap",
            Self::Stacks => "stack",
            Self::Partition => "partition",
        }
    }
}

/// Settings for [`run_pipeline`](crate::pipeline::run_pipeline).
///
/// Missing fields take their defaults when deserializing:
///
/// ```rust
/// use understory_intent::{InferenceConfig, Pass};
///
/// let config: InferenceConfig = serde_json::from_str(r#"{ "passes": ["stacks"] }"#).unwrap();
/// assert_eq!(config.passes, [Pass::Stacks]);
/// assert_eq!(config.id_prefix, "gen");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Prefix for ids of generated boxes.
    pub id_prefix: String,
    /// Bound for every fixed-point loop.
    pub max_rounds: usize,
    /// Passes to run, in order.
    pub passes: Vec<Pass>,
    /// Snapshot around each pass and report whether the render was preserved.
    pub verify: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            id_prefix: "gen".into(),
            max_rounds: 64,
            passes: vec![
                Pass::Containment,
                Pass::OverlapClusters,
                Pass::Stacks,
                Pass::Partition,
            ],
            verify: true,
        }
    }
}

impl InferenceConfig {
    /// Id prefix for boxes generated by `pass`.
    pub fn prefix_for(&self, pass: Pass) -> String {
        format!("{}-{}-", self.id_prefix, pass.name())
    }
}
