// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running configured passes over a layout.

use tracing::{debug, info_span, warn};
use understory_intent_layout::Layout;
use understory_intent_tree::{BoxId, Direction, Error, IdGen};

use crate::config::{InferenceConfig, Pass};
use crate::snapshot::{Snapshot, SnapshotKind};
use crate::{containment, overlap, partition, stack};

/// Outcome of one pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassReport {
    /// Which pass ran.
    pub pass: Pass,
    /// Boxes the pass generated.
    pub created: Vec<BoxId>,
    /// Whether the render was unchanged, if checked.
    pub preserved: Option<bool>,
}

/// Outcome of [`run_pipeline`], one entry per pass in run order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Per-pass results.
    pub passes: Vec<PassReport>,
}

impl PipelineReport {
    /// Every generated box, in pass order.
    pub fn created(&self) -> impl Iterator<Item = BoxId> + '_ {
        self.passes.iter().flat_map(|p| p.created.iter().copied())
    }

    /// False if any checked pass changed the render.
    pub fn preserved(&self) -> bool {
        self.passes.iter().all(|p| p.preserved != Some(false))
    }
}

/// Runs the configured passes over the whole layout, in order.
///
/// The partition pass visits every box that has children and no stacking direction yet, so
/// stacks found earlier are kept as they are.
///
/// ```rust
/// use understory_intent::{InferenceConfig, run_pipeline};
/// use understory_intent_layout::Layout;
/// use understory_intent_tree::{BoxTree, IntentBox};
///
/// let mut tree = BoxTree::new();
/// let root = tree.insert(None, IntentBox::px(100.0, 100.0));
/// let a = tree.insert(Some(root), IntentBox::px(20.0, 20.0).at(0.0, 0.0));
/// let b = tree.insert(Some(root), IntentBox::px(20.0, 20.0).at(30.0, 0.0));
/// let mut layout = Layout::new(tree, root).unwrap();
///
/// let report = run_pipeline(&mut layout, &InferenceConfig::default()).unwrap();
/// assert!(report.preserved());
/// let row = layout.tree().parent_of(a).unwrap();
/// assert_eq!(layout.tree().parent_of(b), Some(row));
/// ```
pub fn run_pipeline(
    layout: &mut Layout,
    config: &InferenceConfig,
) -> Result<PipelineReport, Error> {
    let mut report = PipelineReport::default();
    let mut before = if config.verify {
        Some(Snapshot::new(layout, SnapshotKind::ALL)?)
    } else {
        None
    };
    for &pass in &config.passes {
        let _span = info_span!("pass", pass = pass.name()).entered();
        let created = run_pass(layout, config, pass)?;
        debug!(created = created.len(), "pass finished");

        let preserved = match before.take() {
            Some(snapshot) => {
                let after = Snapshot::new(layout, snapshot.kind())?;
                let diff = snapshot.diff(&after)?;
                if !diff.is_empty() {
                    warn!(?diff, "pass changed the render");
                }
                before = Some(after);
                Some(diff.is_empty())
            }
            None => None,
        };
        report.passes.push(PassReport {
            pass,
            created,
            preserved,
        });
    }
    Ok(report)
}

fn run_pass(
    layout: &mut Layout,
    config: &InferenceConfig,
    pass: Pass,
) -> Result<Vec<BoxId>, Error> {
    let prefix = config.prefix_for(pass);
    match pass {
        Pass::Containment => containment::contain_layout(layout, &prefix, config.max_rounds),
        Pass::OverlapClusters => overlap::contain_overlap_boxes(layout, &prefix),
        Pass::Stacks => stack::apply_stacks(layout, &prefix, config.max_rounds),
        Pass::Partition => {
            let tree = layout.tree();
            let targets: Vec<BoxId> = layout
                .boxes()
                .filter(|&b| {
                    !tree.children_of(b).is_empty() && tree[b].direction == Direction::None
                })
                .collect();
            let mut ids = IdGen::new(prefix);
            let mut created = Vec::new();
            for target in targets {
                if layout.tree().is_alive(target) {
                    created.extend(partition::partition_with(layout, target, &mut ids)?);
                }
            }
            Ok(created)
        }
    }
}
