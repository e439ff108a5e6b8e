// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use tracing::debug;
use understory_intent_layout::Layout;
use understory_intent_tree::{BoxText, BoxTree, IntentBox};

use crate::{Layer, LayerError, flatten_layers};

/// Builds a flat layout from a layer tree.
///
/// The root box takes the root layer's id and size. Every layer, the root layer last, becomes an
/// absolutely positioned child at its bounding box. The root layer's own child keeps its layer id
/// but no box id, so ids stay unique.
///
/// ```rust
/// use understory_intent_layers::{BBox, Layer, layer_to_box};
///
/// let bounds = |x, y, w, h| BBox { x: Some(x), y: Some(y), w, h };
/// let mut root = Layer::new("root", "Canvas", bounds(0.0, 0.0, 100.0, 50.0));
/// root.children.push(Layer::new("dot", "Dot", bounds(10.0, 10.0, 5.0, 5.0)));
///
/// let layout = layer_to_box(&root).unwrap();
/// let tree = layout.tree();
/// let children = tree.children_of(layout.root());
/// assert_eq!(children.len(), 2);
/// assert_eq!(tree[children[0]].id.as_deref(), Some("dot"));
/// assert_eq!(layout.rect(children[0]).unwrap().origin(), kurbo::Point::new(10.0, 10.0));
/// ```
pub fn layer_to_box(root_layer: &Layer) -> Result<Layout, LayerError> {
    root_layer.validate()?;
    let mut tree = BoxTree::new();
    let mut root_box = IntentBox::px(root_layer.bbox.w, root_layer.bbox.h).with_id(&root_layer.id);
    root_box.layer_id = Some(root_layer.id.clone());
    let root = tree.insert(None, root_box);

    let layers = flatten_layers(root_layer);
    for layer in &layers {
        let rect = layer.bbox.rect();
        let mut data = IntentBox::px(layer.bbox.w, layer.bbox.h).at(rect.x0, rect.y0);
        if layer.id != root_layer.id {
            data.id = Some(layer.id.clone());
        }
        data.layer_id = Some(layer.id.clone());
        data.text = layer.text.as_ref().map(|t| BoxText {
            value: t.value.clone(),
        });
        tree.insert(Some(root), data);
    }
    debug!(layers = layers.len(), root = %root_layer.id, "converted layer tree");
    Ok(Layout::new(tree, root)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BBox, LayerText};
    use kurbo::Rect;
    use understory_intent_tree::Length;

    fn bounds(x: Option<f64>, y: Option<f64>, w: f64, h: f64) -> BBox {
        BBox { x, y, w, h }
    }

    #[test]
    fn every_layer_becomes_a_flat_child() {
        let mut group = Layer::new("group", "Group", bounds(Some(10.0), Some(10.0), 50.0, 50.0));
        let mut label = Layer::new("label", "Label", bounds(Some(20.0), Some(30.0), 30.0, 10.0));
        label.text = Some(LayerText {
            value: "Buy".into(),
        });
        group.children.push(label);
        let mut root = Layer::new("root", "Canvas", bounds(None, None, 100.0, 80.0));
        root.children.push(group);

        let layout = layer_to_box(&root).unwrap();
        let tree = layout.tree();
        let root_box = layout.root();
        assert_eq!(tree[root_box].id.as_deref(), Some("root"));
        assert_eq!(tree[root_box].layer_id.as_deref(), Some("root"));
        assert_eq!(tree[root_box].w, Length::Pixels(100.0));

        let children = tree.children_of(root_box);
        let layer_ids: Vec<_> = children
            .iter()
            .map(|&c| tree[c].layer_id.as_deref().unwrap())
            .collect();
        assert_eq!(layer_ids, ["label", "group", "root"]);
        assert!(children.iter().all(|&c| tree.children_of(c).is_empty()));

        let label = children[0];
        assert_eq!(layout.rect(label).unwrap(), Rect::new(20.0, 30.0, 50.0, 40.0));
        assert_eq!(tree[label].text.as_ref().map(|t| t.value.as_str()), Some("Buy"));
        assert_eq!(tree[children[2]].id, None, "the root layer's copy has no box id");
        assert!(tree.has_unique_ids(tree.depth_first(root_box)));
        assert_eq!(layout.rect(children[2]).unwrap(), Rect::new(0.0, 0.0, 100.0, 80.0));
    }

    #[test]
    fn invalid_bounds_fail() {
        let root = Layer::new("root", "", bounds(None, None, f64::NAN, 10.0));
        assert!(matches!(layer_to_box(&root), Err(LayerError::BadBounds(_))));
    }
}
