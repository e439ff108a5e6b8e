// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The raw layer tree extracted from a design file.

use std::collections::BTreeMap;

use kurbo::Rect;
use serde::{Deserialize, Serialize};

use crate::LayerError;

/// Bounding box of a layer in design-file coordinates.
///
/// A missing `x` or `y` is read as 0.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Top edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl BBox {
    /// The box as a rectangle.
    pub fn rect(&self) -> Rect {
        let (x, y) = (self.x.unwrap_or(0.0), self.y.unwrap_or(0.0));
        Rect::new(x, y, x + self.w, y + self.h)
    }

    fn is_valid(&self) -> bool {
        [self.x.unwrap_or(0.0), self.y.unwrap_or(0.0), self.w, self.h]
            .iter()
            .all(|v| v.is_finite())
            && self.w >= 0.0
            && self.h >= 0.0
    }
}

/// Text carried by a text layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerText {
    /// The text itself.
    pub value: String,
}

/// One layer of a design file, with its sublayers in paint order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Identifier, unique within the file.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Bounds.
    pub bbox: BBox,
    /// Text content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<LayerText>,
    /// Sublayers, bottom first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl Layer {
    /// A leaf layer.
    pub fn new(id: impl Into<String>, name: impl Into<String>, bbox: BBox) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bbox,
            text: None,
            children: Vec::new(),
        }
    }

    /// Checks every bounding box in the tree.
    pub fn validate(&self) -> Result<(), LayerError> {
        for layer in flatten_layers(self) {
            if !layer.bbox.is_valid() {
                return Err(LayerError::BadBounds(layer.id.clone()));
            }
        }
        Ok(())
    }
}

/// A design file: the root layer and the preview bitmap rendered for each layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFile {
    /// Root of the layer tree; its bounds are the canvas.
    pub root_layer: Layer,
    /// Preview bitmap file name by layer id.
    #[serde(default, alias = "bitmapFilenames")]
    pub bitmaps: BTreeMap<String, String>,
}

impl DesignFile {
    /// Parses and validates a design file.
    pub fn from_json(json: &str) -> Result<Self, LayerError> {
        let file: Self = serde_json::from_str(json)?;
        file.root_layer.validate()?;
        Ok(file)
    }

    /// Finds a layer anywhere in the tree.
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        flatten_layers(&self.root_layer)
            .into_iter()
            .find(|l| l.id == id)
    }
}

/// Every layer under `layer`, depth first: sublayers before their parent, `layer` itself last.
///
/// ```rust
/// use understory_intent_layers::{BBox, Layer, flatten_layers};
///
/// let mut group = Layer::new("group", "Group", BBox::default());
/// group.children.push(Layer::new("a", "A", BBox::default()));
/// group.children.push(Layer::new("b", "B", BBox::default()));
/// let ids: Vec<&str> = flatten_layers(&group).iter().map(|l| l.id.as_str()).collect();
/// assert_eq!(ids, ["a", "b", "group"]);
/// ```
pub fn flatten_layers(layer: &Layer) -> Vec<&Layer> {
    let mut out = Vec::new();
    // (layer, children already pushed)
    let mut stack = vec![(layer, false)];
    while let Some((current, expanded)) = stack.pop() {
        if expanded || current.children.is_empty() {
            out.push(current);
            continue;
        }
        stack.push((current, true));
        stack.extend(current.children.iter().rev().map(|c| (c, false)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_the_extractor_output() {
        let file = json!({
            "rootLayer": {
                "id": "root",
                "name": "card.psd",
                "bbox": { "w": 200, "h": 100 },
                "children": [
                    { "id": "bg", "name": "Background", "bbox": { "x": 0, "y": 0, "w": 200, "h": 100 } },
                    {
                        "id": "title",
                        "name": "Title",
                        "bbox": { "x": 10, "y": 10, "w": 80, "h": 20 },
                        "text": { "value": "Hello" }
                    }
                ]
            },
            "bitmapFilenames": { "bg": "0 - bg.jpg" }
        });
        let file = DesignFile::from_json(&file.to_string()).unwrap();
        assert_eq!(file.root_layer.children.len(), 2);
        assert_eq!(file.root_layer.bbox.rect(), Rect::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(file.bitmaps["bg"], "0 - bg.jpg");
        let title = file.layer("title").unwrap();
        assert_eq!(title.text.as_ref().map(|t| t.value.as_str()), Some("Hello"));
    }

    #[test]
    fn flattening_is_children_first() {
        let mut inner = Layer::new("inner", "", BBox::default());
        inner.children.push(Layer::new("x", "", BBox::default()));
        let mut root = Layer::new("root", "", BBox::default());
        root.children.push(inner);
        root.children.push(Layer::new("y", "", BBox::default()));
        let ids: Vec<&str> = flatten_layers(&root).iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, ["x", "inner", "y", "root"]);
        let leaf = Layer::new("leaf", "", BBox::default());
        assert_eq!(flatten_layers(&leaf), [&leaf]);
    }

    #[test]
    fn bad_bounds_are_rejected() {
        let json = r#"{ "rootLayer": { "id": "r", "bbox": { "w": -1, "h": 10 } } }"#;
        assert!(matches!(
            DesignFile::from_json(json),
            Err(LayerError::BadBounds(id)) if id == "r"
        ));
        assert!(matches!(
            DesignFile::from_json("{ \"rootLayer\": 3 }"),
            Err(LayerError::Json(_))
        ));
    }
}
