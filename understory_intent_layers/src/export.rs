// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON views for downstream consumers.
//!
//! [`export_layers`] is the `layers.json` view of the flat layer layout, with preview bitmaps.
//! [`box_to_json`] is the `root.json` view of an intent hierarchy after inference.

use kurbo::Rect;
use serde::Serialize;
use understory_intent_layout::Layout;
use understory_intent_tree::{Absolute, Alignment, BoxId, Direction, Length};

use crate::{DesignFile, LayerError};

/// A rectangle as `x`, `y`, `w`, `h`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct RectView {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl From<Rect> for RectView {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            w: rect.width(),
            h: rect.height(),
        }
    }
}

/// One entry of the `layers.json` view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayerView {
    /// Layer name, if the box came from a layer.
    pub name: Option<String>,
    /// Computed rectangle.
    pub rect: RectView,
    /// Preview bitmap file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Child entries in paint order.
    pub children: Vec<Self>,
}

/// Builds the `layers.json` view of `layout`, naming boxes after the layers in `design`.
pub fn export_layers(layout: &Layout, design: &DesignFile) -> Result<LayerView, LayerError> {
    layer_view(layout, design, layout.root())
}

fn layer_view(layout: &Layout, design: &DesignFile, id: BoxId) -> Result<LayerView, LayerError> {
    let data = layout.data(id)?;
    let layer_id = data.layer_id.as_deref();
    let children = layout
        .tree()
        .children_of(id)
        .iter()
        .map(|&c| layer_view(layout, design, c))
        .collect::<Result<_, _>>()?;
    Ok(LayerView {
        name: layer_id.and_then(|l| design.layer(l)).map(|l| l.name.clone()),
        rect: layout.rect(id)?.into(),
        preview: layer_id.and_then(|l| design.bitmaps.get(l)).cloned(),
        children,
    })
}

/// A [`Length`] as `{"unit": ..., "value": ...}`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum LengthView {
    /// Pixels.
    Px(f64),
    /// Fraction of the parent.
    Percent(f64),
    /// Share of free space.
    Parts(f64),
    /// Equal share of free space.
    Expand,
    /// Fit to children.
    Shrink,
}

impl From<Length> for LengthView {
    fn from(length: Length) -> Self {
        match length {
            Length::Pixels(v) => Self::Px(v),
            Length::Percent(v) => Self::Percent(v),
            Length::Parts(v) => Self::Parts(v),
            Length::Expand => Self::Expand,
            Length::Shrink => Self::Shrink,
        }
    }
}

/// Absolute offsets; missing edges are omitted.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct AbsoluteView {
    /// Left.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l: Option<LengthView>,
    /// Right.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<LengthView>,
    /// Top.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<LengthView>,
    /// Bottom.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<LengthView>,
}

impl From<Absolute> for AbsoluteView {
    fn from(a: Absolute) -> Self {
        Self {
            l: a.l.map(Into::into),
            r: a.r.map(Into::into),
            t: a.t.map(Into::into),
            b: a.b.map(Into::into),
        }
    }
}

/// One box of the `root.json` view.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxView {
    /// Box id.
    pub id: Option<String>,
    /// Source layer.
    pub layer_id: Option<String>,
    /// Width.
    pub w: LengthView,
    /// Height.
    pub h: LengthView,
    /// Absolute offsets, if out of flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute: Option<AbsoluteView>,
    /// Stacking axis.
    pub direction: &'static str,
    /// Main-axis alignment.
    pub alignment: &'static str,
    /// Cross-axis alignment.
    pub cross_alignment: &'static str,
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Created by inference.
    pub generated: bool,
    /// Computed rectangle.
    pub rect: RectView,
    /// Children in paint order.
    pub children: Vec<Self>,
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::None => "none",
        Direction::Horizontal => "horizontal",
        Direction::Vertical => "vertical",
    }
}

fn alignment_name(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::Near => "near",
        Alignment::Center => "center",
        Alignment::Far => "far",
    }
}

/// Builds the `root.json` view of the subtree at `id`.
///
/// ```rust
/// use understory_intent_layers::box_to_json;
/// use understory_intent_layout::Layout;
/// use understory_intent_tree::{BoxTree, IntentBox};
///
/// let mut tree = BoxTree::new();
/// let root = tree.insert(None, IntentBox::px(10.0, 10.0).with_id("root"));
/// let layout = Layout::new(tree, root).unwrap();
/// let json = serde_json::to_value(box_to_json(&layout, root).unwrap()).unwrap();
/// assert_eq!(json["w"], serde_json::json!({ "unit": "px", "value": 10.0 }));
/// assert_eq!(json["direction"], "none");
/// ```
pub fn box_to_json(layout: &Layout, id: BoxId) -> Result<BoxView, LayerError> {
    let data = layout.data(id)?;
    let children = layout
        .tree()
        .children_of(id)
        .iter()
        .map(|&c| box_to_json(layout, c))
        .collect::<Result<_, _>>()?;
    Ok(BoxView {
        id: data.id.clone(),
        layer_id: data.layer_id.clone(),
        w: data.w.into(),
        h: data.h.into(),
        absolute: data.absolute.map(Into::into),
        direction: direction_name(data.direction),
        alignment: alignment_name(data.alignment),
        cross_alignment: alignment_name(data.cross_alignment),
        text: data.text.as_ref().map(|t| t.value.clone()),
        generated: data.generated,
        rect: layout.rect(id)?.into(),
        children,
    })
}
