// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the intent tree: box identifiers, lengths, directions, and box data.

use crate::error::Error;

/// Identifier for a box in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub(crate) u32, pub(crate) u32);

impl BoxId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Unit tag of a [`Length`], used to filter effective children.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LengthUnit {
    /// Literal pixels.
    Pixels,
    /// Fraction of the effective parent's length.
    Percent,
    /// Weighted share of the parent's free space.
    Parts,
    /// Equal share of the free space when no parts are present.
    Expand,
    /// Sum of the effective children's lengths.
    Shrink,
}

/// A length along one axis.
///
/// `Percent` values are fractions, so `Percent(0.3)` is 30% of the effective parent.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub enum Length {
    /// Literal pixels.
    Pixels(f64),
    /// Fraction of the effective parent's length.
    Percent(f64),
    /// Weighted share of the free space left by pixel and percent siblings.
    Parts(f64),
    /// Equal share of the free space; loses to any `Parts` sibling.
    Expand,
    /// Sum of the effective children's lengths.
    #[default]
    Shrink,
}

impl Length {
    /// Returns the unit tag.
    pub const fn unit(self) -> LengthUnit {
        match self {
            Self::Pixels(_) => LengthUnit::Pixels,
            Self::Percent(_) => LengthUnit::Percent,
            Self::Parts(_) => LengthUnit::Parts,
            Self::Expand => LengthUnit::Expand,
            Self::Shrink => LengthUnit::Shrink,
        }
    }

    /// Returns the numeric value for units that carry one.
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Pixels(v) | Self::Percent(v) | Self::Parts(v) => Some(v),
            Self::Expand | Self::Shrink => None,
        }
    }

    /// True if the resolved value depends on the parent.
    pub const fn is_parent_relative(self) -> bool {
        matches!(self, Self::Percent(_) | Self::Parts(_) | Self::Expand)
    }
}

/// Compares two optional lengths, treating a missing length as [`Length::Shrink`].
pub fn length_equals(a: Option<Length>, b: Option<Length>) -> bool {
    a.unwrap_or_default() == b.unwrap_or_default()
}

/// Stacking direction of a box's children.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Direction {
    /// Children are layered on top of each other.
    #[default]
    None,
    /// Children flow left to right.
    Horizontal,
    /// Children flow top to bottom.
    Vertical,
}

impl Direction {
    /// The two layout axes, horizontal first.
    pub const AXES: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Returns the perpendicular axis.
    pub fn other(self) -> Result<Self, Error> {
        match self {
            Self::Horizontal => Ok(Self::Vertical),
            Self::Vertical => Ok(Self::Horizontal),
            Self::None => Err(Error::InvalidArgument("direction must be an axis")),
        }
    }

    /// Fails unless `self` is an axis.
    pub fn axis(self) -> Result<Self, Error> {
        match self {
            Self::None => Err(Error::InvalidArgument("direction must be an axis")),
            axis => Ok(axis),
        }
    }
}

/// Placement of children along an axis.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Alignment {
    /// Packed against the start edge.
    #[default]
    Near,
    /// Centered.
    Center,
    /// Packed against the end edge.
    Far,
}

/// Fixed offsets that take a box out of the stacking flow.
///
/// `l`/`t` are near offsets and `r`/`b` far offsets, each measured from the matching edge of
/// the parent. Offsets must be [`Length::Pixels`] or [`Length::Percent`].
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Absolute {
    /// Left offset.
    pub l: Option<Length>,
    /// Right offset.
    pub r: Option<Length>,
    /// Top offset.
    pub t: Option<Length>,
    /// Bottom offset.
    pub b: Option<Length>,
}

impl Absolute {
    /// Pixel offsets from the parent's top-left corner.
    pub fn at(l: f64, t: f64) -> Self {
        Self {
            l: Some(Length::Pixels(l)),
            t: Some(Length::Pixels(t)),
            ..Self::default()
        }
    }

    /// Returns the `(near, far)` offsets for an axis.
    pub fn along(&self, dir: Direction) -> Result<(Option<Length>, Option<Length>), Error> {
        match dir.axis()? {
            Direction::Horizontal => Ok((self.l, self.r)),
            _ => Ok((self.t, self.b)),
        }
    }
}

/// Text content attached to a box.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BoxText {
    /// The text itself.
    pub value: String,
}

/// Intent data for a single box.
///
/// Structure (parent and children) lives in the [`BoxTree`](crate::BoxTree) arena; this is the
/// per-box payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntentBox {
    /// Identifier, unique within a tree once assigned.
    pub id: Option<String>,
    /// Source layer this box was built from.
    pub layer_id: Option<String>,
    /// Width.
    pub w: Length,
    /// Height.
    pub h: Length,
    /// Fixed offsets; when set the box is out of flow on both axes.
    pub absolute: Option<Absolute>,
    /// Axis along which children are stacked.
    pub direction: Direction,
    /// Main-axis placement of children.
    pub alignment: Alignment,
    /// Cross-axis placement of children.
    pub cross_alignment: Alignment,
    /// Optional text content.
    pub text: Option<BoxText>,
    /// Synthetic box created by an inference pass.
    pub generated: bool,
}

impl IntentBox {
    /// A box with the given lengths.
    pub fn sized(w: Length, h: Length) -> Self {
        Self {
            w,
            h,
            ..Self::default()
        }
    }

    /// A pixel-sized box.
    pub fn px(w: f64, h: f64) -> Self {
        Self::sized(Length::Pixels(w), Length::Pixels(h))
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Places the box at pixel offsets from its parent's top-left corner.
    pub fn at(mut self, l: f64, t: f64) -> Self {
        self.absolute = Some(Absolute::at(l, t));
        self
    }

    /// Sets the absolute offsets.
    pub fn with_absolute(mut self, absolute: Absolute) -> Self {
        self.absolute = Some(absolute);
        self
    }

    /// Sets the stacking direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets main-axis and cross-axis alignment.
    pub fn with_alignment(mut self, alignment: Alignment, cross_alignment: Alignment) -> Self {
        self.alignment = alignment;
        self.cross_alignment = cross_alignment;
        self
    }

    /// Marks the box as generated.
    pub fn generated(mut self) -> Self {
        self.generated = true;
        self
    }

    /// Returns the length along an axis.
    pub fn length(&self, dir: Direction) -> Result<Length, Error> {
        match dir.axis()? {
            Direction::Horizontal => Ok(self.w),
            _ => Ok(self.h),
        }
    }

    /// Mutable access to the length along an axis.
    pub fn length_mut(&mut self, dir: Direction) -> Result<&mut Length, Error> {
        match dir.axis()? {
            Direction::Horizontal => Ok(&mut self.w),
            _ => Ok(&mut self.h),
        }
    }

    /// True if the box takes part in its parent's stacking flow.
    pub fn in_flow(&self) -> bool {
        self.absolute.is_none()
    }

    /// True if the box carries its own paint, as opposed to a generated container or filler.
    pub fn has_content(&self) -> bool {
        !self.generated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_units_and_values() {
        assert_eq!(Length::Pixels(3.0).unit(), LengthUnit::Pixels);
        assert_eq!(Length::Parts(2.0).value(), Some(2.0));
        assert_eq!(Length::Expand.value(), None);
        assert_eq!(Length::default(), Length::Shrink);
        assert!(Length::Percent(0.5).is_parent_relative());
        assert!(!Length::Shrink.is_parent_relative());
    }

    #[test]
    fn missing_lengths_compare_as_shrink() {
        assert!(length_equals(None, Some(Length::Shrink)));
        assert!(!length_equals(None, Some(Length::Expand)));
        assert!(length_equals(
            Some(Length::Pixels(1.0)),
            Some(Length::Pixels(1.0))
        ));
    }

    #[test]
    fn direction_requires_axis() {
        assert_eq!(Direction::Horizontal.other(), Ok(Direction::Vertical));
        assert_eq!(Direction::Vertical.other(), Ok(Direction::Horizontal));
        assert!(matches!(
            Direction::None.other(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(IntentBox::px(1.0, 2.0).length(Direction::None).is_err());
    }

    #[test]
    fn absolute_offsets_by_axis() {
        let abs = Absolute {
            r: Some(Length::Pixels(4.0)),
            ..Absolute::at(1.0, 2.0)
        };
        assert_eq!(
            abs.along(Direction::Horizontal),
            Ok((Some(Length::Pixels(1.0)), Some(Length::Pixels(4.0))))
        );
        assert_eq!(
            abs.along(Direction::Vertical),
            Ok((Some(Length::Pixels(2.0)), None))
        );
    }
}
