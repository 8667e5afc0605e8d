//! Styling of the parcel layer.
//!
//! The style of a parcel depends only on its own attributes and on the current [`HighlightState`], so the
//! resolver is a pure function. The engine gets it wrapped into a [`StyleFunction`] by [`data_layer_style`].

use crate::engine::StyleFunction;
use crate::feature::TileFeature;
use crate::highlight::{HighlightHandle, HighlightState};
use crate::Color;

/// Stroke width the engine uses when a style does not set one.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.25;
/// Font of the labels when a style does not set one.
pub const DEFAULT_FONT: &str = "10px sans-serif";

/// Outline of a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Line color.
    pub color: Color,
    /// Line width in pixels.
    pub width: f64,
}

/// Text drawn over a feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// The text.
    pub text: String,
    /// CSS font specification.
    pub font: String,
    /// Text color.
    pub color: Color,
}

/// How a single feature is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDescriptor {
    /// Which of the rules produced this style.
    pub kind: StyleKind,
    /// Polygon fill.
    pub fill: Color,
    /// Polygon outline.
    pub stroke: Stroke,
    /// Optional label.
    pub label: Option<Label>,
}

/// Rule that selected a [`StyleDescriptor`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StyleKind {
    /// The feature is under the pointer.
    Selected,
    /// The parcel is in a fire hazard zone.
    FireHazard,
    /// Any other parcel.
    Parcel,
}

/// Returns the style of `feature` given the current highlight.
///
/// Rules are checked in order and the first matching one wins:
/// 1. the feature is the highlighted one - [`selected`] style,
/// 2. the fire hazard flag is `Yes` - [`fire_hazard`] style,
/// 3. otherwise - [`parcel`] style.
///
/// Missing attributes never match, so a feature without an id is never highlighted.
pub fn resolve(feature: &TileFeature, highlight: &HighlightState) -> StyleDescriptor {
    if highlight.is_highlighted(feature) {
        return selected(feature);
    }

    if feature.is_fire_hazard() {
        return fire_hazard(feature);
    }

    parcel(feature)
}

/// Style of the feature under the pointer.
pub fn selected(feature: &TileFeature) -> StyleDescriptor {
    StyleDescriptor {
        kind: StyleKind::Selected,
        fill: Color::rgb_opacity(200, 200, 20, 0.2),
        stroke: Stroke {
            color: Color::rgba(255, 255, 20, 255),
            width: 3.0,
        },
        label: id_label(feature, "14px sans-serif"),
    }
}

/// Style of a parcel in a fire hazard zone. The label is the value of the flag itself.
pub fn fire_hazard(feature: &TileFeature) -> StyleDescriptor {
    StyleDescriptor {
        kind: StyleKind::FireHazard,
        fill: Color::from_hex("#ff000020"),
        stroke: Stroke {
            color: Color::from_hex("#ff0000"),
            width: 2.0,
        },
        label: feature.firehazard().map(|value| label(value.to_string(), DEFAULT_FONT)),
    }
}

/// Style of an ordinary parcel.
pub fn parcel(feature: &TileFeature) -> StyleDescriptor {
    StyleDescriptor {
        kind: StyleKind::Parcel,
        fill: Color::from_hex("#80ff8010"),
        stroke: Stroke {
            color: Color::from_hex("#007000"),
            width: DEFAULT_STROKE_WIDTH,
        },
        label: id_label(feature, DEFAULT_FONT),
    }
}

fn id_label(feature: &TileFeature, font: &str) -> Option<Label> {
    feature.id().map(|id| label(id.to_string(), font))
}

fn label(text: String, font: &str) -> Label {
    Label {
        text,
        font: font.to_string(),
        color: Color::BLACK,
    }
}

/// Creates the per-feature callback for the data layer. Every call reads the current state behind `highlight`.
pub fn data_layer_style(highlight: HighlightHandle) -> StyleFunction {
    Box::new(move |feature: &TileFeature| resolve(feature, &highlight.get()))
}
