//! The rendering engine as seen by the interaction logic.
//!
//! Drawing, tile loading and pixel-exact hit-testing are done by the engine. This crate only needs the small set of
//! capabilities described by the [`MapEngine`] trait. [`headless::HeadlessEngine`] is an in-memory implementation
//! that can be used without any rendering backend.

use std::time::Duration;

use maybe_sync::{MaybeSend, MaybeSync};

use crate::base_style::BaseStyle;
use crate::feature::TileFeature;
use crate::style::StyleDescriptor;
use crate::tile::TileSource;
use crate::view::ViewState;

pub mod headless;

/// Per-feature style callback. The engine invokes it for every visible feature of a layer on each draw.
pub type StyleFunction = Box<dyn Fn(&TileFeature) -> StyleDescriptor + MaybeSend + MaybeSync>;

/// Identifier of a layer given out by [`MapEngine::add_tile_layer`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

/// Position on the screen in pixels from the top-left corner.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct ScreenPosition {
    /// Horizontal offset.
    pub x: f64,
    /// Vertical offset, growing downwards.
    pub y: f64,
}

impl ScreenPosition {
    /// Creates a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Sum of absolute differences of the coordinates.
    pub fn taxicab_distance(&self, other: &ScreenPosition) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Axis-aligned rectangle on the screen.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenRect {
    /// Left edge.
    pub x_min: f64,
    /// Top edge.
    pub y_min: f64,
    /// Right edge.
    pub x_max: f64,
    /// Bottom edge.
    pub y_max: f64,
}

impl ScreenRect {
    /// Creates a rectangle from two corners given in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x_min: x1.min(x2),
            y_min: y1.min(y2),
            x_max: x1.max(x2),
            y_max: y1.max(y2),
        }
    }

    /// Returns true if the point is inside or on the border of the rectangle.
    pub fn contains(&self, point: ScreenPosition) -> bool {
        point.x >= self.x_min
            && point.x <= self.x_max
            && point.y >= self.y_min
            && point.y <= self.y_max
    }
}

/// Position in the projected coordinate system of the map (Web Mercator meters).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct MapCoordinate {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
}

impl MapCoordinate {
    /// Creates a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Parameters of a vector tile layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayerConfig {
    /// Human readable name of the layer.
    pub name: String,
    /// Where the tiles come from.
    pub source: TileSource,
    /// Hide labels and symbols that overlap others.
    pub declutter: bool,
}

impl TileLayerConfig {
    /// Creates a decluttered layer.
    pub fn new(name: impl Into<String>, source: TileSource) -> Self {
        Self {
            name: name.into(),
            source,
            declutter: true,
        }
    }
}

/// Behaviour of the popup overlay.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlayOptions {
    /// Pan the map when the overlay is shown partially outside of the viewport.
    pub auto_pan: bool,
    /// Duration of the pan animation.
    pub auto_pan_duration: Duration,
}

/// Capabilities of the rendering engine used by the interaction logic.
///
/// All methods are called from the event loop of the engine and must not block.
pub trait MapEngine: MaybeSend + MaybeSync {
    /// Adds a vector tile layer on top of the existing ones.
    fn add_tile_layer(&mut self, config: TileLayerConfig) -> LayerId;

    /// Returns the features drawn at the given pixel, the topmost first.
    fn hit_test(&self, pixel: ScreenPosition) -> Vec<TileFeature>;

    /// Converts a pixel into a map coordinate. Returns `None` if the pixel is outside of the map.
    fn pixel_to_coordinate(&self, pixel: ScreenPosition) -> Option<MapCoordinate>;

    /// Sets the per-feature style callback of the layer.
    fn set_style_function(&mut self, layer: LayerId, style: StyleFunction);

    /// Makes the engine invoke the style function again for all currently visible features of the layer.
    fn request_restyle(&mut self, layer: LayerId);

    /// Applies a Mapbox-GL style to the layer.
    fn apply_base_style(&mut self, layer: LayerId, style: BaseStyle);

    /// Creates the popup overlay. Called once during the map initialization.
    fn register_overlay(&mut self, options: OverlayOptions);

    /// Replaces the content of the popup overlay.
    fn set_overlay_content(&mut self, content: String);

    /// Anchors the popup overlay to the coordinate and shows it, or hides it if `anchor` is `None`.
    fn set_overlay_anchor(&mut self, anchor: Option<MapCoordinate>);

    /// Removes the input focus from the dismiss control of the popup.
    fn release_dismiss_focus(&mut self);

    /// Sets the displayed position of the map.
    fn set_view(&mut self, view: ViewState);
}
