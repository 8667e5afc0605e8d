//! In-memory [`MapEngine`] without a rendering backend.

use crate::base_style::BaseStyle;
use crate::engine::{
    LayerId, MapCoordinate, MapEngine, OverlayOptions, ScreenPosition, ScreenRect, StyleFunction,
    TileLayerConfig,
};
use crate::feature::{FeatureId, TileFeature};
use crate::style::StyleDescriptor;
use crate::view::ViewState;

/// Engine that keeps features with their screen footprints in memory and records everything the interaction
/// logic asks it to do.
///
/// Pixels are converted into map coordinates with a linear transform: the top-left corner of the screen is at
/// `origin`, one pixel is `resolution` map units and the Y axis points up.
pub struct HeadlessEngine {
    layers: Vec<HeadlessLayer>,
    origin: MapCoordinate,
    resolution: f64,
    screen_size: Option<(f64, f64)>,
    overlay: Option<OverlayOptions>,
    overlay_content: String,
    overlay_anchor: Option<MapCoordinate>,
    dismiss_focused: bool,
    view: Option<ViewState>,
}

struct HeadlessLayer {
    config: TileLayerConfig,
    style: Option<StyleFunction>,
    features: Vec<(TileFeature, ScreenRect)>,
    rendered: Vec<(Option<FeatureId>, StyleDescriptor)>,
    restyle_count: usize,
    base_style: Option<BaseStyle>,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self {
            layers: vec![],
            origin: MapCoordinate::default(),
            resolution: 1.0,
            screen_size: None,
            overlay: None,
            overlay_content: String::new(),
            overlay_anchor: None,
            dismiss_focused: false,
            view: None,
        }
    }
}

impl HeadlessEngine {
    /// Sets the map coordinate of the top-left pixel and the size of a pixel in map units.
    pub fn with_transform(mut self, origin: MapCoordinate, resolution: f64) -> Self {
        self.origin = origin;
        self.resolution = resolution;
        self
    }

    /// Limits the screen to the given size. Pixels outside of it have no map coordinate.
    pub fn with_screen_size(mut self, width: f64, height: f64) -> Self {
        self.screen_size = Some((width, height));
        self
    }

    /// Adds a feature to the layer, drawn over the previously added ones.
    pub fn insert_feature(&mut self, layer: LayerId, feature: TileFeature, footprint: ScreenRect) {
        match self.layers.get_mut(layer.0) {
            Some(layer) => layer.features.push((feature, footprint)),
            None => log::warn!("Feature inserted into unknown layer {layer:?}"),
        }
    }

    /// Configuration of the layer.
    pub fn layer_config(&self, layer: LayerId) -> Option<&TileLayerConfig> {
        self.layers.get(layer.0).map(|layer| &layer.config)
    }

    /// Number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the layer has a style function.
    pub fn has_style_function(&self, layer: LayerId) -> bool {
        self.layers
            .get(layer.0)
            .is_some_and(|layer| layer.style.is_some())
    }

    /// How many times the layer was restyled.
    pub fn restyle_count(&self, layer: LayerId) -> usize {
        self.layers
            .get(layer.0)
            .map_or(0, |layer| layer.restyle_count)
    }

    /// Style the feature got at the last restyle of the layer.
    pub fn rendered_style(&self, layer: LayerId, id: FeatureId) -> Option<&StyleDescriptor> {
        self.layers.get(layer.0).and_then(|layer| {
            layer
                .rendered
                .iter()
                .find(|(feature_id, _)| *feature_id == Some(id))
                .map(|(_, style)| style)
        })
    }

    /// Base style applied to the layer, if any.
    pub fn base_style(&self, layer: LayerId) -> Option<&BaseStyle> {
        self.layers
            .get(layer.0)
            .and_then(|layer| layer.base_style.as_ref())
    }

    /// Options of the registered overlay.
    pub fn overlay_options(&self) -> Option<OverlayOptions> {
        self.overlay
    }

    /// Current content of the overlay.
    pub fn overlay_content(&self) -> &str {
        &self.overlay_content
    }

    /// Anchor of the overlay. `None` means the overlay is hidden.
    pub fn overlay_anchor(&self) -> Option<MapCoordinate> {
        self.overlay_anchor
    }

    /// Gives the input focus to the dismiss control, as a click on it would.
    pub fn focus_dismiss_control(&mut self) {
        self.dismiss_focused = true;
    }

    /// Returns true if the dismiss control has the input focus.
    pub fn is_dismiss_focused(&self) -> bool {
        self.dismiss_focused
    }

    /// Last view set by the interaction logic.
    pub fn view(&self) -> Option<&ViewState> {
        self.view.as_ref()
    }
}

impl MapEngine for HeadlessEngine {
    fn add_tile_layer(&mut self, config: TileLayerConfig) -> LayerId {
        self.layers.push(HeadlessLayer {
            config,
            style: None,
            features: vec![],
            rendered: vec![],
            restyle_count: 0,
            base_style: None,
        });

        LayerId(self.layers.len() - 1)
    }

    fn hit_test(&self, pixel: ScreenPosition) -> Vec<TileFeature> {
        self.layers
            .iter()
            .rev()
            .flat_map(|layer| layer.features.iter().rev())
            .filter(|(_, footprint)| footprint.contains(pixel))
            .map(|(feature, _)| feature.clone())
            .collect()
    }

    fn pixel_to_coordinate(&self, pixel: ScreenPosition) -> Option<MapCoordinate> {
        if let Some((width, height)) = self.screen_size {
            if pixel.x < 0.0 || pixel.y < 0.0 || pixel.x > width || pixel.y > height {
                return None;
            }
        }

        Some(MapCoordinate::new(
            self.origin.x + pixel.x * self.resolution,
            self.origin.y - pixel.y * self.resolution,
        ))
    }

    fn set_style_function(&mut self, layer: LayerId, style: StyleFunction) {
        match self.layers.get_mut(layer.0) {
            Some(layer) => layer.style = Some(style),
            None => log::warn!("Style function set for unknown layer {layer:?}"),
        }
    }

    fn request_restyle(&mut self, layer: LayerId) {
        let Some(layer) = self.layers.get_mut(layer.0) else {
            log::warn!("Restyle requested for unknown layer {layer:?}");
            return;
        };

        layer.restyle_count += 1;
        layer.rendered = match &layer.style {
            Some(style) => layer
                .features
                .iter()
                .map(|(feature, _)| (feature.id(), style(feature)))
                .collect(),
            None => vec![],
        };
    }

    fn apply_base_style(&mut self, layer: LayerId, style: BaseStyle) {
        match self.layers.get_mut(layer.0) {
            Some(layer) => layer.base_style = Some(style),
            None => log::warn!("Base style applied to unknown layer {layer:?}"),
        }
    }

    fn register_overlay(&mut self, options: OverlayOptions) {
        self.overlay = Some(options);
    }

    fn set_overlay_content(&mut self, content: String) {
        self.overlay_content = content;
    }

    fn set_overlay_anchor(&mut self, anchor: Option<MapCoordinate>) {
        self.overlay_anchor = anchor;
    }

    fn release_dismiss_focus(&mut self) {
        self.dismiss_focused = false;
    }

    fn set_view(&mut self, view: ViewState) {
        self.view = Some(view);
    }
}
