use std::collections::HashMap;

use crate::config::PopupConfig;
use crate::control::{ClickEvent, EventPropagation};
use crate::engine::{MapCoordinate, MapEngine, OverlayOptions};
use crate::error::ParcelMapError;
use crate::feature::TileFeature;

/// What the popup currently shows.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PopupState {
    anchor: Option<MapCoordinate>,
    content: String,
}

impl PopupState {
    /// Returns true if the popup is shown.
    pub fn is_visible(&self) -> bool {
        self.anchor.is_some()
    }

    /// Map coordinate the popup points to. `None` if the popup is hidden.
    pub fn anchor(&self) -> Option<MapCoordinate> {
        self.anchor
    }

    /// Content rendered for the last shown parcel. Kept after the popup is hidden.
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Shows the details of a parcel in the popup overlay when it is clicked.
#[derive(Debug)]
pub struct PopupController {
    state: PopupState,
    template: String,
    parcel_layer: String,
    overlay: OverlayOptions,
}

impl PopupController {
    /// Creates a controller with a hidden popup. Fails if the template cannot be rendered.
    pub fn new(
        config: &PopupConfig,
        parcel_layer: impl Into<String>,
    ) -> Result<Self, ParcelMapError> {
        render_template(&config.template, &TileFeature::default())?;

        Ok(Self {
            state: PopupState::default(),
            template: config.template.clone(),
            parcel_layer: parcel_layer.into(),
            overlay: config.overlay_options(),
        })
    }

    /// Current state of the popup.
    pub fn state(&self) -> &PopupState {
        &self.state
    }

    /// Creates the popup overlay in the engine.
    pub fn register<E: MapEngine + ?Sized>(&self, engine: &mut E) {
        engine.register_overlay(self.overlay);
        engine.set_overlay_anchor(None);
    }

    /// Shows the topmost parcel under the click, or hides the popup if there is no parcel there.
    pub fn on_click<E: MapEngine + ?Sized>(&mut self, engine: &mut E, event: &ClickEvent) {
        let features = engine.hit_test(event.pixel);
        let Some(feature) = features
            .first()
            .filter(|feature| feature.layer() == self.parcel_layer)
        else {
            self.hide(engine);
            return;
        };

        match render_template(&self.template, feature) {
            Ok(content) => {
                log::debug!("Showing popup for feature {:?}", feature.id());
                self.state.content.clone_from(&content);
                self.state.anchor = Some(event.coordinate);
                engine.set_overlay_content(content);
                engine.set_overlay_anchor(Some(event.coordinate));
            }
            Err(err) => {
                log::warn!("Failed to render popup for feature {:?}: {err}", feature.id());
                self.hide(engine);
            }
        }
    }

    /// Hides the popup when its dismiss control is activated. The returned [`EventPropagation::Stop`] tells the host
    /// not to run the default action of the control.
    pub fn on_close<E: MapEngine + ?Sized>(&mut self, engine: &mut E) -> EventPropagation {
        self.hide(engine);
        engine.release_dismiss_focus();

        EventPropagation::Stop
    }

    fn hide<E: MapEngine + ?Sized>(&mut self, engine: &mut E) {
        self.state.anchor = None;
        engine.set_overlay_anchor(None);
    }
}

/// Renders the popup template for the feature. Placeholders: `{id}` and `{apn}`; missing values are rendered as
/// empty strings.
pub(crate) fn render_template(
    template: &str,
    feature: &TileFeature,
) -> Result<String, ParcelMapError> {
    let vars = HashMap::from([
        (
            "id".to_string(),
            feature.id().map(|id| id.to_string()).unwrap_or_default(),
        ),
        ("apn".to_string(), feature.apn().unwrap_or_default().to_string()),
    ]);

    Ok(strfmt::strfmt(template, &vars)?)
}
