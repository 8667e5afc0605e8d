//! Configuration of the parcel map.
//!
//! Every section has defaults, so a configuration file only needs to contain the values that differ from them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::OverlayOptions;
use crate::error::ParcelMapError;
use crate::popup::render_template;
use crate::tile::TileSource;
use crate::view::ViewConfig;
use crate::TileFeature;

const BASE_URL: &str =
    "http://sc-tileserver-gl-scfire.openshift-pousty-apps.gce-containers.crunchydata.com";
const DATA_URL: &str = "http://tegola-scfire.openshift-pousty-apps.gce-containers.crunchydata.com";
const MAX_ZOOM: u32 = 14;

/// Complete configuration of the map.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Background layer.
    pub base: BaseLayerConfig,
    /// Parcel layer.
    pub data: DataLayerConfig,
    /// Initial view.
    pub view: ViewConfig,
    /// Parcel popup.
    pub popup: PopupConfig,
    /// Pointer highlight.
    pub highlight: HighlightConfig,
    /// Pointer input.
    pub input: InputConfig,
}

impl MapConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ParcelMapError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ParcelMapError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that templates can be rendered and that the parcel layer is named.
    pub fn validate(&self) -> Result<(), ParcelMapError> {
        self.base.tiles.validate()?;
        self.data.tiles.validate()?;
        render_template(&self.popup.template, &TileFeature::default())?;

        if self.data.layer_name.is_empty() {
            return Err(ParcelMapError::Config(
                "parcel layer name must not be empty".into(),
            ));
        }

        if self.base.style_source.is_empty() {
            return Err(ParcelMapError::Config(
                "base style source must not be empty".into(),
            ));
        }

        Ok(())
    }
}

/// Background layer: OpenMapTiles vector tiles styled by a Mapbox-GL style document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseLayerConfig {
    /// Tile source.
    pub tiles: TileSource,
    /// URL of the style document.
    pub style_url: String,
    /// Only style layers bound to this source of the style document are applied.
    pub style_source: String,
    /// If set, only style layers with these ids are applied.
    pub style_layers: Option<Vec<String>>,
}

impl Default for BaseLayerConfig {
    fn default() -> Self {
        Self {
            tiles: TileSource::new(format!("{BASE_URL}/data/v3/{{z}}/{{x}}/{{y}}.pbf"), MAX_ZOOM),
            style_url: format!("{BASE_URL}/styles/osm-bright/style.json"),
            style_source: "openmaptiles".to_string(),
            style_layers: None,
        }
    }
}

/// Parcel layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLayerConfig {
    /// Tile source.
    pub tiles: TileSource,
    /// Name of the tile layer parcels are stored in. Popups are shown only for features of this layer.
    pub layer_name: String,
}

impl Default for DataLayerConfig {
    fn default() -> Self {
        Self {
            tiles: TileSource::new(
                format!("{DATA_URL}/maps/parcels/{{z}}/{{x}}/{{y}}.pbf"),
                MAX_ZOOM,
            ),
            layer_name: "parcels".to_string(),
        }
    }
}

/// Parcel popup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Content template with `{id}` and `{apn}` placeholders.
    pub template: String,
    /// Pan the map to show the popup if it does not fit on the screen.
    pub auto_pan: bool,
    /// Duration of the pan animation in milliseconds.
    pub auto_pan_duration_ms: u64,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            template: "<p><b>Parcel {id}</b></p><p>APN: {apn}</p>".to_string(),
            auto_pan: true,
            auto_pan_duration_ms: 250,
        }
    }
}

impl PopupConfig {
    /// Overlay options for the engine.
    pub fn overlay_options(&self) -> OverlayOptions {
        OverlayOptions {
            auto_pan: self.auto_pan,
            auto_pan_duration: Duration::from_millis(self.auto_pan_duration_ms),
        }
    }
}

/// Pointer highlight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Restyle the parcel layer on every pointer move, even if the highlighted parcel did not change.
    pub redundant_restyle: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            redundant_restyle: true,
        }
    }
}

/// Pointer input.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Longest press in milliseconds that still counts as a click. Presses of any length are clicks if not set.
    pub click_timeout_ms: Option<u64>,
}

impl InputConfig {
    /// Click timeout for the event processor.
    pub fn click_timeout(&self) -> Option<Duration> {
        self.click_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tile::TileIndex;

    #[test]
    fn defaults() {
        let config = MapConfig::default();
        config.validate().unwrap();

        assert_eq!(config.base.tiles.max_zoom, 14);
        assert_eq!(config.data.tiles.max_zoom, 14);
        assert_eq!(config.data.layer_name, "parcels");
        assert_eq!(config.base.style_source, "openmaptiles");
        assert!(config.base.style_url.ends_with("/styles/osm-bright/style.json"));
        assert_eq!(
            config.data.tiles.tile_url(TileIndex::new(1, 2, 3)).unwrap(),
            format!("{DATA_URL}/maps/parcels/3/1/2.pbf")
        );
        assert_eq!(config.popup.overlay_options().auto_pan_duration, Duration::from_millis(250));
        assert!(config.highlight.redundant_restyle);
        assert_eq!(config.input.click_timeout(), None);
        assert_eq!(
            config.popup.template,
            "<p><b>Parcel {id}</b></p><p>APN: {apn}</p>"
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MapConfig::from_json(
            r#"{
                "data": { "layer_name": "lots" },
                "view": { "center_lon": 10.0, "center_lat": 20.0, "zoom": 12.0 },
                "highlight": { "redundant_restyle": false },
                "input": { "click_timeout_ms": 300 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.data.layer_name, "lots");
        assert_eq!(config.data.tiles, DataLayerConfig::default().tiles);
        assert_eq!(config.view.zoom, 12.0);
        assert_eq!(config.popup, PopupConfig::default());
        assert!(!config.highlight.redundant_restyle);
        assert_eq!(config.input.click_timeout(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_matches!(
            MapConfig::from_json(r#"{ "popup": { "template": "{owner}" } }"#),
            Err(ParcelMapError::Template(_))
        );
        assert_matches!(
            MapConfig::from_json(r#"{ "data": { "layer_name": "" } }"#),
            Err(ParcelMapError::Config(_))
        );
        assert_matches!(
            MapConfig::from_json(r#"{ "base": { "tiles": { "url_template": "{q}", "max_zoom": 3 } } }"#),
            Err(ParcelMapError::Template(_))
        );
        assert_matches!(
            MapConfig::from_json("{ not json"),
            Err(ParcelMapError::Json(_))
        );
    }

    #[test]
    fn missing_file() {
        assert_matches!(
            MapConfig::from_file("/definitely/not/here.json"),
            Err(ParcelMapError::FsIo(_))
        );
    }
}
