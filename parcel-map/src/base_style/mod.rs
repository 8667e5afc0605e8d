//! Style of the background layer.
//!
//! The background layer is styled with a Mapbox-GL style document downloaded once when the map starts. The
//! document describes many sources; only the layers drawing the tiles of the configured source are applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::BaseLayerConfig;
use crate::error::ParcelMapError;

mod provider;

pub use provider::{load_base_style, StyleProvider, UrlStyleProvider};

/// Mapbox-GL style document. Only the parts the map needs are typed, everything else is kept as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleDocument {
    /// Style specification version.
    pub version: u8,
    /// Name of the style.
    #[serde(default)]
    pub name: Option<String>,
    /// Data sources by id.
    #[serde(default)]
    pub sources: BTreeMap<String, Value>,
    /// URL of the sprite sheet.
    #[serde(default)]
    pub sprite: Option<String>,
    /// URL template of the glyph ranges.
    #[serde(default)]
    pub glyphs: Option<String>,
    /// Style layers in drawing order.
    pub layers: Vec<StyleLayer>,
}

/// A single layer of a [`StyleDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleLayer {
    /// Unique id of the layer.
    pub id: String,
    /// Layer type: `fill`, `line`, `symbol`, `background`, etc.
    #[serde(rename = "type")]
    pub layer_type: String,
    /// Id of the source the layer draws.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Name of the layer inside the vector tiles of the source.
    #[serde(
        rename = "source-layer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_layer: Option<String>,
    /// Paint, layout, filter and zoom range properties.
    #[serde(flatten)]
    pub properties: BTreeMap<String, Value>,
}

/// Part of a [`StyleDocument`] that applies to the background layer.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStyle {
    /// Source id the layers were selected by.
    pub source: String,
    /// URL of the sprite sheet.
    pub sprite: Option<String>,
    /// URL template of the glyph ranges.
    pub glyphs: Option<String>,
    /// Selected style layers in drawing order.
    pub layers: Vec<StyleLayer>,
}

impl BaseStyle {
    /// Selects the layers of the document that draw the source `source`. If `layer_ids` is given, only the layers
    /// with these ids are taken.
    ///
    /// Fails if the document does not describe the source.
    pub fn from_document(
        document: StyleDocument,
        source: &str,
        layer_ids: Option<&[String]>,
    ) -> Result<Self, ParcelMapError> {
        if !document.sources.contains_key(source) {
            return Err(ParcelMapError::Config(format!(
                "style document has no source '{source}'"
            )));
        }

        let layers = document
            .layers
            .into_iter()
            .filter(|layer| layer.source.as_deref() == Some(source))
            .filter(|layer| layer_ids.map_or(true, |ids| ids.contains(&layer.id)))
            .collect();

        Ok(Self {
            source: source.to_string(),
            sprite: document.sprite,
            glyphs: document.glyphs,
            layers,
        })
    }

    /// Selects the layers as configured for the background layer.
    pub fn from_config(
        document: StyleDocument,
        config: &BaseLayerConfig,
    ) -> Result<Self, ParcelMapError> {
        Self::from_document(document, &config.style_source, config.style_layers.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    pub(crate) const OSM_BRIGHT: &str = r##"{
        "version": 8,
        "name": "OSM Bright",
        "sources": {
            "openmaptiles": { "type": "vector", "url": "http://tiles/data/v3.json" },
            "hillshade": { "type": "raster", "url": "http://tiles/hillshade.json" }
        },
        "sprite": "http://tiles/styles/osm-bright/sprite",
        "glyphs": "http://tiles/fonts/{fontstack}/{range}.pbf",
        "layers": [
            { "id": "background", "type": "background", "paint": { "background-color": "#f8f4f0" } },
            { "id": "landuse-residential", "type": "fill", "source": "openmaptiles", "source-layer": "landuse",
              "paint": { "fill-color": "rgba(233, 227, 210, 0.8)" } },
            { "id": "park", "type": "fill", "source": "openmaptiles", "source-layer": "park" },
            { "id": "hills", "type": "raster", "source": "hillshade" },
            { "id": "water", "type": "fill", "source": "openmaptiles", "source-layer": "water",
              "filter": ["all", ["!=", "brunnel", "tunnel"]] }
        ]
    }"##;

    pub(crate) fn document() -> StyleDocument {
        serde_json::from_str(OSM_BRIGHT).unwrap()
    }

    fn ids(style: &BaseStyle) -> Vec<&str> {
        style.layers.iter().map(|layer| layer.id.as_str()).collect()
    }

    #[test]
    fn only_layers_of_source_are_selected() {
        let style = BaseStyle::from_document(document(), "openmaptiles", None).unwrap();
        assert_eq!(ids(&style), vec!["landuse-residential", "park", "water"]);
        assert_eq!(style.sprite.as_deref(), Some("http://tiles/styles/osm-bright/sprite"));
        assert_eq!(style.layers[0].source_layer.as_deref(), Some("landuse"));
        assert!(style.layers[2].properties.contains_key("filter"));
    }

    #[test]
    fn layer_ids_narrow_selection() {
        let ids_filter = vec!["water".to_string(), "park".to_string(), "hills".to_string()];
        let style =
            BaseStyle::from_document(document(), "openmaptiles", Some(ids_filter.as_slice()))
                .unwrap();
        assert_eq!(ids(&style), vec!["park", "water"]);
    }

    #[test]
    fn unknown_source_is_an_error() {
        assert_matches!(
            BaseStyle::from_document(document(), "maptiler", None),
            Err(ParcelMapError::Config(_))
        );
    }

    #[test]
    fn layer_properties_survive_serialization() {
        let doc = document();
        let json = serde_json::to_value(&doc.layers[1]).unwrap();
        assert_eq!(json["source-layer"], "landuse");
        assert_eq!(json["paint"]["fill-color"], "rgba(233, 227, 210, 0.8)");
        assert!(json.get("type").is_some());
    }
}
