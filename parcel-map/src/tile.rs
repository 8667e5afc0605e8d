//! Tile addressing for the map layers and decoding of tile payloads into [`TileFeature`]s.

use std::collections::HashMap;

use bytes::Buf;
use galileo_mvt::MvtTile;
use serde::{Deserialize, Serialize};

use crate::error::ParcelMapError;
use crate::feature::TileFeature;

/// Index of a tile in the `{z}/{x}/{y}` scheme.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileIndex {
    /// X index of the tile, from the left.
    pub x: u32,
    /// Y index of the tile, from the top.
    pub y: u32,
    /// Zoom level.
    pub z: u32,
}

impl TileIndex {
    /// Creates a new index.
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Returns the tile of the zoom level `z` that contains this tile. Returns `self` if the tile is already at or
    /// above `z`.
    pub fn ancestor_at(&self, z: u32) -> Self {
        if z >= self.z {
            return *self;
        }

        let shift = self.z - z;
        Self {
            x: self.x.checked_shr(shift).unwrap_or(0),
            y: self.y.checked_shr(shift).unwrap_or(0),
            z,
        }
    }
}

/// Source of the tiles of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    /// URL template with `{z}`, `{x}` and `{y}` placeholders.
    pub url_template: String,
    /// Maximum zoom level the server provides tiles for. Higher levels are served by over-zooming.
    pub max_zoom: u32,
}

impl TileSource {
    /// Creates a new source.
    pub fn new(url_template: impl Into<String>, max_zoom: u32) -> Self {
        Self {
            url_template: url_template.into(),
            max_zoom,
        }
    }

    /// Index of the tile that must be downloaded to display the tile `index`.
    pub fn source_tile(&self, index: TileIndex) -> TileIndex {
        index.ancestor_at(self.max_zoom)
    }

    /// URL of the tile that must be downloaded to display the tile `index`.
    pub fn tile_url(&self, index: TileIndex) -> Result<String, ParcelMapError> {
        let index = self.source_tile(index);
        let vars = HashMap::from([
            ("z".to_string(), index.z.to_string()),
            ("x".to_string(), index.x.to_string()),
            ("y".to_string(), index.y.to_string()),
        ]);

        Ok(strfmt::strfmt(&self.url_template, &vars)?)
    }

    /// Checks that the URL template contains nothing but the known placeholders.
    pub fn validate(&self) -> Result<(), ParcelMapError> {
        self.tile_url(TileIndex::new(0, 0, 0)).map(|_| ())
    }
}

/// Decodes an MVT tile and returns the features of all its layers, in the order they are stored in the tile.
///
/// Recoverable errors (single broken features or values) are skipped with a warning.
pub fn decode_features(buffer: impl Buf) -> Result<Vec<TileFeature>, ParcelMapError> {
    let tile = MvtTile::decode(buffer, true)?;
    let features = tile
        .layers
        .iter()
        .flat_map(|layer| {
            layer
                .features
                .iter()
                .map(|feature| TileFeature::from_mvt(&layer.name, feature))
        })
        .collect();

    Ok(features)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use geozero::mvt::tile::{Feature, GeomType, Layer, Value};
    use geozero::mvt::{Message, Tile};

    use super::*;
    use crate::feature::FeatureId;

    fn string_value(value: &str) -> Value {
        Value {
            string_value: Some(value.to_string()),
            ..Default::default()
        }
    }

    fn parcels_tile() -> Vec<u8> {
        let point = vec![9, 2, 2];
        let tile = Tile {
            layers: vec![Layer {
                version: 2,
                name: "parcels".to_string(),
                keys: vec!["apn".to_string(), "firehazard".to_string(), "acres".to_string()],
                values: vec![
                    string_value("APN-001"),
                    string_value("Yes"),
                    Value {
                        int_value: Some(3),
                        ..Default::default()
                    },
                ],
                features: vec![
                    Feature {
                        id: Some(123),
                        tags: vec![0, 0, 1, 1, 2, 2],
                        r#type: Some(GeomType::Point as i32),
                        geometry: point.clone(),
                    },
                    Feature {
                        id: None,
                        tags: vec![],
                        r#type: Some(GeomType::Point as i32),
                        geometry: point,
                    },
                ],
                extent: Some(4096),
            }],
        };

        tile.encode_to_vec()
    }

    #[test]
    fn tile_url_rendering() {
        let source = TileSource::new("http://tiles/maps/parcels/{z}/{x}/{y}.pbf", 14);
        assert_eq!(
            source.tile_url(TileIndex::new(2620, 6333, 14)).unwrap(),
            "http://tiles/maps/parcels/14/2620/6333.pbf"
        );
    }

    #[test]
    fn tiles_above_max_zoom_are_overzoomed() {
        let source = TileSource::new("{z}/{x}/{y}", 14);
        assert_eq!(
            source.source_tile(TileIndex::new(10483, 25335, 16)),
            TileIndex::new(2620, 6333, 14)
        );
        assert_eq!(
            source.tile_url(TileIndex::new(10483, 25335, 16)).unwrap(),
            "14/2620/6333"
        );
        assert_eq!(
            source.source_tile(TileIndex::new(5, 7, 3)),
            TileIndex::new(5, 7, 3)
        );
    }

    #[test]
    fn deep_overzoom_reaches_root_tile() {
        let source = TileSource::new("{z}/{x}/{y}", 0);
        assert_eq!(source.tile_url(TileIndex::new(0, 0, 32)).unwrap(), "0/0/0");
        assert_eq!(
            source.source_tile(TileIndex::new(u32::MAX, 7, 40)),
            TileIndex::new(0, 0, 0)
        );
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let source = TileSource::new("{z}/{x}/{y}/{scale}", 14);
        assert_matches!(source.validate(), Err(ParcelMapError::Template(_)));
    }

    #[test]
    fn decode_parcels() {
        let features = decode_features(&parcels_tile()[..]).unwrap();
        assert_eq!(features.len(), 2);

        let parcel = &features[0];
        assert_eq!(parcel.id(), Some(FeatureId(123)));
        assert_eq!(parcel.layer(), "parcels");
        assert_eq!(parcel.apn(), Some("APN-001"));
        assert!(parcel.is_fire_hazard());
        assert_eq!(parcel.get("acres"), Some("3"));

        assert_eq!(features[1].id(), None);
        assert_eq!(features[1].apn(), None);
    }

    #[test]
    fn decode_garbage() {
        assert!(decode_features(&[0xff, 0xff, 0xff][..]).is_err());
    }
}
