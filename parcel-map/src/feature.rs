//! Read-only view of a feature decoded from tile data.

use std::fmt::{Display, Formatter};

use ahash::AHashMap;
use galileo_mvt::MvtFeature;

/// Name of the parcel number attribute.
pub const ATTR_APN: &str = "apn";
/// Name of the fire hazard flag attribute.
pub const ATTR_FIREHAZARD: &str = "firehazard";
/// Value of [`ATTR_FIREHAZARD`] marking a parcel as located in a fire hazard zone.
pub const FIREHAZARD_YES: &str = "Yes";

/// Stable identity of a feature within a tile source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u64);

impl Display for FeatureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for FeatureId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A feature of a vector tile layer as seen by the interaction logic.
///
/// The engine owns the feature; this type only carries what the styling and popup logic reads:
/// the identity, the name of the source layer and the attributes converted to strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TileFeature {
    id: Option<FeatureId>,
    layer: String,
    properties: AHashMap<String, String>,
}

impl TileFeature {
    /// Creates a feature without attributes.
    pub fn new(id: Option<FeatureId>, layer: impl Into<String>) -> Self {
        Self {
            id,
            layer: layer.into(),
            properties: AHashMap::new(),
        }
    }

    /// Converts a decoded MVT feature that belongs to the layer `layer`.
    pub fn from_mvt(layer: &str, feature: &MvtFeature) -> Self {
        Self {
            id: feature.id.map(FeatureId),
            layer: layer.to_string(),
            properties: feature
                .properties
                .iter()
                .map(|(key, value)| (key.clone(), value.to_string()))
                .collect(),
        }
    }

    /// Adds an attribute.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Identity of the feature, if the tile provided one.
    pub fn id(&self) -> Option<FeatureId> {
        self.id
    }

    /// Name of the source layer the feature belongs to.
    pub fn layer(&self) -> &str {
        &self.layer
    }

    /// Value of an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Parcel number.
    pub fn apn(&self) -> Option<&str> {
        self.get(ATTR_APN)
    }

    /// Fire hazard flag as stored in the tile.
    pub fn firehazard(&self) -> Option<&str> {
        self.get(ATTR_FIREHAZARD)
    }

    /// Returns true if the fire hazard flag is exactly `Yes`.
    pub fn is_fire_hazard(&self) -> bool {
        self.firehazard() == Some(FIREHAZARD_YES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attributes() {
        let feature = TileFeature::new(None, "parcels");
        assert_eq!(feature.apn(), None);
        assert_eq!(feature.firehazard(), None);
        assert!(!feature.is_fire_hazard());
    }

    #[test]
    fn fire_hazard_is_case_sensitive() {
        let feature =
            TileFeature::new(Some(FeatureId(1)), "parcels").with_property(ATTR_FIREHAZARD, "yes");
        assert!(!feature.is_fire_hazard());

        let feature = feature.with_property(ATTR_FIREHAZARD, FIREHAZARD_YES);
        assert!(feature.is_fire_hazard());
    }
}
