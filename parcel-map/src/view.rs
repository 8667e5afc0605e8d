//! Initial position of the map.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::engine::MapCoordinate;

const EARTH_RADIUS: f64 = 6_378_137.0;
const TOP_RESOLUTION: f64 = 156543.03392800014;
const MAX_LATITUDE: f64 = 85.05112877980659;

/// Projected position of the map.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    /// Center of the screen in Web Mercator coordinates.
    pub center: MapCoordinate,
    /// Zoom level.
    pub zoom: f64,
}

impl ViewState {
    /// Size of a pixel in map units at the zoom level of the view, for 256 px tiles.
    pub fn resolution(&self) -> f64 {
        TOP_RESOLUTION / 2f64.powf(self.zoom)
    }
}

/// Geographic position of the map as it is written in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Longitude of the center, degrees.
    pub center_lon: f64,
    /// Latitude of the center, degrees.
    pub center_lat: f64,
    /// Zoom level.
    pub zoom: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_lon: -122.0225,
            center_lat: 37.0,
            zoom: 15.0,
        }
    }
}

impl ViewConfig {
    /// Projects the center into Web Mercator.
    pub fn to_view_state(&self) -> ViewState {
        ViewState {
            center: lon_lat_to_web_mercator(self.center_lon, self.center_lat),
            zoom: self.zoom,
        }
    }
}

/// Projects geographic coordinates (degrees) into Web Mercator (EPSG:3857) meters. Latitudes beyond the
/// projection limit are clamped.
pub fn lon_lat_to_web_mercator(lon: f64, lat: f64) -> MapCoordinate {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (PI / 4.0 + lat.to_radians() / 2.0).tan().ln();

    MapCoordinate::new(x, y)
}
