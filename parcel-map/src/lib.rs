//! Parcel map is the interaction layer of a two-layer vector tile map: a background layer styled from a
//! remote Mapbox-GL style document and a data layer of land parcels.
//!
//! # Quick start
//!
//! ```no_run
//! use parcel_map::config::MapConfig;
//! use parcel_map::engine::headless::HeadlessEngine;
//! use parcel_map::ParcelMapBuilder;
//!
//! # tokio_test::block_on(async {
//! let map = ParcelMapBuilder::new(MapConfig::default())
//!     .build(HeadlessEngine::default())
//!     .expect("valid configuration");
//! map.load_base_style().await;
//! # });
//! ```
//!
//! # Main components
//!
//! The rendering engine itself is not a part of this crate. Everything here talks to it through the
//! [`MapEngine`](engine::MapEngine) trait, which provides hit-testing, per-feature style callbacks,
//! restyle requests and a single popup overlay. On top of that trait:
//!
//! * [`style`] resolves the visual style of a parcel from its attributes and the current highlight,
//! * [`HighlightTracker`] follows the pointer and keeps at most one feature highlighted,
//! * [`PopupController`] shows parcel details on click and hides them on dismiss,
//! * [`ParcelMap`] wires the layers, the overlay and the input handlers together.
//!
//! Raw input is converted into [`MapEvent`](control::MapEvent)s by the
//! [`EventProcessor`](control::EventProcessor), which is responsible for telling clicks from drags.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
pub mod base_style;
mod color;
pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod feature;
mod highlight;
mod parcel_map;
mod popup;
pub mod style;
pub mod tile;
pub mod view;

pub use color::Color;
pub use feature::{FeatureId, TileFeature};
pub use highlight::{HighlightHandle, HighlightState, HighlightTracker};
pub use parcel_map::{ParcelMap, ParcelMapBuilder};
pub use popup::{PopupController, PopupState};
pub use style::StyleDescriptor;
