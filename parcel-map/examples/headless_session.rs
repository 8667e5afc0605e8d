//! This example runs the parcel map interaction logic against the in-memory engine and logs what the user would
//! see: which parcel is highlighted and what the popup shows.
//!
//! Run it with an optional path to a JSON configuration file:
//!
//! ```shell
//! cargo run --example headless_session -- ./map_config.json
//! ```
//!
//! The background style is requested from the configured tile server. If it cannot be reached, the warning is
//! logged and the session goes on with an unstyled background.

use anyhow::Result;
use parcel_map::config::MapConfig;
use parcel_map::control::{EventPropagation, MapEvent, MouseButton, RawUserEvent};
use parcel_map::engine::headless::HeadlessEngine;
use parcel_map::engine::{MapCoordinate, ScreenPosition, ScreenRect};
use parcel_map::feature::{ATTR_APN, ATTR_FIREHAZARD};
use parcel_map::{FeatureId, ParcelMap, ParcelMapBuilder, TileFeature};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => MapConfig::from_file(path)?,
        None => MapConfig::default(),
    };

    let view = config.view.to_view_state();
    let engine = HeadlessEngine::default()
        .with_screen_size(800.0, 600.0)
        .with_transform(
            MapCoordinate::new(
                view.center.x - 400.0 * view.resolution(),
                view.center.y + 300.0 * view.resolution(),
            ),
            view.resolution(),
        );

    let mut map = ParcelMapBuilder::new(config)
        .with_event_handler(|event: &MapEvent| {
            if let MapEvent::Click(click) = event {
                log::info!(
                    "Clicked at ({:.1}, {:.1})",
                    click.coordinate.x,
                    click.coordinate.y
                );
            }

            EventPropagation::Propagate
        })
        .build(engine)?;

    add_parcels(&map);

    let style_loading = map.spawn_base_style_loading();

    let session = [
        RawUserEvent::PointerMoved(ScreenPosition::new(120.0, 120.0)),
        RawUserEvent::PointerMoved(ScreenPosition::new(320.0, 140.0)),
        RawUserEvent::ButtonPressed(MouseButton::Left),
        RawUserEvent::ButtonReleased(MouseButton::Left),
        RawUserEvent::ButtonPressed(MouseButton::Left),
        RawUserEvent::PointerMoved(ScreenPosition::new(380.0, 200.0)),
        RawUserEvent::ButtonReleased(MouseButton::Left),
        RawUserEvent::PointerMoved(ScreenPosition::new(700.0, 500.0)),
        RawUserEvent::PopupCloseRequested,
    ];

    for event in session {
        let propagation = map.handle_input(event);
        log::info!(
            "{event:?}: highlighted {:?}, popup {:?}, {propagation:?}",
            map.highlight_state().id(),
            map.popup_state()
        );
    }

    {
        let engine = map.engine().read();
        for id in [FeatureId(1001), FeatureId(1002)] {
            if let Some(style) = engine.rendered_style(map.data_layer(), id) {
                log::info!(
                    "Parcel {id}: {:?}, fill {}, stroke {} {}px",
                    style.kind,
                    style.fill.to_css(),
                    style.stroke.color.to_css(),
                    style.stroke.width
                );
            }
        }
    }

    if style_loading.await? {
        let engine = map.engine().read();
        if let Some(style) = engine.base_style(map.base_layer()) {
            log::info!("Background styled with {} layers", style.layers.len());
        }
    }

    Ok(())
}

fn add_parcels(map: &ParcelMap<HeadlessEngine>) {
    let mut engine = map.engine().write();
    let data_layer = map.data_layer();

    engine.insert_feature(
        data_layer,
        TileFeature::new(Some(FeatureId(1001)), "parcels").with_property(ATTR_APN, "067-091-01"),
        ScreenRect::new(100.0, 100.0, 250.0, 220.0),
    );
    engine.insert_feature(
        data_layer,
        TileFeature::new(Some(FeatureId(1002)), "parcels")
            .with_property(ATTR_APN, "067-091-02")
            .with_property(ATTR_FIREHAZARD, "Yes"),
        ScreenRect::new(250.0, 100.0, 400.0, 220.0),
    );
}
