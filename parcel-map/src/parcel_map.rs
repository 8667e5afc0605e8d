use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};
use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::base_style::{load_base_style, StyleProvider, UrlStyleProvider};
use crate::config::{BaseLayerConfig, MapConfig};
use crate::control::{EventPropagation, EventProcessor, MapEvent, MapEventHandler, RawUserEvent};
use crate::engine::{LayerId, MapEngine, TileLayerConfig};
use crate::error::ParcelMapError;
use crate::highlight::{HighlightState, HighlightTracker};
use crate::popup::{PopupController, PopupState};
use crate::style::data_layer_style;

/// Name of the background layer in the engine.
const BASE_LAYER_NAME: &str = "base";

/// Builder for a [`ParcelMap`].
pub struct ParcelMapBuilder {
    config: MapConfig,
    style_provider: Option<Arc<dyn StyleProvider>>,
    event_handlers: Vec<Box<dyn MapEventHandler + MaybeSend + MaybeSync>>,
}

impl ParcelMapBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(config: MapConfig) -> Self {
        Self {
            config,
            style_provider: None,
            event_handlers: vec![],
        }
    }

    /// Sets the provider of the background style document. By default, the document is downloaded with
    /// [`UrlStyleProvider`].
    pub fn with_style_provider(mut self, provider: impl StyleProvider + 'static) -> Self {
        self.style_provider = Some(Arc::new(provider));
        self
    }

    /// Adds a handler that receives map events after the built-in highlight and popup logic. Handlers are called in
    /// the order they were added until one of them returns [`EventPropagation::Stop`].
    pub fn with_event_handler(
        mut self,
        handler: impl MapEventHandler + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.event_handlers.push(Box::new(handler));
        self
    }

    /// Sets up the layers, the style of the parcel layer and the popup overlay in the engine.
    ///
    /// The background style is not loaded here, use [`ParcelMap::load_base_style`] or
    /// [`ParcelMap::spawn_base_style_loading`] for that.
    pub fn build<E: MapEngine + 'static>(
        self,
        mut engine: E,
    ) -> Result<ParcelMap<E>, ParcelMapError> {
        let config = self.config;
        config.validate()?;

        let style_provider: Arc<dyn StyleProvider> = match self.style_provider {
            Some(provider) => provider,
            None => Arc::new(UrlStyleProvider::new()?),
        };

        engine.set_view(config.view.to_view_state());

        let base_layer = engine.add_tile_layer(TileLayerConfig::new(
            BASE_LAYER_NAME,
            config.base.tiles.clone(),
        ));
        let data_layer = engine.add_tile_layer(TileLayerConfig::new(
            config.data.layer_name.clone(),
            config.data.tiles.clone(),
        ));

        let highlight = HighlightTracker::new(data_layer)
            .with_redundant_restyle(config.highlight.redundant_restyle);
        engine.set_style_function(data_layer, data_layer_style(highlight.handle()));

        let popup = PopupController::new(&config.popup, config.data.layer_name.clone())?;
        popup.register(&mut engine);

        info!(
            "Parcel map initialized: base tiles {}, parcel tiles {}",
            config.base.tiles.url_template, config.data.tiles.url_template
        );

        Ok(ParcelMap {
            engine: Arc::new(RwLock::new(engine)),
            base_layer,
            data_layer,
            highlight,
            popup,
            processor: EventProcessor::default()
                .with_click_timeout(config.input.click_timeout()),
            event_handlers: self.event_handlers,
            style_provider,
            base_config: config.base,
        })
    }
}

/// Interactive parcel map: a background layer and a parcel layer in a [`MapEngine`], with the parcel under the
/// pointer highlighted and parcel details shown in a popup on click.
pub struct ParcelMap<E: MapEngine> {
    engine: Arc<RwLock<E>>,
    base_layer: LayerId,
    data_layer: LayerId,
    highlight: HighlightTracker,
    popup: PopupController,
    processor: EventProcessor,
    event_handlers: Vec<Box<dyn MapEventHandler + MaybeSend + MaybeSync>>,
    style_provider: Arc<dyn StyleProvider>,
    base_config: BaseLayerConfig,
}

impl<E: MapEngine + 'static> ParcelMap<E> {
    /// The engine the map is displayed with.
    pub fn engine(&self) -> &Arc<RwLock<E>> {
        &self.engine
    }

    /// Id of the background layer.
    pub fn base_layer(&self) -> LayerId {
        self.base_layer
    }

    /// Id of the parcel layer.
    pub fn data_layer(&self) -> LayerId {
        self.data_layer
    }

    /// Currently highlighted feature.
    pub fn highlight_state(&self) -> HighlightState {
        self.highlight.state()
    }

    /// Current state of the popup.
    pub fn popup_state(&self) -> &PopupState {
        self.popup.state()
    }

    /// Converts a raw input event into map events and handles them.
    ///
    /// Returns [`EventPropagation::Stop`] if the host must not run the default action for the event.
    pub fn handle_input(&mut self, event: RawUserEvent) -> EventPropagation {
        let events = self.processor.process(event, &*self.engine.read());

        let mut propagation = EventPropagation::Propagate;
        for event in events {
            if self.handle_event(&event) == EventPropagation::Stop {
                propagation = EventPropagation::Stop;
            }
        }

        propagation
    }

    /// Handles a map event: updates the highlight on pointer moves and the popup on clicks and close requests,
    /// then passes the event to the custom handlers.
    pub fn handle_event(&mut self, event: &MapEvent) -> EventPropagation {
        let propagation = {
            let mut engine = self.engine.write();
            match event {
                MapEvent::PointerMoved(move_event) => {
                    self.highlight.on_pointer_move(&mut *engine, move_event);
                    EventPropagation::Propagate
                }
                MapEvent::Click(click_event) => {
                    self.popup.on_click(&mut *engine, click_event);
                    EventPropagation::Propagate
                }
                MapEvent::PopupClose => self.popup.on_close(&mut *engine),
            }
        };

        if propagation == EventPropagation::Stop {
            return propagation;
        }

        for handler in &mut self.event_handlers {
            if handler.handle(event) == EventPropagation::Stop {
                return EventPropagation::Stop;
            }
        }

        EventPropagation::Propagate
    }

    /// Loads the background style document and applies it to the background layer.
    ///
    /// The returned future resolves to `true` if the style was applied. Loading errors are logged and leave the
    /// background layer unstyled. If the engine is dropped before the document is loaded, the document is discarded.
    pub fn load_base_style(&self) -> impl Future<Output = bool> + Send + 'static {
        let engine = Arc::downgrade(&self.engine);
        let provider = self.style_provider.clone();
        let config = self.base_config.clone();
        let layer = self.base_layer;

        async move {
            let style = match load_base_style(provider.as_ref(), &config).await {
                Ok(style) => style,
                Err(err) => {
                    warn!("Failed to load base style from {}: {err}", config.style_url);
                    return false;
                }
            };

            let Some(engine) = engine.upgrade() else {
                debug!("Map was dropped before the base style was loaded");
                return false;
            };

            engine.write().apply_base_style(layer, style);
            true
        }
    }

    /// Starts loading the background style in the background. Must be called from a tokio runtime.
    pub fn spawn_base_style_loading(&self) -> JoinHandle<bool> {
        crate::async_runtime::spawn(self.load_base_style())
    }
}

impl<E: MapEngine + 'static> MapEventHandler for ParcelMap<E> {
    fn handle(&mut self, event: &MapEvent) -> EventPropagation {
        self.handle_event(event)
    }
}
