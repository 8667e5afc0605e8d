use std::sync::Arc;

use parking_lot::RwLock;

use crate::control::PointerMoveEvent;
use crate::engine::{LayerId, MapEngine};
use crate::feature::{FeatureId, TileFeature};

/// Identity of the feature currently under the pointer, if any.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct HighlightState {
    id: Option<FeatureId>,
}

impl HighlightState {
    /// Creates a new state.
    pub fn new(id: Option<FeatureId>) -> Self {
        Self { id }
    }

    /// Highlighted identity.
    pub fn id(&self) -> Option<FeatureId> {
        self.id
    }

    /// Returns true if the feature has an identity and it is the highlighted one.
    pub fn is_highlighted(&self, feature: &TileFeature) -> bool {
        match (self.id, feature.id()) {
            (Some(highlighted), Some(id)) => highlighted == id,
            _ => false,
        }
    }
}

/// Read-only access to the state owned by a [`HighlightTracker`].
#[derive(Debug, Clone)]
pub struct HighlightHandle(Arc<RwLock<HighlightState>>);

impl HighlightHandle {
    /// Snapshot of the current state.
    pub fn get(&self) -> HighlightState {
        *self.0.read()
    }
}

/// Keeps track of the feature under the pointer and asks the engine to restyle the data layer when the pointer
/// moves.
#[derive(Debug)]
pub struct HighlightTracker {
    state: Arc<RwLock<HighlightState>>,
    data_layer: LayerId,
    redundant_restyle: bool,
}

impl HighlightTracker {
    /// Creates a tracker with nothing highlighted. `data_layer` is the layer that is restyled on pointer moves.
    pub fn new(data_layer: LayerId) -> Self {
        Self {
            state: Default::default(),
            data_layer,
            redundant_restyle: true,
        }
    }

    /// If set to `false`, the tracker does not request a restyle when the highlighted identity stays the same.
    /// Enabled by default.
    pub fn with_redundant_restyle(mut self, enabled: bool) -> Self {
        self.redundant_restyle = enabled;
        self
    }

    /// Handle to the state, to be used by the style function of the data layer.
    pub fn handle(&self) -> HighlightHandle {
        HighlightHandle(self.state.clone())
    }

    /// Current state.
    pub fn state(&self) -> HighlightState {
        *self.state.read()
    }

    pub(crate) fn set(&self, id: Option<FeatureId>) -> bool {
        let mut state = self.state.write();
        let changed = state.id != id;
        state.id = id;
        changed
    }

    /// Updates the highlight with the topmost feature under the pointer. Moves made while the map is being dragged
    /// are ignored.
    pub fn on_pointer_move<E: MapEngine + ?Sized>(&self, engine: &mut E, event: &PointerMoveEvent) {
        if event.is_dragging {
            return;
        }

        let id = engine
            .hit_test(event.pixel)
            .first()
            .and_then(TileFeature::id);
        let changed = self.set(id);
        if changed {
            log::debug!("Highlighted feature changed to {id:?}");
        }

        if changed || self.redundant_restyle {
            engine.request_restyle(self.data_layer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::headless::HeadlessEngine;
    use crate::engine::{ScreenPosition, ScreenRect, TileLayerConfig};
    use crate::tile::TileSource;

    fn setup() -> (HeadlessEngine, HighlightTracker) {
        let mut engine = HeadlessEngine::default();
        let layer = engine.add_tile_layer(TileLayerConfig::new(
            "parcels",
            TileSource::new("{z}/{x}/{y}", 14),
        ));
        engine.insert_feature(
            layer,
            TileFeature::new(Some(FeatureId(5)), "parcels"),
            ScreenRect::new(0.0, 0.0, 10.0, 10.0),
        );

        (engine, HighlightTracker::new(layer))
    }

    fn move_to(x: f64, y: f64, is_dragging: bool) -> PointerMoveEvent {
        PointerMoveEvent {
            pixel: ScreenPosition::new(x, y),
            is_dragging,
        }
    }

    #[test]
    fn pointer_over_feature_highlights_it() {
        let (mut engine, tracker) = setup();
        tracker.on_pointer_move(&mut engine, &move_to(5.0, 5.0, false));
        assert_eq!(tracker.state().id(), Some(FeatureId(5)));
        assert_eq!(engine.restyle_count(tracker.data_layer), 1);
    }

    #[test]
    fn repeated_move_restyles_every_time() {
        let (mut engine, tracker) = setup();
        tracker.on_pointer_move(&mut engine, &move_to(5.0, 5.0, false));
        tracker.on_pointer_move(&mut engine, &move_to(6.0, 5.0, false));
        assert_eq!(tracker.state().id(), Some(FeatureId(5)));
        assert_eq!(engine.restyle_count(tracker.data_layer), 2);
    }

    #[test]
    fn redundant_restyle_can_be_skipped() {
        let (mut engine, tracker) = setup();
        let tracker = tracker.with_redundant_restyle(false);
        tracker.on_pointer_move(&mut engine, &move_to(5.0, 5.0, false));
        tracker.on_pointer_move(&mut engine, &move_to(6.0, 5.0, false));
        assert_eq!(engine.restyle_count(tracker.data_layer), 1);

        tracker.on_pointer_move(&mut engine, &move_to(50.0, 50.0, false));
        assert_eq!(tracker.state().id(), None);
        assert_eq!(engine.restyle_count(tracker.data_layer), 2);
    }

    #[test]
    fn dragging_is_ignored() {
        let (mut engine, tracker) = setup();
        tracker.on_pointer_move(&mut engine, &move_to(5.0, 5.0, true));
        assert_eq!(tracker.state(), HighlightState::default());
        assert_eq!(engine.restyle_count(tracker.data_layer), 0);
    }

    #[test]
    fn empty_spot_clears_highlight() {
        let (mut engine, tracker) = setup();
        tracker.on_pointer_move(&mut engine, &move_to(5.0, 5.0, false));
        tracker.on_pointer_move(&mut engine, &move_to(50.0, 50.0, false));
        assert_eq!(tracker.state().id(), None);
        assert_eq!(engine.restyle_count(tracker.data_layer), 2);
    }
}
