//! Pointer-move hit-testing.
//!
//! # Responsibility
//! - Resolve the element stack under the cursor to a tracked element.
//! - Drive the overlay presenter with show/hide requests.
//!
//! # Invariants
//! - Moves are ignored unless the tracker is listening.
//! - The toolbar region always hides the overlay, but scanning continues in
//!   the same pass.
//! - `last_focused` is an identity handle only and is cleared on every hide.

use crate::dom::{Document, NodeId};
use crate::store::ProvenanceStore;
use crate::ui::overlay::OverlayPresenter;

/// Pointer position in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMove {
    pub client_x: f64,
    pub client_y: f64,
}

/// What one pointer move did to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerDecision {
    /// Not listening; the move was dropped.
    Ignored,
    /// Same element as last time; nothing re-rendered.
    Unchanged(NodeId),
    Show(NodeId),
    Hide,
}

#[derive(Debug, Default)]
pub struct PointerTracker {
    listening: bool,
    last_focused: Option<NodeId>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers interest in pointer moves.
    pub fn start(&mut self) {
        self.listening = true;
    }

    /// Drops interest in pointer moves.
    pub fn stop(&mut self) {
        self.listening = false;
        self.last_focused = None;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn last_focused(&self) -> Option<NodeId> {
        self.last_focused
    }

    /// Handles one pointer move.
    pub fn on_pointer_move(
        &mut self,
        event: PointerMove,
        document: &Document,
        store: &ProvenanceStore,
        toolbar: Option<NodeId>,
        overlay: &mut OverlayPresenter,
    ) -> TrackerDecision {
        if !self.listening {
            return TrackerDecision::Ignored;
        }

        for element in document.elements_from_point(event.client_x, event.client_y) {
            if toolbar.is_some_and(|toolbar| document.contains(toolbar, element)) {
                self.hide(overlay);
            }
            let Some(tracked) = store.find(element) else {
                continue;
            };
            if self.last_focused == Some(element) {
                return TrackerDecision::Unchanged(element);
            }
            if overlay.show(document, tracked) {
                self.last_focused = Some(element);
                log::trace!(
                    "event=overlay_show module=tracker index={} entries={}",
                    tracked.index,
                    tracked.provenance.len()
                );
                return TrackerDecision::Show(element);
            }
        }

        self.hide(overlay);
        TrackerDecision::Hide
    }

    fn hide(&mut self, overlay: &mut OverlayPresenter) {
        self.last_focused = None;
        overlay.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::{PointerMove, PointerTracker, TrackerDecision};
    use crate::config::OverlayConfig;
    use crate::dom::{Document, Rect};
    use crate::marker::MarkerScope;
    use crate::store::{ProvenanceEntry, ProvenanceStore};
    use crate::ui::overlay::OverlayPresenter;

    fn at(x: f64, y: f64) -> PointerMove {
        PointerMove {
            client_x: x,
            client_y: y,
        }
    }

    #[test]
    fn stopped_tracker_ignores_moves() {
        let doc = Document::new();
        let store = ProvenanceStore::new();
        let mut overlay = OverlayPresenter::new(OverlayConfig::default());
        let mut tracker = PointerTracker::new();

        let decision = tracker.on_pointer_move(at(1.0, 1.0), &doc, &store, None, &mut overlay);
        assert_eq!(decision, TrackerDecision::Ignored);
    }

    #[test]
    fn shows_once_then_suppresses_redundant_renders() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, div);
        doc.set_layout(div, Rect::new(0.0, 0.0, 50.0, 50.0), 0);

        let mut store = ProvenanceStore::new();
        let index = store.find_or_create(div).index;
        store.add_entry(
            index,
            ProvenanceEntry {
                template_name: "a".to_string(),
                link: "/_template/a?line=1".to_string(),
                template: "a".to_string(),
                scope: MarkerScope::Template,
            },
        );

        let mut overlay = OverlayPresenter::new(OverlayConfig::default());
        let mut tracker = PointerTracker::new();
        tracker.start();

        let first = tracker.on_pointer_move(at(5.0, 5.0), &doc, &store, None, &mut overlay);
        assert_eq!(first, TrackerDecision::Show(div));
        let second = tracker.on_pointer_move(at(6.0, 6.0), &doc, &store, None, &mut overlay);
        assert_eq!(second, TrackerDecision::Unchanged(div));

        let outside = tracker.on_pointer_move(at(90.0, 90.0), &doc, &store, None, &mut overlay);
        assert_eq!(outside, TrackerDecision::Hide);
        assert!(!overlay.view().block.visible);
        assert_eq!(tracker.last_focused(), None);

        let back = tracker.on_pointer_move(at(5.0, 5.0), &doc, &store, None, &mut overlay);
        assert_eq!(back, TrackerDecision::Show(div));
    }
}
