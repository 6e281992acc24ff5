//! Interactive overlay: hover tracking and the highlight/label presenter.

pub mod overlay;
pub mod tracker;

pub use overlay::{
    BlockView, ClickOutcome, ClickPoint, HorizontalAnchor, LabelView, MenuRow, OverlayPresenter,
    OverlayView, StatusIndicator,
};
pub use tracker::{PointerMove, PointerTracker, TrackerDecision};
