//! Core logic for the Twig template inspector.
//! Parses render markers, maps elements to the templates that produced them
//! and drives the hover/click overlay and editor navigation.

pub mod config;
pub mod dom;
pub mod logging;
pub mod marker;
pub mod navigation;
pub mod session;
pub mod store;
pub mod ui;

pub use config::{ConfigError, InspectorConfig};
pub use dom::{parse_html, Document, NodeId, Rect, Viewport};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use marker::{parse_start, EndMatcher, GlyphPalette, MarkerScope, MarkerToken};
pub use navigation::{
    open_template, FileLinkFormatter, FilesystemLocator, NavigationError, NavigationRequest,
    TemplateLocator,
};
pub use session::{BrowserHost, CookieFlag, InspectorSession, Key, SessionMode};
pub use store::{ProvenanceEntry, ProvenanceStore, ScanSummary, TrackedElement};
pub use ui::{ClickOutcome, ClickPoint, OverlayPresenter, PointerMove, PointerTracker, TrackerDecision};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
