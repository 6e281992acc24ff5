//! Inspector session: the single composition object of the overlay client.
//!
//! # Responsibility
//! - Resolve the toolbar hooks once per page and decide whether the feature
//!   is present.
//! - Own the provenance store, pointer tracker and overlay presenter and
//!   coordinate their enable/disable lifecycle.
//! - Route browser side effects through `BrowserHost`.
//!
//! # Invariants
//! - The store is rebuilt on every enable and cleared on every disable.
//! - Freezing the overlay always stops the pointer tracker.
//! - Without the status checkbox nothing is attached; without the icon or
//!   the toolbar only the cookie toggle works.

use crate::config::InspectorConfig;
use crate::dom::{Document, NodeId};
use crate::session::cookie::CookieFlag;
use crate::store::{ProvenanceStore, ScanSummary};
use crate::ui::{
    ClickOutcome, ClickPoint, OverlayPresenter, OverlayView, PointerMove, PointerTracker,
    TrackerDecision,
};

/// Browser side effects the session requests.
pub trait BrowserHost {
    /// Applies a `document.cookie` assignment.
    fn set_cookie(&mut self, assignment: &str);
    fn reload(&mut self);
    /// Full-page navigation, like assigning `window.location.href`.
    fn navigate(&mut self, url: &str);
}

/// Keyboard input relevant to the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Which parts of the feature are wired on this page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Only the checkbox works (unchecked, or icon/toolbar missing).
    CookieOnly,
    /// Checkbox, icon toggle and overlay all work.
    Interactive,
}

#[derive(Debug, Clone, Copy)]
struct OverlaySurface {
    icon: NodeId,
    toolbar: NodeId,
}

pub struct InspectorSession {
    cookie: CookieFlag,
    checkbox: NodeId,
    surface: Option<OverlaySurface>,
    store: ProvenanceStore,
    tracker: PointerTracker,
    overlay: OverlayPresenter,
}

impl InspectorSession {
    /// Wires the session against a loaded page.
    ///
    /// Returns `None` when the status checkbox is absent.
    pub fn attach(document: &Document, config: &InspectorConfig) -> Option<Self> {
        Self::attach_inner(document, config, None)
    }

    /// Like `attach`, but the overlay is only wired when the activation
    /// cookie in `cookie_header` is also set.
    ///
    /// A checked box without the cookie means the page was rendered without
    /// markers, so the session stays cookie-only.
    pub fn attach_with_cookie(
        document: &Document,
        config: &InspectorConfig,
        cookie_header: &str,
    ) -> Option<Self> {
        Self::attach_inner(document, config, Some(cookie_header))
    }

    fn attach_inner(
        document: &Document,
        config: &InspectorConfig,
        cookie_header: Option<&str>,
    ) -> Option<Self> {
        let Some(checkbox) = document.element_by_id(&config.dom.status_checkbox_id) else {
            log::debug!("event=session_attach module=session status=absent reason=no_checkbox");
            return None;
        };

        let cookie = CookieFlag::new(config.cookie_name.clone());
        let rendered_active = cookie_header.map_or(true, |header| cookie.read(header));
        let checked = document.attribute(checkbox, "checked").is_some();
        let surface = if checked && rendered_active {
            let icon = document.element_by_id(&config.dom.status_icon_id);
            let toolbar = document.first_element_by_class(&config.dom.toolbar_class);
            match (icon, toolbar) {
                (Some(icon), Some(toolbar)) => Some(OverlaySurface { icon, toolbar }),
                _ => {
                    log::warn!(
                        "event=session_attach module=session status=degraded icon={} toolbar={}",
                        icon.is_some(),
                        toolbar.is_some()
                    );
                    None
                }
            }
        } else {
            None
        };

        let session = Self {
            cookie,
            checkbox,
            surface,
            store: ProvenanceStore::new(),
            tracker: PointerTracker::new(),
            overlay: OverlayPresenter::new(config.overlay),
        };
        log::info!(
            "event=session_attach module=session status=ok mode={:?}",
            session.mode()
        );
        Some(session)
    }

    pub fn mode(&self) -> SessionMode {
        if self.surface.is_some() {
            SessionMode::Interactive
        } else {
            SessionMode::CookieOnly
        }
    }

    pub fn checkbox(&self) -> NodeId {
        self.checkbox
    }

    pub fn status_icon(&self) -> Option<NodeId> {
        self.surface.map(|surface| surface.icon)
    }

    pub fn toolbar(&self) -> Option<NodeId> {
        self.surface.map(|surface| surface.toolbar)
    }

    pub fn store(&self) -> &ProvenanceStore {
        &self.store
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    pub fn view(&self) -> &OverlayView {
        self.overlay.view()
    }

    pub fn is_enabled(&self) -> bool {
        self.overlay.is_enabled()
    }

    /// Checkbox change: persist the flag for the renderer and reload, since
    /// marker presence is decided at render time.
    pub fn on_status_change(&mut self, checked: bool, host: &mut impl BrowserHost) {
        host.set_cookie(&self.cookie.assignment(checked));
        log::info!(
            "event=cookie_toggle module=session cookie={} active={checked}",
            self.cookie.name()
        );
        host.reload();
    }

    /// Status icon click: toggles the client-side overlay.
    pub fn on_icon_click(&mut self, document: &Document) {
        if self.surface.is_none() {
            return;
        }
        if self.overlay.is_enabled() {
            self.disable();
        } else {
            self.enable(document);
        }
    }

    /// Starts tracking and rescans the whole document.
    ///
    /// Returns `None` in cookie-only mode.
    pub fn enable(&mut self, document: &Document) -> Option<ScanSummary> {
        let toolbar = self.toolbar()?;
        self.tracker.start();
        self.overlay.enable();
        Some(self.store.rebuild(document, Some(toolbar)))
    }

    /// Resets the overlay, stops tracking and drops the scan.
    pub fn disable(&mut self) {
        self.overlay.reset();
        self.tracker.stop();
        self.store.clear();
        log::debug!("event=session_disable module=session status=ok");
    }

    pub fn on_pointer_move(&mut self, document: &Document, event: PointerMove) -> TrackerDecision {
        let toolbar = self.toolbar();
        self.tracker
            .on_pointer_move(event, document, &self.store, toolbar, &mut self.overlay)
    }

    /// Highlight box click; navigates through `host` for single provenance.
    pub fn on_overlay_click(
        &mut self,
        document: &Document,
        point: ClickPoint,
        host: &mut impl BrowserHost,
    ) -> ClickOutcome {
        let outcome = self.overlay.click(document, &self.store, point);
        match &outcome {
            ClickOutcome::Navigate(link) => {
                self.finish_with_navigation(link, host);
            }
            ClickOutcome::MenuOpened(rows) => {
                self.tracker.stop();
                log::debug!("event=menu_open module=session rows={rows}");
            }
            ClickOutcome::Ignored | ClickOutcome::NoTarget => {}
        }
        outcome
    }

    /// Disambiguation menu row click.
    pub fn on_menu_click(&mut self, row: usize, host: &mut impl BrowserHost) -> Option<String> {
        let link = self.overlay.menu_click(row)?;
        self.finish_with_navigation(&link, host);
        Some(link)
    }

    pub fn on_key_down(&mut self, key: Key) {
        if key == Key::Escape && self.surface.is_some() {
            self.disable();
        }
    }

    fn finish_with_navigation(&mut self, link: &str, host: &mut impl BrowserHost) {
        self.tracker.stop();
        self.store.clear();
        log::info!("event=navigate module=session status=ok");
        host.navigate(link);
    }
}
