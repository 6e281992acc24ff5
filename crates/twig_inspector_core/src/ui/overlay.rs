//! Highlight box, info label and disambiguation menu.
//!
//! # Responsibility
//! - Compute where the highlight box and label go for a hovered element.
//! - Turn clicks on the box into navigation or a chooser menu.
//!
//! # Invariants
//! - The presenter never mutates the document; it only exposes an
//!   `OverlayView` render model.
//! - While the menu is open (static mode) box clicks are ignored and only
//!   menu rows navigate.
//! - A hidden box cannot be clicked; the last shown index is not a target.

use crate::config::OverlayConfig;
use crate::dom::{Document, Rect};
use crate::store::{ProvenanceStore, TrackedElement};
use serde::Serialize;

/// Toolbar status icon state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIndicator {
    Enabled,
    Disabled,
}

impl StatusIndicator {
    /// Toolbar status class applied to the icon.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Enabled => "sf-toolbar-status-green",
            Self::Disabled => "sf-toolbar-status-yellow",
        }
    }
}

/// Horizontal label anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAnchor {
    /// `left` in page pixels, `right: auto`.
    Left(f64),
    /// `left: auto`, `right: 0`.
    RightEdge,
}

/// One disambiguation menu row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuRow {
    pub label: String,
    pub link: String,
}

/// Highlight box render state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockView {
    /// Page-coordinate box; `y` already includes the vertical scroll.
    pub rect: Rect,
    pub visible: bool,
    /// Set while the disambiguation menu is open.
    pub static_mode: bool,
    /// Tracked element index the box currently stands for.
    pub template_index: Option<usize>,
    pub menu: Vec<MenuRow>,
}

/// Info label render state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelView {
    pub lines: Vec<String>,
    pub top: f64,
    pub anchor: HorizontalAnchor,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
}

/// Full overlay render model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub block: BlockView,
    pub info: LabelView,
    pub status: StatusIndicator,
}

impl Default for OverlayView {
    fn default() -> Self {
        Self {
            block: BlockView {
                rect: Rect::default(),
                visible: false,
                static_mode: false,
                template_index: None,
                menu: Vec::new(),
            },
            info: LabelView {
                lines: Vec::new(),
                top: 0.0,
                anchor: HorizontalAnchor::Left(0.0),
                width: 0.0,
                height: 0.0,
                visible: false,
            },
            status: StatusIndicator::Disabled,
        }
    }
}

/// Click position in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickPoint {
    pub client_x: f64,
    pub client_y: f64,
}

/// Result of a click on the highlight box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Menu already open; row handlers act instead.
    Ignored,
    /// No tracked element behind the box.
    NoTarget,
    /// Single provenance: the overlay was reset, go to `link`.
    Navigate(String),
    /// Several provenance entries: menu with this many rows opened.
    MenuOpened(usize),
}

#[derive(Debug)]
pub struct OverlayPresenter {
    config: OverlayConfig,
    view: OverlayView,
    is_enabled: bool,
    is_frozen: bool,
}

impl OverlayPresenter {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            view: OverlayView::default(),
            is_enabled: false,
            is_frozen: false,
        }
    }

    pub fn view(&self) -> &OverlayView {
        &self.view
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn is_frozen(&self) -> bool {
        self.is_frozen
    }

    pub fn is_menu_open(&self) -> bool {
        self.view.block.static_mode
    }

    /// Marks the overlay active and lights the status indicator.
    pub fn enable(&mut self) {
        self.is_enabled = true;
        self.is_frozen = false;
        self.view.status = StatusIndicator::Enabled;
    }

    /// Positions box and label over `tracked`.
    ///
    /// Returns `false` when the element has no layout box to measure.
    pub fn show(&mut self, document: &Document, tracked: &TrackedElement) -> bool {
        let Some(client) = document.bounding_client_rect(tracked.element) else {
            return false;
        };
        let viewport = document.viewport();
        let left = client.x;
        let top = client.y + viewport.scroll_y;
        let (width, height) = (client.width, client.height);

        self.view.block.rect = Rect::new(left, top, width, height);
        self.view.block.template_index = Some(tracked.index);

        let lines = tracked.label_lines();
        let (label_width, label_height) = self.config.text_metrics.measure(&lines);
        let gap = self.config.label_gap;

        let info = &mut self.view.info;
        info.lines = lines;
        info.width = label_width;
        info.height = label_height;
        info.top = if top + height + self.config.below_margin < viewport.height + viewport.scroll_y
        {
            top + height + gap
        } else {
            top - label_height - gap
        };
        info.anchor = if left + label_width < viewport.width {
            HorizontalAnchor::Left(left)
        } else {
            HorizontalAnchor::RightEdge
        };

        self.view.block.visible = true;
        info.visible = true;
        true
    }

    pub fn hide(&mut self) {
        self.view.block.visible = false;
        self.view.info.visible = false;
    }

    /// Hides the label and suspends hover tracking; the box keeps its state.
    pub fn freeze(&mut self) {
        self.view.info.visible = false;
        self.is_frozen = true;
    }

    pub fn reset(&mut self) {
        self.freeze();
        self.hide();
        self.view.block.static_mode = false;
        self.view.block.menu.clear();
        self.view.status = StatusIndicator::Disabled;
        self.is_enabled = false;
    }

    /// Handles a click on the highlight box.
    pub fn click(
        &mut self,
        document: &Document,
        store: &ProvenanceStore,
        point: ClickPoint,
    ) -> ClickOutcome {
        if self.view.block.static_mode {
            return ClickOutcome::Ignored;
        }
        if !self.view.block.visible {
            return ClickOutcome::NoTarget;
        }
        let Some(entries) = self
            .view
            .block
            .template_index
            .and_then(|index| store.provenance(index))
        else {
            return ClickOutcome::NoTarget;
        };

        match entries {
            [] => ClickOutcome::NoTarget,
            [single] => {
                let link = single.link.clone();
                self.reset();
                ClickOutcome::Navigate(link)
            }
            many => {
                self.view.block.menu = many
                    .iter()
                    .map(|entry| MenuRow {
                        label: entry.template_name.clone(),
                        link: entry.link.clone(),
                    })
                    .collect();
                self.view.block.static_mode = true;

                let offset = self.config.menu_offset;
                let rect = &mut self.view.block.rect;
                rect.x = point.client_x - offset;
                rect.y = point.client_y + document.viewport().scroll_y - offset;

                self.freeze();
                ClickOutcome::MenuOpened(many.len())
            }
        }
    }

    /// Handles a click on menu row `row`; returns the link to open.
    pub fn menu_click(&mut self, row: usize) -> Option<String> {
        if !self.view.block.static_mode {
            return None;
        }
        let link = self.view.block.menu.get(row)?.link.clone();
        self.reset();
        Some(link)
    }
}
