//! Element to template provenance index.
//!
//! # Responsibility
//! - Scan one document's comment markers and attribute the elements between
//!   each start/end pair.
//! - Answer identity lookups from the pointer tracker and overlay.
//!
//! # Invariants
//! - `rebuild()` always starts from an empty store; there are no incremental
//!   updates.
//! - `index` values are positions in an append-only list and stay stable
//!   until the next `rebuild()` or `clear()`.
//! - Provenance order is the order produced by the forward walk of each
//!   marker; entries are never sorted or deduplicated.

use crate::dom::{Document, NodeId};
use crate::marker::{parse_start, EndMatcher, MarkerScope, MarkerToken};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Tags never attributed even when they sit inside a marked region.
const SKIPPED_TAGS: &[&str] = &["SCRIPT", "STYLE"];

/// One template or block that rendered an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvenanceEntry {
    /// Display name: the marker name (block name or template identifier).
    pub template_name: String,
    pub link: String,
    /// Canonical template identifier decoded from `link`.
    pub template: String,
    pub scope: MarkerScope,
}

impl ProvenanceEntry {
    pub fn from_token(token: &MarkerToken) -> Self {
        Self {
            template_name: token.name.clone(),
            link: token.link.clone(),
            template: token.template.clone(),
            scope: token.scope(),
        }
    }
}

/// One attributed element and its provenance chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackedElement {
    pub element: NodeId,
    pub index: usize,
    pub provenance: Vec<ProvenanceEntry>,
}

impl TrackedElement {
    /// Display names in store order, one label line each.
    pub fn label_lines(&self) -> Vec<String> {
        self.provenance
            .iter()
            .map(|entry| entry.template_name.clone())
            .collect()
    }
}

impl Display for TrackedElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label_lines().join("\n"))
    }
}

/// Counters reported by one `rebuild()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub markers: usize,
    /// Start markers whose sibling walk ran out before an end marker.
    pub unterminated: usize,
    pub attributions: usize,
    pub tracked: usize,
}

/// Provenance index rebuilt from the current document on demand.
#[derive(Debug, Default)]
pub struct ProvenanceStore {
    elements: Vec<TrackedElement>,
    by_node: HashMap<NodeId, usize>,
}

impl ProvenanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.by_node.clear();
    }

    /// Re-scans every comment under the document body.
    ///
    /// `toolbar` is the developer toolbar region; nothing inside it is
    /// attributed.
    pub fn rebuild(&mut self, document: &Document, toolbar: Option<NodeId>) -> ScanSummary {
        self.clear();
        let mut summary = ScanSummary::default();

        for (comment, text) in document.comments(document.body()) {
            let Some(token) = parse_start(text) else {
                continue;
            };
            summary.markers += 1;

            let end = EndMatcher::for_token(&token);
            let entry = ProvenanceEntry::from_token(&token);
            let mut cursor = document.next_sibling(comment);
            let mut terminated = false;

            while let Some(node) = cursor {
                if document.comment_text(node).is_some_and(|text| end.matches(text)) {
                    terminated = true;
                    break;
                }
                if self.is_attributable(document, toolbar, node) {
                    let index = self.find_or_create(node).index;
                    self.add_entry(index, entry.clone());
                    summary.attributions += 1;
                }
                cursor = document.next_sibling(node);
            }

            if !terminated {
                summary.unterminated += 1;
                log::debug!(
                    "event=marker_unterminated module=store id={} name={}",
                    token.id,
                    token.name
                );
            }
        }

        summary.tracked = self.elements.len();
        log::info!(
            "event=store_rebuild module=store status=ok markers={} unterminated={} attributions={} tracked={}",
            summary.markers,
            summary.unterminated,
            summary.attributions,
            summary.tracked
        );
        summary
    }

    fn is_attributable(&self, document: &Document, toolbar: Option<NodeId>, node: NodeId) -> bool {
        let Some(tag) = document.tag_name(node) else {
            return false;
        };
        if SKIPPED_TAGS.contains(&tag) {
            return false;
        }
        if toolbar.is_some_and(|toolbar| document.contains(toolbar, node)) {
            return false;
        }
        !document.is_display_none(node)
    }

    /// Identity lookup.
    pub fn find(&self, element: NodeId) -> Option<&TrackedElement> {
        self.by_node
            .get(&element)
            .and_then(|index| self.elements.get(*index))
    }

    /// Returns the tracked record for `element`, appending an empty one first
    /// when the element is new.
    pub fn find_or_create(&mut self, element: NodeId) -> &TrackedElement {
        let index = match self.by_node.get(&element) {
            Some(index) => *index,
            None => {
                let index = self.elements.len();
                self.elements.push(TrackedElement {
                    element,
                    index,
                    provenance: Vec::new(),
                });
                self.by_node.insert(element, index);
                index
            }
        };
        &self.elements[index]
    }

    /// Appends one entry to the tracked element at `index`.
    ///
    /// Returns `false` for an unknown index.
    pub fn add_entry(&mut self, index: usize, entry: ProvenanceEntry) -> bool {
        match self.elements.get_mut(index) {
            Some(tracked) => {
                tracked.provenance.push(entry);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&TrackedElement> {
        self.elements.get(index)
    }

    pub fn provenance(&self, index: usize) -> Option<&[ProvenanceEntry]> {
        self.elements
            .get(index)
            .map(|tracked| tracked.provenance.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedElement> {
        self.elements.iter()
    }
}
