//! Sentinel comment parsing and formatting.
//!
//! # Responsibility
//! - Recognize start markers and decompose them into `MarkerToken`s.
//! - Provide the end-of-region test for one marker id.
//! - Render markers in the exact wire form the renderer emits.
//!
//! # Invariants
//! - Parsing is pure; unknown comment text yields `None`, never an error.
//! - Start/end pairing is by id only, never by name or link.

use crate::config::DEFAULT_ROUTE_PREFIX;
use crate::marker::glyphs::{end_glyphs, start_glyphs, GlyphPalette};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static START_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^\s+[{}]\S*\s(\S+)\s\[([^\]]+)\]\s#(\w+)$",
        start_glyphs()
    ))
    .expect("start marker pattern is valid")
});

static END_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^\s+[{}][^#]+#(\w+)$", end_glyphs()))
        .expect("end marker pattern is valid")
});

/// Marker direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Start,
    End,
}

/// Whether a marker wraps a whole template or one named block in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerScope {
    Template,
    Block,
}

/// One parsed sentinel comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerToken {
    pub kind: MarkerKind,
    /// Block name, or the template identifier for template-level markers.
    pub name: String,
    /// Navigation URL, opaque to the client.
    pub link: String,
    /// Correlation token shared by the start/end pair.
    pub id: String,
    /// Canonical template identifier decoded from `link`.
    pub template: String,
    /// Source line carried by `link`, when present.
    pub line: Option<u32>,
}

impl MarkerToken {
    pub fn scope(&self) -> MarkerScope {
        if self.name == self.template {
            MarkerScope::Template
        } else {
            MarkerScope::Block
        }
    }
}

/// Parses start-marker comment text (the part between `<!--` and `-->`).
pub fn parse_start(text: &str) -> Option<MarkerToken> {
    let captures = START_MARKER.captures(text)?;
    let name = captures.get(1)?.as_str();
    let link = captures.get(2)?.as_str();
    let id = captures.get(3)?.as_str();

    let target = parse_link(link);
    Some(MarkerToken {
        kind: MarkerKind::Start,
        name: name.to_string(),
        link: link.to_string(),
        id: id.to_string(),
        template: target.template.unwrap_or_else(|| name.to_string()),
        line: target.line,
    })
}

/// Returns the id carried by end-marker comment text.
pub fn parse_end_id(text: &str) -> Option<&str> {
    END_MARKER
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

/// Terminator test for the region opened by one start marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndMatcher {
    id: String,
}

impl EndMatcher {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn for_token(token: &MarkerToken) -> Self {
        Self::new(token.id.clone())
    }

    /// Returns whether `text` is the end marker carrying this id.
    pub fn matches(&self, text: &str) -> bool {
        parse_end_id(text) == Some(self.id.as_str())
    }
}

/// Template identifier and line decoded from a navigation link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTarget {
    pub template: Option<String>,
    pub line: Option<u32>,
}

/// Decodes the template identifier and line from a navigation link.
///
/// A `template` query parameter wins; otherwise the identifier is the path
/// remainder after the route prefix.
pub fn parse_link(link: &str) -> LinkTarget {
    let (path, query) = match link.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (link, None),
    };

    let mut target = LinkTarget::default();
    for pair in query.into_iter().flat_map(|query| query.split('&')) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        match key {
            "template" => target.template = decode_component(value),
            "line" => target.line = value.parse().ok(),
            _ => {}
        }
    }

    if target.template.is_none() {
        let remainder = match path.find(DEFAULT_ROUTE_PREFIX) {
            Some(at) => &path[at + DEFAULT_ROUTE_PREFIX.len()..],
            None => path.rsplit('/').next().unwrap_or(path),
        };
        if !remainder.is_empty() {
            target.template = decode_component(remainder);
        }
    }
    target
}

/// Form-style decoding: `+` is a space, then percent escapes.
fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|value| value.into_owned())
}

/// Fallback navigation link used when no route generator is available.
pub fn template_link(template: &str, line: u32) -> String {
    format!(
        "{DEFAULT_ROUTE_PREFIX}{}?line={line}",
        urlencoding::encode(template)
    )
}

/// Opaque marker correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerId(String);

impl MarkerId {
    /// Generates a fresh id made of word characters only.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MarkerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders a full `<!-- ... -->` marker comment.
pub fn format_marker(prefix: &str, name: &str, link: &str, id: &str) -> String {
    format!("<!-- {prefix} {name} [{link}] #{id}-->")
}

/// Wraps `content` in a start/end pair using the palette's current prefixes.
pub fn wrap_region(
    palette: &GlyphPalette,
    name: &str,
    link: &str,
    id: &MarkerId,
    content: &str,
) -> String {
    format!(
        "{}{content}{}",
        format_marker(&palette.start_prefix(), name, link, id.as_str()),
        format_marker(&palette.end_prefix(), name, link, id.as_str())
    )
}
