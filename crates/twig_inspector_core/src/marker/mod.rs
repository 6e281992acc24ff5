//! Sentinel marker grammar.
//!
//! # Responsibility
//! - Own the comment wire format shared by the renderer and the overlay client.
//! - Keep parsing stateless so any comment source can be scanned.
//!
//! # Invariants
//! - Wire form: `<!-- {glyphs} {name} [{link}] #{id}-->`.
//! - Ids contain word characters only and are unique per pair on a page.

pub mod glyphs;
pub mod grammar;

pub use glyphs::GlyphPalette;
pub use grammar::{
    format_marker, parse_end_id, parse_link, parse_start, template_link, wrap_region, EndMatcher,
    LinkTarget, MarkerId, MarkerKind, MarkerScope, MarkerToken,
};
