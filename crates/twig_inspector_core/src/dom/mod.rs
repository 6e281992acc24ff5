//! Page model scanned and hit-tested by the inspector.
//!
//! # Responsibility
//! - Stand in for the live browser DOM: tree, comments, computed display,
//!   element boxes, viewport and scroll.
//! - Build that model from rendered HTML.
//!
//! # Invariants
//! - The document owns every node; other components hold `NodeId` handles
//!   and compare them by identity only.

mod document;
pub mod parser;
pub mod style;

pub use document::{Descendants, Document, ElementData, NodeData, NodeId, Viewport};
pub use parser::parse_html;
pub use style::{LayoutBox, Rect};
