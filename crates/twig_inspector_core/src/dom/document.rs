//! Arena-backed document tree.
//!
//! # Responsibility
//! - Own every node of one page and expose DOM-like navigation by `NodeId`.
//! - Answer the layout questions the overlay needs: computed `display`,
//!   element boxes and the paint-ordered element stack under a point.
//!
//! # Invariants
//! - `NodeId`s are never reused within one `Document`.
//! - Sibling links are kept consistent by `append_child` only.

use crate::dom::style::{declared_value, layout_from_style, parse_declarations, LayoutBox, Rect};
use serde::{Deserialize, Serialize};

/// Non-owning handle to one node of a `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Browser window state relevant to hit-testing and overlay placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Uppercase tag name, matching `Element.tagName` for HTML documents.
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    layout: Option<LayoutBox>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            layout: None,
        }
    }
}

/// Tags whose user-agent default display is `none`.
const HIDDEN_BY_DEFAULT: &[&str] = &[
    "HEAD", "SCRIPT", "STYLE", "TEMPLATE", "TITLE", "META", "LINK", "BASE", "NOSCRIPT",
];

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    viewport: Viewport,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
            viewport: Viewport::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn scroll_to(&mut self, scroll_x: f64, scroll_y: f64) {
        self.viewport.scroll_x = scroll_x;
        self.viewport.scroll_y = scroll_y;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(Node::new(data));
        NodeId(self.nodes.len() - 1)
    }

    /// Creates a detached element; the tag is normalized to uppercase.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_uppercase(),
            attributes: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Comment(text.into()))
    }

    /// Appends a detached node as the last child of `parent`.
    ///
    /// Attached nodes and self-appends are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.nodes[child.0].parent.is_some() || child == self.root() {
            return;
        }
        let previous_last = self.nodes[parent.0].last_child;
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = previous_last;
            node.next_sibling = None;
        }
        match previous_last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Sets an attribute; `style` also refreshes the element's layout box.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let name = name.to_ascii_lowercase();
        if name == "style" {
            if let Some(layout) = layout_from_style(&value) {
                self.nodes[element.0].layout = Some(layout);
            }
        }
        if let NodeData::Element(data) = &mut self.nodes[element.0].data {
            match data.attributes.iter_mut().find(|(key, _)| *key == name) {
                Some((_, existing)) => *existing = value,
                None => data.attributes.push((name, value)),
            }
        }
    }

    pub fn set_layout(&mut self, element: NodeId, rect: Rect, z_index: i32) {
        self.nodes[element.0].layout = Some(LayoutBox { rect, z_index });
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0].data
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].first_child
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].next_sibling
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.first_child(node), move |child| self.next_sibling(*child))
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Element(_))
    }

    /// Uppercase tag name for elements.
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element(data) => Some(data.tag.as_str()),
            _ => None,
        }
    }

    /// Comment text without the `<!--`/`-->` delimiters.
    pub fn comment_text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Comment(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Element(data) => data
                .attributes
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Pre-order walk of `root` and everything below it.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            root,
            next: Some(root),
        }
    }

    /// Comment nodes under `root` in document order.
    pub fn comments(&self, root: NodeId) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.descendants(root)
            .filter_map(move |id| self.comment_text(id).map(|text| (id, text)))
    }

    /// Inclusive containment, like `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// First element carrying `class`, like `getElementsByClassName(..)[0]`.
    pub fn first_element_by_class(&self, class: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|node| self.has_class(*node, class))
    }

    /// The `BODY` element, or the root when the markup had none.
    pub fn body(&self) -> NodeId {
        self.descendants(self.root())
            .find(|node| self.tag_name(*node) == Some("BODY"))
            .unwrap_or_else(|| self.root())
    }

    /// Whether the element's own computed `display` is `none`.
    ///
    /// Inline `display`, the `hidden` attribute and user-agent defaults are
    /// considered; ancestors are not, matching `getComputedStyle`.
    pub fn is_display_none(&self, element: NodeId) -> bool {
        let Some(tag) = self.tag_name(element) else {
            return false;
        };
        if let Some(style) = self.attribute(element, "style") {
            let declarations = parse_declarations(style);
            if let Some(display) = declared_value(&declarations, "display") {
                return display.eq_ignore_ascii_case("none");
            }
        }
        self.attribute(element, "hidden").is_some() || HIDDEN_BY_DEFAULT.contains(&tag)
    }

    /// Whether the element generates a box: itself and every ancestor displayed.
    pub fn is_rendered(&self, element: NodeId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            if self.is_display_none(id) {
                return false;
            }
            current = self.parent(id);
        }
        true
    }

    pub fn layout(&self, element: NodeId) -> Option<LayoutBox> {
        self.nodes[element.0].layout
    }

    /// Viewport-relative box, like `getBoundingClientRect()`.
    pub fn bounding_client_rect(&self, element: NodeId) -> Option<Rect> {
        self.layout(element).map(|layout| {
            Rect::new(
                layout.rect.x - self.viewport.scroll_x,
                layout.rect.y - self.viewport.scroll_y,
                layout.rect.width,
                layout.rect.height,
            )
        })
    }

    /// Elements under a client point, topmost first in paint order.
    ///
    /// Paint order is `z-index`, then document order; later elements and
    /// descendants paint over earlier ones and their ancestors.
    pub fn elements_from_point(&self, client_x: f64, client_y: f64) -> Vec<NodeId> {
        let page_x = client_x + self.viewport.scroll_x;
        let page_y = client_y + self.viewport.scroll_y;

        let mut hits: Vec<(i32, usize, NodeId)> = self
            .descendants(self.root())
            .enumerate()
            .filter_map(|(order, node)| {
                let layout = self.layout(node)?;
                if !layout.rect.contains(page_x, page_y) || !self.is_rendered(node) {
                    return None;
                }
                Some((layout.z_index, order, node))
            })
            .collect();
        hits.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        hits.into_iter().map(|(_, _, node)| node).collect()
    }
}

/// Pre-order iterator returned by `Document::descendants`.
pub struct Descendants<'a> {
    document: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = match self.document.first_child(current) {
            Some(child) => Some(child),
            None => {
                let mut cursor = Some(current);
                let mut following = None;
                while let Some(id) = cursor {
                    if id == self.root {
                        break;
                    }
                    if let Some(sibling) = self.document.next_sibling(id) {
                        following = Some(sibling);
                        break;
                    }
                    cursor = self.document.parent(id);
                }
                following
            }
        };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, Rect, Viewport};

    fn sample() -> (Document, [super::NodeId; 4]) {
        let mut doc = Document::new();
        let body = doc.create_element("body");
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        let comment = doc.create_comment(" note ");
        let root = doc.root();
        doc.append_child(root, body);
        doc.append_child(body, outer);
        doc.append_child(outer, inner);
        doc.append_child(body, comment);
        (doc, [body, outer, inner, comment])
    }

    #[test]
    fn descendants_are_pre_order_and_scoped() {
        let (doc, [body, outer, inner, comment]) = sample();
        let all: Vec<_> = doc.descendants(doc.root()).collect();
        assert_eq!(all, vec![doc.root(), body, outer, inner, comment]);

        let scoped: Vec<_> = doc.descendants(outer).collect();
        assert_eq!(scoped, vec![outer, inner]);
    }

    #[test]
    fn contains_is_inclusive() {
        let (doc, [body, outer, inner, comment]) = sample();
        assert!(doc.contains(outer, outer));
        assert!(doc.contains(body, inner));
        assert!(!doc.contains(outer, comment));
    }

    #[test]
    fn display_none_reads_inline_style_then_defaults() {
        let mut doc = Document::new();
        let shown = doc.create_element("div");
        let hidden = doc.create_element("div");
        let forced = doc.create_element("script");
        doc.set_attribute(hidden, "style", "display: none");
        doc.set_attribute(forced, "style", "display:block");
        let script = doc.create_element("script");

        assert!(!doc.is_display_none(shown));
        assert!(doc.is_display_none(hidden));
        assert!(!doc.is_display_none(forced));
        assert!(doc.is_display_none(script));
    }

    #[test]
    fn hit_test_orders_topmost_first() {
        let (mut doc, [body, outer, inner, _]) = sample();
        doc.set_layout(body, Rect::new(0.0, 0.0, 500.0, 500.0), 0);
        doc.set_layout(outer, Rect::new(10.0, 10.0, 100.0, 100.0), 0);
        doc.set_layout(inner, Rect::new(20.0, 20.0, 10.0, 10.0), 0);

        assert_eq!(doc.elements_from_point(25.0, 25.0), vec![inner, outer, body]);
        assert_eq!(doc.elements_from_point(300.0, 300.0), vec![body]);
    }

    #[test]
    fn hit_test_honors_z_index_and_scroll() {
        let (mut doc, [body, outer, inner, _]) = sample();
        doc.set_layout(body, Rect::new(0.0, 0.0, 500.0, 2000.0), 0);
        doc.set_layout(outer, Rect::new(0.0, 1000.0, 100.0, 100.0), 10);
        doc.set_layout(inner, Rect::new(0.0, 1000.0, 100.0, 100.0), 0);
        doc.set_viewport(Viewport {
            scroll_y: 950.0,
            ..Viewport::default()
        });

        assert_eq!(doc.elements_from_point(50.0, 100.0), vec![outer, inner, body]);
        let client = doc.bounding_client_rect(outer).expect("outer has a box");
        assert_eq!(client.y, 50.0);
    }
}
