//! In-memory document the widgets operate on.
//!
//! An arena of element nodes with classes, attributes, inline styles and a
//! minimal layout model (content height) that is enough to drive the
//! widgets' animation sequencing without a browser.

pub mod selector;

use std::cell::Cell;
use std::collections::BTreeMap;

pub use selector::{Selector, SelectorError};

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content_height: f64,
}

/// An element tree rooted at `<html>` with a `<body>` child.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    layout_reads: Cell<usize>,
}

impl Document {
    /// Create a document containing `<html>` and `<body>`.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            layout_reads: Cell::new(0),
        };
        let root = doc.create_element("html");
        let body = doc.create_element("body");
        doc.append_child(root, body);
        doc.root = root;
        doc.body = body;
        doc
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> NodeId {
        self.root
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        });
        id
    }

    /// Create an element with the given whitespace-separated classes and
    /// append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, classes: &str) -> NodeId {
        let id = self.create_element(tag);
        for class in classes.split_whitespace() {
            self.add_class(id, class);
        }
        self.append_child(parent, id);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Lowercase tag name.
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    /// Parent element, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Child elements in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// First child element.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).children.first().copied()
    }

    /// Element immediately before `id` under the same parent.
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|c| *c == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Element immediately after `id` under the same parent.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|c| *c == id)?;
        siblings.get(index + 1).copied()
    }

    /// Remove `id` from its parent, if any.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|c| *c != id);
        }
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Move `child` into `parent` before `reference` (or at the end).
    ///
    /// A reference that is not a child of `parent` appends.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        // An element cannot become its own descendant.
        if self.contains(child, parent) {
            return;
        }

        self.detach(child);
        self.node_mut(child).parent = Some(parent);

        let siblings = &mut self.node_mut(parent).children;
        let index = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
    }

    /// Copy an element (and its subtree when `deep`) into a detached node.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let mut copy = self.node(id).clone();
        copy.parent = None;
        copy.children = Vec::new();

        let clone = NodeId(self.nodes.len());
        self.nodes.push(copy);

        if deep {
            let children = self.node(id).children.clone();
            for child in children {
                let child_clone = self.clone_node(child, true);
                self.append_child(clone, child_clone);
            }
        }

        clone
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    // Classes

    /// Add a class; returns false if it was already present.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let classes = &mut self.node_mut(id).classes;
        if classes.iter().any(|c| c == class) {
            return false;
        }
        classes.push(class.to_string());
        true
    }

    /// Remove a class; returns false if it was absent.
    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let classes = &mut self.node_mut(id).classes;
        let before = classes.len();
        classes.retain(|c| c != class);
        classes.len() != before
    }

    /// Toggle a class; returns whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> bool {
        if self.remove_class(id, class) {
            false
        } else {
            self.add_class(id, class)
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id).classes.iter().any(|c| c == class)
    }

    // Attributes

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        self.node_mut(id)
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attributes.get(name).map(String::as_str)
    }

    // Inline styles

    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        let styles = &mut self.node_mut(id).styles;
        if value.is_empty() {
            styles.remove(property);
        } else {
            styles.insert(property.to_string(), value.to_string());
        }
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.node(id).styles.get(property).map(String::as_str)
    }

    // Layout

    /// Set the natural height of an element's content.
    pub fn set_content_height(&mut self, id: NodeId, height: f64) {
        self.node_mut(id).content_height = height;
    }

    /// Full content height regardless of the inline height.
    pub fn scroll_height(&self, id: NodeId) -> f64 {
        self.node(id).content_height
    }

    /// Rendered height. Counts as a forced layout read.
    pub fn bounding_height(&self, id: NodeId) -> f64 {
        self.layout_reads.set(self.layout_reads.get() + 1);

        if self.style(id, "display") == Some("none") {
            return 0.0;
        }

        match self.style(id, "height").and_then(parse_px) {
            Some(px) => px,
            None => self.scroll_height(id),
        }
    }

    /// Number of forced layout reads so far.
    pub fn layout_reads(&self) -> usize {
        self.layout_reads.get()
    }

    // Queries

    /// First descendant of `scope` matching `selector`.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let selector = parse_lenient(selector)?;
        self.descendants(scope)
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    /// All descendants of `scope` matching `selector`, in document order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = parse_lenient(selector) else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    /// Nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &str) -> Option<NodeId> {
        let selector = parse_lenient(selector)?;
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if selector.matches(self, current) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Whether `id` matches `selector`; a malformed selector never matches.
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        parse_lenient(selector).is_some_and(|s| s.matches(self, id))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a selector, treating a malformed one as matching nothing.
fn parse_lenient(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!("Ignoring invalid selector {:?}: {}", selector, e);
            None
        }
    }
}

/// Parse a `"<n>px"` length.
pub fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

/// Format a pixel length the way inline styles store it.
pub fn px(value: f64) -> String {
    format!("{}px", value)
}
