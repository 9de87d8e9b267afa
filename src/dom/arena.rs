//! Arena-based DOM for HTML fragments.
//!
//! Every node lives in one contiguous vector and is addressed by a stable
//! [`NodeId`]. Each node owns an ordered list of child ids, so the engine can
//! splice sibling lists by index without aliasing live references.

use std::ops::Range;

use html5ever::{LocalName, QualName, ns};

/// Unique identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document root is always the first allocation.
    pub const ROOT: NodeId = NodeId(0);
}

/// Node type in the arena DOM.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    /// Element with name and attributes (in source order).
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
    },
    /// Text content.
    Text(String),
    /// Comment, kept so serialization is lossless.
    Comment(String),
    /// Document type declaration.
    Doctype { name: String },
}

/// HTML attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

impl Attribute {
    /// Create an attribute in the null namespace, the way the HTML parser does.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.into(),
        }
    }
}

/// A node in the arena DOM.
#[derive(Debug, Clone)]
pub struct Node {
    pub data: NodeData,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena-based DOM tree.
///
/// Detached nodes stay allocated, so ids handed out earlier never dangle.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    /// Create a new empty DOM with a document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Document)],
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the document root ID.
    pub fn document(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Create a new element node in the HTML namespace.
    pub fn create_html_element(&mut self, tag: &str, attrs: Vec<Attribute>) -> NodeId {
        self.create_element(QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
    }

    /// Create a new element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    /// Create a new text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text.into())))
    }

    /// Create a new comment node.
    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    /// Create a doctype node.
    pub fn create_doctype(&mut self, name: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype { name }))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_child(parent, len, child);
    }

    /// Insert a child at `index` in the parent's child list.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = Some(parent);
        }
        if let Some(parent_node) = self.get_mut(parent) {
            let index = index.min(parent_node.children.len());
            parent_node.children.insert(index, child);
        }
    }

    /// Insert a node before a sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let Some(parent) = self.get(sibling).and_then(|n| n.parent) else {
            return;
        };
        if let Some(index) = self.index_of(parent, sibling) {
            self.insert_child(parent, index, new_node);
        }
    }

    /// Replace the child at `index` with `new_node`, detaching the old one.
    pub fn replace_child(&mut self, parent: NodeId, index: usize, new_node: NodeId) {
        let old = match self.get_mut(parent) {
            Some(p) if index < p.children.len() => std::mem::replace(&mut p.children[index], new_node),
            _ => return,
        };
        if let Some(old_node) = self.get_mut(old) {
            old_node.parent = None;
        }
        if let Some(new) = self.get_mut(new_node) {
            new.parent = Some(parent);
        }
    }

    /// Detach the children in `range` from `parent`. Out-of-bounds ranges are clamped.
    pub fn remove_children(&mut self, parent: NodeId, range: Range<usize>) {
        let removed: Vec<NodeId> = match self.get_mut(parent) {
            Some(p) => {
                let end = range.end.min(p.children.len());
                let start = range.start.min(end);
                p.children.drain(start..end).collect()
            }
            None => return,
        };
        for id in removed {
            if let Some(node) = self.get_mut(id) {
                node.parent = None;
            }
        }
    }

    /// Detach a node from its parent.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(index) = self.index_of(parent, id) {
            self.remove_children(parent, index..index + 1);
        }
    }

    /// Append text to an existing trailing text node, or create a new one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        if let Some(&last) = self.children(parent).last()
            && let Some(NodeData::Text(existing)) = self.get_mut(last).map(|n| &mut n.data)
        {
            existing.push_str(text);
            return;
        }
        let text_node = self.create_text(text);
        self.append(parent, text_node);
    }

    /// Get the number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the DOM is empty (only has document root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Ordered children of a node.
    pub fn children(&self, parent: NodeId) -> &[NodeId] {
        self.get(parent).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of `child` in the child list of `parent`.
    pub fn index_of(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children(parent).iter().position(|&c| c == child)
    }

    /// Find the first element with the given tag name (pre-order).
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        let mut stack = vec![self.document()];
        while let Some(id) = stack.pop() {
            if self.is_element_named(id, tag) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        None
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience methods for element and text nodes.
impl Dom {
    /// Get element's local name (tag).
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Check if node is an element with the given local name.
    pub fn is_element_named(&self, id: NodeId, tag: &str) -> bool {
        self.element_name(id).is_some_and(|n| n.as_ref() == tag)
    }

    /// Get all attributes of an element.
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Replace all attributes of an element.
    pub fn set_attrs(&mut self, id: NodeId, new_attrs: Vec<Attribute>) {
        if let Some(NodeData::Element { attrs, .. }) = self.get_mut(id).map(|n| &mut n.data) {
            *attrs = new_attrs;
        }
    }

    /// Get an attribute value.
    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(NodeData::Element { attrs, .. }) = self.get_mut(id).map(|n| &mut n.data) {
            match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
                Some(existing) => existing.value = value,
                None => attrs.push(Attribute::new(attr_name, value)),
            }
        }
    }

    /// Check if node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    /// Check if node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// Get text content of a text node.
    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Overwrite the value of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(NodeData::Text(existing)) = self.get_mut(id).map(|n| &mut n.data) {
            *existing = text.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_elements() {
        let mut dom = Dom::new();

        let div = dom.create_html_element("div", vec![Attribute::new("id", "main")]);
        dom.append(dom.document(), div);

        assert_eq!(dom.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(dom.get_attr(div, "id"), Some("main"));
        assert_eq!(dom.find_by_tag("div"), Some(div));
    }

    #[test]
    fn test_append_children() {
        let mut dom = Dom::new();

        let parent = dom.create_html_element("div", vec![]);
        let child1 = dom.create_html_element("p", vec![]);
        let child2 = dom.create_html_element("p", vec![]);

        dom.append(dom.document(), parent);
        dom.append(parent, child1);
        dom.append(parent, child2);

        assert_eq!(dom.children(parent), &[child1, child2]);
        assert_eq!(dom.get(child2).unwrap().parent, Some(parent));
    }

    #[test]
    fn test_text_merging() {
        let mut dom = Dom::new();

        let p = dom.create_html_element("p", vec![]);
        dom.append(dom.document(), p);

        dom.append_text(p, "Hello, ");
        dom.append_text(p, "World!");

        let children = dom.children(p);
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text_content(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_splice_children() {
        let mut dom = Dom::new();
        let p = dom.create_html_element("p", vec![]);
        dom.append(dom.document(), p);
        let ids: Vec<_> = (0..4).map(|i| dom.create_text(i.to_string())).collect();
        for &id in &ids {
            dom.append(p, id);
        }

        dom.remove_children(p, 1..3);
        assert_eq!(dom.children(p), &[ids[0], ids[3]]);
        assert_eq!(dom.get(ids[1]).unwrap().parent, None);

        let img = dom.create_html_element("img", vec![]);
        dom.replace_child(p, 0, img);
        assert_eq!(dom.children(p), &[img, ids[3]]);

        dom.insert_child(p, 1, ids[1]);
        assert_eq!(dom.children(p), &[img, ids[1], ids[3]]);
    }

    #[test]
    fn test_remove_children_clamps_range() {
        let mut dom = Dom::new();
        let p = dom.create_html_element("p", vec![]);
        let t = dom.create_text("x");
        dom.append(p, t);

        dom.remove_children(p, 0..10);
        assert!(dom.children(p).is_empty());
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut dom = Dom::new();
        let img = dom.create_html_element(
            "img",
            vec![Attribute::new("src", "a.jpg"), Attribute::new("alt", "")],
        );
        dom.set_attr(img, "src", "b.jpg");
        dom.set_attr(img, "width", "300");

        let names: Vec<_> = dom.attrs(img).iter().map(|a| a.name.local.to_string()).collect();
        assert_eq!(names, ["src", "alt", "width"]);
        assert_eq!(dom.get_attr(img, "src"), Some("b.jpg"));
    }
}
