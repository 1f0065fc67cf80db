//! In-memory element tree standing in for the rendered feed page.
//!
//! The tree follows the same contract as the server-rendered markup: tag names, classes,
//! `data-*` attributes, text, input values, the disabled flag and inline style. Nodes live
//! in an arena and are never freed; detaching a node only unlinks it from its parent, so a
//! `NodeId` stays valid for the whole page lifetime.

mod query;
mod spec;

pub use query::{closest, find_all, find_within, matches, Role};
pub use spec::{ElementSpec, PageSpec};

use std::collections::BTreeMap;

/// Handle to an element of a [`Page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    style: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Own text and children of an element, kept aside while a placeholder stands in for them
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    text: String,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Page {
    nodes: Vec<Node>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Page {
    /// Create an empty page with `html`, `head` and `body`
    pub fn new() -> Self {
        let mut page = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
        };
        page.root = page.create("html");
        page.head = page.create("head");
        page.body = page.create("body");
        page.append(page.root, page.head);
        page.append(page.root, page.body);
        page
    }

    /// Build a page whose body holds the given elements
    pub fn with_body(children: impl IntoIterator<Item = ElementSpec>) -> Self {
        let mut page = Self::new();
        for child in children {
            page.insert(page.body, &child);
        }
        page
    }

    pub fn from_spec(spec: &PageSpec) -> Self {
        let mut page = Self::new();
        for child in &spec.head {
            page.insert(page.head, child);
        }
        for child in &spec.body {
            page.insert(page.body, child);
        }
        page
    }

    pub fn to_spec(&self) -> PageSpec {
        PageSpec {
            head: self.children(self.head).iter().map(|&c| self.render(c)).collect(),
            body: self.children(self.body).iter().map(|&c| self.render(c)).collect(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // Structure

    /// Create a detached element
    pub fn create(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_lowercase(),
            ..Default::default()
        });
        id
    }

    /// Build a subtree from `spec` and append it to `parent`
    pub fn insert(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let node = self.create(&spec.tag);
        {
            let n = &mut self.nodes[node.0];
            n.classes = spec.classes.clone();
            n.attrs = spec.attrs.clone();
            n.text = spec.text.clone();
            n.value = spec.value.clone();
            n.disabled = spec.disabled;
            n.style = spec.style.clone();
        }
        for child in &spec.children {
            self.insert(node, child);
        }
        self.append(parent, node);
        node
    }

    /// Append `child` as the last child of `parent`, detaching it from any previous parent
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Unlink `node` from its parent. The node and its subtree stay addressable.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Whether `node` is currently reachable from the document root
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == self.root)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// `node` followed by each of its ancestors up to the root
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |&n| self.nodes[n.0].parent)
    }

    /// `node` and its subtree in document order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.0].children.iter().rev().copied());
        }
        out
    }

    /// First attached element whose `id` attribute equals `id`
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    // Element properties

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.0].classes
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.nodes[node.0].classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.nodes[node.0].classes.retain(|c| c != class);
    }

    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        if self.has_class(node, class) {
            self.remove_class(node, class);
            false
        } else {
            self.add_class(node, class);
            true
        }
    }

    /// Replace `old` with `new` in place. Returns false (and changes nothing) if `old` is absent.
    pub fn replace_class(&mut self, node: NodeId, old: &str, new: &str) -> bool {
        let classes = &mut self.nodes[node.0].classes;
        match classes.iter().position(|c| c == old) {
            Some(i) => {
                if classes.iter().any(|c| c == new) {
                    classes.remove(i);
                } else {
                    classes[i] = new.to_string();
                }
                true
            }
            None => false,
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        self.nodes[node.0].attrs.insert(name.to_string(), value.into());
    }

    /// Concatenated text of `node` and its subtree
    pub fn text(&self, node: NodeId) -> String {
        let mut out = self.nodes[node.0].text.clone();
        for &child in &self.nodes[node.0].children {
            out.push_str(&self.text(child));
        }
        out
    }

    /// Replace the content of `node` with plain text
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.clear_children(node);
        self.nodes[node.0].text = text.into();
    }

    /// Replace the content of `node` with a single element
    pub fn replace_content(&mut self, node: NodeId, child: NodeId) {
        self.clear_children(node);
        self.nodes[node.0].text.clear();
        self.append(node, child);
    }

    fn clear_children(&mut self, node: NodeId) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    pub fn value(&self, node: NodeId) -> &str {
        &self.nodes[node.0].value
    }

    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        self.nodes[node.0].value = value.into();
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.nodes[node.0].disabled
    }

    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        self.nodes[node.0].disabled = disabled;
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0].style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: impl Into<String>) {
        self.nodes[node.0].style.insert(property.to_string(), value.into());
    }

    pub fn clear_style(&mut self, node: NodeId, property: &str) {
        self.nodes[node.0].style.remove(property);
    }

    // Placeholders

    /// Swap the content of `node` for `placeholder`, handing back what was there
    pub fn swap_content(&mut self, node: NodeId, placeholder: NodeId) -> Content {
        let n = &self.nodes[node.0];
        let saved = Content {
            text: n.text.clone(),
            children: n.children.clone(),
        };
        self.replace_content(node, placeholder);
        saved
    }

    /// Put content taken by [`Page::swap_content`] back, dropping whatever replaced it
    pub fn put_content(&mut self, node: NodeId, content: &Content) {
        self.clear_children(node);
        for &child in &content.children {
            self.append(node, child);
        }
        self.nodes[node.0].text = content.text.clone();
    }

    /// Serialize the subtree rooted at `node`
    pub fn render(&self, node: NodeId) -> ElementSpec {
        let n = &self.nodes[node.0];
        ElementSpec {
            tag: n.tag.clone(),
            classes: n.classes.clone(),
            attrs: n.attrs.clone(),
            text: n.text.clone(),
            value: n.value.clone(),
            disabled: n.disabled,
            style: n.style.clone(),
            children: n.children.iter().map(|&c| self.render(c)).collect(),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
