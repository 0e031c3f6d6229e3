//! DOM tree operations.
//!
//! The [`Dom`] struct owns an `Arena<Node>` and provides safe tree-manipulation
//! methods that keep the intrusive parent/child/sibling links consistent.

use arena::Arena;

use crate::node::{Attr, ElementData, Node, NodeData, NodeId, StableId};

// ---------------------------------------------------------------------------
// Dom
// ---------------------------------------------------------------------------

/// The live page tree.
pub struct Dom {
    pub nodes: Arena<Node>,
    document: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create a tree holding only the document node.
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let document = nodes.allocate(Node::new(NodeData::Document));
        Self { nodes, document }
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    // =======================================================================
    // Node creation
    // =======================================================================

    /// Create a detached element. The `id`/`classes` caches are derived from
    /// `attrs`.
    pub fn create_element(&mut self, tag_name: &str, attrs: Vec<Attr>) -> NodeId {
        self.nodes
            .allocate(Node::new(NodeData::Element(ElementData::new(tag_name, attrs))))
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.nodes.allocate(Node::new(NodeData::Text {
            data: data.to_string(),
        }))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.nodes.allocate(Node::new(NodeData::Comment {
            data: data.to_string(),
        }))
    }

    // =======================================================================
    // Tree mutation
    // =======================================================================

    /// Append `child` as the last child of `parent`, moving it if it is
    /// already attached somewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        self.detach(child);

        let old_last = self.nodes.get(parent).and_then(|n| n.last_child);
        if let Some(old_last_node) = old_last.and_then(|id| self.nodes.get_mut(id)) {
            old_last_node.next_sibling = Some(child);
        }

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
            child_node.prev_sibling = old_last;
            child_node.next_sibling = None;
        }

        if let Some(parent_node) = self.nodes.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = Some(child);
            }
            parent_node.last_child = Some(child);
        }
    }

    /// Insert `child` into `parent`'s child list immediately before `reference`.
    ///
    /// A `None` reference appends. A reference that is not a child of
    /// `parent` (or is `child` itself) also falls back to appending.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        let reference = match reference {
            Some(r) if r != child && self.parent(r) == Some(parent) => r,
            _ => {
                self.append_child(parent, child);
                return;
            }
        };

        self.detach(child);

        let prev_of_ref = self.nodes.get(reference).and_then(|n| n.prev_sibling);

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
            child_node.prev_sibling = prev_of_ref;
            child_node.next_sibling = Some(reference);
        }

        if let Some(ref_node) = self.nodes.get_mut(reference) {
            ref_node.prev_sibling = Some(child);
        }

        match prev_of_ref.and_then(|id| self.nodes.get_mut(id)) {
            Some(prev_node) => prev_node.next_sibling = Some(child),
            None => {
                if let Some(parent_node) = self.nodes.get_mut(parent) {
                    parent_node.first_child = Some(child);
                }
            }
        }
    }

    /// Unlink `node` from its parent without releasing it. No-op for a
    /// detached node.
    pub fn detach(&mut self, node_id: NodeId) {
        let (parent_id, prev, next) = match self.nodes.get(node_id) {
            Some(n) if n.parent.is_some() => (n.parent, n.prev_sibling, n.next_sibling),
            _ => return,
        };

        if let Some(prev_node) = prev.and_then(|id| self.nodes.get_mut(id)) {
            prev_node.next_sibling = next;
        }
        if let Some(next_node) = next.and_then(|id| self.nodes.get_mut(id)) {
            next_node.prev_sibling = prev;
        }

        if let Some(parent_node) = parent_id.and_then(|id| self.nodes.get_mut(id)) {
            if parent_node.first_child == Some(node_id) {
                parent_node.first_child = next;
            }
            if parent_node.last_child == Some(node_id) {
                parent_node.last_child = prev;
            }
        }

        if let Some(node) = self.nodes.get_mut(node_id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Detach `node` and release it together with its whole subtree.
    pub fn release_subtree(&mut self, node: NodeId) {
        if node == self.document {
            return;
        }
        self.detach(node);
        let mut doomed = self.descendants(node);
        doomed.push(node);
        for id in doomed {
            self.nodes.deallocate(id);
        }
    }

    /// Release every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        for child in self.children(node) {
            self.release_subtree(child);
        }
    }

    /// Deep-copy `node` into a new detached subtree.
    pub fn clone_subtree(&mut self, node: NodeId) -> Option<NodeId> {
        let data = self.nodes.get(node)?.data.clone();
        let copy = self.nodes.allocate(Node::new(data));
        for child in self.children(node) {
            if let Some(child_copy) = self.clone_subtree(child) {
                self.append_child(copy, child_copy);
            }
        }
        Some(copy)
    }

    // =======================================================================
    // Attributes
    // =======================================================================

    /// Set an attribute on an element. Returns `false` for non-elements.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        match self.nodes.get_mut(node).and_then(Node::as_element_mut) {
            Some(elem) => {
                elem.set_attr(name, value);
                true
            }
            None => false,
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        self.nodes
            .get_mut(node)
            .and_then(Node::as_element_mut)
            .is_some_and(|elem| elem.remove_attr(name))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attr(name)
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.nodes.get(node).and_then(Node::as_element)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag_name.as_str())
    }

    pub fn stable_id(&self, node: NodeId) -> Option<StableId> {
        self.nodes.get(node).and_then(Node::stable_id)
    }

    pub fn is_overlay(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(Node::is_overlay)
    }

    // =======================================================================
    // Traversal
    // =======================================================================

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.first_child)
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.last_child)
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.next_sibling)
    }

    pub fn prev_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.prev_sibling)
    }

    /// Return the immediate children of `parent` in document order.
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.first_child(parent);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.next_sibling(id);
        }
        out
    }

    /// Return the chain of ancestors from `node` up to (and including) the root.
    /// The first element is the direct parent, the last is the root.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent(node);
        while let Some(id) = cursor {
            out.push(id);
            cursor = self.parent(id);
        }
        out
    }

    /// Return all descendants of `node` in pre-order DFS (not including `node` itself).
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        self.collect_preorder(node, false)
    }

    /// Like [`descendants`](Self::descendants) but never enters overlay subtrees.
    pub fn semantic_descendants(&self, node: NodeId) -> Vec<NodeId> {
        self.collect_preorder(node, true)
    }

    fn collect_preorder(&self, node: NodeId, skip_overlays: bool) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if skip_overlays && self.is_overlay(id) {
                continue;
            }
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// Whether `node` is attached (transitively) to the document.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.document || self.ancestors(node).last() == Some(&self.document)
    }

    // =======================================================================
    // Queries
    // =======================================================================

    /// The connected, non-overlay element carrying `id`.
    pub fn find_by_stable_id(&self, id: StableId) -> Option<NodeId> {
        self.semantic_descendants(self.document)
            .into_iter()
            .find(|&n| self.stable_id(n) == Some(id))
    }

    /// The `<html>` element, i.e. the document's first element child.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.document)
            .into_iter()
            .find(|&n| self.element(n).is_some())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.root_child_with_tag("head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.root_child_with_tag("body")
    }

    fn root_child_with_tag(&self, tag: &str) -> Option<NodeId> {
        let root = self.document_element()?;
        self.children(root)
            .into_iter()
            .find(|&n| self.tag_name(n) == Some(tag))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in std::iter::once(node).chain(self.descendants(node)) {
            if let Some(NodeData::Text { data }) = self.nodes.get(id).map(|n| &n.data) {
                out.push_str(data);
            }
        }
        out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
