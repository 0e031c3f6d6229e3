//! Inline text editing of a page element.

use dom::{Dom, NodeId};
use tracing::debug;

/// `1` while editing, `0` briefly after the edit is committed.
pub const EDIT_MARKER: &str = "data-live-edit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    Escape,
    Other,
}

#[derive(Debug)]
pub struct InlineEditor {
    element: NodeId,
    /// Detached copies of the original children.
    revert: Vec<NodeId>,
}

impl InlineEditor {
    pub fn begin(dom: &mut Dom, element: NodeId) -> Self {
        dom.set_attribute(element, "contenteditable", "true");
        let revert = dom
            .children(element)
            .into_iter()
            .filter_map(|child| dom.clone_subtree(child))
            .collect();
        dom.set_attribute(element, EDIT_MARKER, "1");
        debug!(?element, "inline edit started");
        Self { element, revert }
    }

    pub fn element(&self) -> NodeId {
        self.element
    }

    /// Handle a key press. Returns `true` when the editor should blur.
    /// Escape restores the original content first.
    pub fn key(&mut self, dom: &mut Dom, key: EditKey) -> bool {
        match key {
            EditKey::Enter => true,
            EditKey::Escape => {
                dom.clear_children(self.element);
                for copy in self.revert.drain(..) {
                    dom.append_child(self.element, copy);
                }
                true
            }
            EditKey::Other => false,
        }
    }

    /// Commit: the element stops being editable and is marked as edited.
    pub fn blur(self, dom: &mut Dom) -> NodeId {
        for copy in self.revert {
            dom.release_subtree(copy);
        }
        dom.remove_attribute(self.element, "contenteditable");
        dom.set_attribute(self.element, EDIT_MARKER, "0");
        debug!(element = ?self.element, "inline edit committed");
        self.element
    }
}
