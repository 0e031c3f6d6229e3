//! Batch application.
//!
//! Edits run strictly in order. A target is looked up in the batch's
//! remembered-node cache first, then among the connected, non-overlay nodes of
//! the live tree. An edit whose target cannot be found is skipped and reported;
//! the rest of the batch still runs.

use dom::{Dom, ElementData, Node, NodeId, STABLE_ID_ATTR, StableId, decode_entities};
use tracing::{debug, warn};

use crate::cache::RememberedNodeCache;
use crate::edit::{EditOp, PositionHint};
use crate::error::PatchError;

/// An edit that did not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEdit {
    /// Position of the edit in its batch.
    pub index: usize,
    pub kind: &'static str,
    pub error: PatchError,
}

/// Outcome of one [`PatchEngine::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub applied: usize,
    pub skipped: Vec<SkippedEdit>,
    /// Remembered nodes released because no edit re-attached them.
    pub released: usize,
}

impl PatchReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct PatchEngine {
    remembered: RememberedNodeCache,
}

impl PatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one batch to `dom`.
    pub fn apply(&mut self, dom: &mut Dom, edits: &[EditOp]) -> PatchReport {
        self.remembered.clear(dom);
        let mut report = PatchReport::default();

        for (index, edit) in edits.iter().enumerate() {
            match self.apply_one(dom, edit) {
                Ok(()) => report.applied += 1,
                Err(error) => {
                    warn!(index, kind = edit.kind(), %error, "edit skipped");
                    report.skipped.push(SkippedEdit {
                        index,
                        kind: edit.kind(),
                        error,
                    });
                }
            }
        }

        report.released = self.remembered.clear(dom);
        debug!(
            applied = report.applied,
            skipped = report.skipped.len(),
            released = report.released,
            "batch applied"
        );
        report
    }

    fn apply_one(&mut self, dom: &mut Dom, edit: &EditOp) -> Result<(), PatchError> {
        match edit {
            EditOp::RememberNodes { tag_ids } => self.remember(dom, tag_ids),

            EditOp::AttrChange {
                tag_id,
                attribute,
                value,
            }
            | EditOp::AttrAdd {
                tag_id,
                attribute,
                value,
            } => {
                let target = self.lookup(dom, *tag_id)?;
                dom.set_attribute(target, attribute, &decode_entities(value));
                Ok(())
            }

            EditOp::AttrDelete { tag_id, attribute } => {
                let target = self.lookup(dom, *tag_id)?;
                dom.remove_attribute(target, attribute);
                Ok(())
            }

            EditOp::ElementDelete { tag_id } => {
                let target = self.lookup(dom, *tag_id)?;
                dom.release_subtree(target);
                Ok(())
            }

            EditOp::ElementInsert {
                tag_id,
                parent_id,
                tag,
                attributes,
                ..
            } => {
                let parent = parent_id.map(|id| self.lookup(dom, id)).transpose();

                let node = match singleton(dom, tag) {
                    Some(existing) => existing,
                    None => {
                        if is_singleton_tag(tag) {
                            debug!(%tag, "no existing singleton, inserting a new element");
                        }
                        let parent = parent?.ok_or(PatchError::MissingParent("elementInsert"))?;
                        let node = dom.create_element(tag, Vec::new());
                        self.place(dom, parent, node, edit.position());
                        node
                    }
                };

                for (name, value) in attributes {
                    dom.set_attribute(node, name, &decode_entities(value));
                }
                dom.set_attribute(node, STABLE_ID_ATTR, &tag_id.to_string());
                Ok(())
            }

            EditOp::ElementMove {
                tag_id, parent_id, ..
            } => {
                let parent = self.lookup(dom, *parent_id)?;
                let child = self.lookup(dom, *tag_id)?;
                if child == parent || dom.ancestors(parent).contains(&child) {
                    return Err(PatchError::Hierarchy(*tag_id));
                }
                self.place(dom, parent, child, edit.position());
                Ok(())
            }

            EditOp::TextInsert {
                parent_id, content, ..
            } => {
                let parent = self.lookup(dom, *parent_id)?;
                let text = dom.create_text(&text_for(dom, parent, content));
                self.place(dom, parent, text, edit.position());
                Ok(())
            }

            EditOp::TextReplace {
                parent_id,
                content,
                before_id,
                after_id,
            } => {
                let parent = self.lookup(dom, *parent_id)?;
                self.replace_text(dom, parent, *after_id, *before_id, Some(content));
                Ok(())
            }

            EditOp::TextDelete {
                parent_id,
                before_id,
                after_id,
            } => {
                let parent = self.lookup(dom, *parent_id)?;
                self.replace_text(dom, parent, *after_id, *before_id, None);
                Ok(())
            }
        }
    }

    fn resolve(&self, dom: &Dom, id: StableId) -> Option<NodeId> {
        self.remembered
            .get(dom, id)
            .or_else(|| dom.find_by_stable_id(id))
    }

    fn lookup(&self, dom: &Dom, id: StableId) -> Result<NodeId, PatchError> {
        self.resolve(dom, id).ok_or(PatchError::Lookup(id))
    }

    /// Detach every listed node, keeping it addressable. Ids that cannot be
    /// found are reported after the rest have been remembered.
    fn remember(&mut self, dom: &mut Dom, ids: &[StableId]) -> Result<(), PatchError> {
        let mut first_missing = None;
        for &id in ids {
            match self.resolve(dom, id) {
                Some(node) => {
                    dom.detach(node);
                    self.remembered.remember(id, node);
                }
                None => {
                    first_missing.get_or_insert(id);
                }
            }
        }
        match first_missing {
            Some(id) => Err(PatchError::Lookup(id)),
            None => Ok(()),
        }
    }

    /// Put `child` into `parent`.
    ///
    /// `firstChild`/`lastChild` override the id anchors. Otherwise the node
    /// goes before an existing `beforeID`, or after an existing `afterID` that
    /// is not the last child, or at the end. Anchors living under some other
    /// parent are ignored.
    fn place(&self, dom: &mut Dom, parent: NodeId, child: NodeId, hint: PositionHint) {
        match self.reference_for(dom, parent, child, hint) {
            Some(r) => dom.insert_before(parent, child, Some(r)),
            None => dom.append_child(parent, child),
        }
    }

    /// The sibling `child` should precede; `None` appends.
    fn reference_for(
        &self,
        dom: &Dom,
        parent: NodeId,
        child: NodeId,
        hint: PositionHint,
    ) -> Option<NodeId> {
        let mut before = hint.before.and_then(|id| self.resolve(dom, id));
        let mut after = hint.after.and_then(|id| self.resolve(dom, id));
        if hint.first_child {
            before = dom.first_child(parent);
        } else if hint.last_child {
            after = dom.last_child(parent);
        }

        let is_child = |n: NodeId| dom.parent(n) == Some(parent);
        let before = before.filter(|&n| is_child(n));
        let after = after.filter(|&n| is_child(n) && Some(n) != dom.last_child(parent));

        let reference = match (before, after) {
            (Some(b), _) => Some(b),
            (None, Some(a)) => dom.next_sibling(a),
            (None, None) => None,
        };
        // Inserting a node before itself leaves it where it is.
        if reference == Some(child) {
            dom.next_sibling(child)
        } else {
            reference
        }
    }

    /// Remove the run of text and comment nodes between two anchors, then
    /// optionally insert replacement text.
    ///
    /// The walk runs forward from the start anchor's next sibling, or backward
    /// from the end anchor's previous sibling, or (with no end anchor) backward
    /// from the parent's last child. Overlays are stepped over.
    fn replace_text(
        &self,
        dom: &mut Dom,
        parent: NodeId,
        after: Option<StableId>,
        before: Option<StableId>,
        content: Option<&str>,
    ) {
        let start = after.and_then(|id| self.resolve(dom, id));
        let end = before.and_then(|id| self.resolve(dom, id));
        let anchor_missing =
            (after.is_some() && start.is_none()) || (before.is_some() && end.is_none());

        let forward_from = start.and_then(|s| next_ignoring_overlays(dom, s));
        let forward = forward_from.is_some();
        let mut current = forward_from.or_else(|| match end {
            Some(e) => prev_ignoring_overlays(dom, e),
            None => last_child_ignoring_overlays(dom, parent),
        });

        let mut last_removed_was_text = false;
        while let Some(node) = current {
            if Some(node) == end {
                break;
            }
            let Some(record) = dom.nodes.get(node) else {
                break;
            };
            let is_text = record.is_text();
            // Element boundaries always stop the walk. With a lost anchor the
            // walk also stops between two adjacent text nodes.
            if record.is_element() || (anchor_missing && is_text && last_removed_was_text) {
                break;
            }
            let next = if forward {
                next_ignoring_overlays(dom, node)
            } else {
                prev_ignoring_overlays(dom, node)
            };
            last_removed_was_text = is_text;
            dom.release_subtree(node);
            current = next;
        }

        let Some(content) = content else {
            return;
        };
        let text = dom.create_text(&text_for(dom, parent, content));
        match (start.and_then(|s| dom.next_sibling(s)), end) {
            (Some(next), _) => dom.insert_before(parent, text, Some(next)),
            (None, Some(end)) => dom.insert_before(parent, text, Some(end)),
            (None, None) => dom.append_child(parent, text),
        }
    }
}

const SINGLETON_TAGS: &[&str] = &["html", "head", "body"];

fn is_singleton_tag(tag: &str) -> bool {
    SINGLETON_TAGS.contains(&tag)
}

/// The existing document-level element an insert of `tag` binds to.
fn singleton(dom: &Dom, tag: &str) -> Option<NodeId> {
    match tag {
        "html" => dom.document_element(),
        "head" => dom.head(),
        "body" => dom.body(),
        _ => None,
    }
}

/// Text content as it should be stored under `parent`.
fn text_for(dom: &Dom, parent: NodeId, content: &str) -> String {
    if dom.element(parent).is_some_and(ElementData::is_raw_text) {
        content.to_string()
    } else {
        decode_entities(content)
    }
}

fn next_ignoring_overlays(dom: &Dom, node: NodeId) -> Option<NodeId> {
    let mut cur = dom.next_sibling(node);
    while let Some(n) = cur.filter(|&n| dom.is_overlay(n)) {
        cur = dom.next_sibling(n);
    }
    cur
}

fn prev_ignoring_overlays(dom: &Dom, node: NodeId) -> Option<NodeId> {
    let mut cur = dom.prev_sibling(node);
    while let Some(n) = cur.filter(|&n| dom.is_overlay(n)) {
        cur = dom.prev_sibling(n);
    }
    cur
}

fn last_child_ignoring_overlays(dom: &Dom, parent: NodeId) -> Option<NodeId> {
    let last = dom.last_child(parent)?;
    if dom.nodes.get(last).is_some_and(Node::is_overlay) {
        prev_ignoring_overlays(dom, last)
    } else {
        Some(last)
    }
}
