use std::time::Instant;

use dom::{Dom, NodeId};
use overlay::{GotoMenu, HighlightSet, InspectPane};

use crate::config::Config;
use crate::editor::InlineEditor;
use crate::hover::{HoverSelect, Platform};
use crate::liveness::Liveness;

/// All interaction state of one agent, owned in one place.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub hover: HoverSelect,
    pub liveness: Liveness,
    /// Transient hover highlight; exists while hover-select is armed.
    pub local: Option<HighlightSet>,
    /// Highlight driven by the controller.
    pub remote: Option<HighlightSet>,
    pub menu: Option<GotoMenu>,
    pub editor: Option<InlineEditor>,
    pub pane: Option<InspectPane>,
    /// Element whose inspection data was sent last.
    pub last_inspected: Option<NodeId>,
    /// Element waiting for a delayed inspection send.
    pub pending_inspect: Option<NodeId>,
    pub transport_open: bool,
    /// Resize and scroll handling is on.
    pub listening: bool,
    /// Marker attributes to strip on the next turn.
    pub transient_markers: Vec<(NodeId, &'static str)>,
}

impl Session {
    pub fn new(config: Config, platform: Platform, now: Instant) -> Self {
        Self {
            config,
            hover: HoverSelect::new(platform),
            liveness: Liveness::new(now),
            local: None,
            remote: None,
            menu: None,
            editor: None,
            pane: None,
            last_inspected: None,
            pending_inspect: None,
            transport_open: false,
            listening: false,
            transient_markers: Vec::new(),
        }
    }

    pub fn has_highlights(&self) -> bool {
        self.local.as_ref().is_some_and(|s| !s.is_empty())
            || self.remote.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// Strip every queued transient marker.
    pub fn clear_markers(&mut self, dom: &mut Dom) {
        for (node, attr) in self.transient_markers.drain(..) {
            dom.remove_attribute(node, attr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Attr;

    #[test]
    fn markers_are_stripped_once() {
        let mut dom = Dom::new();
        let p = dom.create_element("p", vec![Attr::new("data-live-goto", "/a.css")]);
        let mut session = Session::new(Config::default(), Platform::Other, Instant::now());
        session.transient_markers.push((p, "data-live-goto"));
        session.clear_markers(&mut dom);
        assert_eq!(dom.attribute(p, "data-live-goto"), None);
        assert!(session.transient_markers.is_empty());
    }

    #[test]
    fn empty_sets_do_not_count_as_highlights() {
        let mut session = Session::new(Config::default(), Platform::Other, Instant::now());
        assert!(!session.has_highlights());
        session.remote = Some(HighlightSet::remote());
        assert!(!session.has_highlights());
    }
}
