//! The page agent.
//!
//! [`Agent`] owns the live document, the stylesheet set, the layout provider
//! and the session, and exposes the operations the controller calls. Page
//! events come in through [`Agent::handle_event`]; deferred work runs from
//! [`Agent::tick`]. Outbound messages and controller requests queue up until
//! the host drains them.

use std::time::{Duration, Instant};

use css::{MediaEnv, StyleSheetSet};
use dom::{Dom, NodeId, StableId};
use layout::LayoutProvider;
use overlay::{
    GOTO_MARKER, GotoMenu, GotoTarget, HighlightSet, InspectPane, Origin, OverlayEffect,
    SHOWGOTO_MARKER, box_model_snapshot, node_path, rule_provenance,
};
use patch::{EditOp, PatchEngine, PatchReport};
use scheduler::EventLoop;
use serde::Serialize;
use session::{
    BoxModelRefresh, Config, ConfigError, EDIT_MARKER, EditKey, Effect, Envelope, Inbound,
    InlineEditor, InspectionData, LivenessEvent, Platform, Session, TimerKind, collate_resources,
};
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::event::PageEvent;

/// Debounce for the inspection refresh after a resize.
const RESIZE_REFRESH_DELAY: Duration = Duration::from_millis(400);

/// Something the controller has to act on. Drained with
/// [`Agent::drain_requests`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerRequest {
    /// The goto menu opened; answer with [`Agent::show_goto`].
    ShowGoto { target: Option<StableId> },
    /// A goto menu item was picked.
    Goto {
        target: Option<StableId>,
        url: String,
    },
    /// An inline edit finished and the element's content may have changed.
    EditCommitted { target: Option<StableId> },
}

pub struct Agent<L> {
    dom: Dom,
    sheets: StyleSheetSet,
    layout: L,
    page_url: Url,
    events: EventLoop<TimerKind>,
    patcher: PatchEngine,
    session: Session,
    outbox: Vec<Envelope>,
    requests: Vec<ControllerRequest>,
}

impl<L: LayoutProvider> Agent<L> {
    pub fn new(dom: Dom, sheets: StyleSheetSet, layout: L, page_url: Url, now: Instant) -> Self {
        Self::with_platform(dom, sheets, layout, page_url, Platform::current(), now)
    }

    /// Like [`Agent::new`] with an explicit hover-select platform.
    pub fn with_platform(
        dom: Dom,
        sheets: StyleSheetSet,
        layout: L,
        page_url: Url,
        platform: Platform,
        now: Instant,
    ) -> Self {
        let mut agent = Self {
            dom,
            sheets,
            layout,
            page_url,
            events: EventLoop::new(),
            patcher: PatchEngine::new(),
            session: Session::new(Config::default(), platform, now),
            outbox: Vec::new(),
            requests: Vec::new(),
        };
        let effects = agent.session.liveness.start(now);
        agent.run(effects, now);
        info!(page = %agent.page_url, "agent started");
        agent
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut Dom {
        &mut self.dom
    }

    pub fn sheets(&self) -> &StyleSheetSet {
        &self.sheets
    }

    pub fn sheets_mut(&mut self) -> &mut StyleSheetSet {
        &mut self.sheets
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut L {
        &mut self.layout
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.session.config
    }

    /// Earliest pending timer, for hosts that sleep between ticks.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.events.next_timer_deadline()
    }

    pub fn has_pending_work(&self) -> bool {
        self.events.has_pending_work()
    }

    fn media_env(&self) -> MediaEnv {
        let viewport = self.layout.viewport();
        MediaEnv {
            width: viewport.width,
            height: viewport.height,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Transport
    // ─────────────────────────────────────────────────────────────────────

    /// The controller connection came up: announce the page's files.
    pub fn open_transport(&mut self) {
        self.session.transport_open = true;
        info!("transport open");
        self.send_resources();
    }

    pub fn close_transport(&mut self) {
        self.session.transport_open = false;
        self.events.clear(TimerKind::RefreshLiveData);
        info!("transport closed");
    }

    pub fn drain_outbox(&mut self) -> Vec<Envelope> {
        std::mem::take(&mut self.outbox)
    }

    pub fn drain_requests(&mut self) -> Vec<ControllerRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Handle one inbound message. Malformed messages are logged and dropped.
    pub fn handle_message(&mut self, text: &str) {
        let inbound = match Inbound::parse(text) {
            Ok(inbound) => inbound,
            Err(e) => {
                error!(error = %e, "dropping malformed message");
                return;
            }
        };
        match inbound {
            Inbound::ResourceDataRefresh => self.send_resources(),
            Inbound::LiveDataRefresh => self.refresh_box_model(),
            Inbound::Inspect => self.open_pane(),
            Inbound::Other => self.close_pane(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Controller operations
    // ─────────────────────────────────────────────────────────────────────

    pub fn keep_alive(&mut self, now: Instant) {
        let effects = self.session.liveness.handle(LivenessEvent::KeepAlive, now);
        self.run(effects, now);
    }

    /// Fill the open goto menu.
    pub fn show_goto(&mut self, targets: &[GotoTarget]) {
        match self.session.menu.as_mut() {
            Some(menu) => menu.show(&mut self.dom, &self.layout, targets),
            None => debug!("goto targets arrived without an open menu"),
        }
    }

    pub fn hide_highlight(&mut self) {
        if let Some(mut remote) = self.session.remote.take() {
            remote.clear(&mut self.dom);
        }
    }

    /// Highlight `node`, first clearing the current highlight when `clear`.
    pub fn highlight(&mut self, node: NodeId, clear: bool, now: Instant) {
        let remote = self.session.remote.get_or_insert_with(HighlightSet::remote);
        if clear {
            remote.clear(&mut self.dom);
        }
        let effects = remote.add(
            &mut self.dom,
            &self.layout,
            &self.session.config.remote_highlight,
            node,
            true,
            Origin::Remote,
        );
        self.run_overlay(effects, now, false);
    }

    /// [`Agent::highlight`] by stable id. Returns `false` when no element
    /// carries `id`.
    pub fn highlight_id(&mut self, id: StableId, clear: bool, now: Instant) -> bool {
        match self.dom.find_by_stable_id(id) {
            Some(node) => {
                self.highlight(node, clear, now);
                true
            }
            None => {
                warn!(%id, "no element to highlight");
                false
            }
        }
    }

    /// Highlight every element matching `selector`. Redraws re-run the query.
    pub fn highlight_rule(&mut self, selector: &str, now: Instant) {
        self.hide_highlight();
        let nodes = style::select(&self.dom, selector).unwrap_or_else(|| {
            warn!(selector, "unparsable selector");
            Vec::new()
        });
        for node in nodes {
            self.highlight(node, false, now);
        }
        self.session
            .remote
            .get_or_insert_with(HighlightSet::remote)
            .set_selector(Some(selector.to_string()));
    }

    pub fn redraw_highlights(&mut self, now: Instant) {
        let Some(remote) = self.session.remote.as_mut() else {
            return;
        };
        let effects = remote.redraw(&mut self.dom, &self.layout, &self.session.config.remote_highlight);
        self.run_overlay(effects, now, true);
    }

    /// Apply one edit batch, then redraw highlights.
    pub fn apply_dom_edits(&mut self, edits: &[EditOp], now: Instant) -> PatchReport {
        let report = self.patcher.apply(&mut self.dom, edits);
        debug!(
            applied = report.applied,
            skipped = report.skipped.len(),
            released = report.released,
            "batch applied"
        );
        self.redraw_highlights(now);
        report
    }

    /// The document in simple JSON form; `null` for an empty document.
    pub fn get_simple_dom(&self) -> String {
        let Some(root) = self.dom.to_simple() else {
            return "null".to_string();
        };
        serde_json::to_string(&root).unwrap_or_else(|e| {
            error!(error = %e, "failed to encode simple DOM");
            "null".to_string()
        })
    }

    /// Replace the configuration and echo the parsed result. A rejected
    /// config leaves the current one in place.
    pub fn update_config(&mut self, json: &str) -> Result<String, ConfigError> {
        let config = Config::from_json(json).inspect_err(|e| warn!(error = %e, "config rejected"))?;
        self.session.config = config;
        Ok(self.session.config.to_json())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Page events
    // ─────────────────────────────────────────────────────────────────────

    /// Feed one page event. Returns `true` when the event was consumed and
    /// must not reach the page.
    pub fn handle_event(&mut self, event: PageEvent, now: Instant) -> bool {
        match event {
            PageEvent::Click { x, y, .. } if self.session.pane.is_some() => {
                self.pane_click(x, y, now);
                return true;
            }
            PageEvent::PointerMove { x, y, .. } => {
                if let Some(pane) = &self.session.pane {
                    pane.track(&mut self.dom, &self.layout, x, y);
                }
            }
            PageEvent::EditorKey(key) => {
                self.editor_key(key, now);
                return false;
            }
            PageEvent::EditorBlur => {
                self.commit_edit(now);
                return false;
            }
            PageEvent::Resize => {
                self.on_resize(now);
                return false;
            }
            PageEvent::Scroll(element) => {
                self.on_scroll(element, now);
                return false;
            }
            _ => {}
        }

        let consumed = match event.as_hover() {
            Some(hover) => {
                let effects = self.session.hover.handle(hover, self.session.config.experimental);
                self.run(effects, now)
            }
            None => false,
        };
        if !consumed {
            if let PageEvent::Click { target, .. } = event {
                self.page_click(target, now);
            }
        }
        consumed
    }

    /// Run due timers and the pending animation frame.
    pub fn tick(&mut self, now: Instant) {
        for kind in self.events.tick(now) {
            trace!(?kind, "timer fired");
            match kind {
                TimerKind::LivenessPoll => {
                    let effects = self.session.liveness.handle(LivenessEvent::Poll, now);
                    self.run(effects, now);
                }
                TimerKind::FinishAnimation => self.finish_animations(),
                TimerKind::Inspect => {
                    if let Some(node) = self.session.pending_inspect.take() {
                        self.send_inspection(node, false);
                    }
                }
                TimerKind::PulseFrame => {
                    self.redraw_highlights(now);
                    if self.events.is_scheduled(TimerKind::PulseStop) {
                        self.events.request_animation_frame(TimerKind::PulseFrame);
                    }
                }
                TimerKind::PulseStop => {
                    self.events.cancel_animation_frame();
                }
                TimerKind::RefreshLiveData => {
                    if let Some(node) = self.session.last_inspected {
                        self.send_inspection(node, true);
                    }
                }
                TimerKind::Redraw => self.redraw_highlights(now),
                TimerKind::ClearMarkers => self.session.clear_markers(&mut self.dom),
            }
        }
    }

    fn on_resize(&mut self, now: Instant) {
        if self.session.listening {
            self.redraw_highlights(now);
        }
        if self.session.transport_open && self.session.last_inspected.is_some() {
            self.events
                .set_timeout(TimerKind::RefreshLiveData, RESIZE_REFRESH_DELAY, now);
        }
    }

    fn on_scroll(&mut self, element: Option<NodeId>, now: Instant) {
        if !self.session.listening {
            return;
        }
        match element {
            None => self.redraw_highlights(now),
            Some(_) if self.session.has_highlights() => {
                self.events.set_timeout(TimerKind::Redraw, Duration::ZERO, now);
            }
            Some(_) => {}
        }
    }

    /// A click that reached the page: closes the menu (following the picked
    /// item, if any) and commits an edit in progress elsewhere.
    fn page_click(&mut self, target: NodeId, now: Instant) {
        if let Some(mut menu) = self.session.menu.take() {
            if let Some(url) = menu.click(&mut self.dom, target) {
                let element = menu.target();
                self.mark_transient(element, GOTO_MARKER, now);
                let target = self.dom.stable_id(element);
                info!(?target, url = %url, "goto");
                self.requests.push(ControllerRequest::Goto { target, url });
            }
        }

        let outside_editor = self.session.editor.as_ref().is_some_and(|editor| {
            let element = editor.element();
            element != target && !self.dom.ancestors(target).contains(&element)
        });
        if outside_editor {
            self.commit_edit(now);
        }
    }

    fn editor_key(&mut self, key: EditKey, now: Instant) {
        let blur = match self.session.editor.as_mut() {
            Some(editor) => editor.key(&mut self.dom, key),
            None => false,
        };
        if blur {
            self.commit_edit(now);
        }
    }

    fn commit_edit(&mut self, now: Instant) {
        let Some(editor) = self.session.editor.take() else {
            return;
        };
        let element = editor.blur(&mut self.dom);
        self.mark_transient(element, EDIT_MARKER, now);
        let target = self.dom.stable_id(element);
        self.requests.push(ControllerRequest::EditCommitted { target });
    }

    fn open_menu(&mut self, node: NodeId, now: Instant) {
        if let Some(mut menu) = self.session.menu.take() {
            menu.remove(&mut self.dom);
        }
        self.session.menu = Some(GotoMenu::open(&mut self.dom, node));
        self.mark_transient(node, SHOWGOTO_MARKER, now);
        let target = self.dom.stable_id(node);
        self.requests.push(ControllerRequest::ShowGoto { target });
    }

    /// Queue `attr` on `node` for removal on the next turn.
    fn mark_transient(&mut self, node: NodeId, attr: &'static str, now: Instant) {
        self.session.transient_markers.push((node, attr));
        self.events.set_timeout(TimerKind::ClearMarkers, Duration::ZERO, now);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inspect pane
    // ─────────────────────────────────────────────────────────────────────

    fn open_pane(&mut self) {
        if self
            .session
            .pane
            .as_ref()
            .is_some_and(|pane| pane.is_attached(&self.dom))
        {
            return;
        }
        if let Some(stale) = self.session.pane.take() {
            stale.remove(&mut self.dom);
        }
        self.session.pane = InspectPane::create(&mut self.dom);
    }

    fn close_pane(&mut self) {
        if let Some(pane) = self.session.pane.take() {
            pane.remove(&mut self.dom);
        }
    }

    fn pane_click(&mut self, x: f32, y: f32, now: Instant) {
        let target = self
            .session
            .pane
            .as_ref()
            .and_then(|pane| pane.click_target(&self.dom, &self.layout, x, y));
        if let Some(target) = target {
            self.document_click(target, now);
        }
    }

    /// Tell the controller which element was picked, then send its
    /// inspection data on the next turn.
    fn document_click(&mut self, element: NodeId, now: Instant) {
        if let Some(id) = self.dom.stable_id(element) {
            self.send(Envelope::message(id.to_string()));
        }
        self.session.pending_inspect = Some(element);
        self.events.set_timeout(TimerKind::Inspect, Duration::ZERO, now);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Effects
    // ─────────────────────────────────────────────────────────────────────

    /// Execute session effects. Returns `true` if one of them consumed the
    /// triggering event.
    fn run(&mut self, effects: Vec<Effect>, now: Instant) -> bool {
        let mut consumed = false;
        for effect in effects {
            trace!(?effect, "effect");
            match effect {
                Effect::Consume => consumed = true,
                Effect::HighlightLocal(node) => {
                    let local = self.session.local.get_or_insert_with(HighlightSet::local);
                    let effects = local.add(
                        &mut self.dom,
                        &self.layout,
                        &self.session.config.remote_highlight,
                        node,
                        true,
                        Origin::Pointer,
                    );
                    self.run_overlay(effects, now, false);
                }
                Effect::ClearLocal => {
                    if let Some(local) = self.session.local.as_mut() {
                        local.clear(&mut self.dom);
                    }
                }
                Effect::DropLocal => {
                    if let Some(mut local) = self.session.local.take() {
                        local.clear(&mut self.dom);
                    }
                }
                Effect::BeginEdit(node) => {
                    self.commit_edit(now);
                    self.session.editor = Some(InlineEditor::begin(&mut self.dom, node));
                }
                Effect::OpenMenu(node) => self.open_menu(node, now),
                Effect::HideRemote => self.hide_highlight(),
                Effect::AttachListeners => self.session.listening = true,
                Effect::DetachListeners => self.session.listening = false,
                Effect::Schedule { kind, after } => self.events.set_timeout(kind, after, now),
                Effect::ScheduleEvery { kind, every } => self.events.set_interval(kind, every, now),
                Effect::Cancel(kind) => {
                    self.events.clear(kind);
                }
            }
        }
        consumed
    }

    /// Execute overlay effects. A redraw neither arms a pulse nor resends
    /// inspection data, so a moving element redraws for one pulse and then
    /// settles.
    fn run_overlay(&mut self, effects: Vec<OverlayEffect>, now: Instant, from_redraw: bool) {
        for effect in effects {
            match effect {
                OverlayEffect::ScrollTo { x, y } => {
                    debug!(x, y, "scrolling highlight into view");
                    self.layout.scroll_to(x, y);
                }
                OverlayEffect::ArmPulse { duration } if !from_redraw => {
                    self.events.cancel_animation_frame();
                    self.events.request_animation_frame(TimerKind::PulseFrame);
                    self.events.set_timeout(TimerKind::PulseStop, duration, now);
                }
                OverlayEffect::ArmPulse { .. } => {}
                OverlayEffect::FinishAnimation { after } => {
                    self.events.set_timeout(TimerKind::FinishAnimation, after, now);
                }
                OverlayEffect::InspectAfter { node, after } => {
                    if self.session.transport_open && !from_redraw {
                        self.session.pending_inspect = Some(node);
                        self.events.set_timeout(TimerKind::Inspect, after, now);
                    }
                }
            }
        }
    }

    fn finish_animations(&mut self) {
        let config = &self.session.config.remote_highlight;
        for set in [self.session.local.as_mut(), self.session.remote.as_mut()]
            .into_iter()
            .flatten()
        {
            set.finish_animation(&mut self.dom, config);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Outbound
    // ─────────────────────────────────────────────────────────────────────

    fn send_inspection(&mut self, node: NodeId, refresh: bool) {
        if !self.dom.nodes.contains(node) {
            debug!(?node, "inspected element is gone");
            return;
        }
        let env = self.media_env();
        let origin = self.page_url.origin().ascii_serialization();
        let data = InspectionData {
            data: rule_provenance(&self.dom, node, &self.sheets, &env, &origin),
            path: node_path(&self.dom, node),
            boxmodel: box_model_snapshot(&self.dom, &self.layout, &self.sheets, &env, node),
            refresh,
        };
        self.send_livedata(&data);
        self.session.last_inspected = Some(node);
    }

    fn refresh_box_model(&mut self) {
        let Some(node) = self
            .session
            .last_inspected
            .filter(|&node| self.dom.nodes.contains(node))
        else {
            debug!("nothing inspected yet");
            return;
        };
        let env = self.media_env();
        let refresh = BoxModelRefresh {
            path: node_path(&self.dom, node),
            boxmodel: box_model_snapshot(&self.dom, &self.layout, &self.sheets, &env, node),
            livedata_refresh: true,
        };
        self.send_livedata(&refresh);
    }

    /// Linked stylesheets plus script and image sources.
    fn send_resources(&mut self) {
        let mut references: Vec<&str> = self
            .sheets
            .sheets()
            .iter()
            .filter_map(|sheet| sheet.href.as_deref())
            .collect();
        for node in self.dom.semantic_descendants(self.dom.document()) {
            let sourced = self
                .dom
                .tag_name(node)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("script") || tag.eq_ignore_ascii_case("img"));
            if sourced {
                references.extend(self.dom.attribute(node, "src"));
            }
        }
        let list = collate_resources(&self.page_url, references);
        self.send_livedata(&list);
    }

    fn send_livedata<T: Serialize>(&mut self, payload: &T) {
        match Envelope::livedata(payload) {
            Ok(envelope) => self.send(envelope),
            Err(e) => error!(error = %e, "failed to encode livedata"),
        }
    }

    fn send(&mut self, envelope: Envelope) {
        if !self.session.transport_open {
            trace!("transport closed, message dropped");
            return;
        }
        debug!(kind = ?envelope.kind, "send");
        self.outbox.push(envelope);
    }
}
