//! Side effects requested by the session machines. The agent executes them.

use std::time::Duration;

use dom::NodeId;

/// Deferred work, one slot per kind. Scheduling a kind again replaces the
/// pending one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Periodic keep-alive check.
    LivenessPoll,
    /// Switch animated overlays to their end values.
    FinishAnimation,
    /// Send inspection data for the pending element.
    Inspect,
    /// Animation frame redrawing highlights while an element moves.
    PulseFrame,
    /// End of the pulse.
    PulseStop,
    /// Debounced inspection refresh after a resize.
    RefreshLiveData,
    /// Redraw after a nested element scrolled.
    Redraw,
    /// Remove transient marker attributes.
    ClearMarkers,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Stop the triggering event from reaching the page.
    Consume,
    /// Add `node` to the transient hover highlight, animated.
    HighlightLocal(NodeId),
    /// Clear the hover highlight but keep the set.
    ClearLocal,
    /// Clear and discard the hover highlight.
    DropLocal,
    BeginEdit(NodeId),
    OpenMenu(NodeId),
    HideRemote,
    AttachListeners,
    DetachListeners,
    Schedule { kind: TimerKind, after: Duration },
    ScheduleEvery { kind: TimerKind, every: Duration },
    Cancel(TimerKind),
}
