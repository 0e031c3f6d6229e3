//! Page events the host forwards to the agent.
//!
//! The host owns the real input source (a browser, a test harness) and maps
//! what it sees onto [`PageEvent`] values. Hit testing is the host's job:
//! pointer events carry the element under the pointer.

use dom::NodeId;
use session::{EditKey, HoverEvent, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageEvent {
    KeyDown(Modifiers),
    KeyUp(Modifiers),
    PointerOver {
        target: NodeId,
        modifiers: Modifiers,
    },
    PointerOut {
        modifiers: Modifiers,
    },
    /// Viewport coordinates plus the element under the pointer.
    PointerMove {
        x: f32,
        y: f32,
        target: NodeId,
        modifiers: Modifiers,
    },
    Click {
        x: f32,
        y: f32,
        target: NodeId,
        modifiers: Modifiers,
    },
    /// Key pressed inside the element being edited inline.
    EditorKey(EditKey),
    /// The inline editor lost focus.
    EditorBlur,
    /// The viewport changed size. The layout provider already reflects it.
    Resize,
    /// The document (`None`) or a nested element scrolled.
    Scroll(Option<NodeId>),
}

impl PageEvent {
    /// The hover-select view of this event, if it has one.
    pub(crate) fn as_hover(&self) -> Option<HoverEvent> {
        match *self {
            PageEvent::KeyDown(m) => Some(HoverEvent::KeyDown(m)),
            PageEvent::KeyUp(m) => Some(HoverEvent::KeyUp(m)),
            PageEvent::PointerOver { target, modifiers } => {
                Some(HoverEvent::PointerOver { target, modifiers })
            }
            PageEvent::PointerOut { modifiers } => Some(HoverEvent::PointerOut { modifiers }),
            PageEvent::PointerMove {
                target, modifiers, ..
            } => Some(HoverEvent::PointerMove { target, modifiers }),
            PageEvent::Click {
                target, modifiers, ..
            } => Some(HoverEvent::Click { target, modifiers }),
            PageEvent::EditorKey(_)
            | PageEvent::EditorBlur
            | PageEvent::Resize
            | PageEvent::Scroll(_) => None,
        }
    }
}
