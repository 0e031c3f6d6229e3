//! Hover-select: while the platform modifier is held, hovering highlights
//! elements and clicking opens the goto menu or, with alt, the inline editor.

use dom::NodeId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::effect::Effect;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Platform {
    /// Selection is driven by the meta (command) key.
    Mac,
    /// Selection is driven by ctrl.
    #[default]
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        meta: false,
        ctrl: false,
        alt: false,
        shift: false,
    };

    /// Whether the platform's selection modifier is held.
    pub fn selects(self, platform: Platform) -> bool {
        match platform {
            Platform::Mac => self.meta,
            Platform::Other => self.ctrl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverEvent {
    KeyDown(Modifiers),
    KeyUp(Modifiers),
    PointerOver { target: NodeId, modifiers: Modifiers },
    PointerOut { modifiers: Modifiers },
    PointerMove { target: NodeId, modifiers: Modifiers },
    Click { target: NodeId, modifiers: Modifiers },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    Idle,
    Armed {
        /// The first pointer move after arming counts as a pointer-over.
        move_pending: bool,
    },
}

#[derive(Debug, Default)]
pub struct HoverSelect {
    platform: Platform,
    state: HoverState,
}

impl HoverSelect {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            state: HoverState::Idle,
        }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, HoverState::Armed { .. })
    }

    /// Advance on `event`. Arming only happens when `enabled`.
    pub fn handle(&mut self, event: HoverEvent, enabled: bool) -> Vec<Effect> {
        let platform = self.platform;
        match (self.state, event) {
            (HoverState::Idle, HoverEvent::KeyDown(m)) if enabled && m.selects(platform) => {
                debug!("hover-select armed");
                self.state = HoverState::Armed { move_pending: true };
                Vec::new()
            }
            (HoverState::Idle, _) => Vec::new(),

            (HoverState::Armed { .. }, HoverEvent::KeyUp(m)) if !m.selects(platform) => {
                debug!("hover-select disarmed");
                self.state = HoverState::Idle;
                vec![Effect::DropLocal]
            }
            (HoverState::Armed { .. }, HoverEvent::PointerOver { target, modifiers })
                if modifiers.selects(platform) =>
            {
                vec![Effect::HighlightLocal(target)]
            }
            (HoverState::Armed { move_pending: true }, HoverEvent::PointerMove { target, modifiers }) => {
                self.state = HoverState::Armed { move_pending: false };
                if modifiers.selects(platform) {
                    vec![Effect::HighlightLocal(target)]
                } else {
                    Vec::new()
                }
            }
            (HoverState::Armed { .. }, HoverEvent::PointerOut { modifiers }) if modifiers.selects(platform) => {
                vec![Effect::ClearLocal]
            }
            (HoverState::Armed { .. }, HoverEvent::Click { target, modifiers })
                if modifiers.selects(platform) =>
            {
                let action = if modifiers.alt {
                    Effect::BeginEdit(target)
                } else {
                    Effect::OpenMenu(target)
                };
                vec![Effect::Consume, action]
            }
            (HoverState::Armed { .. }, _) => Vec::new(),
        }
    }
}
