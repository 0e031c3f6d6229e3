//! # Session Controller
//!
//! Interaction state of the page agent: configuration, the wire protocol,
//! the hover-select and liveness machines, inline editing and related-file
//! collation. Machines are `handle(event) -> effects` functions; the agent
//! executes the returned [`Effect`]s.

pub mod config;
pub mod editor;
pub mod effect;
pub mod error;
pub mod hover;
pub mod liveness;
pub mod protocol;
pub mod resources;
pub mod state;

pub use config::Config;
pub use editor::{EDIT_MARKER, EditKey, InlineEditor};
pub use effect::{Effect, TimerKind};
pub use error::{ConfigError, ProtocolError};
pub use hover::{HoverEvent, HoverSelect, HoverState, Modifiers, Platform};
pub use liveness::{KEEP_ALIVE_TIMEOUT, Liveness, LivenessEvent, POLL_INTERVAL};
pub use protocol::{BoxModelRefresh, Envelope, EnvelopeType, Inbound, InspectionData, ResourceList};
pub use resources::collate_resources;
pub use state::Session;
