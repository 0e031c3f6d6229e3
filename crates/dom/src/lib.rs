//! DOM crate: Document Object Model
//!
//! Arena-based live page tree addressed by stable ids.
//! Uses generational indices from the `arena` crate instead of Rc/RefCell.

pub mod entities;
pub mod node;
pub mod simple;
pub mod tree;

pub use entities::decode_entities;
pub use node::*;
pub use simple::{SimpleDomError, SimpleNode};
pub use tree::Dom;
