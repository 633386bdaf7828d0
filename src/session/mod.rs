//! Session module - conversation message model
//!
//! Hermes agents are stateless across turns: the caller owns the
//! authoritative conversation log and resends it on every call. This module
//! only defines the shape of that log.
//!
//! # Example
//!
//! ```
//! use hermes::session::{Message, Role};
//!
//! let history = vec![Message::user("Hello!"), Message::assistant("Hi there!")];
//! assert_eq!(history[0].role, Role::User);
//! ```

pub mod types;

pub use types::{Message, Role, ToolCall};
