//! # Domain Layer
//!
//! Conversation model (roles, content blocks, turns, transcript) and the
//! error taxonomy. Independent of transport and terminal concerns.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
