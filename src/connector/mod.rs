//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Completion (Anthropic Messages API over reqwest, scripted for tests)
//! - Input (line reader over stdin or any async reader)
//! - Output (terminal renderer with ANSI role labels)

pub mod adapter;

pub use adapter::*;
