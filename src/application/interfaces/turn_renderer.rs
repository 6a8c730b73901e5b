use std::io::{self, Write};

use crate::domain::Turn;

/// Writes the visible parts of a session to an output stream.
pub trait TurnRenderer: Send + Sync {
    /// One-off greeting printed before the first prompt.
    fn banner(&self, out: &mut dyn Write) -> io::Result<()>;

    /// The user label shown while waiting for input.
    fn prompt(&self, out: &mut dyn Write) -> io::Result<()>;

    /// An assistant reply. Only text blocks produce output.
    fn reply(&self, out: &mut dyn Write, turn: &Turn) -> io::Result<()>;
}
