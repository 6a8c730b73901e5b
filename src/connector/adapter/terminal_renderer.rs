use std::io::{self, Write};

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::QueueableCommand;

use crate::application::TurnRenderer;
use crate::domain::Turn;

pub const USER_LABEL: &str = "You";
pub const DEFAULT_ASSISTANT_NAME: &str = "Claude";

const USER_COLOR: Color = Color::Blue;
const ASSISTANT_COLOR: Color = Color::Yellow;

/// Renders the session as labelled lines: `You: ` before input, and
/// `<assistant>: <text>` for every text block of a reply.
pub struct TerminalRenderer {
    assistant_name: String,
    color: bool,
}

impl TerminalRenderer {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            color: true,
        }
    }

    /// Disable ANSI colour, e.g. when stdout is not a terminal.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn assistant_name(&self) -> &str {
        &self.assistant_name
    }

    fn label(&self, out: &mut dyn Write, name: &str, color: Color) -> io::Result<()> {
        if self.color {
            out.queue(SetForegroundColor(color))?
                .queue(Print(name))?
                .queue(ResetColor)?;
        } else {
            out.write_all(name.as_bytes())?;
        }
        out.write_all(b": ")
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_ASSISTANT_NAME)
    }
}

impl TurnRenderer for TerminalRenderer {
    fn banner(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Chat with {} (use 'ctrl-c' to quit)", self.assistant_name)
    }

    fn prompt(&self, out: &mut dyn Write) -> io::Result<()> {
        self.label(out, USER_LABEL, USER_COLOR)
    }

    fn reply(&self, out: &mut dyn Write, turn: &Turn) -> io::Result<()> {
        for text in turn.texts() {
            self.label(out, &self.assistant_name, ASSISTANT_COLOR)?;
            writeln!(out, "{text}")?;
        }
        Ok(())
    }
}
