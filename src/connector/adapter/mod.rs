mod anthropic_client;
mod line_input;
mod scripted_completion;
mod terminal_renderer;

pub use anthropic_client::*;
pub use line_input::*;
pub use scripted_completion::*;
pub use terminal_renderer::*;
