pub mod application;
pub mod connector;
pub mod domain;

pub use application::{
    ChatSessionUseCase, CompletionService, InputSource, SessionState, TurnRenderer,
};

pub use connector::{
    AnthropicClient, LineInput, ScriptedCompletion, TerminalRenderer, DEFAULT_ASSISTANT_NAME,
    DEFAULT_MODEL, MAX_TOKENS,
};

pub use domain::{ContentBlock, DomainError, RequestError, Role, Transcript, Turn};
