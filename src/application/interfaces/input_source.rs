use async_trait::async_trait;

use crate::domain::DomainError;

/// Line-oriented user input.
#[async_trait]
pub trait InputSource: Send {
    /// Next line without its line terminator, or `None` once the source is
    /// exhausted. End of input is not an error.
    async fn next_line(&mut self) -> Result<Option<String>, DomainError>;
}
