mod content_block;
mod role;
mod transcript;
mod turn;

pub use content_block::*;
pub use role::*;
pub use transcript::*;
pub use turn::*;
