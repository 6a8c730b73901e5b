mod completion_service;
mod input_source;
mod turn_renderer;

pub use completion_service::*;
pub use input_source::*;
pub use turn_renderer::*;
