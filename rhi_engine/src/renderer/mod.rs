/// Renderer module - command buffers, commands, dispatch and the renderer interface

pub mod command;
pub mod command_buffer;
pub mod command_packet;
pub mod dispatch;
pub mod renderer;
pub mod resource;
pub mod statistics;
pub mod types;

#[cfg(test)]
pub mod mock_renderer;

pub use command::{Command, CommandDispatchFunctionIndex, PayloadStorage, DEBUG_NAME_LENGTH};
pub use command_buffer::*;
pub use command_packet::*;
pub use dispatch::*;
pub use renderer::*;
pub use resource::*;
pub use statistics::*;
pub use types::*;
