/*!
# RHI Engine

Backend-agnostic rendering hardware interface built around command buffers.

Rendering work is recorded into a `CommandBuffer` as a chain of plain-data command
packets, then submitted to a `Renderer`. Each backend walks the packets through a
static table of handler functions indexed by the command's dispatch index, so
recording involves no virtual calls and no per-command allocation.

## Architecture

- **Renderer**: backend interface creating resources and consuming command buffers
- **CommandBuffer**: growable byte stream of command packets, recordable once and submittable many times
- **Commands**: `Clear`, `Draw`, `SetViewports`, ... each with `create` factories
- **Dispatch**: `BackendDispatchTable` + `dispatch_command_buffer`, shared by every backend
- **ResourceHandle**: non-owning, plain-data resource references resolved by the backend

Backend crates (Direct3D 10, ...) provide the concrete renderers.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod renderer;
pub mod utils;

// Main rhi namespace module
pub mod rhi {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Renderer trait, configuration and command buffer
    pub use crate::renderer::{CommandBuffer, Renderer, RendererConfig};

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger, MemoryLogger};
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Commands sub-module
    pub mod command {
        pub use crate::renderer::command::*;
    }
}

// Re-export math library at crate root
pub use glam;
