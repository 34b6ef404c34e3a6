/// Renderer trait - the backend-agnostic rendering interface
///
/// A renderer owns the native resources created through it and consumes command
/// buffers. The command buffer itself knows nothing about backends: submitting it
/// hands it to `Renderer::submit_command_buffer`, which walks the packets through
/// the backend's dispatch table.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::Result;
use crate::renderer::{
    CommandBuffer, FramebufferDesc, PipelineStateDesc, RendererStats, ResourceGroupDesc, ResourceHandle,
    RootSignatureDesc, TextureDesc, UniformBufferDesc, VertexArrayDesc,
};

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Enable backend validation (debug event nesting, native limits)
    pub enable_validation: bool,
    /// Forward debug markers and events to the native API
    pub enable_debug_markers: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            enable_debug_markers: true,
            app_name: "RHI Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

static NEXT_RENDERER_ID: AtomicU32 = AtomicU32::new(1);

/// Allocate a process-unique renderer id (0 is never returned)
pub fn next_renderer_id() -> u32 {
    NEXT_RENDERER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Main renderer trait
///
/// Implemented by each backend (Direct3D 10, test mock).
pub trait Renderer: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &'static str;

    /// Id stamped into every handle this renderer creates
    fn renderer_id(&self) -> u32;

    fn create_root_signature(&mut self, desc: &RootSignatureDesc) -> Result<ResourceHandle>;

    /// Create a resource group for one parameter of a root signature
    ///
    /// # Errors
    ///
    /// Fails if the root signature is invalid or the resources do not match the
    /// parameter's descriptor ranges.
    fn create_resource_group(&mut self, desc: &ResourceGroupDesc) -> Result<ResourceHandle>;

    fn create_pipeline_state(&mut self, desc: &PipelineStateDesc) -> Result<ResourceHandle>;

    fn create_vertex_array(&mut self, desc: &VertexArrayDesc) -> Result<ResourceHandle>;

    fn create_uniform_buffer(&mut self, desc: &UniformBufferDesc) -> Result<ResourceHandle>;

    /// Create an indirect buffer holding packed `DrawArguments` or `DrawIndexedArguments`
    fn create_indirect_buffer(&mut self, data: &[u8]) -> Result<ResourceHandle>;

    fn create_texture_2d(&mut self, desc: &TextureDesc) -> Result<ResourceHandle>;

    /// Create a framebuffer from color textures and an optional depth-stencil texture
    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<ResourceHandle>;

    /// Release a resource created by this renderer
    ///
    /// Commands already recorded with the handle become invalid; dispatching them
    /// reports an error and skips the command.
    fn destroy_resource(&mut self, handle: ResourceHandle) -> Result<()>;

    /// Dispatch every packet of `command_buffer` to the backend, in recording order
    ///
    /// The buffer is only read; it can be submitted again afterwards.
    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer<'_>);

    fn stats(&self) -> RendererStats;
}
