/// Backend-side resources stored in the Direct3D 10 renderer's registry

use rhi_engine::rhi::render::{ResourceHandle, ResourceRegistry, ResourceType, RootParameter, TextureFormat};
use rhi_engine::rhi::{Error, Result};

use crate::direct3d10_device::{D3D10PrimitiveTopology, DxgiFormat, NativeObject};

/// Root signature: kept on the CPU, resource groups are bound through its descriptor ranges
#[derive(Debug, Clone)]
pub struct RootSignature {
    pub parameters: Vec<RootParameter>,
}

#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub root_signature: ResourceHandle,
    pub root_parameter_index: u32,
    pub resources: Vec<ResourceHandle>,
}

#[derive(Debug, Clone)]
pub struct PipelineState {
    pub root_signature: ResourceHandle,
    pub primitive_topology: D3D10PrimitiveTopology,
}

#[derive(Debug, Clone)]
pub struct VertexBuffer {
    pub buffer: NativeObject,
    pub stride_in_bytes: u32,
}

#[derive(Debug, Clone)]
pub struct IndexBuffer {
    pub buffer: NativeObject,
    pub format: DxgiFormat,
}

#[derive(Debug, Clone)]
pub struct VertexArray {
    pub vertex_buffers: Vec<VertexBuffer>,
    pub index_buffer: Option<IndexBuffer>,
}

#[derive(Debug, Clone)]
pub struct UniformBuffer {
    pub buffer: NativeObject,
    pub number_of_bytes: u32,
}

/// Direct3D 10 has no indirect draws: arguments stay on the CPU and are replayed as direct draws
#[derive(Debug, Clone)]
pub struct IndirectBuffer {
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Texture2D {
    pub texture: NativeObject,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub number_of_multisamples: u32,
    /// Present for single-sample color textures
    pub shader_resource_view: Option<NativeObject>,
}

#[derive(Debug, Clone)]
pub struct FramebufferColorAttachment {
    pub texture: NativeObject,
    pub format: DxgiFormat,
    pub render_target_view: NativeObject,
}

/// Framebuffer: its own views on the textures it was created from
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub color_attachments: Vec<FramebufferColorAttachment>,
    pub depth_stencil_view: Option<NativeObject>,
}

impl Framebuffer {
    pub fn render_target_views(&self) -> Vec<NativeObject> {
        self.color_attachments
            .iter()
            .map(|attachment| attachment.render_target_view)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub enum Direct3D10Resource {
    RootSignature(RootSignature),
    ResourceGroup(ResourceGroup),
    PipelineState(PipelineState),
    VertexArray(VertexArray),
    UniformBuffer(UniformBuffer),
    IndirectBuffer(IndirectBuffer),
    Texture2D(Texture2D),
    Framebuffer(Framebuffer),
}

impl Direct3D10Resource {
    /// Native objects owned by this resource, released when it is destroyed
    pub fn native_objects(&self) -> Vec<NativeObject> {
        match self {
            Direct3D10Resource::RootSignature(_)
            | Direct3D10Resource::ResourceGroup(_)
            | Direct3D10Resource::PipelineState(_)
            | Direct3D10Resource::IndirectBuffer(_) => Vec::new(),
            Direct3D10Resource::VertexArray(vertex_array) => vertex_array
                .vertex_buffers
                .iter()
                .map(|vertex_buffer| vertex_buffer.buffer)
                .chain(vertex_array.index_buffer.as_ref().map(|index_buffer| index_buffer.buffer))
                .collect(),
            Direct3D10Resource::UniformBuffer(uniform_buffer) => vec![uniform_buffer.buffer],
            // Views before the texture they point to
            Direct3D10Resource::Texture2D(texture) => texture
                .shader_resource_view
                .into_iter()
                .chain(std::iter::once(texture.texture))
                .collect(),
            Direct3D10Resource::Framebuffer(framebuffer) => framebuffer
                .render_target_views()
                .into_iter()
                .chain(framebuffer.depth_stencil_view)
                .collect(),
        }
    }
}

macro_rules! typed_lookup {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $resource:ty) => {
        $(#[$meta])*
        pub fn $name(
            resources: &ResourceRegistry<Direct3D10Resource>,
            handle: ResourceHandle,
        ) -> Result<&$resource> {
            match resources.get(handle, ResourceType::$variant)? {
                Direct3D10Resource::$variant(resource) => Ok(resource),
                _ => Err(Error::InvalidResource(format!(
                    "{:?} registered with a mismatching payload",
                    ResourceType::$variant
                ))),
            }
        }
    };
}

typed_lookup!(root_signature, RootSignature, RootSignature);
typed_lookup!(resource_group, ResourceGroup, ResourceGroup);
typed_lookup!(pipeline_state, PipelineState, PipelineState);
typed_lookup!(vertex_array, VertexArray, VertexArray);
typed_lookup!(uniform_buffer, UniformBuffer, UniformBuffer);
typed_lookup!(
    /// CPU copy of the draw arguments
    indirect_buffer,
    IndirectBuffer,
    IndirectBuffer
);
typed_lookup!(texture_2d, Texture2D, Texture2D);
typed_lookup!(framebuffer, Framebuffer, Framebuffer);
