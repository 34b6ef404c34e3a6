/// Direct3D10Renderer - Direct3D 10 implementation of the Renderer trait

use rhi_engine::rhi::render::{
    dispatch_command_buffer, next_renderer_id, CommandBuffer, DescriptorRange, FramebufferDesc,
    PipelineStateDesc, RendererStatistics, RendererStats, ResourceGroupDesc, ResourceHandle, ResourceRegistry,
    ResourceType, RootSignatureDesc, TextureDesc, UniformBufferDesc, VertexArrayDesc,
};
use rhi_engine::rhi::{Renderer, RendererConfig, Result};
use rhi_engine::{engine_bail, engine_debug, engine_err, engine_error, engine_info};

use crate::debug;
use crate::direct3d10_device::{
    D3D10BufferDesc, D3D10Texture2DDesc, Direct3D10Device, NativeObject, D3D10_BIND_CONSTANT_BUFFER,
    D3D10_BIND_INDEX_BUFFER, D3D10_BIND_VERTEX_BUFFER, D3D10_SIMULTANEOUS_RENDER_TARGET_COUNT,
    D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT,
};
use crate::direct3d10_dispatch::DIRECT3D10_DISPATCH_TABLE;
use crate::direct3d10_mapping::Mapping;
use crate::direct3d10_recording_device::RecordingDevice;
use crate::direct3d10_resource::{
    self as resource, Direct3D10Resource, Framebuffer, FramebufferColorAttachment, IndexBuffer, IndirectBuffer,
    PipelineState, ResourceGroup, RootSignature, Texture2D, UniformBuffer, VertexArray, VertexBuffer,
};

pub(crate) const LOG_SOURCE: &str = "rhi::d3d10";

/// Constant buffer sizes are multiples of 16 bytes
const CONSTANT_BUFFER_ALIGNMENT: u32 = 16;

/// Direct3D 10 renderer
///
/// Owns the native device, every resource created through it and the state bound
/// by dispatched commands. Pipeline state is tracked on the CPU so that commands
/// depending on earlier bindings (resource groups, clears, indexed draws) can be
/// validated before reaching the device.
pub struct Direct3D10Renderer {
    renderer_id: u32,
    pub(crate) config: RendererConfig,
    pub(crate) device: Box<dyn Direct3D10Device>,
    pub(crate) resources: ResourceRegistry<Direct3D10Resource>,
    pub(crate) statistics: RendererStatistics,

    // Bound state, null when nothing is bound
    pub(crate) bound_root_signature: ResourceHandle,
    pub(crate) bound_pipeline_state: ResourceHandle,
    pub(crate) bound_vertex_array: ResourceHandle,
    pub(crate) bound_render_target: ResourceHandle,
    /// Open `BeginDebugEvent` scopes
    pub(crate) debug_event_depth: u32,
}

impl Direct3D10Renderer {
    /// Create a renderer on a headless `RecordingDevice`
    pub fn new(config: RendererConfig) -> Result<Self> {
        Self::with_device(config, RecordingDevice::new())
    }

    /// Create a renderer driving `device`
    pub fn with_device<D: Direct3D10Device + 'static>(config: RendererConfig, device: D) -> Result<Self> {
        let renderer_id = next_renderer_id();

        engine_info!(
            LOG_SOURCE,
            "Direct3D 10 renderer {} created for {} v{}.{}.{} (validation: {}, debug markers: {})",
            renderer_id,
            config.app_name,
            config.app_version.0,
            config.app_version.1,
            config.app_version.2,
            config.enable_validation,
            config.enable_debug_markers
        );

        Ok(Self {
            renderer_id,
            config,
            device: Box::new(device),
            resources: ResourceRegistry::new(renderer_id),
            statistics: RendererStatistics::new(),
            bound_root_signature: ResourceHandle::NULL,
            bound_pipeline_state: ResourceHandle::NULL,
            bound_vertex_array: ResourceHandle::NULL,
            bound_render_target: ResourceHandle::NULL,
            debug_event_depth: 0,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn bound_root_signature(&self) -> ResourceHandle {
        self.bound_root_signature
    }

    pub fn bound_pipeline_state(&self) -> ResourceHandle {
        self.bound_pipeline_state
    }

    pub fn bound_vertex_array(&self) -> ResourceHandle {
        self.bound_vertex_array
    }

    pub fn bound_render_target(&self) -> ResourceHandle {
        self.bound_render_target
    }

    /// Zero draw call and dispatch counters, typically once per frame
    pub fn reset_frame_statistics(&self) {
        self.statistics.reset_frame_counters();
    }

    fn register(&mut self, resource_type: ResourceType, resource: Direct3D10Resource) -> ResourceHandle {
        self.statistics.resource_created(resource_type);
        self.resources.insert(resource_type, resource)
    }

    fn release_all(&mut self, objects: &[NativeObject]) {
        for object in objects {
            self.device.release(*object);
        }
    }

    /// Check `resources` against the descriptor ranges of one root parameter, in order
    fn validate_resource_group(&self, ranges: &[DescriptorRange], resources: &[ResourceHandle]) -> Result<()> {
        let expected_types = ranges
            .iter()
            .flat_map(|range| std::iter::repeat(range.resource_type).take(range.number_of_descriptors as usize));
        let mut number_of_expected_resources = 0;
        for (index, expected_type) in expected_types.enumerate() {
            number_of_expected_resources += 1;
            let Some(handle) = resources.get(index) else {
                continue;
            };
            let resource_type = self.resources.resource_type(*handle).map_err(|error| {
                engine_error!(LOG_SOURCE, "Resource group entry {}: {}", index, error);
                error
            })?;
            if resource_type != expected_type {
                engine_bail!(
                    LOG_SOURCE,
                    "Resource group entry {} is a {:?}, the root parameter expects a {:?}",
                    index,
                    resource_type,
                    expected_type
                );
            }
        }
        if resources.len() != number_of_expected_resources {
            engine_bail!(
                LOG_SOURCE,
                "Resource group holds {} resources, the root parameter expects {}",
                resources.len(),
                number_of_expected_resources
            );
        }
        Ok(())
    }

    fn create_native_buffer(&mut self, desc: &D3D10BufferDesc, initial_data: Option<&[u8]>) -> Result<NativeObject> {
        self.device.create_buffer(desc, initial_data).map_err(|error| {
            engine_error!(LOG_SOURCE, "Failed to create buffer {:?}: {}", desc, error);
            error
        })
    }
}

impl Renderer for Direct3D10Renderer {
    fn name(&self) -> &'static str {
        "Direct3D10"
    }

    fn renderer_id(&self) -> u32 {
        self.renderer_id
    }

    fn create_root_signature(&mut self, desc: &RootSignatureDesc) -> Result<ResourceHandle> {
        for (parameter_index, parameter) in desc.parameters.iter().enumerate() {
            for range in &parameter.descriptor_ranges {
                if !matches!(range.resource_type, ResourceType::UniformBuffer | ResourceType::Texture2D) {
                    engine_bail!(
                        LOG_SOURCE,
                        "Root parameter {}: {:?} ranges are not supported, only uniform buffers and 2D textures",
                        parameter_index,
                        range.resource_type
                    );
                }
            }
        }

        let handle = self.register(
            ResourceType::RootSignature,
            Direct3D10Resource::RootSignature(RootSignature {
                parameters: desc.parameters.clone(),
            }),
        );
        engine_debug!(LOG_SOURCE, "Root signature created ({} parameters)", desc.parameters.len());
        Ok(handle)
    }

    fn create_resource_group(&mut self, desc: &ResourceGroupDesc) -> Result<ResourceHandle> {
        let root_signature = resource::root_signature(&self.resources, desc.root_signature).map_err(|error| {
            engine_error!(LOG_SOURCE, "Resource group root signature: {}", error);
            error
        })?;
        let Some(parameter) = root_signature.parameters.get(desc.root_parameter_index as usize) else {
            engine_bail!(
                LOG_SOURCE,
                "Root parameter index {} out of range ({} parameters)",
                desc.root_parameter_index,
                root_signature.parameters.len()
            );
        };
        let ranges = parameter.descriptor_ranges.clone();
        self.validate_resource_group(&ranges, &desc.resources)?;

        let handle = self.register(
            ResourceType::ResourceGroup,
            Direct3D10Resource::ResourceGroup(ResourceGroup {
                root_signature: desc.root_signature,
                root_parameter_index: desc.root_parameter_index,
                resources: desc.resources.clone(),
            }),
        );
        engine_debug!(LOG_SOURCE, "Resource group created ({} resources)", desc.resources.len());
        Ok(handle)
    }

    fn create_pipeline_state(&mut self, desc: &PipelineStateDesc) -> Result<ResourceHandle> {
        resource::root_signature(&self.resources, desc.root_signature).map_err(|error| {
            engine_error!(LOG_SOURCE, "Pipeline state root signature: {}", error);
            error
        })?;

        let handle = self.register(
            ResourceType::PipelineState,
            Direct3D10Resource::PipelineState(PipelineState {
                root_signature: desc.root_signature,
                primitive_topology: Mapping::primitive_topology(desc.primitive_topology),
            }),
        );
        engine_debug!(LOG_SOURCE, "Pipeline state created ({:?})", desc.primitive_topology);
        Ok(handle)
    }

    fn create_vertex_array(&mut self, desc: &VertexArrayDesc) -> Result<ResourceHandle> {
        if desc.vertex_buffers.len() > D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT {
            engine_bail!(
                LOG_SOURCE,
                "{} vertex buffers exceed the {} input slots",
                desc.vertex_buffers.len(),
                D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT
            );
        }

        let mut vertex_buffers = Vec::with_capacity(desc.vertex_buffers.len());
        for vertex_buffer_desc in &desc.vertex_buffers {
            let buffer_desc = D3D10BufferDesc {
                byte_width: vertex_buffer_desc.number_of_bytes,
                bind_flags: D3D10_BIND_VERTEX_BUFFER,
            };
            match self.create_native_buffer(&buffer_desc, None) {
                Ok(buffer) => vertex_buffers.push(VertexBuffer {
                    buffer,
                    stride_in_bytes: vertex_buffer_desc.stride_in_bytes,
                }),
                Err(error) => {
                    let created: Vec<NativeObject> = vertex_buffers.iter().map(|vb: &VertexBuffer| vb.buffer).collect();
                    self.release_all(&created);
                    return Err(error);
                }
            }
        }

        let index_buffer = match &desc.index_buffer {
            Some(index_buffer_desc) => {
                let buffer_desc = D3D10BufferDesc {
                    byte_width: index_buffer_desc.number_of_bytes,
                    bind_flags: D3D10_BIND_INDEX_BUFFER,
                };
                match self.create_native_buffer(&buffer_desc, None) {
                    Ok(buffer) => Some(IndexBuffer {
                        buffer,
                        format: Mapping::index_buffer_format(index_buffer_desc.format),
                    }),
                    Err(error) => {
                        let created: Vec<NativeObject> = vertex_buffers.iter().map(|vb| vb.buffer).collect();
                        self.release_all(&created);
                        return Err(error);
                    }
                }
            }
            None => None,
        };

        let handle = self.register(
            ResourceType::VertexArray,
            Direct3D10Resource::VertexArray(VertexArray {
                vertex_buffers,
                index_buffer,
            }),
        );
        engine_debug!(
            LOG_SOURCE,
            "Vertex array created ({} vertex buffers, indexed: {})",
            desc.vertex_buffers.len(),
            desc.index_buffer.is_some()
        );
        Ok(handle)
    }

    fn create_uniform_buffer(&mut self, desc: &UniformBufferDesc) -> Result<ResourceHandle> {
        if desc.number_of_bytes == 0 {
            engine_bail!(LOG_SOURCE, "Uniform buffer size must not be zero");
        }
        if let Some(data) = &desc.data {
            if data.len() > desc.number_of_bytes as usize {
                engine_bail!(
                    LOG_SOURCE,
                    "Uniform buffer initial data ({} bytes) larger than the buffer ({} bytes)",
                    data.len(),
                    desc.number_of_bytes
                );
            }
        }

        let byte_width = desc.number_of_bytes.div_ceil(CONSTANT_BUFFER_ALIGNMENT) * CONSTANT_BUFFER_ALIGNMENT;
        let buffer = self.create_native_buffer(
            &D3D10BufferDesc {
                byte_width,
                bind_flags: D3D10_BIND_CONSTANT_BUFFER,
            },
            desc.data.as_deref(),
        )?;

        let handle = self.register(
            ResourceType::UniformBuffer,
            Direct3D10Resource::UniformBuffer(UniformBuffer {
                buffer,
                number_of_bytes: desc.number_of_bytes,
            }),
        );
        engine_debug!(LOG_SOURCE, "Uniform buffer created ({} bytes)", desc.number_of_bytes);
        Ok(handle)
    }

    fn create_indirect_buffer(&mut self, data: &[u8]) -> Result<ResourceHandle> {
        if data.is_empty() {
            engine_bail!(LOG_SOURCE, "Indirect buffer data must not be empty");
        }
        let handle = self.register(
            ResourceType::IndirectBuffer,
            Direct3D10Resource::IndirectBuffer(IndirectBuffer { data: data.to_vec() }),
        );
        engine_debug!(LOG_SOURCE, "Indirect buffer created ({} bytes, emulated)", data.len());
        Ok(handle)
    }

    fn create_texture_2d(&mut self, desc: &TextureDesc) -> Result<ResourceHandle> {
        if desc.width == 0 || desc.height == 0 {
            engine_bail!(LOG_SOURCE, "Texture size {}x{} is empty", desc.width, desc.height);
        }
        if desc.number_of_multisamples == 0 {
            engine_bail!(LOG_SOURCE, "Texture multisample count must be at least 1");
        }

        let texture = self
            .device
            .create_texture_2d(&D3D10Texture2DDesc {
                width: desc.width,
                height: desc.height,
                format: Mapping::texture_format(desc.format),
                sample_count: desc.number_of_multisamples,
                bind_flags: Mapping::texture_bind_flags(desc.format),
            })
            .map_err(|error| {
                engine_error!(LOG_SOURCE, "Failed to create texture {:?}: {}", desc, error);
                error
            })?;

        let shader_resource_view = if !desc.format.is_depth() && desc.number_of_multisamples == 1 {
            match self.device.create_shader_resource_view(texture) {
                Ok(view) => Some(view),
                Err(error) => {
                    self.device.release(texture);
                    return Err(engine_err!(LOG_SOURCE, "Failed to create shader resource view: {}", error));
                }
            }
        } else {
            None
        };

        let handle = self.register(
            ResourceType::Texture2D,
            Direct3D10Resource::Texture2D(Texture2D {
                texture,
                format: desc.format,
                width: desc.width,
                height: desc.height,
                number_of_multisamples: desc.number_of_multisamples,
                shader_resource_view,
            }),
        );
        engine_debug!(
            LOG_SOURCE,
            "Texture created ({}x{} {:?}, {} samples)",
            desc.width,
            desc.height,
            desc.format,
            desc.number_of_multisamples
        );
        Ok(handle)
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<ResourceHandle> {
        if desc.color_textures.len() > D3D10_SIMULTANEOUS_RENDER_TARGET_COUNT {
            engine_bail!(
                LOG_SOURCE,
                "{} color textures exceed the {} simultaneous render targets",
                desc.color_textures.len(),
                D3D10_SIMULTANEOUS_RENDER_TARGET_COUNT
            );
        }
        if desc.color_textures.is_empty() && desc.depth_stencil_texture.is_none() {
            engine_bail!(LOG_SOURCE, "Framebuffer needs at least one color or depth-stencil texture");
        }

        // Resolve and check every texture before creating any view
        let mut color_textures = Vec::with_capacity(desc.color_textures.len());
        let mut number_of_multisamples = None;
        for (index, handle) in desc.color_textures.iter().enumerate() {
            let texture = resource::texture_2d(&self.resources, *handle).map_err(|error| {
                engine_error!(LOG_SOURCE, "Framebuffer color texture {}: {}", index, error);
                error
            })?;
            if texture.format.is_depth() {
                engine_bail!(LOG_SOURCE, "Framebuffer color texture {} has depth format {:?}", index, texture.format);
            }
            color_textures.push((texture.texture, Mapping::texture_format(texture.format)));
            number_of_multisamples.get_or_insert(texture.number_of_multisamples);
            if number_of_multisamples != Some(texture.number_of_multisamples) {
                engine_bail!(LOG_SOURCE, "Framebuffer textures must share one multisample count");
            }
        }
        let depth_stencil_texture = match desc.depth_stencil_texture {
            Some(handle) => {
                let texture = resource::texture_2d(&self.resources, handle).map_err(|error| {
                    engine_error!(LOG_SOURCE, "Framebuffer depth-stencil texture: {}", error);
                    error
                })?;
                if !texture.format.is_depth() {
                    engine_bail!(LOG_SOURCE, "Framebuffer depth-stencil texture has color format {:?}", texture.format);
                }
                number_of_multisamples.get_or_insert(texture.number_of_multisamples);
                if number_of_multisamples != Some(texture.number_of_multisamples) {
                    engine_bail!(LOG_SOURCE, "Framebuffer textures must share one multisample count");
                }
                Some(texture.texture)
            }
            None => None,
        };

        let mut color_attachments: Vec<FramebufferColorAttachment> = Vec::with_capacity(color_textures.len());
        for (texture, format) in color_textures {
            match self.device.create_render_target_view(texture) {
                Ok(render_target_view) => color_attachments.push(FramebufferColorAttachment {
                    texture,
                    format,
                    render_target_view,
                }),
                Err(error) => {
                    let created: Vec<NativeObject> =
                        color_attachments.iter().map(|attachment| attachment.render_target_view).collect();
                    self.release_all(&created);
                    return Err(engine_err!(LOG_SOURCE, "Failed to create render target view: {}", error));
                }
            }
        }
        let depth_stencil_view = match depth_stencil_texture {
            Some(texture) => match self.device.create_depth_stencil_view(texture) {
                Ok(view) => Some(view),
                Err(error) => {
                    let created: Vec<NativeObject> =
                        color_attachments.iter().map(|attachment| attachment.render_target_view).collect();
                    self.release_all(&created);
                    return Err(engine_err!(LOG_SOURCE, "Failed to create depth stencil view: {}", error));
                }
            },
            None => None,
        };

        let number_of_color_attachments = color_attachments.len();
        let handle = self.register(
            ResourceType::Framebuffer,
            Direct3D10Resource::Framebuffer(Framebuffer {
                color_attachments,
                depth_stencil_view,
            }),
        );
        engine_debug!(
            LOG_SOURCE,
            "Framebuffer created ({} color attachments, depth-stencil: {})",
            number_of_color_attachments,
            depth_stencil_view.is_some()
        );
        Ok(handle)
    }

    fn destroy_resource(&mut self, handle: ResourceHandle) -> Result<()> {
        let (resource_type, resource) = self.resources.remove(handle).map_err(|error| {
            engine_error!(LOG_SOURCE, "Failed to destroy resource: {}", error);
            error
        })?;
        self.release_all(&resource.native_objects());
        self.statistics.resource_destroyed(resource_type);

        for bound in [
            &mut self.bound_root_signature,
            &mut self.bound_pipeline_state,
            &mut self.bound_vertex_array,
            &mut self.bound_render_target,
        ] {
            if *bound == handle {
                *bound = ResourceHandle::NULL;
            }
        }
        engine_debug!(LOG_SOURCE, "{:?} destroyed", resource_type);
        Ok(())
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer<'_>) {
        let number_of_dispatched_commands = dispatch_command_buffer(command_buffer, &DIRECT3D10_DISPATCH_TABLE, self);
        self.statistics.command_buffer_submitted(number_of_dispatched_commands);

        if self.config.enable_validation && self.debug_event_depth > 0 {
            debug::report_warning(&format!(
                "{} debug event(s) still open at the end of a submitted command buffer",
                self.debug_event_depth
            ));
        }
    }

    fn stats(&self) -> RendererStats {
        self.statistics.snapshot()
    }
}

impl Drop for Direct3D10Renderer {
    fn drop(&mut self) {
        let mut number_of_resources = 0;
        for (_, resource) in self.resources.drain() {
            for object in resource.native_objects() {
                self.device.release(object);
            }
            number_of_resources += 1;
        }
        engine_debug!(
            LOG_SOURCE,
            "Direct3D 10 renderer {} destroyed ({} resources released)",
            self.renderer_id,
            number_of_resources
        );
    }
}

#[cfg(test)]
#[path = "direct3d10_tests.rs"]
mod tests;
