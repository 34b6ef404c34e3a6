/// Mock Renderer for unit tests (no native API required)
///
/// Decodes every dispatched command into a `RecordedCommand`, so tests can check
/// exactly what a backend would have received and in which order.

use crate::engine_bail;
use crate::error::Result;
use crate::renderer::command::{self, EndDebugEvent};
use crate::renderer::{
    dispatch_command_buffer, BackendDispatchTable, ClearFlags, CommandBuffer, CommandPacket, DrawArguments,
    DrawIndexedArguments, FramebufferDesc, PipelineStateDesc, Renderer, RendererStatistics, RendererStats,
    ResourceGroupDesc, ResourceHandle, ResourceRegistry, ResourceType, RootSignatureDesc, ScissorRectangle,
    TextureDesc, UniformBufferDesc, VertexArrayDesc, Viewport, next_renderer_id,
};

// ============================================================================
// Recorded commands
// ============================================================================

/// Decoded form of one dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    /// Marker preceding the commands of a nested buffer
    ExecuteCommandBuffer,
    CopyUniformBufferData { uniform_buffer: ResourceHandle, data: Vec<u8> },
    SetGraphicsRootSignature(ResourceHandle),
    SetPipelineState(ResourceHandle),
    SetGraphicsResourceGroup { root_parameter_index: u32, resource_group: ResourceHandle },
    SetVertexArray(ResourceHandle),
    SetViewports(Vec<Viewport>),
    SetScissorRectangles(Vec<ScissorRectangle>),
    SetRenderTarget(ResourceHandle),
    Clear { flags: ClearFlags, color: [f32; 4], z: f32, stencil: u32 },
    ResolveMultisampleFramebuffer { destination: ResourceHandle, source: ResourceHandle },
    CopyResource { destination: ResourceHandle, source: ResourceHandle },
    Draw(DrawArguments),
    DrawIndirect { indirect_buffer: ResourceHandle, offset: u32, number_of_draws: u32 },
    DrawIndexed(DrawIndexedArguments),
    DrawIndexedIndirect { indirect_buffer: ResourceHandle, offset: u32, number_of_draws: u32 },
    SetDebugMarker(String),
    BeginDebugEvent(String),
    EndDebugEvent,
}

// ============================================================================
// Mock Renderer
// ============================================================================

pub struct MockRenderer {
    renderer_id: u32,
    /// Resource labels, for assertions
    resources: ResourceRegistry<String>,
    statistics: RendererStatistics,
    pub recorded_commands: Vec<RecordedCommand>,
}

impl MockRenderer {
    pub fn new() -> Self {
        let renderer_id = next_renderer_id();
        Self {
            renderer_id,
            resources: ResourceRegistry::new(renderer_id),
            statistics: RendererStatistics::new(),
            recorded_commands: Vec::new(),
        }
    }

    fn create(&mut self, resource_type: ResourceType, label: String) -> ResourceHandle {
        self.statistics.resource_created(resource_type);
        self.resources.insert(resource_type, label)
    }

    /// Label of a live resource
    pub fn label(&self, handle: ResourceHandle) -> Option<&str> {
        self.resources.get_any(handle).ok().map(|(_, label)| label.as_str())
    }

    fn record(&mut self, command: RecordedCommand) {
        self.recorded_commands.push(command);
    }
}

impl Renderer for MockRenderer {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn renderer_id(&self) -> u32 {
        self.renderer_id
    }

    fn create_root_signature(&mut self, desc: &RootSignatureDesc) -> Result<ResourceHandle> {
        Ok(self.create(ResourceType::RootSignature, format!("root_signature({} parameters)", desc.parameters.len())))
    }

    fn create_resource_group(&mut self, desc: &ResourceGroupDesc) -> Result<ResourceHandle> {
        self.resources.get(desc.root_signature, ResourceType::RootSignature)?;
        Ok(self.create(ResourceType::ResourceGroup, format!("resource_group({} resources)", desc.resources.len())))
    }

    fn create_pipeline_state(&mut self, desc: &PipelineStateDesc) -> Result<ResourceHandle> {
        Ok(self.create(ResourceType::PipelineState, format!("pipeline_state({:?})", desc.primitive_topology)))
    }

    fn create_vertex_array(&mut self, desc: &VertexArrayDesc) -> Result<ResourceHandle> {
        Ok(self.create(ResourceType::VertexArray, format!("vertex_array({} buffers)", desc.vertex_buffers.len())))
    }

    fn create_uniform_buffer(&mut self, desc: &UniformBufferDesc) -> Result<ResourceHandle> {
        if desc.number_of_bytes == 0 {
            engine_bail!("rhi::Mock", "Uniform buffer size must not be zero");
        }
        Ok(self.create(ResourceType::UniformBuffer, format!("uniform_buffer({} bytes)", desc.number_of_bytes)))
    }

    fn create_indirect_buffer(&mut self, data: &[u8]) -> Result<ResourceHandle> {
        Ok(self.create(ResourceType::IndirectBuffer, format!("indirect_buffer({} bytes)", data.len())))
    }

    fn create_texture_2d(&mut self, desc: &TextureDesc) -> Result<ResourceHandle> {
        Ok(self.create(ResourceType::Texture2D, format!("texture_2d({}x{})", desc.width, desc.height)))
    }

    fn create_framebuffer(&mut self, desc: &FramebufferDesc) -> Result<ResourceHandle> {
        Ok(self.create(ResourceType::Framebuffer, format!("framebuffer({} colors)", desc.color_textures.len())))
    }

    fn destroy_resource(&mut self, handle: ResourceHandle) -> Result<()> {
        let (resource_type, _) = self.resources.remove(handle)?;
        self.statistics.resource_destroyed(resource_type);
        Ok(())
    }

    fn submit_command_buffer(&mut self, command_buffer: &CommandBuffer<'_>) {
        let number_of_dispatched_commands = dispatch_command_buffer(command_buffer, &MOCK_DISPATCH_TABLE, self);
        self.statistics.command_buffer_submitted(number_of_dispatched_commands);
    }

    fn stats(&self) -> RendererStats {
        self.statistics.snapshot()
    }
}

// ============================================================================
// Dispatch table
// ============================================================================

static MOCK_DISPATCH_TABLE: BackendDispatchTable<MockRenderer> = [
    execute_command_buffer,
    copy_uniform_buffer_data,
    set_graphics_root_signature,
    set_pipeline_state,
    set_graphics_resource_group,
    set_vertex_array,
    set_viewports,
    set_scissor_rectangles,
    set_render_target,
    clear,
    resolve_multisample_framebuffer,
    copy_resource,
    draw,
    draw_indexed,
    set_debug_marker,
    begin_debug_event,
    end_debug_event,
];

fn execute_command_buffer(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    renderer.record(RecordedCommand::ExecuteCommandBuffer);
    if let Some(command_buffer) = command::ExecuteCommandBuffer::command_buffer_to_execute(&packet) {
        dispatch_command_buffer(command_buffer, &MOCK_DISPATCH_TABLE, renderer);
    }
}

fn copy_uniform_buffer_data(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::CopyUniformBufferData>();
    renderer.record(RecordedCommand::CopyUniformBufferData {
        uniform_buffer: command.uniform_buffer,
        data: command::CopyUniformBufferData::data(&packet).to_vec(),
    });
}

fn set_graphics_root_signature(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::SetGraphicsRootSignature>();
    renderer.record(RecordedCommand::SetGraphicsRootSignature(command.root_signature));
}

fn set_pipeline_state(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::SetPipelineState>();
    renderer.record(RecordedCommand::SetPipelineState(command.pipeline_state));
}

fn set_graphics_resource_group(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::SetGraphicsResourceGroup>();
    renderer.record(RecordedCommand::SetGraphicsResourceGroup {
        root_parameter_index: command.root_parameter_index,
        resource_group: command.resource_group,
    });
}

fn set_vertex_array(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::SetVertexArray>();
    renderer.record(RecordedCommand::SetVertexArray(command.vertex_array));
}

fn set_viewports(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let viewports = command::SetViewports::viewports(&packet).to_vec();
    renderer.record(RecordedCommand::SetViewports(viewports));
}

fn set_scissor_rectangles(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let scissor_rectangles = command::SetScissorRectangles::scissor_rectangles(&packet).to_vec();
    renderer.record(RecordedCommand::SetScissorRectangles(scissor_rectangles));
}

fn set_render_target(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::SetRenderTarget>();
    renderer.record(RecordedCommand::SetRenderTarget(command.render_target));
}

fn clear(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::Clear>();
    renderer.record(RecordedCommand::Clear {
        flags: command.clear_flags(),
        color: command.color,
        z: command.z,
        stencil: command.stencil,
    });
}

fn resolve_multisample_framebuffer(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::ResolveMultisampleFramebuffer>();
    renderer.record(RecordedCommand::ResolveMultisampleFramebuffer {
        destination: command.destination_render_target,
        source: command.source_multisample_framebuffer,
    });
}

fn copy_resource(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::CopyResource>();
    renderer.record(RecordedCommand::CopyResource {
        destination: command.destination_resource,
        source: command.source_resource,
    });
}

fn draw(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::Draw>();
    let recorded = match command::Draw::inline_arguments(&packet) {
        Ok(Some(arguments)) => RecordedCommand::Draw(arguments),
        Ok(None) => RecordedCommand::DrawIndirect {
            indirect_buffer: command.indirect_buffer,
            offset: command.indirect_buffer_offset,
            number_of_draws: command.number_of_draws,
        },
        Err(error) => {
            crate::engine_error!("rhi::Mock", "Draw skipped: {}", error);
            return;
        }
    };
    renderer.statistics.draw_call();
    renderer.record(recorded);
}

fn draw_indexed(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::DrawIndexed>();
    let recorded = match command::DrawIndexed::inline_arguments(&packet) {
        Ok(Some(arguments)) => RecordedCommand::DrawIndexed(arguments),
        Ok(None) => RecordedCommand::DrawIndexedIndirect {
            indirect_buffer: command.indirect_buffer,
            offset: command.indirect_buffer_offset,
            number_of_draws: command.number_of_draws,
        },
        Err(error) => {
            crate::engine_error!("rhi::Mock", "DrawIndexed skipped: {}", error);
            return;
        }
    };
    renderer.statistics.draw_call();
    renderer.record(recorded);
}

fn set_debug_marker(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::SetDebugMarker>();
    renderer.record(RecordedCommand::SetDebugMarker(command.name().to_string()));
}

fn begin_debug_event(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let command = packet.command::<command::BeginDebugEvent>();
    renderer.record(RecordedCommand::BeginDebugEvent(command.name().to_string()));
}

fn end_debug_event(packet: CommandPacket<'_>, renderer: &mut MockRenderer) {
    let _: EndDebugEvent = packet.command();
    renderer.record(RecordedCommand::EndDebugEvent);
}

#[cfg(test)]
#[path = "mock_renderer_tests.rs"]
mod tests;
