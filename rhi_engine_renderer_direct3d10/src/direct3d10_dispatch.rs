/// Direct3D 10 dispatch table - one handler per command kind
///
/// Handlers decode the packet, resolve its resource handles through the renderer's
/// registry and drive the native device. A handler that cannot execute its command
/// (stale handle, unbound state, native limit) reports the failure through
/// `debug::report_error` and skips the command; the rest of the buffer still runs.

use std::mem::size_of;

use rhi_engine::rhi::command::{self, EndDebugEvent};
use rhi_engine::rhi::render::{
    dispatch_command_buffer, BackendDispatchTable, ClearFlags, CommandPacket, DrawArguments, DrawIndexedArguments,
    RendererStatistics, ResourceHandle, ResourceType, ShaderVisibility,
};
use rhi_engine::rhi::{Error, Result};

use crate::debug;
use crate::direct3d10::Direct3D10Renderer;
use crate::direct3d10_device::{
    D3D10Rect, D3D10Viewport, Direct3D10Device, DxgiFormat, D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT,
    D3D10_VIEWPORT_AND_SCISSOR_RECTANGLE_MAX,
};
use crate::direct3d10_mapping::Mapping;
use crate::direct3d10_resource as resource;

/// Color passed to `D3DPERF_SetMarker` / `D3DPERF_BeginEvent`
const DEBUG_EVENT_COLOR: u32 = 0xFFFF_FFFF;

pub(crate) static DIRECT3D10_DISPATCH_TABLE: BackendDispatchTable<Direct3D10Renderer> = [
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

/// Define a table handler around a fallible body, reporting and skipping on failure
macro_rules! checked_handler {
    ($handler:ident, $command:literal, $body:ident) => {
        fn $handler(packet: CommandPacket<'_>, renderer: &mut Direct3D10Renderer) {
            if let Err(error) = $body(&packet, renderer) {
                debug::report_error(&format!("{} skipped: {}", $command, error));
            }
        }
    };
}

fn backend_error(message: impl Into<String>) -> Error {
    Error::BackendError(message.into())
}

// ============================================================================
// Command buffer
// ============================================================================

fn execute_command_buffer(packet: CommandPacket<'_>, renderer: &mut Direct3D10Renderer) {
    match command::ExecuteCommandBuffer::command_buffer_to_execute(&packet) {
        Some(command_buffer) => {
            let number_of_dispatched_commands =
                dispatch_command_buffer(command_buffer, &DIRECT3D10_DISPATCH_TABLE, renderer);
            renderer.statistics.command_buffer_submitted(number_of_dispatched_commands);
        }
        None => debug::report_error("ExecuteCommandBuffer skipped: borrowed command buffer missing"),
    }
}

// ============================================================================
// Resource
// ============================================================================

checked_handler!(copy_uniform_buffer_data, "CopyUniformBufferData", try_copy_uniform_buffer_data);

fn try_copy_uniform_buffer_data(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::CopyUniformBufferData>();
    let data = command::CopyUniformBufferData::data(packet);
    let uniform_buffer = resource::uniform_buffer(&renderer.resources, command.uniform_buffer)?;
    if data.len() > uniform_buffer.number_of_bytes as usize {
        return Err(backend_error(format!(
            "{} bytes do not fit a {} byte uniform buffer",
            data.len(),
            uniform_buffer.number_of_bytes
        )));
    }
    renderer.device.update_subresource(uniform_buffer.buffer, data);
    Ok(())
}

// ============================================================================
// Graphics states
// ============================================================================

checked_handler!(set_graphics_root_signature, "SetGraphicsRootSignature", try_set_graphics_root_signature);

fn try_set_graphics_root_signature(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::SetGraphicsRootSignature>();
    if !command.root_signature.is_null() {
        resource::root_signature(&renderer.resources, command.root_signature)?;
    }
    renderer.bound_root_signature = command.root_signature;
    Ok(())
}

checked_handler!(set_pipeline_state, "SetPipelineState", try_set_pipeline_state);

fn try_set_pipeline_state(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::SetPipelineState>();
    if command.pipeline_state.is_null() {
        renderer.bound_pipeline_state = ResourceHandle::NULL;
        return Ok(());
    }

    let pipeline_state = resource::pipeline_state(&renderer.resources, command.pipeline_state)?;
    if renderer.config.enable_validation
        && !renderer.bound_root_signature.is_null()
        && pipeline_state.root_signature != renderer.bound_root_signature
    {
        debug::report_warning("Pipeline state was created for another root signature than the bound one");
    }
    renderer.device.ia_set_primitive_topology(pipeline_state.primitive_topology);
    renderer.bound_pipeline_state = command.pipeline_state;
    Ok(())
}

checked_handler!(set_graphics_resource_group, "SetGraphicsResourceGroup", try_set_graphics_resource_group);

fn try_set_graphics_resource_group(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::SetGraphicsResourceGroup>();
    if renderer.bound_root_signature.is_null() {
        return Err(backend_error("no graphics root signature bound"));
    }

    let root_signature = resource::root_signature(&renderer.resources, renderer.bound_root_signature)?;
    let parameter = root_signature
        .parameters
        .get(command.root_parameter_index as usize)
        .ok_or_else(|| {
            backend_error(format!(
                "root parameter index {} out of range ({} parameters)",
                command.root_parameter_index,
                root_signature.parameters.len()
            ))
        })?;
    let resource_group = resource::resource_group(&renderer.resources, command.resource_group)?;

    let mut resources = resource_group.resources.iter();
    for range in &parameter.descriptor_ranges {
        for register_offset in 0..range.number_of_descriptors {
            let handle = resources
                .next()
                .ok_or_else(|| backend_error("resource group holds fewer resources than the root parameter"))?;
            let slot = range.base_shader_register + register_offset;
            match range.resource_type {
                ResourceType::UniformBuffer => {
                    let buffer = [resource::uniform_buffer(&renderer.resources, *handle)?.buffer];
                    if matches!(range.shader_visibility, ShaderVisibility::All | ShaderVisibility::Vertex) {
                        renderer.device.vs_set_constant_buffers(slot, &buffer);
                    }
                    if matches!(range.shader_visibility, ShaderVisibility::All | ShaderVisibility::Fragment) {
                        renderer.device.ps_set_constant_buffers(slot, &buffer);
                    }
                }
                ResourceType::Texture2D => {
                    let texture = resource::texture_2d(&renderer.resources, *handle)?;
                    let Some(view) = texture.shader_resource_view else {
                        debug::report_error(&format!(
                            "Texture at register t{} has no shader resource view and was not bound",
                            slot
                        ));
                        continue;
                    };
                    if matches!(range.shader_visibility, ShaderVisibility::All | ShaderVisibility::Vertex) {
                        renderer.device.vs_set_shader_resources(slot, &[view]);
                    }
                    if matches!(range.shader_visibility, ShaderVisibility::All | ShaderVisibility::Fragment) {
                        renderer.device.ps_set_shader_resources(slot, &[view]);
                    }
                }
                other => {
                    debug::report_error(&format!("{:?} descriptor ranges cannot be bound by Direct3D 10", other));
                }
            }
        }
    }
    Ok(())
}

checked_handler!(set_vertex_array, "SetVertexArray", try_set_vertex_array);

fn try_set_vertex_array(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::SetVertexArray>();
    if command.vertex_array.is_null() {
        let unbound = [None; D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT];
        let zeros = [0u32; D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT];
        renderer.device.ia_set_vertex_buffers(0, &unbound, &zeros, &zeros);
        renderer.device.ia_set_index_buffer(None, DxgiFormat::Unknown, 0);
        renderer.bound_vertex_array = ResourceHandle::NULL;
        return Ok(());
    }

    let vertex_array = resource::vertex_array(&renderer.resources, command.vertex_array)?;
    let buffers: Vec<_> = vertex_array.vertex_buffers.iter().map(|vertex_buffer| Some(vertex_buffer.buffer)).collect();
    let strides: Vec<u32> = vertex_array.vertex_buffers.iter().map(|vertex_buffer| vertex_buffer.stride_in_bytes).collect();
    let offsets = vec![0u32; buffers.len()];
    renderer.device.ia_set_vertex_buffers(0, &buffers, &strides, &offsets);
    match &vertex_array.index_buffer {
        Some(index_buffer) => renderer.device.ia_set_index_buffer(Some(index_buffer.buffer), index_buffer.format, 0),
        None => renderer.device.ia_set_index_buffer(None, DxgiFormat::Unknown, 0),
    }
    renderer.bound_vertex_array = command.vertex_array;
    Ok(())
}

checked_handler!(set_viewports, "SetViewports", try_set_viewports);

fn try_set_viewports(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let viewports = command::SetViewports::viewports(packet);
    if viewports.len() > D3D10_VIEWPORT_AND_SCISSOR_RECTANGLE_MAX {
        return Err(backend_error(format!(
            "{} viewports exceed the limit of {}",
            viewports.len(),
            D3D10_VIEWPORT_AND_SCISSOR_RECTANGLE_MAX
        )));
    }
    let native_viewports: Vec<D3D10Viewport> = viewports.iter().map(Mapping::viewport).collect();
    renderer.device.rs_set_viewports(&native_viewports);
    Ok(())
}

checked_handler!(set_scissor_rectangles, "SetScissorRectangles", try_set_scissor_rectangles);

fn try_set_scissor_rectangles(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let scissor_rectangles = command::SetScissorRectangles::scissor_rectangles(packet);
    if scissor_rectangles.len() > D3D10_VIEWPORT_AND_SCISSOR_RECTANGLE_MAX {
        return Err(backend_error(format!(
            "{} scissor rectangles exceed the limit of {}",
            scissor_rectangles.len(),
            D3D10_VIEWPORT_AND_SCISSOR_RECTANGLE_MAX
        )));
    }
    let native_rectangles: Vec<D3D10Rect> = scissor_rectangles.iter().map(Mapping::scissor_rectangle).collect();
    renderer.device.rs_set_scissor_rects(&native_rectangles);
    Ok(())
}

checked_handler!(set_render_target, "SetRenderTarget", try_set_render_target);

fn try_set_render_target(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::SetRenderTarget>();
    if command.render_target.is_null() {
        renderer.device.om_set_render_targets(&[], None);
        renderer.bound_render_target = ResourceHandle::NULL;
        return Ok(());
    }

    let framebuffer = resource::framebuffer(&renderer.resources, command.render_target)?;
    renderer
        .device
        .om_set_render_targets(&framebuffer.render_target_views(), framebuffer.depth_stencil_view);
    renderer.bound_render_target = command.render_target;
    Ok(())
}

// ============================================================================
// Operations
// ============================================================================

checked_handler!(clear, "Clear", try_clear);

fn try_clear(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::Clear>();
    if renderer.bound_render_target.is_null() {
        return Ok(());
    }

    let framebuffer = resource::framebuffer(&renderer.resources, renderer.bound_render_target)?;
    let flags = command.clear_flags();
    if flags.contains(ClearFlags::COLOR) {
        for attachment in &framebuffer.color_attachments {
            renderer.device.clear_render_target_view(attachment.render_target_view, command.color);
        }
    }
    let depth_stencil_flags = Mapping::clear_flags(flags);
    if depth_stencil_flags != 0 {
        if let Some(depth_stencil_view) = framebuffer.depth_stencil_view {
            renderer.device.clear_depth_stencil_view(
                depth_stencil_view,
                depth_stencil_flags,
                command.z,
                Mapping::stencil(command.stencil),
            );
        }
    }
    Ok(())
}

checked_handler!(resolve_multisample_framebuffer, "ResolveMultisampleFramebuffer", try_resolve_multisample_framebuffer);

fn try_resolve_multisample_framebuffer(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::ResolveMultisampleFramebuffer>();
    let source = resource::framebuffer(&renderer.resources, command.source_multisample_framebuffer)?;

    match renderer.resources.resource_type(command.destination_render_target)? {
        ResourceType::Framebuffer => {
            let destination = resource::framebuffer(&renderer.resources, command.destination_render_target)?;
            if destination.color_attachments.len() != source.color_attachments.len() {
                return Err(backend_error(format!(
                    "source has {} color attachments, destination has {}",
                    source.color_attachments.len(),
                    destination.color_attachments.len()
                )));
            }
            for (destination_attachment, source_attachment) in
                destination.color_attachments.iter().zip(&source.color_attachments)
            {
                renderer.device.resolve_subresource(
                    destination_attachment.texture,
                    source_attachment.texture,
                    source_attachment.format,
                );
            }
        }
        ResourceType::Texture2D => {
            let destination = resource::texture_2d(&renderer.resources, command.destination_render_target)?;
            let source_attachment = source
                .color_attachments
                .first()
                .ok_or_else(|| backend_error("source framebuffer has no color attachment"))?;
            renderer
                .device
                .resolve_subresource(destination.texture, source_attachment.texture, source_attachment.format);
        }
        other => {
            return Err(backend_error(format!("{:?} cannot be a resolve destination", other)));
        }
    }
    Ok(())
}

checked_handler!(copy_resource, "CopyResource", try_copy_resource);

fn try_copy_resource(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    let command = packet.command::<command::CopyResource>();
    let destination = resource::texture_2d(&renderer.resources, command.destination_resource)?;
    let source = resource::texture_2d(&renderer.resources, command.source_resource)?;
    if (destination.width, destination.height, destination.format)
        != (source.width, source.height, source.format)
    {
        return Err(backend_error(format!(
            "{}x{} {:?} cannot be copied into {}x{} {:?}",
            source.width, source.height, source.format, destination.width, destination.height, destination.format
        )));
    }
    renderer.device.copy_resource(destination.texture, source.texture);
    Ok(())
}

// ============================================================================
// Draw calls
// ============================================================================

fn issue_draw(device: &mut dyn Direct3D10Device, statistics: &RendererStatistics, arguments: &DrawArguments) {
    if arguments.instance_count != 1 || arguments.start_instance_location > 0 {
        device.draw_instanced(
            arguments.vertex_count_per_instance,
            arguments.instance_count,
            arguments.start_vertex_location,
            arguments.start_instance_location,
        );
    } else {
        device.draw(arguments.vertex_count_per_instance, arguments.start_vertex_location);
    }
    statistics.draw_call();
}

fn issue_draw_indexed(
    device: &mut dyn Direct3D10Device,
    statistics: &RendererStatistics,
    arguments: &DrawIndexedArguments,
) {
    if arguments.instance_count != 1 || arguments.start_instance_location > 0 {
        device.draw_indexed_instanced(
            arguments.index_count_per_instance,
            arguments.instance_count,
            arguments.start_index_location,
            arguments.base_vertex_location,
            arguments.start_instance_location,
        );
    } else {
        device.draw_indexed(
            arguments.index_count_per_instance,
            arguments.start_index_location,
            arguments.base_vertex_location,
        );
    }
    statistics.draw_call();
}

/// `number_of_draws` argument records of type `T` starting at `offset` in `data`
fn indirect_arguments<T: bytemuck::Pod>(data: &[u8], offset: u32, number_of_draws: u32) -> Result<Vec<T>> {
    let record_size = size_of::<T>();
    let start = offset as usize;
    let end = start + record_size * number_of_draws as usize;
    if end > data.len() {
        return Err(backend_error(format!(
            "{} indirect draws at byte offset {} overrun the {} byte indirect buffer",
            number_of_draws,
            offset,
            data.len()
        )));
    }
    Ok(data[start..end]
        .chunks_exact(record_size)
        .map(bytemuck::pod_read_unaligned)
        .collect())
}

checked_handler!(draw, "Draw", try_draw);

fn try_draw(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    if let Some(arguments) = command::Draw::inline_arguments(packet)? {
        issue_draw(&mut *renderer.device, &renderer.statistics, &arguments);
        return Ok(());
    }

    // Emulated indirect draw: replay the CPU copy of the arguments
    let command = packet.command::<command::Draw>();
    let indirect_buffer = resource::indirect_buffer(&renderer.resources, command.indirect_buffer)?;
    let draws: Vec<DrawArguments> = indirect_arguments(
        &indirect_buffer.data,
        command.indirect_buffer_offset,
        command.number_of_draws,
    )?;
    for arguments in &draws {
        issue_draw(&mut *renderer.device, &renderer.statistics, arguments);
    }
    Ok(())
}

checked_handler!(draw_indexed, "DrawIndexed", try_draw_indexed);

fn try_draw_indexed(packet: &CommandPacket<'_>, renderer: &mut Direct3D10Renderer) -> Result<()> {
    if renderer.bound_vertex_array.is_null() {
        return Err(backend_error("no vertex array bound"));
    }
    let vertex_array = resource::vertex_array(&renderer.resources, renderer.bound_vertex_array)?;
    if vertex_array.index_buffer.is_none() {
        return Err(backend_error("the bound vertex array has no index buffer"));
    }

    if let Some(arguments) = command::DrawIndexed::inline_arguments(packet)? {
        issue_draw_indexed(&mut *renderer.device, &renderer.statistics, &arguments);
        return Ok(());
    }

    let command = packet.command::<command::DrawIndexed>();
    let indirect_buffer = resource::indirect_buffer(&renderer.resources, command.indirect_buffer)?;
    let draws: Vec<DrawIndexedArguments> = indirect_arguments(
        &indirect_buffer.data,
        command.indirect_buffer_offset,
        command.number_of_draws,
    )?;
    for arguments in &draws {
        issue_draw_indexed(&mut *renderer.device, &renderer.statistics, arguments);
    }
    Ok(())
}

// ============================================================================
// Debug
// ============================================================================

fn set_debug_marker(packet: CommandPacket<'_>, renderer: &mut Direct3D10Renderer) {
    if renderer.config.enable_debug_markers {
        let command = packet.command::<command::SetDebugMarker>();
        renderer.device.set_marker(DEBUG_EVENT_COLOR, command.name());
    }
}

fn begin_debug_event(packet: CommandPacket<'_>, renderer: &mut Direct3D10Renderer) {
    renderer.debug_event_depth += 1;
    if renderer.config.enable_debug_markers {
        let command = packet.command::<command::BeginDebugEvent>();
        renderer.device.begin_event(DEBUG_EVENT_COLOR, command.name());
    }
}

fn end_debug_event(packet: CommandPacket<'_>, renderer: &mut Direct3D10Renderer) {
    let _: EndDebugEvent = packet.command();
    if renderer.debug_event_depth == 0 {
        if renderer.config.enable_validation {
            debug::report_error("EndDebugEvent without a matching BeginDebugEvent");
        }
        return;
    }
    renderer.debug_event_depth -= 1;
    if renderer.config.enable_debug_markers {
        renderer.device.end_event();
    }
}
