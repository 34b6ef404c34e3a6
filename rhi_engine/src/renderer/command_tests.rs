/// Unit tests for command payloads, factories and decoders

use super::*;
use crate::renderer::{
    ClearFlags, CommandBuffer, CommandPacket, ResourceHandle, ResourceRegistry, ResourceType, ScissorRectangle,
    Viewport,
};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn handle(resource_type: ResourceType) -> ResourceHandle {
    let mut registry = ResourceRegistry::new(1);
    registry.insert(resource_type, ())
}

fn first_packet<'p>(command_buffer: &'p CommandBuffer<'p>) -> CommandPacket<'p> {
    command_buffer.packets().next().unwrap()
}

// ============================================================================
// Dispatch function index
// ============================================================================

#[test]
fn test_dispatch_function_indices_are_dense() {
    assert_eq!(CommandDispatchFunctionIndex::ALL.len(), CommandDispatchFunctionIndex::NUMBER_OF_FUNCTIONS);
    for (position, index) in CommandDispatchFunctionIndex::ALL.iter().enumerate() {
        assert_eq!(*index as usize, position);
        assert_eq!(CommandDispatchFunctionIndex::from_u32(position as u32), Some(*index));
    }
    assert_eq!(CommandDispatchFunctionIndex::from_u32(17), None);
}

#[test]
fn test_commands_declare_matching_indices() {
    assert_eq!(ExecuteCommandBuffer::COMMAND_DISPATCH_FUNCTION_INDEX as u32, 0);
    assert_eq!(CopyUniformBufferData::COMMAND_DISPATCH_FUNCTION_INDEX as u32, 1);
    assert_eq!(SetViewports::COMMAND_DISPATCH_FUNCTION_INDEX, CommandDispatchFunctionIndex::SetViewports);
    assert_eq!(Clear::COMMAND_DISPATCH_FUNCTION_INDEX, CommandDispatchFunctionIndex::Clear);
    assert_eq!(Draw::COMMAND_DISPATCH_FUNCTION_INDEX, CommandDispatchFunctionIndex::Draw);
    assert_eq!(EndDebugEvent::COMMAND_DISPATCH_FUNCTION_INDEX as u32, 16);
}

#[test]
fn test_payload_storage_from_u32() {
    assert_eq!(PayloadStorage::from_u32(0), Some(PayloadStorage::Auxiliary));
    assert_eq!(PayloadStorage::from_u32(1), Some(PayloadStorage::Borrowed));
    assert_eq!(PayloadStorage::from_u32(2), None);
}

// ============================================================================
// Viewports and scissor rectangles
// ============================================================================

#[test]
fn test_single_viewport_is_stored_inline() {
    let mut command_buffer = CommandBuffer::new();
    SetViewports::create_single(&mut command_buffer, 10, 20, 100, 50);

    let packet = first_packet(&command_buffer);
    let command = packet.command::<SetViewports>();
    assert_eq!(command.number_of_viewports, 1);
    assert_eq!(command.storage, PayloadStorage::Auxiliary as u32);
    assert_eq!(SetViewports::viewports(&packet), &[Viewport::new(10.0, 20.0, 100.0, 50.0)]);
    assert_eq!(SetViewports::viewports(&packet)[0].max_depth, 1.0);
}

#[test]
fn test_borrowed_viewports_are_not_copied() {
    let viewports = [
        Viewport::new(0.0, 0.0, 640.0, 480.0),
        Viewport::new(640.0, 0.0, 640.0, 480.0),
    ];
    let mut command_buffer = CommandBuffer::new();
    SetViewports::create(&mut command_buffer, &viewports);

    // Header + payload, no auxiliary memory
    assert_eq!(command_buffer.number_of_bytes(), 8 + 12);
    let packet = first_packet(&command_buffer);
    assert_eq!(packet.command::<SetViewports>().storage, PayloadStorage::Borrowed as u32);
    let decoded = SetViewports::viewports(&packet);
    assert_eq!(decoded, &viewports);
    assert!(std::ptr::eq(decoded.as_ptr(), viewports.as_ptr()));
}

#[test]
#[should_panic(expected = "At least one viewport is required")]
fn test_empty_viewport_slice_panics() {
    let viewports: [Viewport; 0] = [];
    let mut command_buffer = CommandBuffer::new();
    SetViewports::create(&mut command_buffer, &viewports);
}

#[test]
fn test_scissor_rectangles_inline_and_borrowed() {
    let rectangles = [ScissorRectangle {
        top_left_x: 1,
        top_left_y: 2,
        bottom_right_x: 3,
        bottom_right_y: 4,
    }];
    let mut command_buffer = CommandBuffer::new();
    SetScissorRectangles::create_single(&mut command_buffer, -5, -6, 70, 80);
    SetScissorRectangles::create(&mut command_buffer, &rectangles);

    let packets: Vec<_> = command_buffer.packets().collect();
    assert_eq!(
        SetScissorRectangles::scissor_rectangles(&packets[0]),
        &[ScissorRectangle {
            top_left_x: -5,
            top_left_y: -6,
            bottom_right_x: 70,
            bottom_right_y: 80,
        }]
    );
    assert_eq!(SetScissorRectangles::scissor_rectangles(&packets[1]), &rectangles);
}

// ============================================================================
// Clear
// ============================================================================

#[test]
fn test_clear_payload() {
    let mut command_buffer = CommandBuffer::new();
    Clear::create(&mut command_buffer, ClearFlags::COLOR_DEPTH, glam::Vec4::new(0.1, 0.2, 0.3, 1.0), 1.0, 0);

    let command = first_packet(&command_buffer).command::<Clear>();
    assert_eq!(command.clear_flags(), ClearFlags::COLOR | ClearFlags::DEPTH);
    assert_eq!(command.color, [0.1, 0.2, 0.3, 1.0]);
    assert_eq!(command.z, 1.0);
}

#[test]
fn test_clear_flags_drop_unknown_bits() {
    let command = Clear {
        flags: 0xF0 | ClearFlags::STENCIL.bits(),
        color: [0.0; 4],
        z: 0.0,
        stencil: 0,
    };
    assert_eq!(command.clear_flags(), ClearFlags::STENCIL);
}

// ============================================================================
// Resource commands
// ============================================================================

#[test]
fn test_copy_uniform_buffer_data_copies_bytes() {
    let uniform_buffer = handle(ResourceType::UniformBuffer);
    let mut data = vec![1u8, 2, 3];
    let mut command_buffer = CommandBuffer::new();
    CopyUniformBufferData::create(&mut command_buffer, uniform_buffer, &data);
    data[0] = 42;

    let packet = first_packet(&command_buffer);
    assert_eq!(packet.command::<CopyUniformBufferData>().uniform_buffer, uniform_buffer);
    assert_eq!(CopyUniformBufferData::data(&packet), &[1, 2, 3]);
}

#[test]
#[should_panic(expected = "Uniform buffer handle must not be null")]
fn test_copy_uniform_buffer_data_null_handle_panics() {
    let mut command_buffer = CommandBuffer::new();
    CopyUniformBufferData::create(&mut command_buffer, ResourceHandle::NULL, &[1]);
}

#[test]
#[should_panic(expected = "Uniform buffer data must not be empty")]
fn test_copy_uniform_buffer_data_empty_data_panics() {
    let mut command_buffer = CommandBuffer::new();
    CopyUniformBufferData::create(&mut command_buffer, handle(ResourceType::UniformBuffer), &[]);
}

#[test]
#[should_panic(expected = "Source resource must not be null")]
fn test_copy_resource_null_source_panics() {
    let mut command_buffer = CommandBuffer::new();
    CopyResource::create(&mut command_buffer, handle(ResourceType::Texture2D), ResourceHandle::NULL);
}

#[test]
#[should_panic(expected = "Destination render target must not be null")]
fn test_resolve_null_destination_panics() {
    let mut command_buffer = CommandBuffer::new();
    ResolveMultisampleFramebuffer::create(&mut command_buffer, ResourceHandle::NULL, handle(ResourceType::Framebuffer));
}

#[test]
fn test_null_handles_allowed_for_unbinding() {
    let mut command_buffer = CommandBuffer::new();
    SetRenderTarget::create(&mut command_buffer, ResourceHandle::NULL);
    SetVertexArray::create(&mut command_buffer, ResourceHandle::NULL);
    SetPipelineState::create(&mut command_buffer, ResourceHandle::NULL);
    SetGraphicsRootSignature::create(&mut command_buffer, ResourceHandle::NULL);

    let packets: Vec<_> = command_buffer.packets().collect();
    assert!(packets[0].command::<SetRenderTarget>().render_target.is_null());
    assert!(packets[1].command::<SetVertexArray>().vertex_array.is_null());
    assert!(packets[2].command::<SetPipelineState>().pipeline_state.is_null());
    assert!(packets[3].command::<SetGraphicsRootSignature>().root_signature.is_null());
    assert_eq!(command_buffer.packets().count(), 4);
}

// ============================================================================
// Draws
// ============================================================================

#[test]
fn test_draw_inline_arguments() {
    let mut command_buffer = CommandBuffer::new();
    Draw::create(&mut command_buffer, 3, 1, 0, 0);

    let packet = first_packet(&command_buffer);
    let command = packet.command::<Draw>();
    assert!(command.indirect_buffer.is_null());
    assert_eq!(command.number_of_draws, 1);
    assert_eq!(
        Draw::inline_arguments(&packet),
        Ok(Some(DrawArguments {
            vertex_count_per_instance: 3,
            instance_count: 1,
            start_vertex_location: 0,
            start_instance_location: 0,
        }))
    );
}

#[test]
fn test_draw_indirect_has_no_inline_arguments() {
    let indirect_buffer = handle(ResourceType::IndirectBuffer);
    let mut command_buffer = CommandBuffer::new();
    Draw::create_indirect(&mut command_buffer, indirect_buffer, 16, 2);

    let packet = first_packet(&command_buffer);
    let command = packet.command::<Draw>();
    assert_eq!(command.indirect_buffer, indirect_buffer);
    assert_eq!(command.indirect_buffer_offset, 16);
    assert_eq!(command.number_of_draws, 2);
    assert_eq!(Draw::inline_arguments(&packet), Ok(None));
}

#[test]
fn test_draw_storage_tag_selects_inline_arguments() {
    // Auxiliary tag next to a non-null indirect handle: the tag wins
    let indirect_buffer = handle(ResourceType::IndirectBuffer);
    let command = Draw {
        indirect_buffer,
        indirect_buffer_offset: 0,
        number_of_draws: 1,
        storage: PayloadStorage::Auxiliary as u32,
        _reserved: 0,
    };
    let arguments = DrawArguments {
        vertex_count_per_instance: 3,
        instance_count: 1,
        start_vertex_location: 0,
        start_instance_location: 0,
    };
    let mut command_buffer = CommandBuffer::new();
    command_buffer
        .add_command(&command, size_of::<DrawArguments>() as u32)
        .copy_from_slice(bytemuck::bytes_of(&arguments));

    assert_eq!(Draw::inline_arguments(&first_packet(&command_buffer)), Ok(Some(arguments)));
}

#[test]
fn test_draw_indexed_borrowed_tag_ignores_auxiliary_memory() {
    // Borrowed tag with a null handle and inline bytes present: still indirect
    let command = DrawIndexed {
        indirect_buffer: ResourceHandle::NULL,
        indirect_buffer_offset: 0,
        number_of_draws: 1,
        storage: PayloadStorage::Borrowed as u32,
        _reserved: 0,
    };
    let arguments = DrawIndexedArguments {
        index_count_per_instance: 6,
        instance_count: 1,
        start_index_location: 0,
        base_vertex_location: 0,
        start_instance_location: 0,
    };
    let mut command_buffer = CommandBuffer::new();
    command_buffer
        .add_command(&command, size_of::<DrawIndexedArguments>() as u32)
        .copy_from_slice(bytemuck::bytes_of(&arguments));

    assert_eq!(DrawIndexed::inline_arguments(&first_packet(&command_buffer)), Ok(None));
}

#[test]
fn test_draw_unknown_storage_tag_is_an_error() {
    let command = Draw {
        indirect_buffer: ResourceHandle::NULL,
        indirect_buffer_offset: 0,
        number_of_draws: 1,
        storage: 7,
        _reserved: 0,
    };
    let mut command_buffer = CommandBuffer::new();
    command_buffer.add_command(&command, size_of::<DrawArguments>() as u32);

    let result = Draw::inline_arguments(&first_packet(&command_buffer));
    assert!(matches!(result, Err(crate::error::Error::BackendError(ref message)) if message.contains("7")));
}

#[test]
fn test_draw_truncated_inline_arguments_is_an_error() {
    let command = Draw {
        indirect_buffer: ResourceHandle::NULL,
        indirect_buffer_offset: 0,
        number_of_draws: 1,
        storage: PayloadStorage::Auxiliary as u32,
        _reserved: 0,
    };
    let mut command_buffer = CommandBuffer::new();
    command_buffer.add_command(&command, 0);

    assert!(Draw::inline_arguments(&first_packet(&command_buffer)).is_err());
}

#[test]
#[should_panic(expected = "At least one draw is required")]
fn test_draw_indirect_zero_draws_panics() {
    let mut command_buffer = CommandBuffer::new();
    Draw::create_indirect(&mut command_buffer, handle(ResourceType::IndirectBuffer), 0, 0);
}

#[test]
fn test_draw_indexed_negative_base_vertex() {
    let mut command_buffer = CommandBuffer::new();
    DrawIndexed::create(&mut command_buffer, 36, 2, 6, -4, 1);

    let arguments = DrawIndexed::inline_arguments(&first_packet(&command_buffer)).unwrap().unwrap();
    assert_eq!(arguments.index_count_per_instance, 36);
    assert_eq!(arguments.instance_count, 2);
    assert_eq!(arguments.start_index_location, 6);
    assert_eq!(arguments.base_vertex_location, -4);
    assert_eq!(arguments.start_instance_location, 1);
}

#[test]
#[should_panic(expected = "Indirect buffer must not be null")]
fn test_draw_indexed_indirect_null_buffer_panics() {
    let mut command_buffer = CommandBuffer::new();
    DrawIndexed::create_indirect(&mut command_buffer, ResourceHandle::NULL, 0, 1);
}

// ============================================================================
// Debug markers and events
// ============================================================================

#[test]
fn test_debug_names_round_trip() {
    let mut command_buffer = CommandBuffer::new();
    SetDebugMarker::create(&mut command_buffer, "Shadow map");
    BeginDebugEvent::create(&mut command_buffer, "Opaque pass");
    EndDebugEvent::create(&mut command_buffer);

    let packets: Vec<_> = command_buffer.packets().collect();
    assert_eq!(packets[0].command::<SetDebugMarker>().name(), "Shadow map");
    assert_eq!(packets[1].command::<BeginDebugEvent>().name(), "Opaque pass");
    // Reserved word, no auxiliary region
    assert_eq!(packets[2].auxiliary_memory::<EndDebugEvent>().len(), 0);
}

#[test]
fn test_store_debug_name_truncates_and_terminates() {
    let name = "x".repeat(200);
    let buffer = store_debug_name(&name);
    assert_eq!(buffer[DEBUG_NAME_LENGTH - 1], 0);
    assert_eq!(debug_name(&buffer).len(), DEBUG_NAME_LENGTH - 1);
}

#[test]
fn test_store_debug_name_cuts_on_char_boundary() {
    // 126 ASCII bytes then a 2-byte character that would straddle the limit
    let name = format!("{}é", "a".repeat(126));
    let buffer = store_debug_name(&name);
    assert_eq!(debug_name(&buffer), "a".repeat(126));

    let name = format!("{}é", "a".repeat(125));
    assert_eq!(debug_name(&store_debug_name(&name)), name);
}

#[test]
fn test_debug_name_stops_at_invalid_utf8() {
    let mut buffer = [0u8; DEBUG_NAME_LENGTH];
    buffer[..4].copy_from_slice(&[b'o', b'k', 0xFF, b'!']);
    assert_eq!(debug_name(&buffer), "ok");
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "exceeds 127 bytes")]
fn test_long_debug_marker_name_panics_in_debug_builds() {
    let mut command_buffer = CommandBuffer::new();
    SetDebugMarker::create(&mut command_buffer, &"m".repeat(DEBUG_NAME_LENGTH));
}
