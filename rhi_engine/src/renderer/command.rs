/// Command payloads recorded into a `CommandBuffer`
///
/// Every command is a plain-old-data struct identified by its entry in the closed
/// `CommandDispatchFunctionIndex` enumeration. Commands are recorded through their
/// `create` factories, which validate arguments, reserve the packet and fill the
/// auxiliary region when the command carries one. Backends decode them back with
/// `CommandPacket::command` and the accessors below.
///
/// Adding a command means adding its enumeration entry and a handler to every backend
/// dispatch table; the table length is `NUMBER_OF_FUNCTIONS`, so a missing handler
/// does not compile.

use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

use crate::error::{Error, Result};
use crate::renderer::{
    BorrowedData, ClearFlags, CommandBuffer, CommandPacket, DrawArguments, DrawIndexedArguments,
    ResourceHandle, ScissorRectangle, Viewport,
};

// ============================================================================
// Dispatch function index
// ============================================================================

/// Position of a command's handler inside a backend dispatch table
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandDispatchFunctionIndex {
    // Command buffer
    ExecuteCommandBuffer = 0,
    // Resource
    CopyUniformBufferData,
    // Graphics
    SetGraphicsRootSignature,
    SetPipelineState,
    SetGraphicsResourceGroup,
    SetVertexArray,
    SetViewports,
    SetScissorRectangles,
    SetRenderTarget,
    Clear,
    ResolveMultisampleFramebuffer,
    CopyResource,
    Draw,
    DrawIndexed,
    // Debug
    SetDebugMarker,
    BeginDebugEvent,
    EndDebugEvent,
}

impl CommandDispatchFunctionIndex {
    /// Length of every backend dispatch table
    pub const NUMBER_OF_FUNCTIONS: usize = 17;

    /// All indices, in table order
    pub const ALL: [CommandDispatchFunctionIndex; Self::NUMBER_OF_FUNCTIONS] = [
        CommandDispatchFunctionIndex::ExecuteCommandBuffer,
        CommandDispatchFunctionIndex::CopyUniformBufferData,
        CommandDispatchFunctionIndex::SetGraphicsRootSignature,
        CommandDispatchFunctionIndex::SetPipelineState,
        CommandDispatchFunctionIndex::SetGraphicsResourceGroup,
        CommandDispatchFunctionIndex::SetVertexArray,
        CommandDispatchFunctionIndex::SetViewports,
        CommandDispatchFunctionIndex::SetScissorRectangles,
        CommandDispatchFunctionIndex::SetRenderTarget,
        CommandDispatchFunctionIndex::Clear,
        CommandDispatchFunctionIndex::ResolveMultisampleFramebuffer,
        CommandDispatchFunctionIndex::CopyResource,
        CommandDispatchFunctionIndex::Draw,
        CommandDispatchFunctionIndex::DrawIndexed,
        CommandDispatchFunctionIndex::SetDebugMarker,
        CommandDispatchFunctionIndex::BeginDebugEvent,
        CommandDispatchFunctionIndex::EndDebugEvent,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }
}

/// A command payload that can be stored in a command packet
pub trait Command: Pod {
    const COMMAND_DISPATCH_FUNCTION_INDEX: CommandDispatchFunctionIndex;
}

/// Where the elements of an array-carrying command live
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStorage {
    /// One element copied into the packet's auxiliary region
    Auxiliary = 0,
    /// Elements in a caller-owned slice registered with the command buffer
    Borrowed = 1,
}

impl PayloadStorage {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(PayloadStorage::Auxiliary),
            1 => Some(PayloadStorage::Borrowed),
            _ => None,
        }
    }
}

/// Number of bytes reserved for an inline debug name, terminating NUL included
pub const DEBUG_NAME_LENGTH: usize = 128;

macro_rules! impl_command {
    ($($command:ident),* $(,)?) => {
        $(
            impl Command for $command {
                const COMMAND_DISPATCH_FUNCTION_INDEX: CommandDispatchFunctionIndex =
                    CommandDispatchFunctionIndex::$command;
            }
        )*
    };
}

impl_command!(
    ExecuteCommandBuffer,
    CopyUniformBufferData,
    SetGraphicsRootSignature,
    SetPipelineState,
    SetGraphicsResourceGroup,
    SetVertexArray,
    SetViewports,
    SetScissorRectangles,
    SetRenderTarget,
    Clear,
    ResolveMultisampleFramebuffer,
    CopyResource,
    Draw,
    DrawIndexed,
    SetDebugMarker,
    BeginDebugEvent,
    EndDebugEvent,
);

/// Read a `T` from the start of an auxiliary region
fn read_auxiliary<T: Pod>(auxiliary_memory: &[u8]) -> Option<T> {
    auxiliary_memory
        .get(..size_of::<T>())
        .map(bytemuck::pod_read_unaligned)
}

/// Decode the inline arguments of a draw packet according to its storage tag
fn inline_draw_arguments<C: Command, T: Pod>(packet: &CommandPacket<'_>, storage: u32) -> Result<Option<T>> {
    match PayloadStorage::from_u32(storage) {
        Some(PayloadStorage::Auxiliary) => read_auxiliary(packet.auxiliary_memory::<C>())
            .map(Some)
            .ok_or_else(|| Error::BackendError("inline draw arguments are truncated".to_string())),
        Some(PayloadStorage::Borrowed) => Ok(None),
        None => Err(Error::BackendError(format!("unknown payload storage tag {}", storage))),
    }
}

// ============================================================================
// Command buffer
// ============================================================================

/// Execute another command buffer at this point of the stream
///
/// The nested buffer is borrowed, not copied: it must outlive the recording buffer
/// and cannot be modified while referenced.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ExecuteCommandBuffer {
    pub borrowed_index: u32,
}

impl ExecuteCommandBuffer {
    /// # Panics
    ///
    /// Panics if `command_buffer_to_execute` is empty.
    pub fn create<'a>(command_buffer: &mut CommandBuffer<'a>, command_buffer_to_execute: &'a CommandBuffer<'a>) {
        assert!(
            !command_buffer_to_execute.is_empty(),
            "Executing an empty command buffer is not allowed"
        );
        let borrowed_index = command_buffer.add_borrowed(BorrowedData::CommandBuffer(command_buffer_to_execute));
        command_buffer.add_command(&Self { borrowed_index }, 0);
    }

    /// Nested command buffer referenced by `packet`
    pub fn command_buffer_to_execute<'p>(packet: &CommandPacket<'p>) -> Option<&'p CommandBuffer<'p>> {
        let command = packet.command::<Self>();
        match packet.command_buffer().borrowed(command.borrowed_index) {
            Some(BorrowedData::CommandBuffer(command_buffer)) => Some(command_buffer),
            _ => None,
        }
    }
}

// ============================================================================
// Resource
// ============================================================================

/// Upload bytes into a uniform buffer
///
/// The bytes are copied into the packet, the caller's data can be reused immediately.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CopyUniformBufferData {
    pub uniform_buffer: ResourceHandle,
    pub number_of_bytes: u32,
    _reserved: u32,
}

impl CopyUniformBufferData {
    /// # Panics
    ///
    /// Panics if `uniform_buffer` is null or `data` is empty.
    pub fn create(command_buffer: &mut CommandBuffer<'_>, uniform_buffer: ResourceHandle, data: &[u8]) {
        assert!(!uniform_buffer.is_null(), "Uniform buffer handle must not be null");
        assert!(!data.is_empty(), "Uniform buffer data must not be empty");
        let number_of_bytes = u32::try_from(data.len())
            .unwrap_or_else(|_| panic!("Uniform buffer data of {} bytes is too large", data.len()));

        let command = Self {
            uniform_buffer,
            number_of_bytes,
            _reserved: 0,
        };
        command_buffer
            .add_command(&command, number_of_bytes)
            .copy_from_slice(data);
    }

    /// Bytes to upload, read from the auxiliary region of `packet`
    pub fn data<'p>(packet: &CommandPacket<'p>) -> &'p [u8] {
        let command = packet.command::<Self>();
        &packet.auxiliary_memory::<Self>()[..command.number_of_bytes as usize]
    }
}

// ============================================================================
// Graphics
// ============================================================================

/// Bind a root signature, null clears the binding
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsRootSignature {
    pub root_signature: ResourceHandle,
}

impl SetGraphicsRootSignature {
    pub fn create(command_buffer: &mut CommandBuffer<'_>, root_signature: ResourceHandle) {
        command_buffer.add_command(&Self { root_signature }, 0);
    }
}

/// Bind a pipeline state, null clears the binding
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetPipelineState {
    pub pipeline_state: ResourceHandle,
}

impl SetPipelineState {
    pub fn create(command_buffer: &mut CommandBuffer<'_>, pipeline_state: ResourceHandle) {
        command_buffer.add_command(&Self { pipeline_state }, 0);
    }
}

/// Bind a resource group to one parameter of the bound root signature
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetGraphicsResourceGroup {
    pub resource_group: ResourceHandle,
    pub root_parameter_index: u32,
    _reserved: u32,
}

impl SetGraphicsResourceGroup {
    /// # Panics
    ///
    /// Panics if `resource_group` is null.
    pub fn create(command_buffer: &mut CommandBuffer<'_>, root_parameter_index: u32, resource_group: ResourceHandle) {
        assert!(!resource_group.is_null(), "Resource group handle must not be null");
        let command = Self {
            resource_group,
            root_parameter_index,
            _reserved: 0,
        };
        command_buffer.add_command(&command, 0);
    }
}

/// Bind vertex and index buffers, null unbinds them
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetVertexArray {
    pub vertex_array: ResourceHandle,
}

impl SetVertexArray {
    pub fn create(command_buffer: &mut CommandBuffer<'_>, vertex_array: ResourceHandle) {
        command_buffer.add_command(&Self { vertex_array }, 0);
    }
}

/// Set the rasterizer viewports
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetViewports {
    pub number_of_viewports: u32,
    /// `PayloadStorage` value
    pub storage: u32,
    /// Index of the borrowed slice, meaningless for auxiliary storage
    pub borrowed_index: u32,
}

impl SetViewports {
    /// Set `viewports`, borrowed until the buffer is cleared or dropped
    ///
    /// # Panics
    ///
    /// Panics if `viewports` is empty.
    pub fn create<'a>(command_buffer: &mut CommandBuffer<'a>, viewports: &'a [Viewport]) {
        assert!(!viewports.is_empty(), "At least one viewport is required");
        let borrowed_index = command_buffer.add_borrowed(BorrowedData::Viewports(viewports));
        let command = Self {
            number_of_viewports: viewports.len() as u32,
            storage: PayloadStorage::Borrowed as u32,
            borrowed_index,
        };
        command_buffer.add_command(&command, 0);
    }

    /// Set one viewport with the full depth range
    pub fn create_single(
        command_buffer: &mut CommandBuffer<'_>,
        top_left_x: u32,
        top_left_y: u32,
        width: u32,
        height: u32,
    ) {
        Self::create_inline(
            command_buffer,
            Viewport::new(top_left_x as f32, top_left_y as f32, width as f32, height as f32),
        );
    }

    /// Set one viewport, copied into the packet
    pub fn create_inline(command_buffer: &mut CommandBuffer<'_>, viewport: Viewport) {
        let command = Self {
            number_of_viewports: 1,
            storage: PayloadStorage::Auxiliary as u32,
            borrowed_index: 0,
        };
        command_buffer
            .add_command(&command, size_of::<Viewport>() as u32)
            .copy_from_slice(bytemuck::bytes_of(&viewport));
    }

    /// Viewports of `packet`, wherever they are stored
    pub fn viewports<'p>(packet: &CommandPacket<'p>) -> &'p [Viewport] {
        let command = packet.command::<Self>();
        match PayloadStorage::from_u32(command.storage) {
            Some(PayloadStorage::Auxiliary) => {
                let number_of_bytes = command.number_of_viewports as usize * size_of::<Viewport>();
                bytemuck::cast_slice(&packet.auxiliary_memory::<Self>()[..number_of_bytes])
            }
            Some(PayloadStorage::Borrowed) => match packet.command_buffer().borrowed(command.borrowed_index) {
                Some(BorrowedData::Viewports(viewports)) => viewports,
                _ => &[],
            },
            None => &[],
        }
    }
}

/// Set the rasterizer scissor rectangles
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetScissorRectangles {
    pub number_of_scissor_rectangles: u32,
    /// `PayloadStorage` value
    pub storage: u32,
    pub borrowed_index: u32,
}

impl SetScissorRectangles {
    /// Set `scissor_rectangles`, borrowed until the buffer is cleared or dropped
    ///
    /// # Panics
    ///
    /// Panics if `scissor_rectangles` is empty.
    pub fn create<'a>(command_buffer: &mut CommandBuffer<'a>, scissor_rectangles: &'a [ScissorRectangle]) {
        assert!(!scissor_rectangles.is_empty(), "At least one scissor rectangle is required");
        let borrowed_index = command_buffer.add_borrowed(BorrowedData::ScissorRectangles(scissor_rectangles));
        let command = Self {
            number_of_scissor_rectangles: scissor_rectangles.len() as u32,
            storage: PayloadStorage::Borrowed as u32,
            borrowed_index,
        };
        command_buffer.add_command(&command, 0);
    }

    pub fn create_single(
        command_buffer: &mut CommandBuffer<'_>,
        top_left_x: i32,
        top_left_y: i32,
        bottom_right_x: i32,
        bottom_right_y: i32,
    ) {
        Self::create_inline(
            command_buffer,
            ScissorRectangle {
                top_left_x,
                top_left_y,
                bottom_right_x,
                bottom_right_y,
            },
        );
    }

    pub fn create_inline(command_buffer: &mut CommandBuffer<'_>, scissor_rectangle: ScissorRectangle) {
        let command = Self {
            number_of_scissor_rectangles: 1,
            storage: PayloadStorage::Auxiliary as u32,
            borrowed_index: 0,
        };
        command_buffer
            .add_command(&command, size_of::<ScissorRectangle>() as u32)
            .copy_from_slice(bytemuck::bytes_of(&scissor_rectangle));
    }

    pub fn scissor_rectangles<'p>(packet: &CommandPacket<'p>) -> &'p [ScissorRectangle] {
        let command = packet.command::<Self>();
        match PayloadStorage::from_u32(command.storage) {
            Some(PayloadStorage::Auxiliary) => {
                let number_of_bytes =
                    command.number_of_scissor_rectangles as usize * size_of::<ScissorRectangle>();
                bytemuck::cast_slice(&packet.auxiliary_memory::<Self>()[..number_of_bytes])
            }
            Some(PayloadStorage::Borrowed) => match packet.command_buffer().borrowed(command.borrowed_index) {
                Some(BorrowedData::ScissorRectangles(scissor_rectangles)) => scissor_rectangles,
                _ => &[],
            },
            None => &[],
        }
    }
}

/// Bind a render target, null unbinds it
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetRenderTarget {
    pub render_target: ResourceHandle,
}

impl SetRenderTarget {
    pub fn create(command_buffer: &mut CommandBuffer<'_>, render_target: ResourceHandle) {
        command_buffer.add_command(&Self { render_target }, 0);
    }
}

/// Clear the bound render target
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Clear {
    /// `ClearFlags` bits
    pub flags: u32,
    pub color: [f32; 4],
    pub z: f32,
    pub stencil: u32,
}

impl Clear {
    /// `color` accepts an RGBA array or a `glam::Vec4`
    pub fn create(
        command_buffer: &mut CommandBuffer<'_>,
        flags: ClearFlags,
        color: impl Into<[f32; 4]>,
        z: f32,
        stencil: u32,
    ) {
        let command = Self {
            flags: flags.bits(),
            color: color.into(),
            z,
            stencil,
        };
        command_buffer.add_command(&command, 0);
    }

    /// Flags with unknown bits dropped
    pub fn clear_flags(&self) -> ClearFlags {
        ClearFlags::from_bits_truncate(self.flags)
    }
}

/// Resolve a multisample framebuffer into a single-sample render target
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ResolveMultisampleFramebuffer {
    pub destination_render_target: ResourceHandle,
    pub source_multisample_framebuffer: ResourceHandle,
}

impl ResolveMultisampleFramebuffer {
    /// # Panics
    ///
    /// Panics if either handle is null.
    pub fn create(
        command_buffer: &mut CommandBuffer<'_>,
        destination_render_target: ResourceHandle,
        source_multisample_framebuffer: ResourceHandle,
    ) {
        assert!(!destination_render_target.is_null(), "Destination render target must not be null");
        assert!(!source_multisample_framebuffer.is_null(), "Source multisample framebuffer must not be null");
        let command = Self {
            destination_render_target,
            source_multisample_framebuffer,
        };
        command_buffer.add_command(&command, 0);
    }
}

/// Copy the whole content of a resource into another of the same kind
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CopyResource {
    pub destination_resource: ResourceHandle,
    pub source_resource: ResourceHandle,
}

impl CopyResource {
    /// # Panics
    ///
    /// Panics if either handle is null.
    pub fn create(command_buffer: &mut CommandBuffer<'_>, destination_resource: ResourceHandle, source_resource: ResourceHandle) {
        assert!(!destination_resource.is_null(), "Destination resource must not be null");
        assert!(!source_resource.is_null(), "Source resource must not be null");
        let command = Self {
            destination_resource,
            source_resource,
        };
        command_buffer.add_command(&command, 0);
    }
}

/// Non-indexed draw, with inline arguments or read from an indirect buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Draw {
    /// Null when the arguments are inline
    pub indirect_buffer: ResourceHandle,
    pub indirect_buffer_offset: u32,
    pub number_of_draws: u32,
    /// `PayloadStorage` value, `Auxiliary` for inline arguments
    pub storage: u32,
    _reserved: u32,
}

impl Draw {
    /// One draw with inline arguments
    pub fn create(
        command_buffer: &mut CommandBuffer<'_>,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    ) {
        let command = Self {
            indirect_buffer: ResourceHandle::NULL,
            indirect_buffer_offset: 0,
            number_of_draws: 1,
            storage: PayloadStorage::Auxiliary as u32,
            _reserved: 0,
        };
        let arguments = DrawArguments {
            vertex_count_per_instance,
            instance_count,
            start_vertex_location,
            start_instance_location,
        };
        command_buffer
            .add_command(&command, size_of::<DrawArguments>() as u32)
            .copy_from_slice(bytemuck::bytes_of(&arguments));
    }

    /// `number_of_draws` consecutive `DrawArguments` read from `indirect_buffer` at dispatch time
    ///
    /// # Panics
    ///
    /// Panics if `indirect_buffer` is null or `number_of_draws` is zero.
    pub fn create_indirect(
        command_buffer: &mut CommandBuffer<'_>,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        assert!(!indirect_buffer.is_null(), "Indirect buffer must not be null");
        assert!(number_of_draws > 0, "At least one draw is required");
        let command = Self {
            indirect_buffer,
            indirect_buffer_offset,
            number_of_draws,
            storage: PayloadStorage::Borrowed as u32,
            _reserved: 0,
        };
        command_buffer.add_command(&command, 0);
    }

    /// Inline arguments of `packet`, `None` for an indirect draw
    ///
    /// The storage tag alone selects the source; the indirect handle is not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown storage tag or a truncated auxiliary region.
    pub fn inline_arguments(packet: &CommandPacket<'_>) -> Result<Option<DrawArguments>> {
        inline_draw_arguments::<Self, DrawArguments>(packet, packet.command::<Self>().storage)
    }
}

/// Indexed draw, with inline arguments or read from an indirect buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexed {
    pub indirect_buffer: ResourceHandle,
    pub indirect_buffer_offset: u32,
    pub number_of_draws: u32,
    pub storage: u32,
    _reserved: u32,
}

impl DrawIndexed {
    pub fn create(
        command_buffer: &mut CommandBuffer<'_>,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    ) {
        let command = Self {
            indirect_buffer: ResourceHandle::NULL,
            indirect_buffer_offset: 0,
            number_of_draws: 1,
            storage: PayloadStorage::Auxiliary as u32,
            _reserved: 0,
        };
        let arguments = DrawIndexedArguments {
            index_count_per_instance,
            instance_count,
            start_index_location,
            base_vertex_location,
            start_instance_location,
        };
        command_buffer
            .add_command(&command, size_of::<DrawIndexedArguments>() as u32)
            .copy_from_slice(bytemuck::bytes_of(&arguments));
    }

    /// # Panics
    ///
    /// Panics if `indirect_buffer` is null or `number_of_draws` is zero.
    pub fn create_indirect(
        command_buffer: &mut CommandBuffer<'_>,
        indirect_buffer: ResourceHandle,
        indirect_buffer_offset: u32,
        number_of_draws: u32,
    ) {
        assert!(!indirect_buffer.is_null(), "Indirect buffer must not be null");
        assert!(number_of_draws > 0, "At least one draw is required");
        let command = Self {
            indirect_buffer,
            indirect_buffer_offset,
            number_of_draws,
            storage: PayloadStorage::Borrowed as u32,
            _reserved: 0,
        };
        command_buffer.add_command(&command, 0);
    }

    pub fn inline_arguments(packet: &CommandPacket<'_>) -> Result<Option<DrawIndexedArguments>> {
        inline_draw_arguments::<Self, DrawIndexedArguments>(packet, packet.command::<Self>().storage)
    }
}

// ============================================================================
// Debug
// ============================================================================

/// Copy `name` into a fixed name buffer, cut at a char boundary and NUL terminated
pub fn store_debug_name(name: &str) -> [u8; DEBUG_NAME_LENGTH] {
    let mut end = name.len().min(DEBUG_NAME_LENGTH - 1);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let mut buffer = [0u8; DEBUG_NAME_LENGTH];
    buffer[..end].copy_from_slice(&name.as_bytes()[..end]);
    buffer
}

/// Text of a fixed name buffer, up to the first NUL
pub fn debug_name(buffer: &[u8; DEBUG_NAME_LENGTH]) -> &str {
    let length = buffer.iter().position(|byte| *byte == 0).unwrap_or(DEBUG_NAME_LENGTH);
    match std::str::from_utf8(&buffer[..length]) {
        Ok(name) => name,
        // Only reachable for a name buffer not written by store_debug_name
        Err(error) => std::str::from_utf8(&buffer[..error.valid_up_to()]).unwrap_or_default(),
    }
}

/// Insert a single named marker in the native debugger timeline
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct SetDebugMarker {
    pub name: [u8; DEBUG_NAME_LENGTH],
}

impl SetDebugMarker {
    /// Names of 128 bytes or more are a programming error; release builds truncate them.
    pub fn create(command_buffer: &mut CommandBuffer<'_>, name: &str) {
        debug_assert!(
            name.len() < DEBUG_NAME_LENGTH,
            "Debug marker name '{}' exceeds {} bytes",
            name,
            DEBUG_NAME_LENGTH - 1
        );
        command_buffer.add_command(&Self { name: store_debug_name(name) }, 0);
    }

    pub fn name(&self) -> &str {
        debug_name(&self.name)
    }
}

/// Open a named event scope, closed by `EndDebugEvent`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BeginDebugEvent {
    pub name: [u8; DEBUG_NAME_LENGTH],
}

impl BeginDebugEvent {
    pub fn create(command_buffer: &mut CommandBuffer<'_>, name: &str) {
        debug_assert!(
            name.len() < DEBUG_NAME_LENGTH,
            "Debug event name '{}' exceeds {} bytes",
            name,
            DEBUG_NAME_LENGTH - 1
        );
        command_buffer.add_command(&Self { name: store_debug_name(name) }, 0);
    }

    pub fn name(&self) -> &str {
        debug_name(&self.name)
    }
}

/// Close the innermost open debug event
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct EndDebugEvent {
    _reserved: u32,
}

impl EndDebugEvent {
    pub fn create(command_buffer: &mut CommandBuffer<'_>) {
        command_buffer.add_command(&Self::default(), 0);
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
