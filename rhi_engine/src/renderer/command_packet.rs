/// Binary layout of one command packet
///
/// ```text
/// offset 0                 next packet byte index (u32, NO_NEXT_COMMAND_PACKET on the tail)
/// offset 4                 command dispatch function index (u32)
/// offset 8                 command payload `T`
/// offset 8 + sizeof(T)     auxiliary bytes (optional, layout known only to the command)
/// ```
///
/// Payload and auxiliary sizes are rounded up to `COMMAND_PACKET_ALIGNMENT`, so every
/// packet and every auxiliary region starts on a 4-byte boundary of the buffer.

use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

use crate::renderer::{Command, CommandBuffer, CommandDispatchFunctionIndex};

/// Next-packet value marking the last packet of a buffer
pub const NO_NEXT_COMMAND_PACKET: u32 = u32::MAX;

/// Alignment of packets and auxiliary regions inside the buffer
pub const COMMAND_PACKET_ALIGNMENT: u32 = 4;

/// Fixed header shared by every packet regardless of payload type
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct CommandPacketHeader {
    pub next_command_packet_byte_index: u32,
    pub command_dispatch_function_index: u32,
}

pub const COMMAND_PACKET_HEADER_SIZE: u32 = size_of::<CommandPacketHeader>() as u32;

const NEXT_COMMAND_PACKET_BYTE_INDEX_OFFSET: usize = 0;
const COMMAND_DISPATCH_FUNCTION_INDEX_OFFSET: usize = 4;

fn align_up(number_of_bytes: u64) -> u64 {
    let alignment = u64::from(COMMAND_PACKET_ALIGNMENT);
    (number_of_bytes + alignment - 1) / alignment * alignment
}

fn read_u32(bytes: &[u8], byte_index: usize) -> u32 {
    bytemuck::pod_read_unaligned(&bytes[byte_index..byte_index + 4])
}

fn write_u32(bytes: &mut [u8], byte_index: usize, value: u32) {
    bytes[byte_index..byte_index + 4].copy_from_slice(bytemuck::bytes_of(&value));
}

/// Stateless layout primitives over a command buffer's bytes
///
/// `packet` arguments are byte indices of a packet's first header byte.
pub struct CommandPacketHelper;

impl CommandPacketHelper {
    /// Total packet size for payload `T` followed by `number_of_auxiliary_bytes`
    ///
    /// # Panics
    ///
    /// Panics if the packet alone could not be addressed with a 32-bit byte index.
    pub fn number_of_bytes<T: Command>(number_of_auxiliary_bytes: u32) -> u32 {
        let number_of_bytes = u64::from(COMMAND_PACKET_HEADER_SIZE)
            + align_up(size_of::<T>() as u64)
            + align_up(u64::from(number_of_auxiliary_bytes));
        assert!(
            number_of_bytes < u64::from(NO_NEXT_COMMAND_PACKET),
            "Command packet of {} bytes exceeds the 32-bit byte index space",
            number_of_bytes
        );
        number_of_bytes as u32
    }

    pub fn next_command_packet_byte_index(bytes: &[u8], packet: u32) -> u32 {
        read_u32(bytes, packet as usize + NEXT_COMMAND_PACKET_BYTE_INDEX_OFFSET)
    }

    pub fn store_next_command_packet_byte_index(bytes: &mut [u8], packet: u32, next_packet: u32) {
        write_u32(bytes, packet as usize + NEXT_COMMAND_PACKET_BYTE_INDEX_OFFSET, next_packet);
    }

    pub fn command_dispatch_function_index(bytes: &[u8], packet: u32) -> u32 {
        read_u32(bytes, packet as usize + COMMAND_DISPATCH_FUNCTION_INDEX_OFFSET)
    }

    pub fn store_command_dispatch_function_index(
        bytes: &mut [u8],
        packet: u32,
        index: CommandDispatchFunctionIndex,
    ) {
        write_u32(bytes, packet as usize + COMMAND_DISPATCH_FUNCTION_INDEX_OFFSET, index as u32);
    }

    /// Byte index of the payload of `packet`
    pub fn command_byte_index(packet: u32) -> u32 {
        packet + COMMAND_PACKET_HEADER_SIZE
    }

    /// Read the payload of `packet` as `T`
    ///
    /// No type check is made: the packet must have been recorded with the same `T`.
    pub fn command<T: Command>(bytes: &[u8], packet: u32) -> T {
        let start = Self::command_byte_index(packet) as usize;
        bytemuck::pod_read_unaligned(&bytes[start..start + size_of::<T>()])
    }

    pub fn store_command<T: Command>(bytes: &mut [u8], packet: u32, command: &T) {
        let start = Self::command_byte_index(packet) as usize;
        bytes[start..start + size_of::<T>()].copy_from_slice(bytemuck::bytes_of(command));
    }

    /// Byte index of the first auxiliary byte following payload `T` of `packet`
    pub fn auxiliary_memory_byte_index<T: Command>(packet: u32) -> u32 {
        Self::command_byte_index(packet) + align_up(size_of::<T>() as u64) as u32
    }
}

/// Read-only cursor on one packet of a recorded command buffer
///
/// Handed to backend dispatch functions; valid for as long as the buffer is borrowed.
#[derive(Clone, Copy)]
pub struct CommandPacket<'p> {
    command_buffer: &'p CommandBuffer<'p>,
    byte_index: u32,
}

impl<'p> CommandPacket<'p> {
    pub(crate) fn new(command_buffer: &'p CommandBuffer<'p>, byte_index: u32) -> Self {
        Self {
            command_buffer,
            byte_index,
        }
    }

    /// Byte index of this packet's header inside the buffer
    pub fn byte_index(&self) -> u32 {
        self.byte_index
    }

    pub fn next_command_packet_byte_index(&self) -> u32 {
        CommandPacketHelper::next_command_packet_byte_index(self.command_buffer.bytes(), self.byte_index)
    }

    pub fn command_dispatch_function_index(&self) -> u32 {
        CommandPacketHelper::command_dispatch_function_index(self.command_buffer.bytes(), self.byte_index)
    }

    /// Decoded payload
    pub fn command<T: Command>(&self) -> T {
        debug_assert_eq!(
            self.command_dispatch_function_index(),
            T::COMMAND_DISPATCH_FUNCTION_INDEX as u32,
            "Command packet read with a mismatching payload type"
        );
        CommandPacketHelper::command(self.command_buffer.bytes(), self.byte_index)
    }

    /// Bytes following payload `T` up to the end of the packet (padding included)
    pub fn auxiliary_memory<T: Command>(&self) -> &'p [u8] {
        let bytes = self.command_buffer.bytes();
        let start = CommandPacketHelper::auxiliary_memory_byte_index::<T>(self.byte_index) as usize;
        let end = match self.next_command_packet_byte_index() {
            NO_NEXT_COMMAND_PACKET => bytes.len(),
            next_packet => next_packet as usize,
        };
        &bytes[start..end]
    }

    /// Command buffer this packet belongs to
    pub fn command_buffer(&self) -> &'p CommandBuffer<'p> {
        self.command_buffer
    }
}

impl std::fmt::Debug for CommandPacket<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPacket")
            .field("byte_index", &self.byte_index)
            .field("command_dispatch_function_index", &self.command_dispatch_function_index())
            .field("next_command_packet_byte_index", &self.next_command_packet_byte_index())
            .finish()
    }
}

#[cfg(test)]
#[path = "command_packet_tests.rs"]
mod tests;
