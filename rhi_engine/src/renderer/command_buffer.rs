/// CommandBuffer - contiguous, backend-agnostic command recording
///
/// Commands are packed one after the other in a single growable allocation and
/// chained through the next-packet index stored in each packet header. Recording
/// once and submitting many times is supported; `clear` keeps the allocation so
/// a buffer re-recorded every frame stops allocating after warm-up.

use std::fmt;

use crate::renderer::{
    Command, CommandPacket, CommandPacketHelper, Renderer, ScissorRectangle, Viewport,
    COMMAND_PACKET_ALIGNMENT, NO_NEXT_COMMAND_PACKET,
};

/// Bytes added to the allocation on growth, on top of the packet being added
pub const COMMAND_BUFFER_GROWTH_INCREMENT: u32 = 8192;

/// Data a command refers to without copying it into the buffer
///
/// The `'a` lifetime makes the buffer borrow it until the buffer is cleared or dropped.
#[derive(Debug, Clone, Copy)]
pub enum BorrowedData<'a> {
    CommandBuffer(&'a CommandBuffer<'a>),
    Viewports(&'a [Viewport]),
    ScissorRectangles(&'a [ScissorRectangle]),
}

/// Growable buffer of command packets
///
/// Single writer: commands are only appended at the end. Submitting reads the
/// buffer and never mutates it.
pub struct CommandBuffer<'a> {
    /// Backing allocation, kept as words so packet starts are 4-byte aligned
    storage: Vec<u32>,
    /// Byte index where the next packet will be written
    current_byte_index: u32,
    /// Byte index of the last packet, NO_NEXT_COMMAND_PACKET while empty
    previous_byte_index: u32,
    /// Data referenced by commands instead of being copied
    borrowed: Vec<BorrowedData<'a>>,
    #[cfg(feature = "statistics")]
    number_of_commands: u32,
}

impl<'a> CommandBuffer<'a> {
    /// Create an empty command buffer (no allocation is made until the first command)
    pub fn new() -> Self {
        Self {
            storage: Vec::new(),
            current_byte_index: 0,
            previous_byte_index: NO_NEXT_COMMAND_PACKET,
            borrowed: Vec::new(),
            #[cfg(feature = "statistics")]
            number_of_commands: 0,
        }
    }

    /// True if no command was added since creation or the last `clear`
    pub fn is_empty(&self) -> bool {
        self.previous_byte_index == NO_NEXT_COMMAND_PACKET
    }

    /// Forget all recorded commands, keeping the allocation
    ///
    /// Old bytes are not zeroed; nothing references them anymore.
    pub fn clear(&mut self) {
        self.current_byte_index = 0;
        self.previous_byte_index = NO_NEXT_COMMAND_PACKET;
        self.borrowed.clear();
        #[cfg(feature = "statistics")]
        {
            self.number_of_commands = 0;
        }
    }

    /// Number of recorded bytes
    pub fn number_of_bytes(&self) -> u32 {
        self.current_byte_index
    }

    /// Size of the backing allocation in bytes
    pub fn capacity(&self) -> u32 {
        (self.storage.len() * COMMAND_PACKET_ALIGNMENT as usize) as u32
    }

    /// Number of commands recorded since creation or the last `clear`
    #[cfg(feature = "statistics")]
    pub fn number_of_commands(&self) -> u32 {
        self.number_of_commands
    }

    /// Recorded bytes
    pub fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u32, u8>(&self.storage)[..self.current_byte_index as usize]
    }

    /// Append command `command` followed by `number_of_auxiliary_bytes` auxiliary bytes
    ///
    /// Returns the auxiliary region, for the caller to fill. The borrow ends before
    /// another command can be added, which may move the whole allocation.
    ///
    /// # Panics
    ///
    /// Panics if the buffer would grow past the 32-bit byte index space.
    pub fn add_command<T: Command>(&mut self, command: &T, number_of_auxiliary_bytes: u32) -> &mut [u8] {
        let number_of_command_bytes = CommandPacketHelper::number_of_bytes::<T>(number_of_auxiliary_bytes);
        let next_byte_index = u64::from(self.current_byte_index) + u64::from(number_of_command_bytes);
        assert!(
            next_byte_index < u64::from(NO_NEXT_COMMAND_PACKET),
            "Command buffer would exceed the 32-bit byte index space"
        );
        let next_byte_index = next_byte_index as u32;

        if self.capacity() < next_byte_index {
            self.grow(number_of_command_bytes);
        }

        let packet = self.current_byte_index;
        let previous_packet = self.previous_byte_index;
        let storage = bytemuck::cast_slice_mut::<u32, u8>(&mut self.storage);

        // Link the previous tail to the new packet
        if previous_packet != NO_NEXT_COMMAND_PACKET {
            CommandPacketHelper::store_next_command_packet_byte_index(storage, previous_packet, packet);
        }
        CommandPacketHelper::store_next_command_packet_byte_index(storage, packet, NO_NEXT_COMMAND_PACKET);
        CommandPacketHelper::store_command_dispatch_function_index(
            storage,
            packet,
            T::COMMAND_DISPATCH_FUNCTION_INDEX,
        );
        CommandPacketHelper::store_command(storage, packet, command);

        self.previous_byte_index = packet;
        self.current_byte_index = next_byte_index;
        #[cfg(feature = "statistics")]
        {
            self.number_of_commands += 1;
        }

        let auxiliary_start = CommandPacketHelper::auxiliary_memory_byte_index::<T>(packet) as usize;
        let storage = bytemuck::cast_slice_mut::<u32, u8>(&mut self.storage);
        &mut storage[auxiliary_start..auxiliary_start + number_of_auxiliary_bytes as usize]
    }

    /// Grow to old capacity + increment + the packet about to be written
    fn grow(&mut self, number_of_command_bytes: u32) {
        let alignment = u64::from(COMMAND_PACKET_ALIGNMENT);
        let new_capacity = (u64::from(self.capacity())
            + u64::from(COMMAND_BUFFER_GROWTH_INCREMENT)
            + u64::from(number_of_command_bytes))
            .min(u64::from(NO_NEXT_COMMAND_PACKET) / alignment * alignment);
        let new_number_of_words = (new_capacity / alignment) as usize;
        let number_of_used_words = (self.current_byte_index / COMMAND_PACKET_ALIGNMENT) as usize;

        let mut storage = Vec::with_capacity(new_number_of_words);
        storage.extend_from_slice(&self.storage[..number_of_used_words]);
        storage.resize(new_number_of_words, 0);
        self.storage = storage;
    }

    /// Keep `data` referenced by this buffer and return its index
    pub(crate) fn add_borrowed(&mut self, data: BorrowedData<'a>) -> u32 {
        let index = self.borrowed.len() as u32;
        self.borrowed.push(data);
        index
    }

    /// Data referenced by a command through its borrowed index
    pub fn borrowed(&self, index: u32) -> Option<BorrowedData<'a>> {
        self.borrowed.get(index as usize).copied()
    }

    /// Packets in recording order
    pub fn packets(&self) -> CommandPackets<'_> {
        CommandPackets {
            command_buffer: self,
            next_byte_index: if self.is_empty() { NO_NEXT_COMMAND_PACKET } else { 0 },
        }
    }

    /// Dispatch the recorded commands to `renderer`, keeping them for later submissions
    pub fn submit<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.submit_command_buffer(self);
    }

    /// Dispatch the recorded commands to `renderer`, then clear the buffer
    pub fn submit_and_clear<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        renderer.submit_command_buffer(self);
        self.clear();
    }
}

impl Default for CommandBuffer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("number_of_bytes", &self.current_byte_index)
            .field("capacity", &self.capacity())
            .field("number_of_borrowed", &self.borrowed.len())
            .finish()
    }
}

/// Iterator walking the packet chain of a command buffer
pub struct CommandPackets<'p> {
    command_buffer: &'p CommandBuffer<'p>,
    next_byte_index: u32,
}

impl<'p> Iterator for CommandPackets<'p> {
    type Item = CommandPacket<'p>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_byte_index == NO_NEXT_COMMAND_PACKET {
            return None;
        }
        let packet = CommandPacket::new(self.command_buffer, self.next_byte_index);
        self.next_byte_index = packet.next_command_packet_byte_index();
        Some(packet)
    }
}

#[cfg(test)]
#[path = "command_buffer_tests.rs"]
mod tests;
