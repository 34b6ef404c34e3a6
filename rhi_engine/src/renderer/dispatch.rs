/// Backend dispatch: walking a command buffer through a table of handlers
///
/// Each backend owns one `static` table, indexed by `CommandDispatchFunctionIndex`,
/// whose handlers decode the packet payload and drive the native API.

use crate::renderer::{CommandBuffer, CommandDispatchFunctionIndex, CommandPacket};

/// Handler for one command kind of backend `B`
pub type BackendDispatchFunction<B> = fn(CommandPacket<'_>, &mut B);

/// One handler per command kind, in `CommandDispatchFunctionIndex` order
pub type BackendDispatchTable<B> = [BackendDispatchFunction<B>; CommandDispatchFunctionIndex::NUMBER_OF_FUNCTIONS];

/// Invoke the handler of every packet of `command_buffer`, in recording order
///
/// Returns the number of dispatched commands. Packets whose index is outside the
/// table are skipped; `CommandBuffer::add_command` never writes one.
pub fn dispatch_command_buffer<B>(
    command_buffer: &CommandBuffer<'_>,
    table: &BackendDispatchTable<B>,
    backend: &mut B,
) -> u32 {
    let mut number_of_dispatched_commands = 0;
    for packet in command_buffer.packets() {
        if let Some(function) = table.get(packet.command_dispatch_function_index() as usize) {
            function(packet, backend);
            number_of_dispatched_commands += 1;
        }
    }
    number_of_dispatched_commands
}
