/// Renderer statistics - lock-free counters shared by backends
///
/// Counters are plain relaxed atomics: they are read for display, never used to
/// synchronize anything.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::renderer::ResourceType;

/// Snapshot of a renderer's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererStats {
    /// Live resources, indexed by `ResourceType::index`
    pub number_of_resources: [u32; ResourceType::COUNT],
    /// Native draw calls issued since the last frame reset
    pub number_of_draw_calls: u32,
    /// Commands dispatched since the last frame reset
    pub number_of_dispatched_commands: u32,
    /// Command buffers submitted since the last frame reset
    pub number_of_submitted_command_buffers: u32,
}

impl RendererStats {
    pub fn number_of_resources_of_type(&self, resource_type: ResourceType) -> u32 {
        self.number_of_resources[resource_type.index()]
    }

    pub fn total_number_of_resources(&self) -> u32 {
        self.number_of_resources.iter().sum()
    }
}

/// Thread-safe counters owned by one renderer instance
#[derive(Debug)]
pub struct RendererStatistics {
    number_of_resources: [AtomicU32; ResourceType::COUNT],
    number_of_draw_calls: AtomicU32,
    number_of_dispatched_commands: AtomicU32,
    number_of_submitted_command_buffers: AtomicU32,
}

impl RendererStatistics {
    pub fn new() -> Self {
        Self {
            number_of_resources: std::array::from_fn(|_| AtomicU32::new(0)),
            number_of_draw_calls: AtomicU32::new(0),
            number_of_dispatched_commands: AtomicU32::new(0),
            number_of_submitted_command_buffers: AtomicU32::new(0),
        }
    }

    pub fn resource_created(&self, resource_type: ResourceType) {
        self.number_of_resources[resource_type.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn resource_destroyed(&self, resource_type: ResourceType) {
        let _ = self.number_of_resources[resource_type.index()].fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |count| count.checked_sub(1),
        );
    }

    pub fn draw_call(&self) {
        self.number_of_draw_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Account for one submitted command buffer and its dispatched commands
    pub fn command_buffer_submitted(&self, number_of_dispatched_commands: u32) {
        self.number_of_submitted_command_buffers.fetch_add(1, Ordering::Relaxed);
        self.number_of_dispatched_commands
            .fetch_add(number_of_dispatched_commands, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RendererStats {
        RendererStats {
            number_of_resources: std::array::from_fn(|index| {
                self.number_of_resources[index].load(Ordering::Relaxed)
            }),
            number_of_draw_calls: self.number_of_draw_calls.load(Ordering::Relaxed),
            number_of_dispatched_commands: self.number_of_dispatched_commands.load(Ordering::Relaxed),
            number_of_submitted_command_buffers: self
                .number_of_submitted_command_buffers
                .load(Ordering::Relaxed),
        }
    }

    /// Zero the per-frame counters, live resource counts are kept
    pub fn reset_frame_counters(&self) {
        self.number_of_draw_calls.store(0, Ordering::Relaxed);
        self.number_of_dispatched_commands.store(0, Ordering::Relaxed);
        self.number_of_submitted_command_buffers.store(0, Ordering::Relaxed);
    }
}

impl Default for RendererStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "statistics_tests.rs"]
mod tests;
