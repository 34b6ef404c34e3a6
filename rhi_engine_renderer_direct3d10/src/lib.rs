/*!
# RHI Engine - Direct3D 10 Renderer Backend

Direct3D 10 implementation of the RHI engine `Renderer` trait.

Command buffers are executed through a static dispatch table whose handlers drive
a `Direct3D10Device`. The device trait mirrors the `ID3D10Device` entry points the
backend needs; `RecordingDevice` implements it headlessly by logging every native
call, which is what tests and the demo run on.
*/

// Direct3D 10 implementation modules
mod direct3d10;
mod direct3d10_dispatch;
mod direct3d10_device;
mod direct3d10_mapping;
mod direct3d10_recording_device;
mod direct3d10_resource;
mod debug;

pub use direct3d10::Direct3D10Renderer;
pub use direct3d10_device::{
    D3D10BufferDesc, D3D10PrimitiveTopology, D3D10Rect, D3D10Texture2DDesc, D3D10Viewport, Direct3D10Device,
    DxgiFormat, NativeObject, D3D10_BIND_CONSTANT_BUFFER, D3D10_BIND_DEPTH_STENCIL, D3D10_BIND_INDEX_BUFFER,
    D3D10_BIND_RENDER_TARGET, D3D10_BIND_SHADER_RESOURCE, D3D10_BIND_VERTEX_BUFFER, D3D10_CLEAR_DEPTH,
    D3D10_CLEAR_STENCIL, D3D10_SIMULTANEOUS_RENDER_TARGET_COUNT, D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT,
    D3D10_VIEWPORT_AND_SCISSOR_RECTANGLE_MAX,
};
pub use direct3d10_mapping::Mapping;
pub use direct3d10_recording_device::{NativeCall, NativeCallLog, NativeObjectInfo, RecordingDevice};

// Re-export debug utilities
pub use debug::{get_validation_stats, print_validation_stats_report, reset_validation_stats, ValidationStats};
