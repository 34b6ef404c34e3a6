/// Direct3D 10 device seam
///
/// `Direct3D10Device` lists the `ID3D10Device` (and `D3DPERF_*`) entry points the
/// renderer drives, with plain Rust argument types. Native objects are opaque ids;
/// 0 is never a valid object.

use rhi_engine::rhi::Result;

/// Opaque native object (buffer, texture, view)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeObject(pub u32);

/// `D3D10_VIEWPORT`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct D3D10Viewport {
    pub top_left_x: i32,
    pub top_left_y: i32,
    pub width: u32,
    pub height: u32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// `D3D10_RECT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct D3D10Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// `D3D10_VIEWPORT_AND_SCISSORRECT_OBJECT_COUNT_PER_PIPELINE`
pub const D3D10_VIEWPORT_AND_SCISSOR_RECTANGLE_MAX: usize = 16;

/// `D3D10_IA_VERTEX_INPUT_RESOURCE_SLOT_COUNT`
pub const D3D10_VERTEX_INPUT_RESOURCE_SLOT_COUNT: usize = 16;

/// `D3D10_SIMULTANEOUS_RENDER_TARGET_COUNT`
pub const D3D10_SIMULTANEOUS_RENDER_TARGET_COUNT: usize = 8;

// D3D10_CLEAR_FLAG
pub const D3D10_CLEAR_DEPTH: u32 = 0x1;
pub const D3D10_CLEAR_STENCIL: u32 = 0x2;

// D3D10_BIND_FLAG
pub const D3D10_BIND_VERTEX_BUFFER: u32 = 0x1;
pub const D3D10_BIND_INDEX_BUFFER: u32 = 0x2;
pub const D3D10_BIND_CONSTANT_BUFFER: u32 = 0x4;
pub const D3D10_BIND_SHADER_RESOURCE: u32 = 0x8;
pub const D3D10_BIND_RENDER_TARGET: u32 = 0x20;
pub const D3D10_BIND_DEPTH_STENCIL: u32 = 0x40;

/// `D3D10_PRIMITIVE_TOPOLOGY`
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum D3D10PrimitiveTopology {
    Undefined = 0,
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriangleList = 4,
    TriangleStrip = 5,
}

/// The subset of `DXGI_FORMAT` the renderer uses
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DxgiFormat {
    Unknown = 0,
    R32G32B32A32Float = 2,
    R8G8B8A8Unorm = 28,
    D32Float = 40,
    R32Uint = 42,
    R16Uint = 57,
}

/// `D3D10_BUFFER_DESC` (default usage, no CPU access)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct D3D10BufferDesc {
    pub byte_width: u32,
    pub bind_flags: u32,
}

/// `D3D10_TEXTURE2D_DESC` (one mip, one array slice, default usage)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct D3D10Texture2DDesc {
    pub width: u32,
    pub height: u32,
    pub format: DxgiFormat,
    pub sample_count: u32,
    pub bind_flags: u32,
}

/// Native Direct3D 10 device
///
/// Creation calls can fail (`E_OUTOFMEMORY`, invalid arguments); state and draw calls
/// cannot, as on the real device.
pub trait Direct3D10Device: Send + Sync {
    // ===== Object lifetime =====

    fn create_buffer(&mut self, desc: &D3D10BufferDesc, initial_data: Option<&[u8]>) -> Result<NativeObject>;
    fn create_texture_2d(&mut self, desc: &D3D10Texture2DDesc) -> Result<NativeObject>;
    fn create_shader_resource_view(&mut self, resource: NativeObject) -> Result<NativeObject>;
    fn create_render_target_view(&mut self, resource: NativeObject) -> Result<NativeObject>;
    fn create_depth_stencil_view(&mut self, resource: NativeObject) -> Result<NativeObject>;
    /// `IUnknown::Release` of the last reference
    fn release(&mut self, object: NativeObject);

    // ===== Input assembler =====

    fn ia_set_primitive_topology(&mut self, topology: D3D10PrimitiveTopology);
    fn ia_set_vertex_buffers(&mut self, start_slot: u32, buffers: &[Option<NativeObject>], strides: &[u32], offsets: &[u32]);
    fn ia_set_index_buffer(&mut self, buffer: Option<NativeObject>, format: DxgiFormat, offset: u32);

    // ===== Shader stages =====

    fn vs_set_constant_buffers(&mut self, start_slot: u32, buffers: &[NativeObject]);
    fn ps_set_constant_buffers(&mut self, start_slot: u32, buffers: &[NativeObject]);
    fn vs_set_shader_resources(&mut self, start_slot: u32, views: &[NativeObject]);
    fn ps_set_shader_resources(&mut self, start_slot: u32, views: &[NativeObject]);

    // ===== Rasterizer and output merger =====

    fn rs_set_viewports(&mut self, viewports: &[D3D10Viewport]);
    fn rs_set_scissor_rects(&mut self, rectangles: &[D3D10Rect]);
    fn om_set_render_targets(&mut self, render_target_views: &[NativeObject], depth_stencil_view: Option<NativeObject>);
    fn clear_render_target_view(&mut self, view: NativeObject, color: [f32; 4]);
    fn clear_depth_stencil_view(&mut self, view: NativeObject, clear_flags: u32, depth: f32, stencil: u8);

    // ===== Draws =====

    fn draw(&mut self, vertex_count: u32, start_vertex_location: u32);
    fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    );
    fn draw_indexed(&mut self, index_count: u32, start_index_location: u32, base_vertex_location: i32);
    fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    );

    // ===== Copies =====

    fn update_subresource(&mut self, resource: NativeObject, data: &[u8]);
    fn copy_resource(&mut self, destination: NativeObject, source: NativeObject);
    fn resolve_subresource(&mut self, destination: NativeObject, source: NativeObject, format: DxgiFormat);

    // ===== D3DPERF =====

    fn set_marker(&mut self, color: u32, name: &str);
    /// Returns the event nesting level after the call
    fn begin_event(&mut self, color: u32, name: &str) -> i32;
    /// Returns the event nesting level after the call, -1 without an open event
    fn end_event(&mut self) -> i32;
}
