/// Direct3D 10 mapping - engine enums and structs to their native counterparts

use rhi_engine::rhi::render::{
    ClearFlags, IndexBufferFormat, PrimitiveTopology, ScissorRectangle, TextureFormat, Viewport,
};

use crate::direct3d10_device::{
    D3D10PrimitiveTopology, D3D10Rect, D3D10Viewport, DxgiFormat, D3D10_BIND_DEPTH_STENCIL,
    D3D10_BIND_RENDER_TARGET, D3D10_BIND_SHADER_RESOURCE, D3D10_CLEAR_DEPTH, D3D10_CLEAR_STENCIL,
};

pub struct Mapping;

impl Mapping {
    /// `D3D10_VIEWPORT` holds integer pixels: positions and sizes are truncated
    pub fn viewport(viewport: &Viewport) -> D3D10Viewport {
        D3D10Viewport {
            top_left_x: viewport.top_left_x as i32,
            top_left_y: viewport.top_left_y as i32,
            width: viewport.width as u32,
            height: viewport.height as u32,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        }
    }

    pub fn scissor_rectangle(scissor_rectangle: &ScissorRectangle) -> D3D10Rect {
        D3D10Rect {
            left: scissor_rectangle.top_left_x,
            top: scissor_rectangle.top_left_y,
            right: scissor_rectangle.bottom_right_x,
            bottom: scissor_rectangle.bottom_right_y,
        }
    }

    /// Depth-stencil part of the clear flags, `ClearFlags::COLOR` has no native flag
    pub fn clear_flags(flags: ClearFlags) -> u32 {
        let mut native_flags = 0;
        if flags.contains(ClearFlags::DEPTH) {
            native_flags |= D3D10_CLEAR_DEPTH;
        }
        if flags.contains(ClearFlags::STENCIL) {
            native_flags |= D3D10_CLEAR_STENCIL;
        }
        native_flags
    }

    pub fn primitive_topology(primitive_topology: PrimitiveTopology) -> D3D10PrimitiveTopology {
        match primitive_topology {
            PrimitiveTopology::PointList => D3D10PrimitiveTopology::PointList,
            PrimitiveTopology::LineList => D3D10PrimitiveTopology::LineList,
            PrimitiveTopology::LineStrip => D3D10PrimitiveTopology::LineStrip,
            PrimitiveTopology::TriangleList => D3D10PrimitiveTopology::TriangleList,
            PrimitiveTopology::TriangleStrip => D3D10PrimitiveTopology::TriangleStrip,
        }
    }

    pub fn texture_format(texture_format: TextureFormat) -> DxgiFormat {
        match texture_format {
            TextureFormat::R8G8B8A8Unorm => DxgiFormat::R8G8B8A8Unorm,
            TextureFormat::R32G32B32A32Float => DxgiFormat::R32G32B32A32Float,
            TextureFormat::D32Float => DxgiFormat::D32Float,
        }
    }

    pub fn index_buffer_format(index_buffer_format: IndexBufferFormat) -> DxgiFormat {
        match index_buffer_format {
            IndexBufferFormat::UnsignedShort => DxgiFormat::R16Uint,
            IndexBufferFormat::UnsignedInt => DxgiFormat::R32Uint,
        }
    }

    /// Color textures are render targets sampled by shaders, depth textures are depth-stencil only
    pub fn texture_bind_flags(texture_format: TextureFormat) -> u32 {
        if texture_format.is_depth() {
            D3D10_BIND_DEPTH_STENCIL
        } else {
            D3D10_BIND_RENDER_TARGET | D3D10_BIND_SHADER_RESOURCE
        }
    }

    /// `ClearDepthStencilView` takes an 8-bit stencil value; larger values saturate at 255
    pub fn stencil(stencil: u32) -> u8 {
        stencil.min(u32::from(u8::MAX)) as u8
    }
}

#[cfg(test)]
#[path = "direct3d10_mapping_tests.rs"]
mod tests;
