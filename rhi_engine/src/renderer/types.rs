/// Plain data types shared by commands, descriptors and backends

use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

/// Viewport in render-target pixels with a depth range
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Viewport covering `width` x `height` at (`top_left_x`, `top_left_y`) with depth range [0, 1]
    pub fn new(top_left_x: f32, top_left_y: f32, width: f32, height: f32) -> Self {
        Self {
            top_left_x,
            top_left_y,
            width,
            height,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Scissor rectangle, bottom-right exclusive
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ScissorRectangle {
    pub top_left_x: i32,
    pub top_left_y: i32,
    pub bottom_right_x: i32,
    pub bottom_right_y: i32,
}

/// Arguments of one non-indexed draw, laid out like an indirect buffer record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawArguments {
    pub vertex_count_per_instance: u32,
    pub instance_count: u32,
    pub start_vertex_location: u32,
    pub start_instance_location: u32,
}

/// Arguments of one indexed draw, laid out like an indirect buffer record
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedArguments {
    pub index_count_per_instance: u32,
    pub instance_count: u32,
    pub start_index_location: u32,
    pub base_vertex_location: i32,
    pub start_instance_location: u32,
}

bitflags! {
    /// Which attachments a clear command touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const COLOR_DEPTH = Self::COLOR.bits() | Self::DEPTH.bits();
    }
}

/// Primitive topology used by a pipeline state
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriangleList = 4,
    TriangleStrip = 5,
}

/// Texture formats understood by every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8G8B8A8Unorm,
    R32G32B32A32Float,
    D32Float,
}

impl TextureFormat {
    /// Whether textures of this format are used as depth-stencil attachments
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::D32Float)
    }
}

/// Index element format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexBufferFormat {
    UnsignedShort,
    UnsignedInt,
}

impl IndexBufferFormat {
    pub fn number_of_bytes_per_element(self) -> u32 {
        match self {
            IndexBufferFormat::UnsignedShort => 2,
            IndexBufferFormat::UnsignedInt => 4,
        }
    }
}

/// Shader stages a root parameter is visible to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderVisibility {
    All,
    Vertex,
    Fragment,
}
