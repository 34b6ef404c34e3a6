/// Resource handles, resource descriptors and the backend resource registry
///
/// Commands never own the resources they mention. They carry a `ResourceHandle`,
/// a plain-data relation that the backend resolves through its `ResourceRegistry`
/// at dispatch time. Keeping the resource alive until then is the caller's job.

use bytemuck::{Pod, Zeroable};
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use crate::error::{Error, Result};
use crate::renderer::{IndexBufferFormat, PrimitiveTopology, ShaderVisibility, TextureFormat};

// ============================================================================
// Resource types and handles
// ============================================================================

/// Closed set of resource kinds a handle can designate
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    RootSignature = 1,
    ResourceGroup = 2,
    PipelineState = 3,
    VertexArray = 4,
    UniformBuffer = 5,
    IndirectBuffer = 6,
    Texture2D = 7,
    Framebuffer = 8,
}

impl ResourceType {
    /// Number of resource types
    pub const COUNT: usize = 8;

    /// All resource types, in declaration order
    pub const ALL: [ResourceType; Self::COUNT] = [
        ResourceType::RootSignature,
        ResourceType::ResourceGroup,
        ResourceType::PipelineState,
        ResourceType::VertexArray,
        ResourceType::UniformBuffer,
        ResourceType::IndirectBuffer,
        ResourceType::Texture2D,
        ResourceType::Framebuffer,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|resource_type| *resource_type as u32 == value)
    }

    /// Zero-based position, usable as an array index
    pub fn index(self) -> usize {
        self as usize - 1
    }
}

/// Non-owning reference to a resource created by one renderer instance
///
/// All-zero is the null handle (no resource).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct ResourceHandle {
    key: u64,
    renderer_id: u32,
    resource_type: u32,
}

impl ResourceHandle {
    pub const NULL: ResourceHandle = ResourceHandle {
        key: 0,
        renderer_id: 0,
        resource_type: 0,
    };

    pub fn is_null(&self) -> bool {
        self.resource_type == 0
    }

    /// Id of the renderer instance that created the resource
    pub fn renderer_id(&self) -> u32 {
        self.renderer_id
    }

    /// Resource type recorded in the handle, `None` for the null handle
    pub fn resource_type(&self) -> Option<ResourceType> {
        ResourceType::from_u32(self.resource_type)
    }

    pub fn key(&self) -> u64 {
        self.key
    }
}

// ============================================================================
// Resource descriptors
// ============================================================================

/// Contiguous registers of one resource type inside a root parameter
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorRange {
    pub resource_type: ResourceType,
    pub base_shader_register: u32,
    pub number_of_descriptors: u32,
    pub shader_visibility: ShaderVisibility,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootParameter {
    pub descriptor_ranges: Vec<DescriptorRange>,
}

impl RootParameter {
    /// Total number of resources a group bound to this parameter must hold
    pub fn number_of_descriptors(&self) -> u32 {
        self.descriptor_ranges.iter().map(|range| range.number_of_descriptors).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RootSignatureDesc {
    pub parameters: Vec<RootParameter>,
}

/// Resources bound together at one root parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroupDesc {
    pub root_signature: ResourceHandle,
    pub root_parameter_index: u32,
    pub resources: Vec<ResourceHandle>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStateDesc {
    pub root_signature: ResourceHandle,
    pub primitive_topology: PrimitiveTopology,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexBufferDesc {
    pub number_of_bytes: u32,
    pub stride_in_bytes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexBufferDesc {
    pub number_of_bytes: u32,
    pub format: IndexBufferFormat,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexArrayDesc {
    pub vertex_buffers: Vec<VertexBufferDesc>,
    pub index_buffer: Option<IndexBufferDesc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniformBufferDesc {
    pub number_of_bytes: u32,
    /// Initial content, at most `number_of_bytes` long
    pub data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub number_of_multisamples: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FramebufferDesc {
    pub color_textures: Vec<ResourceHandle>,
    pub depth_stencil_texture: Option<ResourceHandle>,
}

// ============================================================================
// Resource registry
// ============================================================================

new_key_type! {
    /// Generational key of a registered resource
    pub struct ResourceKey;
}

struct RegisteredResource<T> {
    resource_type: ResourceType,
    resource: T,
}

/// Backend-owned storage resolving `ResourceHandle`s to backend resources
///
/// Lookups reject null handles, handles minted by another renderer instance,
/// handles of an unexpected type and handles of destroyed resources.
pub struct ResourceRegistry<T> {
    renderer_id: u32,
    resources: SlotMap<ResourceKey, RegisteredResource<T>>,
}

impl<T> ResourceRegistry<T> {
    pub fn new(renderer_id: u32) -> Self {
        Self {
            renderer_id,
            resources: SlotMap::with_key(),
        }
    }

    pub fn renderer_id(&self) -> u32 {
        self.renderer_id
    }

    /// Store a resource and mint its handle
    pub fn insert(&mut self, resource_type: ResourceType, resource: T) -> ResourceHandle {
        let key = self.resources.insert(RegisteredResource {
            resource_type,
            resource,
        });
        ResourceHandle {
            key: key.data().as_ffi(),
            renderer_id: self.renderer_id,
            resource_type: resource_type as u32,
        }
    }

    fn resolve(&self, handle: ResourceHandle) -> Result<ResourceKey> {
        if handle.is_null() {
            return Err(Error::InvalidResource("null resource handle".to_string()));
        }
        if handle.renderer_id != self.renderer_id {
            return Err(Error::InvalidResource(format!(
                "resource was created by renderer {} but used with renderer {}",
                handle.renderer_id, self.renderer_id
            )));
        }
        let key: ResourceKey = KeyData::from_ffi(handle.key).into();
        if !self.resources.contains_key(key) {
            return Err(Error::InvalidResource(format!(
                "{:?} handle refers to a destroyed resource",
                handle.resource_type()
            )));
        }
        Ok(key)
    }

    /// Type of the resource behind `handle`
    pub fn resource_type(&self, handle: ResourceHandle) -> Result<ResourceType> {
        let key = self.resolve(handle)?;
        Ok(self.resources[key].resource_type)
    }

    /// Resolve `handle`, requiring a resource of type `expected`
    pub fn get(&self, handle: ResourceHandle, expected: ResourceType) -> Result<&T> {
        let key = self.resolve(handle)?;
        let registered = &self.resources[key];
        if registered.resource_type != expected {
            return Err(Error::InvalidResource(format!(
                "expected {:?}, got {:?}",
                expected, registered.resource_type
            )));
        }
        Ok(&registered.resource)
    }

    pub fn get_mut(&mut self, handle: ResourceHandle, expected: ResourceType) -> Result<&mut T> {
        let key = self.resolve(handle)?;
        let registered = &mut self.resources[key];
        if registered.resource_type != expected {
            return Err(Error::InvalidResource(format!(
                "expected {:?}, got {:?}",
                expected, registered.resource_type
            )));
        }
        Ok(&mut registered.resource)
    }

    /// Resolve `handle` whatever its type
    pub fn get_any(&self, handle: ResourceHandle) -> Result<(ResourceType, &T)> {
        let key = self.resolve(handle)?;
        let registered = &self.resources[key];
        Ok((registered.resource_type, &registered.resource))
    }

    /// Remove the resource; the handle (and all its copies) become stale
    pub fn remove(&mut self, handle: ResourceHandle) -> Result<(ResourceType, T)> {
        let key = self.resolve(handle)?;
        let registered = self.resources.remove(key)
            .ok_or_else(|| Error::InvalidResource("resource already removed".to_string()))?;
        Ok((registered.resource_type, registered.resource))
    }

    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Drain every resource (used when a renderer shuts down)
    pub fn drain(&mut self) -> impl Iterator<Item = (ResourceType, T)> + '_ {
        self.resources
            .drain()
            .map(|(_, registered)| (registered.resource_type, registered.resource))
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
