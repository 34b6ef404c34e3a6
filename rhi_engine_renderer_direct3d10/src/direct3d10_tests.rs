//! Unit tests for Direct3D10Renderer resource management

use super::*;
use crate::direct3d10_device::{DxgiFormat, D3D10_BIND_CONSTANT_BUFFER};
use crate::direct3d10_recording_device::{NativeCall, NativeCallLog};
use rhi_engine::rhi::command::SetRenderTarget;
use rhi_engine::rhi::render::{
    IndexBufferDesc, IndexBufferFormat, PrimitiveTopology, RootParameter, ShaderVisibility, TextureFormat,
    VertexBufferDesc,
};
use rhi_engine::rhi::Error;

fn create_renderer() -> (Direct3D10Renderer, NativeCallLog) {
    let log = NativeCallLog::new();
    let renderer = Direct3D10Renderer::with_device(
        RendererConfig::default(),
        RecordingDevice::with_log(log.clone()),
    )
    .unwrap();
    (renderer, log)
}

fn texture_desc(format: TextureFormat, number_of_multisamples: u32) -> TextureDesc {
    TextureDesc {
        width: 8,
        height: 8,
        format,
        number_of_multisamples,
    }
}

fn range(resource_type: ResourceType, base_shader_register: u32, number_of_descriptors: u32) -> DescriptorRange {
    DescriptorRange {
        resource_type,
        base_shader_register,
        number_of_descriptors,
        shader_visibility: ShaderVisibility::All,
    }
}

fn uniform_buffer_desc(number_of_bytes: u32) -> UniformBufferDesc {
    UniformBufferDesc {
        number_of_bytes,
        data: None,
    }
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_renderer_identity() {
    let (renderer, _log) = create_renderer();
    let (other, _other_log) = create_renderer();

    assert_eq!(renderer.name(), "Direct3D10");
    assert_ne!(renderer.renderer_id(), 0);
    assert_ne!(renderer.renderer_id(), other.renderer_id());
    assert!(renderer.bound_render_target().is_null());
}

#[test]
fn test_uniform_buffer_size_rounded_to_constant_buffer_alignment() {
    let (mut renderer, log) = create_renderer();
    renderer.create_uniform_buffer(&uniform_buffer_desc(20)).unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        NativeCall::CreateBuffer { desc, .. } => {
            assert_eq!(desc.byte_width, 32);
            assert_eq!(desc.bind_flags, D3D10_BIND_CONSTANT_BUFFER);
        }
        other => panic!("unexpected call {:?}", other),
    }
}

#[test]
fn test_uniform_buffer_rejects_bad_sizes() {
    let (mut renderer, log) = create_renderer();

    assert!(renderer.create_uniform_buffer(&uniform_buffer_desc(0)).is_err());
    let oversized = UniformBufferDesc {
        number_of_bytes: 4,
        data: Some(vec![0u8; 8]),
    };
    assert!(renderer.create_uniform_buffer(&oversized).is_err());
    assert!(log.is_empty());
    assert_eq!(renderer.stats().total_number_of_resources(), 0);
}

#[test]
fn test_single_sample_color_texture_gets_shader_resource_view() {
    let (mut renderer, log) = create_renderer();
    renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();

    let calls = log.take();
    assert!(matches!(calls[0], NativeCall::CreateTexture2D { .. }));
    assert!(matches!(calls[1], NativeCall::CreateShaderResourceView { .. }));

    renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 4)).unwrap();
    renderer.create_texture_2d(&texture_desc(TextureFormat::D32Float, 1)).unwrap();
    let calls = log.take();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|call| matches!(call, NativeCall::CreateTexture2D { .. })));
}

#[test]
fn test_texture_rejects_empty_size_and_zero_samples() {
    let (mut renderer, _log) = create_renderer();

    let mut desc = texture_desc(TextureFormat::R8G8B8A8Unorm, 1);
    desc.width = 0;
    assert!(renderer.create_texture_2d(&desc).is_err());
    assert!(renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 0)).is_err());
}

#[test]
fn test_indirect_buffer_requires_data() {
    let (mut renderer, log) = create_renderer();

    assert!(renderer.create_indirect_buffer(&[]).is_err());
    let handle = renderer.create_indirect_buffer(&[0u8; 16]).unwrap();
    assert_eq!(handle.resource_type(), Some(ResourceType::IndirectBuffer));
    // Kept on the CPU
    assert!(log.is_empty());
}

#[test]
fn test_vertex_array_creates_vertex_and_index_buffers() {
    let (mut renderer, log) = create_renderer();
    let desc = VertexArrayDesc {
        vertex_buffers: vec![
            VertexBufferDesc { number_of_bytes: 36, stride_in_bytes: 12 },
            VertexBufferDesc { number_of_bytes: 24, stride_in_bytes: 8 },
        ],
        index_buffer: Some(IndexBufferDesc {
            number_of_bytes: 6,
            format: IndexBufferFormat::UnsignedShort,
        }),
    };
    renderer.create_vertex_array(&desc).unwrap();

    let widths: Vec<u32> = log
        .calls()
        .iter()
        .filter_map(|call| match call {
            NativeCall::CreateBuffer { desc, .. } => Some(desc.byte_width),
            _ => None,
        })
        .collect();
    assert_eq!(widths, vec![36, 24, 6]);
}

#[test]
fn test_vertex_array_rejects_too_many_vertex_buffers() {
    let (mut renderer, log) = create_renderer();
    let desc = VertexArrayDesc {
        vertex_buffers: vec![VertexBufferDesc { number_of_bytes: 12, stride_in_bytes: 12 }; 17],
        index_buffer: None,
    };

    assert!(renderer.create_vertex_array(&desc).is_err());
    assert!(log.is_empty());
}

// ============================================================================
// Out of memory
// ============================================================================

#[test]
fn test_out_of_memory_is_propagated() {
    let device = RecordingDevice::new().with_memory_budget(64);
    let mut renderer = Direct3D10Renderer::with_device(RendererConfig::default(), device).unwrap();

    assert_eq!(renderer.create_uniform_buffer(&uniform_buffer_desc(128)), Err(Error::OutOfMemory));
    assert_eq!(renderer.stats().total_number_of_resources(), 0);
    assert!(renderer.create_uniform_buffer(&uniform_buffer_desc(64)).is_ok());
}

#[test]
fn test_failed_vertex_array_releases_created_buffers() {
    let log = NativeCallLog::new();
    let device = RecordingDevice::with_log(log.clone()).with_memory_budget(100);
    let mut renderer = Direct3D10Renderer::with_device(RendererConfig::default(), device).unwrap();
    let desc = VertexArrayDesc {
        vertex_buffers: vec![
            VertexBufferDesc { number_of_bytes: 64, stride_in_bytes: 16 },
            VertexBufferDesc { number_of_bytes: 64, stride_in_bytes: 16 },
        ],
        index_buffer: None,
    };

    assert_eq!(renderer.create_vertex_array(&desc), Err(Error::OutOfMemory));
    let calls = log.calls();
    let created = match &calls[0] {
        NativeCall::CreateBuffer { object, .. } => *object,
        other => panic!("unexpected call {:?}", other),
    };
    assert_eq!(calls.last(), Some(&NativeCall::Release(created)));
    assert_eq!(renderer.stats().total_number_of_resources(), 0);
}

// ============================================================================
// Root signatures and resource groups
// ============================================================================

fn create_root_signature(renderer: &mut Direct3D10Renderer) -> ResourceHandle {
    renderer
        .create_root_signature(&RootSignatureDesc {
            parameters: vec![RootParameter {
                descriptor_ranges: vec![
                    range(ResourceType::UniformBuffer, 0, 1),
                    range(ResourceType::Texture2D, 0, 1),
                ],
            }],
        })
        .unwrap()
}

#[test]
fn test_root_signature_rejects_unbindable_ranges() {
    let (mut renderer, _log) = create_renderer();
    let desc = RootSignatureDesc {
        parameters: vec![RootParameter {
            descriptor_ranges: vec![range(ResourceType::IndirectBuffer, 0, 1)],
        }],
    };

    assert!(renderer.create_root_signature(&desc).is_err());
}

#[test]
fn test_resource_group_matches_descriptor_ranges() {
    let (mut renderer, _log) = create_renderer();
    let root_signature = create_root_signature(&mut renderer);
    let uniform_buffer = renderer.create_uniform_buffer(&uniform_buffer_desc(64)).unwrap();
    let texture = renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();

    let group = |resources: Vec<ResourceHandle>, root_parameter_index: u32| ResourceGroupDesc {
        root_signature,
        root_parameter_index,
        resources,
    };

    assert!(renderer.create_resource_group(&group(vec![uniform_buffer, texture], 0)).is_ok());
    // Wrong order
    assert!(renderer.create_resource_group(&group(vec![texture, uniform_buffer], 0)).is_err());
    // Wrong count
    assert!(renderer.create_resource_group(&group(vec![uniform_buffer], 0)).is_err());
    assert!(renderer
        .create_resource_group(&group(vec![uniform_buffer, texture, texture], 0))
        .is_err());
    // Wrong parameter
    assert!(renderer.create_resource_group(&group(vec![uniform_buffer, texture], 1)).is_err());
    assert_eq!(renderer.stats().number_of_resources_of_type(ResourceType::ResourceGroup), 1);
}

#[test]
fn test_pipeline_state_requires_root_signature() {
    let (mut renderer, _log) = create_renderer();
    let desc = PipelineStateDesc {
        root_signature: ResourceHandle::NULL,
        primitive_topology: PrimitiveTopology::TriangleList,
    };
    assert!(renderer.create_pipeline_state(&desc).is_err());

    let root_signature = create_root_signature(&mut renderer);
    let desc = PipelineStateDesc {
        root_signature,
        primitive_topology: PrimitiveTopology::TriangleList,
    };
    assert!(renderer.create_pipeline_state(&desc).is_ok());
}

// ============================================================================
// Framebuffers
// ============================================================================

#[test]
fn test_framebuffer_creates_its_own_views() {
    let (mut renderer, log) = create_renderer();
    let color = renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();
    let depth = renderer.create_texture_2d(&texture_desc(TextureFormat::D32Float, 1)).unwrap();
    log.clear();

    renderer
        .create_framebuffer(&FramebufferDesc {
            color_textures: vec![color],
            depth_stencil_texture: Some(depth),
        })
        .unwrap();

    let calls = log.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], NativeCall::CreateRenderTargetView { .. }));
    assert!(matches!(calls[1], NativeCall::CreateDepthStencilView { .. }));
}

#[test]
fn test_framebuffer_validation() {
    let (mut renderer, log) = create_renderer();
    let color = renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();
    let color_multisampled = renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 4)).unwrap();
    let depth = renderer.create_texture_2d(&texture_desc(TextureFormat::D32Float, 1)).unwrap();
    log.clear();

    // Nothing attached
    assert!(renderer.create_framebuffer(&FramebufferDesc::default()).is_err());
    // Depth texture as color
    let desc = FramebufferDesc {
        color_textures: vec![depth],
        depth_stencil_texture: None,
    };
    assert!(renderer.create_framebuffer(&desc).is_err());
    // Color texture as depth
    let desc = FramebufferDesc {
        color_textures: vec![],
        depth_stencil_texture: Some(color),
    };
    assert!(renderer.create_framebuffer(&desc).is_err());
    // Mixed sample counts
    let desc = FramebufferDesc {
        color_textures: vec![color, color_multisampled],
        depth_stencil_texture: None,
    };
    assert!(renderer.create_framebuffer(&desc).is_err());
    // Too many color attachments
    let desc = FramebufferDesc {
        color_textures: vec![color; 9],
        depth_stencil_texture: None,
    };
    assert!(renderer.create_framebuffer(&desc).is_err());

    // No view was created on the way
    assert!(log.is_empty());
}

#[test]
fn test_framebuffer_rejects_foreign_textures() {
    let (mut renderer, _log) = create_renderer();
    let (mut other, _other_log) = create_renderer();
    let foreign = other.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();

    let result = renderer.create_framebuffer(&FramebufferDesc {
        color_textures: vec![foreign],
        depth_stencil_texture: None,
    });
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// Destruction
// ============================================================================

#[test]
fn test_destroy_releases_views_before_texture() {
    let (mut renderer, log) = create_renderer();
    let texture = renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();
    let calls = log.take();
    let (texture_object, view_object) = match (&calls[0], &calls[1]) {
        (NativeCall::CreateTexture2D { object, .. }, NativeCall::CreateShaderResourceView { view, .. }) => {
            (*object, *view)
        }
        other => panic!("unexpected calls {:?}", other),
    };

    renderer.destroy_resource(texture).unwrap();

    assert_eq!(log.calls(), vec![NativeCall::Release(view_object), NativeCall::Release(texture_object)]);
    assert_eq!(renderer.stats().number_of_resources_of_type(ResourceType::Texture2D), 0);
}

#[test]
fn test_destroy_twice_fails() {
    let (mut renderer, _log) = create_renderer();
    let uniform_buffer = renderer.create_uniform_buffer(&uniform_buffer_desc(16)).unwrap();

    renderer.destroy_resource(uniform_buffer).unwrap();
    assert!(matches!(renderer.destroy_resource(uniform_buffer), Err(Error::InvalidResource(_))));
    assert!(renderer.destroy_resource(ResourceHandle::NULL).is_err());
}

#[test]
fn test_destroy_clears_bound_render_target() {
    let (mut renderer, _log) = create_renderer();
    let color = renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();
    let framebuffer = renderer
        .create_framebuffer(&FramebufferDesc {
            color_textures: vec![color],
            depth_stencil_texture: None,
        })
        .unwrap();

    let mut command_buffer = CommandBuffer::new();
    SetRenderTarget::create(&mut command_buffer, framebuffer);
    renderer.submit_command_buffer(&command_buffer);
    assert_eq!(renderer.bound_render_target(), framebuffer);

    renderer.destroy_resource(framebuffer).unwrap();
    assert!(renderer.bound_render_target().is_null());
}

#[test]
fn test_drop_releases_every_native_object() {
    let (mut renderer, log) = create_renderer();
    renderer.create_uniform_buffer(&uniform_buffer_desc(16)).unwrap();
    renderer.create_texture_2d(&texture_desc(TextureFormat::R8G8B8A8Unorm, 1)).unwrap();
    renderer.create_indirect_buffer(&[0u8; 16]).unwrap();
    log.clear();

    drop(renderer);

    let calls = log.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|call| matches!(call, NativeCall::Release(_))));
}

#[test]
fn test_index_buffer_format_mapping_is_kept() {
    let (mut renderer, _log) = create_renderer();
    let handle = renderer
        .create_vertex_array(&VertexArrayDesc {
            vertex_buffers: vec![VertexBufferDesc { number_of_bytes: 12, stride_in_bytes: 12 }],
            index_buffer: Some(IndexBufferDesc {
                number_of_bytes: 12,
                format: IndexBufferFormat::UnsignedInt,
            }),
        })
        .unwrap();

    let vertex_array = resource::vertex_array(&renderer.resources, handle).unwrap();
    assert_eq!(vertex_array.index_buffer.as_ref().map(|index_buffer| index_buffer.format), Some(DxgiFormat::R32Uint));
    assert_eq!(vertex_array.vertex_buffers[0].stride_in_bytes, 12);
}
