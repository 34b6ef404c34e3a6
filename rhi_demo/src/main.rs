//! RHI demo - records one frame and replays it on a headless Direct3D 10 renderer
//!
//! The renderer runs on a `RecordingDevice`, so the demo prints the native call
//! trace instead of presenting an image.

use glam::{Mat4, Vec3, Vec4};
use rhi_engine::rhi::command::{
    BeginDebugEvent, Clear, CopyUniformBufferData, DrawIndexed, EndDebugEvent, ExecuteCommandBuffer,
    SetDebugMarker, SetGraphicsResourceGroup, SetGraphicsRootSignature, SetPipelineState, SetRenderTarget,
    SetScissorRectangles, SetVertexArray, SetViewports,
};
use rhi_engine::rhi::render::{
    ClearFlags, DescriptorRange, FramebufferDesc, IndexBufferDesc, IndexBufferFormat, PipelineStateDesc,
    PrimitiveTopology, ResourceGroupDesc, ResourceType, RootParameter, RootSignatureDesc, ShaderVisibility,
    TextureDesc, TextureFormat, UniformBufferDesc, VertexArrayDesc, VertexBufferDesc,
};
use rhi_engine::rhi::{CommandBuffer, Engine, Renderer, RendererConfig, Result};
use rhi_engine::{engine_info, engine_warn};
use rhi_engine_renderer_direct3d10::{
    print_validation_stats_report, Direct3D10Renderer, NativeCallLog, RecordingDevice,
};

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn main() {
    if let Err(error) = run() {
        eprintln!("RHI demo failed: {}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    Engine::initialize()?;

    let config = RendererConfig {
        enable_validation: true,
        enable_debug_markers: true,
        app_name: "RHI Demo".to_string(),
        app_version: (0, 1, 0),
    };
    let log = NativeCallLog::new();
    let mut renderer = Direct3D10Renderer::with_device(config, RecordingDevice::with_log(log.clone()))?;

    // ===== Resources =====

    let root_signature = renderer.create_root_signature(&RootSignatureDesc {
        parameters: vec![RootParameter {
            descriptor_ranges: vec![
                DescriptorRange {
                    resource_type: ResourceType::UniformBuffer,
                    base_shader_register: 0,
                    number_of_descriptors: 1,
                    shader_visibility: ShaderVisibility::Vertex,
                },
                DescriptorRange {
                    resource_type: ResourceType::Texture2D,
                    base_shader_register: 0,
                    number_of_descriptors: 1,
                    shader_visibility: ShaderVisibility::Fragment,
                },
            ],
        }],
    })?;
    let pipeline_state = renderer.create_pipeline_state(&PipelineStateDesc {
        root_signature,
        primitive_topology: PrimitiveTopology::TriangleList,
    })?;
    let uniform_buffer = renderer.create_uniform_buffer(&UniformBufferDesc {
        number_of_bytes: std::mem::size_of::<Mat4>() as u32,
        data: None,
    })?;
    let albedo = renderer.create_texture_2d(&TextureDesc {
        width: 256,
        height: 256,
        format: TextureFormat::R8G8B8A8Unorm,
        number_of_multisamples: 1,
    })?;
    let resource_group = renderer.create_resource_group(&ResourceGroupDesc {
        root_signature,
        root_parameter_index: 0,
        resources: vec![uniform_buffer, albedo],
    })?;
    // Cube: 24 vertices (position + normal + uv), 36 indices
    let vertex_array = renderer.create_vertex_array(&VertexArrayDesc {
        vertex_buffers: vec![VertexBufferDesc {
            number_of_bytes: 24 * 32,
            stride_in_bytes: 32,
        }],
        index_buffer: Some(IndexBufferDesc {
            number_of_bytes: 36 * 2,
            format: IndexBufferFormat::UnsignedShort,
        }),
    })?;
    let color_texture = renderer.create_texture_2d(&TextureDesc {
        width: WIDTH,
        height: HEIGHT,
        format: TextureFormat::R8G8B8A8Unorm,
        number_of_multisamples: 1,
    })?;
    let depth_texture = renderer.create_texture_2d(&TextureDesc {
        width: WIDTH,
        height: HEIGHT,
        format: TextureFormat::D32Float,
        number_of_multisamples: 1,
    })?;
    let framebuffer = renderer.create_framebuffer(&FramebufferDesc {
        color_textures: vec![color_texture],
        depth_stencil_texture: Some(depth_texture),
    })?;

    engine_info!("rhi::demo", "{} resources created", renderer.stats().total_number_of_resources());
    log.clear();

    // ===== Recording =====

    let view = Mat4::look_at_rh(Vec3::new(2.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(60f32.to_radians(), WIDTH as f32 / HEIGHT as f32, 0.1, 100.0);
    let model_view_projection = projection * view;

    // Scene content recorded once, executed inside the frame
    let mut scene = CommandBuffer::new();
    SetGraphicsRootSignature::create(&mut scene, root_signature);
    SetPipelineState::create(&mut scene, pipeline_state);
    SetGraphicsResourceGroup::create(&mut scene, 0, resource_group);
    SetVertexArray::create(&mut scene, vertex_array);
    SetDebugMarker::create(&mut scene, "Cube");
    DrawIndexed::create(&mut scene, 36, 1, 0, 0, 0);

    let mut frame = CommandBuffer::new();
    BeginDebugEvent::create(&mut frame, "Frame");
    CopyUniformBufferData::create(&mut frame, uniform_buffer, bytemuck::bytes_of(&model_view_projection));
    SetRenderTarget::create(&mut frame, framebuffer);
    SetViewports::create_single(&mut frame, 0, 0, WIDTH, HEIGHT);
    SetScissorRectangles::create_single(&mut frame, 0, 0, WIDTH as i32, HEIGHT as i32);
    Clear::create(&mut frame, ClearFlags::COLOR_DEPTH, Vec4::new(0.1, 0.1, 0.15, 1.0), 1.0, 0);
    ExecuteCommandBuffer::create(&mut frame, &scene);
    EndDebugEvent::create(&mut frame);

    engine_info!(
        "rhi::demo",
        "Frame recorded: {} bytes, capacity {}",
        frame.number_of_bytes(),
        frame.capacity()
    );

    // ===== Submission =====

    Engine::create_renderer(renderer)?;
    let renderer = Engine::renderer()?;
    {
        let mut renderer = renderer
            .lock()
            .map_err(|_| rhi_engine::rhi::Error::BackendError("Renderer lock poisoned".to_string()))?;
        renderer.submit_command_buffer(&frame);

        let stats = renderer.stats();
        engine_info!(
            "rhi::demo",
            "{} commands dispatched, {} draw calls",
            stats.number_of_dispatched_commands,
            stats.number_of_draw_calls
        );
    }

    println!("\nNative calls:");
    for (index, call) in log.calls().iter().enumerate() {
        println!("  {:3}  {:?}", index, call);
    }

    if log.calls().iter().filter(|call| call.is_draw()).count() != 1 {
        engine_warn!("rhi::demo", "Expected exactly one draw call");
    }
    print_validation_stats_report();

    drop(renderer);
    Engine::destroy_renderer()?;
    Engine::shutdown();
    Ok(())
}
