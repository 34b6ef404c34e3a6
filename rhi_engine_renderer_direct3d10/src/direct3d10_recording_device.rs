/// RecordingDevice - headless `Direct3D10Device`
///
/// Every call is appended to a shared `NativeCallLog` and native objects are tracked
/// in memory, so the renderer runs anywhere and tests can assert on the exact native
/// call sequence. Buffer contents are kept to observe uploads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rhi_engine::rhi::{Error, Result};
use rhi_engine::utils::IdAllocator;
use rustc_hash::FxHashMap;

use crate::direct3d10_device::{
    D3D10BufferDesc, D3D10PrimitiveTopology, D3D10Rect, D3D10Texture2DDesc, D3D10Viewport, Direct3D10Device,
    DxgiFormat, NativeObject,
};

/// One recorded native call
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    CreateBuffer { object: NativeObject, desc: D3D10BufferDesc },
    CreateTexture2D { object: NativeObject, desc: D3D10Texture2DDesc },
    CreateShaderResourceView { view: NativeObject, resource: NativeObject },
    CreateRenderTargetView { view: NativeObject, resource: NativeObject },
    CreateDepthStencilView { view: NativeObject, resource: NativeObject },
    Release(NativeObject),
    IASetPrimitiveTopology(D3D10PrimitiveTopology),
    IASetVertexBuffers { start_slot: u32, buffers: Vec<Option<NativeObject>>, strides: Vec<u32>, offsets: Vec<u32> },
    IASetIndexBuffer { buffer: Option<NativeObject>, format: DxgiFormat, offset: u32 },
    VSSetConstantBuffers { start_slot: u32, buffers: Vec<NativeObject> },
    PSSetConstantBuffers { start_slot: u32, buffers: Vec<NativeObject> },
    VSSetShaderResources { start_slot: u32, views: Vec<NativeObject> },
    PSSetShaderResources { start_slot: u32, views: Vec<NativeObject> },
    RSSetViewports(Vec<D3D10Viewport>),
    RSSetScissorRects(Vec<D3D10Rect>),
    OMSetRenderTargets { render_target_views: Vec<NativeObject>, depth_stencil_view: Option<NativeObject> },
    ClearRenderTargetView { view: NativeObject, color: [f32; 4] },
    ClearDepthStencilView { view: NativeObject, clear_flags: u32, depth: f32, stencil: u8 },
    Draw { vertex_count: u32, start_vertex_location: u32 },
    DrawInstanced {
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    },
    DrawIndexed { index_count: u32, start_index_location: u32, base_vertex_location: i32 },
    DrawIndexedInstanced {
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    },
    UpdateSubresource { resource: NativeObject, number_of_bytes: u32 },
    CopyResource { destination: NativeObject, source: NativeObject },
    ResolveSubresource { destination: NativeObject, source: NativeObject, format: DxgiFormat },
    SetMarker { color: u32, name: String },
    BeginEvent { color: u32, name: String },
    EndEvent,
}

impl NativeCall {
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            NativeCall::Draw { .. }
                | NativeCall::DrawInstanced { .. }
                | NativeCall::DrawIndexed { .. }
                | NativeCall::DrawIndexedInstanced { .. }
        )
    }
}

/// Shared, cloneable view of the calls made on a `RecordingDevice`
#[derive(Debug, Clone, Default)]
pub struct NativeCallLog {
    calls: Arc<Mutex<Vec<NativeCall>>>,
}

impl NativeCallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NativeCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, call: NativeCall) {
        self.lock().push(call);
    }

    /// Copy of every call recorded so far
    pub fn calls(&self) -> Vec<NativeCall> {
        self.lock().clone()
    }

    /// Recorded calls, then forget them
    pub fn take(&self) -> Vec<NativeCall> {
        std::mem::take(&mut *self.lock())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// What a live native object is
#[derive(Debug, Clone, PartialEq)]
pub enum NativeObjectInfo {
    Buffer { desc: D3D10BufferDesc, contents: Vec<u8> },
    Texture2D { desc: D3D10Texture2DDesc },
    ShaderResourceView { resource: NativeObject },
    RenderTargetView { resource: NativeObject },
    DepthStencilView { resource: NativeObject },
}

/// Headless device recording every call
pub struct RecordingDevice {
    log: NativeCallLog,
    ids: IdAllocator,
    objects: FxHashMap<NativeObject, NativeObjectInfo>,
    /// Bytes of buffer and texture memory left, `None` for unlimited
    memory_budget: Option<u64>,
    event_depth: i32,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::with_log(NativeCallLog::new())
    }

    /// Device appending to an existing log (keep a clone to read it back)
    pub fn with_log(log: NativeCallLog) -> Self {
        Self {
            log,
            ids: IdAllocator::with_first_id(1),
            objects: FxHashMap::default(),
            memory_budget: None,
            event_depth: 0,
        }
    }

    /// Fail buffer and texture creation with `Error::OutOfMemory` past `number_of_bytes`
    pub fn with_memory_budget(mut self, number_of_bytes: u64) -> Self {
        self.memory_budget = Some(number_of_bytes);
        self
    }

    pub fn log(&self) -> NativeCallLog {
        self.log.clone()
    }

    pub fn object(&self, object: NativeObject) -> Option<&NativeObjectInfo> {
        self.objects.get(&object)
    }

    pub fn number_of_live_objects(&self) -> usize {
        self.objects.len()
    }

    fn allocate_memory(&mut self, number_of_bytes: u64) -> Result<()> {
        if let Some(budget) = self.memory_budget.as_mut() {
            if number_of_bytes > *budget {
                return Err(Error::OutOfMemory);
            }
            *budget -= number_of_bytes;
        }
        Ok(())
    }

    fn insert(&mut self, info: NativeObjectInfo) -> NativeObject {
        let object = NativeObject(self.ids.allocate());
        self.objects.insert(object, info);
        object
    }

    fn create_view(&mut self, resource: NativeObject, info: NativeObjectInfo) -> Result<NativeObject> {
        match self.objects.get(&resource) {
            Some(NativeObjectInfo::Texture2D { .. }) => Ok(self.insert(info)),
            _ => Err(Error::BackendError(format!(
                "E_INVALIDARG: view on {:?}, which is not a live texture",
                resource
            ))),
        }
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Direct3D10Device for RecordingDevice {
    fn create_buffer(&mut self, desc: &D3D10BufferDesc, initial_data: Option<&[u8]>) -> Result<NativeObject> {
        if desc.byte_width == 0 {
            return Err(Error::BackendError("E_INVALIDARG: zero-sized buffer".to_string()));
        }
        self.allocate_memory(u64::from(desc.byte_width))?;

        let mut contents = vec![0u8; desc.byte_width as usize];
        if let Some(data) = initial_data {
            let number_of_bytes = data.len().min(contents.len());
            contents[..number_of_bytes].copy_from_slice(&data[..number_of_bytes]);
        }
        let object = self.insert(NativeObjectInfo::Buffer { desc: *desc, contents });
        self.log.push(NativeCall::CreateBuffer { object, desc: *desc });
        Ok(object)
    }

    fn create_texture_2d(&mut self, desc: &D3D10Texture2DDesc) -> Result<NativeObject> {
        if desc.width == 0 || desc.height == 0 || desc.format == DxgiFormat::Unknown {
            return Err(Error::BackendError(format!("E_INVALIDARG: texture {:?}", desc)));
        }
        let bytes_per_texel = match desc.format {
            DxgiFormat::R32G32B32A32Float => 16,
            _ => 4,
        };
        self.allocate_memory(
            u64::from(desc.width) * u64::from(desc.height) * u64::from(desc.sample_count.max(1)) * bytes_per_texel,
        )?;

        let object = self.insert(NativeObjectInfo::Texture2D { desc: *desc });
        self.log.push(NativeCall::CreateTexture2D { object, desc: *desc });
        Ok(object)
    }

    fn create_shader_resource_view(&mut self, resource: NativeObject) -> Result<NativeObject> {
        let view = self.create_view(resource, NativeObjectInfo::ShaderResourceView { resource })?;
        self.log.push(NativeCall::CreateShaderResourceView { view, resource });
        Ok(view)
    }

    fn create_render_target_view(&mut self, resource: NativeObject) -> Result<NativeObject> {
        let view = self.create_view(resource, NativeObjectInfo::RenderTargetView { resource })?;
        self.log.push(NativeCall::CreateRenderTargetView { view, resource });
        Ok(view)
    }

    fn create_depth_stencil_view(&mut self, resource: NativeObject) -> Result<NativeObject> {
        let view = self.create_view(resource, NativeObjectInfo::DepthStencilView { resource })?;
        self.log.push(NativeCall::CreateDepthStencilView { view, resource });
        Ok(view)
    }

    fn release(&mut self, object: NativeObject) {
        if self.objects.remove(&object).is_some() {
            self.ids.release(object.0);
        }
        self.log.push(NativeCall::Release(object));
    }

    fn ia_set_primitive_topology(&mut self, topology: D3D10PrimitiveTopology) {
        self.log.push(NativeCall::IASetPrimitiveTopology(topology));
    }

    fn ia_set_vertex_buffers(&mut self, start_slot: u32, buffers: &[Option<NativeObject>], strides: &[u32], offsets: &[u32]) {
        self.log.push(NativeCall::IASetVertexBuffers {
            start_slot,
            buffers: buffers.to_vec(),
            strides: strides.to_vec(),
            offsets: offsets.to_vec(),
        });
    }

    fn ia_set_index_buffer(&mut self, buffer: Option<NativeObject>, format: DxgiFormat, offset: u32) {
        self.log.push(NativeCall::IASetIndexBuffer { buffer, format, offset });
    }

    fn vs_set_constant_buffers(&mut self, start_slot: u32, buffers: &[NativeObject]) {
        self.log.push(NativeCall::VSSetConstantBuffers { start_slot, buffers: buffers.to_vec() });
    }

    fn ps_set_constant_buffers(&mut self, start_slot: u32, buffers: &[NativeObject]) {
        self.log.push(NativeCall::PSSetConstantBuffers { start_slot, buffers: buffers.to_vec() });
    }

    fn vs_set_shader_resources(&mut self, start_slot: u32, views: &[NativeObject]) {
        self.log.push(NativeCall::VSSetShaderResources { start_slot, views: views.to_vec() });
    }

    fn ps_set_shader_resources(&mut self, start_slot: u32, views: &[NativeObject]) {
        self.log.push(NativeCall::PSSetShaderResources { start_slot, views: views.to_vec() });
    }

    fn rs_set_viewports(&mut self, viewports: &[D3D10Viewport]) {
        self.log.push(NativeCall::RSSetViewports(viewports.to_vec()));
    }

    fn rs_set_scissor_rects(&mut self, rectangles: &[D3D10Rect]) {
        self.log.push(NativeCall::RSSetScissorRects(rectangles.to_vec()));
    }

    fn om_set_render_targets(&mut self, render_target_views: &[NativeObject], depth_stencil_view: Option<NativeObject>) {
        self.log.push(NativeCall::OMSetRenderTargets {
            render_target_views: render_target_views.to_vec(),
            depth_stencil_view,
        });
    }

    fn clear_render_target_view(&mut self, view: NativeObject, color: [f32; 4]) {
        self.log.push(NativeCall::ClearRenderTargetView { view, color });
    }

    fn clear_depth_stencil_view(&mut self, view: NativeObject, clear_flags: u32, depth: f32, stencil: u8) {
        self.log.push(NativeCall::ClearDepthStencilView { view, clear_flags, depth, stencil });
    }

    fn draw(&mut self, vertex_count: u32, start_vertex_location: u32) {
        self.log.push(NativeCall::Draw { vertex_count, start_vertex_location });
    }

    fn draw_instanced(
        &mut self,
        vertex_count_per_instance: u32,
        instance_count: u32,
        start_vertex_location: u32,
        start_instance_location: u32,
    ) {
        self.log.push(NativeCall::DrawInstanced {
            vertex_count_per_instance,
            instance_count,
            start_vertex_location,
            start_instance_location,
        });
    }

    fn draw_indexed(&mut self, index_count: u32, start_index_location: u32, base_vertex_location: i32) {
        self.log.push(NativeCall::DrawIndexed { index_count, start_index_location, base_vertex_location });
    }

    fn draw_indexed_instanced(
        &mut self,
        index_count_per_instance: u32,
        instance_count: u32,
        start_index_location: u32,
        base_vertex_location: i32,
        start_instance_location: u32,
    ) {
        self.log.push(NativeCall::DrawIndexedInstanced {
            index_count_per_instance,
            instance_count,
            start_index_location,
            base_vertex_location,
            start_instance_location,
        });
    }

    fn update_subresource(&mut self, resource: NativeObject, data: &[u8]) {
        if let Some(NativeObjectInfo::Buffer { contents, .. }) = self.objects.get_mut(&resource) {
            let number_of_bytes = data.len().min(contents.len());
            contents[..number_of_bytes].copy_from_slice(&data[..number_of_bytes]);
        }
        self.log.push(NativeCall::UpdateSubresource { resource, number_of_bytes: data.len() as u32 });
    }

    fn copy_resource(&mut self, destination: NativeObject, source: NativeObject) {
        self.log.push(NativeCall::CopyResource { destination, source });
    }

    fn resolve_subresource(&mut self, destination: NativeObject, source: NativeObject, format: DxgiFormat) {
        self.log.push(NativeCall::ResolveSubresource { destination, source, format });
    }

    fn set_marker(&mut self, color: u32, name: &str) {
        self.log.push(NativeCall::SetMarker { color, name: name.to_string() });
    }

    fn begin_event(&mut self, color: u32, name: &str) -> i32 {
        self.event_depth += 1;
        self.log.push(NativeCall::BeginEvent { color, name: name.to_string() });
        self.event_depth
    }

    fn end_event(&mut self) -> i32 {
        self.log.push(NativeCall::EndEvent);
        if self.event_depth == 0 {
            return -1;
        }
        self.event_depth -= 1;
        self.event_depth
    }
}

#[cfg(test)]
#[path = "direct3d10_recording_device_tests.rs"]
mod tests;
