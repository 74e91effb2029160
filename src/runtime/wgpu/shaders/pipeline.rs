//! Per-client cache of copy pipelines
//!
//! Every copy shader binds the same three resources (`src`, `dst`, params),
//! so one bind group layout and one pipeline layout serve all of them. Only
//! the shader modules and their entry points vary.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::{
    BindGroup, BindGroupLayout, BindingType, Buffer, BufferBindingType, ComputePipeline, Device,
    PipelineLayout, ShaderModule, ShaderStages,
};

use super::copy_launcher::CopyShader;

/// Binding slots of the copy shaders, in order
const BINDINGS: [BufferBindingType; 3] = [
    BufferBindingType::Storage { read_only: false },
    BufferBindingType::Storage { read_only: false },
    BufferBindingType::Uniform,
];

/// Compiled copy shaders and pipelines for one WebGPU device
pub struct PipelineCache {
    device: Arc<Device>,
    bind_layout: BindGroupLayout,
    pipeline_layout: PipelineLayout,
    modules: Mutex<HashMap<CopyShader, Arc<ShaderModule>>>,
    pipelines: Mutex<HashMap<(CopyShader, &'static str), Arc<ComputePipeline>>>,
}

impl PipelineCache {
    /// Create the shared layouts; modules compile lazily.
    pub fn new(device: Arc<Device>) -> Self {
        let entries: Vec<_> = BINDINGS
            .iter()
            .enumerate()
            .map(|(binding, &ty)| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: ShaderStages::COMPUTE,
                ty: BindingType::Buffer {
                    ty,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect();
        let bind_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("copy_bindings"),
            entries: &entries,
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("copy_pipeline_layout"),
            bind_group_layouts: &[&bind_layout],
            immediate_size: 0,
        });

        Self {
            device,
            bind_layout,
            pipeline_layout,
            modules: Mutex::new(HashMap::new()),
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    fn module(&self, shader: CopyShader) -> Arc<ShaderModule> {
        let mut modules = self.modules.lock();
        modules
            .entry(shader)
            .or_insert_with(|| {
                let name = shader.module_name();
                tracing::debug!(module = %name, "compiling WGSL module");
                Arc::new(self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some(&name),
                    source: wgpu::ShaderSource::Wgsl(shader.source().into()),
                }))
            })
            .clone()
    }

    /// Pipeline for `entry_point` of `shader`, compiled on first use.
    pub fn pipeline(&self, shader: CopyShader, entry_point: &'static str) -> Arc<ComputePipeline> {
        if let Some(pipeline) = self.pipelines.lock().get(&(shader, entry_point)) {
            return pipeline.clone();
        }

        // Compile outside the pipeline lock; a racing thread at worst builds
        // the same pipeline twice.
        let module = self.module(shader);
        let label = format!("{}::{}", shader.module_name(), entry_point);
        let pipeline = Arc::new(self.device.create_compute_pipeline(
            &wgpu::ComputePipelineDescriptor {
                label: Some(&label),
                layout: Some(&self.pipeline_layout),
                module: &module,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            },
        ));
        self.pipelines
            .lock()
            .entry((shader, entry_point))
            .or_insert(pipeline)
            .clone()
    }

    /// Bind `src`, `dst` and `params` to the copy slots.
    pub fn bind(&self, src: &Buffer, dst: &Buffer, params: &Buffer) -> BindGroup {
        let entries: Vec<_> = [src, dst, params]
            .into_iter()
            .enumerate()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect();
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("copy_bind_group"),
            layout: &self.bind_layout,
            entries: &entries,
        })
    }

    /// Device the pipelines were built for
    pub fn device(&self) -> &Device {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::wgpu::{WgpuClient, WgpuDevice};

    #[test]
    fn test_pipelines_are_compiled_once() {
        let client = match WgpuClient::new(WgpuDevice::new(0)) {
            Ok(client) => client,
            Err(e) => {
                println!("No GPU available, skipping test: {}", e);
                return;
            }
        };
        let cache = &client.pipeline_cache;
        let first = cache.pipeline(CopyShader::Blocked(2), "blocked_copy");
        let again = cache.pipeline(CopyShader::Blocked(2), "blocked_copy");
        let looped = cache.pipeline(CopyShader::Blocked(2), "blocked_loop_copy");
        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &looped));
        assert_eq!(cache.modules.lock().len(), 1);
    }
}
