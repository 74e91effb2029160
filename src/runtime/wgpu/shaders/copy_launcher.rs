//! Copy shader launchers
//!
//! One launch is a single command encoder holding one compute pass with one
//! or more dispatches, submitted to the client's queue without waiting.

use wgpu::util::DeviceExt;
use wgpu::{Buffer, Queue};

use super::copy::{CopyParams, blocked_copy_shader, scalar_copy_shader, vector_copy_shader};
use super::pipeline::PipelineCache;

/// Shader module a dispatch runs in
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CopyShader {
    /// Scalar grid-stride module
    Scalar,
    /// Wide-word module
    Vector,
    /// Register-blocked module for one blocking factor
    Blocked(usize),
}

impl CopyShader {
    pub(super) fn module_name(self) -> String {
        match self {
            Self::Scalar => "copy_scalar".to_string(),
            Self::Vector => "copy_vector".to_string(),
            Self::Blocked(k) => format!("copy_blocked_k{}", k),
        }
    }

    pub(super) fn source(self) -> String {
        match self {
            Self::Scalar => scalar_copy_shader(),
            Self::Vector => vector_copy_shader(),
            Self::Blocked(k) => blocked_copy_shader(k),
        }
    }
}

/// One dispatch of a copy shader
#[derive(Copy, Clone, Debug)]
pub struct CopyDispatch {
    /// Module holding the entry point
    pub shader: CopyShader,
    /// Entry point name
    pub entry_point: &'static str,
    /// Workgroup count (1D)
    pub groups: u32,
    /// Uniform parameters for this dispatch
    pub params: CopyParams,
}

/// Record `dispatches` in order and submit them as one command buffer.
pub fn launch_copy(
    cache: &PipelineCache,
    queue: &Queue,
    label: &str,
    src: &Buffer,
    dst: &Buffer,
    dispatches: &[CopyDispatch],
) {
    // Bind groups must outlive the pass that references them
    let prepared: Vec<_> = dispatches
        .iter()
        .map(|d| {
            let pipeline = cache.pipeline(d.shader, d.entry_point);
            let params = cache
                .device()
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("copy_params"),
                    contents: bytemuck::bytes_of(&d.params),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
            let bind_group = cache.bind(src, dst, &params);
            (pipeline, bind_group, d.groups)
        })
        .collect();

    let mut encoder = cache
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
    {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(label),
            timestamp_writes: None,
        });
        for (pipeline, bind_group, groups) in &prepared {
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, Some(bind_group), &[]);
            pass.dispatch_workgroups(*groups, 1, 1);
        }
    }

    queue.submit(std::iter::once(encoder.finish()));
}
