//! WGSL sources for the copy kernels
//!
//! WGSL has no 64-bit scalars, so every shader moves raw `u32` units: an
//! element of type `T` is `size_of::<T>() / 4` units and a wide word is one
//! `vec4<u32>`. Buffers are bound whole, so every copy starts at offset
//! zero of both buffers.
//!
//! Counts can sit close to `u32::MAX`, so loops step only after checking
//! that the next index is still below the bound; an index never wraps.

use bytemuck::{Pod, Zeroable};

use crate::ops::launch::THREADS_PER_GROUP;

/// Uniform parameters shared by all copy shaders (16 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct CopyParams {
    /// Scalar and blocked shaders: element count. Vector shader: word count.
    pub n: u32,
    /// u32 units per element
    pub elem_units: u32,
    /// First element handled by the scalar shader
    pub start: u32,
    /// Uniform structs are sized in 16-byte steps
    pub _pad: u32,
}

const PARAMS_STRUCT: &str = r#"
struct CopyParams {
    n: u32,
    elem_units: u32,
    start: u32,
    _pad: u32,
}
"#;

/// Scalar grid-stride copy, `elem_units` u32 units per element
pub fn scalar_copy_shader() -> String {
    format!(
        r#"{PARAMS_STRUCT}
const WORKGROUP_SIZE: u32 = {THREADS_PER_GROUP}u;

@group(0) @binding(0) var<storage, read_write> src: array<u32>;
@group(0) @binding(1) var<storage, read_write> dst: array<u32>;
@group(0) @binding(2) var<uniform> params: CopyParams;

@compute @workgroup_size({THREADS_PER_GROUP})
fn scalar_copy(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {{
    let stride = groups.x * WORKGROUP_SIZE;
    var i = params.start + gid.x;
    loop {{
        if (i >= params.n) {{
            break;
        }}
        let base = i * params.elem_units;
        for (var u = 0u; u < params.elem_units; u = u + 1u) {{
            dst[base + u] = src[base + u];
        }}
        if (params.n - i <= stride) {{
            break;
        }}
        i = i + stride;
    }}
}}
"#
    )
}

/// Grid-stride copy of whole wide words; the remainder is a second
/// dispatch of the scalar shader.
pub fn vector_copy_shader() -> String {
    format!(
        r#"{PARAMS_STRUCT}
const WORKGROUP_SIZE: u32 = {THREADS_PER_GROUP}u;

@group(0) @binding(0) var<storage, read_write> src: array<vec4<u32>>;
@group(0) @binding(1) var<storage, read_write> dst: array<vec4<u32>>;
@group(0) @binding(2) var<uniform> params: CopyParams;

@compute @workgroup_size({THREADS_PER_GROUP})
fn vector_copy(
    @builtin(global_invocation_id) gid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {{
    let stride = groups.x * WORKGROUP_SIZE;
    var i = gid.x;
    loop {{
        if (i >= params.n) {{
            break;
        }}
        dst[i] = src[i];
        if (params.n - i <= stride) {{
            break;
        }}
        i = i + stride;
    }}
}}
"#
    )
}

/// Register-blocked f32 copy with blocking factor `k`.
///
/// Both variants live in one module: `blocked_copy` (single pass) and
/// `blocked_loop_copy` (grid-stride). Thread 0 of the grid copies the floats
/// past the last whole word, one component at a time so bytes past `n` are
/// never written.
pub fn blocked_copy_shader(k: usize) -> String {
    format!(
        r#"{PARAMS_STRUCT}
const K: u32 = {k}u;
const WORKGROUP_SIZE: u32 = {THREADS_PER_GROUP}u;

@group(0) @binding(0) var<storage, read_write> src: array<vec4<u32>>;
@group(0) @binding(1) var<storage, read_write> dst: array<vec4<u32>>;
@group(0) @binding(2) var<uniform> params: CopyParams;

fn stage_and_store(base: u32, words: u32) {{
    if (base >= words) {{
        return;
    }}
    var staged: array<vec4<u32>, {k}>;
    for (var slot = 0u; slot < K; slot = slot + 1u) {{
        let offset = slot * WORKGROUP_SIZE;
        if (offset < words - base) {{
            staged[slot] = src[base + offset];
        }}
    }}
    for (var slot = 0u; slot < K; slot = slot + 1u) {{
        let offset = slot * WORKGROUP_SIZE;
        if (offset < words - base) {{
            dst[base + offset] = staged[slot];
        }}
    }}
}}

fn float_tail(rank: u32) {{
    if (rank != 0u) {{
        return;
    }}
    let words = params.n / 4u;
    for (var c = 0u; c < params.n % 4u; c = c + 1u) {{
        dst[words][c] = src[words][c];
    }}
}}

@compute @workgroup_size({THREADS_PER_GROUP})
fn blocked_copy(
    @builtin(local_invocation_id) lid: vec3<u32>,
    @builtin(workgroup_id) wid: vec3<u32>,
) {{
    let words = params.n / 4u;
    stage_and_store(lid.x + K * wid.x * WORKGROUP_SIZE, words);
    float_tail(wid.x * WORKGROUP_SIZE + lid.x);
}}

@compute @workgroup_size({THREADS_PER_GROUP})
fn blocked_loop_copy(
    @builtin(local_invocation_id) lid: vec3<u32>,
    @builtin(workgroup_id) wid: vec3<u32>,
    @builtin(num_workgroups) groups: vec3<u32>,
) {{
    let words = params.n / 4u;
    let step = K * groups.x * WORKGROUP_SIZE;
    var base = lid.x + K * wid.x * WORKGROUP_SIZE;
    loop {{
        if (base >= words) {{
            break;
        }}
        stage_and_store(base, words);
        if (words - base <= step) {{
            break;
        }}
        base = base + step;
    }}
    float_tail(wid.x * WORKGROUP_SIZE + lid.x);
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_layout() {
        assert_eq!(std::mem::size_of::<CopyParams>(), 16);
        let params = CopyParams {
            n: 5,
            elem_units: 2,
            start: 4,
            _pad: 0,
        };
        let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(&params));
        assert_eq!(words, &[5, 2, 4, 0]);
    }

    #[test]
    fn test_shaders_use_group_width() {
        let width = format!("@workgroup_size({})", THREADS_PER_GROUP);
        assert!(scalar_copy_shader().contains(&width));
        assert!(vector_copy_shader().contains("array<vec4<u32>>"));
        let blocked = blocked_copy_shader(2);
        assert!(blocked.contains("const K: u32 = 2u;"));
        assert!(blocked.contains("array<vec4<u32>, 2>"));
        assert!(blocked.contains("fn blocked_loop_copy("));
    }

    #[test]
    fn test_loops_check_bound_before_stepping() {
        for shader in [scalar_copy_shader(), vector_copy_shader()] {
            assert!(shader.contains("if (params.n - i <= stride)"));
            assert!(!shader.contains("i = i + stride)"));
        }
        let blocked = blocked_copy_shader(2);
        assert!(blocked.contains("if (words - base <= step)"));
        assert!(blocked.contains("if (offset < words - base)"));
        assert!(!blocked.contains("base = base + step)"));
    }
}
