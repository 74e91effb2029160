//! WGSL compute shader infrastructure for the copy kernels
//!
//! # Module Structure
//!
//! - `copy` - WGSL sources (scalar, wide-word, register-blocked per K)
//! - `copy_launcher` - Dispatch recording and submission
//! - `pipeline` - Shared copy layouts, module and pipeline caching

pub mod copy;
pub mod copy_launcher;
mod pipeline;

pub use copy::CopyParams;
pub use copy_launcher::{CopyDispatch, CopyShader, launch_copy};
pub use pipeline::PipelineCache;
