//! CPU kernel implementations
//!
//! Per-thread bodies of the copy kernels. Each function is the program one
//! logical device thread runs; [`super::grid::launch_grid`] runs it for every
//! thread of a launch.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod copy;

pub use copy::{
    blocked_copy_loop_thread, blocked_copy_thread, float_tail_thread, scalar_copy_thread,
    vector_copy_thread,
};
