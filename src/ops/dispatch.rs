//! DType dispatch utilities
//!
//! This module provides the `dispatch_dtype!` macro for runtime type dispatch.
//! The checked buffer API uses it to go from a buffer's `DType` to the
//! concrete element type of a copy entry point.
//!
//! # Usage
//!
//! ```ignore
//! fn element_size(dtype: DType) -> usize {
//!     dispatch_dtype!(dtype, T => {
//!         // T is now a concrete type (f32, i64, ...)
//!         std::mem::size_of::<T>()
//!     })
//! }
//! ```
//!
//! ## Supported Types
//!
//! - `F64` -> `f64`
//! - `F32` -> `f32`
//! - `I64` -> `i64`
//! - `I32` -> `i32`
//! - `U64` -> `u64`
//! - `U32` -> `u32`

/// Macro for runtime dtype dispatch to typed operations.
///
/// Executes `$body` with `$T` bound to the Rust type of `$dtype`. Every
/// `DType` variant has an element type, so the expansion is exhaustive.
#[macro_export]
macro_rules! dispatch_dtype {
    ($dtype:expr, $T:ident => $body:block) => {
        match $dtype {
            $crate::dtype::DType::F64 => {
                type $T = f64;
                $body
            }
            $crate::dtype::DType::F32 => {
                type $T = f32;
                $body
            }
            $crate::dtype::DType::I64 => {
                type $T = i64;
                $body
            }
            $crate::dtype::DType::I32 => {
                type $T = i32;
                $body
            }
            $crate::dtype::DType::U64 => {
                type $T = u64;
                $body
            }
            $crate::dtype::DType::U32 => {
                type $T = u32;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::dtype::{DType, Element};

    fn size_via_dispatch(dtype: DType) -> usize {
        dispatch_dtype!(dtype, T => { std::mem::size_of::<T>() })
    }

    fn dtype_via_dispatch(dtype: DType) -> DType {
        dispatch_dtype!(dtype, T => { <T as Element>::DTYPE })
    }

    #[test]
    fn test_dispatch_binds_matching_type() {
        for dtype in [DType::F64, DType::F32, DType::I64, DType::I32, DType::U64, DType::U32] {
            assert_eq!(size_via_dispatch(dtype), dtype.size_in_bytes());
            assert_eq!(dtype_via_dispatch(dtype), dtype);
        }
    }
}
