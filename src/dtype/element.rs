//! Element trait for mapping Rust types to DType

use super::{DType, WIDE_WORD_BYTES};
use bytemuck::{Pod, Zeroable};

/// Trait for types that can be copied by the kernels
///
/// This trait connects Rust's type system to the runtime dtype used for
/// kernel naming and buffer bookkeeping.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Safe reinterpretation as bytes and wide words (bytemuck)
/// - `PartialEq + Debug` - Comparison in checks and test diagnostics
pub trait Element:
    Copy + Send + Sync + Pod + Zeroable + PartialEq + std::fmt::Debug + 'static
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Elements per 16-byte wide word
    const VECTOR_LENGTH: usize = WIDE_WORD_BYTES / std::mem::size_of::<Self>();
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;
            }
        )*
    };
}

impl_element! {
    f64 => F64,
    f32 => F32,
    i64 => I64,
    i32 => I32,
    u64 => U64,
    u32 => U32,
}
