//! Data type system for device buffers
//!
//! This module provides the `DType` enum describing the element type of a
//! device buffer, the `Element` trait tying Rust types to it, and the
//! `WideWord` view used by the vectorized copy strategies.

mod element;
mod wide;

pub use element::Element;
pub use wide::{WIDE_WORD_BYTES, WideWord};

use std::fmt;

/// Element types a copy kernel can move
///
/// Only 4- and 8-byte types are supported: their size divides the 16-byte
/// wide word evenly, and every backend (including WebGPU, which addresses
/// storage in 32-bit units) can move them bit-exactly.
///
/// # Discriminant Values
///
/// - Floats: 0-9 (F64=0, F32=1)
/// - Signed ints: 10-19 (I64=10, I32=11)
/// - Unsigned ints: 20-29 (U64=20, U32=21)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point
    F32 = 1,
    /// 64-bit signed integer
    I64 = 10,
    /// 32-bit signed integer
    I32 = 11,
    /// 64-bit unsigned integer
    U64 = 20,
    /// 32-bit unsigned integer
    U32 = 21,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 | Self::I64 | Self::U64 => 8,
            Self::F32 | Self::I32 | Self::U32 => 4,
        }
    }

    /// Number of elements carried by one wide word
    #[inline]
    pub const fn vector_length(self) -> usize {
        WIDE_WORD_BYTES / self.size_in_bytes()
    }

    /// Number of 32-bit units per element (WebGPU addressing granularity)
    #[inline]
    pub const fn units_per_element(self) -> usize {
        self.size_in_bytes() / 4
    }

    /// Short name for display and kernel suffixes (e.g., "f32", "i64")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::I64 => "i64",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::U32 => "u32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
