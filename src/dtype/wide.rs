//! Wide word: the 16-byte unit moved by vectorized loads and stores

use bytemuck::{Pod, Zeroable};

/// Size of the widest naturally aligned load/store, in bytes
pub const WIDE_WORD_BYTES: usize = 16;

/// A 16-byte, 16-byte-aligned chunk of a device buffer.
///
/// Kernels never allocate wide words on their own: a `*const WideWord` is a
/// typed view over an existing element buffer (the `int4`/`float4`
/// reinterpretation of GPU code). The only place a `WideWord` lives by value
/// is the per-thread staging array of the register-blocked kernel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C, align(16))]
pub struct WideWord(pub [u32; 4]);
