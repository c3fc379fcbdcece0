//! Reversible obfuscation codecs for values at rest.
//!
//! Nothing in this module is encryption.  Both variants hide stored
//! values from casual inspection of the backing files and nothing more:
//! there is no integrity check, no authentication, and both fall to
//! known-plaintext or frequency analysis.
//!
//! This module provides:
//! - The `ObfuscationCodec` capability implemented by every variant
//! - Repeating-key XOR over raw bytes (`xor`)
//! - Fixed-offset alphabetic shift (`shift`)

pub mod shift;
pub mod xor;

pub use shift::ShiftCodec;
pub use xor::XorCodec;

/// A reversible byte transform applied to values before they hit disk.
///
/// Implementations must guarantee `reveal(&obscure(x)) == x` for every
/// input and must preserve length.
pub trait ObfuscationCodec {
    /// Short, stable name used in logs ("xor", "shift").
    fn name(&self) -> &'static str;

    /// Forward transform, applied when writing.
    fn obscure(&self, plain: &[u8]) -> Vec<u8>;

    /// Inverse transform, applied when reading.
    fn reveal(&self, obscured: &[u8]) -> Vec<u8>;
}
