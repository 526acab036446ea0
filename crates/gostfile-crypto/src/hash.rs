//! 256-bit hash capability, bound to Streebog (GOST R 34.11-2012)

use streebog::Digest;

/// A hash function producing 32-byte digests.
pub trait Hash256 {
    fn digest(&self, data: &[u8]) -> [u8; 32];

    /// Digest of the concatenation of `parts`, without materializing it.
    fn digest_parts(&self, parts: &[&[u8]]) -> [u8; 32] {
        self.digest(&parts.concat())
    }
}

/// Streebog in 256-bit output mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Streebog256;

impl Hash256 for Streebog256 {
    fn digest(&self, data: &[u8]) -> [u8; 32] {
        self.digest_parts(&[data])
    }

    fn digest_parts(&self, parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = streebog::Streebog256::new();
        for part in parts {
            hasher.update(part);
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(&hasher.finalize());
        out
    }
}
