//! On-disk container codec
//!
//! ```text
//! [16 bytes: salt][B bytes: iv][N bytes: ciphertext][32 bytes: tag]
//! ```
//!
//! No length prefixes: salt and tag are fixed, the iv length follows from
//! the algorithm the caller names, and the ciphertext is whatever remains.

use gostfile_core::{Algorithm, GostError, GostResult, SALT_SIZE, TAG_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub salt: [u8; SALT_SIZE],
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

impl Container {
    /// Smallest byte length `decode` accepts for `algorithm`.
    pub fn min_len(algorithm: Algorithm) -> usize {
        SALT_SIZE + algorithm.block_size() + TAG_SIZE
    }

    pub fn encoded_len(&self) -> usize {
        SALT_SIZE + self.iv.len() + self.ciphertext.len() + TAG_SIZE
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    pub fn decode(bytes: &[u8], algorithm: Algorithm) -> GostResult<Self> {
        let min = Self::min_len(algorithm);
        if bytes.len() < min {
            return Err(GostError::format(format!(
                "container too short for {algorithm}: {} bytes (minimum {min})",
                bytes.len()
            )));
        }

        let (salt, rest) = bytes.split_at(SALT_SIZE);
        let (iv, rest) = rest.split_at(algorithm.block_size());
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);

        let mut container = Self {
            salt: [0u8; SALT_SIZE],
            iv: iv.to_vec(),
            ciphertext: ciphertext.to_vec(),
            tag: [0u8; TAG_SIZE],
        };
        container.salt.copy_from_slice(salt);
        container.tag.copy_from_slice(tag);
        Ok(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(alg: Algorithm, ct_len: usize) -> Container {
        Container {
            salt: [0x11; SALT_SIZE],
            iv: vec![0x22; alg.block_size()],
            ciphertext: vec![0x33; ct_len],
            tag: [0x44; TAG_SIZE],
        }
    }

    #[test]
    fn test_layout() {
        let c = sample(Algorithm::Kuznyechik, 16);
        let bytes = c.encode();

        assert_eq!(bytes.len(), 80);
        assert_eq!(&bytes[..16], &[0x11; 16]);
        assert_eq!(&bytes[16..32], &[0x22; 16]);
        assert_eq!(&bytes[32..48], &[0x33; 16]);
        assert_eq!(&bytes[48..], &[0x44; 32]);
    }

    #[test]
    fn test_decode_splits_by_algorithm() {
        for alg in Algorithm::ALL {
            let c = sample(alg, 3 * alg.block_size());
            let decoded = Container::decode(&c.encode(), alg).unwrap();
            assert_eq!(decoded, c);
        }
    }

    #[test]
    fn test_magma_layout_len() {
        assert_eq!(sample(Algorithm::Magma, 16).encode().len(), 72);
    }

    #[test]
    fn test_decode_too_short() {
        for alg in Algorithm::ALL {
            let short = vec![0u8; Container::min_len(alg) - 1];
            let err = Container::decode(&short, alg).unwrap_err();
            assert_eq!(err.kind(), gostfile_core::ErrorKind::Format);
        }
    }

    #[test]
    fn test_decode_minimum_has_empty_ciphertext() {
        let bytes = vec![0u8; Container::min_len(Algorithm::Magma)];
        let c = Container::decode(&bytes, Algorithm::Magma).unwrap();
        assert!(c.ciphertext.is_empty());
    }

    #[test]
    fn test_wrong_algorithm_misplaces_iv() {
        // The algorithm is caller-supplied; decoding with the other one
        // shifts the iv/ciphertext boundary rather than failing.
        let c = sample(Algorithm::Kuznyechik, 16);
        let decoded = Container::decode(&c.encode(), Algorithm::Magma).unwrap();
        assert_eq!(decoded.iv.len(), 8);
        assert_eq!(decoded.ciphertext.len(), 24);
        assert_eq!(decoded.tag, c.tag);
    }
}
