//! PKCS#7-style block padding
//!
//! `pad` always appends between 1 and `block_size` bytes, each equal to the
//! pad length, so an aligned input still gains a full block and the result
//! is never ambiguous.

use gostfile_core::{GostError, GostResult, PaddingMode};

/// Pad `data` to a positive multiple of `block_size`.
pub fn pad(data: &[u8], block_size: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&block_size));
    let pad_len = block_size - data.len() % block_size;
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    out
}

/// Strip padding added by [`pad`].
///
/// In [`PaddingMode::Lenient`] a buffer that does not end in valid padding
/// is returned unchanged. [`PaddingMode::Strict`] rejects it instead.
pub fn unpad(mut padded: Vec<u8>, block_size: usize, mode: PaddingMode) -> GostResult<Vec<u8>> {
    match padding_len(&padded, block_size) {
        Some(n) => {
            padded.truncate(padded.len() - n);
            Ok(padded)
        }
        None => match mode {
            PaddingMode::Lenient => Ok(padded),
            PaddingMode::Strict => Err(GostError::format(format!(
                "invalid padding for {block_size}-byte blocks ({} bytes)",
                padded.len()
            ))),
        },
    }
}

/// Number of trailing padding bytes, if the tail is well-formed.
fn padding_len(padded: &[u8], block_size: usize) -> Option<usize> {
    let &last = padded.last()?;
    let n = last as usize;
    if n == 0 || n > block_size || n > padded.len() {
        return None;
    }
    padded[padded.len() - n..]
        .iter()
        .all(|&b| b == last)
        .then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pad_unaligned() {
        let padded = pad(b"HELLO WORLD", 16);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[11..], &[5u8; 5]);
    }

    #[test]
    fn test_pad_aligned_adds_full_block() {
        let padded = pad(&[0xAA; 8], 8);
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[8..], &[8u8; 8]);
    }

    #[test]
    fn test_pad_empty() {
        assert_eq!(pad(b"", 16), vec![16u8; 16]);
    }

    #[test]
    fn test_lenient_leaves_malformed_unchanged() {
        // last byte claims 3 bytes of padding, but the tail disagrees
        let buf = vec![1, 2, 3, 4, 5, 9, 1, 3];
        assert_eq!(unpad(buf.clone(), 8, PaddingMode::Lenient).unwrap(), buf);

        // pad byte larger than the block
        let buf = vec![0u8, 0, 0, 0, 0, 0, 0, 9];
        assert_eq!(unpad(buf.clone(), 8, PaddingMode::Lenient).unwrap(), buf);

        // zero pad byte
        let buf = vec![1u8, 0];
        assert_eq!(unpad(buf.clone(), 8, PaddingMode::Lenient).unwrap(), buf);

        assert!(unpad(Vec::new(), 8, PaddingMode::Lenient).unwrap().is_empty());
    }

    #[test]
    fn test_strict_rejects_malformed() {
        for buf in [vec![1, 2, 3, 4, 5, 9, 1, 3], vec![0u8; 8], Vec::new()] {
            let err = unpad(buf, 8, PaddingMode::Strict).unwrap_err();
            assert_eq!(err.kind(), gostfile_core::ErrorKind::Format);
        }
    }

    #[test]
    fn test_strict_accepts_valid() {
        let padded = pad(b"abc", 8);
        assert_eq!(unpad(padded, 8, PaddingMode::Strict).unwrap(), b"abc");
    }

    proptest! {
        #[test]
        fn pad_unpad_identity(
            data in proptest::collection::vec(any::<u8>(), 0..=160),
            wide in any::<bool>(),
        ) {
            let bs = if wide { 16 } else { 8 };
            let padded = pad(&data, bs);
            prop_assert!(padded.len() > data.len());
            prop_assert_eq!(padded.len() % bs, 0);
            for mode in [PaddingMode::Lenient, PaddingMode::Strict] {
                prop_assert_eq!(&unpad(padded.clone(), bs, mode).unwrap(), &data);
            }
        }
    }
}
