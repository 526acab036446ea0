//! HMAC over Streebog-256 with a 32-byte pad block
//!
//! `tag = H((K ^ opad) || H((K ^ ipad) || message))`, where `K` is the key
//! hashed down (if longer than 32 bytes) or zero-extended to 32 bytes.
//! Unlike RFC 2104 the pads are 32 bytes rather than the hash's 64-byte
//! block, so tags are not interchangeable with `hmac::Hmac<Streebog256>`.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::hash::{Hash256, Streebog256};
use crate::TAG_SIZE;

const PAD_SIZE: usize = 32;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// Compute the tag of `message` under `key`.
pub fn compute_tag(message: &[u8], key: &[u8]) -> [u8; TAG_SIZE] {
    compute_tag_with(&Streebog256, message, key)
}

pub fn compute_tag_with<H: Hash256 + ?Sized>(
    hasher: &H,
    message: &[u8],
    key: &[u8],
) -> [u8; TAG_SIZE] {
    let mut k = [0u8; PAD_SIZE];
    if key.len() > PAD_SIZE {
        k = hasher.digest(key);
    } else {
        k[..key.len()].copy_from_slice(key);
    }

    let mut ipad = [IPAD; PAD_SIZE];
    let mut opad = [OPAD; PAD_SIZE];
    for i in 0..PAD_SIZE {
        ipad[i] ^= k[i];
        opad[i] ^= k[i];
    }

    let inner = hasher.digest_parts(&[&ipad[..], message]);
    let tag = hasher.digest_parts(&[&opad[..], &inner[..]]);

    k.zeroize();
    ipad.zeroize();
    opad.zeroize();
    tag
}

/// Check `tag` against the recomputed tag in constant time.
pub fn verify_tag(tag: &[u8], message: &[u8], key: &[u8]) -> bool {
    let mut expected = compute_tag(message, key);
    let ok = expected[..].ct_eq(tag).into();
    expected.zeroize();
    ok
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matches_construction() {
        let key = [0x0bu8; 32];
        let msg = b"ciphertext bytes";
        let h = Streebog256;

        let mut ipad = [0u8; 32];
        let mut opad = [0u8; 32];
        for i in 0..32 {
            ipad[i] = key[i] ^ 0x36;
            opad[i] = key[i] ^ 0x5c;
        }
        let inner = h.digest(&[&ipad[..], &msg[..]].concat());
        let expected = h.digest(&[&opad[..], &inner[..]].concat());

        assert_eq!(compute_tag(msg, &key), expected);
    }

    #[test]
    fn test_short_key_is_zero_extended() {
        let mut padded = [0u8; 32];
        padded[..3].copy_from_slice(b"abc");
        assert_eq!(compute_tag(b"m", b"abc"), compute_tag(b"m", &padded));
    }

    #[test]
    fn test_long_key_is_hashed() {
        let long = [0x11u8; 64];
        let hashed = Streebog256.digest(&long);
        assert_eq!(compute_tag(b"m", &long), compute_tag(b"m", &hashed));
    }

    #[test]
    fn test_verify() {
        let key = [5u8; 32];
        let tag = compute_tag(b"payload", &key);
        assert!(verify_tag(&tag, b"payload", &key));
        assert!(!verify_tag(&tag, b"payloaD", &key));
        assert!(!verify_tag(&tag, b"payload", &[6u8; 32]));
        assert!(!verify_tag(&tag[..31], b"payload", &key));
    }

    #[test]
    fn test_any_flipped_bit_fails() {
        let key = [0x77u8; 32];
        let msg: Vec<u8> = (0u8..48).collect();
        let tag = compute_tag(&msg, &key);

        for i in 0..msg.len() * 8 {
            let mut m = msg.clone();
            m[i / 8] ^= 1 << (i % 8);
            assert!(!verify_tag(&tag, &m, &key), "message bit {i}");
        }
        for i in 0..TAG_SIZE * 8 {
            let mut t = tag;
            t[i / 8] ^= 1 << (i % 8);
            assert!(!verify_tag(&t, &msg, &key), "tag bit {i}");
        }
    }
}
