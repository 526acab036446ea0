//! Counter mode over any [`BlockCipher`]
//!
//! Keystream block `i` is `E(iv + i)`, where the counter is the whole
//! block read as a big-endian integer and wraps at `2^(8*B)`. Only the
//! forward cipher direction is used, so encryption and decryption are the
//! same call.

use zeroize::Zeroize;

use gostfile_core::{GostError, GostResult};

use crate::cipher::BlockCipher;

/// XOR `data` with the keystream generated from `iv`.
///
/// `iv` must be exactly one block long; it is copied, never modified.
/// A trailing partial chunk consumes only as many keystream bytes as it has.
pub fn apply_keystream<C: BlockCipher + ?Sized>(
    data: &[u8],
    cipher: &C,
    iv: &[u8],
) -> GostResult<Vec<u8>> {
    let block_size = cipher.block_size();
    if iv.len() != block_size {
        return Err(GostError::validation(format!(
            "counter must be {block_size} bytes, got {}",
            iv.len()
        )));
    }

    let mut counter = iv.to_vec();
    let mut keystream = vec![0u8; block_size];
    let mut out = Vec::with_capacity(data.len());

    for chunk in data.chunks(block_size) {
        keystream.copy_from_slice(&counter);
        cipher.encrypt_block(&mut keystream);
        out.extend(chunk.iter().zip(&keystream).map(|(d, k)| d ^ k));
        increment_counter(&mut counter);
    }

    keystream.zeroize();
    counter.zeroize();
    Ok(out)
}

/// Add one to `counter` as a big-endian integer, wrapping on overflow.
pub fn increment_counter(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        *byte = byte.wrapping_add(1);
        if *byte != 0 {
            break;
        }
    }
}
