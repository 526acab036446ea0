//! Block cipher capability and its GOST R 34.12-2015 bindings
//!
//! Everything above this module sees a cipher only as "something with a
//! block size that can transform one block in place". The round functions
//! live in the RustCrypto `kuznyechik` and `magma` crates.

use kuznyechik::cipher::generic_array::GenericArray;
use kuznyechik::cipher::{BlockDecrypt, BlockEncrypt, BlockSizeUser, KeyInit};

use gostfile_core::{Algorithm, GostError, GostResult, KEY_SIZE};

/// Fixed-block cipher keyed once at construction.
pub trait BlockCipher {
    /// Block length in bytes (8 or 16 for the supported algorithms).
    fn block_size(&self) -> usize;

    /// Encrypt exactly `block_size()` bytes in place.
    ///
    /// Panics if `block.len() != self.block_size()`.
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypt exactly `block_size()` bytes in place.
    ///
    /// Panics if `block.len() != self.block_size()`.
    fn decrypt_block(&self, block: &mut [u8]);
}

/// Adapter from a RustCrypto block cipher to [`BlockCipher`].
pub struct GostCipher<C> {
    inner: C,
}

pub type Kuznyechik = GostCipher<kuznyechik::Kuznyechik>;
pub type Magma = GostCipher<magma::Magma>;

impl<C: KeyInit> GostCipher<C> {
    /// Key the cipher. Both GOST ciphers take a 256-bit key; anything else
    /// is rejected.
    pub fn new(key: &[u8]) -> GostResult<Self> {
        if key.len() != KEY_SIZE {
            return Err(GostError::validation(format!(
                "cipher key must be {KEY_SIZE} bytes, got {}",
                key.len()
            )));
        }
        let inner = C::new_from_slice(key)
            .map_err(|e| GostError::validation(format!("cipher key rejected: {e}")))?;
        Ok(Self { inner })
    }
}

impl<C> BlockCipher for GostCipher<C>
where
    C: BlockEncrypt + BlockDecrypt,
{
    fn block_size(&self) -> usize {
        <C as BlockSizeUser>::block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.inner.encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.inner.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

impl<C> std::fmt::Debug for GostCipher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GostCipher")
            .field("cipher", &std::any::type_name::<C>())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Build the cipher for `algorithm` keyed with `key`.
pub fn cipher_for(algorithm: Algorithm, key: &[u8; KEY_SIZE]) -> GostResult<Box<dyn BlockCipher>> {
    Ok(match algorithm {
        Algorithm::Kuznyechik => Box::new(Kuznyechik::new(key)?),
        Algorithm::Magma => Box::new(Magma::new(key)?),
    })
}
