//! Key derivation: iterated Streebog-256 over salt || previous key

use zeroize::Zeroize;

use crate::hash::{Hash256, Streebog256};
use crate::{KEY_SIZE, SALT_SIZE};

/// Hash rounds applied to `salt || key`. Part of the container contract:
/// changing it makes every existing container undecryptable.
pub const KDF_ROUNDS: usize = 1000;

const ENC_LABEL: &[u8] = b"gostfile/enc";
const MAC_LABEL: &[u8] = b"gostfile/mac";

/// A 256-bit key derived from a password, scoped to one file operation.
///
/// Zeroized on drop.
#[derive(Clone)]
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl PartialEq for DerivedKey {
    fn eq(&self, other: &Self) -> bool {
        use subtle::ConstantTimeEq;
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for DerivedKey {}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a key from `password` and `salt` with Streebog-256.
///
/// `k0 = password`, `k(i+1) = H(salt || k(i))`, result is `k(1000)`.
/// Deterministic: decryption re-derives the same key from the stored salt.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_SIZE]) -> DerivedKey {
    derive_key_with(&Streebog256, password, salt)
}

/// [`derive_key`] over an arbitrary 256-bit hash.
pub fn derive_key_with<H: Hash256 + ?Sized>(
    hasher: &H,
    password: &[u8],
    salt: &[u8; SALT_SIZE],
) -> DerivedKey {
    let mut key = hasher.digest_parts(&[&salt[..], password]);
    for _ in 1..KDF_ROUNDS {
        key = hasher.digest_parts(&[&salt[..], &key[..]]);
    }
    let derived = DerivedKey::from_bytes(key);
    key.zeroize();
    derived
}

/// The pair of keys a container is processed with.
#[derive(Debug, Clone)]
pub struct SessionKeys {
    pub enc: DerivedKey,
    pub mac: DerivedKey,
}

impl SessionKeys {
    /// One key for both encryption and authentication (the on-disk default).
    pub fn shared(key: DerivedKey) -> Self {
        Self {
            enc: key.clone(),
            mac: key,
        }
    }

    /// Independent subkeys: `H(label || key)` with distinct labels.
    pub fn separated(key: &DerivedKey) -> Self {
        Self::separated_with(&Streebog256, key)
    }

    pub fn separated_with<H: Hash256 + ?Sized>(hasher: &H, key: &DerivedKey) -> Self {
        Self {
            enc: DerivedKey::from_bytes(hasher.digest_parts(&[ENC_LABEL, &key.as_bytes()[..]])),
            mac: DerivedKey::from_bytes(hasher.digest_parts(&[MAC_LABEL, &key.as_bytes()[..]])),
        }
    }
}
