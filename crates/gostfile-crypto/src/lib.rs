//! gostfile-crypto: password-based authenticated encryption for single files
//!
//! Container layout (binary, no magic, no version):
//! ```text
//! [16 bytes: salt][B bytes: initial counter][k*B bytes: ciphertext][32 bytes: tag]
//! ```
//! where `B` is the cipher block size (16 for Kuznyechik, 8 for Magma).
//!
//! Pipeline:
//! ```text
//! password, salt ──1000 × Streebog-256──▶ key
//! plaintext ──pad(B)──▶ CTR(cipher(key), iv) ──▶ ciphertext ──HMAC-Streebog(key)──▶ tag
//! ```
//!
//! The tag covers the ciphertext only and is checked before any
//! decryption happens.

pub mod cipher;
pub mod container;
pub mod ctr;
pub mod hash;
pub mod kdf;
pub mod mac;
pub mod padding;
pub mod password;
pub mod seal;

pub use cipher::{cipher_for, BlockCipher, GostCipher, Kuznyechik, Magma};
pub use container::Container;
pub use ctr::{apply_keystream, increment_counter};
pub use hash::{Hash256, Streebog256};
pub use kdf::{derive_key, DerivedKey, SessionKeys, KDF_ROUNDS};
pub use mac::{compute_tag, verify_tag};
pub use padding::{pad, unpad};
pub use password::{
    generate_password, password_strength, prehash_password, sanitize_password, GeneratorOptions,
    Strength,
};
pub use seal::{open, seal, seal_with, SealOptions};

pub use gostfile_core::{KEY_SIZE, SALT_SIZE, TAG_SIZE};
