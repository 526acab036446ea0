//! Whole-buffer encrypt/decrypt: padding + CTR + tag + container
//!
//! The file pipeline reads the source, calls [`seal`] or [`open`], and
//! writes the result; everything between those two I/O steps lives here.

use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use gostfile_core::{Algorithm, GostError, GostResult, PaddingMode, SALT_SIZE};

use crate::cipher::cipher_for;
use crate::container::Container;
use crate::ctr::apply_keystream;
use crate::kdf::{derive_key, SessionKeys};
use crate::mac::{compute_tag, verify_tag};
use crate::padding::{pad, unpad};

/// Options that change how a container is produced or read back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SealOptions {
    pub padding: PaddingMode,
    /// Encrypt and authenticate with domain-separated subkeys instead of
    /// the derived key itself. Must match between seal and open.
    pub key_separation: bool,
}

fn session_keys(
    password: &SecretString,
    salt: &[u8; SALT_SIZE],
    options: &SealOptions,
) -> GostResult<SessionKeys> {
    let password = password.expose_secret();
    if password.is_empty() {
        return Err(GostError::validation("password must not be empty"));
    }
    let key = derive_key(password.as_bytes(), salt);
    Ok(if options.key_separation {
        SessionKeys::separated(&key)
    } else {
        SessionKeys::shared(key)
    })
}

/// Encrypt `plaintext` into an encoded container with a fresh random salt and iv.
pub fn seal(
    plaintext: &[u8],
    password: &SecretString,
    algorithm: Algorithm,
    options: &SealOptions,
) -> GostResult<Vec<u8>> {
    let mut rng = rand::thread_rng();
    let mut salt = [0u8; SALT_SIZE];
    rng.fill_bytes(&mut salt);
    let mut iv = vec![0u8; algorithm.block_size()];
    rng.fill_bytes(&mut iv);

    seal_with(plaintext, password, algorithm, options, salt, iv)
}

/// [`seal`] with caller-chosen salt and iv. Reusing a (salt, iv) pair under
/// the same password reuses keystream; only tests should call this.
pub fn seal_with(
    plaintext: &[u8],
    password: &SecretString,
    algorithm: Algorithm,
    options: &SealOptions,
    salt: [u8; SALT_SIZE],
    iv: Vec<u8>,
) -> GostResult<Vec<u8>> {
    let keys = session_keys(password, &salt, options)?;
    let cipher = cipher_for(algorithm, keys.enc.as_bytes())?;

    let padded = pad(plaintext, algorithm.block_size());
    let ciphertext = apply_keystream(&padded, &*cipher, &iv)?;
    let tag = compute_tag(&ciphertext, keys.mac.as_bytes());

    debug!(
        %algorithm,
        plaintext = plaintext.len(),
        ciphertext = ciphertext.len(),
        "sealed"
    );

    Ok(Container {
        salt,
        iv,
        ciphertext,
        tag,
    }
    .encode())
}

/// Verify and decrypt an encoded container.
///
/// The tag is checked before any decryption; a mismatch (tampering or a
/// wrong password) is an integrity error.
pub fn open(
    bytes: &[u8],
    password: &SecretString,
    algorithm: Algorithm,
    options: &SealOptions,
) -> GostResult<Vec<u8>> {
    let container = Container::decode(bytes, algorithm)?;
    let keys = session_keys(password, &container.salt, options)?;

    if !verify_tag(&container.tag, &container.ciphertext, keys.mac.as_bytes()) {
        warn!(%algorithm, bytes = bytes.len(), "tag mismatch");
        return Err(GostError::integrity(
            "tag mismatch: wrong password or corrupted container",
        ));
    }

    let cipher = cipher_for(algorithm, keys.enc.as_bytes())?;
    let padded = apply_keystream(&container.ciphertext, &*cipher, &container.iv)?;
    unpad(padded, algorithm.block_size(), options.padding)
}
