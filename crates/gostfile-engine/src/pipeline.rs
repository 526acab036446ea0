//! Single-file encrypt/decrypt
//!
//! Both directions follow the same discipline: validate, read the whole
//! source, transform in memory, write the destination through a
//! uniquely named temporary file in the same directory that is moved into
//! place without clobbering, and only then remove the source.
//! Any failure leaves the source untouched and no destination behind.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, warn};

use gostfile_core::{Algorithm, GostError, GostResult};
use gostfile_crypto::SealOptions;

/// Result of converting a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub algorithm: Algorithm,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Encrypt `source` into `source` + the algorithm's suffix, then delete `source`.
pub fn encrypt_file(
    source: &Path,
    password: &SecretString,
    algorithm: Algorithm,
    options: &SealOptions,
) -> GostResult<FileResult> {
    require_password(password)?;

    let destination = with_appended_suffix(source, algorithm.suffix());
    require_absent(&destination)?;

    let plaintext = std::fs::read(source).map_err(|e| GostError::io(source, e))?;
    let container = gostfile_crypto::seal(&plaintext, password, algorithm, options)?;

    replace_source(source, &destination, &container)?;

    info!(
        path = %source.display(),
        dest = %destination.display(),
        %algorithm,
        bytes = plaintext.len(),
        "encrypted"
    );

    Ok(FileResult {
        source: source.to_path_buf(),
        destination,
        algorithm,
        bytes_in: plaintext.len() as u64,
        bytes_out: container.len() as u64,
    })
}

/// Verify and decrypt `source`, writing the plaintext next to it with the
/// suffix stripped, then delete `source`.
///
/// `algorithm` is always the caller's choice; the filename suffix must
/// agree with it but is never used to pick the cipher.
pub fn decrypt_file(
    source: &Path,
    password: &SecretString,
    algorithm: Algorithm,
    options: &SealOptions,
) -> GostResult<FileResult> {
    require_password(password)?;

    if Algorithm::from_path(source) != Some(algorithm) {
        return Err(GostError::validation(format!(
            "{} does not end in {}",
            source.display(),
            algorithm.suffix()
        )));
    }

    let destination = source.with_extension("");
    require_absent(&destination)?;

    let container = std::fs::read(source).map_err(|e| GostError::io(source, e))?;
    let plaintext = gostfile_crypto::open(&container, password, algorithm, options)?;

    replace_source(source, &destination, &plaintext)?;

    info!(
        path = %source.display(),
        dest = %destination.display(),
        %algorithm,
        bytes = plaintext.len(),
        "decrypted"
    );

    Ok(FileResult {
        source: source.to_path_buf(),
        destination,
        algorithm,
        bytes_in: container.len() as u64,
        bytes_out: plaintext.len() as u64,
    })
}

fn require_password(password: &SecretString) -> GostResult<()> {
    if password.expose_secret().is_empty() {
        return Err(GostError::validation("password must not be empty"));
    }
    Ok(())
}

fn require_absent(destination: &Path) -> GostResult<()> {
    if destination.symlink_metadata().is_ok() {
        return Err(GostError::validation(format!(
            "destination already exists: {}",
            destination.display()
        )));
    }
    Ok(())
}

/// `a.txt` + `.kuz` = `a.txt.kuz`
fn with_appended_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Write `bytes` to `destination` atomically, then remove `source`.
///
/// If the source cannot be removed the destination is removed again, so
/// the file is left exactly as it was before the call.
fn replace_source(source: &Path, destination: &Path, bytes: &[u8]) -> GostResult<()> {
    write_new(destination, bytes)?;
    debug!(dest = %destination.display(), bytes = bytes.len(), "destination written");

    if let Err(e) = std::fs::remove_file(source) {
        discard(destination);
        return Err(GostError::io(source, e));
    }
    Ok(())
}

/// Create `destination` holding `bytes`, refusing if anything already sits there.
///
/// The temporary file is deleted on every failure path when it is dropped.
fn write_new(destination: &Path, bytes: &[u8]) -> GostResult<()> {
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".gostfile-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| GostError::io(dir, e))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| GostError::io(tmp.path(), e))?;

    match tmp.persist_noclobber(destination) {
        Ok(_) => Ok(()),
        Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(GostError::validation(format!(
                "destination already exists: {}",
                destination.display()
            )))
        }
        Err(e) => Err(GostError::io(destination, e.error)),
    }
}

fn discard(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove partial output");
        }
    }
}
