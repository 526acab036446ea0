//! Path status from filesystem state
//!
//! Nothing here reads file contents; only existence is queried.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use gostfile_core::{Algorithm, PathState};

/// Infer the status of `path`.
///
/// - a known suffix: `Encrypted` if it exists, `Missing` if not
/// - an encrypted sibling exists: `Decrypted` with the sibling's algorithm
/// - otherwise `Current` if the path exists, `Missing` if not
pub fn classify(path: &Path) -> PathState {
    if let Some(algorithm) = Algorithm::from_path(path) {
        return if exists(path) {
            PathState::Encrypted(algorithm)
        } else {
            PathState::Missing
        };
    }

    if let Some((_, algorithm)) = encrypted_sibling(path) {
        return PathState::Decrypted(algorithm);
    }

    if exists(path) {
        PathState::Current
    } else {
        PathState::Missing
    }
}

/// Find the encrypted file that replaced `path`, if `path` no longer exists.
///
/// Looks for `path` + suffix first, then the base-name form `stem` + suffix,
/// Kuznyechik before Magma.
pub fn relocate(path: &Path) -> Option<(PathBuf, Algorithm)> {
    if exists(path) || Algorithm::from_path(path).is_some() {
        return None;
    }
    encrypted_sibling(path)
}

fn encrypted_sibling(path: &Path) -> Option<(PathBuf, Algorithm)> {
    sibling_candidates(path)
        .into_iter()
        .find(|(candidate, _)| exists(candidate))
}

fn sibling_candidates(path: &Path) -> Vec<(PathBuf, Algorithm)> {
    let mut candidates = Vec::with_capacity(4);
    for algorithm in Algorithm::ALL {
        let mut appended = OsString::from(path.as_os_str());
        appended.push(algorithm.suffix());
        candidates.push((PathBuf::from(appended), algorithm));
    }
    if path.extension().is_some() {
        for algorithm in Algorithm::ALL {
            candidates.push((path.with_extension(algorithm.extension()), algorithm));
        }
    }
    candidates
}

fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
