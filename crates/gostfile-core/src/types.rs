use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Block cipher selecting both the container layout and the filename suffix.
///
/// Both variants take a 256-bit key; they differ in block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// GOST R 34.12-2015 "Kuznyechik", 128-bit block, `.kuz`
    Kuznyechik,
    /// GOST R 34.12-2015 "Magma", 64-bit block, `.mag`
    Magma,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Kuznyechik, Algorithm::Magma];

    pub fn block_size(self) -> usize {
        match self {
            Self::Kuznyechik => 16,
            Self::Magma => 8,
        }
    }

    /// Filename suffix including the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Kuznyechik => ".kuz",
            Self::Magma => ".mag",
        }
    }

    /// Extension without the dot, as reported by [`Path::extension`].
    pub fn extension(self) -> &'static str {
        &self.suffix()[1..]
    }

    /// The algorithm whose suffix `path` carries (case-insensitive), if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL
            .into_iter()
            .find(|alg| ext.eq_ignore_ascii_case(alg.extension()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Kuznyechik => "kuznyechik",
            Self::Magma => "magma",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kuznyechik" | "kuznechik" | "kuz" => Ok(Self::Kuznyechik),
            "magma" | "mag" => Ok(Self::Magma),
            other => Err(format!(
                "unsupported algorithm '{other}' (expected kuznyechik or magma)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// How `unpad` treats a buffer whose trailing bytes are not valid padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingMode {
    /// Leave the buffer unchanged and report no error
    #[default]
    Lenient,
    /// Reject with a format error
    Strict,
}

/// Lifecycle of a single file inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
    Failed,
}

/// One file of a batch. Only the batch processor mutates `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTask {
    pub path: PathBuf,
    pub direction: Direction,
    pub algorithm: Algorithm,
    pub status: TaskStatus,
}

impl FileTask {
    pub fn new(path: PathBuf, direction: Direction, algorithm: Algorithm) -> Self {
        Self {
            path,
            direction,
            algorithm,
            status: TaskStatus::Pending,
        }
    }
}

/// Encryption status of a path as inferred from the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "algorithm", rename_all = "lowercase")]
pub enum PathState {
    /// Path carries a known algorithm suffix
    Encrypted(Algorithm),
    /// Plain path with an encrypted sibling left next to it
    Decrypted(Algorithm),
    /// Plain path with no encrypted sibling
    Current,
    /// Neither the path nor an encrypted sibling exists
    Missing,
}
