pub mod config;
pub mod error;
pub mod types;

pub use error::{ErrorKind, GostError, GostResult};
pub use types::{Algorithm, Direction, FileTask, PaddingMode, PathState, TaskStatus};

/// Salt length stored at the head of every container
pub const SALT_SIZE: usize = 16;

/// Derived key length (256-bit)
pub const KEY_SIZE: usize = 32;

/// Streebog-256 tag length appended to every container
pub const TAG_SIZE: usize = 32;
