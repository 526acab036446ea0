//! gostfile-engine: turns the in-memory container format into file operations
//!
//!   - `pipeline`: encrypt or decrypt one file, write atomically, remove the source
//!   - `batch`: expand directories, run tasks one at a time, stop on first failure
//!   - `classify`: infer a path's status from which siblings exist on disk

pub mod batch;
pub mod classify;
pub mod pipeline;

pub use batch::{
    collect_files, BatchFailure, BatchHandle, BatchOutcome, BatchProcessor, BatchProgress,
    BatchReport, BatchRequest, CancelToken, ProgressFn,
};
pub use classify::{classify, relocate};
pub use pipeline::{decrypt_file, encrypt_file, FileResult};
