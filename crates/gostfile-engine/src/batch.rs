//! Sequential batch processor
//!
//! A batch is planned up front (directories expanded in place, encrypted
//! sources refused) and then executed one file at a time. The first
//! failure stops the batch; files converted before it stay converted.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use secrecy::SecretString;
use serde::Serialize;
use tracing::{debug, info, warn};

use gostfile_core::config::GostfileConfig;
use gostfile_core::{Algorithm, Direction, ErrorKind, FileTask, GostError, GostResult, TaskStatus};
use gostfile_crypto::SealOptions;

use crate::pipeline::{decrypt_file, encrypt_file};

/// Progress callback, invoked after every completed task
pub type ProgressFn = Box<dyn Fn(&BatchProgress) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
    /// Source path of the task that just completed
    pub path: PathBuf,
}

/// What to run. Password and algorithm are fixed for the whole batch.
#[derive(Debug)]
pub struct BatchRequest {
    pub paths: Vec<PathBuf>,
    pub direction: Direction,
    pub algorithm: Algorithm,
    pub password: SecretString,
}

/// The path that stopped a batch and why
#[derive(Debug)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: GostError,
}

impl BatchFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.path.display(), self.kind(), self.error)
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    Completed,
    Failed(BatchFailure),
    /// Stopped between tasks on request; unstarted tasks stay `Pending`
    Cancelled,
}

#[derive(Debug)]
pub struct BatchReport {
    /// Every planned task with its final status; empty if planning failed
    pub tasks: Vec<FileTask>,
    /// Destinations written, in task order
    pub outputs: Vec<PathBuf>,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Completed)
    }

    pub fn completed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .count()
    }

    pub fn failure(&self) -> Option<&BatchFailure> {
        match &self.outcome {
            BatchOutcome::Failed(f) => Some(f),
            _ => None,
        }
    }

    fn failed_before_start(failure: BatchFailure) -> Self {
        Self {
            tasks: Vec::new(),
            outputs: Vec::new(),
            outcome: BatchOutcome::Failed(failure),
        }
    }
}

/// Shared flag checked between tasks
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchProcessor {
    options: SealOptions,
    include_hidden: bool,
    cancel: CancelToken,
}

impl BatchProcessor {
    pub fn new(options: SealOptions, include_hidden: bool) -> Self {
        Self {
            options,
            include_hidden,
            cancel: CancelToken::default(),
        }
    }

    pub fn from_config(config: &GostfileConfig) -> Self {
        Self::new(
            SealOptions {
                padding: config.crypto.padding,
                key_separation: config.crypto.key_separation,
            },
            config.batch.include_hidden,
        )
    }

    pub fn options(&self) -> &SealOptions {
        &self.options
    }

    /// Token that stops this processor before its next task.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Expand the request into its ordered task list.
    ///
    /// Input order is kept; each directory is replaced in place by its
    /// files in lexicographic full-path order. Encrypting a path that
    /// already carries a known suffix is refused here, before any task runs.
    pub fn plan(&self, request: &BatchRequest) -> Result<Vec<FileTask>, BatchFailure> {
        let mut tasks = Vec::new();

        for root in &request.paths {
            let files = if root.is_dir() {
                collect_files(root, self.include_hidden).map_err(|error| BatchFailure {
                    path: root.clone(),
                    error,
                })?
            } else {
                vec![root.clone()]
            };

            for path in files {
                if request.direction == Direction::Encrypt {
                    if let Some(existing) = Algorithm::from_path(&path) {
                        return Err(BatchFailure {
                            error: GostError::validation(format!(
                                "already encrypted with {existing}"
                            )),
                            path,
                        });
                    }
                }
                tasks.push(FileTask::new(path, request.direction, request.algorithm));
            }
        }

        debug!(tasks = tasks.len(), direction = ?request.direction, "batch planned");
        Ok(tasks)
    }

    /// Plan and execute `request` on the calling thread.
    pub fn run(&self, request: &BatchRequest, progress: Option<&ProgressFn>) -> BatchReport {
        let mut tasks = match self.plan(request) {
            Ok(tasks) => tasks,
            Err(failure) => {
                warn!(path = %failure.path.display(), kind = %failure.kind(), "batch refused");
                return BatchReport::failed_before_start(failure);
            }
        };

        let total = tasks.len();
        let mut outputs = Vec::with_capacity(total);

        for i in 0..total {
            if self.cancel.is_cancelled() {
                info!(completed = i, total, "batch cancelled");
                return BatchReport {
                    tasks,
                    outputs,
                    outcome: BatchOutcome::Cancelled,
                };
            }

            let task = &mut tasks[i];
            task.status = TaskStatus::InProgress;

            let result = match task.direction {
                Direction::Encrypt => {
                    encrypt_file(&task.path, &request.password, task.algorithm, &self.options)
                }
                Direction::Decrypt => {
                    decrypt_file(&task.path, &request.password, task.algorithm, &self.options)
                }
            };

            match result {
                Ok(done) => {
                    task.status = TaskStatus::Done;
                    outputs.push(done.destination);
                    if let Some(cb) = progress {
                        cb(&BatchProgress {
                            completed: i + 1,
                            total,
                            path: task.path.clone(),
                        });
                    }
                }
                Err(error) => {
                    task.status = TaskStatus::Failed;
                    warn!(
                        path = %task.path.display(),
                        kind = %error.kind(),
                        error = %error,
                        completed = i,
                        total,
                        "batch aborted"
                    );
                    let failure = BatchFailure {
                        path: task.path.clone(),
                        error,
                    };
                    return BatchReport {
                        tasks,
                        outputs,
                        outcome: BatchOutcome::Failed(failure),
                    };
                }
            }
        }

        info!(total, "batch completed");
        BatchReport {
            tasks,
            outputs,
            outcome: BatchOutcome::Completed,
        }
    }

    /// Run the same sequential loop on a dedicated worker thread.
    pub fn spawn(self, request: BatchRequest, progress: Option<ProgressFn>) -> BatchHandle {
        let cancel = self.cancel_token();
        let handle = std::thread::spawn(move || self.run(&request, progress.as_ref()));
        BatchHandle { cancel, handle }
    }
}

/// A batch running on a worker thread
#[derive(Debug)]
pub struct BatchHandle {
    cancel: CancelToken,
    handle: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Ask the batch to stop before its next task. The task in flight finishes.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the batch to stop. A panic on the worker is resumed here.
    pub fn join(self) -> BatchReport {
        match self.handle.join() {
            Ok(report) => report,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Recursively collect regular files under `root`, sorted by full path.
///
/// Entries whose name starts with `.` are skipped (and hidden directories
/// not descended into) unless `include_hidden` is set. Symlinks are skipped.
pub fn collect_files(root: &Path, include_hidden: bool) -> GostResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files_inner(root, &mut files, include_hidden)?;
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(files)
}

fn collect_files_inner(dir: &Path, out: &mut Vec<PathBuf>, include_hidden: bool) -> GostResult<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| GostError::io(dir, e))? {
        let entry = entry.map_err(|e| GostError::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| GostError::io(&path, e))?;

        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden && !include_hidden {
            debug!(path = %path.display(), "skipping hidden entry");
            continue;
        }

        if file_type.is_dir() {
            collect_files_inner(&path, out, include_hidden)?;
        } else if file_type.is_file() {
            out.push(path);
        } else {
            debug!(path = %path.display(), "skipping non-regular entry");
        }
    }
    Ok(())
}
