//! Batch processor behaviour on real directories: ordering, progress,
//! abort on first failure, background execution and cancellation.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use gostfile_core::{Algorithm, Direction, ErrorKind, PathState, TaskStatus};
use gostfile_crypto::SealOptions;
use gostfile_engine::{
    classify, BatchOutcome, BatchProcessor, BatchProgress, BatchRequest, ProgressFn,
};
use secrecy::SecretString;
use tempfile::TempDir;

fn write_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).expect("write test file");
    path
}

fn request(paths: Vec<PathBuf>, direction: Direction, algorithm: Algorithm) -> BatchRequest {
    BatchRequest {
        paths,
        direction,
        algorithm,
        password: SecretString::from("batch-password"),
    }
}

fn recording_progress() -> (ProgressFn, Arc<Mutex<Vec<BatchProgress>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let cb: ProgressFn = Box::new(move |p: &BatchProgress| sink.lock().unwrap().push(p.clone()));
    (cb, seen)
}

#[test]
fn batch_encrypts_then_decrypts_directory() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("tree");
    write_test_file(&root, "b.txt", b"bee");
    write_test_file(&root, "a/one.txt", b"one");
    write_test_file(&root, "a/two.txt", b"two");

    let processor = BatchProcessor::default();
    let (cb, seen) = recording_progress();

    let report = processor.run(
        &request(vec![root.clone()], Direction::Encrypt, Algorithm::Magma),
        Some(&cb),
    );
    assert!(report.is_success(), "{:?}", report.outcome);
    assert_eq!(report.completed(), 3);
    assert_eq!(
        report.outputs,
        vec![
            root.join("a/one.txt.mag"),
            root.join("a/two.txt.mag"),
            root.join("b.txt.mag"),
        ]
    );

    let progress = seen.lock().unwrap().clone();
    let counts: Vec<_> = progress.iter().map(|p| (p.completed, p.total)).collect();
    assert_eq!(counts, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(progress[0].path, root.join("a/one.txt"));

    let report = processor.run(
        &request(vec![root.clone()], Direction::Decrypt, Algorithm::Magma),
        None,
    );
    assert!(report.is_success(), "{:?}", report.outcome);
    assert_eq!(std::fs::read(root.join("a/two.txt")).unwrap(), b"two");
    assert_eq!(classify(&root.join("b.txt")), PathState::Current);
}

#[test]
fn batch_aborts_on_first_failure() {
    let tmp = TempDir::new().unwrap();
    let first = write_test_file(tmp.path(), "1.txt", b"first");
    let second = write_test_file(tmp.path(), "2.txt", b"second");
    let third = write_test_file(tmp.path(), "3.txt", b"third");

    // the second file becomes unreadable after the batch was assembled
    std::fs::remove_file(&second).unwrap();

    let (cb, seen) = recording_progress();
    let report = BatchProcessor::default().run(
        &request(
            vec![first.clone(), second.clone(), third.clone()],
            Direction::Encrypt,
            Algorithm::Kuznyechik,
        ),
        Some(&cb),
    );

    let failure = report.failure().expect("batch must fail");
    assert_eq!(failure.path, second);
    assert_eq!(failure.kind(), ErrorKind::Io);

    let statuses: Vec<_> = report.tasks.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![TaskStatus::Done, TaskStatus::Failed, TaskStatus::Pending]
    );

    // file 1 stays converted, file 3 was never touched
    assert!(!first.exists());
    assert!(tmp.path().join("1.txt.kuz").exists());
    assert_eq!(std::fs::read(&third).unwrap(), b"third");
    assert!(!tmp.path().join("3.txt.kuz").exists());
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn batch_wrong_password_stops_decrypt() {
    let tmp = TempDir::new().unwrap();
    let a = write_test_file(tmp.path(), "a.txt", b"a");
    let b = write_test_file(tmp.path(), "b.txt", b"b");

    let processor = BatchProcessor::default();
    let report = processor.run(
        &request(vec![a.clone(), b.clone()], Direction::Encrypt, Algorithm::Magma),
        None,
    );
    assert!(report.is_success());

    let mut req = request(report.outputs.clone(), Direction::Decrypt, Algorithm::Magma);
    req.password = SecretString::from("not-the-password");
    let report = processor.run(&req, None);

    let failure = report.failure().expect("wrong password must fail");
    assert_eq!(failure.path, tmp.path().join("a.txt.mag"));
    assert_eq!(failure.kind(), ErrorKind::Integrity);
    assert!(!a.exists());
    assert!(tmp.path().join("b.txt.mag").exists());
}

#[test]
fn batch_refuses_reencrypting_before_dispatch() {
    let tmp = TempDir::new().unwrap();
    let plain = write_test_file(tmp.path(), "plain.txt", b"plain");
    write_test_file(tmp.path(), "sealed.txt.mag", b"not really a container");

    let report = BatchProcessor::default().run(
        &request(vec![tmp.path().to_path_buf()], Direction::Encrypt, Algorithm::Magma),
        None,
    );

    let failure = report.failure().expect("must refuse");
    assert_eq!(failure.path, tmp.path().join("sealed.txt.mag"));
    assert_eq!(failure.kind(), ErrorKind::Validation);
    assert!(report.tasks.is_empty());
    assert!(plain.exists());
}

#[test]
fn batch_uses_configured_options() {
    let config: gostfile_core::config::GostfileConfig = toml::from_str(
        r#"
[crypto]
key_separation = true

[batch]
include_hidden = true
"#,
    )
    .unwrap();
    let processor = BatchProcessor::from_config(&config);
    assert_eq!(
        processor.options(),
        &SealOptions {
            key_separation: true,
            ..SealOptions::default()
        }
    );

    let tmp = TempDir::new().unwrap();
    write_test_file(tmp.path(), ".env", b"SECRET=1");
    let report = processor.run(
        &request(vec![tmp.path().to_path_buf()], Direction::Encrypt, Algorithm::Kuznyechik),
        None,
    );
    assert!(report.is_success());
    assert_eq!(report.outputs, vec![tmp.path().join(".env.kuz")]);
}

#[test]
fn spawned_batch_runs_to_completion() {
    let tmp = TempDir::new().unwrap();
    let files: Vec<_> = (0..3)
        .map(|i| write_test_file(tmp.path(), &format!("{i}.dat"), &[i as u8; 10]))
        .collect();

    let handle = BatchProcessor::default().spawn(
        request(files, Direction::Encrypt, Algorithm::Kuznyechik),
        None,
    );
    let report = handle.join();
    assert!(report.is_success());
    assert_eq!(report.completed(), 3);
}

#[test]
fn spawned_batch_cancels_between_tasks() {
    let tmp = TempDir::new().unwrap();
    let files: Vec<_> = (0..4)
        .map(|i| write_test_file(tmp.path(), &format!("{i}.dat"), &[i as u8; 10]))
        .collect();

    let processor = BatchProcessor::default();
    let token = processor.cancel_token();
    let cb: ProgressFn = Box::new(move |p: &BatchProgress| {
        if p.completed == 1 {
            token.cancel();
        }
    });

    let report = processor
        .spawn(
            request(files.clone(), Direction::Encrypt, Algorithm::Magma),
            Some(cb),
        )
        .join();

    assert!(matches!(report.outcome, BatchOutcome::Cancelled));
    let statuses: Vec<_> = report.tasks.iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![
            TaskStatus::Done,
            TaskStatus::Pending,
            TaskStatus::Pending,
            TaskStatus::Pending
        ]
    );
    assert!(tmp.path().join("0.dat.mag").exists());
    for f in &files[1..] {
        assert!(f.exists());
    }
}

#[test]
fn handle_cancel_stops_pending_work() {
    let tmp = TempDir::new().unwrap();
    let file = write_test_file(tmp.path(), "only.dat", b"x");

    let processor = BatchProcessor::default();
    processor.cancel_token().cancel();
    let handle = processor.spawn(
        request(vec![file.clone()], Direction::Encrypt, Algorithm::Magma),
        None,
    );
    handle.cancel();
    let report = handle.join();

    assert!(matches!(report.outcome, BatchOutcome::Cancelled));
    assert!(file.exists());
}
