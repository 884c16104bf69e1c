//! Async file system facade tests
//!
//! The facade is exercised against both file system implementations and
//! both runner kinds, including the hand-off that brings a background
//! result back to the caller's registered runner.

use std::path::Path;
use std::sync::Arc;
use strand_vfs::{
    AsyncFileSystem, Entry, FileSystem, MemoryFileSystem, OsFileSystem, VfsError,
};
use parking_lot::Mutex;
use strand_runner::{
    AsyncRunner, CompletionState, CurrentThreadRunner, ParallelRunner, Synchronization,
};

// ===== Cooperative Runner Tests =====

#[test]
fn test_write_then_read_on_background_runner() {
    let sync = Arc::new(Synchronization::new());

    CurrentThreadRunner::with_registered(&sync, |main| {
        let background = CurrentThreadRunner::new(sync.clone());
        let fs = AsyncFileSystem::new(Arc::new(MemoryFileSystem::new()), background.clone());

        fs.create_folder_async(Path::new("/docs"));
        fs.write_string_async(Path::new("/docs/a.txt"), "payload");
        let read = fs.read_to_string_async(Path::new("/docs/a.txt"));

        // Three operations queued, in order, on the background runner.
        assert_eq!(background.scheduled_task_count(), 3);
        background.wait_idle();

        assert_eq!(read.value(), Some(Ok("payload".to_string())));
        assert_eq!(main.scheduled_task_count(), 0);
    });
}

#[test]
fn test_listing_marshaled_back_to_registered_runner() {
    let sync = Arc::new(Synchronization::new());

    CurrentThreadRunner::with_registered(&sync, |main| {
        let background = CurrentThreadRunner::new(sync.clone());
        let fs = AsyncFileSystem::new(Arc::new(MemoryFileSystem::new()), background.clone());

        fs.create_folder_async(Path::new("/in"));
        fs.create_folder_async(Path::new("/out"));

        let observed = Arc::new(Mutex::new(Vec::new()));
        let listing = fs.entries_async(Path::new("/")).then({
            let observed = observed.clone();
            move |entries| {
                let entries = entries.expect("listing failed");
                observed
                    .lock()
                    .extend(entries.iter().map(|e| e.name.clone()));
                entries
            }
        });

        background.wait_idle();

        // The continuation was queued for main, not run on background.
        assert!(observed.lock().is_empty());
        assert_eq!(main.scheduled_task_count(), 1);

        main.wait_idle();
        assert_eq!(*observed.lock(), vec!["in", "out"]);
        assert_eq!(
            listing.value(),
            Some(vec![Entry::folder("in"), Entry::folder("out")])
        );
    });
}

#[test]
fn test_error_value_flows_through_handle() {
    let runner = CurrentThreadRunner::new(Arc::new(Synchronization::new()));
    let fs = AsyncFileSystem::new(Arc::new(MemoryFileSystem::new()), runner.clone());

    let read = fs.read_to_string_async(Path::new("/missing"));
    runner.wait_idle();

    assert_eq!(
        read.value(),
        Some(Err(VfsError::NotFound(Path::new("/missing").to_path_buf())))
    );
    // The handle itself completed; failure here is a value, not a panic.
    assert_eq!(read.state(), CompletionState::Completed);
}

// ===== Parallel Runner Tests =====

#[test]
fn test_os_round_trip_on_parallel_runner() {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let runner = ParallelRunner::new(Arc::new(Synchronization::new()));
    let fs = AsyncFileSystem::new(Arc::new(OsFileSystem::new(dir.path())), runner.clone());

    let root = fs.root_exists_async();
    fs.create_folder_async(Path::new("/logs"));
    fs.write_string_async(Path::new("/logs/run.txt"), "ok");
    runner.wait_idle();

    assert_eq!(root.value(), Some(Ok(true)));
    let read = fs.read_to_string_async(Path::new("/logs/run.txt"));
    runner.wait_idle();
    assert_eq!(read.value(), Some(Ok("ok".to_string())));
}

#[test]
fn test_parallel_work_current_thread_continuation() {
    let sync = Arc::new(Synchronization::new());
    let parallel = ParallelRunner::new(sync.clone());

    CurrentThreadRunner::with_registered(&sync, |main| {
        let fs = AsyncFileSystem::new(Arc::new(MemoryFileSystem::new()), parallel.clone());

        let derived = fs
            .root_exists_async()
            .then(|exists| exists.expect("root check failed"));

        parallel.wait_idle();
        assert_eq!(main.scheduled_task_count(), 1);

        main.wait_idle();
        assert_eq!(derived.value(), Some(true));
    });
}

#[test]
fn test_default_runner_used_when_none_injected() {
    let fs = AsyncFileSystem::with_default_runner(Arc::new(MemoryFileSystem::new()));
    let exists = fs.root_exists_async();
    assert_eq!(exists.wait(), Ok(Ok(true)));
}

// ===== Facade/Contract Tests =====

#[test]
fn test_facade_does_not_assume_concrete_runner() {
    let runner: Arc<dyn AsyncRunner> =
        CurrentThreadRunner::new(Arc::new(Synchronization::new()));
    let backing: Arc<dyn FileSystem> = Arc::new(MemoryFileSystem::new());
    let fs = AsyncFileSystem::new(backing, runner.clone());

    fs.create_folder_async(Path::new("/x"));
    runner.wait_idle();

    let exists = fs.exists_async(Path::new("/x"));
    runner.wait_idle();
    assert_eq!(exists.value(), Some(Ok(true)));
}
