//! Concurrency tests for serialized scheduler commands
//!
//! Commands arriving concurrently must each observe a consistent run.

mod fixtures;

use court_rotation::types::MatchState;
use std::time::{Duration, Instant};

use fixtures::{create_test_system, roster};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reshuffles_leave_valid_run() {
    let system = create_test_system(roster(21), 17);

    let mut handles = Vec::new();
    for _ in 0..50 {
        let app_state = system.app_state.clone();
        handles.push(tokio::spawn(async move { app_state.reshuffle(None).await }));
    }

    for handle in handles {
        let run = handle.await.unwrap().unwrap();
        assert_eq!(run.matches().len(), 10);
        assert_eq!(run.queue().len(), 1);
    }

    let summary = system.app_state.summary().await.unwrap();
    assert_eq!(summary.participants, 21);
    assert_eq!(system.publisher.count_events_of_type("RunGenerated"), 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transitions_apply_once() {
    let system = create_test_system(roster(16), 3);
    let run = system.app_state.generate(None).await.unwrap();

    // Two operators race to start every court
    let mut handles = Vec::new();
    for m in run.matches() {
        for _ in 0..2 {
            let app_state = system.app_state.clone();
            let id = m.id();
            handles.push(tokio::spawn(async move {
                app_state.transition(id, MatchState::InProgress).await
            }));
        }
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    assert_eq!(accepted, run.matches().len());
    let summary = system.app_state.summary().await.unwrap();
    assert_eq!(summary.in_progress, 8);
    assert_eq!(summary.scheduled, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_large_roster_generation_is_fast() {
    let system = create_test_system(roster(500), 9);

    let start = Instant::now();
    for _ in 0..20 {
        system.app_state.reshuffle(None).await.unwrap();
    }
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_secs(5),
        "20 reshuffles of 500 participants took {:?}",
        elapsed
    );
}
