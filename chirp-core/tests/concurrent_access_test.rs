//! Concurrent access tests
//!
//! Many threads share one repository and hammer the follow graph while others
//! read feeds. Every call must see a consistent snapshot and the final graph
//! must be exactly what the writers left behind.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use chirp_core::adapters::duckdb::DuckDbRepository;
use chirp_core::adapters::memory::InMemoryRepository;
use chirp_core::domain::SelfFollowPolicy;
use chirp_core::ports::Repository;
use chirp_core::services::{FeedService, RelationshipService};
use chirp_core::{Micropost, User};

/// Number of concurrent threads for stress tests
const THREAD_COUNT: usize = 6;

/// Number of iterations per thread
const ITERATIONS_PER_THREAD: usize = 10;

/// One user per thread plus a shared celebrity everyone follows and unfollows
fn seed(repo: &dyn Repository) -> (Vec<User>, User) {
    let celebrity = User::new("Celebrity", "celebrity@example.com", "d");
    repo.insert_user(&celebrity).unwrap();
    repo.insert_micropost(&Micropost::new(celebrity.id, "hello fans")).unwrap();

    let users: Vec<User> = (0..THREAD_COUNT)
        .map(|i| {
            let user = User::new(format!("Fan {}", i), &format!("fan{}@example.com", i), "d");
            repo.insert_user(&user).unwrap();
            repo.insert_micropost(&Micropost::new(user.id, format!("fan {} here", i)))
                .unwrap();
            user
        })
        .collect();

    (users, celebrity)
}

fn run_follow_churn(repo: Arc<dyn Repository>) {
    let (users, celebrity) = seed(repo.as_ref());
    let users = Arc::new(users);
    let celebrity_id = celebrity.id;

    let barrier = Arc::new(Barrier::new(THREAD_COUNT));
    let inconsistent_feeds = Arc::new(AtomicUsize::new(0));
    let mut handles = vec![];

    for thread_id in 0..THREAD_COUNT {
        let repo = Arc::clone(&repo);
        let users = Arc::clone(&users);
        let barrier = Arc::clone(&barrier);
        let inconsistent_feeds = Arc::clone(&inconsistent_feeds);

        handles.push(thread::spawn(move || {
            let relationships = RelationshipService::new(Arc::clone(&repo), SelfFollowPolicy::Ignore);
            let feeds = FeedService::new(Arc::clone(&repo), 30);
            let me = users[thread_id].id;

            barrier.wait();

            for i in 0..ITERATIONS_PER_THREAD {
                relationships.follow(me, celebrity_id).unwrap();

                // While following, the celebrity's post must be in the feed
                let feed = feeds.feed(me).unwrap();
                if !feed.iter().any(|p| p.user_id == celebrity_id) {
                    inconsistent_feeds.fetch_add(1, Ordering::SeqCst);
                }

                // Odd threads end up following, even threads end up not following
                let last = i == ITERATIONS_PER_THREAD - 1;
                if !(last && thread_id % 2 == 1) {
                    relationships.unfollow(me, celebrity_id).unwrap();
                    let feed = feeds.feed(me).unwrap();
                    if feed.iter().any(|p| p.user_id == celebrity_id) {
                        inconsistent_feeds.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    assert_eq!(inconsistent_feeds.load(Ordering::SeqCst), 0);

    let followers = repo.followers(celebrity_id).unwrap();
    let mut expected: Vec<_> = users
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, u)| u.id)
        .collect();
    let mut actual: Vec<_> = followers.iter().map(|u| u.id).collect();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
    assert_eq!(repo.count_relationships().unwrap() as usize, expected.len());
}

#[test]
fn test_concurrent_follow_churn_duckdb() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_concurrent.duckdb");
    let repo = DuckDbRepository::new(&db_path).unwrap();
    repo.ensure_schema().unwrap();

    run_follow_churn(Arc::new(repo));
}

#[test]
fn test_concurrent_follow_churn_in_memory() {
    run_follow_churn(Arc::new(InMemoryRepository::new()));
}

/// Concurrent destroys never leave edges pointing at a removed user
#[test]
fn test_concurrent_destroy_leaves_no_dangling_edges() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_destroy.duckdb");
    let repo = DuckDbRepository::new(&db_path).unwrap();
    repo.ensure_schema().unwrap();
    let repo: Arc<dyn Repository> = Arc::new(repo);

    let (users, celebrity) = seed(repo.as_ref());
    for user in &users {
        repo.insert_relationship(&chirp_core::Relationship::new(user.id, celebrity.id))
            .unwrap();
    }

    let barrier = Arc::new(Barrier::new(THREAD_COUNT + 1));
    let mut handles = vec![];

    for user in users.clone() {
        let repo = Arc::clone(&repo);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let _ = repo.feed(user.id, Some(10), 0);
            repo.destroy_user(user.id).unwrap()
        }));
    }

    barrier.wait();
    for handle in handles {
        let report = handle.join().expect("worker thread panicked");
        assert!(report.user_deleted);
        assert_eq!(report.microposts_deleted, 1);
        assert_eq!(report.relationships_deleted, 1);
    }

    assert_eq!(repo.count_users().unwrap(), 1);
    assert_eq!(repo.count_relationships().unwrap(), 0);
    assert!(repo.followers(celebrity.id).unwrap().is_empty());
}
