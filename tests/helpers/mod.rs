//! Reusable helpers for integration tests.
//!
//! Each test gets its own data directory (and therefore its own SQLite
//! files), so tests are fully isolated and can run in parallel.

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use trellis_core::directory::User;
use trellis_core::SocialCore;

/// Atomic counter for unique test directory names.
static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Creates a unique temporary directory for test isolation.
///
/// Each call produces a distinct path by combining the prefix, process ID,
/// and an atomic counter.
pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    env::temp_dir().join(format!(
        "trellis_test_{}_{}_{}",
        prefix,
        std::process::id(),
        id
    ))
}

/// Removes a temporary test directory. Ignores errors silently.
pub fn cleanup_dir(dir: &PathBuf) {
    let _ = std::fs::remove_dir_all(dir);
}

/// Registers the standard cast: Alice, Bob, and Carol.
pub fn seed_users(core: &SocialCore) -> (User, User, User) {
    let alice = core
        .register_user("Alice", "alice@x.com", Some("https://cdn.x.com/alice.png"))
        .expect("should register Alice");
    let bob = core
        .register_user("Bob", "bob@x.com", None)
        .expect("should register Bob");
    let carol = core
        .register_user("Carol", "carol@x.com", None)
        .expect("should register Carol");
    (alice, bob, carol)
}
