//! Plumbing shared by the search-based crackers: deadlines, worker pools
//! and candidate ranking.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::{Duration, Instant};

use rayon::ThreadPoolBuilder;
use tracing::warn;

/// Optional wall-clock limit of one cracker run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline(Option<Instant>);

impl Deadline {
    pub(crate) fn from_millis(millis: Option<u64>) -> Self {
        Deadline(millis.map(|ms| Instant::now() + Duration::from_millis(ms)))
    }

    pub(crate) fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Runs `op` on a dedicated pool of `workers` threads (`0` = one per core).
///
/// Falls back to the global pool if the dedicated one cannot be built.
pub(crate) fn run_with_workers<T, F>(workers: usize, op: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(op),
        Err(err) => {
            warn!(workers, error = %err, "worker pool unavailable, using the global pool");
            op()
        }
    }
}

/// Keeps the first candidate of every distinct `key`, up to `top_k`.
/// `ranked` must already be sorted best first.
pub(crate) fn keep_best<T, K, F>(ranked: Vec<T>, top_k: usize, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    ranked
        .into_iter()
        .filter(|candidate| seen.insert(key(candidate)))
        .take(top_k)
        .collect()
}
