//! Serialise environment mutations across tests.
//!
//! Configuration merging reads `RIVET_*` variables from the process
//! environment, so tests that set them must not overlap with each other or
//! with tests that expect a clean environment.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// RAII guard holding the global environment lock.
pub struct EnvLock {
    _guard: MutexGuard<'static, ()>,
}

impl fmt::Debug for EnvLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvLock").finish_non_exhaustive()
    }
}

impl EnvLock {
    /// Block until no other test holds the lock.
    ///
    /// A panic in a previous holder does not poison later tests.
    pub fn acquire() -> Self {
        Self {
            _guard: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }
}
