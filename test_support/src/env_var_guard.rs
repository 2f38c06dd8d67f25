//! Scoped environment variables.
//!
//! `std::env::set_var` and `remove_var` are `unsafe` in Rust 2024 because they
//! mutate process-global state. Hold an [`EnvLock`](crate::EnvLock) for as
//! long as any [`EnvVarGuard`] is alive.
//!
//! ```rust,ignore
//! use test_support::{EnvLock, EnvVarGuard};
//!
//! let _lock = EnvLock::acquire();
//! let _raylib = EnvVarGuard::set("RIVET_RAYLIB", "1");
//! // the previous value is restored when `_raylib` drops
//! ```

use std::ffi::OsString;

/// Restores a variable to its previous value, or removes it, on drop.
#[derive(Debug)]
pub struct EnvVarGuard {
    name: &'static str,
    previous: Option<OsString>,
}

impl EnvVarGuard {
    /// Set `name` to `value` until the guard drops.
    #[must_use]
    pub fn set(name: &'static str, value: &str) -> Self {
        let previous = std::env::var_os(name);
        // SAFETY: callers hold `EnvLock`, serialising environment access.
        unsafe { std::env::set_var(name, value) };
        Self { name, previous }
    }

    /// Remove `name` until the guard drops.
    #[must_use]
    pub fn remove(name: &'static str) -> Self {
        let previous = std::env::var_os(name);
        // SAFETY: callers hold `EnvLock`, serialising environment access.
        unsafe { std::env::remove_var(name) };
        Self { name, previous }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        // SAFETY: the `EnvLock` held by the caller outlives this guard.
        unsafe {
            match &self.previous {
                Some(value) => std::env::set_var(self.name, value),
                None => std::env::remove_var(self.name),
            }
        }
    }
}
