//! Test utilities for driving builds without a real toolchain.
//!
//! This crate provides fake compiler drivers that record their arguments,
//! a throwaway project fixture with timestamp control, and guards for
//! serialising environment mutations across tests.

pub mod compiler;
pub mod env_lock;
pub mod env_var_guard;
pub mod project;

pub use compiler::FakeToolchain;
pub use env_lock::EnvLock;
pub use env_var_guard::EnvVarGuard;
pub use project::Project;
