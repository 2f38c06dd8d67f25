//! rivet core library.
//!
//! This library resolves the build configuration of a single-binary C or C++
//! project (host platform, toolchain, feature toggles and profile), discovers
//! its sources and drives the host compiler to produce the binary.

pub mod cli;
pub mod config;
pub mod features;
pub mod graph;
pub mod invocation;
pub mod orchestrator;
pub mod platform;
pub mod process;
pub mod profile;
pub mod runner;
pub mod status;
pub mod toolchain;
