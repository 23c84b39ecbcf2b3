//! Configuration for building PHPUnit invocations.
//!
//! Loaded from TOML; every field has a default so a partial file (or none
//! at all) still produces a runnable command.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Capabilities, Config, ExecutionMode, PathTable};
