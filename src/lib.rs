//! Drive PHPUnit as a child process and turn its output into typed events.
//!
//! [`command::TestCommand`] builds the invocation from a [`config::Config`],
//! translating paths when the tests run somewhere else (a container, a
//! remote host). [`runner::TestRunner`] spawns it, splits the output into
//! lines, hands each line to a [`result::LineClassifier`] and publishes the
//! results to registered observers.

pub mod command;
pub mod config;
pub mod logging;
pub mod path;
pub mod result;
pub mod runner;
