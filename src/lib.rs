//! Face-recognition access control backend.
//!
//! Effectful operations return an [`commands::Outcome`]: success, a
//! rejection or fault, or progress from a running workflow.

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod controller;
pub mod datastore;
pub mod logging;
pub mod models;
pub mod query;
pub mod repository;
pub mod structured_logger;
pub mod transport;
pub mod utils;
pub mod vision;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
#[path = "tests/source_layout_tests.rs"]
mod source_layout_tests;

/// Commit the binary was built from.
pub const GIT_SHA: &str = env!("FACEGATE_GIT_SHA");
