//! Smoke test CLI library.
//!
//! Exposes the command handlers for integration testing.
//! In production, `smoketest` is used as a binary (main.rs).

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
