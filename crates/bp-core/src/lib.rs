//! Bird/Plane Classifier Core Library
//!
//! Sequential Bayesian classification of tracked flying objects:
//! - Data file parsing and discretization into observation tokens
//! - Likelihood tables and the channel-generic table builder
//! - Single- and dual-channel posterior recurrences
//! - Verdicts, evidence ledgers and report rendering
//! - Exit codes and structured logging for the CLI
//!
//! The binary entry point is in `main.rs`.

pub mod check;
pub mod classify;
pub mod data;
pub mod evidence;
pub mod exit_codes;
pub mod inference;
pub mod likelihood;
pub mod logging;
pub mod training;

pub use exit_codes::ExitCode;
