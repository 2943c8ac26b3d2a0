//! # Observability
//!
//! Structured logging for server lifecycle and mutation events.

pub mod logger;

pub use logger::{Logger, Severity};
