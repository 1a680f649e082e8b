//! Command-line interface for copycache.
//!
//! Commands talk to the running daemon when there is one, so their
//! changes are serialized with captures; otherwise they open the history
//! database directly.

/// Daemon-or-direct access to the history.
pub mod client;

/// Individual CLI command implementations.
pub mod commands;

/// Output formatting utilities.
pub mod format;

pub use format::OutputFormat;
