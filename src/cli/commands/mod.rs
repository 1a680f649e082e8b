//! CLI commands for copycache.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Record content in the history.
pub mod add;

/// Manage the source blacklist.
pub mod blacklist;

/// Remove unpinned entries.
pub mod clear;

/// Generate shell completion scripts.
pub mod completions;

/// Configuration viewing and management.
pub mod config;

/// Manage the background daemon.
pub mod daemon;

/// Remove a single entry.
pub mod delete;

/// List, search and filter the history.
pub mod list;

/// Pin or unpin an entry.
pub mod pin;

/// Print an entry's full content.
pub mod show;
