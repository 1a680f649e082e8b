//! copycache - clipboard history that remembers what you copied
//!
//! Captured content is kept as an ordered, capacity-bounded history.
//! Entries can be pinned to protect them from eviction, and views are
//! produced by searching and filtering a snapshot of the history.

pub mod capture;
pub mod classify;
pub mod config;
pub mod daemon;
pub mod history;
pub mod query;
pub mod storage;
