//! Daemon state files.
//!
//! The daemon and the CLI find each other through three files in the data
//! directory: `daemon.pid`, `daemon.sock` and `daemon.log`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config;

/// Locations of the daemon's PID file, socket and log.
pub struct DaemonState {
    pub pid_file: PathBuf,
    pub socket_path: PathBuf,
    pub log_file: PathBuf,
}

impl DaemonState {
    /// Uses the copycache data directory, creating it if missing.
    pub fn new() -> Result<Self> {
        let dir = config::data_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self::in_dir(&dir))
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            pid_file: dir.join("daemon.pid"),
            socket_path: dir.join("daemon.sock"),
            log_file: dir.join("daemon.log"),
        }
    }

    /// True if the PID file names a live process.
    ///
    /// A stale PID file left behind by a crash reads as not running.
    pub fn is_running(&self) -> bool {
        self.get_pid().is_some_and(process_alive)
    }

    /// The PID recorded in the PID file, if it exists and parses.
    pub fn get_pid(&self) -> Option<u32> {
        fs::read_to_string(&self.pid_file)
            .ok()?
            .trim()
            .parse()
            .ok()
    }

    pub fn write_pid(&self, pid: u32) -> Result<()> {
        fs::write(&self.pid_file, pid.to_string()).context("Failed to write PID file")
    }

    /// Removes the PID file and the socket. Missing files are fine.
    pub fn cleanup(&self) -> Result<()> {
        remove_if_present(&self.pid_file).context("Failed to remove PID file")?;
        remove_if_present(&self.socket_path).context("Failed to remove socket file")?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    // SAFETY: signal 0 performs the permission and existence checks only.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Counters reported by `copycache daemon status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStats {
    /// Entries added to the history since the daemon started.
    pub entries_captured: u64,
    /// Capture requests dropped (empty, blacklisted or head duplicates).
    pub captures_skipped: u64,
    pub requests_handled: u64,
    pub started_at: DateTime<Utc>,
    /// Requests that failed with a storage error.
    pub errors: u64,
}

impl Default for DaemonStats {
    fn default() -> Self {
        Self {
            entries_captured: 0,
            captures_skipped: 0,
            requests_handled: 0,
            started_at: Utc::now(),
            errors: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn create_test_state() -> (DaemonState, tempfile::TempDir) {
        let dir = tempdir().expect("Failed to create temp directory");
        let state = DaemonState::in_dir(dir.path());
        (state, dir)
    }

    #[test]
    fn test_not_running_without_pid_file() {
        let (state, _dir) = create_test_state();
        assert!(state.get_pid().is_none());
        assert!(!state.is_running());
    }

    #[test]
    fn test_write_and_read_pid() {
        let (state, _dir) = create_test_state();

        state.write_pid(4242).expect("Failed to write PID");

        assert_eq!(state.get_pid(), Some(4242));
    }

    #[test]
    fn test_garbage_pid_file_reads_as_none() {
        let (state, _dir) = create_test_state();
        fs::write(&state.pid_file, "copycache\n").expect("Failed to write");

        assert!(state.get_pid().is_none());
        assert!(!state.is_running());
    }

    #[test]
    fn test_running_with_own_pid() {
        let (state, _dir) = create_test_state();
        state
            .write_pid(std::process::id())
            .expect("Failed to write PID");

        assert!(state.is_running(), "The test process itself is alive");
    }

    #[test]
    fn test_cleanup_removes_files() {
        let (state, _dir) = create_test_state();
        state.write_pid(4242).expect("Failed to write PID");
        fs::write(&state.socket_path, "").expect("Failed to create socket stand-in");

        state.cleanup().expect("Failed to cleanup");

        assert!(!state.pid_file.exists());
        assert!(!state.socket_path.exists());
    }

    #[test]
    fn test_cleanup_with_nothing_to_remove() {
        let (state, _dir) = create_test_state();
        state.cleanup().expect("Cleanup of missing files should succeed");
    }

    #[test]
    fn test_paths_share_directory() {
        let (state, dir) = create_test_state();

        assert_eq!(state.pid_file, dir.path().join("daemon.pid"));
        assert_eq!(state.socket_path.parent(), Some(dir.path()));
        assert_eq!(state.log_file.parent(), Some(dir.path()));
    }

    #[test]
    fn test_daemon_stats_start_at_zero() {
        let stats = DaemonStats::default();

        assert_eq!(stats.entries_captured, 0);
        assert_eq!(stats.captures_skipped, 0);
        assert_eq!(stats.requests_handled, 0);
        assert_eq!(stats.errors, 0);
    }
}
