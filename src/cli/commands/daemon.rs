//! Daemon management commands.
//!
//! Starts, stops and inspects the background daemon that serves capture
//! requests and serializes history changes.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process::{Command, Stdio};
use std::time::Duration;

use copycache::daemon::{send_request_sync, DaemonState, Request, Response};

/// Daemon management subcommands.
#[derive(Subcommand)]
pub enum DaemonSubcommand {
    /// Start the background daemon.
    Start {
        /// Run in foreground (don't detach).
        #[arg(long)]
        foreground: bool,
    },

    /// Stop the running daemon.
    Stop,

    /// Show daemon status and statistics.
    Status,

    /// Show the last lines of the daemon log.
    Logs {
        /// Number of lines to show.
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,
    },
}

/// Arguments for the daemon command.
#[derive(clap::Args)]
pub struct Args {
    #[command(subcommand)]
    pub command: DaemonSubcommand,
}

/// Executes the daemon command.
pub fn run(args: Args) -> Result<()> {
    let state = DaemonState::new()?;

    match args.command {
        DaemonSubcommand::Start { foreground } => run_start(&state, foreground),
        DaemonSubcommand::Stop => run_stop(&state),
        DaemonSubcommand::Status => run_status(&state),
        DaemonSubcommand::Logs { lines } => run_logs(&state, lines),
    }
}

fn run_start(state: &DaemonState, foreground: bool) -> Result<()> {
    if state.is_running() {
        println!(
            "{} Daemon is already running (PID {})",
            "Warning:".yellow(),
            state.get_pid().unwrap_or(0)
        );
        return Ok(());
    }

    if foreground {
        println!("{}", "Starting daemon in foreground...".green());
        println!("{}", "Press Ctrl+C to stop".dimmed());

        let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
        return rt.block_on(copycache::daemon::run_daemon());
    }

    // Re-exec ourselves in foreground mode, detached from the terminal
    let current_exe = std::env::current_exe().context("Failed to get current executable path")?;
    let child = Command::new(&current_exe)
        .args(["daemon", "start", "--foreground"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("Failed to spawn daemon process")?;

    println!(
        "{} Daemon started with PID {}",
        "Success:".green(),
        child.id()
    );
    println!(
        "{}",
        format!("Logs available at: {}", state.log_file.display()).dimmed()
    );
    Ok(())
}

fn run_stop(state: &DaemonState) -> Result<()> {
    if !state.is_running() {
        println!("{}", "Daemon is not running".yellow());
        return Ok(());
    }

    let pid = state.get_pid().unwrap_or(0);
    println!("Stopping daemon (PID {pid})...");

    match send_request_sync(&state.socket_path, &Request::Stop) {
        Ok(Response::Stopping) => {
            if wait_for_exit(state, Duration::from_secs(3)) {
                println!("{}", "Daemon stopped".green());
                return Ok(());
            }
            println!(
                "{}",
                "Daemon did not stop gracefully, sending SIGTERM...".yellow()
            );
        }
        Ok(other) => {
            tracing::debug!("Unexpected stop response: {:?}", other);
        }
        Err(e) => {
            tracing::debug!("Failed to send stop request: {}", e);
            println!("{}", "Socket not available, sending SIGTERM...".yellow());
        }
    }

    kill_process(pid)?;

    if wait_for_exit(state, Duration::from_secs(1)) {
        let _ = state.cleanup();
        println!("{}", "Daemon stopped".green());
    } else {
        println!("{}", "Warning: Daemon may still be running".yellow());
    }
    Ok(())
}

/// Polls until the daemon process is gone or `timeout` elapses.
fn wait_for_exit(state: &DaemonState, timeout: Duration) -> bool {
    let step = Duration::from_millis(100);
    let mut waited = Duration::ZERO;
    while waited < timeout {
        if !state.is_running() {
            return true;
        }
        std::thread::sleep(step);
        waited += step;
    }
    !state.is_running()
}

/// Sends SIGTERM to a process.
fn kill_process(pid: u32) -> Result<()> {
    #[cfg(unix)]
    {
        // SAFETY: kill only delivers a signal; an invalid pid yields ESRCH.
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        anyhow::bail!("Killing processes not supported on this platform");
    }

    #[allow(unreachable_code)]
    Ok(())
}

fn run_status(state: &DaemonState) -> Result<()> {
    if !state.is_running() {
        println!("{}", "Daemon is not running".yellow());
        return Ok(());
    }

    println!("{}", "Daemon Status".green().bold());
    println!();

    match send_request_sync(&state.socket_path, &Request::Status) {
        Ok(Response::Status {
            pid,
            uptime_seconds,
            ..
        }) => {
            println!("  {} {}", "Status:".dimmed(), "running".green());
            println!("  {} {}", "PID:".dimmed(), pid);
            println!("  {} {}", "Uptime:".dimmed(), format_duration(uptime_seconds));
        }
        other => {
            if let Err(e) = other {
                tracing::debug!("Failed to get status: {}", e);
            }
            println!(
                "  {} {} {}",
                "Status:".dimmed(),
                "running".green(),
                "(socket unavailable)".dimmed()
            );
            println!("  {} {}", "PID:".dimmed(), state.get_pid().unwrap_or(0));
            return Ok(());
        }
    }

    if let Ok(Response::Stats(stats)) = send_request_sync(&state.socket_path, &Request::Stats) {
        println!();
        println!("{}", "Statistics".green().bold());
        println!();
        println!("  {} {}", "Requests handled:".dimmed(), stats.requests_handled);
        println!("  {} {}", "Entries captured:".dimmed(), stats.entries_captured);
        println!("  {} {}", "Captures skipped:".dimmed(), stats.captures_skipped);
        if stats.errors > 0 {
            println!("  {} {}", "Errors:".dimmed(), stats.errors.to_string().red());
        }
    }

    Ok(())
}

/// Formats a duration in seconds as a human-readable string.
fn format_duration(seconds: u64) -> String {
    match seconds {
        0..=59 => format!("{seconds}s"),
        60..=3599 => format!("{}m {}s", seconds / 60, seconds % 60),
        3600..=86399 => format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60),
        _ => format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600),
    }
}

fn run_logs(state: &DaemonState, lines: usize) -> Result<()> {
    if !state.log_file.exists() {
        println!("{}", "No log file found".yellow());
        println!(
            "{}",
            format!("Expected at: {}", state.log_file.display()).dimmed()
        );
        return Ok(());
    }

    let file = File::open(&state.log_file).context("Failed to open log file")?;
    let all_lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();

    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{line}");
    }

    Ok(())
}
