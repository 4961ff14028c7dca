// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::StopSignal;

/// Command-line arguments for `dux`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dux",
    version,
    about = "Run a command and restart it whenever files in a directory change.",
    long_about = None
)]
pub struct CliArgs {
    /// Command to run, split on whitespace (e.g. -c "cargo run").
    #[arg(short = 'c', long = "cmd", value_name = "CMD")]
    pub cmd: Option<String>,

    /// Directory to monitor for changes.
    ///
    /// Default: the current working directory.
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Frequency at which the directory is scanned, in whole seconds.
    #[arg(long, value_name = "SECONDS", conflicts_with = "poll_interval")]
    pub freq: Option<u64>,

    /// Poll interval as a duration string ("250ms", "2s", "1m").
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Only watch files matching this glob (repeatable).
    #[arg(long = "watch", value_name = "GLOB")]
    pub watch: Vec<String>,

    /// Ignore files matching this glob (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Signal sent to the command's process group on restart.
    ///
    /// Default: SIGKILL.
    #[arg(long, value_name = "SIGNAL")]
    pub stop_signal: Option<StopSignal>,

    /// Path to a TOML config file.
    ///
    /// Default: `Dux.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DUX_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved configuration without running anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Program and arguments to run, as an alternative to `-c`.
    #[arg(last = true, value_name = "PROGRAM")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn parses_short_flags() {
        let args = CliArgs::try_parse_from(["dux", "-d", "src", "-c", "go run .", "--freq", "2"])
            .unwrap();

        assert_eq!(args.cmd.as_deref(), Some("go run ."));
        assert_eq!(args.dir, Some(PathBuf::from("src")));
        assert_eq!(args.freq, Some(2));
        assert!(args.command.is_empty());
    }

    #[test]
    fn parses_trailing_command() {
        let args = CliArgs::try_parse_from([
            "dux",
            "--exclude",
            "target/**",
            "--stop-signal",
            "term",
            "--",
            "cargo",
            "run",
            "--release",
        ])
        .unwrap();

        assert_eq!(args.command, vec!["cargo", "run", "--release"]);
        assert_eq!(args.exclude, vec!["target/**"]);
        assert_eq!(args.stop_signal.map(|s| s.signal()), Some(Signal::SIGTERM));
    }

    #[test]
    fn freq_and_poll_interval_conflict() {
        let res = CliArgs::try_parse_from(["dux", "--freq", "1", "--poll-interval", "1s"]);
        assert!(res.is_err());
    }

    #[test]
    fn bad_stop_signal_is_rejected() {
        let res = CliArgs::try_parse_from(["dux", "--stop-signal", "SIGWHATEVER"]);
        assert!(res.is_err());
    }
}
