// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::{RawConfig, Settings};
use crate::errors::{DuxError, Result};
use crate::exec::CommandSpec;
use crate::watch::{DEFAULT_POLL_INTERVAL, WatchPatterns, WatchTarget};

impl TryFrom<RawConfig> for Settings {
    type Error = DuxError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        let command = build_command(&raw)?;
        let target = build_target(&raw)?;
        Ok(Settings::new_unchecked(command, target))
    }
}

fn build_command(raw: &RawConfig) -> Result<CommandSpec> {
    let program = match raw.command.program.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => {
            return Err(DuxError::ConfigError(
                "missing command: pass one with -c (e.g. -c \"cargo run\"), after --, \
                 or set [command].program in the config file"
                    .to_string(),
            ));
        }
    };

    Ok(CommandSpec::new(program, raw.command.args.iter().cloned())
        .with_stop_signal(raw.command.stop_signal.unwrap_or_default()))
}

fn build_target(raw: &RawConfig) -> Result<WatchTarget> {
    let root = match &raw.watch.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    if !root.is_dir() {
        return Err(DuxError::ConfigError(format!(
            "watch root {:?} is not a directory",
            root
        )));
    }

    let poll_interval = match raw.watch.poll_interval.as_deref() {
        Some(s) => parse_duration(s).map_err(|e| {
            DuxError::ConfigError(format!("[watch].poll_interval: {e}"))
        })?,
        None => DEFAULT_POLL_INTERVAL,
    };

    let patterns = WatchPatterns::new(&raw.watch.include, &raw.watch.exclude)?;

    WatchTarget::new(root, poll_interval, patterns)
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration(" 3s "), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Ok(Duration::from_secs(3600)));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("ms").is_err());
        assert!(parse_duration("5 days").is_err());
    }

    #[test]
    fn overflowing_durations_are_rejected() {
        assert!(parse_duration("307445734561825861m").is_err());
        assert!(parse_duration("18446744073709551615h").is_err());
        assert!(parse_duration("99999999999999999999s").is_err());
    }

    #[test]
    fn oversized_poll_interval_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = RawConfig::default();
        raw.command.program = Some("make".to_string());
        raw.watch.root = Some(dir.path().to_path_buf());
        raw.watch.poll_interval = Some(format!("{}s", u64::MAX));

        let err = Settings::try_from(raw).unwrap_err();
        assert!(matches!(err, DuxError::ConfigError(_)));
    }

    #[test]
    fn defaults_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = RawConfig::default();
        raw.command.program = Some("make".to_string());
        raw.watch.root = Some(dir.path().to_path_buf());

        let settings = Settings::try_from(raw).unwrap();

        assert_eq!(settings.target().poll_interval(), DEFAULT_POLL_INTERVAL);
        assert_eq!(settings.command().program, "make");
        assert!(settings.command().args.is_empty());
        assert_eq!(
            settings.command().stop_signal,
            crate::types::StopSignal::default()
        );
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut raw = RawConfig::default();
        raw.command.program = Some("make".to_string());
        raw.watch.root = Some(dir.path().to_path_buf());
        raw.watch.poll_interval = Some("0s".to_string());

        let err = Settings::try_from(raw).unwrap_err();
        assert!(matches!(err, DuxError::ConfigError(_)));
    }

    #[test]
    fn missing_program_mentions_the_flag() {
        let err = Settings::try_from(RawConfig::default()).unwrap_err();
        match err {
            DuxError::ConfigError(msg) => assert!(msg.contains("-c")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
