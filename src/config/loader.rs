// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{RawConfig, Settings};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfig`.
///
/// This only performs TOML deserialization plus resolving a relative
/// `[watch].root` against the file's directory; it does **not** apply
/// defaults or validate. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut config: RawConfig = toml::from_str(&contents)?;

    if let Some(root) = config.watch.root.take() {
        config.watch.root = Some(resolve_relative_to(path, root));
    }

    Ok(config)
}

/// Load a configuration file from path and turn it into final `Settings`.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let raw = load_from_path(&path)?;
    Settings::try_from(raw)
}

/// Config file looked for when `--config` is not given.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Dux.toml")
}

/// Build the final settings from command-line arguments.
///
/// Order of precedence: CLI flags, then the config file (`--config`, or
/// `Dux.toml` if it exists), then built-in defaults.
pub fn resolve_settings(args: &CliArgs) -> Result<Settings> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using default config file");
                load_from_path(&default_path)?
            } else {
                RawConfig::default()
            }
        }
    };

    apply_cli(&mut raw, args);
    Settings::try_from(raw)
}

/// Layer command-line flags over values read from a file.
pub fn apply_cli(raw: &mut RawConfig, args: &CliArgs) {
    let command_line: Vec<String> = match &args.cmd {
        Some(cmd) => cmd.split_whitespace().map(str::to_string).collect(),
        None => args.command.clone(),
    };
    if let Some((program, rest)) = command_line.split_first() {
        raw.command.program = Some(program.clone());
        raw.command.args = rest.to_vec();
    }

    if let Some(signal) = args.stop_signal {
        raw.command.stop_signal = Some(signal);
    }

    if let Some(dir) = &args.dir {
        raw.watch.root = Some(dir.clone());
    }

    if let Some(secs) = args.freq {
        raw.watch.poll_interval = Some(format!("{secs}s"));
    } else if let Some(interval) = &args.poll_interval {
        raw.watch.poll_interval = Some(interval.clone());
    }

    raw.watch.include.extend(args.watch.iter().cloned());
    raw.watch.exclude.extend(args.exclude.iter().cloned());
}

/// Resolve `root` (from a config file at `config_path`) against that file's
/// directory.
///
/// - If the config path has a non-empty parent (e.g. "configs/Dux.toml"),
///   relative roots are joined onto it.
/// - A bare filename like "Dux.toml" (parent = "") leaves the root as is,
///   i.e. relative to the current working directory.
fn resolve_relative_to(config_path: &Path, root: PathBuf) -> PathBuf {
    if root.is_absolute() {
        return root;
    }
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(root),
        _ => root,
    }
}
