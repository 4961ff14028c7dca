// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::exec::CommandSpec;
use crate::types::StopSignal;
use crate::watch::WatchTarget;

/// Configuration as read from a TOML file, before defaults are applied.
///
/// ```toml
/// [command]
/// program = "cargo"
/// args = ["run"]
/// stop_signal = "SIGTERM"
///
/// [watch]
/// root = "src"
/// poll_interval = "500ms"
/// include = ["**/*.rs"]
/// exclude = ["target/**"]
/// ```
///
/// Every section and key is optional; command-line flags are layered on top
/// before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub command: CommandSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[command]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandSection {
    pub program: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    pub stop_signal: Option<StopSignal>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Directory to watch. Relative paths in a config file are resolved
    /// against the directory containing that file.
    pub root: Option<PathBuf>,

    /// Duration string such as `"1s"` or `"250ms"`.
    pub poll_interval: Option<String>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Fully-specified configuration the core runs with.
///
/// Only obtainable through `TryFrom<RawConfig>`, which applies every default
/// and checks every invariant.
#[derive(Debug, Clone)]
pub struct Settings {
    command: CommandSpec,
    target: WatchTarget,
}

impl Settings {
    pub(crate) fn new_unchecked(command: CommandSpec, target: WatchTarget) -> Self {
        Self { command, target }
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    pub fn into_parts(self) -> (CommandSpec, WatchTarget) {
        (self.command, self.target)
    }
}
