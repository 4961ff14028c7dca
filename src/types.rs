use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use nix::sys::signal::Signal;
use serde::Deserialize;

/// Why a trigger's `wait` returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A watched file's modification time moved. `path` is whichever poller
    /// got there first; when several files change in the same tick the
    /// choice is arbitrary.
    Changed { path: PathBuf },
    /// A timer-based trigger ran out.
    Elapsed,
    /// The caller's cancellation token fired before anything else happened.
    Cancelled,
}

impl WaitOutcome {
    /// True for every outcome that should cause a restart.
    pub fn is_trigger(&self) -> bool {
        !matches!(self, WaitOutcome::Cancelled)
    }
}

/// Signal delivered to the supervised process group on stop.
///
/// Accepts `"SIGKILL"`, `"KILL"` or `"kill"` style names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct StopSignal(Signal);

impl StopSignal {
    pub fn signal(self) -> Signal {
        self.0
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        StopSignal(Signal::SIGKILL)
    }
}

impl From<Signal> for StopSignal {
    fn from(signal: Signal) -> Self {
        StopSignal(signal)
    }
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for StopSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let name = if upper.starts_with("SIG") {
            upper
        } else {
            format!("SIG{upper}")
        };
        Signal::from_str(&name)
            .map(StopSignal)
            .map_err(|_| format!("invalid stop signal: {s} (expected e.g. \"SIGKILL\" or \"TERM\")"))
    }
}

impl TryFrom<String> for StopSignal {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
