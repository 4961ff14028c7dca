// src/config/mod.rs

//! Configuration loading and validation for dux.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk and layer CLI flags on top (`loader.rs`).
//! - Apply defaults and check invariants, producing `Settings` (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{apply_cli, load_and_validate, load_from_path, resolve_settings};
pub use model::{CommandSection, RawConfig, Settings, WatchSection};
pub use validate::parse_duration;
