// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::Result;

/// Compiled include/exclude glob patterns for the watched tree.
///
/// Patterns are evaluated against paths relative to the watch root, with `/`
/// separators (e.g. `"src/main.rs"`). No include patterns means "everything".
#[derive(Clone)]
pub struct WatchPatterns {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    raw_include: Vec<String>,
    raw_exclude: Vec<String>,
}

impl fmt::Debug for WatchPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchPatterns")
            .field("include", &self.raw_include)
            .field("exclude", &self.raw_exclude)
            .finish()
    }
}

impl Default for WatchPatterns {
    fn default() -> Self {
        Self {
            include: None,
            exclude: None,
            raw_include: Vec::new(),
            raw_exclude: Vec::new(),
        }
    }
}

impl WatchPatterns {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: build_optional_globset(include)?,
            exclude: build_optional_globset(exclude)?,
            raw_include: include.to_vec(),
            raw_exclude: exclude.to_vec(),
        })
    }

    pub fn include(&self) -> &[String] {
        &self.raw_include
    }

    pub fn exclude(&self) -> &[String] {
        &self.raw_exclude
    }

    /// Returns true if `rel_path` should be watched.
    pub fn matches(&self, rel_path: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(rel_path) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }

    /// Keep only the `paths` (all under `root`) that match.
    pub fn filter(&self, root: &Path, paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths
            .into_iter()
            .filter(|path| match path.strip_prefix(root) {
                Ok(rel) => self.matches(&relative_key(rel)),
                Err(_) => false,
            })
            .collect()
    }
}

fn relative_key(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

fn build_optional_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(Some(builder.build()?))
}
