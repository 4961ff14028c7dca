#![allow(dead_code)]

pub use dux_test_utils::{init_tracing, wait_until, with_timeout};

use std::path::Path;
use std::time::{Duration, SystemTime};

use filetime::FileTime;

/// Move `path`'s modification time `secs` seconds into the future.
///
/// Pushing forward by whole seconds makes the change visible even on
/// filesystems with coarse timestamp resolution.
pub fn bump_mtime(path: &Path, secs: u64) {
    let later = SystemTime::now() + Duration::from_secs(secs);
    filetime::set_file_mtime(path, FileTime::from_system_time(later)).unwrap();
}
