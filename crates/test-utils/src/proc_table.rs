use std::fs;

/// Pids of non-zombie processes whose process group is `pgid`.
///
/// Reads `/proc/<pid>/stat`; on systems without procfs this is always empty.
pub fn live_group_members(pgid: i32) -> Vec<i32> {
    let Ok(entries) = fs::read_dir("/proc") else {
        return Vec::new();
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str()?.parse::<i32>().ok())
        .filter(|pid| {
            let Ok(stat) = fs::read_to_string(format!("/proc/{pid}/stat")) else {
                return false;
            };
            // The command name is wrapped in parens and may contain spaces,
            // so parse the fields after the last ')'.
            let Some(rest) = stat.rfind(')').map(|i| &stat[i + 1..]) else {
                return false;
            };
            let fields: Vec<&str> = rest.split_whitespace().collect();
            // fields[0] = state, fields[2] = pgrp
            match (fields.first(), fields.get(2)) {
                (Some(state), Some(pgrp)) => {
                    *state != "Z" && *state != "X" && pgrp.parse::<i32>() == Ok(pgid)
                }
                _ => false,
            }
        })
        .collect()
}
