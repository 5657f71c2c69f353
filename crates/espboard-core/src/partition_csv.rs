//! ESP-IDF partition table CSV parsing.
//!
//! The Arduino ESP32 core ships its layouts as `tools/partitions/{build}.csv`:
//!
//! ```text
//! # Name,   Type, SubType, Offset,  Size, Flags
//! nvs,      data, nvs,     0x9000,  0x5000,
//! otadata,  data, ota,     0xe000,  0x2000,
//! ```
//!
//! Values are kept as written; [`crate::partition`] does the number parsing.

use tracing::warn;

use crate::model::PartitionEntry;

/// Minimum number of columns of a partition row.
const REQUIRED_COLUMNS: usize = 5;

/// Parse the rows of a partition table CSV.
///
/// Blank lines and `#` comments are skipped. Rows with fewer than five
/// columns are skipped with a warning; columns after the fifth (flags) are
/// ignored.
pub fn parse_partition_csv(source: &str) -> Vec<PartitionEntry> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }

            let columns: Vec<&str> = line.split(',').map(str::trim).collect();
            if columns.len() < REQUIRED_COLUMNS {
                warn!(line = index + 1, content = line, "Invalid partition row");
                return None;
            }

            Some(PartitionEntry {
                name: columns[0].to_string(),
                partition_type: columns[1].to_string(),
                subtype: columns[2].to_string(),
                offset: columns[3].to_string(),
                size: columns[4].to_string(),
            })
        })
        .collect()
}
