//! Board and partition data model types.
//!
//! These types mirror the JSON files produced by the board data generator:
//! - `esp8266.json` / `esp32.json`: lists of [`BoardInfo`]
//! - `esp32_partitions.json`: [`BoardPartitionsInfo`]
//! - `esp32_partition_schemes.json`: [`DefaultSchemes`]
//! - `core_list.json`: lists of [`CoreInfo`]
//!
//! All records are immutable snapshots. Maps keep the insertion order of the
//! source file because the resolver's fallback rules depend on it.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel for values that are not applicable or unknown.
pub const NOT_AVAILABLE: &str = "N/A";

/// One board definition of an Arduino core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    /// Human-readable board name (e.g. "LOLIN(WeMos) D1 R1")
    pub name: String,

    /// Board identifier in `boards.txt` (e.g. "d1")
    #[serde(alias = "board_id")]
    pub board: String,

    /// Variant directory name, or "N/A"
    #[serde(default = "not_available")]
    pub variant: String,

    /// GPIO of the built-in LED as a numeric string, or "N/A"
    #[serde(alias = "LED_BUILTIN", default = "not_available")]
    pub led_builtin: String,

    /// MCU name, or "N/A"
    #[serde(default = "not_available")]
    pub mcu: String,

    /// Flash capacities ascending (e.g. ["512KB", "1MB", "4MB"])
    #[serde(default, deserialize_with = "deserialize_flash_size")]
    pub flash_size: Vec<String>,
}

impl BoardInfo {
    /// True if the built-in LED is the "N/A" sentinel.
    pub fn led_is_unknown(&self) -> bool {
        self.led_builtin == NOT_AVAILABLE
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Flash sizes appear either as a JSON list or packed as "[4MB;8MB]".
#[derive(Deserialize)]
#[serde(untagged)]
enum FlashSizeRepr {
    List(Vec<String>),
    Packed(String),
}

fn deserialize_flash_size<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match FlashSizeRepr::deserialize(deserializer)? {
        FlashSizeRepr::List(sizes) => sizes,
        FlashSizeRepr::Packed(packed) => unpack_flash_size(&packed),
    })
}

/// Split a packed flash size string ("[512KB;1MB]") into its entries.
///
/// "[N/A]" and "[]" both yield an empty list.
pub fn unpack_flash_size(packed: &str) -> Vec<String> {
    let inner = packed.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner).trim();

    if inner.is_empty() || inner == NOT_AVAILABLE {
        return Vec::new();
    }

    inner
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// One row of an ESP32 partition table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionEntry {
    pub name: String,

    #[serde(rename = "type")]
    pub partition_type: String,

    pub subtype: String,

    /// Start offset as written in the partition CSV (e.g. "0x9000")
    pub offset: String,

    /// Size as written in the partition CSV (e.g. "0x5000")
    pub size: String,
}

/// A partition row with parsed numbers and a diagram color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionEntryExtended {
    #[serde(flatten)]
    pub entry: PartitionEntry,

    pub offset_dec: u64,

    pub size_dec: u64,

    /// `offset_dec + size_dec`, the first byte after this partition
    pub offset_size: u64,

    pub offset_hex: String,

    pub size_hex: String,

    /// Diagram color, assigned by row position
    pub color: String,
}

/// A selectable partition scheme of a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeInfo {
    /// Menu label (e.g. "Minimal (1.3MB APP/700KB SPIFFS)")
    pub full_name: String,

    /// Name of the partition layout in [`DefaultSchemes`]
    #[serde(default)]
    pub build: String,
}

/// Partition configuration of one board.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardPartitions {
    /// Scheme used when nothing else is selected
    #[serde(default)]
    pub default: String,

    /// Menu schemes, keyed by scheme name. `None` means the board only has
    /// its implicit `default` scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemes: Option<IndexMap<String, SchemeInfo>>,
}

impl BoardPartitions {
    /// Menu schemes, treating an empty map the same as a missing one.
    pub fn menu_schemes(&self) -> Option<&IndexMap<String, SchemeInfo>> {
        self.schemes.as_ref().filter(|schemes| !schemes.is_empty())
    }
}

/// Partition configuration of all boards, in source order.
pub type BoardPartitionsInfo = IndexMap<String, BoardPartitions>;

/// Named partition layouts referenced by [`SchemeInfo::build`].
pub type DefaultSchemes = IndexMap<String, Vec<PartitionEntry>>;

/// Version information for one Arduino core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreInfo {
    /// Package identifier (e.g. "esp32:esp32")
    pub core: String,

    pub installed_version: String,

    pub latest_version: String,

    /// Short core name ("esp8266" or "esp32")
    pub core_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_board_deserialize() {
        let json = r#"{
            "name": "LOLIN(WeMos) D1 R1",
            "board": "d1",
            "variant": "d1",
            "led_builtin": "2",
            "mcu": "esp8266",
            "flash_size": ["4MB"]
        }"#;

        let board: BoardInfo = serde_json::from_str(json).unwrap();
        assert_eq!(board.board, "d1");
        assert_eq!(board.flash_size, vec!["4MB".to_string()]);
        assert!(!board.led_is_unknown());
    }

    #[test]
    fn test_board_deserialize_generator_keys() {
        let json = r#"{
            "name": "Generic ESP8266 Module",
            "board_id": "generic",
            "LED_BUILTIN": "N/A",
            "flash_size": "[512KB;1MB;4MB]",
            "linkPins": "https://example.invalid"
        }"#;

        let board: BoardInfo = serde_json::from_str(json).unwrap();
        assert_eq!(board.board, "generic");
        assert_eq!(board.variant, "N/A");
        assert_eq!(board.mcu, "N/A");
        assert!(board.led_is_unknown());
        assert_eq!(board.flash_size, vec!["512KB", "1MB", "4MB"]);
    }

    #[test]
    fn test_unpack_flash_size() {
        assert_eq!(unpack_flash_size("[4MB]"), vec!["4MB"]);
        assert_eq!(unpack_flash_size("[4MB; 16MB]"), vec!["4MB", "16MB"]);
        assert!(unpack_flash_size("[N/A]").is_empty());
        assert!(unpack_flash_size("[]").is_empty());
    }

    #[test]
    fn test_partitions_keep_source_order() {
        let json = r#"{
            "zeta": {"default": "default"},
            "alpha": {
                "default": "minimal",
                "schemes": {
                    "minimal": {"full_name": "Minimal", "build": "minimal"},
                    "huge_app": {"full_name": "Huge APP", "build": "huge_app"}
                }
            }
        }"#;

        let info: BoardPartitionsInfo = serde_json::from_str(json).unwrap();
        let boards: Vec<&str> = info.keys().map(String::as_str).collect();
        assert_eq!(boards, vec!["zeta", "alpha"]);

        let schemes = info["alpha"].menu_schemes().unwrap();
        let names: Vec<&str> = schemes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["minimal", "huge_app"]);
        assert!(info["zeta"].menu_schemes().is_none());
    }

    #[test]
    fn test_empty_schemes_treated_as_missing() {
        let partitions: BoardPartitions =
            serde_json::from_str(r#"{"default": "default", "schemes": {}}"#).unwrap();
        assert!(partitions.schemes.is_some());
        assert!(partitions.menu_schemes().is_none());
    }

    #[test]
    fn test_partition_entry_type_field() {
        let entry: PartitionEntry = serde_json::from_str(
            r#"{"name": "nvs", "type": "data", "subtype": "nvs", "offset": "0x9000", "size": "0x5000"}"#,
        )
        .unwrap();
        assert_eq!(entry.partition_type, "data");

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "data");
    }
}
