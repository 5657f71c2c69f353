//! Arduino core lookup.
//!
//! The ESP8266 and ESP32 tabs link every board to the `pins_arduino.h` of its
//! variant, pinned to the core version listed in `core_list.json`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::CoreInfo;

const ESP8266_REPOSITORY: &str = "https://github.com/esp8266/Arduino";
const ESP32_REPOSITORY: &str = "https://github.com/espressif/arduino-esp32";

/// The supported Arduino cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoreKind {
    Esp8266,
    Esp32,
}

impl CoreKind {
    pub const ALL: [CoreKind; 2] = [CoreKind::Esp8266, CoreKind::Esp32];

    /// Core name as used in `core_list.json` and URLs.
    pub fn name(&self) -> &'static str {
        match self {
            CoreKind::Esp8266 => "esp8266",
            CoreKind::Esp32 => "esp32",
        }
    }

    /// GitHub repository of the core's sources.
    pub fn repository(&self) -> &'static str {
        match self {
            CoreKind::Esp8266 => ESP8266_REPOSITORY,
            CoreKind::Esp32 => ESP32_REPOSITORY,
        }
    }
}

impl fmt::Display for CoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for core names other than "esp8266" and "esp32".
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown core: {0}")]
pub struct UnknownCore(pub String);

impl FromStr for CoreKind {
    type Err = UnknownCore;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "esp8266" => Ok(CoreKind::Esp8266),
            "esp32" => Ok(CoreKind::Esp32),
            other => Err(UnknownCore(other.to_string())),
        }
    }
}

/// Installed version of a core, if listed.
///
/// When a core is listed more than once the last entry wins.
pub fn core_version<'a>(cores: &'a [CoreInfo], core_name: &str) -> Option<&'a str> {
    cores
        .iter()
        .rev()
        .find(|core| core.core_name == core_name)
        .map(|core| core.installed_version.as_str())
}

/// Parse the output of `arduino-cli core list`.
///
/// The first line is the column header. Every other line reads
/// `ID INSTALLED LATEST NAME`; lines of another shape are skipped.
pub fn parse_core_list(text: &str) -> Vec<CoreInfo> {
    let mut cores = Vec::new();

    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_core_line(line) {
            Some(core) => cores.push(core),
            None => warn!(line, "Unexpected core list line"),
        }
    }
    cores
}

fn parse_core_line(line: &str) -> Option<CoreInfo> {
    let mut columns = line.split_whitespace();
    let core = columns.next()?;
    let installed_version = columns.next()?;
    let latest_version = columns.next()?;
    let core_name = columns.next()?;

    let is_ident = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    };
    let is_version = |s: &str| s.chars().all(|c| c == '.' || c.is_ascii_digit());

    let (vendor, arch) = core.split_once(':')?;
    if !is_ident(vendor) || !is_ident(arch) || !is_ident(core_name) {
        return None;
    }
    if !is_version(installed_version) || !is_version(latest_version) {
        return None;
    }

    Some(CoreInfo {
        core: core.to_string(),
        installed_version: installed_version.to_string(),
        latest_version: latest_version.to_string(),
        core_name: core_name.to_string(),
    })
}

/// Link to a variant's `pins_arduino.h` at the given core version.
///
/// Returns an empty string for unknown core names.
pub fn pins_arduino_link(core_name: &str, core_version: &str, variant: &str) -> String {
    match core_name.parse::<CoreKind>() {
        Ok(core) => format!(
            "{}/blob/{}/variants/{}/pins_arduino.h",
            core.repository(),
            core_version,
            variant
        ),
        Err(_) => String::new(),
    }
}
