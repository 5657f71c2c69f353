//! Dataset collection from installed Arduino cores.
//!
//! Builds the board list, the partition scheme menus and the partition
//! layouts from an Arduino core checkout:
//!
//! ```text
//! {core_dir}/boards.txt
//! {core_dir}/variants/{variant}/pins_arduino.h
//! {core_dir}/tools/partitions/{build}.csv
//! ```
//!
//! `boards.txt` is a flat `key=value` file. Every board starts with a
//! `{id}.name=` line and its properties follow with the `{id}.` prefix:
//!
//! ```text
//! esp32c2.name=ESP32C2 Dev Module
//! esp32c2.build.variant=esp32c2
//! esp32c2.build.partitions=default
//! esp32c2.menu.PartitionScheme.minimal=Minimal (1.3MB APP/700KB SPIFFS)
//! esp32c2.menu.PartitionScheme.minimal.build.partitions=minimal
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::cores::CoreKind;
use crate::dataset::DatasetError;
use crate::model::{
    BoardInfo, BoardPartitions, BoardPartitionsInfo, CoreInfo, DefaultSchemes, SchemeInfo,
    NOT_AVAILABLE,
};
use crate::partition_csv::parse_partition_csv;

pub const BOARDS_TXT: &str = "boards.txt";
pub const VARIANTS_DIR: &str = "variants";
pub const PINS_HEADER: &str = "pins_arduino.h";
pub const LAYOUTS_DIR: &str = "tools/partitions";

/// GPIO count added to RGB LED pins addressed through `SOC_GPIO_PIN_COUNT`.
pub const SOC_GPIO_PIN_COUNT: i64 = 40;

/// Smallest ESP8266 flash size, listed first regardless of menu order.
const SMALLEST_FLASH_SIZE: &str = "512KB";

/// An installed core to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreSource {
    pub info: CoreInfo,
    /// Root of the core checkout (the directory holding `boards.txt`)
    pub dir: PathBuf,
}

impl CoreSource {
    /// The checkout of a core installed by `arduino-cli` under `packages`,
    /// i.e. `{packages}/{name}/hardware/{name}/{version}`.
    pub fn installed(packages: &Path, info: CoreInfo) -> Self {
        let dir = packages
            .join(&info.core_name)
            .join("hardware")
            .join(&info.core_name)
            .join(&info.installed_version);
        Self { info, dir }
    }
}

/// Everything collected from one core checkout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreCollection {
    /// Boards sorted by board id
    pub boards: Vec<BoardInfo>,
    /// Scheme menus (ESP32 only)
    pub partitions: BoardPartitionsInfo,
    /// Layouts referenced by `partitions`
    pub schemes: DefaultSchemes,
    /// Boards whose built-in LED could not be resolved
    pub boards_without_led: usize,
}

/// Collect boards, partition menus and layouts of one core.
pub fn collect_core(core: CoreKind, dir: &Path) -> Result<CoreCollection, DatasetError> {
    info!(%core, dir = %dir.display(), "Collecting core data");

    let boards_txt = dir.join(BOARDS_TXT);
    let source = fs::read_to_string(&boards_txt).map_err(|source| DatasetError::Read {
        path: boards_txt.clone(),
        source,
    })?;

    let (mut boards, mut partitions) = parse_boards_txt(core, &source);

    let layouts_dir = dir.join(LAYOUTS_DIR);
    check_partitions(&mut partitions, |build| {
        layouts_dir.join(format!("{}.csv", build)).is_file()
    });

    let scanner = LedScanner::new()?;
    let mut boards_without_led = 0;
    for board in &mut boards {
        match find_board_led(&scanner, core, dir, board)? {
            Some(gpio) => board.led_builtin = gpio,
            None => boards_without_led += 1,
        }
    }

    let schemes = collect_layouts(&partitions, &layouts_dir)?;

    info!(
        %core,
        boards = boards.len(),
        boards_without_led,
        partition_boards = partitions.len(),
        layouts = schemes.len(),
        "Core data collected"
    );
    Ok(CoreCollection {
        boards,
        partitions,
        schemes,
        boards_without_led,
    })
}

#[derive(Debug, Default)]
struct BoardDraft {
    name: String,
    variant: Option<String>,
    mcu: Option<String>,
    flash_size: Vec<String>,
}

impl BoardDraft {
    fn add_flash_size(&mut self, size: String) {
        if self.flash_size.contains(&size) {
            return;
        }
        if size == SMALLEST_FLASH_SIZE {
            self.flash_size.insert(0, size);
        } else {
            self.flash_size.push(size);
        }
    }

    fn into_board(self, id: String) -> BoardInfo {
        BoardInfo {
            name: self.name,
            board: id,
            variant: self.variant.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            led_builtin: NOT_AVAILABLE.to_string(),
            mcu: self.mcu.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            flash_size: self.flash_size,
        }
    }
}

/// Parse the boards and (for ESP32) the partition scheme menus of a
/// `boards.txt`.
///
/// Boards are returned sorted by board id with `led_builtin` set to "N/A".
/// Partition entries keep `boards.txt` order and are not checked against the
/// available layouts; see [`check_partitions`].
pub fn parse_boards_txt(core: CoreKind, source: &str) -> (Vec<BoardInfo>, BoardPartitionsInfo) {
    let mut drafts: IndexMap<String, BoardDraft> = IndexMap::new();
    let mut partitions = BoardPartitionsInfo::new();
    let mut current: Option<String> = None;

    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if let Some(id) = key.strip_suffix(".name").filter(|id| !id.contains('.')) {
            drafts.insert(
                id.to_string(),
                BoardDraft {
                    name: value.to_string(),
                    ..Default::default()
                },
            );
            if core == CoreKind::Esp32 {
                partitions.insert(id.to_string(), BoardPartitions::default());
            }
            current = Some(id.to_string());
            continue;
        }

        let Some(id) = current.as_deref() else {
            continue;
        };
        let Some(property) = key.strip_prefix(id).and_then(|rest| rest.strip_prefix('.')) else {
            continue;
        };
        let Some(draft) = drafts.get_mut(id) else {
            continue;
        };

        match property {
            "build.variant" => draft.variant = Some(value.to_string()),
            "build.mcu" => draft.mcu = Some(value.to_string()),
            _ => {}
        }

        match core {
            CoreKind::Esp8266 => {
                if let Some(size) = esp8266_flash_size(property, value) {
                    draft.add_flash_size(size);
                }
            }
            CoreKind::Esp32 => {
                if property == "build.flash_size" {
                    draft.add_flash_size(value.to_string());
                } else if let Some(board) = partitions.get_mut(id) {
                    apply_partition_property(id, board, property, value);
                }
            }
        }
    }

    let mut boards: Vec<BoardInfo> = drafts
        .into_iter()
        .map(|(id, draft)| draft.into_board(id))
        .collect();
    boards.sort_by(|a, b| a.board.cmp(&b.board));

    (boards, partitions)
}

/// Flash size of an ESP8266 `menu.eesz.{layout}.build.flash_size` entry.
///
/// The `autoflash` layout is skipped. Units are aligned with ESP32 ("4M" to
/// "4MB").
fn esp8266_flash_size(property: &str, value: &str) -> Option<String> {
    let layout = property
        .strip_prefix("menu.eesz.")?
        .strip_suffix(".build.flash_size")?;
    if layout == "autoflash" {
        return None;
    }
    if value.ends_with('B') {
        Some(value.to_string())
    } else {
        Some(format!("{}B", value))
    }
}

fn apply_partition_property(id: &str, board: &mut BoardPartitions, property: &str, value: &str) {
    if property == "build.partitions" {
        board.default = value.to_string();
        return;
    }

    let Some(rest) = property.strip_prefix("menu.PartitionScheme.") else {
        return;
    };
    let schemes = board.schemes.get_or_insert_with(IndexMap::new);

    match rest.split_once('.') {
        None => {
            schemes.insert(
                rest.to_string(),
                SchemeInfo {
                    full_name: value.to_string(),
                    build: String::new(),
                },
            );
        }
        Some((scheme, "build.partitions")) => match schemes.get_mut(scheme) {
            Some(info) if info.build.is_empty() => info.build = value.to_string(),
            Some(_) => warn!(board = id, scheme, "More than one build partition"),
            None => debug!(board = id, scheme, "Build partition for unlisted scheme"),
        },
        Some(_) => {}
    }
}

/// Drop partition data that cannot be resolved.
///
/// - schemes without a build are removed
/// - boards without schemes are removed unless their `default` names an
///   existing layout
pub fn check_partitions<F>(partitions: &mut BoardPartitionsInfo, layout_exists: F)
where
    F: Fn(&str) -> bool,
{
    let mut removed = Vec::new();

    for (id, board) in partitions.iter_mut() {
        if let Some(schemes) = board.schemes.as_mut() {
            schemes.retain(|scheme, info| {
                if info.build.is_empty() {
                    warn!(board = %id, scheme = %scheme, "No build partition for scheme");
                }
                !info.build.is_empty()
            });
            if !schemes.is_empty() {
                continue;
            }
            board.schemes = None;
        }

        if board.default.is_empty() {
            error!(board = %id, "No default partition and no schemes");
            removed.push(id.clone());
        } else if !layout_exists(&board.default) {
            error!(board = %id, default = %board.default, "Default partition does not exist");
            removed.push(id.clone());
        } else {
            debug!(board = %id, default = %board.default, "Only default partition exists");
        }
    }

    if !removed.is_empty() {
        warn!(count = removed.len(), boards = %removed.join(", "), "Removing boards without partition");
    }
    partitions.retain(|id, _| !removed.contains(id));
}

/// Read every layout referenced by `partitions` from `{build}.csv` files.
///
/// A missing file yields an empty layout.
pub fn collect_layouts(
    partitions: &BoardPartitionsInfo,
    layouts_dir: &Path,
) -> Result<DefaultSchemes, DatasetError> {
    let mut schemes = DefaultSchemes::new();

    for board in partitions.values() {
        let builds: Vec<&str> = match board.menu_schemes() {
            Some(menu) => menu.values().map(|info| info.build.as_str()).collect(),
            None => vec![board.default.as_str()],
        };

        for build in builds {
            if schemes.contains_key(build) {
                continue;
            }
            let path = layouts_dir.join(format!("{}.csv", build));
            let layout = match fs::read_to_string(&path) {
                Ok(source) => parse_partition_csv(&source),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(path = %path.display(), "Partition scheme file not found");
                    Vec::new()
                }
                Err(source) => return Err(DatasetError::Read { path, source }),
            };
            if layout.is_empty() {
                warn!(build, "No valid partition rows");
            }
            schemes.insert(build.to_string(), layout);
        }
    }

    Ok(schemes)
}

fn find_board_led(
    scanner: &LedScanner,
    core: CoreKind,
    dir: &Path,
    board: &BoardInfo,
) -> Result<Option<String>, DatasetError> {
    if board.variant == NOT_AVAILABLE {
        return Ok(None);
    }

    let path = dir.join(VARIANTS_DIR).join(&board.variant).join(PINS_HEADER);
    let header = match fs::read_to_string(&path) {
        Ok(header) => header,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(board = %board.board, variant = %board.variant, "Could not find pins_arduino.h");
            return Ok(None);
        }
        Err(source) => return Err(DatasetError::Read { path, source }),
    };

    let gpio = scanner.find_led_builtin(core, &header);
    if gpio.is_none() {
        debug!(board = %board.board, variant = %board.variant, "No LED_BUILTIN entry");
    }
    Ok(gpio)
}

/// Finds the `LED_BUILTIN` GPIO in a `pins_arduino.h`.
#[derive(Debug, Clone)]
pub struct LedScanner {
    define: Regex,
    uint8_const: Regex,
    pin_count_led: Regex,
    gpio_led: Regex,
}

impl LedScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            define: Regex::new(r"^#define +([A-Z_]+) +([A-Z_\d]+)")?,
            uint8_const: Regex::new(r"^static +const +uint8_t +([A-Z_]+) += +(\d+);")?,
            pin_count_led: Regex::new(
                r"^.+LED_BUILTIN += +\(?SOC_GPIO_PIN_COUNT +\+ +([A-Z_]+)\)?;",
            )?,
            gpio_led: Regex::new(r"^.+ LED_BUILTIN[(= ]+(\d+)")?,
        })
    }

    /// The built-in LED GPIO of a variant header, if the first matching
    /// definition can be resolved.
    ///
    /// Handles `#define LED_BUILTIN 2`, `#define LED_BUILTIN (13)` and
    /// `static const uint8_t LED_BUILTIN = 8;`. ESP32 RGB LEDs written as
    /// `SOC_GPIO_PIN_COUNT + NAME` resolve `NAME` through earlier `#define`
    /// and `static const uint8_t` lines.
    pub fn find_led_builtin(&self, core: CoreKind, header: &str) -> Option<String> {
        let mut defines: HashMap<&str, &str> = HashMap::new();
        let mut constants: HashMap<&str, &str> = HashMap::new();

        for line in header.lines() {
            if core == CoreKind::Esp32 {
                if let Some(caps) = self.define.captures(line) {
                    if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
                        defines.insert(name.as_str(), value.as_str());
                    }
                }
                if let Some(caps) = self.uint8_const.captures(line) {
                    if let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) {
                        constants.insert(name.as_str(), value.as_str());
                    }
                }
                if let Some(name) = self.pin_count_led.captures(line).and_then(|c| c.get(1)) {
                    if let Some(pin) = resolve_pin(name.as_str(), &defines, &constants) {
                        return Some((pin + SOC_GPIO_PIN_COUNT).to_string());
                    }
                }
            }

            if let Some(gpio) = self.gpio_led.captures(line).and_then(|c| c.get(1)) {
                return Some(gpio.as_str().to_string());
            }
        }
        None
    }
}

fn resolve_pin(
    name: &str,
    defines: &HashMap<&str, &str>,
    constants: &HashMap<&str, &str>,
) -> Option<i64> {
    let value = defines.get(name)?;
    if let Ok(pin) = value.parse::<i64>() {
        return Some(pin);
    }
    constants.get(value)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ESP8266_BOARDS: &str = "\
menu.eesz=Flash Size

generic.name=Generic ESP8266 Module
generic.build.mcu=esp8266
generic.build.variant=generic
generic.menu.eesz.1M=1MB (FS:64KB OTA:~470KB)
generic.menu.eesz.1M.build.flash_size=1M
generic.menu.eesz.2M.build.flash_size=2M
generic.menu.eesz.512K.build.flash_size=512K
generic.menu.eesz.4M2M.build.flash_size=4M
generic.menu.eesz.4M3M.build.flash_size=4M
generic.menu.eesz.autoflash.build.flash_size=16M

# LOLIN
d1.name=LOLIN(WeMos) D1 R1
d1.build.variant=d1
d1.menu.eesz.4M.build.flash_size=4M
";

    const ESP32_BOARDS: &str = "\
menu.PartitionScheme=Partition Scheme

esp32c2.name=ESP32C2 Dev Module
esp32c2.build.mcu=esp32c2
esp32c2.build.variant=esp32c2
esp32c2.build.flash_size=4MB
esp32c2.build.partitions=default
esp32c2.menu.PartitionScheme.default=Default 4MB with spiffs (1.2MB APP/1.5MB SPIFFS)
esp32c2.menu.PartitionScheme.default.build.partitions=default
esp32c2.menu.PartitionScheme.minimal=Minimal (1.3MB APP/700KB SPIFFS)
esp32c2.menu.PartitionScheme.minimal.build.partitions=minimal
esp32c2.menu.PartitionScheme.minimal.build.partitions=huge_app
esp32c2.menu.PartitionScheme.custom=Custom
esp32c2.menu.PartitionScheme.custom.upload.maximum_size=1310720

S_ODI_Ultra.name=S.ODI Ultra v1
S_ODI_Ultra.build.mcu=esp32
S_ODI_Ultra.build.partitions=default

nopart.name=No Partition Board
nopart.build.variant=nopart
";

    #[test]
    fn test_parse_esp8266_boards() {
        let (boards, partitions) = parse_boards_txt(CoreKind::Esp8266, ESP8266_BOARDS);
        assert!(partitions.is_empty());

        let ids: Vec<&str> = boards.iter().map(|b| b.board.as_str()).collect();
        assert_eq!(ids, vec!["d1", "generic"]);

        let generic = &boards[1];
        assert_eq!(generic.name, "Generic ESP8266 Module");
        assert_eq!(generic.mcu, "esp8266");
        assert_eq!(generic.led_builtin, "N/A");
        assert_eq!(generic.flash_size, vec!["512KB", "1MB", "2MB", "4MB"]);

        assert_eq!(boards[0].mcu, "N/A");
        assert_eq!(boards[0].flash_size, vec!["4MB"]);
    }

    #[test]
    fn test_parse_esp32_boards() {
        let (boards, partitions) = parse_boards_txt(CoreKind::Esp32, ESP32_BOARDS);

        let ids: Vec<&str> = boards.iter().map(|b| b.board.as_str()).collect();
        assert_eq!(ids, vec!["S_ODI_Ultra", "esp32c2", "nopart"]);
        assert_eq!(boards[0].name, "S.ODI Ultra v1");
        assert_eq!(boards[0].variant, "N/A");
        assert_eq!(boards[1].flash_size, vec!["4MB"]);

        let keys: Vec<&str> = partitions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["esp32c2", "S_ODI_Ultra", "nopart"]);

        let esp32c2 = &partitions["esp32c2"];
        assert_eq!(esp32c2.default, "default");
        let schemes = esp32c2.schemes.as_ref().unwrap();
        assert_eq!(schemes.len(), 3);
        assert_eq!(schemes["minimal"].full_name, "Minimal (1.3MB APP/700KB SPIFFS)");
        assert_eq!(schemes["minimal"].build, "minimal");
        assert_eq!(schemes["custom"].build, "");

        assert_eq!(partitions["S_ODI_Ultra"].schemes, None);
    }

    #[test]
    fn test_check_partitions() {
        let (_, mut partitions) = parse_boards_txt(CoreKind::Esp32, ESP32_BOARDS);
        check_partitions(&mut partitions, |build| build == "default");

        let keys: Vec<&str> = partitions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["esp32c2", "S_ODI_Ultra"]);

        let schemes = partitions["esp32c2"].menu_schemes().unwrap();
        let names: Vec<&str> = schemes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["default", "minimal"]);
    }

    #[test]
    fn test_check_partitions_missing_default_layout() {
        let (_, mut partitions) = parse_boards_txt(CoreKind::Esp32, ESP32_BOARDS);
        check_partitions(&mut partitions, |_| false);

        // boards with menu schemes are kept even without layout files
        let keys: Vec<&str> = partitions.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["esp32c2"]);
    }

    fn scan(core: CoreKind, header: &str) -> Option<String> {
        LedScanner::new().unwrap().find_led_builtin(core, header)
    }

    #[test]
    fn test_led_define() {
        assert_eq!(
            scan(CoreKind::Esp8266, "#define PIN_WIRE_SDA (4)\n#define LED_BUILTIN 2\n"),
            Some("2".to_string())
        );
        assert_eq!(
            scan(CoreKind::Esp8266, "#define LED_BUILTIN    (13)\n"),
            Some("13".to_string())
        );
    }

    #[test]
    fn test_led_static_const() {
        let header = "\
static const uint8_t TX = 21;
static const uint8_t LED_BUILTIN = 8;
#define BUILTIN_LED LED_BUILTIN // backward compatibility
";
        assert_eq!(scan(CoreKind::Esp32, header), Some("8".to_string()));
    }

    #[test]
    fn test_led_rgb_pin_count() {
        let header = "\
#define PIN_RGB_LED 48
// BUILTIN_LED can be used in new Arduino API digitalWrite() like in Blink.ino
static const uint8_t LED_BUILTIN = SOC_GPIO_PIN_COUNT + PIN_RGB_LED;
";
        assert_eq!(scan(CoreKind::Esp32, header), Some("88".to_string()));
    }

    #[test]
    fn test_led_rgb_through_constant() {
        let header = "\
static const uint8_t RGB_PIN = 38;
#define PIN_NEOPIXEL RGB_PIN
static const uint8_t LED_BUILTIN = (SOC_GPIO_PIN_COUNT + PIN_NEOPIXEL);
";
        assert_eq!(scan(CoreKind::Esp32, header), Some("78".to_string()));
        // the pin count form is only resolved for ESP32 variants
        assert_eq!(scan(CoreKind::Esp8266, header), None);
    }

    #[test]
    fn test_led_missing() {
        assert_eq!(scan(CoreKind::Esp32, "#define PIN_WIRE_SDA (4)\n"), None);
        assert_eq!(scan(CoreKind::Esp32, ""), None);
    }

    #[test]
    fn test_installed_core_dir() {
        let info = CoreInfo {
            core: "esp32:esp32".to_string(),
            installed_version: "3.2.0".to_string(),
            latest_version: "3.2.0".to_string(),
            core_name: "esp32".to_string(),
        };
        let source = CoreSource::installed(Path::new("/home/dev/.arduino15/packages"), info);
        assert_eq!(
            source.dir,
            PathBuf::from("/home/dev/.arduino15/packages/esp32/hardware/esp32/3.2.0")
        );
    }
}
