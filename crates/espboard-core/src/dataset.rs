//! Bundled dataset loading.
//!
//! The viewer works on one read-only [`Dataset`] loaded at startup and shared
//! by reference with every table and resolver. The data directory holds the
//! files written by [`Dataset::save`]:
//!
//! | file | contents |
//! |---|---|
//! | `esp8266.json` | ESP8266 board list |
//! | `esp32.json` | ESP32 board list |
//! | `esp32_partitions.json` | scheme menu of every ESP32 board |
//! | `esp32_partition_schemes.json` | partition layouts by build name |
//! | `core_list.json` | installed core versions |
//!
//! When `esp32_partition_schemes.json` is absent, layouts are read from
//! `partitions/{build}.csv` instead.
//!
//! [`Dataset::from_cores`] builds the same data from installed core
//! checkouts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collect::{collect_core, CoreSource};
use crate::cores::{core_version, CoreKind};
use crate::model::{BoardInfo, BoardPartitionsInfo, CoreInfo, DefaultSchemes};
use crate::partition_csv::parse_partition_csv;

pub const ESP8266_BOARDS_FILE: &str = "esp8266.json";
pub const ESP32_BOARDS_FILE: &str = "esp32.json";
pub const PARTITIONS_FILE: &str = "esp32_partitions.json";
pub const SCHEMES_FILE: &str = "esp32_partition_schemes.json";
pub const CORE_LIST_FILE: &str = "core_list.json";
pub const SCHEMES_CSV_DIR: &str = "partitions";

/// Errors that can occur while loading, collecting or saving the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// A data file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data file is not valid JSON of the expected shape.
    #[error("Invalid data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A data file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A data file could not be encoded.
    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A header scan pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// All board and partition data of the viewer.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub esp8266_boards: Vec<BoardInfo>,
    pub esp32_boards: Vec<BoardInfo>,
    pub partitions: BoardPartitionsInfo,
    pub schemes: DefaultSchemes,
    pub cores: Vec<CoreInfo>,
}

impl Dataset {
    /// Load the dataset from a data directory.
    pub fn load(dir: &Path) -> Result<Self, DatasetError> {
        info!(dir = %dir.display(), "Loading dataset");

        let schemes_file = dir.join(SCHEMES_FILE);
        let schemes = if schemes_file.is_file() {
            read_json(&schemes_file)?
        } else {
            let csv_dir = dir.join(SCHEMES_CSV_DIR);
            warn!(
                "{} not found, reading layouts from {}",
                SCHEMES_FILE,
                csv_dir.display()
            );
            load_scheme_dir(&csv_dir)?
        };

        let dataset = Self {
            esp8266_boards: read_json(&dir.join(ESP8266_BOARDS_FILE))?,
            esp32_boards: read_json(&dir.join(ESP32_BOARDS_FILE))?,
            partitions: read_json(&dir.join(PARTITIONS_FILE))?,
            schemes,
            cores: read_json(&dir.join(CORE_LIST_FILE))?,
        };

        info!(
            esp8266_boards = dataset.esp8266_boards.len(),
            esp32_boards = dataset.esp32_boards.len(),
            partition_boards = dataset.partitions.len(),
            layouts = dataset.schemes.len(),
            "Dataset loaded"
        );
        Ok(dataset)
    }

    /// Collect the dataset from installed core checkouts.
    ///
    /// Sources whose core name is not a supported core are skipped. ESP32
    /// sources also provide the partition menus and layouts.
    pub fn from_cores(sources: &[CoreSource]) -> Result<Self, DatasetError> {
        let mut dataset = Self::default();

        for source in sources {
            let core = match source.info.core_name.parse::<CoreKind>() {
                Ok(core) => core,
                Err(e) => {
                    warn!(core = %source.info.core, "Skipping core: {}", e);
                    continue;
                }
            };

            let collection = collect_core(core, &source.dir)?;
            if collection.boards_without_led > 0 {
                info!(
                    %core,
                    count = collection.boards_without_led,
                    "Boards without LED_BUILTIN"
                );
            }

            match core {
                CoreKind::Esp8266 => dataset.esp8266_boards = collection.boards,
                CoreKind::Esp32 => {
                    dataset.esp32_boards = collection.boards;
                    dataset.partitions = collection.partitions;
                    dataset.schemes = collection.schemes;
                }
            }
            dataset.cores.push(source.info.clone());
        }

        Ok(dataset)
    }

    /// Write the dataset as the JSON files read by [`Dataset::load`].
    pub fn save(&self, dir: &Path) -> Result<(), DatasetError> {
        fs::create_dir_all(dir).map_err(|source| DatasetError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        write_json(&dir.join(ESP8266_BOARDS_FILE), &self.esp8266_boards)?;
        write_json(&dir.join(ESP32_BOARDS_FILE), &self.esp32_boards)?;
        write_json(&dir.join(PARTITIONS_FILE), &self.partitions)?;
        write_json(&dir.join(SCHEMES_FILE), &self.schemes)?;
        write_json(&dir.join(CORE_LIST_FILE), &self.cores)?;

        info!(dir = %dir.display(), "Dataset saved");
        Ok(())
    }

    /// Board list of a core.
    pub fn boards_for(&self, core: CoreKind) -> &[BoardInfo] {
        match core {
            CoreKind::Esp8266 => &self.esp8266_boards,
            CoreKind::Esp32 => &self.esp32_boards,
        }
    }

    /// Installed version of a core, or an empty string if not listed.
    pub fn core_version(&self, core: CoreKind) -> &str {
        core_version(&self.cores, core.name()).unwrap_or_default()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    debug!(path = %path.display(), "Reading data file");
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DatasetError> {
    debug!(path = %path.display(), "Writing data file");
    let text = serde_json::to_string_pretty(value).map_err(|source| DatasetError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| DatasetError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Read every `{build}.csv` of a directory, ordered by build name.
///
/// A missing directory yields no layouts.
pub fn load_scheme_dir(dir: &Path) -> Result<DefaultSchemes, DatasetError> {
    let read_error = |source| DatasetError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "No partition layouts found");
            return Ok(IndexMap::new());
        }
        Err(e) => return Err(read_error(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_error)?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("csv") {
            files.push(path);
        }
    }
    files.sort();

    let mut schemes = IndexMap::new();
    for path in files {
        let Some(build) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let source = fs::read_to_string(&path).map_err(|source| DatasetError::Read {
            path: path.clone(),
            source,
        })?;

        let layout = parse_partition_csv(&source);
        if layout.is_empty() {
            warn!(build, "No valid partition rows");
        }
        schemes.insert(build.to_string(), layout);
    }
    Ok(schemes)
}
