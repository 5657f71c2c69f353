//! # espboard-core
//!
//! Board metadata model and view logic for the ESP board overview.
//!
//! This crate provides:
//! - Data model types (BoardInfo, PartitionEntry, BoardPartitions, etc.)
//! - The board table engine (filter, N/A toggle, column sort)
//! - The partition scheme resolver (scheme fallback, extended rows, diagram)
//! - Core version lookup and `pins_arduino.h` links
//! - Dataset loading from the bundled JSON files
//! - Dataset collection from installed Arduino core checkouts
//!
//! This crate is intentionally runtime-agnostic and contains no async code.
//! Every view operation is a synchronous recomputation over an immutable
//! [`Dataset`] snapshot.

pub mod collect;
pub mod cores;
pub mod dataset;
pub mod model;
pub mod numeric;
pub mod partition;
pub mod partition_csv;
pub mod settings;
pub mod table;
pub mod view;

pub use collect::{collect_core, CoreCollection, CoreSource};
pub use cores::{parse_core_list, pins_arduino_link, CoreKind};
pub use dataset::{Dataset, DatasetError};
pub use model::*;
pub use partition::{DiagramBar, DiagramLayout, PartitionResolver, SchemeOption, SchemeSelection};
pub use settings::{SettingsError, ViewerSettings};
pub use table::{BoardTable, SortColumn, SortDirection, SortSpec};
pub use view::{ViewDescriptor, ViewKind};
