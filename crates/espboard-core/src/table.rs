//! Board table engine.
//!
//! Produces the filtered and sorted board view shown in the ESP8266 and ESP32
//! tabs. The engine holds the UI controls (free-text filter, "ignore N/A LED"
//! toggle, active column sort) and recomputes the view whenever one of them
//! changes:
//!
//! 1. the base list is the input, minus "N/A" LED rows when the toggle is on
//! 2. the view is the base list restricted to rows matching the filter
//! 3. the active sort, if any, is applied to the view
//!
//! Rows are borrowed from the dataset; nothing is cloned or mutated.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{BoardInfo, NOT_AVAILABLE};
use crate::numeric::parse_leading_int;

/// Rank of the "N/A" LED sentinel when sorting by LED.
///
/// Places N/A rows after every real GPIO ascending and before them descending.
pub const UNKNOWN_LED_RANK: i64 = 1000;

/// Flash size that always ranks as 0.
const SMALLEST_FLASH_SIZE: &str = "512KB";

/// A sortable table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Name,
    Board,
    Variant,
    Led,
    Mcu,
    FlashSize,
}

impl SortColumn {
    /// Column name as used by the table header and query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Board => "board",
            SortColumn::Variant => "variant",
            SortColumn::Led => "led",
            SortColumn::Mcu => "mcu",
            SortColumn::FlashSize => "flash_size",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SortColumn::Name),
            "board" => Ok(SortColumn::Board),
            "variant" => Ok(SortColumn::Variant),
            "led" => Ok(SortColumn::Led),
            "mcu" => Ok(SortColumn::Mcu),
            "flash_size" => Ok(SortColumn::FlashSize),
            other => Err(SortParseError::UnknownColumn(other.to_string())),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_asc(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }
}

impl FromStr for SortDirection {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(SortParseError::UnknownDirection(other.to_string())),
        }
    }
}

/// Errors from parsing sort controls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SortParseError {
    #[error("Unknown sort column: {0}")]
    UnknownColumn(String),
    #[error("Unknown sort direction: {0}")]
    UnknownDirection(String),
}

/// The active column sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

/// Filterable, sortable view over a board list.
#[derive(Debug, Clone)]
pub struct BoardTable<'a> {
    /// The unfiltered input
    boards: &'a [BoardInfo],
    /// Normalized filter (trimmed, lower-cased)
    filter: String,
    /// Drop rows whose LED is "N/A"
    ignore_na: bool,
    /// Active sort
    sort: Option<SortSpec>,
    /// Length of the base list (input after the N/A toggle)
    total_count: usize,
    /// The filtered and sorted view
    view: Vec<&'a BoardInfo>,
}

impl<'a> BoardTable<'a> {
    /// Create a table showing every board in input order.
    pub fn new(boards: &'a [BoardInfo]) -> Self {
        let mut table = Self {
            boards,
            filter: String::new(),
            ignore_na: false,
            sort: None,
            total_count: 0,
            view: Vec::new(),
        };
        table.recompute();
        table
    }

    /// Set the free-text filter and recompute the view.
    ///
    /// The text is trimmed and lower-cased; an empty filter matches everything.
    pub fn apply_filter(&mut self, text: &str) {
        self.filter = text.trim().to_lowercase();
        self.recompute();
    }

    /// Toggle hiding boards without a known built-in LED.
    pub fn apply_ignore_na(&mut self, enabled: bool) {
        self.ignore_na = enabled;
        self.recompute();
    }

    /// Sort the current view. The sort stays active for later recomputations.
    pub fn sort_data(&mut self, spec: SortSpec) {
        self.sort = Some(spec);
        self.view.sort_by(|a, b| compare_boards(a, b, spec));
    }

    /// Drop the active sort and return to input order.
    pub fn clear_sort(&mut self) {
        self.sort = None;
        self.recompute();
    }

    /// The filtered and sorted rows.
    pub fn rows(&self) -> &[&'a BoardInfo] {
        &self.view
    }

    /// Number of boards in the base list (respecting the N/A toggle).
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Number of rows in the current view.
    pub fn filtered_count(&self) -> usize {
        self.view.len()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn ignore_na(&self) -> bool {
        self.ignore_na
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    fn recompute(&mut self) {
        let ignore_na = self.ignore_na;
        let base: Vec<&'a BoardInfo> = self
            .boards
            .iter()
            .filter(|board| !(ignore_na && board.led_is_unknown()))
            .collect();
        self.total_count = base.len();

        let filter = self.filter.as_str();
        self.view = base
            .into_iter()
            .filter(|board| matches_filter(board, filter))
            .collect();

        if let Some(spec) = self.sort {
            self.view.sort_by(|a, b| compare_boards(a, b, spec));
        }
    }
}

/// True if any displayed field contains `filter` (already lower-cased).
fn matches_filter(board: &BoardInfo, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }

    let flash_size = board.flash_size.join(",");
    [
        board.name.as_str(),
        board.board.as_str(),
        board.variant.as_str(),
        board.led_builtin.as_str(),
        board.mcu.as_str(),
        flash_size.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(filter))
}

fn compare_boards(a: &BoardInfo, b: &BoardInfo, spec: SortSpec) -> Ordering {
    let ordering = match spec.column {
        SortColumn::Name => a.name.cmp(&b.name),
        SortColumn::Board => a.board.cmp(&b.board),
        SortColumn::Variant => a.variant.cmp(&b.variant),
        SortColumn::Mcu => a.mcu.cmp(&b.mcu),
        SortColumn::Led => led_rank(&a.led_builtin).cmp(&led_rank(&b.led_builtin)),
        SortColumn::FlashSize => {
            let asc = spec.direction.is_asc();
            flash_size_rank(&a.flash_size, asc).cmp(&flash_size_rank(&b.flash_size, asc))
        }
    };

    match spec.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Sort key of a built-in LED value.
pub fn led_rank(led_builtin: &str) -> i64 {
    if led_builtin == NOT_AVAILABLE {
        return UNKNOWN_LED_RANK;
    }
    parse_leading_int(led_builtin).unwrap_or(UNKNOWN_LED_RANK)
}

/// Sort key of a flash size list.
///
/// Ascending sorts compare the smallest capacity (first entry), descending
/// sorts the largest (last entry). The unit is dropped, so "4MB" ranks as 4.
/// "512KB", empty lists and unparsable values rank as 0.
pub fn flash_size_rank(flash_sizes: &[String], ascending: bool) -> i64 {
    let representative = if ascending {
        flash_sizes.first()
    } else {
        flash_sizes.last()
    };

    match representative {
        None => 0,
        Some(size) if size == SMALLEST_FLASH_SIZE => 0,
        Some(size) => parse_leading_int(strip_unit(size)).unwrap_or(0),
    }
}

/// Drop the two-character unit suffix ("MB", "KB").
fn strip_unit(size: &str) -> &str {
    let end = size
        .char_indices()
        .rev()
        .nth(1)
        .map(|(index, _)| index)
        .unwrap_or(0);
    &size[..end]
}
