//! ESP32 partition scheme resolver.
//!
//! Backs the partition tab: the user picks a board, then one of the board's
//! partition schemes, and the resolver produces the partition rows of the
//! selected scheme together with the geometry of a proportional layout
//! diagram.
//!
//! Resolution goes through two indirections:
//!
//! ```text
//! board id --(esp32_partitions.json)--> scheme name --(schemes[*].build)--> layout
//! ```
//!
//! Every lookup miss degrades to an empty result or to the documented
//! fallback in [`select_default_scheme`]; nothing here returns an error.

use serde::Serialize;
use tracing::debug;

use crate::model::{
    BoardPartitions, BoardPartitionsInfo, DefaultSchemes, PartitionEntry, PartitionEntryExtended,
};
use crate::numeric::parse_partition_number;

/// Colors assigned to partition rows, cycling by row position.
pub const DIAGRAM_PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

/// Height of the diagram viewport in diagram units.
pub const DIAGRAM_HEIGHT: u64 = 100;

/// Bytes per diagram unit.
const DIAGRAM_UNIT: u64 = 1000;

/// A scheme resolved to the layout it builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeSelection {
    /// Scheme name as listed in the board's menu
    pub scheme: String,
    /// Layout name in [`DefaultSchemes`]
    pub build: String,
}

/// One entry of the scheme drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemeOption {
    pub name: String,
    pub full_name: String,
}

/// Look up a board's partition configuration.
pub fn lookup_board<'a>(
    partitions: &'a BoardPartitionsInfo,
    board_id: &str,
) -> Option<&'a BoardPartitions> {
    partitions.get(board_id)
}

/// Look up a menu scheme of a board by name.
///
/// Only the board's `schemes` map is searched. The implicit `default` scheme
/// of a board without menu schemes is never found here.
pub fn lookup_scheme(board: &BoardPartitions, scheme: &str) -> Option<SchemeSelection> {
    let info = board.menu_schemes()?.get(scheme)?;
    Some(SchemeSelection {
        scheme: scheme.to_string(),
        build: info.build.clone(),
    })
}

/// Look up a partition layout by build name.
pub fn lookup_build<'a>(schemes: &'a DefaultSchemes, build: &str) -> Option<&'a [PartitionEntry]> {
    schemes.get(build).map(Vec::as_slice)
}

/// Pick the scheme a board starts with.
///
/// - no menu schemes: the implicit `default` scheme
/// - `default` names a menu scheme: that scheme
/// - otherwise: the first menu scheme in source order
pub fn select_default_scheme(board: &BoardPartitions) -> SchemeSelection {
    let Some(schemes) = board.menu_schemes() else {
        return implicit_scheme(board);
    };

    if let Some(selection) = lookup_scheme(board, &board.default) {
        return selection;
    }

    match schemes.get_index(0) {
        Some((name, info)) => SchemeSelection {
            scheme: name.clone(),
            build: info.build.clone(),
        },
        None => implicit_scheme(board),
    }
}

/// The drop-down entries of a board.
pub fn scheme_options(board: &BoardPartitions) -> Vec<SchemeOption> {
    match board.menu_schemes() {
        Some(schemes) => schemes
            .iter()
            .map(|(name, info)| SchemeOption {
                name: name.clone(),
                full_name: info.full_name.clone(),
            })
            .collect(),
        None => vec![SchemeOption {
            name: board.default.clone(),
            full_name: board.default.clone(),
        }],
    }
}

fn implicit_scheme(board: &BoardPartitions) -> SchemeSelection {
    SchemeSelection {
        scheme: board.default.clone(),
        build: board.default.clone(),
    }
}

/// Parse offsets and sizes and assign diagram colors, keeping row order.
pub fn extend_entries(entries: &[PartitionEntry]) -> Vec<PartitionEntryExtended> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let offset_dec = parse_partition_number(&entry.offset);
            let size_dec = parse_partition_number(&entry.size);
            PartitionEntryExtended {
                entry: entry.clone(),
                offset_dec,
                size_dec,
                offset_size: offset_dec.saturating_add(size_dec),
                offset_hex: format!("{:#x}", offset_dec),
                size_hex: format!("{:#x}", size_dec),
                color: DIAGRAM_PALETTE[index % DIAGRAM_PALETTE.len()].to_string(),
            }
        })
        .collect()
}

/// One bar of the layout diagram, in units of 1000 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramBar {
    pub color: String,
    pub offset: u64,
    pub size: u64,
}

/// Geometry of the proportional layout diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramLayout {
    pub bars: Vec<DiagramBar>,
    /// Right edge of the last bar
    pub total_extent: u64,
    /// SVG viewBox, "0 0 {total_extent} 100"
    pub view_box: String,
}

impl DiagramLayout {
    /// Build the diagram for rows given in ascending offset order.
    ///
    /// The extent is taken from the last row; rows are not re-sorted.
    pub fn from_rows(rows: &[PartitionEntryExtended]) -> Self {
        let bars: Vec<DiagramBar> = rows
            .iter()
            .map(|row| DiagramBar {
                color: row.color.clone(),
                offset: row.offset_dec / DIAGRAM_UNIT,
                size: row.size_dec / DIAGRAM_UNIT,
            })
            .collect();

        let total_extent = bars.last().map(|bar| bar.offset + bar.size).unwrap_or(0);
        Self::with_bars(bars, total_extent)
    }

    fn with_bars(bars: Vec<DiagramBar>, total_extent: u64) -> Self {
        Self {
            bars,
            total_extent,
            view_box: format!("0 0 {} {}", total_extent, DIAGRAM_HEIGHT),
        }
    }
}

impl Default for DiagramLayout {
    fn default() -> Self {
        Self::with_bars(Vec::new(), 0)
    }
}

/// Selection state of the partition view.
///
/// Borrows the partition datasets; every change recomputes the rows, and the
/// diagram whenever the resolved layout has at least one row. An empty layout
/// leaves the previous diagram in place.
#[derive(Debug, Clone)]
pub struct PartitionResolver<'a> {
    partitions: &'a BoardPartitionsInfo,
    schemes: &'a DefaultSchemes,
    selected_board: Option<String>,
    scheme_options: Vec<SchemeOption>,
    selected_scheme: Option<String>,
    selected_build: Option<String>,
    entries: &'a [PartitionEntry],
    rows: Vec<PartitionEntryExtended>,
    diagram: DiagramLayout,
}

impl<'a> PartitionResolver<'a> {
    /// Create a resolver with nothing selected.
    pub fn new(partitions: &'a BoardPartitionsInfo, schemes: &'a DefaultSchemes) -> Self {
        Self {
            partitions,
            schemes,
            selected_board: None,
            scheme_options: Vec::new(),
            selected_scheme: None,
            selected_build: None,
            entries: &[],
            rows: Vec::new(),
            diagram: DiagramLayout::default(),
        }
    }

    /// Select the first board of the dataset.
    pub fn initialize(&mut self) {
        let partitions = self.partitions;
        if let Some(board_id) = partitions.keys().next() {
            self.on_board_change(board_id);
        }
    }

    /// Select a board and its starting scheme.
    pub fn on_board_change(&mut self, board_id: &str) {
        debug!(board = board_id, "Board changed");
        self.selected_board = Some(board_id.to_string());

        match lookup_board(self.partitions, board_id) {
            Some(board) => {
                let selection = select_default_scheme(board);
                self.scheme_options = scheme_options(board);
                self.entries = lookup_build(self.schemes, &selection.build).unwrap_or(&[]);
                self.selected_scheme = Some(selection.scheme);
                self.selected_build = Some(selection.build);
            }
            None => {
                self.scheme_options = Vec::new();
                self.selected_scheme = None;
                self.selected_build = None;
                self.entries = &[];
            }
        }

        self.refresh();
    }

    /// Select a scheme of the current board.
    pub fn on_scheme_change(&mut self, scheme: &str) {
        debug!(scheme, "Scheme changed");
        let selection = self
            .selected_board
            .as_deref()
            .and_then(|board_id| lookup_board(self.partitions, board_id))
            .and_then(|board| lookup_scheme(board, scheme));

        self.selected_scheme = Some(scheme.to_string());
        match selection {
            Some(selection) => {
                self.entries = lookup_build(self.schemes, &selection.build).unwrap_or(&[]);
                self.selected_build = Some(selection.build);
            }
            None => {
                self.entries = &[];
                self.selected_build = None;
            }
        }

        self.refresh();
    }

    fn refresh(&mut self) {
        self.rows = extend_entries(self.entries);
        if !self.rows.is_empty() {
            self.diagram = DiagramLayout::from_rows(&self.rows);
        }
    }

    /// Board ids in dataset order.
    pub fn board_ids(&self) -> impl Iterator<Item = &'a str> {
        let partitions = self.partitions;
        partitions.keys().map(String::as_str)
    }

    pub fn selected_board(&self) -> Option<&str> {
        self.selected_board.as_deref()
    }

    pub fn scheme_options(&self) -> &[SchemeOption] {
        &self.scheme_options
    }

    pub fn selected_scheme(&self) -> Option<&str> {
        self.selected_scheme.as_deref()
    }

    pub fn selected_build(&self) -> Option<&str> {
        self.selected_build.as_deref()
    }

    /// The raw partition entries of the selected scheme.
    pub fn entries(&self) -> &'a [PartitionEntry] {
        self.entries
    }

    pub fn rows(&self) -> &[PartitionEntryExtended] {
        &self.rows
    }

    pub fn diagram(&self) -> &DiagramLayout {
        &self.diagram
    }
}
