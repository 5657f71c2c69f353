//! Integration tests against the bundled `data/` directory.

use std::path::{Path, PathBuf};

use espboard_core::dataset::load_scheme_dir;
use espboard_core::{
    pins_arduino_link, BoardTable, CoreKind, Dataset, DatasetError, PartitionResolver, SortColumn,
    SortDirection, SortSpec,
};
use pretty_assertions::assert_eq;

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn dataset() -> Dataset {
    Dataset::load(&data_dir()).expect("bundled dataset loads")
}

#[test]
fn test_load_bundled_dataset() {
    let dataset = dataset();

    assert_eq!(dataset.esp8266_boards.len(), 4);
    assert_eq!(dataset.esp32_boards.len(), 3);
    assert_eq!(dataset.partitions.len(), 3);
    assert_eq!(dataset.core_version(CoreKind::Esp8266), "3.1.2");
    assert_eq!(dataset.core_version(CoreKind::Esp32), "3.2.0");

    let builds: Vec<&str> = dataset.schemes.keys().map(String::as_str).collect();
    assert_eq!(builds, vec!["default", "default_8MB", "minimal"]);
}

#[test]
fn test_missing_data_dir() {
    let result = Dataset::load(Path::new("/nonexistent/espboard-data"));
    assert!(matches!(result, Err(DatasetError::Read { .. })));
}

#[test]
fn test_csv_layouts_match_json_layouts() {
    let dataset = dataset();
    let from_csv = load_scheme_dir(&data_dir().join("partitions")).unwrap();
    assert_eq!(from_csv, dataset.schemes);
}

#[test]
fn test_missing_scheme_dir_is_empty() {
    let schemes = load_scheme_dir(Path::new("/nonexistent/partitions")).unwrap();
    assert!(schemes.is_empty());
}

#[test]
fn test_esp8266_table() {
    let dataset = dataset();
    let mut table = BoardTable::new(dataset.boards_for(CoreKind::Esp8266));
    assert_eq!(table.total_count(), 4);

    table.apply_ignore_na(true);
    assert_eq!(table.total_count(), 3);
    assert_eq!(table.filtered_count(), 3);

    table.apply_filter("  D1 ");
    assert_eq!(table.filtered_count(), 1);
    assert_eq!(table.rows()[0].board, "d1");

    table.apply_filter("");
    table.sort_data(SortSpec::new(SortColumn::Led, SortDirection::Desc));
    let leds: Vec<&str> = table.rows().iter().map(|b| b.led_builtin.as_str()).collect();
    assert_eq!(leds, vec!["5", "2", "1"]);
}

#[test]
fn test_pins_link_for_bundled_board() {
    let dataset = dataset();
    let board = &dataset.boards_for(CoreKind::Esp32)[2];
    let link = pins_arduino_link(
        CoreKind::Esp32.name(),
        dataset.core_version(CoreKind::Esp32),
        &board.variant,
    );
    assert_eq!(
        link,
        "https://github.com/espressif/arduino-esp32/blob/3.2.0/variants/um_bling/pins_arduino.h"
    );
}

#[test]
fn test_resolver_initial_board() {
    let dataset = dataset();
    let mut resolver = PartitionResolver::new(&dataset.partitions, &dataset.schemes);
    resolver.initialize();

    assert_eq!(resolver.selected_board(), Some("esp32c2"));
    assert_eq!(resolver.selected_scheme(), Some("minimal"));
    assert_eq!(resolver.rows().len(), 5);
    // coredump at 0x1F0000 + 0x10000
    assert_eq!(resolver.diagram().total_extent, 2031 + 65);
    assert_eq!(resolver.diagram().view_box, "0 0 2096 100");
}

#[test]
fn test_resolver_falls_back_to_first_scheme() {
    let dataset = dataset();
    let mut resolver = PartitionResolver::new(&dataset.partitions, &dataset.schemes);
    resolver.on_board_change("um_bling");

    assert_eq!(resolver.selected_scheme(), Some("default_8MB"));
    assert_eq!(resolver.selected_build(), Some("default_8MB"));
    assert_eq!(resolver.rows().len(), 6);
    assert_eq!(resolver.rows()[2].entry.name, "app0");
    assert_eq!(resolver.rows()[2].size_dec, 0x330000);
}

#[test]
fn test_resolver_board_without_schemes() {
    let dataset = dataset();
    let mut resolver = PartitionResolver::new(&dataset.partitions, &dataset.schemes);
    resolver.on_board_change("S_ODI_Ultra");

    assert_eq!(resolver.selected_scheme(), Some("default"));
    assert_eq!(resolver.scheme_options().len(), 1);
    assert_eq!(resolver.rows().len(), 6);

    let diagram = resolver.diagram().clone();

    // only menu schemes are selectable by name
    resolver.on_scheme_change("default");
    assert_eq!(resolver.selected_build(), None);
    assert!(resolver.rows().is_empty());
    assert_eq!(resolver.diagram(), &diagram);
}

#[test]
fn test_resolver_unknown_board() {
    let dataset = dataset();
    let mut resolver = PartitionResolver::new(&dataset.partitions, &dataset.schemes);
    resolver.on_board_change("no_such_board");

    assert!(resolver.scheme_options().is_empty());
    assert_eq!(resolver.selected_scheme(), None);
    assert!(resolver.rows().is_empty());
}
