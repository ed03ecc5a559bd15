use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::{CanonicalSeries, DateRange, DeviceKind},
    export::{Cell as ExportCell, Row},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

/// Planned request windows of a device.
pub fn build_windows_table(kind: DeviceKind, windows: &[DateRange], range: DateRange) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Path", "From", "To", "Days"]);
    for window in windows {
        let overshoots = window.to > range.to;
        table.add_row(vec![
            Cell::new(kind.path()).add_attribute(Attribute::Dim),
            Cell::new(window.from),
            Cell::new(window.to).fg(if overshoots { Color::DarkYellow } else { Color::Reset }),
            Cell::new(window.n_days()).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Canonical daily series, one row per day.
pub fn build_series_table(series: &CanonicalSeries) -> Table {
    match series {
        CanonicalSeries::SinglePhase(series) => build_rows_table(series),
        CanonicalSeries::ThreePhase(series) => build_rows_table(series),
    }
}

fn build_rows_table<R: Row>(rows: &[R]) -> Table {
    let mut table = new_table();
    table.set_header(std::iter::once("day").chain(R::COLUMNS.iter().copied()));
    for row in rows {
        let cells = row.cells().into_iter().map(|cell| match cell {
            ExportCell::Energy(energy) => Cell::new(energy).set_alignment(CellAlignment::Right),
            ExportCell::Flag(true) => Cell::new("missing").fg(Color::Red),
            ExportCell::Flag(false) => Cell::new(""),
        });
        table.add_row(std::iter::once(Cell::new(row.day()).add_attribute(Attribute::Dim)).chain(cells));
    }
    table
}
