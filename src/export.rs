mod csv;
mod sheet;

use chrono::NaiveDate;

pub use self::{csv::write_csv, sheet::export_to_sheet};
use crate::{
    core::{Entry, Sample, ThreePhase},
    quantity::energy::WattHours,
};

/// Exported value of a column.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Cell {
    Energy(WattHours),
    Flag(bool),
}

impl From<WattHours> for Cell {
    fn from(energy: WattHours) -> Self {
        Self::Energy(energy)
    }
}

impl From<bool> for Cell {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// Canonical sample rendered as a row, one per day.
pub trait Row: Sample {
    /// Column names following the date column.
    const COLUMNS: &'static [&'static str];

    /// Cells following the date column, in the order of [`Row::COLUMNS`].
    fn cells(&self) -> Vec<Cell>;
}

impl Row for Entry {
    const COLUMNS: &'static [&'static str] = &["total", "total_returned", "is_missing"];

    fn cells(&self) -> Vec<Cell> {
        vec![self.consumption.into(), self.reversed.into(), self.is_missing.into()]
    }
}

impl Row for ThreePhase {
    const COLUMNS: &'static [&'static str] = &[
        "phase_a",
        "phase_b",
        "phase_c",
        "total",
        "phase_a_returned",
        "phase_b_returned",
        "phase_c_returned",
        "total_returned",
        "is_missing",
    ];

    fn cells(&self) -> Vec<Cell> {
        let [phase_a, phase_b, phase_c] = self.phases();
        vec![
            phase_a.consumption.into(),
            phase_b.consumption.into(),
            phase_c.consumption.into(),
            self.total.consumption.into(),
            phase_a.reversed.into(),
            phase_b.reversed.into(),
            phase_c.reversed.into(),
            self.total.reversed.into(),
            self.total.is_missing.into(),
        ]
    }
}

fn format_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
