use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::{Cell, Row, format_day};
use crate::{
    api::google::{ServiceAccountKey, Sheets},
    config::SheetConfig,
    core::{CanonicalSeries, DailySeries},
    prelude::*,
};

/// Overwrite the header and update the sheet from the first day of the series onwards.
///
/// Rows before the first day of the series are left untouched.
#[instrument(skip_all, fields(spreadsheet_id = %target.spreadsheet_id, sheet_id = %target.sheet_id))]
pub async fn export_to_sheet(
    series: &CanonicalSeries,
    target: &SheetConfig,
    timeout: Duration,
) -> Result {
    let key = ServiceAccountKey::from_base64(&target.service_account_key)?;
    let sheets = Sheets::connect(&key, &target.spreadsheet_id, timeout).await?;
    match series {
        CanonicalSeries::SinglePhase(series) => update(&sheets, &target.sheet_id, series).await,
        CanonicalSeries::ThreePhase(series) => update(&sheets, &target.sheet_id, series).await,
    }
}

async fn update<R: Row>(sheets: &Sheets, sheet_id: &str, rows: &DailySeries<R>) -> Result {
    let last_column = column_name(R::COLUMNS.len() + 1)?;

    let header = std::iter::once("date")
        .chain(R::COLUMNS.iter().copied())
        .map(|name| Value::String(name.to_owned()))
        .collect::<Vec<_>>();
    sheets
        .update_values(&format!("{sheet_id}!A1:{last_column}1"), &[header])
        .await
        .context("failed to update the header")?;

    let Some(first_day) = rows.first_day() else {
        info!("nothing to export");
        return Ok(());
    };
    let column = sheets
        .get_values(&format!("{sheet_id}!A:A"))
        .await
        .context("failed to read the date column")?;
    let first_row = first_row_to_write(&column, first_day)?;
    let last_row = first_row + rows.len() - 1;
    info!(first_row, last_row, "writing…");

    let values = rows
        .iter()
        .map(|row| {
            std::iter::once(Value::String(format_day(row.day())))
                .chain(row.cells().into_iter().map(cell_value))
                .collect()
        })
        .collect::<Vec<Vec<Value>>>();
    sheets
        .update_values(&format!("{sheet_id}!A{first_row}:{last_column}{last_row}"), &values)
        .await
        .context("failed to update the values")
}

/// One-based index of the first row whose date is not earlier than `first_day`.
///
/// The first row is the header. Scanning stops at the first empty cell.
pub fn first_row_to_write(column: &[Vec<Value>], first_day: NaiveDate) -> Result<usize> {
    let mut row_index = 2;
    for row in column.iter().skip(1) {
        let cell = match row.first() {
            Some(Value::String(cell)) => cell.as_str(),
            Some(Value::Null) | None => "",
            Some(other) => bail!("unexpected value in the date column: `{other}`"),
        };
        if cell.is_empty() {
            break;
        }
        if parse_date(cell)? >= first_day {
            break;
        }
        row_index += 1;
    }
    Ok(row_index)
}

fn parse_date(cell: &str) -> Result<NaiveDate> {
    NaiveDateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S")
        .map(|timestamp| timestamp.date())
        .or_else(|_| NaiveDate::parse_from_str(cell, "%Y-%m-%d"))
        .with_context(|| format!("unable to parse `{cell}` as a date"))
}

fn cell_value(cell: Cell) -> Value {
    match cell {
        Cell::Energy(energy) => energy.0.into(),
        Cell::Flag(flag) => flag.into(),
    }
}

/// Spreadsheet column letter for the one-based column index.
fn column_name(index: usize) -> Result<char> {
    ensure!((1..=26).contains(&index), "column {index} is out of range");
    let offset = u8::try_from(index - 1)?;
    Ok(char::from(b'A' + offset))
}
