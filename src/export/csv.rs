use std::io::Write;

use super::{Cell, Row, format_day};
use crate::{core::CanonicalSeries, prelude::*};

/// Write the canonical series as CSV: a header, then one row per day.
pub fn write_csv(series: &CanonicalSeries, writer: impl Write) -> Result {
    match series {
        CanonicalSeries::SinglePhase(series) => write_rows(series, writer),
        CanonicalSeries::ThreePhase(series) => write_rows(series, writer),
    }
}

fn write_rows<R: Row>(rows: &[R], writer: impl Write) -> Result {
    let mut writer = ::csv::Writer::from_writer(writer);
    writer
        .write_record(std::iter::once("day").chain(R::COLUMNS.iter().copied()))
        .context("failed to write the CSV header")?;
    for row in rows {
        let record = std::iter::once(format_day(row.day()))
            .chain(row.cells().into_iter().map(format_cell));
        writer.write_record(record).context("failed to write a CSV row")?;
    }
    writer.flush().context("failed to flush the CSV")?;
    Ok(())
}

fn format_cell(cell: Cell) -> String {
    match cell {
        Cell::Energy(energy) => format!("{:.6}", energy.0),
        Cell::Flag(flag) => flag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        core::{DateRange, DeviceSeries, Entry, Granularity, Series, ThreePhase},
        quantity::energy::WattHours,
    };

    fn entry(day: u32, consumption: f64, reversed: f64, is_missing: bool) -> Entry {
        Entry::builder()
            .timestamp(NaiveDate::from_ymd_opt(2024, 1, day).unwrap().and_hms_opt(0, 0, 0).unwrap())
            .consumption(WattHours(consumption))
            .reversed(WattHours(reversed))
            .is_missing(is_missing)
            .build()
    }

    fn range() -> DateRange {
        DateRange::try_new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap()
    }

    fn render(series: DeviceSeries) -> Result<String> {
        let mut buffer = Vec::new();
        write_csv(&series.normalize(range()), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    #[test]
    fn test_single_phase() -> Result {
        let series = Series::new(
            "UTC".to_owned(),
            Granularity::Day,
            vec![entry(2, 5.0, 0.0, false), entry(1, 1.0, 0.25, false), entry(1, 2.0, 0.0, true)],
        );
        assert_eq!(
            render(DeviceSeries::SinglePhase(series))?,
            "day,total,total_returned,is_missing\n\
             2024-01-01,3.000000,0.250000,false\n\
             2024-01-02,5.000000,0.000000,false\n"
        );
        Ok(())
    }

    #[test]
    fn test_three_phase() -> Result {
        let sample = ThreePhase {
            phase_a: entry(3, 1.5, 0.0, false),
            phase_b: entry(3, 2.0, 0.1, false),
            phase_c: entry(3, 0.5, 0.0, false),
            total: entry(3, 4.0, 0.1, true),
        };
        let series = Series::new("UTC".to_owned(), Granularity::Day, vec![sample]);
        assert_eq!(
            render(DeviceSeries::ThreePhase(series))?,
            "day,phase_a,phase_b,phase_c,total,\
             phase_a_returned,phase_b_returned,phase_c_returned,total_returned,is_missing\n\
             2024-01-03,1.500000,2.000000,0.500000,4.000000,\
             0.000000,0.100000,0.000000,0.100000,true\n"
        );
        Ok(())
    }

    #[test]
    fn test_empty_series_has_header() -> Result {
        let series = Series::<Entry>::new("UTC".to_owned(), Granularity::Day, vec![]);
        assert_eq!(render(DeviceSeries::SinglePhase(series))?, "day,total,total_returned,is_missing\n");
        Ok(())
    }
}
