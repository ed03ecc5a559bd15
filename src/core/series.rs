use std::collections::HashMap;

use chrono::NaiveDate;
use itertools::Itertools;

use crate::{
    core::{
        DateRange,
        entry::Entry,
        granularity::Granularity,
        sample::Sample,
        three_phase::ThreePhase,
    },
    error::Error,
    prelude::*,
};

/// Samples as fetched, possibly with duplicate days and gaps.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct Series<S> {
    pub timezone: String,
    pub granularity: Granularity,
    pub samples: Vec<S>,
}

impl<S> Series<S> {
    pub const fn new(timezone: String, granularity: Granularity, samples: Vec<S>) -> Self {
        Self { timezone, granularity, samples }
    }

    /// Series of a range with no windows to fetch.
    pub const fn empty() -> Self {
        Self::new(String::new(), Granularity::Day, Vec::new())
    }
}

impl<S: Sample> Series<S> {
    /// Append another partial series and re-sort by day.
    ///
    /// Both sides must report the same timezone and granularity. Duplicate days are kept
    /// as is, they are folded by [`Series::normalize`].
    pub fn append(&mut self, other: Self) -> Result<(), Error> {
        if self.timezone != other.timezone {
            return Err(Error::Mismatch {
                field: "timezone",
                lhs: self.timezone.clone(),
                rhs: other.timezone,
            });
        }
        if self.granularity != other.granularity {
            return Err(Error::Mismatch {
                field: "interval",
                lhs: self.granularity.to_string(),
                rhs: other.granularity.to_string(),
            });
        }
        self.samples.extend(other.samples);
        self.samples.sort_by_key(S::day);
        Ok(())
    }

    /// Collapse the samples into exactly one per calendar day within the range.
    ///
    /// Duplicates are merged in arrival order. Days without any sample are left out.
    pub fn normalize(self, range: DateRange) -> DailySeries<S> {
        let n_samples = self.samples.len();
        let mut days = HashMap::<NaiveDate, S>::new();
        for sample in self.samples {
            let day = sample.day();
            if !range.contains(day) {
                continue;
            }
            let merged = match days.remove(&day) {
                Some(existing) => existing.merge(sample),
                None => sample,
            };
            days.insert(day, merged);
        }
        let days = days.into_values().sorted_unstable_by_key(S::day).collect_vec();
        debug!(n_samples, n_days = days.len(), range = %range, "normalized");
        DailySeries(days)
    }
}

/// Canonical series: one sample per day, ascending, no duplicates.
#[must_use]
#[derive(Clone, Debug, PartialEq, derive_more::Deref, derive_more::IntoIterator)]
#[into_iterator(owned, ref)]
pub struct DailySeries<S>(Vec<S>);

impl<S: Sample> DailySeries<S> {
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.0.first().map(S::day)
    }
}

/// Fetched series in the shape of the device.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceSeries {
    SinglePhase(Series<Entry>),
    ThreePhase(Series<ThreePhase>),
}

impl DeviceSeries {
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Self::SinglePhase(series) => series.samples.len(),
            Self::ThreePhase(series) => series.samples.len(),
        }
    }

    pub fn normalize(self, range: DateRange) -> CanonicalSeries {
        match self {
            Self::SinglePhase(series) => CanonicalSeries::SinglePhase(series.normalize(range)),
            Self::ThreePhase(series) => CanonicalSeries::ThreePhase(series.normalize(range)),
        }
    }
}

/// Normalized series in the shape of the device, ready for rendering.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub enum CanonicalSeries {
    SinglePhase(DailySeries<Entry>),
    ThreePhase(DailySeries<ThreePhase>),
}

impl CanonicalSeries {
    #[must_use]
    pub fn n_days(&self) -> usize {
        match self {
            Self::SinglePhase(series) => series.len(),
            Self::ThreePhase(series) => series.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::NaiveDateTime;

    use super::*;
    use crate::{error::ErrorKind, quantity::energy::WattHours};

    fn day(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn at(month: u32, day_of_month: u32, hour: u32) -> NaiveDateTime {
        day(month, day_of_month).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn entry(timestamp: NaiveDateTime, consumption: f64) -> Entry {
        Entry::builder().timestamp(timestamp).consumption(WattHours(consumption)).build()
    }

    fn series(entries: Vec<Entry>) -> Series<Entry> {
        Series::new("Europe/Zurich".to_owned(), Granularity::Day, entries)
    }

    fn range(from: NaiveDate, to: NaiveDate) -> DateRange {
        DateRange::try_new(from, to).unwrap()
    }

    fn consumptions(series: &DailySeries<Entry>) -> Vec<(NaiveDate, f64)> {
        series.iter().map(|entry| (entry.day(), entry.consumption.0)).collect()
    }

    #[test]
    fn test_normalize_merges_duplicates() {
        let daily = series(vec![
            entry(at(1, 1, 0), 1.0),
            entry(at(1, 1, 0), 2.0),
            entry(at(1, 2, 0), 5.0),
            entry(at(1, 3, 0), 7.0),
        ])
        .normalize(range(day(1, 1), day(1, 3)));
        assert_eq!(consumptions(&daily), [(day(1, 1), 3.0), (day(1, 2), 5.0)]);
    }

    #[test]
    fn test_normalize_uses_date_only() {
        let daily = series(vec![entry(at(1, 1, 0), 1.0), entry(at(1, 1, 13), 0.5)])
            .normalize(range(day(1, 1), day(1, 2)));
        assert_eq!(consumptions(&daily), [(day(1, 1), 1.5)]);
    }

    #[test]
    fn test_normalize_leaves_gaps() {
        let daily = series(vec![entry(at(1, 1, 0), 1.0), entry(at(1, 4, 0), 4.0)])
            .normalize(range(day(1, 1), day(1, 5)));
        assert_eq!(consumptions(&daily), [(day(1, 1), 1.0), (day(1, 4), 4.0)]);
    }

    #[test]
    fn test_normalize_sorts_unordered_input() {
        let daily = series(vec![
            entry(at(1, 3, 0), 3.0),
            entry(at(1, 1, 0), 1.0),
            entry(at(1, 2, 0), 2.0),
            entry(at(1, 1, 0), 1.0),
        ])
        .normalize(range(day(1, 1), day(2, 1)));
        assert_eq!(consumptions(&daily), [(day(1, 1), 2.0), (day(1, 2), 2.0), (day(1, 3), 3.0)]);
        assert_eq!(daily.first_day(), Some(day(1, 1)));
    }

    #[test]
    fn test_normalize_drops_overshoot() {
        let daily = series((1..=5).map(|day_of_month| entry(at(1, day_of_month, 0), 1.0)).collect())
            .normalize(range(day(1, 1), day(1, 2)));
        assert_eq!(consumptions(&daily), [(day(1, 1), 1.0)]);
    }

    #[test]
    fn test_normalize_without_duplicates_is_identity() {
        let entries = (1..=9).map(|day_of_month| entry(at(3, day_of_month, 0), f64::from(day_of_month)));
        let full = series(entries.clone().collect()).normalize(range(day(3, 1), day(3, 10)));

        let mut windows = series(entries.clone().take(4).collect());
        windows.append(series(entries.skip(4).collect())).unwrap();
        let stitched = windows.normalize(range(day(3, 1), day(3, 10)));

        assert_eq!(full, stitched);
        assert_eq!(full.len(), 9);
    }

    #[test]
    fn test_normalize_empty_range() {
        let daily = series(vec![entry(at(1, 1, 0), 1.0)]).normalize(range(day(1, 1), day(1, 1)));
        assert!(daily.is_empty());
        assert_eq!(daily.first_day(), None);
    }

    #[test]
    fn test_append_overlapping_windows() -> Result {
        let mut lhs = series(vec![entry(at(1, 2, 0), 2.0), entry(at(1, 1, 0), 1.0)]);
        lhs.append(series(vec![entry(at(1, 2, 0), 3.0), entry(at(1, 3, 0), 4.0)]))?;
        assert_eq!(
            lhs.samples.iter().map(|entry| entry.consumption.0).collect_vec(),
            [1.0, 2.0, 3.0, 4.0]
        );
        let daily = lhs.normalize(range(day(1, 1), day(1, 4)));
        assert_abs_diff_eq!(daily[1].consumption.0, 5.0);
        Ok(())
    }

    #[test]
    fn test_append_rejects_interval_mismatch() {
        let mut lhs = series(vec![entry(at(1, 1, 0), 1.0)]);
        let rhs = Series::new("Europe/Zurich".to_owned(), Granularity::Hour, vec![entry(at(1, 2, 0), 1.0)]);
        let error = lhs.append(rhs).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Consistency);
        assert_eq!(lhs.samples.len(), 1);
    }

    #[test]
    fn test_append_rejects_timezone_mismatch() {
        let mut lhs = series(vec![]);
        let rhs = Series::new("UTC".to_owned(), Granularity::Day, vec![]);
        let error = lhs.append(rhs).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Consistency);
        assert_eq!(
            error.to_string(),
            "timezone mismatch: `Europe/Zurich` cannot be combined with `UTC`"
        );
    }
}
