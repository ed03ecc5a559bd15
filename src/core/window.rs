use chrono::{Days, Months, NaiveDate};
use serde::Deserialize;

use crate::{core::DateRange, error::Error};

/// How a date range is split into upstream requests.
#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, bon::Builder)]
#[serde(default)]
pub struct WindowPlan {
    /// Calendar months covered by one request.
    #[builder(default = WindowPlan::DEFAULT_STEP_MONTHS)]
    pub step_months: u32,

    /// Narrowest request the upstream still answers with daily buckets.
    ///
    /// Anything narrower may switch the response to hourly granularity.
    #[builder(default = WindowPlan::DEFAULT_MIN_SPAN_DAYS)]
    pub min_span_days: u64,
}

impl Default for WindowPlan {
    fn default() -> Self {
        Self { step_months: Self::DEFAULT_STEP_MONTHS, min_span_days: Self::DEFAULT_MIN_SPAN_DAYS }
    }
}

impl WindowPlan {
    pub const DEFAULT_STEP_MONTHS: u32 = 1;
    pub const DEFAULT_MIN_SPAN_DAYS: u64 = 5;

    pub fn validate(self) -> Result<Self, Error> {
        if self.step_months == 0 {
            return Err(Error::configuration("window step must be at least one month"));
        }
        if self.min_span_days == 0 {
            return Err(Error::configuration("minimal window span must be at least one day"));
        }
        Ok(self)
    }

    /// Split the range into request windows, in chronological order.
    ///
    /// The last window may reach past `range.to` when it has to be widened to the minimal
    /// span. The extra days are dropped later by normalization.
    pub fn windows(self, range: DateRange) -> Windows {
        Windows {
            cursor: (!range.is_empty()).then_some(range.from),
            to: range.to,
            step: Months::new(self.step_months),
            min_span: Days::new(self.min_span_days),
        }
    }
}

#[must_use]
pub struct Windows {
    cursor: Option<NaiveDate>,
    to: NaiveDate,
    step: Months,
    min_span: Days,
}

impl Iterator for Windows {
    type Item = DateRange;

    fn next(&mut self) -> Option<Self::Item> {
        let from = self.cursor.take()?;
        let mut to = from.checked_add_months(self.step).map_or(self.to, |to| to.min(self.to));
        if let Some(widened) = from.checked_add_days(self.min_span)
            && to < widened
        {
            to = widened;
        }
        if to < self.to {
            self.cursor = Some(to);
        }
        Some(DateRange { from, to })
    }
}
