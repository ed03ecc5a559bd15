use std::fmt::{Debug, Display, Formatter};

use chrono::{Days, NaiveDate};

use crate::error::Error;

/// Calendar days in the reference timezone (UTC).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[must_use]
pub struct DateRange {
    /// Inclusive.
    pub from: NaiveDate,

    /// Exclusive.
    pub to: NaiveDate,
}

impl Debug for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.from, self.to)
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

impl DateRange {
    pub fn try_new(from: NaiveDate, to: NaiveDate) -> Result<Self, Error> {
        if from <= to {
            Ok(Self { from, to })
        } else {
            Err(Error::configuration(format!("`from` ({from}) must not be after `to` ({to})")))
        }
    }

    /// The `n_days` days right before `today`, excluding `today` itself.
    pub fn lookback(today: NaiveDate, n_days: u64) -> Result<Self, Error> {
        let from = today.checked_sub_days(Days::new(n_days)).ok_or_else(|| {
            Error::configuration(format!("looking back {n_days} days from {today} overflows"))
        })?;
        Self::try_new(from, today)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.from >= self.to
    }

    #[must_use]
    pub fn n_days(self) -> i64 {
        (self.to - self.from).num_days()
    }

    #[must_use]
    pub fn contains(self, day: NaiveDate) -> bool {
        (self.from <= day) && (day < self.to)
    }
}
