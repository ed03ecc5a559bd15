use chrono::NaiveDate;

use crate::core::{
    entry::Entry,
    sample::{Merge, Sample},
};

/// All channels of a three-phase meter for one bucket.
///
/// Keeping the phases together makes the day alignment between them structural.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct ThreePhase {
    pub phase_a: Entry,
    pub phase_b: Entry,
    pub phase_c: Entry,
    pub total: Entry,
}

impl ThreePhase {
    pub const fn phases(&self) -> [&Entry; 3] {
        [&self.phase_a, &self.phase_b, &self.phase_c]
    }
}

impl Sample for ThreePhase {
    fn day(&self) -> NaiveDate {
        self.total.day()
    }
}

impl Merge for ThreePhase {
    fn merge(self, other: Self) -> Self {
        Self {
            phase_a: self.phase_a.merge(other.phase_a),
            phase_b: self.phase_b.merge(other.phase_b),
            phase_c: self.phase_c.merge(other.phase_c),
            total: self.total.merge(other.total),
        }
    }
}
