use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    core::sample::{Merge, Sample, merge_labels},
    quantity::{cost::Cost, energy::WattHours, voltage::Volts},
};

/// One sample of one channel.
#[must_use]
#[derive(Clone, Debug, PartialEq, bon::Builder)]
pub struct Entry {
    /// As returned by the upstream, only the date part matters for normalization.
    pub timestamp: NaiveDateTime,

    /// Energy drawn from the grid.
    #[builder(default)]
    pub consumption: WattHours,

    /// Energy returned to the grid.
    #[builder(default)]
    pub reversed: WattHours,

    /// The upstream flagged the bucket as a gap.
    #[builder(default)]
    pub is_missing: bool,

    #[builder(default)]
    pub min_voltage: Volts,

    #[builder(default)]
    pub max_voltage: Volts,

    #[builder(default, into)]
    pub channel_label: String,

    #[builder(default, into)]
    pub purpose: String,

    #[builder(default, into)]
    pub tariff_id: String,

    #[builder(default)]
    pub cost: Cost,
}

impl Sample for Entry {
    fn day(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl Merge for Entry {
    /// Sum the energy and cost, widen the voltage band, and reconcile the labels.
    ///
    /// The result is only missing when both sides are.
    fn merge(self, other: Self) -> Self {
        Self {
            timestamp: self.timestamp,
            consumption: self.consumption + other.consumption,
            reversed: self.reversed + other.reversed,
            is_missing: self.is_missing && other.is_missing,
            min_voltage: self.min_voltage.min(other.min_voltage),
            max_voltage: self.max_voltage.max(other.max_voltage),
            channel_label: merge_labels(self.channel_label, other.channel_label),
            purpose: merge_labels(self.purpose, other.purpose),
            tariff_id: merge_labels(self.tariff_id, other.tariff_id),
            cost: self.cost + other.cost,
        }
    }
}
