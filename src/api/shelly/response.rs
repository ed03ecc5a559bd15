use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use serde_with::{DefaultOnNull, serde_as};

use super::TIMESTAMP_FORMAT;
use crate::{
    core::{Entry, Granularity, Payload, Sample, Series, ThreePhase},
    error::Error,
    quantity::{cost::Cost, energy::WattHours, voltage::Volts},
};

/// Power consumption statistics of a single-phase meter.
#[must_use]
#[derive(Deserialize)]
pub struct SinglePhaseResponse {
    pub timezone: String,
    pub interval: Granularity,

    #[serde(default)]
    pub history: Vec<RawEntry>,
}

impl Payload for SinglePhaseResponse {
    type Sample = Entry;

    fn try_into_series(self) -> Result<Series<Entry>, Error> {
        let samples = self.history.into_iter().map(Entry::from).collect();
        Ok(Series::new(self.timezone, self.interval, samples))
    }
}

/// Power consumption statistics of a three-phase meter.
///
/// The phases come as three arrays parallel to `sum`.
#[must_use]
#[derive(Deserialize)]
pub struct ThreePhaseResponse {
    pub timezone: String,
    pub interval: Granularity,

    #[serde(default)]
    pub history: Vec<Vec<RawEntry>>,

    #[serde(default)]
    pub sum: Vec<RawEntry>,
}

impl Payload for ThreePhaseResponse {
    type Sample = ThreePhase;

    fn try_into_series(self) -> Result<Series<ThreePhase>, Error> {
        let Ok([phase_a, phase_b, phase_c]) = <[Vec<RawEntry>; 3]>::try_from(self.history) else {
            return Err(Error::malformed("expected exactly three phase histories"));
        };
        for (phase, entries) in [("A", &phase_a), ("B", &phase_b), ("C", &phase_c)] {
            if entries.len() != self.sum.len() {
                return Err(Error::malformed(format!(
                    "phase {phase} has {} entries, while the sum has {}",
                    entries.len(),
                    self.sum.len(),
                )));
            }
        }
        let samples = itertools::multizip((phase_a, phase_b, phase_c, self.sum))
            .map(|(phase_a, phase_b, phase_c, total)| {
                let sample = ThreePhase {
                    phase_a: phase_a.into(),
                    phase_b: phase_b.into(),
                    phase_c: phase_c.into(),
                    total: total.into(),
                };
                let day = sample.day();
                let misaligned = sample
                    .phases()
                    .into_iter()
                    .find(|phase| phase.day() != day)
                    .map(|phase| phase.timestamp);
                match misaligned {
                    Some(timestamp) => Err(Error::malformed(format!(
                        "phase entry at {timestamp} is not aligned with the sum at {}",
                        sample.total.timestamp,
                    ))),
                    None => Ok(sample),
                }
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Series::new(self.timezone, self.interval, samples))
    }
}

/// Entry as it comes over the wire.
#[serde_as]
#[derive(Deserialize)]
pub struct RawEntry {
    #[serde(rename = "datetime", deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, rename = "missing")]
    pub is_missing: bool,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub consumption: WattHours,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub reversed: WattHours,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub min_voltage: Volts,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub max_voltage: Volts,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub cost: Cost,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, rename = "channel")]
    pub channel_label: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub purpose: String,

    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub tariff_id: String,
}

impl From<RawEntry> for Entry {
    fn from(entry: RawEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            consumption: entry.consumption,
            reversed: entry.reversed,
            is_missing: entry.is_missing,
            min_voltage: entry.min_voltage,
            max_voltage: entry.max_voltage,
            channel_label: entry.channel_label,
            purpose: entry.purpose,
            tariff_id: entry.tariff_id,
            cost: entry.cost,
        }
    }
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveDateTime, D::Error> {
    let timestamp = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}
