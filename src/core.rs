mod date_range;
mod device;
mod entry;
mod fetcher;
mod granularity;
mod sample;
mod series;
mod three_phase;
mod window;

pub use self::{
    date_range::DateRange,
    device::{Device, DeviceKind, Phases},
    entry::Entry,
    fetcher::{Fetch, Payload, fetch_range},
    granularity::Granularity,
    sample::Sample,
    series::{CanonicalSeries, DailySeries, DeviceSeries, Series},
    three_phase::ThreePhase,
    window::WindowPlan,
};
