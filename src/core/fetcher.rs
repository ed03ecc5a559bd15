use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    api::shelly::{SinglePhaseResponse, ThreePhaseResponse},
    core::{DateRange, Device, DeviceSeries, Granularity, Phases, Sample, Series, WindowPlan},
    error::Error,
    prelude::*,
};

/// Source of raw statistics, one request per window.
#[async_trait]
pub trait Fetch: Sync {
    /// Fetch the raw response body for the window.
    async fn fetch(&self, device: &Device, window: DateRange) -> Result<String, Error>;
}

/// Decoded upstream response of one window.
pub trait Payload: DeserializeOwned {
    type Sample: Sample;

    fn try_into_series(self) -> Result<Series<Self::Sample>, Error>;
}

/// Fetch the whole range window by window and stitch the partial series.
///
/// Windows are requested sequentially in chronological order. The first failure aborts
/// the range and no partial series is returned.
#[instrument(skip_all, fields(device = %device.id, range = %range))]
pub async fn fetch_range(
    fetcher: &impl Fetch,
    device: &Device,
    range: DateRange,
    plan: WindowPlan,
) -> Result<DeviceSeries, Error> {
    let series = match device.kind.phases() {
        Phases::Single => DeviceSeries::SinglePhase(
            fetch_windows::<SinglePhaseResponse>(fetcher, device, range, plan).await?,
        ),
        Phases::Three => DeviceSeries::ThreePhase(
            fetch_windows::<ThreePhaseResponse>(fetcher, device, range, plan).await?,
        ),
    };
    info!(n_samples = series.n_samples(), "fetched");
    Ok(series)
}

async fn fetch_windows<P: Payload>(
    fetcher: &impl Fetch,
    device: &Device,
    range: DateRange,
    plan: WindowPlan,
) -> Result<Series<P::Sample>, Error> {
    let mut series: Option<Series<P::Sample>> = None;
    for window in plan.windows(range) {
        let partial = fetch_window::<P>(fetcher, device, window)
            .await
            .map_err(|error| error.in_window(&device.id, window))?;
        match &mut series {
            Some(series) => {
                series.append(partial).map_err(|error| error.in_window(&device.id, window))?;
            }
            None => series = Some(partial),
        }
    }
    Ok(series.unwrap_or_else(Series::empty))
}

async fn fetch_window<P: Payload>(
    fetcher: &impl Fetch,
    device: &Device,
    window: DateRange,
) -> Result<Series<P::Sample>, Error> {
    info!(%window, "fetching…");
    let body = fetcher.fetch(device, window).await?;
    let series = serde_json::from_str::<P>(&body)?.try_into_series()?;
    if series.granularity != Granularity::Day {
        return Err(Error::UnsupportedGranularity(series.granularity));
    }
    debug!(%window, n_samples = series.samples.len(), "received");
    Ok(series)
}
