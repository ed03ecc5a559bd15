mod export;
mod plan;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use self::{export::export, plan::plan, show::show};
use crate::{
    api::shelly,
    cli::export::ExportArgs,
    config::Config,
    core::{CanonicalSeries, Device, fetch_range},
    error::Error,
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Configuration file, JSON or TOML.
    #[clap(
        long,
        short,
        global = true,
        default_value = "config.json",
        env = "SHELLY_EXPORT_CONFIG"
    )]
    pub config: PathBuf,

    /// Log debug messages.
    #[clap(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the daily statistics and write them to CSV or Google Sheets.
    #[clap(name = "export")]
    Export(ExportArgs),

    /// Print the request windows without fetching anything.
    #[clap(name = "plan")]
    Plan,

    /// Fetch the daily statistics and print them as a table.
    #[clap(name = "show")]
    Show,
}

/// Fetch the configured range of the device and normalize it.
#[instrument(skip_all, fields(device = device.display_name()))]
async fn fetch_daily(
    client: &shelly::Client,
    config: &Config,
    device: &Device,
) -> Result<CanonicalSeries, Error> {
    let series = fetch_range(client, device, config.range, config.window).await?;
    let series = series.normalize(config.range);
    info!(n_days = series.n_days(), "normalized");
    Ok(series)
}
