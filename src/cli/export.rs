use std::{
    fs::File,
    io::{self, BufWriter},
    path::PathBuf,
};

use clap::Args;

use crate::{
    api::shelly,
    cli::fetch_daily,
    config::{Config, DeviceConfig},
    core::Device,
    error::ErrorKind,
    export::{export_to_sheet, write_csv},
    prelude::*,
};

#[derive(Args)]
pub struct ExportArgs {
    /// Write the CSV to `<PREFIX>-dev-<device name>.csv` instead of the standard output.
    #[clap(long = "out", value_name = "PREFIX", env = "SHELLY_EXPORT_OUT")]
    pub out_prefix: Option<String>,

    /// Continue with the remaining devices when one of them fails to fetch or export.
    ///
    /// Configuration and consistency errors still abort the run.
    #[clap(long)]
    pub keep_going: bool,
}

/// Run the fetch-normalize-render pipeline for every enabled device.
pub async fn export(config: &Config, args: &ExportArgs) -> Result {
    let client = config.shelly_client()?;
    let mut n_failed = 0_usize;
    for device in &config.devices {
        if device.is_disabled {
            info!(device = device.device.display_name(), "skipping the disabled device");
            continue;
        }
        match export_device(&client, config, device, args.out_prefix.as_deref()).await {
            Ok(()) => {}
            Err(error) if args.keep_going && !aborts_run(&error) => {
                error!(device = device.device.display_name(), "failed: {error:#}");
                n_failed += 1;
            }
            Err(error) => {
                return Err(error.context(format!(
                    "failed to export device `{}`",
                    device.device.display_name(),
                )));
            }
        }
    }
    ensure!(n_failed == 0, "{n_failed} device(s) failed to export");
    Ok(())
}

#[instrument(skip_all, fields(device = %config.device.id))]
async fn export_device(
    client: &shelly::Client,
    global: &Config,
    config: &DeviceConfig,
    out_prefix: Option<&str>,
) -> Result {
    let series = fetch_daily(client, global, &config.device).await?;

    if let Some(out_prefix) = out_prefix {
        let path = output_path(out_prefix, &config.device);
        info!(path = %path.display(), "writing…");
        let file = File::create(&path)
            .with_context(|| format!("failed to create `{}`", path.display()))?;
        write_csv(&series, BufWriter::new(file))?;
    } else if config.google_sheet.is_none() {
        write_csv(&series, io::stdout().lock())?;
    }

    if let Some(sheet) = &config.google_sheet {
        export_to_sheet(&series, sheet, global.timeout)
            .await
            .context("failed to export to the sheet")?;
    }

    Ok(())
}

/// Errors that `--keep-going` does not skip over.
fn aborts_run(error: &Error) -> bool {
    matches!(
        error.downcast_ref::<crate::error::Error>().map(crate::error::Error::kind),
        Some(ErrorKind::Configuration | ErrorKind::Consistency),
    )
}

/// `<prefix>-dev-<name>.csv` with the name lowercased and spaces replaced by underscores.
fn output_path(prefix: &str, device: &Device) -> PathBuf {
    let name = device.display_name().to_lowercase().replace(' ', "_");
    PathBuf::from(format!("{prefix}-dev-{name}.csv"))
}
