use crate::{cli::fetch_daily, config::Config, prelude::*, tables::build_series_table};

/// Fetch every enabled device and print its daily series.
pub async fn show(config: &Config) -> Result {
    let client = config.shelly_client()?;
    for device in config.devices.iter().filter(|device| !device.is_disabled) {
        let series = fetch_daily(&client, config, &device.device).await?;
        println!("{}", device.device.display_name());
        println!("{}", build_series_table(&series));
    }
    Ok(())
}
