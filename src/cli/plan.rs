use itertools::Itertools;

use crate::{config::Config, prelude::*, tables::build_windows_table};

/// Print the request windows of every enabled device.
pub fn plan(config: &Config) {
    for device in config.devices.iter().filter(|device| !device.is_disabled) {
        let windows = config.window.windows(config.range).collect_vec();
        info!(
            device = device.device.display_name(),
            range = %config.range,
            n_windows = windows.len(),
            "planned",
        );
        println!("{}", build_windows_table(device.device.kind, &windows, config.range));
    }
}
