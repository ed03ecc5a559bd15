//! Configuration file.
//!
//! JSON by default, TOML when the file has the `.toml` extension.

use std::{fs, path::Path, time::Duration};

use chrono::NaiveDate;
use reqwest::Url;
use serde::{Deserialize, Deserializer};

use crate::{
    api::shelly,
    core::{DateRange, Device, WindowPlan},
    error::Error,
    prelude::*,
};

/// Configuration as written in the file, not validated yet.
#[derive(Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub timeframe: Option<Timeframe>,

    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub server: String,

    #[serde(default)]
    pub auth_key: String,

    #[serde(default)]
    pub devices: Vec<DeviceConfig>,

    /// Defaults for the per-device sheets.
    #[serde(default)]
    pub google_sheet: Option<SheetConfig>,

    #[serde(default)]
    pub window: WindowPlan,

    #[serde(default = "ConfigFile::default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Either explicit dates, or the amount of days to look back from today.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Timeframe {
    #[serde(default, deserialize_with = "deserialize_date")]
    pub from: Option<NaiveDate>,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub to: Option<NaiveDate>,

    #[serde(default)]
    pub lookback_days: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DeviceConfig {
    #[serde(flatten)]
    pub device: Device,

    #[serde(default, rename = "disabled")]
    pub is_disabled: bool,

    #[serde(default)]
    pub google_sheet: Option<SheetConfig>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct SheetConfig {
    /// Base64-encoded service account key JSON.
    #[serde(default)]
    pub service_account_key: String,

    #[serde(default)]
    pub spreadsheet_id: String,

    /// Sheet title within the spreadsheet.
    #[serde(default)]
    pub sheet_id: String,
}

/// Validated configuration.
#[derive(Debug)]
pub struct Config {
    pub server: Url,
    pub auth_key: String,
    pub user_agent: Option<String>,
    pub range: DateRange,
    pub devices: Vec<DeviceConfig>,
    pub window: WindowPlan,
    pub timeout: Duration,
}

impl Config {
    /// Read, parse, and validate the configuration file.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path, today: NaiveDate) -> Result<Self> {
        info!("loading…");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        let file = if path.extension().is_some_and(|extension| extension == "toml") {
            ConfigFile::from_toml(&contents)?
        } else {
            ConfigFile::from_json(&contents)?
        };
        let config = file.validate(today)?;
        info!(range = %config.range, n_devices = config.devices.len(), "loaded");
        Ok(config)
    }

    pub fn shelly_client(&self) -> Result<shelly::Client, Error> {
        shelly::Client::builder()
            .server(self.server.clone())
            .auth_key(self.auth_key.clone())
            .maybe_user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()
    }
}

impl ConfigFile {
    const fn default_timeout_seconds() -> u64 {
        30
    }

    pub fn from_json(contents: &str) -> Result<Self, Error> {
        serde_json::from_str(contents)
            .map_err(|error| Error::configuration(format!("failed to parse JSON: {error}")))
    }

    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|error| Error::configuration(format!("failed to parse TOML: {error}")))
    }

    /// Check the configuration, resolve the timeframe, and fill in the inherited sheet settings.
    pub fn validate(self, today: NaiveDate) -> Result<Config, Error> {
        let range = self
            .timeframe
            .ok_or_else(|| Error::configuration("timeframe must be set"))?
            .resolve(today)?;
        if self.devices.is_empty() {
            return Err(Error::configuration("at least one device needs to be set"));
        }
        let devices = self
            .devices
            .into_iter()
            .enumerate()
            .map(|(index, device)| device.validate(index, self.google_sheet.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if self.server.is_empty() {
            return Err(Error::configuration("server needs to be set"));
        }
        let server = Url::parse(&self.server).map_err(|error| {
            Error::configuration(format!("invalid server `{}`: {error}", self.server))
        })?;
        if self.auth_key.is_empty() {
            return Err(Error::configuration("auth key needs to be set"));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::configuration("timeout must be at least one second"));
        }
        Ok(Config {
            server,
            auth_key: self.auth_key,
            user_agent: self.user_agent.filter(|user_agent| !user_agent.is_empty()),
            range,
            devices,
            window: self.window.validate()?,
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}

/// Accept both quoted dates and TOML local dates.
fn deserialize_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let text = match Option::<toml::Value>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(toml::Value::String(text)) => text,
        Some(toml::Value::Datetime(datetime)) => datetime.to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!("expected a date, got `{other}`")));
        }
    };
    NaiveDate::parse_from_str(&text, "%Y-%m-%d").map(Some).map_err(serde::de::Error::custom)
}

impl Timeframe {
    /// Turn the timeframe into a date range, `today` being the current UTC day.
    pub fn resolve(self, today: NaiveDate) -> Result<DateRange, Error> {
        match (self.from, self.to, self.lookback_days) {
            (None, None, Some(0)) => Err(Error::configuration("lookback_days must be positive")),
            (None, None, Some(n_days)) => DateRange::lookback(today, n_days),
            (Some(from), Some(to), None) => DateRange::try_new(from, to),
            (_, _, Some(_)) => Err(Error::configuration(
                "when lookback_days is set, from and to cannot be set",
            )),
            _ => Err(Error::configuration(
                "either lookback_days or both from and to need to be set",
            )),
        }
    }
}

impl DeviceConfig {
    fn validate(mut self, index: usize, defaults: Option<&SheetConfig>) -> Result<Self, Error> {
        if self.device.id.is_empty() {
            return Err(Error::configuration(format!("device ID needs to be set for device {index}")));
        }
        if let Some(sheet) = self.google_sheet.take() {
            self.google_sheet = Some(sheet.inherit(defaults).validate(index)?);
        }
        Ok(self)
    }
}

impl SheetConfig {
    /// Fill in the missing fields from the global defaults.
    #[must_use]
    pub fn inherit(self, defaults: Option<&Self>) -> Self {
        let Some(defaults) = defaults else {
            return self;
        };
        let or_default = |value: String, default: &String| {
            if value.is_empty() { default.clone() } else { value }
        };
        Self {
            service_account_key: or_default(
                self.service_account_key,
                &defaults.service_account_key,
            ),
            spreadsheet_id: or_default(self.spreadsheet_id, &defaults.spreadsheet_id),
            sheet_id: or_default(self.sheet_id, &defaults.sheet_id),
        }
    }

    fn validate(self, index: usize) -> Result<Self, Error> {
        for (field, value) in [
            ("sheet_id", &self.sheet_id),
            ("spreadsheet_id", &self.spreadsheet_id),
            ("service_account_key", &self.service_account_key),
        ] {
            if value.is_empty() {
                return Err(Error::configuration(format!(
                    "{field} must be set for device {index} (or globally)"
                )));
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::DeviceKind, error::ErrorKind};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    // language=JSON
    const JSON: &str = r#"
        {
            "timeframe": {"from": "2024-01-01", "to": "2024-03-15"},
            "user_agent": "shelly-export-test",
            "server": "https://shelly-42-eu.shelly.cloud",
            "auth_key": "s3cr3t",
            "devices": [
                {"id": "abc", "name": "Main Panel", "type": "EM-3P"},
                {"id": "def", "type": "em-1p", "disabled": true, "google_sheet": {"sheet_id": "Garage"}}
            ],
            "google_sheet": {"service_account_key": "a2V5", "spreadsheet_id": "spreadsheet"}
        }
    "#;

    #[test]
    fn test_json_ok() -> Result<(), Error> {
        let config = ConfigFile::from_json(JSON)?.validate(today())?;
        assert_eq!(config.range.to_string(), "2024-01-01..2024-03-15");
        assert_eq!(config.server.as_str(), "https://shelly-42-eu.shelly.cloud/");
        assert_eq!(config.user_agent.as_deref(), Some("shelly-export-test"));
        assert_eq!(config.window, WindowPlan::default());
        assert_eq!(config.timeout, Duration::from_secs(30));

        let [main, garage] = config.devices.as_slice() else {
            panic!("expected two devices");
        };
        assert_eq!(main.device.kind, DeviceKind::ThreePhaseMeter);
        assert!(!main.is_disabled);
        assert!(main.google_sheet.is_none());
        assert!(garage.is_disabled);
        assert_eq!(
            garage.google_sheet,
            Some(SheetConfig {
                service_account_key: "a2V5".to_owned(),
                spreadsheet_id: "spreadsheet".to_owned(),
                sheet_id: "Garage".to_owned(),
            })
        );
        Ok(())
    }

    #[test]
    fn test_toml_ok() -> Result<(), Error> {
        // language=TOML
        let toml = r#"
            server = "https://shelly-42-eu.shelly.cloud"
            auth_key = "s3cr3t"
            timeout_seconds = 5

            [timeframe]
            lookback_days = 7

            [window]
            min_span_days = 7

            [[devices]]
            id = "abc"
            type = "em-1p"
        "#;
        let config = ConfigFile::from_toml(toml)?.validate(today())?;
        assert_eq!(config.range.to_string(), "2024-06-08..2024-06-15");
        assert_eq!(config.window.step_months, 1);
        assert_eq!(config.window.min_span_days, 7);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.user_agent.is_none());
        Ok(())
    }

    #[test]
    fn test_toml_local_dates() -> Result<(), Error> {
        // language=TOML
        let toml = r#"
            server = "https://shelly-42-eu.shelly.cloud"
            auth_key = "s3cr3t"

            [timeframe]
            from = 2024-01-01
            to = "2024-02-01"

            [[devices]]
            id = "abc"
            type = "em-3p"
        "#;
        let config = ConfigFile::from_toml(toml)?.validate(today())?;
        assert_eq!(config.range.to_string(), "2024-01-01..2024-02-01");
        Ok(())
    }

    #[test]
    fn test_toml_date_time_is_rejected() {
        // language=TOML
        let toml = r#"
            [timeframe]
            from = 2024-01-01T10:00:00
            to = 2024-02-01
        "#;
        assert!(ConfigFile::from_toml(toml).is_err());
    }

    #[test]
    fn test_timeframe() {
        let timeframe = |from: Option<&str>, to: Option<&str>, lookback_days: Option<u64>| Timeframe {
            from: from.map(|from| from.parse().unwrap()),
            to: to.map(|to| to.parse().unwrap()),
            lookback_days,
        };
        assert!(timeframe(None, None, None).resolve(today()).is_err());
        assert!(timeframe(None, None, Some(0)).resolve(today()).is_err());
        assert!(timeframe(Some("2024-01-01"), None, None).resolve(today()).is_err());
        assert!(timeframe(Some("2024-01-01"), Some("2024-02-01"), Some(3)).resolve(today()).is_err());
        assert!(timeframe(Some("2024-02-01"), Some("2024-01-01"), None).resolve(today()).is_err());
        assert!(timeframe(Some("2024-01-01"), Some("2024-01-01"), None).resolve(today()).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_device_type() {
        let json = JSON.replace("EM-3P", "plug-s");
        assert!(ConfigFile::from_json(&json).is_err());
    }

    #[test]
    fn test_incomplete_sheet() -> Result<(), Error> {
        let json = JSON.replace(r#""spreadsheet_id": "spreadsheet""#, r#""spreadsheet_id": """#);
        let error = ConfigFile::from_json(&json)?.validate(today()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(
            error.to_string(),
            "invalid configuration: spreadsheet_id must be set for device 1 (or globally)"
        );
        Ok(())
    }

    #[test]
    fn test_missing_fields() -> Result<(), Error> {
        for (from, to) in [
            (r#""auth_key": "s3cr3t""#, r#""auth_key": """#),
            (r#""server": "https://shelly-42-eu.shelly.cloud""#, r#""server": "not a url""#),
            (r#""id": "abc""#, r#""id": """#),
        ] {
            let json = JSON.replace(from, to);
            assert!(ConfigFile::from_json(&json)?.validate(today()).is_err(), "{to}");
        }
        Ok(())
    }

    #[test]
    fn test_no_devices() -> Result<(), Error> {
        let json = r#"{"timeframe": {"lookback_days": 1}, "server": "https://example.com", "auth_key": "k"}"#;
        assert!(ConfigFile::from_json(json)?.validate(today()).is_err());
        Ok(())
    }

    #[test]
    fn test_inherit_without_defaults() {
        let sheet = SheetConfig { sheet_id: "Sheet1".to_owned(), ..SheetConfig::default() };
        assert_eq!(sheet.clone().inherit(None), sheet);
    }
}
