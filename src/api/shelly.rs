mod response;

use std::time::Duration;

use async_trait::async_trait;
use bon::bon;
use chrono::{NaiveDate, NaiveTime};
use reqwest::{StatusCode, Url};

pub use self::response::{SinglePhaseResponse, ThreePhaseResponse};
use crate::{
    core::{DateRange, Device, Fetch},
    error::Error,
    prelude::*,
};

/// Timestamps in the query and in the response.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shelly Cloud power consumption statistics.
pub struct Client {
    inner: reqwest::Client,
    server: Url,
    auth_key: String,
}

#[bon]
impl Client {
    #[builder]
    pub fn new(
        server: Url,
        #[builder(into)] auth_key: String,
        user_agent: Option<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        if auth_key.is_empty() {
            return Err(Error::configuration("the auth key is empty"));
        }
        if server.cannot_be_a_base() {
            return Err(Error::configuration(format!("`{server}` cannot be used as a server URL")));
        }
        let user_agent = user_agent.unwrap_or_else(|| {
            format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
        });
        let inner = reqwest::Client::builder().user_agent(user_agent).timeout(timeout).build()?;
        Ok(Self { inner, server, auth_key })
    }
}

impl Client {
    /// Statistics URL of the device for the window, including the auth key.
    fn url(&self, device: &Device, window: DateRange) -> Result<Url, Error> {
        let mut url = self.server.clone();
        url.path_segments_mut()
            .map_err(|()| Error::configuration("invalid server URL"))?
            .pop_if_empty()
            .extend(["v2", "statistics", "power-consumption", device.kind.path()]);
        url.query_pairs_mut()
            .append_pair("id", &device.id)
            .append_pair("channel", "0")
            .append_pair("date_range", "custom")
            .append_pair("date_from", &format_midnight(window.from))
            .append_pair("date_to", &format_midnight(window.to))
            .append_pair("auth_key", &self.auth_key);
        Ok(url)
    }
}

#[async_trait]
impl Fetch for Client {
    #[instrument(skip_all, fields(device = %device.id, window = %window))]
    async fn fetch(&self, device: &Device, window: DateRange) -> Result<String, Error> {
        let response = self.inner.get(self.url(device, window)?).send().await?;
        let status = response.status();
        debug!(%status, "responded");
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }
        Ok(response.text().await?)
    }
}

fn format_midnight(day: NaiveDate) -> String {
    day.and_time(NaiveTime::MIN).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DeviceKind;

    fn client(server: &str) -> Result<Client, Error> {
        Client::builder()
            .server(Url::parse(server).unwrap())
            .auth_key("s3cr3t")
            .timeout(Duration::from_secs(30))
            .build()
    }

    fn window() -> DateRange {
        DateRange::try_new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_url() -> Result<(), Error> {
        let device = Device {
            id: "abc123".to_owned(),
            name: None,
            kind: DeviceKind::ThreePhaseMeter,
        };
        let url = client("https://shelly-42-eu.shelly.cloud/")?.url(&device, window())?;
        assert_eq!(
            url.as_str(),
            "https://shelly-42-eu.shelly.cloud/v2/statistics/power-consumption/em-3p\
             ?id=abc123&channel=0&date_range=custom\
             &date_from=2024-01-01+00%3A00%3A00&date_to=2024-02-01+00%3A00%3A00\
             &auth_key=s3cr3t"
        );
        Ok(())
    }

    #[test]
    fn test_url_keeps_base_path() -> Result<(), Error> {
        let device = Device {
            id: "abc123".to_owned(),
            name: None,
            kind: DeviceKind::SinglePhaseMeter,
        };
        let url = client("http://localhost:8080/proxy")?.url(&device, window())?;
        assert_eq!(url.path(), "/proxy/v2/statistics/power-consumption/em-1p");
        Ok(())
    }

    #[test]
    fn test_empty_auth_key() {
        let result = Client::builder()
            .server(Url::parse("https://shelly-42-eu.shelly.cloud").unwrap())
            .auth_key("")
            .timeout(Duration::from_secs(30))
            .build();
        assert!(result.is_err());
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_fetch_ok() -> Result {
        let device = Device {
            id: std::env::var("SHELLY_DEVICE_ID")?,
            name: None,
            kind: DeviceKind::ThreePhaseMeter,
        };
        let client = Client::builder()
            .server(Url::parse(&std::env::var("SHELLY_SERVER")?)?)
            .auth_key(std::env::var("SHELLY_AUTH_KEY")?)
            .timeout(Duration::from_secs(30))
            .build()?;
        let body = client.fetch(&device, window()).await?;
        let _ = serde_json::from_str::<ThreePhaseResponse>(&body)?;
        Ok(())
    }
}
