use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ServiceAccountKey;
use crate::prelude::*;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Values API of a single spreadsheet.
pub struct Sheets {
    client: Client,
    access_token: String,
    spreadsheet_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<Value>],
}

#[derive(Deserialize)]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl Sheets {
    #[instrument(skip_all, fields(spreadsheet_id = spreadsheet_id))]
    pub async fn connect(
        key: &ServiceAccountKey,
        spreadsheet_id: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let access_token = key.fetch_access_token(&client).await?;
        Ok(Self { client, access_token, spreadsheet_id: spreadsheet_id.to_owned() })
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(BASE_URL)?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("invalid base URL"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }

    /// Read the range row by row, as formatted strings.
    #[instrument(skip_all, fields(range = range))]
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<Value>>> {
        let response: ValueRangeResponse = self
            .client
            .get(self.values_url(range)?)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("failed to request `{range}`"))?
            .error_for_status()
            .with_context(|| format!("failed to get `{range}`"))?
            .json()
            .await
            .with_context(|| format!("failed to deserialize `{range}`"))?;
        debug!(n_rows = response.values.len(), "fetched");
        Ok(response.values)
    }

    /// Overwrite the range, parsing the values as if typed in by a user.
    #[instrument(skip_all, fields(range = range, n_rows = values.len()))]
    pub async fn update_values(&self, range: &str, values: &[Vec<Value>]) -> Result {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "USER_ENTERED");
        self.client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&ValueRange { range, major_dimension: "ROWS", values })
            .send()
            .await
            .with_context(|| format!("failed to request `{range}` update"))?
            .error_for_status()
            .with_context(|| format!("failed to update `{range}`"))?;
        info!("updated");
        Ok(())
    }
}
