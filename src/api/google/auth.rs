use base64::{Engine, prelude::BASE64_STANDARD};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Google Cloud service account credentials.
#[derive(Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,

    #[serde(default)]
    pub private_key_id: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_owned()
}

#[derive(Serialize)]
struct Claims<'a> {
    #[serde(rename = "iss")]
    issuer: &'a str,

    scope: &'a str,

    #[serde(rename = "aud")]
    audience: &'a str,

    #[serde(rename = "iat")]
    issued_at: i64,

    #[serde(rename = "exp")]
    expires_at: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ServiceAccountKey {
    /// Decode the key from its base64-encoded JSON file.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let json = BASE64_STANDARD
            .decode(encoded.trim())
            .context("failed to decode the service account key")?;
        serde_json::from_slice(&json).context("failed to parse the service account key")
    }

    /// Signed JWT to exchange for an access token.
    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            issuer: &self.client_email,
            scope: SCOPE,
            audience: &self.token_uri,
            issued_at: now.timestamp(),
            expires_at: (now + TimeDelta::hours(1)).timestamp(),
        };
        let header = Header {
            kid: self.private_key_id.clone(),
            ..Header::new(Algorithm::RS256)
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .context("invalid service account private key")?;
        jsonwebtoken::encode(&header, &claims, &key).context("failed to sign the assertion")
    }

    /// Exchange a fresh assertion for an access token.
    #[instrument(skip_all, fields(client_email = %self.client_email))]
    pub async fn fetch_access_token(&self, client: &reqwest::Client) -> Result<String> {
        info!("authenticating…");
        let assertion = self.assertion(Utc::now())?;
        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("failed to request an access token")?
            .error_for_status()
            .context("access token request failed")?
            .json::<TokenResponse>()
            .await
            .context("failed to deserialize the access token")?;
        Ok(response.access_token)
    }
}
