use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::auth::jwt::resolve_base_url;
use crate::credentials::Credentials;
use crate::error::{Gen3Error, Result};
use crate::utils::constants::ACCESS_TOKEN_PATH;

const ACCESS_TOKEN_FIELD: &str = "access_token";

/// Bearer token issued by the Gen3 user service.
/// Expiry is enforced by the server only.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
}

impl AccessToken {
    pub fn new(value: String) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// `Authorization: bearer <token>` header set used by every export request
    pub fn auth_headers(&self) -> Result<HeaderMap> {
        let mut value = HeaderValue::from_str(&format!("bearer {}", self.value)).map_err(|e| {
            Gen3Error::Authentication {
                status: None,
                message: format!("access token is not a valid header value: {}", e),
            }
        })?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken").field("value", &"<redacted>").finish()
    }
}

/// Exchange credentials for an access token against an already resolved base url.
pub async fn exchange(client: &Client, base_url: &str, creds: &Credentials) -> Result<AccessToken> {
    let url = format!("{}{}", base_url, ACCESS_TOKEN_PATH);
    debug!(url = %url, "requesting access token");

    let response = client
        .post(&url)
        .json(creds)
        .send()
        .await
        .map_err(|e| Gen3Error::Authentication {
            status: e.status(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Gen3Error::Authentication {
            status: Some(status),
            message,
        });
    }

    let body: Value = response.json().await.map_err(|e| Gen3Error::Authentication {
        status: Some(status),
        message: format!("response body is not JSON: {}", e),
    })?;

    let token = body[ACCESS_TOKEN_FIELD]
        .as_str()
        .ok_or_else(|| Gen3Error::Authentication {
            status: Some(status),
            message: format!("response has no '{}' string field", ACCESS_TOKEN_FIELD),
        })?
        .to_owned();

    info!(status = %status, "authentication successful");
    Ok(AccessToken::new(token))
}

/// Resolve the base url from the credentials, then exchange them for a token.
pub async fn authenticate(client: &Client, creds: &Credentials) -> Result<AccessToken> {
    let base_url = resolve_base_url(creds)?;
    exchange(client, &base_url, creds).await
}
