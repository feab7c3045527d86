use http::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Gen3Error, Result};
use crate::export::key::DataKey;
use crate::utils::constants::EXPORT_FORMAT;

/// `{base_url}/api/{api_version}/submission/{program}/{project}/export/`
pub fn export_path(base_url: &str, api_version: &str, key: &DataKey) -> String {
    format!(
        "{}/api/{}/submission/{}/{}/export/",
        base_url, api_version, key.program, key.project
    )
}

/// GET every record of one node label. Single attempt, no retry.
///
/// `node_label` and `format` go in the query string, percent-encoded by reqwest.
pub async fn fetch_export(
    client: &Client,
    base_url: &str,
    api_version: &str,
    headers: &HeaderMap,
    key: &DataKey,
) -> Result<Value> {
    let fetch_error = |status, message: String| Gen3Error::Fetch {
        key: key.to_string(),
        status,
        message,
    };

    let url = export_path(base_url, api_version, key);
    let response = client
        .get(&url)
        .query(&[("node_label", key.node_label.as_str()), ("format", EXPORT_FORMAT)])
        .headers(headers.clone())
        .send()
        .await
        .map_err(|e| fetch_error(e.status(), e.to_string()))?;

    let status = response.status();
    debug!(key = %key, status = %status, "export response");
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(fetch_error(Some(status), message));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| fetch_error(Some(status), format!("response body is not JSON: {}", e)))
}
