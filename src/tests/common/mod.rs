// tests/common/mod.rs
pub use serde_json::json;

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use serde_json::Value;

use crate::utils::constants::ACCESS_TOKEN_PATH;

pub const FAKE_TOKEN: &str = "fake_token";
pub const KEY_ID: &str = "mock_key_id";

/// Unsigned api key whose `iss` points at `{base_url}/user`
pub fn api_key_for(base_url: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({"iss": format!("{}/user", base_url), "aud": ["data", "user"], "purpose": "api_key"}).to_string(),
    );
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

pub fn credentials_json(base_url: &str) -> Value {
    json!({"api_key": api_key_for(base_url), "key_id": KEY_ID})
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write test file");
    path
}

/// Strict JSON credentials file for a mock server
pub fn write_credentials(dir: &Path, server: &MockServer) -> PathBuf {
    write_file(dir, "credentials.json", &credentials_json(&server.base_url()).to_string())
}

/// Token exchange answering `token` for the default credentials body
pub async fn mock_token_exchange<'a>(server: &'a MockServer, token: &str) -> Mock<'a> {
    let body = credentials_json(&server.base_url());
    let token = token.to_owned();
    server
        .mock_async(move |when, then| {
            when.method(POST).path(ACCESS_TOKEN_PATH).json_body(body);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"access_token": token}));
        })
        .await
}
