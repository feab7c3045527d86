use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::error::{Gen3Error, Result};
use crate::helpers::time::now_u64;

/// Issuer suffix of the Gen3 user service (fence)
const USER_SERVICE_SUFFIX: &str = "/user";

/// Claims read from the api key payload. The signature is never checked.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct JwtClaims {
    #[serde(default)]
    pub iss: String,
    /// Kept untyped: only a numeric `exp` is checked
    pub exp: Option<Value>,
}

pub fn decode_jwt_from_string(token_string: &str) -> Result<JwtClaims> {
    let parts: Vec<&str> = token_string.split('.').collect();
    if parts.len() != 3 {
        return Err(Gen3Error::MalformedToken(format!(
            "expected 3 dot-separated parts, found {}",
            parts.len()
        )));
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(to_standard_base64(parts[1]))
        .map_err(|e| Gen3Error::MalformedToken(format!("base64 decode error: {}", e)))?;

    serde_json::from_slice::<JwtClaims>(&decoded)
        .map_err(|e| Gen3Error::MalformedToken(format!("invalid JWT payload: {}", e)))
}

/// base64url -> standard alphabet, padded to a multiple of 4
fn to_standard_base64(segment: &str) -> String {
    let mut restored: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while restored.len() % 4 != 0 {
        restored.push('=');
    }
    restored
}

/// API base URL derived from the `iss` claim of the api key.
pub fn resolve_base_url(creds: &Credentials) -> Result<String> {
    let claims = decode_jwt_from_string(creds.api_key()?)?;

    if let Some(exp) = claims.exp.as_ref().and_then(Value::as_f64) {
        if exp <= now_u64() as f64 {
            warn!(expired_at = exp, "api key has expired, token exchange will likely be rejected");
        }
    }

    let base_url = claims
        .iss
        .strip_suffix(USER_SERVICE_SUFFIX)
        .unwrap_or(&claims.iss)
        .to_owned();
    debug!(base_url = %base_url, "base url resolved from api key");
    Ok(base_url)
}
