//! Credentials file loading.

pub mod lenient;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Gen3Error, Result};

pub const API_KEY_FIELD: &str = "api_key";

/// Contents of a Gen3 credentials file.
///
/// Every field is kept: the whole object is the body of the token exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The `api_key` JWT
    pub fn api_key(&self) -> Result<&str> {
        self.0
            .get(API_KEY_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| Gen3Error::MalformedToken(format!("'{}' field missing or not a string", API_KEY_FIELD)))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Read and parse a credentials file.
///
/// Strict JSON is tried first unless the content has no quote characters at
/// all; the lenient grammar is the fallback. On total failure the strict
/// parser's message is reported.
pub fn load(path: &Path) -> Result<Credentials> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::InvalidData => Gen3Error::CredentialParse {
            path: path.to_path_buf(),
            message: "file is not valid UTF-8".to_owned(),
        },
        _ => Gen3Error::CredentialFileNotFound {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let parse_error = |message: String| Gen3Error::CredentialParse {
        path: path.to_path_buf(),
        message,
    };

    match parse_content(&content).map_err(parse_error)? {
        Value::Object(fields) => {
            debug!(path = %path.display(), fields = fields.len(), "credentials loaded");
            Ok(Credentials(fields))
        }
        other => Err(parse_error(format!("expected a JSON object, found {}", json_kind(&other)))),
    }
}

fn parse_content(content: &str) -> std::result::Result<Value, String> {
    if !content.contains('"') {
        warn!("credentials file has no quoted strings, parsing with lenient grammar");
        return lenient::parse(content).map_err(|e| e.to_string());
    }

    match serde_json::from_str::<Value>(content) {
        Ok(value) => Ok(value),
        Err(strict) => {
            let value = lenient::parse(content).map_err(|_| strict.to_string())?;
            warn!(error = %strict, "credentials file is not strict JSON, parsed with lenient grammar");
            Ok(value)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
