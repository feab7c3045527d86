//! `Gen3Session`: credentials, auth state and the raw/table stores of one caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use http::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::jwt::resolve_base_url;
use crate::auth::token::{exchange, AccessToken};
use crate::config::settings::SettingsConfig;
use crate::credentials::{self, Credentials};
use crate::error::{Gen3Error, Result};
use crate::export::fetch::fetch_export;
use crate::export::{DataKey, RawDataStore};
use crate::table::{FlattenReport, TableStore};

/// Session against one Gen3 data commons.
///
/// Credentials and the base url are loaded once and reused by every fetch;
/// [`Gen3Session::authenticate`] reloads them. A 401 on fetch drops the token.
pub struct Gen3Session {
    credentials_path: PathBuf,
    api_version: String,
    client: Client,
    credentials: Option<Credentials>,
    base_url: Option<String>,
    token: Option<AccessToken>,
    auth_headers: HeaderMap,
    raw: RawDataStore,
    tables: TableStore,
}

impl Gen3Session {
    pub fn new(credentials_path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_settings(credentials_path, &SettingsConfig::default())
    }

    pub fn with_settings(credentials_path: impl Into<PathBuf>, settings: &SettingsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.http.timeout_ms))
            .build()
            .map_err(|e| Gen3Error::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            credentials_path: credentials_path.into(),
            api_version: settings.api_version.clone(),
            client,
            credentials: None,
            base_url: None,
            token: None,
            auth_headers: HeaderMap::new(),
            raw: RawDataStore::new(),
            tables: TableStore::new(),
        })
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Base url, once resolved
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Headers sent with every export request; empty until authenticated
    pub fn auth_headers(&self) -> &HeaderMap {
        &self.auth_headers
    }

    /// Reload credentials, resolve the base url and exchange for a new token.
    /// On failure the previous session state is kept.
    pub async fn authenticate(&mut self) -> Result<&AccessToken> {
        let creds = credentials::load(&self.credentials_path)?;
        let base_url = resolve_base_url(&creds)?;
        let token = exchange(&self.client, &base_url, &creds).await?;
        let headers = token.auth_headers()?;

        self.credentials = Some(creds);
        self.base_url = Some(base_url);
        self.auth_headers = headers;
        Ok(&*self.token.insert(token))
    }

    /// Fetch one node with the configured api version.
    pub async fn fetch(&mut self, program: &str, project: &str, node_label: &str) -> Result<&Value> {
        let api_version = self.api_version.clone();
        self.fetch_with_version(program, project, node_label, &api_version).await
    }

    /// Fetch one node and store the body under `"{program}/{project}/{node_label}"`,
    /// replacing any previous entry. Nothing is stored on failure.
    pub async fn fetch_with_version(
        &mut self,
        program: &str,
        project: &str,
        node_label: &str,
        api_version: &str,
    ) -> Result<&Value> {
        let key = DataKey::new(program, project, node_label);
        let base_url = self.ensure_base_url()?.to_owned();

        let result = fetch_export(&self.client, &base_url, api_version, &self.auth_headers, &key).await;
        let body = match result {
            Ok(body) => body,
            Err(e) => {
                if e.status() == Some(StatusCode::UNAUTHORIZED) && self.token.take().is_some() {
                    warn!(key = %key, "access token rejected, re-authentication required");
                    self.auth_headers.clear();
                }
                return Err(e);
            }
        };

        info!(key = %key, "data fetched and stored");
        Ok(self.raw.insert(key.to_string(), body))
    }

    /// Rebuild the table store from every raw entry.
    pub fn flatten_all(&mut self) -> FlattenReport {
        let (tables, report) = TableStore::build(&self.raw);
        self.tables = tables;
        report
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn table(&self, key: &str) -> Option<&polars::prelude::DataFrame> {
        self.tables.get(key)
    }

    pub fn raw_store(&self) -> &RawDataStore {
        &self.raw
    }

    pub fn table_store(&self) -> &TableStore {
        &self.tables
    }

    /// Base url from cached credentials, loading them on first use
    fn ensure_base_url(&mut self) -> Result<&str> {
        if self.base_url.is_none() {
            if self.credentials.is_none() {
                self.credentials = Some(credentials::load(&self.credentials_path)?);
            }
            if let Some(creds) = &self.credentials {
                self.base_url = Some(resolve_base_url(creds)?);
            }
        }
        self.base_url
            .as_deref()
            .ok_or_else(|| Gen3Error::MalformedToken("base url could not be resolved".to_owned()))
    }
}

impl std::fmt::Debug for Gen3Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gen3Session")
            .field("credentials_path", &self.credentials_path)
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .field("raw_entries", &self.raw.len())
            .field("tables", &self.tables.len())
            .finish()
    }
}
