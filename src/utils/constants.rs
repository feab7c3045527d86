//! Shared constants and invariants

pub const DEFAULT_API_VERSION: &str = "v0";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_CONFIG_PATH: &str = "gen3-metadata.yaml";

// Gen3 routes
pub const ACCESS_TOKEN_PATH: &str = "/user/credentials/cdis/access_token";
pub const EXPORT_FORMAT: &str = "json";
