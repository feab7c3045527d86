use serde::Deserialize;

use crate::config::settings::SettingsConfig;

/// ================================
/// Full run configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct RunConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

/// ================================
/// Targets - one project, many nodes
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    pub program: String,
    pub project: String,
    pub nodes: Vec<String>,
    /// overrides `settings.api_version` for this target
    pub api_version: Option<String>,
}
